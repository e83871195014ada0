//! Structure loading for [`MolSysView`].

use super::{LoadOutcome, MolSysView, ViewState};
use crate::command::{Command, StructureFormat};
use crate::error::ViewerError;
use crate::mask::VisibilityMask;
use crate::molsys::{MolecularSystem, Selection, StructureIndices, SystemSource};
use crate::payload::Normalizer;
use crate::queue::Transport;

fn label_of(label: Option<&str>) -> Option<String> {
    label.map(str::to_owned)
}

impl<T: Transport> MolSysView<T> {
    /// Convert `source` through the library and send it to the front-end.
    ///
    /// The canonical payload is preferred. If normalization fails the system
    /// is exported as PDB text instead, so a system with at least one atom
    /// and one frame always produces a visual. Conversion failures are
    /// returned and leave the previous system in place.
    pub fn load(
        &mut self,
        source: &SystemSource,
        selection: &Selection,
        structure_indices: &StructureIndices,
        label: Option<&str>,
    ) -> Result<(), ViewerError> {
        let system =
            self.library.convert(source, selection, structure_indices)?;
        let normalizer = Normalizer::from_options(&self.options.normalizer);

        let (command, outcome) = match normalizer.normalize(system.as_ref()) {
            Ok(normalized) => {
                let outcome = LoadOutcome::Payload {
                    n_atoms: normalized.payload.n_atoms(),
                    n_frames: normalized.payload.coordinates.len(),
                    degradations: normalized.degradations.len(),
                };
                let command = Command::LoadMolsysPayload {
                    payload: normalized.payload,
                    label: label_of(label),
                };
                (command, outcome)
            }
            Err(e) => {
                log::warn!(
                    "payload unavailable for {} ({e}), sending PDB text",
                    source.describe()
                );
                let command = Command::LoadStructureFromString {
                    format: StructureFormat::Pdb,
                    data: system.to_text(StructureFormat::Pdb)?,
                    label: label_of(label),
                };
                (command, LoadOutcome::Text { fallback: true })
            }
        };

        log::info!(
            "loaded {} ({} atoms) as {}",
            source.describe(),
            system.n_atoms().unwrap_or(0),
            command.op()
        );
        self.install(Some(system), source, selection, structure_indices);
        self.state.last_load = Some(outcome);
        self.queue.send(&command)
    }

    /// Send PDB text for the front-end to parse.
    ///
    /// The text is also converted through the library to back selections;
    /// if that fails the structure is still shown but mask operations are
    /// unavailable.
    pub fn load_pdb_string(
        &mut self,
        data: &str,
        label: Option<&str>,
    ) -> Result<(), ViewerError> {
        self.load_text(StructureFormat::Pdb, data, label)
    }

    /// Send mmCIF text for the front-end to parse. See
    /// [`load_pdb_string`](Self::load_pdb_string).
    pub fn load_mmcif_string(
        &mut self,
        data: &str,
        label: Option<&str>,
    ) -> Result<(), ViewerError> {
        self.load_text(StructureFormat::Mmcif, data, label)
    }

    /// Have the front-end fetch a PDB archive entry.
    ///
    /// The identifier is trimmed and lowercased; an empty identifier is a
    /// [`ViewerError::Validation`]. The entry is converted through the
    /// library first so selections work, and conversion failures are
    /// returned.
    pub fn load_pdb_id(
        &mut self,
        pdb_id: &str,
        label: Option<&str>,
    ) -> Result<(), ViewerError> {
        let id = pdb_id.trim();
        if id.is_empty() {
            return Err(ViewerError::validation("pdb_id cannot be empty"));
        }
        let source = SystemSource::PdbId(id.to_owned());
        let system = self.library.convert(
            &source,
            &Selection::All,
            &StructureIndices::All,
        )?;
        self.install(
            Some(system),
            &source,
            &Selection::All,
            &StructureIndices::All,
        );
        self.state.last_load = Some(LoadOutcome::PdbId);
        log::info!("loading PDB entry {id}");
        self.queue.send(&Command::LoadPdbId {
            pdb_id: id.to_lowercase(),
            label: label_of(label),
        })
    }

    /// Have the front-end fetch a structure by URL.
    ///
    /// Nothing is converted locally, so mask operations are unavailable
    /// until the next library-backed load.
    pub fn load_from_url(
        &mut self,
        url: &str,
        format: Option<&str>,
        label: Option<&str>,
    ) -> Result<(), ViewerError> {
        self.system = None;
        self.mask = None;
        self.state = ViewState {
            source: Some(url.to_owned()),
            last_load: Some(LoadOutcome::Url),
            ..ViewState::default()
        };
        log::info!("loading {url} in the front-end");
        self.queue.send(&Command::LoadStructureFromUrl {
            url: url.to_owned(),
            format: format.map(str::to_owned),
            label: label_of(label),
        })
    }

    fn load_text(
        &mut self,
        format: StructureFormat,
        data: &str,
        label: Option<&str>,
    ) -> Result<(), ViewerError> {
        let source = match format {
            StructureFormat::Pdb => SystemSource::PdbString(data.to_owned()),
            StructureFormat::Mmcif => {
                SystemSource::MmcifString(data.to_owned())
            }
        };
        let system = self
            .library
            .convert(&source, &Selection::All, &StructureIndices::All)
            .map_err(|e| {
                log::warn!(
                    "{} not converted ({e}), selections unavailable",
                    source.describe()
                );
            })
            .ok();
        self.install(system, &source, &Selection::All, &StructureIndices::All);
        self.state.last_load = Some(LoadOutcome::Text { fallback: false });
        self.queue.send(&Command::LoadStructureFromString {
            format,
            data: data.to_owned(),
            label: label_of(label),
        })
    }

    /// Replace the cached system and reset the mask to all-visible.
    fn install(
        &mut self,
        system: Option<Box<dyn MolecularSystem>>,
        source: &SystemSource,
        selection: &Selection,
        structure_indices: &StructureIndices,
    ) {
        self.mask = system.as_ref().and_then(|s| match s.n_atoms() {
            Some(n) => Some(VisibilityMask::new(n)),
            None => {
                log::warn!("atom count unknown, visibility mask disabled");
                None
            }
        });
        self.system = system;
        self.state = ViewState {
            source: Some(source.describe()),
            selection: selection.clone(),
            structure_indices: structure_indices.clone(),
            last_load: None,
        };
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::molsys::{LengthUnit, MolecularLibrary};
    use crate::options::Options;
    use crate::queue::RecordingTransport;

    fn ready_view() -> MolSysView<RecordingTransport> {
        let mut view = MolSysView::new(RecordingTransport::new());
        let _ = view.on_ready();
        view
    }

    fn document() -> Value {
        json!({
            "atoms": {
                "atom_id": [1, 2, 3],
                "atom_name": ["N", "CA", "C"],
                "residue_name": ["GLY", "GLY", "GLY"],
            },
            "frames": [{ "positions": [[0.1, 0.2, 0.3], [0, 0, 0], [1, 1, 1]] }],
        })
    }

    #[test]
    fn load_sends_canonical_payload_in_angstroms() {
        let mut view = ready_view();
        view.load(
            &SystemSource::Document(document()),
            &Selection::All,
            &StructureIndices::All,
            Some("gly"),
        )
        .unwrap();

        let sent = &view.transport().messages;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["op"], json!("load_molsys_payload"));
        assert_eq!(sent[0]["label"], json!("gly"));
        let payload = &sent[0]["payload"];
        assert_eq!(payload["coordinates"][0]["positions"][0], json!([1.0, 2.0, 3.0]));
        assert_eq!(payload["atoms"]["chain_id"], json!(["A", "A", "A"]));

        assert_eq!(view.mask().map(VisibilityMask::len), Some(3));
        assert_eq!(
            view.state().last_load,
            Some(LoadOutcome::Payload {
                n_atoms: 3,
                n_frames: 1,
                degradations: 5,
            })
        );
    }

    #[test]
    fn load_applies_selection() {
        let mut view = ready_view();
        view.load(
            &SystemSource::Document(document()),
            &Selection::from("atom_name CA C"),
            &StructureIndices::All,
            None,
        )
        .unwrap();
        assert_eq!(view.mask().map(VisibilityMask::len), Some(2));
        let payload = &view.transport().messages[0]["payload"];
        assert_eq!(payload["atoms"]["atom_name"], json!(["CA", "C"]));
        assert!(view.transport().messages[0].get("label").is_none());
    }

    #[test]
    fn falls_back_to_pdb_text_without_frames() {
        #[derive(Debug)]
        struct NoFrames;

        impl MolecularSystem for NoFrames {
            fn n_atoms(&self) -> Option<usize> {
                Some(1)
            }
            fn viewer_document(&self) -> Result<Value, ViewerError> {
                Ok(json!({ "atoms": { "atom_id": [1] } }))
            }
            fn select(&self, _: &str) -> Result<Vec<usize>, ViewerError> {
                Ok(vec![0])
            }
            fn to_text(
                &self,
                _: StructureFormat,
            ) -> Result<String, ViewerError> {
                Ok("ATOM      1  CA  GLY A   1       1.000   2.000   3.000  1.00  0.00           C\n".to_owned())
            }
        }

        struct Library;

        impl MolecularLibrary for Library {
            fn convert(
                &self,
                _: &SystemSource,
                _: &Selection,
                _: &StructureIndices,
            ) -> Result<Box<dyn MolecularSystem>, ViewerError> {
                Ok(Box::new(NoFrames))
            }
        }

        let pdb = "ATOM      1  CA  GLY A   1       1.000   2.000   3.000  1.00  0.00           C\n";
        let mut view = MolSysView::builder(RecordingTransport::new())
            .with_library(Library)
            .build();
        let _ = view.on_ready();
        view.load(
            &SystemSource::PdbString(pdb.to_owned()),
            &Selection::All,
            &StructureIndices::All,
            None,
        )
        .unwrap();

        let sent = &view.transport().messages;
        assert_eq!(
            sent[0],
            json!({ "op": "load_structure_from_string", "format": "pdb", "data": pdb })
        );
        assert_eq!(
            view.state().last_load,
            Some(LoadOutcome::Text { fallback: true })
        );
        assert_eq!(view.mask().map(VisibilityMask::len), Some(1));
    }

    #[test]
    fn conversion_errors_surface_and_keep_previous_system() {
        let mut view = ready_view();
        view.load(
            &SystemSource::Document(document()),
            &Selection::All,
            &StructureIndices::All,
            None,
        )
        .unwrap();
        let err = view
            .load(
                &SystemSource::Document(json!("not a document")),
                &Selection::All,
                &StructureIndices::All,
                None,
            )
            .unwrap_err();
        assert!(matches!(err, ViewerError::Conversion(_)));
        assert_eq!(view.mask().map(VisibilityMask::len), Some(3));
        assert_eq!(view.transport().messages.len(), 1);
    }

    #[test]
    fn pdb_string_keeps_original_text() {
        let pdb = "ATOM      1  CA  GLY A   1       1.000   2.000   3.000  1.00  0.00           C\nEND\n";
        let mut view = ready_view();
        view.load_pdb_string(pdb, Some("one")).unwrap();
        assert_eq!(
            view.transport().messages[0],
            json!({ "op": "load_structure_from_string", "format": "pdb",
                    "data": pdb, "label": "one" })
        );
        assert_eq!(view.mask().map(VisibilityMask::len), Some(1));
    }

    const MMCIF: &str = "\
data_TEST
loop_
_atom_site.group_PDB
_atom_site.id
_atom_site.type_symbol
_atom_site.label_atom_id
_atom_site.label_alt_id
_atom_site.label_comp_id
_atom_site.label_asym_id
_atom_site.label_entity_id
_atom_site.label_seq_id
_atom_site.pdbx_PDB_ins_code
_atom_site.Cartn_x
_atom_site.Cartn_y
_atom_site.Cartn_z
_atom_site.occupancy
_atom_site.B_iso_or_equiv
_atom_site.pdbx_formal_charge
_atom_site.auth_seq_id
_atom_site.auth_comp_id
_atom_site.auth_asym_id
_atom_site.auth_atom_id
_atom_site.pdbx_PDB_model_num
ATOM 1 N N  . GLY A 1 1 ? 0.000 0.000 0.000 1.00 0.00 ? 1 GLY A N  1
ATOM 2 C CA . GLY A 1 1 ? 1.450 0.000 0.000 1.00 0.00 ? 1 GLY A CA 1
ATOM 3 N N  . GLY B 2 1 ? 9.000 0.000 0.000 1.00 0.00 ? 1 GLY B N  1
#
";

    #[test]
    fn mmcif_string_backs_selections() {
        let mut view = ready_view();
        view.load_mmcif_string(MMCIF, None).unwrap();
        assert_eq!(
            view.transport().messages[0]["format"],
            json!("mmcif")
        );
        assert_eq!(view.mask().map(VisibilityMask::len), Some(3));

        view.isolate(&Selection::from("chain_id B")).unwrap();
        assert_eq!(view.visible_atom_indices(), Some(vec![2]));
        assert_eq!(
            view.transport().ops(),
            vec!["load_structure_from_string", "update_visibility"]
        );
    }

    #[test]
    fn unparseable_text_is_sent_without_local_system() {
        let mut view = ready_view();
        view.load_mmcif_string("data_1ABC\n", None).unwrap();
        assert_eq!(view.transport().ops(), vec!["load_structure_from_string"]);
        assert!(view.mask().is_none());
        assert!(view.system().is_none());
        let err = view.hide(&Selection::All).unwrap_err();
        assert!(matches!(err, ViewerError::NoSystemLoaded));
    }

    #[test]
    fn document_without_payload_falls_back_to_exported_pdb() {
        let mut view = ready_view();
        view.load(
            &SystemSource::Document(json!({
                "atoms": { "atom_id": [1, 2] },
                "frames": [{
                    "positions": {
                        "value": [[0, 0, 0], [1, 0, 0]],
                        "unit": "bohr",
                    },
                }],
            })),
            &Selection::All,
            &StructureIndices::All,
            None,
        )
        .unwrap();

        let sent = &view.transport().messages;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["op"], json!("load_structure_from_string"));
        assert_eq!(sent[0]["format"], json!("pdb"));
        let data = sent[0]["data"].as_str().unwrap();
        assert_eq!(data.lines().filter(|l| l.starts_with("ATOM")).count(), 2);
        assert_eq!(
            view.state().last_load,
            Some(LoadOutcome::Text { fallback: true })
        );
        assert_eq!(view.mask().map(VisibilityMask::len), Some(2));
    }

    #[test]
    fn pdb_cell_matches_positions_for_any_raw_unit() {
        let pdb = "\
CRYST1   40.960   18.650   22.520  90.00  90.77  90.00 P 1 21 1      2
ATOM      1  CA  THR A   1      16.967  12.784   4.338  1.00 10.80           C
END
";
        let mut options = Options::default();
        options.normalizer.raw_length_unit = LengthUnit::Angstrom;
        let mut view = MolSysView::builder(RecordingTransport::new())
            .with_options(options)
            .build();
        let _ = view.on_ready();
        view.load(
            &SystemSource::PdbString(pdb.to_owned()),
            &Selection::All,
            &StructureIndices::All,
            None,
        )
        .unwrap();

        let frame = &view.transport().messages[0]["payload"]["coordinates"][0];
        let x = frame["positions"][0][0].as_f64().unwrap();
        let a = frame["cell"]["a"].as_f64().unwrap();
        assert!((x - 16.967).abs() < 1e-3);
        assert!((a - 40.96).abs() < 1e-9);
    }

    #[test]
    fn pdb_id_is_validated_before_conversion() {
        let mut view = ready_view();
        let err = view.load_pdb_id("   ", None).unwrap_err();
        assert!(matches!(err, ViewerError::Validation(_)));

        // The built-in library cannot fetch archive entries.
        let err = view.load_pdb_id(" 1TCD ", None).unwrap_err();
        assert!(matches!(err, ViewerError::Conversion(_)));
        assert!(view.transport().messages.is_empty());
    }

    #[test]
    fn pdb_id_is_lowercased() {
        #[derive(Debug)]
        struct Stub;

        impl MolecularSystem for Stub {
            fn n_atoms(&self) -> Option<usize> {
                Some(2)
            }
            fn viewer_document(&self) -> Result<Value, ViewerError> {
                Ok(json!({}))
            }
            fn select(&self, _: &str) -> Result<Vec<usize>, ViewerError> {
                Ok(vec![1])
            }
            fn to_text(
                &self,
                _: StructureFormat,
            ) -> Result<String, ViewerError> {
                Ok(String::new())
            }
        }

        struct Archive;

        impl MolecularLibrary for Archive {
            fn convert(
                &self,
                _: &SystemSource,
                _: &Selection,
                _: &StructureIndices,
            ) -> Result<Box<dyn MolecularSystem>, ViewerError> {
                Ok(Box::new(Stub))
            }
        }

        let mut view = MolSysView::builder(RecordingTransport::new())
            .with_library(Archive)
            .build();
        let _ = view.on_ready();
        view.load_pdb_id(" 1TCD ", Some("TIM")).unwrap();
        assert_eq!(
            view.transport().messages[0],
            json!({ "op": "load_pdb_id", "pdb_id": "1tcd", "label": "TIM" })
        );
        assert_eq!(view.state().source.as_deref(), Some("PDB id 1TCD"));
        assert_eq!(view.mask().map(VisibilityMask::len), Some(2));
    }

    #[test]
    fn url_load_drops_local_system() {
        let mut view = ready_view();
        view.load(
            &SystemSource::Document(document()),
            &Selection::All,
            &StructureIndices::All,
            None,
        )
        .unwrap();
        view.load_from_url("https://example.org/1abc.cif", Some("mmcif"), None)
            .unwrap();
        assert!(view.mask().is_none());
        assert!(view.system().is_none());
        assert_eq!(
            view.transport().messages[1],
            json!({ "op": "load_structure_from_url",
                    "url": "https://example.org/1abc.cif", "format": "mmcif" })
        );
    }
}
