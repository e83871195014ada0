//! A self-contained molecular library backed by viewer JSON documents.
//!
//! Documents have the shape the normalizer consumes (`atoms`, `frames`,
//! optional `bonds` and `cell`). PDB and mmCIF sources are parsed into the
//! same shape through `molex`. Selection supports a small expression
//! language over the canonical atom columns:
//!
//! - `all`, `none`
//! - `index 0 4 7`
//! - `<column> value...`, e.g. `chain_id A B` or `residue_name HOH`

use std::path::Path;

use serde_json::{Map, Value};

use super::{
    pdb, structure, LengthUnit, MolecularLibrary, MolecularSystem,
    PositionData, Selection, StructureIndices, SystemSource,
};
use crate::command::StructureFormat;
use crate::error::ViewerError;
use crate::payload::fields::first_present;
use crate::payload::normalize::{
    extract_bonds, parse_rows, read_cell, read_indexed_cell,
};
use crate::payload::{AtomTable, Frame};

/// Keys under `bonds` holding per-bond arrays or pair arrays.
const BOND_INDEX_KEYS: [&str; 2] = ["indexA", "indexB"];
const BOND_PAIR_KEYS: [&str; 3] = ["atom_pairs", "bonded_atom_pairs", "pairs"];

/// A molecular system held as a viewer JSON document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSystem {
    document: Value,
    n_atoms: Option<usize>,
    /// Original structure text, kept verbatim for export while unsliced.
    source_text: Option<(StructureFormat, String)>,
}

impl DocumentSystem {
    /// Wrap a viewer document. Fails unless it is a JSON object.
    pub fn new(document: Value) -> Result<Self, ViewerError> {
        if !document.is_object() {
            return Err(ViewerError::conversion(
                "viewer document must be a JSON object",
            ));
        }
        let n_atoms = infer_n_atoms(&document);
        Ok(Self {
            document,
            n_atoms,
            source_text: None,
        })
    }

    /// Parse PDB or mmCIF text.
    pub fn from_text(
        text: &str,
        format: StructureFormat,
    ) -> Result<Self, ViewerError> {
        let mut system = Self::new(structure::read_text(text, format)?)?;
        system.source_text = Some((format, text.to_owned()));
        Ok(system)
    }

    /// Read a `.json` viewer document, or a PDB or mmCIF file.
    pub fn from_path(path: &Path) -> Result<Self, ViewerError> {
        let text = std::fs::read_to_string(path)?;
        if path.extension().is_some_and(|ext| ext == "json") {
            let document = serde_json::from_str(&text).map_err(|e| {
                ViewerError::conversion(format!("{}: {e}", path.display()))
            })?;
            return Self::new(document);
        }
        let mut system = Self::new(structure::read_file(path)?)?;
        system.source_text = Some((structure::format_of(path), text));
        Ok(system)
    }

    /// The underlying document.
    #[must_use]
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Restrict to the given atoms (ascending, in range) and frames.
    ///
    /// Per-atom arrays, positions and bonds are sliced; bonds with an
    /// endpoint outside the selection are dropped and the rest renumbered.
    pub fn subset(
        &self,
        atoms: Option<&[usize]>,
        frames: &StructureIndices,
    ) -> Result<Self, ViewerError> {
        let mut document = self.document.clone();
        let n_atoms = self.n_atoms;

        if let StructureIndices::Indices(keep) = frames {
            select_frames(&mut document, keep)?;
        }
        if let Some(keep) = atoms {
            let n = n_atoms.ok_or_else(|| {
                ViewerError::conversion("cannot slice atoms: atom count unknown")
            })?;
            select_atoms(&mut document, keep, n);
        }

        Self::new(document)
    }

    fn atom_table(&self, n_atoms: usize) -> AtomTable {
        let block = self.document.get("atoms").and_then(Value::as_object);
        AtomTable::resolve(block, n_atoms, &mut Vec::new())
    }
}

impl MolecularSystem for DocumentSystem {
    fn n_atoms(&self) -> Option<usize> {
        self.n_atoms
    }

    fn viewer_document(&self) -> Result<Value, ViewerError> {
        Ok(self.document.clone())
    }

    fn select(&self, expression: &str) -> Result<Vec<usize>, ViewerError> {
        let n = self
            .n_atoms
            .ok_or_else(|| ViewerError::conversion("atom count unknown"))?;
        let mut words = expression.split_whitespace();
        let Some(head) = words.next() else {
            return Err(ViewerError::conversion("empty selection"));
        };
        let args: Vec<&str> = words.collect();

        match head {
            "all" if args.is_empty() => Ok((0..n).collect()),
            "none" if args.is_empty() => Ok(Vec::new()),
            "index" => args
                .iter()
                .map(|word| {
                    word.parse::<usize>().map_err(|_| {
                        ViewerError::conversion(format!(
                            "bad atom index '{word}' in '{expression}'"
                        ))
                    })
                })
                .collect(),
            column => {
                if args.is_empty() {
                    return Err(ViewerError::conversion(format!(
                        "selection '{expression}' names no values"
                    )));
                }
                let values =
                    column_text(&self.atom_table(n), column).ok_or_else(|| {
                        ViewerError::conversion(format!(
                            "unknown selection field '{column}'"
                        ))
                    })?;
                Ok(values
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| args.contains(&v.as_str()))
                    .map(|(i, _)| i)
                    .collect())
            }
        }
    }

    fn to_text(&self, format: StructureFormat) -> Result<String, ViewerError> {
        if let Some((source_format, text)) = &self.source_text {
            if *source_format == format {
                return Ok(text.clone());
            }
        }
        match format {
            StructureFormat::Pdb => self.export_pdb(),
            StructureFormat::Mmcif => Err(ViewerError::conversion(
                "mmCIF export is only available for mmCIF sources",
            )),
        }
    }
}

// ── PDB export ───────────────────────────────────────────────────────────

impl DocumentSystem {
    /// Ångströms per unit. Bare arrays are nanometres; unknown units are
    /// written unscaled.
    fn export_scale(&self, unit: Option<&str>) -> f64 {
        let Some(unit) = unit else {
            return LengthUnit::default().angstroms_per_unit();
        };
        self.convert_length(1.0, unit).unwrap_or_else(|_| {
            log::warn!("unknown length unit '{unit}', exporting unscaled");
            1.0
        })
    }

    /// First frame with an `(n_atoms, 3)` position block, in Ångströms.
    fn export_frame(&self, n_atoms: usize) -> Option<Frame> {
        let root = self.document.as_object();
        let frames =
            first_present(root, &["frames", "coordinates"])?.as_array()?;
        let shared_cells = root
            .and_then(|r| r.get("cell"))
            .and_then(Value::as_object);
        let length = |x: f64, unit: Option<&str>| {
            Some(x * self.export_scale(unit))
        };

        frames.iter().enumerate().find_map(|(index, frame)| {
            let data =
                frame.get("positions").and_then(PositionData::classify)?;
            let rows = parse_rows(data.magnitudes(), n_atoms)?;
            let scale = self.export_scale(match data {
                PositionData::Raw(_) => None,
                PositionData::Quantity { unit, .. } => Some(unit),
            });
            let cell = frame.get("cell").filter(|c| !c.is_null()).map_or_else(
                || {
                    shared_cells.and_then(|cells| {
                        read_indexed_cell(cells, index, length)
                    })
                },
                |cell| read_cell(cell, length),
            );
            Some(Frame {
                positions: rows
                    .into_iter()
                    .map(|row| row.map(|x| x * scale))
                    .collect(),
                time: 0.0,
                cell,
            })
        })
    }

    /// Write the first usable frame straight from the document columns,
    /// without going through the payload normalizer.
    fn export_pdb(&self) -> Result<String, ViewerError> {
        let n = self.n_atoms.filter(|&n| n > 0).ok_or_else(|| {
            ViewerError::conversion("cannot export PDB: no atoms")
        })?;
        let frame = self.export_frame(n).ok_or_else(|| {
            ViewerError::conversion("cannot export PDB: no usable frame")
        })?;
        let bonds =
            extract_bonds(self.document.get("bonds"), n, &mut Vec::new());
        pdb::write(&self.atom_table(n), &frame, bonds.as_ref())
    }
}

/// Canonical column as text, for selection matching.
fn column_text(table: &AtomTable, column: &str) -> Option<Vec<String>> {
    fn ints(values: &[i64]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }
    Some(match column {
        "atom_id" => ints(&table.atom_id),
        "atom_name" => table.atom_name.clone(),
        "residue_id" => ints(&table.residue_id),
        "residue_name" => table.residue_name.clone(),
        "chain_id" => table.chain_id.clone(),
        "entity_id" => table.entity_id.clone(),
        "element_symbol" => table.element_symbol.clone(),
        "formal_charge" => ints(&table.formal_charge),
        _ => return None,
    })
}

fn array_len(value: &Value) -> Option<usize> {
    match value {
        Value::Array(items) => Some(items.len()),
        Value::Object(map) => map.get("value").and_then(array_len),
        _ => None,
    }
}

/// Explicit `n_atoms`, else `atom_id`, else any atom column, else the first
/// frame's positions.
fn infer_n_atoms(document: &Value) -> Option<usize> {
    if let Some(n) = document.get("n_atoms").and_then(Value::as_u64) {
        return usize::try_from(n).ok();
    }
    let atoms = document.get("atoms").and_then(Value::as_object);
    if let Some(n) = first_present(atoms, &["atom_id"]).and_then(array_len) {
        return Some(n);
    }
    if let Some(n) = atoms.and_then(|a| a.values().find_map(array_len)) {
        return Some(n);
    }
    first_present(document.as_object(), &["frames", "coordinates"])
        .and_then(|f| f.get(0))
        .and_then(|f| f.get("positions"))
        .and_then(array_len)
}

fn pick<T: Clone>(items: &[T], keep: &[usize]) -> Vec<T> {
    keep.iter().filter_map(|&i| items.get(i).cloned()).collect()
}

fn select_frames(
    document: &mut Value,
    keep: &[usize],
) -> Result<(), ViewerError> {
    let Some(root) = document.as_object_mut() else {
        return Ok(());
    };
    let key = if root.contains_key("frames") {
        "frames"
    } else {
        "coordinates"
    };
    if let Some(Value::Array(frames)) = root.get_mut(key) {
        if let Some(&bad) = keep.iter().find(|&&i| i >= frames.len()) {
            return Err(ViewerError::validation(format!(
                "structure index {bad} out of range for {} frames",
                frames.len()
            )));
        }
        *frames = pick(frames, keep);
    }
    if let Some(Value::Object(cell)) = root.get_mut("cell") {
        for per_frame in ["lengths", "angles"] {
            if let Some(Value::Array(rows)) = cell.get_mut(per_frame) {
                *rows = pick(rows, keep);
            }
        }
    }
    Ok(())
}

fn slice_positions(positions: &mut Value, keep: &[usize]) {
    match positions {
        Value::Array(rows) => *rows = pick(rows, keep),
        Value::Object(quantity) => {
            if let Some(Value::Array(rows)) = quantity.get_mut("value") {
                *rows = pick(rows, keep);
            }
        }
        _ => {}
    }
}

fn select_atoms(document: &mut Value, keep: &[usize], n_atoms: usize) {
    let Some(root) = document.as_object_mut() else {
        return;
    };
    let _ = root.insert("n_atoms".to_owned(), Value::from(keep.len()));

    if let Some(Value::Object(atoms)) = root.get_mut("atoms") {
        for column in atoms.values_mut() {
            if let Value::Array(items) = column {
                if items.len() == n_atoms {
                    *items = pick(items, keep);
                }
            }
        }
    }

    for key in ["frames", "coordinates"] {
        if let Some(Value::Array(frames)) = root.get_mut(key) {
            for frame in frames {
                if let Some(positions) = frame.get_mut("positions") {
                    slice_positions(positions, keep);
                }
            }
        }
    }

    if let Some(Value::Object(bonds)) = root.get_mut("bonds") {
        let mut remap = vec![None; n_atoms];
        for (new, &old) in keep.iter().enumerate() {
            if let Some(slot) = remap.get_mut(old) {
                *slot = Some(new);
            }
        }
        slice_bonds(bonds, &remap);
    }
}

/// Keep bonds whose endpoints both survive, renumbered through `remap`.
fn slice_bonds(bonds: &mut Map<String, Value>, remap: &[Option<usize>]) {
    let lookup = |v: &Value| {
        v.as_u64()
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| remap.get(i).copied().flatten())
    };

    let pairs: Vec<(usize, Option<(usize, usize)>)> =
        if let [Some(a), Some(b)] = BOND_INDEX_KEYS.map(|k| bonds.get(k)) {
            match (a.as_array(), b.as_array()) {
                (Some(a), Some(b)) => a
                    .iter()
                    .zip(b)
                    .enumerate()
                    .map(|(k, (i, j))| (k, lookup(i).zip(lookup(j))))
                    .collect(),
                _ => return,
            }
        } else if let Some(Value::Array(raw)) =
            first_present(Some(&*bonds), &BOND_PAIR_KEYS)
        {
            raw.iter()
                .enumerate()
                .map(|(k, pair)| {
                    let ends = pair.as_array().and_then(|p| match p.as_slice() {
                        [i, j] => lookup(i).zip(lookup(j)),
                        _ => None,
                    });
                    (k, ends)
                })
                .collect()
        } else {
            return;
        };

    let kept: Vec<usize> = pairs
        .iter()
        .filter_map(|(k, ends)| ends.map(|_| *k))
        .collect();
    let ends: Vec<(usize, usize)> =
        pairs.iter().filter_map(|(_, ends)| *ends).collect();

    if let Some(Value::Array(order)) = bonds.get_mut("order") {
        *order = pick(order, &kept);
    }
    for key in BOND_PAIR_KEYS {
        let _ = bonds.remove(key);
    }
    let _ = bonds.insert(
        "indexA".to_owned(),
        ends.iter().map(|&(i, _)| Value::from(i)).collect(),
    );
    let _ = bonds.insert(
        "indexB".to_owned(),
        ends.iter().map(|&(_, j)| Value::from(j)).collect(),
    );
}

/// [`MolecularLibrary`] over viewer documents, PDB and mmCIF text, and
/// structure files.
///
/// PDB identifiers need a network fetch and are rejected with
/// [`ViewerError::Conversion`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentLibrary;

impl DocumentLibrary {
    /// New library handle.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl MolecularLibrary for DocumentLibrary {
    fn convert(
        &self,
        source: &SystemSource,
        selection: &Selection,
        structure_indices: &StructureIndices,
    ) -> Result<Box<dyn MolecularSystem>, ViewerError> {
        let system = match source {
            SystemSource::Document(document) => {
                DocumentSystem::new(document.clone())?
            }
            SystemSource::PdbString(text) => {
                DocumentSystem::from_text(text, StructureFormat::Pdb)?
            }
            SystemSource::MmcifString(text) => {
                DocumentSystem::from_text(text, StructureFormat::Mmcif)?
            }
            SystemSource::Path(path) => DocumentSystem::from_path(path)?,
            SystemSource::PdbId(_) => {
                return Err(ViewerError::conversion(format!(
                    "{} is not supported by the document library",
                    source.describe()
                )));
            }
        };

        if selection.is_all() && *structure_indices == StructureIndices::All {
            return Ok(Box::new(system));
        }
        let atoms = if selection.is_all() {
            None
        } else {
            let n = system.n_atoms().ok_or_else(|| {
                ViewerError::conversion("cannot select atoms: atom count unknown")
            })?;
            Some(selection.resolve(&system, n)?)
        };
        log::debug!(
            "slicing {} to selection '{selection}'",
            source.describe()
        );
        Ok(Box::new(system.subset(atoms.as_deref(), structure_indices)?))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::payload::Normalizer;

    const PDB_TEXT: &str = "\
CRYST1   40.960   18.650   22.520  90.00  90.77  90.00 P 1 21 1      2
ATOM      1  N   THR A   1      17.047  14.099   3.625  1.00 13.79           N
ATOM      2  CA  THR A   1      16.967  12.784   4.338  1.00 10.80           C
END
";

    const MMCIF_TEXT: &str = "\
data_TEST
#
_cell.length_a    40.960
_cell.length_b    18.650
_cell.length_c    22.520
_cell.angle_alpha 90.00
_cell.angle_beta  90.77
_cell.angle_gamma 90.00
#
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
ATOM   1 N N  . THR A 1 1 ? 17.047 14.099 3.625 1.00 13.79 ? 1 THR A N  1
ATOM   2 C CA . THR A 1 1 ? 16.967 12.784 4.338 1.00 10.80 ? 1 THR A CA 1
HETATM 3 O O  . HOH B 2 . ? 1.000  2.000  3.000 1.00 0.00  ? 2 HOH B O  1
#
";

    fn water_dimer() -> Value {
        json!({
            "atoms": {
                "atom_id": [1, 2, 3, 4, 5, 6],
                "atom_name": ["O", "H1", "H2", "O", "H1", "H2"],
                "residue_name": ["HOH", "HOH", "HOH", "WAT", "WAT", "WAT"],
                "chain_id": ["A", "A", "A", "B", "B", "B"],
                "element_symbol": ["O", "H", "H", "O", "H", "H"],
            },
            "frames": [
                { "positions": [[0, 0, 0], [0.1, 0, 0], [0, 0.1, 0],
                                [1, 1, 1], [1.1, 1, 1], [1, 1.1, 1]] },
                { "positions": [[0, 0, 0], [0.1, 0, 0], [0, 0.1, 0],
                                [2, 2, 2], [2.1, 2, 2], [2, 2.1, 2]] },
            ],
            "cell": { "lengths": [[3, 3, 3], [4, 4, 4]],
                      "angles": [[90, 90, 90], [90, 90, 90]] },
            "bonds": { "indexA": [0, 0, 3, 3], "indexB": [1, 2, 4, 5],
                       "order": [1, 1, 1, 1] },
        })
    }

    #[test]
    fn infers_atom_count() {
        let sys = DocumentSystem::new(water_dimer()).unwrap();
        assert_eq!(sys.n_atoms(), Some(6));

        let frames_only = DocumentSystem::new(json!({
            "frames": [{ "positions": { "value": [[0, 0, 0]], "unit": "nm" } }],
        }))
        .unwrap();
        assert_eq!(frames_only.n_atoms(), Some(1));

        assert!(DocumentSystem::new(json!([1, 2])).is_err());
    }

    #[test]
    fn selection_expressions() {
        let sys = DocumentSystem::new(water_dimer()).unwrap();
        assert_eq!(sys.select("all").unwrap(), vec![0, 1, 2, 3, 4, 5]);
        assert!(sys.select("none").unwrap().is_empty());
        assert_eq!(sys.select("index 5 1").unwrap(), vec![5, 1]);
        assert_eq!(sys.select("chain_id B").unwrap(), vec![3, 4, 5]);
        assert_eq!(sys.select("element_symbol O").unwrap(), vec![0, 3]);
        assert_eq!(sys.select("atom_id 2 3").unwrap(), vec![1, 2]);
        // Defaulted columns are selectable too.
        assert_eq!(sys.select("entity_id 1").unwrap().len(), 6);
        assert!(sys.select("mass 16").is_err());
        assert!(sys.select("chain_id").is_err());
        assert!(sys.select("index x").is_err());
    }

    #[test]
    fn subset_slices_atoms_frames_and_bonds() {
        let sys = DocumentSystem::new(water_dimer()).unwrap();
        let sub = sys
            .subset(Some(&[3, 4]), &StructureIndices::Indices(vec![1]))
            .unwrap();
        assert_eq!(sub.n_atoms(), Some(2));
        let doc = sub.document();
        assert_eq!(doc["atoms"]["atom_name"], json!(["O", "H1"]));
        assert_eq!(doc["frames"].as_array().unwrap().len(), 1);
        assert_eq!(doc["frames"][0]["positions"][1], json!([2.1, 2, 2]));
        assert_eq!(doc["cell"]["lengths"], json!([[4, 4, 4]]));
        assert_eq!(doc["bonds"]["indexA"], json!([0]));
        assert_eq!(doc["bonds"]["indexB"], json!([1]));
        assert_eq!(doc["bonds"]["order"], json!([1]));
    }

    #[test]
    fn subset_rejects_missing_frames() {
        let sys = DocumentSystem::new(water_dimer()).unwrap();
        let err = sys
            .subset(None, &StructureIndices::Indices(vec![2]))
            .unwrap_err();
        assert!(matches!(err, ViewerError::Validation(_)));
    }

    #[test]
    fn pair_bonds_are_renumbered() {
        let sys = DocumentSystem::new(json!({
            "atoms": { "atom_id": [1, 2, 3] },
            "frames": [{ "positions": [[0, 0, 0], [0, 0, 0], [0, 0, 0]] }],
            "bonds": { "atom_pairs": [[0, 1], [1, 2]] },
        }))
        .unwrap();
        let sub = sys.subset(Some(&[1, 2]), &StructureIndices::All).unwrap();
        let bonds = &sub.document()["bonds"];
        assert_eq!(bonds["indexA"], json!([0]));
        assert_eq!(bonds["indexB"], json!([1]));
        assert!(bonds.get("atom_pairs").is_none());
    }

    #[test]
    fn exports_pdb_from_document() {
        let sys = DocumentSystem::new(water_dimer()).unwrap();
        let text = sys.to_text(StructureFormat::Pdb).unwrap();
        assert!(text.starts_with("CRYST1   30.000   30.000   30.000"));
        assert!(text.contains("HOH A"));
        assert!(text.trim_end().ends_with("END"));
        assert!(sys.to_text(StructureFormat::Mmcif).is_err());
    }

    #[test]
    fn export_does_not_need_a_payload() {
        let sys = DocumentSystem::new(json!({
            "atoms": { "atom_id": [1, 2] },
            "frames": [{
                "positions": { "value": [[0, 0, 0], [1, 0, 0]], "unit": "bohr" },
            }],
        }))
        .unwrap();
        assert!(Normalizer::default().normalize(&sys).is_err());

        let text = sys.to_text(StructureFormat::Pdb).unwrap();
        let atoms: Vec<&str> =
            text.lines().filter(|l| l.starts_with("ATOM")).collect();
        assert_eq!(atoms.len(), 2);
        assert_eq!(&atoms[1][30..54], "   1.000   0.000   0.000");
    }

    #[test]
    fn export_scales_nanometre_positions_and_cells() {
        let sys = DocumentSystem::new(json!({
            "atoms": { "atom_id": [1] },
            "frames": [{
                "positions": [[0.1, 0.2, 0.3]],
                "cell": { "a": 4, "b": 4, "c": 4,
                          "alpha": 90, "beta": 90, "gamma": 90 },
            }],
        }))
        .unwrap();
        let text = sys.to_text(StructureFormat::Pdb).unwrap();
        assert!(text.starts_with("CRYST1   40.000   40.000   40.000"));
        assert!(text.contains("   1.000   2.000   3.000"));
    }

    #[test]
    fn export_needs_atoms_and_a_frame() {
        let sys = DocumentSystem::new(json!({ "atoms": { "atom_id": [1] } }))
            .unwrap();
        let err = sys.to_text(StructureFormat::Pdb).unwrap_err();
        assert!(matches!(err, ViewerError::Conversion(_)));
    }

    #[test]
    fn structure_text_is_exported_verbatim() {
        let sys =
            DocumentSystem::from_text(PDB_TEXT, StructureFormat::Pdb).unwrap();
        assert_eq!(sys.to_text(StructureFormat::Pdb).unwrap(), PDB_TEXT);
        assert!(sys.to_text(StructureFormat::Mmcif).is_err());

        let sys = DocumentSystem::from_text(MMCIF_TEXT, StructureFormat::Mmcif)
            .unwrap();
        assert_eq!(sys.to_text(StructureFormat::Mmcif).unwrap(), MMCIF_TEXT);
        assert!(sys
            .to_text(StructureFormat::Pdb)
            .unwrap()
            .contains("THR A   1"));
    }

    #[test]
    fn mmcif_text_backs_selections() {
        let sys = DocumentSystem::from_text(MMCIF_TEXT, StructureFormat::Mmcif)
            .unwrap();
        assert_eq!(sys.n_atoms(), Some(3));
        assert_eq!(sys.select("atom_name CA").unwrap(), vec![1]);
        assert_eq!(sys.select("residue_name HOH").unwrap(), vec![2]);
    }

    #[test]
    fn pdb_cell_is_independent_of_the_raw_unit() {
        let sys =
            DocumentSystem::from_text(PDB_TEXT, StructureFormat::Pdb).unwrap();
        for raw_unit in [LengthUnit::Nanometer, LengthUnit::Angstrom] {
            let out = Normalizer::new(raw_unit).normalize(&sys).unwrap();
            let frame = &out.payload.coordinates[0];
            assert!((frame.positions[0][0] - 17.047).abs() < 1e-3);
            let a = frame.cell.map(|c| c.a).unwrap();
            assert!((a - 40.96).abs() < 1e-9);
        }
    }

    #[test]
    fn library_reads_mmcif_text() {
        let sys = DocumentLibrary::new()
            .convert(
                &SystemSource::MmcifString(MMCIF_TEXT.to_owned()),
                &Selection::from("chain_id A"),
                &StructureIndices::All,
            )
            .unwrap();
        assert_eq!(sys.n_atoms(), Some(2));
    }

    #[test]
    fn library_applies_selection_and_rejects_remote_sources() {
        let library = DocumentLibrary::new();
        let sys = library
            .convert(
                &SystemSource::Document(water_dimer()),
                &Selection::from("chain_id A"),
                &StructureIndices::All,
            )
            .unwrap();
        assert_eq!(sys.n_atoms(), Some(3));

        let err = library
            .convert(
                &SystemSource::PdbId("1tcd".into()),
                &Selection::All,
                &StructureIndices::All,
            )
            .unwrap_err();
        assert!(matches!(err, ViewerError::Conversion(_)));
    }
}
