//! Molecular system → [`CanonicalPayload`] conversion.
//!
//! The normalizer never raises on malformed optional data; it degrades and
//! records what it did. It only fails when there is nothing to draw: no
//! atoms ([`PayloadError::NoAtoms`]) or no usable frame
//! ([`PayloadError::NoCoordinates`]). Callers treat either failure as a cue
//! to fall back to plain-text export.

use serde_json::{Map, Value};

use super::fields::{
    coerce_float, coerce_int, first_present, Degradation, DegradationReason,
};
use super::{AtomTable, Bonds, CanonicalPayload, Frame, UnitCell};
use crate::error::{PayloadError, ViewerError};
use crate::molsys::{LengthUnit, MolecularSystem, PositionData};
use crate::options::NormalizerOptions;

/// Keys under `bonds` holding an `(n_bonds, 2)` pair array.
const BOND_PAIR_KEYS: &[&str] = &["atom_pairs", "bonded_atom_pairs", "pairs"];

/// A payload plus every fallback taken while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    /// The canonical payload.
    pub payload: CanonicalPayload,
    /// Non-fatal substitutions, in discovery order.
    pub degradations: Vec<Degradation>,
}

/// Converts molecular systems into canonical payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Normalizer {
    raw_unit: LengthUnit,
}

impl Normalizer {
    /// Normalizer treating bare position arrays as `raw_unit`.
    #[must_use]
    pub fn new(raw_unit: LengthUnit) -> Self {
        Self { raw_unit }
    }

    /// Normalizer configured from [`NormalizerOptions`].
    #[must_use]
    pub fn from_options(options: &NormalizerOptions) -> Self {
        Self::new(options.raw_length_unit)
    }

    /// Build the canonical payload for `system`.
    ///
    /// Fails with [`ViewerError::Conversion`] if the library cannot produce
    /// a document, or [`ViewerError::Payload`] if nothing drawable remains.
    pub fn normalize(
        &self,
        system: &dyn MolecularSystem,
    ) -> Result<Normalized, ViewerError> {
        let document = system.viewer_document()?;
        let atoms_block = document.get("atoms").and_then(Value::as_object);

        let n_atoms = system
            .n_atoms()
            .or_else(|| {
                first_present(atoms_block, &["atom_id"])
                    .and_then(Value::as_array)
                    .map(Vec::len)
            })
            .filter(|&n| n > 0)
            .ok_or(PayloadError::NoAtoms)?;

        let mut report = Vec::new();
        let atoms = AtomTable::resolve(atoms_block, n_atoms, &mut report);

        let coordinates =
            self.extract_frames(system, &document, n_atoms, &mut report);
        if coordinates.is_empty() {
            return Err(PayloadError::NoCoordinates.into());
        }

        let bonds = extract_bonds(document.get("bonds"), n_atoms, &mut report);

        for degradation in &report {
            log::debug!("payload degraded: {degradation}");
        }
        log::debug!(
            "normalized {n_atoms} atoms, {} frame(s), {} bond(s)",
            coordinates.len(),
            bonds.as_ref().map_or(0, Bonds::len)
        );

        Ok(Normalized {
            payload: CanonicalPayload {
                atoms,
                coordinates,
                bonds,
            },
            degradations: report,
        })
    }

    fn extract_frames(
        &self,
        system: &dyn MolecularSystem,
        document: &Value,
        n_atoms: usize,
        report: &mut Vec<Degradation>,
    ) -> Vec<Frame> {
        let root = document.as_object();
        let Some(frames) =
            first_present(root, &["frames", "coordinates"]).and_then(Value::as_array)
        else {
            return Vec::new();
        };
        let shared_cells = root
            .and_then(|r| r.get("cell"))
            .and_then(Value::as_object)
            .filter(|cell| !cell.contains_key("a"));

        let mut out = Vec::with_capacity(frames.len());
        for (index, frame) in frames.iter().enumerate() {
            let Some(positions) = frame
                .as_object()
                .and_then(|f| f.get("positions"))
                .and_then(PositionData::classify)
                .and_then(|data| {
                    self.positions_to_angstroms(system, data, n_atoms)
                })
            else {
                report.push(Degradation::new(
                    "coordinates",
                    DegradationReason::FrameDropped { frame: index },
                ));
                continue;
            };

            let time = frame
                .get("time")
                .and_then(coerce_float)
                .unwrap_or(index as f64);

            let cell = match frame.get("cell").filter(|c| !c.is_null()) {
                Some(cell) => {
                    let parsed = self.frame_cell(system, cell);
                    if parsed.is_none() {
                        report.push(Degradation::new(
                            "cell",
                            DegradationReason::CellDropped { frame: index },
                        ));
                    }
                    parsed
                }
                None => shared_cells.and_then(|cells| {
                    self.indexed_cell(system, cells, index)
                }),
            };

            out.push(Frame {
                positions,
                time,
                cell,
            });
        }
        out
    }

    fn positions_to_angstroms(
        &self,
        system: &dyn MolecularSystem,
        data: PositionData<'_>,
        n_atoms: usize,
    ) -> Option<Vec<[f64; 3]>> {
        let rows = parse_rows(data.magnitudes(), n_atoms)?;
        match data {
            PositionData::Raw(_) => {
                let factor = self.raw_unit.angstroms_per_unit();
                Some(rows.into_iter().map(|r| r.map(|x| x * factor)).collect())
            }
            PositionData::Quantity { unit, .. } => rows
                .into_iter()
                .map(|row| {
                    let mut out = [0.0; 3];
                    for (dst, x) in out.iter_mut().zip(row) {
                        *dst = system.convert_length(x, unit).ok()?;
                    }
                    Some(out)
                })
                .collect(),
        }
    }

    /// Cell lengths tagged with a `unit` convert through the system; bare
    /// ones are in the raw unit.
    fn cell_length(
        &self,
        system: &dyn MolecularSystem,
        value: f64,
        unit: Option<&str>,
    ) -> Option<f64> {
        match unit {
            Some(unit) => system.convert_length(value, unit).ok(),
            None => Some(value * self.raw_unit.angstroms_per_unit()),
        }
    }

    fn frame_cell(
        &self,
        system: &dyn MolecularSystem,
        cell: &Value,
    ) -> Option<UnitCell> {
        read_cell(cell, |x, unit| self.cell_length(system, x, unit))
    }

    fn indexed_cell(
        &self,
        system: &dyn MolecularSystem,
        cells: &Map<String, Value>,
        index: usize,
    ) -> Option<UnitCell> {
        read_indexed_cell(cells, index, |x, unit| {
            self.cell_length(system, x, unit)
        })
    }
}

/// Document-level `cell.lengths[i]` / `cell.angles[i]`; both must exist.
pub(crate) fn read_indexed_cell(
    cells: &Map<String, Value>,
    index: usize,
    length: impl Fn(f64, Option<&str>) -> Option<f64>,
) -> Option<UnitCell> {
    let triple = |key: &str| -> Option<[f64; 3]> {
        let row = cells.get(key)?.as_array()?.get(index)?.as_array()?;
        if row.len() != 3 {
            return None;
        }
        Some([
            coerce_float(&row[0])?,
            coerce_float(&row[1])?,
            coerce_float(&row[2])?,
        ])
    };
    let unit = cells.get("unit").and_then(Value::as_str);
    let [a, b, c] = triple("lengths")?;
    let [alpha, beta, gamma] = triple("angles")?;
    Some(UnitCell {
        a: length(a, unit)?,
        b: length(b, unit)?,
        c: length(c, unit)?,
        alpha,
        beta,
        gamma,
    })
}

/// `{a, b, c, alpha, beta, gamma}` with an optional length `unit`, each
/// length passed through `length` to get Ångströms.
pub(crate) fn read_cell(
    cell: &Value,
    length: impl Fn(f64, Option<&str>) -> Option<f64>,
) -> Option<UnitCell> {
    let cell = cell.as_object()?;
    let get = |key: &str| cell.get(key).and_then(coerce_float);
    let unit = cell.get("unit").and_then(Value::as_str);
    Some(UnitCell {
        a: length(get("a")?, unit)?,
        b: length(get("b")?, unit)?,
        c: length(get("c")?, unit)?,
        alpha: get("alpha")?,
        beta: get("beta")?,
        gamma: get("gamma")?,
    })
}

/// Parse an `(n, 3)` numeric matrix.
pub(crate) fn parse_rows(value: &Value, n: usize) -> Option<Vec<[f64; 3]>> {
    let rows = value.as_array()?;
    if rows.len() != n {
        return None;
    }
    rows.iter()
        .map(|row| {
            let row = row.as_array()?;
            if row.len() != 3 {
                return None;
            }
            Some([row[0].as_f64()?, row[1].as_f64()?, row[2].as_f64()?])
        })
        .collect()
}

fn index_list(value: &Value) -> Option<Vec<usize>> {
    value
        .as_array()?
        .iter()
        .map(|v| coerce_int(v).and_then(|i| usize::try_from(i).ok()))
        .collect()
}

fn split_pairs(value: &Value) -> Option<(Vec<usize>, Vec<usize>)> {
    let pairs = value.as_array()?;
    let mut a = Vec::with_capacity(pairs.len());
    let mut b = Vec::with_capacity(pairs.len());
    for pair in pairs {
        let pair = index_list(pair)?;
        let [i, j] = pair.as_slice() else {
            return None;
        };
        a.push(*i);
        b.push(*j);
    }
    Some((a, b))
}

/// Bonds from `indexA`/`indexB` arrays or an `(n_bonds, 2)` pair array.
///
/// An absent table is not a degradation; a present but malformed one is.
pub(crate) fn extract_bonds(
    value: Option<&Value>,
    n_atoms: usize,
    report: &mut Vec<Degradation>,
) -> Option<Bonds> {
    let block = value?.as_object()?;

    let indices = match (block.get("indexA"), block.get("indexB")) {
        (Some(a), Some(b)) => index_list(a).zip(index_list(b)),
        _ => match first_present(Some(block), BOND_PAIR_KEYS) {
            Some(pairs) => split_pairs(pairs),
            None => return None,
        },
    };

    let valid = indices.filter(|(a, b)| {
        a.len() == b.len() && a.iter().chain(b).all(|&i| i < n_atoms)
    });
    let Some((index_a, index_b)) = valid else {
        report.push(Degradation::new("bonds", DegradationReason::BondsDropped));
        return None;
    };

    let order = match block.get("order").filter(|o| !o.is_null()) {
        None => None,
        Some(order) => {
            let parsed: Option<Vec<i64>> = order
                .as_array()
                .and_then(|items| items.iter().map(coerce_int).collect())
                .filter(|o: &Vec<i64>| o.len() == index_a.len());
            if parsed.is_none() {
                report.push(Degradation::new(
                    "bonds",
                    DegradationReason::BondOrderDropped,
                ));
            }
            parsed
        }
    };

    Some(Bonds {
        index_a,
        index_b,
        order,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::molsys::DocumentSystem;

    fn normalize(doc: Value) -> Result<Normalized, ViewerError> {
        let system = DocumentSystem::new(doc).unwrap();
        Normalizer::default().normalize(&system)
    }

    #[test]
    fn nanometres_become_angstroms() {
        let out = normalize(json!({
            "atoms": { "atom_id": [1] },
            "frames": [{ "positions": [[0.1, 0.2, 0.3]] }],
        }))
        .unwrap();
        assert_eq!(out.payload.coordinates[0].positions, vec![[1.0, 2.0, 3.0]]);
        assert_eq!(out.payload.coordinates[0].time, 0.0);
    }

    #[test]
    fn quantities_use_their_own_unit() {
        let out = normalize(json!({
            "atoms": { "atom_id": [1, 2] },
            "frames": [{
                "positions": {
                    "value": [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]],
                    "unit": "angstrom",
                },
                "time": 2.5,
            }],
        }))
        .unwrap();
        let frame = &out.payload.coordinates[0];
        assert_eq!(frame.positions, vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        assert_eq!(frame.time, 2.5);
    }

    #[test]
    fn unknown_quantity_unit_drops_frame() {
        let err = normalize(json!({
            "atoms": { "atom_id": [1] },
            "frames": [{ "positions": { "value": [[1, 2, 3]], "unit": "ly" } }],
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            ViewerError::Payload(PayloadError::NoCoordinates)
        ));
    }

    #[test]
    fn frame_cell_scales_lengths_only() {
        let out = normalize(json!({
            "atoms": { "atom_id": [1] },
            "frames": [{
                "positions": [[1.0, 2.0, 3.0]],
                "time": 5,
                "cell": { "a": 1, "b": 2, "c": 3,
                          "alpha": 90, "beta": 90, "gamma": 90 },
            }],
        }))
        .unwrap();
        let frame = &out.payload.coordinates[0];
        assert_eq!(frame.positions, vec![[10.0, 20.0, 30.0]]);
        assert_eq!(frame.time, 5.0);
        assert_eq!(
            frame.cell,
            Some(UnitCell {
                a: 10.0,
                b: 20.0,
                c: 30.0,
                alpha: 90.0,
                beta: 90.0,
                gamma: 90.0,
            })
        );
    }

    #[test]
    fn cells_with_a_unit_ignore_the_raw_unit() {
        let doc = json!({
            "atoms": { "atom_id": [1] },
            "frames": [{
                "positions": { "value": [[17.0, 0.0, 0.0]], "unit": "angstrom" },
                "cell": { "a": 40.96, "b": 18.65, "c": 22.52,
                          "alpha": 90, "beta": 90.77, "gamma": 90,
                          "unit": "angstrom" },
            }],
        });
        let system = DocumentSystem::new(doc).unwrap();
        for raw_unit in [LengthUnit::Nanometer, LengthUnit::Angstrom] {
            let out = Normalizer::new(raw_unit).normalize(&system).unwrap();
            let frame = &out.payload.coordinates[0];
            assert_eq!(frame.positions[0][0], 17.0);
            assert_eq!(frame.cell.map(|c| c.a), Some(40.96));
        }
    }

    #[test]
    fn shared_cell_unit_applies_to_every_frame() {
        let out = normalize(json!({
            "atoms": { "atom_id": [1] },
            "frames": [{ "positions": [[0.0, 0.0, 0.0]] }],
            "cell": {
                "lengths": [[30.0, 30.0, 30.0]],
                "angles": [[90.0, 90.0, 90.0]],
                "unit": "angstrom",
            },
        }))
        .unwrap();
        assert_eq!(out.payload.coordinates[0].cell.map(|c| c.a), Some(30.0));
    }

    #[test]
    fn shared_cell_needs_lengths_and_angles_per_frame() {
        let out = normalize(json!({
            "atoms": { "atom_id": [1] },
            "frames": [
                { "positions": [[0.0, 0.0, 0.0]] },
                { "positions": [[0.0, 0.0, 0.0]] },
            ],
            "cell": {
                "lengths": [[1.0, 1.0, 1.0], [2.0, 2.0, 2.0]],
                "angles": [[90.0, 90.0, 90.0]],
            },
        }))
        .unwrap();
        let frames = &out.payload.coordinates;
        assert_eq!(frames[0].cell.map(|c| c.a), Some(10.0));
        assert_eq!(frames[1].cell, None);
    }

    #[test]
    fn misshapen_frames_are_dropped_not_padded() {
        let out = normalize(json!({
            "atoms": { "atom_id": [1, 2] },
            "frames": [
                { "positions": [[0.0, 0.0, 0.0]] },
                { "positions": [[0.0, 0.0], [1.0, 1.0]] },
                { "positions": [[0.0, 0.0, 0.0], [0.1, 0.1, 0.1]] },
                "garbage",
            ],
        }))
        .unwrap();
        assert_eq!(out.payload.coordinates.len(), 1);
        assert_eq!(out.payload.coordinates[0].time, 2.0);
        let dropped = out
            .degradations
            .iter()
            .filter(|d| {
                matches!(d.reason, DegradationReason::FrameDropped { .. })
            })
            .count();
        assert_eq!(dropped, 3);
    }

    #[test]
    fn coordinates_key_is_a_fallback_for_frames() {
        let out = normalize(json!({
            "atoms": { "atom_id": [1] },
            "coordinates": [{ "positions": [[0.0, 0.0, 0.1]] }],
        }))
        .unwrap();
        assert_eq!(out.payload.coordinates[0].positions, vec![[0.0, 0.0, 1.0]]);
    }

    #[test]
    fn no_atoms_and_no_frames_fail() {
        let err = normalize(json!({ "atoms": {} })).unwrap_err();
        assert!(matches!(err, ViewerError::Payload(PayloadError::NoAtoms)));

        let err = normalize(json!({ "atoms": { "atom_id": [1] } })).unwrap_err();
        assert!(matches!(
            err,
            ViewerError::Payload(PayloadError::NoCoordinates)
        ));
    }

    #[test]
    fn missing_chain_ids_default_for_every_atom() {
        let out = normalize(json!({
            "atoms": { "atom_id": [1, 2, 3] },
            "frames": [{ "positions": [[0, 0, 0], [0, 0, 0], [0, 0, 0]] }],
        }))
        .unwrap();
        assert_eq!(out.payload.atoms.chain_id, vec!["A", "A", "A"]);
        assert_eq!(out.payload.atoms.atom_name, vec!["A1", "A2", "A3"]);
        assert_eq!(out.payload.n_atoms(), 3);
    }

    #[test]
    fn bonds_from_index_arrays_with_order() {
        let out = normalize(json!({
            "atoms": { "atom_id": [1, 2, 3] },
            "frames": [{ "positions": [[0, 0, 0], [0, 0, 0], [0, 0, 0]] }],
            "bonds": { "indexA": [0, 1], "indexB": [1, 2], "order": [1, 2] },
        }))
        .unwrap();
        assert_eq!(
            out.payload.bonds,
            Some(Bonds {
                index_a: vec![0, 1],
                index_b: vec![1, 2],
                order: Some(vec![1, 2]),
            })
        );
    }

    #[test]
    fn bonds_from_pairs_drop_mismatched_order() {
        let out = normalize(json!({
            "atoms": { "atom_id": [1, 2, 3] },
            "frames": [{ "positions": [[0, 0, 0], [0, 0, 0], [0, 0, 0]] }],
            "bonds": { "atom_pairs": [[0, 1], [1, 2]], "order": [1] },
        }))
        .unwrap();
        let bonds = out.payload.bonds.unwrap();
        assert_eq!(bonds.index_a, vec![0, 1]);
        assert_eq!(bonds.index_b, vec![1, 2]);
        assert_eq!(bonds.order, None);
        assert!(out
            .degradations
            .iter()
            .any(|d| d.reason == DegradationReason::BondOrderDropped));
    }

    #[test]
    fn malformed_bonds_are_omitted() {
        let out = normalize(json!({
            "atoms": { "atom_id": [1, 2] },
            "frames": [{ "positions": [[0, 0, 0], [0, 0, 0]] }],
            "bonds": { "atom_pairs": [[0, 1, 1]] },
        }))
        .unwrap();
        assert_eq!(out.payload.bonds, None);

        let out = normalize(json!({
            "atoms": { "atom_id": [1, 2] },
            "frames": [{ "positions": [[0, 0, 0], [0, 0, 0]] }],
            "bonds": { "indexA": [0], "indexB": [5] },
        }))
        .unwrap();
        assert_eq!(out.payload.bonds, None);
    }

    #[test]
    fn payload_serializes_with_wire_names() {
        let out = normalize(json!({
            "atoms": { "atom_id": [1, 2] },
            "frames": [{ "positions": [[0, 0, 0], [0, 0, 0]] }],
            "bonds": { "indexA": [0], "indexB": [1] },
        }))
        .unwrap();
        let wire = serde_json::to_value(&out.payload).unwrap();
        assert_eq!(wire["bonds"], json!({ "indexA": [0], "indexB": [1] }));
        assert!(wire["coordinates"][0].get("cell").is_none());
        assert_eq!(wire["atoms"]["chain_id"], json!(["A", "A"]));
    }
}
