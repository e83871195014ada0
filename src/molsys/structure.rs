//! PDB and mmCIF reading through `molex`.
//!
//! Structure files are parsed by `foldit_conv::adapters::pdb`, which picks
//! the format from the file extension. Text sources are spilled to a named
//! temporary file first. The parsed coordinates become a viewer document
//! with Ångström positions, a unit cell tagged with its unit, and bonds
//! inferred for small structures.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use foldit_conv::adapters::pdb::structure_file_to_coords;
use foldit_conv::analysis::bonds::{infer_bonds, BondOrder, DEFAULT_TOLERANCE};
use foldit_conv::{Coords, Element};
use serde_json::{json, Map, Value};

use crate::command::StructureFormat;
use crate::error::ViewerError;

/// Larger structures leave bonding to the front-end.
const BOND_INFERENCE_LIMIT: usize = 500;

/// Format implied by a file extension; anything but `.cif`/`.mmcif` is PDB.
#[must_use]
pub fn format_of(path: &Path) -> StructureFormat {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext)
            if ext.eq_ignore_ascii_case("cif")
                || ext.eq_ignore_ascii_case("mmcif") =>
        {
            StructureFormat::Mmcif
        }
        _ => StructureFormat::Pdb,
    }
}

/// Parse a structure file into a viewer document.
pub fn read_file(path: &Path) -> Result<Value, ViewerError> {
    let text = std::fs::read_to_string(path)?;
    let coords = structure_file_to_coords(path).map_err(|e| {
        ViewerError::conversion(format!("{}: {e}", path.display()))
    })?;
    log::debug!("parsed {}: {} atoms", path.display(), coords.num_atoms);
    to_document(&coords, read_cell(&text, format_of(path)))
}

/// Parse structure text of the given format into a viewer document.
pub fn read_text(
    text: &str,
    format: StructureFormat,
) -> Result<Value, ViewerError> {
    let suffix = match format {
        StructureFormat::Pdb => ".pdb",
        StructureFormat::Mmcif => ".cif",
    };
    let mut scratch = tempfile::Builder::new()
        .prefix("molsysviewer-")
        .suffix(suffix)
        .tempfile()?;
    scratch.write_all(text.as_bytes())?;
    scratch.flush()?;
    read_file(scratch.path())
}

// ── Coordinates → document ───────────────────────────────────────────────

fn trimmed(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim().to_owned()
}

/// Chain labels come back either as ASCII bytes or as mapper ordinals.
fn chain_label(id: u8) -> String {
    if id.is_ascii_alphanumeric() {
        char::from(id).to_string()
    } else {
        char::from(b'A' + id % 26).to_string()
    }
}

fn element_label(element: Element, atom_name: &str) -> String {
    if element == Element::Unknown {
        atom_name
            .chars()
            .find(char::is_ascii_alphabetic)
            .map_or_else(
                || "C".to_owned(),
                |c| c.to_ascii_uppercase().to_string(),
            )
    } else {
        format!("{element:?}")
    }
}

fn bond_table(coords: &Coords) -> Option<Value> {
    if coords.num_atoms < 2 || coords.num_atoms > BOND_INFERENCE_LIMIT {
        return None;
    }
    let bonds = infer_bonds(coords, DEFAULT_TOLERANCE);
    if bonds.is_empty() {
        return None;
    }
    let order: Vec<i64> = bonds
        .iter()
        .map(|bond| match bond.order {
            BondOrder::Single => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
            BondOrder::Aromatic => 4,
        })
        .collect();
    let index_a: Vec<usize> = bonds.iter().map(|b| b.atom_a).collect();
    let index_b: Vec<usize> = bonds.iter().map(|b| b.atom_b).collect();
    Some(json!({ "indexA": index_a, "indexB": index_b, "order": order }))
}

fn to_document(
    coords: &Coords,
    cell: Option<Value>,
) -> Result<Value, ViewerError> {
    let n = coords.num_atoms;
    if n == 0 {
        return Err(ViewerError::conversion("structure has no atoms"));
    }

    let atom_name: Vec<String> =
        coords.atom_names.iter().map(|name| trimmed(name)).collect();
    let element_symbol: Vec<String> = atom_name
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let element =
                coords.elements.get(i).copied().unwrap_or(Element::Unknown);
            element_label(element, name)
        })
        .collect();
    let positions: Vec<[f64; 3]> = coords
        .atoms
        .iter()
        .map(|a| [f64::from(a.x), f64::from(a.y), f64::from(a.z)])
        .collect();

    let mut frame = Map::new();
    let _ = frame.insert(
        "positions".to_owned(),
        json!({ "value": positions, "unit": "angstrom" }),
    );
    let _ = frame.insert("time".to_owned(), json!(0));
    if let Some(cell) = cell {
        let _ = frame.insert("cell".to_owned(), cell);
    }

    let atom_id: Vec<usize> = (1..=n).collect();
    let residue_name: Vec<String> =
        coords.res_names.iter().map(|name| trimmed(name)).collect();
    let chain_id: Vec<String> =
        coords.chain_ids.iter().map(|&id| chain_label(id)).collect();

    let mut document = json!({
        "n_atoms": n,
        "atoms": {
            "atom_id": atom_id,
            "atom_name": atom_name,
            "residue_id": coords.res_nums,
            "residue_name": residue_name,
            "chain_id": chain_id,
            "element_symbol": element_symbol,
        },
        "frames": [Value::Object(frame)],
    });
    if let Some(bonds) = bond_table(coords) {
        document["bonds"] = bonds;
    }
    Ok(document)
}

// ── Unit cell ────────────────────────────────────────────────────────────

/// Cell in Ångströms and degrees, tagged with its length unit so it never
/// depends on how bare arrays are interpreted.
fn cell_value(lengths: [f64; 3], angles: [f64; 3]) -> Value {
    json!({
        "a": lengths[0], "b": lengths[1], "c": lengths[2],
        "alpha": angles[0], "beta": angles[1], "gamma": angles[2],
        "unit": "angstrom",
    })
}

fn read_cell(text: &str, format: StructureFormat) -> Option<Value> {
    match format {
        StructureFormat::Pdb => cryst1(text),
        StructureFormat::Mmcif => cif_cell(text),
    }
}

/// The first `CRYST1` record.
fn cryst1(text: &str) -> Option<Value> {
    let line = text.lines().find(|line| line.starts_with("CRYST1"))?;
    let field = |start: usize, end: usize| -> Option<f64> {
        line.get(start..end.min(line.len()))?.trim().parse().ok()
    };
    Some(cell_value(
        [field(6, 15)?, field(15, 24)?, field(24, 33)?],
        [field(33, 40)?, field(40, 47)?, field(47, 54)?],
    ))
}

/// `_cell.length_*` / `_cell.angle_*` items; uncertainties like
/// `40.960(2)` are stripped.
fn cif_cell(text: &str) -> Option<Value> {
    let mut items = HashMap::new();
    for line in text.lines() {
        let mut words = line.split_whitespace();
        if let (Some(key), Some(value)) = (words.next(), words.next()) {
            if let Some(name) = key.strip_prefix("_cell.") {
                let number = value.split('(').next().unwrap_or(value);
                if let Ok(parsed) = number.parse::<f64>() {
                    let _ = items.insert(name.to_owned(), parsed);
                }
            }
        }
    }
    let get = |key: &str| items.get(key).copied();
    Some(cell_value(
        [get("length_a")?, get("length_b")?, get("length_c")?],
        [get("angle_alpha")?, get("angle_beta")?, get("angle_gamma")?],
    ))
}
