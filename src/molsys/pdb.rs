//! Fixed-column PDB writer for the plain-text fallback sent when no
//! canonical payload can be built. Reading goes through `molex`, see
//! [`super::structure`].

use std::fmt::{self, Write};

use crate::error::ViewerError;
use crate::payload::{AtomTable, Bonds, Frame};

/// PDB convention: one-letter elements start in the second name column.
fn format_atom_name(name: &str, element: &str) -> String {
    let name = name.trim();
    if name.len() >= 4 {
        name.chars().take(4).collect()
    } else if element.len() == 1 && !name.starts_with(char::is_numeric) {
        format!(" {name:<3}")
    } else {
        format!("{name:<4}")
    }
}

/// The charge field is two columns wide; magnitudes above 9 are clamped.
fn format_charge(charge: i64) -> String {
    match charge.clamp(-9, 9) {
        0 => "  ".to_owned(),
        c if c > 0 => format!("{c}+"),
        c => format!("{}-", c.unsigned_abs()),
    }
}

fn clip(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

fn write_records(
    out: &mut String,
    atoms: &AtomTable,
    frame: &Frame,
    bonds: Option<&Bonds>,
) -> fmt::Result {
    if let Some(cell) = &frame.cell {
        writeln!(
            out,
            "CRYST1{:9.3}{:9.3}{:9.3}{:7.2}{:7.2}{:7.2} P 1           1",
            cell.a, cell.b, cell.c, cell.alpha, cell.beta, cell.gamma
        )?;
    }

    let mut serial = 1_usize;
    let mut serials = Vec::with_capacity(atoms.len());
    for (i, [x, y, z]) in frame.positions.iter().enumerate() {
        if i > 0 && atoms.chain_id[i] != atoms.chain_id[i - 1] {
            write_ter(out, serial, atoms, i - 1)?;
            serial += 1;
        }
        writeln!(
            out,
            "ATOM  {:5} {:4} {:3} {:1}{:4}    {:8.3}{:8.3}{:8.3}{:6.2}{:6.2}          {:>2}{}",
            serial % 100_000,
            format_atom_name(&atoms.atom_name[i], &atoms.element_symbol[i]),
            clip(&atoms.residue_name[i], 3),
            clip(&atoms.chain_id[i], 1),
            atoms.residue_id[i],
            x,
            y,
            z,
            1.0,
            0.0,
            clip(&atoms.element_symbol[i], 2),
            format_charge(atoms.formal_charge[i]),
        )?;
        serials.push(serial);
        serial += 1;
    }
    if !atoms.is_empty() {
        write_ter(out, serial, atoms, atoms.len() - 1)?;
    }

    if let Some(bonds) = bonds {
        let mut partners: Vec<Vec<usize>> = vec![Vec::new(); atoms.len()];
        for (&a, &b) in bonds.index_a.iter().zip(&bonds.index_b) {
            partners[a].push(b);
            partners[b].push(a);
        }
        for (atom, bonded) in partners.iter().enumerate() {
            for chunk in bonded.chunks(4) {
                write!(out, "CONECT{:5}", serials[atom])?;
                for &partner in chunk {
                    write!(out, "{:5}", serials[partner])?;
                }
                writeln!(out)?;
            }
        }
    }
    writeln!(out, "END")
}

fn write_ter(
    out: &mut String,
    serial: usize,
    atoms: &AtomTable,
    last: usize,
) -> fmt::Result {
    writeln!(
        out,
        "TER   {:5}      {:3} {:1}{:4}",
        serial % 100_000,
        clip(&atoms.residue_name[last], 3),
        clip(&atoms.chain_id[last], 1),
        atoms.residue_id[last]
    )
}

/// Render one frame of a canonical payload as PDB text.
///
/// Serials are assigned in write order, `TER` records included, and
/// `CONECT` records refer to those serials.
pub fn write(
    atoms: &AtomTable,
    frame: &Frame,
    bonds: Option<&Bonds>,
) -> Result<String, ViewerError> {
    let mut out = String::new();
    write_records(&mut out, atoms, frame, bonds)
        .map_err(|e| ViewerError::conversion(format!("PDB export failed: {e}")))?;
    Ok(out)
}
