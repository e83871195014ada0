//! Canonical atom/coordinate/bond payload sent to the front-end.
//!
//! The payload is what the front-end builds a native structure from. Its
//! invariants are enforced at construction by the [`Normalizer`]:
//!
//! - every atom column has exactly `n_atoms` entries;
//! - every frame carries `n_atoms` positions, in Ångströms;
//! - bond index arrays have equal length.

pub mod fields;
pub mod normalize;

pub use fields::{Degradation, DegradationReason};
pub use normalize::{Normalized, Normalizer};
use serde::Serialize;

/// Normalized molecular system, ready for `load_molsys_payload`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalPayload {
    /// Per-atom columns.
    pub atoms: AtomTable,
    /// One entry per surviving frame.
    pub coordinates: Vec<Frame>,
    /// Covalent bonds, if the system had any usable bond table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bonds: Option<Bonds>,
}

impl CanonicalPayload {
    /// Number of atoms described by the payload.
    #[must_use]
    pub fn n_atoms(&self) -> usize {
        self.atoms.len()
    }
}

/// Column-oriented atom table. All columns share one length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtomTable {
    /// Serial atom identifiers.
    pub atom_id: Vec<i64>,
    /// Atom names (e.g. `"CA"`).
    pub atom_name: Vec<String>,
    /// Residue (group) sequence numbers.
    pub residue_id: Vec<i64>,
    /// Residue (group) names (e.g. `"ALA"`).
    pub residue_name: Vec<String>,
    /// Chain identifiers.
    pub chain_id: Vec<String>,
    /// Entity (molecule) identifiers.
    pub entity_id: Vec<String>,
    /// Element symbols.
    pub element_symbol: Vec<String>,
    /// Formal charges.
    pub formal_charge: Vec<i64>,
}

impl AtomTable {
    /// Number of atoms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.atom_id.len()
    }

    /// Whether the table has no atoms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.atom_id.is_empty()
    }
}

/// One coordinate frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    /// Atom positions in Ångströms, in atom order.
    pub positions: Vec<[f64; 3]>,
    /// Frame time as reported by the source (index when absent).
    pub time: f64,
    /// Periodic box, when both lengths and angles are known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell: Option<UnitCell>,
}

/// Unit-cell parameters: lengths in Ångströms, angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UnitCell {
    /// Length of the first cell vector.
    pub a: f64,
    /// Length of the second cell vector.
    pub b: f64,
    /// Length of the third cell vector.
    pub c: f64,
    /// Angle between `b` and `c`.
    pub alpha: f64,
    /// Angle between `a` and `c`.
    pub beta: f64,
    /// Angle between `a` and `b`.
    pub gamma: f64,
}

/// Bond table as parallel index arrays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bonds {
    /// First atom of each bond.
    #[serde(rename = "indexA")]
    pub index_a: Vec<usize>,
    /// Second atom of each bond.
    #[serde(rename = "indexB")]
    pub index_b: Vec<usize>,
    /// Bond orders, present only when one per bond was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Vec<i64>>,
}

impl Bonds {
    /// Number of bonds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index_a.len()
    }

    /// Whether there are no bonds.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index_a.is_empty()
    }
}
