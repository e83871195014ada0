//! Fallback-chain resolution of per-atom columns.
//!
//! Molecular documents name the same quantity differently depending on the
//! form they were converted from (`residue_id` vs `group_id` vs
//! `component_id`...). Each canonical column lists its source keys in
//! priority order; the first present key wins. A column that is absent,
//! malformed, or of the wrong length is replaced wholesale by a
//! deterministic per-index default and the substitution is recorded.

use std::fmt;

use serde_json::{Map, Value};

use super::AtomTable;

/// What went wrong with one part of the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradationReason {
    /// None of the source keys were present; defaults were used.
    Missing,
    /// The source value was not an array; defaults were used.
    NotAnArray,
    /// The source array had the wrong length; defaults were used.
    LengthMismatch {
        /// Required length.
        expected: usize,
        /// Actual length.
        found: usize,
    },
    /// An element could not be coerced to the column type.
    InvalidElement {
        /// Position of the first bad element.
        index: usize,
    },
    /// A frame had no positions of shape `(n_atoms, 3)` and was skipped.
    FrameDropped {
        /// Index of the frame in the source document.
        frame: usize,
    },
    /// A frame's unit cell was incomplete or non-numeric.
    CellDropped {
        /// Index of the frame in the source document.
        frame: usize,
    },
    /// The bond table was malformed and omitted.
    BondsDropped,
    /// Bond orders did not match the bond count and were omitted.
    BondOrderDropped,
}

/// A recorded, non-fatal normalization fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Degradation {
    /// The column or block affected.
    pub field: &'static str,
    /// What happened to it.
    pub reason: DegradationReason,
}

impl Degradation {
    pub(crate) fn new(field: &'static str, reason: DegradationReason) -> Self {
        Self { field, reason }
    }
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = self.field;
        match self.reason {
            DegradationReason::Missing => {
                write!(f, "{field}: missing, filled with defaults")
            }
            DegradationReason::NotAnArray => {
                write!(f, "{field}: not an array, filled with defaults")
            }
            DegradationReason::LengthMismatch { expected, found } => write!(
                f,
                "{field}: expected {expected} values, found {found}; \
                 filled with defaults"
            ),
            DegradationReason::InvalidElement { index } => write!(
                f,
                "{field}: invalid value at {index}, filled with defaults"
            ),
            DegradationReason::FrameDropped { frame } => {
                write!(f, "{field}: frame {frame} has no usable positions")
            }
            DegradationReason::CellDropped { frame } => {
                write!(f, "{field}: frame {frame} has an incomplete cell")
            }
            DegradationReason::BondsDropped => {
                write!(f, "{field}: malformed bond table omitted")
            }
            DegradationReason::BondOrderDropped => {
                write!(f, "{field}: bond orders do not match bond count")
            }
        }
    }
}

/// Return the first key in `keys` whose value is present and not `null`.
pub fn first_present<'a>(
    block: Option<&'a Map<String, Value>>,
    keys: &[&str],
) -> Option<&'a Value> {
    let block = block?;
    keys.iter()
        .find_map(|key| block.get(*key).filter(|v| !v.is_null()))
}

/// How one canonical column is sourced and defaulted.
pub struct ColumnSpec<T> {
    /// Canonical column name.
    pub name: &'static str,
    /// Source keys in priority order.
    pub keys: &'static [&'static str],
    /// Per-index default.
    pub default: fn(usize) -> T,
    /// Element coercion.
    pub coerce: fn(&Value) -> Option<T>,
}

/// Resolve a column of exactly `n` values, recording any fallback.
pub fn resolve_column<T>(
    block: Option<&Map<String, Value>>,
    spec: &ColumnSpec<T>,
    n: usize,
    report: &mut Vec<Degradation>,
) -> Vec<T> {
    let fill = || (0..n).map(spec.default).collect();

    let Some(value) = first_present(block, spec.keys) else {
        report.push(Degradation::new(spec.name, DegradationReason::Missing));
        return fill();
    };
    let Some(items) = value.as_array() else {
        report.push(Degradation::new(spec.name, DegradationReason::NotAnArray));
        return fill();
    };
    if items.len() != n {
        report.push(Degradation::new(
            spec.name,
            DegradationReason::LengthMismatch {
                expected: n,
                found: items.len(),
            },
        ));
        return fill();
    }

    let coerced: Result<Vec<T>, usize> = items
        .iter()
        .enumerate()
        .map(|(i, v)| (spec.coerce)(v).ok_or(i))
        .collect();
    coerced.unwrap_or_else(|index| {
        report.push(Degradation::new(
            spec.name,
            DegradationReason::InvalidElement { index },
        ));
        fill()
    })
}

// ── Coercions ────────────────────────────────────────────────────────────

/// Integers, integral floats and numeric strings.
pub fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Strings, and numbers rendered as text.
pub fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Numbers and numeric strings.
pub fn coerce_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// ── Atom columns ─────────────────────────────────────────────────────────

const ATOM_ID: ColumnSpec<i64> = ColumnSpec {
    name: "atom_id",
    keys: &["atom_id"],
    default: |i| i as i64 + 1,
    coerce: coerce_int,
};

const ATOM_NAME: ColumnSpec<String> = ColumnSpec {
    name: "atom_name",
    keys: &["atom_name"],
    default: |i| format!("A{}", i + 1),
    coerce: coerce_text,
};

const RESIDUE_ID: ColumnSpec<i64> = ColumnSpec {
    name: "residue_id",
    keys: &["residue_id", "group_id", "group_ig", "component_id"],
    default: |_| 1,
    coerce: coerce_int,
};

const RESIDUE_NAME: ColumnSpec<String> = ColumnSpec {
    name: "residue_name",
    keys: &["residue_name", "group_name", "component_name"],
    default: |_| "RES".to_owned(),
    coerce: coerce_text,
};

const CHAIN_ID: ColumnSpec<String> = ColumnSpec {
    name: "chain_id",
    keys: &["chain_id"],
    default: |_| "A".to_owned(),
    coerce: coerce_text,
};

const ENTITY_ID: ColumnSpec<String> = ColumnSpec {
    name: "entity_id",
    keys: &["entity_id", "molecule_id"],
    default: |_| "1".to_owned(),
    coerce: coerce_text,
};

const ELEMENT_SYMBOL: ColumnSpec<String> = ColumnSpec {
    name: "element_symbol",
    keys: &["element_symbol", "atom_type"],
    default: |_| "C".to_owned(),
    coerce: coerce_text,
};

const FORMAL_CHARGE: ColumnSpec<i64> = ColumnSpec {
    name: "formal_charge",
    keys: &["formal_charge"],
    default: |_| 0,
    coerce: coerce_int,
};

impl AtomTable {
    /// Build a table of `n_atoms` rows from a document's `atoms` block.
    pub fn resolve(
        block: Option<&Map<String, Value>>,
        n_atoms: usize,
        report: &mut Vec<Degradation>,
    ) -> Self {
        Self {
            atom_id: resolve_column(block, &ATOM_ID, n_atoms, report),
            atom_name: resolve_column(block, &ATOM_NAME, n_atoms, report),
            residue_id: resolve_column(block, &RESIDUE_ID, n_atoms, report),
            residue_name: resolve_column(block, &RESIDUE_NAME, n_atoms, report),
            chain_id: resolve_column(block, &CHAIN_ID, n_atoms, report),
            entity_id: resolve_column(block, &ENTITY_ID, n_atoms, report),
            element_symbol: resolve_column(
                block,
                &ELEMENT_SYMBOL,
                n_atoms,
                report,
            ),
            formal_charge: resolve_column(
                block,
                &FORMAL_CHARGE,
                n_atoms,
                report,
            ),
        }
    }
}
