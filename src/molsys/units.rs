//! Length units and the raw-vs-unitful position encodings.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Length units a molecular document may carry.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Default,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum LengthUnit {
    /// Nanometres (the molecular-data library's native unit).
    #[default]
    Nanometer,
    /// Ångströms (the front-end's unit).
    Angstrom,
    /// Picometres.
    Picometer,
}

impl LengthUnit {
    /// Parse a unit name as it appears in quantity objects.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "nm" | "nanometer" | "nanometers" | "nanometre" | "nanometres" => {
                Some(Self::Nanometer)
            }
            "a" | "å" | "Å" | "angstrom" | "angstroms" => Some(Self::Angstrom),
            "pm" | "picometer" | "picometers" | "picometre" | "picometres" => {
                Some(Self::Picometer)
            }
            _ => None,
        }
    }

    /// Multiplier taking a value in this unit to Ångströms.
    #[must_use]
    pub fn angstroms_per_unit(self) -> f64 {
        match self {
            Self::Nanometer => 10.0,
            Self::Angstrom => 1.0,
            Self::Picometer => 0.01,
        }
    }
}

/// The two ways a document encodes a coordinate block.
///
/// A bare array is in the document's raw unit; an object with `value` and
/// `unit` keys is a physical quantity converted through the owning system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PositionData<'a> {
    /// Plain nested array in the raw length unit.
    Raw(&'a serde_json::Value),
    /// `{ "value": [...], "unit": "..." }`.
    Quantity {
        /// The magnitude array.
        value: &'a serde_json::Value,
        /// Unit name, resolved by the molecular-data library.
        unit: &'a str,
    },
}

impl<'a> PositionData<'a> {
    /// Classify a JSON value, or `None` if it is neither encoding.
    #[must_use]
    pub fn classify(value: &'a serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Array(_) => Some(Self::Raw(value)),
            serde_json::Value::Object(map) => {
                let magnitude = map.get("value")?;
                let unit = map.get("unit")?.as_str()?;
                Some(Self::Quantity {
                    value: magnitude,
                    unit,
                })
            }
            _ => None,
        }
    }

    /// The magnitude array regardless of encoding.
    #[must_use]
    pub fn magnitudes(&self) -> &'a serde_json::Value {
        match *self {
            Self::Raw(value) | Self::Quantity { value, .. } => value,
        }
    }
}
