use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::molsys::LengthUnit;

/// Payload normalization settings.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema,
)]
#[schemars(title = "Normalizer", inline)]
#[serde(default)]
pub struct NormalizerOptions {
    /// Unit of bare (unit-less) position and cell-length arrays.
    #[schemars(title = "Raw Length Unit")]
    pub raw_length_unit: LengthUnit,
}
