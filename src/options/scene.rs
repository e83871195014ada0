use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::command::ClearSceneOptions;

/// Scene-level defaults.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema,
)]
#[schemars(title = "Scene", inline)]
#[serde(default)]
pub struct SceneOptions {
    /// Layers removed by a bare `clear_scene`.
    pub clear: ClearSceneOptions,
}
