//! Viewer-controller options with TOML preset support.
//!
//! All tweakable settings (raw-unit assumptions, shape styling defaults,
//! scene-clearing defaults) are consolidated here. Options serialize to/from
//! TOML so a session can be configured from a preset file.

mod normalizer;
mod scene;
mod shapes;

use std::path::Path;

pub use normalizer::NormalizerOptions;
pub use scene::SceneOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
pub use shapes::{
    AlphaSphereSetDefaults, LinkDefaults, ShapeDefaults, SphereDefaults,
    TetrahedraDefaults, TriangleDefaults, VectorDefaults,
};

use crate::error::ViewerError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[shapes.links]`) work correctly.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Payload normalization.
    pub normalizer: NormalizerOptions,
    /// Shape styling defaults.
    pub shapes: ShapeDefaults,
    /// Scene command defaults.
    pub scene: SceneOptions,
}

impl Options {
    /// Generate JSON Schema describing the options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Parse options from TOML text. Missing fields use defaults.
    pub fn from_toml(content: &str) -> Result<Self, ViewerError> {
        toml::from_str(content)
            .map_err(|e| ViewerError::OptionsParse(e.to_string()))
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, ViewerError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), ViewerError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ViewerError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::molsys::LengthUnit;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: Options = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r#"
[normalizer]
raw_length_unit = "angstrom"

[shapes.links]
radius = 0.5
"#;
        let opts = Options::from_toml(toml_str).unwrap();
        assert_eq!(opts.normalizer.raw_length_unit, LengthUnit::Angstrom);
        assert_eq!(opts.shapes.links.radius, 0.5);
        // Everything else should be default
        assert_eq!(opts.shapes.links.color, 0x4499FF);
        assert_eq!(opts.shapes.sphere, SphereDefaults::default());
        assert!(opts.scene.clear.shapes);
    }

    #[test]
    fn bad_toml_is_an_options_error() {
        let err = Options::from_toml("[normalizer]\nraw_length_unit = 3")
            .unwrap_err();
        assert!(matches!(err, ViewerError::OptionsParse(_)));
    }

    #[test]
    fn save_then_load_and_list() {
        let dir = std::env::temp_dir()
            .join(format!("molsysviewer-presets-{}", std::process::id()));
        let mut opts = Options::default();
        opts.shapes.tetrahedra.exterior_only = false;
        opts.save(&dir.join("open.toml")).unwrap();
        Options::default().save(&dir.join("base.toml")).unwrap();

        assert_eq!(Options::load(&dir.join("open.toml")).unwrap(), opts);
        assert_eq!(Options::list_presets(&dir), vec!["base", "open"]);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn schema_has_expected_properties() {
        let schema_value =
            serde_json::to_value(Options::json_schema()).unwrap();
        let props = schema_value["properties"].as_object().unwrap();
        assert!(props.contains_key("normalizer"));
        assert!(props.contains_key("shapes"));
        assert!(props.contains_key("scene"));

        let shapes = &props["shapes"]["properties"];
        assert!(shapes.get("sphere").is_some());
        assert!(shapes.get("vectors").is_some());
    }
}
