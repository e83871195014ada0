//! Displacement arrows (cylinder shaft plus cone head).

use serde::{Deserialize, Serialize};

use super::tuples;
use crate::error::ViewerError;
use crate::options::VectorDefaults;

/// Which quantity drives arrow color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorColorMode {
    /// Vector norm.
    #[default]
    Norm,
    /// X component.
    X,
    /// Y component.
    Y,
    /// Z component.
    Z,
}

/// A color map: a front-end palette name or explicit `0xRRGGBB` stops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorMap {
    /// Named palette.
    Named(String),
    /// Explicit color stops.
    Colors(Vec<u32>),
}

/// Displacement arrows as requested by a caller.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct DisplacementRequest {
    /// One `[dx, dy, dz]` per arrow.
    pub displacements: Vec<Vec<f64>>,
    /// Arrow tails, same shape as `displacements`.
    pub origins: Option<Vec<Vec<f64>>>,
    /// Atoms whose positions are the arrow tails, one per arrow.
    pub atom_indices: Option<Vec<usize>>,
    /// Multiplier applied to every arrow length.
    pub length_scale: Option<f64>,
    /// Rescale so the longest arrow has this length.
    pub max_length: Option<f64>,
    /// Skip arrows shorter than this after scaling.
    pub min_length: Option<f64>,
    /// Coloring quantity.
    pub color_mode: Option<VectorColorMode>,
    /// Palette.
    pub color_map: Option<ColorMap>,
    /// Shaft radius.
    pub radius: Option<f64>,
    /// Fraction of the length taken by the head.
    pub head_length_ratio: Option<f64>,
    /// Head radius as a multiple of the shaft radius.
    pub head_radius_factor: Option<f64>,
    /// Opacity.
    pub alpha: Option<f64>,
    /// Front-end state tag.
    pub tag: Option<String>,
    /// Display name in the front-end state tree.
    pub name: Option<String>,
}

/// Wire options of `add_displacement_vectors`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplacementOptions {
    /// Arrow vectors.
    pub displacements: Vec<[f64; 3]>,
    /// Length multiplier.
    pub length_scale: f64,
    /// Minimum drawn length.
    pub min_length: f64,
    /// Shaft radius.
    pub radius: f64,
    /// Head length fraction.
    pub head_length_ratio: f64,
    /// Head radius factor.
    pub head_radius_factor: f64,
    /// Opacity.
    pub alpha: f64,
    /// Coloring quantity.
    pub color_mode: VectorColorMode,
    /// Arrow tails.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origins: Option<Vec<[f64; 3]>>,
    /// Tail atoms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atom_indices: Option<Vec<usize>>,
    /// Longest arrow length.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<f64>,
    /// Palette.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_map: Option<ColorMap>,
    /// Front-end state tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Validate displacement arrows. `None` when there are no displacements.
pub fn build(
    request: &DisplacementRequest,
    defaults: &VectorDefaults,
) -> Result<Option<DisplacementOptions>, ViewerError> {
    let displacements: Vec<[f64; 3]> =
        tuples(&request.displacements, "displacements")?;
    let n = displacements.len();
    if n == 0 {
        return Ok(None);
    }

    let origins: Option<Vec<[f64; 3]>> = request
        .origins
        .as_deref()
        .map(|o| tuples(o, "origins"))
        .transpose()?;
    match (&origins, &request.atom_indices) {
        (None, None) => {
            return Err(ViewerError::validation(
                "one of origins or atom_indices is required",
            ));
        }
        (Some(o), _) if o.len() != n => {
            return Err(ViewerError::validation(format!(
                "origins has {} rows but displacements has {n}",
                o.len()
            )));
        }
        (_, Some(a)) if a.len() != n => {
            return Err(ViewerError::validation(format!(
                "atom_indices has {} entries but displacements has {n}",
                a.len()
            )));
        }
        _ => {}
    }

    Ok(Some(DisplacementOptions {
        displacements,
        length_scale: request.length_scale.unwrap_or(defaults.length_scale),
        min_length: request.min_length.unwrap_or(defaults.min_length),
        radius: request.radius.unwrap_or(defaults.radius),
        head_length_ratio: request
            .head_length_ratio
            .unwrap_or(defaults.head_length_ratio),
        head_radius_factor: request
            .head_radius_factor
            .unwrap_or(defaults.head_radius_factor),
        alpha: request.alpha.unwrap_or(defaults.alpha),
        color_mode: request.color_mode.unwrap_or_default(),
        origins,
        atom_indices: request.atom_indices.clone(),
        max_length: request.max_length,
        color_map: request.color_map.clone(),
        tag: request.tag.clone(),
        name: request.name.clone(),
    }))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn atom_anchored_arrows() {
        let request = DisplacementRequest {
            displacements: vec![vec![1.0, 0.0, 0.0], vec![0.0, 2.0, 0.0]],
            atom_indices: Some(vec![4, 7]),
            color_mode: Some(VectorColorMode::Y),
            color_map: Some(ColorMap::Named("viridis".to_owned())),
            ..DisplacementRequest::default()
        };
        let options = build(&request, &VectorDefaults::default()).unwrap().unwrap();
        assert_eq!(
            serde_json::to_value(options).unwrap(),
            json!({
                "displacements": [[1.0, 0.0, 0.0], [0.0, 2.0, 0.0]],
                "length_scale": 1.0,
                "min_length": 0.0,
                "radius": 0.2,
                "head_length_ratio": 0.25,
                "head_radius_factor": 1.8,
                "alpha": 1.0,
                "color_mode": "y",
                "atom_indices": [4, 7],
                "color_map": "viridis",
            })
        );
    }

    #[test]
    fn origins_must_match_displacements() {
        let request = DisplacementRequest {
            displacements: vec![vec![1.0, 0.0, 0.0]],
            origins: Some(vec![vec![0.0; 3], vec![1.0; 3]]),
            ..DisplacementRequest::default()
        };
        assert!(build(&request, &VectorDefaults::default()).is_err());
    }

    #[test]
    fn needs_an_anchor() {
        let request = DisplacementRequest {
            displacements: vec![vec![1.0, 0.0, 0.0]],
            ..DisplacementRequest::default()
        };
        let err = build(&request, &VectorDefaults::default()).unwrap_err();
        assert!(matches!(err, ViewerError::Validation(_)));
    }

    #[test]
    fn empty_displacements_skip_anchor_check() {
        assert_eq!(
            build(&DisplacementRequest::default(), &VectorDefaults::default())
                .unwrap(),
            None
        );
    }

    #[test]
    fn explicit_palette_and_max_length() {
        let request: DisplacementRequest = serde_json::from_value(json!({
            "displacements": [[0, 0, 1]],
            "origins": [[1, 1, 1]],
            "max_length": 3,
            "color_map": [0xFF0000, 0x0000FF],
        }))
        .unwrap();
        let options = build(&request, &VectorDefaults::default()).unwrap().unwrap();
        assert_eq!(options.origins, Some(vec![[1.0, 1.0, 1.0]]));
        assert_eq!(options.max_length, Some(3.0));
        assert_eq!(
            options.color_map,
            Some(ColorMap::Colors(vec![0xFF0000, 0x0000FF]))
        );
    }
}
