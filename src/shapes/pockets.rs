//! Pocket and void surfaces wrapped around a set of atoms.

use serde::{Deserialize, Serialize};

use super::vectors::ColorMap;
use crate::error::ViewerError;

/// Surface sampling parameters; unset fields use front-end defaults.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SurfaceGrid {
    /// Grid spacing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<f64>,
    /// Offset added to every atom radius.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius_offset: Option<f64>,
    /// Surface smoothing factor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smoothness: Option<f64>,
}

/// A plane clipping the surface open.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipPlane {
    /// A point on the plane.
    pub point: [f64; 3],
    /// Plane normal.
    pub normal: [f64; 3],
}

/// Pocket mouths: one flat atom list or several.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MouthIndices {
    /// Several mouths.
    Many(Vec<Vec<usize>>),
    /// One mouth.
    Single(Vec<usize>),
}

impl MouthIndices {
    /// Normalize to a list of non-empty mouths.
    pub fn normalize(&self) -> Result<Vec<Vec<usize>>, ViewerError> {
        let mouths = match self {
            Self::Many(mouths) => mouths.clone(),
            Self::Single(mouth) => vec![mouth.clone()],
        };
        if mouths.is_empty() || mouths.iter().any(Vec::is_empty) {
            return Err(ViewerError::validation(
                "mouth_atom_indices entries must not be empty",
            ));
        }
        Ok(mouths)
    }
}

/// A pocket surface as requested by a caller.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct PocketSurfaceRequest {
    /// Atoms lining the pocket. Required and non-empty.
    pub atom_indices: Vec<usize>,
    /// Per-atom values for coloring, one per atom index.
    pub scalars: Option<Vec<f64>>,
    /// Sampling parameters.
    pub grid: Option<SurfaceGrid>,
    /// Opacity.
    pub alpha: Option<f64>,
    /// Palette for `scalars`.
    pub color_map: Option<ColorMap>,
    /// Mouth atoms; takes precedence over `clip_plane`.
    pub mouth_atom_indices: Option<MouthIndices>,
    /// Explicit clipping plane.
    pub clip_plane: Option<ClipPlane>,
}

/// Wire options of `add_pocket_surface`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PocketSurfaceOptions {
    /// Atoms lining the pocket.
    pub atom_indices: Vec<usize>,
    /// Per-atom coloring values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scalars: Option<Vec<f64>>,
    /// Sampling parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<SurfaceGrid>,
    /// Opacity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
    /// Palette.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_map: Option<ColorMap>,
    /// Normalized mouths.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mouth_atom_indices: Option<Vec<Vec<usize>>>,
    /// Clipping plane, only when no mouths were given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip_plane: Option<ClipPlane>,
}

/// Validate a pocket surface. Unlike other shapes, an empty atom list is an
/// error rather than a no-op.
pub fn build(
    request: &PocketSurfaceRequest,
) -> Result<PocketSurfaceOptions, ViewerError> {
    if request.atom_indices.is_empty() {
        return Err(ViewerError::validation(
            "atom_indices is required and cannot be empty",
        ));
    }
    if let Some(scalars) = &request.scalars {
        if scalars.len() != request.atom_indices.len() {
            return Err(ViewerError::validation(format!(
                "scalars has {} values but atom_indices has {}",
                scalars.len(),
                request.atom_indices.len()
            )));
        }
    }
    let mouths = request
        .mouth_atom_indices
        .as_ref()
        .map(MouthIndices::normalize)
        .transpose()?;
    let clip_plane = if mouths.is_some() {
        None
    } else {
        request.clip_plane
    };

    Ok(PocketSurfaceOptions {
        atom_indices: request.atom_indices.clone(),
        scalars: request.scalars.clone(),
        grid: request.grid,
        alpha: request.alpha,
        color_map: request.color_map.clone(),
        mouth_atom_indices: mouths,
        clip_plane,
    })
}
