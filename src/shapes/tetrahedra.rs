//! Tetrahedra drawn as triangle meshes.

use serde::{Deserialize, Serialize};

use super::{
    geometry_count, non_empty, point_groups, resolve_opt, resolve_or, tuples,
    Broadcast,
};
use crate::error::ViewerError;
use crate::options::TetrahedraDefaults;

/// Tetrahedra as requested by a caller.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct TetrahedraRequest {
    /// Four `[x, y, z]` vertices per tetrahedron.
    pub tetra_coords: Option<Vec<Vec<Vec<f64>>>>,
    /// Zero-based atom index quads.
    pub atom_quads: Option<Vec<Vec<usize>>>,
    /// Color, scalar or per tetrahedron.
    pub colors: Option<Broadcast<u32>>,
    /// Opacity, scalar or per tetrahedron.
    pub alphas: Option<Broadcast<f64>>,
    /// Label, scalar or per tetrahedron.
    pub labels: Option<Broadcast<String>>,
    /// Draw only faces not shared between tetrahedra.
    pub exterior_only: Option<bool>,
    /// Force every face to be drawn.
    pub show_all_faces: Option<bool>,
    /// Front-end state tag.
    pub tag: Option<String>,
    /// Display name in the front-end state tree.
    pub name: Option<String>,
}

/// Wire options of `add_tetrahedra`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TetrahedraOptions {
    /// Draw only exterior faces.
    pub exterior_only: bool,
    /// Force every face to be drawn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_all_faces: Option<bool>,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Explicit tetrahedra.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tetra_coords: Option<Vec<[[f64; 3]; 4]>>,
    /// Atom index quads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atom_quads: Option<Vec<[usize; 4]>>,
    /// One color per tetrahedron.
    pub colors: Vec<u32>,
    /// One opacity per tetrahedron.
    pub alphas: Vec<f64>,
    /// One label per tetrahedron.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    /// Front-end state tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// Validate tetrahedra. `None` when the given lists are empty.
pub fn build(
    request: &TetrahedraRequest,
    defaults: &TetrahedraDefaults,
) -> Result<Option<TetrahedraOptions>, ViewerError> {
    let tetra_coords: Option<Vec<[[f64; 3]; 4]>> = request
        .tetra_coords
        .as_deref()
        .map(|t| point_groups(t, "tetra_coords"))
        .transpose()?;
    let atom_quads: Option<Vec<[usize; 4]>> = request
        .atom_quads
        .as_deref()
        .map(|q| tuples(q, "atom_quads"))
        .transpose()?;

    let n = geometry_count(
        tetra_coords.as_ref().map(Vec::len),
        atom_quads.as_ref().map(Vec::len),
        ("tetra_coords", "atom_quads"),
    )?;
    if n == 0 {
        return Ok(None);
    }

    Ok(Some(TetrahedraOptions {
        exterior_only: request.exterior_only.unwrap_or(defaults.exterior_only),
        show_all_faces: request.show_all_faces,
        name: request.name.clone(),
        tetra_coords: tetra_coords.and_then(non_empty),
        atom_quads: atom_quads.and_then(non_empty),
        colors: resolve_or(request.colors.as_ref(), defaults.color, n, "colors")?,
        alphas: resolve_or(request.alphas.as_ref(), defaults.alpha, n, "alphas")?,
        labels: resolve_opt(request.labels.as_ref(), n, "labels")?,
        tag: request.tag.clone(),
    }))
}
