//! Free-standing triangle faces.

use serde::{Deserialize, Serialize};

use super::{
    geometry_count, non_empty, resolve_opt, resolve_or, tuple, tuples,
    Broadcast,
};
use crate::error::ViewerError;
use crate::options::TriangleDefaults;

/// One triangle: three points, or nine flat coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TriangleVertices {
    /// `[[x1, y1, z1], [x2, y2, z2], [x3, y3, z3]]`.
    Points(Vec<Vec<f64>>),
    /// `[x1, y1, z1, x2, y2, z2, x3, y3, z3]`.
    Flat(Vec<f64>),
}

impl TriangleVertices {
    fn corners(&self, index: usize) -> Result<[[f64; 3]; 3], ViewerError> {
        match self {
            Self::Points(points) if points.len() == 3 => Ok([
                tuple(&points[0], "vertices", index)?,
                tuple(&points[1], "vertices", index)?,
                tuple(&points[2], "vertices", index)?,
            ]),
            Self::Flat(flat) => {
                let [x1, y1, z1, x2, y2, z2, x3, y3, z3]: [f64; 9] =
                    tuple(flat, "vertices", index)?;
                Ok([[x1, y1, z1], [x2, y2, z2], [x3, y3, z3]])
            }
            Self::Points(points) => Err(ViewerError::validation(format!(
                "vertices[{index}]: expected 3 points or 9 numbers, got {} points",
                points.len()
            ))),
        }
    }
}

/// Triangle faces as requested by a caller.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct TriangleRequest {
    /// Explicit triangles.
    pub vertices: Option<Vec<TriangleVertices>>,
    /// Zero-based atom index triplets.
    pub atom_triplets: Option<Vec<Vec<usize>>>,
    /// Color, scalar or per face.
    pub colors: Option<Broadcast<u32>>,
    /// Global opacity.
    pub alpha: Option<f64>,
    /// Label, scalar or per face.
    pub labels: Option<Broadcast<String>>,
    /// Front-end state tag.
    pub tag: Option<String>,
}

/// Wire options of `add_triangle_faces`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriangleOptions {
    /// Global opacity.
    pub alpha: f64,
    /// Explicit triangles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertices: Option<Vec<[[f64; 3]; 3]>>,
    /// Atom index triplets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atom_triplets: Option<Vec<[usize; 3]>>,
    /// One color per face.
    pub colors: Vec<u32>,
    /// One label per face.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    /// Front-end state tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// Validate triangle faces. `None` when the given lists are empty.
pub fn build(
    request: &TriangleRequest,
    defaults: &TriangleDefaults,
) -> Result<Option<TriangleOptions>, ViewerError> {
    let vertices = request
        .vertices
        .as_deref()
        .map(|tris| {
            tris.iter()
                .enumerate()
                .map(|(i, tri)| tri.corners(i))
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?;
    let atom_triplets: Option<Vec<[usize; 3]>> = request
        .atom_triplets
        .as_deref()
        .map(|t| tuples(t, "atom_triplets"))
        .transpose()?;

    let n = geometry_count(
        vertices.as_ref().map(Vec::len),
        atom_triplets.as_ref().map(Vec::len),
        ("vertices", "atom_triplets"),
    )?;
    if n == 0 {
        return Ok(None);
    }

    Ok(Some(TriangleOptions {
        alpha: request.alpha.unwrap_or(defaults.alpha),
        vertices: vertices.and_then(non_empty),
        atom_triplets: atom_triplets.and_then(non_empty),
        colors: resolve_or(request.colors.as_ref(), defaults.color, n, "colors")?,
        labels: resolve_opt(request.labels.as_ref(), n, "labels")?,
        tag: request.tag.clone(),
    }))
}
