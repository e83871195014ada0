//! Cylinders connecting atom pairs or explicit coordinate pairs.

use serde::{Deserialize, Serialize};

use super::{
    geometry_count, non_empty, point_groups, resolve_opt, resolve_or, tuples,
    Broadcast,
};
use crate::error::ViewerError;
use crate::options::LinkDefaults;

/// Which geometry source the front-end reads link endpoints from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkMode {
    /// Endpoints are atoms of the loaded structure.
    #[serde(rename = "atom-indices")]
    AtomIndices,
    /// Endpoints are explicit coordinates.
    #[serde(rename = "coordinates")]
    Coordinates,
}

/// How links are colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkColorMode {
    /// Per-link `colors`.
    #[default]
    Link,
    /// By `pocket_ids`.
    Pocket,
    /// By `chain_ids`.
    Chain,
}

/// Pocket identifiers may be numbers or names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PocketId {
    /// Numeric pocket id.
    Number(i64),
    /// Named pocket.
    Name(String),
}

/// Links as requested by a caller.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct LinkRequest {
    /// Zero-based atom index pairs.
    pub atom_pairs: Option<Vec<Vec<usize>>>,
    /// `[[x1, y1, z1], [x2, y2, z2]]` per link.
    pub coordinate_pairs: Option<Vec<Vec<Vec<f64>>>>,
    /// Cylinder radius, scalar or per link.
    pub radii: Option<Broadcast<f64>>,
    /// Color, scalar or per link.
    pub colors: Option<Broadcast<u32>>,
    /// Pocket of each link, for [`LinkColorMode::Pocket`].
    pub pocket_ids: Option<Broadcast<PocketId>>,
    /// Chain of each link, for [`LinkColorMode::Chain`].
    pub chain_ids: Option<Broadcast<String>>,
    /// Coloring scheme.
    pub color_mode: Option<LinkColorMode>,
    /// Global opacity.
    pub alpha: Option<f64>,
    /// Radial segments per cylinder (at least 3).
    pub radial_segments: Option<u32>,
    /// Front-end state tag.
    pub tag: Option<String>,
}

/// Wire options of `add_network_links`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkOptions {
    /// Endpoint source.
    pub mode: LinkMode,
    /// Global opacity.
    pub alpha: f64,
    /// Coloring scheme.
    pub color_mode: LinkColorMode,
    /// Atom index pairs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atom_pairs: Option<Vec<[usize; 2]>>,
    /// Coordinate pairs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinate_pairs: Option<Vec<[[f64; 3]; 2]>>,
    /// One radius per link.
    pub radii: Vec<f64>,
    /// One color per link.
    pub colors: Vec<u32>,
    /// One pocket id per link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pocket_ids: Option<Vec<PocketId>>,
    /// One chain id per link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_ids: Option<Vec<String>>,
    /// Radial segments per cylinder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radial_segments: Option<u32>,
    /// Front-end state tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// Validate links. `None` when the given pair lists are empty.
///
/// When both sources are supplied, coordinates drive the link count and the
/// atom pairs must match it.
pub fn build(
    request: &LinkRequest,
    defaults: &LinkDefaults,
) -> Result<Option<LinkOptions>, ViewerError> {
    let atom_pairs: Option<Vec<[usize; 2]>> = request
        .atom_pairs
        .as_deref()
        .map(|p| tuples(p, "atom_pairs"))
        .transpose()?;
    let coordinate_pairs: Option<Vec<[[f64; 3]; 2]>> = request
        .coordinate_pairs
        .as_deref()
        .map(|p| point_groups(p, "coordinate_pairs"))
        .transpose()?;

    let n = geometry_count(
        coordinate_pairs.as_ref().map(Vec::len),
        atom_pairs.as_ref().map(Vec::len),
        ("coordinate_pairs", "atom_pairs"),
    )?;
    if n == 0 {
        return Ok(None);
    }
    if let Some(segments) = request.radial_segments {
        if segments < 3 {
            return Err(ViewerError::validation(format!(
                "radial_segments must be at least 3, got {segments}"
            )));
        }
    }

    let atom_pairs = atom_pairs.and_then(non_empty);
    let mode = if atom_pairs.is_some() {
        LinkMode::AtomIndices
    } else {
        LinkMode::Coordinates
    };

    Ok(Some(LinkOptions {
        mode,
        alpha: request.alpha.unwrap_or(defaults.alpha),
        color_mode: request.color_mode.unwrap_or_default(),
        atom_pairs,
        coordinate_pairs: coordinate_pairs.and_then(non_empty),
        radii: resolve_or(request.radii.as_ref(), defaults.radius, n, "radii")?,
        colors: resolve_or(request.colors.as_ref(), defaults.color, n, "colors")?,
        pocket_ids: resolve_opt(request.pocket_ids.as_ref(), n, "pocket_ids")?,
        chain_ids: resolve_opt(request.chain_ids.as_ref(), n, "chain_ids")?,
        radial_segments: request.radial_segments,
        tag: request.tag.clone(),
    }))
}
