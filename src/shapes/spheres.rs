//! Single spheres, sphere batches and alpha-sphere sets.

use serde::{Deserialize, Serialize};

use super::{non_empty, resolve_opt, resolve_or, tuple, tuples, Broadcast};
use crate::error::ViewerError;
use crate::options::{AlphaSphereSetDefaults, SphereDefaults};

/// One sphere as requested by a caller.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct SphereRequest {
    /// Center `[x, y, z]`; the origin when unset.
    pub center: Option<Vec<f64>>,
    /// Radius.
    pub radius: Option<f64>,
    /// Color as `0xRRGGBB`.
    pub color: Option<u32>,
    /// Opacity in `[0, 1]`.
    pub alpha: Option<f64>,
    /// Front-end state tag.
    pub tag: Option<String>,
}

/// Wire options of `add_sphere`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SphereOptions {
    /// Center in Ångströms.
    pub center: [f64; 3],
    /// Radius.
    pub radius: f64,
    /// Color as `0xRRGGBB`.
    pub color: u32,
    /// Opacity.
    pub alpha: f64,
    /// Front-end state tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// A batch of spheres sharing or varying their style.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct SpheresRequest {
    /// One `[x, y, z]` per sphere.
    pub centers: Vec<Vec<f64>>,
    /// Radius, scalar or one per sphere.
    pub radii: Option<Broadcast<f64>>,
    /// Color, scalar or one per sphere.
    pub colors: Option<Broadcast<u32>>,
    /// Opacity, scalar or one per sphere.
    pub alphas: Option<Broadcast<f64>>,
    /// Tag, scalar or one per sphere.
    pub tags: Option<Broadcast<String>>,
}

/// Pocket alpha-spheres plus, optionally, the atoms they touch.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct AlphaSphereSetRequest {
    /// Alpha-sphere centers.
    pub centers: Vec<Vec<f64>>,
    /// Alpha-sphere radii, one per center.
    pub radii: Vec<f64>,
    /// Contact-atom centers.
    pub atom_centers: Option<Vec<Vec<f64>>>,
    /// Radius of every contact-atom sphere.
    pub atom_radius: Option<f64>,
    /// Alpha-sphere color.
    pub color_alpha_spheres: Option<u32>,
    /// Contact-atom color.
    pub color_atoms: Option<u32>,
    /// Alpha-sphere opacity.
    pub alpha_alpha_spheres: Option<f64>,
    /// Contact-atom opacity.
    pub alpha_atoms: Option<f64>,
    /// Front-end state tag.
    pub tag: Option<String>,
}

/// The alpha-sphere group of an `add_alpha_sphere_set`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlphaSphereGroup {
    /// Sphere centers.
    pub centers: Vec<[f64; 3]>,
    /// Sphere radii, same length as `centers`.
    pub radii: Vec<f64>,
    /// Shared color.
    pub color: u32,
    /// Shared opacity.
    pub alpha: f64,
}

/// The contact-atom group of an `add_alpha_sphere_set`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtomSphereGroup {
    /// Atom centers.
    pub centers: Vec<[f64; 3]>,
    /// Shared radius.
    pub radius: f64,
    /// Shared color.
    pub color: u32,
    /// Shared opacity.
    pub alpha: f64,
}

/// Wire options of `add_alpha_sphere_set`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlphaSphereSetOptions {
    /// The alpha spheres.
    pub alpha_spheres: AlphaSphereGroup,
    /// Contact atoms, when any were given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atom_spheres: Option<AtomSphereGroup>,
    /// Front-end state tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// Validate a single sphere.
pub fn build(
    request: &SphereRequest,
    defaults: &SphereDefaults,
) -> Result<SphereOptions, ViewerError> {
    let center = match &request.center {
        Some(c) => tuple(c, "center", 0)?,
        None => [0.0; 3],
    };
    Ok(SphereOptions {
        center,
        radius: request.radius.unwrap_or(defaults.radius),
        color: request.color.unwrap_or(defaults.color),
        alpha: request.alpha.unwrap_or(defaults.alpha),
        tag: request.tag.clone(),
    })
}

/// Validate a batch; every sphere is checked before any is returned.
pub fn build_many(
    request: &SpheresRequest,
    defaults: &SphereDefaults,
) -> Result<Vec<SphereOptions>, ViewerError> {
    let centers: Vec<[f64; 3]> = tuples(&request.centers, "centers")?;
    let n = centers.len();
    if n == 0 {
        return Ok(Vec::new());
    }
    let radii =
        resolve_or(request.radii.as_ref(), defaults.batch_radius, n, "radii")?;
    let colors =
        resolve_or(request.colors.as_ref(), defaults.color, n, "colors")?;
    let alphas =
        resolve_or(request.alphas.as_ref(), defaults.alpha, n, "alphas")?;
    let tags = resolve_opt(request.tags.as_ref(), n, "tags")?;

    Ok(centers
        .into_iter()
        .enumerate()
        .map(|(i, center)| SphereOptions {
            center,
            radius: radii[i],
            color: colors[i],
            alpha: alphas[i],
            tag: tags.as_ref().map(|t| t[i].clone()),
        })
        .collect())
}

/// Validate an alpha-sphere set. `None` when there are no alpha spheres.
pub fn build_set(
    request: &AlphaSphereSetRequest,
    defaults: &AlphaSphereSetDefaults,
) -> Result<Option<AlphaSphereSetOptions>, ViewerError> {
    let centers: Vec<[f64; 3]> = tuples(&request.centers, "centers")?;
    if centers.len() != request.radii.len() {
        return Err(ViewerError::validation(format!(
            "centers and radii must have the same length ({} vs {})",
            centers.len(),
            request.radii.len()
        )));
    }
    if centers.is_empty() {
        return Ok(None);
    }

    let atom_centers = match &request.atom_centers {
        Some(atoms) => non_empty(tuples(atoms, "atom_centers")?),
        None => None,
    };

    Ok(Some(AlphaSphereSetOptions {
        alpha_spheres: AlphaSphereGroup {
            centers,
            radii: request.radii.clone(),
            color: request.color_alpha_spheres.unwrap_or(defaults.sphere_color),
            alpha: request.alpha_alpha_spheres.unwrap_or(defaults.sphere_alpha),
        },
        atom_spheres: atom_centers.map(|centers| AtomSphereGroup {
            centers,
            radius: request.atom_radius.unwrap_or(defaults.atom_radius),
            color: request.color_atoms.unwrap_or(defaults.atom_color),
            alpha: request.alpha_atoms.unwrap_or(defaults.atom_alpha),
        }),
        tag: request.tag.clone(),
    }))
}
