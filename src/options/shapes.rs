use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Fallback styling for every shape kind, used when a request leaves a
/// field unset. Colors are `0xRRGGBB`.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[schemars(title = "Shapes", inline)]
#[serde(default)]
pub struct ShapeDefaults {
    /// Single and batched spheres.
    pub sphere: SphereDefaults,
    /// Alpha-sphere sets.
    pub alpha_sphere_set: AlphaSphereSetDefaults,
    /// Network links.
    pub links: LinkDefaults,
    /// Triangle faces.
    pub triangles: TriangleDefaults,
    /// Tetrahedra.
    pub tetrahedra: TetrahedraDefaults,
    /// Displacement arrows.
    pub vectors: VectorDefaults,
}

/// Sphere defaults.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Spheres", inline)]
#[serde(default)]
pub struct SphereDefaults {
    /// Radius of a single sphere.
    #[schemars(title = "Radius", range(min = 0.0))]
    pub radius: f64,
    /// Radius of each sphere in a batch.
    #[schemars(title = "Batch Radius", range(min = 0.0))]
    pub batch_radius: f64,
    /// Fill color.
    pub color: u32,
    /// Opacity.
    #[schemars(title = "Opacity", range(min = 0.0, max = 1.0))]
    pub alpha: f64,
}

impl Default for SphereDefaults {
    fn default() -> Self {
        Self {
            radius: 10.0,
            batch_radius: 1.0,
            color: 0x00FF00,
            alpha: 0.4,
        }
    }
}

/// Alpha-sphere set defaults.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Alpha Spheres", inline)]
#[serde(default)]
pub struct AlphaSphereSetDefaults {
    /// Alpha-sphere color.
    pub sphere_color: u32,
    /// Alpha-sphere opacity.
    #[schemars(range(min = 0.0, max = 1.0))]
    pub sphere_alpha: f64,
    /// Contact-atom color.
    pub atom_color: u32,
    /// Contact-atom opacity.
    #[schemars(range(min = 0.0, max = 1.0))]
    pub atom_alpha: f64,
    /// Contact-atom radius.
    pub atom_radius: f64,
}

impl Default for AlphaSphereSetDefaults {
    fn default() -> Self {
        Self {
            sphere_color: 0x00FF00,
            sphere_alpha: 0.3,
            atom_color: 0x0000FF,
            atom_alpha: 0.5,
            atom_radius: 1.0,
        }
    }
}

/// Link defaults.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Links", inline)]
#[serde(default)]
pub struct LinkDefaults {
    /// Cylinder radius.
    pub radius: f64,
    /// Cylinder color.
    pub color: u32,
    /// Opacity.
    #[schemars(range(min = 0.0, max = 1.0))]
    pub alpha: f64,
}

impl Default for LinkDefaults {
    fn default() -> Self {
        Self {
            radius: 0.2,
            color: 0x4499FF,
            alpha: 1.0,
        }
    }
}

/// Triangle-face defaults.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Triangles", inline)]
#[serde(default)]
pub struct TriangleDefaults {
    /// Face color.
    pub color: u32,
    /// Opacity.
    #[schemars(range(min = 0.0, max = 1.0))]
    pub alpha: f64,
}

impl Default for TriangleDefaults {
    fn default() -> Self {
        Self {
            color: 0xCCCCCC,
            alpha: 1.0,
        }
    }
}

/// Tetrahedron defaults.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Tetrahedra", inline)]
#[serde(default)]
pub struct TetrahedraDefaults {
    /// Face color.
    pub color: u32,
    /// Opacity.
    #[schemars(range(min = 0.0, max = 1.0))]
    pub alpha: f64,
    /// Draw only faces not shared between tetrahedra.
    pub exterior_only: bool,
}

impl Default for TetrahedraDefaults {
    fn default() -> Self {
        Self {
            color: 0xFF8800,
            alpha: 0.6,
            exterior_only: true,
        }
    }
}

/// Displacement-arrow defaults.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Vectors", inline)]
#[serde(default)]
pub struct VectorDefaults {
    /// Multiplier applied to every arrow length.
    pub length_scale: f64,
    /// Arrows shorter than this (after scaling) are skipped.
    pub min_length: f64,
    /// Shaft radius.
    pub radius: f64,
    /// Fraction of the arrow taken by the head.
    #[schemars(range(min = 0.0, max = 1.0))]
    pub head_length_ratio: f64,
    /// Head base radius as a multiple of the shaft radius.
    pub head_radius_factor: f64,
    /// Opacity.
    #[schemars(range(min = 0.0, max = 1.0))]
    pub alpha: f64,
}

impl Default for VectorDefaults {
    fn default() -> Self {
        Self {
            length_scale: 1.0,
            min_length: 0.0,
            radius: 0.2,
            head_length_ratio: 0.25,
            head_radius_factor: 1.8,
            alpha: 1.0,
        }
    }
}
