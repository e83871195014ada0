//! Shape annotations: validation and normalization of user geometry into
//! front-end commands.
//!
//! Each submodule pairs a `*Request` (what a caller supplies, with every
//! styling field optional) with an `*Options` (the exact `options` object the
//! front-end receives). The `build` functions are stateless: they check
//! arity and broadcast lengths, fill unset fields from [`ShapeDefaults`], and
//! return `None` when the primary item list is empty.
//!
//! [`ShapesManager`] binds the builders to a view's message queue.

pub mod links;
pub mod pockets;
pub mod spheres;
pub mod tetrahedra;
pub mod triangles;
pub mod vectors;

pub use links::{LinkColorMode, LinkMode, LinkOptions, LinkRequest, PocketId};
pub use pockets::{
    ClipPlane, MouthIndices, PocketSurfaceOptions, PocketSurfaceRequest,
    SurfaceGrid,
};
use serde::{Deserialize, Serialize};
pub use spheres::{
    AlphaSphereGroup, AlphaSphereSetOptions, AlphaSphereSetRequest,
    AtomSphereGroup, SphereOptions, SphereRequest, SpheresRequest,
};
pub use tetrahedra::{TetrahedraOptions, TetrahedraRequest};
pub use triangles::{TriangleOptions, TriangleRequest, TriangleVertices};
pub use vectors::{
    ColorMap, DisplacementOptions, DisplacementRequest, VectorColorMode,
};

use crate::command::Command;
use crate::error::ViewerError;
use crate::options::ShapeDefaults;
use crate::queue::{MessageQueue, Transport};

// ── Broadcast attributes ─────────────────────────────────────────────────

/// A per-item attribute given either once for every item or as one value
/// per item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Broadcast<T> {
    /// Repeated for every item.
    Scalar(T),
    /// Exactly one value per item.
    List(Vec<T>),
}

impl<T: Clone> Broadcast<T> {
    /// Expand to exactly `n` values.
    ///
    /// A list must already hold `n` values; it is never padded, truncated or
    /// broadcast from a single element.
    pub fn resolve(&self, n: usize, name: &str) -> Result<Vec<T>, ViewerError> {
        match self {
            Self::Scalar(value) => Ok(vec![value.clone(); n]),
            Self::List(values) if values.len() == n => Ok(values.clone()),
            Self::List(values) => Err(ViewerError::validation(format!(
                "{name}: expected {n} values, got {}",
                values.len()
            ))),
        }
    }
}

impl<T> From<T> for Broadcast<T> {
    fn from(value: T) -> Self {
        Self::Scalar(value)
    }
}

impl<T> From<Vec<T>> for Broadcast<T> {
    fn from(values: Vec<T>) -> Self {
        Self::List(values)
    }
}

/// Resolve an optional broadcast attribute, falling back to `default`.
pub(crate) fn resolve_or<T: Clone>(
    attr: Option<&Broadcast<T>>,
    default: T,
    n: usize,
    name: &str,
) -> Result<Vec<T>, ViewerError> {
    attr.map_or_else(|| Ok(vec![default; n]), |a| a.resolve(n, name))
}

/// Resolve an optional broadcast attribute that stays absent when unset.
pub(crate) fn resolve_opt<T: Clone>(
    attr: Option<&Broadcast<T>>,
    n: usize,
    name: &str,
) -> Result<Option<Vec<T>>, ViewerError> {
    attr.map(|a| a.resolve(n, name)).transpose()
}

// ── Arity ────────────────────────────────────────────────────────────────

/// Check one item has exactly `N` elements.
pub(crate) fn tuple<T: Copy, const N: usize>(
    item: &[T],
    name: &str,
    index: usize,
) -> Result<[T; N], ViewerError> {
    <[T; N]>::try_from(item).map_err(|_| {
        ViewerError::validation(format!(
            "{name}[{index}]: expected {N} values, got {}",
            item.len()
        ))
    })
}

/// Check every item has exactly `N` elements.
pub(crate) fn tuples<T: Copy, const N: usize>(
    items: &[Vec<T>],
    name: &str,
) -> Result<Vec<[T; N]>, ViewerError> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| tuple(item, name, i))
        .collect()
}

/// Check every item is a group of `N` points of three coordinates.
pub(crate) fn point_groups<const N: usize>(
    items: &[Vec<Vec<f64>>],
    name: &str,
) -> Result<Vec<[[f64; 3]; N]>, ViewerError> {
    items
        .iter()
        .enumerate()
        .map(|(i, group)| -> Result<[[f64; 3]; N], ViewerError> {
            let points: Vec<[f64; 3]> = tuples(group, name)?;
            <[[f64; 3]; N]>::try_from(points.as_slice()).map_err(|_| {
                ViewerError::validation(format!(
                    "{name}[{i}]: expected {N} points, got {}",
                    group.len()
                ))
            })
        })
        .collect()
}

/// Pick the item count from two alternative geometry sources.
///
/// At least one source must be given. An empty source yields `Ok(0)`; two
/// non-empty sources must agree.
pub(crate) fn geometry_count(
    first: Option<usize>,
    second: Option<usize>,
    names: (&str, &str),
) -> Result<usize, ViewerError> {
    match (first, second) {
        (None, None) => Err(ViewerError::validation(format!(
            "one of {} or {} is required",
            names.0, names.1
        ))),
        (Some(a), Some(b)) if a > 0 && b > 0 && a != b => {
            Err(ViewerError::validation(format!(
                "{} has {a} items but {} has {b}",
                names.0, names.1
            )))
        }
        (a, b) => Ok(a.unwrap_or(0).max(b.unwrap_or(0))),
    }
}

/// A `Some` only when the list is non-empty.
pub(crate) fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    (!items.is_empty()).then_some(items)
}

// ── Requests ─────────────────────────────────────────────────────────────

/// Any shape request, tagged by `kind` for JSON-driven sessions.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeRequest {
    /// One sphere.
    Sphere(SphereRequest),
    /// Many spheres, one command each.
    Spheres(SpheresRequest),
    /// An alpha-sphere set.
    AlphaSphereSet(AlphaSphereSetRequest),
    /// Network links.
    Links(LinkRequest),
    /// Triangle faces.
    TriangleFaces(TriangleRequest),
    /// Tetrahedra.
    Tetrahedra(TetrahedraRequest),
    /// Displacement arrows.
    DisplacementVectors(DisplacementRequest),
    /// Pocket surface.
    PocketSurface(PocketSurfaceRequest),
}

impl ShapeRequest {
    /// Parse a request from JSON. Type errors (non-numeric coordinates,
    /// unknown kinds) are validation errors.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, ViewerError> {
        Self::deserialize(value)
            .map_err(|e| ViewerError::validation(e.to_string()))
    }

    /// Validate and normalize into the commands to send, in order.
    pub fn build(
        &self,
        defaults: &ShapeDefaults,
    ) -> Result<Vec<Command>, ViewerError> {
        let single =
            |cmd: Option<Command>| -> Vec<Command> { cmd.into_iter().collect() };
        Ok(match self {
            Self::Sphere(req) => {
                vec![Command::AddSphere {
                    options: spheres::build(req, &defaults.sphere)?,
                }]
            }
            Self::Spheres(req) => spheres::build_many(req, &defaults.sphere)?
                .into_iter()
                .map(|options| Command::AddSphere { options })
                .collect(),
            Self::AlphaSphereSet(req) => single(
                spheres::build_set(req, &defaults.alpha_sphere_set)?
                    .map(|options| Command::AddAlphaSphereSet { options }),
            ),
            Self::Links(req) => single(
                links::build(req, &defaults.links)?
                    .map(|options| Command::AddNetworkLinks { options }),
            ),
            Self::TriangleFaces(req) => single(
                triangles::build(req, &defaults.triangles)?
                    .map(|options| Command::AddTriangleFaces { options }),
            ),
            Self::Tetrahedra(req) => single(
                tetrahedra::build(req, &defaults.tetrahedra)?
                    .map(|options| Command::AddTetrahedra { options }),
            ),
            Self::DisplacementVectors(req) => single(
                vectors::build(req, &defaults.vectors)?
                    .map(|options| Command::AddDisplacementVectors { options }),
            ),
            Self::PocketSurface(req) => vec![Command::AddPocketSurface {
                options: pockets::build(req)?,
            }],
        })
    }
}

// ── Manager ──────────────────────────────────────────────────────────────

/// Shape API bound to one view's message queue.
///
/// Every method validates its whole request before anything is queued, so
/// a rejected request never leaves a partial batch behind.
#[derive(Debug)]
pub struct ShapesManager<'a, T: Transport> {
    queue: &'a mut MessageQueue<T>,
    defaults: &'a ShapeDefaults,
}

impl<'a, T: Transport> ShapesManager<'a, T> {
    /// Bind to a queue with the given styling defaults.
    pub fn new(
        queue: &'a mut MessageQueue<T>,
        defaults: &'a ShapeDefaults,
    ) -> Self {
        Self { queue, defaults }
    }

    /// Add one sphere.
    pub fn add_sphere(
        &mut self,
        request: &SphereRequest,
    ) -> Result<(), ViewerError> {
        let options = spheres::build(request, &self.defaults.sphere)?;
        self.queue.send(&Command::AddSphere { options })
    }

    /// Add many spheres, one `add_sphere` command each.
    pub fn add_spheres(
        &mut self,
        request: &SpheresRequest,
    ) -> Result<(), ViewerError> {
        let batch = spheres::build_many(request, &self.defaults.sphere)?;
        self.send_all(batch.into_iter().map(|options| Command::AddSphere { options }))
    }

    /// Add an alpha-sphere set in a single command.
    pub fn add_alpha_sphere_set(
        &mut self,
        request: &AlphaSphereSetRequest,
    ) -> Result<(), ViewerError> {
        let options =
            spheres::build_set(request, &self.defaults.alpha_sphere_set)?;
        self.send_all(options.map(|options| Command::AddAlphaSphereSet { options }))
    }

    /// Add cylinders between atom or coordinate pairs.
    pub fn add_links(&mut self, request: &LinkRequest) -> Result<(), ViewerError> {
        let options = links::build(request, &self.defaults.links)?;
        self.send_all(options.map(|options| Command::AddNetworkLinks { options }))
    }

    /// Add triangle faces.
    pub fn add_triangle_faces(
        &mut self,
        request: &TriangleRequest,
    ) -> Result<(), ViewerError> {
        let options = triangles::build(request, &self.defaults.triangles)?;
        self.send_all(options.map(|options| Command::AddTriangleFaces { options }))
    }

    /// Add tetrahedra.
    pub fn add_tetrahedra(
        &mut self,
        request: &TetrahedraRequest,
    ) -> Result<(), ViewerError> {
        let options = tetrahedra::build(request, &self.defaults.tetrahedra)?;
        self.send_all(options.map(|options| Command::AddTetrahedra { options }))
    }

    /// Add displacement arrows.
    pub fn add_displacement_vectors(
        &mut self,
        request: &DisplacementRequest,
    ) -> Result<(), ViewerError> {
        let options = vectors::build(request, &self.defaults.vectors)?;
        self.send_all(
            options.map(|options| Command::AddDisplacementVectors { options }),
        )
    }

    /// Add a pocket surface.
    pub fn add_pocket_surface(
        &mut self,
        request: &PocketSurfaceRequest,
    ) -> Result<(), ViewerError> {
        let options = pockets::build(request)?;
        self.queue.send(&Command::AddPocketSurface { options })
    }

    /// Build and send any request.
    pub fn apply(&mut self, request: &ShapeRequest) -> Result<(), ViewerError> {
        let commands = request.build(self.defaults)?;
        self.send_all(commands)
    }

    fn send_all(
        &mut self,
        commands: impl IntoIterator<Item = Command>,
    ) -> Result<(), ViewerError> {
        let mut sent = 0_usize;
        for command in commands {
            self.queue.send(&command)?;
            sent += 1;
        }
        if sent == 0 {
            log::debug!("empty shape request, nothing sent");
        }
        Ok(())
    }
}
