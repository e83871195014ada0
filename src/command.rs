//! The front-end's complete command vocabulary.
//!
//! Every operation the rendering front-end understands is represented as a
//! [`Command`]. Views construct commands and hand them to the
//! [`MessageQueue`](crate::queue::MessageQueue); the wire form is a JSON
//! object tagged by its `op` field:
//!
//! ```
//! # use molsysviewer::command::Command;
//! let msg = Command::ResetView.to_message().unwrap();
//! assert_eq!(msg, serde_json::json!({ "op": "reset_view" }));
//! ```

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ViewerError;
use crate::payload::CanonicalPayload;
use crate::shapes::{
    AlphaSphereSetOptions, DisplacementOptions, LinkOptions,
    PocketSurfaceOptions, SphereOptions, TetrahedraOptions, TriangleOptions,
};

// ── Command payload types ────────────────────────────────────────────────

/// Plain-text structure formats the front-end can parse itself.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum StructureFormat {
    /// Legacy PDB fixed-column text.
    Pdb,
    /// PDBx/mmCIF text.
    Mmcif,
}

/// Options of an `update_visibility` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisibilityOptions {
    /// Zero-based indices of the visible atoms, ascending.
    pub visible_atom_indices: Vec<usize>,
}

/// Which layers a `clear_scene` command removes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema,
)]
#[schemars(title = "Clear Scene", inline)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct ClearSceneOptions {
    /// Remove user-added shapes.
    #[schemars(title = "Shapes")]
    pub shapes: bool,
    /// Remove representation styles.
    #[schemars(title = "Styles")]
    pub styles: bool,
    /// Remove labels.
    #[schemars(title = "Labels")]
    pub labels: bool,
}

impl Default for ClearSceneOptions {
    fn default() -> Self {
        Self {
            shapes: true,
            styles: false,
            labels: true,
        }
    }
}

// ── Commands ─────────────────────────────────────────────────────────────

/// A single instruction for the rendering front-end.
///
/// Commands are immutable once built. Optional fields are omitted from the
/// wire form rather than sent as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    // ── Structure loading ───────────────────────────────────────────
    /// Parse a structure from in-memory text.
    LoadStructureFromString {
        /// Text format of `data`.
        format: StructureFormat,
        /// The structure file contents.
        data: String,
        /// Display label for the structure.
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },

    /// Fetch and parse a structure from a URL (fetched by the front-end).
    LoadStructureFromUrl {
        /// Resource location.
        url: String,
        /// Format hint; the front-end infers it from the URL when absent.
        #[serde(skip_serializing_if = "Option::is_none")]
        format: Option<String>,
        /// Display label for the structure.
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },

    /// Fetch a structure from the PDB archive by identifier.
    LoadPdbId {
        /// Lowercased PDB identifier.
        pdb_id: String,
        /// Display label for the structure.
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },

    /// Build a structure natively from a normalized payload.
    LoadMolsysPayload {
        /// Atoms, frames and bonds.
        payload: CanonicalPayload,
        /// Display label for the structure.
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },

    // ── Visibility & scene ──────────────────────────────────────────
    /// Replace the set of rendered atoms.
    UpdateVisibility {
        /// Visible atom indices.
        options: VisibilityOptions,
    },

    /// Remove selected layers from the scene.
    ClearScene {
        /// Layers to remove.
        options: ClearSceneOptions,
    },

    /// Remove everything, structures included.
    ClearAll,

    /// Reset the camera to fit the scene.
    ResetView,

    // ── Shapes ──────────────────────────────────────────────────────
    /// One (possibly transparent) sphere.
    AddSphere {
        /// Sphere geometry and style.
        options: SphereOptions,
    },

    /// A set of pocket alpha-spheres plus optional contact atoms.
    AddAlphaSphereSet {
        /// Alpha-sphere and atom-sphere groups.
        options: AlphaSphereSetOptions,
    },

    /// Cylinders linking atom or coordinate pairs.
    AddNetworkLinks {
        /// Link geometry and style.
        options: LinkOptions,
    },

    /// Arrows for per-point displacement vectors.
    AddDisplacementVectors {
        /// Arrow geometry and style.
        options: DisplacementOptions,
    },

    /// Free-standing triangle faces.
    AddTriangleFaces {
        /// Triangle geometry and style.
        options: TriangleOptions,
    },

    /// Tetrahedra rendered as triangle meshes.
    AddTetrahedra {
        /// Tetrahedron geometry and style.
        options: TetrahedraOptions,
    },

    /// A pocket/void surface wrapped around a set of atoms.
    AddPocketSurface {
        /// Surface atoms and style.
        options: PocketSurfaceOptions,
    },
}

impl Command {
    /// The wire opcode, as sent in the `op` field.
    #[must_use]
    pub fn op(&self) -> &'static str {
        match self {
            Self::LoadStructureFromString { .. } => "load_structure_from_string",
            Self::LoadStructureFromUrl { .. } => "load_structure_from_url",
            Self::LoadPdbId { .. } => "load_pdb_id",
            Self::LoadMolsysPayload { .. } => "load_molsys_payload",
            Self::UpdateVisibility { .. } => "update_visibility",
            Self::ClearScene { .. } => "clear_scene",
            Self::ClearAll => "clear_all",
            Self::ResetView => "reset_view",
            Self::AddSphere { .. } => "add_sphere",
            Self::AddAlphaSphereSet { .. } => "add_alpha_sphere_set",
            Self::AddNetworkLinks { .. } => "add_network_links",
            Self::AddDisplacementVectors { .. } => "add_displacement_vectors",
            Self::AddTriangleFaces { .. } => "add_triangle_faces",
            Self::AddTetrahedra { .. } => "add_tetrahedra",
            Self::AddPocketSurface { .. } => "add_pocket_surface",
        }
    }

    /// Serialize into the JSON message the front-end receives.
    pub fn to_message(&self) -> Result<serde_json::Value, ViewerError> {
        serde_json::to_value(self).map_err(|e| {
            ViewerError::Transport(format!("cannot encode {}: {e}", self.op()))
        })
    }
}

// ── Inbound events ───────────────────────────────────────────────────────

/// Events sent from the front-end back to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontendEvent {
    /// The front-end finished initializing and accepts commands.
    Ready,
}

/// Parse an inbound front-end message into a [`FrontendEvent`].
///
/// Returns `None` for anything that is not a recognised event.
#[must_use]
pub fn parse_event(msg: &serde_json::Value) -> Option<FrontendEvent> {
    match msg.get("event")?.as_str()? {
        "ready" => Some(FrontendEvent::Ready),
        _ => None,
    }
}
