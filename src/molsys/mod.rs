//! Interfaces to the molecular-data library a view is backed by.
//!
//! The library owns parsing, conversion, selection syntax and unit handling.
//! The viewer only needs the narrow surface below:
//!
//! - [`MolecularLibrary::convert`] turns a [`SystemSource`] into a system
//!   handle, applying an atom [`Selection`] and [`StructureIndices`].
//! - [`MolecularSystem`] answers atom-count, document, selection and export
//!   queries on that handle.
//!
//! [`document::DocumentLibrary`] is a self-contained implementation backed by
//! a viewer JSON document. PDB and mmCIF sources are read into that document
//! shape by [`structure`].

pub mod document;
pub mod pdb;
pub mod structure;
pub mod units;

use std::fmt;
use std::path::PathBuf;

pub use document::{DocumentLibrary, DocumentSystem};
pub use units::{LengthUnit, PositionData};

use crate::command::StructureFormat;
use crate::error::ViewerError;

/// An opaque molecular system owned by the external library.
///
/// The viewer never mutates a system; it only queries it.
pub trait MolecularSystem: fmt::Debug {
    /// Number of atoms, or `None` if the library cannot tell.
    fn n_atoms(&self) -> Option<usize>;

    /// The system as a viewer JSON document (`atoms`, `frames`, `bonds`).
    fn viewer_document(&self) -> Result<serde_json::Value, ViewerError>;

    /// Evaluate a selection expression into zero-based atom indices.
    fn select(&self, expression: &str) -> Result<Vec<usize>, ViewerError>;

    /// Export the system as structure-file text.
    fn to_text(&self, format: StructureFormat) -> Result<String, ViewerError>;

    /// Convert a length quantity to Ångströms.
    fn convert_length(
        &self,
        value: f64,
        unit: &str,
    ) -> Result<f64, ViewerError> {
        LengthUnit::parse(unit)
            .map(|u| value * u.angstroms_per_unit())
            .ok_or_else(|| {
                ViewerError::conversion(format!("unknown length unit '{unit}'"))
            })
    }
}

/// The conversion front door of the molecular-data library.
pub trait MolecularLibrary {
    /// Convert any supported source into a system restricted to the given
    /// atoms and structures.
    fn convert(
        &self,
        source: &SystemSource,
        selection: &Selection,
        structure_indices: &StructureIndices,
    ) -> Result<Box<dyn MolecularSystem>, ViewerError>;
}

/// Anything the library can turn into a molecular system.
#[derive(Debug, Clone, PartialEq)]
pub enum SystemSource {
    /// A viewer JSON document.
    Document(serde_json::Value),
    /// PDB file contents.
    PdbString(String),
    /// mmCIF file contents.
    MmcifString(String),
    /// A PDB archive identifier.
    PdbId(String),
    /// A structure file on disk.
    Path(PathBuf),
}

impl SystemSource {
    /// Short human-readable description for logs and view state.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Document(_) => "viewer document".into(),
            Self::PdbString(s) => format!("PDB text ({} bytes)", s.len()),
            Self::MmcifString(s) => format!("mmCIF text ({} bytes)", s.len()),
            Self::PdbId(id) => format!("PDB id {id}"),
            Self::Path(p) => p.display().to_string(),
        }
    }
}

/// An atom selection: the `all` keyword, a library expression, or explicit
/// zero-based indices.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    /// Every atom.
    #[default]
    All,
    /// Expression in the library's selection syntax.
    Expression(String),
    /// Explicit zero-based atom indices.
    Indices(Vec<usize>),
}

impl Selection {
    /// Whether this selection denotes every atom.
    #[must_use]
    pub fn is_all(&self) -> bool {
        match self {
            Self::All => true,
            Self::Expression(expr) => expr.trim().eq_ignore_ascii_case("all"),
            Self::Indices(_) => false,
        }
    }

    /// Resolve against a system into ascending, de-duplicated indices.
    ///
    /// Indices outside `0..n_atoms` are rejected.
    pub fn resolve(
        &self,
        system: &dyn MolecularSystem,
        n_atoms: usize,
    ) -> Result<Vec<usize>, ViewerError> {
        if self.is_all() {
            return Ok((0..n_atoms).collect());
        }
        let mut indices = match self {
            Self::Expression(expr) => system.select(expr)?,
            Self::Indices(indices) => indices.clone(),
            Self::All => (0..n_atoms).collect(),
        };
        indices.sort_unstable();
        indices.dedup();
        if let Some(&last) = indices.last() {
            if last >= n_atoms {
                return Err(ViewerError::validation(format!(
                    "atom index {last} out of range for {n_atoms} atoms"
                )));
            }
        }
        Ok(indices)
    }
}

impl From<&str> for Selection {
    fn from(expr: &str) -> Self {
        if expr.trim().eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Expression(expr.to_owned())
        }
    }
}

impl From<String> for Selection {
    fn from(expr: String) -> Self {
        Self::from(expr.as_str())
    }
}

impl From<Vec<usize>> for Selection {
    fn from(indices: Vec<usize>) -> Self {
        Self::Indices(indices)
    }
}

impl From<&[usize]> for Selection {
    fn from(indices: &[usize]) -> Self {
        Self::Indices(indices.to_vec())
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Expression(expr) => write!(f, "{expr}"),
            Self::Indices(indices) => write!(f, "{} atom(s)", indices.len()),
        }
    }
}

/// Which structures (frames) of a trajectory to keep.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StructureIndices {
    /// Every frame.
    #[default]
    All,
    /// Explicit zero-based frame indices, in the given order.
    Indices(Vec<usize>),
}

impl From<Vec<usize>> for StructureIndices {
    fn from(indices: Vec<usize>) -> Self {
        Self::Indices(indices)
    }
}
