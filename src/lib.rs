// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// ...except in tests, which fail by panicking
#![cfg_attr(
    test,
    allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)
)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits (default clippy thresholds)
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Controller for an embedded molecular-structure viewer.
//!
//! The rendering front-end lives elsewhere (a notebook widget, a web page);
//! this crate is everything on the controlling side of the wire. It turns
//! molecular systems into a canonical payload, tracks per-atom visibility,
//! validates shape annotations and delivers the resulting commands in order,
//! even before the front-end has finished starting up.
//!
//! # Key entry points
//!
//! - [`MolSysView`] - one view: loading, visibility, shapes, scene commands
//! - [`payload::Normalizer`] - molecular system to [`CanonicalPayload`]
//! - [`queue::MessageQueue`] - readiness-gated FIFO in front of a
//!   [`Transport`]
//! - [`shapes`] - validated builders for every annotation kind
//! - [`Options`] - normalizer, shape and scene defaults with TOML presets
//!
//! # Architecture
//!
//! Parsing, selection and unit handling belong to a [`MolecularLibrary`].
//! [`DocumentLibrary`] is the built-in one, backed by viewer JSON documents,
//! with PDB and mmCIF text parsed through `molex`. A view converts a source
//! through the library, normalizes the result, and falls back to PDB text
//! when no canonical payload can be built. Every command goes through one
//! [`queue::MessageQueue`], which holds messages until the front-end sends
//! `{"event": "ready"}`.

pub mod command;
pub mod error;
pub mod mask;
pub mod molsys;
pub mod options;
pub mod payload;
pub mod queue;
pub mod shapes;
pub mod view;

pub use command::{ClearSceneOptions, Command, FrontendEvent, StructureFormat};
pub use error::{PayloadError, ViewerError};
pub use mask::VisibilityMask;
pub use molsys::{
    DocumentLibrary, DocumentSystem, MolecularLibrary, MolecularSystem,
    Selection, StructureIndices, SystemSource,
};
pub use options::Options;
pub use payload::CanonicalPayload;
pub use queue::{JsonLinesTransport, MessageQueue, RecordingTransport, Transport};
pub use shapes::{ShapeRequest, ShapesManager};
pub use view::{LoadOutcome, MolSysView, ViewBuilder, ViewState};
