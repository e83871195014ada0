//! The view controller: one front-end, one loaded system.
//!
//! [`MolSysView`] ties the pieces together. Loads go through the
//! [`MolecularLibrary`] and the payload normalizer, visibility changes
//! through the [`VisibilityMask`], and every resulting [`Command`] through
//! the readiness-gated [`MessageQueue`].

mod loading;
mod visibility;

use std::fmt;

use serde_json::Value;

use crate::command::{ClearSceneOptions, Command, FrontendEvent};
use crate::error::ViewerError;
use crate::mask::VisibilityMask;
use crate::molsys::{
    DocumentLibrary, MolecularLibrary, MolecularSystem, Selection,
    StructureIndices,
};
use crate::options::Options;
use crate::queue::{MessageQueue, Transport};
use crate::shapes::ShapesManager;

/// How the most recent structure reached the front-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Sent as a canonical payload.
    Payload {
        /// Atoms in the payload.
        n_atoms: usize,
        /// Frames that survived normalization.
        n_frames: usize,
        /// Fields that fell back to defaults or were dropped.
        degradations: usize,
    },
    /// Sent as structure-file text, either requested or as a fallback.
    Text {
        /// Whether the payload path failed first.
        fallback: bool,
    },
    /// Sent as a PDB identifier for the front-end to fetch.
    PdbId,
    /// Sent as a URL for the front-end to fetch.
    Url,
}

/// What is currently loaded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewState {
    /// Description of the loaded source, if any.
    pub source: Option<String>,
    /// Atom selection applied at load time.
    pub selection: Selection,
    /// Frames kept at load time.
    pub structure_indices: StructureIndices,
    /// Delivery path of the last load.
    pub last_load: Option<LoadOutcome>,
}

// ── Builder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`MolSysView`].
pub struct ViewBuilder<T: Transport> {
    transport: T,
    library: Option<Box<dyn MolecularLibrary>>,
    options: Options,
}

impl<T: Transport> ViewBuilder<T> {
    fn new(transport: T) -> Self {
        Self {
            transport,
            library: None,
            options: Options::default(),
        }
    }

    /// Use a molecular library other than [`DocumentLibrary`].
    #[must_use]
    pub fn with_library(
        mut self,
        library: impl MolecularLibrary + 'static,
    ) -> Self {
        self.library = Some(Box::new(library));
        self
    }

    /// Override the default options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Build the view. The front-end starts out not ready.
    #[must_use]
    pub fn build(self) -> MolSysView<T> {
        MolSysView {
            queue: MessageQueue::new(self.transport),
            library: self
                .library
                .unwrap_or_else(|| Box::new(DocumentLibrary::new())),
            options: self.options,
            system: None,
            mask: None,
            state: ViewState::default(),
        }
    }
}

// ── View ─────────────────────────────────────────────────────────────────

/// Controller for one front-end view.
///
/// Owns the outbound queue, the converted system and its visibility mask.
///
/// ```
/// # use molsysviewer::{MolSysView, RecordingTransport};
/// # use serde_json::json;
/// let mut view = MolSysView::new(RecordingTransport::new());
/// view.reset_view().unwrap();
/// let _ = view.handle_frontend_message(&json!({ "event": "ready" }));
/// assert_eq!(view.transport().ops(), vec!["reset_view"]);
/// ```
pub struct MolSysView<T: Transport> {
    queue: MessageQueue<T>,
    library: Box<dyn MolecularLibrary>,
    options: Options,
    system: Option<Box<dyn MolecularSystem>>,
    mask: Option<VisibilityMask>,
    state: ViewState,
}

impl<T: Transport> MolSysView<T> {
    /// View over `transport` with the built-in library and default options.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self::builder(transport).build()
    }

    /// Start building a view over `transport`.
    #[must_use]
    pub fn builder(transport: T) -> ViewBuilder<T> {
        ViewBuilder::new(transport)
    }

    // ── Front-end channel ──

    /// Route an inbound front-end message.
    pub fn handle_frontend_message(
        &mut self,
        msg: &Value,
    ) -> Option<FrontendEvent> {
        self.queue.handle_message(msg)
    }

    /// Mark the front-end ready and flush buffered commands. Returns `false`
    /// if it already was.
    pub fn on_ready(&mut self) -> bool {
        self.queue.on_ready()
    }

    /// Whether the front-end has announced readiness.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.queue.is_ready()
    }

    /// Queue an arbitrary command.
    pub fn send(&mut self, command: &Command) -> Result<(), ViewerError> {
        self.queue.send(command)
    }

    /// Shape API bound to this view.
    pub fn shapes(&mut self) -> ShapesManager<'_, T> {
        ShapesManager::new(&mut self.queue, &self.options.shapes)
    }

    // ── Scene ──

    /// Clear the layers configured in [`Options::scene`].
    pub fn clear_scene(&mut self) -> Result<(), ViewerError> {
        self.clear_scene_with(self.options.scene.clear)
    }

    /// Clear the given layers.
    pub fn clear_scene_with(
        &mut self,
        options: ClearSceneOptions,
    ) -> Result<(), ViewerError> {
        self.queue.send(&Command::ClearScene { options })
    }

    /// Clear everything and forget the loaded system.
    ///
    /// Mask operations fail with [`ViewerError::NoSystemLoaded`] until the
    /// next load.
    pub fn clear_all(&mut self) -> Result<(), ViewerError> {
        self.system = None;
        self.mask = None;
        self.state = ViewState::default();
        self.queue.send(&Command::ClearAll)
    }

    /// Fit the camera to the scene.
    pub fn reset_view(&mut self) -> Result<(), ViewerError> {
        self.queue.send(&Command::ResetView)
    }

    // ── Accessors ──

    /// Current options.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Replace the options. Affects subsequent loads and shapes only.
    pub fn set_options(&mut self, options: Options) {
        self.options = options;
    }

    /// What is currently loaded.
    #[must_use]
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// The converted system, if one is loaded.
    #[must_use]
    pub fn system(&self) -> Option<&dyn MolecularSystem> {
        self.system.as_deref()
    }

    /// The visibility mask, if a system is loaded.
    #[must_use]
    pub fn mask(&self) -> Option<&VisibilityMask> {
        self.mask.as_ref()
    }

    /// The outbound queue.
    #[must_use]
    pub fn queue(&self) -> &MessageQueue<T> {
        &self.queue
    }

    /// The transport behind the queue.
    #[must_use]
    pub fn transport(&self) -> &T {
        self.queue.transport()
    }

    /// Consume the view, returning its transport.
    pub fn into_transport(self) -> T {
        self.queue.into_transport()
    }
}

impl<T: Transport + fmt::Debug> fmt::Debug for MolSysView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MolSysView")
            .field("queue", &self.queue)
            .field("options", &self.options)
            .field("system", &self.system)
            .field("mask", &self.mask)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
