//! Crate-level error types.

use std::fmt;

/// Reasons the normalizer could not build a canonical payload.
///
/// Both are recoverable: the loader catches them and falls back to a
/// plain-text structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadError {
    /// The system reported zero atoms, or no atom count at all.
    NoAtoms,
    /// No frame carried positions of shape `(n_atoms, 3)`.
    NoCoordinates,
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoAtoms => write!(f, "molecular system has no atoms"),
            Self::NoCoordinates => {
                write!(f, "molecular system has no usable coordinate frames")
            }
        }
    }
}

impl std::error::Error for PayloadError {}

/// Errors produced by the molsysviewer crate.
#[derive(Debug)]
pub enum ViewerError {
    /// Malformed user-supplied geometry, attributes or identifiers.
    Validation(String),
    /// The molecular-data library failed to convert, query or select.
    Conversion(String),
    /// No canonical payload could be built for the system.
    Payload(PayloadError),
    /// A visibility operation ran before any system was loaded.
    NoSystemLoaded,
    /// The front-end transport refused a message.
    Transport(String),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
}

impl ViewerError {
    /// Shorthand for a [`ViewerError::Validation`] with a formatted message.
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Shorthand for a [`ViewerError::Conversion`] with a formatted message.
    pub(crate) fn conversion(msg: impl Into<String>) -> Self {
        Self::Conversion(msg.into())
    }
}

impl fmt::Display for ViewerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(msg) => write!(f, "invalid input: {msg}"),
            Self::Conversion(msg) => write!(f, "conversion error: {msg}"),
            Self::Payload(e) => write!(f, "payload error: {e}"),
            Self::NoSystemLoaded => {
                write!(f, "no molecular system loaded in this view")
            }
            Self::Transport(msg) => write!(f, "transport error: {msg}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
        }
    }
}

impl std::error::Error for ViewerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Payload(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PayloadError> for ViewerError {
    fn from(e: PayloadError) -> Self {
        Self::Payload(e)
    }
}

impl From<std::io::Error> for ViewerError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
