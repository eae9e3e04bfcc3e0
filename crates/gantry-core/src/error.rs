//! Structural configuration-error types.
//!
//! World-source resolution never panics and never throws across the
//! server boundary: every failure is recorded as a [`LoadError`] and
//! accumulated into an ordered [`ErrorList`] that the caller can read
//! back after construction.

use std::error::Error;
use std::fmt;

/// Classifies a structural error recorded during world-source resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadErrorCode {
    /// A file could not be read.
    Io,
    /// The description text is malformed.
    Syntax,
    /// The document contains neither a world nor a standalone model.
    MissingWorld,
    /// Two models in the same world share a name, or a name is empty.
    DuplicateName,
    /// A configured file path could not be resolved to readable content.
    Resolution,
    /// The default-world fallback could not absorb a standalone model.
    Merge,
}

impl fmt::Display for LoadErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io => write!(f, "io"),
            Self::Syntax => write!(f, "syntax"),
            Self::MissingWorld => write!(f, "missing_world"),
            Self::DuplicateName => write!(f, "duplicate_name"),
            Self::Resolution => write!(f, "resolution"),
            Self::Merge => write!(f, "merge"),
        }
    }
}

/// One recorded structural error: a machine-readable code plus a
/// human-readable message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadError {
    /// What kind of failure this is.
    pub code: LoadErrorCode,
    /// Human-readable description emitted to the diagnostic sink.
    pub message: String,
}

impl LoadError {
    /// Build an error from a code and message.
    pub fn new(code: LoadErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for LoadError {}

/// Ordered accumulation of structural errors.
///
/// Resolution appends in the order failures were discovered; an empty
/// list means the stage succeeded.
pub type ErrorList = Vec<LoadError>;
