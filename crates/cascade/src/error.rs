#![forbid(unsafe_code)]

//! Top-level error type.
//!
//! Picks that do not resolve are not errors in the controlled flow: the
//! state is simply returned unchanged. [`Error`] only surfaces from the
//! fallible entry points (`try_*`, validation, persistence decoding).

use std::fmt;

use cascade_core::TreeError;
use cascade_select::SelectRejection;

/// Errors reported by the cascade facade.
#[derive(Debug)]
pub enum Error {
    /// The option tree violates a structural invariant.
    Tree(TreeError),
    /// A pick was rejected.
    Rejected(SelectRejection),
    /// Persisted state could not be encoded or decoded.
    #[cfg(feature = "state-persistence")]
    Persist(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tree(err) => write!(f, "invalid option tree: {err}"),
            Self::Rejected(err) => write!(f, "{err}"),
            #[cfg(feature = "state-persistence")]
            Self::Persist(err) => write!(f, "persisted state: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Tree(err) => Some(err),
            Self::Rejected(err) => Some(err),
            #[cfg(feature = "state-persistence")]
            Self::Persist(err) => Some(err),
        }
    }
}

impl From<TreeError> for Error {
    fn from(err: TreeError) -> Self {
        Self::Tree(err)
    }
}

impl From<SelectRejection> for Error {
    fn from(err: SelectRejection) -> Self {
        Self::Rejected(err)
    }
}

#[cfg(feature = "state-persistence")]
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Persist(err)
    }
}

/// Standard result type for cascade APIs.
pub type Result<T> = std::result::Result<T, Error>;
