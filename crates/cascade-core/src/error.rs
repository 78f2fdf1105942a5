#![forbid(unsafe_code)]

//! Error types for path resolution and tree validation.

use std::fmt;

use crate::key::Key;
use crate::path::KeyPath;

/// Why a [`KeyPath`] failed to resolve against an option tree.
///
/// `depth` is the index of the segment at which the walk stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolveError {
    /// No option at this level carries the requested value.
    NotFound { depth: usize },
    /// The option at this level exists but is disabled.
    Disabled { depth: usize },
}

impl ResolveError {
    /// Segment index where resolution stopped.
    #[must_use]
    pub const fn depth(&self) -> usize {
        match self {
            Self::NotFound { depth } | Self::Disabled { depth } => *depth,
        }
    }

    /// Short machine-readable name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Disabled { .. } => "disabled",
        }
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { depth } => write!(f, "no option matches path segment {depth}"),
            Self::Disabled { depth } => write!(f, "option at path segment {depth} is disabled"),
        }
    }
}

impl std::error::Error for ResolveError {}

/// Structural problems found by [`OptionTree::validate`](crate::OptionTree::validate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Two siblings under `parent` share the same value.
    DuplicateSibling { parent: KeyPath, value: Key },
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateSibling { parent, value } if parent.is_empty() => {
                write!(f, "duplicate root value {value}")
            }
            Self::DuplicateSibling { parent, value } => {
                write!(f, "duplicate value {value} under {parent}")
            }
        }
    }
}

impl std::error::Error for TreeError {}
