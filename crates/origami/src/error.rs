//! Error types for parsing, folding and reconciliation.

use thiserror::Error;

/// Failure of a single fold (or of the post-solve reconciliation).
#[derive(Clone, Debug, Error, PartialEq)]
pub enum FoldError {
    /// Text matches neither the long nor the compact grammar, or carries bad numbers.
    #[error("parse error: {reason}")]
    Parse { reason: String },

    /// Wrong selection shape or unknown point names.
    #[error("selection error: {reason}")]
    Selection { reason: String },

    /// Zero-length vectors, coincident from/to, point on axis, missing axis points.
    #[error("degenerate geometry: {reason}")]
    DegenerateGeometry { reason: String },

    /// An outline could not be matched against the final faces.
    #[error("reconciliation error: {reason}")]
    Reconciliation { reason: String },
}

impl FoldError {
    pub fn parse(reason: impl Into<String>) -> Self {
        Self::Parse {
            reason: reason.into(),
        }
    }
    pub fn selection(reason: impl Into<String>) -> Self {
        Self::Selection {
            reason: reason.into(),
        }
    }
    pub fn degenerate(reason: impl Into<String>) -> Self {
        Self::DegenerateGeometry {
            reason: reason.into(),
        }
    }
    pub fn reconciliation(reason: impl Into<String>) -> Self {
        Self::Reconciliation {
            reason: reason.into(),
        }
    }
}

/// A failed solve: which input line (0-based, counting the dimensions line) and why.
///
/// For reconciliation failures `index` is the fold step of the offending outline
/// and `line` is that fold's instruction text.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("line {index} `{line}`: {source}")]
pub struct SolveError {
    pub index: usize,
    pub line: String,
    #[source]
    pub source: FoldError,
}

/// Result type for single-fold operations.
pub type FoldResult<T> = std::result::Result<T, FoldError>;

/// Result type for whole solves.
pub type SolveResult<T> = std::result::Result<T, SolveError>;
