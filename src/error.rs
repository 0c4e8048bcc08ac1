//! Error taxonomy for the clipping and offsetting engines (spec §7).

use thiserror::Error;

/// Errors raised by [`crate::Clipper`] and [`crate::ClipperOffset`].
///
/// `Execute` never partially commits a result: on [`ClipperError::Range`] or
/// [`ClipperError::InternalInvariant`] the caller's previously-added paths are
/// left untouched and the instance is cleared before being usable again.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClipperError {
    /// A coordinate magnitude (or a cross-product computed from it) exceeded
    /// the active [`crate::point::RangeMode`] bound.
    #[error("coordinate out of range: {0}")]
    Range(String),

    /// An open path was added where the pending clip type forbids it, or a
    /// degenerate/zero-area closed path was rejected.
    #[error("invalid input: {0}")]
    Input(String),

    /// An internal sweep invariant was violated (e.g. the bubble-sort
    /// intersection-order fixup failed to converge). Treated as fatal: the
    /// output collection is cleared and `Execute` reports failure.
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),

    /// `execute` was called while another `execute` call on the same
    /// instance was already in progress (the engine is not reentrant).
    #[error("Clipper instance is not reentrant: execute() called while already executing")]
    ConcurrentUse,
}

pub type ClipperResult<T> = Result<T, ClipperError>;
