//! Error types for the patch crate.

use jvc_types::{DocPath, TypeError};

/// Errors that can occur while applying a change list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    /// An array change targets a path that does not hold an array.
    #[error("no array at path {0:?}")]
    ArrayNotFound(DocPath),

    /// An array op addresses a position outside the live array.
    #[error("array op at {path:?} index {index} out of bounds (len {len})")]
    IndexOutOfBounds {
        path: DocPath,
        index: usize,
        len: usize,
    },

    /// A move reads from a position outside the original array.
    #[error("array move at {path:?} reads index {from} out of bounds (len {len})")]
    MoveSourceOutOfBounds {
        path: DocPath,
        from: usize,
        len: usize,
    },

    /// The change list could not be decoded (including unknown op kinds).
    #[error("invalid change list: {0}")]
    Decode(#[from] TypeError),
}

/// Convenience alias for patch results.
pub type PatchResult<T> = Result<T, PatchError>;
