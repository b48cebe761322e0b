//! Chain error types.

use livereel_io::ProviderError;
use livereel_types::SegmentKey;

/// Convenience result alias for chain operations.
pub type Result<T> = std::result::Result<T, ChainError>;

/// Errors from chain operations.
///
/// Exhaustion is never represented here: a read that finds no bytes
/// reports `Ok(0)`, and the chain either advances to a later segment or
/// hands the zero count to the caller (live wait / end of chain).
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// Read/seek attempted before any segment was appended.
    #[error("chain has no active segment")]
    InvalidState,

    /// Append of a key that is already in the table.
    ///
    /// Carries the index of the existing entry. The controller treats this
    /// as a benign no-op and returns the existing index to the caller; the
    /// variant exists so the table can report the collision.
    #[error("segment already present at index {index}")]
    AlreadyPresent { index: usize },

    /// Seek resolved outside the union of all segment spans.
    #[error("seek target out of range")]
    OutOfRange,

    /// The operation reached a segment whose handle has not been opened.
    #[error("segment {key} has not been opened yet")]
    NotOpen { key: SegmentKey },

    /// Explicit switch to an index that is not in the table.
    #[error("segment index {index} out of bounds (chain has {len} segments)")]
    BadIndex { index: usize, len: usize },

    /// The segment table could not grow. The table is left unchanged.
    #[error("segment table allocation failed")]
    AllocationFailed,

    /// Failure surfaced by the segment provider, propagated verbatim.
    #[error("provider error: {source}")]
    Provider {
        #[from]
        source: ProviderError,
    },

    /// Chain-internal invariant failure.
    #[error("internal chain error: {message}")]
    Internal { message: String },
}

impl ChainError {
    /// Creates an internal error with the given message.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
