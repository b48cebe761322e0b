//! Segment provider error types.

/// Errors surfaced by a segment provider.
///
/// A zero-byte read is *not* an error: it means the segment is exhausted
/// (or has no bytes yet at the requested offset, for a still-growing
/// segment). Providers reserve errors for genuine failures.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Underlying OS I/O error.
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// No segment exists under the given locator.
    #[error("segment not found: {locator}")]
    NotFound { locator: String },

    /// The handle does not belong to this provider or was already closed.
    #[error("invalid segment handle: {handle}")]
    InvalidHandle { handle: u64 },

    /// Provider-internal invariant failure.
    #[error("internal provider error: {message}")]
    Internal { message: String },
}

impl ProviderError {
    /// Creates an internal error with the given message.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
