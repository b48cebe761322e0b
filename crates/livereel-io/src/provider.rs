//! Segment provider trait.
//!
//! The [`SegmentProvider`] trait abstracts how segment bytes are produced:
//! - Local files (default, [`crate::FileProvider`])
//! - In-memory buffers ([`crate::MemoryProvider`], also used as the mock
//!   provider in chain tests)
//! - Future: network transfer sockets fed by a tuner backend
//!
//! The chain layer never interprets a locator; it passes the opaque string
//! through from whoever announced the segment.

use crate::ProviderError;

/// Opaque handle to one open segment.
///
/// The handle is provider-specific. For `FileProvider` it wraps an open
/// `std::fs::File`; for `MemoryProvider` the `id` indexes the provider's
/// buffer table and `file` is `None`. Handles are shared by reference
/// counting in the chain layer; dropping the last reference releases the
/// underlying resource.
#[derive(Debug)]
pub struct SegmentHandle {
    /// Provider-assigned identifier, unique per provider instance.
    pub(crate) id: u64,
    /// The open file, for file-backed providers.
    pub(crate) file: Option<std::fs::File>,
}

impl SegmentHandle {
    /// Creates a handle wrapping an open file.
    pub(crate) fn from_file(id: u64, file: std::fs::File) -> Self {
        Self {
            id,
            file: Some(file),
        }
    }

    /// Creates a handle with no attached file (buffer-backed providers).
    pub(crate) fn detached(id: u64) -> Self {
        Self { id, file: None }
    }

    /// Returns the provider-assigned handle identifier.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the attached file reference.
    pub(crate) fn file(&self) -> Result<&std::fs::File, ProviderError> {
        self.file
            .as_ref()
            .ok_or(ProviderError::InvalidHandle { handle: self.id })
    }
}

/// Abstraction over segment byte-range providers.
///
/// All reads are positional and side-effect free with respect to the
/// handle: the caller owns the read cursor. A handle-level "seek" is
/// therefore just the caller choosing a different offset for the next
/// `read_at`, validated by the chain layer against the segment span.
///
/// All methods are synchronous; `read_at` may block for however long the
/// underlying transport takes. Bounding that wait is the provider's
/// responsibility, not the chain's.
pub trait SegmentProvider: Send + Sync {
    /// Opens the segment named by `locator`.
    ///
    /// The locator format is provider-defined and opaque to callers.
    fn open(&self, locator: &str) -> Result<SegmentHandle, ProviderError>;

    /// Reads from the segment at the given byte offset.
    ///
    /// Returns the number of bytes read. `Ok(0)` means no bytes are
    /// available at `offset` — either the segment is exhausted or, for a
    /// still-growing segment, the bytes have not arrived yet. It is never
    /// an error.
    fn read_at(
        &self,
        handle: &SegmentHandle,
        offset: u64,
        buf: &mut [u8],
    ) -> Result<usize, ProviderError>;

    /// Returns the segment length in bytes, or `None` while the segment is
    /// still growing and its final length is unknown.
    fn length(&self, handle: &SegmentHandle) -> Result<Option<u64>, ProviderError>;

    /// Closes a handle, releasing provider-side resources.
    ///
    /// Dropping the last reference to a handle has the same effect for
    /// file-backed providers; `close` exists for providers that keep
    /// per-handle state of their own.
    fn close(&self, handle: SegmentHandle) -> Result<(), ProviderError>;
}
