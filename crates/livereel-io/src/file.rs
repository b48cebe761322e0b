//! File-backed segment provider.
//!
//! Treats the locator as a filesystem path. This is the provider used when
//! segments are spooled to local files by an external transfer component,
//! and the one exercised against real I/O in the test suite.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::provider::{SegmentHandle, SegmentProvider};
use crate::ProviderError;

/// Segment provider backed by local files.
///
/// Lengths are always reported as known (the current file size), so a file
/// that is still being appended to simply reports a larger length on the
/// next query.
#[derive(Debug)]
pub struct FileProvider {
    /// Counter for generating unique handle IDs.
    next_handle_id: AtomicU64,
}

impl FileProvider {
    /// Creates a new file-backed provider.
    pub fn new() -> Self {
        Self {
            next_handle_id: AtomicU64::new(1),
        }
    }

    /// Returns the next unique handle ID.
    fn next_id(&self) -> u64 {
        self.next_handle_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for FileProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentProvider for FileProvider {
    fn open(&self, locator: &str) -> Result<SegmentHandle, ProviderError> {
        let path = Path::new(locator);
        if !path.exists() {
            return Err(ProviderError::NotFound {
                locator: locator.to_owned(),
            });
        }
        let file = std::fs::File::open(path)?;
        let handle = SegmentHandle::from_file(self.next_id(), file);
        tracing::debug!(locator, handle = handle.id(), "opened file segment");
        Ok(handle)
    }

    fn read_at(
        &self,
        handle: &SegmentHandle,
        offset: u64,
        buf: &mut [u8],
    ) -> Result<usize, ProviderError> {
        // pread on Unix: positional read without moving any shared cursor
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileExt;
            let n = handle.file()?.read_at(buf, offset)?;
            Ok(n)
        }

        #[cfg(not(unix))]
        {
            use std::os::windows::fs::FileExt;
            let n = handle.file()?.seek_read(buf, offset)?;
            Ok(n)
        }
    }

    fn length(&self, handle: &SegmentHandle) -> Result<Option<u64>, ProviderError> {
        let metadata = handle.file()?.metadata()?;
        Ok(Some(metadata.len()))
    }

    fn close(&self, mut handle: SegmentHandle) -> Result<(), ProviderError> {
        tracing::debug!(handle = handle.id(), "closed file segment");
        // Drop the file to close it
        handle.file = None;
        Ok(())
    }
}
