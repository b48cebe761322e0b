//! In-memory segment provider.
//!
//! Buffers live in a table keyed by locator; handles map back to buffers
//! through the provider, so the `SegmentHandle` itself carries no state
//! beyond its id. Segments can be created sealed (fixed length) or live
//! (growing, length reported as unknown until sealed), which is exactly the
//! shape a chain's final segment has during a live recording.
//!
//! Besides in-process use, this is the mock provider the chain test suite
//! builds its scenarios on.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use bytes::BytesMut;

use crate::provider::{SegmentHandle, SegmentProvider};
use crate::ProviderError;

/// One in-memory segment buffer.
#[derive(Debug)]
struct MemorySegment {
    data: BytesMut,
    sealed: bool,
}

/// Segment provider backed by in-memory buffers.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    /// Buffers by locator.
    segments: Mutex<HashMap<String, Arc<Mutex<MemorySegment>>>>,
    /// Open handles by id.
    handles: Mutex<HashMap<u64, Arc<Mutex<MemorySegment>>>>,
    /// Counter for generating unique handle IDs.
    next_handle_id: AtomicU64,
}

impl MemoryProvider {
    /// Creates an empty in-memory provider.
    pub fn new() -> Self {
        Self {
            segments: Mutex::new(HashMap::new()),
            handles: Mutex::new(HashMap::new()),
            next_handle_id: AtomicU64::new(1),
        }
    }

    /// Creates a sealed segment with the given contents.
    pub fn create(&self, locator: &str, data: &[u8]) {
        self.insert(locator, data, true);
    }

    /// Creates a live (growing) segment, initially empty.
    ///
    /// Its length is reported as unknown until [`MemoryProvider::seal`] is
    /// called.
    pub fn create_live(&self, locator: &str) {
        self.insert(locator, &[], false);
    }

    /// Appends bytes to a live segment.
    pub fn extend(&self, locator: &str, data: &[u8]) -> Result<(), ProviderError> {
        let segment = self.lookup(locator)?;
        let mut segment = segment
            .lock()
            .map_err(|_| ProviderError::internal("segment lock poisoned"))?;
        if segment.sealed {
            return Err(ProviderError::internal(format!(
                "segment {locator} is sealed"
            )));
        }
        segment.data.extend_from_slice(data);
        Ok(())
    }

    /// Seals a segment, fixing its length.
    pub fn seal(&self, locator: &str) -> Result<(), ProviderError> {
        let segment = self.lookup(locator)?;
        let mut segment = segment
            .lock()
            .map_err(|_| ProviderError::internal("segment lock poisoned"))?;
        segment.sealed = true;
        tracing::debug!(locator, length = segment.data.len(), "segment sealed");
        Ok(())
    }

    fn insert(&self, locator: &str, data: &[u8], sealed: bool) {
        let segment = MemorySegment {
            data: BytesMut::from(data),
            sealed,
        };
        // A poisoned table still holds only complete entries; recover it.
        let mut segments = match self.segments.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        segments.insert(locator.to_owned(), Arc::new(Mutex::new(segment)));
    }

    fn lookup(&self, locator: &str) -> Result<Arc<Mutex<MemorySegment>>, ProviderError> {
        let segments = self
            .segments
            .lock()
            .map_err(|_| ProviderError::internal("segment table lock poisoned"))?;
        segments
            .get(locator)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound {
                locator: locator.to_owned(),
            })
    }

    fn resolve(&self, handle: &SegmentHandle) -> Result<Arc<Mutex<MemorySegment>>, ProviderError> {
        let handles = self
            .handles
            .lock()
            .map_err(|_| ProviderError::internal("handle table lock poisoned"))?;
        handles
            .get(&handle.id())
            .cloned()
            .ok_or(ProviderError::InvalidHandle {
                handle: handle.id(),
            })
    }
}

impl SegmentProvider for MemoryProvider {
    fn open(&self, locator: &str) -> Result<SegmentHandle, ProviderError> {
        let segment = self.lookup(locator)?;
        let id = self.next_handle_id.fetch_add(1, Ordering::Relaxed);
        self.handles
            .lock()
            .map_err(|_| ProviderError::internal("handle table lock poisoned"))?
            .insert(id, segment);
        Ok(SegmentHandle::detached(id))
    }

    fn read_at(
        &self,
        handle: &SegmentHandle,
        offset: u64,
        buf: &mut [u8],
    ) -> Result<usize, ProviderError> {
        let segment = self.resolve(handle)?;
        let segment = segment
            .lock()
            .map_err(|_| ProviderError::internal("segment lock poisoned"))?;
        let len = segment.data.len() as u64;
        if offset >= len {
            return Ok(0);
        }
        let start = offset as usize;
        let n = buf.len().min(segment.data.len() - start);
        buf[..n].copy_from_slice(&segment.data[start..start + n]);
        Ok(n)
    }

    fn length(&self, handle: &SegmentHandle) -> Result<Option<u64>, ProviderError> {
        let segment = self.resolve(handle)?;
        let segment = segment
            .lock()
            .map_err(|_| ProviderError::internal("segment lock poisoned"))?;
        if segment.sealed {
            Ok(Some(segment.data.len() as u64))
        } else {
            Ok(None)
        }
    }

    fn close(&self, handle: SegmentHandle) -> Result<(), ProviderError> {
        self.handles
            .lock()
            .map_err(|_| ProviderError::internal("handle table lock poisoned"))?
            .remove(&handle.id());
        Ok(())
    }
}
