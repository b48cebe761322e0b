//! Segment entries and the append-only segment table.
//!
//! The table is the chain's source of truth for segment order: insertion
//! order equals arrival order equals logical stream order. Entries are
//! never reordered or removed while the chain lives (rewinding may
//! re-enter any prior segment), and indices handed out by [`SegmentTable::append`]
//! stay valid for the chain's lifetime.

use std::sync::Arc;

use livereel_io::SegmentHandle;
use livereel_types::SegmentKey;

use crate::error::{ChainError, Result};

/// One entry in a chain: a reference-counted handle to a byte-range
/// provider plus the chain-side bookkeeping for it.
#[derive(Debug)]
pub struct Segment<M> {
    /// Unique key, assigned at append time and never reused.
    pub(crate) key: SegmentKey,
    /// Shared handle to the opened provider resource. `None` while the
    /// segment is registered but not yet opened (placeholder).
    pub(crate) handle: Option<Arc<SegmentHandle>>,
    /// Cached byte length. `None` until known; only the final segment of a
    /// chain may legitimately stay unknown (still growing).
    pub(crate) length: Option<u64>,
    /// Most recently requested read offset within this segment. Persists
    /// across switches away and back, so a rewind resumes mid-segment.
    pub(crate) cursor: u64,
    /// Opaque collaborator-owned descriptor, only ever handed to the
    /// switch notifier.
    pub(crate) info: M,
}

impl<M> Segment<M> {
    /// Returns the segment key.
    pub fn key(&self) -> &SegmentKey {
        &self.key
    }

    /// Returns whether a provider handle has been installed.
    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Returns the cached length, if known.
    pub fn length(&self) -> Option<u64> {
        self.length
    }

    /// Returns the stored read cursor.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Returns the associated descriptor.
    pub fn info(&self) -> &M {
        &self.info
    }

    /// Returns the shared handle, if one is installed.
    pub(crate) fn handle_ref(&self) -> Option<&Arc<SegmentHandle>> {
        self.handle.as_ref()
    }
}

/// Ordered, growable, append-only collection of segments.
#[derive(Debug, Default)]
pub struct SegmentTable<M> {
    entries: Vec<Segment<M>>,
}

impl<M> SegmentTable<M> {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Returns the number of segments.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the table holds no segments.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the index of the final segment, if any.
    pub fn last_index(&self) -> Option<usize> {
        self.entries.len().checked_sub(1)
    }

    /// Returns the entries as a slice (a snapshot for position math).
    pub fn entries(&self) -> &[Segment<M>] {
        &self.entries
    }

    /// Looks up a segment by key. Linear scan: chain length is bounded by
    /// recording duration, not data volume, so O(n) is fine here.
    pub fn find(&self, key: &SegmentKey) -> Option<usize> {
        self.entries.iter().position(|s| &s.key == key)
    }

    /// Returns the entry at `index`.
    pub fn get(&self, index: usize) -> Option<&Segment<M>> {
        self.entries.get(index)
    }

    /// Returns the entry at `index` mutably.
    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Segment<M>> {
        self.entries.get_mut(index)
    }

    /// Appends a new segment, returning its index.
    ///
    /// Fails with [`ChainError::AlreadyPresent`] if the key is taken, and
    /// with [`ChainError::AllocationFailed`] if the backing storage cannot
    /// grow — in both cases the table is left exactly as it was.
    pub(crate) fn append(
        &mut self,
        key: SegmentKey,
        handle: Option<Arc<SegmentHandle>>,
        info: M,
    ) -> Result<usize> {
        if let Some(index) = self.find(&key) {
            return Err(ChainError::AlreadyPresent { index });
        }
        self.entries
            .try_reserve(1)
            .map_err(|_| ChainError::AllocationFailed)?;
        let index = self.entries.len();
        self.entries.push(Segment {
            key,
            handle,
            length: None,
            cursor: 0,
            info,
        });
        Ok(index)
    }

    /// Installs a handle into the entry at `index`, returning the handle
    /// that was previously installed (if any).
    ///
    /// The old reference is handed back rather than dropped in place so the
    /// caller controls release order: the new handle is always live before
    /// the old one goes away.
    pub(crate) fn install_handle(
        &mut self,
        index: usize,
        handle: Arc<SegmentHandle>,
    ) -> Result<Option<Arc<SegmentHandle>>> {
        let len = self.entries.len();
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(ChainError::BadIndex { index, len })?;
        Ok(entry.handle.replace(handle))
    }
}
