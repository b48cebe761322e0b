//! The chain controller: one seekable stream over a growing segment chain.
//!
//! A [`Chain`] owns the segment table and the current-segment index behind
//! a single mutex, and orchestrates reads, seeks, and switches against a
//! [`SegmentProvider`]. An external producer appends segments as they are
//! created (typically from a background completion signal) while a single
//! consumer reads; the chain tolerates that overlap safely.
//!
//! # Locking
//!
//! The mutex protects only bookkeeping: which handle to use, cursors, and
//! the current index. Blocking provider reads happen *outside* the lock
//! against a cloned `Arc` handle, so a slow network read never stalls a
//! concurrent append. State changes resulting from a read (cursor advance,
//! exhaustion-triggered switch) are committed under a re-acquired lock.
//!
//! # Invariants
//!
//! - The table is append-only: no reordering, no deletion, no duplicate keys
//! - `current` is always a valid index once set, and is only ever set by
//!   the consumer's own operations or by the first/pending append
//! - Only the final segment may have an unknown (growing) length
//! - An in-flight read keeps its segment handle alive across any
//!   concurrent switch (shared ownership, released at refcount zero)

use std::sync::{Arc, Mutex, MutexGuard};

use livereel_io::{SegmentHandle, SegmentProvider};
use livereel_types::{ChainId, SegmentKey, Whence};

use crate::error::{ChainError, Result};
use crate::position;
use crate::segment::SegmentTable;

/// Default probe size for availability checks against a segment whose
/// length is still unknown (64 KB, one transfer block).
const DEFAULT_PROBE_CHUNK_SIZE: usize = 64 * 1024;

/// Configuration for a chain.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// Upper bound on the scratch read used by [`Chain::request_block`]
    /// when the current segment's length is unknown.
    pub probe_chunk_size: usize,
}

impl ChainConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self {
            probe_chunk_size: DEFAULT_PROBE_CHUNK_SIZE,
        }
    }

    /// Sets the probe chunk size.
    pub fn with_probe_chunk_size(mut self, size: usize) -> Self {
        self.probe_chunk_size = size;
        self
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Callback invoked whenever the active segment changes.
///
/// Called synchronously from inside the switch, after the new segment's
/// handle reference is secured and before the switch returns, while the
/// chain lock is held. The callback must not call back into the chain:
/// no re-entrancy is provided and doing so deadlocks.
pub trait SwitchNotifier<M>: Send {
    /// Invoked with the descriptor of the newly active segment.
    fn on_switch(&mut self, info: &M);
}

impl<M, F> SwitchNotifier<M> for F
where
    F: FnMut(&M) + Send,
{
    fn on_switch(&mut self, info: &M) {
        self(info);
    }
}

/// Mutex-guarded chain bookkeeping.
struct ChainState<M> {
    table: SegmentTable<M>,
    /// Index of the active segment; `None` until the first segment with a
    /// handle arrives.
    current: Option<usize>,
    /// Set when a switch-to-newest was requested against an empty chain;
    /// the next append performs the switch. Closes the race between
    /// "switch to newest" and "newest not yet created".
    pending_switch_to_last: bool,
    notifier: Option<Box<dyn SwitchNotifier<M>>>,
}

/// One logical, seekable, continuously growing byte stream assembled from
/// an append-only chain of independently opened segments.
///
/// `P` is the segment provider; `M` is the opaque per-segment descriptor
/// handed to the switch notifier (program information, typically).
pub struct Chain<P: SegmentProvider, M> {
    id: ChainId,
    provider: Arc<P>,
    config: ChainConfig,
    state: Mutex<ChainState<M>>,
}

impl<P: SegmentProvider, M> Chain<P, M> {
    /// Creates an empty chain with the default configuration.
    pub fn new(id: impl Into<ChainId>, provider: Arc<P>) -> Self {
        Self::with_config(id, provider, ChainConfig::default())
    }

    /// Creates an empty chain with a custom configuration.
    pub fn with_config(id: impl Into<ChainId>, provider: Arc<P>, config: ChainConfig) -> Self {
        Self {
            id: id.into(),
            provider,
            config,
            state: Mutex::new(ChainState {
                table: SegmentTable::new(),
                current: None,
                pending_switch_to_last: false,
                notifier: None,
            }),
        }
    }

    /// Returns the chain identifier.
    pub fn id(&self) -> &ChainId {
        &self.id
    }

    /// Installs the switch notifier, replacing any previous one.
    pub fn set_notifier(&self, notifier: impl SwitchNotifier<M> + 'static) -> Result<()> {
        let mut state = self.lock_state()?;
        state.notifier = Some(Box::new(notifier));
        Ok(())
    }

    /// Returns the number of segments in the chain.
    pub fn segment_count(&self) -> Result<usize> {
        Ok(self.lock_state()?.table.len())
    }

    /// Returns the index of the active segment, if any.
    pub fn current_index(&self) -> Result<Option<usize>> {
        Ok(self.lock_state()?.current)
    }

    /// Looks up a segment index by key.
    pub fn find_segment(&self, key: &SegmentKey) -> Result<Option<usize>> {
        Ok(self.lock_state()?.table.find(key))
    }

    /// Returns the sum of all known segment lengths.
    ///
    /// While the final segment is still growing its bytes are not counted.
    pub fn total_known_length(&self) -> Result<u64> {
        let mut state = self.lock_state()?;
        self.refresh_lengths_locked(&mut state)?;
        let mut total: u64 = 0;
        for segment in state.table.entries() {
            if let Some(length) = segment.length() {
                total = total
                    .checked_add(length)
                    .ok_or_else(|| ChainError::internal("stream length overflow"))?;
            }
        }
        Ok(total)
    }

    /// Registers a segment key without a handle (placeholder).
    ///
    /// Used when the producer announces a segment before its transfer is
    /// open; a later [`Chain::add_segment`] with the same key installs the
    /// handle. A placeholder cannot become the active segment — switching
    /// into it fails with [`ChainError::NotOpen`] — so the chain stays
    /// uninitialized until a handle arrives. Registering a key that is
    /// already present is a benign no-op returning the existing index.
    pub fn register_segment(&self, key: impl Into<SegmentKey>, info: M) -> Result<usize> {
        let key = key.into();
        let mut state = self.lock_state()?;
        match state.table.append(key.clone(), None, info) {
            Ok(index) => {
                if let Some(previous) = index.checked_sub(1).and_then(|i| state.table.get_mut(i)) {
                    previous.length = None;
                }
                tracing::debug!(chain = %self.id, %key, index, "segment registered (no handle)");
                Ok(index)
            }
            Err(ChainError::AlreadyPresent { index }) => Ok(index),
            Err(other) => Err(other),
        }
    }

    /// Appends a segment with a freshly opened handle.
    ///
    /// Idempotent: a duplicate announcement of an already-open segment is
    /// not an error — the redundant handle is released and the existing
    /// index returned, with no other mutation. If the key was previously
    /// registered as a placeholder, the handle is installed into it (the
    /// old reference, if any, is released only after the new one is in
    /// place). The first open segment makes the chain live: `current`
    /// moves to it and the switch notifier fires. A pending
    /// switch-to-newest is honored here as well.
    pub fn add_segment(&self, key: impl Into<SegmentKey>, handle: SegmentHandle, info: M) -> Result<usize> {
        let key = key.into();
        let mut state = self.lock_state()?;

        if let Some(index) = state.table.find(&key) {
            let already_open = state.table.get(index).is_some_and(|s| s.is_open());
            if already_open {
                drop(state);
                tracing::debug!(chain = %self.id, %key, index, "duplicate segment ignored");
                // Release the redundant handle outside the lock.
                self.provider.close(handle)?;
                return Ok(index);
            }
            // Placeholder: install the handle, then let the old one go.
            let old = state.table.install_handle(index, Arc::new(handle))?;
            drop(old);
            tracing::debug!(chain = %self.id, %key, index, "segment handle installed");
            self.after_append(&mut state, index)?;
            return Ok(index);
        }

        let index = state.table.append(key.clone(), Some(Arc::new(handle)), info)?;
        // The previous tail is final now; drop its cached length so the
        // next position calculation re-queries the settled value.
        if let Some(previous) = index.checked_sub(1).and_then(|i| state.table.get_mut(i)) {
            previous.length = None;
        }
        tracing::debug!(chain = %self.id, %key, index, "segment appended");
        self.after_append(&mut state, index)?;
        Ok(index)
    }

    /// Reads from the current position, advancing across segment
    /// boundaries automatically.
    ///
    /// Returns the number of bytes read. `Ok(0)` means either the final
    /// segment is exhausted (end of chain for now — on a live chain more
    /// bytes may arrive later) or `buf` is empty. A provider error during
    /// a boundary-crossing retry is surfaced immediately; only exhaustion
    /// (zero bytes, no error) triggers the automatic advance.
    pub fn read(&self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            // Snapshot under the lock, read outside it.
            let (index, handle, cursor) = self.read_snapshot()?;
            let n = self.provider.read_at(&handle, cursor, buf)?;

            let mut state = self.lock_state()?;
            if state.current != Some(index) {
                // Position moved between snapshot and commit. Single
                // consumer makes this unreachable; re-run rather than
                // clobber the new position.
                continue;
            }
            if n > 0 {
                let segment = state.table.get_mut(index).ok_or(ChainError::InvalidState)?;
                segment.cursor = cursor + n as u64;
                return Ok(n);
            }
            // Exhausted: advance once per empty segment, stop at the tail.
            if index + 1 < state.table.len() {
                self.advance_locked(&mut state, index + 1)?;
            } else {
                return Ok(0);
            }
        }
    }

    /// Reports how many bytes could be read right now without blocking on
    /// the chain itself, pre-fetching nothing and consuming nothing.
    ///
    /// Follows the same advance-on-exhaustion contract as [`Chain::read`]:
    /// if the current segment is spent and a later segment exists, the
    /// chain switches forward before answering. Returns at most `len`.
    pub fn request_block(&self, len: usize) -> Result<usize> {
        if len == 0 {
            return Ok(0);
        }
        loop {
            let mut state = self.lock_state()?;
            let index = state.current.ok_or(ChainError::InvalidState)?;
            self.refresh_lengths_locked(&mut state)?;

            let segment = state.table.get(index).ok_or(ChainError::InvalidState)?;
            let cursor = segment.cursor();
            match segment.length() {
                Some(length) => {
                    let available = length.saturating_sub(cursor);
                    if available > 0 {
                        return Ok(usize::try_from(available.min(len as u64))
                            .unwrap_or(len));
                    }
                }
                None => {
                    // Unknown length: probe with a bounded scratch read,
                    // outside the lock.
                    let handle = segment
                        .handle_ref()
                        .ok_or_else(|| ChainError::NotOpen {
                            key: segment.key().clone(),
                        })?
                        .clone();
                    drop(state);

                    let mut scratch = vec![0u8; len.min(self.config.probe_chunk_size)];
                    let n = self.provider.read_at(&handle, cursor, &mut scratch)?;

                    let mut state = self.lock_state()?;
                    if state.current != Some(index) {
                        continue;
                    }
                    if n > 0 {
                        return Ok(n);
                    }
                    if index + 1 < state.table.len() {
                        self.advance_locked(&mut state, index + 1)?;
                    } else {
                        return Ok(0);
                    }
                    continue;
                }
            }

            // Known length, nothing left: advance or report end of chain.
            if index + 1 < state.table.len() {
                self.advance_locked(&mut state, index + 1)?;
            } else {
                return Ok(0);
            }
        }
    }

    /// Seeks the logical stream, switching segments as needed.
    ///
    /// Returns the new global offset. `Whence::Cur` with offset 0 is a
    /// pure position read and mutates nothing. An unresolvable target
    /// fails with [`ChainError::OutOfRange`] and leaves the chain
    /// untouched. Switching into the resolved segment can fail with
    /// [`ChainError::NotOpen`]; that too happens before any mutation, so
    /// `current` keeps its prior value on every error path.
    pub fn seek(&self, offset: i64, whence: Whence) -> Result<u64> {
        let mut state = self.lock_state()?;
        let current = state.current.ok_or(ChainError::InvalidState)?;
        self.refresh_lengths_locked(&mut state)?;

        if whence == Whence::Cur && offset == 0 {
            let cursor = state
                .table
                .get(current)
                .ok_or(ChainError::InvalidState)?
                .cursor();
            return position::global_offset(state.table.entries(), current, cursor);
        }

        let resolved = position::resolve(state.table.entries(), current, offset, whence)?;
        if resolved.index != current {
            self.switch_locked(&mut state, resolved.index)?;
        }
        let segment = state
            .table
            .get_mut(resolved.index)
            .ok_or(ChainError::InvalidState)?;
        segment.cursor = resolved.local;

        tracing::trace!(
            chain = %self.id,
            offset,
            %whence,
            index = resolved.index,
            local = resolved.local,
            "seek resolved"
        );
        position::global_offset(state.table.entries(), resolved.index, resolved.local)
    }

    /// Returns the current global stream offset without mutating anything.
    ///
    /// Equivalent to `seek(0, Whence::Cur)`.
    pub fn position(&self) -> Result<u64> {
        self.seek(0, Whence::Cur)
    }

    /// Switches the active segment to `index`.
    ///
    /// Returns `false` (no switch, no notification) if `index` is already
    /// current. The stored cursor of the target segment is preserved, so
    /// switching away and back resumes mid-segment.
    pub fn switch_to(&self, index: usize) -> Result<bool> {
        let mut state = self.lock_state()?;
        self.switch_locked(&mut state, index)
    }

    /// Switches to the newest segment.
    ///
    /// On an empty chain this arms `pending_switch_to_last` instead: the
    /// next append performs the switch, closing the race between the
    /// switch request and the segment's creation.
    pub fn switch_to_last(&self) -> Result<bool> {
        let mut state = self.lock_state()?;
        match state.table.last_index() {
            None => {
                state.pending_switch_to_last = true;
                tracing::debug!(chain = %self.id, "switch-to-last deferred until first append");
                Ok(false)
            }
            Some(last) => self.switch_locked(&mut state, last),
        }
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, ChainState<M>>> {
        self.state
            .lock()
            .map_err(|_| ChainError::internal("chain lock poisoned"))
    }

    /// Snapshot of (current index, handle, cursor) for a lock-free read.
    fn read_snapshot(&self) -> Result<(usize, Arc<SegmentHandle>, u64)> {
        let state = self.lock_state()?;
        let index = state.current.ok_or(ChainError::InvalidState)?;
        let segment = state.table.get(index).ok_or(ChainError::InvalidState)?;
        let handle = segment
            .handle_ref()
            .ok_or_else(|| ChainError::NotOpen {
                key: segment.key().clone(),
            })?
            .clone();
        Ok((index, handle, segment.cursor()))
    }

    /// First-segment and pending-switch handling after an append.
    fn after_append(&self, state: &mut ChainState<M>, index: usize) -> Result<()> {
        if state.current.is_none() {
            state.pending_switch_to_last = false;
            self.switch_locked(state, index)?;
        } else if state.pending_switch_to_last {
            state.pending_switch_to_last = false;
            let last = state
                .table
                .last_index()
                .ok_or_else(|| ChainError::internal("append left the table empty"))?;
            self.switch_locked(state, last)?;
        }
        Ok(())
    }

    /// Exhaustion advance. The logical position has just crossed the
    /// segment boundary, so the entered segment starts at its leading
    /// edge regardless of any cursor left by an earlier visit. Explicit
    /// [`Chain::switch_to`] keeps the stored cursor instead.
    fn advance_locked(&self, state: &mut ChainState<M>, index: usize) -> Result<()> {
        self.switch_locked(state, index)?;
        if let Some(segment) = state.table.get_mut(index) {
            segment.cursor = 0;
        }
        Ok(())
    }

    /// The one mutator of `current`. Serialised with appends and with
    /// itself by the chain lock; two switches never interleave.
    fn switch_locked(&self, state: &mut ChainState<M>, index: usize) -> Result<bool> {
        let len = state.table.len();
        let Some(target) = state.table.get(index) else {
            return Err(ChainError::BadIndex { index, len });
        };
        if state.current == Some(index) {
            return Ok(false);
        }
        // Secure the new reference before moving current. The table keeps
        // the old segment's handle alive, and any in-flight reader holds
        // its own clone, so no handle liveness gap is possible here.
        if !target.is_open() {
            return Err(ChainError::NotOpen {
                key: target.key().clone(),
            });
        }
        let previous = state.current.replace(index);
        tracing::debug!(chain = %self.id, from = ?previous, to = index, "switched active segment");

        let ChainState { table, notifier, .. } = state;
        if let Some(callback) = notifier.as_mut() {
            if let Some(segment) = table.get(index) {
                callback.on_switch(segment.info());
            }
        }
        Ok(true)
    }

    /// Re-queries provider lengths where they can still change: any
    /// segment without a known length, plus the final segment (a file
    /// backed tail reports a growing size rather than "unknown").
    ///
    /// Once a segment is no longer last its length is final per the chain
    /// invariant, and `after_append` pins it at append time, so this is at
    /// most two provider queries in the steady state.
    fn refresh_lengths_locked(&self, state: &mut ChainState<M>) -> Result<()> {
        let len = state.table.len();
        for index in 0..len {
            let is_last = index + 1 == len;
            let Some(segment) = state.table.get(index) else {
                continue;
            };
            if segment.length().is_some() && !is_last {
                continue;
            }
            let Some(handle) = segment.handle_ref().cloned() else {
                continue;
            };
            let length = self.provider.length(&handle)?;
            if let Some(segment) = state.table.get_mut(index) {
                segment.length = length;
            }
        }
        Ok(())
    }
}

impl<P: SegmentProvider, M> std::fmt::Debug for Chain<P, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain").field("id", &self.id).finish_non_exhaustive()
    }
}
