//! # livereel-chain: Seekable Live Segment Chain
//!
//! The core of livereel: presents one logical, seekable, continuously
//! growing byte stream to a single consumer while the actual bytes are
//! produced piecewise by an unbounded sequence of independently opened
//! segments appended concurrently with being read.
//!
//! # Architecture
//!
//! ```text
//! producer signal ──► Chain::add_segment ─┐
//!                                         ▼
//!                        ┌──────────────────────────────┐
//!                        │        Chain (mutex)         │
//!                        │  SegmentTable ── current idx │
//!                        │  position translator (pure)  │
//!                        └──────────────┬───────────────┘
//! consumer ──► read/seek/request_block  │  SegmentProvider (read_at)
//!                                       ▼
//!                            switch notifier (on change)
//! ```
//!
//! Appends are strictly append-only and serialised with switches; reads
//! block on provider I/O outside the chain lock. See [`Chain`] for the
//! full concurrency contract.

mod chain;
mod error;
mod position;
mod segment;

pub use chain::{Chain, ChainConfig, SwitchNotifier};
pub use error::{ChainError, Result};
pub use position::{global_offset, resolve, Resolved};
pub use segment::{Segment, SegmentTable};

// Re-exported so chain consumers need only this crate for the common path.
pub use livereel_types::{ChainId, SegmentKey, Whence};
