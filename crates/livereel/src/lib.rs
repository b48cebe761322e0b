//! # livereel
//!
//! One logical, seekable, continuously growing byte stream over an
//! unbounded chain of independently opened transfer segments — the
//! storage-engine core of a live-TV/timeshift player, without the player.
//!
//! A producer appends segments as a backend creates them; a single
//! consumer reads, seeks, and pre-fetches as if the chain were one file.
//! Boundary-crossing reads advance automatically, rewinds re-enter any
//! prior segment, and a switch notifier reports every change of the
//! active segment.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                        livereel                         │
//! │  ┌──────────┐   ┌───────────────┐   ┌────────────────┐  │
//! │  │  types   │ → │     chain     │ → │       io       │  │
//! │  │ (ids/whence) │ (table/seek/  │   │ (providers:    │  │
//! │  │          │   │  switch core) │   │  file, memory) │  │
//! │  └──────────┘   └───────────────┘   └────────────────┘  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use livereel::{Chain, MemoryProvider, SegmentProvider, Whence};
//!
//! # fn main() -> livereel::Result<()> {
//! let provider = Arc::new(MemoryProvider::new());
//! provider.create("mem://part0", b"first segment ");
//! provider.create("mem://part1", b"second segment");
//!
//! let chain: Chain<MemoryProvider, ()> = Chain::new("demo", Arc::clone(&provider));
//! for key in ["mem://part0", "mem://part1"] {
//!     let handle = provider.open(key)?;
//!     chain.add_segment(key, handle, ())?;
//! }
//!
//! // Reads cross segment boundaries transparently.
//! chain.seek(6, Whence::Set)?;
//! let mut buf = [0u8; 16];
//! let n = chain.read(&mut buf)?;
//! assert_eq!(&buf[..n], b"segment ");
//! # Ok(())
//! # }
//! ```

pub use livereel_chain::{
    Chain, ChainConfig, ChainError, Result, Segment, SegmentTable, SwitchNotifier,
};
pub use livereel_io::{FileProvider, MemoryProvider, ProviderError, SegmentHandle, SegmentProvider};
pub use livereel_types::{ChainId, SegmentKey, Whence};
