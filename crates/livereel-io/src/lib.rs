//! # livereel-io: Segment Provider Abstraction for livereel
//!
//! This crate provides a trait-based abstraction over the byte-range
//! providers that back individual chain segments, enabling the chain layer
//! to stay agnostic of where segment bytes actually come from:
//!
//! - **`FileProvider`**: segments backed by local files (a finished
//!   recording, or a transfer spooled to disk by an external downloader)
//! - **`MemoryProvider`**: segments backed by in-memory buffers, including
//!   still-growing "live" buffers with unknown length; also serves as the
//!   mock provider for chain tests
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────┐
//! │        livereel-chain        │
//! │  (uses SegmentProvider trait)│
//! └──────────────┬───────────────┘
//!                │
//! ┌──────────────┴───────────────┐
//! │         livereel-io          │
//! │  ┌──────────┐  ┌──────────┐  │
//! │  │   File   │  │  Memory  │  │
//! │  │ Provider │  │ Provider │  │
//! │  └──────────┘  └──────────┘  │
//! └──────────────────────────────┘
//! ```
//!
//! All reads are positional (`read_at`); the chain layer owns the per
//! segment read cursor. This keeps shared segment handles free of interior
//! mutability, so an in-flight reader can hold a plain `Arc<SegmentHandle>`
//! across a concurrent segment switch.

mod error;
mod file;
mod memory;
mod provider;

pub use error::ProviderError;
pub use file::FileProvider;
pub use memory::MemoryProvider;
pub use provider::{SegmentHandle, SegmentProvider};

#[cfg(test)]
mod tests;
