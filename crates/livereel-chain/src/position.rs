//! Position translation: global stream offsets to (segment, local offset).
//!
//! Pure functions over a snapshot of the segment table and the current
//! index. Nothing here mutates chain state; the controller applies the
//! resolved position afterwards.
//!
//! # Boundary tie-break
//!
//! A target that lands exactly on a segment boundary resolves to the
//! *leading edge* of the later segment (local offset 0), with one
//! exception: the very end of the chain resolves to the trailing edge of
//! the final segment, so seeking to the exact logical end is valid and a
//! read there yields zero bytes. The same rule is applied to every whence,
//! so forward and backward walks that net the same global offset agree on
//! the resolved segment.
//!
//! # Unknown lengths
//!
//! Only the final segment may have an unknown (still-growing) length. For
//! forward walks it is treated as open-ended: any non-negative remaining
//! offset resolves into it. `Whence::End` needs the current segment's
//! length and fails with `OutOfRange` while that length is unknown.

use livereel_types::Whence;

use crate::error::{ChainError, Result};
use crate::segment::Segment;

/// A resolved stream position: segment index plus local byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    /// Index of the target segment.
    pub index: usize,
    /// Byte offset within that segment.
    pub local: u64,
}

/// Resolves a seek against a table snapshot.
///
/// `current` must be a valid index. `Whence::Cur` with offset 0 resolves to
/// the current position without any walk (a pure position read).
pub fn resolve<M>(
    segments: &[Segment<M>],
    current: usize,
    offset: i64,
    whence: Whence,
) -> Result<Resolved> {
    match whence {
        Whence::Set => resolve_from_start(segments, offset),
        Whence::Cur => {
            let cursor = segment_at(segments, current)?.cursor;
            if offset == 0 {
                return Ok(Resolved {
                    index: current,
                    local: cursor,
                });
            }
            walk(segments, current, i128::from(cursor) + i128::from(offset))
        }
        Whence::End => {
            // Relative to the end of the *current* segment: on a live chain
            // that is the only stable notion of "end".
            let length = segment_at(segments, current)?
                .length
                .ok_or(ChainError::OutOfRange)?;
            walk(segments, current, i128::from(length) + i128::from(offset))
        }
    }
}

/// Computes the global stream offset of (index, local).
///
/// Every segment before `index` must have a known length; the chain
/// invariant that only the final segment may be unknown guarantees this
/// for any resolvable position.
pub fn global_offset<M>(segments: &[Segment<M>], index: usize, local: u64) -> Result<u64> {
    let mut total = local;
    for segment in segments.iter().take(index) {
        let length = segment.length.ok_or_else(|| {
            ChainError::internal("segment with unknown length before resolved position")
        })?;
        total = total
            .checked_add(length)
            .ok_or_else(|| ChainError::internal("stream offset overflow"))?;
    }
    Ok(total)
}

/// SEEK_SET: walk forward from the first segment accumulating lengths.
fn resolve_from_start<M>(segments: &[Segment<M>], offset: i64) -> Result<Resolved> {
    if offset < 0 {
        return Err(ChainError::OutOfRange);
    }
    if segments.is_empty() {
        return Err(ChainError::OutOfRange);
    }
    walk(segments, 0, i128::from(offset))
}

/// Walks from `start`'s leading edge plus a signed local position until the
/// position fits within one segment's span.
fn walk<M>(segments: &[Segment<M>], start: usize, position: i128) -> Result<Resolved> {
    let mut index = start;
    let mut position = position;

    // Backward across boundaries
    while position < 0 {
        if index == 0 {
            return Err(ChainError::OutOfRange);
        }
        index -= 1;
        let length = segment_at(segments, index)?
            .length
            .ok_or(ChainError::OutOfRange)?;
        position += i128::from(length);
    }

    // Forward across boundaries
    loop {
        let is_last = index + 1 == segments.len();
        match segment_at(segments, index)?.length {
            // Still-growing tail absorbs any remaining forward offset.
            None => break,
            Some(length) => {
                let length = i128::from(length);
                if position < length || (is_last && position == length) {
                    break;
                }
                if is_last {
                    return Err(ChainError::OutOfRange);
                }
                position -= length;
                index += 1;
            }
        }
    }

    Ok(Resolved {
        index,
        local: u64::try_from(position)
            .map_err(|_| ChainError::internal("resolved local offset out of u64 range"))?,
    })
}

fn segment_at<M>(segments: &[Segment<M>], index: usize) -> Result<&Segment<M>> {
    segments.get(index).ok_or(ChainError::BadIndex {
        index,
        len: segments.len(),
    })
}
