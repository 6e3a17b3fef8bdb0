//! Wrap-around index arithmetic shared by the read, write, skip and mark paths.
//!
//! All positions live in `[0, capacity)`. Callers guarantee `capacity > 0`.

/// Moves `pos` forward by `n` slots, wrapping at `capacity`.
#[inline]
pub(crate) fn advance(pos: usize, n: usize, capacity: usize) -> usize {
    (pos + n % capacity) % capacity
}

/// Forward distance from `from` to `to`.
///
/// Equal positions yield 0, so a distance of a full lap is never reported.
#[inline]
pub(crate) fn distance(from: usize, to: usize, capacity: usize) -> usize {
    if to >= from {
        to - from
    } else {
        capacity - from + to
    }
}

/// Length of the run starting at `pos` that can be accessed without wrapping,
/// capped at `wanted`.
#[inline]
pub(crate) fn contiguous(pos: usize, wanted: usize, capacity: usize) -> usize {
    wanted.min(capacity - pos)
}
