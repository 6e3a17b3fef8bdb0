//! Debug assertion macros for ring buffer invariants.
//!
//! They are only active in debug builds (`#[cfg(debug_assertions)]`), so there
//! is zero overhead in release builds.
//!
//! Checked by `State::check_invariants()` at the end of every mutating
//! operation, while the lock is still held.

// =============================================================================
// Bounded Occupancy
// =============================================================================

/// Assert that occupancy does not exceed capacity.
///
/// **Invariant**: `0 ≤ occupancy ≤ capacity`
macro_rules! debug_assert_bounded_occupancy {
    ($occupancy:expr, $capacity:expr) => {
        debug_assert!(
            $occupancy <= $capacity,
            "bounded occupancy violated: occupancy {} exceeds capacity {}",
            $occupancy,
            $capacity
        )
    };
}

// =============================================================================
// Index Range
// =============================================================================

/// Assert that a position lies inside storage.
///
/// **Invariant**: `0 ≤ index < capacity`
macro_rules! debug_assert_index_in_range {
    ($name:literal, $index:expr, $capacity:expr) => {
        debug_assert!(
            $index < $capacity,
            "index range violated: {} is {} but capacity is {}",
            $name,
            $index,
            $capacity
        )
    };
}

// =============================================================================
// Occupancy Consistency
// =============================================================================

/// Assert that occupancy matches the forward distance read → write.
///
/// **Invariant**: `occupancy ≡ write_index - read_index (mod capacity)`, and a
/// full buffer has `read_index == write_index`.
macro_rules! debug_assert_occupancy_consistent {
    ($read:expr, $write:expr, $occupancy:expr, $capacity:expr) => {
        debug_assert!(
            ($read + $occupancy) % $capacity == $write,
            "occupancy consistency violated: read {} + occupancy {} does not reach write {} (capacity {})",
            $read,
            $occupancy,
            $write,
            $capacity
        )
    };
}

// =============================================================================
// Re-exports for crate-internal use
// =============================================================================

pub(crate) use debug_assert_bounded_occupancy;
pub(crate) use debug_assert_index_in_range;
pub(crate) use debug_assert_occupancy_consistent;
