//! Error types for the growable array and both table variants.
//!
//! Every allocation the crate performs on its own behalf (bucket arrays,
//! growable-array backing storage) is fallible and reported here instead of
//! aborting. Key misses are not errors; lookups return `Option`.

use std::collections::TryReserveError;
use thiserror::Error;

/// Failures raised by [`GrowVec`](crate::vector::GrowVec).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VecError {
    #[error("index {index} out of bounds for growable array of length {len}")]
    OutOfBounds { index: usize, len: usize },
    #[error("growable array capacity overflow (capacity {capacity})")]
    CapacityOverflow { capacity: usize },
    #[error("growable array allocation of {requested} slots failed")]
    OutOfMemory { requested: usize },
}

/// Failures raised by the table variants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("table capacity must be non-zero")]
    ZeroCapacity,
    #[error("growth factor must be non-zero")]
    ZeroGrowthFactor,
    #[error("bucket count overflow (capacity {capacity})")]
    CapacityOverflow { capacity: usize },
    #[error("growing to {capacity} buckets exceeds the configured limit of {limit}")]
    CapacityLimit { capacity: usize, limit: usize },
    #[error("bucket array allocation of {requested} buckets failed")]
    OutOfMemory { requested: usize },
    #[error(transparent)]
    Vector(#[from] VecError),
}

pub type Result<T, E = TableError> = std::result::Result<T, E>;

// TryReserveError does not expose which case it hit on stable; both map to
// the caller-visible "allocation refused" outcome.
pub(crate) fn table_oom(requested: usize, _e: TryReserveError) -> TableError {
    TableError::OutOfMemory { requested }
}

pub(crate) fn vec_oom(requested: usize, _e: TryReserveError) -> VecError {
    VecError::OutOfMemory { requested }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_errors_convert_into_table_errors() {
        let e: TableError = VecError::OutOfBounds { index: 3, len: 1 }.into();
        assert_eq!(
            e.to_string(),
            "index 3 out of bounds for growable array of length 1"
        );
        assert!(matches!(e, TableError::Vector(VecError::OutOfBounds { .. })));
    }

    #[test]
    fn display_mentions_capacity() {
        let e = TableError::CapacityOverflow { capacity: 7 };
        assert_eq!(e.to_string(), "bucket count overflow (capacity 7)");
    }
}
