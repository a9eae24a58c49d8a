use std::fmt::Debug;
use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KDTreeError {
    /// A point or query did not have as many coordinates as the tree has dimensions.
    #[error("Expected a point with {expected} dimensions, got {found}.")]
    DimensionMismatch { expected: usize, found: usize },

    /// The requested number of dimensions does not fit the tree (must be in `1..=255`).
    #[error("Invalid number of dimensions: {0}. Expected a value in 1..=255.")]
    InvalidDimensions(usize),

    /// The balance tolerance exceeds
    /// [`MAX_BALANCE_TOLERANCE`][crate::kdtree::MAX_BALANCE_TOLERANCE].
    #[error(
        "Invalid balance tolerance: {0}. Expected at most {}.",
        crate::kdtree::MAX_BALANCE_TOLERANCE
    )]
    InvalidBalanceTolerance(u32),

    #[error("Invalid dimension schedule: {0}")]
    InvalidSchedule(String),

    /// A coordinate or distance was NaN or infinite.
    #[error("Coordinates must be finite.")]
    NonFiniteCoordinate,

    #[error("Invalid optimization level {0}. Expected 0, 1 or 2.")]
    InvalidOptimizeLevel(u8),

    /// Returned by [`KDTree::validate`][crate::kdtree::KDTree::validate].
    #[error("Tree invariant violated: {0}")]
    InvariantViolation(String),
}

pub type Result<T> = std::result::Result<T, KDTreeError>;
