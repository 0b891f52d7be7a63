//! Crate-wide error type for graph construction and track layout.

use thiserror::Error;

use crate::task::UnitId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// Empty collections, uneven matrix rows, incompatible dimensions or
    /// out-of-bounds access.
    #[error("structural range error: {0}")]
    StructuralRange(String),

    /// Units passed to a chain do not form a strict head-to-tail dependency walk.
    #[error("dependency ordering violation: {0}")]
    OrderingViolation(String),

    #[error("task unit not found: {0}")]
    UnitNotFound(UnitId),

    #[error("chain not found: {0}")]
    ChainNotFound(String),

    #[error("chain path not found: {0}")]
    PathNotFound(String),

    #[error("duplicate chain path id: {0}")]
    DuplicatePath(String),

    #[error("duplicate task unit id: {0}")]
    DuplicateUnit(UnitId),

    #[error("task unit {unit} depends on unknown unit {dependency}")]
    UnknownDependency { unit: UnitId, dependency: UnitId },

    #[error("cycle detected in task dependencies at unit {0}")]
    DependencyCycle(UnitId),

    #[error("task unit {unit} has an invalid time window: {reason}")]
    InvalidTimeWindow { unit: UnitId, reason: String },
}

pub type Result<T> = std::result::Result<T, LayoutError>;
