//! Vertical ordering of chain paths.
//!
//! - [`tracker`] keeps the current top-to-bottom order and scores any order
//!   through a relative-position matrix.
//! - [`manager`] runs the local search that commits improving moves until
//!   none is left.

pub mod manager;
pub mod tracker;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::path::PathId;

pub use manager::StressManager;
pub use tracker::StressTracker;

/// One rendered track: neighbouring paths of the ranking whose windows do
/// not overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackDetails {
    /// Sub-rows needed by the tallest member path.
    pub height: usize,
    pub path_ids: Vec<PathId>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// A candidate rearrangement of the current order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StressMove {
    Swap(PathId, PathId),
    Converge(PathId, PathId),
    MoveBelow(PathId, PathId),
    MoveToTop(PathId),
    Stay,
}

impl fmt::Display for StressMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StressMove::Swap(a, b) => write!(f, "swap {a} <-> {b}"),
            StressMove::Converge(a, b) => write!(f, "converge {a} and {b}"),
            StressMove::MoveBelow(a, b) => write!(f, "move {a} below {b}"),
            StressMove::MoveToTop(a) => write!(f, "move {a} to top"),
            StressMove::Stay => write!(f, "stay"),
        }
    }
}
