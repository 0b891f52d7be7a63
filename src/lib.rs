//! Track layout for schedules of interdependent tasks.
//!
//! A task DAG is decomposed into linear chains, chains are grouped into
//! row-level paths by structural strain, and paths are ordered into tracks by
//! a local search that minimises strength-weighted vertical distance.

pub mod chain;
pub mod config;
pub mod errors;
pub mod graph;
pub mod layout;
pub mod logging;
pub mod matrix;
pub mod path;
pub mod persistence;
pub mod strain;
pub mod stress;
pub mod task;

pub use chain::{IsolatedDependencyChain, SimpleChainMap, UnitPathMatrix};
pub use config::{InitialOrder, LayoutConfig, LogLevel};
pub use errors::{LayoutError, Result};
pub use graph::TaskGraph;
pub use layout::TrackLayout;
pub use matrix::Matrix;
pub use path::{ChainPath, ChainPathBuilder, PathId, SimpleChainPathMap};
pub use persistence::{
    PersistenceError, load_snapshot_from_csv, load_snapshot_from_json, save_layout_to_json,
    save_snapshot_to_csv, save_snapshot_to_json,
};
pub use strain::ChainStrainMap;
pub use stress::{StressManager, StressMove, StressTracker, TrackDetails};
pub use task::{TaskRecord, TaskUnit, UnitId};
