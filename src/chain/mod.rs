//! Decomposition of a task-unit DAG into linear dependency chains.
//!
//! - [`isolated`] holds a single validated chain and its date/density figures.
//! - [`map`] partitions a closed set of units into chains and answers
//!   chain-to-chain relationship queries.
//! - [`unit_path_matrix`] holds adjacency and path counts over a closed unit set.

pub mod isolated;
pub mod map;
pub mod unit_path_matrix;

pub use isolated::IsolatedDependencyChain;
pub use map::SimpleChainMap;
pub use unit_path_matrix::UnitPathMatrix;
