//! Row-level grouping of chains.
//!
//! - [`chain_path`] is one candidate row: an ordered list of chains.
//! - [`builder`] groups a chain map into paths, following familiarity.
//! - [`map`] owns the paths and their pairwise interconnection strengths.

pub mod builder;
pub mod chain_path;
pub mod map;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::task::UnitId;

pub use builder::ChainPathBuilder;
pub use chain_path::ChainPath;
pub use map::SimpleChainPathMap;

/// Identifier of a [`ChainPath`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathId(String);

impl PathId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PathId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PathId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<&UnitId> for PathId {
    fn from(value: &UnitId) -> Self {
        Self(value.as_str().to_string())
    }
}
