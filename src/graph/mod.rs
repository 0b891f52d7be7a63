//! Task-unit dependency graph.
//!
//! - [`builder`] turns caller-supplied [`TaskRecord`]s into a [`TaskGraph`]
//!   in two explicit phases: topological ordering, then bottom-up derivation
//!   of path counts and attachment.

pub mod builder;

use std::collections::{BTreeMap, BTreeSet};

use crate::errors::{LayoutError, Result};
use crate::task::{TaskRecord, TaskUnit, UnitId};

pub use builder::GraphBuilder;

/// Immutable snapshot of every task unit and its dependency edges.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    pub(crate) units: BTreeMap<UnitId, TaskUnit>,
    /// Dependencies always precede their dependents.
    pub(crate) topological_order: Vec<UnitId>,
    /// Reverse of the non-redundant direct dependency edges.
    pub(crate) dependents: BTreeMap<UnitId, BTreeSet<UnitId>>,
}

impl TaskGraph {
    pub fn build(records: Vec<TaskRecord>) -> Result<Self> {
        GraphBuilder::new(records).build()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn contains(&self, id: &UnitId) -> bool {
        self.units.contains_key(id)
    }

    pub fn unit(&self, id: &UnitId) -> Result<&TaskUnit> {
        self.units
            .get(id)
            .ok_or_else(|| LayoutError::UnitNotFound(id.clone()))
    }

    /// Units in dependency-first order.
    pub fn units(&self) -> impl Iterator<Item = &TaskUnit> {
        self.topological_order
            .iter()
            .filter_map(|id| self.units.get(id))
    }

    pub fn topological_order(&self) -> &[UnitId] {
        &self.topological_order
    }

    pub fn direct_dependents(&self, id: &UnitId) -> Result<&BTreeSet<UnitId>> {
        self.dependents
            .get(id)
            .ok_or_else(|| LayoutError::UnitNotFound(id.clone()))
    }

    /// Units nothing depends on.
    pub fn heads(&self) -> Vec<UnitId> {
        self.topological_order
            .iter()
            .filter(|id| self.dependents.get(*id).is_none_or(BTreeSet::is_empty))
            .cloned()
            .collect()
    }

    /// The roots plus every unit they transitively depend on.
    pub fn closure_of(&self, roots: &[UnitId]) -> Result<BTreeSet<UnitId>> {
        let mut closure = BTreeSet::new();
        for root in roots {
            let unit = self.unit(root)?;
            closure.insert(root.clone());
            closure.extend(unit.all_dependencies.iter().cloned());
        }
        Ok(closure)
    }
}
