use std::collections::{BTreeMap, BTreeSet, HashMap};

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use super::TaskGraph;
use crate::errors::{LayoutError, Result};
use crate::task::{TaskRecord, TaskUnit, UnitId};

pub struct GraphBuilder {
    records: Vec<TaskRecord>,
}

impl GraphBuilder {
    pub fn new(records: Vec<TaskRecord>) -> Self {
        Self { records }
    }

    pub fn build(self) -> Result<TaskGraph> {
        // Step 1: Validate ids, windows and dependency references
        let records = self.index_records()?;

        // Step 2: Determine a dependency-first order
        let order = Self::topological_order(&records)?;

        // Step 3: Derive statistics bottom-up
        let units = Self::derive_units(&records, &order);

        // Step 4: Build the dependents lookup from the reduced edges
        let mut dependents: BTreeMap<UnitId, BTreeSet<UnitId>> = units
            .keys()
            .map(|id| (id.clone(), BTreeSet::new()))
            .collect();
        for unit in units.values() {
            for dep in &unit.direct_dependencies {
                if let Some(set) = dependents.get_mut(dep) {
                    set.insert(unit.id.clone());
                }
            }
        }

        debug!(units = units.len(), "task graph built");

        Ok(TaskGraph {
            units,
            topological_order: order,
            dependents,
        })
    }

    fn index_records(self) -> Result<BTreeMap<UnitId, TaskRecord>> {
        let mut records = BTreeMap::new();
        for record in self.records {
            Self::validate_window(&record)?;
            if records.contains_key(&record.id) {
                return Err(LayoutError::DuplicateUnit(record.id));
            }
            records.insert(record.id.clone(), record);
        }

        for record in records.values() {
            if let Some(missing) = record
                .dependencies
                .iter()
                .find(|dep| !records.contains_key(*dep))
            {
                return Err(LayoutError::UnknownDependency {
                    unit: record.id.clone(),
                    dependency: missing.clone(),
                });
            }
        }

        Ok(records)
    }

    fn validate_window(record: &TaskRecord) -> Result<()> {
        let invalid = |reason: &str| LayoutError::InvalidTimeWindow {
            unit: record.id.clone(),
            reason: reason.to_string(),
        };

        if record.anticipated_end < record.anticipated_start {
            return Err(invalid("anticipated end precedes anticipated start"));
        }
        let apparent_start = record.apparent_start_or_anticipated();
        let apparent_end = record.apparent_end_or_anticipated();
        if apparent_end < apparent_start {
            return Err(invalid("apparent end precedes apparent start"));
        }
        if apparent_start < record.anticipated_start {
            return Err(invalid("apparent start precedes anticipated start"));
        }
        if apparent_end < record.anticipated_end {
            return Err(invalid("apparent end precedes anticipated end"));
        }
        Ok(())
    }

    fn topological_order(records: &BTreeMap<UnitId, TaskRecord>) -> Result<Vec<UnitId>> {
        let mut graph: DiGraph<UnitId, ()> = DiGraph::new();
        let mut id_to_index: HashMap<&UnitId, NodeIndex> = HashMap::new();

        for id in records.keys() {
            id_to_index.insert(id, graph.add_node(id.clone()));
        }

        // Edges: dependency -> dependent
        for record in records.values() {
            let dependent = id_to_index[&record.id];
            for dep in &record.dependencies {
                graph.add_edge(id_to_index[dep], dependent, ());
            }
        }

        let order = toposort(&graph, None)
            .map_err(|cycle| LayoutError::DependencyCycle(graph[cycle.node_id()].clone()))?;

        Ok(order.into_iter().map(|ix| graph[ix].clone()).collect())
    }

    /// `order` must list dependencies before dependents, so every lookup into
    /// `units` below hits an already finalised unit.
    fn derive_units(
        records: &BTreeMap<UnitId, TaskRecord>,
        order: &[UnitId],
    ) -> BTreeMap<UnitId, TaskUnit> {
        let mut units: BTreeMap<UnitId, TaskUnit> = BTreeMap::new();

        for id in order {
            let record = &records[id];
            let declared: BTreeSet<&UnitId> = record.dependencies.iter().collect();

            let mut all_dependencies = BTreeSet::new();
            for dep in &declared {
                all_dependencies.insert((*dep).clone());
                all_dependencies.extend(units[*dep].all_dependencies.iter().cloned());
            }

            // Drop edges already implied through another declared dependency.
            let direct_dependencies: BTreeSet<UnitId> = declared
                .iter()
                .filter(|dep| {
                    !declared
                        .iter()
                        .any(|other| other != *dep && units[*other].all_dependencies.contains(**dep))
                })
                .map(|dep| (*dep).clone())
                .collect();

            // Counts double at every fork-and-join, so long ladders saturate.
            let mut paths_to_dependencies: BTreeMap<UnitId, u64> = BTreeMap::new();
            let mut attachment_to_dependencies: u64 = 0;
            for dep in &direct_dependencies {
                let dep_unit = &units[dep];
                let direct = paths_to_dependencies.entry(dep.clone()).or_default();
                *direct = direct.saturating_add(1);
                for (target, count) in &dep_unit.paths_to_dependencies {
                    let entry = paths_to_dependencies.entry(target.clone()).or_default();
                    *entry = entry.saturating_add(*count);
                }
                attachment_to_dependencies = attachment_to_dependencies
                    .saturating_add(dep_unit.attachment_to_dependencies.max(1));
            }

            units.insert(
                id.clone(),
                TaskUnit {
                    id: id.clone(),
                    name: record.name.clone(),
                    anticipated_start: record.anticipated_start,
                    anticipated_end: record.anticipated_end,
                    apparent_start: record.apparent_start_or_anticipated(),
                    apparent_end: record.apparent_end_or_anticipated(),
                    direct_dependencies,
                    all_dependencies,
                    paths_to_dependencies,
                    attachment_to_dependencies,
                },
            );
        }

        units
    }
}
