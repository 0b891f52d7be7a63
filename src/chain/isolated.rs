use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};

use crate::errors::{LayoutError, Result};
use crate::graph::TaskGraph;
use crate::task::{TaskUnit, UnitId};

/// A strictly ordered, non-branching run of task units.
///
/// `units[0]` is the head (the most dependent unit); every following unit is a
/// direct dependency of the one before it. The chain is identified by its
/// head's id.
#[derive(Debug, Clone)]
pub struct IsolatedDependencyChain<'g> {
    graph: &'g TaskGraph,
    units: Vec<&'g TaskUnit>,
    presence_time: Duration,
    external_dependencies: BTreeSet<UnitId>,
}

impl<'g> IsolatedDependencyChain<'g> {
    pub fn new(graph: &'g TaskGraph, unit_ids: &[UnitId]) -> Result<Self> {
        if unit_ids.is_empty() {
            return Err(LayoutError::StructuralRange(
                "a dependency chain needs at least one unit".into(),
            ));
        }

        let units = unit_ids
            .iter()
            .map(|id| graph.unit(id))
            .collect::<Result<Vec<_>>>()?;

        for pair in units.windows(2) {
            let (dependent, dependency) = (pair[0], pair[1]);
            if !dependent.is_directly_dependent_on(&dependency.id) {
                return Err(LayoutError::OrderingViolation(format!(
                    "{} does not directly depend on {}",
                    dependent.id, dependency.id
                )));
            }
        }

        let presence_time = units
            .iter()
            .fold(Duration::zero(), |acc, unit| acc + unit.presence_time());

        let members: BTreeSet<&UnitId> = units.iter().map(|u| &u.id).collect();
        let candidates: BTreeSet<&UnitId> = units
            .iter()
            .flat_map(|u| u.direct_dependencies.iter())
            .filter(|dep| !members.contains(dep))
            .collect();
        let mut external_dependencies = BTreeSet::new();
        for &candidate in &candidates {
            let implied = candidates.iter().any(|&other| {
                other != candidate
                    && graph
                        .unit(other)
                        .map(|u| u.is_dependent_on(candidate))
                        .unwrap_or(false)
            });
            if !implied {
                external_dependencies.insert(candidate.clone());
            }
        }

        Ok(Self {
            graph,
            units,
            presence_time,
            external_dependencies,
        })
    }

    /// Identifier of the chain (its head unit's id).
    pub fn id(&self) -> &UnitId {
        &self.head().id
    }

    pub fn graph(&self) -> &'g TaskGraph {
        self.graph
    }

    pub fn head(&self) -> &'g TaskUnit {
        self.units[0]
    }

    pub fn last_unit(&self) -> &'g TaskUnit {
        self.units[self.units.len() - 1]
    }

    pub fn units(&self) -> &[&'g TaskUnit] {
        &self.units
    }

    pub fn unit_ids(&self) -> impl Iterator<Item = &UnitId> + '_ {
        self.units.iter().map(|u| &u.id)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn contains(&self, unit: &UnitId) -> bool {
        self.units.iter().any(|u| &u.id == unit)
    }

    pub fn end_date(&self) -> DateTime<Utc> {
        self.head().apparent_end
    }

    pub fn anticipated_start_date(&self) -> DateTime<Utc> {
        self.last_unit().anticipated_start
    }

    pub fn time_span(&self) -> Duration {
        self.end_date() - self.anticipated_start_date()
    }

    pub fn presence_time(&self) -> Duration {
        self.presence_time
    }

    /// Presence over timespan. Above 1 when units overlap, below 1 when there
    /// are gaps between them.
    pub fn visual_density(&self) -> f64 {
        visual_density(self.presence_time, self.time_span())
    }

    pub fn attachment_to_dependencies(&self) -> u64 {
        self.head().attachment_to_dependencies
    }

    /// Units outside the chain that some member depends on directly, minus
    /// those only reachable through another such unit.
    pub fn get_external_dependencies(&self) -> &BTreeSet<UnitId> {
        &self.external_dependencies
    }

    /// Distinct non-redundant paths from this chain down to `other`'s last
    /// unit. Every edge into `other` continues through it to the last unit,
    /// whichever member it enters at.
    ///
    /// Only edges that leave the chain are followed, so internal links never
    /// add to the count.
    pub fn get_number_of_paths_to_dependency(&self, other: &IsolatedDependencyChain<'_>) -> u64 {
        let target = other.last_unit().id();
        let mut total: u64 = 0;
        for unit in &self.units {
            for dep in &unit.direct_dependencies {
                if self.contains(dep) {
                    continue;
                }
                let paths = if dep == target {
                    1
                } else {
                    self.graph
                        .unit(dep)
                        .map(|dep_unit| dep_unit.get_number_of_paths_to_dependency(target))
                        .unwrap_or(0)
                };
                total = total.saturating_add(paths);
            }
        }
        total
    }

    pub fn is_directly_dependent_on(&self, other: &IsolatedDependencyChain<'_>) -> bool {
        self.last_unit().is_directly_dependent_on(other.id())
    }

    pub(crate) fn same_units_as(&self, other: &IsolatedDependencyChain<'_>) -> bool {
        self.units.len() == other.units.len()
            && self.unit_ids().zip(other.unit_ids()).all(|(a, b)| a == b)
    }
}

/// A zero-length span counts as fully occupied.
pub(crate) fn visual_density(presence: Duration, span: Duration) -> f64 {
    let span_ms = span.num_milliseconds();
    if span_ms == 0 {
        return 1.0;
    }
    presence.num_milliseconds() as f64 / span_ms as f64
}
