use std::collections::{BTreeSet, HashMap};

use crate::errors::{LayoutError, Result};
use crate::graph::TaskGraph;
use crate::matrix::Matrix;
use crate::task::UnitId;

/// Reachability bookkeeping for a closed set of units.
///
/// `adjacency[i][j]` is 1 when unit `i` directly depends on unit `j`, and
/// `path_counts[i][j]` is the sum of the powers of `adjacency` at that
/// position: the number of distinct paths from `i` down to `j`. The set must
/// be closed under dependency, so that sum equals the per-unit counts the
/// graph builder derives bottom-up; those are read instead of multiplying
/// the matrix out. Counts saturate at `u64::MAX`.
#[derive(Debug, Clone)]
pub struct UnitPathMatrix {
    unit_ids: Vec<UnitId>,
    index: HashMap<UnitId, usize>,
    adjacency: Matrix<u64>,
    path_counts: Matrix<u64>,
    heads: BTreeSet<UnitId>,
}

impl UnitPathMatrix {
    pub fn new(graph: &TaskGraph, units: &BTreeSet<UnitId>) -> Result<Self> {
        if units.is_empty() {
            return Err(LayoutError::StructuralRange(
                "unit path matrix needs at least one unit".into(),
            ));
        }

        let unit_ids: Vec<UnitId> = units.iter().cloned().collect();
        let index: HashMap<UnitId, usize> = unit_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();

        let mut rows = vec![vec![0u64; unit_ids.len()]; unit_ids.len()];
        let mut counts = vec![vec![0u64; unit_ids.len()]; unit_ids.len()];
        for (i, id) in unit_ids.iter().enumerate() {
            let unit = graph.unit(id)?;
            let outside = unit
                .all_dependencies()
                .iter()
                .find(|dep| !index.contains_key(*dep));
            if let Some(outside) = outside {
                return Err(LayoutError::StructuralRange(format!(
                    "unit {id} depends on {outside}, which is outside the unit set"
                )));
            }
            for dep in unit.direct_dependencies() {
                rows[i][index[dep]] = 1;
            }
            for dep in unit.all_dependencies() {
                counts[i][index[dep]] = unit.get_number_of_paths_to_dependency(dep);
            }
        }
        let adjacency = Matrix::new(rows)?;
        let path_counts = Matrix::new(counts)?;

        let mut heads = BTreeSet::new();
        for (j, id) in unit_ids.iter().enumerate() {
            if adjacency.get_column(j)?.iter().all(|&v| v == 0) {
                heads.insert(id.clone());
            }
        }

        Ok(Self {
            unit_ids,
            index,
            adjacency,
            path_counts,
            heads,
        })
    }

    pub fn unit_ids(&self) -> &[UnitId] {
        &self.unit_ids
    }

    pub fn contains(&self, unit: &UnitId) -> bool {
        self.index.contains_key(unit)
    }

    /// Units no other unit in the set depends on.
    pub fn heads(&self) -> &BTreeSet<UnitId> {
        &self.heads
    }

    pub fn is_head(&self, unit: &UnitId) -> bool {
        self.heads.contains(unit)
    }

    /// Heads of what remains once `excluded` is taken out of consideration.
    pub fn get_head_units_without_isolated_units(&self, excluded: &BTreeSet<UnitId>) -> Vec<UnitId> {
        let remaining: Vec<usize> = (0..self.unit_ids.len())
            .filter(|&i| !excluded.contains(&self.unit_ids[i]))
            .collect();

        remaining
            .iter()
            .filter(|&&j| {
                remaining
                    .iter()
                    .all(|&i| self.adjacency.rows()[i][j] == 0)
            })
            .map(|&j| self.unit_ids[j].clone())
            .collect()
    }

    pub fn get_number_of_paths_between(&self, from: &UnitId, to: &UnitId) -> Result<u64> {
        let i = self.position(from)?;
        let j = self.position(to)?;
        self.path_counts.get_element_at_position(i, j)
    }

    /// Paths reaching `unit` from every head; heads themselves get 0.
    pub fn get_number_of_inbound_paths(&self, unit: &UnitId) -> Result<u64> {
        let j = self.position(unit)?;
        let column = self.path_counts.get_column(j)?;
        Ok(self
            .heads
            .iter()
            .filter_map(|head| self.index.get(head))
            .fold(0u64, |total, &i| total.saturating_add(column[i])))
    }

    /// Paths reaching `unit` from every head. A head reports 1, as reaching
    /// itself needs no path to be counted.
    pub fn get_number_of_paths_to_unit(&self, unit: &UnitId) -> Result<u64> {
        Ok(self.get_number_of_inbound_paths(unit)?.max(1))
    }

    fn position(&self, unit: &UnitId) -> Result<usize> {
        self.index
            .get(unit)
            .copied()
            .ok_or_else(|| LayoutError::UnitNotFound(unit.clone()))
    }
}
