use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::info;

use super::{ChainPath, PathId};
use crate::errors::{LayoutError, Result};
use crate::graph::TaskGraph;
use crate::task::UnitId;

pub type ConnectionStrengthMapping = BTreeMap<PathId, BTreeMap<PathId, u64>>;

/// Owns every [`ChainPath`] of a layout and how strongly each pair of paths
/// is tied together.
///
/// The strength between two paths is the number of direct dependency edges
/// with one end in each. Pairs without such edges are left out; every path
/// has an entry, possibly empty.
#[derive(Debug, Clone)]
pub struct SimpleChainPathMap<'g> {
    graph: &'g TaskGraph,
    paths: BTreeMap<PathId, ChainPath<'g>>,
    path_by_unit: HashMap<UnitId, PathId>,
    connection_strength_mapping: ConnectionStrengthMapping,
}

impl<'g> SimpleChainPathMap<'g> {
    pub fn new(paths: Vec<ChainPath<'g>>) -> Result<Self> {
        let Some(first) = paths.first() else {
            return Err(LayoutError::StructuralRange(
                "chain path map needs at least one path".into(),
            ));
        };
        let graph = first.chains()[0].graph();

        let mut by_id = BTreeMap::new();
        let mut path_by_unit = HashMap::new();
        for path in paths {
            for unit in path.units() {
                if let Some(owner) = path_by_unit.insert(unit.id().clone(), path.id().clone()) {
                    return Err(LayoutError::StructuralRange(format!(
                        "unit {} belongs to both path {owner} and path {}",
                        unit.id(),
                        path.id()
                    )));
                }
            }
            if by_id.contains_key(path.id()) {
                return Err(LayoutError::DuplicatePath(path.id().to_string()));
            }
            by_id.insert(path.id().clone(), path);
        }

        let connection_strength_mapping =
            Self::build_connection_strength_mapping(graph, &by_id, &path_by_unit)?;

        info!(
            paths = by_id.len(),
            connected_pairs = connection_strength_mapping
                .values()
                .map(BTreeMap::len)
                .sum::<usize>()
                / 2,
            "built chain path interconnections"
        );

        Ok(Self {
            graph,
            paths: by_id,
            path_by_unit,
            connection_strength_mapping,
        })
    }

    /// Paths are visited in id order. A path only tallies edges toward paths
    /// not yet visited; the earlier path's tally is copied back for the
    /// reverse direction, so each crossing edge is counted once.
    fn build_connection_strength_mapping(
        graph: &TaskGraph,
        paths: &BTreeMap<PathId, ChainPath<'g>>,
        path_by_unit: &HashMap<UnitId, PathId>,
    ) -> Result<ConnectionStrengthMapping> {
        let mut mapping: ConnectionStrengthMapping = paths
            .keys()
            .map(|id| (id.clone(), BTreeMap::new()))
            .collect();
        let mut processed: BTreeSet<&PathId> = BTreeSet::new();

        for (path_id, path) in paths {
            let mut tally: BTreeMap<PathId, u64> = BTreeMap::new();
            for unit in path.units() {
                let dependents = graph.direct_dependents(unit.id())?;
                for neighbour in unit.direct_dependencies().iter().chain(dependents.iter()) {
                    let Some(owner) = path_by_unit.get(neighbour) else {
                        continue;
                    };
                    if owner == path_id || processed.contains(owner) {
                        continue;
                    }
                    *tally.entry(owner.clone()).or_default() += 1;
                }
            }

            for (other, strength) in tally {
                if let Some(row) = mapping.get_mut(&other) {
                    row.insert(path_id.clone(), strength);
                }
                if let Some(row) = mapping.get_mut(path_id) {
                    row.insert(other, strength);
                }
            }
            processed.insert(path_id);
        }

        Ok(mapping)
    }

    pub fn graph(&self) -> &'g TaskGraph {
        self.graph
    }

    pub fn paths(&self) -> impl Iterator<Item = &ChainPath<'g>> {
        self.paths.values()
    }

    /// Path ids in sorted order.
    pub fn path_ids(&self) -> Vec<PathId> {
        self.paths.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn get_path_by_id(&self, id: &PathId) -> Result<&ChainPath<'g>> {
        self.paths
            .get(id)
            .ok_or_else(|| LayoutError::PathNotFound(id.to_string()))
    }

    pub fn get_path_of_unit(&self, unit: &UnitId) -> Result<&ChainPath<'g>> {
        let id = self
            .path_by_unit
            .get(unit)
            .ok_or_else(|| LayoutError::UnitNotFound(unit.clone()))?;
        self.get_path_by_id(id)
    }

    pub fn get_connections_for_path_by_id(&self, id: &PathId) -> Result<&BTreeMap<PathId, u64>> {
        self.connection_strength_mapping
            .get(id)
            .ok_or_else(|| LayoutError::PathNotFound(id.to_string()))
    }

    pub fn connection_strength_mapping(&self) -> &ConnectionStrengthMapping {
        &self.connection_strength_mapping
    }
}
