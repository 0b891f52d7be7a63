use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use tracing::{debug, info};

use super::isolated::IsolatedDependencyChain;
use super::unit_path_matrix::UnitPathMatrix;
use crate::errors::{LayoutError, Result};
use crate::graph::TaskGraph;
use crate::task::UnitId;

/// Disjoint cover of a closed set of task units by dependency chains.
///
/// Chains are owned here by value; lookups resolve through the unit and head
/// indexes built at construction.
#[derive(Debug, Clone)]
pub struct SimpleChainMap<'g> {
    graph: &'g TaskGraph,
    closure: BTreeSet<UnitId>,
    chains: Vec<IsolatedDependencyChain<'g>>,
    chain_by_head: HashMap<UnitId, usize>,
    chain_by_unit: HashMap<UnitId, usize>,
    unit_path_matrix: UnitPathMatrix,
}

impl<'g> SimpleChainMap<'g> {
    /// Decompose everything reachable from `roots` into chains.
    pub fn new(graph: &'g TaskGraph, roots: &[UnitId]) -> Result<Self> {
        if roots.is_empty() {
            return Err(LayoutError::StructuralRange(
                "chain map needs at least one root unit".into(),
            ));
        }

        let closure = graph.closure_of(roots)?;
        let unit_path_matrix = UnitPathMatrix::new(graph, &closure)?;
        let chains = Self::decompose(graph, &closure, &unit_path_matrix)?;

        info!(
            roots = roots.len(),
            units = closure.len(),
            chains = chains.len(),
            "decomposed task units into chains"
        );

        Ok(Self::assemble(graph, closure, chains, unit_path_matrix))
    }

    /// Build a map from caller-supplied chains, each listed head first.
    ///
    /// The chains must cover every unit their members depend on, exactly once.
    pub fn from_chains(graph: &'g TaskGraph, chain_units: &[Vec<UnitId>]) -> Result<Self> {
        if chain_units.is_empty() {
            return Err(LayoutError::StructuralRange(
                "chain map needs at least one chain".into(),
            ));
        }

        let chains = chain_units
            .iter()
            .map(|ids| IsolatedDependencyChain::new(graph, ids))
            .collect::<Result<Vec<_>>>()?;

        let mut covered = BTreeSet::new();
        for chain in &chains {
            for id in chain.unit_ids() {
                if !covered.insert(id.clone()) {
                    return Err(LayoutError::StructuralRange(format!(
                        "unit {id} appears in more than one chain"
                    )));
                }
            }
        }

        let roots: Vec<UnitId> = covered.iter().cloned().collect();
        let closure = graph.closure_of(&roots)?;
        if let Some(missing) = closure.difference(&covered).next() {
            return Err(LayoutError::StructuralRange(format!(
                "unit {missing} is a dependency but belongs to no chain"
            )));
        }

        let unit_path_matrix = UnitPathMatrix::new(graph, &closure)?;
        Ok(Self::assemble(graph, closure, chains, unit_path_matrix))
    }

    fn assemble(
        graph: &'g TaskGraph,
        closure: BTreeSet<UnitId>,
        chains: Vec<IsolatedDependencyChain<'g>>,
        unit_path_matrix: UnitPathMatrix,
    ) -> Self {
        let mut chain_by_head = HashMap::new();
        let mut chain_by_unit = HashMap::new();
        for (idx, chain) in chains.iter().enumerate() {
            chain_by_head.insert(chain.id().clone(), idx);
            for id in chain.unit_ids() {
                chain_by_unit.insert(id.clone(), idx);
            }
        }

        Self {
            graph,
            closure,
            chains,
            chain_by_head,
            chain_by_unit,
            unit_path_matrix,
        }
    }

    /// Repeatedly take the current frontier of heads, walk each one down as
    /// far as the chain stays linear, and consume the walked units.
    ///
    /// A walk continues from a unit into its dependency only when that unit
    /// has exactly one dependency and the dependency has no other dependent
    /// inside the closure. Walks started from distinct frontier heads are
    /// therefore disjoint; within a round they are materialised by greatest
    /// strain, then greatest density, then lowest head id.
    fn decompose(
        graph: &'g TaskGraph,
        closure: &BTreeSet<UnitId>,
        unit_path_matrix: &UnitPathMatrix,
    ) -> Result<Vec<IsolatedDependencyChain<'g>>> {
        let mut consumed: BTreeSet<UnitId> = BTreeSet::new();
        let mut chains = Vec::new();

        while consumed.len() < closure.len() {
            let frontier = unit_path_matrix.get_head_units_without_isolated_units(&consumed);
            if frontier.is_empty() {
                // Only reachable with a cyclic closure, which the graph builder rejects.
                return Err(LayoutError::StructuralRange(
                    "no head units left while units remain unassigned".into(),
                ));
            }

            let mut round = Vec::with_capacity(frontier.len());
            for head in &frontier {
                let walk = Self::walk_from(graph, closure, &consumed, head)?;
                let chain = IsolatedDependencyChain::new(graph, &walk)?;
                let strain = unit_path_matrix
                    .get_number_of_inbound_paths(head)?
                    .saturating_add(chain.attachment_to_dependencies());
                round.push((strain, chain));
            }

            round.sort_by(|(strain_a, a), (strain_b, b)| {
                strain_b
                    .cmp(strain_a)
                    .then_with(|| {
                        b.visual_density()
                            .partial_cmp(&a.visual_density())
                            .unwrap_or(Ordering::Equal)
                    })
                    .then_with(|| a.id().cmp(b.id()))
            });

            for (strain, chain) in round {
                debug!(
                    head = %chain.id(),
                    units = chain.len(),
                    strain,
                    "materialised chain"
                );
                consumed.extend(chain.unit_ids().cloned());
                chains.push(chain);
            }
        }

        Ok(chains)
    }

    fn walk_from(
        graph: &TaskGraph,
        closure: &BTreeSet<UnitId>,
        consumed: &BTreeSet<UnitId>,
        head: &UnitId,
    ) -> Result<Vec<UnitId>> {
        let mut walk = vec![head.clone()];
        let mut current = graph.unit(head)?;

        while current.direct_dependencies().len() == 1 {
            let Some(next) = current.direct_dependencies().iter().next() else {
                break;
            };
            if consumed.contains(next) || walk.contains(next) {
                break;
            }
            let competing = graph
                .direct_dependents(next)?
                .iter()
                .filter(|dependent| closure.contains(*dependent))
                .count();
            if competing != 1 {
                break;
            }
            walk.push(next.clone());
            current = graph.unit(next)?;
        }

        Ok(walk)
    }

    pub fn graph(&self) -> &'g TaskGraph {
        self.graph
    }

    /// Every unit the decomposition covers.
    pub fn closure(&self) -> &BTreeSet<UnitId> {
        &self.closure
    }

    /// Chains in the order they were materialised.
    pub fn chains(&self) -> &[IsolatedDependencyChain<'g>] {
        &self.chains
    }

    pub fn unit_path_matrix(&self) -> &UnitPathMatrix {
        &self.unit_path_matrix
    }

    pub fn get_chain_by_id(&self, head: &UnitId) -> Result<&IsolatedDependencyChain<'g>> {
        self.chain_by_head
            .get(head)
            .map(|&idx| &self.chains[idx])
            .ok_or_else(|| LayoutError::ChainNotFound(head.to_string()))
    }

    pub fn get_chain_of_unit(&self, unit: &UnitId) -> Result<&IsolatedDependencyChain<'g>> {
        self.chain_by_unit
            .get(unit)
            .map(|&idx| &self.chains[idx])
            .ok_or_else(|| LayoutError::UnitNotFound(unit.clone()))
    }

    /// This map's own copy of `chain`, or a not-found error when the chain
    /// was not produced by this map.
    pub fn resolve_chain(
        &self,
        chain: &IsolatedDependencyChain<'_>,
    ) -> Result<&IsolatedDependencyChain<'g>> {
        match self.chain_by_head.get(chain.id()) {
            Some(&idx) if self.chains[idx].same_units_as(chain) => Ok(&self.chains[idx]),
            _ => Err(LayoutError::ChainNotFound(chain.id().to_string())),
        }
    }

    pub fn chains_are_connected(
        &self,
        a: &IsolatedDependencyChain<'_>,
        b: &IsolatedDependencyChain<'_>,
    ) -> bool {
        let touches = |from: &IsolatedDependencyChain<'_>, to: &IsolatedDependencyChain<'_>| {
            from.units()
                .iter()
                .any(|unit| unit.direct_dependencies().iter().any(|dep| to.contains(dep)))
        };
        touches(a, b) || touches(b, a)
    }

    /// Chains holding a direct dependency or a direct dependent of any member.
    pub fn get_chains_connected_to_chain(
        &self,
        chain: &IsolatedDependencyChain<'_>,
    ) -> Result<Vec<&IsolatedDependencyChain<'g>>> {
        let own = self.resolve_chain(chain)?;
        let mut neighbours = BTreeSet::new();
        for unit in own.units() {
            neighbours.extend(unit.direct_dependencies().iter().cloned());
            neighbours.extend(
                self.graph
                    .direct_dependents(unit.id())?
                    .iter()
                    .filter(|id| self.closure.contains(*id))
                    .cloned(),
            );
        }
        self.chains_owning(neighbours.iter(), own)
    }

    pub fn get_direct_dependencies_of_chain(
        &self,
        chain: &IsolatedDependencyChain<'_>,
    ) -> Result<Vec<&IsolatedDependencyChain<'g>>> {
        let own = self.resolve_chain(chain)?;
        self.chains_owning(own.get_external_dependencies().iter(), own)
    }

    /// Every chain this chain transitively depends on. Computed from the
    /// edges leaving the chain, so internal links never pull the chain itself in.
    pub fn get_all_dependencies_of_chain(
        &self,
        chain: &IsolatedDependencyChain<'_>,
    ) -> Result<Vec<&IsolatedDependencyChain<'g>>> {
        let own = self.resolve_chain(chain)?;
        let mut reachable = BTreeSet::new();
        for dep in own.get_external_dependencies() {
            reachable.insert(dep.clone());
            reachable.extend(self.graph.unit(dep)?.all_dependencies().iter().cloned());
        }
        self.chains_owning(reachable.iter(), own)
    }

    /// Chains holding a unit that directly depends on a member of `chain`.
    pub fn get_direct_dependents_of_chain(
        &self,
        chain: &IsolatedDependencyChain<'_>,
    ) -> Result<Vec<&IsolatedDependencyChain<'g>>> {
        let own = self.resolve_chain(chain)?;
        let mut dependents = BTreeSet::new();
        for unit in own.units() {
            dependents.extend(
                self.graph
                    .direct_dependents(unit.id())?
                    .iter()
                    .filter(|id| self.closure.contains(*id))
                    .cloned(),
            );
        }
        self.chains_owning(dependents.iter(), own)
    }

    /// Chains whose head is a head of the whole closure.
    pub fn get_head_chains(&self) -> Vec<&IsolatedDependencyChain<'g>> {
        let mut heads: Vec<_> = self
            .chains
            .iter()
            .filter(|chain| self.unit_path_matrix.is_head(chain.id()))
            .collect();
        heads.sort_by(|a, b| a.id().cmp(b.id()));
        heads
    }

    pub fn get_number_of_paths_to_unit(&self, unit: &UnitId) -> Result<u64> {
        self.unit_path_matrix.get_number_of_paths_to_unit(unit)
    }

    /// Distinct owning chains of `units`, excluding `own`, ordered by head id.
    fn chains_owning<'a>(
        &self,
        units: impl Iterator<Item = &'a UnitId>,
        own: &IsolatedDependencyChain<'g>,
    ) -> Result<Vec<&IsolatedDependencyChain<'g>>> {
        let mut indexes = BTreeSet::new();
        for unit in units {
            let idx = *self
                .chain_by_unit
                .get(unit)
                .ok_or_else(|| LayoutError::UnitNotFound(unit.clone()))?;
            indexes.insert(idx);
        }
        let mut owning: Vec<_> = indexes
            .into_iter()
            .map(|idx| &self.chains[idx])
            .filter(|chain| chain.id() != own.id())
            .collect();
        owning.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(owning)
    }
}
