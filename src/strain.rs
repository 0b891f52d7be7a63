//! Structural scoring of chains.
//!
//! The strain of a chain is the number of distinct paths reaching its head
//! from every head of the DAG, plus the number of paths leading out of it down
//! to every tail. Heads contribute no inbound paths of their own.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::trace;

use crate::chain::{IsolatedDependencyChain, SimpleChainMap};
use crate::errors::{LayoutError, Result};
use crate::path::ChainPath;
use crate::task::UnitId;

/// Best tail score below a chain and the next chains achieving it, by head id.
type Continuation<'m, 'g> = (u64, Vec<&'m IsolatedDependencyChain<'g>>);

#[derive(Debug, Clone)]
pub struct ChainStrainMap<'m, 'g> {
    chain_map: &'m SimpleChainMap<'g>,
    strains: BTreeMap<UnitId, u64>,
}

impl<'m, 'g> ChainStrainMap<'m, 'g> {
    pub fn new(chain_map: &'m SimpleChainMap<'g>) -> Result<Self> {
        let matrix = chain_map.unit_path_matrix();
        let mut strains = BTreeMap::new();
        for chain in chain_map.chains() {
            let strain = matrix
                .get_number_of_inbound_paths(chain.id())?
                .saturating_add(chain.attachment_to_dependencies());
            strains.insert(chain.id().clone(), strain);
        }
        Ok(Self { chain_map, strains })
    }

    pub fn chain_map(&self) -> &'m SimpleChainMap<'g> {
        self.chain_map
    }

    pub fn get_strain_of_chain(&self, chain: &IsolatedDependencyChain<'_>) -> Result<u64> {
        let own = self.chain_map.resolve_chain(chain)?;
        self.strains
            .get(own.id())
            .copied()
            .ok_or_else(|| LayoutError::ChainNotFound(own.id().to_string()))
    }

    /// Summed strain of every chain in the path.
    pub fn get_strain_of_path(&self, path: &ChainPath<'_>) -> Result<u64> {
        path.chains().iter().try_fold(0u64, |total, chain| {
            Ok(total.saturating_add(self.get_strain_of_chain(chain)?))
        })
    }

    /// The first chain's strain plus, for each later chain, its familiarity
    /// as seen from the chain before it.
    pub fn get_relative_familiarity_of_path(&self, path: &ChainPath<'_>) -> Result<u64> {
        let chains: Vec<&IsolatedDependencyChain<'_>> = path.chains().iter().collect();
        self.get_relative_familiarity_of_chains(&chains)
    }

    pub fn get_relative_familiarity_of_chains(
        &self,
        chains: &[&IsolatedDependencyChain<'_>],
    ) -> Result<u64> {
        let Some(first) = chains.first() else {
            return Ok(0);
        };
        let mut total = self.get_strain_of_chain(first)?;
        for pair in chains.windows(2) {
            total = total.saturating_add(
                self.get_relative_familiarity_of_chain_with_chain(pair[1], pair[0])?,
            );
        }
        Ok(total)
    }

    /// How strongly `target` pulls `observer` into the same path.
    ///
    /// Of the inbound paths that make up `target`'s strain, only those passing
    /// through `observer` are kept; the share owed to rival dependents is
    /// discounted. The outbound attachment of `target` always counts. Zero
    /// when `observer` does not depend on `target` at all.
    pub fn get_relative_familiarity_of_chain_with_chain(
        &self,
        target: &IsolatedDependencyChain<'_>,
        observer: &IsolatedDependencyChain<'_>,
    ) -> Result<u64> {
        let target = self.chain_map.resolve_chain(target)?;
        let observer = self.chain_map.resolve_chain(observer)?;
        if target.id() == observer.id() {
            return self.get_strain_of_chain(target);
        }

        let paths_between = observer.get_number_of_paths_to_dependency(target);
        if paths_between == 0 {
            return Ok(0);
        }
        let reaching_observer = self
            .chain_map
            .unit_path_matrix()
            .get_number_of_paths_to_unit(observer.id())?;

        Ok(reaching_observer
            .saturating_mul(paths_between)
            .saturating_add(target.attachment_to_dependencies()))
    }

    /// Every continuation downward from `head`, avoiding `unavailable` chains
    /// (by head id), that ties for the greatest cumulative familiarity.
    ///
    /// Each result is the full path: `path_so_far`, then `head`, then the
    /// continuation. Results are ordered by their chain ids. The number of
    /// ties can grow exponentially with the number of forks; callers that
    /// need one path should use
    /// [`get_first_path_most_familiar_with_chain_without_chains`](Self::get_first_path_most_familiar_with_chain_without_chains).
    pub fn get_paths_most_familiar_with_chain_without_chains(
        &self,
        head: &IsolatedDependencyChain<'_>,
        unavailable: &BTreeSet<UnitId>,
        path_so_far: &[&IsolatedDependencyChain<'_>],
    ) -> Result<Vec<Vec<&'m IsolatedDependencyChain<'g>>>> {
        let (prefix, head, memo) = self.search(head, unavailable, path_so_far)?;

        Ok(Self::expand_tails(head, &memo)
            .into_iter()
            .map(|tail| {
                let mut path = prefix.clone();
                path.push(head);
                path.extend(tail);
                path
            })
            .collect())
    }

    /// The first path, by chain ids, among those
    /// [`get_paths_most_familiar_with_chain_without_chains`](Self::get_paths_most_familiar_with_chain_without_chains)
    /// would return.
    pub fn get_first_path_most_familiar_with_chain_without_chains(
        &self,
        head: &IsolatedDependencyChain<'_>,
        unavailable: &BTreeSet<UnitId>,
        path_so_far: &[&IsolatedDependencyChain<'_>],
    ) -> Result<Vec<&'m IsolatedDependencyChain<'g>>> {
        let (mut path, head, memo) = self.search(head, unavailable, path_so_far)?;
        path.push(head);

        let mut current = head;
        while let Some(&next) = memo.get(current.id()).and_then(|(_, nexts)| nexts.first()) {
            path.push(next);
            current = next;
        }
        Ok(path)
    }

    /// Resolve the inputs and score every continuation below `head`.
    #[allow(clippy::type_complexity)]
    fn search(
        &self,
        head: &IsolatedDependencyChain<'_>,
        unavailable: &BTreeSet<UnitId>,
        path_so_far: &[&IsolatedDependencyChain<'_>],
    ) -> Result<(
        Vec<&'m IsolatedDependencyChain<'g>>,
        &'m IsolatedDependencyChain<'g>,
        HashMap<UnitId, Continuation<'m, 'g>>,
    )> {
        let head = self.chain_map.resolve_chain(head)?;
        let prefix = path_so_far
            .iter()
            .map(|chain| self.chain_map.resolve_chain(chain))
            .collect::<Result<Vec<_>>>()?;

        let mut blocked: BTreeSet<UnitId> = unavailable.clone();
        blocked.extend(prefix.iter().map(|chain| chain.id().clone()));

        let mut memo = HashMap::new();
        let score = self.best_continuations(head, &blocked, &mut memo)?;
        trace!(head = %head.id(), score, "most familiar continuations");

        Ok((prefix, head, memo))
    }

    /// Best tail score below `from` (excluding `from` itself). Records, per
    /// visited chain, that score and the next chains reaching it.
    fn best_continuations(
        &self,
        from: &'m IsolatedDependencyChain<'g>,
        blocked: &BTreeSet<UnitId>,
        memo: &mut HashMap<UnitId, Continuation<'m, 'g>>,
    ) -> Result<u64> {
        if let Some((score, _)) = memo.get(from.id()) {
            return Ok(*score);
        }

        // Ordered by head id.
        let candidates: Vec<&'m IsolatedDependencyChain<'g>> = self
            .chain_map
            .get_direct_dependencies_of_chain(from)?
            .into_iter()
            .filter(|chain| !blocked.contains(chain.id()))
            .collect();

        let mut best_score = 0;
        let mut best_next: Vec<&'m IsolatedDependencyChain<'g>> = Vec::new();
        for next in candidates {
            let step = self.get_relative_familiarity_of_chain_with_chain(next, from)?;
            let score = step.saturating_add(self.best_continuations(next, blocked, memo)?);
            if best_next.is_empty() || score > best_score {
                best_score = score;
                best_next.clear();
            }
            if score == best_score {
                best_next.push(next);
            }
        }

        memo.insert(from.id().clone(), (best_score, best_next));
        Ok(best_score)
    }

    fn expand_tails(
        from: &'m IsolatedDependencyChain<'g>,
        memo: &HashMap<UnitId, Continuation<'m, 'g>>,
    ) -> Vec<Vec<&'m IsolatedDependencyChain<'g>>> {
        let nexts = memo.get(from.id()).map(|(_, nexts)| nexts.as_slice()).unwrap_or_default();
        if nexts.is_empty() {
            return vec![Vec::new()];
        }

        let mut tails = Vec::new();
        for &next in nexts {
            for tail in Self::expand_tails(next, memo) {
                let mut extended = vec![next];
                extended.extend(tail);
                tails.push(extended);
            }
        }
        tails
    }
}
