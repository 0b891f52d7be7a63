use std::collections::BTreeSet;

use tracing::debug;

use super::ChainPath;
use crate::chain::IsolatedDependencyChain;
use crate::errors::{LayoutError, Result};
use crate::strain::ChainStrainMap;
use crate::task::UnitId;

/// Groups the chains of a strain map into [`ChainPath`]s.
pub struct ChainPathBuilder<'s, 'm, 'g> {
    strain_map: &'s ChainStrainMap<'m, 'g>,
}

impl<'s, 'm, 'g> ChainPathBuilder<'s, 'm, 'g> {
    pub fn new(strain_map: &'s ChainStrainMap<'m, 'g>) -> Self {
        Self { strain_map }
    }

    /// Claim chains until none are left.
    ///
    /// Each round starts from the available chain with the greatest strain
    /// (lowest head id on ties), where a chain is available once every chain
    /// depending on it has been claimed. The path then follows the most
    /// familiar continuation through unclaimed chains, taking the first by
    /// chain ids when several tie.
    pub fn build(&self) -> Result<Vec<ChainPath<'g>>> {
        let chain_map = self.strain_map.chain_map();
        let total = chain_map.chains().len();
        let mut claimed: BTreeSet<UnitId> = BTreeSet::new();
        let mut paths = Vec::new();

        while claimed.len() < total {
            let start = self.next_start(&claimed)?;
            let chosen = self
                .strain_map
                .get_first_path_most_familiar_with_chain_without_chains(start, &claimed, &[])?;

            claimed.extend(chosen.iter().map(|chain| chain.id().clone()));
            let path = ChainPath::new(chosen.into_iter().cloned().collect())?;
            debug!(
                path = %path.id(),
                chains = path.chains().len(),
                "grouped chains into path"
            );
            paths.push(path);
        }

        Ok(paths)
    }

    fn next_start(&self, claimed: &BTreeSet<UnitId>) -> Result<&'m IsolatedDependencyChain<'g>> {
        let chain_map = self.strain_map.chain_map();
        let mut best: Option<(u64, &'m IsolatedDependencyChain<'g>)> = None;

        for chain in chain_map.chains() {
            if claimed.contains(chain.id()) {
                continue;
            }
            let dependents = chain_map.get_direct_dependents_of_chain(chain)?;
            if dependents.iter().any(|dep| !claimed.contains(dep.id())) {
                continue;
            }
            let strain = self.strain_map.get_strain_of_chain(chain)?;
            let better = match best {
                None => true,
                Some((best_strain, best_chain)) => {
                    strain > best_strain || (strain == best_strain && chain.id() < best_chain.id())
                }
            };
            if better {
                best = Some((strain, chain));
            }
        }

        best.map(|(_, chain)| chain).ok_or_else(|| {
            LayoutError::StructuralRange("no unclaimed chain is free of unclaimed dependents".into())
        })
    }
}
