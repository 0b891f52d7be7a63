use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::chain::SimpleChainMap;
use crate::config::{InitialOrder, LayoutConfig};
use crate::errors::Result;
use crate::graph::TaskGraph;
use crate::path::{ChainPathBuilder, PathId, SimpleChainPathMap};
use crate::strain::ChainStrainMap;
use crate::stress::{StressManager, StressTracker, TrackDetails};
use crate::task::UnitId;

/// Final output of one layout pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackLayout {
    pub tracks: Vec<TrackDetails>,
    pub total_stress: i64,
}

impl TrackLayout {
    /// Lay out every unit reachable from `roots`.
    pub fn compute(graph: &TaskGraph, roots: &[UnitId], config: &LayoutConfig) -> Result<Self> {
        let chain_map = SimpleChainMap::new(graph, roots)?;
        let strain_map = ChainStrainMap::new(&chain_map)?;
        let paths = ChainPathBuilder::new(&strain_map).build()?;

        let mut seeded: Vec<(u64, PathId)> = Vec::with_capacity(paths.len());
        for path in &paths {
            seeded.push((strain_map.get_strain_of_path(path)?, path.id().clone()));
        }
        let path_map = SimpleChainPathMap::new(paths)?;
        let initial_order = Self::initial_order(&path_map, seeded, config.initial_order)?;

        let tracker = StressTracker::new(&path_map, initial_order)?;
        let mut manager =
            StressManager::new(tracker).with_max_iterations(config.max_ranking_iterations);
        manager.get_rankings()?;

        let tracker = manager.into_tracker();
        let layout = Self {
            tracks: tracker.track_details()?,
            total_stress: tracker.get_total_distance()?,
        };

        info!(
            tracks = layout.tracks.len(),
            stress = layout.total_stress,
            "track layout complete"
        );
        Ok(layout)
    }

    /// Lay out the whole graph, rooted at every unit nothing depends on.
    pub fn compute_all(graph: &TaskGraph, config: &LayoutConfig) -> Result<Self> {
        Self::compute(graph, &graph.heads(), config)
    }

    fn initial_order(
        path_map: &SimpleChainPathMap<'_>,
        mut seeded: Vec<(u64, PathId)>,
        order: InitialOrder,
    ) -> Result<Vec<PathId>> {
        match order {
            InitialOrder::Strain => {
                seeded.sort_by(|(strain_a, a), (strain_b, b)| {
                    strain_b.cmp(strain_a).then_with(|| a.cmp(b))
                });
            }
            InitialOrder::StartDate => {
                let mut keyed = Vec::with_capacity(seeded.len());
                for (strain, id) in seeded {
                    let start = path_map.get_path_by_id(&id)?.anticipated_start_date();
                    keyed.push((start, strain, id));
                }
                keyed.sort_by(|(start_a, _, a), (start_b, _, b)| match start_a.cmp(start_b) {
                    Ordering::Equal => a.cmp(b),
                    other => other,
                });
                seeded = keyed
                    .into_iter()
                    .map(|(_, strain, id)| (strain, id))
                    .collect();
            }
        }
        Ok(seeded.into_iter().map(|(_, id)| id).collect())
    }
}
