use chrono::{DateTime, Duration, Utc};

use super::PathId;
use crate::chain::IsolatedDependencyChain;
use crate::chain::isolated::visual_density;
use crate::errors::{LayoutError, Result};
use crate::task::{TaskUnit, UnitId};

/// An ordered list of chains rendered together as one row group.
///
/// `chains[0]` is the top of the path; date figures follow the same formulas
/// as a single chain, applied to the first and last chain.
#[derive(Debug, Clone)]
pub struct ChainPath<'g> {
    id: PathId,
    chains: Vec<IsolatedDependencyChain<'g>>,
    tracks: Vec<Vec<UnitId>>,
}

impl<'g> ChainPath<'g> {
    /// The id starts out as the head unit's id; callers may reassign it.
    pub fn new(chains: Vec<IsolatedDependencyChain<'g>>) -> Result<Self> {
        let Some(first) = chains.first() else {
            return Err(LayoutError::StructuralRange(
                "a chain path needs at least one chain".into(),
            ));
        };
        let id = PathId::from(first.id());
        let tracks = Self::layer_units(&chains);
        Ok(Self { id, chains, tracks })
    }

    pub fn id(&self) -> &PathId {
        &self.id
    }

    pub fn set_id(&mut self, id: PathId) {
        self.id = id;
    }

    pub fn chains(&self) -> &[IsolatedDependencyChain<'g>] {
        &self.chains
    }

    pub fn head(&self) -> &'g TaskUnit {
        self.chains[0].head()
    }

    pub fn last_chain(&self) -> &IsolatedDependencyChain<'g> {
        &self.chains[self.chains.len() - 1]
    }

    pub fn units(&self) -> impl Iterator<Item = &'g TaskUnit> + '_ {
        self.chains
            .iter()
            .flat_map(|chain| chain.units().iter().copied())
    }

    pub fn contains_unit(&self, unit: &UnitId) -> bool {
        self.chains.iter().any(|chain| chain.contains(unit))
    }

    pub fn end_date(&self) -> DateTime<Utc> {
        self.chains[0].end_date()
    }

    pub fn anticipated_start_date(&self) -> DateTime<Utc> {
        self.last_chain().anticipated_start_date()
    }

    pub fn time_span(&self) -> Duration {
        self.end_date() - self.anticipated_start_date()
    }

    pub fn presence_time(&self) -> Duration {
        self.chains
            .iter()
            .fold(Duration::zero(), |acc, chain| acc + chain.presence_time())
    }

    pub fn visual_density(&self) -> f64 {
        visual_density(self.presence_time(), self.time_span())
    }

    /// Sub-rows needed so that no two units of the path overlap visually.
    pub fn tracks(&self) -> &[Vec<UnitId>] {
        &self.tracks
    }

    /// Greedy interval layering: each unit goes on the first sub-row whose
    /// last unit's presence has ended by the time this one starts.
    fn layer_units(chains: &[IsolatedDependencyChain<'g>]) -> Vec<Vec<UnitId>> {
        let mut units: Vec<&TaskUnit> = chains
            .iter()
            .flat_map(|chain| chain.units().iter().copied())
            .collect();
        units.sort_by(|a, b| {
            a.anticipated_start_date()
                .cmp(&b.anticipated_start_date())
                .then_with(|| a.id().cmp(b.id()))
        });

        let mut tracks: Vec<Vec<UnitId>> = Vec::new();
        let mut track_ends: Vec<DateTime<Utc>> = Vec::new();
        for unit in units {
            let slot = track_ends
                .iter()
                .position(|&end| end <= unit.anticipated_start_date());
            match slot {
                Some(idx) => {
                    tracks[idx].push(unit.id().clone());
                    track_ends[idx] = unit.apparent_end_date();
                }
                None => {
                    tracks.push(vec![unit.id().clone()]);
                    track_ends.push(unit.apparent_end_date());
                }
            }
        }
        tracks
    }
}
