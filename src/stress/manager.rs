use tracing::{debug, info, trace};

use super::{StressMove, StressTracker};
use crate::errors::Result;
use crate::path::PathId;

/// Deterministic local search over a [`StressTracker`].
///
/// Every round scores each candidate move against the current order and
/// commits the one with the lowest stress, provided it beats staying put.
/// Candidates are evaluated swaps first, then converges, moves below and moves
/// to the top, each over path ids in sorted order; the earliest candidate wins
/// a tie. Committed moves strictly lower a non-negative integer, so the loop
/// always ends.
#[derive(Debug)]
pub struct StressManager<'p, 'g> {
    tracker: StressTracker<'p, 'g>,
    max_iterations: Option<usize>,
}

impl<'p, 'g> StressManager<'p, 'g> {
    pub fn new(tracker: StressTracker<'p, 'g>) -> Self {
        Self {
            tracker,
            max_iterations: None,
        }
    }

    /// Stop after committing `max` moves even if improvements remain.
    pub fn with_max_iterations(mut self, max: Option<usize>) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn tracker(&self) -> &StressTracker<'p, 'g> {
        &self.tracker
    }

    pub fn into_tracker(self) -> StressTracker<'p, 'g> {
        self.tracker
    }

    /// Every move the search considers from any order, in evaluation order.
    pub fn candidate_moves(&self) -> Vec<StressMove> {
        let ids = self.tracker.path_ids();
        let mut moves = Vec::new();

        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                moves.push(StressMove::Swap(a.clone(), b.clone()));
            }
        }
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                moves.push(StressMove::Converge(a.clone(), b.clone()));
            }
        }
        for a in ids {
            for b in ids {
                if a != b {
                    moves.push(StressMove::MoveBelow(a.clone(), b.clone()));
                }
            }
        }
        for a in ids {
            moves.push(StressMove::MoveToTop(a.clone()));
        }

        moves
    }

    /// The best move from the current order and the stress it leads to.
    /// [`StressMove::Stay`] when nothing strictly improves.
    pub fn best_move(&self) -> Result<(StressMove, i64)> {
        let mut best = (StressMove::Stay, self.tracker.get_total_distance()?);

        for mv in self.candidate_moves() {
            let positions = self.tracker.get_updated_relative_positions_matrix_from_move(&mv)?;
            let stress = self
                .tracker
                .get_total_distance_of_paths_with_positions(&positions)?;
            trace!(%mv, stress, "evaluated move");
            if stress < best.1 {
                best = (mv, stress);
            }
        }

        Ok(best)
    }

    /// Commit improving moves until none remains, then return the final
    /// top-to-bottom order.
    pub fn get_rankings(&mut self) -> Result<Vec<PathId>> {
        let initial = self.tracker.get_total_distance()?;
        let mut committed = 0usize;

        loop {
            if self.max_iterations.is_some_and(|max| committed >= max) {
                debug!(committed, "stress ranking stopped at iteration cap");
                break;
            }

            let (mv, stress) = self.best_move()?;
            if mv == StressMove::Stay {
                break;
            }
            self.tracker.apply_move(&mv)?;
            committed += 1;
            debug!(%mv, stress, "committed stress move");
        }

        info!(
            paths = self.tracker.path_ids().len(),
            moves = committed,
            initial_stress = initial,
            final_stress = self.tracker.get_total_distance()?,
            "ranked chain paths"
        );

        Ok(self.tracker.ranking().to_vec())
    }
}
