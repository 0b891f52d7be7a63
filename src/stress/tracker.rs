use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};

use super::{StressMove, TrackDetails};
use crate::errors::{LayoutError, Result};
use crate::matrix::Matrix;
use crate::path::{PathId, SimpleChainPathMap};

/// Current top-to-bottom order of paths, one slot per path.
///
/// Matrix rows and columns follow the sorted path ids, so indices stay fixed
/// whatever the order. For an order, `positions[i][j]` holds the slot of
/// path `i` minus the slot of path `j`; the stress of the order is the sum,
/// over each connected pair, of strength times absolute slot distance.
#[derive(Debug, Clone)]
pub struct StressTracker<'p, 'g> {
    path_map: &'p SimpleChainPathMap<'g>,
    path_ids: Vec<PathId>,
    index: HashMap<PathId, usize>,
    strengths: Matrix<i64>,
    order: Vec<PathId>,
}

impl<'p, 'g> StressTracker<'p, 'g> {
    /// `initial_order` lists every path id once, top first.
    pub fn new(path_map: &'p SimpleChainPathMap<'g>, initial_order: Vec<PathId>) -> Result<Self> {
        let path_ids = path_map.path_ids();
        let index: HashMap<PathId, usize> = path_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();

        let mut seen = BTreeSet::new();
        for id in &initial_order {
            if !index.contains_key(id) {
                return Err(LayoutError::PathNotFound(id.to_string()));
            }
            if !seen.insert(id) {
                return Err(LayoutError::StructuralRange(format!(
                    "path {id} listed more than once in the initial order"
                )));
            }
        }
        if seen.len() != path_ids.len() {
            return Err(LayoutError::StructuralRange(format!(
                "initial order lists {} of {} paths",
                seen.len(),
                path_ids.len()
            )));
        }

        let mut rows = vec![vec![0i64; path_ids.len()]; path_ids.len()];
        for (i, id) in path_ids.iter().enumerate() {
            for (other, &strength) in path_map.get_connections_for_path_by_id(id)? {
                if let Some(&j) = index.get(other) {
                    rows[i][j] = i64::try_from(strength).unwrap_or(i64::MAX);
                }
            }
        }
        let strengths = Matrix::new(rows)?;

        Ok(Self {
            path_map,
            path_ids,
            index,
            strengths,
            order: initial_order,
        })
    }

    pub fn path_map(&self) -> &'p SimpleChainPathMap<'g> {
        self.path_map
    }

    /// Sorted path ids, matching matrix indices.
    pub fn path_ids(&self) -> &[PathId] {
        &self.path_ids
    }

    /// Current order, top first.
    pub fn ranking(&self) -> &[PathId] {
        &self.order
    }

    pub fn strengths(&self) -> &Matrix<i64> {
        &self.strengths
    }

    pub fn get_relative_positions_matrix(&self) -> Result<Matrix<i64>> {
        self.relative_positions_for(&self.order)
    }

    pub fn get_total_distance(&self) -> Result<i64> {
        self.get_total_distance_of_paths_with_positions(&self.get_relative_positions_matrix()?)
    }

    pub fn get_total_distance_of_paths_with_positions(&self, positions: &Matrix<i64>) -> Result<i64> {
        let n = self.path_ids.len();
        if positions.number_of_rows() != n || positions.number_of_columns() != n {
            return Err(LayoutError::StructuralRange(format!(
                "positions matrix is {}x{}, expected {n}x{n}",
                positions.number_of_rows(),
                positions.number_of_columns()
            )));
        }

        let mut total = 0;
        for i in 0..n {
            let strengths = self.strengths.get_row(i)?;
            let distances = positions.get_row(i)?;
            for j in (i + 1)..n {
                total += strengths[j] * distances[j].abs();
            }
        }
        Ok(total)
    }

    pub fn get_updated_relative_positions_matrix_from_swapping_paths_by_id(
        &self,
        a: &PathId,
        b: &PathId,
    ) -> Result<Matrix<i64>> {
        self.relative_positions_for(&self.swapped(a, b)?)
    }

    pub fn get_updated_relative_positions_matrix_from_converging_paths_by_id(
        &self,
        a: &PathId,
        b: &PathId,
    ) -> Result<Matrix<i64>> {
        self.relative_positions_for(&self.converged(a, b)?)
    }

    pub fn get_updated_relative_positions_matrix_from_moving_path_below_path_by_id(
        &self,
        a: &PathId,
        b: &PathId,
    ) -> Result<Matrix<i64>> {
        self.relative_positions_for(&self.moved_below(a, b)?)
    }

    pub fn get_updated_relative_positions_matrix_from_moving_path_to_top_by_id(
        &self,
        a: &PathId,
    ) -> Result<Matrix<i64>> {
        self.relative_positions_for(&self.moved_to_top(a)?)
    }

    /// Positions matrix the move would produce, without committing it.
    pub fn get_updated_relative_positions_matrix_from_move(
        &self,
        mv: &StressMove,
    ) -> Result<Matrix<i64>> {
        self.relative_positions_for(&self.order_after(mv)?)
    }

    pub fn swap_paths_by_id(&mut self, a: &PathId, b: &PathId) -> Result<()> {
        self.order = self.swapped(a, b)?;
        Ok(())
    }

    pub fn converge_paths_by_id(&mut self, a: &PathId, b: &PathId) -> Result<()> {
        self.order = self.converged(a, b)?;
        Ok(())
    }

    pub fn move_path_below_path_by_id(&mut self, a: &PathId, b: &PathId) -> Result<()> {
        self.order = self.moved_below(a, b)?;
        Ok(())
    }

    pub fn move_path_to_top_by_id(&mut self, a: &PathId) -> Result<()> {
        self.order = self.moved_to_top(a)?;
        Ok(())
    }

    pub fn apply_move(&mut self, mv: &StressMove) -> Result<()> {
        self.order = self.order_after(mv)?;
        Ok(())
    }

    /// Rendered tracks, top first.
    ///
    /// Walking the ranking, a path joins the track above it when its window
    /// overlaps none of that track's paths; otherwise it opens a new track.
    /// A track is as tall as its tallest path.
    pub fn track_details(&self) -> Result<Vec<TrackDetails>> {
        let mut tracks: Vec<TrackDetails> = Vec::new();
        let mut windows: Vec<Vec<(DateTime<Utc>, DateTime<Utc>)>> = Vec::new();

        for id in &self.order {
            let path = self.path_map.get_path_by_id(id)?;
            let (start, end) = (path.anticipated_start_date(), path.end_date());
            let height = path.tracks().len();

            let fits = windows
                .last()
                .is_some_and(|members| members.iter().all(|&(s, e)| end <= s || start >= e));
            if fits {
                if let (Some(track), Some(members)) = (tracks.last_mut(), windows.last_mut()) {
                    track.path_ids.push(id.clone());
                    track.height = track.height.max(height);
                    track.start = track.start.min(start);
                    track.end = track.end.max(end);
                    members.push((start, end));
                    continue;
                }
            }

            tracks.push(TrackDetails {
                height,
                path_ids: vec![id.clone()],
                start,
                end,
            });
            windows.push(vec![(start, end)]);
        }

        Ok(tracks)
    }

    fn order_after(&self, mv: &StressMove) -> Result<Vec<PathId>> {
        match mv {
            StressMove::Swap(a, b) => self.swapped(a, b),
            StressMove::Converge(a, b) => self.converged(a, b),
            StressMove::MoveBelow(a, b) => self.moved_below(a, b),
            StressMove::MoveToTop(a) => self.moved_to_top(a),
            StressMove::Stay => Ok(self.order.clone()),
        }
    }

    fn slot_of(&self, id: &PathId) -> Result<usize> {
        self.order
            .iter()
            .position(|p| p == id)
            .ok_or_else(|| LayoutError::PathNotFound(id.to_string()))
    }

    fn swapped(&self, a: &PathId, b: &PathId) -> Result<Vec<PathId>> {
        let (slot_a, slot_b) = (self.slot_of(a)?, self.slot_of(b)?);
        let mut order = self.order.clone();
        order.swap(slot_a, slot_b);
        Ok(order)
    }

    /// Both paths end up adjacent around the midpoint of their slots, keeping
    /// their relative order; paths at or above the midpoint stay above them.
    fn converged(&self, a: &PathId, b: &PathId) -> Result<Vec<PathId>> {
        let (slot_a, slot_b) = (self.slot_of(a)?, self.slot_of(b)?);
        if slot_a == slot_b {
            return Ok(self.order.clone());
        }
        let (upper, lower) = if slot_a < slot_b { (a, b) } else { (b, a) };
        let midpoint = (slot_a + slot_b) / 2;

        let mut above = Vec::new();
        let mut below = Vec::new();
        for (slot, id) in self.order.iter().enumerate() {
            if id == a || id == b {
                continue;
            }
            if slot <= midpoint {
                above.push(id.clone());
            } else {
                below.push(id.clone());
            }
        }

        above.push(upper.clone());
        above.push(lower.clone());
        above.extend(below);
        Ok(above)
    }

    fn moved_below(&self, a: &PathId, b: &PathId) -> Result<Vec<PathId>> {
        let slot_a = self.slot_of(a)?;
        self.slot_of(b)?;
        if a == b {
            return Ok(self.order.clone());
        }
        let mut order = self.order.clone();
        let moving = order.remove(slot_a);
        let anchor = order
            .iter()
            .position(|p| p == b)
            .ok_or_else(|| LayoutError::PathNotFound(b.to_string()))?;
        order.insert(anchor + 1, moving);
        Ok(order)
    }

    fn moved_to_top(&self, a: &PathId) -> Result<Vec<PathId>> {
        let slot_a = self.slot_of(a)?;
        let mut order = self.order.clone();
        let moving = order.remove(slot_a);
        order.insert(0, moving);
        Ok(order)
    }

    /// `p * 1ᵀ - 1 * pᵀ` for the column vector `p` of track indices.
    fn relative_positions_for(&self, order: &[PathId]) -> Result<Matrix<i64>> {
        let mut slots = vec![0i64; self.path_ids.len()];
        for (slot, id) in order.iter().enumerate() {
            let idx = *self
                .index
                .get(id)
                .ok_or_else(|| LayoutError::PathNotFound(id.to_string()))?;
            slots[idx] = i64::try_from(slot).unwrap_or(i64::MAX);
        }

        let positions = Matrix::column_vector(slots)?;
        let ones = Matrix::column_vector(vec![1i64; self.path_ids.len()])?;
        positions
            .multiply(&ones.transpose())?
            .subtract(&ones.multiply(&positions.transpose())?)
    }
}
