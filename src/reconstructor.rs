//! Module implementing the backtracking turnpike search

use std::collections::{BTreeMap, HashSet};
use std::ops::ControlFlow;

use tracing::{debug, trace};

use crate::distances::{point_count_for, DistanceMultiset};
use crate::error::ReconstructError;
use crate::points::{Placement, PointAssignment, Side};

/// A tentative next point together with the distances placing it would consume
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub side: Side,
    pub point: u64,
    pub distances: Vec<u64>,
}

/// Search state for one distance multiset.
///
/// The two extreme points are placed at construction. Every later step takes
/// the largest distance not yet explained, which must join an extreme point to
/// an unplaced one, so at most two positions are ever worth trying.
#[derive(Debug, Clone)]
pub struct Reconstructor {
    distances: DistanceMultiset,
    points: PointAssignment,

    /// Positions already taken; these are no longer eligible
    occupied: HashSet<u64>,

    /// False when the input size is not `n * (n - 1) / 2` for any `n >= 2`
    feasible: bool,

    /// Number of search states visited so far
    states_examined: usize,
}

impl Reconstructor {
    /// Prepares the search, anchoring 0 and the largest distance at the two ends
    pub fn new(input: &[u64]) -> Result<Self, ReconstructError> {
        let mut distances = DistanceMultiset::new(input.iter().copied());
        let span = distances.largest_distance();

        let Some(point_count) = point_count_for(input.len()) else {
            debug!(size = input.len(), "distance count is not triangular");
            return Ok(Self {
                points: PointAssignment::new(distances.target_point_count()),
                distances,
                occupied: HashSet::new(),
                feasible: false,
                states_examined: 0,
            });
        };
        debug_assert_eq!(point_count, distances.target_point_count());

        let points = PointAssignment::anchored(point_count, span)?;
        distances.remove(span)?;

        Ok(Self {
            distances,
            points,
            occupied: HashSet::from([0]),
            feasible: true,
            states_examined: 0,
        })
    }

    pub fn distances(&self) -> &DistanceMultiset {
        &self.distances
    }

    pub fn points(&self) -> &PointAssignment {
        &self.points
    }

    pub fn states_examined(&self) -> usize {
        self.states_examined
    }

    pub fn is_feasible(&self) -> bool {
        self.feasible
    }

    pub fn is_complete(&self) -> bool {
        self.feasible && self.points.is_complete()
    }

    /// Whether `point` may still be chosen as a position
    fn is_eligible(&self, point: u64) -> bool {
        self.distances.possible_point_range().contains(&point) && !self.occupied.contains(&point)
    }

    /// Whether every distance in `required` can be paid from what remains
    fn is_payable(&self, required: &[u64]) -> bool {
        let mut needed: BTreeMap<u64, usize> = BTreeMap::new();
        for &distance in required {
            *needed.entry(distance).or_insert(0) += 1;
        }
        needed
            .into_iter()
            .all(|(distance, count)| count <= self.distances.count(distance))
    }

    /// Right-side candidate from the largest remaining distance `d` first,
    /// then the left-side candidate at `largest_distance - d`
    pub fn candidates(&self) -> Vec<Candidate> {
        let Some(largest_remaining) = self.distances.max() else {
            return Vec::new();
        };
        let span = self.distances.largest_distance();

        [
            (Side::Right, largest_remaining),
            (Side::Left, span - largest_remaining),
        ]
        .into_iter()
        .filter(|&(_, point)| self.is_eligible(point))
        .filter_map(|(side, point)| {
            let distances = self.points.distances_to(point);
            self.is_payable(&distances).then(|| {
                trace!(%side, point, "candidate");
                Candidate {
                    side,
                    point,
                    distances,
                }
            })
        })
        .collect()
    }

    /// Consumes the candidate's distances and places its point
    pub fn apply(&mut self, candidate: &Candidate) -> Result<(), ReconstructError> {
        for &distance in &candidate.distances {
            self.distances.remove(distance)?;
        }
        self.points.place(candidate.side, candidate.point)?;
        self.occupied.insert(candidate.point);
        Ok(())
    }

    /// Exact inverse of [`Reconstructor::apply`]
    pub fn undo(&mut self, candidate: &Candidate) -> Result<(), ReconstructError> {
        self.points.unplace(candidate.side)?;
        for &distance in &candidate.distances {
            self.distances.add(distance);
        }
        self.occupied.remove(&candidate.point);
        Ok(())
    }

    /// One independent sub-state per candidate, each with the candidate applied
    pub fn branches(&self) -> Result<Vec<Reconstructor>, ReconstructError> {
        if !self.feasible || self.points.is_complete() {
            return Ok(Vec::new());
        }
        self.candidates()
            .iter()
            .map(|candidate| {
                let mut branch = self.clone();
                branch.states_examined = 0;
                branch.apply(candidate)?;
                Ok(branch)
            })
            .collect()
    }

    /// Depth-first search handing each complete point set to `visit`.
    ///
    /// Returning `ControlFlow::Break` from `visit` stops the search; the state is
    /// restored to what it was before the call either way.
    pub fn search<F>(&mut self, mut visit: F) -> Result<ControlFlow<()>, ReconstructError>
    where
        F: FnMut(&Placement) -> ControlFlow<()>,
    {
        if !self.feasible {
            return Ok(ControlFlow::Continue(()));
        }
        self.backtrack(&mut visit)
    }

    fn backtrack<F>(&mut self, visit: &mut F) -> Result<ControlFlow<()>, ReconstructError>
    where
        F: FnMut(&Placement) -> ControlFlow<()>,
    {
        self.states_examined += 1;

        if self.points.is_complete() {
            return Ok(match self.points.to_placement() {
                Some(placement) => {
                    debug!(points = %placement, "found solution");
                    visit(&placement)
                }
                None => ControlFlow::Continue(()),
            });
        }

        for candidate in self.candidates() {
            self.apply(&candidate)?;
            let flow = self.backtrack(visit)?;
            self.undo(&candidate)?;
            if flow.is_break() {
                return Ok(flow);
            }
        }

        Ok(ControlFlow::Continue(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIX_POINTS: [u64; 15] = [1, 2, 2, 2, 3, 3, 3, 4, 5, 5, 5, 6, 7, 8, 10];

    fn collect_all(input: &[u64]) -> Vec<Placement> {
        let mut reconstructor = Reconstructor::new(input).unwrap();
        let mut found = Vec::new();
        reconstructor
            .search(|placement| {
                found.push(placement.clone());
                ControlFlow::Continue(())
            })
            .unwrap();
        found
    }

    #[test]
    fn construction_anchors_extremes() {
        let reconstructor = Reconstructor::new(&SIX_POINTS).unwrap();
        assert!(reconstructor.is_feasible());
        assert_eq!(
            reconstructor.points().slots(),
            &[Some(0), None, None, None, None, Some(10)]
        );
        assert_eq!(reconstructor.distances().count(10), 0);
        assert_eq!(reconstructor.distances().len(), 14);
    }

    #[test]
    fn first_candidates_come_from_largest_remaining() {
        let reconstructor = Reconstructor::new(&SIX_POINTS).unwrap();
        let candidates = reconstructor.candidates();
        assert_eq!(candidates.len(), 2);

        assert_eq!(candidates[0].side, Side::Right);
        assert_eq!(candidates[0].point, 8);
        let mut consumed = candidates[0].distances.clone();
        consumed.sort_unstable();
        assert_eq!(consumed, vec![2, 8]);

        assert_eq!(candidates[1].side, Side::Left);
        assert_eq!(candidates[1].point, 2);
    }

    #[test]
    fn apply_then_undo_restores_state() {
        let mut reconstructor = Reconstructor::new(&SIX_POINTS).unwrap();
        let distances = reconstructor.distances().clone();
        let points = reconstructor.points().clone();

        for candidate in reconstructor.candidates() {
            reconstructor.apply(&candidate).unwrap();
            assert_ne!(reconstructor.distances(), &distances);
            assert!(!reconstructor.is_eligible(candidate.point));
            reconstructor.undo(&candidate).unwrap();
            assert_eq!(reconstructor.distances(), &distances);
            assert_eq!(reconstructor.points(), &points);
            assert!(reconstructor.is_eligible(candidate.point));
        }
    }

    #[test]
    fn search_restores_state_afterwards() {
        let mut reconstructor = Reconstructor::new(&SIX_POINTS).unwrap();
        let distances = reconstructor.distances().clone();
        let points = reconstructor.points().clone();
        reconstructor.search(|_| ControlFlow::Continue(())).unwrap();
        assert_eq!(reconstructor.distances(), &distances);
        assert_eq!(reconstructor.points(), &points);
        assert!(reconstructor.states_examined() > 1);
    }

    #[test]
    fn exhaustive_search_finds_mirror_images() {
        let found = collect_all(&SIX_POINTS);
        assert!(!found.is_empty());
        for placement in &found {
            assert!(placement.reproduces(&SIX_POINTS));
            assert!(found.contains(&placement.mirrored()));
        }
    }

    #[test]
    fn break_stops_after_first_solution() {
        let mut reconstructor = Reconstructor::new(&SIX_POINTS).unwrap();
        let mut count = 0;
        let flow = reconstructor
            .search(|_| {
                count += 1;
                ControlFlow::Break(())
            })
            .unwrap();
        assert!(flow.is_break());
        assert_eq!(count, 1);
    }

    #[test]
    fn unpayable_position_is_not_a_candidate() {
        // After anchoring 0 and 4 only {1, 2} remain; position 2 would need two 2s
        let reconstructor = Reconstructor::new(&[4, 2, 1]).unwrap();
        assert!(reconstructor.is_feasible());
        assert!(reconstructor.candidates().is_empty());
        assert!(collect_all(&[4, 2, 1]).is_empty());
    }

    #[test]
    fn three_points_have_two_mirror_solutions() {
        let found = collect_all(&[1, 2, 3]);
        assert_eq!(found[0].positions(), &[0, 2, 3]);
        assert!(found.iter().any(|p| p.positions() == [0, 1, 3]));
    }

    #[test]
    fn one_position_can_fill_both_sides() {
        let reconstructor = Reconstructor::new(&[5, 5, 10]).unwrap();
        let candidates: Vec<(Side, u64)> = reconstructor
            .candidates()
            .iter()
            .map(|c| (c.side, c.point))
            .collect();
        assert_eq!(candidates, vec![(Side::Right, 5), (Side::Left, 5)]);

        // Both branches fill the single free slot with 5
        let found = collect_all(&[5, 5, 10]);
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|p| p.positions() == [0, 5, 10]));
    }

    #[test]
    fn non_triangular_input_yields_nothing() {
        assert!(collect_all(&[1, 1]).is_empty());
        assert!(collect_all(&[1, 2, 3, 4]).is_empty());
        assert!(collect_all(&[]).is_empty());
    }

    #[test]
    fn branches_apply_each_candidate() {
        let reconstructor = Reconstructor::new(&SIX_POINTS).unwrap();
        let branches = reconstructor.branches().unwrap();
        assert_eq!(branches.len(), 2);
        assert_eq!(branches[0].points().placed_count(), 3);
        assert_eq!(branches[0].states_examined(), 0);
        assert!(branches[0].points().placed().any(|p| p == 8));
        assert!(branches[1].points().placed().any(|p| p == 2));
    }
}
