//! Module for the partially built point array and the reconstructed point sets

use std::fmt;

use crate::error::ReconstructError;

/// Which end of the point array a placement fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

/// Point array filled from both ends toward the middle.
///
/// Slots `[0, left)` and `[len - right, len)` hold placed points; the slots in
/// between are still free. Points only ever land at the inner edge of either
/// placed run, so a finished array is non-decreasing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointAssignment {
    slots: Vec<Option<u64>>,

    /// Points placed from the low end; also the next free left slot
    left: usize,

    /// Points placed from the high end
    right: usize,
}

impl PointAssignment {
    /// Creates an array of `point_count` free slots
    pub fn new(point_count: usize) -> Self {
        Self {
            slots: vec![None; point_count],
            left: 0,
            right: 0,
        }
    }

    /// Creates an array with 0 and `span` already placed at the two ends
    pub fn anchored(point_count: usize, span: u64) -> Result<Self, ReconstructError> {
        let mut points = Self::new(point_count);
        points.place(Side::Left, 0)?;
        points.place(Side::Right, span)?;
        Ok(points)
    }

    /// Writes `value` into the next free slot on `side`
    pub fn place(&mut self, side: Side, value: u64) -> Result<(), ReconstructError> {
        if self.is_complete() {
            return Err(ReconstructError::SideFull(side));
        }
        match side {
            Side::Left => {
                self.slots[self.left] = Some(value);
                self.left += 1;
            }
            Side::Right => {
                let index = self.slots.len() - 1 - self.right;
                self.slots[index] = Some(value);
                self.right += 1;
            }
        }
        Ok(())
    }

    /// Reverses the most recent placement on `side`, returning the freed value
    pub fn unplace(&mut self, side: Side) -> Result<u64, ReconstructError> {
        let index = match side {
            Side::Left if self.left > 0 => {
                self.left -= 1;
                self.left
            }
            Side::Right if self.right > 0 => {
                self.right -= 1;
                self.slots.len() - 1 - self.right
            }
            _ => return Err(ReconstructError::SideEmpty(side)),
        };
        self.slots[index]
            .take()
            .ok_or(ReconstructError::SideEmpty(side))
    }

    /// `|value - p|` for every placed point `p`
    pub fn distances_to(&self, value: u64) -> Vec<u64> {
        self.placed().map(|p| p.abs_diff(value)).collect()
    }

    /// Placed points, left run first then right run
    pub fn placed(&self) -> impl Iterator<Item = u64> + '_ {
        self.slots.iter().filter_map(|slot| *slot)
    }

    pub fn is_complete(&self) -> bool {
        self.left + self.right >= self.slots.len()
    }

    /// Number of points placed so far
    pub fn placed_count(&self) -> usize {
        self.left + self.right
    }

    /// Index of the next free slot from the low end
    pub fn left_cursor(&self) -> usize {
        self.left
    }

    pub fn slots(&self) -> &[Option<u64>] {
        &self.slots
    }

    /// The finished point set, `None` while slots remain free
    pub fn to_placement(&self) -> Option<Placement> {
        if !self.is_complete() {
            return None;
        }
        self.slots
            .iter()
            .copied()
            .collect::<Option<Vec<_>>>()
            .map(Placement::new)
    }
}

/// A reconstructed point set, kept in non-decreasing order
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Placement {
    positions: Vec<u64>,
}

impl Placement {
    /// Creates a placement from positions given in any order
    pub fn new(mut positions: Vec<u64>) -> Self {
        positions.sort_unstable();
        Self { positions }
    }

    /// Returns a reference to the point positions
    pub fn positions(&self) -> &[u64] {
        &self.positions
    }

    /// Returns the span of the point set, which is the position of the last point
    pub fn length(&self) -> u64 {
        self.positions.last().copied().unwrap_or(0)
    }

    /// All pairwise distances in ascending order
    pub fn pairwise_distances(&self) -> Vec<u64> {
        let mut distances = Vec::with_capacity(self.positions.len() * self.positions.len() / 2);
        for i in 0..self.positions.len() {
            for j in i + 1..self.positions.len() {
                distances.push(self.positions[j] - self.positions[i]);
            }
        }
        distances.sort_unstable();
        distances
    }

    /// Checks whether the pairwise distances equal `distances` as a multiset
    pub fn reproduces(&self, distances: &[u64]) -> bool {
        let mut expected = distances.to_vec();
        expected.sort_unstable();
        self.pairwise_distances() == expected
    }

    /// The same point set reflected about its midpoint
    pub fn mirrored(&self) -> Self {
        let length = self.length();
        let first = self.positions.first().copied().unwrap_or(0);
        Self {
            positions: self.positions.iter().rev().map(|&p| length + first - p).collect(),
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let positions = self
            .positions
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        f.write_str(&positions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchored_fills_both_ends() {
        let points = PointAssignment::anchored(4, 10).unwrap();
        assert_eq!(points.slots(), &[Some(0), None, None, Some(10)]);
        assert_eq!(points.placed_count(), 2);
        assert_eq!(points.left_cursor(), 1);
        assert!(!points.is_complete());
    }

    #[test]
    fn place_and_unplace_are_inverse() {
        let mut points = PointAssignment::anchored(4, 10).unwrap();
        let before = points.clone();

        points.place(Side::Right, 8).unwrap();
        assert_eq!(points.slots(), &[Some(0), None, Some(8), Some(10)]);
        assert_eq!(points.unplace(Side::Right), Ok(8));
        assert_eq!(points, before);

        points.place(Side::Left, 3).unwrap();
        assert_eq!(points.slots(), &[Some(0), Some(3), None, Some(10)]);
        assert_eq!(points.unplace(Side::Left), Ok(3));
        assert_eq!(points, before);
    }

    #[test]
    fn full_array_rejects_placement() {
        let mut points = PointAssignment::anchored(3, 5).unwrap();
        points.place(Side::Left, 2).unwrap();
        assert!(points.is_complete());
        assert_eq!(points.place(Side::Right, 4), Err(ReconstructError::SideFull(Side::Right)));
        assert_eq!(points.to_placement().unwrap().positions(), &[0, 2, 5]);
    }

    #[test]
    fn empty_side_rejects_unplace() {
        let mut points = PointAssignment::new(3);
        assert_eq!(points.unplace(Side::Left), Err(ReconstructError::SideEmpty(Side::Left)));
        assert_eq!(points.unplace(Side::Right), Err(ReconstructError::SideEmpty(Side::Right)));
        assert!(PointAssignment::anchored(1, 5).is_err());
    }

    #[test]
    fn distances_to_covers_every_placed_point() {
        let mut points = PointAssignment::anchored(5, 10).unwrap();
        points.place(Side::Right, 7).unwrap();
        let mut distances = points.distances_to(4);
        distances.sort_unstable();
        assert_eq!(distances, vec![3, 4, 6]);
        assert!(points.to_placement().is_none());
    }

    #[test]
    fn placement_distances_and_mirror() {
        let placement = Placement::new(vec![0, 1, 4, 6]);
        assert_eq!(placement.length(), 6);
        assert_eq!(placement.pairwise_distances(), vec![1, 2, 3, 4, 5, 6]);
        assert!(placement.reproduces(&[6, 5, 4, 3, 2, 1]));
        assert!(!placement.reproduces(&[6, 5, 4, 3, 2, 2]));
        assert_eq!(placement.mirrored().positions(), &[0, 2, 5, 6]);
        assert_eq!(placement.to_string(), "0 1 4 6");
    }
}
