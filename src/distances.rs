//! Module for the multiset of pairwise distances still waiting to be explained

use std::collections::BTreeMap;
use std::ops::Range;

use crate::error::ReconstructError;

/// The remaining (not yet explained) pairwise distances.
///
/// Occurrences are kept as a sorted value -> count map, so the largest
/// remaining distance and the multiplicity of any value are both cheap to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceMultiset {
    /// Remaining occurrences per distance value; zero counts are never stored
    counts: BTreeMap<u64, usize>,

    /// Total number of remaining occurrences
    len: usize,

    /// Maximum of the multiset as given at construction
    largest_distance: u64,

    /// Number of points a multiset of the initial size describes
    target_point_count: usize,
}

impl DistanceMultiset {
    /// Builds the multiset from the full input sequence
    pub fn new<I>(values: I) -> Self
    where
        I: IntoIterator<Item = u64>,
    {
        let mut counts = BTreeMap::new();
        let mut len = 0;
        for value in values {
            *counts.entry(value).or_insert(0) += 1;
            len += 1;
        }
        let largest_distance = counts.keys().next_back().copied().unwrap_or(0);

        Self {
            counts,
            len,
            largest_distance,
            target_point_count: ceil_sqrt(2 * len as u64) as usize,
        }
    }

    /// Removes one occurrence of `distance`
    pub fn remove(&mut self, distance: u64) -> Result<(), ReconstructError> {
        match self.counts.get_mut(&distance) {
            Some(count) if *count > 1 => *count -= 1,
            Some(_) => {
                self.counts.remove(&distance);
            }
            None => return Err(ReconstructError::DistanceNotPresent(distance)),
        }
        self.len -= 1;
        Ok(())
    }

    /// Restores one occurrence of `distance`
    pub fn add(&mut self, distance: u64) {
        *self.counts.entry(distance).or_insert(0) += 1;
        self.len += 1;
    }

    /// Number of remaining occurrences of `distance`
    pub fn count(&self, distance: u64) -> usize {
        self.counts.get(&distance).copied().unwrap_or(0)
    }

    pub fn contains(&self, distance: u64) -> bool {
        self.counts.contains_key(&distance)
    }

    /// Largest remaining distance, `None` once everything is explained
    pub fn max(&self) -> Option<u64> {
        self.counts.keys().next_back().copied()
    }

    /// Span of the final point set; fixed at construction
    pub fn largest_distance(&self) -> u64 {
        self.largest_distance
    }

    /// `ceil(sqrt(2 * size))` of the initial multiset
    pub fn target_point_count(&self) -> usize {
        self.target_point_count
    }

    /// Positions a point other than the right anchor may take
    pub fn possible_point_range(&self) -> Range<u64> {
        0..self.largest_distance
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Remaining occurrences in ascending order, duplicates repeated
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.counts
            .iter()
            .flat_map(|(&value, &count)| std::iter::repeat(value).take(count))
    }
}

/// Returns `n` when `len == n * (n - 1) / 2` for some `n >= 2`
pub fn point_count_for(len: usize) -> Option<usize> {
    let n = ceil_sqrt(2 * len as u64) as usize;
    (n >= 2 && n * (n - 1) / 2 == len).then_some(n)
}

/// Smallest `r` with `r * r >= x`
fn ceil_sqrt(x: u64) -> u64 {
    let mut r = (x as f64).sqrt() as u64;
    while r.saturating_mul(r) < x {
        r += 1;
    }
    while r > 0 && (r - 1) * (r - 1) >= x {
        r -= 1;
    }
    r
}
