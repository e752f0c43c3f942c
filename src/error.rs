//! Errors raised when the search state is driven into an impossible configuration

use thiserror::Error;

use crate::points::Side;

/// Contract violations on the distance multiset or the point assignment.
///
/// None of these are reachable from a correct search: candidates are validated
/// before they are applied and every apply is paired with its undo. An empty
/// solution list is how "no reconstruction exists" is reported, never an error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReconstructError {
    #[error("Cannot remove distance {0}: no occurrence remains")]
    DistanceNotPresent(u64),

    #[error("Cannot place a point on the {0} side: no free slot")]
    SideFull(Side),

    #[error("Cannot unplace a point on the {0} side: nothing placed")]
    SideEmpty(Side),
}
