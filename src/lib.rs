//! Turnpike reconstruction: recovers a set of points on a line, anchored at 0,
//! from the multiset of all their pairwise distances.
//!
//! [`TurnpikeSolver`] is the entry point. It builds a [`Reconstructor`], which
//! places the two extreme points first and then repeatedly explains the largest
//! remaining distance from one end or the other, backtracking on dead ends.

pub mod distances;
pub mod error;
pub mod lut;
pub mod points;
pub mod reconstructor;
pub mod solver;

pub use distances::DistanceMultiset;
pub use error::ReconstructError;
pub use points::{Placement, PointAssignment, Side};
pub use reconstructor::{Candidate, Reconstructor};
pub use solver::{SearchMode, SolverConfig, SolverResult, TurnpikeSolver};
