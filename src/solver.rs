//! Module driving the reconstruction, sequentially or across a rayon pool

use std::collections::HashSet;
use std::ops::ControlFlow;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::ReconstructError;
use crate::points::Placement;
use crate::reconstructor::Reconstructor;

/// How far the search goes once a solution is found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// Enumerate every reconstruction
    #[default]
    All,

    /// Stop at the first reconstruction in depth-first order
    First,
}

/// Configuration for the solver
#[derive(Debug, Clone, Default)]
pub struct SolverConfig {
    /// Whether to stop after the first solution
    pub mode: SearchMode,

    /// Use multi-processing
    pub multi_processing: bool,

    /// Show a progress bar over parallel branches
    pub progress: bool,
}

/// Result from the solver
#[derive(Debug, Clone, Default)]
pub struct SolverResult {
    /// Distinct reconstructions in the order the search met them
    pub solutions: Vec<Placement>,

    /// Number of states examined during search
    pub states_examined: usize,
}

impl SolverResult {
    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    /// Keeps the first occurrence of each point set.
    ///
    /// When both candidates of a step name the same position and a single slot
    /// is left, the two branches fill the same array.
    fn push_unique(&mut self, seen: &mut HashSet<Placement>, placement: Placement) {
        if seen.insert(placement.clone()) {
            self.solutions.push(placement);
        }
    }
}

/// Main solver for turnpike reconstruction
pub struct TurnpikeSolver {
    config: SolverConfig,
}

impl TurnpikeSolver {
    /// Creates a new solver with the given configuration
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Reconstructs every point set (or the first, in [`SearchMode::First`])
    /// whose pairwise distances are exactly `distances`
    pub fn solve(&self, distances: &[u64]) -> Result<SolverResult, ReconstructError> {
        let start_time = Instant::now();
        let reconstructor = Reconstructor::new(distances)?;

        let result = if !reconstructor.is_feasible() {
            SolverResult::default()
        } else if self.config.multi_processing {
            self.solve_parallel(reconstructor)?
        } else {
            self.solve_single(reconstructor)?
        };

        info!(
            distances = distances.len(),
            solutions = result.solutions.len(),
            states = result.states_examined,
            elapsed = ?start_time.elapsed(),
            "search finished"
        );
        Ok(result)
    }

    /// Single-threaded depth-first search
    fn solve_single(&self, mut reconstructor: Reconstructor) -> Result<SolverResult, ReconstructError> {
        let mut result = SolverResult::default();
        let mut seen = HashSet::new();
        let mode = self.config.mode;

        let flow = reconstructor.search(|placement| {
            result.push_unique(&mut seen, placement.clone());
            match mode {
                SearchMode::All => ControlFlow::Continue(()),
                SearchMode::First => ControlFlow::Break(()),
            }
        })?;
        if flow.is_break() {
            debug!(states = reconstructor.states_examined(), "stopped at first solution");
        }

        result.states_examined = reconstructor.states_examined();
        Ok(result)
    }

    /// Multi-threaded search over independent sub-states
    fn solve_parallel(&self, reconstructor: Reconstructor) -> Result<SolverResult, ReconstructError> {
        let num_threads = num_cpus::get();
        let (tasks, expanded) = self.generate_tasks(reconstructor, num_threads * 4)?;

        debug!(threads = num_threads, tasks = tasks.len(), "dispatching branches");

        let progress = if self.config.progress {
            let bar = ProgressBar::new(tasks.len() as u64);
            if let Ok(style) =
                ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} branches")
            {
                bar.set_style(style);
            }
            bar
        } else {
            ProgressBar::hidden()
        };

        let single = TurnpikeSolver::new(SolverConfig {
            multi_processing: false,
            progress: false,
            ..self.config.clone()
        });

        // Collecting preserves task order, so solutions come out in depth-first order
        let partials = tasks
            .into_par_iter()
            .map(|task| {
                let partial = single.solve_single(task);
                progress.inc(1);
                partial
            })
            .collect::<Result<Vec<_>, _>>()?;
        progress.finish_and_clear();

        let mut result = SolverResult {
            solutions: Vec::new(),
            states_examined: expanded,
        };
        let mut seen = HashSet::new();
        for partial in partials {
            result.states_examined += partial.states_examined;
            for placement in partial.solutions {
                result.push_unique(&mut seen, placement);
            }
        }
        if self.config.mode == SearchMode::First {
            result.solutions.truncate(1);
        }
        Ok(result)
    }

    /// Expands the search tree breadth-first until there are at least `target`
    /// independent branches or nothing is left to expand.
    ///
    /// Returns the frontier in depth-first order and the number of states that
    /// were expanded to produce it.
    fn generate_tasks(
        &self,
        root: Reconstructor,
        target: usize,
    ) -> Result<(Vec<Reconstructor>, usize), ReconstructError> {
        let mut frontier = vec![root];
        let mut expanded = 0;

        while frontier.len() < target && frontier.iter().any(|task| !task.is_complete()) {
            let mut next = Vec::with_capacity(frontier.len() * 2);
            for task in frontier {
                if task.is_complete() {
                    next.push(task);
                } else {
                    expanded += 1;
                    next.extend(task.branches()?);
                }
            }
            frontier = next;
        }

        Ok((frontier, expanded))
    }
}
