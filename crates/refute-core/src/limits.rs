//! Run budgets and cooperative cancellation.
//!
//! Budgets are checked between iterations; in-flight simulator calls are
//! never preempted, so cancellation takes effect at the next iteration
//! boundary.

use serde::{Deserialize, Serialize};

/// Budgets and policies for a single falsification run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunLimits {
    /// Maximum completed evaluations before the run is exhausted.
    pub max_iterations: u64,
    /// Wall-clock deadline in seconds.
    pub max_wall_secs: u64,
    /// Simulator failures tolerated per iteration before aborting.
    pub max_retries: u32,
    /// Maximum trace length requested from the simulator.
    pub max_trace_steps: usize,
    /// Stop at the first counterexample instead of collecting all of them.
    pub stop_on_first: bool,
}

impl Default for RunLimits {
    fn default() -> Self {
        Self {
            max_iterations: 1_000,
            max_wall_secs: 300, // 5 minutes
            max_retries: 3,
            max_trace_steps: 10_000,
            stop_on_first: true,
        }
    }
}

/// Why a run ran out of budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExhaustReason {
    IterationBudget,
    Deadline,
    /// The sampler enumerated its whole search plan (e.g. grid sweep done).
    SearchSpace,
}

/// Checks budgets between iterations.
pub struct BudgetChecker {
    max_iterations: u64,
    max_wall_secs: u64,
    start: std::time::Instant,
}

impl BudgetChecker {
    pub fn new(limits: &RunLimits) -> Self {
        Self {
            max_iterations: limits.max_iterations,
            max_wall_secs: limits.max_wall_secs,
            start: std::time::Instant::now(),
        }
    }

    /// None if budget remains, otherwise the reason to stop.
    pub fn check(&self, iterations: u64) -> Option<ExhaustReason> {
        if iterations >= self.max_iterations {
            return Some(ExhaustReason::IterationBudget);
        }
        if self.start.elapsed().as_secs() >= self.max_wall_secs {
            return Some(ExhaustReason::Deadline);
        }
        None
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}
