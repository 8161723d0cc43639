//! Falsification loop orchestration.
//!
//! Drives the feedback cycle: pull a point from the sampler, hand it to the
//! external simulator, score the resulting trace against the formula,
//! append the outcome to the error table, and feed it back to the sampler.
//! The loop is single-threaded and synchronous per evaluation; a separate
//! [`batch`] path dispatches fixed point lists across workers.

pub mod batch;
pub mod falsifier;
pub mod limits;
pub mod simulate;

pub use batch::run_batch;
pub use falsifier::{AbortContext, Falsifier, Phase, RunReport};
pub use limits::{BudgetChecker, ExhaustReason, RunLimits};
pub use simulate::{FnSimulator, SimulationError, Simulator};
