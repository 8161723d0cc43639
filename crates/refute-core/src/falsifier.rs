//! The falsification loop state machine.
//!
//! `READY -> RUNNING -> {SUCCEEDED, EXHAUSTED, ABORTED}`, terminal on the
//! last three. For a fixed sampler seed and a deterministic simulator the
//! sequence of proposed points is fully reproducible.

use refute_explore::{Sampler, SamplerError};
use refute_monitor::{evaluate, Formula, MonitorError};
use refute_space::{ParameterSpace, Point};
use refute_store::{ErrorTable, EvalRecord, Outcome};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::limits::{BudgetChecker, ExhaustReason, RunLimits};
use crate::simulate::Simulator;

/// Lifecycle of a falsification run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Ready,
    Running,
    /// A counterexample was found under stop-on-first.
    Succeeded,
    /// Budget or search space spent without stopping early.
    Exhausted,
    /// The external collaborator failed beyond the retry bound, or an
    /// internal invariant broke.
    Aborted,
}

/// Context carried out of an aborted run: the last point in flight and the
/// error that killed the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbortContext {
    pub point: Point,
    pub error: String,
}

/// Summary of a finished run. The full record-by-record history stays in
/// the error table.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub phase: Phase,
    /// Completed evaluations (failed simulate attempts not included).
    pub iterations: u64,
    pub counterexamples: usize,
    pub best_robustness: Option<f64>,
    pub first_counterexample: Option<EvalRecord>,
    pub exhaust_reason: Option<ExhaustReason>,
    pub abort: Option<AbortContext>,
}

/// Orchestrates one falsification run: sampler -> simulator -> monitor ->
/// error table -> sampler, until success, exhaustion, or abort.
pub struct Falsifier<'a, S: Sampler, X: Simulator> {
    space: &'a ParameterSpace,
    formula: &'a Formula,
    sampler: S,
    simulator: X,
    limits: RunLimits,
    table: ErrorTable,
    phase: Phase,
    iterations: u64,
    exhaust_reason: Option<ExhaustReason>,
    abort: Option<AbortContext>,
}

impl<'a, S: Sampler, X: Simulator> Falsifier<'a, S, X> {
    pub fn new(
        space: &'a ParameterSpace,
        formula: &'a Formula,
        sampler: S,
        simulator: X,
        limits: RunLimits,
    ) -> Self {
        Self {
            space,
            formula,
            sampler,
            simulator,
            limits,
            table: ErrorTable::new(),
            phase: Phase::Ready,
            iterations: 0,
            exhaust_reason: None,
            abort: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The accumulated evaluation records.
    pub fn table(&self) -> &ErrorTable {
        &self.table
    }

    /// Hand the table to the caller for persistence or offline analysis.
    pub fn into_table(self) -> ErrorTable {
        self.table
    }

    /// Drive the loop to a terminal phase. Calling `run` on an already
    /// finished falsifier returns the existing report unchanged.
    pub fn run(&mut self) -> RunReport {
        if self.phase != Phase::Ready {
            return self.report();
        }
        self.phase = Phase::Running;
        info!(sampler = self.sampler.name(), "falsification run started");
        let checker = BudgetChecker::new(&self.limits);

        while self.phase == Phase::Running {
            if let Some(reason) = checker.check(self.iterations) {
                debug!(?reason, iterations = self.iterations, "budget spent");
                self.exhaust_reason = Some(reason);
                self.phase = Phase::Exhausted;
                break;
            }
            self.step();
        }

        info!(
            phase = ?self.phase,
            iterations = self.iterations,
            counterexamples = self.table.counterexamples().count(),
            elapsed_secs = checker.elapsed_secs(),
            "falsification run finished"
        );
        self.report()
    }

    /// One iteration: propose, simulate (with retries), evaluate, record,
    /// feed back.
    fn step(&mut self) {
        let point = match self.next_valid_point() {
            Some(point) => point,
            None => return, // phase already set
        };

        let trace = match self.simulate_with_retries(&point) {
            Some(trace) => trace,
            None => return,
        };
        self.iterations += 1;

        match evaluate(&trace, self.formula) {
            Ok(eval) => {
                let outcome = Outcome::Scored {
                    robustness: eval.robustness,
                    verdict: eval.verdict,
                };
                self.table
                    .record(point.clone(), outcome, Some(trace.summary()));
                self.sampler.update(&point, eval.robustness, eval.verdict);
                if !eval.verdict {
                    info!(%point, robustness = eval.robustness, "counterexample found");
                    if self.limits.stop_on_first {
                        self.phase = Phase::Succeeded;
                    }
                }
            }
            Err(MonitorError::Horizon { needed, trace_len }) => {
                // Policy: a trace too short for the formula's window counts
                // as a violation, since truncation must not hide one. No
                // finite robustness exists, so the sampler gets no feedback.
                warn!(needed, trace_len, %point, "trace shorter than formula horizon");
                self.table.record(
                    point,
                    Outcome::Horizon { needed, trace_len },
                    Some(trace.summary()),
                );
                if self.limits.stop_on_first {
                    self.phase = Phase::Succeeded;
                }
            }
            Err(e) => {
                // Unknown signal / empty trace mean the simulator and the
                // formula disagree about the world; continuing would score
                // garbage.
                self.abort_with(point, e.to_string());
            }
        }
    }

    /// Pull proposals until one passes validation, bounded by the retry
    /// budget. Samplers validate internally, so rejections here mean a
    /// strategy bug; they are resampled transparently up to the bound.
    fn next_valid_point(&mut self) -> Option<Point> {
        let mut last: Option<(Point, String)> = None;
        for _ in 0..=self.limits.max_retries {
            match self.sampler.propose(self.space) {
                Ok(point) => match self.space.validate(&point) {
                    Ok(()) => return Some(point),
                    Err(e) => {
                        debug!(%point, error = %e, "proposal rejected, resampling");
                        last = Some((point, e.to_string()));
                    }
                },
                Err(SamplerError::Exhausted { name, reason }) => {
                    info!(sampler = %name, %reason, "search space exhausted");
                    self.exhaust_reason = Some(ExhaustReason::SearchSpace);
                    self.phase = Phase::Exhausted;
                    return None;
                }
                Err(SamplerError::Domain(e)) => {
                    last = Some((Point::new(), e.to_string()));
                }
            }
        }
        let (point, error) = last.unwrap_or_else(|| {
            (Point::new(), "sampler produced no point".to_string())
        });
        self.abort_with(point, error);
        None
    }

    /// Run the simulator, recording each failure, up to the retry bound.
    fn simulate_with_retries(&mut self, point: &Point) -> Option<refute_monitor::Trace> {
        let mut attempt = 0u32;
        loop {
            match self
                .simulator
                .simulate(point, self.limits.max_trace_steps)
            {
                Ok(trace) => return Some(trace),
                Err(e) => {
                    warn!(%point, attempt, error = %e, "simulation failed");
                    self.table.record(
                        point.clone(),
                        Outcome::Failed {
                            error: e.to_string(),
                        },
                        None,
                    );
                    attempt += 1;
                    if attempt > self.limits.max_retries {
                        self.abort_with(point.clone(), e.to_string());
                        return None;
                    }
                }
            }
        }
    }

    fn abort_with(&mut self, point: Point, error: String) {
        warn!(%point, %error, "aborting run");
        self.abort = Some(AbortContext { point, error });
        self.phase = Phase::Aborted;
    }

    fn report(&self) -> RunReport {
        let first_counterexample = self.table.counterexamples().next().cloned();
        RunReport {
            phase: self.phase,
            iterations: self.iterations,
            counterexamples: self.table.counterexamples().count(),
            best_robustness: self.table.min_robustness(),
            first_counterexample,
            exhaust_reason: self.exhaust_reason,
            abort: self.abort.clone(),
        }
    }
}
