//! Concurrent evaluation of a fixed batch of points.
//!
//! Only valid for stateless sampling (the points are fixed up front), since
//! adaptive proposals depend on the previous update. Workers simulate and
//! evaluate independently; results flow over a channel to the caller's
//! thread, which appends them to the table in completion order. The
//! sequence index is assigned at append, under a single thread; that
//! append is the linearization point.

use crossbeam::channel;
use refute_monitor::{evaluate, Formula, MonitorError, Trace, TraceSummary};
use refute_space::Point;
use refute_store::{ErrorTable, Outcome};
use tracing::debug;

use crate::simulate::Simulator;

/// Evaluate `points` across `threads` workers, appending every outcome to
/// `table`. Returns the number of records appended. Simulator failures are
/// recorded as failed outcomes; the batch does not retry.
pub fn run_batch<S, F>(
    formula: &Formula,
    make_sim: F,
    points: Vec<Point>,
    max_trace_steps: usize,
    threads: usize,
    table: &mut ErrorTable,
) -> usize
where
    S: Simulator,
    F: Fn() -> S + Sync,
{
    let threads = threads.max(1);
    let total = points.len();
    let (job_tx, job_rx) = channel::unbounded::<Point>();
    let (result_tx, result_rx) = channel::unbounded();
    for point in points {
        // Unbounded channel, send cannot fail while the receiver lives.
        let _ = job_tx.send(point);
    }
    drop(job_tx);

    rayon::scope(|scope| {
        for _ in 0..threads {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            let make_sim = &make_sim;
            scope.spawn(move |_| {
                let mut simulator = make_sim();
                while let Ok(point) = job_rx.recv() {
                    let (outcome, summary) =
                        evaluate_one(&mut simulator, formula, &point, max_trace_steps);
                    let _ = result_tx.send((point, outcome, summary));
                }
            });
        }
        drop(result_tx);

        // Append in completion order; dispatch order is irrelevant.
        for (point, outcome, summary) in result_rx.iter() {
            table.record(point, outcome, summary);
        }
    });

    debug!(total, threads, "batch evaluation complete");
    total
}

fn evaluate_one<S: Simulator>(
    simulator: &mut S,
    formula: &Formula,
    point: &Point,
    max_trace_steps: usize,
) -> (Outcome, Option<TraceSummary>) {
    let trace: Trace = match simulator.simulate(point, max_trace_steps) {
        Ok(trace) => trace,
        Err(e) => {
            return (
                Outcome::Failed {
                    error: e.to_string(),
                },
                None,
            )
        }
    };
    let summary = Some(trace.summary());
    match evaluate(&trace, formula) {
        Ok(eval) => (
            Outcome::Scored {
                robustness: eval.robustness,
                verdict: eval.verdict,
            },
            summary,
        ),
        Err(MonitorError::Horizon { needed, trace_len }) => {
            (Outcome::Horizon { needed, trace_len }, summary)
        }
        Err(e) => (
            Outcome::Failed {
                error: e.to_string(),
            },
            summary,
        ),
    }
}
