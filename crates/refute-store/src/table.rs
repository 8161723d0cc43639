use refute_monitor::TraceSummary;
use refute_space::Point;
use serde::{Deserialize, Serialize};

/// Outcome of a single evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    /// The monitor produced a robustness margin.
    Scored { robustness: f64, verdict: bool },
    /// The formula needed trace data beyond what the simulator produced.
    /// Counts as a violation: a truncated trace cannot hide one.
    Horizon { needed: usize, trace_len: usize },
    /// The external simulator failed; no verdict exists.
    Failed { error: String },
}

impl Outcome {
    /// Boolean verdict, if one exists for this outcome.
    pub fn verdict(&self) -> Option<bool> {
        match self {
            Outcome::Scored { verdict, .. } => Some(*verdict),
            Outcome::Horizon { .. } => Some(false),
            Outcome::Failed { .. } => None,
        }
    }

    pub fn robustness(&self) -> Option<f64> {
        match self {
            Outcome::Scored { robustness, .. } => Some(*robustness),
            _ => None,
        }
    }
}

/// One evaluated sample. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalRecord {
    /// Monotonically increasing sequence index, assigned at append.
    pub seq: u64,
    pub point: Point,
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<TraceSummary>,
}

impl EvalRecord {
    /// Whether this record is a counterexample (verdict false).
    pub fn is_counterexample(&self) -> bool {
        self.outcome.verdict() == Some(false)
    }
}

/// Append-only table of evaluation records for one falsification run.
///
/// There is no update or delete operation. Sequence indices start at 0 and
/// increase by one per append; single-writer by construction, so the append
/// order is the linearization order.
#[derive(Debug, Default)]
pub struct ErrorTable {
    records: Vec<EvalRecord>,
}

impl ErrorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, returning its assigned sequence index.
    pub fn record(
        &mut self,
        point: Point,
        outcome: Outcome,
        summary: Option<TraceSummary>,
    ) -> u64 {
        let seq = self.records.len() as u64;
        self.records.push(EvalRecord {
            seq,
            point,
            outcome,
            summary,
        });
        seq
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in insertion order; lazy and restartable.
    pub fn all(&self) -> impl Iterator<Item = &EvalRecord> {
        self.records.iter()
    }

    /// Records whose verdict is false, in insertion order.
    pub fn counterexamples(&self) -> impl Iterator<Item = &EvalRecord> {
        self.records.iter().filter(|r| r.is_counterexample())
    }

    /// The k lowest-robustness scored records, ties kept in insertion order.
    pub fn best(&self, k: usize) -> Vec<&EvalRecord> {
        let mut scored: Vec<&EvalRecord> = self
            .records
            .iter()
            .filter(|r| r.outcome.robustness().is_some())
            .collect();
        scored.sort_by(|a, b| {
            let ra = a.outcome.robustness().unwrap_or(f64::INFINITY);
            let rb = b.outcome.robustness().unwrap_or(f64::INFINITY);
            ra.partial_cmp(&rb)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.seq.cmp(&b.seq))
        });
        scored.truncate(k);
        scored
    }

    /// Lowest robustness seen so far, if any record was scored.
    pub fn min_robustness(&self) -> Option<f64> {
        self.records
            .iter()
            .filter_map(|r| r.outcome.robustness())
            .fold(None, |acc, r| Some(acc.map_or(r, |a: f64| a.min(r))))
    }
}
