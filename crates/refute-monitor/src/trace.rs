use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One timestamped state snapshot from a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub time: f64,
    /// Signal name -> observed value (sorted for determinism).
    pub values: BTreeMap<String, f64>,
}

impl Snapshot {
    pub fn new(time: f64) -> Self {
        Self {
            time,
            values: BTreeMap::new(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.values.insert(name.into(), value);
        self
    }
}

/// A time-ordered sequence of snapshots returned by the simulator.
///
/// Opaque to the engine except for the signals a formula references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Trace {
    pub steps: Vec<Snapshot>,
}

impl Trace {
    pub fn new(steps: Vec<Snapshot>) -> Self {
        Self { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Signal value at step `t`, if the step and signal exist.
    pub fn value(&self, name: &str, t: usize) -> Option<f64> {
        self.steps.get(t).and_then(|s| s.values.get(name)).copied()
    }

    /// Compact summary stored alongside evaluation records.
    pub fn summary(&self) -> TraceSummary {
        let duration = match (self.steps.first(), self.steps.last()) {
            (Some(first), Some(last)) => last.time - first.time,
            _ => 0.0,
        };
        TraceSummary {
            steps: self.steps.len(),
            duration,
        }
    }
}

/// Simulator-provided trace summary kept with each evaluation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceSummary {
    pub steps: usize,
    pub duration: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_value_lookup() {
        let trace = Trace::new(vec![
            Snapshot::new(0.0).with("x", 1.0),
            Snapshot::new(0.1).with("x", 2.0),
        ]);
        assert_eq!(trace.value("x", 1), Some(2.0));
        assert_eq!(trace.value("x", 2), None);
        assert_eq!(trace.value("y", 0), None);
    }

    #[test]
    fn test_trace_summary() {
        let trace = Trace::new(vec![
            Snapshot::new(0.0).with("x", 1.0),
            Snapshot::new(0.5).with("x", 2.0),
            Snapshot::new(1.0).with("x", 3.0),
        ]);
        let summary = trace.summary();
        assert_eq!(summary.steps, 3);
        assert!((summary.duration - 1.0).abs() < 1e-12);
    }
}
