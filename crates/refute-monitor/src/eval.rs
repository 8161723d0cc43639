//! Robustness evaluation over a formula AST.
//!
//! Recursive bottom-up evaluation with an explicit memo table keyed by
//! (sub-formula id, time index). The table is scoped to one `evaluate`
//! call and discarded after, so no evaluation state leaks across calls.

use std::collections::HashMap;

use crate::formula::{Cmp, Formula, SignalExpr};
use crate::trace::Trace;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MonitorError {
    #[error("cannot evaluate a formula on an empty trace")]
    EmptyTrace,

    #[error("formula window needs {needed} trace steps, trace has {trace_len}")]
    Horizon { needed: usize, trace_len: usize },

    #[error("trace has no signal '{name}' at step {step}")]
    UnknownSignal { name: String, step: usize },

    #[error("formula window [{start}, {end}] is inverted")]
    InvalidWindow { start: usize, end: usize },

    #[error("'{connective}' has no operands")]
    EmptyConnective { connective: &'static str },
}

/// Result of evaluating one (trace, formula) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// Signed margin of satisfaction: positive means satisfied, negative
    /// means violated, magnitude is distance to the boundary.
    pub robustness: f64,
    /// Boundary-inclusive by convention: exactly zero counts as satisfying.
    pub verdict: bool,
}

/// Evaluate a formula at the start of a trace.
pub fn evaluate(trace: &Trace, formula: &Formula) -> Result<Evaluation, MonitorError> {
    if trace.is_empty() {
        return Err(MonitorError::EmptyTrace);
    }
    let table = NodeTable::build(formula);
    table.check()?;
    let mut memo: HashMap<(usize, usize), f64> = HashMap::new();
    let robustness = rob(&table, trace, 0, 0, &mut memo)?;
    Ok(Evaluation {
        robustness,
        verdict: robustness >= 0.0,
    })
}

/// Flattened formula AST: every sub-formula gets a stable id, used as the
/// memo key alongside the time index.
struct NodeTable<'a> {
    nodes: Vec<&'a Formula>,
    children: Vec<Vec<usize>>,
}

impl<'a> NodeTable<'a> {
    fn build(root: &'a Formula) -> Self {
        let mut table = NodeTable {
            nodes: Vec::new(),
            children: Vec::new(),
        };
        table.add(root);
        table
    }

    fn add(&mut self, f: &'a Formula) -> usize {
        let id = self.nodes.len();
        self.nodes.push(f);
        self.children.push(Vec::new());
        let child_ids: Vec<usize> = match f {
            Formula::Predicate { .. } => Vec::new(),
            Formula::Not(body)
            | Formula::Always { body, .. }
            | Formula::Eventually { body, .. } => vec![self.add(body)],
            Formula::Implies(lhs, rhs) | Formula::Until { lhs, rhs, .. } => {
                vec![self.add(lhs), self.add(rhs)]
            }
            Formula::And(parts) | Formula::Or(parts) => {
                parts.iter().map(|p| self.add(p)).collect()
            }
        };
        self.children[id] = child_ids;
        id
    }

    /// Reject structurally malformed formulas before any robustness is
    /// computed. An inverted window or an empty connective would otherwise
    /// fold over zero operands and report an infinite margin.
    fn check(&self) -> Result<(), MonitorError> {
        for node in &self.nodes {
            match node {
                Formula::And(parts) if parts.is_empty() => {
                    return Err(MonitorError::EmptyConnective { connective: "and" });
                }
                Formula::Or(parts) if parts.is_empty() => {
                    return Err(MonitorError::EmptyConnective { connective: "or" });
                }
                Formula::Always { window: Some(w), .. }
                | Formula::Eventually { window: Some(w), .. }
                | Formula::Until { window: Some(w), .. }
                    if w.start > w.end =>
                {
                    return Err(MonitorError::InvalidWindow {
                        start: w.start,
                        end: w.end,
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Robustness of node `id` at step `t`.
fn rob(
    table: &NodeTable<'_>,
    trace: &Trace,
    id: usize,
    t: usize,
    memo: &mut HashMap<(usize, usize), f64>,
) -> Result<f64, MonitorError> {
    if let Some(&cached) = memo.get(&(id, t)) {
        return Ok(cached);
    }

    let value = match table.nodes[id] {
        Formula::Predicate { expr, cmp, bound } => {
            let v = eval_expr(expr, trace, t)?;
            match cmp {
                Cmp::Le | Cmp::Lt => bound - v,
                Cmp::Ge | Cmp::Gt => v - bound,
            }
        }

        Formula::Not(_) => -rob(table, trace, table.children[id][0], t, memo)?,

        Formula::And(_) => {
            let mut acc = f64::INFINITY;
            for &child in &table.children[id] {
                acc = acc.min(rob(table, trace, child, t, memo)?);
            }
            acc
        }

        Formula::Or(_) => {
            let mut acc = f64::NEG_INFINITY;
            for &child in &table.children[id] {
                acc = acc.max(rob(table, trace, child, t, memo)?);
            }
            acc
        }

        Formula::Implies(_, _) => {
            let lhs = rob(table, trace, table.children[id][0], t, memo)?;
            let rhs = rob(table, trace, table.children[id][1], t, memo)?;
            (-lhs).max(rhs)
        }

        Formula::Always { window, .. } => {
            let (start, end) = resolve_window(*window, t, trace.len())?;
            let child = table.children[id][0];
            let mut acc = f64::INFINITY;
            for step in start..=end {
                acc = acc.min(rob(table, trace, child, step, memo)?);
            }
            acc
        }

        Formula::Eventually { window, .. } => {
            let (start, end) = resolve_window(*window, t, trace.len())?;
            let child = table.children[id][0];
            let mut acc = f64::NEG_INFINITY;
            for step in start..=end {
                acc = acc.max(rob(table, trace, child, step, memo)?);
            }
            acc
        }

        Formula::Until { window, .. } => {
            let (start, end) = resolve_window(*window, t, trace.len())?;
            let lhs = table.children[id][0];
            let rhs = table.children[id][1];
            // max over split points of min(rhs at split, lhs on every step
            // before it). Prefix min over lhs carries across split points.
            let mut lhs_prefix = f64::INFINITY;
            for step in t..start {
                lhs_prefix = lhs_prefix.min(rob(table, trace, lhs, step, memo)?);
            }
            let mut acc = f64::NEG_INFINITY;
            for split in start..=end {
                let at_split = rob(table, trace, rhs, split, memo)?;
                acc = acc.max(at_split.min(lhs_prefix));
                lhs_prefix = lhs_prefix.min(rob(table, trace, lhs, split, memo)?);
            }
            acc
        }
    };

    memo.insert((id, t), value);
    Ok(value)
}

/// Absolute [start, end] step range for a window anchored at `t`.
///
/// Bounded windows extending past the end of the trace are a hard
/// [`MonitorError::Horizon`], never silently truncated, so a short trace
/// cannot hide a violation. Unbounded windows run to the last step.
fn resolve_window(
    window: Option<crate::formula::Interval>,
    t: usize,
    trace_len: usize,
) -> Result<(usize, usize), MonitorError> {
    match window {
        Some(w) => {
            let end = t + w.end;
            if end >= trace_len {
                return Err(MonitorError::Horizon {
                    needed: end + 1,
                    trace_len,
                });
            }
            Ok((t + w.start, end))
        }
        None => {
            if t >= trace_len {
                return Err(MonitorError::Horizon {
                    needed: t + 1,
                    trace_len,
                });
            }
            Ok((t, trace_len - 1))
        }
    }
}

fn eval_expr(expr: &SignalExpr, trace: &Trace, t: usize) -> Result<f64, MonitorError> {
    match expr {
        SignalExpr::Signal(name) => {
            trace
                .value(name, t)
                .ok_or_else(|| MonitorError::UnknownSignal {
                    name: name.clone(),
                    step: t,
                })
        }
        SignalExpr::Const(c) => Ok(*c),
        SignalExpr::Neg(inner) => Ok(-eval_expr(inner, trace, t)?),
        SignalExpr::Add(a, b) => Ok(eval_expr(a, trace, t)? + eval_expr(b, trace, t)?),
        SignalExpr::Sub(a, b) => Ok(eval_expr(a, trace, t)? - eval_expr(b, trace, t)?),
        SignalExpr::Mul(a, b) => Ok(eval_expr(a, trace, t)? * eval_expr(b, trace, t)?),
    }
}
