//! Temporal-property monitoring with quantitative semantics.
//!
//! Evaluates a finite [`trace::Trace`] against a temporal-logic
//! [`formula::Formula`], producing a real-valued robustness margin and a
//! derived boolean verdict. The sign of the robustness equals the truth
//! value; the magnitude is the margin to the satisfaction boundary.

pub mod eval;
pub mod formula;
pub mod trace;

pub use eval::{evaluate, Evaluation, MonitorError};
pub use formula::{Cmp, Formula, Interval, SignalExpr};
pub use trace::{Snapshot, Trace, TraceSummary};
