//! Temporal-logic formula AST.
//!
//! Formulas are immutable: constructed (or deserialized from an external
//! source) once and then only evaluated. Windows are given in
//! trace step offsets, inclusive on both ends; a missing window means
//! "to the end of the trace".

use serde::{Deserialize, Serialize};

/// Numeric expression over one trace snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SignalExpr {
    /// Named signal sampled from the snapshot.
    Signal(String),
    Const(f64),
    Neg(Box<SignalExpr>),
    Add(Box<SignalExpr>, Box<SignalExpr>),
    Sub(Box<SignalExpr>, Box<SignalExpr>),
    Mul(Box<SignalExpr>, Box<SignalExpr>),
}

impl SignalExpr {
    pub fn signal(name: impl Into<String>) -> Self {
        SignalExpr::Signal(name.into())
    }
}

/// Comparison against a constant bound.
///
/// Quantitative semantics does not distinguish strict from non-strict
/// comparison; both `Le` and `Lt` yield robustness `bound - value`, both
/// `Ge` and `Gt` yield `value - bound`. The boundary-inclusive verdict
/// convention lives in [`crate::eval::Evaluation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cmp {
    Le,
    Lt,
    Ge,
    Gt,
}

/// Inclusive step-offset window for bounded temporal operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: usize,
    pub end: usize,
}

impl Interval {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// A temporal-logic formula over trace-observable predicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Formula {
    /// Atomic numeric comparison, e.g. `x <= 5`.
    Predicate {
        expr: SignalExpr,
        cmp: Cmp,
        bound: f64,
    },
    Not(Box<Formula>),
    And(Vec<Formula>),
    Or(Vec<Formula>),
    Implies(Box<Formula>, Box<Formula>),
    /// Globally: body must hold at every step of the window.
    Always {
        window: Option<Interval>,
        body: Box<Formula>,
    },
    /// Finally: body must hold at some step of the window.
    Eventually {
        window: Option<Interval>,
        body: Box<Formula>,
    },
    /// Bounded until: `rhs` holds at some window step, `lhs` at every step
    /// before it.
    Until {
        window: Option<Interval>,
        lhs: Box<Formula>,
        rhs: Box<Formula>,
    },
}

impl Formula {
    /// `expr <= bound`
    pub fn le(expr: SignalExpr, bound: f64) -> Self {
        Formula::Predicate {
            expr,
            cmp: Cmp::Le,
            bound,
        }
    }

    /// `expr >= bound`
    pub fn ge(expr: SignalExpr, bound: f64) -> Self {
        Formula::Predicate {
            expr,
            cmp: Cmp::Ge,
            bound,
        }
    }

    pub fn not(self) -> Self {
        Formula::Not(Box::new(self))
    }

    pub fn always(self) -> Self {
        Formula::Always {
            window: None,
            body: Box::new(self),
        }
    }

    pub fn always_within(self, start: usize, end: usize) -> Self {
        Formula::Always {
            window: Some(Interval::new(start, end)),
            body: Box::new(self),
        }
    }

    pub fn eventually(self) -> Self {
        Formula::Eventually {
            window: None,
            body: Box::new(self),
        }
    }

    pub fn eventually_within(self, start: usize, end: usize) -> Self {
        Formula::Eventually {
            window: Some(Interval::new(start, end)),
            body: Box::new(self),
        }
    }

    pub fn until(self, rhs: Formula) -> Self {
        Formula::Until {
            window: None,
            lhs: Box::new(self),
            rhs: Box::new(rhs),
        }
    }

    pub fn until_within(self, rhs: Formula, start: usize, end: usize) -> Self {
        Formula::Until {
            window: Some(Interval::new(start, end)),
            lhs: Box::new(self),
            rhs: Box::new(rhs),
        }
    }
}
