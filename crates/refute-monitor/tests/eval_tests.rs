//! Semantic properties of robustness evaluation.

use refute_monitor::{evaluate, Cmp, Formula, MonitorError, SignalExpr, Snapshot, Trace};

fn constant_trace(x: f64, n: usize) -> Trace {
    Trace::new(
        (0..n)
            .map(|t| Snapshot::new(t as f64 * 0.1).with("x", x))
            .collect(),
    )
}

#[test]
fn verdict_always_matches_robustness_sign() {
    let formulas = vec![
        Formula::le(SignalExpr::signal("x"), 5.0).always(),
        Formula::ge(SignalExpr::signal("x"), 5.0).eventually(),
        Formula::le(SignalExpr::signal("x"), 3.0).not(),
        Formula::And(vec![
            Formula::le(SignalExpr::signal("x"), 8.0),
            Formula::ge(SignalExpr::signal("x"), 2.0),
        ]),
    ];
    for x in [0.0, 2.0, 5.0, 7.5, 10.0] {
        let trace = constant_trace(x, 10);
        for f in &formulas {
            let eval = evaluate(&trace, f).unwrap();
            assert_eq!(
                eval.verdict,
                eval.robustness >= 0.0,
                "verdict/sign mismatch for x={x}, formula {f:?}"
            );
        }
    }
}

#[test]
fn worked_scenario_always_x_le_5() {
    // x held constant at the sampled value; "always x <= 5".
    let f = Formula::le(SignalExpr::signal("x"), 5.0).always();

    let at7 = evaluate(&constant_trace(7.0, 20), &f).unwrap();
    assert_eq!(at7.robustness, -2.0);
    assert!(!at7.verdict);

    let at3 = evaluate(&constant_trace(3.0, 20), &f).unwrap();
    assert_eq!(at3.robustness, 2.0);
    assert!(at3.verdict);
}

#[test]
fn monotonicity_under_boundary_moves() {
    // Moving one value strictly further from the boundary in the satisfying
    // direction never lowers robustness of the predicate or of ancestors
    // built only from and/or/not.
    let base = Trace::new(vec![
        Snapshot::new(0.0).with("x", 3.0).with("y", 1.0),
        Snapshot::new(0.1).with("x", 4.0).with("y", 1.0),
        Snapshot::new(0.2).with("x", 2.0).with("y", 1.0),
    ]);
    // x moves from 4.0 down to 1.0 at step 1: further inside "x <= 5".
    let mut moved = base.clone();
    moved.steps[1].values.insert("x".to_string(), 1.0);

    let pred = Formula::le(SignalExpr::signal("x"), 5.0);
    let formulas = vec![
        pred.clone().always(),
        Formula::And(vec![pred.clone().always(), Formula::ge(SignalExpr::signal("y"), 0.0)]),
        Formula::Or(vec![pred.clone().always(), Formula::ge(SignalExpr::signal("y"), 9.0)]),
        // Double negation preserves direction.
        pred.clone().always().not().not(),
    ];
    for f in &formulas {
        let before = evaluate(&base, f).unwrap().robustness;
        let after = evaluate(&moved, f).unwrap().robustness;
        assert!(
            after >= before,
            "robustness dropped from {before} to {after} for {f:?}"
        );
    }
}

#[test]
fn evaluation_is_idempotent() {
    let trace = Trace::new(
        (0..30)
            .map(|t| Snapshot::new(t as f64).with("x", (t as f64 * 0.37).sin() * 6.0))
            .collect(),
    );
    let f = Formula::le(SignalExpr::signal("x"), 4.0)
        .always_within(0, 10)
        .eventually_within(0, 15);

    let first = evaluate(&trace, &f).unwrap();
    let second = evaluate(&trace, &f).unwrap();
    assert_eq!(first.robustness.to_bits(), second.robustness.to_bits());
    assert_eq!(first.verdict, second.verdict);
}

#[test]
fn until_requires_lhs_to_hold_before_rhs() {
    // lhs: a >= 0, rhs: b >= 1. b turns on at step 2; a stays nonnegative
    // until then.
    let good = Trace::new(vec![
        Snapshot::new(0.0).with("a", 2.0).with("b", 0.0),
        Snapshot::new(0.1).with("a", 1.0).with("b", 0.0),
        Snapshot::new(0.2).with("a", -3.0).with("b", 2.0),
    ]);
    let f = Formula::ge(SignalExpr::signal("a"), 0.0)
        .until(Formula::ge(SignalExpr::signal("b"), 1.0));
    let eval = evaluate(&good, &f).unwrap();
    // Split at step 2: min(b-1 = 1, min(a at 0..2) = 1) = 1.
    assert_eq!(eval.robustness, 1.0);
    assert!(eval.verdict);

    // a dips negative before b turns on.
    let bad = Trace::new(vec![
        Snapshot::new(0.0).with("a", 2.0).with("b", 0.0),
        Snapshot::new(0.1).with("a", -1.0).with("b", 0.0),
        Snapshot::new(0.2).with("a", -3.0).with("b", 2.0),
    ]);
    let eval = evaluate(&bad, &f).unwrap();
    assert!(!eval.verdict);
}

#[test]
fn bounded_until_window_honored() {
    // rhs only becomes true outside the window.
    let trace = Trace::new(vec![
        Snapshot::new(0.0).with("a", 1.0).with("b", 0.0),
        Snapshot::new(0.1).with("a", 1.0).with("b", 0.0),
        Snapshot::new(0.2).with("a", 1.0).with("b", 0.0),
        Snapshot::new(0.3).with("a", 1.0).with("b", 2.0),
    ]);
    let inside = Formula::ge(SignalExpr::signal("a"), 0.0)
        .until_within(Formula::ge(SignalExpr::signal("b"), 1.0), 0, 3);
    assert!(evaluate(&trace, &inside).unwrap().verdict);

    let outside = Formula::ge(SignalExpr::signal("a"), 0.0)
        .until_within(Formula::ge(SignalExpr::signal("b"), 1.0), 0, 2);
    assert!(!evaluate(&trace, &outside).unwrap().verdict);
}

#[test]
fn nested_operators_share_subformula_results() {
    // A deliberately nested formula over a longer trace; correctness here
    // implies the memo table keys (node, step) pairs consistently.
    let trace = Trace::new(
        (0..200)
            .map(|t| Snapshot::new(t as f64).with("x", ((t % 7) as f64) - 3.0))
            .collect(),
    );
    let f = Formula::le(SignalExpr::signal("x"), 3.0)
        .always_within(0, 6)
        .eventually_within(0, 20)
        .always_within(0, 150);
    let eval = evaluate(&trace, &f).unwrap();
    assert!(eval.verdict);
    assert_eq!(eval.robustness, 0.0);
}

#[test]
fn malformed_window_cannot_mask_a_violation() {
    // A window with start > end iterates over no steps; folding over them
    // would report an infinite satisfaction margin for a trace that
    // plainly violates the predicate. It must be an error instead.
    let trace = constant_trace(7.0, 10);
    let f = Formula::le(SignalExpr::signal("x"), 5.0).always_within(5, 2);
    assert_eq!(
        evaluate(&trace, &f),
        Err(MonitorError::InvalidWindow { start: 5, end: 2 })
    );
}

#[test]
fn implies_semantics() {
    let trace = constant_trace(7.0, 5);
    // x >= 5 implies x <= 10: holds at 7.
    let f = Formula::Implies(
        Box::new(Formula::ge(SignalExpr::signal("x"), 5.0)),
        Box::new(Formula::le(SignalExpr::signal("x"), 10.0)),
    );
    let eval = evaluate(&trace, &f).unwrap();
    assert_eq!(eval.robustness, 3.0);
    assert!(eval.verdict);
}

#[test]
fn strict_and_nonstrict_share_quantitative_semantics() {
    let trace = constant_trace(4.0, 1);
    let le = evaluate(
        &trace,
        &Formula::Predicate {
            expr: SignalExpr::signal("x"),
            cmp: Cmp::Le,
            bound: 5.0,
        },
    )
    .unwrap();
    let lt = evaluate(
        &trace,
        &Formula::Predicate {
            expr: SignalExpr::signal("x"),
            cmp: Cmp::Lt,
            bound: 5.0,
        },
    )
    .unwrap();
    assert_eq!(le.robustness, lt.robustness);
}
