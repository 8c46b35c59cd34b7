//! End-to-end checks of candidate functions, from source text to report.

use insta::assert_snapshot;
use lyapviz_engine::{GridSpec, LyapunovProblem, Stability, StateVars, VerifyError, verify};

#[test]
fn reference_system_report() {
    let verdict = verify(("-x1**3", "-x2"), "x1**2 + x2**2", 3.0, 40).unwrap();
    assert_snapshot!(verdict.report(), @r"
    Condition 1: V(0)=0 ---> PASS
    Condition 2: V(x)>0 for x!=0 ---> PASS
    Vdot(x) : -2*x1**4 - 2*x2**2
    Condition 3: Vdot(x) <= 0 everywhere on grid ---> PASS
    Stability: Stable equilibrium (Check the interactive display for the type.)

    Conclusion: This function can be used as a Lyapunov function.
    ");
}

#[test]
fn failing_candidate_report() {
    let verdict = verify(("x1", "-x2"), "x1**2 + x2**2", 3.0, 40).unwrap();
    assert_snapshot!(verdict.report(), @r"
    Condition 1: V(0)=0 ---> PASS
    Condition 2: V(x)>0 for x!=0 ---> PASS
    Vdot(x) : 2*x1**2 - 2*x2**2
    Condition 3: Vdot(x) > 0 somewhere ---> FAIL
    Stability: Inconclusive

    Conclusion: This function cannot be used as a Lyapunov function, pick a new candidate.
    ");
}

#[test]
fn repeated_runs_give_identical_reports() {
    let first = verify(("-x1 + x2", "-x1 - x2**3"), "x1**2 + x2**2", 2.5, 33).unwrap();
    let second = verify(("-x1 + x2", "-x1 - x2**3"), "x1**2 + x2**2", 2.5, 33).unwrap();
    assert_eq!(first.report(), second.report());
    assert_eq!(first.conditions, second.conditions);
}

#[test]
fn derived_vdot_reparses_to_the_same_function() {
    let vars = StateVars::default();
    let problem =
        LyapunovProblem::parse("-x1 + x2", "-x1 - x2**3", "x1**2 + x2**2", &vars).unwrap();
    let text = problem.vdot().display(&vars).to_string();
    let reparsed = lyapviz_symbolic::parse(&text, &vars).unwrap();
    for point in [[0.5, -1.25], [2.0, 3.0], [-1.5, 0.75]] {
        let a = problem.vdot().eval(point);
        let b = reparsed.eval(point);
        assert!((a - b).abs() < 1e-9, "{text} at {point:?}: {a} vs {b}");
    }
}

#[test]
fn verifier_resolution_does_not_change_a_clear_verdict() {
    let vars = StateVars::default();
    let problem = LyapunovProblem::parse("-x1", "-x2", "x1**2 + x2**2", &vars).unwrap();
    for points in [2, 7, 40, 81] {
        let verdict = problem.verify(&GridSpec::new(3.0, points).unwrap());
        assert!(verdict.passed(), "{points} points");
        assert_eq!(verdict.stability, Stability::Stable);
    }
}

#[test]
fn parse_failures_come_before_grid_failures() {
    let err = verify(("-x1", "-x2"), "x1**2 +", 0.0, 1).unwrap_err();
    assert!(err.is_parse());
    assert!(matches!(err, VerifyError::Parse { .. }));
}
