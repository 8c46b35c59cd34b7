//! Three-condition Lyapunov test on a sampled grid.
//!
//! 1. `V(0) = 0`, decided symbolically with no tolerance.
//! 2. `V(x) > 0` at every sampled point off the origin.
//! 3. `Vdot(x) = grad V . f <= VDOT_TOLERANCE` at the same points.
//!
//! A non-finite sample fails the condition it was taken for.

use std::fmt;

use thiserror::Error;

use lyapviz_symbolic::{CompiledExpr, Expr, ParseError, StateVars, VarId, parse, simplify};

use crate::grid::{GridError, GridSpec, SampleGrid};

/// Largest sampled `Vdot` still counted as non-positive.
pub const VDOT_TOLERANCE: f64 = 1e-8;

/// Which user expression an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprRole {
    F1,
    F2,
    V,
}

impl fmt::Display for ExprRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExprRole::F1 => "f1",
            ExprRole::F2 => "f2",
            ExprRole::V => "V",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum VerifyError {
    #[error("invalid {role}: {source}")]
    Parse {
        role: ExprRole,
        #[source]
        source: ParseError,
    },
    #[error("invalid grid: {0}")]
    InvalidGrid(#[from] GridError),
}

impl VerifyError {
    #[must_use]
    pub fn is_parse(&self) -> bool {
        matches!(self, VerifyError::Parse { .. })
    }
}

/// Outcome of one of the three checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionResult {
    pub label: &'static str,
    pub passed: bool,
    /// Extra explanation appended to the label, empty when there is none.
    pub detail: String,
}

impl ConditionResult {
    fn new(label: &'static str, passed: bool, non_finite: usize) -> Self {
        let detail = if non_finite == 0 {
            String::new()
        } else {
            format!("{non_finite} non-finite samples")
        };
        Self {
            label,
            passed,
            detail,
        }
    }

    #[must_use]
    pub fn status(&self) -> &'static str {
        if self.passed { "PASS" } else { "FAIL" }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stability {
    Stable,
    Inconclusive,
}

impl Stability {
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Stability::Stable => "Stable equilibrium (Check the interactive display for the type.)",
            Stability::Inconclusive => "Inconclusive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SampleStats {
    /// Grid points checked, origin excluded.
    pub sampled: usize,
    pub non_finite_v: usize,
    pub non_finite_vdot: usize,
}

/// Parsed dynamics and candidate with the derived `Vdot`.
#[derive(Debug, Clone)]
pub struct LyapunovProblem {
    vars: StateVars,
    dynamics: [Expr; 2],
    v: Expr,
    vdot: Expr,
}

impl LyapunovProblem {
    pub fn parse(f1: &str, f2: &str, v: &str, vars: &StateVars) -> Result<Self, VerifyError> {
        let parse_as = |role, text: &str| {
            parse(text, vars).map_err(|source| VerifyError::Parse { role, source })
        };
        let f1 = parse_as(ExprRole::F1, f1)?;
        let f2 = parse_as(ExprRole::F2, f2)?;
        let v = parse_as(ExprRole::V, v)?;
        Ok(Self::new([f1, f2], v, vars.clone()))
    }

    #[must_use]
    pub fn new(dynamics: [Expr; 2], v: Expr, vars: StateVars) -> Self {
        let gradient_dot_f = VarId::ALL
            .into_iter()
            .map(|var| v.diff(var) * dynamics[var.index()].clone())
            .fold(Expr::num(0.0), |acc, term| acc + term);
        let vdot = simplify(&gradient_dot_f);
        tracing::debug!(vdot = %vdot.display(&vars), "derived Vdot");
        Self {
            vars,
            dynamics,
            v,
            vdot,
        }
    }

    #[must_use]
    pub fn vars(&self) -> &StateVars {
        &self.vars
    }

    #[must_use]
    pub fn dynamics(&self) -> &[Expr; 2] {
        &self.dynamics
    }

    #[must_use]
    pub fn v(&self) -> &Expr {
        &self.v
    }

    #[must_use]
    pub fn vdot(&self) -> &Expr {
        &self.vdot
    }

    /// Run all three checks over `spec`.
    #[must_use]
    pub fn verify(&self, spec: &GridSpec) -> Verdict {
        let grid = SampleGrid::new(*spec);

        let at_origin = VarId::ALL
            .into_iter()
            .fold(self.v.clone(), |expr, var| expr.substitute(var, &Expr::num(0.0)));
        let vanishes = simplify(&at_origin).is_zero();

        let v_samples = sample_off_origin(&self.v, &grid);
        let vdot_samples = sample_off_origin(&self.vdot, &grid);

        let non_finite_v = v_samples.iter().filter(|x| !x.is_finite()).count();
        let positive = non_finite_v == 0 && v_samples.iter().all(|x| *x > 0.0);

        let non_finite_vdot = vdot_samples.iter().filter(|x| !x.is_finite()).count();
        let increases = vdot_samples.iter().any(|x| *x > VDOT_TOLERANCE);
        let non_increasing = non_finite_vdot == 0 && !increases;

        if non_finite_v > 0 || non_finite_vdot > 0 {
            tracing::warn!(non_finite_v, non_finite_vdot, "non-finite samples on the verifier grid");
        }

        let stability = if non_increasing {
            Stability::Stable
        } else {
            Stability::Inconclusive
        };
        let condition3_label = if non_increasing {
            "Vdot(x) <= 0 everywhere on grid"
        } else {
            "Vdot(x) > 0 somewhere"
        };

        let verdict = Verdict {
            conditions: [
                ConditionResult::new("V(0)=0", vanishes, 0),
                ConditionResult::new("V(x)>0 for x!=0", positive, non_finite_v),
                ConditionResult::new(condition3_label, non_increasing, non_finite_vdot),
            ],
            stability,
            vars: self.vars.clone(),
            v: self.v.clone(),
            vdot: self.vdot.clone(),
            stats: SampleStats {
                sampled: v_samples.len(),
                non_finite_v,
                non_finite_vdot,
            },
        };
        tracing::info!(
            passed = verdict.passed(),
            limit = spec.limit(),
            points = spec.points(),
            "verification finished"
        );
        verdict
    }
}

fn sample_off_origin(expr: &Expr, grid: &SampleGrid) -> Vec<f64> {
    let compiled = CompiledExpr::new(expr);
    let mut values = Vec::with_capacity(grid.points().len());
    compiled.eval_many(
        grid.points()
            .iter()
            .zip(grid.off_origin_mask())
            .filter(|(_, keep)| **keep)
            .map(|(point, _)| *point),
        &mut values,
    );
    values
}

/// Result of a verification run.
#[derive(Debug, Clone)]
pub struct Verdict {
    /// `V(0)=0`, positive definiteness, non-positive derivative; in that order.
    pub conditions: [ConditionResult; 3],
    pub stability: Stability,
    pub stats: SampleStats,
    vars: StateVars,
    v: Expr,
    vdot: Expr,
}

impl Verdict {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.conditions.iter().all(|c| c.passed)
    }

    #[must_use]
    pub fn v(&self) -> &Expr {
        &self.v
    }

    #[must_use]
    pub fn vdot(&self) -> &Expr {
        &self.vdot
    }

    #[must_use]
    pub fn vars(&self) -> &StateVars {
        &self.vars
    }

    #[must_use]
    pub fn vdot_text(&self) -> String {
        self.vdot.display(&self.vars).to_string()
    }

    #[must_use]
    pub fn conclusion(&self) -> &'static str {
        if self.passed() {
            "This function can be used as a Lyapunov function."
        } else {
            "This function cannot be used as a Lyapunov function, pick a new candidate."
        }
    }

    /// One-line form for the status bar.
    #[must_use]
    pub fn summary(&self) -> String {
        let marks: Vec<String> = self
            .conditions
            .iter()
            .enumerate()
            .map(|(i, c)| format!("C{} {}", i + 1, c.status()))
            .collect();
        format!(
            "{} | {}",
            marks.join("  "),
            if self.passed() { "Lyapunov function" } else { "not a Lyapunov function" }
        )
    }

    /// Multi-line report, identical for identical inputs.
    #[must_use]
    pub fn report(&self) -> String {
        let line = |n: usize| {
            let c = &self.conditions[n - 1];
            if c.detail.is_empty() {
                format!("Condition {n}: {} ---> {}", c.label, c.status())
            } else {
                format!("Condition {n}: {} ({}) ---> {}", c.label, c.detail, c.status())
            }
        };
        [
            line(1),
            line(2),
            format!("Vdot(x) : {}", self.vdot_text()),
            line(3),
            format!("Stability: {}", self.stability.description()),
            String::new(),
            format!("Conclusion: {}", self.conclusion()),
        ]
        .join("\n")
    }
}

/// Verify `candidate` against `dynamics` in the default variables `x1`, `x2`.
pub fn verify(
    dynamics: (&str, &str),
    candidate: &str,
    domain_limit: f64,
    num_points: usize,
) -> Result<Verdict, VerifyError> {
    let problem = LyapunovProblem::parse(dynamics.0, dynamics.1, candidate, &StateVars::default())?;
    let spec = GridSpec::new(domain_limit, num_points)?;
    Ok(problem.verify(&spec))
}
