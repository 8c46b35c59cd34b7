//! Grid evaluation backed by `exmex`.
//!
//! The tree is rendered once into fully parenthesized `exmex` syntax and
//! parsed into a flat expression, so sampling a grid never re-walks the boxed
//! tree. Variables are renamed to positional slots (`s0`, `s1`) so user names
//! cannot collide with `exmex` constants such as `E` or `PI`.

use std::fmt::Write as _;

use exmex::{Express, FlatEx};
use lyapviz_types::VarId;

use crate::expr::{Expr, Func};

enum Backend {
    Flat {
        flat: FlatEx<f64>,
        /// State variable for each `exmex` argument, in argument order.
        slots: Vec<VarId>,
    },
    Tree(Expr),
}

/// An expression prepared for repeated evaluation.
pub struct CompiledExpr {
    backend: Backend,
}

impl CompiledExpr {
    /// Lower `expr` into an `exmex` flat expression.
    ///
    /// If `exmex` rejects the rendered text the tree walker is used instead
    /// and a warning is logged.
    #[must_use]
    pub fn new(expr: &Expr) -> Self {
        let text = exmex_text(expr);
        let backend = match exmex::parse::<f64>(&text) {
            Ok(flat) => {
                let slots = flat
                    .var_names()
                    .iter()
                    .map(|name| slot_var(name))
                    .collect::<Option<Vec<_>>>();
                match slots {
                    Some(slots) => Backend::Flat { flat, slots },
                    None => {
                        tracing::warn!(%text, "unexpected variable in compiled expression");
                        Backend::Tree(expr.clone())
                    }
                }
            }
            Err(err) => {
                tracing::warn!(%err, %text, "exmex rejected expression; using tree evaluation");
                Backend::Tree(expr.clone())
            }
        };
        Self { backend }
    }

    /// Whether evaluation goes through the flat `exmex` form.
    #[must_use]
    pub fn is_flat(&self) -> bool {
        matches!(self.backend, Backend::Flat { .. })
    }

    #[must_use]
    pub fn eval(&self, point: [f64; 2]) -> f64 {
        let mut args = Vec::new();
        self.run(point, &mut args)
    }

    /// Evaluate every point, reusing one argument buffer. `out` is cleared first.
    pub fn eval_many(&self, points: impl IntoIterator<Item = [f64; 2]>, out: &mut Vec<f64>) {
        out.clear();
        let mut args = Vec::new();
        out.extend(points.into_iter().map(|point| self.run(point, &mut args)));
    }

    fn run(&self, point: [f64; 2], args: &mut Vec<f64>) -> f64 {
        match &self.backend {
            Backend::Flat { flat, slots } => {
                args.clear();
                args.extend(slots.iter().map(|var| point[var.index()]));
                flat.eval(args.as_slice()).unwrap_or(f64::NAN)
            }
            Backend::Tree(expr) => expr.eval(point),
        }
    }
}

impl std::fmt::Debug for CompiledExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.backend {
            Backend::Flat { flat, .. } => f
                .debug_struct("CompiledExpr")
                .field("flat", &flat.unparse())
                .finish(),
            Backend::Tree(expr) => f.debug_struct("CompiledExpr").field("tree", expr).finish(),
        }
    }
}

fn slot_name(var: VarId) -> String {
    format!("s{}", var.index())
}

fn slot_var(name: &str) -> Option<VarId> {
    VarId::ALL.into_iter().find(|var| slot_name(*var) == name)
}

/// `exmex` spells the natural log `ln`; every other name matches.
fn exmex_func(func: Func) -> &'static str {
    match func {
        Func::Log => "ln",
        other => other.name(),
    }
}

/// Fully parenthesized `exmex` source for `expr`.
pub(crate) fn exmex_text(expr: &Expr) -> String {
    let mut out = String::new();
    write_exmex(expr, &mut out);
    out
}

fn write_exmex(expr: &Expr, out: &mut String) {
    let binary = |a: &Expr, op: &str, b: &Expr, out: &mut String| {
        out.push('(');
        write_exmex(a, out);
        out.push_str(op);
        write_exmex(b, out);
        out.push(')');
    };
    match expr {
        Expr::Num(n) => write_number(*n, out),
        Expr::Var(var) => out.push_str(&slot_name(*var)),
        Expr::Neg(a) => {
            out.push_str("(-");
            write_exmex(a, out);
            out.push(')');
        }
        Expr::Add(a, b) => binary(a, "+", b, out),
        Expr::Sub(a, b) => binary(a, "-", b, out),
        Expr::Mul(a, b) => binary(a, "*", b, out),
        Expr::Div(a, b) => binary(a, "/", b, out),
        Expr::Pow(a, b) => binary(a, "^", b, out),
        Expr::Call(func, a) => {
            out.push_str(exmex_func(*func));
            out.push('(');
            write_exmex(a, out);
            out.push(')');
        }
    }
}

/// Plain decimal digits only; `f64`'s `Display` never uses exponent notation.
fn write_number(n: f64, out: &mut String) {
    if n.is_nan() {
        out.push_str("(0/0)");
    } else if n.is_infinite() {
        out.push_str(if n > 0.0 { "(1/0)" } else { "(-1/0)" });
    } else if n.is_sign_negative() {
        let _ = write!(out, "(-{})", -n);
    } else {
        let _ = write!(out, "{n}");
    }
}

#[cfg(test)]
mod tests {
    use super::{CompiledExpr, exmex_text};
    use crate::expr::Expr;
    use crate::parser::parse;
    use lyapviz_types::{StateVars, VarId};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-12 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn compiled_matches_tree_walk() {
        let vars = StateVars::default();
        let expr = parse("-2*x1**4 - 2*x2**2 + sin(x1*x2)/(1 + x1**2) + log(2 + x2**2)", &vars)
            .unwrap();
        let compiled = CompiledExpr::new(&expr);
        assert!(compiled.is_flat());
        for point in [[0.0, 0.0], [1.5, -2.0], [-3.0, 3.0]] {
            assert!(close(compiled.eval(point), expr.eval(point)), "{point:?}");
        }
    }

    #[test]
    fn negation_binds_below_powers() {
        let vars = StateVars::default();
        let expr = parse("-x1**2", &vars).unwrap();
        let compiled = CompiledExpr::new(&expr);
        assert_eq!(compiled.eval([3.0, 0.0]), -9.0);
        assert_eq!(CompiledExpr::new(&parse("(-x1)**3", &vars).unwrap()).eval([2.0, 0.0]), -8.0);
    }

    #[test]
    fn variable_names_never_reach_exmex() {
        let vars = StateVars::new("E", "PI").unwrap();
        let expr = parse("E*PI - E", &vars).unwrap();
        assert_eq!(exmex_text(&expr), "((s0*s1)-s0)");
        let compiled = CompiledExpr::new(&expr);
        assert_eq!(compiled.eval([2.0, 5.0]), 8.0);
    }

    #[test]
    fn only_referenced_variables_are_passed() {
        let compiled = CompiledExpr::new(&(Expr::var(VarId::SECOND) * Expr::num(3.0)));
        assert_eq!(compiled.eval([100.0, 2.0]), 6.0);
        let constant = CompiledExpr::new(&Expr::num(-0.25));
        assert_eq!(constant.eval([1.0, 1.0]), -0.25);
    }

    #[test]
    fn small_literals_keep_their_value() {
        let compiled = CompiledExpr::new(&(Expr::num(5e-10) / Expr::var(VarId::FIRST)));
        assert!(close(compiled.eval([0.5, 0.0]), 1e-9));
    }

    #[test]
    fn eval_many_reuses_output_buffer() {
        let vars = StateVars::default();
        let compiled = CompiledExpr::new(&parse("x1 - x2", &vars).unwrap());
        let mut out = vec![99.0; 10];
        compiled.eval_many([[1.0, 2.0], [5.0, 1.0]], &mut out);
        assert_eq!(out, vec![-1.0, 4.0]);
    }

    #[test]
    fn division_by_zero_is_not_finite() {
        let vars = StateVars::default();
        let compiled = CompiledExpr::new(&parse("1/x1", &vars).unwrap());
        assert!(!compiled.eval([0.0, 1.0]).is_finite());
        assert!(compiled.eval([-1.0, 1.0]) < 0.0);
    }
}
