//! Symbolic differentiation.

use lyapviz_types::VarId;

use crate::expr::{Expr, Func};

impl Expr {
    /// Partial derivative with respect to `var`.
    ///
    /// The result is built with folding operators but is not simplified.
    #[must_use]
    pub fn diff(&self, var: VarId) -> Expr {
        match self {
            Expr::Num(_) => Expr::num(0.0),
            Expr::Var(v) => Expr::num(if *v == var { 1.0 } else { 0.0 }),
            Expr::Neg(a) => -a.diff(var),
            Expr::Add(a, b) => a.diff(var) + b.diff(var),
            Expr::Sub(a, b) => a.diff(var) - b.diff(var),
            Expr::Mul(a, b) => a.diff(var) * (**b).clone() + (**a).clone() * b.diff(var),
            Expr::Div(a, b) => {
                let numerator = a.diff(var) * (**b).clone() - (**a).clone() * b.diff(var);
                numerator / (**b).clone().powi(2)
            }
            Expr::Pow(base, exponent) => diff_pow(base, exponent, var),
            Expr::Call(func, arg) => diff_call(*func, arg) * arg.diff(var),
        }
    }
}

fn diff_pow(base: &Expr, exponent: &Expr, var: VarId) -> Expr {
    let base_depends = base.depends_on(var);
    let exponent_depends = exponent.depends_on(var);
    match (base_depends, exponent_depends) {
        (false, false) => Expr::num(0.0),
        // d(u^c) = c * u^(c-1) * u'
        (true, false) => {
            let lowered = exponent.clone() - Expr::num(1.0);
            exponent.clone() * base.clone().pow(lowered) * base.diff(var)
        }
        // d(c^v) = c^v * ln(c) * v'
        (false, true) => {
            base.clone().pow(exponent.clone())
                * Expr::call(Func::Log, base.clone())
                * exponent.diff(var)
        }
        // d(u^v) = u^v * (v' ln u + v u'/u)
        (true, true) => {
            let log_term = exponent.diff(var) * Expr::call(Func::Log, base.clone());
            let ratio_term = exponent.clone() * base.diff(var) / base.clone();
            base.clone().pow(exponent.clone()) * (log_term + ratio_term)
        }
    }
}

/// Outer derivative f'(u) of `func` evaluated at `arg`.
fn diff_call(func: Func, arg: &Expr) -> Expr {
    let u = || arg.clone();
    match func {
        Func::Sin => Expr::call(Func::Cos, u()),
        Func::Cos => -Expr::call(Func::Sin, u()),
        Func::Tan => Expr::num(1.0) + Expr::call(Func::Tan, u()).powi(2),
        Func::Exp => Expr::call(Func::Exp, u()),
        Func::Log => Expr::num(1.0) / u(),
        Func::Sqrt => Expr::num(1.0) / (Expr::num(2.0) * Expr::call(Func::Sqrt, u())),
        Func::Abs => u() / Expr::call(Func::Abs, u()),
        Func::Sinh => Expr::call(Func::Cosh, u()),
        Func::Cosh => Expr::call(Func::Sinh, u()),
        Func::Tanh => Expr::num(1.0) - Expr::call(Func::Tanh, u()).powi(2),
        Func::Atan => Expr::num(1.0) / (Expr::num(1.0) + u().powi(2)),
    }
}
