//! Precedence-aware printing with `**` for powers.

use std::fmt;

use lyapviz_types::StateVars;

use crate::expr::Expr;

/// Borrowed printer returned by [`Expr::display`].
pub struct ExprDisplay<'a> {
    expr: &'a Expr,
    vars: &'a StateVars,
}

impl Expr {
    #[must_use]
    pub fn display<'a>(&'a self, vars: &'a StateVars) -> ExprDisplay<'a> {
        ExprDisplay { expr: self, vars }
    }
}

impl fmt::Display for ExprDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_expr(f, self.expr, self.vars)
    }
}

fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Add(..) | Expr::Sub(..) => 1,
        Expr::Mul(..) | Expr::Div(..) | Expr::Neg(_) => 2,
        Expr::Num(n) if *n < 0.0 => 2,
        Expr::Pow(..) => 4,
        Expr::Num(_) | Expr::Var(_) | Expr::Call(..) => 5,
    }
}

fn write_child(f: &mut fmt::Formatter<'_>, expr: &Expr, vars: &StateVars, parens: bool) -> fmt::Result {
    if parens {
        f.write_str("(")?;
        write_expr(f, expr, vars)?;
        f.write_str(")")
    } else {
        write_expr(f, expr, vars)
    }
}

fn write_expr(f: &mut fmt::Formatter<'_>, expr: &Expr, vars: &StateVars) -> fmt::Result {
    match expr {
        Expr::Num(n) => f.write_str(&format_number(*n)),
        Expr::Var(v) => f.write_str(vars.name(*v)),
        Expr::Neg(a) => {
            f.write_str("-")?;
            write_child(f, a, vars, precedence(a) <= 1)
        }
        Expr::Add(a, b) => {
            write_expr(f, a, vars)?;
            f.write_str(" + ")?;
            write_expr(f, b, vars)
        }
        Expr::Sub(a, b) => {
            write_expr(f, a, vars)?;
            f.write_str(" - ")?;
            write_child(f, b, vars, precedence(b) <= 1)
        }
        Expr::Mul(a, b) => {
            write_child(f, a, vars, precedence(a) <= 1)?;
            f.write_str("*")?;
            write_child(f, b, vars, precedence(b) <= 2)
        }
        Expr::Div(a, b) => {
            write_child(f, a, vars, precedence(a) <= 1)?;
            f.write_str("/")?;
            write_child(f, b, vars, precedence(b) <= 2)
        }
        Expr::Pow(a, b) => {
            write_child(f, a, vars, precedence(a) <= 4)?;
            f.write_str("**")?;
            write_child(f, b, vars, precedence(b) < 4)
        }
        Expr::Call(func, a) => {
            f.write_str(func.name())?;
            f.write_str("(")?;
            write_expr(f, a, vars)?;
            f.write_str(")")
        }
    }
}

/// Integral values print without a fractional part.
pub(crate) fn format_number(n: f64) -> String {
    if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{n:.0}")
    } else {
        format!("{n}")
    }
}
