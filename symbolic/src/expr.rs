//! Expression tree and structural operations.

use std::ops::{Add, Div, Mul, Neg, Sub};

use lyapviz_types::VarId;

/// Elementary functions accepted by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Exp,
    Log,
    Sqrt,
    Abs,
    Sinh,
    Cosh,
    Tanh,
    Atan,
}

impl Func {
    pub const ALL: [Func; 11] = [
        Func::Sin,
        Func::Cos,
        Func::Tan,
        Func::Exp,
        Func::Log,
        Func::Sqrt,
        Func::Abs,
        Func::Sinh,
        Func::Cosh,
        Func::Tanh,
        Func::Atan,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Tan => "tan",
            Func::Exp => "exp",
            Func::Log => "log",
            Func::Sqrt => "sqrt",
            Func::Abs => "abs",
            Func::Sinh => "sinh",
            Func::Cosh => "cosh",
            Func::Tanh => "tanh",
            Func::Atan => "atan",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|func| func.name() == name)
    }

    #[must_use]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Func::Sin => x.sin(),
            Func::Cos => x.cos(),
            Func::Tan => x.tan(),
            Func::Exp => x.exp(),
            Func::Log => x.ln(),
            Func::Sqrt => x.sqrt(),
            Func::Abs => x.abs(),
            Func::Sinh => x.sinh(),
            Func::Cosh => x.cosh(),
            Func::Tanh => x.tanh(),
            Func::Atan => x.atan(),
        }
    }
}

/// A scalar expression in the two state variables.
///
/// The parser builds trees verbatim. The arithmetic operator impls fold
/// literal zeros and ones so derivative construction stays small; use
/// [`crate::simplify`] for a canonical form.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num(f64),
    Var(VarId),
    Neg(Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    Call(Func, Box<Expr>),
}

impl Expr {
    #[must_use]
    pub const fn num(value: f64) -> Self {
        Expr::Num(value)
    }

    #[must_use]
    pub const fn var(var: VarId) -> Self {
        Expr::Var(var)
    }

    #[must_use]
    pub fn call(func: Func, arg: Expr) -> Self {
        Expr::Call(func, Box::new(arg))
    }

    /// `self ** exponent`, folding trivial exponents.
    #[must_use]
    pub fn pow(self, exponent: Expr) -> Self {
        match (&self, &exponent) {
            (_, Expr::Num(e)) if *e == 1.0 => self,
            (_, Expr::Num(e)) if *e == 0.0 => Expr::Num(1.0),
            (Expr::Num(b), Expr::Num(e)) if b.powf(*e).is_finite() => Expr::Num(b.powf(*e)),
            _ => Expr::Pow(Box::new(self), Box::new(exponent)),
        }
    }

    #[must_use]
    pub fn powi(self, exponent: i32) -> Self {
        self.pow(Expr::Num(f64::from(exponent)))
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Num(n) if *n == 0.0)
    }

    /// Whether `var` occurs anywhere in the tree.
    #[must_use]
    pub fn depends_on(&self, var: VarId) -> bool {
        match self {
            Expr::Num(_) => false,
            Expr::Var(v) => *v == var,
            Expr::Neg(a) | Expr::Call(_, a) => a.depends_on(var),
            Expr::Add(a, b)
            | Expr::Sub(a, b)
            | Expr::Mul(a, b)
            | Expr::Div(a, b)
            | Expr::Pow(a, b) => a.depends_on(var) || b.depends_on(var),
        }
    }

    /// Replace every occurrence of `var` with `replacement`.
    #[must_use]
    pub fn substitute(&self, var: VarId, replacement: &Expr) -> Expr {
        let sub = |e: &Expr| Box::new(e.substitute(var, replacement));
        match self {
            Expr::Num(_) => self.clone(),
            Expr::Var(v) if *v == var => replacement.clone(),
            Expr::Var(_) => self.clone(),
            Expr::Neg(a) => Expr::Neg(sub(a)),
            Expr::Add(a, b) => Expr::Add(sub(a), sub(b)),
            Expr::Sub(a, b) => Expr::Sub(sub(a), sub(b)),
            Expr::Mul(a, b) => Expr::Mul(sub(a), sub(b)),
            Expr::Div(a, b) => Expr::Div(sub(a), sub(b)),
            Expr::Pow(a, b) => Expr::Pow(sub(a), sub(b)),
            Expr::Call(f, a) => Expr::Call(*f, sub(a)),
        }
    }

    /// Tree-walking evaluation at `point = [x1, x2]`.
    ///
    /// For repeated evaluation over a grid prefer [`crate::CompiledExpr`].
    #[must_use]
    pub fn eval(&self, point: [f64; 2]) -> f64 {
        match self {
            Expr::Num(n) => *n,
            Expr::Var(v) => point[v.index()],
            Expr::Neg(a) => -a.eval(point),
            Expr::Add(a, b) => a.eval(point) + b.eval(point),
            Expr::Sub(a, b) => a.eval(point) - b.eval(point),
            Expr::Mul(a, b) => a.eval(point) * b.eval(point),
            Expr::Div(a, b) => a.eval(point) / b.eval(point),
            Expr::Pow(a, b) => pow_f64(a.eval(point), b.eval(point)),
            Expr::Call(f, a) => f.apply(a.eval(point)),
        }
    }
}

/// Integer exponents use repeated multiplication so negative bases stay real.
pub(crate) fn pow_f64(base: f64, exponent: f64) -> f64 {
    if exponent.fract() == 0.0 && exponent.abs() <= f64::from(i32::MAX) {
        base.powi(exponent as i32)
    } else {
        base.powf(exponent)
    }
}

impl Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Expr {
        match (&self, &rhs) {
            (Expr::Num(a), Expr::Num(b)) => Expr::Num(a + b),
            (Expr::Num(a), _) if *a == 0.0 => rhs,
            (_, Expr::Num(b)) if *b == 0.0 => self,
            _ => Expr::Add(Box::new(self), Box::new(rhs)),
        }
    }
}

impl Sub for Expr {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Expr {
        match (&self, &rhs) {
            (Expr::Num(a), Expr::Num(b)) => Expr::Num(a - b),
            (Expr::Num(a), _) if *a == 0.0 => -rhs,
            (_, Expr::Num(b)) if *b == 0.0 => self,
            _ => Expr::Sub(Box::new(self), Box::new(rhs)),
        }
    }
}

impl Mul for Expr {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        match (&self, &rhs) {
            (Expr::Num(a), Expr::Num(b)) => Expr::Num(a * b),
            (Expr::Num(a), _) if *a == 0.0 => Expr::Num(0.0),
            (_, Expr::Num(b)) if *b == 0.0 => Expr::Num(0.0),
            (Expr::Num(a), _) if *a == 1.0 => rhs,
            (_, Expr::Num(b)) if *b == 1.0 => self,
            _ => Expr::Mul(Box::new(self), Box::new(rhs)),
        }
    }
}

impl Div for Expr {
    type Output = Expr;

    fn div(self, rhs: Expr) -> Expr {
        match (&self, &rhs) {
            (Expr::Num(a), Expr::Num(b)) if *b != 0.0 => Expr::Num(a / b),
            (_, Expr::Num(b)) if *b == 1.0 => self,
            _ => Expr::Div(Box::new(self), Box::new(rhs)),
        }
    }
}

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        match self {
            Expr::Num(n) => Expr::Num(-n),
            Expr::Neg(inner) => *inner,
            other => Expr::Neg(Box::new(other)),
        }
    }
}
