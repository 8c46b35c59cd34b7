//! Canonical sum-of-monomials form.
//!
//! An expression is expanded into a map from monomials to coefficients.
//! A monomial is a product of atoms raised to integer powers, where an atom is
//! either a state variable or an opaque subexpression that cannot be expanded
//! further (a function call, a non-integer power, or the reciprocal of a sum).
//! Converting back yields a deterministic tree ordered by descending degree,
//! so `2*x1*(-x1**3) + 2*x2*(-x2)` becomes `-2*x1**4 - 2*x2**2`.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use lyapviz_types::VarId;

use crate::expr::{Expr, Func, pow_f64};

/// Integer powers of sums above this are kept unexpanded.
const MAX_EXPAND_POWER: i32 = 8;

/// Largest integral exponent folded into a monomial.
const MAX_MONOMIAL_EXPONENT: f64 = 64.0;

/// Largest exponent magnitude a monomial factor may reach through products
/// and powers. Past it the subexpression becomes an opaque atom.
const MAX_COMBINED_EXPONENT: i32 = 1 << 20;

/// Simplify `expr` into canonical expanded form.
#[must_use]
pub fn simplify(expr: &Expr) -> Expr {
    Poly::from_expr(expr).to_expr()
}

#[derive(Debug, Clone)]
enum Atom {
    Var(VarId),
    /// `key` is the Debug rendering of `expr`, used for identity and ordering.
    Opaque { key: String, expr: Expr },
}

impl Atom {
    fn opaque(expr: Expr) -> Self {
        Atom::Opaque {
            key: format!("{expr:?}"),
            expr,
        }
    }

    fn to_expr(&self) -> Expr {
        match self {
            Atom::Var(var) => Expr::Var(*var),
            Atom::Opaque { expr, .. } => expr.clone(),
        }
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Atom {}

impl PartialOrd for Atom {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Atom {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Atom::Var(a), Atom::Var(b)) => a.cmp(b),
            (Atom::Var(_), Atom::Opaque { .. }) => Ordering::Less,
            (Atom::Opaque { .. }, Atom::Var(_)) => Ordering::Greater,
            (Atom::Opaque { key: a, .. }, Atom::Opaque { key: b, .. }) => a.cmp(b),
        }
    }
}

/// Atom -> exponent, never containing a zero exponent.
type Monomial = BTreeMap<Atom, i32>;

#[derive(Debug, Clone, Default)]
struct Poly {
    /// Never contains a zero coefficient.
    terms: BTreeMap<Monomial, f64>,
}

impl Poly {
    fn constant(value: f64) -> Self {
        let mut poly = Poly::default();
        if value != 0.0 {
            poly.terms.insert(Monomial::new(), value);
        }
        poly
    }

    fn atom(atom: Atom, exponent: i32) -> Self {
        let mut monomial = Monomial::new();
        monomial.insert(atom, exponent);
        let mut poly = Poly::default();
        poly.terms.insert(monomial, 1.0);
        poly
    }

    fn opaque(expr: Expr) -> Self {
        Self::atom(Atom::opaque(expr), 1)
    }

    fn as_constant(&self) -> Option<f64> {
        match self.terms.len() {
            0 => Some(0.0),
            1 => self
                .terms
                .iter()
                .next()
                .filter(|(monomial, _)| monomial.is_empty())
                .map(|(_, coeff)| *coeff),
            _ => None,
        }
    }

    fn single_term(&self) -> Option<(&Monomial, f64)> {
        if self.terms.len() == 1 {
            self.terms.iter().next().map(|(m, c)| (m, *c))
        } else {
            None
        }
    }

    fn add_term(&mut self, monomial: Monomial, coeff: f64) {
        let entry = self.terms.entry(monomial).or_insert(0.0);
        *entry += coeff;
        if *entry == 0.0 {
            self.terms.retain(|_, c| *c != 0.0);
        }
    }

    fn add(mut self, other: Poly) -> Poly {
        for (monomial, coeff) in other.terms {
            self.add_term(monomial, coeff);
        }
        self
    }

    fn scale(mut self, factor: f64) -> Poly {
        if factor == 0.0 {
            return Poly::default();
        }
        for coeff in self.terms.values_mut() {
            *coeff *= factor;
        }
        self.terms.retain(|_, c| *c != 0.0);
        self
    }

    fn mul(&self, other: &Poly) -> Poly {
        let mut out = Poly::default();
        for (ma, ca) in &self.terms {
            for (mb, cb) in &other.terms {
                let Some(monomial) = merge_monomials(ma, mb) else {
                    tracing::debug!("exponent out of range, keeping product unexpanded");
                    return Poly::opaque(Expr::Mul(
                        Box::new(self.to_expr()),
                        Box::new(other.to_expr()),
                    ));
                };
                out.add_term(monomial, ca * cb);
            }
        }
        out
    }

    fn powi(self, exponent: i32) -> Poly {
        if exponent == 0 {
            return Poly::constant(1.0);
        }
        if let Some(c) = self.as_constant() {
            if c == 0.0 && exponent < 0 {
                return Poly::atom(Atom::opaque(Expr::Num(0.0)), exponent);
            }
            return Poly::constant(c.powi(exponent));
        }
        if let Some((monomial, coeff)) = self.single_term() {
            let raised: Option<Monomial> = monomial
                .iter()
                .map(|(atom, e)| {
                    e.checked_mul(exponent)
                        .filter(|e| e.abs() <= MAX_COMBINED_EXPONENT)
                        .map(|e| (atom.clone(), e))
                })
                .collect();
            let Some(raised) = raised else {
                tracing::debug!(exponent, "exponent out of range, keeping power unexpanded");
                return Poly::opaque(Expr::Pow(
                    Box::new(self.to_expr()),
                    Box::new(Expr::Num(f64::from(exponent))),
                ));
            };
            let mut out = Poly::default();
            out.terms.insert(raised, coeff.powi(exponent));
            return out;
        }
        if (1..=MAX_EXPAND_POWER).contains(&exponent) {
            let mut out = self.clone();
            for _ in 1..exponent {
                out = out.mul(&self);
            }
            return out;
        }
        tracing::debug!(exponent, terms = self.terms.len(), "keeping power of sum unexpanded");
        Poly::atom(Atom::opaque(self.to_expr()), exponent)
    }

    fn from_expr(expr: &Expr) -> Poly {
        match expr {
            Expr::Num(n) => Poly::constant(*n),
            Expr::Var(var) => Poly::atom(Atom::Var(*var), 1),
            Expr::Neg(a) => Poly::from_expr(a).scale(-1.0),
            Expr::Add(a, b) => Poly::from_expr(a).add(Poly::from_expr(b)),
            Expr::Sub(a, b) => Poly::from_expr(a).add(Poly::from_expr(b).scale(-1.0)),
            Expr::Mul(a, b) => Poly::from_expr(a).mul(&Poly::from_expr(b)),
            Expr::Div(a, b) => {
                let numerator = Poly::from_expr(a);
                let denominator = Poly::from_expr(b);
                numerator.mul(&denominator.powi(-1))
            }
            Expr::Pow(base, exponent) => from_pow(base, exponent),
            Expr::Call(func, arg) => from_call(*func, arg),
        }
    }

    fn to_expr(&self) -> Expr {
        let mut terms: Vec<(&Monomial, f64)> = self.terms.iter().map(|(m, c)| (m, *c)).collect();
        terms.sort_by(|a, b| term_order(a.0, b.0));

        let mut acc: Option<Expr> = None;
        for (monomial, coeff) in terms {
            let body = term_body(monomial, coeff.abs());
            let negative = coeff < 0.0;
            acc = Some(match acc {
                None if negative => Expr::Neg(Box::new(body)),
                None => body,
                Some(prev) if negative => Expr::Sub(Box::new(prev), Box::new(body)),
                Some(prev) => Expr::Add(Box::new(prev), Box::new(body)),
            });
        }
        acc.unwrap_or(Expr::Num(0.0))
    }
}

/// Product of two monomials, or `None` when an exponent leaves range.
fn merge_monomials(a: &Monomial, b: &Monomial) -> Option<Monomial> {
    let mut out = a.clone();
    for (atom, e) in b {
        let entry = out.entry(atom.clone()).or_insert(0);
        *entry = entry
            .checked_add(*e)
            .filter(|sum| sum.abs() <= MAX_COMBINED_EXPONENT)?;
    }
    out.retain(|_, e| *e != 0);
    Some(out)
}

fn from_pow(base: &Expr, exponent: &Expr) -> Poly {
    let base = Poly::from_expr(base);
    let exponent = Poly::from_expr(exponent);
    let Some(k) = exponent.as_constant() else {
        return Poly::opaque(Expr::Pow(
            Box::new(base.to_expr()),
            Box::new(exponent.to_expr()),
        ));
    };
    if k.fract() == 0.0 && k.abs() <= MAX_MONOMIAL_EXPONENT {
        return base.powi(k as i32);
    }
    if let Some(b) = base.as_constant() {
        let value = pow_f64(b, k);
        if value.is_finite() {
            return Poly::constant(value);
        }
    }
    Poly::opaque(Expr::Pow(Box::new(base.to_expr()), Box::new(Expr::Num(k))))
}

fn from_call(func: Func, arg: &Expr) -> Poly {
    let inner = Poly::from_expr(arg);
    if let Some(c) = inner.as_constant() {
        let value = func.apply(c);
        if value.is_finite() {
            return Poly::constant(value);
        }
    }
    Poly::opaque(Expr::call(func, inner.to_expr()))
}

fn degree(monomial: &Monomial) -> i64 {
    monomial.values().map(|e| i64::from(*e)).sum()
}

/// Descending total degree, then higher exponents on earlier atoms first.
fn term_order(a: &Monomial, b: &Monomial) -> Ordering {
    degree(b).cmp(&degree(a)).then_with(|| {
        let atoms: BTreeSet<&Atom> = a.keys().chain(b.keys()).collect();
        for atom in atoms {
            let ea = a.get(atom).copied().unwrap_or(0);
            let eb = b.get(atom).copied().unwrap_or(0);
            if ea != eb {
                return eb.cmp(&ea);
            }
        }
        Ordering::Equal
    })
}

fn factor_expr(atom: &Atom, exponent: i32) -> Expr {
    if exponent == 1 {
        atom.to_expr()
    } else {
        Expr::Pow(
            Box::new(atom.to_expr()),
            Box::new(Expr::Num(f64::from(exponent))),
        )
    }
}

fn product(factors: impl Iterator<Item = Expr>) -> Option<Expr> {
    factors.reduce(|acc, factor| Expr::Mul(Box::new(acc), Box::new(factor)))
}

/// Unsigned term `magnitude * numerator / denominator`.
fn term_body(monomial: &Monomial, magnitude: f64) -> Expr {
    let has_numerator = monomial.values().any(|e| *e > 0);
    let coefficient = (magnitude != 1.0 || !has_numerator).then_some(Expr::Num(magnitude));
    let numerator = product(
        coefficient.into_iter().chain(
            monomial
                .iter()
                .filter(|(_, e)| **e > 0)
                .map(|(atom, e)| factor_expr(atom, *e)),
        ),
    )
    .unwrap_or(Expr::Num(magnitude));
    let denominator = product(
        monomial
            .iter()
            .filter(|(_, e)| **e < 0)
            .map(|(atom, e)| factor_expr(atom, -e)),
    );
    match denominator {
        Some(denominator) => Expr::Div(Box::new(numerator), Box::new(denominator)),
        None => numerator,
    }
}
