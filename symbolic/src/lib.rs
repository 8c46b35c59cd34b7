//! Symbolic expressions in two state variables.
//!
//! # Pipeline
//!
//! ```text
//! text --parse--> Expr --diff/substitute--> Expr --simplify--> Expr --compile--> CompiledExpr
//!                   \                                            |
//!                    `--------------- display(&StateVars) <------'
//! ```
//!
//! Expressions reference variables by [`VarId`]; the [`StateVars`] passed to
//! [`parse`] and [`Expr::display`] decide the names. Grid sampling goes
//! through `exmex`; see [`CompiledExpr`].

mod compile;
mod diff;
mod display;
mod expr;
mod lexer;
mod parser;
mod simplify;

pub use compile::CompiledExpr;
pub use display::ExprDisplay;
pub use expr::{Expr, Func};
pub use parser::{MAX_NESTING, ParseError, parse};
pub use simplify::simplify;

pub use lyapviz_types::{StateVars, VarId};
