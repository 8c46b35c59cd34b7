//! Recursive-descent parser.
//!
//! ```text
//! expr  := term (('+' | '-') term)*
//! term  := unary (('*' | '/') unary)*
//! unary := ('+' | '-') unary | power
//! power := atom ('**' unary)?
//! atom  := number | var | const | func '(' expr ')' | '(' expr ')'
//! ```
//!
//! Power binds tighter than unary minus, so `-x1**3` is `-(x1**3)`.
//! Nesting is capped at [`MAX_NESTING`] levels of `unary`.

use std::f64::consts;

use thiserror::Error;

use lyapviz_types::StateVars;

use crate::expr::{Expr, Func};
use crate::lexer::{Token, TokenKind, tokenize};

/// Deepest chain of parentheses, calls, signs and exponents accepted.
pub const MAX_NESTING: usize = 256;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("expression is empty")]
    Empty,
    #[error("unexpected character '{ch}' at position {offset} in '{input}'")]
    UnexpectedChar {
        input: String,
        ch: char,
        offset: usize,
    },
    #[error("unexpected {found} at position {offset} in '{input}'")]
    UnexpectedToken {
        input: String,
        found: String,
        offset: usize,
    },
    #[error("unexpected end of expression '{input}'")]
    UnexpectedEnd { input: String },
    #[error("unknown variable '{name}' at position {offset} in '{input}' (expected one of: {expected})")]
    UnknownVariable {
        input: String,
        name: String,
        offset: usize,
        expected: String,
    },
    #[error("unknown function '{name}' at position {offset} in '{input}'")]
    UnknownFunction {
        input: String,
        name: String,
        offset: usize,
    },
    #[error("invalid number '{literal}' at position {offset} in '{input}'")]
    InvalidNumber {
        input: String,
        literal: String,
        offset: usize,
    },
    #[error("expression nests deeper than {limit} levels at position {offset} in '{input}'")]
    TooDeep {
        input: String,
        offset: usize,
        limit: usize,
    },
}

impl ParseError {
    /// The expression text that failed to parse.
    #[must_use]
    pub fn input(&self) -> Option<&str> {
        match self {
            ParseError::Empty => None,
            ParseError::UnexpectedChar { input, .. }
            | ParseError::UnexpectedToken { input, .. }
            | ParseError::UnexpectedEnd { input }
            | ParseError::UnknownVariable { input, .. }
            | ParseError::UnknownFunction { input, .. }
            | ParseError::InvalidNumber { input, .. }
            | ParseError::TooDeep { input, .. } => Some(input),
        }
    }
}

/// Parse `input` as an expression over `vars`.
pub fn parse(input: &str, vars: &StateVars) -> Result<Expr, ParseError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ParseError::Empty);
    }
    let mut parser = Parser {
        input,
        tokens,
        pos: 0,
        depth: 0,
        vars,
    };
    let expr = parser.expr()?;
    if let Some(token) = parser.peek() {
        return Err(parser.unexpected(token));
    }
    Ok(expr)
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    vars: &'a StateVars,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|token| &token.kind)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn unexpected(&self, token: &Token) -> ParseError {
        ParseError::UnexpectedToken {
            input: self.input.to_string(),
            found: token.kind.describe(),
            offset: token.offset,
        }
    }

    fn end(&self) -> ParseError {
        ParseError::UnexpectedEnd {
            input: self.input.to_string(),
        }
    }

    fn expect_rparen(&mut self) -> Result<(), ParseError> {
        match self.advance() {
            Some(Token {
                kind: TokenKind::RParen,
                ..
            }) => Ok(()),
            Some(token) => Err(self.unexpected(&token)),
            None => Err(self.end()),
        }
    }

    fn expr(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.term()?;
        loop {
            match self.peek_kind() {
                Some(TokenKind::Plus) => {
                    self.pos += 1;
                    lhs = Expr::Add(Box::new(lhs), Box::new(self.term()?));
                }
                Some(TokenKind::Minus) => {
                    self.pos += 1;
                    lhs = Expr::Sub(Box::new(lhs), Box::new(self.term()?));
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.unary()?;
        loop {
            match self.peek_kind() {
                Some(TokenKind::Star) => {
                    self.pos += 1;
                    lhs = Expr::Mul(Box::new(lhs), Box::new(self.unary()?));
                }
                Some(TokenKind::Slash) => {
                    self.pos += 1;
                    lhs = Expr::Div(Box::new(lhs), Box::new(self.unary()?));
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::TooDeep {
                input: self.input.to_string(),
                offset: self.peek().map_or(self.input.len(), |token| token.offset),
                limit: MAX_NESTING,
            });
        }
        self.depth += 1;
        let result = self.signed();
        self.depth -= 1;
        result
    }

    fn signed(&mut self) -> Result<Expr, ParseError> {
        match self.peek_kind() {
            Some(TokenKind::Minus) => {
                self.pos += 1;
                Ok(Expr::Neg(Box::new(self.unary()?)))
            }
            Some(TokenKind::Plus) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Expr, ParseError> {
        let base = self.atom()?;
        if matches!(self.peek_kind(), Some(TokenKind::Power)) {
            self.pos += 1;
            let exponent = self.unary()?;
            return Ok(Expr::Pow(Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Expr, ParseError> {
        let Some(token) = self.advance() else {
            return Err(self.end());
        };
        match token.kind {
            TokenKind::Number(value) => Ok(Expr::Num(value)),
            TokenKind::LParen => {
                let inner = self.expr()?;
                self.expect_rparen()?;
                Ok(inner)
            }
            TokenKind::Ident(ref name) => {
                if matches!(self.peek_kind(), Some(TokenKind::LParen)) {
                    let Some(func) = Func::from_name(name) else {
                        return Err(ParseError::UnknownFunction {
                            input: self.input.to_string(),
                            name: name.clone(),
                            offset: token.offset,
                        });
                    };
                    self.pos += 1;
                    let arg = self.expr()?;
                    self.expect_rparen()?;
                    return Ok(Expr::call(func, arg));
                }
                if let Some(var) = self.vars.lookup(name) {
                    return Ok(Expr::Var(var));
                }
                match name.as_str() {
                    "pi" => Ok(Expr::Num(consts::PI)),
                    "E" => Ok(Expr::Num(consts::E)),
                    _ => Err(ParseError::UnknownVariable {
                        input: self.input.to_string(),
                        name: name.clone(),
                        offset: token.offset,
                        expected: self.vars.to_string(),
                    }),
                }
            }
            _ => Err(self.unexpected(&token)),
        }
    }
}
