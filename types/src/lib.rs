//! Core domain types for lyapviz.
//!
//! This crate contains pure domain types with no IO and minimal dependencies.
//! Everything here can be used from any layer of the application.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

pub mod ui;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// State Variables
// ============================================================================

/// Index of a state variable inside a two-dimensional system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(u8);

impl VarId {
    pub const FIRST: VarId = VarId(0);
    pub const SECOND: VarId = VarId(1);
    pub const ALL: [VarId; 2] = [VarId::FIRST, VarId::SECOND];

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateVarsError {
    #[error("state variable name '{0}' is not a valid identifier")]
    InvalidName(String),
    #[error("state variables must be distinct (both are named '{0}')")]
    Duplicate(String),
    #[error("expected exactly 2 state variables, got {0}")]
    WrongCount(usize),
}

/// The two state-variable identifiers of a planar system.
///
/// Expressions refer to variables by [`VarId`]; names only matter when
/// parsing and printing, so every parser/printer call receives a `StateVars`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct StateVars {
    names: [String; 2],
}

impl StateVars {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Result<Self, StateVarsError> {
        let first = first.into();
        let second = second.into();
        for name in [&first, &second] {
            if !is_identifier(name) {
                return Err(StateVarsError::InvalidName(name.clone()));
            }
        }
        if first == second {
            return Err(StateVarsError::Duplicate(first));
        }
        Ok(Self {
            names: [first, second],
        })
    }

    #[must_use]
    pub fn name(&self, var: VarId) -> &str {
        &self.names[var.index()]
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<VarId> {
        VarId::ALL.into_iter().find(|var| self.name(*var) == name)
    }

    #[must_use]
    pub fn names(&self) -> [&str; 2] {
        [self.names[0].as_str(), self.names[1].as_str()]
    }
}

impl Default for StateVars {
    fn default() -> Self {
        Self {
            names: ["x1".to_string(), "x2".to_string()],
        }
    }
}

impl fmt::Display for StateVars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.names[0], self.names[1])
    }
}

impl TryFrom<Vec<String>> for StateVars {
    type Error = StateVarsError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        let [first, second]: [String; 2] = value
            .try_into()
            .map_err(|rest: Vec<String>| StateVarsError::WrongCount(rest.len()))?;
        Self::new(first, second)
    }
}

impl From<StateVars> for Vec<String> {
    fn from(value: StateVars) -> Self {
        value.names.into()
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::{StateVars, StateVarsError, VarId};

    #[test]
    fn default_names_are_x1_x2() {
        let vars = StateVars::default();
        assert_eq!(vars.names(), ["x1", "x2"]);
        assert_eq!(vars.lookup("x2"), Some(VarId::SECOND));
        assert_eq!(vars.lookup("y"), None);
    }

    #[test]
    fn rejects_duplicate_names() {
        assert_eq!(
            StateVars::new("q", "q"),
            Err(StateVarsError::Duplicate("q".to_string()))
        );
    }

    #[test]
    fn rejects_non_identifiers() {
        assert!(matches!(
            StateVars::new("1x", "y"),
            Err(StateVarsError::InvalidName(name)) if name == "1x"
        ));
        assert!(StateVars::new("", "y").is_err());
        assert!(StateVars::new("theta", "omega_2").is_ok());
    }

    #[test]
    fn deserializes_from_list() {
        #[derive(serde::Deserialize)]
        struct Wrapper {
            variables: StateVars,
        }
        let parsed: Wrapper = toml::from_str(r#"variables = ["p", "q"]"#).unwrap();
        assert_eq!(parsed.variables.names(), ["p", "q"]);

        let err = toml::from_str::<Wrapper>(r#"variables = ["p"]"#);
        assert!(err.is_err());
    }
}
