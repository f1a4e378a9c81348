//! # Calculator Values
//!
//! Semantic values carried on the parse stack ([`CalcValue`]) and the
//! context shared by the calculator's lexer and parser actions
//! ([`CalcContext`]).

use crate::CalcError;
use lalrex::{ErrorKind, Location};

/// Value stack entry.
///
/// Terminals enter the stack as [`CalcValue::Text`]; reductions turn them
/// into numbers and finally into the list of line results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CalcValue {
    #[default]
    None,
    Text(String),
    Number(i64),
    /// One entry per line; `None` for lines that were skipped after a syntax
    /// error.
    Lines(Vec<Option<i64>>),
}

impl CalcValue {
    fn kind(&self) -> String {
        match self {
            CalcValue::None => "nothing".into(),
            CalcValue::Text(s) => format!("text {s:?}"),
            CalcValue::Number(n) => format!("number {n}"),
            CalcValue::Lines(v) => format!("{} lines", v.len()),
        }
    }

    pub fn number(&self) -> Result<i64, CalcError> {
        match self {
            CalcValue::Number(n) => Ok(*n),
            CalcValue::Text(s) => Ok(s.parse()?),
            other => Err(CalcError::Value {
                expected: "number",
                found: other.kind(),
            }),
        }
    }

    pub fn into_lines(self) -> Result<Vec<Option<i64>>, CalcError> {
        match self {
            CalcValue::Lines(v) => Ok(v),
            other => Err(CalcError::Value {
                expected: "lines",
                found: other.kind(),
            }),
        }
    }
}

/// A reported lexical or syntax error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub message: String,
    pub loc: Location,
    pub recoverable: bool,
}

/// State shared by the lexer and parser actions during one parse.
#[derive(Debug, Clone, Default)]
pub struct CalcContext {
    pub diagnostics: Vec<Diagnostic>,
    /// Number of block comments seen.
    pub comments: usize,
    /// Text skipped by each `error ';'` line.
    pub skipped: Vec<String>,
}

impl CalcContext {
    pub fn new() -> Self {
        Self::default()
    }
}
