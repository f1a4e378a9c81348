//! Error taxonomy shared by the lexer and the parser.
//!
//! - [`GrammarError`]: the static tables or lexer rules are unusable, or the
//!   engine API was misused (e.g. `reject()` without backtracking).
//! - [`LexError`]: a standalone lexer failed.
//! - [`ParseError`]: a parse failed. Lexical and syntax errors carry a full
//!   [`ErrorInfo`] snapshot; `Internal` signals a malformed table; `Action`
//!   wraps a failing semantic action.

use crate::location::Location;
use crate::table::{ProdID, RuleID, StateID, SymbolID};
use std::fmt;
use thiserror::Error;

/// Boxed error produced by a driver's semantic action.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("symbol {0:?} is registered twice")]
    DuplicateSymbol(String),
    #[error("terminal {0:?} registered after the first nonterminal")]
    TerminalAfterNonterminal(String),
    #[error("unknown symbol {0:?}")]
    UnknownSymbol(String),
    #[error("unknown production {0}")]
    UnknownProduction(usize),
    #[error("terminal {0:?} used as a production's left-hand side")]
    TerminalProduction(String),
    #[error("goto on terminal {0:?}")]
    GotoOnTerminal(String),
    #[error("unknown start condition {0:?}")]
    UnknownCondition(String),
    #[error("invalid pattern for lexer rule {rule} ({pattern:?}): {message}")]
    InvalidRegex {
        rule: usize,
        pattern: String,
        message: String,
    },
    #[error(
        "reject() can only be invoked when the lexer is of the backtracking persuasion (backtrack_lexer = true)"
    )]
    RejectWithoutBacktrack,
}

/// Which kind of fault an [`ErrorInfo`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lexical,
    Syntax,
}

/// Where a failing semantic action lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOrigin {
    Rule(RuleID),
    Production(ProdID),
}

impl fmt::Display for ActionOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionOrigin::Rule(r) => write!(f, "lexer rule {r}"),
            ActionOrigin::Production(p) => write!(f, "production {p}"),
        }
    }
}

/// Snapshot of a lexical error, taken when no rule matches the remaining
/// input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexErrorInfo {
    pub message: String,
    /// Text matched so far (empty unless `more()` was pending).
    pub text: String,
    /// The character the lexer got stuck on.
    pub unexpected: Option<char>,
    /// 0-based line count at the error.
    pub line: usize,
    pub loc: Location,
    pub recoverable: bool,
    /// Active start condition.
    pub condition: String,
}

impl fmt::Display for LexErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Immutable snapshot of the engine at a lexical or syntax error.
///
/// Handed to [`ParserDriver::parse_error`](crate::ParserDriver::parse_error)
/// and carried by [`ParseError::Lexical`] / [`ParseError::Syntax`].
#[derive(Debug, Clone)]
pub struct ErrorInfo<V> {
    pub kind: ErrorKind,
    pub message: String,
    /// `true` when an error-recovery state exists on the stack.
    pub recoverable: bool,
    /// Text of the offending token.
    pub text: String,
    /// Description of the offending token (e.g. `'ID'`, `end of input`).
    pub token: Option<String>,
    pub token_id: Option<SymbolID>,
    /// 0-based line count at the offending token.
    pub line: usize,
    pub loc: Location,
    /// Descriptions of the terminals acceptable in `state`.
    pub expected: Vec<String>,
    pub expected_ids: Vec<SymbolID>,
    pub state: Option<StateID>,
    pub symbol_stack: Vec<SymbolID>,
    pub state_stack: Vec<StateID>,
    pub value_stack: Vec<V>,
    pub location_stack: Vec<Location>,
}

impl<V> ErrorInfo<V> {
    /// Lifts a lexer snapshot; the stack copies are empty.
    pub fn from_lex(info: &LexErrorInfo) -> Self {
        Self {
            kind: ErrorKind::Lexical,
            message: info.message.clone(),
            recoverable: info.recoverable,
            text: info
                .unexpected
                .map(|c| format!("{}{}", info.text, c))
                .unwrap_or_else(|| info.text.clone()),
            token: None,
            token_id: None,
            line: info.line,
            loc: info.loc,
            expected: Vec::new(),
            expected_ids: Vec::new(),
            state: None,
            symbol_stack: Vec::new(),
            state_stack: Vec::new(),
            value_stack: Vec::new(),
            location_stack: Vec::new(),
        }
    }
}

impl<V> fmt::Display for ErrorInfo<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Error)]
pub enum LexError {
    #[error("{0}")]
    Unrecognized(Box<LexErrorInfo>),
    #[error("lexer rule {rule} action failed: {source}")]
    Action {
        rule: RuleID,
        #[source]
        source: BoxError,
    },
    #[error("lexer rule {rule} matched empty input at offset {offset} without making progress")]
    NoProgress { rule: RuleID, offset: usize },
}

#[derive(Debug, Error)]
pub enum ParseError<V> {
    #[error("{0}")]
    Lexical(Box<ErrorInfo<V>>),
    #[error("{0}")]
    Syntax(Box<ErrorInfo<V>>),
    #[error("internal parser error: {message}")]
    Internal { message: String },
    #[error("semantic action for {origin} failed: {source}")]
    Action {
        origin: ActionOrigin,
        #[source]
        source: BoxError,
    },
}

impl<V> ParseError<V> {
    /// The error snapshot, for lexical and syntax errors.
    pub fn info(&self) -> Option<&ErrorInfo<V>> {
        match self {
            ParseError::Lexical(info) | ParseError::Syntax(info) => Some(info),
            _ => None,
        }
    }
}

impl<V> From<LexError> for ParseError<V> {
    fn from(err: LexError) -> Self {
        match err {
            LexError::Unrecognized(info) => ParseError::Lexical(Box::new(ErrorInfo::from_lex(&info))),
            LexError::Action { rule, source } => ParseError::Action {
                origin: ActionOrigin::Rule(rule),
                source,
            },
            e @ LexError::NoProgress { .. } => ParseError::Internal {
                message: e.to_string(),
            },
        }
    }
}
