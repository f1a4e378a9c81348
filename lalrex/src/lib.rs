//! Copyright (c) 2005–2025 IKH Software, Inc.
//!
//! Released under the terms of the GNU Lesser General Public License, version 3.0
//! or (at your option) any later version (LGPL-3.0-or-later).
//!
//! Runtime for jison-style generated parsers.
//!
//! `lalrex` executes precompiled tables; it never computes LALR states itself.
//! It provides two engines:
//!  * **[`Parser`]**: a table-driven LALR(1) parse engine with error
//!    recovery through `error` productions
//!  * **[`Lexer`]**: a regex-rule lexer with start conditions, first-match
//!    and longest-match policies, backtracking and `unput`
//!
//! Tables are assembled with [`GrammarTable::builder`] and
//! [`LexerData::builder`], shared behind `Arc`, and driven by user-supplied
//! [`ParserDriver`] and [`LexerDriver`] implementations holding the semantic
//! actions.
//!
//! ```rust
//! use lalrex::{GrammarTable, LexerData, LexerOptions};
//!
//! let table = GrammarTable::builder()
//!     .terminals(&["NUM"])
//!     .nonterminals(&["expr"])
//!     .production("expr", 1)
//!     .shift(0, "NUM", 1)
//!     .goto(0, "expr", 2)
//!     .default_reduce(1, 1)
//!     .accept(2)
//!     .build()
//!     .unwrap();
//! assert_eq!(table.state_count(), 3);
//!
//! let lexer = LexerData::builder(LexerOptions::default())
//!     .rule(r"\s+")
//!     .rule("[0-9]+")
//!     .build()
//!     .unwrap();
//! assert_eq!(lexer.rules().len(), 2);
//! ```

pub mod diagnostics;
pub mod error;
pub mod lexer;
pub mod location;
pub mod parser;
pub mod stack;
pub mod table;

#[cfg(test)]
mod test_tables;

pub use crate::diagnostics::{describe_symbol, expected_token_set, pretty_print_range, show_position};
pub use crate::error::{
    ActionOrigin, BoxError, ErrorInfo, ErrorKind, GrammarError, LexError, LexErrorInfo, ParseError,
};
pub use crate::lexer::{
    Condition, EOF_PATTERN, INITIAL, Lexer, LexerData, LexerDataBuilder, LexerDriver, LexerOptions,
    LexerRule, LexerStats, Token,
};
pub use crate::location::{LexerCursor, Location, Position};
pub use crate::parser::{Parser, ParserDriver, ParserOptions, ParserStats, Reduction};
pub use crate::stack::{ParseStacks, RecoveryTrack};
pub use crate::table::{
    AmbigID, EntryAction, GrammarTable, GrammarTableBuilder, ParserAction, ProdID, Production,
    RuleID, StateID, SymbolID,
};
