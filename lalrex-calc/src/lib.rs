//! # lalrex-calc
//!
//! A small demonstration crate built on **lalrex**, providing a complete,
//! minimal example of a lexer–parser pipeline for a calculator language.
//!
//! The language is a list of `;`-terminated sums and differences of integers,
//! with `/* ... */` block comments. A malformed line is reported once and
//! skipped, so one bad line does not spoil the rest of the input.
//!
//! ## Overview
//!
//! - [`tables`]: the precompiled grammar table and lexer rules.
//! - [`lexer`]: lexer actions ([`CalcLexerDriver`]), including the comment
//!   start condition.
//! - [`parser`]: reduction actions and the error hook ([`CalcParserDriver`])
//!   plus the [`CalcParser`] wrapper.
//! - [`value`]: semantic values ([`CalcValue`]) and the shared
//!   [`CalcContext`].
//!
//! ## Example
//!
//! ```rust
//! use lalrex_calc::{CalcContext, CalcOptions, CalcParser};
//!
//! let mut parser = CalcParser::new(CalcOptions::default()).unwrap();
//! let mut context = CalcContext::new();
//! let lines = parser.parse("1 + 2; 3 3; 4 - 5;", &mut context).unwrap();
//! assert_eq!(lines, vec![Some(3), None, Some(-1)]);
//! assert_eq!(context.diagnostics.len(), 1);
//! ```
pub mod error;
pub mod lexer;
pub mod parser;
pub mod tables;
pub mod value;

pub use error::CalcError;
pub use lexer::CalcLexerDriver;
pub use parser::{CalcOptions, CalcParser, CalcParserDriver};
pub use value::{CalcContext, CalcValue, Diagnostic};
