//! # Calculator Parser
//!
//! This module couples the calculator tables with calculator-specific
//! semantic actions. It exposes:
//!
//! - [`CalcParserDriver`]: semantic actions for reductions and the error hook,
//! - [`CalcParser`]: a thin wrapper owning the engine, its lexer and the
//!   shared tables.
//!
//! ## Behavior highlights
//! - Every `expr ';'` line evaluates to a number; `+` and `-` are
//!   left-associative and checked for overflow.
//! - A malformed line is skipped up to the next `;` through the
//!   `line -> error ';'` production and shows up as `None` in the result.
//!   Its diagnostic is recorded in the [`CalcContext`].

use crate::tables::{self, prod};
use crate::{CalcContext, CalcError, CalcLexerDriver, CalcValue, Diagnostic};
use lalrex::{
    ErrorInfo, ErrorKind, Lexer, LexerOptions, LexerStats, Location, ParseError, Parser,
    ParserDriver, ParserOptions, ParserStats, Reduction, Token,
};
use std::sync::Arc;

/// A driver that defines semantic actions for the calculator parser.
///
/// Reductions build [`CalcValue`]s bottom-up: numbers for expressions and a
/// [`CalcValue::Lines`] list for the start symbol. Errors are recorded as
/// [`Diagnostic`]s in the context; recoverable ones let the parse continue.
#[derive(Debug, Default)]
pub struct CalcParserDriver;

impl CalcParserDriver {
    fn arith(rd: &Reduction<'_, CalcValue>, op: char) -> Result<CalcValue, CalcError> {
        let lhs = rd.get(1).number()?;
        let rhs = rd.get(3).number()?;
        let result = match op {
            '+' => lhs.checked_add(rhs),
            _ => lhs.checked_sub(rhs),
        };
        result
            .map(CalcValue::Number)
            .ok_or(CalcError::Overflow { op, lhs, rhs })
    }
}

impl ParserDriver for CalcParserDriver {
    type Value = CalcValue;
    type Context = CalcContext;
    type Error = CalcError;

    fn token_value(&mut self, token: &Token) -> CalcValue {
        CalcValue::Text(token.text.to_string())
    }

    fn reduce(
        &mut self,
        rd: &mut Reduction<'_, CalcValue>,
        context: &mut CalcContext,
    ) -> Result<(), CalcError> {
        let value = match rd.production {
            prod::LIST_APPEND => {
                let mut lines = rd.take(1).into_lines()?;
                lines.push(match rd.take(2) {
                    CalcValue::Number(n) => Some(n),
                    _ => None,
                });
                CalcValue::Lines(lines)
            }
            prod::LIST_EMPTY => CalcValue::Lines(Vec::new()),
            prod::LINE_EXPR => CalcValue::Number(rd.get(1).number()?),
            prod::LINE_ERROR => {
                let skipped = rd.recovery.map(|t| t.text()).unwrap_or_default();
                log::debug!("skipped line {:?}", skipped);
                context.skipped.push(skipped);
                CalcValue::None
            }
            prod::EXPR_ADD => Self::arith(rd, '+')?,
            prod::EXPR_SUB => Self::arith(rd, '-')?,
            prod::EXPR_NUM => CalcValue::Number(rd.get(1).number()?),
            other => return Err(CalcError::NoAction(format!("production {other}"))),
        };
        rd.set(value);
        Ok(())
    }

    fn parse_error(
        &mut self,
        info: &ErrorInfo<CalcValue>,
        context: &mut CalcContext,
    ) -> Result<Option<CalcValue>, ParseError<CalcValue>> {
        context.diagnostics.push(Diagnostic {
            kind: info.kind,
            message: info.message.clone(),
            loc: info.loc,
            recoverable: info.recoverable,
        });
        if info.recoverable {
            log::warn!("{}", info.message);
            return Ok(None);
        }
        Err(match info.kind {
            ErrorKind::Lexical => ParseError::Lexical(Box::new(info.clone())),
            ErrorKind::Syntax => ParseError::Syntax(Box::new(info.clone())),
        })
    }
}

/// Options for [`CalcParser::new`].
#[derive(Debug, Clone, Default)]
pub struct CalcOptions {
    pub lexer: LexerOptions,
    pub parser: ParserOptions,
}

/// The calculator: parses `;`-terminated sums and differences.
///
/// # Example
///
/// ```rust
/// use lalrex_calc::{CalcContext, CalcOptions, CalcParser};
///
/// let mut parser = CalcParser::new(CalcOptions::default()).unwrap();
/// let mut context = CalcContext::new();
/// let lines = parser.parse("1 + 2; 10 - 4 - 1;", &mut context).unwrap();
/// assert_eq!(lines, vec![Some(3), Some(5)]);
/// ```
pub struct CalcParser {
    parser: Parser<CalcLexerDriver, CalcParserDriver>,
}

impl CalcParser {
    pub fn new(options: CalcOptions) -> Result<Self, CalcError> {
        let table = Arc::new(tables::grammar_table()?);
        let data = Arc::new(tables::lexer_data(options.lexer)?);
        let parser = Parser::new(table, Lexer::new(data), CalcLexerDriver, CalcParserDriver)
            .with_options(options.parser);
        Ok(Self { parser })
    }

    /// Parses `input`, returning one entry per line.
    pub fn parse(
        &mut self,
        input: &str,
        context: &mut CalcContext,
    ) -> Result<Vec<Option<i64>>, ParseError<CalcValue>> {
        self.parser
            .parse(input, context)?
            .into_lines()
            .map_err(|e| ParseError::Internal {
                message: e.to_string(),
            })
    }

    /// Source excerpt around `loc` in the last parsed input.
    pub fn excerpt(&self, loc: &Location) -> String {
        self.parser.lexer().pretty_print_range(loc)
    }

    pub fn stats(&self) -> ParserStats {
        self.parser.stats()
    }

    pub fn lexer_stats(&self) -> LexerStats {
        self.parser.lexer().stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lalrex::{ActionOrigin, ProdID, RuleID, SymbolID};

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn calc() -> CalcParser {
        CalcParser::new(CalcOptions::default()).unwrap()
    }

    #[test]
    fn evaluates_lines() {
        init_logger();
        let mut context = CalcContext::new();
        let lines = calc().parse("1 + 2; 3 - 1;\n40;", &mut context).unwrap();
        assert_eq!(lines, vec![Some(3), Some(2), Some(40)]);
        assert!(context.diagnostics.is_empty());
    }

    #[test]
    fn empty_input_has_no_lines() {
        let none: Vec<Option<i64>> = Vec::new();
        assert_eq!(calc().parse("", &mut CalcContext::new()).unwrap(), none);
        assert_eq!(
            calc().parse("  /* nothing */ ", &mut CalcContext::new()).unwrap(),
            none
        );
    }

    #[test]
    fn comments_between_tokens() {
        let mut context = CalcContext::new();
        let lines = calc()
            .parse("1 /* one\n */ + /**/ 2;", &mut context)
            .unwrap();
        assert_eq!(lines, vec![Some(3)]);
        assert_eq!(context.comments, 2);
    }

    #[test]
    fn bad_line_is_skipped_once() {
        init_logger();
        let mut parser = calc();
        let mut context = CalcContext::new();
        let lines = parser.parse("1 2 3; 4;", &mut context).unwrap();
        assert_eq!(lines, vec![None, Some(4)]);
        assert_eq!(context.diagnostics.len(), 1);
        let d = &context.diagnostics[0];
        assert_eq!(d.kind, ErrorKind::Syntax);
        assert!(d.recoverable);
        assert_eq!(
            d.message,
            "Parse error on line 1:\n1 2 3; 4;\n--^\nExpecting ';', '+', '-', got unexpected number"
        );
        assert_eq!(context.skipped, vec!["2 3"]);
        assert_eq!(parser.stats().discarded, 2);
    }

    #[test]
    fn error_line_number_follows_newlines() {
        let mut context = CalcContext::new();
        let lines = calc().parse("1;\n2 + ;\n3;", &mut context).unwrap();
        assert_eq!(lines, vec![Some(1), None, Some(3)]);
        assert!(context.diagnostics[0].message.starts_with("Parse error on line 2:"));
        assert_eq!(context.diagnostics[0].loc.start.line, 2);
    }

    #[test]
    fn dangling_operator_at_eof_halts() {
        let mut context = CalcContext::new();
        let err = calc().parse("1 +", &mut context).unwrap_err();
        let ParseError::Syntax(info) = err else {
            panic!("expected a syntax error");
        };
        assert_eq!(
            info.message,
            "Parsing halted while starting to recover from another error."
        );
        assert_eq!(info.token_id, Some(SymbolID::EOF));
        assert_eq!(context.diagnostics.len(), 2);
        assert!(context.diagnostics[0].recoverable);
        assert!(!context.diagnostics[1].recoverable);
    }

    #[test]
    fn overflow_is_an_action_error() {
        let text = format!("{} + 1;", i64::MAX);
        let err = calc().parse(&text, &mut CalcContext::new()).unwrap_err();
        assert!(matches!(
            err,
            ParseError::Action {
                origin: ActionOrigin::Production(ProdID(5)),
                ..
            }
        ));
    }

    #[test]
    fn unterminated_comment_is_a_lexer_action_error() {
        let err = calc().parse("1; /* 2;", &mut CalcContext::new()).unwrap_err();
        assert!(matches!(
            err,
            ParseError::Action {
                origin: ActionOrigin::Rule(RuleID(5)),
                ..
            }
        ));
    }

    #[test]
    fn unknown_character_is_reported() {
        let mut context = CalcContext::new();
        let err = calc().parse("1 $ 2;", &mut context).unwrap_err();
        let info = err.info().unwrap();
        assert_eq!(info.kind, ErrorKind::Lexical);
        assert_eq!(info.text, "$");
        assert_eq!(context.diagnostics.len(), 1);
    }

    #[test]
    fn recoverable_lexer_errors_skip_the_line() {
        let options = CalcOptions {
            lexer: LexerOptions {
                lexer_errors_are_recoverable: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut context = CalcContext::new();
        let lines = CalcParser::new(options)
            .unwrap()
            .parse("1 $ 2; 5;", &mut context)
            .unwrap();
        assert_eq!(lines, vec![None, Some(5)]);
        assert_eq!(context.diagnostics.len(), 1);
        assert_eq!(context.diagnostics[0].kind, ErrorKind::Lexical);
    }

    #[test]
    fn flex_lexer_gives_same_results() {
        let options = CalcOptions {
            lexer: LexerOptions {
                flex: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut parser = CalcParser::new(options).unwrap();
        let lines = parser.parse("10-2-3; 7;", &mut CalcContext::new()).unwrap();
        assert_eq!(lines, vec![Some(5), Some(7)]);
        assert_eq!(parser.lexer_stats().tokens, 9);
    }

    #[test]
    fn excerpt_marks_error_location() {
        let mut parser = calc();
        let mut context = CalcContext::new();
        parser.parse("1;\n2 3;", &mut context).unwrap();
        let out = parser.excerpt(&context.diagnostics[0].loc);
        assert!(out.contains("2: 2 3;"));
    }
}
