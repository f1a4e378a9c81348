//! # Calculator Lexer
//!
//! Semantic actions for the calculator's lexer rules (see
//! [`crate::tables::lexer_data`]). Numbers and operators become terminals,
//! whitespace and block comments are skipped. A comment switches the lexer
//! into the exclusive `COMMENT` start condition until its closing `*/`.

use crate::tables::{self, COMMENT};
use crate::{CalcContext, CalcError};
use lalrex::{Lexer, LexerDriver, RuleID, SymbolID};

/// A driver that defines semantic actions for the calculator lexer.
///
/// Each rule of [`tables::lexer_data`] maps to one arm of
/// [`action`](LexerDriver::action); rules returning `None` are skipped.
#[derive(Debug, Default)]
pub struct CalcLexerDriver;

impl LexerDriver for CalcLexerDriver {
    type Context = CalcContext;
    type Error = CalcError;

    fn action(
        &mut self,
        lexer: &mut Lexer,
        context: &mut CalcContext,
        rule: RuleID,
    ) -> Result<Option<SymbolID>, CalcError> {
        match rule {
            tables::RULE_WHITESPACE | tables::RULE_COMMENT_TEXT | tables::RULE_COMMENT_STAR => {
                Ok(None)
            }
            tables::RULE_COMMENT_OPEN => {
                lexer.push_state(COMMENT)?;
                context.comments += 1;
                Ok(None)
            }
            tables::RULE_COMMENT_CLOSE => {
                lexer.pop_state();
                Ok(None)
            }
            tables::RULE_COMMENT_EOF => Err(CalcError::UnterminatedComment {
                line: lexer.yylineno() + 1,
            }),
            tables::RULE_NUMBER => Ok(Some(tables::NUM)),
            tables::RULE_SEMI => Ok(Some(tables::SEMI)),
            tables::RULE_PLUS => Ok(Some(tables::PLUS)),
            tables::RULE_MINUS => Ok(Some(tables::MINUS)),
            _ => Err(CalcError::NoAction(format!("lexer rule {rule}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lalrex::{LexError, LexerOptions};
    use std::sync::Arc;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn lex_all(input: &str) -> Result<Vec<(SymbolID, String)>, LexError> {
        let data = Arc::new(tables::lexer_data(LexerOptions::default()).unwrap());
        let mut lexer = Lexer::new(data);
        lexer.set_input(input);
        let mut context = CalcContext::new();
        let mut out = Vec::new();
        loop {
            let t = lexer.lex(&mut CalcLexerDriver, &mut context)?;
            if t.symbol == SymbolID::EOF {
                return Ok(out);
            }
            out.push((t.symbol, t.text.to_string()));
        }
    }

    #[test]
    fn numbers_and_operators() {
        init_logger();
        let toks = lex_all("12 + 3-4;").unwrap();
        let symbols: Vec<SymbolID> = toks.iter().map(|(s, _)| *s).collect();
        assert_eq!(
            symbols,
            vec![
                tables::NUM,
                tables::PLUS,
                tables::NUM,
                tables::MINUS,
                tables::NUM,
                tables::SEMI
            ]
        );
        assert_eq!(toks[0].1, "12");
    }

    #[test]
    fn comments_are_skipped() {
        let toks = lex_all("1 /* a * b\n + 2 */ ;").unwrap();
        assert_eq!(
            toks,
            vec![(tables::NUM, "1".into()), (tables::SEMI, ";".into())]
        );
    }

    #[test]
    fn unterminated_comment_fails() {
        let err = lex_all("1; /* open\n").unwrap_err();
        let LexError::Action { rule, source } = err else {
            panic!("expected an action error");
        };
        assert_eq!(rule, tables::RULE_COMMENT_EOF);
        assert_eq!(
            source.to_string(),
            "unterminated comment at end of input (line 2)"
        );
    }

    #[test]
    fn unknown_character_is_a_lexical_error() {
        let err = lex_all("1 # 2").unwrap_err();
        assert!(matches!(err, LexError::Unrecognized(_)));
    }
}
