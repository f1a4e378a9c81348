//! Errors raised by the calculator's semantic actions.
//!
//! Action failures (an oversized literal, overflowing arithmetic, a comment
//! still open at end of input) reach the caller as the `source` of a
//! [`lalrex::ParseError::Action`]. Table construction errors come out of
//! [`CalcParser::new`](crate::CalcParser::new) directly.
use lalrex::GrammarError;
use thiserror::Error;

/// Represents all possible errors raised by the calculator's semantic actions.
///
/// The engine wraps these as the `source` of a
/// [`lalrex::ParseError::Action`], naming the lexer rule or production whose
/// action failed.
///
/// # Examples
/// Propagating a parse failure:
/// ```rust
/// # use lalrex_calc::CalcError;
/// # fn demo(s: &str) -> Result<i64, CalcError> {
/// let n: i64 = s.parse()?; // ParseIntError -> CalcError via #[from]
/// # Ok(n) }
/// ```
#[derive(Debug, Error)]
pub enum CalcError {
    /// An integer literal could not be parsed from its string representation.
    #[error("unable to parse {0:?}")]
    ParseInt(#[from] std::num::ParseIntError),

    /// `lhs op rhs` does not fit in an `i64`.
    #[error("arithmetic overflow in {lhs} {op} {rhs}")]
    Overflow { op: char, lhs: i64, rhs: i64 },

    /// Input ended inside a `/* ... */` comment.
    #[error("unterminated comment at end of input (line {line})")]
    UnterminatedComment { line: usize },

    /// A semantic value had an unexpected shape.
    #[error("expected {expected}, found {found}")]
    Value {
        expected: &'static str,
        found: String,
    },

    /// A lexer rule or production without an action.
    #[error("no action for {0}")]
    NoAction(String),

    /// Table construction or condition-stack misuse.
    #[error("grammar error {0}")]
    Grammar(#[from] GrammarError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use lalrex::BoxError;

    #[test]
    fn oversized_literal_is_a_parse_error() {
        let err = "99999999999999999999"
            .parse::<i64>()
            .map_err(CalcError::from)
            .unwrap_err();
        assert!(matches!(err, CalcError::ParseInt(_)));
        assert!(err.to_string().starts_with("unable to parse"));
    }

    #[test]
    fn grammar_error_maps_to_calc_error() {
        let err: CalcError = GrammarError::UnknownCondition("FOO".into()).into();
        assert!(matches!(err, CalcError::Grammar(_)));
        assert!(err.to_string().contains("FOO"));
    }

    #[test]
    fn overflow_names_operands() {
        let err = CalcError::Overflow {
            op: '+',
            lhs: i64::MAX,
            rhs: 1,
        };
        assert_eq!(
            err.to_string(),
            format!("arithmetic overflow in {} + 1", i64::MAX)
        );
    }

    #[test]
    fn action_errors_box_into_the_engine_error() {
        let boxed: BoxError = CalcError::UnterminatedComment { line: 4 }.into();
        assert_eq!(
            boxed.to_string(),
            "unterminated comment at end of input (line 4)"
        );
        let err = boxed.downcast::<CalcError>().unwrap();
        assert!(matches!(*err, CalcError::UnterminatedComment { line: 4 }));

        let boxed: BoxError = CalcError::Value {
            expected: "number",
            found: "Text(\"x\")".into(),
        }
        .into();
        assert_eq!(boxed.to_string(), "expected number, found Text(\"x\")");
    }
}
