//! # Calculator Tables
//!
//! Precompiled LALR(1) tables and lexer rules for the calculator language:
//!
//! ```text
//! list -> list line | <empty>
//! line -> expr ';' | error ';'
//! expr -> expr '+' NUM | expr '-' NUM | NUM
//! ```
//!
//! Block comments (`/* ... */`) are scanned in the exclusive `COMMENT` start
//! condition. The tables are written out by hand in the form a grammar
//! compiler would emit them.

use lalrex::{GrammarError, GrammarTable, LexerData, LexerOptions, RuleID, SymbolID};

pub const SEMI: SymbolID = SymbolID(3);
pub const PLUS: SymbolID = SymbolID(4);
pub const MINUS: SymbolID = SymbolID(5);
pub const NUM: SymbolID = SymbolID(6);
pub const LIST: SymbolID = SymbolID(7);
pub const LINE: SymbolID = SymbolID(8);
pub const EXPR: SymbolID = SymbolID(9);

/// Exclusive start condition for block comments.
pub const COMMENT: &str = "COMMENT";

pub const RULE_WHITESPACE: RuleID = RuleID(0);
pub const RULE_COMMENT_OPEN: RuleID = RuleID(1);
pub const RULE_COMMENT_CLOSE: RuleID = RuleID(2);
pub const RULE_COMMENT_TEXT: RuleID = RuleID(3);
pub const RULE_COMMENT_STAR: RuleID = RuleID(4);
pub const RULE_COMMENT_EOF: RuleID = RuleID(5);
pub const RULE_NUMBER: RuleID = RuleID(6);
pub const RULE_SEMI: RuleID = RuleID(7);
pub const RULE_PLUS: RuleID = RuleID(8);
pub const RULE_MINUS: RuleID = RuleID(9);

/// Production numbers, as passed to the semantic actions.
pub mod prod {
    use lalrex::ProdID;

    pub const LIST_APPEND: ProdID = ProdID(1);
    pub const LIST_EMPTY: ProdID = ProdID(2);
    pub const LINE_EXPR: ProdID = ProdID(3);
    pub const LINE_ERROR: ProdID = ProdID(4);
    pub const EXPR_ADD: ProdID = ProdID(5);
    pub const EXPR_SUB: ProdID = ProdID(6);
    pub const EXPR_NUM: ProdID = ProdID(7);
}

pub fn grammar_table() -> Result<GrammarTable, GrammarError> {
    GrammarTable::builder()
        .terminals(&["';'", "'+'", "'-'", "NUM"])
        .nonterminals(&["list", "line", "expr"])
        .describe("NUM", "number")
        .production("list", 2)
        .production("list", 0)
        .production("line", 2)
        .production("line", 2)
        .production("expr", 3)
        .production("expr", 3)
        .production("expr", 1)
        // 0: $accept -> . list $end
        .reduce_on(0, &["$end", "error", "NUM"], 2)
        .goto(0, "list", 1)
        // 1: $accept -> list . $end, list -> list . line
        .accept(1)
        .shift(1, "error", 2)
        .shift(1, "NUM", 3)
        .goto(1, "line", 4)
        .goto(1, "expr", 5)
        // 2: line -> error . ';'
        .shift(2, "';'", 6)
        .default_reduce(3, 7)
        .default_reduce(4, 1)
        // 5: line -> expr . ';', expr -> expr . '+' NUM, expr -> expr . '-' NUM
        .shift(5, "';'", 7)
        .shift(5, "'+'", 8)
        .shift(5, "'-'", 9)
        .default_reduce(6, 4)
        .default_reduce(7, 3)
        .shift(8, "NUM", 10)
        .shift(9, "NUM", 11)
        .default_reduce(10, 5)
        .default_reduce(11, 6)
        .build()
}

pub fn lexer_data(options: LexerOptions) -> Result<LexerData, GrammarError> {
    LexerData::builder(options)
        .condition(COMMENT, false)
        .rule(r"\s+")
        .rule(r"/\*")
        .rule_in(&[COMMENT], r"\*/")
        .rule_in(&[COMMENT], r"[^*]+")
        .rule_in(&[COMMENT], r"\*")
        .rule_in(&[COMMENT], lalrex::EOF_PATTERN)
        .rule("[0-9]+")
        .rule(";")
        .rule(r"\+")
        .rule("-")
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lalrex::{ParserAction, StateID, expected_token_set};

    #[test]
    fn symbol_constants_match_table() {
        let table = grammar_table().unwrap();
        for (id, name) in [
            (SEMI, "';'"),
            (PLUS, "'+'"),
            (MINUS, "'-'"),
            (NUM, "NUM"),
            (LIST, "list"),
            (LINE, "line"),
            (EXPR, "expr"),
        ] {
            assert_eq!(table.symbol_id(name), Some(id), "{name}");
        }
        assert_eq!(table.state_count(), 12);
        assert_eq!(table.production(prod::EXPR_ADD).unwrap().lhs, EXPR);
        assert_eq!(table.production(prod::LIST_EMPTY).unwrap().len, 0);
    }

    #[test]
    fn expression_state_expects_operators() {
        let table = grammar_table().unwrap();
        let (expected, _) = expected_token_set(&table, StateID(5));
        assert_eq!(expected, vec!["';'", "'+'", "'-'"]);
        assert_eq!(
            table.action(StateID(1), SymbolID::ERROR),
            ParserAction::Shift(StateID(2))
        );
    }

    #[test]
    fn comment_rules_are_exclusive() {
        let data = lexer_data(LexerOptions::default()).unwrap();
        assert_eq!(data.rules().len(), 10);
        let comment = data.condition(COMMENT).unwrap();
        assert!(!comment.inclusive);
        assert_eq!(
            comment.rules,
            vec![
                RULE_COMMENT_CLOSE,
                RULE_COMMENT_TEXT,
                RULE_COMMENT_STAR,
                RULE_COMMENT_EOF
            ]
        );
        let initial = data.condition(lalrex::INITIAL).unwrap();
        assert!(!initial.rules.contains(&RULE_COMMENT_TEXT));
        assert!(initial.rules.contains(&RULE_NUMBER));
    }
}
