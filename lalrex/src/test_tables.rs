//! Hand-written tables and drivers shared by the unit tests.

use crate::error::GrammarError;
use crate::lexer::{Lexer, LexerData, LexerDriver, LexerOptions};
use crate::table::{GrammarTable, RuleID, SymbolID};
use std::sync::Arc;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// `E -> E '+' ID | ID`
pub fn sum_table() -> GrammarTable {
    GrammarTable::builder()
        .terminals(&["'+'", "ID"])
        .nonterminals(&["E"])
        .production("E", 3)
        .production("E", 1)
        .shift(0, "ID", 1)
        .goto(0, "E", 2)
        .default_reduce(1, 2)
        .accept(2)
        .shift(2, "'+'", 3)
        .shift(3, "ID", 4)
        .default_reduce(4, 1)
        .build()
        .unwrap()
}

/// ```text
/// list -> list line | <empty>
/// line -> ID ';' | error ';'
/// ```
pub fn list_table() -> GrammarTable {
    GrammarTable::builder()
        .terminals(&["';'", "ID"])
        .nonterminals(&["list", "line"])
        .describe("ID", "identifier")
        .production("list", 2)
        .production("list", 0)
        .production("line", 2)
        .production("line", 2)
        .reduce_on(0, &["$end", "error", "ID"], 2)
        .goto(0, "list", 1)
        .accept(1)
        .shift(1, "error", 2)
        .shift(1, "ID", 3)
        .goto(1, "line", 4)
        .shift(2, "';'", 5)
        .shift(3, "';'", 6)
        .default_reduce(4, 1)
        .default_reduce(5, 4)
        .default_reduce(6, 3)
        .build()
        .unwrap()
}

/// Whitespace, words, `+` and `;`.
pub fn word_lexer_data(options: LexerOptions) -> Arc<LexerData> {
    Arc::new(
        LexerData::builder(options)
            .rule(r"\s+")
            .rule("[A-Za-z]+")
            .rule(r"\+")
            .rule(";")
            .build()
            .unwrap(),
    )
}

/// Maps the rules of [`word_lexer_data`] onto the terminals of `table`.
pub struct WordLexer {
    symbols: [Option<SymbolID>; 4],
}

impl WordLexer {
    pub fn new(table: &GrammarTable) -> Self {
        let id = |name| Some(table.symbol_id(name).unwrap_or(SymbolID(usize::MAX)));
        Self {
            symbols: [None, id("ID"), id("'+'"), id("';'")],
        }
    }
}

impl LexerDriver for WordLexer {
    type Context = Vec<String>;
    type Error = GrammarError;

    fn action(
        &mut self,
        _lexer: &mut Lexer,
        _context: &mut Self::Context,
        rule: RuleID,
    ) -> Result<Option<SymbolID>, GrammarError> {
        Ok(self.symbols[rule.0])
    }
}

/// A lexer driver backed by a closure.
pub struct FnLexer<F>(F);

impl<F> FnLexer<F>
where
    F: FnMut(&mut Lexer, RuleID) -> Result<Option<SymbolID>, GrammarError>,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> LexerDriver for FnLexer<F>
where
    F: FnMut(&mut Lexer, RuleID) -> Result<Option<SymbolID>, GrammarError>,
{
    type Context = ();
    type Error = GrammarError;

    fn action(
        &mut self,
        lexer: &mut Lexer,
        _context: &mut (),
        rule: RuleID,
    ) -> Result<Option<SymbolID>, GrammarError> {
        (self.0)(lexer, rule)
    }
}
