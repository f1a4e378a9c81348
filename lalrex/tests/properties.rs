use lalrex::{
    GrammarTable, Lexer, LexerData, LexerDriver, LexerOptions, ParseError, Parser, ParserDriver,
    Position, Reduction, RuleID, SymbolID, Token,
};
use proptest::prelude::*;
use std::convert::Infallible;
use std::sync::Arc;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Emits `SymbolID(10 + rule)` for every match.
struct Echo;

impl LexerDriver for Echo {
    type Context = Vec<String>;
    type Error = Infallible;

    fn action(
        &mut self,
        _lexer: &mut Lexer,
        _context: &mut Vec<String>,
        rule: RuleID,
    ) -> Result<Option<SymbolID>, Infallible> {
        Ok(Some(SymbolID(10 + rule.0)))
    }
}

fn lexer(options: LexerOptions, rules: &[&str]) -> Lexer {
    let data = rules
        .iter()
        .fold(LexerData::builder(options), |b, r| b.rule(r))
        .build()
        .unwrap();
    Lexer::new(Arc::new(data))
}

fn lex_all(lexer: &mut Lexer, input: &str) -> Vec<Token> {
    lexer.set_input(input);
    let mut out = Vec::new();
    loop {
        let t = lexer.lex(&mut Echo, &mut Vec::new()).unwrap();
        if t.symbol == SymbolID::EOF {
            return out;
        }
        out.push(t);
    }
}

/// ```text
/// list -> list line | <empty>
/// line -> ID ';' | error ';'
/// ```
fn list_table() -> Arc<GrammarTable> {
    let table = GrammarTable::builder()
        .terminals(&["';'", "ID", "'+'"])
        .nonterminals(&["list", "line"])
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
        .unwrap();
    Arc::new(table)
}

struct ListLexer {
    symbols: Vec<Option<SymbolID>>,
}

impl LexerDriver for ListLexer {
    type Context = Vec<String>;
    type Error = Infallible;

    fn action(
        &mut self,
        _lexer: &mut Lexer,
        _context: &mut Vec<String>,
        rule: RuleID,
    ) -> Result<Option<SymbolID>, Infallible> {
        Ok(self.symbols[rule.0])
    }
}

/// Records every reported error in the context.
struct Recorder;

impl ParserDriver for Recorder {
    type Value = String;
    type Context = Vec<String>;
    type Error = Infallible;

    fn token_value(&mut self, token: &Token) -> String {
        token.text.to_string()
    }

    fn reduce(&mut self, _rd: &mut Reduction<'_, String>, _context: &mut Vec<String>) -> Result<(), Infallible> {
        Ok(())
    }

    fn parse_error(
        &mut self,
        info: &lalrex::ErrorInfo<String>,
        context: &mut Vec<String>,
    ) -> Result<Option<String>, ParseError<String>> {
        context.push(info.message.clone());
        if info.recoverable {
            Ok(None)
        } else {
            Err(ParseError::Syntax(Box::new(info.clone())))
        }
    }
}

fn list_parser() -> Parser<ListLexer, Recorder> {
    let table = list_table();
    let data = LexerData::builder(LexerOptions::default())
        .rule(r"\s+")
        .rule("[a-z]+")
        .rule(";")
        .rule(r"\+")
        .build()
        .unwrap();
    let symbols = vec![
        None,
        table.symbol_id("ID"),
        table.symbol_id("';'"),
        table.symbol_id("'+'"),
    ];
    Parser::new(
        table,
        Lexer::new(Arc::new(data)),
        ListLexer { symbols },
        Recorder,
    )
}

fn words() -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(prop_oneof![Just("a"), Just(";"), Just("+")], 0..40)
}

proptest! {
    #[test]
    fn parse_terminates_deterministically(tokens in words()) {
        init_logger();
        let input = tokens.join(" ");
        let mut first = Vec::new();
        let r1 = list_parser().parse(&input, &mut first);
        let mut second = Vec::new();
        let r2 = list_parser().parse(&input, &mut second);
        prop_assert_eq!(format!("{r1:?}"), format!("{r2:?}"));
        prop_assert_eq!(&first, &second);
        prop_assert!(first.len() <= tokens.len() + 1);
    }

    #[test]
    fn valid_lists_report_nothing(n in 0usize..20) {
        let input = "a;".repeat(n);
        let mut diagnostics = Vec::new();
        let mut parser = list_parser();
        prop_assert!(parser.parse(&input, &mut diagnostics).is_ok());
        prop_assert!(diagnostics.is_empty());
        prop_assert_eq!(parser.stats().reductions, 2 * n + 1);
    }

    #[test]
    fn flex_takes_longest_match_earliest_rule(words in prop::collection::vec("[a-z]{1,12}", 1..8)) {
        let input = words.join(" ");
        let mut flex = lexer(
            LexerOptions { flex: true, ..Default::default() },
            &[r"\s+", "[a-z]", "[a-z]+", "[a-z]+"],
        );
        let toks: Vec<Token> = lex_all(&mut flex, &input)
            .into_iter()
            .filter(|t| t.symbol != SymbolID(10))
            .collect();
        prop_assert_eq!(toks.len(), words.len());
        for (t, w) in toks.iter().zip(&words) {
            prop_assert_eq!(t.text.as_str(), w.as_str());
            let expected = if w.len() == 1 { SymbolID(11) } else { SymbolID(12) };
            prop_assert_eq!(t.symbol, expected);
        }

        let mut first = lexer(LexerOptions::default(), &[r"\s+", "[a-z]", "[a-z]+"]);
        let letters = lex_all(&mut first, &input)
            .into_iter()
            .filter(|t| t.symbol == SymbolID(11))
            .count();
        prop_assert_eq!(letters, words.iter().map(|w| w.len()).sum::<usize>());
    }

    #[test]
    fn line_breaks_count_once(
        lines in prop::collection::vec(
            ("[a-z ]{1,8}", prop_oneof![Just("\n"), Just("\r\n"), Just("\r")]),
            0..10,
        )
    ) {
        let input: String = lines.iter().map(|(l, t)| format!("{l}{t}")).collect();
        let mut lx = lexer(LexerOptions::default(), &["[^\r\n]+", "\r\n|\n|\r"]);
        let toks = lex_all(&mut lx, &input);
        prop_assert_eq!(toks.len(), 2 * lines.len());
        prop_assert_eq!(lx.yylineno(), lines.len());
        prop_assert_eq!(lx.position(), Position { line: lines.len() + 1, column: 0 });
        for (i, t) in toks.iter().enumerate() {
            prop_assert_eq!(t.loc.start.line, i / 2 + 1);
        }
    }

    #[test]
    fn unput_restores_position(
        text in "[a-z\n ]{1,30}",
        take in 0usize..30,
    ) {
        let mut lx = lexer(LexerOptions::default(), &["[a-z]+", "\n", " +"]);
        lx.set_input(&text);
        let mut context = Vec::new();
        for _ in 0..take {
            let offset = lx.offset();
            let position = lx.position();
            let t = lx.lex(&mut Echo, &mut context).unwrap();
            if t.symbol == SymbolID::EOF {
                break;
            }
            lx.unput(&t.text);
            prop_assert_eq!(lx.offset(), offset);
            prop_assert_eq!(lx.position(), position);
            prop_assert_eq!(lx.source(), text.as_str());
            let again = lx.lex(&mut Echo, &mut context).unwrap();
            prop_assert_eq!(again.text, t.text);
        }
    }
}
