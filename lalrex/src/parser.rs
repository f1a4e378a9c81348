//! Table-driven LALR(1) parse engine.
//!
//! [`Parser`] pulls tokens from its [`Lexer`] on demand, runs the
//! shift/reduce automaton described by a [`GrammarTable`] and hands every
//! reduction to a [`ParserDriver`]. Syntax errors are resynchronized through
//! the grammar's `error` productions; see [`Parser::parse`].

use crate::diagnostics::{describe_symbol, expected_token_set};
use crate::error::{ActionOrigin, BoxError, ErrorInfo, ErrorKind, LexError, LexErrorInfo, ParseError};
use crate::lexer::{Lexer, LexerDriver, Token};
use crate::location::Location;
use crate::stack::{ParseStacks, RecoveryTrack};
use crate::table::{GrammarTable, ParserAction, ProdID, RuleID, StateID, SymbolID};
use std::fmt::Debug;
use std::mem;
use std::sync::Arc;

const HALTED_WHILE_RECOVERING: &str =
    "Parsing halted while starting to recover from another error.";
const HALTED_NO_RULE: &str = "Parsing halted. No suitable error recovery rule available.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    /// Number of tokens that must be shifted after an error before the next
    /// error is reported again.
    pub error_recovery_token_discard_count: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            error_recovery_token_discard_count: 3,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParserStats {
    pub tokens: usize,
    pub shifts: usize,
    pub reductions: usize,
    /// Errors handed to [`ParserDriver::parse_error`].
    pub errors: usize,
    pub recoveries: usize,
    pub discarded: usize,
}

/// The view a semantic action gets of one reduction.
///
/// `values` and `locations` are the right-hand side slots (`$1..$n`,
/// `@1..@n`). Leaving `value` unset makes `$$` default to `$1` (or to
/// `V::default()` for an empty right-hand side); `location` starts out as
/// the span from `@1` to `@n`.
pub struct Reduction<'a, V> {
    pub production: ProdID,
    pub lhs: SymbolID,
    pub values: &'a mut [V],
    pub locations: &'a [Location],
    pub value: Option<V>,
    pub location: Location,
    /// Text of the last consumed token.
    pub yytext: &'a str,
    pub yyleng: usize,
    pub yylineno: usize,
    pub yylloc: &'a Location,
    /// The current recovery episode, while recovering from a syntax error.
    pub recovery: Option<&'a RecoveryTrack<V>>,
}

impl<V> Reduction<'_, V> {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `$i`, counting from 1.
    ///
    /// # Panics
    ///
    /// Panics if `i` is 0 or greater than [`len`](Self::len).
    pub fn get(&self, i: usize) -> &V {
        &self.values[i - 1]
    }

    /// Moves `$i` out, leaving `V::default()` behind.
    ///
    /// # Panics
    ///
    /// Panics if `i` is 0 or greater than [`len`](Self::len).
    pub fn take(&mut self, i: usize) -> V
    where
        V: Default,
    {
        mem::take(&mut self.values[i - 1])
    }

    /// `@i`, counting from 1.
    ///
    /// # Panics
    ///
    /// Panics if `i` is 0 or greater than [`len`](Self::len).
    pub fn loc(&self, i: usize) -> &Location {
        &self.locations[i - 1]
    }

    /// Sets `$$`.
    pub fn set(&mut self, value: V) {
        self.value = Some(value);
    }
}

/// Semantic actions of a grammar.
pub trait ParserDriver {
    type Value: Clone + Debug + Default;
    type Context;
    type Error: Into<BoxError>;

    /// Value pushed for a shifted terminal.
    fn token_value(&mut self, token: &Token) -> Self::Value;

    /// Runs the action of `rd.production`.
    fn reduce(
        &mut self,
        rd: &mut Reduction<'_, Self::Value>,
        context: &mut Self::Context,
    ) -> Result<(), Self::Error>;

    /// Called for lexical and syntax errors.
    ///
    /// Returning a value ends the parse with that value. Returning `None`
    /// continues with error recovery when `info.recoverable` is set and
    /// aborts the parse otherwise. The default logs recoverable errors and
    /// raises the others.
    fn parse_error(
        &mut self,
        info: &ErrorInfo<Self::Value>,
        context: &mut Self::Context,
    ) -> Result<Option<Self::Value>, ParseError<Self::Value>> {
        let _ = context;
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

/// Why the main loop stopped early.
enum Stop<V> {
    Value(V),
    Error(ParseError<V>),
}

impl<V> From<ParseError<V>> for Stop<V> {
    fn from(err: ParseError<V>) -> Self {
        Stop::Error(err)
    }
}

/// Fills the parser-side fields of an error snapshot.
fn fill_info<V: Clone>(
    info: &mut ErrorInfo<V>,
    table: &GrammarTable,
    stacks: &ParseStacks<V>,
    state: StateID,
) {
    let (expected, expected_ids) = expected_token_set(table, state);
    info.expected = expected;
    info.expected_ids = expected_ids;
    info.state = Some(state);
    info.symbol_stack = stacks.symbols().to_vec();
    info.state_stack = stacks.states().to_vec();
    info.value_stack = stacks.values().to_vec();
    info.location_stack = stacks.locations().to_vec();
}

/// Routes lexical errors raised while the parser pulls a token through
/// [`ParserDriver::parse_error`].
struct Routed<'a, LD, PD: ParserDriver> {
    inner: &'a mut LD,
    driver: &'a mut PD,
    table: &'a GrammarTable,
    stacks: &'a ParseStacks<PD::Value>,
    stats: &'a mut ParserStats,
    stop: Option<Stop<PD::Value>>,
}

impl<LD, PD> LexerDriver for Routed<'_, LD, PD>
where
    LD: LexerDriver,
    PD: ParserDriver<Context = LD::Context>,
{
    type Context = LD::Context;
    type Error = LD::Error;

    fn action(
        &mut self,
        lexer: &mut Lexer,
        context: &mut Self::Context,
        rule: RuleID,
    ) -> Result<Option<SymbolID>, Self::Error> {
        self.inner.action(lexer, context, rule)
    }

    fn lex_error(
        &mut self,
        _lexer: &mut Lexer,
        context: &mut Self::Context,
        info: &LexErrorInfo,
    ) -> Result<Option<SymbolID>, LexError> {
        let mut einfo = ErrorInfo::from_lex(info);
        let state = self.stacks.top_state().unwrap_or_default();
        fill_info(&mut einfo, self.table, self.stacks, state);
        self.stats.errors += 1;

        let unrecognized = || LexError::Unrecognized(Box::new(info.clone()));
        match self.driver.parse_error(&einfo, context) {
            Ok(None) if info.recoverable => Ok(Some(SymbolID::ERROR)),
            Ok(None) => {
                self.stop = Some(Stop::Error(ParseError::Lexical(Box::new(einfo))));
                Err(unrecognized())
            }
            Ok(Some(value)) => {
                self.stop = Some(Stop::Value(value));
                Err(unrecognized())
            }
            Err(e) => {
                self.stop = Some(Stop::Error(e));
                Err(unrecognized())
            }
        }
    }
}

/// The parse engine: one grammar table, one lexer and the two drivers.
///
/// A parser can be reused for any number of inputs; each [`parse`] call
/// starts from a clean state and leaves no stack contents behind.
///
/// [`parse`]: Parser::parse
pub struct Parser<LD, PD: ParserDriver> {
    table: Arc<GrammarTable>,
    lexer: Lexer,
    lexer_driver: LD,
    driver: PD,
    options: ParserOptions,
    stacks: ParseStacks<PD::Value>,
    track: RecoveryTrack<PD::Value>,
    lookahead: Option<Token>,
    pre_error: Option<Token>,
    consumed: Token,
    recovering: usize,
    eof_residual: Option<usize>,
    stats: ParserStats,
}

impl<LD, PD> Parser<LD, PD>
where
    LD: LexerDriver,
    PD: ParserDriver<Context = LD::Context>,
{
    pub fn new(table: Arc<GrammarTable>, lexer: Lexer, lexer_driver: LD, driver: PD) -> Self {
        Self {
            table,
            lexer,
            lexer_driver,
            driver,
            options: ParserOptions::default(),
            stacks: ParseStacks::new(),
            track: RecoveryTrack::default(),
            lookahead: None,
            pre_error: None,
            consumed: Token::default(),
            recovering: 0,
            eof_residual: None,
            stats: ParserStats::default(),
        }
    }

    pub fn with_options(mut self, options: ParserOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn stats(&self) -> ParserStats {
        self.stats.clone()
    }

    pub fn table(&self) -> &Arc<GrammarTable> {
        &self.table
    }

    pub fn lexer(&self) -> &Lexer {
        &self.lexer
    }

    pub fn lexer_mut(&mut self) -> &mut Lexer {
        &mut self.lexer
    }

    pub fn driver(&self) -> &PD {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut PD {
        &mut self.driver
    }

    fn internal(message: impl Into<String>) -> Stop<PD::Value> {
        Stop::Error(ParseError::Internal {
            message: message.into(),
        })
    }

    fn discard_count(&self) -> usize {
        self.options.error_recovery_token_discard_count.max(1)
    }

    /// Parses `input` and returns the value of the start production.
    ///
    /// On a syntax error the nearest state on the stack that can shift
    /// `error` is located; the error is reported once through
    /// [`ParserDriver::parse_error`] and parsing resumes from that state.
    /// Further errors stay silent until
    /// [`error_recovery_token_discard_count`] tokens have been shifted;
    /// lookaheads that still do not fit are discarded in the meantime.
    /// Errors at end of input must each recover to a strictly shallower
    /// stack than the previous one, so recovery always terminates.
    ///
    /// [`error_recovery_token_discard_count`]: ParserOptions::error_recovery_token_discard_count
    pub fn parse(
        &mut self,
        input: &str,
        context: &mut PD::Context,
    ) -> Result<PD::Value, ParseError<PD::Value>> {
        self.reset(input);
        let result = self.run(context);
        self.cleanup();
        match result {
            Ok(value) | Err(Stop::Value(value)) => Ok(value),
            Err(Stop::Error(e)) => Err(e),
        }
    }

    fn reset(&mut self, input: &str) {
        self.lexer.set_input(input);
        self.stacks.clear();
        let start = *self.lexer.yylloc();
        self.stacks
            .push(SymbolID::ACCEPT, StateID(0), PD::Value::default(), start);
        self.lookahead = None;
        self.pre_error = None;
        self.consumed = Token {
            loc: start,
            ..Token::default()
        };
        self.recovering = 0;
        self.eof_residual = None;
        self.track.clear();
    }

    fn cleanup(&mut self) {
        self.stacks.clear();
        self.track.clear();
        self.lookahead = None;
        self.pre_error = None;
        self.recovering = 0;
    }

    fn run(&mut self, context: &mut PD::Context) -> Result<PD::Value, Stop<PD::Value>> {
        loop {
            let state = self
                .stacks
                .top_state()
                .ok_or_else(|| Self::internal("empty state stack"))?;
            if !self.table.has_state(state) {
                return Err(Self::internal(format!("unknown state {state}")));
            }

            let action = match self.table.default_action(state) {
                Some(action) => action,
                None => {
                    let symbol = match &self.lookahead {
                        Some(t) => t.symbol,
                        None => {
                            let t = self.fetch(context)?;
                            let symbol = t.symbol;
                            self.lookahead = Some(t);
                            symbol
                        }
                    };
                    self.table.action(state, symbol)
                }
            };

            if log::log_enabled!(log::Level::Trace) {
                self.dump_state();
            }

            match action {
                ParserAction::Shift(next) => {
                    log::trace!("Shift {}", next);
                    self.shift(next)?;
                }
                ParserAction::Reduce(prod) => {
                    log::trace!("Reduce {}", prod);
                    self.reduce(prod, context)?;
                }
                ParserAction::Accept => {
                    log::trace!("Accept");
                    return self
                        .stacks
                        .take_top_value()
                        .ok_or_else(|| Self::internal("accept on an empty stack"));
                }
                ParserAction::Error => self.recover(state, context)?,
                ParserAction::Ambig(ambig) => {
                    return Err(Self::internal(format!(
                        "ambiguous table entry in state {state}: {:?}",
                        self.table.lookup_ambig(ambig)
                    )));
                }
                ParserAction::Goto(_) => {
                    return Err(Self::internal(format!(
                        "goto action on a lookahead in state {state}"
                    )));
                }
            }
        }
    }

    fn fetch(&mut self, context: &mut PD::Context) -> Result<Token, Stop<PD::Value>> {
        let Self {
            lexer,
            lexer_driver,
            driver,
            table,
            stacks,
            stats,
            ..
        } = self;
        let mut routed = Routed {
            inner: lexer_driver,
            driver,
            table: &**table,
            stacks: &*stacks,
            stats,
            stop: None,
        };
        match lexer.lex(&mut routed, context) {
            Ok(token) => {
                routed.stats.tokens += 1;
                Ok(token)
            }
            Err(e) => Err(routed.stop.take().unwrap_or_else(|| Stop::Error(e.into()))),
        }
    }

    fn shift(&mut self, next: StateID) -> Result<(), Stop<PD::Value>> {
        let token = self
            .lookahead
            .take()
            .ok_or_else(|| Self::internal("shift without a lookahead"))?;
        // an `error` token straight from the lexer opens an episode of its own
        let lexed_error =
            token.symbol == SymbolID::ERROR && self.pre_error.is_none() && self.recovering == 0;
        if lexed_error {
            self.track.begin(self.stacks.len(), &token);
        }
        let value = self.driver.token_value(&token);
        self.stacks.push(token.symbol, next, value, token.loc);
        self.stats.shifts += 1;

        if let Some(pre) = self.pre_error.take() {
            // the error token went in; retry the token that caused the error
            self.lookahead = Some(pre);
        } else {
            self.consumed = token;
            if lexed_error {
                self.recovering = self.discard_count();
                self.stats.recoveries += 1;
            } else if self.recovering > 0 {
                self.recovering -= 1;
                if self.recovering == 0 {
                    log::debug!("recovered from syntax error");
                }
            }
        }
        Ok(())
    }

    fn reduce(&mut self, prod: ProdID, context: &mut PD::Context) -> Result<(), Stop<PD::Value>> {
        let production = self
            .table
            .production(prod)
            .ok_or_else(|| Self::internal(format!("unknown production {prod}")))?;
        let n = production.len;
        let sp = self.stacks.len();
        if n >= sp {
            return Err(Self::internal(format!(
                "production {prod} needs {n} symbols, stack holds {}",
                sp.saturating_sub(1)
            )));
        }
        let base = sp - n;
        let locations = self.stacks.locations();
        let location = if n > 0 {
            locations[base].merge(&locations[sp - 1])
        } else {
            locations[sp - 1].collapsed()
        };

        let (value, location) = {
            let (values, locations) = self.stacks.window_mut(n);
            let mut rd = Reduction {
                production: prod,
                lhs: production.lhs,
                values,
                locations,
                value: None,
                location,
                yytext: &self.consumed.text,
                yyleng: self.consumed.text.chars().count(),
                yylineno: self.consumed.line_no,
                yylloc: &self.consumed.loc,
                recovery: (self.recovering > 0).then_some(&self.track),
            };
            self.driver
                .reduce(&mut rd, context)
                .map_err(|e| ParseError::<PD::Value>::Action {
                    origin: ActionOrigin::Production(prod),
                    source: e.into(),
                })?;
            let value = match rd.value.take() {
                Some(v) => v,
                None if n > 0 => mem::take(&mut rd.values[0]),
                None => PD::Value::default(),
            };
            (value, rd.location)
        };

        self.stacks.truncate(base);
        let state = self
            .stacks
            .top_state()
            .ok_or_else(|| Self::internal("empty state stack"))?;
        match self.table.action(state, production.lhs) {
            ParserAction::Goto(next) => {
                self.stacks.push(production.lhs, next, value, location);
            }
            other => {
                return Err(Self::internal(format!(
                    "no goto on {} in state {state} (found {other:?})",
                    self.table.symbol_name(production.lhs).unwrap_or("?")
                )));
            }
        }
        self.stats.reductions += 1;
        Ok(())
    }

    /// Depth of the nearest state on the stack with an action on `error`.
    fn recovery_depth(&self) -> Option<usize> {
        self.stacks
            .states()
            .iter()
            .rev()
            .position(|&s| self.table.action(s, SymbolID::ERROR) != ParserAction::Error)
    }

    fn recover(&mut self, state: StateID, context: &mut PD::Context) -> Result<(), Stop<PD::Value>> {
        let mut token = self
            .lookahead
            .take()
            .ok_or_else(|| Self::internal("error without a lookahead"))?;
        if token.symbol == SymbolID::ERROR {
            if let Some(pre) = self.pre_error.take() {
                token = pre;
            }
        }
        let depth = self.recovery_depth();

        if self.recovering == 0 {
            // an `error` token from the lexer has been reported already
            if token.symbol != SymbolID::ERROR {
                let message = self.syntax_message(state, &token);
                let info = self.error_info(message, depth.is_some(), state, &token);
                self.stats.errors += 1;
                log::debug!("syntax error in state {state}, recovery depth {depth:?}");
                if let Some(value) = self.driver.parse_error(&info, context)? {
                    return Err(Stop::Value(value));
                }
                if depth.is_none() {
                    return Err(Stop::Error(ParseError::Syntax(Box::new(info))));
                }
            }
            self.track.clear();
        } else if self.recovering == self.discard_count() {
            if token.symbol == SymbolID::EOF {
                return Err(self.halt(HALTED_WHILE_RECOVERING, state, &token, context));
            }
            log::debug!("discarding {:?} while recovering", token.text);
            self.stats.discarded += 1;
            self.track.discard(token);
            token = self.fetch(context)?;
        }

        let Some(depth) = depth else {
            return Err(self.halt(HALTED_NO_RULE, state, &token, context));
        };
        if token.symbol == SymbolID::EOF {
            let residual = self.stacks.len() - depth;
            if self.eof_residual.is_some_and(|prev| residual >= prev) {
                return Err(self.halt(HALTED_WHILE_RECOVERING, state, &token, context));
            }
            self.eof_residual = Some(residual);
        }

        self.track.pop_from(&mut self.stacks, depth, &token);
        let error_token = Token {
            symbol: SymbolID::ERROR,
            text: token.text.clone(),
            loc: self.track.location().unwrap_or(token.loc),
            line_no: token.line_no,
        };
        self.pre_error = (token.symbol != SymbolID::ERROR).then_some(token);
        self.lookahead = Some(error_token);
        self.recovering = self.discard_count();
        self.stats.recoveries += 1;
        Ok(())
    }

    /// Reports an unrecoverable error and stops the parse.
    fn halt(
        &mut self,
        message: &str,
        state: StateID,
        token: &Token,
        context: &mut PD::Context,
    ) -> Stop<PD::Value> {
        let info = self.error_info(message.to_string(), false, state, token);
        self.stats.errors += 1;
        log::debug!("{message}");
        match self.driver.parse_error(&info, context) {
            Ok(Some(value)) => Stop::Value(value),
            Ok(None) => Stop::Error(ParseError::Syntax(Box::new(info))),
            Err(e) => Stop::Error(e),
        }
    }

    fn syntax_message(&self, state: StateID, token: &Token) -> String {
        let (expected, _) = expected_token_set(&self.table, state);
        let got = describe_symbol(&self.table, token.symbol);
        let excerpt = self.lexer.show_position();
        let line = token.line_no + 1;
        if expected.is_empty() {
            format!("Parse error on line {line}:\n{excerpt}\nUnexpected {got}")
        } else {
            format!(
                "Parse error on line {line}:\n{excerpt}\nExpecting {}, got unexpected {got}",
                expected.join(", ")
            )
        }
    }

    fn error_info(
        &self,
        message: String,
        recoverable: bool,
        state: StateID,
        token: &Token,
    ) -> ErrorInfo<PD::Value> {
        let mut info = ErrorInfo {
            kind: ErrorKind::Syntax,
            message,
            recoverable,
            text: token.text.to_string(),
            token: Some(describe_symbol(&self.table, token.symbol)),
            token_id: Some(token.symbol),
            line: token.line_no,
            loc: token.loc,
            expected: Vec::new(),
            expected_ids: Vec::new(),
            state: None,
            symbol_stack: Vec::new(),
            state_stack: Vec::new(),
            value_stack: Vec::new(),
            location_stack: Vec::new(),
        };
        fill_info(&mut info, &self.table, &self.stacks, state);
        info
    }

    fn dump_state(&self) {
        let mut output = String::new();
        for (state, symbol) in self.stacks.states().iter().zip(self.stacks.symbols()) {
            output.push_str(&format!(
                "<{}> {}  ",
                state,
                self.table.symbol_name(*symbol).unwrap_or("?")
            ));
        }
        if let Some(t) = &self.lookahead {
            output.push_str(&format!(
                "<-  {} {:?}",
                self.table.symbol_name(t.symbol).unwrap_or("?"),
                t.text
            ));
        }
        log::trace!("{}", output);
    }
}
