//! Regex-rule lexer engine with start conditions.
//!
//! [`LexerData`] holds the compiled rule set and the start-condition map; it
//! is immutable and shared behind an `Arc`. A [`Lexer`] owns one input buffer
//! and the mutable scanning state (cursor, matched text, condition stack) and
//! hands every match to a [`LexerDriver`], which decides whether the match
//! becomes a token, is skipped, or is rejected in favour of the next rule.

use crate::diagnostics;
use crate::error::{BoxError, GrammarError, LexError, LexErrorInfo};
use crate::location::{LexerCursor, Location, Position};
use crate::table::{RuleID, SymbolID};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex as PatternRegex;
use regex_automata::{Anchored, Input, meta::Regex, util::syntax};
use smartstring::alias::String;
use std::cmp::Reverse;
use std::sync::Arc;

/// Name of the start condition every lexer begins in.
pub const INITIAL: &str = "INITIAL";

/// Pattern that only matches at the end of the input.
pub const EOF_PATTERN: &str = "<<EOF>>";

static BARE_WORD_RE: Lazy<PatternRegex> = Lazy::new(|| PatternRegex::new(r"^\w+$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerOptions {
    /// Enables `reject()`: every candidate is tried in turn with a full state
    /// snapshot taken before each trial.
    pub backtrack_lexer: bool,
    /// Longest match wins (ties go to the earliest rule) instead of the first
    /// rule that matches.
    pub flex: bool,
    /// Attach character-offset ranges to locations.
    pub ranges: bool,
    /// Maintain line/column locations.
    pub track_position: bool,
    /// Append `\b` to rules that are a bare word (`if`, `while`, ...).
    pub easy_keyword_rules: bool,
    pub case_insensitive: bool,
    /// Unrecognized input becomes the `error` terminal instead of failing.
    pub lexer_errors_are_recoverable: bool,
}

impl Default for LexerOptions {
    fn default() -> Self {
        Self {
            backtrack_lexer: false,
            flex: false,
            ranges: false,
            track_position: true,
            easy_keyword_rules: false,
            case_insensitive: false,
            lexer_errors_are_recoverable: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LexerRule {
    pub pattern: String,
    regex: Regex,
}

impl LexerRule {
    /// End offset of a match anchored at `offset`, if any.
    #[inline]
    fn match_at(&self, haystack: &str, offset: usize) -> Option<usize> {
        let input = Input::new(haystack).range(offset..).anchored(Anchored::Yes);
        self.regex.search(&input).map(|m| m.end())
    }
}

/// A start condition and the rules active while it is on top of the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub name: String,
    pub rules: Vec<RuleID>,
    /// Inclusive conditions also run rules declared without a condition.
    pub inclusive: bool,
}

#[derive(Debug, Clone)]
pub struct LexerData {
    rules: Vec<LexerRule>,
    conditions: IndexMap<String, Condition>,
    options: LexerOptions,
}

impl LexerData {
    pub fn builder(options: LexerOptions) -> LexerDataBuilder {
        LexerDataBuilder::new(options)
    }

    pub fn rules(&self) -> &[LexerRule] {
        &self.rules
    }

    pub fn condition(&self, name: &str) -> Option<&Condition> {
        self.conditions.get(name)
    }

    pub fn conditions(&self) -> impl Iterator<Item = &Condition> + '_ {
        self.conditions.values()
    }

    pub fn options(&self) -> &LexerOptions {
        &self.options
    }
}

/// Assembles [`LexerData`] from a rule list.
///
/// Rules declared with [`rule`](Self::rule) belong to every inclusive
/// condition; rules declared with [`rule_in`](Self::rule_in) belong to the
/// listed conditions, where `"*"` stands for all of them.
///
/// ```rust
/// # use lalrex::{LexerData, LexerOptions};
/// let data = LexerData::builder(LexerOptions::default())
///     .condition("COMMENT", false)
///     .rule(r"\s+")
///     .rule(r"/\*")
///     .rule_in(&["COMMENT"], r"\*/")
///     .rule_in(&["COMMENT"], r"(?s).")
///     .rule(r"[a-z]+")
///     .build()
///     .unwrap();
/// assert_eq!(data.condition("COMMENT").unwrap().rules.len(), 2);
/// assert_eq!(data.condition("INITIAL").unwrap().rules.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct LexerDataBuilder {
    options: LexerOptions,
    conditions: IndexMap<String, bool>,
    rules: Vec<(Vec<String>, String)>,
}

impl LexerDataBuilder {
    pub fn new(options: LexerOptions) -> Self {
        let mut conditions = IndexMap::new();
        conditions.insert(INITIAL.into(), true);
        Self {
            options,
            conditions,
            rules: Vec::new(),
        }
    }

    /// Declares a start condition (`%s` when inclusive, `%x` otherwise).
    pub fn condition(mut self, name: &str, inclusive: bool) -> Self {
        if name != INITIAL {
            self.conditions.insert(name.into(), inclusive);
        }
        self
    }

    pub fn rule(mut self, pattern: &str) -> Self {
        self.rules.push((Vec::new(), pattern.into()));
        self
    }

    pub fn rule_in(mut self, conditions: &[&str], pattern: &str) -> Self {
        self.rules.push((
            conditions.iter().map(|&c| c.into()).collect(),
            pattern.into(),
        ));
        self
    }

    fn compile(&self, index: usize, pattern: &str) -> Result<Regex, GrammarError> {
        let source = if pattern == EOF_PATTERN {
            r"\z".to_string()
        } else if self.options.easy_keyword_rules && BARE_WORD_RE.is_match(pattern) {
            format!(r"{pattern}\b")
        } else {
            pattern.to_string()
        };
        Regex::builder()
            .syntax(syntax::Config::new().case_insensitive(self.options.case_insensitive))
            .build(&source)
            .map_err(|e| GrammarError::InvalidRegex {
                rule: index,
                pattern: pattern.to_string(),
                message: e.to_string(),
            })
    }

    pub fn build(self) -> Result<LexerData, GrammarError> {
        let mut conditions: IndexMap<String, Condition> = self
            .conditions
            .iter()
            .map(|(name, &inclusive)| {
                (
                    name.clone(),
                    Condition {
                        name: name.clone(),
                        rules: Vec::new(),
                        inclusive,
                    },
                )
            })
            .collect();

        let mut rules = Vec::with_capacity(self.rules.len());
        for (index, (members, pattern)) in self.rules.iter().enumerate() {
            let regex = self.compile(index, pattern)?;
            rules.push(LexerRule {
                pattern: pattern.clone(),
                regex,
            });

            let id = RuleID(index);
            if members.is_empty() {
                for cond in conditions.values_mut().filter(|c| c.inclusive) {
                    cond.rules.push(id);
                }
            } else if members.iter().any(|m| m.as_str() == "*") {
                for cond in conditions.values_mut() {
                    cond.rules.push(id);
                }
            } else {
                for name in members {
                    conditions
                        .get_mut(name)
                        .ok_or_else(|| GrammarError::UnknownCondition(name.to_string()))?
                        .rules
                        .push(id);
                }
            }
        }

        Ok(LexerData {
            rules,
            conditions,
            options: self.options,
        })
    }
}

/// A lexed token: terminal symbol, text, location and 0-based line count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Token {
    pub symbol: SymbolID,
    pub text: String,
    pub loc: Location,
    pub line_no: usize,
}

/// Semantic actions of a lexer.
pub trait LexerDriver {
    type Context;
    type Error: Into<BoxError>;

    /// Runs the action of `rule` on the current match (`lexer.yytext()`).
    ///
    /// Returns the terminal to emit, or `None` to skip the match.
    fn action(
        &mut self,
        lexer: &mut Lexer,
        context: &mut Self::Context,
        rule: RuleID,
    ) -> Result<Option<SymbolID>, Self::Error>;

    /// Called when no rule matches the remaining input.
    ///
    /// `Ok(Some(symbol))` emits `symbol` for the offending character, `Ok(None)`
    /// skips it. If the hook leaves the cursor and the condition stack alone,
    /// the lexer consumes one character by itself so scanning always makes
    /// progress.
    fn lex_error(
        &mut self,
        lexer: &mut Lexer,
        context: &mut Self::Context,
        info: &LexErrorInfo,
    ) -> Result<Option<SymbolID>, LexError> {
        let _ = (lexer, context);
        if info.recoverable {
            log::warn!("{}", info.message);
            Ok(Some(SymbolID::ERROR))
        } else {
            Err(LexError::Unrecognized(Box::new(info.clone())))
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LexerStats {
    pub matches: usize,
    pub rejects: usize,
    pub unputs: usize,
    pub tokens: usize,
}

#[derive(Debug, Clone)]
struct Snapshot {
    buffer: Arc<str>,
    cursor: LexerCursor,
    yytext: std::string::String,
    yylloc: Location,
    conditions: Vec<String>,
    more: bool,
    done: bool,
}

enum Outcome {
    Token(Token),
    Skip,
    Rejected,
}

enum Scan {
    Token(Token),
    Skip,
    Unmatched(Box<LexErrorInfo>),
}

/// The lexer engine.
#[derive(Debug, Clone)]
pub struct Lexer {
    data: Arc<LexerData>,
    buffer: Arc<str>,
    cursor: LexerCursor,
    yytext: std::string::String,
    yylloc: Location,
    conditions: Vec<String>,
    cache: Option<usize>,
    more: bool,
    rejected: bool,
    done: bool,
    stats: LexerStats,
}

impl Lexer {
    pub fn new(data: Arc<LexerData>) -> Self {
        let mut lexer = Self {
            data,
            buffer: Arc::from(""),
            cursor: LexerCursor::new(),
            yytext: std::string::String::new(),
            yylloc: Location::default(),
            conditions: Vec::new(),
            cache: None,
            more: false,
            rejected: false,
            done: false,
            stats: LexerStats::default(),
        };
        lexer.set_input("");
        lexer
    }

    /// Resets the lexer onto a new input buffer.
    pub fn set_input(&mut self, input: &str) {
        self.buffer = Arc::from(input);
        self.cursor = LexerCursor::new();
        self.yytext.clear();
        self.yylloc = self.here();
        self.conditions.clear();
        self.conditions.push(INITIAL.into());
        self.cache = None;
        self.more = false;
        self.rejected = false;
        self.done = false;
    }

    pub fn data(&self) -> &Arc<LexerData> {
        &self.data
    }

    pub fn options(&self) -> &LexerOptions {
        &self.data.options
    }

    pub fn stats(&self) -> LexerStats {
        self.stats.clone()
    }

    /// Current input buffer, including any text handed back by `unput`.
    pub fn source(&self) -> &str {
        &self.buffer
    }

    /// Byte offset of the cursor.
    pub fn offset(&self) -> usize {
        self.cursor.offset
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn yytext(&self) -> &str {
        &self.yytext
    }

    /// Replaces the text the pending token will carry.
    pub fn set_yytext(&mut self, text: &str) {
        self.yytext.clear();
        self.yytext.push_str(text);
    }

    /// Length of `yytext` in characters.
    pub fn yyleng(&self) -> usize {
        self.yytext.chars().count()
    }

    /// 0-based number of line breaks consumed so far.
    pub fn yylineno(&self) -> usize {
        self.cursor.line_no()
    }

    pub fn yylloc(&self) -> &Location {
        &self.yylloc
    }

    pub fn position(&self) -> Position {
        self.cursor.position
    }

    /// An empty location at the cursor.
    fn here(&self) -> Location {
        let c = self.cursor.char_offset;
        Location {
            start: self.cursor.position,
            end: self.cursor.position,
            range: self.data.options.ranges.then_some((c, c)),
        }
    }

    /// Returns the next token.
    ///
    /// Once the input is exhausted every call returns the `$end` token.
    pub fn lex<D: LexerDriver>(
        &mut self,
        driver: &mut D,
        context: &mut D::Context,
    ) -> Result<Token, LexError> {
        loop {
            match self.scan(driver, context)? {
                Scan::Token(token) => {
                    self.stats.tokens += 1;
                    log::trace!(
                        "TOKEN: symbol={}, text={:?}, loc={}",
                        token.symbol,
                        token.text,
                        token.loc.display()
                    );
                    return Ok(token);
                }
                Scan::Skip => {}
                Scan::Unmatched(info) => {
                    log::debug!("unrecognized input at offset {}", self.cursor.offset);
                    let offset = self.cursor.offset;
                    let buffer = Arc::clone(&self.buffer);
                    let result = driver.lex_error(self, context, &info);
                    if self.cursor.offset == offset
                        && Arc::ptr_eq(&buffer, &self.buffer)
                        && self.cache.is_some()
                    {
                        if !self.more {
                            self.yytext.clear();
                        }
                        self.yylloc = self.here();
                        self.input();
                    }
                    if let Some(symbol) = result? {
                        self.stats.tokens += 1;
                        return Ok(self.token(symbol));
                    }
                }
            }
        }
    }

    fn scan<D: LexerDriver>(
        &mut self,
        driver: &mut D,
        context: &mut D::Context,
    ) -> Result<Scan, LexError> {
        if self.done {
            return Ok(Scan::Token(self.eof_token()));
        }
        if self.cursor.offset >= self.buffer.len() {
            self.done = true;
        }
        if !self.more {
            self.yytext.clear();
        }

        let data = Arc::clone(&self.data);
        let condition = self.current_condition(&data);
        let options = &data.options;

        if options.backtrack_lexer {
            let mut candidates: Vec<(RuleID, usize)> = condition
                .rules
                .iter()
                .filter_map(|&r| {
                    data.rules[r.0]
                        .match_at(&self.buffer, self.cursor.offset)
                        .map(|end| (r, end))
                })
                .collect();
            if options.flex {
                candidates.sort_by_key(|&(_, end)| Reverse(end));
            }
            for (rule, end) in candidates {
                match self.test_match(driver, context, rule, end)? {
                    Outcome::Token(t) => return Ok(Scan::Token(t)),
                    Outcome::Skip => return Ok(Scan::Skip),
                    Outcome::Rejected => continue,
                }
            }
        } else {
            let mut best: Option<(RuleID, usize)> = None;
            for &rule in &condition.rules {
                if let Some(end) = data.rules[rule.0].match_at(&self.buffer, self.cursor.offset) {
                    if best.is_none_or(|(_, e)| end > e) {
                        best = Some((rule, end));
                    }
                    if !options.flex {
                        break;
                    }
                }
            }
            if let Some((rule, end)) = best {
                return match self.test_match(driver, context, rule, end)? {
                    Outcome::Token(t) => Ok(Scan::Token(t)),
                    Outcome::Skip | Outcome::Rejected => Ok(Scan::Skip),
                };
            }
        }

        if self.cursor.offset >= self.buffer.len() {
            self.done = true;
            return Ok(Scan::Token(self.eof_token()));
        }
        Ok(Scan::Unmatched(Box::new(self.error_info())))
    }

    /// Consumes the match `[offset, end)` and runs the rule's action.
    fn test_match<D: LexerDriver>(
        &mut self,
        driver: &mut D,
        context: &mut D::Context,
        rule: RuleID,
        end: usize,
    ) -> Result<Outcome, LexError> {
        let snapshot = self.data.options.backtrack_lexer.then(|| self.snapshot());
        let start = self.cursor.offset;
        let start_pos = self.cursor.position;
        let start_char = self.cursor.char_offset;

        self.yytext.push_str(&self.buffer[start..end]);
        self.cursor.advance(&self.buffer, end);
        if self.data.options.track_position {
            let first = if self.more {
                self.yylloc.start
            } else {
                start_pos
            };
            let range = self.data.options.ranges.then(|| {
                let from = match (self.more, self.yylloc.range) {
                    (true, Some((r0, _))) => r0,
                    _ => start_char,
                };
                (from, self.cursor.char_offset)
            });
            self.yylloc = Location {
                start: first,
                end: self.cursor.position,
                range,
            };
        }
        self.more = false;
        self.rejected = false;
        self.stats.matches += 1;
        log::trace!(
            "MATCHED: condition={}, rule={}, pattern={:?}, text={:?}",
            self.top_state(0),
            rule,
            self.data.rules[rule.0].pattern,
            self.yytext
        );

        let result = driver
            .action(self, context, rule)
            .map_err(|e| LexError::Action {
                rule,
                source: e.into(),
            })?;

        if self.rejected {
            if let Some(s) = snapshot {
                self.restore(s);
            }
            self.rejected = false;
            self.stats.rejects += 1;
            log::trace!("REJECTED: rule={}", rule);
            return Ok(Outcome::Rejected);
        }
        if self.done && self.cursor.offset < self.buffer.len() {
            self.done = false;
        }

        match result {
            Some(symbol) => Ok(Outcome::Token(self.token(symbol))),
            None => {
                if end == start
                    && self.cursor.offset == start
                    && self.cache.is_some()
                    && !self.done
                {
                    return Err(LexError::NoProgress {
                        rule,
                        offset: start,
                    });
                }
                Ok(Outcome::Skip)
            }
        }
    }

    fn current_condition<'d>(&mut self, data: &'d LexerData) -> &'d Condition {
        let index = match self.cache {
            Some(i) => i,
            None => {
                let i = data.conditions.get_index_of(self.top_state(0)).unwrap_or(0);
                self.cache = Some(i);
                i
            }
        };
        &data.conditions[index]
    }

    fn token(&self, symbol: SymbolID) -> Token {
        Token {
            symbol,
            text: self.yytext.as_str().into(),
            loc: self.yylloc,
            line_no: self.cursor.line_no(),
        }
    }

    fn eof_token(&self) -> Token {
        Token {
            symbol: SymbolID::EOF,
            text: String::new(),
            loc: self.here(),
            line_no: self.cursor.line_no(),
        }
    }

    fn error_info(&self) -> LexErrorInfo {
        let mut loc = self.here();
        let unexpected = self.buffer[self.cursor.offset..].chars().next();
        if unexpected.is_some_and(|c| c != '\n' && c != '\r') {
            loc.end.column += 1;
            loc.range = loc.range.map(|(r0, r1)| (r0, r1 + 1));
        }
        LexErrorInfo {
            message: format!(
                "Lexical error on line {}: Unrecognized text.\n{}",
                self.cursor.line_no() + 1,
                self.show_position()
            ),
            text: self.yytext.clone(),
            unexpected,
            line: self.cursor.line_no(),
            loc,
            recoverable: self.data.options.lexer_errors_are_recoverable,
            condition: self.top_state(0).to_string(),
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            buffer: Arc::clone(&self.buffer),
            cursor: self.cursor.clone(),
            yytext: self.yytext.clone(),
            yylloc: self.yylloc,
            conditions: self.conditions.clone(),
            more: self.more,
            done: self.done,
        }
    }

    fn restore(&mut self, s: Snapshot) {
        self.buffer = s.buffer;
        self.cursor = s.cursor;
        self.yytext = s.yytext;
        self.yylloc = s.yylloc;
        if self.conditions != s.conditions {
            self.conditions = s.conditions;
            self.cache = None;
        }
        self.more = s.more;
        self.done = s.done;
    }

    /// Pushes a start condition.
    pub fn push_state(&mut self, condition: &str) -> Result<(), GrammarError> {
        if self.data.conditions.get(condition).is_none() {
            return Err(GrammarError::UnknownCondition(condition.to_string()));
        }
        self.conditions.push(condition.into());
        self.cache = None;
        Ok(())
    }

    /// Activates a start condition; same as [`push_state`](Self::push_state).
    pub fn begin(&mut self, condition: &str) -> Result<(), GrammarError> {
        self.push_state(condition)
    }

    /// Pops the active condition and returns it. The bottom condition is
    /// never popped; it is returned as-is.
    pub fn pop_state(&mut self) -> String {
        self.cache = None;
        if self.conditions.len() > 1 {
            self.conditions.pop().unwrap_or_else(|| INITIAL.into())
        } else {
            self.conditions
                .first()
                .cloned()
                .unwrap_or_else(|| INITIAL.into())
        }
    }

    /// The condition `n` levels below the top; `INITIAL` when out of range.
    pub fn top_state(&self, n: usize) -> &str {
        self.conditions
            .len()
            .checked_sub(n + 1)
            .and_then(|i| self.conditions.get(i))
            .map(String::as_str)
            .unwrap_or(INITIAL)
    }

    pub fn state_stack_size(&self) -> usize {
        self.conditions.len()
    }

    /// Keeps the current match: the next match is appended to `yytext`.
    pub fn more(&mut self) {
        self.more = true;
    }

    /// Rejects the current match; the lexer restores its state from before
    /// the match and tries the next candidate rule.
    pub fn reject(&mut self) -> Result<(), GrammarError> {
        if !self.data.options.backtrack_lexer {
            return Err(GrammarError::RejectWithoutBacktrack);
        }
        self.rejected = true;
        Ok(())
    }

    /// Keeps the first `n` characters of the match and hands the rest back
    /// to the input.
    pub fn less(&mut self, n: usize) {
        let split = self
            .yytext
            .char_indices()
            .nth(n)
            .map_or(self.yytext.len(), |(i, _)| i);
        let tail = self.yytext[split..].to_string();
        self.unput(&tail);
    }

    /// Pushes `text` back in front of the remaining input.
    ///
    /// The cursor retreats over as many consumed characters as `text` has,
    /// so handing back exactly the matched text restores the location state
    /// from before the match. Different text replaces the consumed tail.
    pub fn unput(&mut self, text: &str) {
        let count = text.chars().count();
        let end = self.cursor.offset;
        let start = self.buffer[..end]
            .char_indices()
            .rev()
            .nth(count.saturating_sub(1))
            .map_or(0, |(i, _)| i);
        let start = if count == 0 { end } else { start };

        self.cursor.retreat(&self.buffer, start);
        if &self.buffer[start..end] != text {
            let mut spliced = std::string::String::with_capacity(
                self.buffer.len() - (end - start) + text.len(),
            );
            spliced.push_str(&self.buffer[..start]);
            spliced.push_str(text);
            spliced.push_str(&self.buffer[end..]);
            self.buffer = Arc::from(spliced);
        }

        let keep = self.yytext.chars().count().saturating_sub(count);
        let cut = self
            .yytext
            .char_indices()
            .nth(keep)
            .map_or(self.yytext.len(), |(i, _)| i);
        self.yytext.truncate(cut);

        if self.data.options.track_position {
            self.yylloc.end = self.cursor.position;
            if self.yylloc.start > self.yylloc.end {
                self.yylloc.start = self.yylloc.end;
            }
            let c = self.cursor.char_offset;
            self.yylloc.range = self.yylloc.range.map(|(r0, _)| (r0.min(c), c));
        }
        self.done = false;
        self.stats.unputs += 1;
    }

    /// Consumes one character (`\r\n` counts as one) and appends it to the
    /// match.
    pub fn input(&mut self) -> Option<String> {
        let offset = self.cursor.offset;
        let c = self.buffer[offset..].chars().next()?;
        let mut end = offset + c.len_utf8();
        if c == '\r' && self.buffer[end..].starts_with('\n') {
            end += 1;
        }
        let text: String = self.buffer[offset..end].into();
        self.yytext.push_str(&text);
        self.cursor.advance(&self.buffer, end);
        if self.data.options.track_position {
            self.yylloc.end = self.cursor.position;
            let c = self.cursor.char_offset;
            self.yylloc.range = self.yylloc.range.map(|(r0, _)| (r0, c));
        }
        Some(text)
    }

    fn match_start(&self) -> usize {
        let start = self.cursor.offset.saturating_sub(self.yytext.len());
        if self.buffer.is_char_boundary(start) && self.buffer[start..].starts_with(&self.yytext) {
            start
        } else {
            self.cursor.offset
        }
    }

    /// Up to 20 characters of input before the current match.
    pub fn past_input(&self) -> std::string::String {
        let past = &self.buffer[..self.match_start()];
        let count = past.chars().count();
        let mut s = std::string::String::new();
        if count > 20 {
            s.push_str("...");
        }
        s.extend(past.chars().skip(count.saturating_sub(20)));
        s.replace(['\r', '\n'], "")
    }

    /// The current match followed by upcoming input, up to 20 characters.
    pub fn upcoming_input(&self) -> std::string::String {
        let next = &self.buffer[self.match_start()..];
        let mut s: std::string::String = next.chars().take(20).collect();
        if next.chars().nth(20).is_some() {
            s.push_str("...");
        }
        s.replace(['\r', '\n'], "")
    }

    /// Excerpt around the cursor with a caret under the current match.
    pub fn show_position(&self) -> std::string::String {
        diagnostics::show_position(&self.past_input(), &self.upcoming_input())
    }

    /// Source window around `loc`; see [`diagnostics::pretty_print_range`].
    pub fn pretty_print_range(&self, loc: &Location) -> std::string::String {
        diagnostics::pretty_print_range(&self.buffer, loc, 3, 1)
    }
}
