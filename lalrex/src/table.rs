//! Static parse tables.
//!
//! A [`GrammarTable`] is the immutable output of an offline LALR(1) grammar
//! compiler: the symbol map, the production list, the action/goto table, the
//! default-action shortcut map and any unresolved conflict cells. The runtime
//! only reads it, so one table is shared (behind an `Arc`) by every parse.
//!
//! Tables are assembled with [`GrammarTableBuilder`], which resolves symbol
//! names and checks production references once, at construction time.

use crate::error::GrammarError;
use indexmap::IndexMap;
use smartstring::alias::String;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

macro_rules! id_type {
    ( $( $(#[$meta:meta])* $Name:ident ),+ $(,)? ) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
            pub struct $Name(pub usize);

            impl From<$Name> for usize {
                fn from(id: $Name) -> Self {
                    id.0
                }
            }

            impl From<usize> for $Name {
                fn from(id: usize) -> Self {
                    Self(id)
                }
            }

            impl fmt::Display for $Name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }
        )+
    };
}

id_type! {
    /// Terminal or nonterminal symbol number.
    SymbolID,
    /// LALR automaton state number.
    StateID,
    /// Production number; production 0 is the augmented `$accept` rule.
    ProdID,
    /// Lexer rule number.
    RuleID,
    /// Index of a conflict cell holding several actions.
    AmbigID,
}

impl SymbolID {
    /// `$accept`, the augmented start symbol.
    pub const ACCEPT: SymbolID = SymbolID(0);
    /// `$end`, the end-of-input terminal.
    pub const EOF: SymbolID = SymbolID(1);
    /// `error`, the reserved error-recovery terminal.
    pub const ERROR: SymbolID = SymbolID(2);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParserAction {
    Error,
    Accept,
    Shift(StateID),
    Reduce(ProdID),
    Ambig(AmbigID),
    Goto(StateID),
}

/// A grammar rule reduced to what the engine needs: its left-hand side and
/// the length of its right-hand side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Production {
    pub lhs: SymbolID,
    pub len: usize,
}

#[derive(Debug, Clone)]
pub struct GrammarTable {
    symbols: IndexMap<String, SymbolID>,
    names: Vec<String>,
    terminal_count: usize,
    descriptions: HashMap<SymbolID, String>,
    productions: Vec<Production>,
    states: Vec<BTreeMap<SymbolID, ParserAction>>,
    default_actions: HashMap<StateID, ParserAction>,
    ambigs: Vec<Vec<ParserAction>>,
}

impl GrammarTable {
    pub fn builder() -> GrammarTableBuilder {
        GrammarTableBuilder::new()
    }

    /// Looks up the action for `symbol` in `state`; missing cells are
    /// [`ParserAction::Error`].
    #[inline]
    pub fn action(&self, state: StateID, symbol: SymbolID) -> ParserAction {
        self.states
            .get(state.0)
            .and_then(|row| row.get(&symbol))
            .copied()
            .unwrap_or(ParserAction::Error)
    }

    /// The whole row of `state`, ordered by symbol number.
    pub fn row(&self, state: StateID) -> impl Iterator<Item = (SymbolID, ParserAction)> + '_ {
        self.states
            .get(state.0)
            .into_iter()
            .flat_map(|row| row.iter().map(|(s, a)| (*s, *a)))
    }

    #[inline]
    pub fn default_action(&self, state: StateID) -> Option<ParserAction> {
        self.default_actions.get(&state).copied()
    }

    #[inline]
    pub fn has_state(&self, state: StateID) -> bool {
        state.0 < self.states.len()
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn production(&self, prod: ProdID) -> Option<Production> {
        self.productions.get(prod.0).copied()
    }

    pub fn lookup_ambig(&self, ambig: AmbigID) -> &[ParserAction] {
        self.ambigs.get(ambig.0).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the number of `name`, if the grammar knows it.
    pub fn symbol_id(&self, name: &str) -> Option<SymbolID> {
        self.symbols.get(name).copied()
    }

    pub fn symbol_name(&self, symbol: SymbolID) -> Option<&str> {
        self.names.get(symbol.0).map(String::as_str)
    }

    /// Terminals are numbered before nonterminals.
    #[inline]
    pub fn is_terminal(&self, symbol: SymbolID) -> bool {
        symbol != SymbolID::ACCEPT && symbol.0 < self.terminal_count
    }

    /// Human-readable description registered for a terminal, if any.
    pub fn description(&self, symbol: SymbolID) -> Option<&str> {
        self.descriptions.get(&symbol).map(String::as_str)
    }
}

#[derive(Debug, Clone)]
enum Entry {
    Shift(usize, String, usize),
    Reduce(usize, String, usize),
    Goto(usize, String, usize),
    Accept(usize),
    Conflict(usize, String, Vec<EntryAction>),
    DefaultReduce(usize, usize),
}

/// A raw action inside a conflict cell, before symbol resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryAction {
    Shift(usize),
    Reduce(usize),
}

/// Assembles a [`GrammarTable`] from compiler output.
///
/// Symbols `$accept`, `$end` and `error` are pre-registered as 0, 1 and 2.
/// Terminals must be registered before nonterminals; productions are numbered
/// from 1 in registration order (0 is the augmented `$accept` rule).
///
/// ```rust
/// # use lalrex::GrammarTable;
/// // E -> E '+' ID | ID
/// let table = GrammarTable::builder()
///     .terminals(&["'+'", "ID"])
///     .nonterminals(&["E"])
///     .production("E", 3)
///     .production("E", 1)
///     .shift(0, "ID", 1)
///     .goto(0, "E", 2)
///     .default_reduce(1, 2)
///     .accept(2)
///     .shift(2, "'+'", 3)
///     .shift(3, "ID", 4)
///     .default_reduce(4, 1)
///     .build()
///     .unwrap();
/// assert_eq!(table.state_count(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct GrammarTableBuilder {
    symbols: IndexMap<String, SymbolID>,
    terminal_count: usize,
    nonterminals_started: bool,
    descriptions: Vec<(String, String)>,
    productions: Vec<(String, usize)>,
    entries: Vec<Entry>,
    derive_defaults: bool,
    error: Option<GrammarError>,
}

impl Default for GrammarTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GrammarTableBuilder {
    pub fn new() -> Self {
        let mut symbols = IndexMap::new();
        symbols.insert("$accept".into(), SymbolID::ACCEPT);
        symbols.insert("$end".into(), SymbolID::EOF);
        symbols.insert("error".into(), SymbolID::ERROR);
        Self {
            symbols,
            terminal_count: 3,
            nonterminals_started: false,
            descriptions: Vec::new(),
            productions: Vec::new(),
            entries: Vec::new(),
            derive_defaults: false,
            error: None,
        }
    }

    fn add_symbol(&mut self, name: &str) {
        if self.symbols.contains_key(name) {
            self.error
                .get_or_insert(GrammarError::DuplicateSymbol(name.into()));
            return;
        }
        let id = SymbolID(self.symbols.len());
        self.symbols.insert(name.into(), id);
    }

    pub fn terminal(mut self, name: &str) -> Self {
        if self.nonterminals_started {
            self.error
                .get_or_insert(GrammarError::TerminalAfterNonterminal(name.into()));
        }
        self.add_symbol(name);
        self.terminal_count = self.symbols.len();
        self
    }

    pub fn terminals(self, names: &[&str]) -> Self {
        names.iter().fold(self, |b, n| b.terminal(n))
    }

    pub fn nonterminal(mut self, name: &str) -> Self {
        self.nonterminals_started = true;
        self.add_symbol(name);
        self
    }

    pub fn nonterminals(self, names: &[&str]) -> Self {
        names.iter().fold(self, |b, n| b.nonterminal(n))
    }

    /// Registers a human-readable description for a terminal (used in
    /// "Expecting ..." messages instead of the quoted name).
    pub fn describe(mut self, terminal: &str, description: &str) -> Self {
        self.descriptions
            .push((terminal.into(), description.into()));
        self
    }

    /// Appends production `lhs -> <len symbols>`.
    pub fn production(mut self, lhs: &str, len: usize) -> Self {
        self.productions.push((lhs.into(), len));
        self
    }

    pub fn shift(mut self, state: usize, symbol: &str, to: usize) -> Self {
        self.entries.push(Entry::Shift(state, symbol.into(), to));
        self
    }

    pub fn reduce(mut self, state: usize, symbol: &str, prod: usize) -> Self {
        self.entries.push(Entry::Reduce(state, symbol.into(), prod));
        self
    }

    /// Registers `prod` as the reduction for every symbol in `symbols`.
    pub fn reduce_on(self, state: usize, symbols: &[&str], prod: usize) -> Self {
        symbols
            .iter()
            .fold(self, |b, s| b.reduce(state, s, prod))
    }

    pub fn goto(mut self, state: usize, nonterminal: &str, to: usize) -> Self {
        self.entries.push(Entry::Goto(state, nonterminal.into(), to));
        self
    }

    /// Accept on `$end` in `state`.
    pub fn accept(mut self, state: usize) -> Self {
        self.entries.push(Entry::Accept(state));
        self
    }

    /// Records a cell with several actions the compiler could not resolve.
    pub fn conflict(mut self, state: usize, symbol: &str, actions: &[EntryAction]) -> Self {
        self.entries
            .push(Entry::Conflict(state, symbol.into(), actions.to_vec()));
        self
    }

    /// Reduce by `prod` in `state` without consulting the lookahead.
    pub fn default_reduce(mut self, state: usize, prod: usize) -> Self {
        self.entries.push(Entry::DefaultReduce(state, prod));
        self
    }

    /// Also derive default actions for states whose row is one single
    /// reduction repeated over all lookaheads.
    pub fn derive_default_actions(mut self, yes: bool) -> Self {
        self.derive_defaults = yes;
        self
    }

    fn resolve(&self, name: &str) -> Result<SymbolID, GrammarError> {
        self.symbols
            .get(name)
            .copied()
            .ok_or_else(|| GrammarError::UnknownSymbol(name.into()))
    }

    fn check_prod(&self, prod: usize) -> Result<ProdID, GrammarError> {
        if prod == 0 || prod > self.productions.len() {
            return Err(GrammarError::UnknownProduction(prod));
        }
        Ok(ProdID(prod))
    }

    pub fn build(self) -> Result<GrammarTable, GrammarError> {
        if let Some(e) = self.error {
            return Err(e);
        }

        let mut productions = vec![Production {
            lhs: SymbolID::ACCEPT,
            len: 1,
        }];
        for (lhs, len) in &self.productions {
            let lhs_id = self.resolve(lhs)?;
            if lhs_id.0 < self.terminal_count {
                return Err(GrammarError::TerminalProduction(lhs.to_string()));
            }
            productions.push(Production {
                lhs: lhs_id,
                len: *len,
            });
        }

        let mut states: Vec<BTreeMap<SymbolID, ParserAction>> = Vec::new();
        let mut default_actions = HashMap::new();
        let mut ambigs = Vec::new();
        fn row(
            states: &mut Vec<BTreeMap<SymbolID, ParserAction>>,
            state: usize,
        ) -> &mut BTreeMap<SymbolID, ParserAction> {
            if states.len() <= state {
                states.resize_with(state + 1, BTreeMap::new);
            }
            &mut states[state]
        }

        for entry in &self.entries {
            match entry {
                Entry::Shift(state, symbol, to) => {
                    let symbol = self.resolve(symbol)?;
                    row(&mut states, *state).insert(symbol, ParserAction::Shift(StateID(*to)));
                }
                Entry::Reduce(state, symbol, prod) => {
                    let symbol = self.resolve(symbol)?;
                    let prod = self.check_prod(*prod)?;
                    row(&mut states, *state).insert(symbol, ParserAction::Reduce(prod));
                }
                Entry::Goto(state, symbol, to) => {
                    let id = self.resolve(symbol)?;
                    if id.0 < self.terminal_count {
                        return Err(GrammarError::GotoOnTerminal(symbol.to_string()));
                    }
                    row(&mut states, *state).insert(id, ParserAction::Goto(StateID(*to)));
                }
                Entry::Accept(state) => {
                    row(&mut states, *state).insert(SymbolID::EOF, ParserAction::Accept);
                }
                Entry::Conflict(state, symbol, actions) => {
                    let symbol = self.resolve(symbol)?;
                    let mut cell = Vec::with_capacity(actions.len());
                    for a in actions {
                        cell.push(match *a {
                            EntryAction::Shift(to) => ParserAction::Shift(StateID(to)),
                            EntryAction::Reduce(p) => ParserAction::Reduce(self.check_prod(p)?),
                        });
                    }
                    let ambig = AmbigID(ambigs.len());
                    ambigs.push(cell);
                    row(&mut states, *state).insert(symbol, ParserAction::Ambig(ambig));
                }
                Entry::DefaultReduce(state, prod) => {
                    let prod = self.check_prod(*prod)?;
                    row(&mut states, *state);
                    default_actions.insert(StateID(*state), ParserAction::Reduce(prod));
                }
            }
        }

        if self.derive_defaults {
            for (i, r) in states.iter().enumerate() {
                let mut actions = r.values();
                if let Some(first @ ParserAction::Reduce(_)) = actions.next() {
                    if actions.all(|a| a == first) {
                        default_actions.entry(StateID(i)).or_insert(*first);
                    }
                }
            }
        }

        let mut descriptions = HashMap::new();
        for (terminal, descr) in &self.descriptions {
            descriptions.insert(self.resolve(terminal)?, descr.clone());
        }

        let names = self.symbols.keys().cloned().collect();

        Ok(GrammarTable {
            symbols: self.symbols,
            names,
            terminal_count: self.terminal_count,
            descriptions,
            productions,
            states,
            default_actions,
            ambigs,
        })
    }
}
