//! Parse stacks and error-recovery bookkeeping.

use crate::lexer::Token;
use crate::location::Location;
use crate::table::{StateID, SymbolID};

/// The four parse stacks, kept in lock-step.
///
/// The stack pointer `sp` is the common length of all four vectors; every
/// push and truncation goes through this type so the lengths never diverge.
#[derive(Debug, Clone)]
pub struct ParseStacks<V> {
    symbols: Vec<SymbolID>,
    states: Vec<StateID>,
    values: Vec<V>,
    locations: Vec<Location>,
}

impl<V> Default for ParseStacks<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ParseStacks<V> {
    pub fn new() -> Self {
        Self {
            symbols: Vec::new(),
            states: Vec::new(),
            values: Vec::new(),
            locations: Vec::new(),
        }
    }

    /// The stack pointer.
    #[inline]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn push(&mut self, symbol: SymbolID, state: StateID, value: V, location: Location) {
        self.symbols.push(symbol);
        self.states.push(state);
        self.values.push(value);
        self.locations.push(location);
    }

    #[inline]
    pub fn top_state(&self) -> Option<StateID> {
        self.states.last().copied()
    }

    pub fn symbols(&self) -> &[SymbolID] {
        &self.symbols
    }

    pub fn states(&self) -> &[StateID] {
        &self.states
    }

    pub fn values(&self) -> &[V] {
        &self.values
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// The top `n` value and location slots, as seen by a reduction.
    pub fn window_mut(&mut self, n: usize) -> (&mut [V], &[Location]) {
        let base = self.len() - n;
        (&mut self.values[base..], &self.locations[base..])
    }

    /// Cuts all four stacks down to `sp`.
    pub fn truncate(&mut self, sp: usize) {
        self.symbols.truncate(sp);
        self.states.truncate(sp);
        self.values.truncate(sp);
        self.locations.truncate(sp);
    }

    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Takes the value on top of the stack.
    pub fn take_top_value(&mut self) -> Option<V>
    where
        V: Default,
    {
        self.values.last_mut().map(std::mem::take)
    }
}

/// Bookkeeping for one error-recovery episode.
///
/// Stack slots popped while searching for a state that handles `error`, the
/// offending lookahead and the tokens discarded while resynchronizing are
/// moved here, so the live stacks only ever hold what the automaton sees.
///
/// - `stack_pointer`: stack pointer when the error was detected.
/// - `base_pointer`: stack pointer after popping down to the recovery state.
/// - `info_stack_pointer`: number of entries recorded in this episode.
#[derive(Debug, Clone)]
pub struct RecoveryTrack<V> {
    pub stack_pointer: usize,
    pub base_pointer: usize,
    pub info_stack_pointer: usize,
    pub symbols: Vec<SymbolID>,
    pub states: Vec<StateID>,
    pub values: Vec<V>,
    pub locations: Vec<Location>,
    pub offending: Option<Token>,
    pub discarded: Vec<Token>,
}

impl<V> Default for RecoveryTrack<V> {
    fn default() -> Self {
        Self {
            stack_pointer: 0,
            base_pointer: 0,
            info_stack_pointer: 0,
            symbols: Vec::new(),
            states: Vec::new(),
            values: Vec::new(),
            locations: Vec::new(),
            offending: None,
            discarded: Vec::new(),
        }
    }
}

impl<V> RecoveryTrack<V> {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Starts an episode for an `error` token the lexer produced itself.
    /// Nothing is popped; `token` becomes the offending token.
    pub fn begin(&mut self, sp: usize, token: &Token) {
        self.clear();
        self.stack_pointer = sp;
        self.base_pointer = sp;
        self.offending = Some(token.clone());
        self.info_stack_pointer = 1;
    }

    /// Pops `depth` slots off `stacks` into the track and records the
    /// lookahead that triggered the error. The first call of an episode also
    /// sets `stack_pointer`.
    pub fn pop_from(&mut self, stacks: &mut ParseStacks<V>, depth: usize, offending: &Token) {
        let sp = stacks.len();
        if self.info_stack_pointer == 0 {
            self.stack_pointer = sp;
        }
        self.base_pointer = sp - depth;
        let base = self.base_pointer;
        self.symbols.extend(stacks.symbols.drain(base..));
        self.states.extend(stacks.states.drain(base..));
        self.values.extend(stacks.values.drain(base..));
        self.locations.extend(stacks.locations.drain(base..));
        if self.offending.is_none() {
            self.offending = Some(offending.clone());
        }
        self.info_stack_pointer += depth + 1;
    }

    /// Records a lookahead thrown away while recovering. The offending token
    /// itself is not recorded twice.
    pub fn discard(&mut self, token: Token) {
        if self.offending.as_ref() != Some(&token) {
            self.discarded.push(token);
        }
        self.info_stack_pointer += 1;
    }

    /// The source span covered by the popped slots and the offending token.
    pub fn location(&self) -> Option<Location> {
        self.locations
            .iter()
            .chain(self.offending.iter().map(|t| &t.loc))
            .copied()
            .reduce(|a, b| a.merge(&b))
    }

    /// Text of the offending token and everything discarded after it.
    pub fn text(&self) -> String {
        self.offending
            .iter()
            .chain(self.discarded.iter())
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loc;

    fn token(symbol: usize, text: &str, loc: Location) -> Token {
        Token {
            symbol: SymbolID(symbol),
            text: text.into(),
            loc,
            line_no: 0,
        }
    }

    fn filled() -> ParseStacks<i32> {
        let mut s = ParseStacks::new();
        s.push(SymbolID(0), StateID(0), 0, loc!(1, 0, 1, 0));
        s.push(SymbolID(4), StateID(1), 10, loc!(1, 0, 1, 1));
        s.push(SymbolID(3), StateID(3), 20, loc!(1, 1, 1, 2));
        s
    }

    #[test]
    fn stacks_move_in_lock_step() {
        let mut s = filled();
        assert_eq!(s.len(), 3);
        assert_eq!(s.top_state(), Some(StateID(3)));
        s.truncate(1);
        assert_eq!(s.symbols().len(), 1);
        assert_eq!(s.values(), &[0]);
        assert_eq!(s.locations().len(), 1);
        s.clear();
        assert!(s.is_empty());
    }

    #[test]
    fn window_exposes_top_slots() {
        let mut s = filled();
        let (values, locations) = s.window_mut(2);
        values[0] += 1;
        assert_eq!(values, &[11, 20]);
        assert_eq!(locations[1], loc!(1, 1, 1, 2));
        assert_eq!(s.take_top_value(), Some(20));
        assert_eq!(s.values(), &[0, 11, 0]);
    }

    #[test]
    fn recovery_track_keeps_popped_slots() {
        let mut s = filled();
        let mut track = RecoveryTrack::default();
        let bad = token(5, "x", loc!(1, 3, 1, 4));
        track.pop_from(&mut s, 2, &bad);
        assert_eq!(s.len(), 1);
        assert_eq!(track.stack_pointer, 3);
        assert_eq!(track.base_pointer, 1);
        assert_eq!(track.info_stack_pointer, 3);
        assert_eq!(track.values, vec![10, 20]);
        assert_eq!(track.location(), Some(loc!(1, 0, 1, 4)));

        track.discard(bad.clone());
        track.discard(token(5, "y", loc!(1, 5, 1, 6)));
        assert_eq!(track.info_stack_pointer, 5);
        assert_eq!(track.text(), "x y");

        track.clear();
        assert!(track.offending.is_none());
        assert_eq!(track.location(), None);
    }

    #[test]
    fn lexed_error_starts_an_episode() {
        let s = filled();
        let mut track: RecoveryTrack<i32> = RecoveryTrack::default();
        track.discard(token(5, "stale", loc!(1, 0, 1, 5)));
        let bad = token(2, "#", loc!(1, 2, 1, 3));
        track.begin(s.len(), &bad);
        assert_eq!(track.stack_pointer, 3);
        assert_eq!(track.base_pointer, 3);
        assert!(track.discarded.is_empty());
        track.discard(token(4, "b", loc!(1, 4, 1, 5)));
        assert_eq!(track.text(), "# b");
        assert_eq!(track.location(), Some(loc!(1, 2, 1, 3)));
    }
}
