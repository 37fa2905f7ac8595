//! The automaton model shared by NFAs and DFAs.
//!
//! An [`Automaton`] is generic over the container stored per `(state, symbol)`
//! key. A [`Dfa`] stores a single [`StateId`], an [`Nfa`] stores a set of them,
//! so the same construction API and accessors serve both variants.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;

use bincode::{config, Decode, Encode};
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

use crate::{Error, Result};

pub type StateId = u32;

/// The token used for epsilon in the transition-list format.
pub const EPSILON_TOKEN: &str = "<eps>";

/// A transition label: a single input character or epsilon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Encode, Decode)]
pub enum Symbol {
    Char(char),
    Epsilon,
}

impl Symbol {
    pub fn is_epsilon(&self) -> bool {
        matches!(self, Symbol::Epsilon)
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            Symbol::Char(c) => Some(*c),
            Symbol::Epsilon => None,
        }
    }
}

impl From<char> for Symbol {
    fn from(c: char) -> Self {
        Symbol::Char(c)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Char(c) => write!(f, "{}", c),
            Symbol::Epsilon => f.write_str(EPSILON_TOKEN),
        }
    }
}

mod private {
    pub trait Sealed {}

    impl Sealed for super::StateId {}
    impl Sealed for super::HashSet<super::StateId> {}
}

/// The targets stored for one `(state, symbol)` key.
///
/// This is the determinism capability of an [`Automaton`]: a single
/// [`StateId`] gives a partial function, a set gives a relation.
pub trait Targets: private::Sealed + Clone + fmt::Debug + PartialEq + Send + Sync {
    const DETERMINISTIC: bool;

    fn single(target: StateId) -> Self;

    /// Adds `target`, or returns the target already stored when the key can
    /// hold only one.
    fn try_insert(&mut self, target: StateId) -> Result<(), StateId>;

    fn iter(&self) -> impl Iterator<Item = StateId> + '_;
}

impl Targets for StateId {
    const DETERMINISTIC: bool = true;

    fn single(target: StateId) -> Self {
        target
    }

    fn try_insert(&mut self, target: StateId) -> Result<(), StateId> {
        if *self == target {
            Ok(())
        } else {
            Err(*self)
        }
    }

    fn iter(&self) -> impl Iterator<Item = StateId> + '_ {
        std::iter::once(*self)
    }
}

impl Targets for HashSet<StateId> {
    const DETERMINISTIC: bool = false;

    fn single(target: StateId) -> Self {
        HashSet::from_iter([target])
    }

    fn try_insert(&mut self, target: StateId) -> Result<(), StateId> {
        self.insert(target);
        Ok(())
    }

    fn iter(&self) -> impl Iterator<Item = StateId> + '_ {
        HashSet::iter(self).copied()
    }
}

/// A finite automaton with states `0..state_count`.
#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct Automaton<T> {
    state_count: u32,
    initial_state: Option<StateId>,
    final_states: HashSet<StateId>,
    transitions: HashMap<StateId, HashMap<Symbol, T>>,
}

/// Nondeterministic automaton, may contain epsilon transitions.
pub type Nfa = Automaton<HashSet<StateId>>;

/// Deterministic automaton, a partial function per `(state, char)`.
pub type Dfa = Automaton<StateId>;

impl<T: Targets> Default for Automaton<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Targets> Automaton<T> {
    /// An automaton without states.
    pub fn new() -> Self {
        Self::with_states(0)
    }

    /// An automaton with states `0..state_count` and no transitions.
    pub fn with_states(state_count: u32) -> Self {
        Self {
            state_count,
            initial_state: None,
            final_states: HashSet::default(),
            transitions: HashMap::default(),
        }
    }

    /// Allocates the next sequential state.
    pub fn add_state(&mut self) -> StateId {
        let state = self.state_count;
        self.state_count += 1;
        state
    }

    /// Grows the automaton so that `state_count` states exist, never shrinks it.
    pub fn require_states(&mut self, state_count: u32) {
        self.state_count = self.state_count.max(state_count);
    }

    pub fn state_count(&self) -> u32 {
        self.state_count
    }

    pub fn states(&self) -> Range<StateId> {
        0..self.state_count
    }

    pub fn contains_state(&self, state: StateId) -> bool {
        state < self.state_count
    }

    pub(crate) fn check_state(&self, state: StateId) -> Result<()> {
        if self.contains_state(state) {
            Ok(())
        } else {
            Err(Error::InvalidState {
                state,
                state_count: self.state_count,
            })
        }
    }

    /// Sets the initial state. Setting the same state twice is accepted, a
    /// different one is an error.
    pub fn mark_initial(&mut self, state: StateId) -> Result<()> {
        self.check_state(state)?;
        match self.initial_state {
            Some(current) if current != state => Err(Error::InitialStateAlreadySet {
                current,
                requested: state,
            }),
            _ => {
                self.initial_state = Some(state);
                Ok(())
            }
        }
    }

    pub fn mark_final(&mut self, state: StateId) -> Result<()> {
        self.check_state(state)?;
        self.final_states.insert(state);
        Ok(())
    }

    pub(crate) fn initial_state_unchecked(&mut self, state: StateId) {
        self.initial_state = Some(state);
    }

    pub(crate) fn final_state_unchecked(&mut self, state: StateId) {
        self.final_states.insert(state);
    }

    pub fn add_transition(&mut self, from: StateId, input: char, to: StateId) -> Result<()> {
        self.insert_edge(from, Symbol::Char(input), to)
    }

    pub(crate) fn insert_edge(&mut self, from: StateId, symbol: Symbol, to: StateId) -> Result<()> {
        self.check_state(from)?;
        self.check_state(to)?;
        let row = self.transitions.entry(from).or_default();
        match row.get_mut(&symbol) {
            Some(targets) => targets.try_insert(to).map_err(|existing| {
                Error::NondeterministicTransition {
                    state: from,
                    // epsilon keys only exist in an Nfa, which never conflicts
                    symbol: symbol.as_char().unwrap_or_default(),
                    existing,
                    target: to,
                }
            }),
            None => {
                row.insert(symbol, T::single(to));
                Ok(())
            }
        }
    }

    pub fn initial_state(&self) -> Result<StateId> {
        self.initial_state.ok_or(Error::UndefinedInitialState)
    }

    pub fn is_initial_state(&self, state: StateId) -> bool {
        self.initial_state == Some(state)
    }

    pub fn is_final(&self, state: StateId) -> Result<bool> {
        self.check_state(state)?;
        Ok(self.final_states.contains(&state))
    }

    pub fn final_states(&self) -> &HashSet<StateId> {
        &self.final_states
    }

    pub(crate) fn is_final_unchecked(&self, state: StateId) -> bool {
        self.final_states.contains(&state)
    }

    /// The targets of `state` on `symbol`, empty when there is no transition.
    pub fn targets(
        &self,
        state: StateId,
        symbol: Symbol,
    ) -> Result<impl Iterator<Item = StateId> + '_> {
        self.check_state(state)?;
        Ok(self.targets_unchecked(state, symbol))
    }

    pub(crate) fn targets_unchecked(
        &self,
        state: StateId,
        symbol: Symbol,
    ) -> impl Iterator<Item = StateId> + '_ {
        self.transitions
            .get(&state)
            .and_then(|row| row.get(&symbol))
            .into_iter()
            .flat_map(|targets| targets.iter())
    }

    /// All non-epsilon characters used by some transition.
    pub fn alphabet(&self) -> BTreeSet<char> {
        self.transitions
            .values()
            .flat_map(|row| row.keys().filter_map(Symbol::as_char))
            .collect()
    }

    /// Every transition as a `(from, symbol, to)` triple, in no particular order.
    pub fn transitions(&self) -> impl Iterator<Item = (StateId, Symbol, StateId)> + '_ {
        self.transitions.iter().flat_map(|(from, row)| {
            row.iter()
                .flat_map(move |(symbol, targets)| targets.iter().map(move |to| (*from, *symbol, to)))
        })
    }

    /// Every transition, sorted by source, symbol and target.
    pub fn sorted_transitions(&self) -> Vec<(StateId, Symbol, StateId)> {
        let mut transitions: Vec<_> = self.transitions().collect();
        transitions.sort_unstable();
        transitions
    }

    pub fn num_of_transitions(&self) -> usize {
        self.transitions().count()
    }

    /// Checks that every referenced state is in range and that a DFA carries
    /// no epsilon keys.
    pub fn validate(&self) -> Result<()> {
        if let Some(initial) = self.initial_state {
            self.check_state(initial)?;
        }
        for state in &self.final_states {
            self.check_state(*state)?;
        }
        for (from, symbol, to) in self.transitions() {
            self.check_state(from)?;
            self.check_state(to)?;
            if T::DETERMINISTIC && symbol.is_epsilon() {
                return Err(Error::UnexpectedEpsilon(from));
            }
        }
        Ok(())
    }
}

impl<T: Targets + Encode + Decode<()>> Automaton<T> {
    pub fn to_binary(&self) -> Result<Vec<u8>> {
        Ok(bincode::encode_to_vec(self, config::standard())?)
    }

    /// Decodes an automaton written by [`Automaton::to_binary`] and validates it.
    pub fn from_binary(binary_data: &[u8]) -> Result<Self> {
        let (automaton, _): (Self, usize) =
            bincode::decode_from_slice(binary_data, config::standard())?;
        automaton.validate()?;
        Ok(automaton)
    }
}

impl Nfa {
    pub fn add_epsilon_transition(&mut self, from: StateId, to: StateId) -> Result<()> {
        self.insert_edge(from, Symbol::Epsilon, to)
    }

    pub fn has_epsilon_transitions(&self) -> bool {
        self.transitions
            .values()
            .any(|row| row.contains_key(&Symbol::Epsilon))
    }

    pub(crate) fn epsilon_targets(&self, state: StateId) -> impl Iterator<Item = StateId> + '_ {
        self.targets_unchecked(state, Symbol::Epsilon)
    }

    /// Inserts a transition between states already known to be valid.
    pub(crate) fn extend_targets(
        &mut self,
        from: StateId,
        symbol: Symbol,
        targets: impl IntoIterator<Item = StateId>,
    ) {
        let mut targets = targets.into_iter().peekable();
        if targets.peek().is_none() {
            return;
        }
        self.transitions
            .entry(from)
            .or_default()
            .entry(symbol)
            .or_default()
            .extend(targets);
    }
}

impl Dfa {
    /// The unique successor of `state` on `input`, if any.
    pub fn next_state(&self, state: StateId, input: char) -> Result<Option<StateId>> {
        self.check_state(state)?;
        Ok(self.step(state, input))
    }

    pub(crate) fn step(&self, state: StateId, input: char) -> Option<StateId> {
        Some(*self.transitions.get(&state)?.get(&Symbol::Char(input))?)
    }

    /// Sets the successor of a valid state, replacing any previous one.
    pub(crate) fn set_transition_unchecked(&mut self, from: StateId, input: char, to: StateId) {
        self.transitions
            .entry(from)
            .or_default()
            .insert(Symbol::Char(input), to);
    }
}

impl From<&Dfa> for Nfa {
    fn from(dfa: &Dfa) -> Self {
        Nfa {
            state_count: dfa.state_count,
            initial_state: dfa.initial_state,
            final_states: dfa.final_states.clone(),
            transitions: dfa
                .transitions
                .iter()
                .map(|(from, row)| {
                    let row = row
                        .iter()
                        .map(|(symbol, target)| {
                            (*symbol, <HashSet<StateId> as Targets>::single(*target))
                        })
                        .collect();
                    (*from, row)
                })
                .collect(),
        }
    }
}

impl<T: Targets> fmt::Display for Automaton<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if T::DETERMINISTIC { "DFA" } else { "NFA" };
        let mut final_states: Vec<_> = self.final_states.iter().collect();
        final_states.sort_unstable();
        writeln!(f, "{} with {} states", kind, self.state_count)?;
        match self.initial_state {
            Some(initial) => writeln!(f, "initial: {}", initial)?,
            None => writeln!(f, "initial: -")?,
        }
        writeln!(f, "final: {:?}", final_states)?;
        for (from, symbol, to) in self.sorted_transitions() {
            writeln!(f, "{} --{}--> {}", from, symbol, to)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_state_is_sequential() {
        let mut nfa = Nfa::new();
        assert_eq!(nfa.add_state(), 0);
        assert_eq!(nfa.add_state(), 1);
        assert_eq!(nfa.add_state(), 2);
        assert_eq!(nfa.state_count(), 3);
        assert_eq!(nfa.states(), 0..3);
    }

    #[test]
    fn mutators_reject_unknown_states() {
        let mut nfa = Nfa::with_states(2);
        assert!(nfa.mark_initial(2).unwrap_err().is_invalid_state());
        assert!(nfa.mark_final(5).unwrap_err().is_invalid_state());
        assert!(nfa.add_transition(0, 'a', 2).unwrap_err().is_invalid_state());
        assert!(nfa.add_epsilon_transition(3, 0).unwrap_err().is_invalid_state());
        assert!(nfa.is_final(2).unwrap_err().is_invalid_state());
        assert!(nfa.targets(7, Symbol::Char('a')).is_err());

        // nothing was recorded by the failed calls
        assert_eq!(nfa, Nfa::with_states(2));
    }

    #[test]
    fn initial_state_is_set_once() {
        let mut dfa = Dfa::with_states(2);
        assert!(matches!(dfa.initial_state(), Err(Error::UndefinedInitialState)));
        dfa.mark_initial(0).unwrap();
        dfa.mark_initial(0).unwrap();
        assert!(matches!(
            dfa.mark_initial(1),
            Err(Error::InitialStateAlreadySet { current: 0, requested: 1 })
        ));
        assert_eq!(dfa.initial_state().unwrap(), 0);
        assert!(dfa.is_initial_state(0));
    }

    #[test]
    fn nfa_targets_are_a_set() {
        let mut nfa = Nfa::with_states(3);
        nfa.add_transition(0, 'a', 1).unwrap();
        nfa.add_transition(0, 'a', 2).unwrap();
        nfa.add_transition(0, 'a', 1).unwrap();

        let targets: BTreeSet<_> = nfa.targets(0, Symbol::Char('a')).unwrap().collect();
        assert_eq!(targets, BTreeSet::from([1, 2]));
        assert_eq!(nfa.targets(1, Symbol::Char('a')).unwrap().count(), 0);
        assert_eq!(nfa.num_of_transitions(), 2);
    }

    #[test]
    fn dfa_transitions_are_a_partial_function() {
        let mut dfa = Dfa::with_states(3);
        dfa.add_transition(0, 'a', 1).unwrap();
        dfa.add_transition(0, 'a', 1).unwrap();
        let err = dfa.add_transition(0, 'a', 2).unwrap_err();
        assert!(matches!(
            err,
            Error::NondeterministicTransition {
                state: 0,
                symbol: 'a',
                existing: 1,
                target: 2
            }
        ));
        assert_eq!(dfa.next_state(0, 'a').unwrap(), Some(1));
        assert_eq!(dfa.next_state(0, 'b').unwrap(), None);
    }

    #[test]
    fn alphabet_excludes_epsilon() {
        let mut nfa = Nfa::with_states(3);
        nfa.add_transition(0, 'b', 1).unwrap();
        nfa.add_epsilon_transition(1, 2).unwrap();
        nfa.add_transition(2, 'a', 0).unwrap();

        assert_eq!(nfa.alphabet(), BTreeSet::from(['a', 'b']));
        assert!(nfa.has_epsilon_transitions());
    }

    #[test]
    fn dfa_converts_to_nfa() {
        let mut dfa = Dfa::with_states(2);
        dfa.mark_initial(0).unwrap();
        dfa.mark_final(1).unwrap();
        dfa.add_transition(0, 'x', 1).unwrap();

        let nfa = Nfa::from(&dfa);
        assert_eq!(nfa.initial_state().unwrap(), 0);
        assert!(nfa.is_final(1).unwrap());
        assert_eq!(nfa.sorted_transitions(), vec![(0, Symbol::Char('x'), 1)]);
        assert!(!nfa.has_epsilon_transitions());
    }

    #[test]
    fn binary_persistence() {
        let mut nfa = Nfa::with_states(3);
        nfa.mark_initial(0).unwrap();
        nfa.mark_final(2).unwrap();
        nfa.add_transition(0, 'a', 1).unwrap();
        nfa.add_transition(0, 'a', 2).unwrap();
        nfa.add_epsilon_transition(1, 2).unwrap();

        let data = nfa.to_binary().unwrap();
        assert_eq!(Nfa::from_binary(&data).unwrap(), nfa);
        assert!(Nfa::from_binary(&data[..data.len() / 2]).is_err());
    }

    #[test]
    fn decoding_validates_states() {
        let mut nfa = Nfa::with_states(3);
        nfa.mark_initial(0).unwrap();
        nfa.mark_final(2).unwrap();
        nfa.add_transition(0, 'a', 1).unwrap();

        // state_count is the leading varint
        let mut data = nfa.to_binary().unwrap();
        assert_eq!(data[0], 3);
        data[0] = 2;
        assert!(matches!(
            Nfa::from_binary(&data),
            Err(Error::InvalidState {
                state: 2,
                state_count: 2
            })
        ));
    }

    #[test]
    fn decoding_rejects_epsilon_in_dfa() {
        let mut dfa = Dfa::with_states(2);
        dfa.mark_initial(0).unwrap();
        dfa.add_transition(0, 'a', 1).unwrap();
        dfa.transitions
            .entry(1)
            .or_default()
            .insert(Symbol::Epsilon, 0);

        let data = dfa.to_binary().unwrap();
        assert!(matches!(
            Dfa::from_binary(&data),
            Err(Error::UnexpectedEpsilon(1))
        ));
    }

    #[test]
    fn require_states_only_grows() {
        let mut dfa = Dfa::with_states(2);
        dfa.require_states(5);
        assert_eq!(dfa.state_count(), 5);
        dfa.require_states(3);
        assert_eq!(dfa.state_count(), 5);
        dfa.add_transition(4, 'x', 0).unwrap();
    }

    #[test]
    fn display_lists_sorted_transitions() {
        let mut dfa = Dfa::with_states(2);
        dfa.mark_initial(0).unwrap();
        dfa.mark_final(1).unwrap();
        dfa.add_transition(1, 'b', 0).unwrap();
        dfa.add_transition(0, 'a', 1).unwrap();

        assert_eq!(
            dfa.to_string(),
            "DFA with 2 states\ninitial: 0\nfinal: [1]\n0 --a--> 1\n1 --b--> 0\n"
        );
    }
}
