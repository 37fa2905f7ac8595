//! Runs input strings against an automaton.

use std::collections::BTreeSet;

use rayon::prelude::*;

use crate::automaton::{Dfa, Nfa, StateId, Symbol};
use crate::closure::closure_unchecked;
use crate::Result;

/// An automaton that decides whether it accepts an input sequence.
pub trait Acceptor: Sync {
    fn accepts_symbols(&self, input: impl IntoIterator<Item = char>) -> Result<bool>;

    fn accepts(&self, input: &str) -> Result<bool> {
        self.accepts_symbols(input.chars())
    }

    /// Evaluates every input independently, in parallel.
    fn accepts_all<S: AsRef<str> + Sync>(&self, inputs: &[S]) -> Result<Vec<bool>> {
        inputs
            .par_iter()
            .map(|input| self.accepts(input.as_ref()))
            .collect()
    }
}

pub fn accepts<A: Acceptor + ?Sized>(automaton: &A, input: &str) -> Result<bool> {
    automaton.accepts(input)
}

impl Acceptor for Dfa {
    fn accepts_symbols(&self, input: impl IntoIterator<Item = char>) -> Result<bool> {
        let mut state = self.initial_state()?;
        for c in input {
            match self.step(state, c) {
                Some(next) => state = next,
                None => return Ok(false),
            }
        }
        Ok(self.is_final_unchecked(state))
    }
}

impl Acceptor for Nfa {
    fn accepts_symbols(&self, input: impl IntoIterator<Item = char>) -> Result<bool> {
        let mut active: BTreeSet<StateId> = closure_unchecked(self, [self.initial_state()?]);
        for c in input {
            let moved: BTreeSet<StateId> = active
                .iter()
                .flat_map(|state| self.targets_unchecked(*state, Symbol::Char(c)))
                .collect();
            active = closure_unchecked(self, moved);
            if active.is_empty() {
                return Ok(false);
            }
        }
        Ok(active.iter().any(|state| self.is_final_unchecked(*state)))
    }
}

impl Dfa {
    /// The states visited while reading `input`, starting with the initial
    /// state, or `None` when some transition is missing.
    pub fn state_sequence(&self, input: &str) -> Result<Option<Vec<StateId>>> {
        let mut state = self.initial_state()?;
        let mut seq = vec![state];
        for c in input.chars() {
            match self.step(state, c) {
                Some(next) => {
                    seq.push(next);
                    state = next;
                }
                None => return Ok(None),
            }
        }
        Ok(Some(seq))
    }
}
