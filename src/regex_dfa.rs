//! Building a [`Dfa`] from a regular expression.

use std::collections::VecDeque;

use regex_automata::dfa::dense::DFA;
use regex_automata::dfa::Automaton as _;
use regex_automata::util::primitives::StateID as AutomataStateId;
use regex_automata::Anchored;
use rustc_hash::FxHashMap as HashMap;

use crate::automaton::{Dfa, StateId};
use crate::{Error, Result};

impl Dfa {
    /// Compiles `regex` into a DFA that accepts exactly the strings matching
    /// it in full.
    ///
    /// States are numbered in breadth-first order from the start state, which
    /// gets id `0`. Only ASCII transitions are imported; states reachable
    /// only through multi-byte characters are left out.
    pub fn from_regex(regex: &str) -> Result<Self> {
        let dfa = DFA::builder()
            .configure(DFA::config().minimize(true))
            .build(&format!("(?:{})$", regex))
            .map_err(Box::new)?;
        let start_state = match dfa.universal_start_state(Anchored::Yes) {
            Some(s) => s,
            None => return Err(Error::DfaHasNoStartState),
        };

        let mut ids: HashMap<AutomataStateId, StateId> = HashMap::default();
        ids.insert(start_state, 0);
        let mut next_states: VecDeque<(StateId, AutomataStateId)> =
            VecDeque::from([(0, start_state)]);
        let mut final_states: Vec<StateId> = Vec::new();
        let mut transitions: Vec<(StateId, char, StateId)> = Vec::new();

        while let Some((current_id, current_state)) = next_states.pop_front() {
            if dfa.is_match_state(dfa.next_eoi_state(current_state)) {
                final_states.push(current_id);
            }
            for input in 0..128u8 {
                let next_state = dfa.next_state(current_state, input);
                if dfa.is_dead_state(next_state) || dfa.is_quit_state(next_state) {
                    continue;
                }
                let next_id = match ids.get(&next_state) {
                    Some(id) => *id,
                    None => {
                        let id = ids.len() as StateId;
                        ids.insert(next_state, id);
                        next_states.push_back((id, next_state));
                        id
                    }
                };
                transitions.push((current_id, char::from(input), next_id));
            }
        }

        let mut result = Dfa::with_states(ids.len() as u32);
        result.initial_state_unchecked(0);
        for state in final_states {
            result.final_state_unchecked(state);
        }
        for (from, c, to) in transitions {
            result.set_transition_unchecked(from, c, to);
        }
        Ok(result)
    }
}
