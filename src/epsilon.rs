//! Epsilon elimination: an equivalent [`Nfa`] without epsilon transitions.

use std::collections::BTreeSet;

use log::debug;

use crate::automaton::{Nfa, StateId, Symbol};
use crate::closure::closure_unchecked;

/// Builds an epsilon-free NFA accepting the same language as `nfa`.
///
/// States keep their ids and the initial state is unchanged. A state `s`
/// moves on `a` to the closure of everything reachable on `a` from the closure
/// of `s`, and is final when its closure contains a final state. Unreachable
/// states are kept.
pub fn remove_epsilon(nfa: &Nfa) -> Nfa {
    let alphabet = nfa.alphabet();
    let closures: Vec<BTreeSet<StateId>> = nfa
        .states()
        .map(|state| closure_unchecked(nfa, [state]))
        .collect();

    let mut result = Nfa::with_states(nfa.state_count());
    if let Ok(initial) = nfa.initial_state() {
        result.initial_state_unchecked(initial);
    }

    for (state, closure) in nfa.states().zip(&closures) {
        if closure.iter().any(|s| nfa.is_final_unchecked(*s)) {
            result.final_state_unchecked(state);
        }
        for c in &alphabet {
            let moved: BTreeSet<StateId> = closure
                .iter()
                .flat_map(|s| nfa.targets_unchecked(*s, Symbol::Char(*c)))
                .collect();
            let targets = moved
                .iter()
                .flat_map(|t| closures[*t as usize].iter().copied());
            result.extend_targets(state, Symbol::Char(*c), targets);
        }
    }

    debug!(
        "Removed epsilon transitions: {} transitions became {}",
        nfa.num_of_transitions(),
        result.num_of_transitions()
    );
    result
}
