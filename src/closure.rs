//! Epsilon-closure over the transition relation of an [`Nfa`].

use std::collections::BTreeSet;

use crate::automaton::{Nfa, StateId};
use crate::Result;

/// Returns the smallest superset of `seeds` that is closed under epsilon
/// transitions. Every seed must be a state of `nfa`.
pub fn epsilon_closure(
    nfa: &Nfa,
    seeds: impl IntoIterator<Item = StateId>,
) -> Result<BTreeSet<StateId>> {
    let seeds: Vec<StateId> = seeds.into_iter().collect();
    for state in &seeds {
        nfa.check_state(*state)?;
    }
    Ok(closure_unchecked(nfa, seeds))
}

/// Closure of states that are known to be valid.
pub(crate) fn closure_unchecked(
    nfa: &Nfa,
    seeds: impl IntoIterator<Item = StateId>,
) -> BTreeSet<StateId> {
    let mut closure: BTreeSet<StateId> = BTreeSet::new();
    let mut stack: Vec<StateId> = Vec::new();
    for state in seeds {
        if closure.insert(state) {
            stack.push(state);
        }
    }

    while let Some(state) = stack.pop() {
        for next_state in nfa.epsilon_targets(state) {
            if closure.insert(next_state) {
                stack.push(next_state);
            }
        }
    }
    closure
}
