//! Subset construction: converts an epsilon-free [`Nfa`] into a [`Dfa`].

use std::collections::{BTreeSet, VecDeque};

use log::{debug, trace};
use rustc_hash::FxHashMap as HashMap;

use crate::automaton::{Dfa, Nfa, StateId, Symbol};
use crate::epsilon::remove_epsilon;
use crate::{Error, Result};

/// A set of NFA states, ordered so that equal sets compare and hash equal.
pub type Subset = BTreeSet<StateId>;

/// Determinizes `nfa`, which must not contain epsilon transitions.
///
/// The resulting DFA is partial: when no NFA state moves on a symbol, the
/// corresponding DFA state has no transition on it.
pub fn determinize(nfa: &Nfa) -> Result<Dfa> {
    subset_construction(nfa).map(|(dfa, _)| dfa)
}

/// Removes epsilon transitions and then determinizes.
pub fn nfa_to_dfa(nfa: &Nfa) -> Result<Dfa> {
    determinize(&remove_epsilon(nfa))
}

/// Like [`determinize`], but also returns the NFA subset behind every DFA
/// state, indexed by DFA state id. Subset `0` is always `{initial}`.
pub fn subset_construction(nfa: &Nfa) -> Result<(Dfa, Vec<Subset>)> {
    if nfa.has_epsilon_transitions() {
        return Err(Error::DeterminizationPrecondition);
    }
    let initial_state = nfa.initial_state()?;
    let alphabet = nfa.alphabet();

    let initial_subset = Subset::from([initial_state]);
    let mut subset_ids: HashMap<Subset, StateId> = HashMap::default();
    subset_ids.insert(initial_subset.clone(), 0);
    let mut subsets: Vec<Subset> = vec![initial_subset.clone()];
    let mut unprocessed: VecDeque<(StateId, Subset)> = VecDeque::from([(0, initial_subset)]);

    let mut final_states: Vec<StateId> = Vec::new();
    let mut transitions: Vec<(StateId, char, StateId)> = Vec::new();

    while let Some((current_id, current_subset)) = unprocessed.pop_front() {
        if current_subset.iter().any(|s| nfa.is_final_unchecked(*s)) {
            final_states.push(current_id);
        }
        for c in &alphabet {
            let next_subset: Subset = current_subset
                .iter()
                .flat_map(|s| nfa.targets_unchecked(*s, Symbol::Char(*c)))
                .collect();
            if next_subset.is_empty() {
                continue;
            }
            let next_id = match subset_ids.get(&next_subset) {
                Some(id) => *id,
                None => {
                    let id = subsets.len() as StateId;
                    trace!("Discovered DFA state {} = {:?}", id, next_subset);
                    subset_ids.insert(next_subset.clone(), id);
                    subsets.push(next_subset.clone());
                    unprocessed.push_back((id, next_subset));
                    id
                }
            };
            transitions.push((current_id, *c, next_id));
        }
    }

    let mut dfa = Dfa::with_states(subsets.len() as u32);
    dfa.initial_state_unchecked(0);
    for state in final_states {
        dfa.final_state_unchecked(state);
    }
    for (from, c, to) in transitions {
        dfa.set_transition_unchecked(from, c, to);
    }

    debug!(
        "Determinized NFA with {} states into DFA with {} states",
        nfa.state_count(),
        dfa.state_count()
    );
    Ok((dfa, subsets))
}

impl TryFrom<&Nfa> for Dfa {
    type Error = Error;

    fn try_from(nfa: &Nfa) -> Result<Self> {
        nfa_to_dfa(nfa)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulate::Acceptor;
    use crate::test_utility::{random_nfa, random_test, random_word};

    use test_log::test;

    /// Words over {a, b} ending in "ab".
    fn ends_in_ab() -> Nfa {
        let mut nfa = Nfa::with_states(3);
        nfa.mark_initial(0).unwrap();
        nfa.mark_final(2).unwrap();
        nfa.add_transition(0, 'a', 0).unwrap();
        nfa.add_transition(0, 'b', 0).unwrap();
        nfa.add_transition(0, 'a', 1).unwrap();
        nfa.add_transition(1, 'b', 2).unwrap();
        nfa
    }

    #[test]
    fn classic_subset_construction() {
        let nfa = ends_in_ab();
        let (dfa, subsets) = subset_construction(&nfa).unwrap();

        assert_eq!(dfa.state_count(), 3);
        assert_eq!(dfa.initial_state().unwrap(), 0);
        assert_eq!(
            subsets,
            vec![
                Subset::from([0]),
                Subset::from([0, 1]),
                Subset::from([0, 2])
            ]
        );
        assert!(dfa.is_final(2).unwrap());
        assert!(!dfa.is_final(0).unwrap());
        assert_eq!(dfa.next_state(0, 'a').unwrap(), Some(1));
        assert_eq!(dfa.next_state(1, 'b').unwrap(), Some(2));
        assert_eq!(dfa.next_state(2, 'b').unwrap(), Some(0));

        for word in ["ab", "aab", "bab", "abab", "", "a", "b", "aba", "abb"] {
            assert_eq!(nfa.accepts(word).unwrap(), dfa.accepts(word).unwrap());
        }
    }

    #[test]
    fn equal_subsets_collapse() {
        // {1, 2} is reached on "a" and on "b", in different insertion orders.
        let mut nfa = Nfa::with_states(3);
        nfa.mark_initial(0).unwrap();
        nfa.add_transition(0, 'a', 1).unwrap();
        nfa.add_transition(0, 'a', 2).unwrap();
        nfa.add_transition(0, 'b', 2).unwrap();
        nfa.add_transition(0, 'b', 1).unwrap();

        let (dfa, subsets) = subset_construction(&nfa).unwrap();
        assert_eq!(dfa.state_count(), 2);
        assert_eq!(subsets[1], Subset::from([1, 2]));
        assert_eq!(dfa.next_state(0, 'a').unwrap(), Some(1));
        assert_eq!(dfa.next_state(0, 'b').unwrap(), Some(1));
    }

    #[test]
    fn empty_moves_are_left_out() {
        let mut nfa = Nfa::with_states(2);
        nfa.mark_initial(0).unwrap();
        nfa.mark_final(1).unwrap();
        nfa.add_transition(0, 'a', 1).unwrap();
        nfa.add_transition(1, 'b', 1).unwrap();

        let dfa = determinize(&nfa).unwrap();
        assert_eq!(dfa.next_state(0, 'b').unwrap(), None);
        assert_eq!(dfa.next_state(1, 'a').unwrap(), None);
        assert!(!dfa.accepts("b").unwrap());
        assert!(dfa.accepts("abbb").unwrap());
    }

    #[test]
    fn empty_alphabet() {
        let mut nfa = Nfa::with_states(3);
        nfa.mark_initial(1).unwrap();
        nfa.mark_final(1).unwrap();

        let (dfa, subsets) = subset_construction(&nfa).unwrap();
        assert_eq!(dfa.state_count(), 1);
        assert_eq!(subsets, vec![Subset::from([1])]);
        assert!(dfa.accepts("").unwrap());
        assert!(!dfa.accepts("a").unwrap());
    }

    #[test]
    fn rejects_epsilon_transitions() {
        let mut nfa = Nfa::with_states(2);
        nfa.mark_initial(0).unwrap();
        nfa.add_epsilon_transition(0, 1).unwrap();

        assert!(matches!(
            determinize(&nfa),
            Err(Error::DeterminizationPrecondition)
        ));
        assert!(nfa_to_dfa(&nfa).is_ok());
    }

    #[test]
    fn requires_initial_state() {
        let nfa = Nfa::with_states(2);
        assert!(matches!(
            determinize(&nfa),
            Err(Error::UndefinedInitialState)
        ));
    }

    #[test]
    fn try_from_removes_epsilon() {
        let mut nfa = Nfa::with_states(4);
        nfa.mark_initial(0).unwrap();
        nfa.mark_final(3).unwrap();
        nfa.add_transition(0, 'a', 1).unwrap();
        nfa.add_epsilon_transition(1, 2).unwrap();
        nfa.add_transition(2, 'b', 3).unwrap();

        let dfa = Dfa::try_from(&nfa).unwrap();
        assert!(dfa.accepts("ab").unwrap());
        assert!(!dfa.accepts("a").unwrap());
        assert!(!dfa.accepts("").unwrap());
    }

    #[test]
    fn random_determinization_is_equivalent() {
        random_test(100, |rng| {
            let nfa = random_nfa(rng, 8, &['a', 'b', 'c'], 3, true);
            let dfa = nfa_to_dfa(&nfa).unwrap();
            let epsilon_free = remove_epsilon(&nfa);

            assert_eq!(dfa.initial_state().unwrap(), 0);
            for _ in 0..50 {
                let word = random_word(rng, &['a', 'b', 'c'], 8);
                let expected = nfa.accepts(&word).unwrap();
                assert_eq!(expected, epsilon_free.accepts(&word).unwrap(), "{word}");
                assert_eq!(expected, dfa.accepts(&word).unwrap(), "{word}");
            }
        })
    }
}
