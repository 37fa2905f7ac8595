use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use crate::automaton::{Nfa, StateId};

/// Runs `test_function` with a seeded random number generator. The seed is
/// printed and can be fixed with `AUTOMATA_SEED=<seed>`.
pub fn random_test<F>(iterations: usize, mut test_function: F)
where
    F: FnMut(&mut StdRng),
{
    let _ = env_logger::builder().is_test(true).try_init();

    let seed: u64 = match std::env::var("AUTOMATA_SEED") {
        Ok(seed_str) => seed_str
            .parse()
            .expect("AUTOMATA_SEED must be a valid u64"),
        Err(_) => rand::random(),
    };
    println!("random seed: {seed} (use AUTOMATA_SEED=<seed> to set fixed seed)");
    let mut rng = StdRng::seed_from_u64(seed);

    for _ in 0..iterations {
        test_function(&mut rng);
    }
}

/// A random NFA with state 0 initial, up to `outdegree` labelled transitions
/// per state and, optionally, some epsilon transitions.
pub fn random_nfa(
    rng: &mut impl Rng,
    num_of_states: u32,
    alphabet: &[char],
    outdegree: usize,
    with_epsilon: bool,
) -> Nfa {
    let mut nfa = Nfa::with_states(num_of_states);
    nfa.mark_initial(0).unwrap();

    for state in 0..num_of_states {
        if rng.random_bool(0.3) {
            nfa.mark_final(state).unwrap();
        }
        for _ in 0..rng.random_range(0..=outdegree) {
            let c = alphabet[rng.random_range(0..alphabet.len())];
            let to: StateId = rng.random_range(0..num_of_states);
            nfa.add_transition(state, c, to).unwrap();
        }
        if with_epsilon && rng.random_bool(0.4) {
            let to: StateId = rng.random_range(0..num_of_states);
            nfa.add_epsilon_transition(state, to).unwrap();
        }
    }
    nfa
}

pub fn random_word(rng: &mut impl Rng, alphabet: &[char], max_len: usize) -> String {
    (0..rng.random_range(0..=max_len))
        .map(|_| alphabet[rng.random_range(0..alphabet.len())])
        .collect()
}
