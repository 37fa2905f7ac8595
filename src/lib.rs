//! # Finite_Automata
//!
//! `finite_automata` crate models NFAs and DFAs, simulates them, removes
//! epsilon transitions and determinizes by subset construction.

pub mod automaton;
pub mod closure;
pub mod determinize;
pub mod dot;
pub mod epsilon;
pub mod error;
pub mod io_transitions;
pub mod regex_dfa;
pub mod simulate;

#[cfg(test)]
mod test_utility;

pub use automaton::{Automaton, Dfa, Nfa, StateId, Symbol, Targets};
pub use closure::epsilon_closure;
pub use determinize::{determinize, nfa_to_dfa};
pub use epsilon::remove_epsilon;
pub use error::{Error, Result};
pub use io_transitions::{read_transitions, write_transitions, MalformedPolicy, ReadOptions};
pub use simulate::{accepts, Acceptor};

#[cfg(feature = "python-bindings")]
mod python_bindings;
