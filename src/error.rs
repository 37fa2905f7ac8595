//! The Errors that may occur within the crate.

use thiserror::Error;

use crate::automaton::StateId;

pub type Result<T, E = crate::Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    // Model errors
    #[error("Invalid state {state}, automaton has {state_count} states")]
    InvalidState { state: StateId, state_count: u32 },
    #[error("Initial state is already set to {current}, cannot set it to {requested}")]
    InitialStateAlreadySet { current: StateId, requested: StateId },
    #[error("The automaton has no initial state")]
    UndefinedInitialState,
    #[error("State {state} already moves to {existing} on '{symbol}', cannot add a move to {target}")]
    NondeterministicTransition {
        state: StateId,
        symbol: char,
        existing: StateId,
        target: StateId,
    },
    #[error("Cannot determinize an automaton with epsilon transitions, remove them first")]
    DeterminizationPrecondition,
    #[error("State {0} has an epsilon transition in a DFA")]
    UnexpectedEpsilon(StateId),

    // Transition-list errors
    #[error("Malformed record on line {line}: expected 1 or 3 tokens, found {tokens}")]
    MalformedRecord { line: usize, tokens: usize },
    #[error("Invalid state id '{token}' on line {line}")]
    InvalidStateToken { line: usize, token: String },
    #[error("Invalid symbol '{token}' on line {line}, symbols are single characters or <eps>")]
    InvalidSymbol { line: usize, token: String },
    #[error("Epsilon transition on line {line} is not allowed in a DFA")]
    EpsilonInDfa { line: usize },
    #[error("Transition from state {state} on whitespace {symbol:?} cannot be written")]
    UnwritableSymbol { state: StateId, symbol: char },
    #[error("I/O error {0}")]
    Io(#[from] std::io::Error),

    // Binary persistence errors
    #[error("Failed to encode automaton {0}")]
    Encode(#[from] bincode::error::EncodeError),
    #[error("Failed to decode automaton {0}")]
    Decode(#[from] bincode::error::DecodeError),

    // Regex import errors
    #[error("Failed to build DFA {0}")]
    RegexBuild(#[from] Box<regex_automata::dfa::dense::BuildError>),
    #[error("Regex DFA has no anchored universal start state")]
    DfaHasNoStartState,
}

impl Error {
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }
}

#[cfg(feature = "python-bindings")]
impl From<Error> for pyo3::PyErr {
    fn from(e: Error) -> Self {
        use pyo3::exceptions::PyValueError;
        use pyo3::PyErr;
        PyErr::new::<PyValueError, _>(e.to_string())
    }
}
