//! Reading and writing automata in the transition-list text format.
//!
//! Every non-blank line is either a transition `FROM TO SYMBOL`, where
//! `SYMBOL` is a single character or `<eps>`, or a final state `N`. State `0`
//! is the initial state and the number of states is one more than the largest
//! state mentioned.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use log::{info, warn};

use crate::automaton::{Automaton, StateId, Symbol, Targets, EPSILON_TOKEN};
use crate::{Error, Result};

/// What to do with a line that has neither one nor three tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedPolicy {
    /// Stop reading and return [`Error::MalformedRecord`].
    #[default]
    Fail,
    /// Log a warning and continue with the next line.
    Skip,
}

#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    pub on_malformed: MalformedPolicy,
}

impl ReadOptions {
    pub fn skip_malformed() -> Self {
        Self {
            on_malformed: MalformedPolicy::Skip,
        }
    }
}

enum Record {
    Final(StateId),
    Transition {
        line: usize,
        from: StateId,
        to: StateId,
        symbol: Symbol,
    },
}

/// Loads an automaton in the transition-list format from the given reader.
///
/// Reading into a [`crate::Dfa`] fails on `<eps>` symbols and on two
/// different targets for the same state and symbol.
pub fn read_transitions<T: Targets>(
    reader: impl Read,
    options: &ReadOptions,
) -> Result<Automaton<T>> {
    info!("Reading automaton in transition-list format...");

    let mut records: Vec<Record> = Vec::new();
    let mut max_state: StateId = 0;

    for (index, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        let line_number = index + 1;
        let tokens: Vec<&str> = line.split_whitespace().collect();

        match tokens.as_slice() {
            [] => continue,
            [state] => {
                let state = parse_state(line_number, state)?;
                max_state = max_state.max(state);
                records.push(Record::Final(state));
            }
            [from, to, symbol] => {
                let from = parse_state(line_number, from)?;
                let to = parse_state(line_number, to)?;
                let symbol = parse_symbol(line_number, symbol)?;
                if T::DETERMINISTIC && symbol.is_epsilon() {
                    return Err(Error::EpsilonInDfa { line: line_number });
                }
                max_state = max_state.max(from).max(to);
                records.push(Record::Transition {
                    line: line_number,
                    from,
                    to,
                    symbol,
                });
            }
            _ => match options.on_malformed {
                MalformedPolicy::Fail => {
                    return Err(Error::MalformedRecord {
                        line: line_number,
                        tokens: tokens.len(),
                    })
                }
                MalformedPolicy::Skip => {
                    warn!(
                        "Skipping malformed record on line {}: '{}'",
                        line_number,
                        line.trim()
                    );
                }
            },
        }
    }

    let mut automaton = Automaton::with_states(max_state.saturating_add(1));
    automaton.mark_initial(0)?;
    for record in records {
        match record {
            Record::Final(state) => automaton.mark_final(state)?,
            Record::Transition {
                line,
                from,
                to,
                symbol,
            } => automaton.insert_edge(from, symbol, to).map_err(|e| {
                warn!("Rejected transition on line {}: {}", line, e);
                e
            })?,
        }
    }

    info!(
        "Finished reading automaton with {} states and {} transitions",
        automaton.state_count(),
        automaton.num_of_transitions()
    );
    Ok(automaton)
}

/// Writes an automaton in the transition-list format, see [read_transitions].
///
/// Transitions come first, then final states, both sorted. The format fixes
/// the initial state to `0`, so when the automaton starts elsewhere that state
/// and state `0` swap ids in the output. Whitespace symbols cannot be written
/// and fail with [`Error::UnwritableSymbol`] before anything is output.
pub fn write_transitions<T: Targets>(
    writer: &mut impl Write,
    automaton: &Automaton<T>,
) -> Result<()> {
    info!("Writing automaton in transition-list format...");

    let initial_state = automaton.initial_state()?;
    let relabel = |state: StateId| {
        if state == initial_state {
            0
        } else if state == 0 {
            initial_state
        } else {
            state
        }
    };

    // Whitespace separates tokens, so such a symbol would not read back.
    if let Some((state, symbol)) = automaton.transitions().find_map(|(from, symbol, _)| {
        symbol
            .as_char()
            .filter(|c| c.is_whitespace())
            .map(|c| (from, c))
    }) {
        return Err(Error::UnwritableSymbol { state, symbol });
    }

    let mut transitions: Vec<(StateId, StateId, Symbol)> = automaton
        .transitions()
        .map(|(from, symbol, to)| (relabel(from), relabel(to), symbol))
        .collect();
    transitions.sort_unstable();

    let mut final_states: Vec<StateId> = automaton
        .final_states()
        .iter()
        .map(|state| relabel(*state))
        .collect();
    final_states.sort_unstable();

    let mut writer = BufWriter::new(writer);
    for (from, to, symbol) in &transitions {
        writeln!(writer, "{} {} {}", from, to, symbol)?;
    }
    for state in &final_states {
        writeln!(writer, "{}", state)?;
    }
    writer.flush()?;

    info!("Finished writing {} transitions", transitions.len());
    Ok(())
}

pub fn read_transitions_file<T: Targets>(
    path: impl AsRef<Path>,
    options: &ReadOptions,
) -> Result<Automaton<T>> {
    read_transitions(File::open(path)?, options)
}

pub fn write_transitions_file<T: Targets>(
    path: impl AsRef<Path>,
    automaton: &Automaton<T>,
) -> Result<()> {
    let mut file = File::create(path)?;
    write_transitions(&mut file, automaton)
}

fn parse_state(line: usize, token: &str) -> Result<StateId> {
    token.parse().map_err(|_| Error::InvalidStateToken {
        line,
        token: token.to_string(),
    })
}

fn parse_symbol(line: usize, token: &str) -> Result<Symbol> {
    if token == EPSILON_TOKEN {
        return Ok(Symbol::Epsilon);
    }
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(Symbol::Char(c)),
        _ => Err(Error::InvalidSymbol {
            line,
            token: token.to_string(),
        }),
    }
}
