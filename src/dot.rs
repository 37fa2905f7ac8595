//! Graphviz output for automata.

use crate::automaton::{Automaton, Symbol, Targets};

impl<T: Targets> Automaton<T> {
    /// Renders the automaton as a Graphviz `digraph`. Final states are drawn
    /// as double circles and epsilon transitions are labelled `ε`.
    pub fn to_graphviz(&self) -> String {
        let mut output = String::from(
            r#"digraph {
    rankdir = LR;
    ranksep = .75;
    node [shape=circle style=filled]
    start [shape=none, label="start", style=""]
"#,
        );

        let mut final_states: Vec<_> = self.final_states().iter().copied().collect();
        final_states.sort_unstable();
        for state in final_states {
            output.push_str(&format!("    {} [shape=doublecircle]\n", state));
        }

        if let Ok(initial) = self.initial_state() {
            output.push_str(&format!("    start -> {}\n", initial));
        }

        for (from, symbol, to) in self.sorted_transitions() {
            let label = match symbol {
                Symbol::Char('"') => "\\\"".to_string(),
                Symbol::Char('\\') => "\\\\".to_string(),
                Symbol::Char(c) => c.to_string(),
                Symbol::Epsilon => "ε".to_string(),
            };
            output.push_str(&format!("    {} -> {} [label=\"{}\"]\n", from, to, label));
        }

        output.push('}');
        output
    }
}
