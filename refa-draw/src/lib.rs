//! Renders [`refa`]'s NFA/DFA traversal contract as Graphviz `dot` source.
//!
//! One dummy `shape="none"` node points at the start state (the
//! conventional "arrow from nowhere" automaton-diagram idiom); every other
//! node is `circle`, or `doublecircle` if it's accepting. Edges carry
//! their token as the label, with `ε` rendered as the empty string.

use refa::dfa::Dfa;
use refa::nfa::{Nfa, Token};

struct DotNode {
    id: usize,
    label: String,
    shape: &'static str,
}

struct DotEdge {
    from: usize,
    to: usize,
    label: String,
}

/// A graph under construction, independent of whether it came from an NFA
/// or a DFA.
pub struct DotGraph {
    nodes: Vec<DotNode>,
    edges: Vec<DotEdge>,
}

impl DotGraph {
    fn new() -> Self {
        DotGraph {
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    fn add_node(&mut self, label: impl Into<String>, shape: &'static str) -> usize {
        let id = self.nodes.len();
        self.nodes.push(DotNode {
            id,
            label: label.into(),
            shape,
        });
        id
    }

    fn add_edge(&mut self, from: usize, to: usize, label: impl Into<String>) {
        self.edges.push(DotEdge {
            from,
            to,
            label: label.into(),
        });
    }

    /// Renders the graph as `dot` source text.
    pub fn format(&self) -> String {
        let mut lines = vec!["digraph {".to_string(), "  rankdir=LR".to_string()];
        for node in &self.nodes {
            lines.push(format!(
                "  S{}[label=\"{}\",shape=\"{}\"]",
                node.id, node.label, node.shape
            ));
        }
        for edge in &self.edges {
            lines.push(format!(
                "  S{}->S{}[label=\"{}\"]",
                edge.from, edge.to, edge.label
            ));
        }
        lines.push("}".to_string());
        lines.join("\n")
    }
}

fn token_label(token: Token) -> String {
    match token {
        Token::Epsilon => String::new(),
        Token::Char(c) => c.to_string(),
    }
}

/// Renders an NFA: every state is `circle`, except the single accepting
/// state, which is `doublecircle`.
pub fn nfa_to_dot(nfa: &Nfa) -> DotGraph {
    let mut dot = DotGraph::new();
    let empty = dot.add_node("", "none");

    let mut nodes = vec![0usize; nfa.states().len()];
    for state in nfa.states() {
        let shape = if state.id() == nfa.end() {
            "doublecircle"
        } else {
            "circle"
        };
        nodes[state.id()] = dot.add_node(state.id().to_string(), shape);
    }

    dot.add_edge(empty, nodes[nfa.start()], "");
    for state in nfa.states() {
        for (token, target) in state.edges() {
            dot.add_edge(nodes[state.id()], nodes[target], token_label(token));
        }
    }
    dot
}

/// Renders a DFA.
///
/// `details`: label each node with its comma-joined originating NFA state
/// ids instead of its own DFA id.
/// `show_deads`: when `false`, omit dead states and any edge touching one.
pub fn dfa_to_dot(dfa: &Dfa, details: bool, show_deads: bool) -> DotGraph {
    let mut dot = DotGraph::new();
    let empty = dot.add_node("", "none");

    let mut nodes: Vec<Option<usize>> = vec![None; dfa.states().len()];
    for state in dfa.states() {
        if !show_deads && state.is_dead() {
            continue;
        }
        let shape = if state.is_end() { "doublecircle" } else { "circle" };
        let label = if details {
            state
                .nfa_states()
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(",")
        } else {
            state.id().to_string()
        };
        nodes[state.id()] = Some(dot.add_node(label, shape));
    }

    if let Some(start) = nodes[dfa.start()] {
        dot.add_edge(empty, start, "");
    }

    for state in dfa.states() {
        let Some(from) = nodes[state.id()] else {
            continue;
        };
        for (token, target) in state.transitions() {
            if !show_deads && (state.is_dead() || dfa.state(target).is_dead()) {
                continue;
            }
            if let Some(to) = nodes[target] {
                dot.add_edge(from, to, token.to_string());
            }
        }
    }
    dot
}

#[cfg(test)]
mod tests {
    use super::*;
    use refa::parser;

    fn compile(pattern: &str) -> Nfa {
        Nfa::compile(&parser::parse(pattern).unwrap())
    }

    #[test]
    fn nfa_dot_has_one_doublecircle() {
        let nfa = compile("a|b");
        let dot = nfa_to_dot(&nfa).format();
        assert_eq!(dot.matches("doublecircle").count(), 1);
        assert!(dot.starts_with("digraph {"));
        assert!(dot.contains("rankdir=LR"));
    }

    #[test]
    fn dfa_dot_hides_dead_states_when_asked() {
        let nfa = compile("ab");
        let dfa = Dfa::determinize(&nfa);
        let shown = dfa_to_dot(&dfa, false, true).format();
        let hidden = dfa_to_dot(&dfa, false, false).format();
        assert!(shown.lines().count() >= hidden.lines().count());
    }

    #[test]
    fn dfa_dot_details_mode_labels_with_nfa_ids() {
        let nfa = compile("ab");
        let dfa = Dfa::determinize(&nfa);
        let dot = dfa_to_dot(&dfa, true, true).format();
        // Every labeled node should show at least one digit (an NFA id),
        // or be the empty dummy/start node.
        assert!(dot.contains("label=\""));
    }
}
