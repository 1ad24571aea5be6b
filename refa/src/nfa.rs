//! Thompson construction: lowers a [`RegexTree`] into an NFA with
//! epsilon-transitions.
//!
//! Construction works over the arena in [`NfaBuilder`], producing
//! [`Fragment`]s with a resolved start state and a list of *dangling*
//! edges — edges whose target hasn't been chosen yet. Composing two
//! fragments means patching one's dangling edges to the other's start.
//! Once the whole tree is built, [`Nfa::compile`] patches the final
//! dangling edges to a fresh accepting state and assigns dense ids via a
//! stack-based traversal (not breadth-first — don't rely on the order).

use crate::ast::RegexTree;
use std::collections::BTreeSet;

/// An edge label: either a literal character or the epsilon marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    Epsilon,
    Char(char),
}

#[derive(Debug, Clone)]
struct BuildEdge {
    token: Token,
    target: Option<usize>,
}

/// A state during construction: at most two outgoing edges, matching
/// Thompson's construction's fork shape.
#[derive(Debug, Clone, Default)]
struct BuildState {
    edges: Vec<BuildEdge>,
}

impl BuildState {
    fn push(&mut self, token: Token, target: Option<usize>) -> usize {
        debug_assert!(self.edges.len() < 2, "NFA states have at most two edges");
        self.edges.push(BuildEdge { token, target });
        self.edges.len() - 1
    }
}

/// A built-but-not-yet-composed sub-NFA: a start state plus the edges
/// still waiting for a target.
struct Fragment {
    start: usize,
    dangling: Vec<(usize, usize)>,
}

#[derive(Default)]
struct NfaBuilder {
    states: Vec<BuildState>,
}

impl NfaBuilder {
    fn new_state(&mut self) -> usize {
        self.states.push(BuildState::default());
        self.states.len() - 1
    }

    fn push_edge(&mut self, state: usize, token: Token, target: Option<usize>) -> (usize, usize) {
        let slot = self.states[state].push(token, target);
        (state, slot)
    }

    fn patch(&mut self, dangling: &[(usize, usize)], target: usize) {
        for &(state, slot) in dangling {
            self.states[state].edges[slot].target = Some(target);
        }
    }

    fn build(&mut self, tree: &RegexTree) -> Fragment {
        match tree {
            RegexTree::Empty => {
                let s = self.new_state();
                let edge = self.push_edge(s, Token::Epsilon, None);
                Fragment {
                    start: s,
                    dangling: vec![edge],
                }
            }
            RegexTree::Char(c) => {
                let s = self.new_state();
                let edge = self.push_edge(s, Token::Char(*c), None);
                Fragment {
                    start: s,
                    dangling: vec![edge],
                }
            }
            RegexTree::Concat(a, b) => {
                let frag_a = self.build(a);
                let frag_b = self.build(b);
                self.patch(&frag_a.dangling, frag_b.start);
                Fragment {
                    start: frag_a.start,
                    dangling: frag_b.dangling,
                }
            }
            RegexTree::Or(a, b) => {
                let frag_a = self.build(a);
                let frag_b = self.build(b);
                let s = self.new_state();
                self.push_edge(s, Token::Epsilon, Some(frag_a.start));
                self.push_edge(s, Token::Epsilon, Some(frag_b.start));
                let mut dangling = frag_a.dangling;
                dangling.extend(frag_b.dangling);
                Fragment { start: s, dangling }
            }
            RegexTree::OneOrMore(a) => {
                let frag_a = self.build(a);
                let s = self.new_state();
                self.push_edge(s, Token::Epsilon, Some(frag_a.start));
                let loop_out = self.push_edge(s, Token::Epsilon, None);
                self.patch(&frag_a.dangling, s);
                Fragment {
                    start: frag_a.start,
                    dangling: vec![loop_out],
                }
            }
            RegexTree::ZeroOrMore(a) => {
                let frag_a = self.build(a);
                let s = self.new_state();
                self.push_edge(s, Token::Epsilon, Some(frag_a.start));
                let loop_out = self.push_edge(s, Token::Epsilon, None);
                self.patch(&frag_a.dangling, s);
                Fragment {
                    start: s,
                    dangling: vec![loop_out],
                }
            }
            RegexTree::ZeroOrOne(a) => {
                let frag_a = self.build(a);
                let s = self.new_state();
                self.push_edge(s, Token::Epsilon, Some(frag_a.start));
                let skip = self.push_edge(s, Token::Epsilon, None);
                let mut dangling = frag_a.dangling;
                dangling.push(skip);
                Fragment { start: s, dangling }
            }
        }
    }
}

/// A finalized NFA state: a dense id and its outgoing (token, target)
/// edges.
#[derive(Debug, Clone)]
pub struct NfaState {
    id: usize,
    edges: Vec<(Token, usize)>,
}

impl NfaState {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn edges(&self) -> impl Iterator<Item = (Token, usize)> + '_ {
        self.edges.iter().copied()
    }
}

/// A finalized Thompson NFA: one start state, exactly one accepting
/// (end) state, dense 0..N state ids.
#[derive(Debug, Clone)]
pub struct Nfa {
    states: Vec<NfaState>,
    start: usize,
    end: usize,
}

impl Nfa {
    /// Lowers a regex AST into a finalized NFA.
    pub fn compile(tree: &RegexTree) -> Nfa {
        let mut builder = NfaBuilder::default();
        let body = builder.build(tree);
        let end = builder.new_state();
        builder.patch(&body.dangling, end);
        Self::finalize(builder.states, body.start, end)
    }

    fn finalize(build_states: Vec<BuildState>, start: usize, end: usize) -> Nfa {
        let n = build_states.len();
        let mut id_of: Vec<Option<usize>> = vec![None; n];
        let mut next_id = 0usize;
        id_of[start] = Some(next_id);
        next_id += 1;
        let mut pending = vec![start];
        while let Some(cur) = pending.pop() {
            for edge in &build_states[cur].edges {
                let target = edge
                    .target
                    .expect("dangling edge survived finalization (builder bug)");
                if id_of[target].is_none() {
                    id_of[target] = Some(next_id);
                    next_id += 1;
                    pending.push(target);
                }
            }
        }

        let mut states: Vec<Option<NfaState>> = (0..next_id).map(|_| None).collect();
        for (build_idx, state) in build_states.into_iter().enumerate() {
            let Some(id) = id_of[build_idx] else {
                // Unreachable from the start state — can't happen for a
                // well-formed fragment tree, every state is wired in by
                // construction.
                continue;
            };
            let edges = state
                .edges
                .into_iter()
                .map(|e| {
                    let target = e.target.expect("dangling edge survived finalization");
                    (e.token, id_of[target].expect("reachable target"))
                })
                .collect();
            states[id] = Some(NfaState { id, edges });
        }

        Nfa {
            states: states.into_iter().map(|s| s.expect("dense ids")).collect(),
            start: id_of[start].unwrap(),
            end: id_of[end].unwrap(),
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn states(&self) -> &[NfaState] {
        &self.states
    }

    pub fn state(&self, id: usize) -> &NfaState {
        &self.states[id]
    }

    /// The epsilon-closure of a set of state ids: the set together with
    /// every state reachable from it by zero or more epsilon edges.
    pub(crate) fn epsilon_closure(&self, seed: impl IntoIterator<Item = usize>) -> BTreeSet<usize> {
        let mut closure: BTreeSet<usize> = seed.into_iter().collect();
        let mut stack: Vec<usize> = closure.iter().copied().collect();
        while let Some(s) = stack.pop() {
            for (token, target) in self.states[s].edges() {
                if token == Token::Epsilon && closure.insert(target) {
                    stack.push(target);
                }
            }
        }
        closure
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn nfa_for(pattern: &str) -> Nfa {
        Nfa::compile(&parse(pattern).unwrap())
    }

    #[test]
    fn empty_pattern_has_two_states() {
        let nfa = nfa_for("");
        assert_eq!(nfa.states().len(), 2);
    }

    #[test]
    fn single_accepting_state_reachable_from_start() {
        for pattern in ["", "a", "a*(a|b)b*", "(a|b)*aaa(a|b)*"] {
            let nfa = nfa_for(pattern);
            let reachable = reachable_from(&nfa, nfa.start());
            assert!(reachable.contains(&nfa.end()));
            for state in nfa.states() {
                assert!(reachable.contains(&state.id()), "state {} unreachable", state.id());
            }
        }
    }

    #[test]
    fn dense_ids() {
        let nfa = nfa_for("a(bcd*|efgh?(jk)+)*");
        let ids: BTreeSet<_> = nfa.states().iter().map(|s| s.id()).collect();
        assert_eq!(ids, (0..nfa.states().len()).collect());
    }

    fn reachable_from(nfa: &Nfa, start: usize) -> BTreeSet<usize> {
        let mut seen = BTreeSet::new();
        let mut stack = vec![start];
        seen.insert(start);
        while let Some(s) = stack.pop() {
            for (_, target) in nfa.state(s).edges() {
                if seen.insert(target) {
                    stack.push(target);
                }
            }
        }
        seen
    }
}
