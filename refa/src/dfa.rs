//! Subset construction: determinizes an [`Nfa`] into a [`Dfa`].
//!
//! Each DFA state corresponds to an epsilon-closed set of NFA state ids.
//! Sets are discovered breadth-first from the start set and interned by a
//! `HashMap<BTreeSet<usize>, usize>` so that two discoveries of the same
//! set collapse to one DFA state. A single shared dead/sink state is
//! added only if some (state, token) pair would otherwise have no
//! transition.

use crate::nfa::{Nfa, Token};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A finalized DFA state.
#[derive(Debug, Clone)]
pub struct DfaState {
    id: usize,
    nfa_states: BTreeSet<usize>,
    transitions: BTreeMap<char, usize>,
    is_end: bool,
    is_dead: bool,
}

impl DfaState {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn is_end(&self) -> bool {
        self.is_end
    }

    pub fn is_dead(&self) -> bool {
        self.is_dead
    }

    /// The NFA states this DFA state was assembled from, kept for
    /// provenance/detailed rendering.
    pub fn nfa_states(&self) -> &BTreeSet<usize> {
        &self.nfa_states
    }

    pub fn transitions(&self) -> impl Iterator<Item = (char, usize)> + '_ {
        self.transitions.iter().map(|(&c, &t)| (c, t))
    }

    pub fn transition(&self, token: char) -> Option<usize> {
        self.transitions.get(&token).copied()
    }

    pub(crate) fn new(
        id: usize,
        nfa_states: BTreeSet<usize>,
        transitions: BTreeMap<char, usize>,
        is_end: bool,
        is_dead: bool,
    ) -> Self {
        DfaState {
            id,
            nfa_states,
            transitions,
            is_end,
            is_dead,
        }
    }
}

/// A finalized deterministic finite automaton.
#[derive(Debug, Clone)]
pub struct Dfa {
    states: Vec<DfaState>,
    start: usize,
    alphabet: Vec<char>,
}

impl Dfa {
    /// Subset-constructs a DFA equivalent to `nfa`.
    pub fn determinize(nfa: &Nfa) -> Dfa {
        let alphabet = collect_alphabet(nfa);

        let start_set = nfa.epsilon_closure([nfa.start()]);
        let mut set_to_id: HashMap<BTreeSet<usize>, usize> = HashMap::new();
        let mut built: Vec<(BTreeSet<usize>, BTreeMap<char, usize>)> = Vec::new();

        set_to_id.insert(start_set.clone(), 0);
        built.push((start_set.clone(), BTreeMap::new()));
        let mut queue = vec![start_set];

        while let Some(set) = queue.pop() {
            let id = *set_to_id.get(&set).expect("queued set was interned");

            let mut per_token: BTreeMap<char, BTreeSet<usize>> = BTreeMap::new();
            for &nstate in &set {
                for (token, target) in nfa.state(nstate).edges() {
                    if let Token::Char(c) = token {
                        per_token.entry(c).or_default().insert(target);
                    }
                }
            }

            let mut trans = BTreeMap::new();
            for (c, targets) in per_token {
                let closure = nfa.epsilon_closure(targets);
                let next_id = match set_to_id.get(&closure) {
                    Some(&existing) => existing,
                    None => {
                        let new_id = built.len();
                        set_to_id.insert(closure.clone(), new_id);
                        built.push((closure.clone(), BTreeMap::new()));
                        queue.push(closure);
                        new_id
                    }
                };
                trans.insert(c, next_id);
            }
            built[id].1 = trans;
        }

        let needs_dead_state = built
            .iter()
            .any(|(_, trans)| alphabet.iter().any(|c| !trans.contains_key(c)));

        if needs_dead_state {
            let dead_id = built.len();
            for (_, trans) in built.iter_mut() {
                for &c in &alphabet {
                    trans.entry(c).or_insert(dead_id);
                }
            }
            let dead_trans = alphabet.iter().map(|&c| (c, dead_id)).collect();
            built.push((BTreeSet::new(), dead_trans));
        }

        let end = nfa.end();
        let states = built
            .into_iter()
            .enumerate()
            .map(|(id, (nfa_states, transitions))| {
                let is_end = nfa_states.contains(&end);
                let is_dead = !is_end && transitions.values().all(|&t| t == id);
                DfaState {
                    id,
                    nfa_states,
                    transitions,
                    is_end,
                    is_dead,
                }
            })
            .collect();

        Dfa {
            states,
            start: 0,
            alphabet,
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn states(&self) -> &[DfaState] {
        &self.states
    }

    pub fn state(&self, id: usize) -> &DfaState {
        &self.states[id]
    }

    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    pub(crate) fn from_parts(states: Vec<DfaState>, start: usize, alphabet: Vec<char>) -> Self {
        Dfa {
            states,
            start,
            alphabet,
        }
    }

    /// Whether the DFA accepts `input`. Mostly useful for tests and
    /// benchmarks exercising the compiled automaton directly.
    pub fn accepts(&self, input: &str) -> bool {
        let mut current = self.start;
        for c in input.chars() {
            match self.states[current].transition(c) {
                Some(next) => current = next,
                None => return false,
            }
        }
        self.states[current].is_end
    }
}

fn collect_alphabet(nfa: &Nfa) -> Vec<char> {
    let mut set = BTreeSet::new();
    for state in nfa.states() {
        for (token, _) in state.edges() {
            if let Token::Char(c) = token {
                set.insert(c);
            }
        }
    }
    set.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nfa::Nfa;
    use crate::parser::parse;

    fn dfa_for(pattern: &str) -> Dfa {
        let nfa = Nfa::compile(&parse(pattern).unwrap());
        Dfa::determinize(&nfa)
    }

    #[test]
    fn empty_pattern() {
        let dfa = dfa_for("");
        assert!(dfa.accepts(""));
        assert!(!dfa.accepts("a"));
    }

    #[test]
    fn concatenation() {
        let dfa = dfa_for("abcde");
        assert!(dfa.states().len() >= 6);
        assert!(dfa.accepts("abcde"));
        assert!(!dfa.accepts("abcd"));
        assert!(!dfa.accepts("abcdef"));
        assert!(!dfa.accepts(""));
    }

    #[test]
    fn alternation() {
        let dfa = dfa_for("ab|de");
        assert!(dfa.states().len() >= 5);
        assert!(dfa.accepts("ab"));
        assert!(dfa.accepts("de"));
        assert!(!dfa.accepts("a"));
        assert!(!dfa.accepts("ad"));
        assert!(!dfa.accepts("abde"));
    }

    #[test]
    fn transition_domain_covers_the_whole_alphabet() {
        for pattern in ["a*(a|b)b*", "(a|b)*aaa(a|b)*", "a(bcd*|efgh?(jk)+)*"] {
            let dfa = dfa_for(pattern);
            for state in dfa.states() {
                for &c in dfa.alphabet() {
                    assert!(
                        state.transition(c).is_some(),
                        "state {} missing transition on {c:?}",
                        state.id()
                    );
                }
            }
        }
    }

    #[test]
    fn is_dead_iff_non_accepting_and_fully_self_looping() {
        let dfa = dfa_for("abcde");
        for state in dfa.states() {
            let all_self_loop = state.transitions().all(|(_, t)| t == state.id());
            assert_eq!(state.is_dead(), !state.is_end() && all_self_loop);
        }
    }

    #[test]
    fn star_union_star_shape() {
        let dfa = dfa_for("a*(a|b)b*");
        assert!(dfa.accepts("a"));
        assert!(dfa.accepts("b"));
        assert!(dfa.accepts("aab"));
        assert!(dfa.accepts("abbb"));
        assert!(!dfa.accepts(""));
        assert!(!dfa.accepts("ba"));
    }

    #[test]
    fn contains_aaa_shape() {
        let dfa = dfa_for("(a|b)*aaa(a|b)*");
        assert!(dfa.accepts("aaa"));
        assert!(dfa.accepts("baaab"));
        assert!(!dfa.accepts("aabab"));
        assert!(!dfa.accepts("bbbb"));
        assert!(!dfa.accepts(""));
    }

    #[test]
    fn complex_pattern_is_well_formed() {
        let dfa = dfa_for("a(bcd*|efgh?(jk)+)*");
        assert!(!dfa.states().is_empty());
        assert!(dfa.accepts("a"));
        assert!(dfa.accepts("abcd"));
        assert!(dfa.accepts("aefgjk"));
    }
}
