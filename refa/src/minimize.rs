//! Partition refinement: reduces a [`Dfa`] to its minimal quotient.
//!
//! Starts from the two-block partition (accepting / non-accepting) and
//! repeatedly splits each block on the first token whose successor-block
//! map isn't constant across the block. A block that agrees on every
//! token for a whole pass survives unsplit. This is a looser refinement
//! than Hopcroft's worklist algorithm — it can take more passes to
//! converge — but it produces the same final partition, and it's the one
//! the source implementation uses.

use crate::dfa::{Dfa, DfaState};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Minimizes `dfa`, returning a new DFA. `dfa` itself is untouched.
pub fn minimize(dfa: &Dfa) -> Dfa {
    let n = dfa.states().len();
    let accepting: Vec<usize> = (0..n).filter(|&i| dfa.state(i).is_end()).collect();
    let non_accepting: Vec<usize> = (0..n).filter(|&i| !dfa.state(i).is_end()).collect();

    let mut groups: Vec<Vec<usize>> = [non_accepting, accepting]
        .into_iter()
        .filter(|g| !g.is_empty())
        .collect();

    loop {
        let mut state_to_group: HashMap<usize, usize> = HashMap::new();
        for (gi, group) in groups.iter().enumerate() {
            for &s in group {
                state_to_group.insert(s, gi);
            }
        }

        let mut new_groups: Vec<Vec<usize>> = Vec::new();
        for group in &groups {
            let mut split: Option<Vec<Vec<usize>>> = None;
            for &token in dfa.alphabet() {
                let mut by_target_group: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
                for &s in group {
                    let target = dfa
                        .state(s)
                        .transition(token)
                        .expect("DFA transitions are total over the alphabet");
                    let target_group = state_to_group[&target];
                    by_target_group.entry(target_group).or_default().push(s);
                }
                if by_target_group.len() > 1 {
                    split = Some(by_target_group.into_values().collect());
                    break;
                }
            }
            match split {
                Some(sub_groups) => new_groups.extend(sub_groups),
                None => new_groups.push(group.clone()),
            }
        }

        let stable = new_groups.len() == groups.len();
        groups = new_groups;
        if stable {
            break;
        }
    }

    build_quotient(dfa, groups)
}

fn build_quotient(dfa: &Dfa, groups: Vec<Vec<usize>>) -> Dfa {
    let mut state_to_group: HashMap<usize, usize> = HashMap::new();
    for (gi, group) in groups.iter().enumerate() {
        for &s in group {
            state_to_group.insert(s, gi);
        }
    }

    // Representative per group is its first member; `is_end`/`is_dead`
    // and the relabeling sort key come from it, matching the source.
    let reps: Vec<usize> = groups.iter().map(|g| g[0]).collect();

    let nfa_sets: Vec<BTreeSet<usize>> = groups
        .iter()
        .map(|group| {
            let mut set = BTreeSet::new();
            for &s in group {
                set.extend(dfa.state(s).nfa_states().iter().copied());
            }
            set
        })
        .collect();

    let transitions_per_group: Vec<BTreeMap<char, usize>> = reps
        .iter()
        .map(|&rep| {
            dfa.alphabet()
                .iter()
                .map(|&c| {
                    let target = dfa
                        .state(rep)
                        .transition(c)
                        .expect("DFA transitions are total over the alphabet");
                    (c, state_to_group[&target])
                })
                .collect()
        })
        .collect();

    let start_group = state_to_group[&dfa.start()];

    let mut order: Vec<usize> = (0..groups.len()).collect();
    order.sort_by_key(|&gi| dfa.state(reps[gi]).id());

    let mut new_id_of_group = vec![0usize; groups.len()];
    for (new_id, &gi) in order.iter().enumerate() {
        new_id_of_group[gi] = new_id;
    }

    let mut new_states: Vec<Option<DfaState>> = (0..groups.len()).map(|_| None).collect();
    for &gi in &order {
        let new_id = new_id_of_group[gi];
        let rep = reps[gi];
        let transitions = transitions_per_group[gi]
            .iter()
            .map(|(&c, &target_gi)| (c, new_id_of_group[target_gi]))
            .collect();
        new_states[new_id] = Some(DfaState::new(
            new_id,
            nfa_sets[gi].clone(),
            transitions,
            dfa.state(rep).is_end(),
            dfa.state(rep).is_dead(),
        ));
    }

    Dfa::from_parts(
        new_states.into_iter().map(|s| s.expect("dense ids")).collect(),
        new_id_of_group[start_group],
        dfa.alphabet().to_vec(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nfa::Nfa;
    use crate::parser::parse;

    fn minimized_for(pattern: &str) -> Dfa {
        let nfa = Nfa::compile(&parse(pattern).unwrap());
        let dfa = Dfa::determinize(&nfa);
        minimize(&dfa)
    }

    #[test]
    fn minimization_is_idempotent() {
        for pattern in ["", "a", "abcde", "ab|de", "a*(a|b)b*", "(a|b)*aaa(a|b)*"] {
            let once = minimized_for(pattern);
            let twice = minimize(&once);
            assert_eq!(once.states().len(), twice.states().len(), "pattern {pattern:?}");
        }
    }

    #[test]
    fn minimization_preserves_language() {
        let words = [
            "", "a", "b", "aa", "ab", "ba", "bb", "aab", "abb", "abbb", "baaab",
        ];
        for pattern in ["a*(a|b)b*", "(a|b)*aaa(a|b)*", "abcde", "ab|de"] {
            let nfa = Nfa::compile(&parse(pattern).unwrap());
            let dfa = Dfa::determinize(&nfa);
            let mini = minimize(&dfa);
            for w in words {
                assert_eq!(
                    dfa.accepts(w),
                    mini.accepts(w),
                    "pattern {pattern:?} word {w:?} disagreement"
                );
            }
        }
    }

    #[test]
    fn star_union_star_has_few_live_states() {
        let mini = minimized_for("a*(a|b)b*");
        let live = mini.states().iter().filter(|s| !s.is_dead()).count();
        assert!(live <= 3, "expected <=3 live states, got {live}");
        assert!(mini.accepts("a"));
        assert!(mini.accepts("b"));
        assert!(mini.accepts("aab"));
        assert!(mini.accepts("abbb"));
        assert!(!mini.accepts(""));
        assert!(!mini.accepts("ba"));
    }

    #[test]
    fn contains_aaa_minimizes_cleanly() {
        let mini = minimized_for("(a|b)*aaa(a|b)*");
        assert!(mini.accepts("aaa"));
        assert!(mini.accepts("baaab"));
        assert!(!mini.accepts("aabab"));
        assert!(!mini.accepts("bbbb"));
        assert!(!mini.accepts(""));
    }

    #[test]
    fn dead_block_stays_a_single_self_looping_block() {
        let mini = minimized_for("abcde");
        let dead_states: Vec<_> = mini.states().iter().filter(|s| s.is_dead()).collect();
        assert!(dead_states.len() <= 1);
        for s in &dead_states {
            assert!(s.transitions().all(|(_, t)| t == s.id()));
        }
    }

    #[test]
    fn empty_alphabet_does_not_panic() {
        // "" compiles to a DFA with no char transitions at all; the
        // minimizer must not try to split on a nonexistent token.
        let mini = minimized_for("");
        assert!(mini.accepts(""));
        assert!(!mini.accepts("a"));
    }
}
