//! `refa` compiles a small regular-expression language into finite-state
//! automata.
//!
//! Given a pattern string, [`parser::parse`] produces a [`ast::RegexTree`];
//! [`nfa::Nfa::compile`] lowers that into a Thompson NFA with
//! epsilon-transitions; [`dfa::Dfa::determinize`] subset-constructs an
//! equivalent DFA; [`minimize::minimize`] reduces that DFA to its minimal
//! quotient via partition refinement.
//!
//! The supported grammar, in decreasing precedence: grouping `(…)` >
//! postfix unary `? * +` > concatenation (juxtaposition) > alternation
//! `|`. The alphabet is single-character literals plus those five
//! metacharacters — no escapes, character classes, anchors, or bounded
//! repetition.
//!
//! ```
//! use refa::{parser, nfa::Nfa, dfa::Dfa, minimize};
//!
//! let tree = parser::parse("a*(a|b)b*").unwrap();
//! let nfa = Nfa::compile(&tree);
//! let dfa = Dfa::determinize(&nfa);
//! let minimized = minimize::minimize(&dfa);
//! assert!(minimized.accepts("aab"));
//! assert!(!minimized.accepts("ba"));
//! ```

pub mod ast;
pub mod dfa;
pub mod minimize;
pub mod nfa;
pub mod parser;

pub use dfa::Dfa;
pub use nfa::Nfa;
