//!# reglang
//!
//! `reglang` is a Rust library for *extended* regular expressions: patterns
//! are first-class algebraic values closed under union, intersection,
//! complement, concatenation and Kleene star, compiled into deterministic
//! finite automata by Brzozowski derivatives. On top of the automaton the
//! library decides properties of the recognized language (emptiness,
//! finiteness, a longest accepted string), minimizes and compares automata,
//! and generates accepted strings: uniformly at random for a given length,
//! or exhaustively, each string exactly once.
//!
//! ## Usage
//!
//! ```rust
//! use reglang::generate::RandomGenerator;
//!
//! // Patterns use a POSIX-style surface syntax with lookaround
//! let regex = reglang::compile("a[abc]*b[abc]*c").unwrap();
//! assert!(regex.matches("abbbbc"));
//! assert!(!regex.matches("acb"));
//!
//! // Intersection and complement are ordinary term operations
//! let even_as = reglang::compile("(aa)*").unwrap();
//! let short = reglang::compile("a{0,6}").unwrap();
//! let both = even_as.and(&short);
//! assert!(both.matches("aaaa"));
//! assert!(!both.matches("aaa"));
//!
//! // Terms compile to DFAs, which answer language questions...
//! let dfa = both.to_dfa("a");
//! assert!(dfa.has_finite_language());
//! assert_eq!(dfa.longest_string().unwrap(), "aaaaaa");
//!
//! // ...and drive uniform random sampling of the language
//! let mut generator = RandomGenerator::new(&dfa).unwrap();
//! let word = generator.generate_string(4).unwrap();
//! assert_eq!(word, "aaaa");
//! assert!(generator.generate_string(3).is_none());
//! ```
//!
//! ## Operations
//!
//! This library currently supports:
//!
//! * [Parsing patterns](parser::regex) into canonical algebra terms
//! * Building terms directly with the [smart constructors](regex::Regex),
//!   including [intersection](regex::Regex::intersect) and
//!   [complement](regex::Regex::complement)
//! * [Exact matching](regex::Regex::matches) by repeated derivation, with
//!   both ends implicitly anchored
//! * [Compiling a term to a DFA](regex::Regex::to_dfa) over any alphabet
//! * Deciding [emptiness](dfa::Dfa::is_empty_language) and
//!   [finiteness](dfa::Dfa::has_finite_language) of the recognized
//!   language, and extracting a [longest string](dfa::Dfa::longest_string)
//! * [Minimizing](dfa::Dfa::minimized) a DFA and testing
//!   [equivalence](dfa::Dfa::equivalent_to) and
//!   [isomorphism](dfa::Dfa::construct_isomorphism)
//! * [Uniform random generation](generate::RandomGenerator) of accepted
//!   strings of a given length, and
//!   [deterministic enumeration](generate::DeterministicGenerator) of the
//!   whole language
//!
//! Capture groups, back-references, anchors and partial (unanchored)
//! matching are out of scope; a pattern always describes whole strings.

pub mod dfa;
pub mod generate;
pub mod parser;
pub mod regex;
mod table;
mod util;

use crate::dfa::Dfa;
use crate::parser::ParseError;
use crate::regex::Regex;

/// Parses a pattern into a canonical [Regex] term.
///
/// ```
/// let regex = reglang::compile("(ab)+").unwrap();
/// assert!(regex.matches("abab"));
/// assert!(!regex.matches(""));
/// ```
pub fn compile(pattern: &str) -> Result<Regex, ParseError> {
    parser::regex(pattern)
}

/// Parses a pattern and compiles it to a [Dfa] over the given alphabet.
/// Use [dfa::default_alphabet] for printable ASCII.
///
/// ```
/// let dfa = reglang::build_dfa("0|1[01]*", "01").unwrap();
/// assert!(dfa.accepts("1010"));
/// assert!(!dfa.accepts("01"));
/// ```
pub fn build_dfa(pattern: &str, alphabet: &str) -> Result<Dfa, ParseError> {
    Ok(compile(pattern)?.to_dfa(alphabet))
}

#[cfg(test)]
mod tests;
