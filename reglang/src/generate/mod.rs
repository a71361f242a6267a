//! # Language generation
//! This module samples and enumerates the strings a [Dfa] accepts.
//!
//! The machinery follows the "recursive RGA" algorithm of Bernardi &
//! Giménez ("A Linear Algorithm for the Random Generation of Regular
//! Languages", Algorithmica 62). The DFA's graph is augmented with a sink
//! node fed by every accepting state; multiplying the adjacency matrix of
//! that graph against the sink indicator vector, once per character of
//! remaining length, yields for every state the number of accepted strings
//! of each length starting there. Those counts grow exponentially with the
//! length, so each vector is normalized to a probability distribution as it
//! is produced; only ratios within one vector are ever consumed, and the
//! normalization keeps everything inside the floating-point range no matter
//! how long the requested strings are.
//!
//! Drawing a character with probability proportional to the count of
//! completions after it yields a string chosen *uniformly* among all
//! accepted strings of the requested length:
//!
//! ```
//! use reglang::build_dfa;
//! use reglang::generate::RandomGenerator;
//!
//! let dfa = build_dfa("(a|bb|ccc)*", "abc").unwrap();
//! let mut generator = RandomGenerator::new(&dfa).unwrap();
//!
//! // "a" is the only accepted one-character string
//! assert_eq!(generator.generate_string(1), Some("a".to_string()));
//! // longer draws are uniform over the accepted strings of that length
//! let word = generator.generate_string(7).unwrap();
//! assert!(dfa.accepts(&word));
//! ```
//!
//! [DeterministicGenerator] drives the same machinery with a round-robin
//! drawing policy instead of a random one, which makes exhaustive
//! enumeration possible: [DeterministicGenerator::matching_strings] yields
//! every accepted string exactly once, shortest lengths first.
//!
//! ```
//! use reglang::build_dfa;
//! use reglang::generate::DeterministicGenerator;
//!
//! let dfa = build_dfa("aa|b", "ab").unwrap();
//! let mut generator = DeterministicGenerator::new(&dfa).unwrap();
//! let words: Vec<String> = generator.matching_strings().collect();
//! assert_eq!(words, vec!["b".to_string(), "aa".to_string()]);
//! ```

use crate::dfa::{Dfa, LanguageError};
use nalgebra::{DMatrix, DVector};
use rand::Rng;
use std::collections::HashMap;
use thiserror::Error;

/// Rejection raised when constructing a generator from an unusable DFA.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerateError {
    /// The DFA is not total: the given state is missing transitions for
    /// part of its alphabet.
    #[error("invalid DFA: state {0} is missing transitions for part of the alphabet")]
    InvalidDfa(usize),
}

/// The per-length path-weight vectors of a sink-augmented DFA graph.
/// `weight(u, n)` is proportional (within fixed `n`) to the number of
/// accepted strings of length `n` readable from state `u`; vectors are
/// computed incrementally by one matrix-vector product per length and kept
/// normalized so they never overflow.
#[derive(Debug, Clone)]
struct PathWeights {
    matrix: DMatrix<f64>,
    vectors: Vec<DVector<f64>>,
}

impl PathWeights {
    fn new(dfa: &Dfa) -> Self {
        let states = dfa.states().len();
        let sink = states;
        let mut matrix = DMatrix::zeros(states + 1, states + 1);
        for (from, state) in dfa.states().iter().enumerate() {
            for &to in state.transitions() {
                matrix[(from, to)] += 1.0;
            }
            if state.is_accepting() {
                matrix[(from, sink)] = 1.0;
            }
        }
        let mut sink_indicator = DVector::zeros(states + 1);
        sink_indicator[sink] = 1.0;
        // One application of the matrix turns the sink indicator into the
        // accepting-state indicator: the length-0 weights.
        let first = normalized(&matrix * sink_indicator);
        Self {
            matrix,
            vectors: vec![first],
        }
    }

    fn weight(&mut self, state: usize, length: usize) -> f64 {
        while self.vectors.len() <= length {
            let next = normalized(&self.matrix * self.vectors.last().unwrap());
            self.vectors.push(next);
        }
        self.vectors[length][state]
    }
}

fn normalized(mut vector: DVector<f64>) -> DVector<f64> {
    let total = vector.sum();
    if total > 0.0 {
        vector /= total;
    }
    vector
}

/// How far [ValidLengths] has to look.
#[derive(Debug, Clone, Copy)]
enum LengthBound {
    Empty,
    UpTo(usize),
    Unbounded,
}

/// State shared by both generators: the integerized DFA, its path weights,
/// and the bound on lengths worth considering.
#[derive(Debug)]
struct GeneratorCore {
    dfa: Dfa,
    weights: PathWeights,
    length_bound: LengthBound,
}

impl GeneratorCore {
    fn new(dfa: &Dfa) -> Result<Self, GenerateError> {
        if let Some(&state) = dfa.find_invalid_states().first() {
            return Err(GenerateError::InvalidDfa(state));
        }
        let dfa = dfa.integerized();
        let length_bound = match dfa.longest_string() {
            Ok(longest) => LengthBound::UpTo(longest.chars().count()),
            Err(LanguageError::EmptyLanguage) => LengthBound::Empty,
            Err(LanguageError::InfiniteLanguage) => LengthBound::Unbounded,
        };
        let weights = PathWeights::new(&dfa);
        Ok(Self {
            dfa,
            weights,
            length_bound,
        })
    }

    /// The weight of each alphabet symbol when `remaining` characters are
    /// left to produce from `state`: the weight of symbol `c` is the
    /// path weight of length `remaining - 1` at the state `c` leads to.
    fn symbol_weights(&mut self, state: usize, remaining: usize) -> Vec<f64> {
        let targets: Vec<usize> = self.dfa.states()[state].transitions().to_vec();
        targets
            .into_iter()
            .map(|to| self.weights.weight(to, remaining - 1))
            .collect()
    }

    fn start_accepting(&self) -> bool {
        self.dfa.states()[0].is_accepting()
    }
}

/// A discrete distribution over symbol indices, sampled by inverting the
/// cumulative distribution.
#[derive(Debug, Clone)]
struct DiscreteRandomVariable {
    cumulative: Vec<f64>,
}

impl DiscreteRandomVariable {
    /// `None` when every weight is zero: there is nothing to draw.
    fn new(weights: &[f64]) -> Option<Self> {
        let total: f64 = weights.iter().sum();
        if total == 0.0 {
            return None;
        }
        let mut cumulative = Vec::with_capacity(weights.len());
        let mut acc = 0.0;
        for weight in weights {
            acc += weight / total;
            cumulative.push(acc);
        }
        Some(Self { cumulative })
    }

    fn draw<R: Rng>(&self, rng: &mut R) -> usize {
        let x: f64 = rng.gen();
        self.cumulative
            .partition_point(|&end| end < x)
            .min(self.cumulative.len() - 1)
    }
}

/// Cycles through the positive-weight symbol indices, least frequent
/// first. Used both as the deterministic drawing policy and as the fixed
/// symbol order of the exhaustive enumerator.
#[derive(Debug, Clone)]
struct LeastFrequentRoundRobin {
    order: Vec<usize>,
    cursor: usize,
}

impl LeastFrequentRoundRobin {
    fn new(weights: &[f64]) -> Option<Self> {
        let mut order: Vec<usize> =
            (0..weights.len()).filter(|&idx| weights[idx] > 0.0).collect();
        if order.is_empty() {
            return None;
        }
        order.sort_by(|&a, &b| weights[a].total_cmp(&weights[b]));
        Some(Self { order, cursor: 0 })
    }

    fn draw(&mut self) -> usize {
        let symbol = self.order[self.cursor];
        self.cursor = (self.cursor + 1) % self.order.len();
        symbol
    }

    fn symbols(&self) -> &[usize] {
        &self.order
    }
}

/// Generates strings accepted by a DFA, chosen uniformly at random among
/// all accepted strings of the requested length. See the
/// [module-level documentation](self) for how.
#[derive(Debug)]
pub struct RandomGenerator {
    core: GeneratorCore,
    dists: HashMap<(usize, usize), Option<DiscreteRandomVariable>>,
}

impl RandomGenerator {
    /// Fails with [GenerateError::InvalidDfa] when the DFA is not total
    /// over its alphabet.
    pub fn new(dfa: &Dfa) -> Result<Self, GenerateError> {
        Ok(Self {
            core: GeneratorCore::new(dfa)?,
            dists: HashMap::new(),
        })
    }

    fn dist(&mut self, state: usize, remaining: usize) -> Option<DiscreteRandomVariable> {
        if !self.dists.contains_key(&(state, remaining)) {
            let weights = self.core.symbol_weights(state, remaining);
            self.dists
                .insert((state, remaining), DiscreteRandomVariable::new(&weights));
        }
        self.dists[&(state, remaining)].clone()
    }

    /// Returns a string of exactly `length` characters accepted by the
    /// DFA, drawn uniformly at random among all of them, or `None` when no
    /// accepted string of that length exists.
    pub fn generate_string(&mut self, length: usize) -> Option<String> {
        self.generate_string_with(length, &mut rand::thread_rng())
    }

    /// Like [RandomGenerator::generate_string], drawing from the given
    /// random number generator (useful for seeded, reproducible runs).
    pub fn generate_string_with<R: Rng>(
        &mut self,
        length: usize,
        rng: &mut R,
    ) -> Option<String> {
        if length == 0 {
            return self.core.start_accepting().then(String::new);
        }
        if self.core.weights.weight(0, length) == 0.0 {
            return None;
        }
        let mut state = 0;
        let mut out = String::with_capacity(length);
        for consumed in 0..length {
            let dist = self.dist(state, length - consumed)?;
            let symbol = dist.draw(rng);
            out.push(self.core.dfa.alphabet()[symbol]);
            state = self.core.dfa.states()[state].transitions()[symbol];
        }
        Some(out)
    }

    /// Iterates over every length for which at least one accepted string
    /// exists, in increasing order.
    pub fn valid_lengths(&mut self) -> ValidLengths<'_> {
        ValidLengths {
            core: &mut self.core,
            next_length: 0,
        }
    }
}

/// Generates and enumerates accepted strings with a deterministic drawing
/// policy: at each step the positive-weight symbols are taken in rotation,
/// least frequent first.
#[derive(Debug)]
pub struct DeterministicGenerator {
    core: GeneratorCore,
    dists: HashMap<(usize, usize), Option<LeastFrequentRoundRobin>>,
}

impl DeterministicGenerator {
    /// Fails with [GenerateError::InvalidDfa] when the DFA is not total
    /// over its alphabet.
    pub fn new(dfa: &Dfa) -> Result<Self, GenerateError> {
        Ok(Self {
            core: GeneratorCore::new(dfa)?,
            dists: HashMap::new(),
        })
    }

    fn ensure_dist(&mut self, state: usize, remaining: usize) {
        if !self.dists.contains_key(&(state, remaining)) {
            let weights = self.core.symbol_weights(state, remaining);
            self.dists
                .insert((state, remaining), LeastFrequentRoundRobin::new(&weights));
        }
    }

    fn draw(&mut self, state: usize, remaining: usize) -> Option<usize> {
        self.ensure_dist(state, remaining);
        self.dists
            .get_mut(&(state, remaining))
            .unwrap()
            .as_mut()
            .map(LeastFrequentRoundRobin::draw)
    }

    fn symbols(&mut self, state: usize, remaining: usize) -> Vec<usize> {
        self.ensure_dist(state, remaining);
        self.dists[&(state, remaining)]
            .as_ref()
            .map(|dist| dist.symbols().to_vec())
            .unwrap_or_default()
    }

    /// Returns a string of exactly `length` accepted characters, or `None`
    /// when no accepted string of that length exists. Successive calls
    /// with the same length walk through different accepted strings (the
    /// round-robin cursors advance).
    pub fn generate_string(&mut self, length: usize) -> Option<String> {
        if length == 0 {
            return self.core.start_accepting().then(String::new);
        }
        if self.core.weights.weight(0, length) == 0.0 {
            return None;
        }
        let mut state = 0;
        let mut out = String::with_capacity(length);
        for consumed in 0..length {
            let symbol = self.draw(state, length - consumed)?;
            out.push(self.core.dfa.alphabet()[symbol]);
            state = self.core.dfa.states()[state].transitions()[symbol];
        }
        Some(out)
    }

    /// Iterates over every length for which at least one accepted string
    /// exists, in increasing order.
    pub fn valid_lengths(&mut self) -> ValidLengths<'_> {
        ValidLengths {
            core: &mut self.core,
            next_length: 0,
        }
    }

    /// Iterates over *all* strings the DFA accepts, each exactly once, in
    /// order of increasing length. Finite languages are exhausted; for an
    /// infinite language the iterator never ends.
    pub fn matching_strings(&mut self) -> MatchingStrings<'_> {
        MatchingStrings {
            generator: self,
            next_length: 0,
            target_length: 0,
            stack: Vec::new(),
            prefix: Vec::new(),
        }
    }
}

/// Iterator over the lengths with at least one accepted string. Created by
/// [RandomGenerator::valid_lengths] and
/// [DeterministicGenerator::valid_lengths].
#[derive(Debug)]
pub struct ValidLengths<'a> {
    core: &'a mut GeneratorCore,
    next_length: usize,
}

impl Iterator for ValidLengths<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            match self.core.length_bound {
                LengthBound::Empty => return None,
                LengthBound::UpTo(max) if self.next_length > max => return None,
                _ => {}
            }
            let length = self.next_length;
            self.next_length += 1;
            if self.core.weights.weight(0, length) > 0.0 {
                return Some(length);
            }
        }
    }
}

/// Iterator over every accepted string, created by
/// [DeterministicGenerator::matching_strings]. Runs a depth-first search
/// per valid length, consuming symbols in the deterministic order, so each
/// accepted string appears exactly once.
#[derive(Debug)]
pub struct MatchingStrings<'a> {
    generator: &'a mut DeterministicGenerator,
    next_length: usize,
    target_length: usize,
    stack: Vec<Frame>,
    prefix: Vec<char>,
}

#[derive(Debug)]
struct Frame {
    state: usize,
    symbols: Vec<usize>,
    position: usize,
}

impl Iterator for MatchingStrings<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            if let Some(word) = self.advance() {
                return Some(word);
            }
            // the current length is exhausted; set up the next valid one
            loop {
                match self.generator.core.length_bound {
                    LengthBound::Empty => return None,
                    LengthBound::UpTo(max) if self.next_length > max => return None,
                    _ => {}
                }
                let length = self.next_length;
                self.next_length += 1;
                if self.generator.core.weights.weight(0, length) == 0.0 {
                    continue;
                }
                if length == 0 {
                    return Some(String::new());
                }
                self.target_length = length;
                let symbols = self.generator.symbols(0, length);
                self.stack.push(Frame {
                    state: 0,
                    symbols,
                    position: 0,
                });
                self.prefix.clear();
                break;
            }
        }
    }
}

impl MatchingStrings<'_> {
    /// Continues the depth-first search of the current length, returning
    /// the next word it completes.
    fn advance(&mut self) -> Option<String> {
        loop {
            let (state, symbol) = {
                let frame = self.stack.last_mut()?;
                if frame.position == frame.symbols.len() {
                    self.stack.pop();
                    self.prefix.pop();
                    continue;
                }
                let symbol = frame.symbols[frame.position];
                frame.position += 1;
                (frame.state, symbol)
            };
            let next_state = self.generator.core.dfa.states()[state].transitions()[symbol];
            self.prefix.push(self.generator.core.dfa.alphabet()[symbol]);
            let remaining = self.target_length - self.prefix.len();
            if remaining == 0 {
                let word: String = self.prefix.iter().collect();
                self.prefix.pop();
                return Some(word);
            }
            let symbols = self.generator.symbols(next_state, remaining);
            self.stack.push(Frame {
                state: next_state,
                symbols,
                position: 0,
            });
        }
    }
}
