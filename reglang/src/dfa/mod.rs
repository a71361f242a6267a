//! # Deterministic finite automata
//! This module contains the [Dfa] struct produced by
//! [compiling a regex term](crate::regex::Regex::to_dfa) and the analyses
//! that answer questions about the recognized language. A DFA here is always
//! *total*: every state has exactly one transition for every character of
//! the alphabet, and every state carries the regex term (a derivative of the
//! compiled term) that it denotes.
//!
//! ## Language analyses
//! All analyses work on the *acceptable subgraph*: the states that are both
//! reachable from the start state and able to reach an accepting state.
//! Anything outside it can never take part in a successful match.
//!
//! * [Dfa::is_empty_language] — the acceptable subgraph has no states.
//! * [Dfa::has_finite_language] — the acceptable subgraph has no cycle.
//! * [Dfa::longest_string] — a maximally long accepted string, found by the
//!   longest path through the (acyclic) acceptable subgraph. Fails with
//!   [LanguageError::EmptyLanguage] or [LanguageError::InfiniteLanguage]
//!   when no such string exists.
//!
//! ```
//! use reglang::build_dfa;
//!
//! let dfa = build_dfa("a{1,3}", "ab").unwrap();
//! assert!(!dfa.is_empty_language());
//! assert!(dfa.has_finite_language());
//! assert_eq!(dfa.longest_string().unwrap(), "aaa");
//!
//! let all_as = build_dfa("a*", "ab").unwrap();
//! assert!(!all_as.has_finite_language());
//! assert!(all_as.longest_string().is_err());
//! ```
//!
//! ## Minimization and comparison
//! [Dfa::minimized] builds a new DFA with unreachable states dropped and
//! non-distinguishable states merged (one state per equivalence class, as
//! computed by Hopcroft partition refinement). Minimized DFAs of the same
//! language are unique up to renaming, which [Dfa::construct_isomorphism]
//! checks by building the state bijection; [Dfa::equivalent_to] decides
//! language equality directly by exploring both automata in lockstep.
//!
//! ```
//! use reglang::build_dfa;
//!
//! let first = build_dfa("(a|b)*abb", "ab").unwrap();
//! let second = build_dfa("(b|a)*abb", "ab").unwrap();
//! assert!(first.equivalent_to(&second));
//!
//! let minimized = first.minimized();
//! assert!(minimized.states().len() <= first.states().len());
//! assert!(minimized
//!     .construct_isomorphism(&second.minimized())
//!     .is_some());
//! ```

use crate::regex::Regex;
use crate::table::Table;
use crate::util::alphabet_equal;
pub use eval::DfaEvaluator;
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;
use thiserror::Error;

pub mod eval;

/// Why a query about the recognized language could not produce a string.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LanguageError {
    #[error("the recognized language is empty")]
    EmptyLanguage,
    #[error("the recognized language is infinite")]
    InfiniteLanguage,
}

/// The default alphabet used when none is specified: the printable ASCII
/// characters, space through tilde.
pub fn default_alphabet() -> String {
    (' '..='~').collect()
}

/// A total deterministic finite automaton over an alphabet of characters.
/// States are dense indices; each one is labelled with the regex term it
/// denotes and is accepting exactly when that term is nullable. A `Dfa` is
/// never mutated after construction; operations produce new automata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dfa {
    pub(crate) alphabet: Rc<[char]>,
    pub(crate) states: Vec<DfaState>,
    pub(crate) initial_state: usize,
}

/// One state of a [Dfa]: its regex-term label, whether it accepts, and the
/// target state for each character of the alphabet, in alphabet order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DfaState {
    pub(crate) label: Regex,
    pub(crate) accepting: bool,
    pub(crate) transitions: Vec<usize>,
}

impl DfaState {
    /// The regex term this state denotes: matching continues from here
    /// exactly for the strings this term matches.
    pub fn label(&self) -> &Regex {
        &self.label
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    /// Target state indices, one per element of the alphabet, in the
    /// alphabet's ordering.
    pub fn transitions(&self) -> &[usize] {
        self.transitions.as_slice()
    }
}

impl Dfa {
    /// Gets the alphabet of this DFA.
    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    /// Gets the states of this DFA.
    pub fn states(&self) -> &[DfaState] {
        self.states.as_slice()
    }

    /// Gets the initial state of this DFA.
    pub fn initial_state(&self) -> &DfaState {
        &self.states[self.initial_state]
    }

    /// Gets the index of the initial state of this DFA.
    pub fn initial_state_index(&self) -> usize {
        self.initial_state
    }

    /// Gets an evaluator, a cursor used to consume input character by
    /// character.
    pub fn evaluator(&self) -> DfaEvaluator<'_> {
        self.into()
    }

    /// Checks whether this automaton accepts the given string. Characters
    /// outside the alphabet reject immediately.
    pub fn accepts(&self, input: &str) -> bool {
        let mut eval = self.evaluator();
        eval.step_str(input);
        eval.is_accepting()
    }

    /// Returns the states that are missing transitions for part of the
    /// alphabet (or transition to nonexistent states). DFAs built by this
    /// crate are always total, so this only fires on hand-assembled
    /// automata; the generators reject such automata up front.
    pub fn find_invalid_states(&self) -> Vec<usize> {
        (0..self.states.len())
            .filter(|&idx| {
                let transitions = &self.states[idx].transitions;
                transitions.len() != self.alphabet.len()
                    || transitions.iter().any(|&to| to >= self.states.len())
            })
            .collect()
    }

    /// Every state connected to one of `seeds` by following `edges`, where
    /// `edges[s]` lists the neighbours of `s`. Reachability and
    /// co-reachability are this walk over the forward and reversed
    /// transition graphs.
    fn span(seeds: impl IntoIterator<Item = usize>, edges: &[Vec<usize>]) -> HashSet<usize> {
        let mut seen: HashSet<usize> = seeds.into_iter().collect();
        let mut pending: Vec<usize> = seen.iter().copied().collect();
        while let Some(state) = pending.pop() {
            for &next in &edges[state] {
                if seen.insert(next) {
                    pending.push(next);
                }
            }
        }
        seen
    }

    fn reverse_edges(&self) -> Vec<Vec<usize>> {
        let mut edges = vec![Vec::new(); self.states.len()];
        for (from, state) in self.states.iter().enumerate() {
            for &to in &state.transitions {
                edges[to].push(from);
            }
        }
        edges
    }

    /// Finds all states reachable from the initial state, as indices.
    pub fn reachable_state_idx(&self) -> HashSet<usize> {
        let forward: Vec<Vec<usize>> = self
            .states
            .iter()
            .map(|state| state.transitions.clone())
            .collect();
        Self::span([self.initial_state], &forward)
    }

    /// Finds all states from which some accepting state can be reached, as
    /// indices.
    pub fn co_reachable_state_idx(&self) -> HashSet<usize> {
        let accepting = (0..self.states.len()).filter(|&idx| self.states[idx].accepting);
        Self::span(accepting, &self.reverse_edges())
    }

    /// The states of the acceptable subgraph: reachable from the start and
    /// able to reach an accepting state. Exactly these states can occur
    /// while matching a string the automaton accepts.
    pub fn acceptable_state_idx(&self) -> HashSet<usize> {
        let reachable = self.reachable_state_idx();
        self.co_reachable_state_idx()
            .into_iter()
            .filter(|state| reachable.contains(state))
            .collect()
    }

    /// Checks whether this automaton rejects every string.
    pub fn is_empty_language(&self) -> bool {
        self.acceptable_state_idx().is_empty()
    }

    /// Checks whether this automaton accepts only finitely many strings,
    /// which is the case exactly when the acceptable subgraph has no cycle.
    /// An empty language counts as finite.
    pub fn has_finite_language(&self) -> bool {
        self.topological_order(&self.acceptable_state_idx())
            .is_some()
    }

    /// Kahn's algorithm over the subgraph induced by `nodes`, with parallel
    /// edges collapsed. `None` means the subgraph has a cycle.
    fn topological_order(&self, nodes: &HashSet<usize>) -> Option<Vec<usize>> {
        let mut members: Vec<usize> = nodes.iter().copied().collect();
        members.sort_unstable();

        let mut successors: HashMap<usize, Vec<usize>> = HashMap::new();
        let mut indegree: HashMap<usize, usize> =
            members.iter().map(|&state| (state, 0)).collect();
        for &from in &members {
            let mut targets: Vec<usize> = self.states[from]
                .transitions
                .iter()
                .copied()
                .filter(|to| nodes.contains(to))
                .collect();
            targets.sort_unstable();
            targets.dedup();
            for &to in &targets {
                *indegree.get_mut(&to).unwrap() += 1;
            }
            successors.insert(from, targets);
        }

        let mut ready: VecDeque<usize> = members
            .iter()
            .copied()
            .filter(|state| indegree[state] == 0)
            .collect();
        let mut order = Vec::with_capacity(members.len());
        while let Some(from) = ready.pop_front() {
            order.push(from);
            for &to in &successors[&from] {
                let remaining = indegree.get_mut(&to).unwrap();
                *remaining -= 1;
                if *remaining == 0 {
                    ready.push_back(to);
                }
            }
        }
        (order.len() == members.len()).then_some(order)
    }

    /// Returns a string of maximum length accepted by this automaton.
    ///
    /// Fails with [LanguageError::EmptyLanguage] when no string is accepted
    /// at all, and with [LanguageError::InfiniteLanguage] when there are
    /// arbitrarily long accepted strings. Otherwise the acceptable subgraph
    /// is a DAG; the answer is a longest path through it starting at the
    /// initial state (every acceptable state is reachable from the start
    /// *within* the subgraph, so the longest path begins there), with each
    /// edge converted back to its transition character.
    pub fn longest_string(&self) -> Result<String, LanguageError> {
        let acceptable = self.acceptable_state_idx();
        if acceptable.is_empty() {
            return Err(LanguageError::EmptyLanguage);
        }
        let order = self
            .topological_order(&acceptable)
            .ok_or(LanguageError::InfiniteLanguage)?;

        let mut distance: HashMap<usize, usize> = HashMap::from([(self.initial_state, 0)]);
        let mut predecessor: HashMap<usize, (usize, char)> = HashMap::new();
        for &from in &order {
            let Some(&steps) = distance.get(&from) else {
                continue;
            };
            for (idx, &to) in self.states[from].transitions.iter().enumerate() {
                if !acceptable.contains(&to) {
                    continue;
                }
                if distance.get(&to).map_or(true, |&known| known < steps + 1) {
                    distance.insert(to, steps + 1);
                    predecessor.insert(to, (from, self.alphabet[idx]));
                }
            }
        }

        let (&end, _) = distance
            .iter()
            .filter(|&(&state, _)| self.states[state].accepting)
            .max_by_key(|&(&state, &steps)| (steps, std::cmp::Reverse(state)))
            .expect("a non-empty acceptable subgraph reaches an accepting state");
        let mut chars = Vec::new();
        let mut state = end;
        while let Some(&(previous, c)) = predecessor.get(&state) {
            chars.push(c);
            state = previous;
        }
        chars.reverse();
        Ok(chars.into_iter().collect())
    }

    /// Gives the equivalence classes of the states of this DFA: two states
    /// are in the same class when no string distinguishes them (leads to an
    /// accepting state from one but not the other). Computed with Hopcroft
    /// partition refinement.
    pub fn state_equivalence_classes_idx(&self) -> Vec<HashSet<usize>> {
        let (accepting, rejecting): (HashSet<usize>, HashSet<usize>) =
            (0..self.states.len()).partition(|&idx| self.states[idx].accepting);
        if accepting.is_empty() {
            return vec![rejecting];
        } else if rejecting.is_empty() {
            return vec![accepting];
        }
        let mut partitions = vec![accepting, rejecting];
        let mut worklist = partitions.clone();

        while let Some(splitter) = worklist.pop() {
            for symbol in 0..self.alphabet.len() {
                let incoming: HashSet<usize> = self
                    .states
                    .iter()
                    .enumerate()
                    .filter(|(_, state)| splitter.contains(&state.transitions[symbol]))
                    .map(|(idx, _)| idx)
                    .collect();
                partitions = partitions
                    .into_iter()
                    .flat_map(|class| {
                        let inside: HashSet<usize> =
                            class.intersection(&incoming).copied().collect();
                        let outside: HashSet<usize> =
                            class.difference(&incoming).copied().collect();
                        if inside.is_empty() || outside.is_empty() {
                            return vec![class];
                        }
                        if let Some(pos) = worklist.iter().position(|c| c == &class) {
                            worklist.swap_remove(pos);
                            worklist.push(inside.clone());
                            worklist.push(outside.clone());
                        } else if inside.len() <= outside.len() {
                            worklist.push(inside.clone());
                        } else {
                            worklist.push(outside.clone());
                        }
                        vec![inside, outside]
                    })
                    .collect();
            }
        }
        partitions
    }

    /// Builds the minimal DFA for this automaton's language: unreachable
    /// states are dropped, then each equivalence class of the remainder
    /// becomes one state (labelled and marked like the class member with
    /// the smallest index). The result is independent of this automaton and
    /// unique up to isomorphism.
    pub fn minimized(&self) -> Dfa {
        // Unreachable states must go first: their equivalence classes would
        // otherwise survive into the result.
        let mut reachable: Vec<usize> = self.reachable_state_idx().into_iter().collect();
        reachable.sort_unstable();
        let dense: HashMap<usize, usize> = reachable
            .iter()
            .enumerate()
            .map(|(new, &old)| (old, new))
            .collect();
        let sub = Dfa {
            alphabet: self.alphabet.clone(),
            states: reachable
                .iter()
                .map(|&old| {
                    let state = &self.states[old];
                    DfaState {
                        label: state.label.clone(),
                        accepting: state.accepting,
                        transitions: state.transitions.iter().map(|to| dense[to]).collect(),
                    }
                })
                .collect(),
            initial_state: dense[&self.initial_state],
        };

        let mut classes: Vec<Vec<usize>> = sub
            .state_equivalence_classes_idx()
            .into_iter()
            .map(|class| {
                let mut class: Vec<usize> = class.into_iter().collect();
                class.sort_unstable();
                class
            })
            .collect();
        classes.sort_by_key(|class| class[0]);

        let mut class_of = vec![0; sub.states.len()];
        for (id, class) in classes.iter().enumerate() {
            for &member in class {
                class_of[member] = id;
            }
        }
        let states = classes
            .iter()
            .map(|class| {
                let representative = &sub.states[class[0]];
                DfaState {
                    label: representative.label.clone(),
                    accepting: representative.accepting,
                    transitions: representative
                        .transitions
                        .iter()
                        .map(|&to| class_of[to])
                        .collect(),
                }
            })
            .collect();
        Dfa {
            alphabet: self.alphabet.clone(),
            states,
            initial_state: class_of[sub.initial_state],
        }
    }

    /// Attempts to build the state bijection between this DFA and `other`
    /// that pairs the start states and preserves acceptance and every
    /// transition. Returns `None` when no such bijection exists (including
    /// when either automaton has states its own start cannot reach, since
    /// those can never be paired up deterministically). Alphabets are
    /// compared as sets; their ordering may differ.
    pub fn construct_isomorphism(&self, other: &Dfa) -> Option<HashMap<usize, usize>> {
        if !alphabet_equal(&self.alphabet, &other.alphabet) {
            return None;
        }
        if self.states.len() != other.states.len() {
            return None;
        }
        if self.states[self.initial_state].accepting
            != other.states[other.initial_state].accepting
        {
            return None;
        }

        let other_symbol: HashMap<char, usize> = other
            .alphabet
            .iter()
            .enumerate()
            .map(|(idx, &c)| (c, idx))
            .collect();
        let mut mapping = HashMap::from([(self.initial_state, other.initial_state)]);
        let mut image = HashSet::from([other.initial_state]);
        let mut to_explore = vec![(self.initial_state, other.initial_state)];

        while let Some((ours, theirs)) = to_explore.pop() {
            for (idx, c) in self.alphabet.iter().enumerate() {
                let our_next = self.states[ours].transitions[idx];
                let their_next = other.states[theirs].transitions[other_symbol[c]];
                match mapping.get(&our_next) {
                    Some(&mapped) => {
                        if mapped != their_next {
                            return None;
                        }
                    }
                    None => {
                        if self.states[our_next].accepting
                            != other.states[their_next].accepting
                        {
                            return None;
                        }
                        if !image.insert(their_next) {
                            return None;
                        }
                        mapping.insert(our_next, their_next);
                        to_explore.push((our_next, their_next));
                    }
                }
            }
        }
        (mapping.len() == self.states.len()).then_some(mapping)
    }

    /// Builds an isomorphic DFA whose start state has index 0, with the
    /// other states keeping their relative order. The generators in
    /// [crate::generate] work on this layout.
    pub fn integerized(&self) -> Dfa {
        if self.initial_state == 0 {
            return self.clone();
        }
        let mut new_order = vec![self.initial_state];
        new_order.extend((0..self.states.len()).filter(|&idx| idx != self.initial_state));
        let mut new_index = vec![0; self.states.len()];
        for (new, &old) in new_order.iter().enumerate() {
            new_index[old] = new;
        }
        let states = new_order
            .iter()
            .map(|&old| {
                let state = &self.states[old];
                DfaState {
                    label: state.label.clone(),
                    accepting: state.accepting,
                    transitions: state
                        .transitions
                        .iter()
                        .map(|&to| new_index[to])
                        .collect(),
                }
            })
            .collect();
        Dfa {
            alphabet: self.alphabet.clone(),
            states,
            initial_state: 0,
        }
    }

    /// Checks if this DFA is equivalent to another DFA, that is, if they
    /// accept the same language. The pairs of states the two automata can
    /// occupy on a common input are enumerated breadth-first; a pair that
    /// disagrees on acceptance witnesses a distinguishing string, and if no
    /// reachable pair disagrees the languages coincide. No product
    /// automaton is materialized. Automata over different alphabets are
    /// never equivalent, but the alphabet ordering, the number of states
    /// and the state labels do not matter.
    pub fn equivalent_to(&self, other: &Dfa) -> bool {
        if !alphabet_equal(&self.alphabet, &other.alphabet) {
            return false;
        }
        let other_symbol: HashMap<char, usize> = other
            .alphabet
            .iter()
            .enumerate()
            .map(|(idx, &c)| (c, idx))
            .collect();

        let start = (self.initial_state, other.initial_state);
        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some((ours, theirs)) = queue.pop_front() {
            if self.states[ours].accepting != other.states[theirs].accepting {
                return false;
            }
            for (idx, c) in self.alphabet.iter().enumerate() {
                let pair = (
                    self.states[ours].transitions[idx],
                    other.states[theirs].transitions[other_symbol[c]],
                );
                if seen.insert(pair) {
                    queue.push_back(pair);
                }
            }
        }
        true
    }

    /// Renders the transition table of this DFA, one row per state (`→`
    /// marks the start state, `*` marks accepting states). State labels are
    /// available through [DfaState::label].
    pub fn to_table(&self) -> String {
        self.gen_table("→")
    }

    /// Like [Dfa::to_table], with `->` marking the start state.
    pub fn ascii_table(&self) -> String {
        self.gen_table("->")
    }

    fn gen_table(&self, arrow: &str) -> String {
        let mut table = Table::default();

        let mut header = vec![String::new(); 3];
        header.extend(self.alphabet.iter().map(char::to_string));
        table.push_row(header);

        for (idx, state) in self.states.iter().enumerate() {
            let mut row = vec![
                if idx == self.initial_state {
                    arrow.to_string()
                } else {
                    String::new()
                },
                if state.accepting {
                    "*".to_string()
                } else {
                    String::new()
                },
                format!("s{idx}"),
            ];
            row.extend(state.transitions.iter().map(|to| format!("s{to}")));
            table.push_row(row);
        }
        table.render(" ")
    }
}
