use crate::dfa::{Dfa, DfaState};
use std::collections::HashMap;

/// A cursor over a [Dfa], keeping track of the current state while input
/// characters are consumed one at a time. Stepping on a character outside
/// the DFA's alphabet moves the evaluator to a permanent reject.
#[derive(Debug, Clone)]
pub struct DfaEvaluator<'a> {
    dfa: &'a Dfa,
    symbol_map: HashMap<char, usize>,
    current_state: usize,
    foreign_char_seen: bool,
}

impl<'a> DfaEvaluator<'a> {
    pub fn is_accepting(&self) -> bool {
        self.current_state().map_or(false, DfaState::is_accepting)
    }

    pub fn current_state(&self) -> Option<&DfaState> {
        if self.foreign_char_seen {
            None
        } else {
            Some(&self.dfa.states[self.current_state])
        }
    }

    /// Consumes one character, returning the new state, or `None` if the
    /// character is not part of the alphabet.
    pub fn step(&mut self, c: char) -> Option<&DfaState> {
        if self.foreign_char_seen {
            return None;
        }

        match self.symbol_map.get(&c) {
            None => {
                self.foreign_char_seen = true;
                None
            }
            Some(&idx) => {
                self.current_state = self.dfa.states[self.current_state].transitions[idx];
                Some(&self.dfa.states[self.current_state])
            }
        }
    }

    /// Consumes every character of the input in order, returning the final
    /// state, or `None` if any character fell outside the alphabet.
    pub fn step_str(&mut self, input: &str) -> Option<&DfaState> {
        match input.chars().try_for_each(|c| self.step(c).map(|_| ())) {
            None => None,
            Some(()) => Some(&self.dfa.states[self.current_state]),
        }
    }
}

impl<'a> From<&'a Dfa> for DfaEvaluator<'a> {
    fn from(value: &'a Dfa) -> Self {
        let symbol_map = value
            .alphabet
            .iter()
            .enumerate()
            .map(|(idx, &c)| (c, idx))
            .collect();
        Self {
            dfa: value,
            symbol_map,
            current_state: value.initial_state,
            foreign_char_seen: false,
        }
    }
}
