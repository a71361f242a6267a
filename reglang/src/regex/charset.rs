//! Character sets: the single-character building block of the regex algebra.
//!
//! A [CharSet] matches exactly one character, either one *in* the stored set
//! (positive) or one *not in* it (negated). The ASCII classes `\d`, `\w` and
//! `\s` are plain character sets; their uppercase counterparts are the same
//! sets with the negation flag flipped.

use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};

/// A set of characters together with a negation flag. Matches exactly one
/// character of the input. The characters are kept in a sorted set so that
/// two sets denoting the same characters compare (and hash) equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CharSet {
    chars: BTreeSet<char>,
    negated: bool,
}

impl CharSet {
    /// Creates a positive character set from the given characters.
    /// Duplicates are collapsed.
    pub fn new(chars: impl IntoIterator<Item = char>) -> Self {
        Self {
            chars: chars.into_iter().collect(),
            negated: false,
        }
    }

    /// Creates a character set matching any character *not* in `chars`.
    pub fn negated(chars: impl IntoIterator<Item = char>) -> Self {
        Self {
            chars: chars.into_iter().collect(),
            negated: true,
        }
    }

    /// A set matching the single character `c`.
    pub fn single(c: char) -> Self {
        Self::new([c])
    }

    /// The ASCII digit class `\d`.
    pub fn digit() -> Self {
        Self::new('0'..='9')
    }

    /// The ASCII word-character class `\w`.
    pub fn word() -> Self {
        Self::new(
            ('a'..='z')
                .chain('A'..='Z')
                .chain('0'..='9')
                .chain(['_']),
        )
    }

    /// The ASCII whitespace class `\s`.
    pub fn space() -> Self {
        Self::new([' ', '\t', '\n', '\r', '\x0B', '\x0C'])
    }

    /// The same characters with the negation flag flipped. Since a character
    /// set matches exactly one character, this is set complement within the
    /// one-character world.
    pub fn complemented(&self) -> Self {
        Self {
            chars: self.chars.clone(),
            negated: !self.negated,
        }
    }

    /// Checks whether this set matches the character, honouring negation.
    pub fn matches(&self, c: char) -> bool {
        self.chars.contains(&c) != self.negated
    }

    /// The stored characters, ignoring the negation flag.
    pub fn chars(&self) -> &BTreeSet<char> {
        &self.chars
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// True for a positive set with no characters, which matches nothing.
    pub fn is_empty(&self) -> bool {
        !self.negated && self.chars.is_empty()
    }

    /// True for a negated set with no characters, which matches any character.
    pub fn is_universal(&self) -> bool {
        self.negated && self.chars.is_empty()
    }
}

impl Display for CharSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let escape = |f: &mut Formatter<'_>, c: char| -> fmt::Result {
            if matches!(c, ']' | '\\' | '^' | '-') {
                write!(f, "\\{c}")
            } else {
                write!(f, "{c}")
            }
        };
        if self.chars.len() == 1 && !self.negated {
            return escape(f, *self.chars.iter().next().unwrap());
        }
        write!(f, "[{}", if self.negated { "^" } else { "" })?;
        for &c in &self.chars {
            escape(f, c)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_honours_negation() {
        let vowels = CharSet::new("aeiou".chars());
        assert!(vowels.matches('a'));
        assert!(!vowels.matches('b'));
        assert!(!vowels.complemented().matches('a'));
        assert!(vowels.complemented().matches('b'));
    }

    #[test]
    fn classes() {
        assert!(CharSet::digit().matches('7'));
        assert!(!CharSet::digit().matches('x'));
        assert!(CharSet::word().matches('_'));
        assert!(!CharSet::word().matches(' '));
        assert!(CharSet::space().matches('\t'));
        assert!(!CharSet::space().matches('a'));
    }

    #[test]
    fn display_escapes_metacharacters() {
        assert_eq!(CharSet::new("abc".chars()).to_string(), "[abc]");
        assert_eq!(CharSet::negated("ab".chars()).to_string(), "[^ab]");
        assert_eq!(CharSet::single('a').to_string(), "a");
        assert_eq!(CharSet::single(']').to_string(), "\\]");
        assert_eq!(CharSet::new("a-".chars()).to_string(), "[\\-a]");
    }
}
