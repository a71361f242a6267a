//! # Pattern parser
//! This module parses a conventional regex surface syntax into the canonical
//! terms of the [regex algebra](crate::regex). The accepted syntax is a
//! superset of common POSIX notation:
//!
//! * alternation `|`, grouping `(..)` and `(?:..)`, comments `(?#..)`
//! * quantifiers `*`, `+`, `?`, `{n}`, `{lo,hi}`, `{lo,}`, `{,hi}`
//! * lookaround `(?=..)`, `(?!..)`, `(?<=..)`, `(?<!..)`
//! * `.` for any character, character sets `[..]`/`[^..]` with ranges, and
//!   the ASCII classes `\d \D \w \W \s \S`
//! * escapes: `\x41`, `A`, `\U00000041`, three-digit octal (`\101`),
//!   `\n \t \v \r`, and backslash-escaped metacharacters
//!
//! There are no anchors; [matching](crate::regex::Regex::matches) is always
//! against the whole input. A `-` that cannot be part of a range (such as a
//! trailing one in `[a-]`) is a literal dash.
//!
//! Parsing happens in two steps: a [nom] grammar recognizes the surface
//! syntax, and the resulting tree is then checked and lowered into a
//! [Regex]. Both steps report through [ParseError], with one variant per
//! kind of mistake.
//!
//! ```
//! use reglang::parser;
//!
//! let regex = parser::regex("(a|bb)*c?").unwrap();
//! assert!(regex.matches("abba"));
//! assert!(regex.matches("bbac"));
//! assert!(!regex.matches("bc"));
//!
//! assert!(parser::regex("a{0}").is_err());
//! assert!(parser::regex("(a").is_err());
//! ```

mod regex;

use self::regex::{Ast, SetItem};
use crate::regex::{CharSet, Regex};
use nom::combinator::all_consuming;
use nom::Finish;
use std::collections::BTreeSet;
use thiserror::Error;

/// The ways a pattern can be rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The pattern does not follow the surface grammar.
    #[error("syntax error at offset {position}: {reason}")]
    Syntax { position: usize, reason: String },
    /// A counted repetition that can never match, such as `a{0}` or
    /// `a{3,1}`.
    #[error("invalid repeat: {0}")]
    InvalidRepeat(String),
    /// A character range running backwards, such as `[z-a]`.
    #[error("invalid character range {start}-{end}: start is greater than end")]
    InvalidCharRange { start: char, end: char },
}

/// Parses a pattern into a canonical [Regex] term. The whole input must be
/// consumed; leading and trailing whitespace is significant.
pub fn regex(input: &str) -> Result<Regex, ParseError> {
    let ast = all_consuming(regex::full_regex)(input)
        .finish()
        .map(|(_, ast)| ast)
        .map_err(|e| ParseError::Syntax {
            position: input.len() - e.input.len(),
            reason: e.code.description().to_string(),
        })?;
    to_regex(&ast)
}

fn to_regex(ast: &Ast) -> Result<Regex, ParseError> {
    Ok(match ast {
        Ast::Alt(items) => Regex::union(
            items
                .iter()
                .map(to_regex)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Ast::Seq(items) => Regex::concat(
            items
                .iter()
                .map(to_regex)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Ast::Star(inner) => to_regex(inner)?.star(),
        Ast::Plus(inner) => to_regex(inner)?.plus(),
        Ast::Opt(inner) => to_regex(inner)?.opt(),
        Ast::RepeatFixed(inner, n) => {
            if *n == 0 {
                return Err(ParseError::InvalidRepeat(
                    "`{0}` repeats zero times".to_string(),
                ));
            }
            to_regex(inner)?.repeat(*n)
        }
        Ast::RepeatRange(inner, lo, hi) => {
            if let Some(hi) = hi {
                if hi < lo {
                    return Err(ParseError::InvalidRepeat(format!(
                        "`{{{lo},{hi}}}` has bounds out of order"
                    )));
                }
            }
            to_regex(inner)?.repeat_range(*lo, *hi)
        }
        // (?=X) continuing input must match X·Σ* on top of the host
        // pattern; the negative form complements the augmented guard.
        Ast::LookAhead { inner, negative } => {
            let guard = to_regex(inner)?.then(&Regex::dot().star());
            let guard = if *negative {
                guard.complement()
            } else {
                guard
            };
            Regex::look_ahead(guard, Regex::epsilon())
        }
        // (?<=X) consumed input must match Σ*·X; merged leftwards by the
        // concatenation constructor.
        Ast::LookBehind { inner, negative } => {
            let guard = Regex::dot().star().then(&to_regex(inner)?);
            let guard = if *negative {
                guard.complement()
            } else {
                guard
            };
            Regex::look_behind(Regex::epsilon(), guard)
        }
        Ast::Dot => Regex::dot(),
        Ast::Epsilon => Regex::epsilon(),
        Ast::Literal(c) => Regex::symbol(*c),
        Ast::Class(letter) => Regex::set(class_set(*letter)),
        Ast::Set { negated, items } => Regex::set(set_from_items(items, *negated)?),
    })
}

fn class_set(letter: char) -> CharSet {
    let base = match letter.to_ascii_lowercase() {
        'd' => CharSet::digit(),
        'w' => CharSet::word(),
        's' => CharSet::space(),
        _ => unreachable!("the grammar only produces dDwWsS classes"),
    };
    if letter.is_ascii_uppercase() {
        base.complemented()
    } else {
        base
    }
}

/// Folds the items of a `[..]` set into a single [CharSet]. Since every
/// item matches exactly one character, unions involving negated classes
/// stay representable: `A ∪ ¬B = ¬(B ∖ A)` and `¬A ∪ ¬B = ¬(A ∩ B)`.
fn set_from_items(items: &[SetItem], outer_negated: bool) -> Result<CharSet, ParseError> {
    let mut chars: BTreeSet<char> = BTreeSet::new();
    let mut negated = false;
    for item in items {
        let (item_chars, item_negated): (BTreeSet<char>, bool) = match item {
            SetItem::Char(c) => ([*c].into(), false),
            SetItem::Range(start, end) => {
                if start > end {
                    return Err(ParseError::InvalidCharRange {
                        start: *start,
                        end: *end,
                    });
                }
                ((*start..=*end).collect(), false)
            }
            SetItem::Class(letter) => {
                let class = class_set(*letter);
                (class.chars().clone(), class.is_negated())
            }
        };
        (chars, negated) = match (negated, item_negated) {
            (false, false) => (chars.union(&item_chars).copied().collect(), false),
            (true, false) => (chars.difference(&item_chars).copied().collect(), true),
            (false, true) => (item_chars.difference(&chars).copied().collect(), true),
            (true, true) => (chars.intersection(&item_chars).copied().collect(), true),
        };
    }
    if outer_negated {
        negated = !negated;
    }
    Ok(if negated {
        CharSet::negated(chars)
    } else {
        CharSet::new(chars)
    })
}
