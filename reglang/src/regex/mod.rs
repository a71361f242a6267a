//! # Extended regular expressions
//! This module implements an algebra of extended regular expressions: on top
//! of the usual concatenation, union and Kleene star, terms are closed under
//! *intersection*, *complement* and (limited) *lookaround*. Matching is exact
//! and works by repeated [Brzozowski derivation](Regex::derivative): the
//! derivative of a term with respect to a character `c` is a term matching
//! exactly the strings `w` such that the original term matches `c·w`, so a
//! term matches a string iff the derivative by every character in turn is
//! [nullable](Regex::nullable) at the end.
//!
//! ## Canonical form
//! Terms are values: two terms that the simplification rules below identify
//! are equal, hash equal, and compare equal. Every constructor normalizes:
//!
//! * `Concat`, `Union` and `Intersect` never contain a child of their own
//!   kind (they are flattened), `Union` and `Intersect` children are kept as
//!   a sorted, deduplicated sequence.
//! * `Empty` absorbs concatenation and intersection and is the unit of
//!   union; `Epsilon` is the unit of concatenation.
//! * Several character sets in a union or intersection are fused into one.
//! * `Complement` is pushed through `Union` and `Intersect` by De Morgan's
//!   laws and cancels with itself, so it only ever wraps the other variants.
//! * `Star` of `Empty` or `Epsilon` collapses to `Epsilon`.
//! * A lookahead whose guard or suffix is `Empty` collapses to `Empty`, and
//!   nested lookaheads coalesce by intersecting their guards (symmetrically
//!   for lookbehind).
//!
//! All of these rules are load-bearing: derivatives modulo this normal form
//! have finitely many equivalence classes, which is what makes
//! [DFA construction](Regex::to_dfa) terminate.
//!
//! ## Example
//! ```
//! use reglang::regex::Regex;
//!
//! let a = Regex::symbol('a');
//! let b = Regex::symbol('b');
//!
//! // (ab)* matches even-length alternations of a and b
//! let abs = Regex::concat([a.clone(), b.clone()]).star();
//! assert!(abs.matches("abab"));
//! assert!(!abs.matches("aba"));
//!
//! // Intersection and complement are first-class: a* ∩ ~(aa) matches
//! // any number of a:s except exactly two
//! let some_as = a.star().and(&Regex::concat([a.clone(), a.clone()]).complement());
//! assert!(some_as.matches("a"));
//! assert!(some_as.matches("aaa"));
//! assert!(!some_as.matches("aa"));
//! ```

use crate::dfa::{Dfa, DfaState};
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fmt::{self, Display, Formatter};
use std::iter;
use std::rc::Rc;

pub mod charset;

pub use charset::CharSet;

/// An extended regular expression in canonical form. `Regex` is a cheap
/// handle (a reference-counted pointer to the root node), so cloning a term
/// shares structure rather than copying it. Terms are immutable; all
/// operations build new terms. See the [module-level documentation](self)
/// for the normalization rules.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Regex {
    node: Rc<Node>,
}

/// The variants of a regex term. The derived `Ord` (variant tag first, then
/// payload) is the total order used to lay out `Union` and `Intersect`
/// children deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Node {
    /// Matches nothing at all.
    Empty,
    /// Matches exactly the empty string.
    Epsilon,
    /// Matches any single character.
    Dot,
    /// Matches a single character in (or not in) a set.
    Set(CharSet),
    /// Matches the children in sequence. Never nested, never contains
    /// `Empty` or `Epsilon`, always at least two children.
    Concat(Vec<Regex>),
    /// Matches any child. Sorted, deduplicated, at least two children,
    /// never nested, never contains `Empty`.
    Union(Vec<Regex>),
    /// Matches all children simultaneously. Same layout rules as `Union`.
    Intersect(Vec<Regex>),
    /// Matches exactly the strings the child does not. Never wraps `Union`,
    /// `Intersect` or another `Complement`.
    Complement(Regex),
    /// Matches zero or more repetitions. The child is never `Empty` or
    /// `Epsilon`.
    Star(Regex),
    /// `suffix` must match the remaining input, and additionally `guard`
    /// must match it. A surface `(?=X)Y` is represented with
    /// `guard = X·Σ*` so that the lookahead may stop partway through.
    LookAhead { guard: Regex, suffix: Regex },
    /// `prefix` is what still has to be consumed; `guard` tracks what the
    /// text consumed within this term must look like. A surface `Y(?<=X)`
    /// is represented with `guard = Σ*·X`.
    LookBehind { prefix: Regex, guard: Regex },
}

impl Regex {
    fn new(node: Node) -> Self {
        Self {
            node: Rc::new(node),
        }
    }

    /// The root node of this term.
    pub fn node(&self) -> &Node {
        &self.node
    }

    fn is_empty(&self) -> bool {
        matches!(*self.node, Node::Empty)
    }

    fn is_epsilon(&self) -> bool {
        matches!(*self.node, Node::Epsilon)
    }

    /// The term matching no string at all, usually written `∅`.
    pub fn empty() -> Self {
        Self::new(Node::Empty)
    }

    /// The term matching exactly the empty string, usually written `ε`.
    pub fn epsilon() -> Self {
        Self::new(Node::Epsilon)
    }

    /// The term matching any single character, written `.`.
    pub fn dot() -> Self {
        Self::new(Node::Dot)
    }

    /// The term matching the single character `c`.
    pub fn symbol(c: char) -> Self {
        Self::set(CharSet::single(c))
    }

    /// The term matching one character of the given set. An empty positive
    /// set matches nothing and collapses to [Regex::empty]; an empty negated
    /// set matches any character and collapses to [Regex::dot].
    pub fn set(set: CharSet) -> Self {
        if set.is_empty() {
            Self::empty()
        } else if set.is_universal() {
            Self::dot()
        } else {
            Self::new(Node::Set(set))
        }
    }

    /// Sequences the given terms. `Empty` absorbs the whole concatenation,
    /// `Epsilon` children are dropped, nested concatenations are flattened,
    /// and lookaround children are merged into their neighbours: a lookahead
    /// absorbs everything after it into its suffix, a lookbehind absorbs
    /// everything before it into its prefix.
    pub fn concat(children: impl IntoIterator<Item = Regex>) -> Self {
        let mut flat = Vec::new();
        for child in children {
            match child.node() {
                Node::Concat(inner) => flat.extend(inner.iter().cloned()),
                Node::Epsilon => {}
                Node::Empty => return Self::empty(),
                _ => flat.push(child),
            }
        }

        // A lookbehind inspects the text consumed before it, so everything
        // to its left belongs in its prefix.
        let mut merged: Vec<Regex> = Vec::with_capacity(flat.len());
        for child in flat {
            if let Node::LookBehind { prefix, guard } = child.node() {
                let before = std::mem::take(&mut merged);
                let prefix =
                    Self::concat(before.into_iter().chain(iter::once(prefix.clone())));
                merged.push(Self::look_behind(prefix, guard.clone()));
            } else {
                merged.push(child);
            }
        }

        // Symmetrically, a lookahead constrains the text consumed after it,
        // so everything to its right belongs in its suffix.
        let mut out: Vec<Regex> = Vec::with_capacity(merged.len());
        for child in merged.into_iter().rev() {
            if let Node::LookAhead { guard, suffix } = child.node() {
                let mut after = std::mem::take(&mut out);
                after.reverse();
                let suffix =
                    Self::concat(iter::once(suffix.clone()).chain(after));
                out.push(Self::look_ahead(guard.clone(), suffix));
            } else {
                out.push(child);
            }
        }
        out.reverse();

        // Lookaround merging may have collapsed a child to Empty or Epsilon.
        if out.iter().any(Self::is_empty) {
            return Self::empty();
        }
        out.retain(|child| !child.is_epsilon());

        match out.len() {
            0 => Self::epsilon(),
            1 => out.pop().unwrap(),
            _ => Self::new(Node::Concat(out)),
        }
    }

    /// The union (alternation) of the given terms. Nested unions are
    /// flattened, `Empty` children are dropped, duplicate children collapse,
    /// positive character sets are fused into one, and the children are kept
    /// in canonical order.
    pub fn union(children: impl IntoIterator<Item = Regex>) -> Self {
        let mut set = BTreeSet::new();
        for child in children {
            match child.node() {
                Node::Union(inner) => set.extend(inner.iter().cloned()),
                Node::Empty => {}
                _ => {
                    set.insert(child);
                }
            }
        }

        let positive_sets: Vec<CharSet> = set
            .iter()
            .filter_map(|child| match child.node() {
                Node::Set(cs) if !cs.is_negated() => Some(cs.clone()),
                _ => None,
            })
            .collect();
        if positive_sets.len() > 1 {
            set.retain(|child| {
                !matches!(child.node(), Node::Set(cs) if !cs.is_negated())
            });
            let chars = positive_sets
                .iter()
                .flat_map(|cs| cs.chars().iter().copied());
            set.insert(Self::set(CharSet::new(chars)));
        }

        let mut out: Vec<Regex> = set.into_iter().collect();
        match out.len() {
            0 => Self::empty(),
            1 => out.pop().unwrap(),
            _ => Self::new(Node::Union(out)),
        }
    }

    /// The intersection of the given terms: matches strings accepted by all
    /// of them. `Empty` absorbs the intersection, `Epsilon` collapses it to
    /// `Epsilon` or `Empty` depending on the nullability of the remaining
    /// children, and character sets are fused: positive sets intersect,
    /// negated sets pool, and a surviving positive set is restricted to the
    /// characters every other child can accept as a one-character string
    /// (at which point the set alone *is* the intersection).
    pub fn intersect(children: impl IntoIterator<Item = Regex>) -> Self {
        let mut set = BTreeSet::new();
        let mut saw_epsilon = false;
        for child in children {
            match child.node() {
                Node::Intersect(inner) => set.extend(inner.iter().cloned()),
                Node::Empty => return Self::empty(),
                Node::Epsilon => saw_epsilon = true,
                _ => {
                    set.insert(child);
                }
            }
        }
        if saw_epsilon {
            return if set.iter().all(Regex::nullable) {
                Self::epsilon()
            } else {
                Self::empty()
            };
        }

        let mut positive: Option<BTreeSet<char>> = None;
        let mut negated: Option<BTreeSet<char>> = None;
        let mut others: Vec<Regex> = Vec::new();
        for child in set {
            match child.node() {
                Node::Set(cs) if !cs.is_negated() => {
                    positive = Some(match positive {
                        None => cs.chars().clone(),
                        Some(acc) => acc.intersection(cs.chars()).copied().collect(),
                    });
                }
                Node::Set(cs) => {
                    negated = Some(match negated {
                        None => cs.chars().clone(),
                        Some(acc) => acc.union(cs.chars()).copied().collect(),
                    });
                }
                _ => others.push(child),
            }
        }

        if let (Some(pos), Some(neg)) = (&positive, &negated) {
            let difference: BTreeSet<char> = pos.difference(neg).copied().collect();
            if difference.is_empty() {
                return Self::empty();
            }
            positive = Some(difference);
            negated = None;
        }

        if let Some(pos) = positive {
            // The intersection only matches one-character strings from the
            // set, namely those every remaining child accepts.
            let acceptable: BTreeSet<char> = pos
                .into_iter()
                .filter(|&c| others.iter().all(|child| child.derivative(c).nullable()))
                .collect();
            return Self::set(CharSet::new(acceptable));
        }
        if let Some(neg) = negated {
            others.push(Self::set(CharSet::negated(neg)));
            others.sort();
        }

        match others.len() {
            // Intersection of no constraints: every string qualifies.
            0 => Self::empty().complement(),
            1 => others.pop().unwrap(),
            _ => Self::new(Node::Intersect(others)),
        }
    }

    /// The complement of this term: matches exactly the strings this term
    /// rejects. De Morgan's laws are applied at construction, so the result
    /// never has a complement directly around a union, an intersection or
    /// another complement.
    pub fn complement(&self) -> Self {
        match self.node() {
            Node::Union(children) => {
                Self::intersect(children.iter().map(Regex::complement))
            }
            Node::Intersect(children) => {
                Self::union(children.iter().map(Regex::complement))
            }
            Node::Complement(inner) => inner.clone(),
            _ => Self::new(Node::Complement(self.clone())),
        }
    }

    /// Zero or more repetitions of this term. `∅*` and `ε*` both collapse
    /// to `ε`.
    pub fn star(&self) -> Self {
        match self.node() {
            Node::Empty | Node::Epsilon => Self::epsilon(),
            _ => Self::new(Node::Star(self.clone())),
        }
    }

    /// This term or the empty string (the surface `?` quantifier).
    pub fn opt(&self) -> Self {
        Self::union([self.clone(), Self::epsilon()])
    }

    /// One or more repetitions (the surface `+` quantifier).
    pub fn plus(&self) -> Self {
        Self::concat([self.clone(), self.star()])
    }

    /// Exactly `n` repetitions. `repeat(0)` is `ε`.
    pub fn repeat(&self, n: usize) -> Self {
        Self::concat(iter::repeat(self.clone()).take(n))
    }

    /// Between `lo` and `hi` repetitions, or `lo` or more when `hi` is
    /// `None` (the surface `{lo,hi}` quantifier).
    pub fn repeat_range(&self, lo: usize, hi: Option<usize>) -> Self {
        let optional = match hi {
            None => self.star(),
            Some(hi) => {
                Self::union((0..=hi.saturating_sub(lo)).map(|k| self.repeat(k)))
            }
        };
        Self::concat([self.repeat(lo), optional])
    }

    /// Binary concatenation convenience over [Regex::concat].
    pub fn then(&self, other: &Self) -> Self {
        Self::concat([self.clone(), other.clone()])
    }

    /// Binary union convenience over [Regex::union].
    pub fn or(&self, other: &Self) -> Self {
        Self::union([self.clone(), other.clone()])
    }

    /// Binary intersection convenience over [Regex::intersect].
    pub fn and(&self, other: &Self) -> Self {
        Self::intersect([self.clone(), other.clone()])
    }

    /// A lookahead: the remaining input must match `suffix`, and must also
    /// match `guard`. Collapses to `Empty` when either side is `Empty`;
    /// a guard of `Σ*` constrains nothing and yields `suffix` unchanged;
    /// nested lookaheads coalesce by intersecting their guards.
    pub fn look_ahead(guard: Regex, suffix: Regex) -> Self {
        if guard.is_empty() || suffix.is_empty() {
            return Self::empty();
        }
        if let Node::Star(inner) = guard.node() {
            if matches!(inner.node(), Node::Dot) {
                return suffix;
            }
        }
        if let Node::LookAhead {
            guard: inner_guard,
            suffix: inner_suffix,
        } = suffix.node()
        {
            return Self::look_ahead(
                Self::intersect([guard, inner_guard.clone()]),
                inner_suffix.clone(),
            );
        }
        Self::new(Node::LookAhead { guard, suffix })
    }

    /// A lookbehind: `prefix` still has to be consumed, and the text this
    /// term consumes must also match `guard`. Simplifications mirror
    /// [Regex::look_ahead].
    pub fn look_behind(prefix: Regex, guard: Regex) -> Self {
        if prefix.is_empty() || guard.is_empty() {
            return Self::empty();
        }
        if let Node::Star(inner) = guard.node() {
            if matches!(inner.node(), Node::Dot) {
                return prefix;
            }
        }
        if let Node::LookBehind {
            prefix: inner_prefix,
            guard: inner_guard,
        } = prefix.node()
        {
            return Self::look_behind(
                inner_prefix.clone(),
                Self::intersect([inner_guard.clone(), guard]),
            );
        }
        Self::new(Node::LookBehind { prefix, guard })
    }

    /// Whether this term matches the empty string.
    pub fn nullable(&self) -> bool {
        match self.node() {
            Node::Empty | Node::Dot | Node::Set(_) => false,
            Node::Epsilon | Node::Star(_) => true,
            Node::Concat(children) | Node::Intersect(children) => {
                children.iter().all(Regex::nullable)
            }
            Node::Union(children) => children.iter().any(Regex::nullable),
            Node::Complement(inner) => !inner.nullable(),
            Node::LookAhead { guard, suffix } => guard.nullable() && suffix.nullable(),
            Node::LookBehind { prefix, guard } => prefix.nullable() && guard.nullable(),
        }
    }

    /// The Brzozowski derivative: a term matching exactly the strings `w`
    /// such that this term matches `c·w`.
    ///
    /// ```
    /// use reglang::regex::Regex;
    ///
    /// let ab = Regex::symbol('a').then(&Regex::symbol('b'));
    /// assert_eq!(ab.derivative('a'), Regex::symbol('b'));
    /// assert_eq!(ab.derivative('b'), Regex::empty());
    /// ```
    pub fn derivative(&self, c: char) -> Self {
        match self.node() {
            Node::Empty | Node::Epsilon => Self::empty(),
            Node::Dot => Self::epsilon(),
            Node::Set(cs) => {
                if cs.matches(c) {
                    Self::epsilon()
                } else {
                    Self::empty()
                }
            }
            Node::Concat(children) => {
                // The character may be consumed by the first child, or, for
                // every nullable prefix of children, by the child just after
                // that prefix.
                let mut alternatives = Vec::new();
                for (i, child) in children.iter().enumerate() {
                    alternatives.push(Self::concat(
                        iter::once(child.derivative(c))
                            .chain(children[i + 1..].iter().cloned()),
                    ));
                    if !child.nullable() {
                        break;
                    }
                }
                Self::union(alternatives)
            }
            Node::Union(children) => {
                Self::union(children.iter().map(|child| child.derivative(c)))
            }
            Node::Intersect(children) => {
                Self::intersect(children.iter().map(|child| child.derivative(c)))
            }
            Node::Complement(inner) => inner.derivative(c).complement(),
            Node::Star(inner) => Self::concat([inner.derivative(c), self.clone()]),
            Node::LookAhead { guard, suffix } => {
                Self::look_ahead(guard.derivative(c), suffix.derivative(c))
            }
            Node::LookBehind { prefix, guard } => {
                Self::look_behind(prefix.derivative(c), guard.derivative(c))
            }
        }
    }

    /// Checks whether this term matches the whole input (both ends are
    /// implicitly anchored) by folding [Regex::derivative] over the input
    /// characters.
    pub fn matches(&self, input: &str) -> bool {
        let mut regex = self.clone();
        for c in input.chars() {
            regex = regex.derivative(c);
            if regex.is_empty() {
                return false;
            }
        }
        regex.nullable()
    }

    /// Compiles this term to a [Dfa] over the given alphabet (duplicate
    /// characters are dropped, first occurrence wins). States are labelled
    /// by derivatives of this term: the start state is the term itself, and
    /// following the transition for `c` from a state labelled `r` leads to
    /// the state labelled `r.derivative(c)`. The construction explores
    /// derivatives until no new ones appear, which terminates because
    /// derivatives modulo the canonical form are finitely many.
    ///
    /// ```
    /// use reglang::regex::Regex;
    ///
    /// let regex = reglang::compile("a[ab]*b").unwrap();
    /// let dfa = regex.to_dfa("ab");
    /// assert!(dfa.accepts("aab"));
    /// assert!(!dfa.accepts("aba"));
    /// ```
    pub fn to_dfa(&self, alphabet: &str) -> Dfa {
        let mut symbols: Vec<char> = Vec::new();
        for c in alphabet.chars() {
            if !symbols.contains(&c) {
                symbols.push(c);
            }
        }
        let alphabet: Rc<[char]> = symbols.into();

        let mut index = HashMap::from([(self.clone(), 0)]);
        let mut labels = vec![self.clone()];
        let mut transitions: Vec<Vec<usize>> = vec![Vec::new()];
        let mut queue = VecDeque::from([0]);

        while let Some(state) = queue.pop_front() {
            let label = labels[state].clone();
            let mut row = Vec::with_capacity(alphabet.len());
            for &c in alphabet.iter() {
                let derivative = label.derivative(c);
                let target = match index.get(&derivative) {
                    Some(&target) => target,
                    None => {
                        let target = labels.len();
                        index.insert(derivative.clone(), target);
                        labels.push(derivative);
                        transitions.push(Vec::new());
                        queue.push_back(target);
                        target
                    }
                };
                row.push(target);
            }
            transitions[state] = row;
        }

        let states = labels
            .into_iter()
            .zip(transitions)
            .map(|(label, transitions)| DfaState {
                accepting: label.nullable(),
                label,
                transitions,
            })
            .collect();
        Dfa {
            alphabet,
            states,
            initial_state: 0,
        }
    }

    fn is_atomic(&self) -> bool {
        match self.node() {
            Node::Empty | Node::Epsilon | Node::Dot | Node::Set(_) | Node::Star(_) => {
                true
            }
            Node::Complement(inner) => inner.is_atomic(),
            _ => false,
        }
    }

    fn fmt_child(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_atomic() {
            write!(f, "{self}")
        } else {
            write!(f, "({self})")
        }
    }
}

impl Display for Regex {
    /// Renders the term in a pattern-like notation, using `∅` for the empty
    /// language, `ε` for the empty string, `∩` for intersection and `~` for
    /// complement. Mostly useful for labelling DFA states and debugging.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.node() {
            Node::Empty => write!(f, "∅"),
            Node::Epsilon => write!(f, "ε"),
            Node::Dot => write!(f, "."),
            Node::Set(cs) => write!(f, "{cs}"),
            Node::Concat(children) => {
                children.iter().try_for_each(|child| child.fmt_child(f))
            }
            Node::Union(children) => {
                let mut first = true;
                for child in children {
                    if !first {
                        write!(f, "|")?;
                    }
                    first = false;
                    child.fmt_child(f)?;
                }
                Ok(())
            }
            Node::Intersect(children) => {
                let mut first = true;
                for child in children {
                    if !first {
                        write!(f, "∩")?;
                    }
                    first = false;
                    child.fmt_child(f)?;
                }
                Ok(())
            }
            Node::Complement(inner) => {
                write!(f, "~")?;
                inner.fmt_child(f)
            }
            Node::Star(inner) => {
                inner.fmt_child(f)?;
                write!(f, "*")
            }
            Node::LookAhead { guard, suffix } => {
                write!(f, "(?={guard})")?;
                suffix.fmt_child(f)
            }
            Node::LookBehind { prefix, guard } => {
                prefix.fmt_child(f)?;
                write!(f, "(?<={guard})")
            }
        }
    }
}
