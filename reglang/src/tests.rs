use crate::dfa::{Dfa, DfaState, LanguageError};
use crate::generate::{DeterministicGenerator, GenerateError, RandomGenerator};
use crate::parser::ParseError;
use crate::regex::{CharSet, Regex};
use crate::*;
use ::regex::Regex as LibRegex;
use proptest::prelude::*;
use rand::prelude::*;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

fn symbols() -> (Regex, Regex) {
    (Regex::symbol('a'), Regex::symbol('b'))
}

#[test]
fn construction_identities() {
    let (a, b) = symbols();

    assert_ne!(a, b);
    assert_eq!(a.and(&b), Regex::empty());
    assert_eq!(a.then(&Regex::epsilon()), a);
    assert_eq!(Regex::epsilon().then(&a), a);
    assert_eq!(
        Regex::epsilon().then(&Regex::epsilon()),
        Regex::epsilon()
    );
    assert_eq!(Regex::empty().then(&b), Regex::empty());
    assert_eq!(a.then(&Regex::empty()), Regex::empty());
    assert_eq!(a.and(&Regex::empty()), Regex::empty());
    assert_eq!(a.or(&Regex::empty()), a);
    assert_eq!(Regex::empty().or(&a), a);
    assert_eq!(Regex::empty().star(), Regex::epsilon());
    assert_eq!(Regex::epsilon().star(), Regex::epsilon());
    assert_eq!(a.star().and(&Regex::epsilon()), Regex::epsilon());
    assert_eq!(a.and(&Regex::epsilon()), Regex::empty());
    assert_eq!(a.and(&Regex::symbol('a')), a);
    assert_eq!(a.or(&Regex::symbol('a')), a);
    assert!(a.or(&b.star()).then(&b.or(&a.star())).nullable());

    // ~a ∩ b keeps exactly the characters the complement still accepts
    assert_eq!(a.complement().and(&b), b);
}

#[test]
fn derivatives_of_concatenations() {
    let (a, b) = symbols();
    let astar_b = a.star().then(&b);
    assert_eq!(astar_b.derivative('b'), Regex::epsilon());
    assert_eq!(astar_b.derivative('a'), astar_b);
    assert_eq!(astar_b.derivative('c'), Regex::empty());
    assert_eq!(a.then(&b).derivative('a'), b);
    assert_eq!(a.derivative('b'), Regex::empty());
}

#[test]
fn charset_fusion() {
    assert_eq!(
        compile("[^ab]").unwrap().and(&compile("[bc]").unwrap()),
        compile("c").unwrap()
    );
    assert_eq!(
        compile("[^a]").unwrap().and(&compile("[a]").unwrap()),
        Regex::empty()
    );
    assert_eq!(
        compile("[^ab]").unwrap().and(&compile("[b]").unwrap()),
        Regex::empty()
    );
    assert_eq!(
        compile("[^ab]").unwrap().and(&compile("[^bc]").unwrap()),
        compile("[^abc]").unwrap()
    );
    assert_eq!(
        compile("[ab]").unwrap().or(&compile("[bc]").unwrap()),
        compile("[abc]").unwrap()
    );
}

#[test]
fn double_complement_on_each_variant() {
    let (a, b) = symbols();
    let examples = vec![
        a.or(&b),                         // fused into a single charset
        a.then(&b),                       // concatenation
        a.then(&b).and(&a.or(&b).star()), // intersection
        a.star().or(&b.star()),           // union
        a.star().complement(),            // complement
        a.or(&b).star(),                  // star
    ];
    for example in examples {
        assert_eq!(example.complement().complement(), example);
    }
}

#[test]
fn de_morgan_pushes_complements_inward() {
    let (a, b) = symbols();
    let union = a.star().or(&b.then(&a));
    let intersection = a.star().and(&b.then(&a));
    assert_eq!(
        union.complement(),
        a.star().complement().and(&b.then(&a).complement())
    );
    assert_eq!(
        intersection.complement(),
        a.star().complement().or(&b.then(&a).complement())
    );
}

#[test]
fn intersection_matching() {
    let (a, b) = symbols();
    let even_as = a.star().and(&a.then(&a).or(&b).star());
    assert!(even_as.matches("aa"));
    assert!(!even_as.matches("aaa"));
    assert!(even_as.matches("aaaa"));
    assert!(even_as.matches(""));
}

#[test]
fn lookahead_constructor_simplifications() {
    let (a, _) = symbols();
    assert_eq!(Regex::look_ahead(Regex::dot().star(), a.clone()), a);
    assert_eq!(
        Regex::look_ahead(Regex::empty(), a.clone()),
        Regex::empty()
    );
    assert_eq!(
        Regex::look_behind(a.clone(), Regex::dot().star()),
        a
    );
    assert_eq!(
        Regex::look_behind(Regex::empty(), a),
        Regex::empty()
    );
}

#[test]
fn term_display() {
    assert_eq!(compile("[acb]*").unwrap().to_string(), "[abc]*");
    assert_eq!(compile(".*").unwrap().to_string(), ".*");
    assert_eq!(Regex::empty().to_string(), "∅");
    assert_eq!(Regex::epsilon().to_string(), "ε");
    assert!(compile("ab|c").unwrap().to_string().contains('|'));
}

#[test]
fn parser_rejections() {
    assert!(matches!(
        compile("a{0}"),
        Err(ParseError::InvalidRepeat(_))
    ));
    assert!(matches!(
        compile("a{3,1}"),
        Err(ParseError::InvalidRepeat(_))
    ));
    assert_eq!(
        compile("[z-a]"),
        Err(ParseError::InvalidCharRange {
            start: 'z',
            end: 'a'
        })
    );
    assert!(matches!(compile("(a"), Err(ParseError::Syntax { .. })));
    assert!(matches!(compile("a)"), Err(ParseError::Syntax { .. })));
    assert!(matches!(compile("*a"), Err(ParseError::Syntax { .. })));
}

#[test]
fn parser_escapes_and_classes() {
    assert!(compile(r"\x41B").unwrap().matches("AB"));
    assert!(compile(r"\101").unwrap().matches("A"));
    assert!(compile(r"\n\t").unwrap().matches("\n\t"));
    assert!(compile(r"\.").unwrap().matches("."));
    assert!(!compile(r"\.").unwrap().matches("x"));

    let digits = compile(r"\d+").unwrap();
    assert!(digits.matches("042"));
    assert!(!digits.matches("a1"));
    assert!(compile(r"\D").unwrap().matches("x"));
    assert!(!compile(r"\D").unwrap().matches("5"));
    assert!(compile(r"\w*").unwrap().matches("ab_1"));
    assert!(compile(r"\s").unwrap().matches(" "));
    assert!(!compile(r"\S").unwrap().matches("\t"));
}

#[test]
fn parser_sets_and_quantifiers() {
    assert!(compile("[a-c]x").unwrap().matches("bx"));
    assert!(compile("[^a-c]").unwrap().matches("d"));
    assert!(!compile("[^a-c]").unwrap().matches("b"));

    // a dash that is not part of a range is a literal
    let trailing_dash = compile("[a-]").unwrap();
    assert!(trailing_dash.matches("a"));
    assert!(trailing_dash.matches("-"));
    assert!(compile(r"[\d]").unwrap().matches("5"));
    assert!(compile(r"[^\d]").unwrap().matches("x"));
    assert!(compile(r"[\sx]").unwrap().matches(" "));

    let two_to_four = compile("a{2,4}").unwrap();
    assert!(!two_to_four.matches("a"));
    assert!(two_to_four.matches("aa"));
    assert!(two_to_four.matches("aaaa"));
    assert!(!two_to_four.matches("aaaaa"));
    let at_least_two = compile("a{2,}").unwrap();
    assert!(!at_least_two.matches("a"));
    assert!(at_least_two.matches("aaaaaa"));
    let at_most_two = compile("a{,2}").unwrap();
    assert!(at_most_two.matches(""));
    assert!(at_most_two.matches("aa"));
    assert!(!at_most_two.matches("aaa"));

    assert!(compile("a(?#a comment)b").unwrap().matches("ab"));
    assert!(compile("(?:ab)+c").unwrap().matches("ababc"));
    // an empty alternative matches the empty string
    let a_or_nothing = compile("a|").unwrap();
    assert!(a_or_nothing.matches("a"));
    assert!(a_or_nothing.matches(""));
}

#[test]
fn lookarounds() {
    let ahead = compile("foo(?=bar).*").unwrap();
    assert!(ahead.matches("foobarasdf"));
    assert!(ahead.matches("foobar"));
    assert!(!ahead.matches("foobaz"));

    let negative_behind = compile(".*(?<!foo)bar").unwrap();
    assert!(negative_behind.matches("foodbar"));
    assert!(negative_behind.matches("bar"));
    assert!(!negative_behind.matches("foobar"));

    let behind = compile(".*(?<=oo)bar").unwrap();
    assert!(behind.matches("foobar"));
    assert!(!behind.matches("fobar"));

    let negative_ahead = compile("foo(?!bar).*").unwrap();
    assert!(negative_ahead.matches("foobaz"));
    assert!(!negative_ahead.matches("foobar"));

    // lookaround also works through the DFA
    let dfa = ahead.to_dfa("fobarsdz");
    assert!(dfa.accepts("foobarasdf"));
    assert!(!dfa.accepts("foobaz"));
}

#[test]
fn matching_through_dfa_stays_exact() {
    let regex = compile("a[abc]*b[abc]*c").unwrap();
    let dfa = regex.to_dfa("abcd");
    assert!(regex.matches("abbbbc"));
    assert!(dfa.accepts("abbbbc"));
    assert!(!regex.matches("aabbcc d"));
    assert!(!dfa.accepts("aabbcc d"));

    let minimized = dfa.minimized();
    assert!(minimized.states().len() <= dfa.states().len());
    assert!(minimized.equivalent_to(&dfa));
    assert_eq!(dfa.longest_string(), Err(LanguageError::InfiniteLanguage));
}

#[test]
fn emptiness() {
    assert!(Regex::empty().to_dfa("ab").is_empty_language());
    assert!(!Regex::epsilon().to_dfa("ab").is_empty_language());
    assert!(!Regex::epsilon()
        .complement()
        .to_dfa("ab")
        .is_empty_language());
    let disjoint = compile("a*|b*")
        .unwrap()
        .and(&compile("c+").unwrap());
    assert!(disjoint.to_dfa("abc").is_empty_language());
}

#[test]
fn finiteness() {
    assert!(build_dfa("aa", "ab").unwrap().has_finite_language());
    assert!(!build_dfa("aa*", "ab").unwrap().has_finite_language());
    assert!(build_dfa("a(bc|cd|aaa)", "abcd")
        .unwrap()
        .has_finite_language());
    assert!(!build_dfa("a(bc*|cd|aaa)", "abcd")
        .unwrap()
        .has_finite_language());
    assert!(Regex::empty().to_dfa("ab").has_finite_language());
    assert!(!Regex::empty()
        .complement()
        .to_dfa("ab")
        .has_finite_language());
    assert!(!Regex::epsilon()
        .complement()
        .to_dfa("ab")
        .has_finite_language());
}

const IPV4: &str =
    r"((25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)";

#[test]
fn longest_strings() {
    let ip = build_dfa(IPV4, "0123456789.").unwrap();
    assert!(ip.has_finite_language());
    let longest = ip.longest_string().unwrap();
    assert_eq!(longest.chars().count(), 15);
    assert!(compile(IPV4).unwrap().matches(&longest));

    let lcm = compile("([ab]{4})*")
        .unwrap()
        .and(&compile("([ab]{3})*").unwrap());
    assert_eq!(
        lcm.to_dfa("ab").longest_string(),
        Err(LanguageError::InfiniteLanguage)
    );

    let ab_ba_star = compile("(ab)*").unwrap().and(&compile("(ba)*").unwrap());
    let dfa = ab_ba_star.to_dfa("ab");
    assert!(!dfa.is_empty_language());
    assert!(dfa.has_finite_language());
    assert_eq!(dfa.longest_string().unwrap(), "");

    let ab_ba_plus = compile("(ab)+").unwrap().and(&compile("(ba)+").unwrap());
    assert_eq!(
        ab_ba_plus.to_dfa("ab").longest_string(),
        Err(LanguageError::EmptyLanguage)
    );

    assert_eq!(Regex::epsilon().to_dfa("ab").longest_string().unwrap(), "");
}

/// Builds a test state; the label never matters for hand-assembled DFAs.
fn state(accepting: bool, transitions: Vec<usize>) -> DfaState {
    DfaState {
        label: Regex::epsilon(),
        accepting,
        transitions,
    }
}

#[test]
fn minimization_merges_equivalence_classes() {
    // the classic six-state example minimizing to three states:
    // {a, b}, {c, d, e} and the dead state f
    let dfa = Dfa {
        alphabet: Rc::from(vec!['0', '1']),
        states: vec![
            state(false, vec![1, 2]), // a
            state(false, vec![0, 3]), // b
            state(true, vec![4, 5]),  // c
            state(true, vec![4, 5]),  // d
            state(true, vec![4, 5]),  // e
            state(false, vec![5, 5]), // f
        ],
        initial_state: 0,
    };
    let minimized = dfa.minimized();
    assert_eq!(minimized.states().len(), 3);
    assert!(minimized.equivalent_to(&dfa));

    let expected = Dfa {
        alphabet: Rc::from(vec!['0', '1']),
        states: vec![
            state(false, vec![0, 1]), // {a, b}
            state(true, vec![1, 2]),  // {c, d, e}
            state(false, vec![2, 2]), // {f}
        ],
        initial_state: 0,
    };
    assert!(expected.construct_isomorphism(&minimized).is_some());
    assert!(expected.construct_isomorphism(&dfa).is_none());
}

#[test]
fn isomorphism_distinguishes_languages() {
    let first = build_dfa("a|b", "ab").unwrap().minimized();
    let second = build_dfa("b|a", "ab").unwrap().minimized();
    let third = build_dfa("a", "ab").unwrap().minimized();
    assert!(first.construct_isomorphism(&second).is_some());
    assert!(first.construct_isomorphism(&third).is_none());
}

#[test]
fn integerized_moves_the_start_state_first() {
    let dfa = Dfa {
        alphabet: Rc::from(vec!['0', '1']),
        states: vec![
            state(true, vec![0, 1]),
            state(false, vec![2, 1]),
            state(false, vec![0, 2]),
        ],
        initial_state: 2,
    };
    let integerized = dfa.integerized();
    assert_eq!(integerized.initial_state_index(), 0);
    assert!(integerized.equivalent_to(&dfa));
}

#[test]
fn find_invalid_states_reports_partial_rows() {
    let dfa = Dfa {
        alphabet: Rc::from(vec!['0', '1']),
        states: vec![
            state(false, vec![0, 1]),
            state(true, vec![0]),     // missing the transition for '1'
            state(false, vec![1, 9]), // target state does not exist
        ],
        initial_state: 0,
    };
    assert_eq!(dfa.find_invalid_states(), vec![1, 2]);
    assert!(build_dfa("a|b", "ab")
        .unwrap()
        .find_invalid_states()
        .is_empty());
}

#[test]
fn generators_reject_partial_dfas() {
    let broken = Dfa {
        alphabet: Rc::from(vec!['0', '1']),
        states: vec![state(true, vec![0])],
        initial_state: 0,
    };
    assert_eq!(
        RandomGenerator::new(&broken).unwrap_err(),
        GenerateError::InvalidDfa(0)
    );
    assert_eq!(
        DeterministicGenerator::new(&broken).unwrap_err(),
        GenerateError::InvalidDfa(0)
    );
}

#[test]
fn uniform_generation() {
    let dfa = build_dfa("(a|bb|ccc)*", "abc").unwrap();
    let mut generator = RandomGenerator::new(&dfa).unwrap();
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..10 {
        assert_eq!(
            generator.generate_string_with(0, &mut rng),
            Some(String::new())
        );
        assert_eq!(
            generator.generate_string_with(1, &mut rng).as_deref(),
            Some("a")
        );
    }

    // exactly "aa" and "bb" have length two, so each should come up about
    // half of the time
    let mut counts: HashMap<String, usize> = HashMap::new();
    for _ in 0..1000 {
        let word = generator.generate_string_with(2, &mut rng).unwrap();
        *counts.entry(word).or_default() += 1;
    }
    assert_eq!(counts.len(), 2);
    for word in ["aa", "bb"] {
        let count = counts[word];
        assert!((400..=600).contains(&count), "{word} drawn {count} times");
    }

    // at length three the four candidates are aaa, abb, bba and ccc
    let mut counts: HashMap<String, usize> = HashMap::new();
    for _ in 0..2000 {
        let word = generator.generate_string_with(3, &mut rng).unwrap();
        *counts.entry(word).or_default() += 1;
    }
    assert_eq!(counts.len(), 4);
    for word in ["aaa", "abb", "bba", "ccc"] {
        let count = counts[word];
        assert!((400..=600).contains(&count), "{word} drawn {count} times");
    }

    // everything generated is actually in the language
    let regex = compile("(a|bb|ccc)*").unwrap();
    for length in 1..=12 {
        let word = generator.generate_string_with(length, &mut rng).unwrap();
        assert!(regex.matches(&word), "{word} is not matched");
    }
}

#[test]
fn uniform_generation_of_a_complement() {
    let rejected = compile("(a|bb|ccc)*").unwrap().complement();
    let mut generator = RandomGenerator::new(&rejected.to_dfa("abc")).unwrap();
    let mut rng = StdRng::seed_from_u64(0xbeef);

    assert_eq!(generator.generate_string_with(0, &mut rng), None);
    let mut counts: HashMap<String, usize> = HashMap::new();
    for _ in 0..1000 {
        let word = generator.generate_string_with(1, &mut rng).unwrap();
        *counts.entry(word).or_default() += 1;
    }
    assert_eq!(counts.len(), 2);
    for word in ["b", "c"] {
        let count = counts[word];
        assert!((400..=600).contains(&count), "{word} drawn {count} times");
    }
}

#[test]
fn generation_signals_missing_lengths() {
    let dfa = build_dfa("(aa)*", "a").unwrap();
    let mut generator = RandomGenerator::new(&dfa).unwrap();
    assert_eq!(generator.generate_string(0), Some(String::new()));
    assert_eq!(generator.generate_string(1), None);
    assert_eq!(generator.generate_string(2).as_deref(), Some("aa"));
    assert_eq!(generator.generate_string(3), None);

    let none = compile("a").unwrap().and(&compile("b").unwrap());
    assert_eq!(none, Regex::empty());
    let mut generator = RandomGenerator::new(&none.to_dfa("ab")).unwrap();
    assert_eq!(generator.generate_string(0), None);
    assert_eq!(generator.generate_string(1), None);
    assert_eq!(generator.valid_lengths().collect::<Vec<_>>(), vec![]);
}

#[test]
fn valid_lengths_of_finite_and_infinite_languages() {
    let even = compile("(aa)*").unwrap().and(&compile("a{0,16}").unwrap());
    let mut generator = DeterministicGenerator::new(&even.to_dfa("a")).unwrap();
    assert_eq!(
        generator.valid_lengths().collect::<Vec<_>>(),
        vec![0, 2, 4, 6, 8, 10, 12, 14, 16]
    );

    let unbounded = build_dfa("(aa)*", "a").unwrap();
    let mut generator = RandomGenerator::new(&unbounded).unwrap();
    assert_eq!(
        generator.valid_lengths().take(5).collect::<Vec<_>>(),
        vec![0, 2, 4, 6, 8]
    );

    let ip = build_dfa(IPV4, "0123456789.").unwrap();
    let mut generator = RandomGenerator::new(&ip).unwrap();
    assert_eq!(
        generator.valid_lengths().collect::<Vec<_>>(),
        (7..=15).collect::<Vec<_>>()
    );
}

#[test]
fn enumeration_yields_each_string_once() {
    let even = compile("(aa)*").unwrap().and(&compile("a{0,16}").unwrap());
    let mut generator = DeterministicGenerator::new(&even.to_dfa("a")).unwrap();
    let words: Vec<String> = generator.matching_strings().collect();
    let expected: Vec<String> = (0..=8).map(|n| "aa".repeat(n)).collect();
    assert_eq!(words, expected);
}

#[test]
fn enumeration_of_an_infinite_language_by_length() {
    let dfa = build_dfa("(a|bb|ccc)*", "abc").unwrap();
    let mut generator = DeterministicGenerator::new(&dfa).unwrap();
    let words: Vec<String> = generator.matching_strings().take(8).collect();
    assert_eq!(words[0], "");
    assert_eq!(words[1], "a");
    assert_eq!(
        words[2..4].iter().collect::<HashSet<_>>(),
        ["aa".to_string(), "bb".to_string()].iter().collect()
    );
    assert_eq!(
        words[4..8].iter().collect::<HashSet<_>>(),
        [
            "aaa".to_string(),
            "abb".to_string(),
            "bba".to_string(),
            "ccc".to_string()
        ]
        .iter()
        .collect()
    );
}

fn all_words(alphabet: &[char], max_len: usize) -> Vec<String> {
    let mut words = vec![String::new()];
    let mut frontier = vec![String::new()];
    for _ in 0..max_len {
        frontier = frontier
            .iter()
            .flat_map(|word| {
                alphabet.iter().map(move |&c| {
                    let mut word = word.clone();
                    word.push(c);
                    word
                })
            })
            .collect();
        words.extend(frontier.iter().cloned());
    }
    words
}

#[test]
fn enumeration_matches_brute_force() {
    let regex = compile("(a|bb)(a|b){0,2}").unwrap();
    let mut generator = DeterministicGenerator::new(&regex.to_dfa("ab")).unwrap();
    let words: Vec<String> = generator.matching_strings().collect();
    let unique: HashSet<&String> = words.iter().collect();
    assert_eq!(unique.len(), words.len(), "a string was yielded twice");

    let expected: HashSet<String> = all_words(&['a', 'b'], 5)
        .into_iter()
        .filter(|word| regex.matches(word))
        .collect();
    assert_eq!(words.into_iter().collect::<HashSet<_>>(), expected);
}

#[test]
fn deterministic_generation_cycles_through_strings() {
    let dfa = build_dfa("a|b", "ab").unwrap();
    let mut generator = DeterministicGenerator::new(&dfa).unwrap();
    let words: HashSet<Option<String>> = (0..2).map(|_| generator.generate_string(1)).collect();
    assert_eq!(
        words,
        HashSet::from([Some("a".to_string()), Some("b".to_string())])
    );
}

#[test]
fn generated_ips_are_valid() {
    let dfa = build_dfa(IPV4, "0123456789.").unwrap();
    let mut generator = RandomGenerator::new(&dfa).unwrap();
    let mut rng = StdRng::seed_from_u64(0x1234);
    let reference = LibRegex::new(&format!("^(?:{IPV4})$")).unwrap();
    for length in 7..=15 {
        for _ in 0..20 {
            let word = generator.generate_string_with(length, &mut rng).unwrap();
            assert_eq!(word.chars().count(), length);
            assert!(reference.is_match(&word), "{word} is not an address");
        }
    }
}

#[test]
fn transition_tables_render() {
    let dfa = build_dfa("ab", "ab").unwrap();
    let table = dfa.to_table();
    assert!(table.contains('→'));
    assert!(table.contains('*'));
    assert_eq!(table.lines().count(), dfa.states().len() + 1);
    assert!(dfa.ascii_table().contains("->"));
}

fn leaf_term() -> impl Strategy<Value = Regex> {
    prop_oneof![
        1 => Just(Regex::empty()),
        2 => Just(Regex::epsilon()),
        2 => Just(Regex::dot()),
        6 => prop::sample::subsequence(vec!['a', 'b', 'c', 'd'], 1..=3)
            .prop_map(|chars| Regex::set(CharSet::new(chars))),
    ]
}

fn term() -> impl Strategy<Value = Regex> {
    leaf_term().prop_recursive(3, 24, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(r, s)| r.then(&s)),
            (inner.clone(), inner.clone()).prop_map(|(r, s)| r.or(&s)),
            (inner.clone(), inner.clone()).prop_map(|(r, s)| r.and(&s)),
            inner.prop_map(|r| r.star()),
        ]
    })
}

fn random_pattern() -> impl Strategy<Value = String> {
    "[a-d]".prop_recursive(5, 24, 6, |inner| {
        prop_oneof![
            10 => prop::collection::vec(inner.clone(), 1..5)
                .prop_map(|vec| format!("({})", vec.join(""))),
            10 => prop::collection::vec(inner.clone(), 2..5).prop_map(|vec| vec.join("|")),
            3 => inner.clone().prop_map(|r| format!("({r})*")),
            3 => inner.clone().prop_map(|r| format!("({r})+")),
            2 => inner.clone().prop_map(|r| format!("({r})?")),
            2 => inner.prop_map(|r| format!("({r}){{2,3}}")),
        ]
    })
}

proptest! {
    /// Union and intersection do not care about argument order.
    #[test]
    fn union_and_intersection_commute(r in term(), s in term()) {
        prop_assert_eq!(r.or(&s), s.or(&r));
        prop_assert_eq!(r.and(&s), s.and(&r));
    }

    /// Concatenation associates structurally thanks to flattening.
    #[test]
    fn concatenation_is_associative(r in term(), s in term(), t in term()) {
        prop_assert_eq!(r.then(&s).then(&t), r.then(&s.then(&t)));
    }

    #[test]
    fn algebraic_units(r in term()) {
        prop_assert_eq!(r.or(&Regex::empty()), r.clone());
        prop_assert_eq!(r.then(&Regex::epsilon()), r.clone());
        let with_epsilon = r.and(&Regex::epsilon());
        if r.nullable() {
            prop_assert_eq!(with_epsilon, Regex::epsilon());
        } else {
            prop_assert_eq!(with_epsilon, Regex::empty());
        }
    }

    #[test]
    fn double_complement_is_identity(r in term()) {
        prop_assert_eq!(r.complement().complement(), r);
    }

    /// De Morgan holds as a language identity over any pair of terms.
    #[test]
    fn de_morgan_preserves_the_language(r in term(), s in term()) {
        let negated_union = r.or(&s).complement().to_dfa("abcd");
        let intersected = r.complement().and(&s.complement()).to_dfa("abcd");
        prop_assert!(negated_union.equivalent_to(&intersected));
    }

    /// The derivative by c is nullable exactly when the one-character
    /// string c is matched.
    #[test]
    fn derivative_agrees_with_single_char_match(r in term()) {
        for c in "abcd".chars() {
            prop_assert_eq!(r.derivative(c).nullable(), r.matches(&c.to_string()));
        }
    }

    /// The compiled DFA and the direct derivative matcher always agree.
    #[test]
    fn dfa_agrees_with_derivative_matcher(
        r in term(),
        tests in prop::collection::vec("[a-d]{0,6}", 20)
    ) {
        let dfa = r.to_dfa("abcd");
        for test in &tests {
            prop_assert_eq!(dfa.accepts(test), r.matches(test));
        }
    }

    /// Both the derivative matcher and the DFA agree with the reference
    /// engine on the common pattern subset (anchored on both ends).
    #[test]
    fn matches_reference_engine(
        pattern in random_pattern(),
        tests in prop::collection::vec("[a-d]{0,8}", 25)
    ) {
        let regex = compile(&pattern).unwrap();
        let dfa = regex.to_dfa("abcd");
        let reference = LibRegex::new(&format!("^(?:{pattern})$")).unwrap();
        for test in &tests {
            let expected = reference.is_match(test);
            prop_assert_eq!(regex.matches(test), expected);
            prop_assert_eq!(dfa.accepts(test), expected);
        }
    }

    /// Minimization never grows the automaton and never changes the
    /// language, and minimal automata of one language are isomorphic.
    #[test]
    fn minimization_preserves_language(pattern in random_pattern()) {
        let dfa = compile(&pattern).unwrap().to_dfa("abcd");
        let minimized = dfa.minimized();
        prop_assert!(minimized.states().len() <= dfa.states().len());
        prop_assert!(minimized.equivalent_to(&dfa));
        prop_assert!(minimized.construct_isomorphism(&dfa.minimized()).is_some());
    }

    /// Minimized DFAs are isomorphic exactly when the languages agree.
    #[test]
    fn isomorphism_iff_equivalent(p1 in random_pattern(), p2 in random_pattern()) {
        let d1 = compile(&p1).unwrap().to_dfa("abcd").minimized();
        let d2 = compile(&p2).unwrap().to_dfa("abcd").minimized();
        prop_assert_eq!(
            d1.construct_isomorphism(&d2).is_some(),
            d1.equivalent_to(&d2)
        );
    }

    /// A DFA is empty exactly when it is equivalent to the one compiled
    /// from ∅.
    #[test]
    fn emptiness_is_equivalence_with_empty(r in term()) {
        let dfa = r.to_dfa("abcd");
        let empty_dfa = Regex::empty().to_dfa("abcd");
        prop_assert_eq!(dfa.is_empty_language(), dfa.equivalent_to(&empty_dfa));
    }

    /// Everything the deterministic generator enumerates is matched, and
    /// lengths reported valid produce strings.
    #[test]
    fn enumerated_strings_match(pattern in random_pattern()) {
        let regex = compile(&pattern).unwrap();
        let mut generator = DeterministicGenerator::new(&regex.to_dfa("abcd")).unwrap();
        let lengths: Vec<usize> = generator.valid_lengths().take(4).collect();
        for length in lengths {
            let word = generator.generate_string(length).unwrap();
            prop_assert_eq!(word.chars().count(), length);
            prop_assert!(regex.matches(&word));
        }
        for word in generator.matching_strings().take(25) {
            prop_assert!(regex.matches(&word));
        }
    }
}
