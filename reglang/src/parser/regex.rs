use nom::branch::alt;
use nom::bytes::complete::{tag, take_while, take_while_m_n};
use nom::character::complete::{self, anychar, digit1, none_of, one_of};
use nom::combinator::{map, map_opt, map_res, opt, value, verify};
use nom::multi::{many0, many1, separated_list1};
use nom::sequence::{delimited, preceded, terminated};
use nom::IResult;

/// The raw syntax tree of a pattern, before the semantic checks (repeat
/// counts, character ranges) performed when converting it into a
/// [Regex](crate::regex::Regex).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Ast {
    Alt(Vec<Ast>),
    Seq(Vec<Ast>),
    Star(Box<Ast>),
    Plus(Box<Ast>),
    Opt(Box<Ast>),
    RepeatFixed(Box<Ast>, usize),
    RepeatRange(Box<Ast>, usize, Option<usize>),
    LookAhead { inner: Box<Ast>, negative: bool },
    LookBehind { inner: Box<Ast>, negative: bool },
    Dot,
    Literal(char),
    /// One of `d D w W s S`.
    Class(char),
    Set { negated: bool, items: Vec<SetItem> },
    /// Produced by comments, which match the empty string.
    Epsilon,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SetItem {
    Char(char),
    Range(char, char),
    /// One of `d D w W s S`.
    Class(char),
}

pub(crate) fn full_regex(input: &str) -> IResult<&str, Ast> {
    expression(input)
}

fn expression(input: &str) -> IResult<&str, Ast> {
    map(
        separated_list1(complete::char('|'), sequence),
        wrap_multiple(Ast::Alt),
    )(input)
}

fn sequence(input: &str) -> IResult<&str, Ast> {
    map(many0(quantified), wrap_multiple(Ast::Seq))(input)
}

fn wrap_multiple(f: impl Fn(Vec<Ast>) -> Ast) -> impl Fn(Vec<Ast>) -> Ast {
    move |mut items| {
        if items.len() == 1 {
            items.remove(0)
        } else {
            f(items)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Quantifier {
    Star,
    Plus,
    Opt,
    Fixed(usize),
    Range(usize, Option<usize>),
}

fn quantified(input: &str) -> IResult<&str, Ast> {
    let (input, atom) = atom(input)?;
    let (input, quantifier) = opt(quantifier)(input)?;
    let atom = match quantifier {
        None => atom,
        Some(Quantifier::Star) => Ast::Star(Box::new(atom)),
        Some(Quantifier::Plus) => Ast::Plus(Box::new(atom)),
        Some(Quantifier::Opt) => Ast::Opt(Box::new(atom)),
        Some(Quantifier::Fixed(n)) => Ast::RepeatFixed(Box::new(atom), n),
        Some(Quantifier::Range(lo, hi)) => Ast::RepeatRange(Box::new(atom), lo, hi),
    };
    Ok((input, atom))
}

fn quantifier(input: &str) -> IResult<&str, Quantifier> {
    alt((
        value(Quantifier::Star, complete::char('*')),
        value(Quantifier::Plus, complete::char('+')),
        value(Quantifier::Opt, complete::char('?')),
        delimited(complete::char('{'), repeat_spec, complete::char('}')),
    ))(input)
}

fn repeat_spec(input: &str) -> IResult<&str, Quantifier> {
    let (input, lo) = opt(number)(input)?;
    let (input, comma) = opt(complete::char(','))(input)?;
    match comma {
        None => match lo {
            // "{}" is not a quantifier
            None => Err(nom::Err::Error(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Digit,
            ))),
            Some(n) => Ok((input, Quantifier::Fixed(n))),
        },
        Some(_) => {
            let (input, hi) = opt(number)(input)?;
            Ok((input, Quantifier::Range(lo.unwrap_or(0), hi)))
        }
    }
}

fn number(input: &str) -> IResult<&str, usize> {
    map_res(digit1, str::parse)(input)
}

fn atom(input: &str) -> IResult<&str, Ast> {
    alt((
        comment, lookaround, group, charset, dot, escape_atom, plain_char,
    ))(input)
}

fn comment(input: &str) -> IResult<&str, Ast> {
    value(
        Ast::Epsilon,
        delimited(
            tag("(?#"),
            take_while(|c| c != ')'),
            complete::char(')'),
        ),
    )(input)
}

fn lookaround(input: &str) -> IResult<&str, Ast> {
    let (input, kind) = alt((tag("(?<="), tag("(?<!"), tag("(?="), tag("(?!")))(input)?;
    let (input, inner) = expression(input)?;
    let (input, _) = complete::char(')')(input)?;
    let inner = Box::new(inner);
    let atom = match kind {
        "(?=" => Ast::LookAhead {
            inner,
            negative: false,
        },
        "(?!" => Ast::LookAhead {
            inner,
            negative: true,
        },
        "(?<=" => Ast::LookBehind {
            inner,
            negative: false,
        },
        _ => Ast::LookBehind {
            inner,
            negative: true,
        },
    };
    Ok((input, atom))
}

fn group(input: &str) -> IResult<&str, Ast> {
    preceded(
        alt((tag("(?:"), tag("("))),
        terminated(expression, complete::char(')')),
    )(input)
}

fn dot(input: &str) -> IResult<&str, Ast> {
    value(Ast::Dot, complete::char('.'))(input)
}

fn escape_atom(input: &str) -> IResult<&str, Ast> {
    preceded(
        complete::char('\\'),
        alt((
            map(one_of("dDwWsS"), Ast::Class),
            map(escape_code, Ast::Literal),
            map(anychar, Ast::Literal),
        )),
    )(input)
}

/// The numeric and control escapes shared between atoms and sets (the
/// leading backslash is consumed by the caller): `\073`, `\x41`, `A`,
/// `\U00000041`, `\n`, `\t`, `\v`, `\r`.
fn escape_code(input: &str) -> IResult<&str, char> {
    alt((
        map_opt(take_while_m_n(3, 3, |c: char| c.is_digit(8)), |s| {
            char::from_u32(u32::from_str_radix(s, 8).ok()?)
        }),
        map_opt(
            preceded(
                complete::char('x'),
                take_while_m_n(2, 2, |c: char| c.is_ascii_hexdigit()),
            ),
            hex_char,
        ),
        map_opt(
            preceded(
                complete::char('u'),
                take_while_m_n(4, 4, |c: char| c.is_ascii_hexdigit()),
            ),
            hex_char,
        ),
        map_opt(
            preceded(
                complete::char('U'),
                take_while_m_n(8, 8, |c: char| c.is_ascii_hexdigit()),
            ),
            hex_char,
        ),
        map(one_of("ntvr"), |c| match c {
            'n' => '\n',
            't' => '\t',
            'v' => '\x0B',
            _ => '\r',
        }),
    ))(input)
}

fn hex_char(s: &str) -> Option<char> {
    char::from_u32(u32::from_str_radix(s, 16).ok()?)
}

fn plain_char(input: &str) -> IResult<&str, Ast> {
    map(none_of(".$^\\*+[]()|{}?"), Ast::Literal)(input)
}

fn charset(input: &str) -> IResult<&str, Ast> {
    let (input, _) = complete::char('[')(input)?;
    let (input, negated) = opt(complete::char('^'))(input)?;
    let (input, items) = many1(set_item)(input)?;
    let (input, _) = complete::char(']')(input)?;
    Ok((
        input,
        Ast::Set {
            negated: negated.is_some(),
            items,
        },
    ))
}

fn set_item(input: &str) -> IResult<&str, SetItem> {
    alt((
        set_range,
        map(preceded(complete::char('\\'), one_of("dDwWsS")), SetItem::Class),
        map(set_char, SetItem::Char),
    ))(input)
}

fn set_range(input: &str) -> IResult<&str, SetItem> {
    let (input, start) = set_char(input)?;
    let (input, _) = complete::char('-')(input)?;
    let (input, end) = set_char(input)?;
    Ok((input, SetItem::Range(start, end)))
}

fn set_char(input: &str) -> IResult<&str, char> {
    alt((set_escape, none_of("]\\")))(input)
}

fn set_escape(input: &str) -> IResult<&str, char> {
    preceded(
        complete::char('\\'),
        alt((
            escape_code,
            // an escaped literal; the class letters belong to set_item
            verify(anychar, |c| !"dDwWsS".contains(*c)),
        )),
    )(input)
}
