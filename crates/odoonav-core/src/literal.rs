//! Restricted parser for the Python-literal subset stored in action `context` and
//! `params` text fields.
//!
//! Only dicts, lists, tuples, quoted strings, numbers and `True`/`False`/`None` are
//! understood. Anything else inside a container (a bare name such as `uid`, a
//! subscript, an arithmetic expression) is skipped with bracket and quote balancing and
//! recorded as `null`. Nothing is ever evaluated.

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::char;
use nom::character::complete::digit1;
use nom::character::complete::multispace0;
use nom::character::complete::one_of;
use nom::character::complete::satisfy;
use nom::combinator::all_consuming;
use nom::combinator::map;
use nom::combinator::map_res;
use nom::combinator::not;
use nom::combinator::opt;
use nom::combinator::peek;
use nom::combinator::recognize;
use nom::combinator::value;
use nom::error::Error as NomError;
use nom::error::ErrorKind;
use nom::multi::separated_list0;
use nom::sequence::delimited;
use nom::sequence::pair;
use nom::sequence::preceded;
use nom::sequence::terminated;
use nom::sequence::tuple;
use nom::IResult;
use serde_json::Map;
use serde_json::Value;

use crate::error::LiteralError;

/// Containers nest at most this deep; the parser recurses once per level.
pub const MAX_NESTING: usize = 64;

pub fn parse_literal(input: &str) -> Result<Value, LiteralError> {
    check_nesting(input)?;
    match all_consuming(delimited(multispace0, literal, multispace0))(input) {
        Ok((_, parsed)) => Ok(parsed),
        Err(nom::Err::Error(err)) | Err(nom::Err::Failure(err)) => Err(LiteralError {
            offset: input.len().saturating_sub(err.input.len()),
            message: format!("unexpected input ({:?})", err.code),
        }),
        Err(nom::Err::Incomplete(_)) => Err(LiteralError {
            offset: input.len(),
            message: "incomplete input".to_string(),
        }),
    }
}

/// Brackets inside quoted text are not counted, with the same quoting rules as
/// [`opaque`].
fn check_nesting(input: &str) -> Result<(), LiteralError> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (idx, c) in input.char_indices() {
        if let Some(open) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == open {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' | '[' | '{' => {
                depth += 1;
                if depth > MAX_NESTING {
                    return Err(LiteralError {
                        offset: idx,
                        message: format!("containers nested deeper than {MAX_NESTING}"),
                    });
                }
            }
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

fn literal(input: &str) -> IResult<&str, Value> {
    alt((
        dict,
        list,
        tuple_literal,
        map(quoted, Value::String),
        number,
        keyword,
    ))(input)
}

fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn word_end(input: &str) -> IResult<&str, ()> {
    not(satisfy(is_ident_char))(input)
}

fn keyword(input: &str) -> IResult<&str, Value> {
    alt((
        value(Value::Bool(true), terminated(tag("True"), word_end)),
        value(Value::Bool(false), terminated(tag("False"), word_end)),
        value(Value::Null, terminated(tag("None"), word_end)),
    ))(input)
}

fn number(input: &str) -> IResult<&str, Value> {
    map_res(
        recognize(tuple((
            opt(char('-')),
            digit1,
            opt(pair(char('.'), digit1)),
        ))),
        number_value,
    )(input)
}

fn number_value(text: &str) -> Result<Value, String> {
    if text.contains('.') {
        let parsed = text.parse::<f64>().map_err(|err| err.to_string())?;
        serde_json::Number::from_f64(parsed)
            .map(Value::Number)
            .ok_or_else(|| format!("non-finite float {text}"))
    } else {
        text.parse::<i64>()
            .map(Value::from)
            .map_err(|err| err.to_string())
    }
}

fn quoted(input: &str) -> IResult<&str, String> {
    let mut chars = input.char_indices();
    let quote = match chars.next() {
        Some((_, c)) if c == '\'' || c == '"' => c,
        _ => return Err(nom::Err::Error(NomError::new(input, ErrorKind::Char))),
    };
    let mut out = String::new();
    let mut escaped = false;
    for (idx, c) in chars {
        if escaped {
            out.push(match c {
                'n' => '\n',
                't' => '\t',
                'r' => '\r',
                '0' => '\0',
                other => other,
            });
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return Ok((&input[idx + c.len_utf8()..], out));
        } else {
            out.push(c);
        }
    }
    Err(nom::Err::Error(NomError::new(input, ErrorKind::Char)))
}

/// A container element: a literal that ends cleanly at a separator, or an opaque
/// expression recorded as `null`.
fn element(input: &str) -> IResult<&str, Value> {
    alt((
        terminated(literal, peek(preceded(multispace0, one_of(",}])")))),
        opaque,
    ))(input)
}

fn opaque(input: &str) -> IResult<&str, Value> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (idx, c) in input.char_indices() {
        if let Some(open) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == open {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' if depth > 0 => depth -= 1,
            ')' | ']' | '}' | ',' => return finish_opaque(input, idx),
            _ => {}
        }
    }
    Err(nom::Err::Error(NomError::new(input, ErrorKind::TakeUntil)))
}

fn finish_opaque(input: &str, end: usize) -> IResult<&str, Value> {
    if input[..end].trim().is_empty() {
        return Err(nom::Err::Error(NomError::new(input, ErrorKind::TakeUntil)));
    }
    Ok((&input[end..], Value::Null))
}

fn dict_key(input: &str) -> IResult<&str, String> {
    alt((
        quoted,
        map(recognize(pair(opt(char('-')), digit1)), String::from),
    ))(input)
}

fn dict_entry(input: &str) -> IResult<&str, (String, Value)> {
    let (input, key) = dict_key(input)?;
    let (input, _) = ws(char(':'))(input)?;
    let (input, entry) = element(input)?;
    Ok((input, (key, entry)))
}

fn sequence<'a, O, F>(
    open: char,
    close: char,
    item: F,
) -> impl FnMut(&'a str) -> IResult<&'a str, Vec<O>>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    let mut items = separated_list0(ws(char(',')), item);
    move |input: &'a str| {
        let (input, _) = char::<_, NomError<&'a str>>(open)(input)?;
        let (input, _) = multispace0::<_, NomError<&'a str>>(input)?;
        let (input, parsed) = items(input)?;
        let (input, _) = opt(ws(char(',')))(input)?;
        let (input, _) = multispace0::<_, NomError<&'a str>>(input)?;
        let (input, _) = char::<_, NomError<&'a str>>(close)(input)?;
        Ok((input, parsed))
    }
}

fn dict(input: &str) -> IResult<&str, Value> {
    let (rest, entries) = sequence('{', '}', dict_entry)(input)?;
    let object: Map<String, Value> = entries.into_iter().collect();
    Ok((rest, Value::Object(object)))
}

fn list(input: &str) -> IResult<&str, Value> {
    map(sequence('[', ']', element), Value::Array)(input)
}

fn tuple_literal(input: &str) -> IResult<&str, Value> {
    map(sequence('(', ')', element), Value::Array)(input)
}
