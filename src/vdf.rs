//! Parser for Valve's text KeyValues format, as found in Steam's `libraryfolders.vdf`.
//!
//! ```text
//! "libraryfolders"
//! {
//!     "0"
//!     {
//!         "path"  "C:\\Program Files (x86)\\Steam"
//!     }
//! }
//! ```

use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, multispace0},
    combinator::{cut, map},
    multi::many0,
    sequence::preceded,
    InputTake,
};

type Span<'s> = nom_locate::LocatedSpan<&'s str>;
type IResult<I, O, E = ParseError> = nom::IResult<I, O, E>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    String(String),
    Object(Object),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub location: Location,
    pub key: String,
    pub value: Value,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Object {
    pub entries: Vec<KeyValue>,
}

pub fn parse(content: &str) -> Result<Object, ParseError> {
    match document(Span::new(content)) {
        Ok((_, object)) => Ok(object),
        Err(err) => match err {
            nom::Err::Incomplete(_) => Err(ParseError::new(Default::default(), "unexpected EOF")),
            nom::Err::Error(e) | nom::Err::Failure(e) => Err(e),
        },
    }
}

// -------------------- Object -------------------- //

impl Object {
    /// First value under `key`. Keys are compared case-insensitively, like Steam does.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|kv| kv.key.eq_ignore_ascii_case(key))
            .map(|kv| &kv.value)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            Value::String(s) => Some(s),
            Value::Object(_) => None,
        }
    }

    pub fn get_object(&self, key: &str) -> Option<&Object> {
        match self.get(key)? {
            Value::Object(o) => Some(o),
            Value::String(_) => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|kv| (kv.key.as_str(), &kv.value))
    }
}

// -------------------- ParseError -------------------- //

#[derive(Debug)]
pub struct ParseError {
    location: Location,
    message: String,
}

impl ParseError {
    fn new(location: Location, expected: impl Into<String>) -> Self {
        Self {
            location,
            message: expected.into(),
        }
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl<'s> nom::error::ParseError<Span<'s>> for ParseError {
    fn from_error_kind(input: Span<'s>, kind: nom::error::ErrorKind) -> Self {
        Self::new(location_from_span(input), format!("error kind: {kind:?}"))
    }

    fn append(_input: Span<'s>, _kind: nom::error::ErrorKind, other: Self) -> Self {
        other
    }

    fn or(self, other: Self) -> Self {
        other
    }

    fn from_char(input: Span<'s>, c: char) -> Self {
        Self::new(location_from_span(input), format!("expected character: {c}"))
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "parse error at {}: {}", self.location, self.message)
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Location { line, column } = self;
        write!(f, "line {line} column {column}")
    }
}

// -------------------- Grammar -------------------- //

fn is_bare_char(c: char) -> bool {
    !c.is_whitespace() && c != '"' && c != '{' && c != '}'
}

/// Whitespace and `//` comments.
fn ws(i: Span) -> IResult<Span, ()> {
    let mut i = i;
    loop {
        let (rest, _) = multispace0(i)?;
        if rest.fragment().starts_with("//") {
            let (rest, _) = take_while(|c: char| c != '\n')(rest)?;
            i = rest;
        } else {
            return Ok((rest, ()));
        }
    }
}

fn quoted(i: Span) -> IResult<Span, String> {
    let location = location_from_span(i);
    let (i, _) = char('"')(i)?;

    let mut value = String::new();
    let mut escaped = false;
    let mut end = None;
    for (offset, c) in i.fragment().char_indices() {
        if escaped {
            value.push(match c {
                'n' => '\n',
                't' => '\t',
                other => other,
            });
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            end = Some(offset);
            break;
        } else {
            value.push(c);
        }
    }

    match end {
        Some(offset) => {
            let (rest, _) = i.take_split(offset + 1);
            Ok((rest, value))
        }
        None => Err(nom::Err::Failure(ParseError::new(
            location,
            "unterminated string",
        ))),
    }
}

fn bare(i: Span) -> IResult<Span, String> {
    map(take_while1(is_bare_char), |s: Span| s.fragment().to_string())(i)
}

fn string(i: Span) -> IResult<Span, String> {
    alt((quoted, bare))(i)
}

fn value(i: Span) -> IResult<Span, Value> {
    alt((map(object, Value::Object), map(string, Value::String)))(i)
}

fn keyvalue(i: Span) -> IResult<Span, KeyValue> {
    let location = location_from_span(i);
    let (i, key) = string(i)?;
    let (i, _) = ws(i)?;
    let (i, value) = cut(value)(i)?;
    Ok((
        i,
        KeyValue {
            location,
            key,
            value,
        },
    ))
}

fn entries(i: Span) -> IResult<Span, Vec<KeyValue>> {
    many0(preceded(ws, keyvalue))(i)
}

fn object(i: Span) -> IResult<Span, Object> {
    let (i, _) = char('{')(i)?;
    let (i, entries) = entries(i)?;
    let (i, _) = ws(i)?;
    let (i, _) = cut(char('}'))(i)?;
    Ok((i, Object { entries }))
}

fn document(i: Span) -> IResult<Span, Object> {
    let (i, entries) = entries(i)?;
    let (i, _) = ws(i)?;
    if !i.fragment().is_empty() {
        return Err(nom::Err::Failure(ParseError::new(
            location_from_span(i),
            "unexpected input",
        )));
    }
    Ok((i, Object { entries }))
}

fn location_from_span(span: Span) -> Location {
    Location::new(span.location_line(), span.get_utf8_column() as u32)
}
