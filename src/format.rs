//! Format string parser.
//!
//! This module tokenizes a scanning format string into a stream of
//! *segments*: literal runs, whitespace skips, and replacement fields with
//! their specifiers.
//!
//! # Format Syntax Overview
//!
//! - `{}` — replacement field, auto-numbered
//! - `{3}` — replacement field with an explicit argument index
//! - `{:spec}` — replacement field with a specifier (see the readers for
//!   the per-type option grammars)
//! - `{{` and `}}` — a literal `{` / `}` in the input
//! - any other non-whitespace text — must match the input code unit for
//!   code unit
//! - a run of whitespace — matches zero or more whitespace code points in
//!   the input
//!
//! Argument indices are either all implicit or all explicit; mixing the two
//! styles is an error. Parsing is eager: the whole format string is
//! validated before any input is consumed, and errors carry the byte offset
//! of the offense.

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_while1},
    combinator::map,
};

use crate::error::{Error, Result};

/// One parsed piece of a format string.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Segment<'f> {
    /// Literal text that must match the input exactly.
    ///
    /// `{{` and `}}` in the format arrive here as one-byte `{` / `}` runs.
    Literal(&'f str),

    /// One or more whitespace code points in the format; matches zero or
    /// more whitespace code points in the input.
    Whitespace,

    /// A replacement field.
    Field(Field<'f>),
}

/// A replacement field: `{`, optional argument index, optional `:spec`, `}`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Field<'f> {
    /// Explicit argument index, if one was written.
    pub index: Option<usize>,

    /// The specifier slice between `:` and `}` (empty when absent).
    pub spec: &'f str,

    /// Byte offset of the specifier within the format string.
    ///
    /// Used to report `InvalidFormatString` positions from the readers.
    pub spec_offset: usize,
}

/// A fully parsed format string.
#[derive(Debug, Clone)]
pub struct FormatString<'f> {
    /// The segments, in format order.
    pub segments: Vec<Segment<'f>>,

    /// Number of replacement fields.
    pub field_count: usize,

    /// Whether the fields use explicit argument indices.
    pub explicit_indices: bool,
}

/// Parse a doubled brace into a one-byte literal.
fn brace_escape(input: &str) -> IResult<&str, Segment<'_>> {
    alt((
        map(tag("{{"), |s: &str| Segment::Literal(&s[..1])),
        map(tag("}}"), |s: &str| Segment::Literal(&s[..1])),
    ))(input)
}

/// Parse a run of whitespace code points.
fn whitespace_run(input: &str) -> IResult<&str, Segment<'_>> {
    map(take_while1(|c: char| c.is_whitespace()), |_| {
        Segment::Whitespace
    })(input)
}

/// Parse a run of literal text (no braces, no whitespace).
fn literal_run(input: &str) -> IResult<&str, Segment<'_>> {
    map(
        take_while1(|c: char| c != '{' && c != '}' && !c.is_whitespace()),
        Segment::Literal,
    )(input)
}

/// Find the end of a specifier: the first `}` outside a scanset.
///
/// Scansets (`[...]`) may contain `}` and `]` (the latter escaped as `\]`),
/// so the search tracks whether it is inside one and honors backslash
/// escapes there.
fn spec_end(spec: &str) -> Option<usize> {
    let bytes = spec.as_bytes();
    let mut in_set = false;
    let mut set_start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if in_set => i += 1, // skip the escaped unit
            b'[' if !in_set => {
                in_set = true;
                set_start = i;
            },
            // "[]...]" and "[^]...]": a ']' first in the set is a member
            b']' if in_set => {
                let body_start = if bytes.get(set_start + 1) == Some(&b'^') {
                    set_start + 2
                } else {
                    set_start + 1
                };
                if i != body_start {
                    in_set = false;
                }
            },
            b'}' if !in_set => return Some(i),
            _ => {},
        }
        i += 1;
    }
    None
}

/// Parse one replacement field starting at `{`.
///
/// Returns the field and the number of bytes consumed, or an error message
/// with an offset relative to the start of the field.
fn parse_field(input: &str) -> std::result::Result<(Field<'_>, usize), (usize, String)> {
    debug_assert!(input.starts_with('{'));
    let body = &input[1..];

    // Optional explicit argument index
    let digits = body
        .bytes()
        .take_while(|b| b.is_ascii_digit())
        .count();
    let index = if digits > 0 {
        let parsed = body[..digits]
            .parse::<usize>()
            .map_err(|_| (1, "argument index out of range".to_string()))?;
        Some(parsed)
    } else {
        None
    };

    let rest = &body[digits..];
    match rest.bytes().next() {
        Some(b'}') => Ok((
            Field {
                index,
                spec: "",
                spec_offset: 1 + digits,
            },
            1 + digits + 1,
        )),
        Some(b':') => {
            let spec_body = &rest[1..];
            let end = spec_end(spec_body)
                .ok_or_else(|| (0, "unterminated replacement field".to_string()))?;
            Ok((
                Field {
                    index,
                    spec: &spec_body[..end],
                    spec_offset: 1 + digits + 1,
                },
                1 + digits + 1 + end + 1,
            ))
        },
        Some(_) => Err((
            1 + digits,
            "expected ':' or '}' in replacement field".to_string(),
        )),
        None => Err((0, "unterminated replacement field".to_string())),
    }
}

/// Parse a format string into segments.
///
/// The empty format string is legal and produces no segments.
///
/// # Errors
///
/// `InvalidFormatString` with the byte offset of the offense for unmatched
/// braces, malformed fields, and mixed explicit/implicit argument indices.
pub fn parse_format(format: &str) -> Result<FormatString<'_>> {
    let mut segments = Vec::new();
    let mut rest = format;

    while !rest.is_empty() {
        let offset = format.len() - rest.len();

        if let Ok((remaining, segment)) = brace_escape(rest) {
            segments.push(segment);
            rest = remaining;
            continue;
        }

        match rest.as_bytes()[0] {
            b'{' => {
                let (mut field, consumed) =
                    parse_field(rest).map_err(|(at, message)| Error::format(offset + at, message))?;
                field.spec_offset += offset;
                segments.push(Segment::Field(field));
                rest = &rest[consumed..];
            },
            b'}' => {
                return Err(Error::format(offset, "unmatched '}' in format string"));
            },
            _ => {
                // Whitespace run or literal run; one of the two must match
                let (remaining, segment) = whitespace_run(rest)
                    .or_else(|_| literal_run(rest))
                    .map_err(|_: nom::Err<nom::error::Error<&str>>| {
                        Error::format(offset, "invalid format string")
                    })?;
                segments.push(segment);
                rest = remaining;
            },
        }
    }

    // Argument indices are all-implicit or all-explicit
    let mut field_count = 0;
    let mut explicit = 0;
    for segment in &segments {
        if let Segment::Field(field) = segment {
            field_count += 1;
            if field.index.is_some() {
                explicit += 1;
            }
        }
    }
    if explicit != 0 && explicit != field_count {
        return Err(Error::format(
            0,
            "cannot mix explicit and implicit argument indices",
        ));
    }

    Ok(FormatString {
        segments,
        field_count,
        explicit_indices: explicit != 0,
    })
}
