//! Value readers.
//!
//! One reader per target type. Each reader is a plain struct of flags and
//! numbers built by parsing its slice of the format specifier; its `scan`
//! function consumes code units from the source range and writes the value
//! through the caller's reference.
//!
//! Readers share one contract: on a recoverable failure everything
//! speculatively consumed is put back, so the range sits where the field
//! started. The one exception is float overflow, which stores a signed
//! infinity and keeps its token consumed. Width limits are budgets of
//! *code points*, not code units.
//!
//! This module also holds the read helpers the readers are built from:
//! code-point reads with putback, whitespace skipping, and bounded
//! read-while loops with a zero-copy fast path on contiguous sources.

pub mod boolean;
pub mod character;
pub mod float;
pub mod int;
pub mod string;

use std::borrow::Cow;

use crate::error::{Error, Result};
use crate::locale::LocaleFacet;
use crate::range::SourceRange;
use crate::unicode::{decode_utf8, encoded_len_utf8};

/// Inline capacity for scratch buffers used when copying non-contiguous
/// input.
pub(crate) const SCRATCH_CAPACITY: usize = 64;

/// Everything a reader needs to consume input: the source range and the
/// locale facet for the current call.
pub struct ScanContext<'r, 's> {
    pub(crate) range: &'r mut dyn SourceRange<'s>,
    pub(crate) locale: &'r LocaleFacet,
}

impl<'r, 's> ScanContext<'r, 's> {
    /// Build a context over a range and a locale facet.
    pub fn new(range: &'r mut dyn SourceRange<'s>, locale: &'r LocaleFacet) -> Self {
        Self { range, locale }
    }

    /// The source range.
    pub fn range(&mut self) -> &mut dyn SourceRange<'s> {
        &mut *self.range
    }

    /// The locale facet.
    pub fn locale(&self) -> &LocaleFacet {
        self.locale
    }

    /// Whitespace test with the classic ASCII fast path inlined.
    #[inline]
    pub(crate) fn is_space(&self, ch: char) -> bool {
        if self.locale.is_default() {
            ch == ' ' || ('\t'..='\r').contains(&ch)
        } else {
            self.locale.is_space(ch)
        }
    }
}

/// Read one code point, advancing past its code units.
///
/// On `InvalidEncoding` nothing remains consumed. At the end of input
/// returns `EndOfRange` without consuming.
pub(crate) fn read_code_point(range: &mut dyn SourceRange<'_>) -> Result<char> {
    let lead = range.peek()?;
    let len = encoded_len_utf8(lead)?;
    let mut buf = [0u8; 4];
    buf[0] = lead;
    range.advance(1);
    let mut taken = 1;
    while taken < len {
        match range.peek() {
            Ok(unit) => {
                buf[taken] = unit;
                range.advance(1);
                taken += 1;
            },
            Err(Error::EndOfRange) => {
                range.putback(taken)?;
                return Err(Error::InvalidEncoding(
                    "truncated code-point sequence at end of input".to_string(),
                ));
            },
            Err(other) => return Err(other),
        }
    }
    match decode_utf8(&buf[..len]) {
        Ok((ch, _)) => Ok(ch),
        Err(err) => {
            range.putback(len)?;
            Err(err)
        },
    }
}

/// Read one code point and put it straight back.
pub(crate) fn peek_code_point(range: &mut dyn SourceRange<'_>) -> Result<char> {
    let ch = read_code_point(range)?;
    range.putback(ch.len_utf8())?;
    Ok(ch)
}

/// Skip zero or more whitespace code points. Returns the number of code
/// units consumed; the end of input is not an error.
pub(crate) fn skip_whitespace(ctx: &mut ScanContext<'_, '_>) -> Result<usize> {
    let mut consumed = 0;
    loop {
        let ch = match peek_code_point(ctx.range) {
            Ok(ch) => ch,
            Err(Error::EndOfRange) => break,
            Err(err) => return Err(err),
        };
        if !ctx.is_space(ch) {
            break;
        }
        ctx.range.advance(ch.len_utf8());
        consumed += ch.len_utf8();
    }
    Ok(consumed)
}

/// Consume code points while `pred` holds, bounded by a code-point budget.
///
/// Contiguous sources get a zero-copy borrow of the accepted prefix;
/// forward sources copy into a scratch string. Decoding errors put back the
/// unaccepted remainder and propagate.
pub(crate) fn read_while<'s>(
    range: &mut dyn SourceRange<'s>,
    width: Option<usize>,
    mut pred: impl FnMut(char) -> bool,
) -> Result<Cow<'s, str>> {
    let budget = width.unwrap_or(usize::MAX);

    if range.is_contiguous() {
        let window = range.read_all_zero_copy();
        let mut end = 0;
        let mut points = 0;
        while end < window.len() && points < budget {
            let (ch, len) = match decode_utf8(&window[end..]) {
                Ok(decoded) => decoded,
                Err(err) => {
                    range.putback(window.len() - end)?;
                    return Err(err);
                },
            };
            if !pred(ch) {
                break;
            }
            end += len;
            points += 1;
        }
        range.putback(window.len() - end)?;
        let accepted = std::str::from_utf8(&window[..end]).map_err(|_| {
            Error::UnrecoverableInternalError("validated window is not UTF-8".to_string())
        })?;
        Ok(Cow::Borrowed(accepted))
    } else {
        let mut out = String::with_capacity(SCRATCH_CAPACITY);
        let mut points = 0;
        while points < budget {
            let ch = match read_code_point(range) {
                Ok(ch) => ch,
                Err(Error::EndOfRange) => break,
                Err(err) => return Err(err),
            };
            if !pred(ch) {
                range.putback(ch.len_utf8())?;
                break;
            }
            out.push(ch);
            points += 1;
        }
        Ok(Cow::Owned(out))
    }
}

/// Read a whitespace-delimited word, bounded by a code-point budget.
pub(crate) fn read_word<'s>(
    ctx: &mut ScanContext<'_, 's>,
    width: Option<usize>,
) -> Result<Cow<'s, str>> {
    let locale = ctx.locale;
    let classic = locale.is_default();
    read_while(ctx.range, width, |ch| {
        if classic {
            !(ch == ' ' || ('\t'..='\r').contains(&ch))
        } else {
            !locale.is_space(ch)
        }
    })
}

/// The common specifier prefix: `[fill-and-align][width][L]`.
///
/// Alignment is accepted for symmetry with the write direction and has no
/// effect on scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpecCommon {
    /// Fill code point, when an alignment was written.
    pub fill: Option<char>,
    /// `<`, `>` or `^`.
    pub align: Option<char>,
    /// Maximum number of code points the field may consume.
    pub width: Option<usize>,
    /// `L`: localized parse path requested.
    pub localized: bool,
}

impl SpecCommon {
    /// Parse the common prefix of `spec`.
    ///
    /// Returns the parsed options, the remaining type-options slice, and
    /// the byte offset of that slice within the format string.
    pub fn parse(spec: &str, spec_offset: usize) -> Result<(Self, &str, usize)> {
        let mut common = SpecCommon::default();
        let mut rest = spec;

        // fill-and-align: an align char, or any code point (except braces)
        // followed by an align char
        let mut chars = rest.chars();
        let first = chars.next();
        let second = chars.next();
        match (first, second) {
            (Some(fill), Some(align)) if matches!(align, '<' | '>' | '^') => {
                if fill == '{' || fill == '}' {
                    return Err(Error::format(
                        spec_offset,
                        "fill character may not be a brace",
                    ));
                }
                common.fill = Some(fill);
                common.align = Some(align);
                rest = &rest[fill.len_utf8() + 1..];
            },
            (Some(align), _) if matches!(align, '<' | '>' | '^') => {
                common.align = Some(align);
                rest = &rest[1..];
            },
            _ => {},
        }

        // width
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits > 0 {
            let width = rest[..digits].parse::<usize>().map_err(|_| {
                Error::format(spec_offset + spec.len() - rest.len(), "width out of range")
            })?;
            common.width = Some(width);
            rest = &rest[digits..];
        }

        // L: localized
        if let Some(stripped) = rest.strip_prefix('L') {
            common.localized = true;
            rest = stripped;
        }

        let rest_offset = spec_offset + (spec.len() - rest.len());
        Ok((common, rest, rest_offset))
    }
}
