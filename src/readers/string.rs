//! String and string-view readers.
//!
//! # Specifier Options
//!
//! - `s` (or nothing) — skip leading whitespace, then read up to the next
//!   whitespace code point; an empty result is an error
//! - `c` — read exactly `width` code points (width required, zero legal),
//!   with no whitespace trimming
//! - `[...]` — read the longest run of code points accepted by the scanset;
//!   zero accepted code points is an error
//! - `L` — stop the word at the locale's whitespace classification instead
//!   of the ASCII fast path, so the value may include non-ASCII code points
//!   by code-point rules
//!
//! The string-view variant returns a zero-copy borrow of the source and is
//! only available on contiguous ranges; elsewhere it reports
//! `InvalidOperation`.

use super::{read_while, skip_whitespace, ScanContext};
use crate::error::{Error, Result};
use crate::scanset::Scanset;

/// How the field consumes input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringMode {
    /// Whitespace-delimited word.
    Word,
    /// Exactly `width` code points.
    Exact,
    /// Longest run accepted by the scanset.
    Set(Scanset),
}

/// Parsed state of one string field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringReader {
    /// Consumption mode.
    pub mode: StringMode,
    /// Maximum (or for `c`, exact) number of code points.
    pub width: Option<usize>,
    /// `L`: word boundaries follow the locale's classification.
    pub localized: bool,
}

impl StringReader {
    /// Parse a string specifier.
    pub fn parse(spec: &str, spec_offset: usize) -> Result<Self> {
        let (common, rest, rest_offset) = super::SpecCommon::parse(spec, spec_offset)?;

        let mode = match rest.as_bytes().first() {
            None => StringMode::Word,
            Some(b's') if rest.len() == 1 => StringMode::Word,
            Some(b'c') if rest.len() == 1 => {
                if common.width.is_none() {
                    return Err(Error::format(
                        rest_offset,
                        "'c' requires an explicit width",
                    ));
                }
                StringMode::Exact
            },
            Some(b'[') => {
                let (set, consumed) = Scanset::compile(rest, rest_offset)?;
                if consumed != rest.len() {
                    return Err(Error::format(
                        rest_offset + consumed,
                        "unexpected options after scanset",
                    ));
                }
                StringMode::Set(set)
            },
            _ => {
                return Err(Error::format(
                    rest_offset,
                    format!("unknown string specifier options '{}'", rest),
                ));
            },
        };

        Ok(StringReader {
            mode,
            width: common.width,
            localized: common.localized,
        })
    }

    /// Scan into an owned string.
    pub(crate) fn scan(&self, out: &mut String, ctx: &mut ScanContext<'_, '_>) -> Result<()> {
        let word = self.consume(ctx)?;
        *out = word;
        Ok(())
    }

    /// Scan a zero-copy view into the source.
    pub(crate) fn scan_view<'s>(
        &self,
        out: &mut &'s str,
        ctx: &mut ScanContext<'_, 's>,
    ) -> Result<()> {
        if !ctx.range.is_contiguous() {
            return Err(Error::InvalidOperation(
                "cannot read a string view from a non-contiguous range".to_string(),
            ));
        }
        let view = match self.consume_cow(ctx)? {
            std::borrow::Cow::Borrowed(view) => view,
            std::borrow::Cow::Owned(_) => {
                return Err(Error::UnrecoverableInternalError(
                    "contiguous range produced an owned read".to_string(),
                ));
            },
        };
        *out = view;
        Ok(())
    }

    fn consume(&self, ctx: &mut ScanContext<'_, '_>) -> Result<String> {
        Ok(self.consume_cow(ctx)?.into_owned())
    }

    fn consume_cow<'s>(&self, ctx: &mut ScanContext<'_, 's>) -> Result<std::borrow::Cow<'s, str>> {
        match &self.mode {
            StringMode::Word => {
                skip_whitespace(ctx)?;
                // Only `L` consults the locale's classification for the
                // word boundary; without it the ASCII fast path decides
                let word = if self.localized {
                    let locale = ctx.locale;
                    read_while(ctx.range, self.width, |ch| !locale.is_space(ch))?
                } else {
                    read_while(ctx.range, self.width, |ch| {
                        !(ch == ' ' || ('\t'..='\r').contains(&ch))
                    })?
                };
                if word.is_empty() {
                    return match ctx.range.peek() {
                        Err(err) => Err(err),
                        Ok(_) => Err(Error::InvalidScannedValue(
                            "empty string parsed".to_string(),
                        )),
                    };
                }
                Ok(word)
            },
            StringMode::Exact => {
                // parse() guarantees a width
                let count = self.width.unwrap_or(0);
                let got = read_while(ctx.range, Some(count), |_| true)?;
                if got.chars().count() < count {
                    ctx.range.putback(got.len())?;
                    return Err(Error::EndOfRange);
                }
                Ok(got)
            },
            StringMode::Set(set) => {
                if let Err(err) = ctx.range.peek() {
                    return Err(err);
                }
                let locale = ctx.locale;
                let got = read_while(ctx.range, self.width, |ch| set.contains(ch, locale))?;
                if got.is_empty() {
                    return Err(Error::InvalidScannedValue(
                        "scanset matched no code points".to_string(),
                    ));
                }
                Ok(got)
            },
        }
    }
}
