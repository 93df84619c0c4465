//! Character and code-point readers.
//!
//! The code-point reader decodes exactly one code point (1-4 UTF-8 code
//! units) into a `char` target, regardless of whitespace. Single code units
//! are read into integer targets through the integer reader's `c` option.
//!
//! # Specifier Options
//!
//! - `c` / `U` — optional, explicit spelling of the default behavior

use super::{read_code_point, ScanContext};
use crate::error::{Error, Result};

/// Parsed state of one code-point field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CharReader;

impl CharReader {
    /// Parse a code-point specifier.
    pub fn parse(spec: &str, spec_offset: usize) -> Result<Self> {
        let (_, rest, rest_offset) = super::SpecCommon::parse(spec, spec_offset)?;
        match rest {
            "" | "c" | "U" => Ok(CharReader),
            _ => Err(Error::format(
                rest_offset,
                format!("unknown code-point specifier options '{}'", rest),
            )),
        }
    }

    /// Scan exactly one code point out of the source range.
    ///
    /// Whitespace is not skipped: a leading space is a perfectly good code
    /// point.
    pub(crate) fn scan(&self, out: &mut char, ctx: &mut ScanContext<'_, '_>) -> Result<()> {
        *out = read_code_point(ctx.range)?;
        Ok(())
    }
}
