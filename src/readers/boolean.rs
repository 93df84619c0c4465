//! Boolean reader.
//!
//! # Specifier Options
//!
//! - `a` — alphabetic form only (`true`/`false` or the localized names)
//! - `n` — numeric form only (`0`/`1`)
//! - `l` — localized boolean names (requires the alphabetic form)
//!
//! With neither `a` nor `n`, both forms are accepted: the alphabetic names
//! are tried first, then one numeric code unit; everything speculatively
//! consumed by a failed attempt is put back.

use super::{read_word, skip_whitespace, ScanContext};
use crate::error::{Error, Result};

/// Parsed state of one boolean field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoolReader {
    /// Accept the alphabetic form.
    pub allow_alpha: bool,
    /// Accept the numeric form.
    pub allow_numeric: bool,
    /// Compare against the locale's boolean names.
    pub localized: bool,
    /// Maximum number of code points to consume.
    pub width: Option<usize>,
}

impl BoolReader {
    /// Parse a boolean specifier.
    pub fn parse(spec: &str, spec_offset: usize) -> Result<Self> {
        let (common, rest, rest_offset) = super::SpecCommon::parse(spec, spec_offset)?;
        let mut alpha = false;
        let mut numeric = false;
        let mut localized = common.localized;

        for (idx, ch) in rest.char_indices() {
            match ch {
                'a' => alpha = true,
                'n' => numeric = true,
                'l' | 'L' => localized = true,
                _ => {
                    return Err(Error::format(
                        rest_offset + idx,
                        format!("unknown bool specifier option '{}'", ch),
                    ));
                },
            }
        }

        // neither flag: both forms stay enabled
        let (allow_alpha, allow_numeric) = if alpha || numeric {
            (alpha, numeric)
        } else {
            (true, true)
        };

        if localized && !allow_alpha {
            return Err(Error::format(
                spec_offset,
                "localized bool names require the alphabetic form",
            ));
        }

        Ok(BoolReader {
            allow_alpha,
            allow_numeric,
            localized,
            width: common.width,
        })
    }

    /// Scan one boolean out of the source range.
    pub(crate) fn scan(&self, out: &mut bool, ctx: &mut ScanContext<'_, '_>) -> Result<()> {
        skip_whitespace(ctx)?;
        if let Err(err) = ctx.range.peek() {
            return Err(err);
        }

        if self.allow_alpha {
            let (truename, falsename) = if self.localized {
                (
                    ctx.locale.truename().to_string(),
                    ctx.locale.falsename().to_string(),
                )
            } else {
                ("true".to_string(), "false".to_string())
            };

            // A maximal non-space run bounded by the longest name
            let limit = truename.chars().count().max(falsename.chars().count());
            let limit = match self.width {
                Some(width) => width.min(limit),
                None => limit,
            };
            let word = read_word(ctx, Some(limit))?;

            let matched = if word.starts_with(&falsename) {
                Some((false, falsename.len()))
            } else if word.starts_with(&truename) {
                Some((true, truename.len()))
            } else {
                None
            };
            match matched {
                Some((value, name_len)) => {
                    ctx.range.putback(word.len() - name_len)?;
                    *out = value;
                    return Ok(());
                },
                None => {
                    ctx.range.putback(word.len())?;
                },
            }
        }

        if self.allow_numeric {
            let unit = ctx.range.read_code_unit(false)?;
            match unit {
                b'0' => {
                    *out = false;
                    return Ok(());
                },
                b'1' => {
                    *out = true;
                    return Ok(());
                },
                _ => ctx.range.putback(1)?,
            }
        }

        Err(Error::InvalidScannedValue(
            "input matched neither boolean form".to_string(),
        ))
    }
}
