//! Integer reader.
//!
//! Width-bounded consumption of an optional sign, an optional base prefix,
//! then base digits with optional thousands separators.
//!
//! # Specifier Options
//!
//! - `d` — decimal
//! - `x` / `X` — hexadecimal, accepts a `0x` prefix
//! - `o` — octal, accepts a `0o` prefix
//! - `b` — binary, accepts a `0b` prefix
//! - `B<n>` — explicit base, n in 2..=36
//! - `i` — detect the base from the prefix (signed targets)
//! - `u` — detect the base, reject a sign (unsigned targets)
//! - `'` — accept thousands separators between digits
//! - `L` — localized digits (implies base 10)
//! - `n` — localized thousands separator and parse path
//! - `c` — store the value of one code unit
//!
//! Base modifiers are mutually exclusive. With no base option the reader
//! detects: `0b`/`0B` is binary, `0x`/`0X` is hexadecimal, `0o`/`0O` or a
//! leading `0` followed by a digit is octal, anything else is decimal.
//!
//! Overflow uses Horner accumulation against a precomputed `limit / base`
//! cutoff; a digit that would push past the target's range reports
//! `ValueOutOfRange` with the range rewound to the start of the field and
//! the target untouched.

use super::{read_word, skip_whitespace, ScanContext};
use crate::error::{Error, Result};

/// Target types the integer reader can write.
pub(crate) trait ScanInteger: Copy {
    /// Is the target signed?
    const SIGNED: bool;
    /// Magnitude of the largest positive value.
    const MAX_MAG: u128;
    /// Magnitude of the most negative value (0 for unsigned targets).
    const MIN_MAG: u128;
    /// Name for error messages.
    const NAME: &'static str;

    /// Build the value from a magnitude and a sign. The magnitude is within
    /// range for the sign.
    fn from_magnitude(magnitude: u128, negative: bool) -> Self;

    /// Range-checked conversion from the localized parse path.
    fn from_i64(value: i64) -> Option<Self>;
}

macro_rules! impl_scan_integer_signed {
    ($($ty:ty),* $(,)?) => {$(
        impl ScanInteger for $ty {
            const SIGNED: bool = true;
            const MAX_MAG: u128 = <$ty>::MAX as u128;
            const MIN_MAG: u128 = (<$ty>::MAX as u128) + 1;
            const NAME: &'static str = stringify!($ty);

            fn from_magnitude(magnitude: u128, negative: bool) -> Self {
                if negative {
                    (-(magnitude as i128)) as $ty
                } else {
                    magnitude as $ty
                }
            }

            fn from_i64(value: i64) -> Option<Self> {
                <$ty>::try_from(value).ok()
            }
        }
    )*};
}

macro_rules! impl_scan_integer_unsigned {
    ($($ty:ty),* $(,)?) => {$(
        impl ScanInteger for $ty {
            const SIGNED: bool = false;
            const MAX_MAG: u128 = <$ty>::MAX as u128;
            const MIN_MAG: u128 = 0;
            const NAME: &'static str = stringify!($ty);

            fn from_magnitude(magnitude: u128, _negative: bool) -> Self {
                magnitude as $ty
            }

            fn from_i64(value: i64) -> Option<Self> {
                <$ty>::try_from(value).ok()
            }
        }
    )*};
}

impl_scan_integer_signed!(i8, i16, i32, i64, isize);
impl_scan_integer_unsigned!(u8, u16, u32, u64, usize);

/// Parsed state of one integer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntReader {
    /// Base, 0 meaning "detect from prefix".
    pub base: u32,
    /// `'`: accept thousands separators between digits.
    pub thousands: bool,
    /// `L`: localized digits.
    pub localized_digits: bool,
    /// `n`: localized thousands separator and parse path.
    pub localized_separator: bool,
    /// `u` was written: the argument must be unsigned.
    pub unsigned_only: bool,
    /// `i` was written: the argument must be signed.
    pub signed_only: bool,
    /// `c`: store one code unit's value.
    pub char_mode: bool,
    /// Maximum number of code points to consume.
    pub width: Option<usize>,
    /// Byte offset of the specifier, for late format errors.
    pub spec_offset: usize,
}

impl Default for IntReader {
    fn default() -> Self {
        Self {
            base: 0,
            thousands: false,
            localized_digits: false,
            localized_separator: false,
            unsigned_only: false,
            signed_only: false,
            char_mode: false,
            width: None,
            spec_offset: 0,
        }
    }
}

impl IntReader {
    /// Parse an integer specifier.
    pub fn parse(spec: &str, spec_offset: usize) -> Result<Self> {
        let (common, rest, rest_offset) = super::SpecCommon::parse(spec, spec_offset)?;
        let mut reader = IntReader {
            localized_digits: common.localized,
            width: common.width,
            spec_offset,
            ..IntReader::default()
        };

        let mut base_set = false;
        let mut set_base = |reader: &mut IntReader, base: u32, at: usize| -> Result<()> {
            if base_set {
                return Err(Error::format(at, "base modifiers are mutually exclusive"));
            }
            base_set = true;
            reader.base = base;
            Ok(())
        };

        let mut chars = rest.char_indices().peekable();
        while let Some((idx, ch)) = chars.next() {
            let at = rest_offset + idx;
            match ch {
                'd' => set_base(&mut reader, 10, at)?,
                'x' | 'X' => set_base(&mut reader, 16, at)?,
                'o' => set_base(&mut reader, 8, at)?,
                'b' => set_base(&mut reader, 2, at)?,
                'B' => {
                    let mut base = 0u32;
                    let mut digits = 0;
                    while let Some(&(_, digit_ch)) = chars.peek() {
                        let Some(digit) = digit_ch.to_digit(10) else {
                            break;
                        };
                        base = base * 10 + digit;
                        digits += 1;
                        chars.next();
                        if digits == 2 {
                            break;
                        }
                    }
                    if digits == 0 || !(2..=36).contains(&base) {
                        return Err(Error::format(
                            at,
                            "base after 'B' must be between 2 and 36",
                        ));
                    }
                    set_base(&mut reader, base, at)?;
                },
                'i' => {
                    reader.signed_only = true;
                    set_base(&mut reader, 0, at)?;
                },
                'u' => {
                    reader.unsigned_only = true;
                    set_base(&mut reader, 0, at)?;
                },
                '\'' => reader.thousands = true,
                'L' => reader.localized_digits = true,
                'n' => reader.localized_separator = true,
                'c' => reader.char_mode = true,
                _ => {
                    return Err(Error::format(
                        at,
                        format!("unknown integer specifier option '{}'", ch),
                    ));
                },
            }
        }

        if (reader.localized_digits || reader.localized_separator)
            && reader.base != 0
            && reader.base != 10
        {
            return Err(Error::format(
                spec_offset,
                "localized integers can only be scanned in base 10",
            ));
        }
        if reader.char_mode
            && (base_set || reader.thousands || reader.localized_digits || reader.localized_separator)
        {
            return Err(Error::format(
                spec_offset,
                "'c' cannot be combined with other integer options",
            ));
        }

        Ok(reader)
    }

    /// Scan one integer out of the source range.
    pub(crate) fn scan<T: ScanInteger>(
        &self,
        out: &mut T,
        ctx: &mut ScanContext<'_, '_>,
    ) -> Result<()> {
        if self.unsigned_only && T::SIGNED {
            return Err(Error::format(
                self.spec_offset,
                format!("'u' requires an unsigned argument, got {}", T::NAME),
            ));
        }
        if self.signed_only && !T::SIGNED {
            return Err(Error::format(
                self.spec_offset,
                format!("'i' requires a signed argument, got {}", T::NAME),
            ));
        }

        if self.char_mode {
            let unit = ctx.range.read_code_unit(false)?;
            if (unit as u128) > T::MAX_MAG {
                ctx.range.putback(1)?;
                return Err(Error::ValueOutOfRange(format!(
                    "code unit 0x{:02X} does not fit in {}",
                    unit,
                    T::NAME
                )));
            }
            *out = T::from_magnitude(unit as u128, false);
            return Ok(());
        }

        skip_whitespace(ctx)?;
        let word = read_word(ctx, self.width)?;
        if word.is_empty() {
            return match ctx.range.peek() {
                Err(Error::EndOfRange) => Err(Error::EndOfRange),
                Err(other) => Err(other),
                Ok(_) => Err(Error::InvalidScannedValue(
                    "expected an integer".to_string(),
                )),
            };
        }

        let parsed = if self.localized_digits || self.localized_separator {
            ctx.locale
                .read_num_i64(&word, 10)
                .and_then(|(value, consumed)| {
                    let value = T::from_i64(value).ok_or_else(|| {
                        Error::ValueOutOfRange(format!("value does not fit in {}", T::NAME))
                    })?;
                    Ok((value, consumed))
                })
        } else {
            self.parse_classic::<T>(&word, ctx.locale.thousands_separator())
        };

        match parsed {
            Ok((value, consumed)) => {
                ctx.range.putback(word.len() - consumed)?;
                *out = value;
                Ok(())
            },
            Err(err) => {
                // Recoverability discipline: rewind the whole word so the
                // driver sees nothing consumed and the target is untouched
                ctx.range.putback(word.len())?;
                Err(err)
            },
        }
    }

    /// Classic parse of the word's prefix. Returns the value and the number
    /// of bytes of `word` consumed.
    fn parse_classic<T: ScanInteger>(&self, word: &str, thsep: char) -> Result<(T, usize)> {
        let bytes = word.as_bytes();
        let mut i = 0;
        let mut negative = false;

        match bytes.first() {
            Some(b'+') => i = 1,
            Some(b'-') => {
                if !T::SIGNED {
                    return Err(Error::ValueOutOfRange(format!(
                        "unexpected sign '-' when scanning {}",
                        T::NAME
                    )));
                }
                negative = true;
                i = 1;
            },
            _ => {},
        }
        if i >= bytes.len() {
            // A sign with no digit after it matches no value
            return Err(Error::InvalidScannedValue(
                "expected digits after sign".to_string(),
            ));
        }

        let mut base = self.base;
        let after_sign = i;
        if bytes[i] == b'0' {
            let prefix_base = match bytes.get(i + 1) {
                Some(b'x') | Some(b'X') => 16,
                Some(b'b') | Some(b'B') => 2,
                Some(b'o') | Some(b'O') => 8,
                _ => 0,
            };
            if prefix_base != 0 && (base == 0 || base == prefix_base) {
                base = prefix_base;
                i += 2;
            } else if base == 0 {
                // A leading zero followed by a digit is octal
                base = match bytes.get(i + 1) {
                    Some(b) if b.is_ascii_digit() => 8,
                    _ => 10,
                };
            }
        }
        if base == 0 {
            base = 10;
        }

        let limit = if negative { T::MIN_MAG } else { T::MAX_MAG };
        let cutoff = limit / base as u128;
        let cutlim = limit % base as u128;

        let mut value: u128 = 0;
        let mut digit_count = 0usize;
        for (idx, ch) in word[i..].char_indices() {
            if let Some(digit) = ch.to_digit(base) {
                let digit = digit as u128;
                if value > cutoff || (value == cutoff && digit > cutlim) {
                    return Err(Error::ValueOutOfRange(format!(
                        "integer does not fit in {}",
                        T::NAME
                    )));
                }
                value = value * base as u128 + digit;
                digit_count += 1;
            } else if self.thousands && ch == thsep && digit_count > 0 {
                // Separators are skipped without contributing to the value
            } else {
                i += idx;
                if digit_count == 0 {
                    // Nothing but a prefix: "0x" backs off to the bare zero
                    if i > after_sign {
                        return Ok((T::from_magnitude(0, false), after_sign + 1));
                    }
                    return Err(Error::InvalidScannedValue(
                        "expected an integer".to_string(),
                    ));
                }
                return Ok((T::from_magnitude(value, negative), i));
            }
        }

        if digit_count == 0 {
            // Only a consumed base prefix can get here: back off to the zero
            return Ok((T::from_magnitude(0, false), after_sign + 1));
        }
        Ok((T::from_magnitude(value, negative), word.len()))
    }
}
