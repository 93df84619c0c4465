//! Floating-point reader.
//!
//! Accepts, with an optional leading sign: decimal notation with or without
//! an exponent, hexadecimal notation with a mandatory `p` exponent,
//! `inf`/`infinity`, and `nan` with an optional `(payload)`, all
//! case-insensitive where letters appear.
//!
//! # Specifier Options
//!
//! - `f` / `F` — fixed notation (no exponent)
//! - `e` / `E` — scientific notation (exponent required)
//! - `g` / `G` — general notation (exponent optional)
//! - `a` / `A` — hexadecimal notation (`p` exponent required)
//! - `L` — localized parse path
//!
//! Options combine; with none written every notation is accepted. Writing
//! any of `e`/`f`/`g` without `a` disables hex floats.
//!
//! The classic decimal path hands the matched token to the standard
//! library's correctly-rounded parser; hex floats go through a dedicated
//! round-to-nearest-even binary decoder. Zero parses to ±0 with the sign of
//! the input, subnormals decode to the nearest representable value, and
//! underflow to zero is not an error. Overflow stores a signed infinity and
//! reports `ValueOutOfRange`.

use super::{read_word, skip_whitespace, ScanContext};
use crate::error::{Error, Result};

/// Target types the float reader can write.
pub(crate) trait ScanFloat: Copy {
    /// Name for error messages.
    const NAME: &'static str;
    /// Significand precision in bits, including the implicit bit.
    const MANT_BITS: i32;
    /// Largest base-2 exponent of a finite value's most significant bit.
    const MAX_MSB_EXP: i32;
    /// Base-2 exponent of the smallest normal value.
    const MIN_MSB_EXP: i32;

    /// Correctly-rounded decimal parse of a token this reader matched.
    fn parse_decimal(text: &str) -> Option<Self>;
    /// Narrowing conversion for values already rounded to this precision.
    fn from_f64_exact(value: f64) -> Self;
    /// Signed infinity.
    fn infinity(negative: bool) -> Self;
    /// Quiet NaN with the requested sign.
    fn nan(negative: bool) -> Self;
    /// Signed zero.
    fn zero(negative: bool) -> Self;
    /// Is the value infinite?
    fn is_infinite(self) -> bool;
}

impl ScanFloat for f64 {
    const NAME: &'static str = "f64";
    const MANT_BITS: i32 = 53;
    const MAX_MSB_EXP: i32 = 1023;
    const MIN_MSB_EXP: i32 = -1022;

    fn parse_decimal(text: &str) -> Option<Self> {
        text.parse().ok()
    }

    fn from_f64_exact(value: f64) -> Self {
        value
    }

    fn infinity(negative: bool) -> Self {
        if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        }
    }

    fn nan(negative: bool) -> Self {
        if negative {
            -f64::NAN
        } else {
            f64::NAN
        }
    }

    fn zero(negative: bool) -> Self {
        if negative {
            -0.0
        } else {
            0.0
        }
    }

    fn is_infinite(self) -> bool {
        f64::is_infinite(self)
    }
}

impl ScanFloat for f32 {
    const NAME: &'static str = "f32";
    const MANT_BITS: i32 = 24;
    const MAX_MSB_EXP: i32 = 127;
    const MIN_MSB_EXP: i32 = -126;

    fn parse_decimal(text: &str) -> Option<Self> {
        text.parse().ok()
    }

    fn from_f64_exact(value: f64) -> Self {
        value as f32
    }

    fn infinity(negative: bool) -> Self {
        if negative {
            f32::NEG_INFINITY
        } else {
            f32::INFINITY
        }
    }

    fn nan(negative: bool) -> Self {
        if negative {
            -f32::NAN
        } else {
            f32::NAN
        }
    }

    fn zero(negative: bool) -> Self {
        if negative {
            -0.0
        } else {
            0.0
        }
    }

    fn is_infinite(self) -> bool {
        f32::is_infinite(self)
    }
}

/// Parsed state of one floating-point field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloatReader {
    /// Fixed notation accepted.
    pub allow_fixed: bool,
    /// Scientific notation accepted.
    pub allow_scientific: bool,
    /// Hexadecimal notation accepted.
    pub allow_hex: bool,
    /// `L`: localized parse path.
    pub localized: bool,
    /// Maximum number of code points to consume.
    pub width: Option<usize>,
}

impl FloatReader {
    /// Parse a floating-point specifier.
    pub fn parse(spec: &str, spec_offset: usize) -> Result<Self> {
        let (common, rest, rest_offset) = super::SpecCommon::parse(spec, spec_offset)?;
        let mut fixed = false;
        let mut scientific = false;
        let mut general = false;
        let mut hex = false;
        let mut localized = common.localized;

        for (idx, ch) in rest.char_indices() {
            match ch {
                'f' | 'F' => fixed = true,
                'e' | 'E' => scientific = true,
                'g' | 'G' => general = true,
                'a' | 'A' => hex = true,
                'L' => localized = true,
                _ => {
                    return Err(Error::format(
                        rest_offset + idx,
                        format!("unknown float specifier option '{}'", ch),
                    ));
                },
            }
        }

        let none = !(fixed || scientific || general || hex);
        Ok(FloatReader {
            allow_fixed: fixed || general || none,
            allow_scientific: scientific || general || none,
            allow_hex: hex || none,
            localized,
            width: common.width,
        })
    }

    /// Scan one floating-point value out of the source range.
    pub(crate) fn scan<T: ScanFloat>(
        &self,
        out: &mut T,
        ctx: &mut ScanContext<'_, '_>,
    ) -> Result<()> {
        skip_whitespace(ctx)?;
        let word = read_word(ctx, self.width)?;
        if word.is_empty() {
            return match ctx.range.peek() {
                Err(Error::EndOfRange) => Err(Error::EndOfRange),
                Err(other) => Err(other),
                Ok(_) => Err(Error::InvalidScannedValue("expected a number".to_string())),
            };
        }

        if self.localized {
            return match ctx.locale.read_num_f64(&word) {
                Ok((value, consumed)) => {
                    ctx.range.putback(word.len() - consumed)?;
                    *out = T::from_f64_exact(value);
                    Ok(())
                },
                Err(err) => {
                    ctx.range.putback(word.len())?;
                    Err(err)
                },
            };
        }

        match self.parse_classic::<T>(&word) {
            Ok((value, consumed)) => {
                ctx.range.putback(word.len() - consumed)?;
                if value.is_infinite() && !is_infinity_token(&word) {
                    // Overflow: the signed infinity is stored anyway
                    *out = value;
                    return Err(Error::ValueOutOfRange(format!(
                        "number does not fit in {}",
                        T::NAME
                    )));
                }
                *out = value;
                Ok(())
            },
            Err(err) => {
                ctx.range.putback(word.len())?;
                Err(err)
            },
        }
    }

    /// Classic parse of the word's prefix. Returns the value and the number
    /// of bytes of `word` consumed.
    fn parse_classic<T: ScanFloat>(&self, word: &str) -> Result<(T, usize)> {
        let bytes = word.as_bytes();
        let mut i = 0;
        let mut negative = false;
        match bytes.first() {
            Some(b'+') => i = 1,
            Some(b'-') => {
                negative = true;
                i = 1;
            },
            _ => {},
        }
        let body = &word[i..];

        // inf / infinity
        if let Some(len) = match_infinity(body) {
            return Ok((T::infinity(negative), i + len));
        }
        // nan with optional payload
        if let Some(len) = match_nan(body) {
            return Ok((T::nan(negative), i + len));
        }

        // hexadecimal with mandatory binary exponent
        if self.allow_hex
            && (body.starts_with("0x") || body.starts_with("0X"))
        {
            if let Some((value, len)) = parse_hex_float::<T>(&body[2..], negative) {
                return Ok((value, i + 2 + len));
            }
        }

        // decimal
        let Some((len, has_exponent)) = match_decimal(body, self.allow_scientific) else {
            return Err(Error::InvalidScannedValue(
                "expected a number".to_string(),
            ));
        };
        if !has_exponent && !self.allow_fixed {
            return Err(Error::InvalidScannedValue(
                "expected an exponent".to_string(),
            ));
        }
        let token = &word[..i + len];
        let value = T::parse_decimal(token).ok_or_else(|| {
            Error::InvalidScannedValue(format!("invalid number '{}'", token))
        })?;
        Ok((value, i + len))
    }
}

/// Match `inf` or `infinity`, case-insensitive. Returns the matched length.
fn match_infinity(body: &str) -> Option<usize> {
    let lower = body.as_bytes();
    let starts = |prefix: &str| {
        lower.len() >= prefix.len()
            && lower[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
    };
    if starts("infinity") {
        Some(8)
    } else if starts("inf") {
        Some(3)
    } else {
        None
    }
}

/// Match `nan` with an optional `(payload)`. Returns the matched length.
fn match_nan(body: &str) -> Option<usize> {
    let bytes = body.as_bytes();
    if bytes.len() < 3 || !bytes[..3].eq_ignore_ascii_case(b"nan") {
        return None;
    }
    let mut len = 3;
    if bytes.get(3) == Some(&b'(') {
        let mut j = 4;
        while j < bytes.len() && (bytes[j].is_ascii_alphanumeric() || bytes[j] == b'_') {
            j += 1;
        }
        if bytes.get(j) == Some(&b')') {
            len = j + 1;
        }
    }
    Some(len)
}

/// Match a decimal mantissa with an optional exponent. Returns the matched
/// length and whether an exponent was included.
fn match_decimal(body: &str, allow_exponent: bool) -> Option<(usize, bool)> {
    let bytes = body.as_bytes();
    let mut i = 0;
    let int_digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    i += int_digits;
    let mut frac_digits = 0;
    if bytes.get(i) == Some(&b'.') {
        frac_digits = bytes[i + 1..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        // a bare '.' with no digits on either side is not a number
        if int_digits + frac_digits > 0 {
            i += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return None;
    }

    if allow_exponent {
        if let Some(b'e') | Some(b'E') = bytes.get(i) {
            let mut j = i + 1;
            if matches!(bytes.get(j), Some(b'+') | Some(b'-')) {
                j += 1;
            }
            let exp_digits = bytes[j..].iter().take_while(|b| b.is_ascii_digit()).count();
            if exp_digits > 0 {
                return Some((j + exp_digits, true));
            }
        }
    }
    Some((i, false))
}

/// Is the consumed token an explicit infinity spelling (as opposed to an
/// overflowed finite number)?
fn is_infinity_token(word: &str) -> bool {
    let body = word.trim_start_matches(['+', '-']);
    match_infinity(body).is_some()
}

/// Parse the part after `0x`: hex digits, optional point, mandatory `p`
/// exponent. Returns the rounded value and the length matched after the
/// prefix, or `None` when the token is not a complete hex float.
fn parse_hex_float<T: ScanFloat>(body: &str, negative: bool) -> Option<(T, usize)> {
    let bytes = body.as_bytes();
    let mut i = 0;

    let mut mant: u128 = 0;
    let mut exp2: i64 = 0;
    let mut sticky = false;
    let mut digits = 0;

    // integer part
    while let Some(d) = bytes.get(i).and_then(|b| (*b as char).to_digit(16)) {
        if mant >> 120 == 0 {
            mant = mant * 16 + d as u128;
        } else {
            exp2 += 4;
            sticky |= d != 0;
        }
        digits += 1;
        i += 1;
    }
    // fractional part
    if bytes.get(i) == Some(&b'.') {
        i += 1;
        while let Some(d) = bytes.get(i).and_then(|b| (*b as char).to_digit(16)) {
            if mant >> 120 == 0 {
                mant = mant * 16 + d as u128;
                exp2 -= 4;
            } else {
                sticky |= d != 0;
            }
            digits += 1;
            i += 1;
        }
    }
    if digits == 0 {
        return None;
    }

    // mandatory binary exponent
    if !matches!(bytes.get(i), Some(b'p') | Some(b'P')) {
        return None;
    }
    i += 1;
    let mut exp_negative = false;
    if let Some(b'+') | Some(b'-') = bytes.get(i) {
        exp_negative = bytes[i] == b'-';
        i += 1;
    }
    let exp_digits = bytes[i..].iter().take_while(|b| b.is_ascii_digit()).count();
    if exp_digits == 0 {
        return None;
    }
    let mut exponent: i64 = 0;
    for &b in &bytes[i..i + exp_digits] {
        exponent = (exponent * 10 + (b - b'0') as i64).min(1 << 30);
    }
    if exp_negative {
        exponent = -exponent;
    }
    i += exp_digits;
    exp2 += exponent;

    Some((compose::<T>(mant, exp2, negative, sticky), i))
}

/// Round `mant * 2^exp2` to the target precision, nearest-even.
fn compose<T: ScanFloat>(mut mant: u128, mut exp2: i64, negative: bool, mut sticky: bool) -> T {
    if mant == 0 {
        return T::zero(negative);
    }

    let bits = 128 - mant.leading_zeros() as i64;
    let msb_exp = bits - 1 + exp2;

    // Bits to drop: down to the target precision, and further for
    // subnormal results
    let mut drop = bits - T::MANT_BITS as i64;
    if msb_exp < T::MIN_MSB_EXP as i64 {
        drop += T::MIN_MSB_EXP as i64 - msb_exp;
    }

    if drop > 0 {
        if drop >= 128 {
            sticky |= mant != 0;
            mant = 0;
            exp2 += drop;
        } else {
            let half = 1u128 << (drop - 1);
            let low = mant & ((1u128 << drop) - 1);
            mant >>= drop;
            exp2 += drop;
            if low > half || (low == half && (sticky || mant & 1 == 1)) {
                mant += 1;
            }
            sticky |= low != 0;
        }
    }
    if mant == 0 {
        return T::zero(negative);
    }

    let bits = 128 - mant.leading_zeros() as i64;
    if bits - 1 + exp2 > T::MAX_MSB_EXP as i64 {
        return T::infinity(negative);
    }

    // Exact by construction: `mant` fits the target precision and every
    // kept bit is representable
    let magnitude = mant as f64 * exp2_f64(exp2 as i32);
    T::from_f64_exact(if negative { -magnitude } else { magnitude })
}

/// 2^e as an exactly-constructed f64, for e in the finite f64 range.
fn exp2_f64(e: i32) -> f64 {
    debug_assert!((-1074..=1023).contains(&e));
    if e >= -1022 {
        f64::from_bits(((e as i64 + 1023) as u64) << 52)
    } else {
        f64::from_bits(1u64 << (e + 1074))
    }
}
