//! Locale facets.
//!
//! A locale facet answers the classification and vocabulary questions the
//! readers ask: is this a space, a digit, what is the decimal point, what do
//! "true" and "false" look like. Two variants share one surface:
//!
//! - [`LocaleFacet::Classic`] answers everything from fixed ASCII rules and
//!   never touches any host facility. When no locale is supplied, scanning
//!   results do not depend on the process environment.
//! - A custom facet built with [`CustomLocale`] carries caller-supplied
//!   numeric punctuation and boolean names and defers classification to
//!   Unicode.
//!
//! The driver and readers call [`LocaleFacet::is_default`] first and inline
//! the ASCII fast paths when it holds, keeping the inner loops free of
//! dispatch.

use crate::error::{Error, Result};

/// Default boolean vocabulary.
const CLASSIC_TRUENAME: &str = "true";
const CLASSIC_FALSENAME: &str = "false";

/// Classification and numeric/boolean vocabulary for one scan call.
///
/// Facets are cheap to clone and never mutated after construction; the
/// driver borrows one for the duration of a call.
#[derive(Debug, Clone, Default)]
pub enum LocaleFacet {
    /// Fixed ASCII tables, no host calls.
    #[default]
    Classic,
    /// Caller-supplied vocabulary with Unicode classification.
    Custom(Box<CustomLocale>),
}

/// Caller-constructed locale data.
///
/// Built once, read-only afterwards. The decimal point, thousands separator
/// and boolean names are cached at construction.
#[derive(Debug, Clone)]
pub struct CustomLocale {
    decimal_point: char,
    thousands_separator: char,
    truename: String,
    falsename: String,
}

impl Default for CustomLocale {
    fn default() -> Self {
        Self::new()
    }
}

impl CustomLocale {
    /// Create locale data with the classic defaults.
    pub fn new() -> Self {
        Self {
            decimal_point: '.',
            thousands_separator: ',',
            truename: CLASSIC_TRUENAME.to_string(),
            falsename: CLASSIC_FALSENAME.to_string(),
        }
    }

    /// Set the decimal point.
    pub fn with_decimal_point(mut self, ch: char) -> Self {
        self.decimal_point = ch;
        self
    }

    /// Set the thousands separator.
    pub fn with_thousands_separator(mut self, ch: char) -> Self {
        self.thousands_separator = ch;
        self
    }

    /// Set the localized boolean names.
    pub fn with_bool_names(mut self, truename: &str, falsename: &str) -> Self {
        self.truename = truename.to_string();
        self.falsename = falsename.to_string();
        self
    }

    /// Finish construction.
    pub fn build(self) -> LocaleFacet {
        LocaleFacet::Custom(Box::new(self))
    }
}

impl LocaleFacet {
    /// Is this the classic facet?
    ///
    /// When true, callers may inline the ASCII fast paths instead of going
    /// through the facet.
    #[inline]
    pub fn is_default(&self) -> bool {
        matches!(self, LocaleFacet::Classic)
    }

    /// Whitespace classification.
    #[inline]
    pub fn is_space(&self, ch: char) -> bool {
        match self {
            LocaleFacet::Classic => ch == ' ' || ('\t'..='\r').contains(&ch),
            LocaleFacet::Custom(_) => ch.is_whitespace(),
        }
    }

    /// Decimal digit classification.
    #[inline]
    pub fn is_digit(&self, ch: char) -> bool {
        match self {
            LocaleFacet::Classic => ch.is_ascii_digit(),
            LocaleFacet::Custom(_) => ch.is_numeric(),
        }
    }

    /// Alphabetic classification.
    #[inline]
    pub fn is_alpha(&self, ch: char) -> bool {
        match self {
            LocaleFacet::Classic => ch.is_ascii_alphabetic(),
            LocaleFacet::Custom(_) => ch.is_alphabetic(),
        }
    }

    /// Alphanumeric classification.
    #[inline]
    pub fn is_alnum(&self, ch: char) -> bool {
        self.is_alpha(ch) || self.is_digit(ch)
    }

    /// Uppercase classification.
    #[inline]
    pub fn is_upper(&self, ch: char) -> bool {
        match self {
            LocaleFacet::Classic => ch.is_ascii_uppercase(),
            LocaleFacet::Custom(_) => ch.is_uppercase(),
        }
    }

    /// Lowercase classification.
    #[inline]
    pub fn is_lower(&self, ch: char) -> bool {
        match self {
            LocaleFacet::Classic => ch.is_ascii_lowercase(),
            LocaleFacet::Custom(_) => ch.is_lowercase(),
        }
    }

    /// Punctuation classification.
    ///
    /// The standard library has no Unicode punctuation query, so the
    /// locale-aware path accepts ASCII punctuation, the Latin-1 punctuation
    /// marks, the General Punctuation block, and the common CJK and
    /// fullwidth punctuation ranges. Symbols, currency signs, and math
    /// operators are not punctuation.
    #[inline]
    pub fn is_punct(&self, ch: char) -> bool {
        match self {
            LocaleFacet::Classic => ch.is_ascii_punctuation(),
            LocaleFacet::Custom(_) => {
                ch.is_ascii_punctuation()
                    || matches!(ch,
                        // Latin-1: ¡ § « ¶ · » ¿
                        '\u{00A1}' | '\u{00A7}' | '\u{00AB}' | '\u{00B6}'
                        | '\u{00B7}' | '\u{00BB}' | '\u{00BF}'
                        // General Punctuation: dashes, quotes, daggers,
                        // ellipsis (spaces and format controls excluded)
                        | '\u{2010}'..='\u{2027}'
                        | '\u{2030}'..='\u{205E}'
                        // CJK ideographic comma, full stop, ditto marks
                        | '\u{3001}'..='\u{3003}'
                        | '\u{301D}'..='\u{301F}'
                        // Fullwidth ASCII punctuation
                        | '\u{FF01}'..='\u{FF03}'
                        | '\u{FF05}'..='\u{FF0A}'
                        | '\u{FF0C}'..='\u{FF0F}'
                        | '\u{FF1A}' | '\u{FF1B}' | '\u{FF1F}' | '\u{FF20}'
                        | '\u{FF3B}'..='\u{FF3D}'
                        | '\u{FF5F}'..='\u{FF65}')
            },
        }
    }

    /// Hexadecimal digit classification (ASCII in every locale).
    #[inline]
    pub fn is_xdigit(&self, ch: char) -> bool {
        ch.is_ascii_hexdigit()
    }

    /// Blank classification (space or horizontal tab).
    #[inline]
    pub fn is_blank(&self, ch: char) -> bool {
        ch == ' ' || ch == '\t'
    }

    /// Control-character classification.
    #[inline]
    pub fn is_cntrl(&self, ch: char) -> bool {
        ch.is_control()
    }

    /// Graphic classification (visible, non-space).
    #[inline]
    pub fn is_graph(&self, ch: char) -> bool {
        match self {
            LocaleFacet::Classic => ch.is_ascii_graphic(),
            LocaleFacet::Custom(_) => !ch.is_whitespace() && !ch.is_control(),
        }
    }

    /// Printable classification (graphic or space).
    #[inline]
    pub fn is_print(&self, ch: char) -> bool {
        match self {
            LocaleFacet::Classic => ch.is_ascii_graphic() || ch == ' ',
            LocaleFacet::Custom(_) => !ch.is_control(),
        }
    }

    /// The decimal point.
    #[inline]
    pub fn decimal_point(&self) -> char {
        match self {
            LocaleFacet::Classic => '.',
            LocaleFacet::Custom(data) => data.decimal_point,
        }
    }

    /// The thousands separator.
    #[inline]
    pub fn thousands_separator(&self) -> char {
        match self {
            LocaleFacet::Classic => ',',
            LocaleFacet::Custom(data) => data.thousands_separator,
        }
    }

    /// The localized spelling of `true`.
    #[inline]
    pub fn truename(&self) -> &str {
        match self {
            LocaleFacet::Classic => CLASSIC_TRUENAME,
            LocaleFacet::Custom(data) => &data.truename,
        }
    }

    /// The localized spelling of `false`.
    #[inline]
    pub fn falsename(&self) -> &str {
        match self {
            LocaleFacet::Classic => CLASSIC_FALSENAME,
            LocaleFacet::Custom(data) => &data.falsename,
        }
    }

    /// Localized integer parse.
    ///
    /// Accepts an optional sign, then base digits interleaved with this
    /// facet's thousands separator. Returns the value and the number of
    /// bytes of `text` consumed.
    ///
    /// Used only when a field requests the localized parse path.
    pub fn read_num_i64(&self, text: &str, base: u32) -> Result<(i64, usize)> {
        if !(2..=36).contains(&base) {
            return Err(Error::InvalidArgument(format!(
                "base {} is not in 2..=36",
                base
            )));
        }
        let sep = self.thousands_separator();
        let mut value: i64 = 0;
        let mut negative = false;
        let mut digits = 0usize;
        let mut consumed = 0usize;

        let mut chars = text.char_indices().peekable();
        if let Some(&(_, ch)) = chars.peek() {
            if ch == '+' || ch == '-' {
                negative = ch == '-';
                chars.next();
                consumed = ch.len_utf8();
            }
        }
        for (idx, ch) in chars {
            if ch == sep && digits > 0 {
                consumed = idx + ch.len_utf8();
                continue;
            }
            let Some(digit) = ch.to_digit(base) else {
                break;
            };
            let digit = digit as i64;
            value = value
                .checked_mul(base as i64)
                .and_then(|v| {
                    if negative {
                        v.checked_sub(digit)
                    } else {
                        v.checked_add(digit)
                    }
                })
                .ok_or_else(|| {
                    Error::ValueOutOfRange("localized integer overflow".to_string())
                })?;
            digits += 1;
            consumed = idx + ch.len_utf8();
        }

        if digits == 0 {
            return Err(Error::InvalidScannedValue(
                "no digits in localized integer".to_string(),
            ));
        }
        Ok((value, consumed))
    }

    /// Localized floating-point parse.
    ///
    /// Honors this facet's decimal point and thousands separator, then
    /// delegates to the classic correctly-rounded parser. Returns the value
    /// and the number of bytes of `text` consumed.
    pub fn read_num_f64(&self, text: &str) -> Result<(f64, usize)> {
        let point = self.decimal_point();
        let sep = self.thousands_separator();

        // Normalize to classic punctuation, tracking how much of the
        // original text takes part.
        let mut normalized = String::with_capacity(text.len());
        let mut consumed = 0usize;
        let mut seen_point = false;
        for (idx, ch) in text.char_indices() {
            let end = idx + ch.len_utf8();
            if ch == sep && !seen_point && normalized.chars().any(|c| c.is_ascii_digit()) {
                consumed = end;
                continue;
            }
            if ch == point && !seen_point {
                normalized.push('.');
                seen_point = true;
                consumed = end;
                continue;
            }
            if ch.is_ascii_digit()
                || ch == '+'
                || ch == '-'
                || ch == 'e'
                || ch == 'E'
            {
                normalized.push(ch);
                consumed = end;
                continue;
            }
            break;
        }

        if !normalized.chars().any(|c| c.is_ascii_digit()) {
            return Err(Error::InvalidScannedValue(
                "no digits in localized float".to_string(),
            ));
        }
        let value: f64 = normalized.parse().map_err(|_| {
            Error::InvalidScannedValue(format!("invalid localized float '{}'", text))
        })?;
        Ok((value, consumed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Classification Tests
    // ========================================================================

    #[test]
    fn test_classic_is_space() {
        let facet = LocaleFacet::Classic;
        for ch in [' ', '\t', '\n', '\r', '\x0B', '\x0C'] {
            assert!(facet.is_space(ch), "{:?} should be space", ch);
        }
        assert!(!facet.is_space('a'));
        // Non-ASCII whitespace is not space in the classic facet
        assert!(!facet.is_space('\u{00A0}'));
    }

    #[test]
    fn test_custom_is_space_is_unicode() {
        let facet = CustomLocale::new().build();
        assert!(facet.is_space('\u{00A0}'));
        assert!(facet.is_space(' '));
    }

    #[test]
    fn test_classic_digits_and_alpha() {
        let facet = LocaleFacet::Classic;
        assert!(facet.is_digit('7'));
        assert!(!facet.is_digit('٧')); // ARABIC-INDIC SEVEN
        assert!(facet.is_alpha('x'));
        assert!(!facet.is_alpha('ä'));
    }

    #[test]
    fn test_custom_is_punct_excludes_symbols() {
        let facet = CustomLocale::new().build();
        assert!(facet.is_punct('!'));
        assert!(facet.is_punct('\u{00AB}')); // «
        assert!(facet.is_punct('\u{2026}')); // …
        assert!(facet.is_punct('\u{FF01}')); // ！
        // Symbols, currency signs and math operators are not punctuation
        assert!(!facet.is_punct('\u{20AC}')); // €
        assert!(!facet.is_punct('\u{00D7}')); // ×
        assert!(!facet.is_punct('\u{2192}')); // →
    }

    #[test]
    fn test_vocabulary_defaults() {
        let facet = LocaleFacet::Classic;
        assert_eq!(facet.decimal_point(), '.');
        assert_eq!(facet.thousands_separator(), ',');
        assert_eq!(facet.truename(), "true");
        assert_eq!(facet.falsename(), "false");
    }

    #[test]
    fn test_custom_vocabulary() {
        let facet = CustomLocale::new()
            .with_decimal_point(',')
            .with_thousands_separator('\u{00A0}')
            .with_bool_names("tosi", "epätosi")
            .build();
        assert!(!facet.is_default());
        assert_eq!(facet.decimal_point(), ',');
        assert_eq!(facet.thousands_separator(), '\u{00A0}');
        assert_eq!(facet.truename(), "tosi");
        assert_eq!(facet.falsename(), "epätosi");
    }

    // ========================================================================
    // Localized Number Parsing Tests
    // ========================================================================

    #[test]
    fn test_read_num_i64_with_separators() {
        let facet = LocaleFacet::Classic;
        let (value, consumed) = facet.read_num_i64("1,000,000", 10).unwrap();
        assert_eq!(value, 1_000_000);
        assert_eq!(consumed, 9);
    }

    #[test]
    fn test_read_num_i64_negative() {
        let facet = LocaleFacet::Classic;
        let (value, consumed) = facet.read_num_i64("-42 rest", 10).unwrap();
        assert_eq!(value, -42);
        assert_eq!(consumed, 3);
    }

    #[test]
    fn test_read_num_i64_bad_base() {
        let facet = LocaleFacet::Classic;
        assert!(matches!(
            facet.read_num_i64("10", 1),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            facet.read_num_i64("10", 37),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_read_num_i64_no_digits() {
        let facet = LocaleFacet::Classic;
        assert!(matches!(
            facet.read_num_i64("abc", 10),
            Err(Error::InvalidScannedValue(_))
        ));
    }

    #[test]
    fn test_read_num_f64_decimal_comma() {
        let facet = CustomLocale::new().with_decimal_point(',').build();
        let (value, consumed) = facet.read_num_f64("3,14").unwrap();
        assert!((value - 3.14).abs() < 1e-12);
        assert_eq!(consumed, 4);
    }

    #[test]
    fn test_read_num_f64_classic() {
        let facet = LocaleFacet::Classic;
        let (value, _) = facet.read_num_f64("2.5e3").unwrap();
        assert_eq!(value, 2500.0);
    }
}
