//! Scanset compiler.
//!
//! A scanset is the character class appearing in a string field's
//! specifier: `{:[a-z:digit:]}`. The compiler turns the bracketed body into
//! a compact predicate and the string reader runs it over successive code
//! points.
//!
//! # Scanset Syntax Overview
//!
//! - `[abc]` — literal members
//! - `[^abc]` — negated set
//! - `[a-z]` — inclusive code-point range (`z` < `a` is an error)
//! - `[:alpha:]` — named class; ASCII content is baked into the bitmap,
//!   code points at and above U+0080 go through the locale facet
//! - `[\w\W\s\S\d\D\l\L]` — single-member class escapes with their POSIX
//!   meanings (these are set members, not regular expressions)
//! - `[\]\\\:]` — escaped literals, plus `\xHH`, `\uHHHH`, `\UHHHHHHHH`
//! - `[:all:]` — accepts any code point
//!
//! Membership is decided by the ASCII bitmap for code points below U+0080,
//! and by the ranges plus locale-driven class flags above it; a negated set
//! flips the answer.

use bitflags::bitflags;

use crate::error::{Error, Result};
use crate::locale::LocaleFacet;

bitflags! {
    /// Class-specifier membership flags for code points at and above U+0080.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ClassSet: u32 {
        /// `:alpha:`
        const ALPHA = 1 << 0;
        /// `:digit:`
        const DIGIT = 1 << 1;
        /// `:alnum:`
        const ALNUM = 1 << 2;
        /// `:space:` / `\s`
        const SPACE = 1 << 3;
        /// `:upper:`
        const UPPER = 1 << 4;
        /// `:lower:` / `\l`
        const LOWER = 1 << 5;
        /// `:punct:`
        const PUNCT = 1 << 6;
        /// `:xdigit:`
        const XDIGIT = 1 << 7;
        /// `:blank:`
        const BLANK = 1 << 8;
        /// `:cntrl:`
        const CNTRL = 1 << 9;
        /// `:graph:`
        const GRAPH = 1 << 10;
        /// `:print:`
        const PRINT = 1 << 11;
        /// `\w` (alphanumeric or underscore)
        const WORD = 1 << 12;
        /// `\W`
        const NOT_WORD = 1 << 13;
        /// `\S`
        const NOT_SPACE = 1 << 14;
        /// `\D`
        const NOT_DIGIT = 1 << 15;
        /// `\L`
        const NOT_LOWER = 1 << 16;
    }
}

/// A compiled character-class predicate.
///
/// Built once per field, discarded after the scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scanset {
    /// Membership bitmap for code points below U+0080.
    ascii: u128,
    /// Sorted, merged inclusive ranges for code points at and above U+0080.
    ranges: Vec<(u32, u32)>,
    /// Locale-checked classes for code points at and above U+0080.
    classes: ClassSet,
    /// Negated set (`[^...]`).
    negated: bool,
    /// Set is equivalent to `\s\S`: any code point is a member.
    accept_all: bool,
}

/// One tokenized set member.
enum Member {
    /// A literal code point; `escaped` distinguishes `\x2D` from a raw `-`
    /// so only the raw form acts as a range operator.
    Literal { ch: char, escaped: bool },
    /// A named class or class escape.
    Class(ClassSet),
    /// The `:all:` alias.
    All,
}

impl Scanset {
    /// Compile the scanset at the head of `spec`.
    ///
    /// `spec` must start with `[`. Returns the compiled set and the number
    /// of bytes consumed, including both brackets. `base_offset` is the
    /// byte position of `spec` within the format string, used for error
    /// reporting.
    pub fn compile(spec: &str, base_offset: usize) -> Result<(Self, usize)> {
        debug_assert!(spec.starts_with('['));

        let (negated, body_start) = if spec[1..].starts_with('^') {
            (true, 2)
        } else {
            (false, 1)
        };
        let body_end = find_close(spec, body_start).ok_or_else(|| {
            Error::format(base_offset, "unterminated scanset: missing ']'")
        })?;
        let body = &spec[body_start..body_end];
        if body.is_empty() {
            return Err(Error::format(base_offset, "empty scanset"));
        }

        let members = tokenize(body, base_offset + body_start)?;

        let mut set = Scanset {
            ascii: 0,
            ranges: Vec::new(),
            classes: ClassSet::empty(),
            negated,
            accept_all: false,
        };

        let mut i = 0;
        while i < members.len() {
            // Range: literal, raw '-', literal
            if i + 2 < members.len() {
                if let (
                    Member::Literal { ch: lo, .. },
                    Member::Literal {
                        ch: '-',
                        escaped: false,
                    },
                    Member::Literal { ch: hi, .. },
                ) = (&members[i], &members[i + 1], &members[i + 2])
                {
                    set.add_range(*lo, *hi, base_offset)?;
                    i += 3;
                    continue;
                }
            }
            match &members[i] {
                Member::Literal { ch, .. } => set.add_code_point(*ch),
                Member::Class(class) => set.add_class(*class),
                Member::All => set.accept_all = true,
            }
            i += 1;
        }

        // A class together with its negation covers everything
        let c = set.classes;
        if (c.contains(ClassSet::SPACE) && c.contains(ClassSet::NOT_SPACE))
            || (c.contains(ClassSet::WORD) && c.contains(ClassSet::NOT_WORD))
            || (c.contains(ClassSet::DIGIT) && c.contains(ClassSet::NOT_DIGIT))
            || (c.contains(ClassSet::LOWER) && c.contains(ClassSet::NOT_LOWER))
        {
            set.accept_all = true;
        }

        set.ranges.sort_unstable();
        set.ranges.dedup();
        merge_ranges(&mut set.ranges);

        Ok((set, body_end + 1))
    }

    /// Is `ch` a member of the set?
    pub fn contains(&self, ch: char, locale: &LocaleFacet) -> bool {
        if self.accept_all {
            return !self.negated;
        }
        let cp = ch as u32;
        let hit = if cp < 0x80 {
            self.ascii & (1u128 << cp) != 0
        } else {
            self.ranges
                .iter()
                .any(|&(lo, hi)| (lo..=hi).contains(&cp))
                || self.class_match(ch, locale)
        };
        hit ^ self.negated
    }

    /// Does the set need a locale facet to answer membership?
    pub fn needs_locale(&self) -> bool {
        !self.classes.is_empty()
    }

    fn add_code_point(&mut self, ch: char) {
        let cp = ch as u32;
        if cp < 0x80 {
            self.ascii |= 1u128 << cp;
        } else {
            self.ranges.push((cp, cp));
        }
    }

    fn add_range(&mut self, lo: char, hi: char, base_offset: usize) -> Result<()> {
        let (lo, hi) = (lo as u32, hi as u32);
        if hi < lo {
            return Err(Error::format(
                base_offset,
                format!("reversed scanset range U+{:04X}-U+{:04X}", lo, hi),
            ));
        }
        // A range straddling U+0080 splits into a bitmap part and an extra
        // range entry
        if lo < 0x80 {
            for cp in lo..=hi.min(0x7F) {
                self.ascii |= 1u128 << cp;
            }
        }
        if hi >= 0x80 {
            self.ranges.push((lo.max(0x80), hi));
        }
        Ok(())
    }

    fn add_class(&mut self, class: ClassSet) {
        self.classes |= class;
        // Bake the ASCII content of the class into the bitmap; the classic
        // table is authoritative for ASCII regardless of the scan-time
        // locale
        let classic = LocaleFacet::Classic;
        for cp in 0u32..0x80 {
            // every value below 0x80 is a valid char
            let ch = char::from_u32(cp).unwrap();
            if class_member(class, ch, &classic) {
                self.ascii |= 1u128 << cp;
            }
        }
    }

    /// Locale-driven class membership for code points at and above U+0080.
    fn class_match(&self, ch: char, locale: &LocaleFacet) -> bool {
        class_member(self.classes, ch, locale)
    }
}

/// Test `ch` against every class in `classes`.
fn class_member(classes: ClassSet, ch: char, locale: &LocaleFacet) -> bool {
    if classes.contains(ClassSet::ALPHA) && locale.is_alpha(ch) {
        return true;
    }
    if classes.contains(ClassSet::DIGIT) && locale.is_digit(ch) {
        return true;
    }
    if classes.contains(ClassSet::ALNUM) && locale.is_alnum(ch) {
        return true;
    }
    if classes.contains(ClassSet::SPACE) && locale.is_space(ch) {
        return true;
    }
    if classes.contains(ClassSet::UPPER) && locale.is_upper(ch) {
        return true;
    }
    if classes.contains(ClassSet::LOWER) && locale.is_lower(ch) {
        return true;
    }
    if classes.contains(ClassSet::PUNCT) && locale.is_punct(ch) {
        return true;
    }
    if classes.contains(ClassSet::XDIGIT) && locale.is_xdigit(ch) {
        return true;
    }
    if classes.contains(ClassSet::BLANK) && locale.is_blank(ch) {
        return true;
    }
    if classes.contains(ClassSet::CNTRL) && locale.is_cntrl(ch) {
        return true;
    }
    if classes.contains(ClassSet::GRAPH) && locale.is_graph(ch) {
        return true;
    }
    if classes.contains(ClassSet::PRINT) && locale.is_print(ch) {
        return true;
    }
    if classes.contains(ClassSet::WORD) && (locale.is_alnum(ch) || ch == '_') {
        return true;
    }
    if classes.contains(ClassSet::NOT_WORD) && !(locale.is_alnum(ch) || ch == '_') {
        return true;
    }
    if classes.contains(ClassSet::NOT_SPACE) && !locale.is_space(ch) {
        return true;
    }
    if classes.contains(ClassSet::NOT_DIGIT) && !locale.is_digit(ch) {
        return true;
    }
    if classes.contains(ClassSet::NOT_LOWER) && !locale.is_lower(ch) {
        return true;
    }
    false
}

/// Find the closing `]`, honoring escapes and the leading-`]`-is-a-member
/// rule.
fn find_close(spec: &str, body_start: usize) -> Option<usize> {
    let bytes = spec.as_bytes();
    let mut i = body_start;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b']' if i != body_start => return Some(i),
            _ => {},
        }
        i += 1;
    }
    None
}

/// Tokenize the set body into members.
fn tokenize(body: &str, base_offset: usize) -> Result<Vec<Member>> {
    let mut members = Vec::new();
    let mut chars = body.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        let at = base_offset + idx;
        match ch {
            ':' => {
                let name_start = idx + 1;
                let end = body[name_start..]
                    .find(':')
                    .map(|rel| name_start + rel)
                    .ok_or_else(|| Error::format(at, "unterminated ':class:' specifier"))?;
                let name = &body[name_start..end];
                members.push(class_by_name(name, at)?);
                // consume through the closing ':'
                while let Some(&(i, _)) = chars.peek() {
                    if i > end {
                        break;
                    }
                    chars.next();
                }
            },
            '\\' => {
                let (_, esc) = chars
                    .next()
                    .ok_or_else(|| Error::format(at, "dangling '\\' in scanset"))?;
                match esc {
                    'w' => members.push(Member::Class(ClassSet::WORD)),
                    'W' => members.push(Member::Class(ClassSet::NOT_WORD)),
                    's' => members.push(Member::Class(ClassSet::SPACE)),
                    'S' => members.push(Member::Class(ClassSet::NOT_SPACE)),
                    'd' => members.push(Member::Class(ClassSet::DIGIT)),
                    'D' => members.push(Member::Class(ClassSet::NOT_DIGIT)),
                    'l' => members.push(Member::Class(ClassSet::LOWER)),
                    'L' => members.push(Member::Class(ClassSet::NOT_LOWER)),
                    ']' | '\\' | ':' | '-' | '^' => members.push(Member::Literal {
                        ch: esc,
                        escaped: true,
                    }),
                    'x' => {
                        let cp = hex_escape(&mut chars, 2, at)?;
                        members.push(Member::Literal {
                            ch: cp,
                            escaped: true,
                        });
                    },
                    'u' => {
                        let cp = hex_escape(&mut chars, 4, at)?;
                        members.push(Member::Literal {
                            ch: cp,
                            escaped: true,
                        });
                    },
                    'U' => {
                        let cp = hex_escape(&mut chars, 8, at)?;
                        members.push(Member::Literal {
                            ch: cp,
                            escaped: true,
                        });
                    },
                    other => {
                        return Err(Error::format(
                            at,
                            format!("unknown scanset escape '\\{}'", other),
                        ));
                    },
                }
            },
            _ => members.push(Member::Literal { ch, escaped: false }),
        }
    }
    Ok(members)
}

/// Read exactly `digits` hex digits from the member stream.
fn hex_escape(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    digits: usize,
    at: usize,
) -> Result<char> {
    let mut value = 0u32;
    for _ in 0..digits {
        let (_, ch) = chars.next().ok_or_else(|| {
            Error::format(at, format!("hex escape needs {} digits", digits))
        })?;
        let digit = ch.to_digit(16).ok_or_else(|| {
            Error::format(at, format!("invalid hex digit '{}' in escape", ch))
        })?;
        value = value * 16 + digit;
    }
    char::from_u32(value)
        .ok_or_else(|| Error::format(at, format!("escape U+{:X} is not a code point", value)))
}

/// Look up a `:class:` name.
fn class_by_name(name: &str, at: usize) -> Result<Member> {
    let class = match name {
        "alpha" => ClassSet::ALPHA,
        "digit" => ClassSet::DIGIT,
        "alnum" => ClassSet::ALNUM,
        "space" => ClassSet::SPACE,
        "upper" => ClassSet::UPPER,
        "lower" => ClassSet::LOWER,
        "punct" => ClassSet::PUNCT,
        "xdigit" => ClassSet::XDIGIT,
        "blank" => ClassSet::BLANK,
        "cntrl" => ClassSet::CNTRL,
        "graph" => ClassSet::GRAPH,
        "print" => ClassSet::PRINT,
        // Historical alias for "any code point"
        "all" => return Ok(Member::All),
        _ => {
            return Err(Error::format(
                at,
                format!("unknown scanset class ':{}:'", name),
            ));
        },
    };
    Ok(Member::Class(class))
}

/// Merge adjacent and overlapping sorted ranges in place.
fn merge_ranges(ranges: &mut Vec<(u32, u32)>) {
    if ranges.len() < 2 {
        return;
    }
    let mut merged: Vec<(u32, u32)> = Vec::with_capacity(ranges.len());
    for &(lo, hi) in ranges.iter() {
        match merged.last_mut() {
            Some(last) if lo <= last.1.saturating_add(1) => last.1 = last.1.max(hi),
            _ => merged.push((lo, hi)),
        }
    }
    *ranges = merged;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(spec: &str) -> Scanset {
        Scanset::compile(spec, 0).unwrap().0
    }

    fn contains(set: &Scanset, ch: char) -> bool {
        set.contains(ch, &LocaleFacet::Classic)
    }

    // ========================================================================
    // Literal and Range Tests
    // ========================================================================

    #[test]
    fn test_literal_members() {
        let set = compile("[abc]");
        assert!(contains(&set, 'a'));
        assert!(contains(&set, 'c'));
        assert!(!contains(&set, 'd'));
    }

    #[test]
    fn test_ascii_range() {
        let set = compile("[a-f]");
        assert!(contains(&set, 'a'));
        assert!(contains(&set, 'f'));
        assert!(!contains(&set, 'g'));
    }

    #[test]
    fn test_reversed_range_rejected() {
        assert!(matches!(
            Scanset::compile("[z-a]", 0),
            Err(Error::InvalidFormatString { .. })
        ));
    }

    #[test]
    fn test_dash_first_and_last_is_literal() {
        let set = compile("[-ab-]");
        assert!(contains(&set, '-'));
        assert!(contains(&set, 'a'));
        assert!(contains(&set, 'b'));
    }

    #[test]
    fn test_non_ascii_members() {
        let set = compile("[ÅÄÖ]");
        assert!(contains(&set, 'Å'));
        assert!(contains(&set, 'Ä'));
        assert!(contains(&set, 'Ö'));
        assert!(!contains(&set, 'a'));
        assert!(!contains(&set, 'O'));
    }

    #[test]
    fn test_range_straddling_ascii_boundary() {
        // U+0041 'A' .. U+00C5 'Å'
        let set = compile("[A-Å]");
        assert!(contains(&set, 'A'));
        assert!(contains(&set, 'z'));
        assert!(contains(&set, '\u{7F}'));
        assert!(contains(&set, '\u{80}'));
        assert!(contains(&set, 'Ä'));
        assert!(!contains(&set, 'Ö')); // U+00D6 > U+00C5
    }

    #[test]
    fn test_negated_set() {
        let set = compile("[^0-9]");
        assert!(!contains(&set, '5'));
        assert!(contains(&set, 'x'));
        assert!(contains(&set, 'Ä'));
    }

    #[test]
    fn test_leading_bracket_member() {
        let set = compile("[]a]");
        assert!(contains(&set, ']'));
        assert!(contains(&set, 'a'));
    }

    // ========================================================================
    // Class and Escape Tests
    // ========================================================================

    #[test]
    fn test_named_class_ascii() {
        let set = compile("[:digit:]");
        assert!(contains(&set, '7'));
        assert!(!contains(&set, 'x'));
    }

    #[test]
    fn test_class_mixed_with_literals() {
        let set = compile("[:alpha:_]");
        assert!(contains(&set, 'q'));
        assert!(contains(&set, '_'));
        assert!(!contains(&set, '1'));
    }

    #[test]
    fn test_unknown_class_rejected() {
        assert!(Scanset::compile("[:bogus:]", 0).is_err());
    }

    #[test]
    fn test_word_escape() {
        let set = compile(r"[\w]");
        assert!(contains(&set, 'a'));
        assert!(contains(&set, '7'));
        assert!(contains(&set, '_'));
        assert!(!contains(&set, '-'));
    }

    #[test]
    fn test_negated_class_escape() {
        let set = compile(r"[\D]");
        assert!(contains(&set, 'x'));
        assert!(!contains(&set, '4'));
        // Non-ASCII, non-digit matches through the class flags
        assert!(contains(&set, 'Ä'));
    }

    #[test]
    fn test_hex_escapes() {
        let set = compile(r"[\x41Ä]");
        assert!(contains(&set, 'A'));
        assert!(contains(&set, 'Ä'));
        assert!(!contains(&set, 'B'));
    }

    #[test]
    fn test_escaped_literals() {
        let set = compile(r"[\]\\\:]");
        assert!(contains(&set, ']'));
        assert!(contains(&set, '\\'));
        assert!(contains(&set, ':'));
    }

    #[test]
    fn test_escaped_dash_is_not_range_operator() {
        let set = compile(r"[a\-z]");
        assert!(contains(&set, 'a'));
        assert!(contains(&set, '-'));
        assert!(contains(&set, 'z'));
        assert!(!contains(&set, 'm'));
    }

    #[test]
    fn test_accept_all_via_space_escapes() {
        let set = compile(r"[\s\S]");
        assert!(contains(&set, 'a'));
        assert!(contains(&set, ' '));
        assert!(contains(&set, '\u{1F600}'));
    }

    #[test]
    fn test_all_alias() {
        let set = compile("[:all:]");
        assert!(contains(&set, 'a'));
        assert!(contains(&set, '\n'));
    }

    #[test]
    fn test_punct_class_with_custom_locale() {
        use crate::locale::CustomLocale;
        let set = compile("[:punct:]");
        let unicode = CustomLocale::new().build();
        assert!(set.contains(';', &unicode));
        assert!(set.contains('\u{00BF}', &unicode)); // ¿
        // Currency signs and math operators stay outside the class
        assert!(!set.contains('\u{20AC}', &unicode)); // €
        assert!(!set.contains('\u{00D7}', &unicode)); // ×
    }

    #[test]
    fn test_unicode_class_with_custom_locale() {
        use crate::locale::CustomLocale;
        let set = compile("[:alpha:]");
        let unicode = CustomLocale::new().build();
        assert!(set.contains('Ä', &unicode));
        // The classic facet never classifies non-ASCII as alphabetic
        assert!(!set.contains('Ä', &LocaleFacet::Classic));
    }

    // ========================================================================
    // Structure Tests
    // ========================================================================

    #[test]
    fn test_consumed_length() {
        let (_, consumed) = Scanset::compile("[abc]xyz", 0).unwrap();
        assert_eq!(consumed, 5);
    }

    #[test]
    fn test_ranges_merged() {
        let set = compile("[\u{80}-\u{8F}\u{90}-\u{9F}]");
        assert_eq!(set.ranges, vec![(0x80, 0x9F)]);
    }

    #[test]
    fn test_empty_set_rejected() {
        assert!(Scanset::compile("[]", 0).is_err());
        assert!(Scanset::compile("[^]", 0).is_err());
    }

    #[test]
    fn test_unterminated_set_rejected() {
        assert!(Scanset::compile("[abc", 0).is_err());
    }
}
