//! Scan driver.
//!
//! The driver orchestrates format segments against the argument store:
//! literal segments must match the input code unit for code unit, whitespace
//! segments skip zero or more whitespace code points, and replacement fields
//! resolve an argument slot, parse their specifier, and hand the slot's
//! reader the source range.
//!
//! Each field walks `Start -> ReadingSpec -> Reading -> Committed | Failed`;
//! a failed field puts back everything it speculatively consumed, so on a
//! recoverable error the result reports the count of fully committed
//! arguments and the input position after the last successful read.

use log::{debug, trace};

use crate::args::{ArgSlot, ArgStore};
use crate::error::{Error, Result, ScanError};
use crate::format::{parse_format, Field, FormatString, Segment};
use crate::locale::LocaleFacet;
use crate::range::{SourceRange, StrSource};
use crate::readers::boolean::BoolReader;
use crate::readers::character::CharReader;
use crate::readers::float::FloatReader;
use crate::readers::int::IntReader;
use crate::readers::string::StringReader;
use crate::readers::{skip_whitespace, ScanContext};

/// Scan configuration.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Locale facet used for classification and vocabulary.
    pub locale: LocaleFacet,
}

impl ScanOptions {
    /// Create options with the classic locale.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the given locale facet.
    pub fn with_locale(mut self, locale: LocaleFacet) -> Self {
        self.locale = locale;
        self
    }
}

/// Successful scan outcome: how many arguments were scanned and where the
/// input continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanResult<'s> {
    /// Number of arguments scanned.
    pub scanned: usize,
    /// The unconsumed tail of the input.
    pub remaining: &'s str,
}

/// Scan `input` against `format`, writing through the argument store.
///
/// # Examples
///
/// ```
/// use scan_oxide::{scan, scan_args};
///
/// let mut count = 0i32;
/// let mut word = String::new();
/// let result = scan("42 foo", "{} {}", &mut scan_args![&mut count, &mut word]).unwrap();
/// assert_eq!((count, word.as_str()), (42, "foo"));
/// assert_eq!(result.scanned, 2);
/// ```
pub fn scan<'s>(
    input: &'s str,
    format: &str,
    args: &mut ArgStore<'_, 's>,
) -> std::result::Result<ScanResult<'s>, ScanError> {
    scan_localized(&LocaleFacet::Classic, input, format, args)
}

/// As [`scan`], with a caller-supplied locale facet.
pub fn scan_localized<'s>(
    locale: &LocaleFacet,
    input: &'s str,
    format: &str,
    args: &mut ArgStore<'_, 's>,
) -> std::result::Result<ScanResult<'s>, ScanError> {
    let mut source = StrSource::new(input);
    let scanned = run_driver(&mut source, format, args, locale)?;
    Ok(ScanResult {
        scanned,
        remaining: source.tail(),
    })
}

/// As [`scan`], with explicit [`ScanOptions`].
pub fn scan_with_options<'s>(
    options: &ScanOptions,
    input: &'s str,
    format: &str,
    args: &mut ArgStore<'_, 's>,
) -> std::result::Result<ScanResult<'s>, ScanError> {
    scan_localized(&options.locale, input, format, args)
}

/// Range-level scan entry: consume from any source range.
///
/// Returns the number of arguments scanned; the range is left positioned
/// after the last successful read.
pub fn vscan<'s>(
    range: &mut dyn SourceRange<'s>,
    format: &str,
    args: &mut ArgStore<'_, 's>,
) -> std::result::Result<usize, ScanError> {
    run_driver(range, format, args, &LocaleFacet::Classic)
}

/// As [`vscan`], with a caller-supplied locale facet.
pub fn vscan_localized<'s>(
    locale: &LocaleFacet,
    range: &mut dyn SourceRange<'s>,
    format: &str,
    args: &mut ArgStore<'_, 's>,
) -> std::result::Result<usize, ScanError> {
    run_driver(range, format, args, locale)
}

/// Reenter the driver from a [`CustomScan`] implementation.
///
/// Scans `format` against the custom scanner's own fields, consuming from
/// the context it was handed.
pub fn scan_usertype<'s>(
    ctx: &mut ScanContext<'_, 's>,
    format: &str,
    args: &mut ArgStore<'_, 's>,
) -> Result<()> {
    let locale = ctx.locale;
    run_driver(ctx.range, format, args, locale).map_err(|err| err.error)?;
    Ok(())
}

/// The driver loop.
fn run_driver<'s>(
    range: &mut dyn SourceRange<'s>,
    format: &str,
    args: &mut ArgStore<'_, 's>,
    locale: &LocaleFacet,
) -> std::result::Result<usize, ScanError> {
    let start = range.position();
    let fail = |error: Error, scanned: usize, position: usize| ScanError {
        error,
        scanned,
        position,
    };

    let parsed: FormatString<'_> = match parse_format(format) {
        Ok(parsed) => parsed,
        Err(error) => return Err(fail(error, 0, range.position())),
    };
    if parsed.field_count != args.len() {
        return Err(fail(
            Error::format(
                0,
                format!(
                    "format has {} field(s) but {} argument(s) were supplied",
                    parsed.field_count,
                    args.len()
                ),
            ),
            0,
            range.position(),
        ));
    }

    debug!(
        "scanning {} segment(s), {} argument(s), position {}",
        parsed.segments.len(),
        parsed.field_count,
        start
    );

    let mut scanned = 0usize;
    let mut next_index = 0usize;
    for segment in &parsed.segments {
        match segment {
            Segment::Literal(text) => {
                trace!("literal segment {:?}", text);
                if let Err(error) = match_literal(range, text) {
                    return Err(fail(error, scanned, range.position()));
                }
            },
            Segment::Whitespace => {
                trace!("whitespace segment");
                let mut ctx = ScanContext::new(&mut *range, locale);
                if let Err(error) = skip_whitespace(&mut ctx) {
                    return Err(fail(error, scanned, range.position()));
                }
            },
            Segment::Field(field) => {
                let index = match field.index {
                    Some(explicit) => explicit,
                    None => {
                        let implicit = next_index;
                        next_index += 1;
                        implicit
                    },
                };
                match args.tag(index) {
                    Some(tag) => trace!("field segment, argument {} ({})", index, tag.type_name()),
                    None => trace!("field segment, argument {}", index),
                }
                let Some(slot) = args.slot_mut(index) else {
                    return Err(fail(
                        Error::format(
                            field.spec_offset,
                            format!("argument index {} out of range", index),
                        ),
                        scanned,
                        range.position(),
                    ));
                };
                // Readers may put back anything consumed since the field
                // began
                range.set_rollback_point();
                let mut ctx = ScanContext::new(&mut *range, locale);
                if let Err(error) = scan_field(slot, field, &mut ctx) {
                    debug!(
                        "field {} failed at position {}: {}",
                        index,
                        range.position(),
                        error
                    );
                    return Err(fail(error, scanned, range.position()));
                }
                scanned += 1;
            },
        }
    }

    debug_assert!(range.position() >= start);
    Ok(scanned)
}

/// Match one literal segment code unit for code unit.
fn match_literal(range: &mut dyn SourceRange<'_>, text: &str) -> Result<()> {
    for &expected in text.as_bytes() {
        let unit = range.peek()?;
        if unit != expected {
            return Err(Error::InvalidScannedValue(format!(
                "input does not match literal {:?}",
                text
            )));
        }
        range.advance(1);
    }
    Ok(())
}

/// Parse the field's specifier with the slot's reader and scan a value.
fn scan_field<'s>(
    slot: &mut ArgSlot<'_, 's>,
    field: &Field<'_>,
    ctx: &mut ScanContext<'_, 's>,
) -> Result<()> {
    macro_rules! scan_int {
        ($out:expr) => {{
            let reader = IntReader::parse(field.spec, field.spec_offset)?;
            reader.scan(&mut **$out, ctx)
        }};
    }
    macro_rules! scan_float {
        ($out:expr) => {{
            let reader = FloatReader::parse(field.spec, field.spec_offset)?;
            reader.scan(&mut **$out, ctx)
        }};
    }

    match slot {
        ArgSlot::I8(out) => scan_int!(out),
        ArgSlot::I16(out) => scan_int!(out),
        ArgSlot::I32(out) => scan_int!(out),
        ArgSlot::I64(out) => scan_int!(out),
        ArgSlot::Isize(out) => scan_int!(out),
        ArgSlot::U8(out) => scan_int!(out),
        ArgSlot::U16(out) => scan_int!(out),
        ArgSlot::U32(out) => scan_int!(out),
        ArgSlot::U64(out) => scan_int!(out),
        ArgSlot::Usize(out) => scan_int!(out),
        ArgSlot::F32(out) => scan_float!(out),
        ArgSlot::F64(out) => scan_float!(out),
        ArgSlot::Bool(out) => {
            let reader = BoolReader::parse(field.spec, field.spec_offset)?;
            reader.scan(out, ctx)
        },
        ArgSlot::Char(out) => {
            let reader = CharReader::parse(field.spec, field.spec_offset)?;
            reader.scan(out, ctx)
        },
        ArgSlot::Str(out) => {
            let reader = StringReader::parse(field.spec, field.spec_offset)?;
            reader.scan(out, ctx)
        },
        ArgSlot::StrView(out) => {
            let reader = StringReader::parse(field.spec, field.spec_offset)?;
            reader.scan_view(out, ctx)
        },
        ArgSlot::Custom(scanner) => {
            scanner.parse(field.spec, field.spec_offset)?;
            scanner.scan(ctx)
        },
    }
}

/// Types with a default-format single-value read.
pub trait ScanValue: Sized {
    /// Scan one value with the default (empty) specifier.
    fn scan_default(ctx: &mut ScanContext<'_, '_>) -> Result<Self>;
}

macro_rules! impl_scan_value_int {
    ($($ty:ty),* $(,)?) => {$(
        impl ScanValue for $ty {
            fn scan_default(ctx: &mut ScanContext<'_, '_>) -> Result<Self> {
                let mut value: $ty = 0;
                IntReader::parse("", 0)?.scan(&mut value, ctx)?;
                Ok(value)
            }
        }
    )*};
}
impl_scan_value_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! impl_scan_value_float {
    ($($ty:ty),* $(,)?) => {$(
        impl ScanValue for $ty {
            fn scan_default(ctx: &mut ScanContext<'_, '_>) -> Result<Self> {
                let mut value: $ty = 0.0;
                FloatReader::parse("", 0)?.scan(&mut value, ctx)?;
                Ok(value)
            }
        }
    )*};
}
impl_scan_value_float!(f32, f64);

impl ScanValue for bool {
    fn scan_default(ctx: &mut ScanContext<'_, '_>) -> Result<Self> {
        let mut value = false;
        BoolReader::parse("", 0)?.scan(&mut value, ctx)?;
        Ok(value)
    }
}

impl ScanValue for char {
    fn scan_default(ctx: &mut ScanContext<'_, '_>) -> Result<Self> {
        let mut value = '\0';
        CharReader::parse("", 0)?.scan(&mut value, ctx)?;
        Ok(value)
    }
}

impl ScanValue for String {
    fn scan_default(ctx: &mut ScanContext<'_, '_>) -> Result<Self> {
        let mut value = String::new();
        StringReader::parse("", 0)?.scan(&mut value, ctx)?;
        Ok(value)
    }
}

/// Scan a single value with its default format.
///
/// # Examples
///
/// ```
/// let (value, rest) = scan_oxide::scan_value::<i32>("42 tail").unwrap();
/// assert_eq!(value, 42);
/// assert_eq!(rest, " tail");
/// ```
pub fn scan_value<T: ScanValue>(input: &str) -> std::result::Result<(T, &str), ScanError> {
    let locale = LocaleFacet::Classic;
    let mut source = StrSource::new(input);
    source.set_rollback_point();
    let mut ctx = ScanContext::new(&mut source, &locale);
    match T::scan_default(&mut ctx) {
        Ok(value) => Ok((value, source.tail())),
        Err(error) => Err(ScanError {
            error,
            scanned: 0,
            position: source.position(),
        }),
    }
}

/// Scan `input` with `format`, naming the output variables directly.
///
/// Expands to a [`scan`] call with an argument store built from `&mut`
/// references to the named bindings.
///
/// ```
/// let mut count = 0i32;
/// let mut label = String::new();
/// scan_oxide::scan!("7 axle", "{} {}", count, label).unwrap();
/// assert_eq!((count, label.as_str()), (7, "axle"));
/// ```
#[macro_export]
macro_rules! scan {
    ($input:expr, $fmt:expr, $($arg:ident),+ $(,)?) => {
        $crate::scan($input, $fmt, &mut $crate::scan_args![$(&mut $arg),+])
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::CustomScan;
    use crate::scan_args;

    // ========================================================================
    // Driver Tests
    // ========================================================================

    #[test]
    fn test_scan_three_values() {
        let mut count = 0i32;
        let mut word = String::new();
        let mut ratio = 0.0f64;
        let result = scan(
            "42 foo 3.14",
            "{} {} {}",
            &mut scan_args![&mut count, &mut word, &mut ratio],
        )
        .unwrap();
        assert_eq!(result.scanned, 3);
        assert_eq!(result.remaining, "");
        assert_eq!(count, 42);
        assert_eq!(word, "foo");
        assert_eq!(ratio, 3.14);
    }

    #[test]
    fn test_scan_literal_matching() {
        let mut value = 0u32;
        let result = scan("id=99;", "id={};", &mut scan_args![&mut value]).unwrap();
        assert_eq!(value, 99);
        assert_eq!(result.remaining, "");
    }

    #[test]
    fn test_scan_literal_mismatch() {
        let mut value = 0u32;
        let err = scan("id:99", "id={}", &mut scan_args![&mut value]).unwrap_err();
        assert!(matches!(err.error, Error::InvalidScannedValue(_)));
        assert_eq!(err.scanned, 0);
        assert_eq!(err.position, 2);
    }

    #[test]
    fn test_scan_whitespace_matches_zero_or_more() {
        let mut a = 0i32;
        let mut b = 0i32;
        let result = scan("1        2", "{} {}", &mut scan_args![&mut a, &mut b]).unwrap();
        assert_eq!((a, b), (1, 2));
        assert_eq!(result.remaining, "");
        // and zero input whitespace is fine too
        let result = scan("3 4", "{}  \t {}", &mut scan_args![&mut a, &mut b]).unwrap();
        assert_eq!((a, b), (3, 4));
        assert_eq!(result.remaining, "");
    }

    #[test]
    fn test_scan_brace_escape_literals() {
        let mut value = 0i32;
        let result = scan("{5}", "{{{}}}", &mut scan_args![&mut value]).unwrap();
        assert_eq!(value, 5);
        assert_eq!(result.remaining, "");
    }

    #[test]
    fn test_scan_partial_failure_keeps_count() {
        let mut a = 0i32;
        let mut b = 0i32;
        let err = scan("12 x", "{} {}", &mut scan_args![&mut a, &mut b]).unwrap_err();
        assert_eq!(err.scanned, 1);
        assert!(matches!(err.error, Error::InvalidScannedValue(_)));
        assert_eq!(a, 12);
        assert_eq!(b, 0); // untouched
        assert_eq!(err.position, 3);
    }

    #[test]
    fn test_scan_end_of_range_mid_format() {
        let mut a = 0i32;
        let mut b = 0i32;
        let err = scan("12", "{} {}", &mut scan_args![&mut a, &mut b]).unwrap_err();
        assert_eq!(err.error, Error::EndOfRange);
        assert_eq!(err.scanned, 1);
    }

    #[test]
    fn test_scan_argument_count_mismatch() {
        let mut a = 0i32;
        let err = scan("1 2", "{} {}", &mut scan_args![&mut a]).unwrap_err();
        assert!(matches!(err.error, Error::InvalidFormatString { .. }));
    }

    #[test]
    fn test_scan_explicit_indices() {
        let mut first = String::new();
        let mut second = String::new();
        scan(
            "alpha beta",
            "{1} {0}",
            &mut scan_args![&mut second, &mut first],
        )
        .unwrap();
        assert_eq!(first, "alpha");
        assert_eq!(second, "beta");
    }

    #[test]
    fn test_scan_overflow_leaves_input_unconsumed() {
        let mut value = 0i32;
        let err = scan("2147483648", "{}", &mut scan_args![&mut value]).unwrap_err();
        assert!(matches!(err.error, Error::ValueOutOfRange(_)));
        assert_eq!(err.scanned, 0);
        assert_eq!(err.position, 0);
        assert_eq!(value, 0);
    }

    #[test]
    fn test_scan_empty_format() {
        let mut args = ArgStore::new(vec![]);
        let result = scan("tail", "", &mut args).unwrap();
        assert_eq!(result.scanned, 0);
        assert_eq!(result.remaining, "tail");
    }

    // ========================================================================
    // Entry-Point Tests
    // ========================================================================

    #[test]
    fn test_scan_value_convenience() {
        let (value, rest) = scan_value::<u32>("0xBAD1DEA").unwrap();
        assert_eq!(value, 0x0BAD_1DEA);
        assert_eq!(rest, "");
        let (value, rest) = scan_value::<String>("  hi there").unwrap();
        assert_eq!(value, "hi");
        assert_eq!(rest, " there");
    }

    #[test]
    fn test_scan_localized_entry() {
        use crate::locale::CustomLocale;
        let finnish = CustomLocale::new().with_decimal_point(',').build();
        let mut value = 0.0f64;
        let result =
            scan_localized(&finnish, "3,14", "{:L}", &mut scan_args![&mut value]).unwrap();
        assert_eq!(value, 3.14);
        assert_eq!(result.remaining, "");
    }

    #[test]
    fn test_vscan_over_forward_range() {
        use crate::range::IterSource;
        let units: Vec<Result<u8>> = "5 ok".bytes().map(Ok).collect();
        let mut range = IterSource::new(units.into_iter());
        let mut value = 0i32;
        let mut word = String::new();
        let scanned = vscan(
            &mut range,
            "{} {}",
            &mut scan_args![&mut value, &mut word],
        )
        .unwrap();
        assert_eq!(scanned, 2);
        assert_eq!((value, word.as_str()), (5, "ok"));
    }

    #[test]
    fn test_scan_macro() {
        let mut a = 0i64;
        let mut b = String::new();
        let result = crate::scan!("10 ten", "{} {}", a, b).unwrap();
        assert_eq!(result.scanned, 2);
        assert_eq!((a, b.as_str()), (10, "ten"));
    }

    // ========================================================================
    // Custom Scanner Tests
    // ========================================================================

    struct Point {
        x: i32,
        y: i32,
    }

    impl CustomScan for Point {
        fn scan(&mut self, ctx: &mut ScanContext<'_, '_>) -> Result<()> {
            let (mut x, mut y) = (0i32, 0i32);
            scan_usertype(ctx, "({},{})", &mut scan_args![&mut x, &mut y])?;
            self.x = x;
            self.y = y;
            Ok(())
        }
    }

    #[test]
    fn test_custom_scan_reenters_driver() {
        let mut point = Point { x: 0, y: 0 };
        let result = scan(
            "(3,-7) rest",
            "{}",
            &mut ArgStore::new(vec![ArgSlot::Custom(&mut point)]),
        )
        .unwrap();
        assert_eq!(result.scanned, 1);
        assert_eq!((point.x, point.y), (3, -7));
        assert_eq!(result.remaining, " rest");
    }

    #[test]
    fn test_custom_scan_rejects_spec_by_default() {
        let mut point = Point { x: 0, y: 0 };
        let err = scan(
            "(1,2)",
            "{:d}",
            &mut ArgStore::new(vec![ArgSlot::Custom(&mut point)]),
        )
        .unwrap_err();
        assert!(matches!(err.error, Error::InvalidFormatString { .. }));
    }
}
