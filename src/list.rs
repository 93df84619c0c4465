//! List and line scanning helpers.
//!
//! Conveniences layered on the readers: scanning a homogeneous sequence
//! into a collection, reading up to a delimiter, and discarding input
//! through a delimiter.

use crate::error::{Error, ScanError};
use crate::locale::LocaleFacet;
use crate::range::{SourceRange, StrSource};
use crate::readers::{peek_code_point, skip_whitespace, ScanContext};
use crate::scanner::{ScanResult, ScanValue};

/// Options for [`scan_list_with`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ListOptions {
    /// Code point separating elements. With `None`, elements are separated
    /// by whitespace only.
    pub separator: Option<char>,
    /// Code point terminating the list. The terminator is consumed.
    pub until: Option<char>,
}

impl ListOptions {
    /// Options with whitespace separation and no terminator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Separate elements with `separator` (plus surrounding whitespace).
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = Some(separator);
        self
    }

    /// Stop at (and consume) `until`.
    pub fn with_until(mut self, until: char) -> Self {
        self.until = Some(until);
        self
    }
}

/// Scan zero or more whitespace-separated values into `out`.
///
/// Stops at the end of input or at the first element that fails to scan;
/// a clean end is not an error.
///
/// # Examples
///
/// ```
/// let mut values: Vec<i32> = Vec::new();
/// let result = scan_oxide::scan_list("1 2 3", &mut values).unwrap();
/// assert_eq!(values, vec![1, 2, 3]);
/// assert_eq!(result.remaining, "");
/// ```
pub fn scan_list<'s, T: ScanValue>(
    input: &'s str,
    out: &mut Vec<T>,
) -> std::result::Result<ScanResult<'s>, ScanError> {
    scan_list_with(input, out, &ListOptions::new())
}

/// As [`scan_list`], with an element separator and/or a terminator.
pub fn scan_list_with<'s, T: ScanValue>(
    input: &'s str,
    out: &mut Vec<T>,
    options: &ListOptions,
) -> std::result::Result<ScanResult<'s>, ScanError> {
    let locale = LocaleFacet::Classic;
    let mut source = StrSource::new(input);
    let start_len = out.len();

    loop {
        let mut ctx = ScanContext::new(&mut source, &locale);
        if let Err(error) = skip_whitespace(&mut ctx) {
            return Err(list_error(error, out.len() - start_len, &source));
        }

        match peek_code_point(&mut source) {
            Err(Error::EndOfRange) => break,
            Err(error) => return Err(list_error(error, out.len() - start_len, &source)),
            Ok(ch) if options.until == Some(ch) => {
                source.advance(ch.len_utf8());
                break;
            },
            Ok(_) => {},
        }

        source.set_rollback_point();
        let mut ctx = ScanContext::new(&mut source, &locale);
        match T::scan_default(&mut ctx) {
            Ok(value) => out.push(value),
            Err(error) => return Err(list_error(error, out.len() - start_len, &source)),
        }

        if let Some(separator) = options.separator {
            // keep whitespace before a missing separator unconsumed
            source.set_rollback_point();
            let mut ctx = ScanContext::new(&mut source, &locale);
            if let Err(error) = skip_whitespace(&mut ctx) {
                return Err(list_error(error, out.len() - start_len, &source));
            }
            match peek_code_point(&mut source) {
                Ok(ch) if ch == separator => source.advance(ch.len_utf8()),
                // a missing separator ends the list
                _ => {
                    let _ = source.rollback();
                    break;
                },
            }
        }
    }

    Ok(ScanResult {
        scanned: out.len() - start_len,
        remaining: source.tail(),
    })
}

fn list_error(error: Error, scanned: usize, source: &StrSource<'_>) -> ScanError {
    ScanError {
        error,
        scanned,
        position: source.position(),
    }
}

/// Read input up to the next newline into `out`, consuming the newline.
///
/// The delimiter is not part of the value. Input that ends without a
/// delimiter yields the remaining text; an already-empty input is
/// `EndOfRange`.
pub fn getline<'s>(
    input: &'s str,
    out: &mut String,
) -> std::result::Result<ScanResult<'s>, ScanError> {
    getline_with(input, out, '\n')
}

/// As [`getline`], with an explicit delimiter.
pub fn getline_with<'s>(
    input: &'s str,
    out: &mut String,
    delimiter: char,
) -> std::result::Result<ScanResult<'s>, ScanError> {
    let mut source = StrSource::new(input);
    if source.peek().is_err() {
        return Err(ScanError {
            error: Error::EndOfRange,
            scanned: 0,
            position: 0,
        });
    }

    let line = match crate::readers::read_while(&mut source, None, |ch| ch != delimiter) {
        Ok(line) => line.into_owned(),
        Err(error) => {
            return Err(ScanError {
                error,
                scanned: 0,
                position: source.position(),
            });
        },
    };
    // consume the delimiter if the line did not end at end-of-input
    if source.peek().is_ok() {
        source.advance(delimiter.len_utf8());
    }

    *out = line;
    Ok(ScanResult {
        scanned: 1,
        remaining: source.tail(),
    })
}

/// Skip input up to and including `delimiter`.
///
/// Reaching the end of input without the delimiter consumes everything and
/// is not an error.
pub fn ignore_until(input: &str, delimiter: char) -> std::result::Result<ScanResult<'_>, ScanError> {
    let mut scratch = String::new();
    match getline_with(input, &mut scratch, delimiter) {
        Ok(result) => Ok(ScanResult {
            scanned: 0,
            remaining: result.remaining,
        }),
        Err(mut err) => {
            err.scanned = 0;
            Err(err)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // List Tests
    // ========================================================================

    #[test]
    fn test_scan_list_whitespace_separated() {
        let mut values: Vec<i32> = Vec::new();
        let result = scan_list("1 2 3  4", &mut values).unwrap();
        assert_eq!(values, vec![1, 2, 3, 4]);
        assert_eq!(result.scanned, 4);
        assert_eq!(result.remaining, "");
    }

    #[test]
    fn test_scan_list_empty_input() {
        let mut values: Vec<i32> = Vec::new();
        let result = scan_list("", &mut values).unwrap();
        assert!(values.is_empty());
        assert_eq!(result.scanned, 0);
    }

    #[test]
    fn test_scan_list_stops_at_bad_element() {
        let mut values: Vec<i32> = Vec::new();
        let err = scan_list("1 2 x 3", &mut values).unwrap_err();
        assert_eq!(values, vec![1, 2]);
        assert_eq!(err.scanned, 2);
        assert!(matches!(err.error, Error::InvalidScannedValue(_)));
    }

    #[test]
    fn test_scan_list_with_separator() {
        let mut values: Vec<i32> = Vec::new();
        let options = ListOptions::new().with_separator(',');
        let result = scan_list_with("10, 20,30 rest", &mut values, &options).unwrap();
        assert_eq!(values, vec![10, 20, 30]);
        assert_eq!(result.remaining, " rest");
    }

    #[test]
    fn test_scan_list_with_until() {
        let mut values: Vec<i32> = Vec::new();
        let options = ListOptions::new().with_until(';');
        let result = scan_list_with("7 8 ; 9", &mut values, &options).unwrap();
        assert_eq!(values, vec![7, 8]);
        // the terminator is consumed
        assert_eq!(result.remaining, " 9");
    }

    #[test]
    fn test_scan_list_of_strings() {
        let mut words: Vec<String> = Vec::new();
        scan_list("lorem ipsum dolor", &mut words).unwrap();
        assert_eq!(words, vec!["lorem", "ipsum", "dolor"]);
    }

    // ========================================================================
    // Getline Tests
    // ========================================================================

    #[test]
    fn test_getline_consumes_delimiter() {
        let mut line = String::new();
        let result = getline("first\nsecond", &mut line).unwrap();
        assert_eq!(line, "first");
        assert_eq!(result.remaining, "second");
    }

    #[test]
    fn test_getline_without_trailing_delimiter() {
        let mut line = String::new();
        let result = getline("only line", &mut line).unwrap();
        assert_eq!(line, "only line");
        assert_eq!(result.remaining, "");
    }

    #[test]
    fn test_getline_empty_line() {
        let mut line = String::new();
        let result = getline("\nrest", &mut line).unwrap();
        assert_eq!(line, "");
        assert_eq!(result.remaining, "rest");
    }

    #[test]
    fn test_getline_empty_input_is_end_of_range() {
        let mut line = String::new();
        let err = getline("", &mut line).unwrap_err();
        assert_eq!(err.error, Error::EndOfRange);
    }

    #[test]
    fn test_getline_custom_delimiter() {
        let mut field = String::new();
        let result = getline_with("a;b;c", &mut field, ';').unwrap();
        assert_eq!(field, "a");
        assert_eq!(result.remaining, "b;c");
    }

    // ========================================================================
    // Ignore Tests
    // ========================================================================

    #[test]
    fn test_ignore_until() {
        let result = ignore_until("skip this: keep", ':').unwrap();
        assert_eq!(result.remaining, " keep");
    }

    #[test]
    fn test_ignore_until_missing_delimiter_consumes_all() {
        let result = ignore_until("no delimiter here", ':').unwrap();
        assert_eq!(result.remaining, "");
    }
}
