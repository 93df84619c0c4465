//! Forward-source behavior and the line/list helpers.

use scan_oxide::{
    getline, getline_with, ignore_until, scan_args, scan_list, scan_list_with, vscan, Error,
    IterSource, ListOptions, Result,
};

fn forward(text: &str) -> IterSource<std::vec::IntoIter<Result<u8>>> {
    let units: Vec<Result<u8>> = text.bytes().map(Ok).collect();
    IterSource::new(units.into_iter())
}

// ============================================================================
// Forward-Source Scanning
// ============================================================================

#[test]
fn test_vscan_copies_from_forward_source() {
    let mut range = forward("  123 abc 4.5");
    let mut count = 0i32;
    let mut word = String::new();
    let mut ratio = 0.0f64;
    let scanned = vscan(
        &mut range,
        "{} {} {}",
        &mut scan_args![&mut count, &mut word, &mut ratio],
    )
    .unwrap();
    assert_eq!(scanned, 3);
    assert_eq!((count, word.as_str(), ratio), (123, "abc", 4.5));
}

#[test]
fn test_forward_source_failed_field_recovers() {
    let mut range = forward("abc");
    let mut value = 0i32;
    let err = vscan(&mut range, "{}", &mut scan_args![&mut value]).unwrap_err();
    assert!(matches!(err.error, Error::InvalidScannedValue(_)));
    assert_eq!(err.position, 0);
    // The word was put back; a string scan still sees it
    let mut word = String::new();
    let scanned = vscan(&mut range, "{}", &mut scan_args![&mut word]).unwrap();
    assert_eq!(scanned, 1);
    assert_eq!(word, "abc");
}

#[test]
fn test_forward_source_string_view_is_invalid_operation() {
    let mut range = forward("hello");
    let mut view: &str = "";
    let err = vscan(&mut range, "{}", &mut scan_args![&mut view]).unwrap_err();
    assert!(matches!(err.error, Error::InvalidOperation(_)));
}

#[test]
fn test_forward_source_fatal_error_is_latched() {
    let units: Vec<Result<u8>> = vec![
        Ok(b'4'),
        Ok(b'2'),
        Err(Error::UnrecoverableSourceError("disk on fire".into())),
    ];
    let mut range = IterSource::new(units.into_iter());
    let mut value = 0i64;
    let err = vscan(&mut range, "{}", &mut scan_args![&mut value]).unwrap_err();
    assert!(matches!(err.error, Error::UnrecoverableSourceError(_)));
    assert!(!err.is_recoverable());
}

// ============================================================================
// List Scanning
// ============================================================================

#[test]
fn test_scan_list_mixed_spacing() {
    let mut values: Vec<i64> = Vec::new();
    let result = scan_list("1\t2\n3   4", &mut values).unwrap();
    assert_eq!(values, vec![1, 2, 3, 4]);
    assert_eq!(result.remaining, "");
}

#[test]
fn test_scan_list_separator_and_terminator() {
    let mut values: Vec<i32> = Vec::new();
    let options = ListOptions::new().with_separator(',').with_until(']');
    let result = scan_list_with("5, 6, 7] tail", &mut values, &options).unwrap();
    assert_eq!(values, vec![5, 6, 7]);
    assert_eq!(result.remaining, " tail");
}

#[test]
fn test_scan_list_floats() {
    let mut values: Vec<f64> = Vec::new();
    scan_list("0.5 1.5 -2.5", &mut values).unwrap();
    assert_eq!(values, vec![0.5, 1.5, -2.5]);
}

// ============================================================================
// Getline and Ignore
// ============================================================================

#[test]
fn test_getline_sequence() {
    let mut line = String::new();
    let first = getline("one\ntwo\nthree", &mut line).unwrap();
    assert_eq!(line, "one");
    let second = getline(first.remaining, &mut line).unwrap();
    assert_eq!(line, "two");
    let third = getline(second.remaining, &mut line).unwrap();
    assert_eq!(line, "three");
    assert_eq!(third.remaining, "");
}

#[test]
fn test_getline_delimiter_not_in_value() {
    let mut field = String::new();
    let result = getline_with("alpha|beta", &mut field, '|').unwrap();
    assert_eq!(field, "alpha");
    assert_eq!(result.remaining, "beta");
}

#[test]
fn test_ignore_until_then_scan() {
    let result = ignore_until("# comment\n42", '\n').unwrap();
    assert_eq!(result.remaining, "42");
    let (value, rest) = scan_oxide::scan_value::<i32>(result.remaining).unwrap();
    assert_eq!(value, 42);
    assert_eq!(rest, "");
}
