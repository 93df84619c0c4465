//! Error types for the scanning library.
//!
//! This module defines all error types that can occur while parsing a format
//! string or scanning values out of a source range.

/// Result type alias for scanning library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during scanning.
///
/// Every error is either *recoverable* (the source range is left at a
/// well-defined position and can keep being used) or *fatal* (the range must
/// not be reused). See [`Error::is_recoverable`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[allow(clippy::enum_variant_names)] // "Invalid" prefix is intentional for clarity
pub enum Error {
    /// Reading past the end of the input
    #[error("End of input reached unexpectedly")]
    EndOfRange,

    /// Malformed format string, unknown specifier, argument-count mismatch,
    /// or mixed explicit/implicit argument indexing
    #[error("Invalid format string at byte {position}: {message}")]
    InvalidFormatString {
        /// Byte offset into the format string where the error occurred
        position: usize,
        /// Reason the format string was rejected
        message: String,
    },

    /// A reader matched no valid value at the current position
    #[error("Invalid scanned value: {0}")]
    InvalidScannedValue(String),

    /// Operation not supported by the source
    /// (e.g. a zero-copy string view over a non-contiguous range)
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Parsed number exceeds the target type's range
    #[error("Value out of range: {0}")]
    ValueOutOfRange(String),

    /// Caller passed a structurally invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The code-point decoder rejected the input
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// The source adapter reported a fatal I/O error; the range is unusable
    #[error("Unrecoverable source error: {0}")]
    UnrecoverableSourceError(String),

    /// Invariant violation inside the library; the range is unusable
    #[error("Unrecoverable internal error: {0}")]
    UnrecoverableInternalError(String),
}

impl Error {
    /// Can the source range be used again after this error?
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Error::UnrecoverableSourceError(_) | Error::UnrecoverableInternalError(_)
        )
    }

    /// Short name of the error kind (without data).
    pub fn kind_name(&self) -> &'static str {
        match self {
            Error::EndOfRange => "EndOfRange",
            Error::InvalidFormatString { .. } => "InvalidFormatString",
            Error::InvalidScannedValue(_) => "InvalidScannedValue",
            Error::InvalidOperation(_) => "InvalidOperation",
            Error::ValueOutOfRange(_) => "ValueOutOfRange",
            Error::InvalidArgument(_) => "InvalidArgument",
            Error::InvalidEncoding(_) => "InvalidEncoding",
            Error::UnrecoverableSourceError(_) => "UnrecoverableSourceError",
            Error::UnrecoverableInternalError(_) => "UnrecoverableInternalError",
        }
    }

    /// Build an `InvalidFormatString` error at a byte position.
    pub(crate) fn format(position: usize, message: impl Into<String>) -> Self {
        Error::InvalidFormatString {
            position,
            message: message.into(),
        }
    }
}

/// Error returned by the scan driver.
///
/// Carries the underlying [`Error`] plus how far the scan got: the number of
/// arguments that were fully scanned before the failure, and the byte
/// position in the input immediately after the last successful read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Scan failed after {scanned} argument(s) at input byte {position}: {error}")]
pub struct ScanError {
    /// The underlying error
    #[source]
    pub error: Error,
    /// Number of arguments fully scanned before the failure
    pub scanned: usize,
    /// Byte position in the input after the last successful read
    pub position: usize,
}

impl ScanError {
    /// Can the source range be used again after this error?
    pub fn is_recoverable(&self) -> bool {
        self.error.is_recoverable()
    }
}
