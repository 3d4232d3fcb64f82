//! Error types for filter parsing.

use thiserror::Error;

/// Filter parsing result type.
pub type Result<T> = std::result::Result<T, FilterParseError>;

/// Errors raised while parsing a filter expression.
///
/// Hosts treat every variant the same way: discard the candidate, keep the
/// previously valid filter, flag the input as invalid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterParseError {
    #[error("empty key")]
    EmptyKey,

    #[error("empty value")]
    EmptyValue,

    #[error("expected == or !=")]
    ExpectedComparator,

    #[error("expected \" at end of value")]
    UnclosedQuote,

    #[error("expected )")]
    UnclosedGroup,

    /// The grammar stopped before the end of the input.
    #[error("failed to parse filter string (left: {0})")]
    TrailingInput(String),
}
