//! Cache Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Errors from the fetch and extract
//! crates are re-raised into one of the categories below, keeping the
//! original error as a child frame.

use civic_extract::error::{Error as ExtractError, ErrorKind as ExtractErrorKind};
use civic_fetch::error::{Error as FetchError, ErrorKind as FetchErrorKind};
use derive_more::{Display, Error};

/// A cache error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The document could not be retrieved (transport failure, timeout or
    /// non-2xx status).
    #[display("{_0}")]
    Unreachable(#[error(not(source))] FetchErrorKind),
    /// The document has no region headings; the source layout has changed.
    #[display("could not find any region headings in the source document")]
    NoHeadings,
    /// The document has headings but no usable region data.
    #[display("no region data found in the source document")]
    NoData,
    /// The document could not be interpreted for any other reason.
    #[display("unexpected source document structure: {_0}")]
    Unexpected(#[error(not(source))] String),
}

impl ErrorKind {
    /// Re-raise a fetch error as [`Unreachable`](Self::Unreachable).
    #[track_caller]
    pub fn fetch(err: FetchError) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Unreachable(inner))
    }

    /// Re-raise an extraction error under the matching structural category.
    #[track_caller]
    pub fn extract(err: ExtractError) -> Error {
        let kind = match &*err {
            ExtractErrorKind::NoHeadings => ErrorKind::NoHeadings,
            ExtractErrorKind::NoData => ErrorKind::NoData,
            ExtractErrorKind::Unexpected(message) => ErrorKind::Unexpected(message.clone()),
        };
        err.raise(kind)
    }

    /// Stable machine-readable name of the category.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unreachable(_) => "unreachable",
            Self::NoHeadings => "no_headings",
            Self::NoData => "no_data",
            Self::Unexpected(_) => "unexpected",
        }
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Unreachable(inner) => inner.is_retryable(),
            // Same page, same result; only an upstream change fixes these.
            Self::NoHeadings | Self::NoData | Self::Unexpected(_) => false,
        }
    }
}
