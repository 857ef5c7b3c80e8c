//! Extraction Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// An extraction error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Not a single region heading was found; the page layout has most
    /// likely changed upstream.
    #[display("could not find any region headings in the document")]
    NoHeadings,
    /// Headings exist, but none of them is followed by a table with at
    /// least one named unit.
    #[display("no region data found in the document")]
    NoData,
    /// Anything else that went wrong while walking the document tree.
    #[display("unexpected document structure: {_0}")]
    Unexpected(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // The same document always extracts the same way.
        false
    }
}
