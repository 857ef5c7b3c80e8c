//! Fetch Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::error::Error as StdError;

/// A fetch error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for fetch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The source could not be reached at all: DNS, refused connection,
    /// TLS, timeout, or the body could not be read.
    #[display("source unreachable: {_0}")]
    Unreachable(#[error(not(source))] String),
    /// The source answered, but not with a 2xx status.
    #[display("source responded with HTTP {status}: {reason}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase for the status.
        reason: String,
    },
}

impl ErrorKind {
    /// Wrap a transport error, preserving it as a child frame in the error tree.
    #[track_caller]
    pub fn transport(err: reqwest::Error) -> Error {
        let reason = describe(&err);
        exn::Exn::new(err).raise(ErrorKind::Unreachable(reason))
    }

    /// Build an [`HttpStatus`](Self::HttpStatus) from a status code.
    pub fn status(status: u16) -> Self {
        let reason = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("unknown status")
            .to_string();
        Self::HttpStatus { status, reason }
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Unreachable(_) => true,
            Self::HttpStatus { status, .. } => *status == 429 || *status >= 500,
        }
    }
}

/// Flattens an error and its sources into one line, since the top-level
/// message of a transport error rarely says *why* the request failed.
fn describe(err: &reqwest::Error) -> String {
    let mut message = if err.is_timeout() {
        "request timed out".to_string()
    } else {
        err.to_string()
    };
    let mut source = err.source();
    while let Some(inner) = source {
        let inner_message = inner.to_string();
        if !message.contains(&inner_message) {
            message.push_str(": ");
            message.push_str(&inner_message);
        }
        source = inner.source();
    }
    message
}
