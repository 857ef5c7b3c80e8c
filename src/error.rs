//! Application Error Types
//!
//! Errors raised by the command-line entry points. Library errors are
//! re-raised into one of these categories, so the printed error tree reads
//! from what the command was doing down to the root cause.

use derive_more::{Display, Error};
use std::net::SocketAddr;
use std::path::PathBuf;

/// An application error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for application operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("could not set up the document source")]
    Source,
    #[display("could not fetch the source document")]
    Fetch,
    #[display("could not read {}", _0.display())]
    Read(#[error(not(source))] PathBuf),
    #[display("could not extract regions from the document")]
    Extract,
    #[display("could not listen on {_0}")]
    Bind(#[error(not(source))] SocketAddr),
    #[display("HTTP server failed")]
    Serve,
    #[display("could not write output")]
    Output,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Fetch | Self::Bind(_))
    }
}
