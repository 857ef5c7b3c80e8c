//! Query Error Types

use derive_more::{Display, Error};

/// A query error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for query operations.
pub type Result<T> = std::result::Result<T, Error>;

/// What a lookup was asked about.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    #[display("Province")]
    Region,
    #[display("Constituency")]
    Unit,
}

#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The name is well-formed but isn't in the current snapshot.
    #[display("{_0} not found")]
    NotFound(#[error(not(source))] Subject),
    /// The name is empty or only whitespace.
    #[display("{_0} name must not be blank")]
    InvalidInput(#[error(not(source))] Subject),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // A later snapshot could list the name, but not for the same request.
        false
    }
}
