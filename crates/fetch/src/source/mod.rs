//! Document source trait and implementations.
//!
//! A [`DocumentSource`] knows where the listing page lives and how to get it.
//! Production code uses [`HttpSource`]; tests in other crates can enable the
//! `mock` feature and script responses with `MockSource`.

mod http;
#[cfg(feature = "mock")]
mod mock;

pub use self::http::{ClientOptions, HttpSource};
#[cfg(feature = "mock")]
pub use self::mock::{MockResponse, MockSource};
use crate::Document;
use crate::error::Result;
use async_trait::async_trait;

/// Anything that can produce the raw listing document.
///
/// Implementations perform exactly one retrieval attempt per call to
/// [`fetch()`](Self::fetch). Retrying, if wanted, is up to the caller.
///
/// # Examples
///
/// ```
/// use civic_fetch::{DocumentSource, error::Result};
///
/// async fn body_length(source: &dyn DocumentSource) -> Result<usize> {
///     let document = source.fetch().await?;
///     Ok(document.body.len())
/// }
/// ```
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Name of the source, used for logging only.
    fn name(&self) -> &str;

    /// Location the document is retrieved from.
    fn url(&self) -> &str;

    /// Retrieve the document.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::Unreachable`](crate::error::ErrorKind::Unreachable) on
    ///   transport failures, including timeouts,
    /// - [`ErrorKind::HttpStatus`](crate::error::ErrorKind::HttpStatus) on any
    ///   non-2xx response.
    async fn fetch(&self) -> Result<Document>;
}
