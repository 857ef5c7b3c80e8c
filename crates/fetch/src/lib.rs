//! Retrieval of the source document.
//!
//! One call, one request: nothing in this crate retries. Every failure is
//! reported as an [`ErrorKind`](crate::error::ErrorKind), so callers can
//! tell "the source didn't answer" from "the source answered badly".

pub mod error;
mod source;

#[cfg(feature = "mock")]
pub use crate::source::{MockResponse, MockSource};
pub use crate::source::{ClientOptions, DocumentSource, HttpSource};
use crate::error::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

pub type SourceHandle = Arc<dyn DocumentSource + Send + Sync>;

/// National Assembly of Zambia constituency listing.
pub const DEFAULT_URL: &str = "https://www.parliament.gov.zm/members/constituencies";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// A successfully retrieved document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Final URL, after redirects.
    pub url: String,
    /// HTTP status (always 2xx).
    pub status: u16,
    pub body: String,
}

/// Fetch `url` once, giving up after `timeout`.
#[instrument]
pub async fn fetch(url: &str, timeout: Duration) -> Result<Document> {
    HttpSource::new(url, timeout)?.fetch().await
}
