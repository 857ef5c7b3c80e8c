//! Scripted document source for testing.

use super::DocumentSource;
use crate::Document;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

const MOCK_URL: &str = "mock://source";

/// One scripted answer of a [`MockSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockResponse {
    /// `200 OK` with the given body.
    Body(String),
    /// A non-2xx status.
    Status(u16),
    /// A transport failure with the given reason.
    Unreachable(String),
    /// Wait before answering with the inner response.
    Delayed(Duration, Box<MockResponse>),
}
impl MockResponse {
    pub fn body(body: impl Into<String>) -> Self {
        Self::Body(body.into())
    }

    pub fn unreachable(reason: impl Into<String>) -> Self {
        Self::Unreachable(reason.into())
    }

    pub fn after(self, delay: Duration) -> Self {
        Self::Delayed(delay, Box::new(self))
    }
}

/// In-memory document source for testing.
///
/// Answers calls to [`fetch()`](DocumentSource::fetch) with scripted
/// responses, in order. Once the script is down to its last response, that
/// response is repeated forever; an empty script always answers
/// [`ErrorKind::Unreachable`].
///
/// # Examples
///
/// ```
/// use civic_fetch::{DocumentSource, MockResponse, MockSource};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let source = MockSource::with_responses([
///     MockResponse::unreachable("connection refused"),
///     MockResponse::body("<html>...</html>"),
/// ]);
/// assert!(source.fetch().await.is_err());
/// assert_eq!(source.fetch().await.unwrap().body, "<html>...</html>");
/// assert_eq!(source.fetch().await.unwrap().body, "<html>...</html>");
/// assert_eq!(source.calls(), 3);
/// # }
/// ```
#[derive(Debug)]
pub struct MockSource {
    name: String,
    script: Mutex<VecDeque<MockResponse>>,
    calls: AtomicUsize,
}

impl MockSource {
    pub fn with_responses(responses: impl IntoIterator<Item = MockResponse>) -> Self {
        Self {
            name: "mock".to_string(),
            script: Mutex::new(responses.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    /// A source that always answers with `body`.
    pub fn always(body: impl Into<String>) -> Self {
        Self::with_responses([MockResponse::body(body)])
    }

    /// Append responses to the end of the script.
    pub async fn push(&self, responses: impl IntoIterator<Item = MockResponse>) {
        self.script.lock().await.extend(responses);
    }

    /// Replace the whole script.
    pub async fn replace(&self, responses: impl IntoIterator<Item = MockResponse>) {
        *self.script.lock().await = responses.into_iter().collect();
    }

    /// Number of times [`fetch()`](DocumentSource::fetch) has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn next(&self) -> Option<MockResponse> {
        let mut script = self.script.lock().await;
        if script.len() > 1 { script.pop_front() } else { script.front().cloned() }
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::with_responses([])
    }
}

#[async_trait]
impl DocumentSource for MockSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn url(&self) -> &str {
        MOCK_URL
    }

    async fn fetch(&self) -> Result<Document> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // Take the response before sleeping, so that the script is consumed
        // in call order even when responses are delayed.
        let mut response = self.next().await;
        loop {
            match response {
                Some(MockResponse::Delayed(delay, inner)) => {
                    tokio::time::sleep(delay).await;
                    response = Some(*inner);
                },
                Some(MockResponse::Body(body)) => {
                    return Ok(Document {
                        url: MOCK_URL.to_string(),
                        status: 200,
                        body,
                    });
                },
                Some(MockResponse::Status(status)) => exn::bail!(ErrorKind::status(status)),
                Some(MockResponse::Unreachable(reason)) => exn::bail!(ErrorKind::Unreachable(reason)),
                None => exn::bail!(ErrorKind::Unreachable("mock script is empty".to_string())),
            }
        }
    }
}
