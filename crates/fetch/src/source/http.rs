//! HTTP(S) document source.

use super::DocumentSource;
use crate::error::{ErrorKind, Result};
use crate::{DEFAULT_USER_AGENT, Document};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::redirect::Policy;
use std::time::Duration;
use tracing::instrument;

const MAX_REDIRECTS: usize = 10;

/// Settings of the HTTP client behind an [`HttpSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    pub user_agent: String,
    /// Skip TLS certificate validation. Only for sources known to serve a
    /// broken certificate chain.
    pub accept_invalid_certs: bool,
}
impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_invalid_certs: false,
        }
    }
}

/// Fetches the document with a single HTTP GET.
///
/// The timeout covers the whole exchange (connect, headers and body), so a
/// hung source can never stall a caller for longer than that.
#[derive(Debug, Clone)]
pub struct HttpSource {
    name: String,
    url: String,
    timeout: Duration,
    client: Client,
}

impl HttpSource {
    /// Create a source for `url` using the default user agent.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Self::with_user_agent(url, timeout, DEFAULT_USER_AGENT)
    }

    pub fn with_user_agent(url: impl Into<String>, timeout: Duration, user_agent: &str) -> Result<Self> {
        let options = ClientOptions {
            user_agent: user_agent.to_string(),
            ..ClientOptions::default()
        };
        Self::with_options(url, timeout, &options)
    }

    pub fn with_options(url: impl Into<String>, timeout: Duration, options: &ClientOptions) -> Result<Self> {
        let url = url.into();
        if options.accept_invalid_certs {
            tracing::warn!(%url, "TLS certificate validation is disabled for this source");
        }
        let client = Client::builder()
            .user_agent(options.user_agent.as_str())
            .timeout(timeout)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .danger_accept_invalid_certs(options.accept_invalid_certs)
            .build()
            .map_err(ErrorKind::transport)?;
        Ok(Self::with_client(url, timeout, client))
    }

    /// Use a preconfigured client (proxies, custom roots, ...). The timeout
    /// is still applied to every request.
    pub fn with_client(url: impl Into<String>, timeout: Duration, client: Client) -> Self {
        Self {
            name: "http".to_string(),
            url: url.into(),
            timeout,
            client,
        }
    }

    /// Change the name of the source.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn url(&self) -> &str {
        &self.url
    }

    #[instrument(skip(self), fields(source = %self.name, url = %self.url, status, bytes))]
    async fn fetch(&self) -> Result<Document> {
        let response = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(ErrorKind::transport)?;
        let status = response.status();
        tracing::Span::current().record("status", status.as_u16());
        if !status.is_success() {
            exn::bail!(ErrorKind::status(status.as_u16()));
        }
        let url = response.url().to_string();
        let body = response.text().await.map_err(ErrorKind::transport)?;
        tracing::Span::current().record("bytes", body.len());
        tracing::debug!("Fetched source document");
        Ok(Document {
            url,
            status: status.as_u16(),
            body,
        })
    }
}
