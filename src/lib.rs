//! Province and constituency directory for the National Assembly of Zambia.
//!
//! The listing page is fetched and parsed on demand by the workspace crates;
//! this crate wires them into an HTTP API and a command-line tool.
//!
//! - [`civic_fetch`] retrieves the page,
//! - [`civic_extract`] turns it into a [`RegionMap`](civic_extract::models::RegionMap),
//! - [`civic_cache`] keeps the last good snapshot,
//! - [`query`] answers lookups against a snapshot,
//! - [`server`] exposes those lookups over HTTP.

pub mod error;
pub mod logging;
pub mod query;
pub mod server;

use civic_cache::ResilientCache;
use civic_config::Config;
use civic_fetch::{ClientOptions, HttpSource, SourceHandle};
use exn::ResultExt;
use std::sync::Arc;

use crate::error::{ErrorKind, Result};

/// The HTTP source described by `config`.
pub fn source(config: &Config) -> Result<SourceHandle> {
    let options = ClientOptions {
        user_agent: config.source.user_agent.clone().unwrap_or_else(|| civic_fetch::DEFAULT_USER_AGENT.to_string()),
        accept_invalid_certs: config.source.accept_invalid_certs,
    };
    let source = HttpSource::with_options(&config.source.url, config.source.timeout(), &options)
        .or_raise(|| ErrorKind::Source)?;
    Ok(Arc::new(source))
}

/// A cold cache over the HTTP source described by `config`.
pub fn cache(config: &Config) -> Result<ResilientCache> {
    Ok(ResilientCache::new(source(config)?).with_min_refresh_interval(config.cache.min_refresh_interval()))
}
