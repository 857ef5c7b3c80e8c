//! Refresh-with-fallback cache of the latest snapshot.

use civic_extract::models::Snapshot;
use civic_fetch::SourceHandle;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use time::UtcDateTime;
use tokio::sync::RwLock;
use tracing::instrument;

use crate::error::{Error, ErrorKind, Result};
use crate::status::{CacheState, CacheStatus, Failure};

/// The held snapshot and the refresh that produced it.
#[derive(Debug)]
struct Entry {
    snapshot: Arc<Snapshot>,
    ticket: u64,
    refreshed_at: Instant,
}

#[derive(Debug, Default)]
struct State {
    current: Option<Entry>,
    last_error: Option<(u64, Failure)>,
}
impl State {
    /// Ticket of the refresh behind the held snapshot, zero when empty.
    fn ticket(&self) -> u64 {
        self.current.as_ref().map_or(0, |entry| entry.ticket)
    }
}

/// Holds the most recent successfully extracted [`Snapshot`].
///
/// Every call to [`get_current()`](Self::get_current) attempts a refresh
/// (fetch, then extract). A successful refresh replaces the held snapshot; a
/// failed one falls back to the held snapshot without surfacing the error.
/// Only when nothing has ever been loaded does the failure reach the caller.
///
/// The lock is never held across the fetch. Each refresh takes a ticket
/// before it starts, and its result is only adopted if no refresh that
/// started later has already been adopted; a slow response can never replace
/// a newer one.
///
/// Construct it once and share it (it is `Send + Sync`, wrap it in an
/// [`Arc`]).
pub struct ResilientCache {
    source: SourceHandle,
    min_refresh_interval: Duration,
    tickets: AtomicU64,
    state: RwLock<State>,
}

impl std::fmt::Debug for ResilientCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientCache")
            .field("source", &self.source.name())
            .field("min_refresh_interval", &self.min_refresh_interval)
            .finish_non_exhaustive()
    }
}

impl ResilientCache {
    pub fn new(source: SourceHandle) -> Self {
        Self {
            source,
            min_refresh_interval: Duration::ZERO,
            tickets: AtomicU64::new(0),
            state: RwLock::new(State::default()),
        }
    }

    /// Serve the held snapshot without refetching while it is younger than
    /// `interval`. The default of zero refetches on every call.
    pub fn with_min_refresh_interval(mut self, interval: Duration) -> Self {
        self.min_refresh_interval = interval;
        self
    }

    /// Returns the current snapshot, refreshing it first.
    ///
    /// # Errors
    ///
    /// Only when the refresh fails *and* no snapshot has ever been loaded;
    /// the error carries the category of the failure.
    #[instrument(skip(self), fields(source = self.source.name()))]
    pub async fn get_current(&self) -> Result<Arc<Snapshot>> {
        if let Some(recent) = self.recent().await {
            tracing::trace!("Serving snapshot within the minimum refresh interval");
            return Ok(recent);
        }
        let ticket = self.tickets.fetch_add(1, Ordering::SeqCst) + 1;
        match self.refresh().await {
            Ok(snapshot) => Ok(self.adopt(ticket, snapshot).await),
            Err(err) => self.fall_back(ticket, err).await,
        }
    }

    /// The held snapshot, without attempting a refresh.
    pub async fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.state.read().await.current.as_ref().map(|entry| entry.snapshot.clone())
    }

    pub async fn state(&self) -> CacheState {
        match self.state.read().await.current {
            Some(_) => CacheState::Fresh,
            None => CacheState::Empty,
        }
    }

    pub async fn status(&self) -> CacheStatus {
        let state = self.state.read().await;
        let snapshot = state.current.as_ref().map(|entry| &entry.snapshot);
        CacheStatus {
            state: if snapshot.is_some() { CacheState::Fresh } else { CacheState::Empty },
            extracted_at: snapshot.map(|s| s.extracted_at),
            hash: snapshot.map(|s| s.hash.clone()),
            regions: snapshot.map_or(0, |s| s.regions.len()),
            units: snapshot.map_or(0, |s| s.regions.unit_count()),
            last_error: state.last_error.as_ref().map(|(_, failure)| failure.clone()),
        }
    }

    async fn recent(&self) -> Option<Arc<Snapshot>> {
        if self.min_refresh_interval.is_zero() {
            return None;
        }
        let state = self.state.read().await;
        state
            .current
            .as_ref()
            .filter(|entry| entry.refreshed_at.elapsed() < self.min_refresh_interval)
            .map(|entry| entry.snapshot.clone())
    }

    async fn refresh(&self) -> Result<Snapshot> {
        let document = self.source.fetch().await.map_err(ErrorKind::fetch)?;
        civic_extract::snapshot(&document.body).map_err(ErrorKind::extract)
    }

    async fn adopt(&self, ticket: u64, snapshot: Snapshot) -> Arc<Snapshot> {
        let mut state = self.state.write().await;
        match &state.current {
            Some(current) if current.ticket > ticket => {
                tracing::debug!(ticket, current = current.ticket, "Discarding refresh overtaken by a newer one");
                return current.snapshot.clone();
            },
            Some(current) if current.snapshot.same_source(&snapshot) => {
                tracing::debug!(hash = %snapshot.hash, "Source document unchanged");
            },
            _ => tracing::info!(
                hash = %snapshot.hash,
                regions = snapshot.regions.len(),
                units = snapshot.regions.unit_count(),
                "Adopted new snapshot"
            ),
        }
        let snapshot = Arc::new(snapshot);
        state.current = Some(Entry {
            snapshot: snapshot.clone(),
            ticket,
            refreshed_at: Instant::now(),
        });
        if state.last_error.as_ref().is_some_and(|(failed, _)| *failed < ticket) {
            state.last_error = None;
        }
        snapshot
    }

    async fn fall_back(&self, ticket: u64, err: Error) -> Result<Arc<Snapshot>> {
        let mut state = self.state.write().await;
        // A failure that started before the held snapshot's refresh says
        // nothing about the held snapshot.
        if ticket > state.ticket() && state.last_error.as_ref().is_none_or(|(failed, _)| *failed < ticket) {
            state.last_error = Some((ticket, Failure { kind: (*err).clone(), at: UtcDateTime::now() }));
        }
        match &state.current {
            Some(current) => {
                tracing::warn!(
                    kind = err.code(),
                    error = %*err,
                    extracted_at = %current.snapshot.extracted_at,
                    "Refresh failed, serving held snapshot"
                );
                Ok(current.snapshot.clone())
            },
            None => {
                tracing::error!(kind = err.code(), error = %*err, "Refresh failed with nothing to fall back to");
                Err(err)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civic_fetch::{MockResponse, MockSource};
    use civic_fetch::error::ErrorKind as FetchErrorKind;
    use rstest::rstest;

    fn listing(regions: &[(&str, &[&str])]) -> String {
        let body: String = regions
            .iter()
            .map(|(region, units)| {
                let links: String = units.iter().map(|u| format!("<td><a href=\"#\">{u}</a></td>")).collect();
                format!("<h3>{region}</h3><table><tr>{links}</tr></table>")
            })
            .collect();
        format!(r#"<html><body><div class="view-content">{body}</div></body></html>"#)
    }

    fn eastern_western() -> String {
        listing(&[("Eastern", &["Chipata", "Petauke"]), ("Western", &["Mongu"])])
    }

    fn cache_with(source: MockSource) -> (Arc<MockSource>, ResilientCache) {
        let source = Arc::new(source);
        let cache = ResilientCache::new(source.clone());
        (source, cache)
    }

    #[tokio::test]
    async fn test_first_success_fills_cache() {
        let (source, cache) = cache_with(MockSource::always(eastern_western()));
        assert_eq!(cache.state().await, CacheState::Empty);
        assert!(cache.snapshot().await.is_none());

        let snapshot = cache.get_current().await.unwrap();
        assert_eq!(snapshot.regions.region_names().collect::<Vec<_>>(), ["Eastern", "Western"]);
        assert_eq!(cache.state().await, CacheState::Fresh);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_every_call_refetches_and_is_idempotent() {
        let (source, cache) = cache_with(MockSource::always(eastern_western()));
        let first = cache.get_current().await.unwrap();
        let second = cache.get_current().await.unwrap();
        let third = cache.get_current().await.unwrap();
        assert_eq!(first.regions, second.regions);
        assert_eq!(second.regions, third.regions);
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn test_new_content_replaces_snapshot() {
        let (_, cache) = cache_with(MockSource::with_responses([
            MockResponse::body(eastern_western()),
            MockResponse::body(listing(&[("Northern", &["Kasama"])])),
        ]));
        let first = cache.get_current().await.unwrap();
        let second = cache.get_current().await.unwrap();
        assert!(first.regions.contains_region("Eastern"));
        assert_eq!(second.regions.region_names().collect::<Vec<_>>(), ["Northern"]);
        assert!(!first.same_source(&second));
    }

    #[rstest]
    #[case(MockResponse::unreachable("connection refused"))]
    #[case(MockResponse::Status(503))]
    #[case(MockResponse::body("<html><body>Down for maintenance</body></html>"))]
    #[case(MockResponse::body(r#"<div class="view-content"><h3>Eastern</h3></div>"#))]
    #[tokio::test]
    async fn test_failure_falls_back_to_held_snapshot(#[case] failure: MockResponse) {
        let (_, cache) = cache_with(MockSource::with_responses([MockResponse::body(eastern_western()), failure]));
        let held = cache.get_current().await.unwrap();
        let served = cache.get_current().await.unwrap();
        assert!(Arc::ptr_eq(&held, &served));
        let status = cache.status().await;
        assert!(status.is_stale());
        assert_eq!(status.state, CacheState::Fresh);
    }

    #[rstest]
    #[case(MockResponse::unreachable("connection refused"), "unreachable")]
    #[case(MockResponse::Status(404), "unreachable")]
    #[case(MockResponse::body("<html><body>Down for maintenance</body></html>"), "no_headings")]
    #[case(MockResponse::body(r#"<div class="view-content"><h3>Eastern</h3></div>"#), "no_data")]
    #[tokio::test]
    async fn test_cold_start_failure_propagates(#[case] failure: MockResponse, #[case] code: &str) {
        let (_, cache) = cache_with(MockSource::with_responses([failure]));
        let err = cache.get_current().await.unwrap_err();
        assert_eq!(err.code(), code);
        assert_eq!(cache.state().await, CacheState::Empty);
        assert_eq!(cache.status().await.last_error.map(|f| f.kind.code()), Some(code));
    }

    #[tokio::test]
    async fn test_cold_start_keeps_status_code() {
        let (_, cache) = cache_with(MockSource::with_responses([MockResponse::Status(502)]));
        let err = cache.get_current().await.unwrap_err();
        assert_eq!(*err, ErrorKind::Unreachable(FetchErrorKind::status(502)));
    }

    #[tokio::test]
    async fn test_recovers_after_cold_start_failure() {
        let (_, cache) = cache_with(MockSource::with_responses([
            MockResponse::unreachable("dns"),
            MockResponse::body(eastern_western()),
        ]));
        assert!(cache.get_current().await.is_err());
        assert!(cache.get_current().await.is_ok());
        let status = cache.status().await;
        assert_eq!(status.state, CacheState::Fresh);
        assert!(status.last_error.is_none());
        assert_eq!(status.regions, 2);
        assert_eq!(status.units, 3);
    }

    #[tokio::test]
    async fn test_never_reverts_to_empty() {
        let (_, cache) = cache_with(MockSource::with_responses([
            MockResponse::body(eastern_western()),
            MockResponse::unreachable("dns"),
        ]));
        cache.get_current().await.unwrap();
        for _ in 0..3 {
            cache.get_current().await.unwrap();
            assert_eq!(cache.state().await, CacheState::Fresh);
        }
    }

    #[tokio::test]
    async fn test_slow_refresh_does_not_overwrite_newer_one() {
        let (_, cache) = cache_with(MockSource::with_responses([
            MockResponse::body(listing(&[("Old", &["Slow"])])).after(Duration::from_millis(100)),
            MockResponse::body(listing(&[("New", &["Fast"])])),
        ]));
        let slow = cache.get_current();
        let fast = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            cache.get_current().await
        };
        let (slow, fast) = tokio::join!(slow, fast);
        assert!(fast.unwrap().regions.contains_region("New"));
        // The slow refresh finished last but started first: it is discarded.
        assert!(slow.unwrap().regions.contains_region("New"));
        assert!(cache.snapshot().await.unwrap().regions.contains_region("New"));
    }

    #[tokio::test]
    async fn test_min_refresh_interval_skips_fetch() {
        let source = Arc::new(MockSource::always(eastern_western()));
        let cache = ResilientCache::new(source.clone()).with_min_refresh_interval(Duration::from_secs(3600));
        let first = cache.get_current().await.unwrap();
        let second = cache.get_current().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_min_refresh_interval_does_not_hide_cold_start() {
        let source = Arc::new(MockSource::with_responses([
            MockResponse::unreachable("dns"),
            MockResponse::body(eastern_western()),
        ]));
        let cache = ResilientCache::new(source.clone()).with_min_refresh_interval(Duration::from_secs(3600));
        assert!(cache.get_current().await.is_err());
        assert!(cache.get_current().await.is_ok());
        assert_eq!(source.calls(), 2);
    }
}
