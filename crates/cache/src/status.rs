use crate::error::ErrorKind;
use derive_more::Display;
use time::UtcDateTime;

/// Lifecycle of a cache: it starts [`Empty`](Self::Empty) and becomes
/// [`Fresh`](Self::Fresh) with the first successful refresh, for good.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheState {
    /// No snapshot has ever been stored.
    #[display("empty")]
    Empty,
    /// A snapshot is held (possibly stale, see [`CacheStatus::last_error`]).
    #[display("fresh")]
    Fresh,
}

/// A failed refresh, as remembered by the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: ErrorKind,
    pub at: UtcDateTime,
}

/// Point-in-time description of a cache, for health reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStatus {
    pub state: CacheState,
    /// When the held snapshot was extracted.
    pub extracted_at: Option<UtcDateTime>,
    /// BLAKE3 hash of the document behind the held snapshot.
    pub hash: Option<String>,
    pub regions: usize,
    pub units: usize,
    /// Most recent failed refresh, cleared by the next successful one. While
    /// this is set and a snapshot is held, that snapshot is being served stale.
    pub last_error: Option<Failure>,
}
impl CacheStatus {
    /// Returns `true` if the held snapshot is being served in place of a
    /// newer one that failed to load.
    pub fn is_stale(&self) -> bool {
        self.state == CacheState::Fresh && self.last_error.is_some()
    }
}
