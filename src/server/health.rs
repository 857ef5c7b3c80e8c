//! Cache health reporting.
//!
//! Never refreshes and never fails: it describes what the API would serve
//! right now.

use axum::Json;
use axum::extract::State;
use civic_cache::{CacheState, CacheStatus, Failure};
use serde::Serialize;

use super::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Serving a snapshot from the latest refresh.
    Ok,
    /// Serving a held snapshot because the latest refresh failed.
    Degraded,
    /// Nothing has loaded yet.
    Empty,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub state: String,
    pub regions: usize,
    pub units: usize,
    pub extracted_at: Option<String>,
    pub hash: Option<String>,
    pub last_error: Option<LastError>,
    pub version: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct LastError {
    pub kind: &'static str,
    pub detail: String,
    pub at: String,
}

impl From<CacheStatus> for HealthResponse {
    fn from(status: CacheStatus) -> Self {
        let health = match (status.state, &status.last_error) {
            (CacheState::Empty, _) => HealthStatus::Empty,
            (CacheState::Fresh, Some(_)) => HealthStatus::Degraded,
            (CacheState::Fresh, None) => HealthStatus::Ok,
        };
        Self {
            status: health,
            state: status.state.to_string(),
            regions: status.regions,
            units: status.units,
            extracted_at: status.extracted_at.map(|at| at.to_string()),
            hash: status.hash,
            last_error: status.last_error.map(LastError::from),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

impl From<Failure> for LastError {
    fn from(failure: Failure) -> Self {
        Self {
            kind: failure.kind.code(),
            detail: failure.kind.to_string(),
            at: failure.at.to_string(),
        }
    }
}

pub async fn health(State(cache): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::from(cache.status().await))
}
