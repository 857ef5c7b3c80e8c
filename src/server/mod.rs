//! JSON HTTP API over the resilient cache.
//!
//! | Route                              | Body                                   |
//! |------------------------------------|----------------------------------------|
//! | `GET /api/provinces`               | sorted region names                    |
//! | `GET /api/constituencies`          | sorted unit names, all regions         |
//! | `GET /api/constituencies/:province`| `{"province", "constituencies"}`       |
//! | `GET /api/constituency/:name`      | `{"constituency", "province"}`         |
//! | `GET /health`                      | cache status                           |
//!
//! Every `/api` request refreshes the cache first; see [`ResilientCache`].

mod error;
mod health;

pub use self::error::ApiError;
pub use self::health::{HealthResponse, HealthStatus};

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::get;
use civic_cache::ResilientCache;
use exn::ResultExt;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::{ErrorKind, Result};
use crate::query;

pub type AppState = Arc<ResilientCache>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvinceResponse {
    pub province: String,
    pub constituencies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstituencyResponse {
    pub constituency: String,
    pub province: String,
}

pub fn router(cache: AppState) -> Router {
    Router::new()
        .route("/api/provinces", get(provinces))
        .route("/api/constituencies", get(constituencies))
        .route("/api/constituencies/:province", get(province))
        .route("/api/constituency/:name", get(constituency))
        .route("/health", get(health::health))
        .fallback(|| async { ApiError::not_found() })
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .with_state(cache)
}

/// Serves the API on `listener` until `shutdown` resolves.
pub async fn serve(listener: TcpListener, cache: AppState, shutdown: impl Future<Output = ()> + Send + 'static) -> Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "Listening");
    }
    axum::serve(listener, router(cache)).with_graceful_shutdown(shutdown).await.or_raise(|| ErrorKind::Serve)
}

async fn provinces(State(cache): State<AppState>) -> std::result::Result<Json<Vec<String>>, ApiError> {
    let snapshot = cache.get_current().await?;
    Ok(Json(query::regions(&snapshot.regions).into_iter().map(str::to_owned).collect()))
}

async fn constituencies(State(cache): State<AppState>) -> std::result::Result<Json<Vec<String>>, ApiError> {
    let snapshot = cache.get_current().await?;
    Ok(Json(query::units(&snapshot.regions).into_iter().map(str::to_owned).collect()))
}

async fn province(
    State(cache): State<AppState>,
    Path(province): Path<String>,
) -> std::result::Result<Json<ProvinceResponse>, ApiError> {
    let snapshot = cache.get_current().await?;
    let units = query::units_of(&snapshot.regions, &province)?;
    Ok(Json(ProvinceResponse {
        constituencies: units.to_vec(),
        province,
    }))
}

async fn constituency(
    State(cache): State<AppState>,
    Path(name): Path<String>,
) -> std::result::Result<Json<ConstituencyResponse>, ApiError> {
    let snapshot = cache.get_current().await?;
    let province = query::region_of(&snapshot.regions, &name)?.to_string();
    Ok(Json(ConstituencyResponse {
        constituency: name,
        province,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use civic_fetch::{MockResponse, MockSource};
    use rstest::rstest;
    use serde_json::{Value, json};
    use tower::ServiceExt; // for `oneshot`

    const LISTING: &str = r#"<html><body><div class="view-content">
        <h3>Eastern</h3>
        <table><tr><td><a href="/c/1">Chipata</a></td><td><a href="/c/2">Petauke</a></td></tr></table>
        <h3>Western</h3>
        <table><tr><td><a href="/c/3">Mongu</a></td></tr></table>
    </div></body></html>"#;

    const MAINTENANCE: &str = "<html><body><p>Down for maintenance</p></body></html>";

    fn app(responses: impl IntoIterator<Item = MockResponse>) -> Router {
        let source = Arc::new(MockSource::with_responses(responses));
        router(Arc::new(ResilientCache::new(source)))
    }

    async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[rstest]
    #[case("/api/provinces", json!(["Eastern", "Western"]))]
    #[case("/api/constituencies", json!(["Chipata", "Mongu", "Petauke"]))]
    #[case("/api/constituencies/Eastern", json!({"province": "Eastern", "constituencies": ["Chipata", "Petauke"]}))]
    #[case("/api/constituency/Mongu", json!({"constituency": "Mongu", "province": "Western"}))]
    #[case("/api/constituency/chipata", json!({"constituency": "chipata", "province": "Eastern"}))]
    #[tokio::test]
    async fn test_success(#[case] uri: &str, #[case] expected: Value) {
        let app = app([MockResponse::body(LISTING)]);
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, expected);
    }

    #[rstest]
    #[case("/api/constituencies/Northern", StatusCode::NOT_FOUND, "Province not found")]
    #[case("/api/constituencies/eastern", StatusCode::NOT_FOUND, "Province not found")]
    #[case("/api/constituency/Kasama", StatusCode::NOT_FOUND, "Constituency not found")]
    #[case("/api/constituencies/%20", StatusCode::UNPROCESSABLE_ENTITY, "Province name must not be blank")]
    #[case("/api/constituency/%20%20", StatusCode::UNPROCESSABLE_ENTITY, "Constituency name must not be blank")]
    #[case("/api/unknown", StatusCode::NOT_FOUND, "Not Found")]
    #[tokio::test]
    async fn test_client_errors(#[case] uri: &str, #[case] expected: StatusCode, #[case] detail: &str) {
        let app = app([MockResponse::body(LISTING)]);
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, expected);
        assert_eq!(body, json!({"detail": detail}));
    }

    #[rstest]
    #[case(MockResponse::unreachable("connection refused"), "unreachable")]
    #[case(MockResponse::Status(500), "unreachable")]
    #[case(MockResponse::body(MAINTENANCE), "no_headings")]
    #[case(MockResponse::body(r#"<div class="view-content"><h3>Eastern</h3></div>"#), "no_data")]
    #[tokio::test]
    async fn test_cold_start_is_unavailable(#[case] failure: MockResponse, #[case] kind: &str) {
        let app = app([failure]);
        for uri in ["/api/provinces", "/api/constituencies", "/api/constituencies/Eastern", "/api/constituency/Mongu"] {
            let (status, body) = get(&app, uri).await;
            assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{uri}");
            assert_eq!(body["kind"], kind);
            assert!(body["detail"].is_string());
        }
    }

    #[tokio::test]
    async fn test_serves_held_snapshot_when_source_fails() {
        let app = app([MockResponse::body(LISTING), MockResponse::body(MAINTENANCE)]);
        let (status, first) = get(&app, "/api/provinces").await;
        assert_eq!(status, StatusCode::OK);
        let (status, second) = get(&app, "/api/provinces").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first, second);

        let (_, health) = get(&app, "/health").await;
        assert_eq!(health["status"], "degraded");
        assert_eq!(health["last_error"]["kind"], "no_headings");
        assert_eq!(health["regions"], 2);
    }

    #[tokio::test]
    async fn test_health_does_not_refresh() {
        let source = Arc::new(MockSource::always(LISTING));
        let app = router(Arc::new(ResilientCache::new(source.clone())));

        let (status, health) = get(&app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(health["status"], "empty");
        assert_eq!(health["state"], "empty");
        assert_eq!(source.calls(), 0);

        get(&app, "/api/provinces").await;
        let (_, health) = get(&app, "/health").await;
        assert_eq!(health["status"], "ok");
        assert_eq!(health["units"], 3);
        assert!(health["hash"].is_string());
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let app = app([MockResponse::body(LISTING)]);
        let request = Request::builder()
            .uri("/api/provinces")
            .header("origin", "https://example.org")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }
}
