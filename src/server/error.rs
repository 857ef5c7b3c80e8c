//! Conversion of errors into HTTP responses.
//!
//! Every error body carries a human-readable `detail`. Failures to load the
//! source document additionally carry a stable `kind` so that clients can
//! tell a network outage from a change in the page layout.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use civic_cache::error::{Error as CacheError, ErrorKind as CacheErrorKind};
use serde::Serialize;

use crate::query::error::{Error as QueryError, ErrorKind as QueryErrorKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
            kind: None,
        }
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not Found")
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        let status = match &*err {
            QueryErrorKind::NotFound(_) => StatusCode::NOT_FOUND,
            QueryErrorKind::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };
        Self::new(status, (*err).to_string())
    }
}

/// Only reached on a cold start; a warm cache never surfaces refresh errors.
impl From<CacheError> for ApiError {
    fn from(err: CacheError) -> Self {
        Self::from(&*err)
    }
}

impl From<&CacheErrorKind> for ApiError {
    fn from(kind: &CacheErrorKind) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            detail: kind.to_string(),
            kind: Some(kind.code()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::error::Subject;
    use rstest::rstest;

    #[rstest]
    #[case(QueryErrorKind::NotFound(Subject::Region), StatusCode::NOT_FOUND, "Province not found")]
    #[case(QueryErrorKind::NotFound(Subject::Unit), StatusCode::NOT_FOUND, "Constituency not found")]
    #[case(QueryErrorKind::InvalidInput(Subject::Unit), StatusCode::UNPROCESSABLE_ENTITY, "Constituency name must not be blank")]
    fn test_query_errors(#[case] kind: QueryErrorKind, #[case] status: StatusCode, #[case] detail: &str) {
        let err = ApiError::from(exn::Exn::new(kind));
        assert_eq!(err.status, status);
        assert_eq!(err.detail, detail);
        assert_eq!(err.kind, None);
    }

    #[rstest]
    #[case(CacheErrorKind::NoHeadings, "no_headings")]
    #[case(CacheErrorKind::NoData, "no_data")]
    #[case(CacheErrorKind::Unexpected("boom".to_string()), "unexpected")]
    fn test_cache_errors(#[case] kind: CacheErrorKind, #[case] code: &str) {
        let err = ApiError::from(exn::Exn::new(kind));
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.kind, Some(code));
    }

    #[test]
    fn test_body_shape() {
        let body = serde_json::to_value(ApiError::from(&CacheErrorKind::NoData)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"detail": "no region data found in the source document", "kind": "no_data"})
        );
        let body = serde_json::to_value(ApiError::not_found()).unwrap();
        assert_eq!(body, serde_json::json!({"detail": "Not Found"}));
    }
}
