mod hours;
mod stock;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use shelfwatch_upstream::{LookupError, MergeEngine, UpstreamClient, UpstreamError};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, RequestId};
use crate::view;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<MergeEngine>,
    pub client: Arc<UpstreamClient>,
    pub store_pages_base: String,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" => StatusCode::BAD_REQUEST,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Maps a fatal lookup failure to an API error, preserving the upstream
/// status so operators can tell "article not found" from "upstream outage".
pub(crate) fn map_lookup_error(request_id: String, error: &LookupError) -> ApiError {
    tracing::error!(error = %error, "lookup failed");
    match error.upstream_status() {
        Some(404) => ApiError::new(request_id, "not_found", error.to_string()),
        _ => ApiError::new(request_id, "upstream_error", error.to_string()),
    }
}

pub(crate) fn map_upstream_error(request_id: String, error: &UpstreamError) -> ApiError {
    tracing::error!(error = %error, "upstream fetch failed");
    match error {
        UpstreamError::Status { status: 404, .. } => {
            ApiError::new(request_id, "not_found", error.to_string())
        }
        _ => ApiError::new(request_id, "upstream_error", error.to_string()),
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route(
            "/api/v1/stock/{market}/{lang}/{article}/{store}",
            get(stock::get_stock),
        )
        .route("/api/v1/stores/{slug}/hours", get(hours::get_store_hours))
        .route(
            "/view/{market}/{lang}/{article}/{store}",
            get(view::stock_view),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
}

async fn health(
    State(_state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    Json(ApiResponse {
        data: HealthData { status: "ok" },
        meta: ResponseMeta::new(req_id.0),
    })
}
