//! Unified API router
//!
//! Merges the module routers into a single axum `Router` with CORS and
//! consistent error bodies.
//!
//! | Prefix                    | Module     | Description                         |
//! |---------------------------|------------|-------------------------------------|
//! | `/health`                 | api        | Load balancer health probe          |
//! | `/api/v1/compliance/*`    | compliance | Classify, filter, validate, mask    |
//! | `/api/v1/incidents/*`     | compliance | Fetch-and-filter for ITSM tickets   |

use crate::compliance::{compliance_router, ComplianceState};
use crate::error::Error;
use axum::{
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// API error body
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

/// API error detail
#[derive(Debug, Serialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

impl ApiError {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.to_string(),
                message: message.into(),
            },
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new("UNAVAILABLE", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

/// Map a service error onto an HTTP response
pub fn error_response(err: &Error) -> Response {
    let (status, body) = match err {
        Error::UnknownTier(_) => (StatusCode::BAD_REQUEST, ApiError::bad_request(err.to_string())),
        Error::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::not_found(msg.clone())),
        Error::Source(msg) => (
            StatusCode::SERVICE_UNAVAILABLE,
            ApiError::unavailable(msg.clone()),
        ),
        _ => {
            tracing::error!(error = %err, "Request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::internal(err.to_string()),
            )
        }
    };
    (status, Json(body)).into_response()
}

/// Build the complete HTTP application
pub fn build_app(compliance_state: ComplianceState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(compliance_router(compliance_state))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors(cors_origins))
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let parsed: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(parsed)
    }
}
