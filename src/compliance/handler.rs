//! HTTP handlers for the Compliance API
//!
//! - POST /api/v1/compliance/classify         — per-field classification
//! - POST /api/v1/compliance/filter           — filtered record + score
//! - POST /api/v1/compliance/validate         — compliance check for a tier
//! - POST /api/v1/compliance/mask             — mask selected fields
//! - GET  /api/v1/compliance/rules            — active rule table
//! - GET  /api/v1/compliance/sensitive-fields — sensitive field catalogue
//! - POST /api/v1/incidents/:sys_id/compliance-filter — fetch and filter a ticket

use crate::api::error_response;
use crate::compliance::{ComplianceEngine, ComplianceTier, Record};
use crate::error::{Error, Result};
use crate::incident::IncidentFilter;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared state for compliance handlers
#[derive(Clone)]
pub struct ComplianceState {
    pub engine: Arc<ComplianceEngine>,
    /// Tier used when a request does not name one
    pub default_tier: ComplianceTier,
    /// Present when an incident source is configured
    pub incidents: Option<Arc<IncidentFilter>>,
}

/// Create the compliance router
pub fn compliance_router(state: ComplianceState) -> Router {
    Router::new()
        .route("/api/v1/compliance/classify", post(classify))
        .route("/api/v1/compliance/filter", post(filter))
        .route("/api/v1/compliance/validate", post(validate))
        .route("/api/v1/compliance/mask", post(mask))
        .route("/api/v1/compliance/rules", get(list_rules))
        .route(
            "/api/v1/compliance/sensitive-fields",
            get(list_sensitive_fields),
        )
        .route(
            "/api/v1/incidents/:sys_id/compliance-filter",
            post(filter_incident),
        )
        .with_state(state)
}

// =============================================================================
// Request / Response types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub data: Record,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRequest {
    pub data: Record,
    #[serde(default)]
    pub target_tier: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    pub data: Record,
    pub required_tier: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub compliant: bool,
    pub required_tier: ComplianceTier,
}

#[derive(Debug, Deserialize)]
pub struct MaskRequest {
    pub data: Record,
    pub fields: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentFilterQuery {
    #[serde(default, alias = "compliance_level")]
    pub compliance_level: Option<String>,
}

/// Parse an optional tier, falling back to the configured default
fn resolve_tier(requested: Option<&str>, default: ComplianceTier) -> Result<ComplianceTier> {
    requested.map_or(Ok(default), str::parse)
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /api/v1/compliance/classify
async fn classify(
    State(state): State<ComplianceState>,
    Json(request): Json<ClassifyRequest>,
) -> impl IntoResponse {
    Json(state.engine.classify_data(&request.data))
}

/// POST /api/v1/compliance/filter
async fn filter(
    State(state): State<ComplianceState>,
    Json(request): Json<FilterRequest>,
) -> Response {
    match resolve_tier(request.target_tier.as_deref(), state.default_tier) {
        Ok(tier) => Json(state.engine.filter_data(&request.data, tier)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST /api/v1/compliance/validate
async fn validate(
    State(state): State<ComplianceState>,
    Json(request): Json<ValidateRequest>,
) -> Response {
    match request.required_tier.parse::<ComplianceTier>() {
        Ok(required_tier) => Json(ValidateResponse {
            compliant: state.engine.validate_compliance(&request.data, required_tier),
            required_tier,
        })
        .into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST /api/v1/compliance/mask
async fn mask(
    State(state): State<ComplianceState>,
    Json(request): Json<MaskRequest>,
) -> impl IntoResponse {
    Json(
        state
            .engine
            .mask_sensitive_fields(&request.data, request.fields.iter().map(String::as_str)),
    )
}

/// GET /api/v1/compliance/rules
async fn list_rules(State(state): State<ComplianceState>) -> impl IntoResponse {
    Json(state.engine.rule_summary())
}

/// GET /api/v1/compliance/sensitive-fields
async fn list_sensitive_fields(State(state): State<ComplianceState>) -> impl IntoResponse {
    Json(state.engine.sensitive_fields())
}

/// POST /api/v1/incidents/:sys_id/compliance-filter?complianceLevel=internal
async fn filter_incident(
    State(state): State<ComplianceState>,
    Path(sys_id): Path<String>,
    Query(query): Query<IncidentFilterQuery>,
) -> Response {
    let Some(incidents) = state.incidents.as_ref() else {
        return error_response(&Error::Source(
            "No incident source configured".to_string(),
        ));
    };

    let result = match resolve_tier(query.compliance_level.as_deref(), state.default_tier) {
        Ok(tier) => incidents.filter_incident(&sys_id, tier).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(result) => Json(result).into_response(),
        Err(e) => error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::incident::FixtureIncidentSource;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;
    use std::collections::HashMap;
    use tower::ServiceExt;

    fn make_state(incidents: Option<Arc<IncidentFilter>>) -> ComplianceState {
        ComplianceState {
            engine: Arc::new(ComplianceEngine::new()),
            default_tier: ComplianceTier::Internal,
            incidents,
        }
    }

    fn make_app() -> Router {
        compliance_router(make_state(None))
    }

    fn make_app_with_incidents() -> Router {
        let mut incidents = HashMap::new();
        incidents.insert(
            "abc123".to_string(),
            json!({"number": "INC0010001", "password": "hunter2", "state": "open"})
                .as_object()
                .unwrap()
                .clone(),
        );
        let engine = Arc::new(ComplianceEngine::new());
        let filter = IncidentFilter::new(
            Arc::new(FixtureIncidentSource::new(incidents)),
            engine.clone(),
        );
        compliance_router(ComplianceState {
            engine,
            default_tier: ComplianceTier::Internal,
            incidents: Some(Arc::new(filter)),
        })
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 1024 * 64)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_classify() {
        let resp = make_app()
            .oneshot(post_json(
                "/api/v1/compliance/classify",
                json!({"data": {"email": "a@b.co", "number": "INC1"}}),
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        let arr = json.as_array().unwrap();
        assert_eq!(arr.len(), 2);
        assert_eq!(arr[0]["field_name"], "email");
        assert_eq!(arr[0]["classification"], "confidential");
        assert_eq!(arr[0]["action"], "mask");
        assert_eq!(arr[1]["classification"], "public");
    }

    #[tokio::test]
    async fn test_filter_default_tier() {
        let resp = make_app()
            .oneshot(post_json(
                "/api/v1/compliance/filter",
                json!({"data": {"a": 1, "password": "secret123"}}),
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["removed_fields"], json!(["password"]));
        assert_eq!(json["original_data"]["password"], "secret123");
        assert!(json["filtered_data"].get("password").is_none());
        assert_eq!(json["compliance_score"], 1.0);
    }

    #[tokio::test]
    async fn test_filter_unknown_tier() {
        let resp = make_app()
            .oneshot(post_json(
                "/api/v1/compliance/filter",
                json!({"data": {"a": 1}, "targetTier": "top-secret"}),
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
        assert_eq!(
            json["error"]["message"],
            "Unknown compliance tier: top-secret"
        );
    }

    #[tokio::test]
    async fn test_validate() {
        let resp = make_app()
            .oneshot(post_json(
                "/api/v1/compliance/validate",
                json!({"data": {"notes": "hello"}, "requiredTier": "public"}),
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["compliant"], false);
        assert_eq!(json["requiredTier"], "public");
    }

    #[tokio::test]
    async fn test_mask() {
        let resp = make_app()
            .oneshot(post_json(
                "/api/v1/compliance/mask",
                json!({"data": {"email": "john.doe@example.com", "state": "open"}, "fields": ["email"]}),
            ))
            .await
            .unwrap();

        let json = body_json(resp).await;
        assert_eq!(json["email"], "j******e@example.com");
        assert_eq!(json["state"], "open");
    }

    #[tokio::test]
    async fn test_list_rules() {
        let resp = make_app()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/compliance/rules")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        let arr = json.as_array().unwrap();
        assert_eq!(arr.len(), 4);
        assert_eq!(arr[0]["tier"], "restricted");
        assert_eq!(arr[0]["action"], "remove");
        assert_eq!(arr[3]["tier"], "public");
    }

    #[tokio::test]
    async fn test_list_sensitive_fields() {
        let resp = make_app()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/compliance/sensitive-fields")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let json = body_json(resp).await;
        assert!(json.as_array().unwrap().iter().any(|f| f == "ssn"));
    }

    #[tokio::test]
    async fn test_incident_filter() {
        let resp = make_app_with_incidents()
            .oneshot(post_json(
                "/api/v1/incidents/abc123/compliance-filter?complianceLevel=public",
                json!({}),
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["removed_fields"], json!(["password"]));
        assert_eq!(json["filtered_data"]["number"], "INC0010001");
    }

    #[tokio::test]
    async fn test_incident_not_found() {
        let resp = make_app_with_incidents()
            .oneshot(post_json(
                "/api/v1/incidents/missing/compliance-filter",
                json!({}),
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_incident_without_source() {
        let resp = make_app()
            .oneshot(post_json(
                "/api/v1/incidents/abc123/compliance-filter",
                json!({}),
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
