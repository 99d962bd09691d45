//! System endpoints: health check and filter catalogs.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::domain::{FailureStatus, StatusPresentation};
use crate::persistence::seed::DEMO_ORG_IDS;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Always `healthy` when the server answers.
    pub status: String,
    /// Server time, RFC 3339.
    pub timestamp: String,
    /// Crate version.
    pub version: String,
    /// Open feed sessions.
    pub open_feeds: usize,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, open feed count, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            open_feeds: state.feed_service.registry().len().await,
        }),
    )
}

/// One entry of the status catalog.
#[derive(Debug, Serialize, ToSchema)]
pub struct FailureStatusInfo {
    /// Wire value, e.g. `PENDING`.
    pub value: String,
    /// How the status is displayed.
    pub presentation: StatusPresentation,
}

/// `GET /config/failure-statuses` — Known statuses with display attributes.
#[utoipa::path(
    get,
    path = "/config/failure-statuses",
    tag = "System",
    summary = "List failure statuses",
    description = "Returns every known failure status with its badge label, tone and classes. Unknown statuses found in data display with the neutral tone.",
    responses(
        (status = 200, description = "Status catalog", body = Vec<FailureStatusInfo>),
    )
)]
pub async fn failure_statuses_handler() -> impl IntoResponse {
    let statuses: Vec<FailureStatusInfo> = FailureStatus::KNOWN
        .iter()
        .map(|status| FailureStatusInfo {
            value: status.as_str().to_string(),
            presentation: status.presentation(),
        })
        .collect();
    (StatusCode::OK, Json(statuses))
}

/// `GET /config/org-ids` — Org IDs offered by the filter sidebar.
#[utoipa::path(
    get,
    path = "/config/org-ids",
    tag = "System",
    summary = "List org IDs",
    responses(
        (status = 200, description = "Org ID catalog", body = Vec<String>),
    )
)]
pub async fn org_ids_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(DEMO_ORG_IDS.to_vec()))
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/failure-statuses", get(failure_statuses_handler))
        .route("/config/org-ids", get(org_ids_handler))
}
