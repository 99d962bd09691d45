//! Feed session handlers: open, inspect, filter, sort, page, create.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};

use crate::api::dto::{FeedUpdateResponse, OpenFeedRequest, SortRequest};
use crate::app_state::AppState;
use crate::domain::{FailureDraft, FailureId, FeedId, FilterState, StreamFailureEntity};
use crate::error::{ErrorResponse, ViewerError};
use crate::service::{FailureDetail, FeedSnapshot};

/// `POST /feeds` — Open a feed session and load its first page.
///
/// # Errors
///
/// Returns [`ViewerError::FeedLimitReached`] if too many feeds are open.
#[utoipa::path(
    post,
    path = "/api/v1/feeds",
    tag = "Feeds",
    summary = "Open a feed",
    description = "Creates a feed session with optional initial filters and sort, then fetches page 0. A failed first fetch is reported in `lastError` rather than failing the request.",
    request_body = OpenFeedRequest,
    responses(
        (status = 201, description = "Feed opened", body = FeedSnapshot),
        (status = 409, description = "Too many open feeds", body = ErrorResponse),
    )
)]
pub async fn open_feed(
    State(state): State<AppState>,
    Json(req): Json<OpenFeedRequest>,
) -> Result<impl IntoResponse, ViewerError> {
    let order = req.order();
    let snapshot = state.feed_service.open_feed(req.filters, order).await?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// `GET /feeds/{id}` — Current feed snapshot.
///
/// # Errors
///
/// Returns [`ViewerError::FeedNotFound`] if the feed is not open.
#[utoipa::path(
    get,
    path = "/api/v1/feeds/{id}",
    tag = "Feeds",
    summary = "Get a feed",
    params(("id" = uuid::Uuid, Path, description = "Feed UUID")),
    responses(
        (status = 200, description = "Feed snapshot", body = FeedSnapshot),
        (status = 404, description = "Feed not found", body = ErrorResponse),
    )
)]
pub async fn get_feed(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, ViewerError> {
    let snapshot = state.feed_service.snapshot(FeedId::from_uuid(id)).await?;
    Ok(Json(snapshot))
}

/// `DELETE /feeds/{id}` — Close a feed session.
///
/// # Errors
///
/// Returns [`ViewerError::FeedNotFound`] if the feed is not open.
#[utoipa::path(
    delete,
    path = "/api/v1/feeds/{id}",
    tag = "Feeds",
    summary = "Close a feed",
    params(("id" = uuid::Uuid, Path, description = "Feed UUID")),
    responses(
        (status = 204, description = "Feed closed"),
        (status = 404, description = "Feed not found", body = ErrorResponse),
    )
)]
pub async fn close_feed(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, ViewerError> {
    state.feed_service.close_feed(FeedId::from_uuid(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /feeds/{id}/filters` — Replace the filters and reload.
///
/// # Errors
///
/// Returns [`ViewerError::FeedNotFound`] or [`ViewerError::QueryFailed`].
#[utoipa::path(
    put,
    path = "/api/v1/feeds/{id}/filters",
    tag = "Feeds",
    summary = "Set filters",
    description = "Replaces the whole filter state and refetches page 0. The reply replaces the loaded rows.",
    params(("id" = uuid::Uuid, Path, description = "Feed UUID")),
    request_body = FilterState,
    responses(
        (status = 200, description = "Filters applied", body = FeedUpdateResponse),
        (status = 404, description = "Feed not found", body = ErrorResponse),
        (status = 502, description = "Record store failed", body = ErrorResponse),
    )
)]
pub async fn set_filters(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(filters): Json<FilterState>,
) -> Result<impl IntoResponse, ViewerError> {
    let update = state
        .feed_service
        .set_filters(FeedId::from_uuid(id), filters)
        .await?;
    Ok(Json(FeedUpdateResponse::from(update)))
}

/// `DELETE /feeds/{id}/filters` — Clear all filters and reload.
///
/// # Errors
///
/// Returns [`ViewerError::FeedNotFound`] or [`ViewerError::QueryFailed`].
#[utoipa::path(
    delete,
    path = "/api/v1/feeds/{id}/filters",
    tag = "Feeds",
    summary = "Clear filters",
    params(("id" = uuid::Uuid, Path, description = "Feed UUID")),
    responses(
        (status = 200, description = "Filters cleared", body = FeedUpdateResponse),
        (status = 404, description = "Feed not found", body = ErrorResponse),
        (status = 502, description = "Record store failed", body = ErrorResponse),
    )
)]
pub async fn clear_filters(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, ViewerError> {
    let update = state
        .feed_service
        .set_filters(FeedId::from_uuid(id), FilterState::default())
        .await?;
    Ok(Json(FeedUpdateResponse::from(update)))
}

/// `POST /feeds/{id}/sort` — Toggle the sort on a column.
///
/// # Errors
///
/// Returns [`ViewerError::UnknownSortField`], [`ViewerError::FeedNotFound`]
/// or [`ViewerError::QueryFailed`].
#[utoipa::path(
    post,
    path = "/api/v1/feeds/{id}/sort",
    tag = "Feeds",
    summary = "Toggle sort",
    description = "Same field flips the direction; a different field sorts ascending by that field. Reloads from page 0.",
    params(("id" = uuid::Uuid, Path, description = "Feed UUID")),
    request_body = SortRequest,
    responses(
        (status = 200, description = "Sort applied", body = FeedUpdateResponse),
        (status = 400, description = "Unknown sort field", body = ErrorResponse),
        (status = 404, description = "Feed not found", body = ErrorResponse),
        (status = 502, description = "Record store failed", body = ErrorResponse),
    )
)]
pub async fn toggle_sort(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<SortRequest>,
) -> Result<impl IntoResponse, ViewerError> {
    let update = state
        .feed_service
        .toggle_sort(FeedId::from_uuid(id), &req.field)
        .await?;
    Ok(Json(FeedUpdateResponse::from(update)))
}

/// `POST /feeds/{id}/more` — Load the next page.
///
/// # Errors
///
/// Returns [`ViewerError::FeedNotFound`] or [`ViewerError::QueryFailed`].
#[utoipa::path(
    post,
    path = "/api/v1/feeds/{id}/more",
    tag = "Feeds",
    summary = "Load more",
    description = "Appends the next page. Skipped while a fetch is in flight or once the feed is exhausted.",
    params(("id" = uuid::Uuid, Path, description = "Feed UUID")),
    responses(
        (status = 200, description = "Page loaded or skipped", body = FeedUpdateResponse),
        (status = 404, description = "Feed not found", body = ErrorResponse),
        (status = 502, description = "Record store failed", body = ErrorResponse),
    )
)]
pub async fn load_more(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, ViewerError> {
    let update = state.feed_service.load_more(FeedId::from_uuid(id)).await?;
    Ok(Json(FeedUpdateResponse::from(update)))
}

/// `POST /feeds/{id}/failures` — Create a failure record.
///
/// # Errors
///
/// Returns [`ViewerError::InvalidRequest`], [`ViewerError::FeedNotFound`]
/// or [`ViewerError::InsertFailed`].
#[utoipa::path(
    post,
    path = "/api/v1/feeds/{id}/failures",
    tag = "Failures",
    summary = "Create a failure",
    description = "Inserts a failure and prepends it to the feed. Payload text that is not a JSON object is stored as `{\"message\": text}`.",
    params(("id" = uuid::Uuid, Path, description = "Feed UUID")),
    request_body = FailureDraft,
    responses(
        (status = 201, description = "Failure created", body = StreamFailureEntity),
        (status = 400, description = "Missing required field", body = ErrorResponse),
        (status = 404, description = "Feed not found", body = ErrorResponse),
        (status = 502, description = "Record store failed", body = ErrorResponse),
    )
)]
pub async fn create_failure(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(draft): Json<FailureDraft>,
) -> Result<impl IntoResponse, ViewerError> {
    let entity = state
        .feed_service
        .create_failure(FeedId::from_uuid(id), &draft)
        .await?;
    Ok((StatusCode::CREATED, Json(entity)))
}

/// `GET /feeds/{id}/failures/{failure_id}` — Payload detail view.
///
/// # Errors
///
/// Returns [`ViewerError::FeedNotFound`] or
/// [`ViewerError::FailureNotFound`].
#[utoipa::path(
    get,
    path = "/api/v1/feeds/{id}/failures/{failure_id}",
    tag = "Failures",
    summary = "Get failure detail",
    params(
        ("id" = uuid::Uuid, Path, description = "Feed UUID"),
        ("failure_id" = String, Path, description = "Failure ID"),
    ),
    responses(
        (status = 200, description = "Failure detail", body = FailureDetail),
        (status = 404, description = "Feed or failure not found", body = ErrorResponse),
    )
)]
pub async fn get_failure(
    State(state): State<AppState>,
    Path((id, failure_id)): Path<(uuid::Uuid, String)>,
) -> Result<impl IntoResponse, ViewerError> {
    let detail = state
        .feed_service
        .failure_detail(FeedId::from_uuid(id), &FailureId::new(failure_id))
        .await?;
    Ok(Json(detail))
}

/// Feed routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/feeds", post(open_feed))
        .route("/feeds/{id}", get(get_feed).delete(close_feed))
        .route("/feeds/{id}/filters", put(set_filters).delete(clear_filters))
        .route("/feeds/{id}/sort", post(toggle_sort))
        .route("/feeds/{id}/more", post(load_more))
        .route("/feeds/{id}/failures", post(create_failure))
        .route("/feeds/{id}/failures/{failure_id}", get(get_failure))
}
