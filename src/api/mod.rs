//! REST API layer: route handlers, DTOs, and router composition.
//!
//! Feed endpoints are mounted under `/api/v1`; system endpoints at the
//! root. With the `swagger-ui` feature the OpenAPI document is served at
//! `/api-docs/openapi.json` and browsable at `/swagger-ui`.

pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI description of every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "Stream Failure Feed API",
        description = "Filterable, sortable, paginated feeds over recorded stream failures"
    ),
    paths(
        handlers::feed::open_feed,
        handlers::feed::get_feed,
        handlers::feed::close_feed,
        handlers::feed::set_filters,
        handlers::feed::clear_filters,
        handlers::feed::toggle_sort,
        handlers::feed::load_more,
        handlers::feed::create_failure,
        handlers::feed::get_failure,
        handlers::system::health_handler,
        handlers::system::failure_statuses_handler,
        handlers::system::org_ids_handler,
    ),
    tags(
        (name = "Feeds", description = "Feed sessions: filters, sort and paging"),
        (name = "Failures", description = "Creating and inspecting failure records"),
        (name = "System", description = "Health and filter catalogs"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    let router = Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes());

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    router
}
