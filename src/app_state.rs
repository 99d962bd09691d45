//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::FeedService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Feed service for all viewer operations.
    pub feed_service: Arc<FeedService>,
}
