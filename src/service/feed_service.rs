//! Feed service: opens feed sessions and routes operations to them.

use std::sync::Arc;

use super::detail::{FailureDetail, copy_payload};
use super::feed::{FailureFeed, FeedSnapshot, FetchOutcome};
use super::ports::{Clipboard, Notifier};
use super::registry::FeedRegistry;
use crate::domain::{
    FailureDraft, FailureId, FeedId, FilterState, SortOrder, StreamFailureEntity,
};
use crate::error::ViewerError;
use crate::persistence::RecordStore;

/// Orchestration layer for all feed operations.
///
/// Holds the shared record store and notifier handed to every new feed,
/// and the [`FeedRegistry`] of open sessions.
#[derive(Debug, Clone)]
pub struct FeedService {
    registry: Arc<FeedRegistry>,
    store: Arc<dyn RecordStore>,
    notifier: Arc<dyn Notifier>,
}

impl FeedService {
    /// Creates a new `FeedService`.
    #[must_use]
    pub fn new(
        registry: Arc<FeedRegistry>,
        store: Arc<dyn RecordStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            registry,
            store,
            notifier,
        }
    }

    /// Returns a reference to the inner [`FeedRegistry`].
    #[must_use]
    pub fn registry(&self) -> &Arc<FeedRegistry> {
        &self.registry
    }

    /// Opens a feed and loads its first page.
    ///
    /// A failed first fetch does not close the session: the snapshot
    /// carries `last_error` and the caller may retry with `load_more`.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::FeedLimitReached`] if too many feeds are
    /// open.
    pub async fn open_feed(
        &self,
        filters: FilterState,
        order: SortOrder,
    ) -> Result<FeedSnapshot, ViewerError> {
        let feed = Arc::new(FailureFeed::with_state(
            Arc::clone(&self.store),
            Arc::clone(&self.notifier),
            filters,
            order,
        ));
        let feed_id = self.registry.insert(Arc::clone(&feed)).await?;
        tracing::info!(%feed_id, "feed opened");

        if let Err(err) = feed.refresh().await {
            tracing::warn!(%feed_id, error = %err, "initial fetch failed");
        }
        Ok(feed.snapshot().await)
    }

    /// Returns the current snapshot of a feed.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::FeedNotFound`] if the feed is not open.
    pub async fn snapshot(&self, feed_id: FeedId) -> Result<FeedSnapshot, ViewerError> {
        Ok(self.registry.get(feed_id).await?.snapshot().await)
    }

    /// Closes a feed.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::FeedNotFound`] if the feed is not open.
    pub async fn close_feed(&self, feed_id: FeedId) -> Result<(), ViewerError> {
        self.registry.remove(feed_id).await?;
        tracing::info!(%feed_id, "feed closed");
        Ok(())
    }

    /// Replaces a feed's filters and reloads it.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::FeedNotFound`] or
    /// [`ViewerError::QueryFailed`].
    pub async fn set_filters(
        &self,
        feed_id: FeedId,
        filters: FilterState,
    ) -> Result<(FetchOutcome, FeedSnapshot), ViewerError> {
        let feed = self.registry.get(feed_id).await?;
        let outcome = feed.set_filters(filters).await?;
        Ok((outcome, feed.snapshot().await))
    }

    /// Toggles a feed's sort on `field` and reloads it.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::FeedNotFound`],
    /// [`ViewerError::UnknownSortField`] or [`ViewerError::QueryFailed`].
    pub async fn toggle_sort(
        &self,
        feed_id: FeedId,
        field: &str,
    ) -> Result<(FetchOutcome, FeedSnapshot), ViewerError> {
        let feed = self.registry.get(feed_id).await?;
        let outcome = feed.toggle_sort(field).await?;
        Ok((outcome, feed.snapshot().await))
    }

    /// Loads a feed's next page.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::FeedNotFound`] or
    /// [`ViewerError::QueryFailed`].
    pub async fn load_more(
        &self,
        feed_id: FeedId,
    ) -> Result<(FetchOutcome, FeedSnapshot), ViewerError> {
        let feed = self.registry.get(feed_id).await?;
        let outcome = feed.load_more().await?;
        Ok((outcome, feed.snapshot().await))
    }

    /// Creates a failure through a feed.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::FeedNotFound`],
    /// [`ViewerError::InvalidRequest`] or [`ViewerError::InsertFailed`].
    pub async fn create_failure(
        &self,
        feed_id: FeedId,
        draft: &FailureDraft,
    ) -> Result<StreamFailureEntity, ViewerError> {
        self.registry.get(feed_id).await?.create_failure(draft).await
    }

    /// Builds the detail view of a loaded failure.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::FeedNotFound`], or
    /// [`ViewerError::FailureNotFound`] if the failure is not loaded in
    /// the feed.
    pub async fn failure_detail(
        &self,
        feed_id: FeedId,
        failure_id: &FailureId,
    ) -> Result<FailureDetail, ViewerError> {
        let entity = self
            .registry
            .get(feed_id)
            .await?
            .find(failure_id)
            .await
            .ok_or_else(|| ViewerError::FailureNotFound(failure_id.clone()))?;
        Ok(FailureDetail::from(&entity))
    }

    /// Copies a loaded failure's pretty-printed payload to `clipboard`.
    ///
    /// The HTTP server has no clipboard; this is the entry point for
    /// front ends that embed the service and own one.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::FeedNotFound`] or
    /// [`ViewerError::FailureNotFound`] as [`Self::failure_detail`] does, or
    /// [`ViewerError::Internal`] if the clipboard refuses the write.
    pub async fn copy_failure_payload(
        &self,
        feed_id: FeedId,
        failure_id: &FailureId,
        clipboard: &dyn Clipboard,
    ) -> Result<FailureDetail, ViewerError> {
        let detail = self.failure_detail(feed_id, failure_id).await?;
        copy_payload(&detail, clipboard, self.notifier.as_ref())
            .map_err(|err| ViewerError::Internal(err.to_string()))?;
        Ok(detail)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::persistence::InMemoryStore;
    use crate::persistence::seed::demo_rows;
    use crate::service::feed::FeedStatus;
    use crate::service::ports::{MemoryClipboard, TracingNotifier};

    fn make_service(rows: usize, max_feeds: usize) -> FeedService {
        FeedService::new(
            Arc::new(FeedRegistry::new(max_feeds)),
            Arc::new(InMemoryStore::with_rows(demo_rows(rows, Utc::now()))),
            Arc::new(TracingNotifier),
        )
    }

    #[tokio::test]
    async fn open_feed_loads_first_page() {
        let service = make_service(250, 8);
        let Ok(snap) = service
            .open_feed(FilterState::default(), SortOrder::default())
            .await
        else {
            panic!("open failed");
        };
        assert_eq!(snap.status, FeedStatus::Loaded);
        assert_eq!(snap.entities.len(), 200);
        assert_eq!(service.registry().len().await, 1);
    }

    #[tokio::test]
    async fn feeds_do_not_share_state() {
        let service = make_service(50, 8);
        let Ok(a) = service
            .open_feed(FilterState::default(), SortOrder::default())
            .await
        else {
            panic!("open failed");
        };
        let Ok(b) = service
            .open_feed(FilterState::default(), SortOrder::default())
            .await
        else {
            panic!("open failed");
        };

        let mut filters = FilterState::default();
        filters.toggle_org_id("org-001");
        let Ok(_) = service.set_filters(a.feed_id, filters).await else {
            panic!("set filters failed");
        };

        let Ok(b_now) = service.snapshot(b.feed_id).await else {
            panic!("snapshot failed");
        };
        assert_eq!(b_now.entities.len(), 50);
        assert!(b_now.filters.is_empty());
    }

    #[tokio::test]
    async fn detail_requires_a_loaded_failure() {
        let service = make_service(3, 8);
        let Ok(snap) = service
            .open_feed(FilterState::default(), SortOrder::default())
            .await
        else {
            panic!("open failed");
        };
        let Some(first) = snap.entities.first() else {
            panic!("feed is empty");
        };

        let Ok(detail) = service.failure_detail(snap.feed_id, &first.id).await else {
            panic!("detail failed");
        };
        assert_eq!(detail.id, first.id);

        let missing = FailureId::new("failure-999999");
        let Err(ViewerError::FailureNotFound(_)) =
            service.failure_detail(snap.feed_id, &missing).await
        else {
            panic!("expected FailureNotFound");
        };
    }

    #[tokio::test]
    async fn copy_writes_the_pretty_payload() {
        let service = make_service(3, 8);
        let Ok(snap) = service
            .open_feed(FilterState::default(), SortOrder::default())
            .await
        else {
            panic!("open failed");
        };
        let Some(first) = snap.entities.first() else {
            panic!("feed is empty");
        };

        let clipboard = MemoryClipboard::new();
        let Ok(detail) = service
            .copy_failure_payload(snap.feed_id, &first.id, &clipboard)
            .await
        else {
            panic!("copy failed");
        };
        assert_eq!(clipboard.contents(), Some(detail.payload_pretty));

        let missing = FailureId::new("failure-999999");
        let Err(ViewerError::FailureNotFound(_)) = service
            .copy_failure_payload(snap.feed_id, &missing, &clipboard)
            .await
        else {
            panic!("expected FailureNotFound");
        };
    }

    #[tokio::test]
    async fn closed_feed_is_gone() {
        let service = make_service(3, 8);
        let Ok(snap) = service
            .open_feed(FilterState::default(), SortOrder::default())
            .await
        else {
            panic!("open failed");
        };
        let Ok(()) = service.close_feed(snap.feed_id).await else {
            panic!("close failed");
        };
        let Err(ViewerError::FeedNotFound(_)) = service.load_more(snap.feed_id).await else {
            panic!("expected FeedNotFound");
        };
    }
}
