//! Paginated failure feed for one viewer session.
//!
//! A [`FailureFeed`] owns the filter and sort state, the loaded result
//! sequence and the pagination cursor. State sits behind a
//! [`tokio::sync::Mutex`] that is released before every store call; each
//! fetch carries the generation it was issued under, and a reply whose
//! generation is no longer current is dropped on arrival.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use utoipa::ToSchema;

use super::ports::{Notice, Notifier};
use crate::domain::{
    FailureDraft, FailureId, FeedId, FilterState, OrderByClause, PAGE_SIZE, RecordQuery,
    SortField, SortOrder, StreamFailureEntity,
};
use crate::error::ViewerError;
use crate::persistence::RecordStore;

/// Lifecycle of the result sequence for the current configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum FeedStatus {
    /// Nothing loaded yet.
    Idle,
    /// A fetch for the current generation is in flight.
    Loading,
    /// At least one page loaded; more may follow.
    Loaded,
    /// The last page was short; no further pages exist.
    Exhausted,
    /// A fetch just failed. Transient: the feed settles back to `Loaded`
    /// or `Idle` before the error is returned.
    Failed,
}

/// What a fetch did to the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FetchOutcome {
    /// The page was applied.
    Applied {
        /// Zero-based page index.
        page: usize,
        /// Rows the store returned.
        received: usize,
        /// Entities held after applying.
        total: usize,
    },
    /// The reply arrived after a filter or sort change and was dropped.
    Discarded {
        /// Generation the fetch was issued under.
        generation: u64,
    },
    /// No fetch was issued.
    Skipped {
        /// Status that caused the skip.
        status: FeedStatus,
    },
}

/// Point-in-time view of a feed.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedSnapshot {
    /// Feed session ID.
    pub feed_id: FeedId,
    /// Current status.
    pub status: FeedStatus,
    /// Active filters.
    pub filters: FilterState,
    /// Number of active filter chips.
    pub active_filter_count: usize,
    /// Active sort clause, if any.
    pub sort: Option<OrderByClause>,
    /// Loaded entities in display order.
    pub entities: Vec<StreamFailureEntity>,
    /// Index of the next page `load_more` will fetch.
    pub next_page: usize,
    /// Current fetch generation.
    pub generation: u64,
    /// `false` once the feed is exhausted.
    pub has_more: bool,
    /// Message of the most recent failed fetch, cleared on success.
    pub last_error: Option<String>,
    /// Last time the entity sequence changed.
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug)]
struct FetchPlan {
    generation: u64,
    page: usize,
    reset: bool,
    query: RecordQuery,
}

#[derive(Debug)]
struct FeedInner {
    filters: FilterState,
    order: SortOrder,
    entities: Vec<StreamFailureEntity>,
    status: FeedStatus,
    next_page: usize,
    generation: u64,
    /// Set while the visible entities belong to an older configuration.
    pending_reset: bool,
    /// Entities created while a reset was pending, newest first. The reset
    /// reply may predate their insert, so they are kept in front of it.
    local_inserts: Vec<StreamFailureEntity>,
    last_error: Option<String>,
    updated_at: DateTime<Utc>,
}

impl FeedInner {
    fn transition(&mut self, feed_id: FeedId, to: FeedStatus) {
        if self.status != to {
            tracing::debug!(%feed_id, from = ?self.status, to = ?to, "feed status changed");
            self.status = to;
        }
    }

    fn begin_reset(&mut self, feed_id: FeedId) -> FetchPlan {
        self.generation = self.generation.wrapping_add(1);
        self.pending_reset = true;
        self.local_inserts.clear();
        self.transition(feed_id, FeedStatus::Loading);
        FetchPlan {
            generation: self.generation,
            page: 0,
            reset: true,
            query: RecordQuery::page(&self.filters, &self.order, 0),
        }
    }

    fn begin_next(&mut self, feed_id: FeedId) -> FetchPlan {
        self.transition(feed_id, FeedStatus::Loading);
        FetchPlan {
            generation: self.generation,
            page: self.next_page,
            reset: false,
            query: RecordQuery::page(&self.filters, &self.order, self.next_page),
        }
    }
}

/// Controller for one viewer's paginated failure list.
#[derive(Debug)]
pub struct FailureFeed {
    id: FeedId,
    store: Arc<dyn RecordStore>,
    notifier: Arc<dyn Notifier>,
    inner: Mutex<FeedInner>,
}

impl FailureFeed {
    /// Creates an idle feed with no filters and the default sort
    /// (newest first).
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_state(store, notifier, FilterState::default(), SortOrder::default())
    }

    /// Creates an idle feed with the given initial filters and sort.
    #[must_use]
    pub fn with_state(
        store: Arc<dyn RecordStore>,
        notifier: Arc<dyn Notifier>,
        filters: FilterState,
        order: SortOrder,
    ) -> Self {
        Self {
            id: FeedId::new(),
            store,
            notifier,
            inner: Mutex::new(FeedInner {
                filters,
                order,
                entities: Vec::new(),
                status: FeedStatus::Idle,
                next_page: 0,
                generation: 0,
                pending_reset: false,
                local_inserts: Vec::new(),
                last_error: None,
                updated_at: Utc::now(),
            }),
        }
    }

    /// This feed's session ID.
    #[must_use]
    pub const fn id(&self) -> FeedId {
        self.id
    }

    /// Refetches page 0 for the current configuration, replacing the
    /// sequence when the reply arrives.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::QueryFailed`] if the store read fails.
    pub async fn refresh(&self) -> Result<FetchOutcome, ViewerError> {
        let plan = self.inner.lock().await.begin_reset(self.id);
        self.run(plan).await
    }

    /// Replaces the filters and refetches from page 0.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::QueryFailed`] if the store read fails.
    pub async fn set_filters(&self, filters: FilterState) -> Result<FetchOutcome, ViewerError> {
        let plan = {
            let mut inner = self.inner.lock().await;
            inner.filters = filters;
            inner.begin_reset(self.id)
        };
        self.run(plan).await
    }

    /// Toggles the sort on `field` and refetches from page 0.
    ///
    /// Same field flips the direction; a different field replaces the
    /// clause with ascending order.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::UnknownSortField`] without touching state if
    /// `field` is not sortable, or [`ViewerError::QueryFailed`] if the
    /// store read fails.
    pub async fn toggle_sort(&self, field: &str) -> Result<FetchOutcome, ViewerError> {
        let field: SortField = field.parse()?;
        let plan = {
            let mut inner = self.inner.lock().await;
            inner.order.toggle(field);
            inner.begin_reset(self.id)
        };
        self.run(plan).await
    }

    /// Fetches and appends the next page.
    ///
    /// No-op while a fetch is in flight or once the feed is exhausted.
    /// After a failed reset the retry refetches page 0 and replaces.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::QueryFailed`] if the store read fails.
    pub async fn load_more(&self) -> Result<FetchOutcome, ViewerError> {
        let plan = {
            let mut inner = self.inner.lock().await;
            let status = inner.status;
            match status {
                status @ (FeedStatus::Loading | FeedStatus::Exhausted) => {
                    tracing::debug!(feed_id = %self.id, ?status, "load more skipped");
                    return Ok(FetchOutcome::Skipped { status });
                }
                _ if inner.pending_reset => inner.begin_reset(self.id),
                _ => inner.begin_next(self.id),
            }
        };
        self.run(plan).await
    }

    /// Inserts a failure and prepends it to the loaded sequence.
    ///
    /// The new entity is shown regardless of the active filters, and stays
    /// in front when a reset fetch already in flight lands afterwards.
    /// Nothing changes locally when the insert fails.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::InvalidRequest`] for a draft missing a
    /// required field, or [`ViewerError::InsertFailed`] if the store
    /// rejects the insert.
    pub async fn create_failure(
        &self,
        draft: &FailureDraft,
    ) -> Result<StreamFailureEntity, ViewerError> {
        draft.validate().map_err(ViewerError::InvalidRequest)?;
        let record = draft.to_record(Utc::now());

        let row = match self.store.insert(&record).await {
            Ok(row) => row,
            Err(err) => {
                tracing::warn!(feed_id = %self.id, error = %err, "failure insert rejected");
                self.notifier
                    .notify(Notice::error("Failed to create stream failure", err.to_string()));
                return Err(ViewerError::InsertFailed(err));
            }
        };

        let entity = StreamFailureEntity::from(row);
        {
            let mut inner = self.inner.lock().await;
            inner.entities.insert(0, entity.clone());
            if inner.pending_reset {
                inner.local_inserts.insert(0, entity.clone());
            }
            inner.updated_at = Utc::now();
        }

        tracing::info!(
            feed_id = %self.id,
            failure_id = %entity.id,
            org_id = %entity.org_id,
            "failure created"
        );
        self.notifier
            .notify(Notice::success("Stream failure created successfully"));
        Ok(entity)
    }

    /// Looks up a loaded entity by ID.
    pub async fn find(&self, failure_id: &FailureId) -> Option<StreamFailureEntity> {
        self.inner
            .lock()
            .await
            .entities
            .iter()
            .find(|e| &e.id == failure_id)
            .cloned()
    }

    /// Copies out the current state.
    pub async fn snapshot(&self) -> FeedSnapshot {
        let inner = self.inner.lock().await;
        FeedSnapshot {
            feed_id: self.id,
            status: inner.status,
            filters: inner.filters.clone(),
            active_filter_count: inner.filters.active_count(),
            sort: inner.order.clause(),
            entities: inner.entities.clone(),
            next_page: inner.next_page,
            generation: inner.generation,
            has_more: inner.status != FeedStatus::Exhausted,
            last_error: inner.last_error.clone(),
            updated_at: inner.updated_at,
        }
    }

    async fn run(&self, plan: FetchPlan) -> Result<FetchOutcome, ViewerError> {
        tracing::debug!(
            feed_id = %self.id,
            generation = plan.generation,
            page = plan.page,
            reset = plan.reset,
            "fetching page"
        );
        let result = self.store.query(&plan.query).await;

        let mut inner = self.inner.lock().await;
        if inner.generation != plan.generation {
            tracing::debug!(
                feed_id = %self.id,
                generation = plan.generation,
                current = inner.generation,
                "stale page discarded"
            );
            return Ok(FetchOutcome::Discarded {
                generation: plan.generation,
            });
        }

        match result {
            Ok(rows) => {
                let page: Vec<StreamFailureEntity> =
                    rows.into_iter().map(StreamFailureEntity::from).collect();
                let received = page.len();
                if plan.reset {
                    let mut entities = std::mem::take(&mut inner.local_inserts);
                    entities.retain(|local| !page.iter().any(|e| e.id == local.id));
                    entities.extend(page);
                    inner.entities = entities;
                    inner.pending_reset = false;
                } else {
                    inner.entities.extend(page);
                }
                inner.next_page = plan.page.saturating_add(1);
                inner.last_error = None;
                inner.updated_at = Utc::now();
                let to = if received < PAGE_SIZE {
                    FeedStatus::Exhausted
                } else {
                    FeedStatus::Loaded
                };
                inner.transition(self.id, to);

                let total = inner.entities.len();
                tracing::info!(
                    feed_id = %self.id,
                    generation = plan.generation,
                    page = plan.page,
                    rows = received,
                    total,
                    "page applied"
                );
                Ok(FetchOutcome::Applied {
                    page: plan.page,
                    received,
                    total,
                })
            }
            Err(err) => {
                inner.transition(self.id, FeedStatus::Failed);
                let settled = if inner.entities.is_empty() {
                    FeedStatus::Idle
                } else {
                    FeedStatus::Loaded
                };
                inner.transition(self.id, settled);
                inner.last_error = Some(err.to_string());
                drop(inner);

                tracing::warn!(
                    feed_id = %self.id,
                    generation = plan.generation,
                    page = plan.page,
                    error = %err,
                    "page fetch failed"
                );
                self.notifier
                    .notify(Notice::error("Failed to load stream failures", err.to_string()));
                Err(ViewerError::QueryFailed(err))
            }
        }
    }
}
