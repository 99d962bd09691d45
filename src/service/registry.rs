//! Open feed sessions keyed by [`FeedId`].
//!
//! Each feed guards its own state, so the registry only needs the outer
//! `RwLock` for membership. Operations on different feeds never contend.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::feed::FailureFeed;
use crate::domain::FeedId;
use crate::error::ViewerError;

/// Central store for all open feed sessions.
#[derive(Debug)]
pub struct FeedRegistry {
    feeds: RwLock<HashMap<FeedId, Arc<FailureFeed>>>,
    max_feeds: usize,
}

impl FeedRegistry {
    /// Creates an empty registry holding at most `max_feeds` sessions.
    #[must_use]
    pub fn new(max_feeds: usize) -> Self {
        Self {
            feeds: RwLock::new(HashMap::new()),
            max_feeds,
        }
    }

    /// Registers a feed.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::FeedLimitReached`] when the registry is full,
    /// or [`ViewerError::InvalidRequest`] if the ID is already registered
    /// (should never happen with UUID v4).
    pub async fn insert(&self, feed: Arc<FailureFeed>) -> Result<FeedId, ViewerError> {
        let feed_id = feed.id();
        let mut map = self.feeds.write().await;
        if map.len() >= self.max_feeds {
            return Err(ViewerError::FeedLimitReached(self.max_feeds));
        }
        if map.contains_key(&feed_id) {
            return Err(ViewerError::InvalidRequest(format!(
                "feed {feed_id} already exists"
            )));
        }
        map.insert(feed_id, feed);
        Ok(feed_id)
    }

    /// Returns the feed with the given ID.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::FeedNotFound`] if no such feed is open.
    pub async fn get(&self, feed_id: FeedId) -> Result<Arc<FailureFeed>, ViewerError> {
        self.feeds
            .read()
            .await
            .get(&feed_id)
            .cloned()
            .ok_or(ViewerError::FeedNotFound(feed_id))
    }

    /// Removes a feed. In-flight fetches on it finish against the removed
    /// instance and are then dropped with it.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::FeedNotFound`] if no such feed is open.
    pub async fn remove(&self, feed_id: FeedId) -> Result<Arc<FailureFeed>, ViewerError> {
        self.feeds
            .write()
            .await
            .remove(&feed_id)
            .ok_or(ViewerError::FeedNotFound(feed_id))
    }

    /// Number of open feeds.
    pub async fn len(&self) -> usize {
        self.feeds.read().await.len()
    }

    /// Returns `true` if no feeds are open.
    pub async fn is_empty(&self) -> bool {
        self.feeds.read().await.is_empty()
    }
}
