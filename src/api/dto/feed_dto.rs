//! Feed-related request and response bodies.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{FilterState, OrderByClause, SortOrder};
use crate::service::{FeedSnapshot, FetchOutcome};

/// Request body for `POST /feeds`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpenFeedRequest {
    /// Initial filters; none when omitted.
    #[serde(default)]
    pub filters: FilterState,
    /// Initial sort; newest first when omitted.
    #[serde(default)]
    pub sort: Option<OrderByClause>,
}

impl OpenFeedRequest {
    /// The sort order the feed starts with.
    #[must_use]
    pub fn order(&self) -> SortOrder {
        self.sort.map_or_else(SortOrder::default, |clause| {
            SortOrder::by(clause.field, clause.direction)
        })
    }
}

/// Request body for `POST /feeds/{id}/sort`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SortRequest {
    /// Entity field name, e.g. `createdDate`.
    pub field: String,
}

/// Response for operations that trigger a fetch.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FeedUpdateResponse {
    /// What the fetch did.
    pub outcome: FetchOutcome,
    /// Feed state afterwards.
    pub feed: FeedSnapshot,
}

impl From<(FetchOutcome, FeedSnapshot)> for FeedUpdateResponse {
    fn from((outcome, feed): (FetchOutcome, FeedSnapshot)) -> Self {
        Self { outcome, feed }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{SortDirection, SortField};

    #[test]
    fn empty_open_request_uses_defaults() {
        let Ok(req) = serde_json::from_str::<OpenFeedRequest>("{}") else {
            panic!("empty body should parse");
        };
        assert!(req.filters.is_empty());
        assert_eq!(req.order(), SortOrder::default());
    }

    #[test]
    fn open_request_carries_sort_and_filters() {
        let Ok(req) = serde_json::from_value::<OpenFeedRequest>(serde_json::json!({
            "filters": { "orgIds": ["org-002"] },
            "sort": { "field": "endDate", "direction": "asc" }
        })) else {
            panic!("body should parse");
        };
        assert!(req.filters.org_ids.contains("org-002"));
        assert_eq!(req.order(), SortOrder::by(SortField::EndDate, SortDirection::Asc));
    }
}
