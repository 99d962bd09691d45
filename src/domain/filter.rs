//! Client-side query predicate.
//!
//! A [`FilterState`] has five independent dimensions combined with AND.
//! Within the set-valued dimensions members combine with OR. An empty set
//! or unset field never constrains anything.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::StreamFailureEntity;

/// Closed `[start, end]` interval; a missing bound is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DateRange {
    /// Inclusive lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    /// Inclusive upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Range with both bounds.
    #[must_use]
    pub const fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// `true` when neither bound is set.
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Number of bounds set (0–2).
    #[must_use]
    pub fn bound_count(&self) -> usize {
        usize::from(self.start.is_some()) + usize::from(self.end.is_some())
    }

    /// Tests an instant against the range.
    ///
    /// `None` (a null or unparseable date) matches only an unbounded
    /// range.
    #[must_use]
    pub fn contains(&self, value: Option<DateTime<Utc>>) -> bool {
        let Some(value) = value else {
            return self.is_unbounded();
        };
        self.start.is_none_or(|start| value >= start) && self.end.is_none_or(|end| value <= end)
    }
}

/// The active filter of one feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    /// Case-insensitive substring of the failure id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Allowed org ids; empty allows all.
    pub org_ids: BTreeSet<String>,
    /// Allowed statuses; empty allows all.
    pub failure_statuses: BTreeSet<String>,
    /// Bounds on `createdDate`.
    pub created_date_range: DateRange,
    /// Bounds on `endDate`.
    pub end_date_range: DateRange,
}

impl FilterState {
    /// The id needle, if one is set and not blank.
    #[must_use]
    pub fn id_needle(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// `true` when no dimension constrains anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    /// Number of active constraints, as shown on the filter badge: the id
    /// counts once, every selected org and status once, and every set date
    /// bound once.
    #[must_use]
    pub fn active_count(&self) -> usize {
        usize::from(self.id_needle().is_some())
            + self.org_ids.len()
            + self.failure_statuses.len()
            + self.created_date_range.bound_count()
            + self.end_date_range.bound_count()
    }

    /// Tests one entity against every dimension.
    #[must_use]
    pub fn matches(&self, entity: &StreamFailureEntity) -> bool {
        self.matches_id(entity)
            && (self.org_ids.is_empty() || self.org_ids.contains(&entity.org_id))
            && (self.failure_statuses.is_empty()
                || self.failure_statuses.contains(entity.failure_status.as_str()))
            && self.created_date_range.contains(entity.created_at())
            && self.end_date_range.contains(entity.ended_at())
    }

    fn matches_id(&self, entity: &StreamFailureEntity) -> bool {
        self.id_needle().is_none_or(|needle| {
            entity
                .id
                .as_str()
                .to_lowercase()
                .contains(&needle.to_lowercase())
        })
    }

    /// Adds the org id if absent, removes it if present.
    pub fn toggle_org_id(&mut self, org_id: &str) {
        if !self.org_ids.remove(org_id) {
            self.org_ids.insert(org_id.to_string());
        }
    }

    /// Adds the status if absent, removes it if present.
    pub fn toggle_status(&mut self, status: &str) {
        if !self.failure_statuses.remove(status) {
            self.failure_statuses.insert(status.to_string());
        }
    }

    /// Drops the id constraint.
    pub fn clear_id(&mut self) {
        self.id = None;
    }

    /// Drops one org id from the selection.
    pub fn remove_org_id(&mut self, org_id: &str) {
        self.org_ids.remove(org_id);
    }

    /// Drops one status from the selection.
    pub fn remove_status(&mut self, status: &str) {
        self.failure_statuses.remove(status);
    }

    /// Resets every dimension.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{FailureId, FailureStatus};

    fn at(raw: &str) -> DateTime<Utc> {
        let Some(dt) = crate::domain::parse_instant(raw) else {
            panic!("bad fixture date {raw}");
        };
        dt
    }

    fn entity(id: &str, org: &str, status: &str, end: Option<&str>) -> StreamFailureEntity {
        StreamFailureEntity {
            id: FailureId::from(id),
            org_id: org.to_string(),
            failure_status: FailureStatus::from(status),
            created_date: "2025-01-10T12:00:00Z".to_string(),
            end_date: end.map(str::to_string),
            failure_payload: serde_json::json!({}),
        }
    }

    fn fixtures() -> Vec<StreamFailureEntity> {
        vec![
            entity("failure-ORG-001-a", "org-001", "PENDING", None),
            entity("failure-000002", "org-002", "FAILED", Some("2025-01-11T00:00:00Z")),
            entity("failure-000003", "org-003", "RESOLVED", Some("2025-01-20T00:00:00Z")),
            entity("failure-000004", "org-002", "MYSTERY", Some("garbage")),
        ]
    }

    fn matching<'a>(filter: &FilterState, rows: &'a [StreamFailureEntity]) -> Vec<&'a str> {
        rows.iter()
            .filter(|e| filter.matches(e))
            .map(|e| e.id.as_str())
            .collect()
    }

    #[test]
    fn empty_filter_is_identity() {
        let rows = fixtures();
        let filter = FilterState::default();
        assert!(filter.is_empty());
        assert_eq!(matching(&filter, &rows).len(), rows.len());
    }

    #[test]
    fn blank_id_is_unset() {
        let filter = FilterState {
            id: Some("   ".to_string()),
            ..FilterState::default()
        };
        assert!(filter.is_empty());
        assert_eq!(matching(&filter, &fixtures()).len(), 4);
    }

    #[test]
    fn id_filter_is_case_insensitive_substring() {
        let rows = fixtures();
        let upper = FilterState {
            id: Some("ORG-001".to_string()),
            ..FilterState::default()
        };
        let lower = FilterState {
            id: Some("org-001".to_string()),
            ..FilterState::default()
        };
        assert_eq!(matching(&upper, &rows), matching(&lower, &rows));
        assert_eq!(matching(&upper, &rows), vec!["failure-ORG-001-a"]);
    }

    #[test]
    fn set_dimensions_or_within_and_across() {
        let rows = fixtures();
        let mut filter = FilterState::default();
        filter.toggle_org_id("org-002");
        filter.toggle_org_id("org-003");
        assert_eq!(
            matching(&filter, &rows),
            vec!["failure-000002", "failure-000003", "failure-000004"]
        );

        filter.toggle_status("FAILED");
        filter.toggle_status("MYSTERY");
        assert_eq!(matching(&filter, &rows), vec!["failure-000002", "failure-000004"]);
        assert_eq!(filter.active_count(), 4);

        filter.toggle_org_id("org-003");
        assert_eq!(filter.org_ids.len(), 1);
    }

    #[test]
    fn null_end_date_only_matches_unbounded_range() {
        let open = entity("x", "org-001", "PENDING", None);
        let unbounded = FilterState::default();
        assert!(unbounded.matches(&open));

        for range in [
            DateRange {
                start: Some(at("2020-01-01T00:00:00Z")),
                end: None,
            },
            DateRange {
                start: None,
                end: Some(at("2030-01-01T00:00:00Z")),
            },
        ] {
            let filter = FilterState {
                end_date_range: range,
                ..FilterState::default()
            };
            assert!(!filter.matches(&open));
        }
    }

    #[test]
    fn date_range_bounds_are_inclusive() {
        let rows = fixtures();
        let filter = FilterState {
            end_date_range: DateRange::between(
                at("2025-01-11T00:00:00Z"),
                at("2025-01-20T00:00:00Z"),
            ),
            ..FilterState::default()
        };
        assert_eq!(matching(&filter, &rows), vec!["failure-000002", "failure-000003"]);
        assert_eq!(filter.active_count(), 2);
    }

    #[test]
    fn offsetless_created_date_matches_a_bounded_range() {
        let mut row = entity("failure-000005", "org-001", "PENDING", None);
        row.created_date = "2025-01-10T12:00:00".to_string();
        let filter = FilterState {
            created_date_range: DateRange {
                start: Some(at("2025-01-01T00:00:00Z")),
                end: None,
            },
            ..FilterState::default()
        };
        assert!(filter.matches(&row));
    }

    #[test]
    fn chip_removal_and_clear() {
        let mut filter = FilterState {
            id: Some("abc".to_string()),
            ..FilterState::default()
        };
        filter.toggle_org_id("org-001");
        filter.toggle_status("PENDING");
        filter.remove_org_id("org-001");
        filter.clear_id();
        assert_eq!(filter.active_count(), 1);
        filter.remove_status("PENDING");
        assert!(filter.is_empty());

        filter.toggle_status("FAILED");
        filter.clear();
        assert_eq!(filter, FilterState::default());
    }

    #[test]
    fn deserializes_partial_json() {
        let Ok(filter) = serde_json::from_str::<FilterState>(
            r#"{"orgIds": ["org-001"], "createdDateRange": {"start": "2025-01-01T00:00:00Z"}}"#,
        ) else {
            panic!("deserialization failed");
        };
        assert_eq!(filter.org_ids.len(), 1);
        assert_eq!(filter.created_date_range.start, Some(at("2025-01-01T00:00:00Z")));
        assert!(filter.failure_statuses.is_empty());
    }
}
