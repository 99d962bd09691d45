//! Single-key sort order and its comparator.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::StreamFailureEntity;
use crate::error::ViewerError;

/// Entity fields a feed can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    /// `id`
    Id,
    /// `orgId`
    OrgId,
    /// `failureStatus`
    FailureStatus,
    /// `createdDate`
    CreatedDate,
    /// `endDate`
    EndDate,
}

impl SortField {
    /// Field name as used on the wire and in the record store.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::OrgId => "orgId",
            Self::FailureStatus => "failureStatus",
            Self::CreatedDate => "createdDate",
            Self::EndDate => "endDate",
        }
    }

    /// Whether values of this field are compared as instants.
    #[must_use]
    pub const fn is_date(self) -> bool {
        matches!(self, Self::CreatedDate | Self::EndDate)
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = ViewerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(Self::Id),
            "orgId" => Ok(Self::OrgId),
            "failureStatus" => Ok(Self::FailureStatus),
            "createdDate" => Ok(Self::CreatedDate),
            "endDate" => Ok(Self::EndDate),
            other => Err(ViewerError::UnknownSortField(other.to_string())),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    Asc,
    /// Largest first.
    Desc,
}

impl SortDirection {
    /// The opposite direction.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    /// Applies this direction to an ascending comparison result.
    #[must_use]
    pub const fn apply(self, ascending: Ordering) -> Ordering {
        match self {
            Self::Asc => ascending,
            Self::Desc => ascending.reverse(),
        }
    }
}

/// One `{field, direction}` sort clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct OrderByClause {
    /// Field to sort by.
    pub field: SortField,
    /// Direction to sort in.
    pub direction: SortDirection,
}

impl OrderByClause {
    /// Creates a clause.
    #[must_use]
    pub const fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Compares two entities under this clause.
    ///
    /// The ascending comparison is computed once and `Desc` reverses it.
    /// Date fields compare parsed instants; a null or malformed date is
    /// unorderable and sorts after every valid date in ascending order
    /// (and therefore before them in descending order).
    #[must_use]
    pub fn compare(&self, a: &StreamFailureEntity, b: &StreamFailureEntity) -> Ordering {
        self.direction.apply(compare_ascending(self.field, a, b))
    }
}

fn compare_ascending(field: SortField, a: &StreamFailureEntity, b: &StreamFailureEntity) -> Ordering {
    match field {
        SortField::Id => a.id.cmp(&b.id),
        SortField::OrgId => a.org_id.cmp(&b.org_id),
        SortField::FailureStatus => a.failure_status.as_str().cmp(b.failure_status.as_str()),
        SortField::CreatedDate => compare_instants(a.created_at(), b.created_at()),
        SortField::EndDate => compare_instants(a.ended_at(), b.ended_at()),
    }
}

fn compare_instants(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// The active sort order of a feed: at most one clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SortOrder {
    clause: Option<OrderByClause>,
}

impl SortOrder {
    /// No ordering; rows come back in the store's natural order.
    #[must_use]
    pub const fn unsorted() -> Self {
        Self { clause: None }
    }

    /// Orders by a single clause.
    #[must_use]
    pub const fn by(field: SortField, direction: SortDirection) -> Self {
        Self {
            clause: Some(OrderByClause::new(field, direction)),
        }
    }

    /// The active clause, if any.
    #[must_use]
    pub const fn clause(&self) -> Option<OrderByClause> {
        self.clause
    }

    /// Header-click toggle.
    ///
    /// Clicking the active field flips its direction; clicking any other
    /// field replaces the clause with that field ascending.
    pub fn toggle(&mut self, field: SortField) {
        self.clause = Some(match self.clause {
            Some(active) if active.field == field => {
                OrderByClause::new(field, active.direction.flipped())
            }
            _ => OrderByClause::new(field, SortDirection::Asc),
        });
    }

    /// Arrow shown next to a column header: `↑`, `↓`, or nothing when the
    /// column is not the sort key.
    #[must_use]
    pub fn indicator(&self, field: SortField) -> Option<&'static str> {
        self.clause
            .filter(|c| c.field == field)
            .map(|c| match c.direction {
                SortDirection::Asc => "↑",
                SortDirection::Desc => "↓",
            })
    }

    /// Compares two entities; `Equal` when unsorted.
    #[must_use]
    pub fn compare(&self, a: &StreamFailureEntity, b: &StreamFailureEntity) -> Ordering {
        self.clause.map_or(Ordering::Equal, |c| c.compare(a, b))
    }
}

/// Newest first.
impl Default for SortOrder {
    fn default() -> Self {
        Self::by(SortField::CreatedDate, SortDirection::Desc)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{FailureId, FailureStatus};

    fn entity(id: &str, created: &str, end: Option<&str>) -> StreamFailureEntity {
        StreamFailureEntity {
            id: FailureId::from(id),
            org_id: "org-001".to_string(),
            failure_status: FailureStatus::Pending,
            created_date: created.to_string(),
            end_date: end.map(str::to_string),
            failure_payload: serde_json::json!({}),
        }
    }

    fn ids(entities: &[StreamFailureEntity]) -> Vec<&str> {
        entities.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn parses_known_fields_and_rejects_others() {
        assert!(matches!("createdDate".parse::<SortField>(), Ok(SortField::CreatedDate)));
        assert!(matches!("endDate".parse::<SortField>(), Ok(SortField::EndDate)));
        let Err(err) = "failurePayload".parse::<SortField>() else {
            panic!("payload is not sortable");
        };
        assert!(matches!(err, ViewerError::UnknownSortField(f) if f == "failurePayload"));
    }

    #[test]
    fn toggle_same_field_flips_direction() {
        let mut order = SortOrder::by(SortField::Id, SortDirection::Asc);
        order.toggle(SortField::Id);
        assert_eq!(
            order.clause(),
            Some(OrderByClause::new(SortField::Id, SortDirection::Desc))
        );
        order.toggle(SortField::Id);
        assert_eq!(
            order.clause(),
            Some(OrderByClause::new(SortField::Id, SortDirection::Asc))
        );
    }

    #[test]
    fn toggle_other_field_replaces_with_ascending() {
        let mut order = SortOrder::default();
        order.toggle(SortField::FailureStatus);
        assert_eq!(
            order.clause(),
            Some(OrderByClause::new(SortField::FailureStatus, SortDirection::Asc))
        );
    }

    #[test]
    fn dates_compare_as_instants_not_strings() {
        // Lexically "2025-01-01T09..." < "2025-01-01T10...", but the +02:00
        // value is actually 07:00Z and therefore earlier.
        let mut rows = vec![
            entity("a", "2025-01-01T09:00:00Z", None),
            entity("b", "2025-01-01T09:00:00+02:00", None),
        ];
        let order = SortOrder::by(SortField::CreatedDate, SortDirection::Asc);
        rows.sort_by(|x, y| order.compare(x, y));
        assert_eq!(ids(&rows), vec!["b", "a"]);
    }

    #[test]
    fn desc_is_reverse_of_asc() {
        let rows = vec![
            entity("a", "2025-03-01T00:00:00Z", None),
            entity("b", "2025-01-01T00:00:00Z", None),
            entity("c", "2025-02-01T00:00:00Z", None),
        ];
        let mut asc = rows.clone();
        asc.sort_by(|x, y| SortOrder::by(SortField::CreatedDate, SortDirection::Asc).compare(x, y));
        let mut desc = rows;
        desc.sort_by(|x, y| SortOrder::by(SortField::CreatedDate, SortDirection::Desc).compare(x, y));
        desc.reverse();
        assert_eq!(ids(&asc), ids(&desc));
    }

    #[test]
    fn unorderable_dates_sort_last_ascending_first_descending() {
        let rows = vec![
            entity("null-end", "2025-01-01T00:00:00Z", None),
            entity("valid", "2025-01-01T00:00:00Z", Some("2025-01-02T00:00:00Z")),
            entity("garbage", "2025-01-01T00:00:00Z", Some("soon")),
        ];
        let mut asc = rows.clone();
        asc.sort_by(|x, y| SortOrder::by(SortField::EndDate, SortDirection::Asc).compare(x, y));
        assert_eq!(ids(&asc), vec!["valid", "null-end", "garbage"]);

        let mut desc = rows;
        desc.sort_by(|x, y| SortOrder::by(SortField::EndDate, SortDirection::Desc).compare(x, y));
        assert_eq!(desc.last().map(|e| e.id.as_str()), Some("valid"));
    }

    #[test]
    fn indicator_follows_active_clause() {
        let order = SortOrder::by(SortField::EndDate, SortDirection::Desc);
        assert_eq!(order.indicator(SortField::EndDate), Some("↓"));
        assert_eq!(order.indicator(SortField::Id), None);
        assert_eq!(SortOrder::unsorted().indicator(SortField::Id), None);
    }

    #[test]
    fn serializes_direction_lowercase() {
        let Ok(json) = serde_json::to_value(OrderByClause::new(SortField::EndDate, SortDirection::Desc))
        else {
            panic!("serialization failed");
        };
        assert_eq!(json, serde_json::json!({ "field": "endDate", "direction": "desc" }));
    }
}
