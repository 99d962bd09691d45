//! The stream failure record as the service sees it.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{FailureId, FailureStatus};

/// Table cell format for dates (`Jan 05, 2025 14:30`).
pub const TABLE_DATE_FORMAT: &str = "%b %d, %Y %H:%M";

/// One recorded stream failure.
///
/// Dates are kept exactly as the store returned them and parsed on
/// demand, so a malformed value is carried through and displayed rather
/// than rejected. `failure_payload` is always a JSON object; see
/// [`crate::persistence::StoreRow`] for the normalization that guarantees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StreamFailureEntity {
    /// Store-assigned identifier.
    pub id: FailureId,
    /// Tenant the failure belongs to.
    pub org_id: String,
    /// Processing status; unknown values are preserved.
    #[schema(value_type = String)]
    pub failure_status: FailureStatus,
    /// ISO-8601 creation timestamp.
    pub created_date: String,
    /// ISO-8601 resolution timestamp, `None` while unresolved.
    pub end_date: Option<String>,
    /// Free-form JSON describing the failure.
    #[schema(value_type = Object)]
    pub failure_payload: serde_json::Value,
}

impl StreamFailureEntity {
    /// Parsed creation instant, `None` if the stored value is malformed.
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        parse_instant(&self.created_date)
    }

    /// Parsed resolution instant, `None` if unset or malformed.
    #[must_use]
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.end_date.as_deref().and_then(parse_instant)
    }

    /// Creation date formatted for a table cell. Malformed values are
    /// shown as stored.
    #[must_use]
    pub fn created_display(&self) -> String {
        display_date(Some(&self.created_date), TABLE_DATE_FORMAT, "-")
    }

    /// End date formatted for a table cell, `-` when unresolved.
    #[must_use]
    pub fn end_display(&self) -> String {
        display_date(self.end_date.as_deref(), TABLE_DATE_FORMAT, "-")
    }
}

/// Parses an ISO-8601 timestamp into a UTC instant.
///
/// Offsets are honoured, so `2025-01-01T10:00:00+02:00` and
/// `2025-01-01T08:00:00Z` parse to the same instant. Values without an
/// offset (`2025-01-10T12:00:00`, `2025-01-10 12:00:00.5`) and bare dates
/// (`2025-01-10`, read as midnight) are taken as UTC. Returns `None` for
/// anything unparseable.
#[must_use]
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        })
}

/// Formats an optional raw timestamp with `format`, falling back to the raw
/// text when it does not parse and to `missing` when it is absent.
#[must_use]
pub fn display_date(raw: Option<&str>, format: &str, missing: &str) -> String {
    match raw {
        None => missing.to_string(),
        Some(raw) => parse_instant(raw)
            .map(|dt| dt.format(format).to_string())
            .unwrap_or_else(|| raw.to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn entity(created: &str, end: Option<&str>) -> StreamFailureEntity {
        StreamFailureEntity {
            id: FailureId::from("failure-000001"),
            org_id: "org-001".to_string(),
            failure_status: FailureStatus::Pending,
            created_date: created.to_string(),
            end_date: end.map(str::to_string),
            failure_payload: serde_json::json!({}),
        }
    }

    #[test]
    fn offsets_parse_to_the_same_instant() {
        let a = parse_instant("2025-01-01T10:00:00+02:00");
        let b = parse_instant("2025-01-01T08:00:00Z");
        assert!(a.is_some());
        assert_eq!(a, b);
    }

    #[test]
    fn offsetless_and_date_only_values_read_as_utc() {
        let e = entity("2025-01-10T12:00:00", Some("2025-01-11"));
        assert_eq!(e.created_at(), parse_instant("2025-01-10T12:00:00Z"));
        assert_eq!(e.ended_at(), parse_instant("2025-01-11T00:00:00Z"));
        assert!(e.ended_at().is_some());
        assert_eq!(
            parse_instant("2025-01-10 12:00:00.250"),
            parse_instant("2025-01-10T12:00:00.250Z")
        );
        assert_eq!(e.created_display(), "Jan 10, 2025 12:00");
    }

    #[test]
    fn malformed_dates_do_not_parse() {
        let e = entity("yesterday", Some("2025-13-45"));
        assert_eq!(e.created_at(), None);
        assert_eq!(e.ended_at(), None);
    }

    #[test]
    fn table_display() {
        let e = entity("2025-01-05T14:30:00.000Z", None);
        assert_eq!(e.created_display(), "Jan 05, 2025 14:30");
        assert_eq!(e.end_display(), "-");

        let bad = entity("not a date", None);
        assert_eq!(bad.created_display(), "not a date");
    }

    #[test]
    fn serializes_camel_case() {
        let Ok(json) = serde_json::to_value(entity("2025-01-05T14:30:00Z", None)) else {
            panic!("serialization failed");
        };
        assert_eq!(json["orgId"], "org-001");
        assert_eq!(json["failureStatus"], "PENDING");
        assert!(json["endDate"].is_null());
        assert!(json["failurePayload"].is_object());
    }
}
