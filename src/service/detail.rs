//! Payload detail view for a single failure.

use serde::Serialize;
use utoipa::ToSchema;

use super::ports::{Clipboard, ClipboardError, Notice, Notifier};
use crate::domain::{
    FailureId, FailureStatus, StatusPresentation, StreamFailureEntity, display_date,
};

/// Long date format used by the detail view (`January 5, 2025 2:30 PM`).
pub const DETAIL_DATE_FORMAT: &str = "%B %-d, %Y %-I:%M %p";

/// Shown in place of a missing end date.
pub const NOT_COMPLETED: &str = "Not completed";

/// Everything the detail dialog shows for one failure.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FailureDetail {
    /// Failure ID.
    pub id: FailureId,
    /// Tenant.
    pub org_id: String,
    /// Raw status.
    #[schema(value_type = String)]
    pub failure_status: FailureStatus,
    /// Badge attributes for the status.
    pub presentation: StatusPresentation,
    /// Human-readable creation date.
    pub created: String,
    /// Human-readable end date, or `Not completed`.
    pub ended: String,
    /// Payload rendered with two-space indentation.
    pub payload_pretty: String,
    /// Payload as stored.
    #[schema(value_type = Object)]
    pub failure_payload: serde_json::Value,
}

impl From<&StreamFailureEntity> for FailureDetail {
    fn from(entity: &StreamFailureEntity) -> Self {
        Self {
            id: entity.id.clone(),
            org_id: entity.org_id.clone(),
            failure_status: entity.failure_status.clone(),
            presentation: entity.failure_status.presentation(),
            created: display_date(Some(&entity.created_date), DETAIL_DATE_FORMAT, "-"),
            ended: display_date(entity.end_date.as_deref(), DETAIL_DATE_FORMAT, NOT_COMPLETED),
            payload_pretty: pretty_json(&entity.failure_payload),
            failure_payload: entity.failure_payload.clone(),
        }
    }
}

fn pretty_json(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Copies the pretty-printed payload to `clipboard` and reports the result
/// through `notifier`.
///
/// # Errors
///
/// Returns the [`ClipboardError`] if the write is refused; an error notice
/// is emitted as well.
pub fn copy_payload(
    detail: &FailureDetail,
    clipboard: &dyn Clipboard,
    notifier: &dyn Notifier,
) -> Result<(), ClipboardError> {
    match clipboard.write_text(&detail.payload_pretty) {
        Ok(()) => {
            notifier.notify(Notice::success("Copied to clipboard"));
            Ok(())
        }
        Err(err) => {
            notifier.notify(Notice::error("Copy failed", err.to_string()));
            Err(err)
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::StatusTone;
    use crate::service::ports::{MemoryClipboard, NoticeLevel, RecordingNotifier};
    use serde_json::json;

    fn entity(end: Option<&str>) -> StreamFailureEntity {
        StreamFailureEntity {
            id: FailureId::new("failure-000042"),
            org_id: "org-002".to_string(),
            failure_status: FailureStatus::Escalated,
            created_date: "2025-01-05T14:30:00Z".to_string(),
            end_date: end.map(str::to_string),
            failure_payload: json!({ "errorCode": "AUTH_FAILED" }),
        }
    }

    #[derive(Debug)]
    struct BrokenClipboard;

    impl Clipboard for BrokenClipboard {
        fn write_text(&self, _text: &str) -> Result<(), ClipboardError> {
            Err(ClipboardError("permission denied".to_string()))
        }
    }

    #[test]
    fn detail_formats_dates_for_humans() {
        let detail = FailureDetail::from(&entity(Some("2025-01-06T09:05:00Z")));
        assert_eq!(detail.created, "January 5, 2025 2:30 PM");
        assert_eq!(detail.ended, "January 6, 2025 9:05 AM");
        assert_eq!(detail.presentation.tone, StatusTone::Critical);
    }

    #[test]
    fn missing_end_date_reads_not_completed() {
        let detail = FailureDetail::from(&entity(None));
        assert_eq!(detail.ended, NOT_COMPLETED);
    }

    #[test]
    fn payload_is_pretty_printed() {
        let detail = FailureDetail::from(&entity(None));
        assert_eq!(detail.payload_pretty, "{\n  \"errorCode\": \"AUTH_FAILED\"\n}");
    }

    #[test]
    fn copy_writes_payload_and_confirms() {
        let detail = FailureDetail::from(&entity(None));
        let clipboard = MemoryClipboard::new();
        let notifier = RecordingNotifier::new();

        let Ok(()) = copy_payload(&detail, &clipboard, &notifier) else {
            panic!("copy failed");
        };
        assert_eq!(clipboard.contents(), Some(detail.payload_pretty.clone()));
        assert_eq!(
            notifier.notices().first().map(|n| n.title.as_str()),
            Some("Copied to clipboard")
        );
    }

    #[test]
    fn refused_copy_reports_an_error() {
        let detail = FailureDetail::from(&entity(None));
        let notifier = RecordingNotifier::new();
        let Err(_) = copy_payload(&detail, &BrokenClipboard, &notifier) else {
            panic!("copy should fail");
        };
        assert_eq!(
            notifier.notices().first().map(|n| n.level),
            Some(NoticeLevel::Error)
        );
    }
}
