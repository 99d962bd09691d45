//! Manually entered failure records.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::FailureStatus;

/// What the create form submits.
///
/// `failure_payload` is raw text: ideally a JSON object, but anything is
/// accepted. See [`payload_from_text`] for how it is interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FailureDraft {
    /// Tenant the failure belongs to.
    pub org_id: String,
    /// Initial status.
    pub failure_status: String,
    /// Payload text as typed.
    #[serde(default)]
    pub failure_payload: String,
}

/// A record ready for [`crate::persistence::RecordStore::insert`]; the store
/// assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFailureRecord {
    /// Tenant the failure belongs to.
    pub org_id: String,
    /// Initial status.
    pub failure_status: FailureStatus,
    /// ISO-8601 creation timestamp.
    pub created_date: String,
    /// Always `None` for a new record.
    pub end_date: Option<String>,
    /// Interpreted payload, always a JSON object.
    pub failure_payload: serde_json::Value,
}

impl FailureDraft {
    /// Checks the fields the form marks as required.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first blank field.
    pub fn validate(&self) -> Result<(), String> {
        if self.org_id.trim().is_empty() {
            return Err("orgId is required".to_string());
        }
        if self.failure_status.trim().is_empty() {
            return Err("failureStatus is required".to_string());
        }
        Ok(())
    }

    /// Builds the record to insert, stamped with `now` as creation date.
    #[must_use]
    pub fn to_record(&self, now: DateTime<Utc>) -> NewFailureRecord {
        NewFailureRecord {
            org_id: self.org_id.trim().to_string(),
            failure_status: FailureStatus::from(self.failure_status.trim()),
            created_date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            end_date: None,
            failure_payload: payload_from_text(&self.failure_payload),
        }
    }
}

/// Interprets payload text typed into the create form.
///
/// - blank text → `{}`
/// - a JSON object → that object
/// - anything else, including valid JSON that is not an object →
///   `{"message": <text>}`
///
/// Non-JSON text is never an error.
#[must_use]
pub fn payload_from_text(text: &str) -> serde_json::Value {
    if text.trim().is_empty() {
        return serde_json::Value::Object(serde_json::Map::new());
    }
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value @ serde_json::Value::Object(_)) => value,
        _ => serde_json::json!({ "message": text }),
    }
}
