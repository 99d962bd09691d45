//! Store-level row shape and errors.

use serde::{Deserialize, Serialize};

use crate::domain::{FailureId, FailureStatus, StreamFailureEntity};

/// Errors raised by a [`super::RecordStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached (connection, pool timeout, ...).
    #[error("record store unavailable: {0}")]
    Unavailable(String),

    /// The store was reached but rejected or failed the operation.
    #[error("record store error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Short machine-readable category.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "unavailable",
            Self::Backend(_) => "backend",
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                Self::Unavailable(err.to_string())
            }
            other => Self::Backend(other.to_string()),
        }
    }
}

/// A row as the record store returns it.
///
/// Looser than [`StreamFailureEntity`]: the payload may be missing or of
/// any JSON type. Convert with `StreamFailureEntity::from`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRow {
    /// Store-assigned identifier.
    pub id: String,
    /// Tenant.
    pub org_id: String,
    /// Status string, possibly unknown.
    pub failure_status: String,
    /// ISO-8601 creation timestamp.
    pub created_date: String,
    /// ISO-8601 resolution timestamp.
    #[serde(default)]
    pub end_date: Option<String>,
    /// Raw payload, if any.
    #[serde(default)]
    pub failure_payload: Option<serde_json::Value>,
}

impl From<StoreRow> for StreamFailureEntity {
    /// Normalizes a row; a missing or non-object payload becomes `{}`.
    fn from(row: StoreRow) -> Self {
        let failure_payload = match row.failure_payload {
            Some(value @ serde_json::Value::Object(_)) => value,
            _ => serde_json::Value::Object(serde_json::Map::new()),
        };
        Self {
            id: FailureId::new(row.id),
            org_id: row.org_id,
            failure_status: FailureStatus::from(row.failure_status),
            created_date: row.created_date,
            end_date: row.end_date,
            failure_payload,
        }
    }
}

impl From<&StreamFailureEntity> for StoreRow {
    fn from(entity: &StreamFailureEntity) -> Self {
        Self {
            id: entity.id.to_string(),
            org_id: entity.org_id.clone(),
            failure_status: entity.failure_status.to_string(),
            created_date: entity.created_date.clone(),
            end_date: entity.end_date.clone(),
            failure_payload: Some(entity.failure_payload.clone()),
        }
    }
}
