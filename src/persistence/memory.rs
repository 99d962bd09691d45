//! In-process record store.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{RecordStore, StoreError, StoreRow};
use crate::domain::{FailureId, NewFailureRecord, RecordQuery, StreamFailureEntity};

/// Record store backed by a `Vec` behind a [`tokio::sync::RwLock`].
///
/// Rows keep insertion order, which is the "natural order" ties fall back
/// to. Queries are evaluated with the same predicate and comparator as the
/// in-memory filter mode.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    rows: RwLock<Vec<StoreRow>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `rows`.
    #[must_use]
    pub fn with_rows(rows: Vec<StoreRow>) -> Self {
        Self {
            rows: RwLock::new(rows),
        }
    }

    /// Number of stored rows.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    /// Returns `true` if the store holds no rows.
    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn query(&self, query: &RecordQuery) -> Result<Vec<StoreRow>, StoreError> {
        let rows = self.rows.read().await;

        let mut matched: Vec<(&StoreRow, StreamFailureEntity)> = rows
            .iter()
            .map(|row| (row, StreamFailureEntity::from(row.clone())))
            .filter(|(_, entity)| query.matches(entity))
            .collect();

        if let Some(clause) = query.order_by {
            matched.sort_by(|(_, a), (_, b)| clause.compare(a, b));
        }

        Ok(matched
            .into_iter()
            .skip(query.range.from)
            .take(query.range.len())
            .map(|(row, _)| row.clone())
            .collect())
    }

    async fn insert(&self, record: &NewFailureRecord) -> Result<StoreRow, StoreError> {
        let row = StoreRow {
            id: FailureId::generate().to_string(),
            org_id: record.org_id.clone(),
            failure_status: record.failure_status.to_string(),
            created_date: record.created_date.clone(),
            end_date: record.end_date.clone(),
            failure_payload: Some(record.failure_payload.clone()),
        };
        self.rows.write().await.push(row.clone());
        tracing::debug!(id = %row.id, org_id = %row.org_id, "failure record inserted");
        Ok(row)
    }
}
