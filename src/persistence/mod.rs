//! Persistence layer: the record store port and its implementations.
//!
//! [`RecordStore`] is the only thing the feed controller knows about
//! storage. [`memory::InMemoryStore`] evaluates queries in process (demo
//! mode and tests); [`postgres::PostgresStore`] translates them to SQL via
//! `sqlx::PgPool`.

pub mod memory;
pub mod models;
pub mod postgres;
pub mod seed;

use async_trait::async_trait;

pub use memory::InMemoryStore;
pub use models::{StoreError, StoreRow};
pub use postgres::PostgresStore;

use crate::domain::{NewFailureRecord, RecordQuery};

/// Remote row store holding stream failure records.
///
/// Implementations must evaluate [`RecordQuery`] constraints with the
/// same semantics as [`crate::domain::FilterState::matches`], honour the
/// single order clause, and return at most `query.range.len()` rows
/// starting at `query.range.from`.
#[async_trait]
pub trait RecordStore: Send + Sync + std::fmt::Debug {
    /// Reads one page of matching rows.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the store rejects or fails the read.
    async fn query(&self, query: &RecordQuery) -> Result<Vec<StoreRow>, StoreError>;

    /// Inserts a record and returns it as stored, id included.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the store rejects or fails the write.
    async fn insert(&self, record: &NewFailureRecord) -> Result<StoreRow, StoreError>;
}
