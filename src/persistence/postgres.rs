//! PostgreSQL implementation of the record store.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{RecordStore, StoreError, StoreRow};
use crate::config::ViewerConfig;
use crate::domain::{
    Constraint, FailureId, FilterField, NewFailureRecord, RecordQuery, SortDirection, SortField,
    parse_instant,
};

const SELECT_COLUMNS: &str =
    "SELECT id, org_id, failure_status, created_date, end_date, failure_payload FROM stream_failures";

type PgFailureRow = (
    String,
    String,
    String,
    DateTime<Utc>,
    Option<DateTime<Utc>>,
    Option<serde_json::Value>,
);

/// PostgreSQL-backed record store using `sqlx::PgPool`.
///
/// Rows live in the `stream_failures` table created by the bundled
/// migrations. Dates are `TIMESTAMPTZ`, so the database compares instants
/// natively.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool sized by `config`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the database cannot be reached.
    pub async fn connect(config: &ViewerConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Applies the bundled schema migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError::Backend`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

#[async_trait]
impl RecordStore for PostgresStore {
    async fn query(&self, query: &RecordQuery) -> Result<Vec<StoreRow>, StoreError> {
        let mut builder = build_select(query)?;
        let rows = builder
            .build_query_as::<PgFailureRow>()
            .fetch_all(&self.pool)
            .await?;
        tracing::debug!(rows = rows.len(), from = query.range.from, "stream_failures queried");
        Ok(rows.into_iter().map(into_store_row).collect())
    }

    async fn insert(&self, record: &NewFailureRecord) -> Result<StoreRow, StoreError> {
        let created = parse_instant(&record.created_date).ok_or_else(|| {
            StoreError::Backend(format!("invalid createdDate: {}", record.created_date))
        })?;
        let ended = match record.end_date.as_deref() {
            None => None,
            Some(raw) => Some(
                parse_instant(raw)
                    .ok_or_else(|| StoreError::Backend(format!("invalid endDate: {raw}")))?,
            ),
        };

        let row = sqlx::query_as::<_, PgFailureRow>(
            "INSERT INTO stream_failures \
             (id, org_id, failure_status, created_date, end_date, failure_payload) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, org_id, failure_status, created_date, end_date, failure_payload",
        )
        .bind(FailureId::generate().to_string())
        .bind(&record.org_id)
        .bind(record.failure_status.as_str())
        .bind(created)
        .bind(ended)
        .bind(&record.failure_payload)
        .fetch_one(&self.pool)
        .await?;

        Ok(into_store_row(row))
    }
}

fn into_store_row(
    (id, org_id, failure_status, created_date, end_date, failure_payload): PgFailureRow,
) -> StoreRow {
    StoreRow {
        id,
        org_id,
        failure_status,
        created_date: created_date.to_rfc3339_opts(SecondsFormat::Millis, true),
        end_date: end_date.map(|d| d.to_rfc3339_opts(SecondsFormat::Millis, true)),
        failure_payload,
    }
}

const fn filter_column(field: FilterField) -> &'static str {
    match field {
        FilterField::Id => "id",
        FilterField::OrgId => "org_id",
        FilterField::FailureStatus => "failure_status",
        FilterField::CreatedDate => "created_date",
        FilterField::EndDate => "end_date",
    }
}

const fn sort_column(field: SortField) -> &'static str {
    match field {
        SortField::Id => "id",
        SortField::OrgId => "org_id",
        SortField::FailureStatus => "failure_status",
        SortField::CreatedDate => "created_date",
        SortField::EndDate => "end_date",
    }
}

/// Escapes `%`, `_` and `\` so the needle matches literally under `ILIKE`.
fn escape_like(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len());
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Translates a [`RecordQuery`] into a parameterized `SELECT`.
///
/// Nulls sort last ascending and first descending, matching the
/// in-memory comparator.
fn build_select(query: &RecordQuery) -> Result<QueryBuilder<'static, Postgres>, StoreError> {
    let mut builder = QueryBuilder::<Postgres>::new(SELECT_COLUMNS);

    for (i, constraint) in query.constraints.iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        match constraint {
            Constraint::Eq(field, value) => {
                builder.push(filter_column(*field)).push(" = ").push_bind(value.clone());
            }
            Constraint::In(field, values) => {
                builder
                    .push(filter_column(*field))
                    .push(" = ANY(")
                    .push_bind(values.clone())
                    .push(")");
            }
            Constraint::Gte(field, bound) => {
                builder.push(filter_column(*field)).push(" >= ").push_bind(*bound);
            }
            Constraint::Lte(field, bound) => {
                builder.push(filter_column(*field)).push(" <= ").push_bind(*bound);
            }
            Constraint::ContainsIgnoreCase(field, needle) => {
                builder
                    .push(filter_column(*field))
                    .push(" ILIKE ")
                    .push_bind(format!("%{}%", escape_like(needle)))
                    .push(" ESCAPE '\\'");
            }
        }
    }

    if let Some(clause) = query.order_by {
        builder.push(" ORDER BY ").push(sort_column(clause.field));
        builder.push(match clause.direction {
            SortDirection::Asc => " ASC NULLS LAST",
            SortDirection::Desc => " DESC NULLS FIRST",
        });
    }

    let limit = i64::try_from(query.range.len())
        .map_err(|_| StoreError::Backend("page window too large".to_string()))?;
    let offset = i64::try_from(query.range.from)
        .map_err(|_| StoreError::Backend("page offset too large".to_string()))?;
    builder.push(" LIMIT ").push_bind(limit);
    builder.push(" OFFSET ").push_bind(offset);

    Ok(builder)
}
