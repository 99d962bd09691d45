//! Translation of filter + sort state into record store queries.
//!
//! The same [`FilterState`] and [`SortOrder`] drive two modes:
//! [`apply_in_memory`] filters and sorts a slice directly, and
//! [`RecordQuery::page`] produces the constraint list a remote store
//! evaluates. Both must agree row for row.

use chrono::{DateTime, Utc};

use super::{FilterState, OrderByClause, SortOrder, StreamFailureEntity};

/// Rows per page fetched from the record store.
pub const PAGE_SIZE: usize = 200;

/// Filterable entity fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
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

impl FilterField {
    /// Field name as used by the record store.
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
}

/// One per-field predicate of a remote query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// `field == value`
    Eq(FilterField, String),
    /// `field in values`
    In(FilterField, Vec<String>),
    /// `field >= instant`; null never matches.
    Gte(FilterField, DateTime<Utc>),
    /// `field <= instant`; null never matches.
    Lte(FilterField, DateTime<Utc>),
    /// Case-insensitive substring test.
    ContainsIgnoreCase(FilterField, String),
}

impl Constraint {
    /// Evaluates the constraint against one entity.
    #[must_use]
    pub fn matches(&self, entity: &StreamFailureEntity) -> bool {
        match self {
            Self::Eq(field, value) => text_field(entity, *field) == Some(value.as_str()),
            Self::In(field, values) => {
                text_field(entity, *field).is_some_and(|v| values.iter().any(|x| x == v))
            }
            Self::Gte(field, bound) => date_field(entity, *field).is_some_and(|v| v >= *bound),
            Self::Lte(field, bound) => date_field(entity, *field).is_some_and(|v| v <= *bound),
            Self::ContainsIgnoreCase(field, needle) => text_field(entity, *field)
                .is_some_and(|v| v.to_lowercase().contains(&needle.to_lowercase())),
        }
    }
}

fn text_field(entity: &StreamFailureEntity, field: FilterField) -> Option<&str> {
    match field {
        FilterField::Id => Some(entity.id.as_str()),
        FilterField::OrgId => Some(&entity.org_id),
        FilterField::FailureStatus => Some(entity.failure_status.as_str()),
        FilterField::CreatedDate => Some(&entity.created_date),
        FilterField::EndDate => entity.end_date.as_deref(),
    }
}

fn date_field(entity: &StreamFailureEntity, field: FilterField) -> Option<DateTime<Utc>> {
    match field {
        FilterField::CreatedDate => entity.created_at(),
        FilterField::EndDate => entity.ended_at(),
        _ => None,
    }
}

/// Zero-based inclusive `[from, to]` offset window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    /// First row offset.
    pub from: usize,
    /// Last row offset, inclusive.
    pub to: usize,
}

impl PageRange {
    /// Window of page `index` with `size` rows per page.
    #[must_use]
    pub const fn page(index: usize, size: usize) -> Self {
        let from = index.saturating_mul(size);
        Self {
            from,
            to: from.saturating_add(size.saturating_sub(1)),
        }
    }

    /// Number of rows the window spans.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.to.saturating_sub(self.from).saturating_add(1)
    }

    /// Always `false`; a window spans at least one row.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }
}

/// A complete read request for the record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordQuery {
    /// Conjunction of predicates.
    pub constraints: Vec<Constraint>,
    /// The single active ordering, if any.
    pub order_by: Option<OrderByClause>,
    /// Rows to return.
    pub range: PageRange,
}

impl RecordQuery {
    /// Builds the query for page `index` of the given filter and order.
    #[must_use]
    pub fn page(filter: &FilterState, order: &SortOrder, index: usize) -> Self {
        Self {
            constraints: constraints(filter),
            order_by: order.clause(),
            range: PageRange::page(index, PAGE_SIZE),
        }
    }

    /// `true` if every constraint accepts the entity.
    #[must_use]
    pub fn matches(&self, entity: &StreamFailureEntity) -> bool {
        self.constraints.iter().all(|c| c.matches(entity))
    }
}

/// Translates a filter into remote constraints.
///
/// A single selected org or status becomes `Eq`, several become `In`, and
/// empty selections produce nothing. Each set date bound becomes one
/// `Gte`/`Lte`.
#[must_use]
pub fn constraints(filter: &FilterState) -> Vec<Constraint> {
    let mut out = Vec::new();

    if let Some(needle) = filter.id_needle() {
        out.push(Constraint::ContainsIgnoreCase(FilterField::Id, needle.to_string()));
    }
    push_membership(&mut out, FilterField::OrgId, filter.org_ids.iter());
    push_membership(&mut out, FilterField::FailureStatus, filter.failure_statuses.iter());

    for (field, range) in [
        (FilterField::CreatedDate, &filter.created_date_range),
        (FilterField::EndDate, &filter.end_date_range),
    ] {
        if let Some(start) = range.start {
            out.push(Constraint::Gte(field, start));
        }
        if let Some(end) = range.end {
            out.push(Constraint::Lte(field, end));
        }
    }

    out
}

fn push_membership<'a>(
    out: &mut Vec<Constraint>,
    field: FilterField,
    values: impl ExactSizeIterator<Item = &'a String>,
) {
    let values: Vec<String> = values.cloned().collect();
    match values.as_slice() {
        [] => {}
        [single] => out.push(Constraint::Eq(field, single.clone())),
        _ => out.push(Constraint::In(field, values)),
    }
}

/// In-memory mode: filters `entities` and sorts the survivors.
///
/// The sort is stable, so ties keep their input order.
#[must_use]
pub fn apply_in_memory(
    entities: &[StreamFailureEntity],
    filter: &FilterState,
    order: &SortOrder,
) -> Vec<StreamFailureEntity> {
    let mut out: Vec<StreamFailureEntity> = entities
        .iter()
        .filter(|e| filter.matches(e))
        .cloned()
        .collect();
    out.sort_by(|a, b| order.compare(a, b));
    out
}
