//! Domain layer: the failure entity, the filter/sort model, and query
//! translation.
//!
//! Everything here is pure data and pure functions. The feed controller in
//! [`crate::service`] owns instances of these types and the record stores
//! in [`crate::persistence`] evaluate the queries built from them.

pub mod draft;
pub mod entity;
pub mod failure_id;
pub mod failure_status;
pub mod feed_id;
pub mod filter;
pub mod query;
pub mod sort;

pub use draft::{FailureDraft, NewFailureRecord, payload_from_text};
pub use entity::{StreamFailureEntity, display_date, parse_instant};
pub use failure_id::FailureId;
pub use failure_status::{FailureStatus, StatusPresentation, StatusTone};
pub use feed_id::FeedId;
pub use filter::{DateRange, FilterState};
pub use query::{Constraint, FilterField, PAGE_SIZE, PageRange, RecordQuery, apply_in_memory};
pub use sort::{OrderByClause, SortDirection, SortField, SortOrder};
