//! # stream-failure-feed
//!
//! Headless backend for a stream failure viewer: a filter/sort model over
//! recorded stream failures and a paginated feed controller that keeps a
//! viewer's result window in step with it, served over a REST API.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── FeedService (service/)
//!     ├── FeedRegistry ── FailureFeed × N (service/)
//!     ├── Notifier / Clipboard ports (service/)
//!     │
//!     ├── FilterState · SortOrder · RecordQuery (domain/)
//!     │
//!     └── RecordStore (persistence/): in-memory or PostgreSQL
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
