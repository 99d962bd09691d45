//! Service layer: feed sessions and their side-effect ports.
//!
//! [`FeedService`] opens [`FailureFeed`] sessions, keeps them in the
//! [`FeedRegistry`], and routes each operation to its feed.

pub mod detail;
pub mod feed;
pub mod feed_service;
pub mod ports;
pub mod registry;

pub use detail::{FailureDetail, copy_payload};
pub use feed::{FailureFeed, FeedSnapshot, FeedStatus, FetchOutcome};
pub use feed_service::FeedService;
pub use ports::{Clipboard, MemoryClipboard, Notice, Notifier, TracingNotifier};
pub use registry::FeedRegistry;
