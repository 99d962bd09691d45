//! Type-safe feed session identifier.
//!
//! [`FeedId`] is a newtype wrapper around [`uuid::Uuid`] (v4) so that feed
//! session identifiers cannot be confused with other UUIDs.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Unique identifier for one viewer session's feed.
///
/// Generated when the session is opened and used as the key in
/// [`crate::service::FeedRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, format = Uuid)]
pub struct FeedId(uuid::Uuid);

impl FeedId {
    /// Creates a new random `FeedId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Creates a `FeedId` from an existing [`uuid::Uuid`].
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for FeedId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<uuid::Uuid> for FeedId {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }
}
