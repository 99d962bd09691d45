//! Opaque identifier of a stream failure record.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Store-assigned identifier of a [`super::StreamFailureEntity`].
///
/// Opaque to the service: it is never parsed, only compared, displayed,
/// and matched against the id filter. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String)]
pub struct FailureId(String);

impl FailureId {
    /// Wraps a store-assigned identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates an identifier in the `failure-<uuid>` form used by
    /// stores that do not assign their own.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("failure-{}", uuid::Uuid::new_v4().simple()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FailureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for FailureId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for FailureId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_prefixed_and_unique() {
        let a = FailureId::generate();
        let b = FailureId::generate();
        assert!(a.as_str().starts_with("failure-"));
        assert_ne!(a, b);
    }

    #[test]
    fn ordering_is_lexical() {
        assert!(FailureId::from("failure-000001") < FailureId::from("failure-000002"));
    }
}
