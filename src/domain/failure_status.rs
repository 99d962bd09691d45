//! Failure status values and their display attributes.
//!
//! Statuses are an open set: the five known values get dedicated variants,
//! anything else the store hands back is kept verbatim in
//! [`FailureStatus::Other`] and still renders.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use utoipa::ToSchema;

/// Processing status of a stream failure.
///
/// Serialized as the bare status string; in OpenAPI schemas fields of this
/// type are declared as `String`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FailureStatus {
    /// Recorded, not yet picked up.
    Pending,
    /// Being worked on.
    Processing,
    /// Processing gave up.
    Failed,
    /// Closed out.
    Resolved,
    /// Handed to a human.
    Escalated,
    /// A status this service does not know about.
    Other(String),
}

impl FailureStatus {
    /// The statuses offered by the create form and the filter sidebar, in
    /// display order.
    pub const KNOWN: [Self; 5] = [
        Self::Pending,
        Self::Processing,
        Self::Failed,
        Self::Resolved,
        Self::Escalated,
    ];

    /// Returns the wire representation (`"PENDING"`, ...).
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "PENDING",
            Self::Processing => "PROCESSING",
            Self::Failed => "FAILED",
            Self::Resolved => "RESOLVED",
            Self::Escalated => "ESCALATED",
            Self::Other(raw) => raw,
        }
    }

    /// Returns `true` for one of the [`Self::KNOWN`] statuses.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Looks up how this status is displayed.
    ///
    /// This is the only status → display mapping in the crate; the feed
    /// table, the detail view, and the status catalog endpoint all use it.
    #[must_use]
    pub fn presentation(&self) -> StatusPresentation {
        let (tone, badge_class) = match self {
            Self::Pending => (StatusTone::Warning, "bg-yellow-100 text-yellow-800"),
            Self::Processing => (StatusTone::Info, "bg-blue-100 text-blue-800"),
            Self::Failed => (StatusTone::Danger, "bg-red-100 text-red-800"),
            Self::Resolved => (StatusTone::Success, "bg-green-100 text-green-800"),
            Self::Escalated => (StatusTone::Critical, "bg-purple-100 text-purple-800"),
            Self::Other(_) => (StatusTone::Neutral, "bg-gray-100 text-gray-800"),
        };
        StatusPresentation {
            label: self.as_str().to_string(),
            tone,
            badge_class: badge_class.to_string(),
        }
    }
}

impl fmt::Display for FailureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FailureStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl From<&str> for FailureStatus {
    fn from(s: &str) -> Self {
        match s {
            "PENDING" => Self::Pending,
            "PROCESSING" => Self::Processing,
            "FAILED" => Self::Failed,
            "RESOLVED" => Self::Resolved,
            "ESCALATED" => Self::Escalated,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for FailureStatus {
    fn from(s: String) -> Self {
        match Self::from(s.as_str()) {
            Self::Other(_) => Self::Other(s),
            known => known,
        }
    }
}

impl Serialize for FailureStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FailureStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

/// Visual weight of a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StatusTone {
    /// Yellow.
    Warning,
    /// Blue.
    Info,
    /// Red.
    Danger,
    /// Green.
    Success,
    /// Purple.
    Critical,
    /// Gray; used for unknown statuses.
    Neutral,
}

/// Display attributes for one [`FailureStatus`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusPresentation {
    /// Badge text.
    pub label: String,
    /// Semantic colour.
    pub tone: StatusTone,
    /// Utility classes for the badge.
    pub badge_class: String,
}
