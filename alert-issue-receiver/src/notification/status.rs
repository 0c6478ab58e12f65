//! Alert status types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state reported by Alertmanager for an alert group or a single alert.
///
/// Unknown values are kept verbatim in [`AlertStatus::Other`] so decoding never fails
/// on them; the reconciler decides what to do with them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AlertStatus {
    /// At least one alert in the group is active.
    Firing,

    /// Every alert in the group has cleared.
    Resolved,

    /// Any other status string.
    Other(String),
}

impl AlertStatus {
    /// Returns the wire representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Firing => "firing",
            Self::Resolved => "resolved",
            Self::Other(status) => status,
        }
    }
}

impl From<String> for AlertStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "firing" => Self::Firing,
            "resolved" => Self::Resolved,
            _ => Self::Other(value),
        }
    }
}

impl From<AlertStatus> for String {
    fn from(value: AlertStatus) -> Self {
        match value {
            AlertStatus::Other(status) => status,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
