//! Alertmanager webhook payloads.
//!
//! This module decodes the JSON body Alertmanager posts to a webhook receiver into an
//! [`AlertNotification`]. Two shapes are accepted: the payload Alertmanager actually
//! sends (group fields at the top level next to `groupKey`), and an envelope where the
//! group fields sit under a `data` key.

mod error;
mod status;

pub use error::NotificationError;
pub use status::AlertStatus;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Label carrying the alert name in an alert group's labels.
pub const ALERTNAME_LABEL: &str = "alertname";

/// A decoded webhook notification for one alert group.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertNotification {
    /// Webhook schema version sent by Alertmanager (e.g. "4").
    pub version: String,

    /// Opaque key identifying the alert group.
    pub group_key: String,

    /// Group-level data.
    pub data: AlertGroup,
}

/// Group-level fields of a webhook notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertGroup {
    /// Name of the Alertmanager receiver that sent the notification.
    #[serde(default)]
    pub receiver: String,

    /// Status of the group as a whole.
    pub status: AlertStatus,

    /// Individual alerts in the group.
    #[serde(default)]
    pub alerts: Vec<Alert>,

    /// Labels the group was formed on.
    #[serde(default)]
    pub group_labels: BTreeMap<String, String>,

    /// Labels shared by every alert in the group.
    #[serde(default)]
    pub common_labels: BTreeMap<String, String>,

    /// Annotations shared by every alert in the group.
    #[serde(default)]
    pub common_annotations: BTreeMap<String, String>,

    /// Link back to the Alertmanager instance.
    #[serde(default, rename = "externalURL")]
    pub external_url: String,
}

/// A single alert within a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub status: AlertStatus,

    #[serde(default)]
    pub labels: BTreeMap<String, String>,

    #[serde(default)]
    pub annotations: BTreeMap<String, String>,

    /// RFC 3339 timestamp, kept as text since it is only displayed.
    #[serde(default)]
    pub starts_at: String,

    #[serde(default)]
    pub ends_at: String,

    #[serde(default, rename = "generatorURL")]
    pub generator_url: String,

    #[serde(default)]
    pub fingerprint: String,
}

/// Payload with group fields nested under `data`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopedMessage {
    #[serde(default)]
    version: String,
    group_key: String,
    data: AlertGroup,
}

/// Payload with group fields at the top level, as Alertmanager sends it.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlatMessage {
    #[serde(default)]
    version: String,
    group_key: String,
    #[serde(flatten)]
    data: AlertGroup,
}

impl AlertNotification {
    /// Decodes a webhook request body.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::Decode`] if the body is not JSON or lacks the
    /// required `groupKey` and `status` fields.
    pub fn decode(body: &[u8]) -> Result<Self, NotificationError> {
        let value: Value = serde_json::from_slice(body)?;

        let notification = if value.get("data").is_some_and(Value::is_object) {
            let message: EnvelopedMessage = serde_json::from_value(value)?;
            Self {
                version: message.version,
                group_key: message.group_key,
                data: message.data,
            }
        } else {
            let message: FlatMessage = serde_json::from_value(value)?;
            Self {
                version: message.version,
                group_key: message.group_key,
                data: message.data,
            }
        };

        Ok(notification)
    }

    /// Returns the group status.
    #[must_use]
    pub fn status(&self) -> &AlertStatus {
        &self.data.status
    }

    /// Returns the `alertname` group label, or an empty string if it is absent.
    #[must_use]
    pub fn alertname(&self) -> &str {
        self.data
            .group_labels
            .get(ALERTNAME_LABEL)
            .map_or("", String::as_str)
    }
}
