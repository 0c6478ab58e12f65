//! Issue titles and bodies.
//!
//! The issue title doubles as the identity of an alert group: it is the only thing
//! the reconciler compares when looking for an existing issue, so it must come out
//! byte-identical for every delivery of the same group. Bodies and the debug page
//! are rendered with Handlebars.

mod error;
mod renderer;

pub use error::TemplateError;
pub use renderer::{
    create_handlebars_registry, create_viewer_registry, TemplateRenderer,
    DEFAULT_ISSUE_TEMPLATE,
};

use crate::notification::AlertNotification;

/// Generates the issue title identifying an alert group.
///
/// Format: "[{group_key}] {alertname}"
#[must_use]
pub fn format_title(notification: &AlertNotification) -> String {
    format!("[{}] {}", notification.group_key, notification.alertname())
}

/// Renders the issue body for a notification with the built-in template.
///
/// # Errors
///
/// Returns an error if template rendering fails.
pub fn format_issue_body(notification: &AlertNotification) -> Result<String, TemplateError> {
    TemplateRenderer::new().render_issue_body(notification)
}
