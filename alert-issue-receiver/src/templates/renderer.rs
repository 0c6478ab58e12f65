//! Template renderer.

use crate::directory::TrackedIssue;
use crate::notification::AlertNotification;
use crate::summary::SummarySnapshot;
use handlebars::{
    no_escape, Context, Handlebars, Helper, HelperResult, Output, RenderContext, Template,
};
use serde_json::{json, Value};

/// Built-in issue body template.
pub const DEFAULT_ISSUE_TEMPLATE: &str = include_str!("issue-template.md");

/// Debug page listing open issues.
const ISSUE_VIEWER_TEMPLATE: &str = include_str!("issue-viewer.html");

/// Creates the Handlebars registry used for issue bodies.
///
/// The registry is configured with:
/// - No HTML escaping (issue bodies are markdown)
/// - Strict mode (catches missing variables)
/// - `eq` helper for equality comparisons
#[must_use]
pub fn create_handlebars_registry() -> Handlebars<'static> {
    let mut hbs = Handlebars::new();

    // Disable HTML escaping for markdown output
    hbs.register_escape_fn(no_escape);

    // Enable strict mode to catch missing variables
    hbs.set_strict_mode(true);

    hbs.register_helper("eq", Box::new(eq_helper));

    hbs
}

/// Creates the Handlebars registry used for the HTML issue viewer.
///
/// Keeps the default HTML escaping, since issue titles carry raw label values.
#[must_use]
pub fn create_viewer_registry() -> Handlebars<'static> {
    Handlebars::new()
}

/// Helper function for equality comparison in templates.
///
/// Usage: `{{#if (eq status "firing")}}...{{/if}}`
fn eq_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let param1 = h.param(0).and_then(|v| v.value().as_str());
    let param2 = h.param(1).and_then(|v| v.value().as_str());

    let result = match (param1, param2) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    };

    out.write(if result { "true" } else { "" })?;
    Ok(())
}

/// Renders issue bodies and the issue viewer page.
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
    viewer: Handlebars<'static>,
    issue_template: String,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    /// Creates a renderer using the built-in issue body template.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlebars: create_handlebars_registry(),
            viewer: create_viewer_registry(),
            issue_template: DEFAULT_ISSUE_TEMPLATE.to_string(),
        }
    }

    /// Creates a renderer using a custom issue body template.
    ///
    /// The template is compiled up front so a broken template is reported at
    /// start-up rather than on the first firing alert.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::CompileError`][`super::TemplateError::CompileError`]
    /// if the template does not compile.
    pub fn with_issue_template(template: impl Into<String>) -> Result<Self, super::TemplateError> {
        let issue_template = template.into();
        Template::compile(&issue_template)?;

        Ok(Self {
            issue_template,
            ..Self::new()
        })
    }

    /// Renders the issue body for a notification.
    ///
    /// Available variables: `group_key`, `status`, `alertname`, `receiver`,
    /// `external_url`, `group_labels`, `common_labels`, `common_annotations` and
    /// `alerts` (each with `status`, `labels`, `annotations`, `starts_at`,
    /// `ends_at`, `generator_url` and `fingerprint`).
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_issue_body(
        &self,
        notification: &AlertNotification,
    ) -> Result<String, super::TemplateError> {
        let data = issue_context(notification);
        Ok(self
            .handlebars
            .render_template(&self.issue_template, &data)?)
    }

    /// Renders the HTML issue viewer.
    ///
    /// When `error` is set it is shown in place of the issue table.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_issue_viewer(
        &self,
        issues: &[TrackedIssue],
        error: Option<&str>,
        summary: &SummarySnapshot,
    ) -> Result<String, super::TemplateError> {
        let data = json!({
            "issues": issues,
            "error": error,
            "summary": summary,
        });

        Ok(self.viewer.render_template(ISSUE_VIEWER_TEMPLATE, &data)?)
    }
}

fn issue_context(notification: &AlertNotification) -> Value {
    let alerts: Vec<Value> = notification
        .data
        .alerts
        .iter()
        .map(|alert| {
            json!({
                "status": alert.status.as_str(),
                "labels": alert.labels,
                "annotations": alert.annotations,
                "starts_at": alert.starts_at,
                "ends_at": alert.ends_at,
                "generator_url": alert.generator_url,
                "fingerprint": alert.fingerprint,
            })
        })
        .collect();

    json!({
        "group_key": notification.group_key,
        "status": notification.status().as_str(),
        "alertname": notification.alertname(),
        "receiver": notification.data.receiver,
        "external_url": notification.data.external_url,
        "group_labels": notification.data.group_labels,
        "common_labels": notification.data.common_labels,
        "common_annotations": notification.data.common_annotations,
        "alerts": alerts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::IssueState;
    use crate::templates::TemplateError;

    fn sample_notification() -> AlertNotification {
        AlertNotification::decode(
            br#"{
                "groupKey": "{}:{alertname=\"DiskRunningFull\"}",
                "status": "firing",
                "alerts": [
                    {
                        "status": "firing",
                        "labels": {"alertname": "DiskRunningFull", "dev": "sda2"},
                        "annotations": {"summary": "disk almost full"},
                        "generatorURL": "http://prometheus:9090/graph"
                    }
                ],
                "groupLabels": {"alertname": "DiskRunningFull"},
                "externalURL": "http://localhost:9093"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn default_body_lists_alerts() {
        let renderer = TemplateRenderer::new();
        let body = renderer.render_issue_body(&sample_notification()).unwrap();

        assert!(body.starts_with("Original alert: http://localhost:9093"));
        assert!(body.contains("* firing http://prometheus:9090/graph"));
        assert!(body.contains("- dev = sda2"));
        assert!(body.contains("- summary = disk almost full"));
    }

    #[test]
    fn custom_template_with_eq_helper() {
        let renderer = TemplateRenderer::with_issue_template(
            r#"{{alertname}}: {{#if (eq status "firing")}}on fire{{else}}calm{{/if}}"#,
        )
        .unwrap();

        let body = renderer.render_issue_body(&sample_notification()).unwrap();
        assert_eq!(body, "DiskRunningFull: on fire");
    }

    #[test]
    fn rejects_uncompilable_template() {
        let result = TemplateRenderer::with_issue_template("{{#if status}}unclosed");
        assert!(matches!(result, Err(TemplateError::CompileError(_))));
    }

    #[test]
    fn strict_mode_reports_missing_variable() {
        let renderer = TemplateRenderer::with_issue_template("{{no_such_field}}").unwrap();
        let result = renderer.render_issue_body(&sample_notification());
        assert!(matches!(result, Err(TemplateError::RenderError(_))));
    }

    #[test]
    fn no_html_escaping_in_body() {
        let renderer = TemplateRenderer::with_issue_template("{{group_key}}").unwrap();
        let body = renderer.render_issue_body(&sample_notification()).unwrap();
        assert_eq!(body, "{}:{alertname=\"DiskRunningFull\"}");
    }

    #[test]
    fn viewer_registry_has_no_custom_helpers() {
        let viewer = create_viewer_registry();
        let rendered =
            viewer.render_template(r#"{{#if (eq a "b")}}x{{/if}}"#, &json!({"a": "b"}));
        assert!(rendered.is_err());
    }

    #[test]
    fn viewer_escapes_titles() {
        let renderer = TemplateRenderer::new();
        let issues = vec![TrackedIssue {
            number: 7,
            title: "[{}:{alertname=\"Disk<Full>\"}] Disk<Full>".to_string(),
            state: IssueState::Open,
            url: "https://github.com/acme/alerts/issues/7".to_string(),
        }];

        let page = renderer
            .render_issue_viewer(&issues, None, &SummarySnapshot::default())
            .unwrap();

        assert!(page.contains("https://github.com/acme/alerts/issues/7"));
        assert!(page.contains("Disk&lt;Full&gt;"));
        assert!(page.contains("&quot;"));
        assert!(!page.contains("<Full>"));
    }

    #[test]
    fn viewer_shows_error_inline() {
        let renderer = TemplateRenderer::new();
        let page = renderer
            .render_issue_viewer(&[], Some("GitHub API error: boom"), &SummarySnapshot::default())
            .unwrap();

        assert!(page.contains("GitHub API error: boom"));
        assert!(!page.contains("<tr>"));
    }
}
