//! Template error types.

/// Errors raised while compiling or rendering an issue body or the issue viewer.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// Rendering failed, e.g. a strict-mode lookup of a missing field.
    #[error("Template rendering error: {0}")]
    RenderError(#[from] handlebars::RenderError),

    /// The template source does not compile.
    #[error("Template compile error: {0}")]
    CompileError(#[from] handlebars::TemplateError),
}
