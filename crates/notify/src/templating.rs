//! Minijinja template rendering for notification messages.
//!
//! Templates are arbitrary strings (not pre-registered), so a fresh
//! [`minijinja::Environment`] is created per render call.

use crate::traits::NotifyError;

/// Message sent for every violation unless a custom template is configured.
pub const DEFAULT_MESSAGE_TEMPLATE: &str =
    "Rule name: *{{ rule_name }}*\n Rule Description: *{{ description }}*\n";

/// Context data available to notification templates.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct TemplateContext {
    pub rule_name: String,
    pub description: String,
    /// The configured field path.
    pub path: String,
    /// Violation message (error code or "Field: … is required").
    pub message: String,
    pub resource_type: String,
    pub namespace: String,
    /// Current timestamp in ISO 8601 format.
    pub now: String,
}

/// Renders notification templates using minijinja.
#[derive(Debug)]
pub struct TemplateRenderer {
    _private: (),
}

impl TemplateRenderer {
    /// Create a new template renderer.
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Build a configured minijinja environment.
    ///
    /// `{{ x }}` with an unknown name is an error rather than an empty string,
    /// so a typo in a configured template fails [`TemplateRenderer::validate`].
    /// The final newline of a template is kept.
    fn build_env() -> minijinja::Environment<'static> {
        let mut env = minijinja::Environment::new();
        env.set_undefined_behavior(minijinja::UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        env
    }

    /// Render a template string with the given context.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Template`] if the template is invalid or
    /// rendering fails.
    pub fn render(&self, template_str: &str, ctx: &TemplateContext) -> Result<String, NotifyError> {
        let env = Self::build_env();
        env.render_str(template_str, ctx)
            .map_err(|e| NotifyError::Template(e.to_string()))
    }

    /// Check that a template both parses and renders against a sample context.
    pub fn validate(&self, template_str: &str) -> Result<(), NotifyError> {
        self.render(template_str, &TemplateContext::default())
            .map(|_| ())
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}
