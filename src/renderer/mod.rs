//! Template rendering for Phos.
//!
//! Templates are rendered with [Handlebars](https://handlebarsjs.com/):
//! - `{{path.to.value}}` substitutes a configuration value (missing paths render empty)
//! - `{{helper arg ...}}` calls an inline helper, `(helper arg ...)` nests a call
//! - `{{#eq a b}}...{{else}}...{{/eq}}` emits one branch depending on the helper
//!   result, `{{#each list}}` iterates
//!
//! Output is never HTML-escaped. The helper set is closed (see [`Helper`]); an
//! unknown helper name fails the render.

use std::sync::LazyLock;

use handlebars::{no_escape, Handlebars};

use crate::error::{Error, Result};
use crate::value::Value;

pub mod helpers;

pub use helpers::Helper;
use helpers::{HelperBinding, UnknownHelper};

const HELPER_MISSING: &str = "helperMissing";
const BLOCK_HELPER_MISSING: &str = "blockHelperMissing";

static CONDITIONS: LazyLock<HandlebarsRenderer> = LazyLock::new(HandlebarsRenderer::new);

/// Trait for template rendering engines.
pub trait TemplateRenderer {
    /// Renders a template string against the configuration mapping.
    ///
    /// # Arguments
    /// * `template` - Template text to render
    /// * `variables` - Configuration values for substitution
    ///
    /// # Returns
    /// * `Result<String>` - Fully substituted text
    fn render(&self, template: &str, variables: &Value) -> Result<String>;
}

/// Handlebars-based template rendering engine.
pub struct HandlebarsRenderer {
    /// Registry holding the Phos helpers
    registry: Handlebars<'static>,
}

impl HandlebarsRenderer {
    /// Creates a registry with escaping disabled and every [`Helper`] registered.
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(no_escape);
        for helper in Helper::ALL {
            registry.register_helper(helper.name(), Box::new(HelperBinding(helper)));
        }
        registry.register_helper(HELPER_MISSING, Box::new(UnknownHelper));
        registry.register_helper(BLOCK_HELPER_MISSING, Box::new(UnknownHelper));
        Self { registry }
    }
}

impl Default for HandlebarsRenderer {
    fn default() -> Self {
        HandlebarsRenderer::new()
    }
}

impl TemplateRenderer for HandlebarsRenderer {
    /// # Errors
    /// * `Error::TemplateError` for unbalanced blocks, unknown helpers or wrong
    ///   argument counts. Nothing is returned when rendering fails.
    fn render(&self, template: &str, variables: &Value) -> Result<String> {
        Ok(self.registry.render_template(template, &variables.to_json())?)
    }
}

/// Evaluates one expression (for example `eq backend.framework "fastapi"` or
/// `frontend.eslint`) and reports whether the result is truthy.
pub fn evaluate_condition(expression: &str, variables: &Value) -> Result<bool> {
    let expression = expression.trim();
    if expression.is_empty() || expression.contains("{{") || expression.contains("}}") {
        return Err(Error::ConfigError(format!("invalid condition '{expression}'")));
    }
    // A lone path is looked up; anything longer is a helper call.
    let test = if expression.starts_with('(') || !expression.contains(char::is_whitespace) {
        expression.to_string()
    } else {
        format!("({expression})")
    };
    let rendered = CONDITIONS.render(&format!("{{{{#if {test}}}}}1{{{{/if}}}}"), variables)?;
    Ok(rendered == "1")
}
