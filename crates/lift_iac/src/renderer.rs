//! Strict placeholder rendering.

use regex::{Captures, Regex};
use tracing::debug;

use crate::artifact::{Bindings, Template};
use crate::error::{IacError, IacResult};

/// Renders templates by substituting `{{name}}` placeholders.
///
/// Unlike a lenient renderer, an unbound placeholder is an error.
pub struct TemplateRenderer {
    variable_pattern: Regex,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    pub fn new() -> Self {
        Self {
            variable_pattern: Regex::new(r"\{\{([a-zA-Z_][a-zA-Z0-9_]*)\}\}")
                .expect("placeholder pattern is a valid regex"),
        }
    }

    /// Render a typed template.
    pub fn render<T: Template + ?Sized>(&self, template: &T) -> IacResult<String> {
        self.render_content(template.template(), &template.bindings())
    }

    /// Render raw content against bindings.
    ///
    /// Fails with [`IacError::MissingSubstitution`] naming the first
    /// placeholder that is unbound or bound to `None`.
    pub fn render_content(&self, content: &str, bindings: &Bindings) -> IacResult<String> {
        let mut missing: Option<String> = None;

        let rendered = self
            .variable_pattern
            .replace_all(content, |caps: &Captures| {
                let name = &caps[1];
                match bindings.get(name) {
                    Some(Some(value)) => value.clone(),
                    _ => {
                        if missing.is_none() {
                            missing = Some(name.to_string());
                        }
                        String::new()
                    }
                }
            })
            .into_owned();

        if let Some(placeholder) = missing {
            debug!("Unbound placeholder {}", placeholder);
            return Err(IacError::MissingSubstitution(placeholder));
        }

        Ok(rendered)
    }
}
