//! Prompt rendering.

use crate::templates;
use crate::types::StageTemplate;
use handlebars::Handlebars;
use medrag_core::{AppError, AppResult};
use std::collections::HashMap;
use std::path::Path;

/// A registry of stage templates ready for rendering.
pub struct PromptSet {
    handlebars: Handlebars<'static>,
}

impl PromptSet {
    /// Create a set with the built-in templates.
    pub fn builtin() -> AppResult<Self> {
        let mut handlebars = Handlebars::new();

        // Prompts are plain text, never HTML
        handlebars.register_escape_fn(handlebars::no_escape);

        for template in StageTemplate::ALL {
            handlebars
                .register_template_string(template.name(), templates::builtin(template))
                .map_err(|e| {
                    AppError::Prompt(format!(
                        "Failed to register template '{}': {}",
                        template.name(),
                        e
                    ))
                })?;
        }

        Ok(Self { handlebars })
    }

    /// Create a set with built-ins plus overrides from a directory.
    pub fn with_overrides(dir: &Path) -> AppResult<Self> {
        let mut set = Self::builtin()?;
        crate::loader::load_overrides(&mut set, dir)?;
        Ok(set)
    }

    /// Replace one template's source.
    pub fn register_override(&mut self, template: StageTemplate, source: &str) -> AppResult<()> {
        self.handlebars
            .register_template_string(template.name(), source)
            .map_err(|e| {
                AppError::Prompt(format!(
                    "Failed to register override '{}': {}",
                    template.name(),
                    e
                ))
            })
    }

    /// Render a stage template with the given variables.
    pub fn render(
        &self,
        template: StageTemplate,
        variables: &HashMap<String, String>,
    ) -> AppResult<String> {
        self.handlebars
            .render(template.name(), variables)
            .map_err(|e| {
                AppError::Prompt(format!(
                    "Failed to render template '{}': {}",
                    template.name(),
                    e
                ))
            })
    }
}
