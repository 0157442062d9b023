use minijinja::{context, Environment};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Invalid viewer template: {0}")]
    Invalid(String),

    #[error("Failed to render viewer URL: {0}")]
    RenderError(String),
}

/// Renders the external viewer URL for documents with an uploaded file.
///
/// The template receives a single variable, `file_url`, already
/// percent-encoded so it can be embedded as a query parameter.
pub struct PreviewRenderer {
    env: Environment<'static>,
    template: String,
}

impl PreviewRenderer {
    pub fn new(template: impl Into<String>) -> Result<Self, TemplateError> {
        let template = template.into();
        let env = Environment::new();
        env.template_from_str(&template)
            .map_err(|e| TemplateError::Invalid(e.to_string()))?;

        Ok(Self { env, template })
    }

    /// `None` when the document has no stored file
    pub fn render(&self, file_url: Option<&str>) -> Result<Option<String>, TemplateError> {
        let Some(file_url) = file_url else {
            return Ok(None);
        };

        let encoded = urlencoding::encode(file_url);
        self.env
            .render_str(&self.template, context! { file_url => encoded.as_ref() })
            .map(Some)
            .map_err(|e| TemplateError::RenderError(e.to_string()))
    }
}
