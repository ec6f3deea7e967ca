use thiserror::Error;

/// Errors that can abort a notification run. All are terminal; there is no
/// retry or partial delivery.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// Custom message template failed to render.
    #[error("template render failed: {0}")]
    TemplateRender(#[from] Box<handlebars::RenderError>),

    /// Login was rejected, or transport failed during login.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Transport failure or non-success response while posting the message.
    #[error("delivery failed: {0}")]
    Delivery(String),
}

impl From<handlebars::RenderError> for NotificationError {
    fn from(err: handlebars::RenderError) -> Self {
        Self::TemplateRender(Box::new(err))
    }
}
