//! Error types for the mail client

use handlebars::{RenderError, TemplateError};
use thiserror::Error;

use crate::domain::communication::templates::Section;

/// Mail client errors
#[derive(Debug, Error)]
pub enum MailError {
    /// The client was given missing or unusable configuration
    #[error("invalid mail configuration: {0}")]
    ConfigurationError(String),

    /// An embedded template failed to compile
    #[error("template \"{template}\" failed to compile")]
    InvalidTemplate {
        /// Name of the template
        template: String,

        /// Underlying compile error
        #[source]
        source: Box<TemplateError>,
    },

    /// No template with this name is embedded
    #[error("template \"{0}\" not found")]
    TemplateNotFound(String),

    /// A template section could not be rendered with the supplied data
    #[error("could not render the {section} section of template \"{template}\"")]
    RenderError {
        /// Name of the template
        template: String,

        /// Section that failed
        section: Section,

        /// Underlying render error
        #[source]
        source: RenderError,
    },

    /// The relay could not be reached, refused the credentials or rejected the message
    #[error("could not deliver message")]
    DeliveryError(#[source] anyhow::Error),
}
