//! Templated mail composition and delivery.

pub mod errors;
pub mod mailer;
pub mod templates;

pub use errors::MailError;
