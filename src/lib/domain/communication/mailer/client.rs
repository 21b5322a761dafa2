//! Mail client

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use crate::domain::communication::{
    errors::MailError,
    mailer::{Message, Relay, RelayCredentials, RelayReceipt},
    templates::TemplateSet,
};

/// Sends templated email
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    /// Render a template and send it to a single recipient.
    ///
    /// # Arguments
    /// * `template` - Name of an embedded template.
    /// * `recipient_name` - Display name of the recipient. Reserved, not used in the message.
    /// * `recipient_email` - Address the message is sent to.
    /// * `data` - Values the template sections are rendered with.
    /// * `sandbox` - Whether the caller targets the sandbox relay. Reserved, the relay is chosen by configuration.
    ///
    /// # Returns
    /// - [`Ok`] with the relay's [`RelayReceipt`] once the message was accepted.
    /// - [`Err`] with [`MailError::TemplateNotFound`], [`MailError::RenderError`] or
    ///   [`MailError::DeliveryError`] otherwise.
    async fn send(
        &self,
        template: &str,
        recipient_name: &str,
        recipient_email: &str,
        data: &Value,
        sandbox: bool,
    ) -> Result<RelayReceipt, MailError>;
}

/// Mail client bound to one set of relay credentials and one sender address
#[derive(Debug)]
pub struct MailClient<R>
where
    R: Relay,
{
    credentials: RelayCredentials,
    from: String,
    templates: Arc<TemplateSet>,
    relay: Arc<R>,
}

impl<R> MailClient<R>
where
    R: Relay,
{
    /// Create a new mail client using the embedded templates.
    ///
    /// # Errors
    /// [`MailError::ConfigurationError`] if `username` or `password` is empty.
    pub fn new(
        username: &str,
        password: &str,
        from: &str,
        relay: Arc<R>,
    ) -> Result<Self, MailError> {
        let credentials = RelayCredentials::new(username, password)?;
        let templates = TemplateSet::embedded()?;

        Ok(Self::with_templates(credentials, from, Arc::new(templates), relay))
    }

    /// Create a new mail client from already validated parts.
    pub fn with_templates(
        credentials: RelayCredentials,
        from: &str,
        templates: Arc<TemplateSet>,
        relay: Arc<R>,
    ) -> Self {
        Self {
            credentials,
            from: from.to_string(),
            templates,
            relay,
        }
    }

    /// The sender address
    pub fn sender(&self) -> &str {
        &self.from
    }

    /// The templates this client renders from
    pub fn templates(&self) -> &TemplateSet {
        &self.templates
    }

    /// Render a template into a message without sending it.
    pub fn compose(
        &self,
        template: &str,
        recipient_email: &str,
        data: &Value,
    ) -> Result<Message, MailError> {
        let rendered = self.templates.render(template, data)?;

        Ok(Message {
            from: self.from.clone(),
            to: recipient_email.to_string(),
            subject: rendered.subject,
            html_body: rendered.body,
        })
    }
}

impl<R> Clone for MailClient<R>
where
    R: Relay,
{
    fn clone(&self) -> Self {
        Self {
            credentials: self.credentials.clone(),
            from: self.from.clone(),
            templates: Arc::clone(&self.templates),
            relay: Arc::clone(&self.relay),
        }
    }
}

#[async_trait]
impl<R> Mailer for MailClient<R>
where
    R: Relay,
{
    async fn send(
        &self,
        template: &str,
        recipient_name: &str,
        recipient_email: &str,
        data: &Value,
        sandbox: bool,
    ) -> Result<RelayReceipt, MailError> {
        debug!(
            template,
            recipient = recipient_email,
            recipient_name,
            sandbox,
            "composing email"
        );

        let message = self.compose(template, recipient_email, data)?;

        debug!(subject = %message.subject, "handing email to relay");

        let receipt = self
            .relay
            .deliver(&self.credentials, &message)
            .await
            .map_err(MailError::DeliveryError)?;

        info!(
            template,
            recipient = recipient_email,
            code = %receipt.code,
            "email delivered"
        );

        Ok(receipt)
    }
}
