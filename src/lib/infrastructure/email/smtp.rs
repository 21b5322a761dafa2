//! SMTP relay implementation

use std::{fmt, sync::Arc};

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{ArgAction, Parser, ValueEnum};
use lettre::{
    message::{Mailbox, SinglePart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
        response::Response,
    },
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
};
use tracing::debug;

use crate::domain::communication::{
    errors::MailError,
    mailer::{MailClient, Message, Relay, RelayCredentials, RelayReceipt},
};

/// Host of the sandbox relay
pub const SANDBOX_HOST: &str = "sandbox.smtp.mailtrap.io";

/// Port of the sandbox relay
pub const SANDBOX_PORT: u16 = 587;

/// How the connection to the relay is secured
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TlsMode {
    /// Plain text, only for local test servers
    None,

    /// Upgrade with STARTTLS, required
    Starttls,

    /// TLS from the first byte
    Tls,
}

/// SMTP configuration
#[derive(Clone, Debug, PartialEq, Eq, Parser)]
pub struct SMTPConfig {
    /// The SMTP host
    #[clap(long = "smtp-host", env = "SMTP_HOST", default_value = SANDBOX_HOST)]
    pub host: String,

    /// The SMTP port
    #[clap(long = "smtp-port", env = "SMTP_PORT", default_value_t = SANDBOX_PORT)]
    pub port: u16,

    /// Connection security
    #[clap(long = "smtp-tls", env = "SMTP_TLS", value_enum, default_value = "starttls")]
    pub tls: TlsMode,

    /// Verify the TLS certificate
    #[clap(
        long = "smtp-verify-tls",
        env = "SMTP_VERIFY_TLS",
        default_value_t = true,
        action = ArgAction::Set
    )]
    pub verify_tls: bool,
}

impl Default for SMTPConfig {
    fn default() -> Self {
        Self {
            host: SANDBOX_HOST.to_string(),
            port: SANDBOX_PORT,
            tls: TlsMode::Starttls,
            verify_tls: true,
        }
    }
}

/// Mail client configuration
#[derive(Clone, Parser)]
pub struct MailerConfig {
    /// The relay username
    #[clap(long, env = "MAILER_USERNAME", default_value = "")]
    pub username: String,

    /// The relay password
    #[clap(long, env = "MAILER_PASSWORD", hide_env_values = true, default_value = "")]
    pub password: String,

    /// The sender email address
    #[clap(long, env = "MAILER_FROM", default_value = "")]
    pub from: String,

    /// The relay to connect to
    #[clap(flatten)]
    pub smtp: SMTPConfig,
}

impl MailerConfig {
    /// Build a mail client that delivers through the configured relay.
    pub fn build_client(&self) -> Result<MailClient<SMTPRelay>, MailError> {
        MailClient::new(
            &self.username,
            &self.password,
            &self.from,
            Arc::new(SMTPRelay::new(self.smtp.clone())),
        )
    }
}

impl fmt::Debug for MailerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailerConfig")
            .field("username", &self.username)
            .field("password", &"********")
            .field("from", &self.from)
            .field("smtp", &self.smtp)
            .finish()
    }
}

/// SMTP relay
///
/// Every delivery opens its own connection, so one relay can serve any number
/// of concurrent sends.
#[derive(Debug, Default, Clone)]
pub struct SMTPRelay {
    config: SMTPConfig,
}

impl SMTPRelay {
    /// Create a new SMTP relay
    pub fn new(config: SMTPConfig) -> Self {
        Self { config }
    }

    /// Build a transport authenticated with `credentials`
    pub fn transport(
        &self,
        credentials: &RelayCredentials,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let creds = Credentials::new(
            credentials.username().to_string(),
            credentials.password().to_string(),
        );

        let relay = match self.config.tls {
            TlsMode::None => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.config.host)
            }
            TlsMode::Starttls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.host)?
                    .tls(Tls::Required(self.tls_parameters()?))
            }
            TlsMode::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.host)?
                .tls(Tls::Wrapper(self.tls_parameters()?)),
        };

        Ok(relay.credentials(creds).port(self.config.port).build())
    }

    fn tls_parameters(&self) -> Result<TlsParameters> {
        Ok(TlsParameters::builder(self.config.host.clone())
            .dangerous_accept_invalid_certs(!self.config.verify_tls)
            .build()?)
    }
}

#[async_trait]
impl Relay for SMTPRelay {
    async fn deliver(
        &self,
        credentials: &RelayCredentials,
        message: &Message,
    ) -> Result<RelayReceipt> {
        let email = build_message(message)?;
        let transport = self.transport(credentials)?;

        debug!(
            host = %self.config.host,
            port = self.config.port,
            tls = ?self.config.tls,
            "connecting to SMTP relay"
        );

        let response = transport.send(email).await.with_context(|| {
            format!(
                "SMTP relay {}:{} did not accept the message",
                self.config.host, self.config.port
            )
        })?;

        Ok(receipt(&response))
    }
}

/// Convert a rendered message into a single-part `text/html` email
pub fn build_message(message: &Message) -> Result<lettre::Message> {
    let from = message
        .from
        .parse::<Mailbox>()
        .with_context(|| format!("invalid sender address \"{}\"", message.from))?;
    let to = message
        .to
        .parse::<Mailbox>()
        .with_context(|| format!("invalid recipient address \"{}\"", message.to))?;

    Ok(lettre::Message::builder()
        .from(from)
        .to(to)
        .subject(message.subject.clone())
        .singlepart(SinglePart::html(message.html_body.clone()))?)
}

fn receipt(response: &Response) -> RelayReceipt {
    RelayReceipt {
        code: response.code().to_string(),
        message: response.message().map(str::to_string).collect(),
    }
}
