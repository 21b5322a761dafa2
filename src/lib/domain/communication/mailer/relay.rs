//! Relay abstraction

use async_trait::async_trait;
use serde::Serialize;

#[cfg(test)]
use mockall::mock;

use super::{Message, RelayCredentials};

/// The relay's final reply to a transmitted message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelayReceipt {
    /// Reply code, e.g. `250`
    pub code: String,

    /// Reply text, one entry per line
    pub message: Vec<String>,
}

/// A mail relay
#[async_trait]
pub trait Relay: Send + Sync + 'static {
    /// Transmit a message
    ///
    /// Opens a fresh connection, authenticates with `credentials` and sends
    /// `message`. Nothing is retried.
    ///
    /// # Returns
    /// The relay's reply if the message was accepted, otherwise the transport
    /// error that stopped it.
    async fn deliver(
        &self,
        credentials: &RelayCredentials,
        message: &Message,
    ) -> anyhow::Result<RelayReceipt>;
}

#[cfg(test)]
mock! {
    pub Relay {}

    #[async_trait]
    impl Relay for Relay {
        async fn deliver(&self, credentials: &RelayCredentials, message: &Message) -> anyhow::Result<RelayReceipt>;
    }
}
