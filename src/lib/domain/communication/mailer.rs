//! Composing and relaying templated email

mod client;
mod credentials;
mod message;
mod relay;

pub use client::{MailClient, Mailer};
pub use credentials::RelayCredentials;
pub use message::Message;
pub use relay::{Relay, RelayReceipt};
