#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::missing_crate_level_docs
)]

//! Transactional email over an SMTP relay, rendered from embedded templates.
//!
//! A [`MailClient`](domain::communication::mailer::MailClient) holds the relay
//! credentials and the sender address. Each send resolves a named template,
//! renders its `subject` and `body` sections from caller data and hands the
//! message to a [`Relay`](domain::communication::mailer::Relay).

pub mod domain;
pub mod infrastructure;
