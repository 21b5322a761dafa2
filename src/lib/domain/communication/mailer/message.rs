//! Email message

/// A rendered message, ready to hand to a relay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// The sender of the email
    pub from: String,

    /// The recipient of the email
    pub to: String,

    /// The subject of the email
    pub subject: String,

    /// The HTML body of the email
    pub html_body: String,
}
