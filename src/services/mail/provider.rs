use async_trait::async_trait;
use thiserror::Error;

/// Failures raised while building or delivering an outbound message.
///
/// The `Display` text is the transport's own diagnostic and is shown to the submitter verbatim.
#[derive(Error, Debug)]
pub enum MailError {
    #[error("{0}")]
    Address(String),
    #[error("{0}")]
    Message(String),
    #[error("{0}")]
    Transport(String),
}

/// A fully composed email ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub from: String,
    pub to: String,
    pub reply_to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait MailTransport: Send + Sync + std::fmt::Debug {
    /// Makes a single delivery attempt.
    ///
    /// # Errors
    /// Returns the transport's diagnostic when the message cannot be built, the connection or
    /// authentication fails, or the server rejects a recipient.
    async fn send(&self, message: &OutboundMessage) -> Result<(), MailError>;
}
