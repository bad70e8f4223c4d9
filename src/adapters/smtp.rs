use crate::config::MailSettings;
use crate::services::mail::{MailError, MailTransport, OutboundMessage};
use async_trait::async_trait;
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::fmt;

/// Delivers mail through an authenticated SMTP relay.
#[derive(Clone)]
pub struct SmtpMailTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
    port: u16,
}

impl fmt::Debug for SmtpMailTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpMailTransport").field("host", &self.host).field("port", &self.port).finish_non_exhaustive()
    }
}

impl SmtpMailTransport {
    /// Builds the transport. No connection is made until the first send.
    ///
    /// With `secure` set the connection is TLS from the start; otherwise it upgrades with
    /// STARTTLS when the server offers it.
    ///
    /// # Errors
    /// Returns `MailError::Transport` if the TLS parameters for `host` cannot be built.
    pub fn new(settings: &MailSettings) -> Result<Self, MailError> {
        let builder = if settings.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
                .map_err(|e| MailError::Transport(e.to_string()))?
        } else {
            let tls = TlsParameters::new(settings.host.clone()).map_err(|e| MailError::Transport(e.to_string()))?;
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host).tls(Tls::Opportunistic(tls))
        };

        let mailer = builder
            .port(settings.port)
            .credentials(Credentials::new(settings.username.clone(), settings.password.clone()))
            .timeout(Some(settings.timeout))
            .build();

        Ok(Self { mailer, host: settings.host.clone(), port: settings.port })
    }
}

fn mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse::<Mailbox>().map_err(|e| MailError::Address(format!("Invalid email address '{address}': {e}")))
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    #[tracing::instrument(skip_all, fields(smtp.host = %self.host, smtp.port = self.port), err(Display))]
    async fn send(&self, message: &OutboundMessage) -> Result<(), MailError> {
        let email = Message::builder()
            .from(mailbox(&message.from)?)
            .to(mailbox(&message.to)?)
            .reply_to(mailbox(&message.reply_to)?)
            .subject(message.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(message.html.clone())
            .map_err(|e| MailError::Message(e.to_string()))?;

        let response = self.mailer.send(email).await.map_err(|e| MailError::Transport(e.to_string()))?;
        tracing::debug!(code = %response.code(), "SMTP server accepted message");
        Ok(())
    }
}
