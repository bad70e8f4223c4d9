use crate::config::MailSettings;
use crate::domain::submission::{Purpose, Submission};
use std::sync::Arc;

pub mod provider;

pub use provider::{MailError, MailTransport, OutboundMessage};

/// Reported when the transport fails without saying why.
const FALLBACK_REASON: &str = "Mailer error";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchResult {
    Sent,
    /// No complete mail configuration. Nothing was attempted.
    Unavailable,
    Failed(String),
}

#[derive(Debug, Clone)]
struct Route {
    from: String,
    to: String,
    subject_prefix: Option<String>,
    transport: Arc<dyn MailTransport>,
}

/// Turns accepted submissions into emails for the configured inbox.
#[derive(Debug, Clone)]
pub struct MailDispatcher {
    route: Option<Route>,
}

impl MailDispatcher {
    /// A dispatcher with no mail configuration; every dispatch reports `Unavailable`.
    #[must_use]
    pub const fn unconfigured() -> Self {
        Self { route: None }
    }

    /// Sends as the configured SMTP account to the configured recipient.
    #[must_use]
    pub fn new(settings: &MailSettings, transport: Arc<dyn MailTransport>) -> Self {
        Self {
            route: Some(Route {
                from: settings.username.clone(),
                to: settings.recipient.clone(),
                subject_prefix: settings.subject_prefix.clone(),
                transport,
            }),
        }
    }

    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.route.is_some()
    }

    #[tracing::instrument(skip_all, fields(purpose = %purpose))]
    pub async fn dispatch(&self, submission: &Submission, purpose: Purpose) -> DispatchResult {
        let Some(route) = &self.route else {
            tracing::debug!("Mail transport not configured, falling back to mailto");
            return DispatchResult::Unavailable;
        };

        let message = compose(route, submission, purpose);
        match route.transport.send(&message).await {
            Ok(()) => {
                tracing::info!("Submission delivered");
                DispatchResult::Sent
            }
            Err(e) => {
                tracing::warn!(error = %e, "Mail delivery failed");
                let reason = e.to_string();
                DispatchResult::Failed(if reason.is_empty() { FALLBACK_REASON.to_string() } else { reason })
            }
        }
    }
}

fn compose(route: &Route, submission: &Submission, purpose: Purpose) -> OutboundMessage {
    let subject = match &route.subject_prefix {
        Some(prefix) => format!("{prefix} - {}", purpose.subject()),
        None => purpose.subject().to_string(),
    };

    OutboundMessage {
        from: route.from.clone(),
        to: route.to.clone(),
        reply_to: submission.email.clone(),
        subject,
        html: render_html(submission, purpose),
    }
}

fn render_html(submission: &Submission, purpose: Purpose) -> String {
    let (heading, message_label) = match purpose {
        Purpose::Contact => ("Meeting request", "Message"),
        Purpose::DataRoom => ("Data room request", "Use case"),
    };
    let company = if submission.company.is_empty() { "-".to_string() } else { escape_html(&submission.company) };
    let body = escape_html(&submission.message).replace("\r\n", "\n").replace('\n', "<br/>");

    format!(
        "<p><b>{heading}</b></p><p><b>Name:</b> {}<br/><b>Email:</b> {}<br/>\
         <b>Company:</b> {company}<br/><b>{message_label}:</b><br/>{body}</p>",
        escape_html(&submission.name),
        escape_html(&submission.email),
    )
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
