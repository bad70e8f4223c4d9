use serde::Deserialize;
use std::fmt;

/// Which form a submission came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Purpose {
    /// General "request a meeting" form.
    Contact,
    /// "Request data room access" form.
    DataRoom,
}

impl Purpose {
    #[must_use]
    pub const fn subject(self) -> &'static str {
        match self {
            Self::Contact => "Meeting Request",
            Self::DataRoom => "Data Room Request",
        }
    }

    #[must_use]
    pub const fn requires_company(self) -> bool {
        matches!(self, Self::DataRoom)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Contact => "contact",
            Self::DataRoom => "dataroom",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw form fields as sent by the site. Absent fields are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub company: String,
    pub message: String,
    /// Hidden field that only bots fill in.
    pub honey: String,
}

impl Submission {
    /// Parses a JSON body, treating an empty or malformed body as a submission with every field empty.
    #[must_use]
    pub fn from_json_lenient(body: &[u8]) -> Self {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Self::default();
        }
        serde_json::from_slice(body).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "Unparseable submission body, treating fields as empty");
            Self::default()
        })
    }
}

/// Result of handling one submission. Exactly one per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    RateLimited,
    /// Honeypot tripped. Looks like `Accepted` to the caller.
    Ignored,
    Rejected(String),
    TransportUnavailable,
    TransportFailed(String),
}

impl Outcome {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::RateLimited => "rate_limited",
            Self::Ignored => "ignored",
            Self::Rejected(_) => "rejected",
            Self::TransportUnavailable => "transport_unavailable",
            Self::TransportFailed(_) => "transport_failed",
        }
    }
}
