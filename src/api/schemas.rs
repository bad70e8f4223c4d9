use crate::domain::submission::Outcome;
use axum::http::StatusCode;
use serde::Serialize;

/// Body returned for every submission, successful or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub mailto: bool,
}

impl SubmissionResponse {
    #[must_use]
    pub const fn success() -> Self {
        Self { ok: true, error: None, mailto: false }
    }

    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self { ok: false, error: Some(error.into()), mailto: false }
    }

    #[must_use]
    pub fn mailto_fallback() -> Self {
        Self { ok: false, error: Some("Email service not configured".into()), mailto: true }
    }

    /// Maps a gateway outcome onto its HTTP status and body.
    #[must_use]
    pub fn from_outcome(outcome: Outcome) -> (StatusCode, Self) {
        match outcome {
            // Spam gets the same answer as a real submission.
            Outcome::Accepted | Outcome::Ignored => (StatusCode::OK, Self::success()),
            Outcome::RateLimited => {
                (StatusCode::TOO_MANY_REQUESTS, Self::failure("Please wait before submitting again."))
            }
            Outcome::Rejected(reason) | Outcome::TransportFailed(reason) => {
                (StatusCode::BAD_REQUEST, Self::failure(reason))
            }
            Outcome::TransportUnavailable => (StatusCode::BAD_REQUEST, Self::mailto_fallback()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub mail: String,
}
