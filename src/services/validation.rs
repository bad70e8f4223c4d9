use crate::domain::submission::{Purpose, Submission};

pub const MISSING_FIELDS: &str = "Missing required fields";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    /// Honeypot was filled in. Nothing is sent, but the caller is told it worked.
    Spam,
    Rejected(&'static str),
}

/// Checks the honeypot first, then the fields the purpose requires.
///
/// Only emptiness is checked; email addresses are not validated for format here.
#[must_use]
pub fn validate(submission: &Submission, purpose: Purpose) -> Verdict {
    if !submission.honey.is_empty() {
        return Verdict::Spam;
    }

    let mut required = vec![&submission.name, &submission.email, &submission.message];
    if purpose.requires_company() {
        required.push(&submission.company);
    }

    if required.iter().any(|field| field.is_empty()) {
        return Verdict::Rejected(MISSING_FIELDS);
    }

    Verdict::Valid
}
