use crate::domain::submission::{Outcome, Purpose, Submission};
use crate::services::mail::{DispatchResult, MailDispatcher};
use crate::services::rate_limiter::RateLimiter;
use crate::services::validation::{Verdict, validate};
use opentelemetry::{KeyValue, global, metrics::Counter};
use tokio::time::Instant;

#[derive(Clone, Debug)]
struct Metrics {
    outcomes_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("submission-gateway");
        Self {
            outcomes_total: meter
                .u64_counter("submission_outcomes_total")
                .with_description("Form submissions by purpose and outcome")
                .build(),
        }
    }
}

/// Runs one submission through rate limiting, spam and field checks, then mail dispatch.
/// The first stage that decides the request ends it.
#[derive(Clone, Debug)]
pub struct SubmissionService {
    limiter: RateLimiter,
    dispatcher: MailDispatcher,
    metrics: Metrics,
}

impl SubmissionService {
    #[must_use]
    pub fn new(limiter: RateLimiter, dispatcher: MailDispatcher) -> Self {
        Self { limiter, dispatcher, metrics: Metrics::new() }
    }

    #[must_use]
    pub const fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    #[must_use]
    pub const fn mail_configured(&self) -> bool {
        self.dispatcher.is_configured()
    }

    #[tracing::instrument(skip_all, fields(purpose = %purpose, outcome = tracing::field::Empty))]
    pub async fn submit(&self, client_id: &str, purpose: Purpose, submission: &Submission, now: Instant) -> Outcome {
        let outcome = self.decide(client_id, purpose, submission, now).await;

        tracing::Span::current().record("outcome", outcome.label());
        self.metrics
            .outcomes_total
            .add(1, &[KeyValue::new("purpose", purpose.as_str()), KeyValue::new("outcome", outcome.label())]);
        outcome
    }

    async fn decide(&self, client_id: &str, purpose: Purpose, submission: &Submission, now: Instant) -> Outcome {
        if !self.limiter.admit(client_id, now) {
            tracing::debug!(client = %client_id, "Submission throttled");
            return Outcome::RateLimited;
        }

        match validate(submission, purpose) {
            Verdict::Valid => {}
            Verdict::Spam => {
                tracing::debug!(client = %client_id, "Honeypot filled, ignoring submission");
                return Outcome::Ignored;
            }
            Verdict::Rejected(reason) => return Outcome::Rejected(reason.to_string()),
        }

        match self.dispatcher.dispatch(submission, purpose).await {
            DispatchResult::Sent => Outcome::Accepted,
            DispatchResult::Unavailable => Outcome::TransportUnavailable,
            DispatchResult::Failed(reason) => Outcome::TransportFailed(reason),
        }
    }
}
