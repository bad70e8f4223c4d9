use crate::api::AppState;
use crate::api::schemas::SubmissionResponse;
use crate::domain::submission::{Purpose, Submission};
use crate::error::{AppError, Result};
use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, Method, StatusCode},
};
use std::net::{IpAddr, SocketAddr};
use tokio::time::Instant;

/// Handles the "request a meeting" form.
///
/// # Errors
/// Returns `AppError::InvalidMethod` for anything but POST, and `AppError::BadRequest` if the
/// body exceeds the configured limit.
pub async fn contact(
    State(state): State<AppState>,
    request: Request,
) -> Result<(StatusCode, Json<SubmissionResponse>)> {
    submit(&state, Purpose::Contact, request).await
}

/// Handles the "request data room access" form.
///
/// # Errors
/// Same as [`contact`].
pub async fn data_room(
    State(state): State<AppState>,
    request: Request,
) -> Result<(StatusCode, Json<SubmissionResponse>)> {
    submit(&state, Purpose::DataRoom, request).await
}

async fn submit(
    state: &AppState,
    purpose: Purpose,
    request: Request,
) -> Result<(StatusCode, Json<SubmissionResponse>)> {
    if request.method() != Method::POST {
        return Err(AppError::InvalidMethod);
    }

    let peer_ip = request.extensions().get::<ConnectInfo<SocketAddr>>().map(|ConnectInfo(addr)| addr.ip());
    let client_id = client_identity(request.headers(), peer_ip);

    let body = axum::body::to_bytes(request.into_body(), state.config.server.max_body_bytes)
        .await
        .map_err(|e| AppError::BadRequest(format!("Unreadable request body: {e}")))?;
    let submission = Submission::from_json_lenient(&body);

    let outcome = state.submission_service.submit(&client_id, purpose, &submission, Instant::now()).await;
    let (status, response) = SubmissionResponse::from_outcome(outcome);
    Ok((status, Json(response)))
}

/// Best-effort key for rate limiting: the raw `X-Forwarded-For` value, else the peer address,
/// else an empty string. The header is client-controlled and is not trusted for anything else.
#[must_use]
pub fn client_identity(headers: &HeaderMap, peer_ip: Option<IpAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .or_else(|| peer_ip.map(|ip| ip.to_string()))
        .unwrap_or_default()
}
