use crate::api::MgmtState;
use crate::api::schemas::ReadinessResponse;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

/// Liveness probe: returns 200 OK as long as the server is running.
pub async fn livez() -> impl IntoResponse {
    StatusCode::OK
}

/// Readiness probe. Missing mail configuration is reported but does not fail readiness, since
/// submissions still get the mailto fallback.
pub async fn readyz(State(state): State<MgmtState>) -> impl IntoResponse {
    let mail = if state.mail_configured { "configured" } else { "fallback" };
    (StatusCode::OK, Json(ReadinessResponse { status: "ok".to_string(), mail: mail.to_string() }))
}
