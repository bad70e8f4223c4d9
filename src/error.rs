use crate::api::schemas::SubmissionResponse;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid method")]
    InvalidMethod,
    #[error("{0}")]
    BadRequest(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::InvalidMethod => {
                tracing::debug!("Rejected non-POST submission");
                (StatusCode::METHOD_NOT_ALLOWED, "Invalid method".to_string())
            }
            Self::BadRequest(msg) => {
                tracing::debug!(message = %msg, "Bad request");
                (StatusCode::BAD_REQUEST, msg)
            }
        };

        (status, Json(SubmissionResponse::failure(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_caller_sees_display_text() {
        let error = AppError::BadRequest("Unreadable request body: length limit exceeded".into());
        let display = error.to_string();
        let (status, body) = render(error).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], serde_json::Value::String(display));

        let display = AppError::InvalidMethod.to_string();
        let (status, body) = render(AppError::InvalidMethod).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, serde_json::json!({ "ok": false, "error": display }));
    }
}
