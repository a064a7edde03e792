use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use themis_chat::ChatError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Chat(#[from] ChatError),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Chat(e) => {
                let status = match e {
                    ChatError::ThreadOwnership { .. } => StatusCode::FORBIDDEN,
                    ChatError::ThreadNotFound(_) => StatusCode::NOT_FOUND,
                    ChatError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                    ChatError::Upstream { .. } => StatusCode::BAD_GATEWAY,
                    ChatError::Configuration(_) | ChatError::Persist(_) | ChatError::Internal(_) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, e.code())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = if status.is_server_error() {
            tracing::error!(code, "Request error: {}", self);
            match status {
                StatusCode::BAD_GATEWAY => "Upstream completion error".to_string(),
                _ => "Internal server error".to_string(),
            }
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "error": message,
            "code": code,
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ownership_maps_to_forbidden() {
        let err = ApiError::from(ChatError::ThreadOwnership { thread_id: "t1".into() });
        assert_eq!(err.status_and_code(), (StatusCode::FORBIDDEN, "THREAD_OWNERSHIP_MISMATCH"));
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_error_statuses() {
        let response = ApiError::BadRequest("Test error".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let not_found = ApiError::from(ChatError::ThreadNotFound("t1".into()));
        assert_eq!(not_found.status_and_code().0, StatusCode::NOT_FOUND);

        let upstream = ApiError::from(ChatError::Upstream { status: 500, body: String::new() });
        assert_eq!(upstream.status_and_code().0, StatusCode::BAD_GATEWAY);
    }
}
