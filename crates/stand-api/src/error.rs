use stand_core::{ActionError, QueueError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Action(#[from] ActionError),
}

#[cfg(feature = "http")]
impl ApiError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;

        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Action(e) => match e {
                ActionError::Busy { .. }
                | ActionError::AlreadyHolding
                | ActionError::StandFree
                | ActionError::Queue(QueueError::AlreadyQueued(_)) => StatusCode::CONFLICT,
                ActionError::NotHolder => StatusCode::FORBIDDEN,
                ActionError::Queue(QueueError::NotQueued) => StatusCode::NOT_FOUND,
                ActionError::Infrastructure(_) => StatusCode::BAD_GATEWAY,
            },
        }
    }
}

#[cfg(feature = "http")]
impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(error = %self, "request failed");
        }
        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(all(test, feature = "http"))]
mod tests {
    use axum::http::StatusCode;

    use super::*;

    #[test]
    fn action_errors_map_to_status_codes() {
        let busy = ApiError::from(ActionError::Busy {
            holder: "alice".into(),
        });
        assert_eq!(busy.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::from(ActionError::NotHolder).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(ActionError::Queue(QueueError::NotQueued)).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(ActionError::Infrastructure("docker".into())).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::InvalidRequest("token".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
