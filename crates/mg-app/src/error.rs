use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;
use mg_core::ErrorKind;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Generation(#[from] mg_core::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Generation(mg_core::Error::DeadlineExceeded { .. }) => StatusCode::GATEWAY_TIMEOUT,
            Self::Generation(e) => match e.kind() {
                ErrorKind::Transport | ErrorKind::RemoteFailure | ErrorKind::Parse => {
                    StatusCode::BAD_GATEWAY
                }
                ErrorKind::Resource => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Generation(e) => e.kind().as_str(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(kind = self.kind(), "Request failed: {}", self);
        }

        let body = Json(json!({
            "error": self.to_string(),
            "kind": self.kind(),
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_status_mapping() {
        let failed = AppError::from(mg_core::Error::JobFailed {
            service: "prodia".into(),
            job_id: "j1".into(),
            reason: "nsfw".into(),
        });
        assert_eq!(failed.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(failed.kind(), "remote_failure");

        let late = AppError::from(mg_core::Error::DeadlineExceeded {
            service: "stability".into(),
            job_id: "v1".into(),
            waited: Duration::from_secs(300),
        });
        assert_eq!(late.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(late.kind(), "transport");

        let oom = AppError::from(mg_core::Error::pipeline("CUDA out of memory"));
        assert_eq!(oom.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let empty = AppError::BadRequest("Please enter a prompt!".into());
        assert_eq!(empty.status(), StatusCode::BAD_REQUEST);
        assert_eq!(empty.kind(), "bad_request");
    }
}
