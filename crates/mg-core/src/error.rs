use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// The four failure classes a caller can act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network failure, non-2xx response or an expired poll deadline
    Transport,
    /// The provider reported a terminal failed status
    RemoteFailure,
    /// A response could not be understood
    Parse,
    /// Local model load, inference, encoding or file I/O
    Resource,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::RemoteFailure => "remote_failure",
            Self::Parse => "parse",
            Self::Resource => "resource",
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} returned HTTP {status}: {body}")]
    Status {
        service: String,
        status: u16,
        body: String,
    },

    #[error("{service} job {job_id} did not finish within {waited:?}")]
    DeadlineExceeded {
        service: String,
        job_id: String,
        waited: Duration,
    },

    #[error("{service} job {job_id} failed: {reason}")]
    JobFailed {
        service: String,
        job_id: String,
        reason: String,
    },

    #[error("malformed response: {0}")]
    Parse(String),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("pipeline error: {0}")]
    Pipeline(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(_) | Self::Status { .. } | Self::DeadlineExceeded { .. } => {
                ErrorKind::Transport
            }
            Self::JobFailed { .. } => ErrorKind::RemoteFailure,
            Self::Parse(_) | Self::Json(_) | Self::Base64(_) => ErrorKind::Parse,
            Self::Pipeline(_) | Self::Image(_) | Self::Io(_) => ErrorKind::Resource,
        }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn pipeline(msg: impl Into<String>) -> Self {
        Self::Pipeline(msg.into())
    }
}
