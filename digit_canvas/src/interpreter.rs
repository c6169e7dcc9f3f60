use crate::prediction::Digit;
use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;

pub const INVALID_INPUT_MESSAGE: &str = "invalid input";
pub const AUTH_FAILED_MESSAGE: &str = "authentication failed";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid input")]
    InvalidInput,
    #[error("authentication failed")]
    Unauthorized,
    #[error("upstream error {status}: {body}")]
    Upstream { status: StatusCode, body: String },
    #[error("connection error: {0}")]
    Connection(#[source] reqwest::Error),
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Maps an upstream status to either the success body or a typed failure.
pub fn check_status(status: StatusCode, body: String) -> Result<String, ApiError> {
    if status.is_success() {
        return Ok(body);
    }

    match status {
        StatusCode::BAD_REQUEST => Err(ApiError::InvalidInput),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ApiError::Unauthorized),
        status => Err(ApiError::Upstream { status, body }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Success,
    InvalidInput,
    AuthFailure,
    UnknownError,
    NetworkFailure,
    Busy,
    NoPrediction,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Success => "success",
            OutcomeKind::InvalidInput => "invalid_input",
            OutcomeKind::AuthFailure => "auth_failure",
            OutcomeKind::UnknownError => "unknown_error",
            OutcomeKind::NetworkFailure => "network_failure",
            OutcomeKind::Busy => "busy",
            OutcomeKind::NoPrediction => "no_prediction",
        }
    }
}

/// What the page renders for one user action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub level: Level,
    pub kind: OutcomeKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<Digit>,
}

impl Outcome {
    pub fn predicted(digit: Digit) -> Self {
        Self {
            level: Level::Success,
            kind: OutcomeKind::Success,
            message: format!("Prediction: {digit}"),
            prediction: Some(digit),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            kind: OutcomeKind::Success,
            message: message.into(),
            prediction: None,
        }
    }

    pub fn warning(kind: OutcomeKind, message: impl Into<String>) -> Self {
        Self {
            level: Level::Warning,
            kind,
            message: message.into(),
            prediction: None,
        }
    }

    /// Emits the outcome at the level its severity calls for.
    pub fn log(&self, action: &str) {
        match self.level {
            Level::Success => {
                tracing::info!(action, prediction = ?self.prediction, "{}", self.message)
            }
            Level::Warning => tracing::warn!(action, kind = self.kind.as_str(), "{}", self.message),
            Level::Error => tracing::error!(action, kind = self.kind.as_str(), "{}", self.message),
        }
    }
}

impl From<&ApiError> for Outcome {
    fn from(err: &ApiError) -> Self {
        let (level, kind, message) = match err {
            ApiError::InvalidInput => (
                Level::Warning,
                OutcomeKind::InvalidInput,
                INVALID_INPUT_MESSAGE.to_string(),
            ),
            ApiError::Unauthorized => (
                Level::Error,
                OutcomeKind::AuthFailure,
                AUTH_FAILED_MESSAGE.to_string(),
            ),
            ApiError::Upstream { status, body } => {
                let message = if body.trim().is_empty() {
                    status.to_string()
                } else {
                    body.clone()
                };
                (Level::Error, OutcomeKind::UnknownError, message)
            }
            ApiError::Connection(_) | ApiError::Client(_) => {
                (Level::Error, OutcomeKind::NetworkFailure, err.to_string())
            }
            ApiError::Decode(_) => (Level::Error, OutcomeKind::UnknownError, err.to_string()),
        };
        Self {
            level,
            kind,
            message,
            prediction: None,
        }
    }
}

impl From<Result<Digit, ApiError>> for Outcome {
    fn from(result: Result<Digit, ApiError>) -> Self {
        match result {
            Ok(digit) => Outcome::predicted(digit),
            Err(err) => Outcome::from(&err),
        }
    }
}
