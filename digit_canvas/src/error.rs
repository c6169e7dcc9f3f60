use crate::interpreter::{Outcome, OutcomeKind};
use crate::pixel_grid::PixelGridError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

/// Failures decided locally, before or instead of calling the model API.
#[derive(Error, Debug)]
pub enum FrontendError {
    #[error("{0}")]
    InvalidGrid(#[from] PixelGridError),
    #[error("a prediction is already in progress")]
    Busy,
    #[error("no prediction to give feedback on")]
    NoPrediction,
    #[error("{0} is not a digit between 0 and 9")]
    InvalidLabel(i64),
    #[error("invalid request body: {0}")]
    InvalidBody(String),
}

impl From<JsonRejection> for FrontendError {
    fn from(rejection: JsonRejection) -> Self {
        FrontendError::InvalidBody(rejection.body_text())
    }
}

impl FrontendError {
    fn status(&self) -> StatusCode {
        match self {
            FrontendError::Busy => StatusCode::CONFLICT,
            FrontendError::InvalidGrid(_)
            | FrontendError::NoPrediction
            | FrontendError::InvalidLabel(_)
            | FrontendError::InvalidBody(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn kind(&self) -> OutcomeKind {
        match self {
            FrontendError::Busy => OutcomeKind::Busy,
            FrontendError::NoPrediction => OutcomeKind::NoPrediction,
            FrontendError::InvalidGrid(_)
            | FrontendError::InvalidLabel(_)
            | FrontendError::InvalidBody(_) => OutcomeKind::InvalidInput,
        }
    }
}

impl IntoResponse for FrontendError {
    fn into_response(self) -> Response {
        let outcome = Outcome::warning(self.kind(), self.to_string());
        outcome.log("frontend");
        (self.status(), Json(outcome)).into_response()
    }
}
