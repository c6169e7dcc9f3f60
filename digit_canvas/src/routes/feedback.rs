use crate::{
    error::FrontendError,
    feedback::FeedbackRecord,
    interpreter::Outcome,
    prediction::Digit,
    server::SharedState,
};
use axum::{extract::State, response::Json};
use axum_extra::extract::{cookie::CookieJar, WithRejection};
use serde::Deserialize;
use tracing::instrument;

#[derive(Debug, Deserialize)]
pub struct FeedbackBody {
    correct: bool,
    #[serde(default)]
    true_label: Option<i64>,
    #[serde(default)]
    prediction: Option<i64>,
}

fn to_digit(value: i64) -> Result<Digit, FrontendError> {
    Digit::try_from(value).map_err(FrontendError::InvalidLabel)
}

#[instrument(skip_all)]
pub async fn submit_feedback(
    State(state): State<SharedState>,
    jar: CookieJar,
    WithRejection(Json(body), _): WithRejection<Json<FeedbackBody>, FrontendError>,
) -> Result<(CookieJar, Json<Outcome>), FrontendError> {
    state.metrics.record_request("feedback");

    let (jar, session) = state.sessions.open(jar);
    let prediction = match body.prediction {
        Some(value) => to_digit(value)?,
        None => session
            .last_prediction()
            .ok_or(FrontendError::NoPrediction)?,
    };
    let true_label = body.true_label.map(to_digit).transpose()?;
    let record = FeedbackRecord::new(prediction, body.correct, true_label);

    let outcome = match state.api.send_feedback(&record).await {
        Ok(()) => {
            state.metrics.record_feedback(record.correct);
            Outcome::success("feedback recorded")
        }
        Err(e) => Outcome::from(&e),
    };
    state.metrics.record_outcome(outcome.kind.as_str());
    outcome.log("feedback");

    Ok((jar, Json(outcome)))
}
