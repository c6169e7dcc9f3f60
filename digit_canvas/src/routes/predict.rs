use crate::{
    error::FrontendError,
    interpreter::Outcome,
    pixel_grid::PixelGrid,
    prediction::Digit,
    server::SharedState,
    session::Session,
};
use axum::{extract::State, response::Json};
use axum_extra::extract::{cookie::CookieJar, WithRejection};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::instrument;

#[derive(Deserialize)]
pub struct PixelsBody {
    pixels: Vec<u8>,
}

#[derive(Serialize)]
pub struct RandomPrediction {
    pixels: Vec<u8>,
    outcome: Outcome,
}

#[derive(Serialize)]
pub struct LastPrediction {
    prediction: Option<Digit>,
}

#[instrument(skip_all, fields(bytes = image_data.len()))]
pub async fn predict_canvas(
    State(state): State<SharedState>,
    jar: CookieJar,
    image_data: Bytes,
) -> Result<(CookieJar, Json<Outcome>), FrontendError> {
    let grid = PixelGrid::from_canvas_png(&image_data)?;
    let (jar, session) = state.sessions.open(jar);
    let outcome = run_prediction(&state, &session, &grid, "predict_canvas").await?;
    Ok((jar, Json(outcome)))
}

#[instrument(skip_all)]
pub async fn predict_pixels(
    State(state): State<SharedState>,
    jar: CookieJar,
    WithRejection(Json(body), _): WithRejection<Json<PixelsBody>, FrontendError>,
) -> Result<(CookieJar, Json<Outcome>), FrontendError> {
    let grid = PixelGrid::from_pixels(body.pixels)?;
    let (jar, session) = state.sessions.open(jar);
    let outcome = run_prediction(&state, &session, &grid, "predict_pixels").await?;
    Ok((jar, Json(outcome)))
}

#[instrument(skip_all)]
pub async fn predict_random(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<RandomPrediction>), FrontendError> {
    let grid = PixelGrid::random(&mut rand::rng());
    let (jar, session) = state.sessions.open(jar);
    let outcome = run_prediction(&state, &session, &grid, "predict_random").await?;
    Ok((
        jar,
        Json(RandomPrediction {
            pixels: grid.pixels().to_vec(),
            outcome,
        }),
    ))
}

pub async fn last_prediction(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> (CookieJar, Json<LastPrediction>) {
    let (jar, session) = state.sessions.open(jar);
    (
        jar,
        Json(LastPrediction {
            prediction: session.last_prediction(),
        }),
    )
}

async fn run_prediction(
    state: &SharedState,
    session: &Session,
    grid: &PixelGrid,
    route: &'static str,
) -> Result<Outcome, FrontendError> {
    // Held until this function returns, whatever the upstream result.
    let _in_flight = session.guard().try_acquire().ok_or(FrontendError::Busy)?;
    state.metrics.record_request(route);

    let started = Instant::now();
    let result = state.api.predict(grid).await;
    state
        .metrics
        .record_prediction_duration(started.elapsed().as_millis() as u64, route);

    if let Ok(digit) = &result {
        session.record(*digit);
    }

    let outcome = Outcome::from(result);
    state.metrics.record_outcome(outcome.kind.as_str());
    outcome.log(route);

    Ok(outcome)
}
