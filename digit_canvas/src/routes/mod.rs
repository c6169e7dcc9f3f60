mod feedback;
mod health;
mod index;
mod metrics;
mod predict;
mod stats;

use crate::server::SharedState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(index::index))
        .route("/health", get(health::healthcheck))
        .route("/metrics", get(metrics::metrics_handler))
        .route("/predict/canvas", post(predict::predict_canvas))
        .route("/predict/pixels", post(predict::predict_pixels))
        .route("/predict/random", post(predict::predict_random))
        .route("/prediction/last", get(predict::last_prediction))
        .route("/feedback", post(feedback::submit_feedback))
        .route("/stats", get(stats::feedback_stats))
}
