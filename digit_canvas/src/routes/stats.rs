use crate::{feedback::FeedbackStats, interpreter::Outcome, server::SharedState};
use axum::{extract::State, response::Json};
use serde::Serialize;
use tracing::instrument;

#[derive(Serialize)]
pub struct StatsView {
    outcome: Outcome,
    stats: FeedbackStats,
}

#[instrument(skip(state))]
pub async fn feedback_stats(State(state): State<SharedState>) -> Json<StatsView> {
    state.metrics.record_request("stats");

    let (outcome, stats) = match state.api.feedback_stats().await {
        Ok(stats) => {
            let total: u64 = stats.rows().iter().map(|row| row.total()).sum();
            let message = format!(
                "{total} feedback entries across {} digits",
                stats.rows().len()
            );
            (Outcome::success(message), stats)
        }
        Err(e) => (Outcome::from(&e), FeedbackStats::default()),
    };
    state.metrics.record_outcome(outcome.kind.as_str());
    outcome.log("stats");

    Json(StatsView { outcome, stats })
}
