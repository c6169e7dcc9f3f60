use axum::response::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct Health {
    status: &'static str,
}

// Local readiness only. The model API is not called.
pub async fn healthcheck() -> Json<Health> {
    Json(Health {
        status: "Available",
    })
}
