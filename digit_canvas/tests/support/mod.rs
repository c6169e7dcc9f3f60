// Stub of the remote model API plus helpers to boot the front-end against it.
#![allow(dead_code)]

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use digit_canvas::{
    api_client::ApiClient,
    config::{ApiConfig, Credentials, ServerConfig},
    server::HttpServer,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::{collections::BTreeMap, sync::Arc, time::Duration};
use tokio::{net::TcpListener, sync::broadcast};

pub const TEST_TOKEN: &str = "test-token";
pub const GRID_LEN: usize = 784;

// Grids with every value set to one of these trigger a canned stub answer.
pub const POISON_PIXEL: f64 = 7.0;
pub const OUT_OF_RANGE_PIXEL: f64 = 11.0;
pub const GARBLED_PIXEL: f64 = 13.0;

#[derive(Clone, Copy, Default)]
pub struct StubOptions {
    pub delay: Duration,
    pub stats_offline: bool,
}

#[derive(Clone, Default)]
struct StubState {
    options: StubOptions,
    feedback: Arc<Mutex<BTreeMap<u8, (u64, u64)>>>,
}

pub struct StubApi {
    pub base_url: String,
    state: StubState,
}

impl StubApi {
    pub fn feedback_count(&self) -> u64 {
        self.state
            .feedback
            .lock()
            .values()
            .map(|(correct, incorrect)| correct + incorrect)
            .sum()
    }

    pub fn client(&self) -> ApiClient {
        client_for(&self.base_url, TEST_TOKEN)
    }
}

pub fn client_for(base_url: &str, token: &str) -> ApiClient {
    let config = ApiConfig {
        base_url: base_url.to_string(),
        timeout_secs: Some(5),
    };
    ApiClient::new(&config, Credentials::new(token)).expect("client should build")
}

pub async fn spawn_stub_api() -> StubApi {
    spawn_stub_api_with(StubOptions::default()).await
}

pub async fn spawn_stub_api_with_delay(delay: Duration) -> StubApi {
    spawn_stub_api_with(StubOptions {
        delay,
        ..StubOptions::default()
    })
    .await
}

pub async fn spawn_stub_api_with(options: StubOptions) -> StubApi {
    let state = StubState {
        options,
        ..StubState::default()
    };
    let app = Router::new()
        .route("/predict", post(predict))
        .route("/feedback", post(feedback))
        .route("/feedback_stats", get(feedback_stats))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub api");
    let addr = listener.local_addr().expect("stub api addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub api failed");
    });

    StubApi {
        base_url: format!("http://{addr}"),
        state,
    }
}

/// Address nobody listens on.
pub async fn closed_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}")
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("x-token")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == TEST_TOKEN)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "detail": "Invalid or missing token" })),
    )
        .into_response()
}

async fn predict(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }

    let Some(values) = body["data"].as_array() else {
        return (StatusCode::BAD_REQUEST, "missing data").into_response();
    };
    let values: Option<Vec<f64>> = values.iter().map(Value::as_f64).collect();
    let values = match values {
        Some(values) if values.len() == GRID_LEN => values,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "detail": "Expected 784 values" })),
            )
                .into_response()
        }
    };

    if values.iter().all(|&v| v == POISON_PIXEL) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "model exploded").into_response();
    }
    if values.iter().all(|&v| v == OUT_OF_RANGE_PIXEL) {
        return Json(json!({ "prediction": 12 })).into_response();
    }
    if values.iter().all(|&v| v == GARBLED_PIXEL) {
        return (StatusCode::OK, "<html>maintenance</html>").into_response();
    }

    tokio::time::sleep(state.options.delay).await;

    let mean = values.iter().sum::<f64>() / GRID_LEN as f64;
    let prediction = ((mean / 25.6) as i64).min(9);
    Json(json!({ "prediction": prediction })).into_response()
}

async fn feedback(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }

    let prediction = body["prediction"].as_u64().filter(|p| *p <= 9);
    let correct = body["correct"].as_u64().filter(|c| *c <= 1);
    let (Some(prediction), Some(correct)) = (prediction, correct) else {
        return (StatusCode::BAD_REQUEST, "bad feedback").into_response();
    };

    let mut feedback = state.feedback.lock();
    let entry = feedback.entry(prediction as u8).or_default();
    if correct == 1 {
        entry.0 += 1;
    } else {
        entry.1 += 1;
    }

    Json(json!({ "status": "ok" })).into_response()
}

async fn feedback_stats(State(state): State<StubState>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if state.options.stats_offline {
        return (StatusCode::SERVICE_UNAVAILABLE, "stats offline").into_response();
    }

    let feedback = state.feedback.lock();
    let body: serde_json::Map<String, Value> = feedback
        .iter()
        .map(|(digit, (correct, incorrect))| {
            (
                digit.to_string(),
                json!({ "correct": correct, "incorrect": incorrect }),
            )
        })
        .collect();

    Json(Value::Object(body)).into_response()
}

/// A client that keeps the front-end's session cookie, like a browser tab.
pub fn browser() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("browser client should build")
}

/// A running front-end. Dropping it shuts the server down.
pub struct Frontend {
    pub base_url: String,
    _shutdown_tx: broadcast::Sender<()>,
}

pub async fn spawn_frontend(api: ApiClient) -> Frontend {
    let config = ServerConfig {
        host: "127.0.0.1".into(),
        port: 0,
        max_sessions: 64,
    };
    let server = HttpServer::new(api, &config)
        .await
        .expect("front-end should start");
    let addr = server.local_addr().expect("front-end addr");

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    server.run(shutdown_rx).await.expect("front-end should run");

    Frontend {
        base_url: format!("http://{addr}"),
        _shutdown_tx: shutdown_tx,
    }
}
