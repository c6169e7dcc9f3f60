use crate::config::{ApiConfig, Credentials};
use crate::feedback::{FeedbackRecord, FeedbackStats};
use crate::interpreter::{check_status, ApiError};
use crate::pixel_grid::PixelGrid;
use crate::prediction::{Digit, PredictRequest, PredictResponse};
use reqwest::{Client, RequestBuilder};
use std::time::Duration;
use tracing::instrument;

pub const TOKEN_HEADER: &str = "x-token";
pub const PREDICT_PATH: &str = "/predict";
pub const FEEDBACK_PATH: &str = "/feedback";
pub const FEEDBACK_STATS_PATH: &str = "/feedback_stats";

// Thin reqwest wrapper around the model API. One attempt per call, no retry.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    config: ApiConfig,
    credentials: Option<Credentials>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, credentials: Credentials) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().map_err(ApiError::Client)?;

        Ok(Self {
            http,
            config: config.clone(),
            credentials: Some(credentials),
        })
    }

    /// Same client, but requests go out without the token header.
    pub fn without_token(&self) -> Self {
        Self {
            credentials: None,
            ..self.clone()
        }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    #[instrument(skip(self, grid))]
    pub async fn predict(&self, grid: &PixelGrid) -> Result<Digit, ApiError> {
        self.predict_raw(&grid.to_payload()).await
    }

    /// Posts an arbitrary vector. The API validates its length.
    #[instrument(skip(self, data), fields(len = data.len()))]
    pub async fn predict_raw(&self, data: &[f32]) -> Result<Digit, ApiError> {
        let request = self
            .http
            .post(self.config.endpoint(PREDICT_PATH))
            .json(&PredictRequest { data });
        let body = self.send(request).await?;

        let response: PredictResponse =
            serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))?;
        tracing::debug!(prediction = %response.prediction, "prediction received");

        Ok(response.prediction)
    }

    #[instrument(skip(self))]
    pub async fn send_feedback(&self, record: &FeedbackRecord) -> Result<(), ApiError> {
        let request = self
            .http
            .post(self.config.endpoint(FEEDBACK_PATH))
            .json(&record.to_wire());
        self.send(request).await?;

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn feedback_stats(&self) -> Result<FeedbackStats, ApiError> {
        let request = self.http.get(self.config.endpoint(FEEDBACK_STATS_PATH));
        let body = self.send(request).await?;

        FeedbackStats::from_json(&body).map_err(ApiError::Decode)
    }

    async fn send(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let request = match &self.credentials {
            Some(credentials) => request.header(TOKEN_HEADER, credentials.api_key()),
            None => request,
        };

        let response = request.send().await.map_err(ApiError::Connection)?;
        let status = response.status();
        let body = response.text().await.map_err(ApiError::Connection)?;

        check_status(status, body)
    }
}
