use log::{ debug, info, warn };
use serde::{ Deserialize, Serialize };
use serde_json::Value as JsonValue;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("Training request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Failed to {action}: workflow returned status {status}")]
    Status {
        action: &'static str,
        status: reqwest::StatusCode,
    },
    #[error("Invalid workflow base URL '{0}'")]
    InvalidBaseUrl(String),
    #[error("Unexpected workflow response: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingRequest {
    pub bot_id: String,
    pub website_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
}

impl TrainingRequest {
    pub fn new(bot_id: impl Into<String>, website_url: impl Into<String>) -> Self {
        TrainingRequest {
            bot_id: bot_id.into(),
            website_url: website_url.into(),
            email: None,
            bot_name: None,
            callback_url: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_bot_name(mut self, name: impl Into<String>) -> Self {
        self.bot_name = Some(name.into());
        self
    }

    pub fn with_callback_url(mut self, url: impl Into<String>) -> Self {
        self.callback_url = Some(url.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotStatus {
    Pending,
    Training,
    Ready,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TrainingStatus {
    pub status: BotStatus,
    #[serde(default, alias = "total_pages_scraped")]
    pub pages_scraped: Option<u64>,
    #[serde(default)]
    pub message: Option<String>,
}

pub struct TrainingClient {
    http: reqwest::Client,
    base_url: String,
}

impl TrainingClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// `{base}/{segments...}`, with each segment percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, TrainingError> {
        let mut url = Url::parse(self.base_url.trim()).map_err(|_|
            TrainingError::InvalidBaseUrl(self.base_url.clone())
        )?;
        url.path_segments_mut()
            .map_err(|_| TrainingError::InvalidBaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub async fn train(&self, request: &TrainingRequest) -> Result<JsonValue, TrainingError> {
        info!("Triggering training for bot {} ({})", request.bot_id, request.website_url);
        self.trigger("train-bot", "trigger bot training", request).await
    }

    pub async fn retrain(&self, request: &TrainingRequest) -> Result<JsonValue, TrainingError> {
        info!("Triggering retraining for bot {} ({})", request.bot_id, request.website_url);
        self.trigger("retrain-bot", "trigger bot retraining", request).await
    }

    pub async fn status(&self, bot_id: &str) -> Result<TrainingStatus, TrainingError> {
        let url = self.endpoint(&["bot-status", bot_id])?;
        debug!("Fetching training status from {}", url);

        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            warn!("Status lookup for bot {} answered {}", bot_id, status);
            return Err(TrainingError::Status { action: "get bot status", status });
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| TrainingError::Malformed(e.to_string()))
    }

    async fn trigger(
        &self,
        path: &str,
        action: &'static str,
        request: &TrainingRequest
    ) -> Result<JsonValue, TrainingError> {
        let url = self.endpoint(&[path])?;
        let resp = self.http.post(url).json(request).send().await?;
        let status = resp.status();
        if !status.is_success() {
            warn!("Workflow answered {} for bot {}", status, request.bot_id);
            return Err(TrainingError::Status { action, status });
        }

        let body = resp.text().await?;
        if body.trim().is_empty() {
            return Ok(JsonValue::Null);
        }
        serde_json::from_str(&body).map_err(|e| TrainingError::Malformed(e.to_string()))
    }
}
