use crate::config::endpoints::WidgetEndpoints;
use crate::models::widget::{
    WidgetTheme,
    DEFAULT_BOT_BUBBLE_COLOR,
    DEFAULT_DISPLAY_NAME,
    DEFAULT_HEADER_COLOR,
    DEFAULT_USER_BUBBLE_COLOR,
};
use async_trait::async_trait;
use log::{ debug, info };
use reqwest::header::{ ACCEPT, AUTHORIZATION };
use serde::Deserialize;
use serde_json::Value as JsonValue;
use thiserror::Error;

const WIDGET_CONFIG_RPC: &str = "rest/v1/rpc/get_widget_config";

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("Widget config request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Widget config lookup returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("Malformed widget config payload: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait ThemeFetcher: Send + Sync {
    async fn fetch_theme(&self, bot_id: &str) -> Result<WidgetTheme, ConfigLoadError>;
}

/// Row returned by the `get_widget_config` procedure. Every field may be
/// absent or null.
#[derive(Deserialize, Debug, Default)]
struct WidgetConfigRow {
    widget_header_color: Option<String>,
    widget_user_bubble_color: Option<String>,
    widget_bot_bubble_color: Option<String>,
    widget_display_name: Option<String>,
    name: Option<String>,
    widget_avatar_url: Option<String>,
}

impl From<WidgetConfigRow> for WidgetTheme {
    fn from(row: WidgetConfigRow) -> Self {
        WidgetTheme {
            header_color: row.widget_header_color.unwrap_or_else(|| DEFAULT_HEADER_COLOR.into()),
            user_bubble_color: row.widget_user_bubble_color.unwrap_or_else(||
                DEFAULT_USER_BUBBLE_COLOR.into()
            ),
            bot_bubble_color: row.widget_bot_bubble_color.unwrap_or_else(||
                DEFAULT_BOT_BUBBLE_COLOR.into()
            ),
            display_name: row.widget_display_name
                .or(row.name)
                .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.into()),
            avatar_url: row.widget_avatar_url.filter(|url| !url.trim().is_empty()),
        }
    }
}

/// Builds a theme from a lookup payload, filling absent fields with defaults.
///
/// The payload must be an object, or an array whose first element is one.
pub fn theme_from_payload(payload: JsonValue) -> Result<WidgetTheme, ConfigLoadError> {
    let row = match payload {
        JsonValue::Object(_) => payload,
        JsonValue::Array(mut rows) if !rows.is_empty() && rows[0].is_object() => rows.swap_remove(0),
        other => {
            return Err(ConfigLoadError::Malformed(format!("expected an object, got {}", other)));
        }
    };

    let row: WidgetConfigRow = serde_json
        ::from_value(row)
        .map_err(|e| ConfigLoadError::Malformed(e.to_string()))?;
    Ok(row.into())
}

pub struct RemoteThemeClient {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl RemoteThemeClient {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        RemoteThemeClient {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            anon_key: anon_key.into(),
        }
    }

    pub fn from_endpoints(endpoints: &WidgetEndpoints) -> Self {
        Self::new(endpoints.config_base_url.clone(), endpoints.anon_key.clone())
    }

    fn rpc_url(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), WIDGET_CONFIG_RPC)
    }
}

#[async_trait]
impl ThemeFetcher for RemoteThemeClient {
    async fn fetch_theme(&self, bot_id: &str) -> Result<WidgetTheme, ConfigLoadError> {
        let url = self.rpc_url();
        debug!("Fetching widget config for bot {} from {}", bot_id, url);

        let resp = self.client
            .post(&url)
            .header("apikey", &self.anon_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.anon_key))
            .header(ACCEPT, "application/json")
            .json(&serde_json::json!({ "bot_id_input": bot_id }))
            .send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ConfigLoadError::Status(status));
        }

        let body_text = resp.text().await?;
        let root: JsonValue = serde_json
            ::from_str(&body_text)
            .map_err(|e| ConfigLoadError::Malformed(format!("invalid JSON: {}", e)))?;

        let theme = theme_from_payload(root)?;
        info!("Loaded widget config for bot {} ({})", bot_id, theme.display_name);
        Ok(theme)
    }
}
