use crate::config::endpoints::WidgetEndpoints;
use crate::models::chat::SendRequest;
use async_trait::async_trait;
use log::{ debug, warn };
use serde_json::Value as JsonValue;
use thiserror::Error;
use uuid::Uuid;

/// Reply fields checked in this order before falling back to the raw JSON.
pub const REPLY_FIELDS: [&str; 3] = ["output", "message", "response"];

#[derive(Debug, Error)]
pub enum SendFailedError {
    #[error("Message request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Message endpoint returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Conversation id for one widget instance. Lives in memory only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: String,
}

impl Session {
    pub fn new() -> Self {
        Session {
            id: Uuid::new_v4().to_string(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_message(
        &self,
        bot_id: &str,
        session_id: Option<&str>,
        message: &str
    ) -> Result<String, SendFailedError>;
}

/// Turns whatever the endpoint answered into displayable text.
pub fn extract_reply(data: JsonValue) -> String {
    match data {
        JsonValue::String(s) => s,
        JsonValue::Object(ref map) => {
            match REPLY_FIELDS.iter().find_map(|field| map.get(*field).filter(|v| !v.is_null())) {
                Some(JsonValue::String(s)) => s.clone(),
                Some(value) => value.to_string(),
                None => data.to_string(),
            }
        }
        other => other.to_string(),
    }
}

pub struct WebhookTransport {
    http: reqwest::Client,
    webhook_url: String,
}

impl WebhookTransport {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            webhook_url: webhook_url.into(),
        }
    }

    pub fn from_endpoints(endpoints: &WidgetEndpoints) -> Self {
        Self::new(endpoints.message_webhook_url.clone())
    }
}

#[async_trait]
impl ChatTransport for WebhookTransport {
    async fn send_message(
        &self,
        bot_id: &str,
        session_id: Option<&str>,
        message: &str
    ) -> Result<String, SendFailedError> {
        let req = SendRequest {
            bot_id,
            message,
            session_id,
        };
        debug!("Sending message for bot {} ({} chars)", bot_id, message.chars().count());

        let resp = self.http.post(&self.webhook_url).json(&req).send().await?;
        let status = resp.status();
        if !status.is_success() {
            warn!("Message endpoint answered {} for bot {}", status, bot_id);
            return Err(SendFailedError::Status(status));
        }

        let body = resp.text().await?;
        Ok(match serde_json::from_str::<JsonValue>(&body) {
            Ok(data) => extract_reply(data),
            Err(_) => body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_string_is_returned_as_is() {
        assert_eq!(extract_reply(json!("hello")), "hello");
    }

    #[test]
    fn fields_are_tried_in_priority_order() {
        assert_eq!(
            extract_reply(json!({ "response": "r", "message": "m", "output": "o" })),
            "o"
        );
        assert_eq!(extract_reply(json!({ "response": "r", "message": "m" })), "m");
        assert_eq!(extract_reply(json!({ "response": "r" })), "r");
    }

    #[test]
    fn null_fields_are_skipped() {
        assert_eq!(extract_reply(json!({ "output": null, "message": "m" })), "m");
    }

    #[test]
    fn first_present_field_wins_even_if_not_a_string() {
        assert_eq!(extract_reply(json!({ "output": 42, "message": "m" })), "42");
    }

    #[test]
    fn unknown_shapes_are_serialized() {
        assert_eq!(extract_reply(json!({ "text": "t" })), r#"{"text":"t"}"#);
        assert_eq!(extract_reply(json!([1, 2])), "[1,2]");
        assert_eq!(extract_reply(json!(null)), "null");
    }

    #[test]
    fn request_body_uses_camel_case_and_omits_missing_session() {
        let body = serde_json
            ::to_value(SendRequest { bot_id: "b", message: "hi", session_id: None })
            .unwrap();
        assert_eq!(body, json!({ "botId": "b", "message": "hi" }));

        let body = serde_json
            ::to_value(SendRequest { bot_id: "b", message: "hi", session_id: Some("s") })
            .unwrap();
        assert_eq!(body, json!({ "botId": "b", "message": "hi", "sessionId": "s" }));
    }

    #[test]
    fn sessions_are_unique() {
        assert_ne!(Session::new(), Session::new());
    }
}
