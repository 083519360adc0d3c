use serde::{ Deserialize, Serialize };
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_HEADER_COLOR: &str = "#18181b";
pub const DEFAULT_USER_BUBBLE_COLOR: &str = "#18181b";
pub const DEFAULT_BOT_BUBBLE_COLOR: &str = "#f4f4f5";
pub const DEFAULT_DISPLAY_NAME: &str = "Chat Assistant";

/// Corner the toggle button and chat window are pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    #[default]
    BottomRight,
    BottomLeft,
}

impl Position {
    pub fn css_class(&self) -> &'static str {
        match self {
            Position::BottomRight => "bottom-right",
            Position::BottomLeft => "bottom-left",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.css_class())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParsePositionError {
    message: String,
}

impl fmt::Display for ParsePositionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParsePositionError {}

impl FromStr for Position {
    type Err = ParsePositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bottom-right" => Ok(Position::BottomRight),
            "bottom-left" => Ok(Position::BottomLeft),
            _ =>
                Err(ParsePositionError {
                    message: format!("Invalid widget position: '{}'", s),
                }),
        }
    }
}

/// Argument of `ChatBot.init`, also the shape of the host page's global
/// `ChatBotConfig` object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    pub bot_id: String,
    #[serde(default)]
    pub position: Position,
}

impl WidgetConfig {
    pub fn new(bot_id: impl Into<String>) -> Self {
        Self {
            bot_id: bot_id.into(),
            position: Position::default(),
        }
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WidgetTheme {
    pub header_color: String,
    pub user_bubble_color: String,
    pub bot_bubble_color: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

impl Default for WidgetTheme {
    fn default() -> Self {
        Self {
            header_color: DEFAULT_HEADER_COLOR.to_string(),
            user_bubble_color: DEFAULT_USER_BUBBLE_COLOR.to_string(),
            bot_bubble_color: DEFAULT_BOT_BUBBLE_COLOR.to_string(),
            display_name: DEFAULT_DISPLAY_NAME.to_string(),
            avatar_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_config_object_deserializes() {
        let cfg: WidgetConfig = serde_json
            ::from_str(r#"{"botId":"abc","position":"bottom-left"}"#)
            .unwrap();
        assert_eq!(cfg.bot_id, "abc");
        assert_eq!(cfg.position, Position::BottomLeft);

        let cfg: WidgetConfig = serde_json::from_str(r#"{"botId":"abc"}"#).unwrap();
        assert_eq!(cfg.position, Position::BottomRight);
    }

    #[test]
    fn position_parses_case_insensitively() {
        assert_eq!("Bottom-Left".parse::<Position>(), Ok(Position::BottomLeft));
        assert!("top-left".parse::<Position>().is_err());
    }
}
