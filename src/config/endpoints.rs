use crate::cli::Args;

/// Values baked in when the binary is built, used as defaults for the
/// matching command-line flags.
pub const BUILD_SUPABASE_URL: &str = match option_env!("WIDGET_SUPABASE_URL") {
    Some(v) => v,
    None => "",
};
pub const BUILD_SUPABASE_ANON_KEY: &str = match option_env!("WIDGET_SUPABASE_ANON_KEY") {
    Some(v) => v,
    None => "",
};
pub const BUILD_WEBHOOK_URL: &str = match option_env!("WIDGET_WEBHOOK_URL") {
    Some(v) => v,
    None => "",
};

pub const DEFAULT_WIDGET_URL: &str = "https://yourdomain.com/widget.js";

/// Remote endpoints the widget talks to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetEndpoints {
    pub config_base_url: String,
    pub anon_key: String,
    pub message_webhook_url: String,
}

impl WidgetEndpoints {
    pub fn from_args(args: &Args) -> Self {
        Self {
            config_base_url: args.supabase_url.clone(),
            anon_key: args.supabase_anon_key.clone(),
            message_webhook_url: args.webhook_url.clone(),
        }
    }

    /// Names of the endpoint settings that are still empty.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.config_base_url.trim().is_empty() {
            missing.push("SUPABASE_URL");
        }
        if self.message_webhook_url.trim().is_empty() {
            missing.push("WEBHOOK_URL");
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_missing_endpoints() {
        let endpoints = WidgetEndpoints {
            config_base_url: "https://db.example.com".into(),
            anon_key: String::new(),
            message_webhook_url: "  ".into(),
        };
        assert_eq!(endpoints.missing(), vec!["WEBHOOK_URL"]);
        assert!(WidgetEndpoints::default().missing().contains(&"SUPABASE_URL"));
    }
}
