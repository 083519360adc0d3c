use thiserror::Error;

pub const SNIPPET_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnippetError {
    #[error("Bot id '{0}' may only contain letters, digits, '-' and '_'")]
    InvalidBotId(String),
    #[error("Widget URL must not be empty")]
    MissingWidgetUrl,
}

fn is_valid_bot_id(bot_id: &str) -> bool {
    !bot_id.is_empty() && bot_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

pub fn integration_snippet(widget_url: &str, bot_id: &str) -> Result<String, SnippetError> {
    if !is_valid_bot_id(bot_id) {
        return Err(SnippetError::InvalidBotId(bot_id.to_string()));
    }
    let widget_url = widget_url.trim();
    if widget_url.is_empty() {
        return Err(SnippetError::MissingWidgetUrl);
    }
    Ok(
        format!(
            "<script src=\"{}\"></script>\n<script>\n  ChatBot.init({{ botId: '{}' }});\n</script>",
            widget_url,
            bot_id
        )
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v1_snippet_shape() {
        let snippet = integration_snippet(
            "https://yourdomain.com/widget.js",
            "3f1c2a9e-0b7d-4a1e-9c55-2d6b8f0e1a77"
        ).unwrap();
        assert_eq!(
            snippet,
            "<script src=\"https://yourdomain.com/widget.js\"></script>\n<script>\n  ChatBot.init({ botId: '3f1c2a9e-0b7d-4a1e-9c55-2d6b8f0e1a77' });\n</script>"
        );
    }

    #[test]
    fn rejects_ids_that_could_break_out_of_the_script() {
        assert_eq!(
            integration_snippet("https://x.io/widget.js", "a'});alert(1)//"),
            Err(SnippetError::InvalidBotId("a'});alert(1)//".into()))
        );
        assert!(integration_snippet("https://x.io/widget.js", "").is_err());
        assert_eq!(integration_snippet("  ", "abc"), Err(SnippetError::MissingWidgetUrl));
    }
}
