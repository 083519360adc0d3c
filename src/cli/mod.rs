pub mod commands;

use crate::config::endpoints::{
    BUILD_SUPABASE_ANON_KEY,
    BUILD_SUPABASE_URL,
    BUILD_WEBHOOK_URL,
    DEFAULT_WIDGET_URL,
};
use crate::models::widget::Position;
use crate::training::TrainingRequest;
use clap::{ Parser, Subcommand };
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Widget Endpoints ---
    /// Base URL of the backend that serves bot widget settings (e.g., https://xyz.supabase.co)
    #[arg(long, env = "SUPABASE_URL", default_value = BUILD_SUPABASE_URL, global = true)]
    pub supabase_url: String,

    /// Public (anon) API key sent with widget config lookups.
    #[arg(long, env = "SUPABASE_ANON_KEY", default_value = BUILD_SUPABASE_ANON_KEY, global = true)]
    pub supabase_anon_key: String,

    /// Endpoint chat messages are posted to.
    #[arg(long, env = "WEBHOOK_URL", default_value = BUILD_WEBHOOK_URL, global = true)]
    pub webhook_url: String,

    // --- Dashboard Integration ---
    /// Base URL of the training workflow engine (train-bot, retrain-bot, bot-status).
    #[arg(long, env = "N8N_WEBHOOK_URL", default_value = "", global = true)]
    pub n8n_webhook_url: String,

    /// Public URL of the widget script used in integration snippets.
    #[arg(long, env = "CHAT_WIDGET_URL", default_value = DEFAULT_WIDGET_URL, global = true)]
    pub widget_url: String,

    // --- General App Args ---
    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the embed snippet for a bot.
    Snippet {
        bot_id: String,
    },

    /// Render reply markdown to sanitized HTML. Reads stdin unless --text is given.
    Render {
        #[arg(long)]
        text: Option<String>,
    },

    /// Run a headless widget against the live endpoints and chat from the terminal.
    Chat {
        bot_id: String,

        #[arg(long, default_value = "bottom-right")]
        position: Position,
    },

    /// Initialize a headless widget and write the resulting page to a file.
    Preview {
        bot_id: String,

        /// Output HTML file.
        #[arg(long, default_value = "widget-preview.html")]
        out: PathBuf,

        #[arg(long, default_value = "bottom-right")]
        position: Position,

        /// Render the chat window opened instead of just the toggle.
        #[arg(long, default_value = "false")]
        open: bool,
    },

    /// Ask the workflow engine to scrape and train a bot.
    Train(TrainArgs),

    /// Re-scrape and retrain an existing bot.
    Retrain(TrainArgs),

    /// Show a bot's training status.
    Status {
        bot_id: String,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct TrainArgs {
    pub bot_id: String,

    pub website_url: String,

    /// Requester email passed through to the workflow.
    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub bot_name: Option<String>,

    /// URL the workflow calls back when training finishes.
    #[arg(long)]
    pub callback_url: Option<String>,
}

impl From<TrainArgs> for TrainingRequest {
    fn from(args: TrainArgs) -> Self {
        TrainingRequest {
            bot_id: args.bot_id,
            website_url: args.website_url,
            email: args.email,
            bot_name: args.bot_name,
            callback_url: args.callback_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "chatbot-widget",
            "preview",
            "b1",
            "--position",
            "bottom-left",
            "--webhook-url",
            "https://hooks.example.com/chat",
        ]).unwrap();
        assert_eq!(args.webhook_url, "https://hooks.example.com/chat");
        match args.command {
            Command::Preview { bot_id, position, open, .. } => {
                assert_eq!(bot_id, "b1");
                assert_eq!(position, Position::BottomLeft);
                assert!(!open);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn train_args_become_a_request() {
        let args = Args::try_parse_from([
            "chatbot-widget",
            "train",
            "b1",
            "https://shop.example.com",
            "--email",
            "owner@example.com",
        ]).unwrap();
        let Command::Train(train) = args.command else {
            panic!("expected train");
        };
        let req = TrainingRequest::from(train);
        assert_eq!(req.bot_id, "b1");
        assert_eq!(req.email.as_deref(), Some("owner@example.com"));
        assert_eq!(req.bot_name, None);
    }
}
