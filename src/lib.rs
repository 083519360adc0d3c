pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod integration;
pub mod markdown;
pub mod models;
pub mod training;
pub mod transport;
pub mod widget;

pub use bootstrap::{ discover_config, page_registry, ChatBot, HostPage, InitRegistry, ScriptTag };
pub use markdown::render_markdown;
pub use widget::controller::ChatController;

use cli::{ commands, Args, Command };
use config::endpoints::WidgetEndpoints;
use integration::integration_snippet;
use log::info;
use std::error::Error;
use training::{ TrainingClient, TrainingRequest };

fn describe(value: &str) -> &str {
    if value.is_empty() { "(not set)" } else { value }
}

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let endpoints = WidgetEndpoints::from_args(&args);
    info!("--- Widget Configuration ---");
    info!("Config Base URL: {}", describe(&endpoints.config_base_url));
    info!("Anon Key: {}", if endpoints.anon_key.is_empty() { "(not set)" } else { "(set)" });
    info!("Message Webhook URL: {}", describe(&endpoints.message_webhook_url));
    info!("Training Webhook URL: {}", describe(&args.n8n_webhook_url));
    info!("Widget Script URL: {}", args.widget_url);
    info!("----------------------------");

    match args.command.clone() {
        Command::Snippet { bot_id } => {
            println!("{}", integration_snippet(&args.widget_url, &bot_id)?);
        }
        Command::Render { text } => {
            let text = match text {
                Some(text) => text,
                None => commands::read_stdin().await?,
            };
            println!("{}", render_markdown(&text));
        }
        Command::Chat { bot_id, position } => {
            commands::chat(&args, &bot_id, position).await?;
        }
        Command::Preview { bot_id, out, position, open } => {
            commands::preview(&args, &bot_id, position, open, &out).await?;
        }
        Command::Train(train) => {
            let client = TrainingClient::new(args.n8n_webhook_url.clone());
            let resp = client.train(&TrainingRequest::from(train)).await?;
            println!("{}", serde_json::to_string_pretty(&resp)?);
        }
        Command::Retrain(train) => {
            let client = TrainingClient::new(args.n8n_webhook_url.clone());
            let resp = client.retrain(&TrainingRequest::from(train)).await?;
            println!("{}", serde_json::to_string_pretty(&resp)?);
        }
        Command::Status { bot_id } => {
            let client = TrainingClient::new(args.n8n_webhook_url.clone());
            let status = client.status(&bot_id).await?;
            info!("Training status for {}: {:?}", bot_id, status.status);
            println!("status: {:?}", status.status);
            if let Some(pages) = status.pages_scraped {
                println!("pages scraped: {}", pages);
            }
            if let Some(message) = status.message {
                println!("message: {}", message);
            }
        }
    }

    Ok(())
}
