use crate::bootstrap::ChatBot;
use crate::cli::Args;
use crate::config::endpoints::WidgetEndpoints;
use crate::config::widget_config::RemoteThemeClient;
use crate::models::chat::Role;
use crate::models::widget::{ Position, WidgetConfig };
use crate::transport::WebhookTransport;
use crate::widget::controller::{ ChatController, UiEvent };
use crate::widget::host::{ HeadlessHost, SharedHost };
use log::{ info, warn };
use std::error::Error;
use std::path::Path;
use std::sync::{ Arc, Mutex };
use tokio::io::{ AsyncBufReadExt, AsyncReadExt, BufReader };

pub const PREVIEW_TITLE: &str = "Chat widget preview";

type CommandResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

pub async fn read_stdin() -> CommandResult<String> {
    let mut text = String::new();
    tokio::io::stdin().read_to_string(&mut text).await?;
    Ok(text)
}

/// Boots a widget for `bot_id` into an in-memory page wired to the
/// configured endpoints.
async fn headless_widget(
    args: &Args,
    bot_id: &str,
    position: Position
) -> CommandResult<(ChatController, Arc<Mutex<HeadlessHost>>)> {
    let endpoints = WidgetEndpoints::from_args(args);
    let missing = endpoints.missing();
    if !missing.is_empty() {
        warn!("Missing endpoint settings: {}", missing.join(", "));
    }

    let host = Arc::new(Mutex::new(HeadlessHost::new()));
    let shared: SharedHost = host.clone();
    let chatbot = ChatBot::with_page_registry(
        shared,
        Arc::new(RemoteThemeClient::from_endpoints(&endpoints)),
        Arc::new(WebhookTransport::from_endpoints(&endpoints))
    );

    let config = WidgetConfig::new(bot_id).with_position(position);
    match chatbot.init(config).await {
        Some(controller) => Ok((controller, host)),
        None => Err(format!("Widget for bot '{}' could not be initialized", bot_id).into()),
    }
}

fn page_html(host: &Arc<Mutex<HeadlessHost>>) -> String {
    let host = host.lock().unwrap_or_else(|e| e.into_inner());
    host.to_document_html(PREVIEW_TITLE)
}

pub async fn preview(
    args: &Args,
    bot_id: &str,
    position: Position,
    open: bool,
    out: &Path
) -> CommandResult<()> {
    let (mut controller, host) = headless_widget(args, bot_id, position).await?;
    if open {
        controller.set_open(true);
    }
    tokio::fs::write(out, page_html(&host)).await?;
    info!("Preview written to {}", out.display());
    Ok(())
}

pub async fn chat(args: &Args, bot_id: &str, position: Position) -> CommandResult<()> {
    let (mut controller, host) = headless_widget(args, bot_id, position).await?;
    controller.set_open(true);
    println!(
        "Chatting with {} (session {}). Commands: /open, /close, /html, /quit",
        controller.theme().display_name,
        controller.session().id()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "" => {}
            "/quit" => break,
            "/open" => {
                if !controller.is_open() {
                    controller.handle_event(UiEvent::ToggleClicked).await;
                }
            }
            "/close" => controller.handle_event(UiEvent::CloseClicked).await,
            "/html" => println!("{}", page_html(&host)),
            _ => {
                controller.handle_event(UiEvent::InputChanged(line)).await;
                controller.handle_event(UiEvent::SendClicked).await;
                if let Some(reply) = controller.messages().last().filter(|m| m.role == Role::Bot) {
                    println!("{}> {}", controller.theme().display_name, reply.content);
                }
            }
        }
    }
    Ok(())
}
