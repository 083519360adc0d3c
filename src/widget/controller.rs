use super::dom::Element;
use super::host::{ lock_host, HostError, RootId, SharedHost, WidgetHost };
use super::icons::{ CHAT_ICON, CLOSE_ICON, SEND_ICON };
use super::styles::{ text_color_for, BOT_BUBBLE_VAR, HEADER_COLOR_VAR, USER_BUBBLE_VAR };
use crate::markdown::render_markdown;
use crate::models::chat::{ Role, WidgetMessage };
use crate::models::widget::{ Position, WidgetTheme };
use crate::transport::{ ChatTransport, SendFailedError, Session };
use log::{ debug, warn };
use std::sync::Arc;

pub const FALLBACK_REPLY: &str = "Something went wrong. Please try again.";
pub const EMPTY_STATE_TEXT: &str = "Send a message to start chatting";
pub const INPUT_PLACEHOLDER: &str = "Type a message...";

/// DOM events the host adapter forwards to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    ToggleClicked,
    CloseClicked,
    InputChanged(String),
    KeyDown {
        key: String,
        shift: bool,
    },
    SendClicked,
}

/// A send that has been shown to the user and is waiting for its reply.
#[derive(Debug)]
pub struct PendingSend {
    text: String,
}

impl PendingSend {
    pub fn text(&self) -> &str {
        &self.text
    }
}

struct Bubble {
    message: WidgetMessage,
    /// Rendered reply markup, bot messages only.
    markup: Option<String>,
}

pub struct ChatController {
    root: RootId,
    host: SharedHost,
    transport: Arc<dyn ChatTransport>,
    bot_id: String,
    theme: WidgetTheme,
    position: Position,
    session: Session,
    bot_text_color: &'static str,
    is_open: bool,
    sending: bool,
    typing: bool,
    input: String,
    bubbles: Vec<Bubble>,
}

impl ChatController {
    /// Applies the theme to the root and renders the closed widget.
    pub fn new(
        root: RootId,
        host: SharedHost,
        transport: Arc<dyn ChatTransport>,
        bot_id: impl Into<String>,
        theme: WidgetTheme,
        position: Position
    ) -> Result<Self, HostError> {
        {
            let mut guard = lock_host(&host);
            guard.set_style_property(root, HEADER_COLOR_VAR, &theme.header_color)?;
            guard.set_style_property(root, USER_BUBBLE_VAR, &theme.user_bubble_color)?;
            guard.set_style_property(root, BOT_BUBBLE_VAR, &theme.bot_bubble_color)?;
        }

        let controller = ChatController {
            root,
            host,
            transport,
            bot_id: bot_id.into(),
            bot_text_color: text_color_for(&theme.bot_bubble_color),
            theme,
            position,
            session: Session::new(),
            is_open: false,
            sending: false,
            typing: false,
            input: String::new(),
            bubbles: Vec::new(),
        };
        controller.render();
        Ok(controller)
    }

    pub fn root(&self) -> RootId {
        self.root
    }

    pub fn bot_id(&self) -> &str {
        &self.bot_id
    }

    pub fn theme(&self) -> &WidgetTheme {
        &self.theme
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn send_disabled(&self) -> bool {
        self.sending || self.input.trim().is_empty()
    }

    pub fn messages(&self) -> impl Iterator<Item = &WidgetMessage> {
        self.bubbles.iter().map(|b| &b.message)
    }

    pub fn set_open(&mut self, open: bool) {
        self.is_open = open;
        self.render();
        if open {
            self.with_host(|host, root| host.focus_input(root));
        }
    }

    pub fn toggle(&mut self) {
        self.set_open(!self.is_open);
    }

    pub fn close(&mut self) {
        self.set_open(false);
    }

    /// Ignored while a send is outstanding, matching the disabled input.
    pub fn set_input(&mut self, value: impl Into<String>) {
        if self.sending {
            debug!("Ignoring input change for bot {} while sending", self.bot_id);
            return;
        }
        self.input = value.into();
        self.render();
    }

    /// First half of a send: shows the user's message and the typing
    /// indicator. Returns `None` while another send is outstanding or when
    /// the input is blank.
    pub fn begin_send(&mut self) -> Option<PendingSend> {
        let text = self.input.trim().to_string();
        if text.is_empty() || self.sending {
            return None;
        }

        self.push(Role::User, text.clone());
        self.input.clear();
        self.sending = true;
        self.render();
        self.with_host(|host, root| host.scroll_to_bottom(root));

        self.typing = true;
        self.render();
        self.with_host(|host, root| host.scroll_to_bottom(root));

        Some(PendingSend { text })
    }

    /// Second half of a send. The reply is appended whether or not the
    /// window is still open.
    pub fn complete_send(&mut self, pending: PendingSend, outcome: Result<String, SendFailedError>) {
        self.typing = false;
        match outcome {
            Ok(reply) => {
                debug!("Reply received for bot {} ({} chars sent)", self.bot_id, pending.text.len());
                self.push(Role::Bot, reply);
            }
            Err(e) => {
                warn!("Failed to send message for bot {}: {}", self.bot_id, e);
                self.push(Role::Bot, FALLBACK_REPLY.to_string());
            }
        }
        self.sending = false;
        self.render();
        self.with_host(|host, root| {
            host.scroll_to_bottom(root);
            host.focus_input(root);
        });
    }

    /// Runs a full send cycle against the transport. Returns whether a
    /// message was actually sent.
    pub async fn submit(&mut self) -> bool {
        let Some(pending) = self.begin_send() else {
            return false;
        };
        let outcome = self.transport
            .send_message(&self.bot_id, Some(self.session.id()), pending.text()).await;
        self.complete_send(pending, outcome);
        true
    }

    pub async fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::ToggleClicked => self.toggle(),
            UiEvent::CloseClicked => self.close(),
            UiEvent::InputChanged(value) => self.set_input(value),
            UiEvent::KeyDown { key, shift } => {
                if key == "Enter" && !shift {
                    self.submit().await;
                }
            }
            UiEvent::SendClicked => {
                self.submit().await;
            }
        }
    }

    fn push(&mut self, role: Role, content: String) {
        let markup = match role {
            Role::Bot => Some(render_markdown(&content)),
            Role::User => None,
        };
        self.bubbles.push(Bubble {
            message: WidgetMessage::new(role, content),
            markup,
        });
    }

    fn with_host(&self, f: impl FnOnce(&mut dyn WidgetHost, RootId)) {
        let mut guard = lock_host(&self.host);
        f(&mut *guard, self.root);
    }

    fn render(&self) {
        let view = self.view();
        if let Err(e) = lock_host(&self.host).mount(self.root, view) {
            warn!("Failed to render chat widget for bot {}: {}", self.bot_id, e);
        }
    }

    /// The complete widget markup for the current state.
    pub fn view(&self) -> Element {
        let pos = self.position.css_class();
        let open = if self.is_open { " open" } else { "" };

        let toggle = Element::new("button")
            .class(&format!("cb-toggle {}{}", pos, open))
            .attr("aria-label", if self.is_open { "Close chat" } else { "Open chat" })
            .markup(if self.is_open { CLOSE_ICON } else { CHAT_ICON });

        let window = Element::new("div")
            .class(&format!("cb-window {}{}", pos, open))
            .child(self.header_view())
            .child(self.messages_view())
            .child(self.input_view());

        Element::new("div").class("cb-root").child(toggle).child(window)
    }

    fn header_view(&self) -> Element {
        let avatar_url = self.theme.avatar_url.as_deref().filter(|url| !url.trim().is_empty());
        let avatar = match avatar_url {
            Some(url) => Element::new("img").class("cb-avatar").attr("src", url).attr("alt", ""),
            None => {
                let initial = self.theme.display_name
                    .chars()
                    .next()
                    .map(|c| c.to_uppercase().to_string())
                    .unwrap_or_else(|| "C".to_string());
                Element::new("div").class("cb-avatar-placeholder").text(initial)
            }
        };

        Element::new("div")
            .class("cb-header")
            .child(avatar)
            .child(Element::new("span").class("cb-header-name").text(self.theme.display_name.as_str()))
            .child(
                Element::new("button")
                    .class("cb-close")
                    .attr("aria-label", "Close chat")
                    .markup(CLOSE_ICON)
            )
    }

    fn messages_view(&self) -> Element {
        let mut list = Element::new("div").class("cb-messages");

        if self.bubbles.is_empty() && !self.typing {
            list = list.child(Element::new("div").class("cb-empty").text(EMPTY_STATE_TEXT));
        }

        for bubble in &self.bubbles {
            let role = bubble.message.role.as_str();
            let el = Element::new("div").class(&format!("cb-msg cb-msg-{}", role));
            list = list.child(match &bubble.markup {
                Some(markup) => el.attr("style", format!("color: {}", self.bot_text_color)).markup(markup.as_str()),
                None => el.text(bubble.message.content.as_str()),
            });
        }

        if self.typing {
            let mut typing = Element::new("div").class("cb-typing");
            for _ in 0..3 {
                typing = typing.child(Element::new("div").class("cb-dot"));
            }
            list = list.child(typing);
        }

        list
    }

    fn input_view(&self) -> Element {
        Element::new("div")
            .class("cb-input-bar")
            .child(
                Element::new("input")
                    .class("cb-input")
                    .attr("placeholder", INPUT_PLACEHOLDER)
                    .attr("value", self.input.as_str())
                    .flag("disabled", self.sending)
            )
            .child(
                Element::new("button")
                    .class("cb-send")
                    .attr("aria-label", "Send")
                    .flag("disabled", self.send_disabled())
                    .markup(SEND_ICON)
            )
    }
}
