use crate::config::widget_config::ThemeFetcher;
use crate::models::widget::WidgetConfig;
use crate::transport::ChatTransport;
use crate::widget::controller::ChatController;
use crate::widget::host::{ lock_host, SharedHost };
use crate::widget::styles::{ widget_css, HOST_STYLE };
use log::{ error, info, warn };
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::sync::{ Arc, Mutex, MutexGuard };
use url::Url;

pub const WIDGET_SCRIPT_NAME: &str = "widget.js";
pub const BOT_ID_QUERY_PARAM: &str = "botId";
const ROOT_ID_PREFIX: &str = "chatbot-widget-";

pub fn root_element_id(bot_id: &str) -> String {
    format!("{}{}", ROOT_ID_PREFIX, bot_id)
}

/// Bot ids already initialized on a page. Entries are never removed, so a
/// failed init still blocks later attempts for the same id.
#[derive(Debug, Default)]
pub struct InitRegistry {
    bots: HashSet<String>,
}

impl InitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, bot_id: &str) -> bool {
        self.bots.contains(bot_id)
    }

    /// Returns `false` if the id was already present.
    pub fn insert(&mut self, bot_id: &str) -> bool {
        self.bots.insert(bot_id.to_string())
    }

    pub fn len(&self) -> usize {
        self.bots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bots.is_empty()
    }
}

static PAGE_REGISTRY: Lazy<Arc<Mutex<InitRegistry>>> = Lazy::new(||
    Arc::new(Mutex::new(InitRegistry::new()))
);

/// Registry shared by every widget script loaded into this process.
pub fn page_registry() -> Arc<Mutex<InitRegistry>> {
    PAGE_REGISTRY.clone()
}

fn lock_registry(registry: &Mutex<InitRegistry>) -> MutexGuard<'_, InitRegistry> {
    registry.lock().unwrap_or_else(|e| e.into_inner())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptTag {
    pub src: String,
    pub data_bot_id: Option<String>,
}

impl ScriptTag {
    pub fn new(src: impl Into<String>) -> Self {
        ScriptTag {
            src: src.into(),
            data_bot_id: None,
        }
    }

    pub fn with_data_bot_id(mut self, bot_id: impl Into<String>) -> Self {
        self.data_bot_id = Some(bot_id.into());
        self
    }
}

/// What the widget can see of the page that loaded it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostPage {
    pub url: String,
    pub scripts: Vec<ScriptTag>,
    pub global_config: Option<WidgetConfig>,
}

fn query_bot_id(page_url: Option<&Url>, src: &str) -> Option<String> {
    let resolved = match page_url {
        Some(base) => base.join(src).ok()?,
        None => Url::parse(src).ok()?,
    };
    resolved
        .query_pairs()
        .find(|(k, _)| k == BOT_ID_QUERY_PARAM)
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

/// Looks for a bot id in widget script URLs, then their `data-bot-id`
/// attributes, then the page's global `ChatBotConfig`.
pub fn discover_config(page: &HostPage) -> Option<WidgetConfig> {
    let page_url = Url::parse(&page.url).ok();

    for script in page.scripts.iter().filter(|s| s.src.contains(WIDGET_SCRIPT_NAME)) {
        if let Some(bot_id) = query_bot_id(page_url.as_ref(), &script.src) {
            info!("Found botId in script URL: {}", bot_id);
            return Some(WidgetConfig::new(bot_id));
        }
        if let Some(bot_id) = script.data_bot_id.as_deref().filter(|id| !id.is_empty()) {
            info!("Found data-bot-id on script: {}", bot_id);
            return Some(WidgetConfig::new(bot_id));
        }
    }

    match &page.global_config {
        Some(config) if !config.bot_id.is_empty() => {
            info!("Found global ChatBotConfig: {}", config.bot_id);
            Some(config.clone())
        }
        _ => {
            warn!("No botId found, widget not initialized");
            None
        }
    }
}

pub struct ChatBot {
    registry: Arc<Mutex<InitRegistry>>,
    host: SharedHost,
    fetcher: Arc<dyn ThemeFetcher>,
    transport: Arc<dyn ChatTransport>,
}

impl ChatBot {
    pub fn new(
        registry: Arc<Mutex<InitRegistry>>,
        host: SharedHost,
        fetcher: Arc<dyn ThemeFetcher>,
        transport: Arc<dyn ChatTransport>
    ) -> Self {
        ChatBot {
            registry,
            host,
            fetcher,
            transport,
        }
    }

    pub fn with_page_registry(
        host: SharedHost,
        fetcher: Arc<dyn ThemeFetcher>,
        transport: Arc<dyn ChatTransport>
    ) -> Self {
        Self::new(page_registry(), host, fetcher, transport)
    }

    pub fn registry(&self) -> &Arc<Mutex<InitRegistry>> {
        &self.registry
    }

    /// Creates the widget for `config.bot_id`. Returns `None` when the id is
    /// empty, already initialized, or when anything on the way fails; all of
    /// these are logged, none are surfaced.
    pub async fn init(&self, config: WidgetConfig) -> Option<ChatController> {
        let bot_id = config.bot_id.as_str();
        info!("init called with botId: {}", bot_id);

        if bot_id.is_empty() {
            error!("botId is required");
            return None;
        }

        let element_id = root_element_id(bot_id);
        {
            let mut registry = lock_registry(&self.registry);
            if registry.contains(bot_id) || lock_host(&self.host).element_exists(&element_id) {
                info!("Widget for {} already initialized, skipping", bot_id);
                return None;
            }
            registry.insert(bot_id);
        }

        let root = {
            let mut host = lock_host(&self.host);
            let root = match host.create_isolated_root(&element_id, HOST_STYLE) {
                Ok(root) => root,
                Err(e) => {
                    error!("Failed to create widget root for {}: {}", bot_id, e);
                    return None;
                }
            };
            if let Err(e) = host.inject_styles(root, widget_css()) {
                error!("Failed to inject widget styles for {}: {}", bot_id, e);
                let _ = host.unmount(root);
                return None;
            }
            root
        };

        info!("Fetching widget config for {}", bot_id);
        let theme = match self.fetcher.fetch_theme(bot_id).await {
            Ok(theme) => theme,
            Err(e) => {
                error!("Failed to initialize widget for {}: {}", bot_id, e);
                if let Err(e) = lock_host(&self.host).unmount(root) {
                    warn!("Failed to remove widget root for {}: {}", bot_id, e);
                }
                return None;
            }
        };

        info!("Config loaded for {}, creating chat UI", bot_id);
        match
            ChatController::new(
                root,
                self.host.clone(),
                self.transport.clone(),
                bot_id,
                theme,
                config.position
            )
        {
            Ok(controller) => Some(controller),
            Err(e) => {
                error!("Failed to render widget for {}: {}", bot_id, e);
                let _ = lock_host(&self.host).unmount(root);
                None
            }
        }
    }

    pub async fn auto_init(&self, page: &HostPage) -> Option<ChatController> {
        let config = discover_config(page)?;
        self.init(config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::widget_config::ConfigLoadError;
    use crate::models::widget::{ Position, WidgetTheme };
    use crate::transport::SendFailedError;
    use crate::widget::host::HeadlessHost;
    use async_trait::async_trait;
    use std::sync::atomic::{ AtomicUsize, Ordering };

    struct CountingFetcher {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingFetcher {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(CountingFetcher { calls: AtomicUsize::new(0), fail })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ThemeFetcher for CountingFetcher {
        async fn fetch_theme(&self, _bot_id: &str) -> Result<WidgetTheme, ConfigLoadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(ConfigLoadError::Malformed("no such bot".into()))
            } else {
                Ok(WidgetTheme::default())
            }
        }
    }

    struct SilentTransport;

    #[async_trait]
    impl ChatTransport for SilentTransport {
        async fn send_message(
            &self,
            _bot_id: &str,
            _session_id: Option<&str>,
            _message: &str
        ) -> Result<String, SendFailedError> {
            Ok(String::new())
        }
    }

    fn chatbot(
        host: &Arc<Mutex<HeadlessHost>>,
        fetcher: &Arc<CountingFetcher>
    ) -> ChatBot {
        ChatBot::new(
            Arc::new(Mutex::new(InitRegistry::new())),
            host.clone(),
            fetcher.clone(),
            Arc::new(SilentTransport)
        )
    }

    fn page(scripts: Vec<ScriptTag>) -> HostPage {
        HostPage {
            url: "https://shop.example.com/products/1".into(),
            scripts,
            global_config: None,
        }
    }

    #[test]
    fn discovers_bot_id_from_relative_script_url() {
        let page = page(vec![ScriptTag::new("/static/widget.js?v=2&botId=abc")]);
        assert_eq!(discover_config(&page), Some(WidgetConfig::new("abc")));
    }

    #[test]
    fn falls_back_to_data_attribute_then_global() {
        let with_attr = page(
            vec![
                ScriptTag::new("https://cdn.example.com/app.js").with_data_bot_id("ignored"),
                ScriptTag::new("https://cdn.example.com/widget.js").with_data_bot_id("attr-id")
            ]
        );
        assert_eq!(discover_config(&with_attr), Some(WidgetConfig::new("attr-id")));

        let mut with_global = page(vec![ScriptTag::new("https://cdn.example.com/widget.js")]);
        with_global.global_config = Some(
            WidgetConfig::new("global-id").with_position(Position::BottomLeft)
        );
        let found = discover_config(&with_global).unwrap();
        assert_eq!(found.bot_id, "global-id");
        assert_eq!(found.position, Position::BottomLeft);
    }

    #[test]
    fn first_widget_script_with_an_id_wins() {
        let page = page(
            vec![
                ScriptTag::new("https://cdn.example.com/widget.js"),
                ScriptTag::new("https://cdn.example.com/widget.js?botId=second"),
                ScriptTag::new("https://cdn.example.com/widget.js?botId=third")
            ]
        );
        assert_eq!(discover_config(&page).map(|c| c.bot_id), Some("second".into()));
    }

    #[test]
    fn nothing_found_yields_none() {
        let mut page = page(vec![ScriptTag::new("https://cdn.example.com/widget.js?botId=")]);
        page.global_config = Some(WidgetConfig::new(""));
        assert_eq!(discover_config(&page), None);
    }

    #[tokio::test]
    async fn init_mounts_a_styled_root() {
        let host = Arc::new(Mutex::new(HeadlessHost::new()));
        let fetcher = CountingFetcher::new(false);
        let bot = chatbot(&host, &fetcher);

        let controller = bot.init(WidgetConfig::new("b1")).await.unwrap();
        assert!(!controller.is_open());

        let host = host.lock().unwrap();
        let root = host.root_by_element_id("chatbot-widget-b1").unwrap();
        assert_eq!(root.host_style, HOST_STYLE);
        assert_eq!(root.styles, vec![widget_css().to_string()]);
        assert!(root.view.as_ref().and_then(|v| v.find_by_class("cb-toggle")).is_some());
    }

    #[tokio::test]
    async fn reinit_does_not_fetch_or_mount_again() {
        let host = Arc::new(Mutex::new(HeadlessHost::new()));
        let fetcher = CountingFetcher::new(false);
        let bot = chatbot(&host, &fetcher);

        assert!(bot.init(WidgetConfig::new("b1")).await.is_some());
        assert!(bot.init(WidgetConfig::new("b1")).await.is_none());
        assert_eq!(fetcher.calls(), 1);
        assert_eq!(host.lock().unwrap().mounted_roots(), 1);
    }

    #[tokio::test]
    async fn existing_page_element_blocks_init() {
        let host = Arc::new(
            Mutex::new(HeadlessHost::new().with_existing_element("chatbot-widget-b1"))
        );
        let fetcher = CountingFetcher::new(false);
        let bot = chatbot(&host, &fetcher);

        assert!(bot.init(WidgetConfig::new("b1")).await.is_none());
        assert_eq!(fetcher.calls(), 0);
        assert_eq!(host.lock().unwrap().mounted_roots(), 0);
    }

    #[tokio::test]
    async fn empty_bot_id_is_rejected() {
        let host = Arc::new(Mutex::new(HeadlessHost::new()));
        let fetcher = CountingFetcher::new(false);
        let bot = chatbot(&host, &fetcher);

        assert!(bot.init(WidgetConfig::new("")).await.is_none());
        assert_eq!(fetcher.calls(), 0);
        assert!(lock_registry(bot.registry()).is_empty());
    }

    #[tokio::test]
    async fn failed_fetch_removes_root_but_keeps_registration() {
        let host = Arc::new(Mutex::new(HeadlessHost::new()));
        let fetcher = CountingFetcher::new(true);
        let bot = chatbot(&host, &fetcher);

        assert!(bot.init(WidgetConfig::new("b1")).await.is_none());
        assert_eq!(host.lock().unwrap().mounted_roots(), 0);
        assert!(lock_registry(bot.registry()).contains("b1"));

        assert!(bot.init(WidgetConfig::new("b1")).await.is_none());
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn shared_registry_spans_instances() {
        let registry = Arc::new(Mutex::new(InitRegistry::new()));
        let host = Arc::new(Mutex::new(HeadlessHost::new()));
        let fetcher = CountingFetcher::new(false);
        let first = ChatBot::new(registry.clone(), host.clone(), fetcher.clone(), Arc::new(SilentTransport));
        let second = ChatBot::new(registry.clone(), host.clone(), fetcher.clone(), Arc::new(SilentTransport));

        assert!(first.init(WidgetConfig::new("b1")).await.is_some());
        assert!(second.init(WidgetConfig::new("b1")).await.is_none());
        assert!(second.init(WidgetConfig::new("b2")).await.is_some());
        assert_eq!(lock_registry(&registry).len(), 2);
        assert_eq!(host.lock().unwrap().mounted_roots(), 2);
    }

    #[tokio::test]
    async fn auto_init_uses_discovered_position() {
        let host = Arc::new(Mutex::new(HeadlessHost::new()));
        let fetcher = CountingFetcher::new(false);
        let bot = chatbot(&host, &fetcher);
        let mut page = page(Vec::new());
        page.global_config = Some(WidgetConfig::new("b9").with_position(Position::BottomLeft));

        let controller = bot.auto_init(&page).await.unwrap();
        let view = controller.view();
        assert!(view.find_by_class("cb-toggle").unwrap().has_class("bottom-left"));
    }

    #[test]
    fn page_registry_is_a_single_instance() {
        assert!(Arc::ptr_eq(&page_registry(), &page_registry()));
    }
}
