use super::dom::Element;
use crate::markdown::{ escape_attr, escape_html };
use std::sync::{ Arc, Mutex, MutexGuard };
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("Element '{0}' already exists on the page")]
    DuplicateRoot(String),
    #[error("Unknown widget root {0:?}")]
    UnknownRoot(RootId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RootId(pub usize);

pub trait WidgetHost: Send {
    /// Whether an element with this id is already in the page.
    fn element_exists(&self, id: &str) -> bool;

    /// Appends a host element with `id` and inline `host_style` to the page
    /// and attaches a style-isolated root to it.
    fn create_isolated_root(&mut self, id: &str, host_style: &str) -> Result<RootId, HostError>;

    fn inject_styles(&mut self, root: RootId, css: &str) -> Result<(), HostError>;

    /// Sets a CSS custom property on the host element.
    fn set_style_property(&mut self, root: RootId, name: &str, value: &str) -> Result<(), HostError>;

    /// Replaces the widget content inside the root.
    fn mount(&mut self, root: RootId, view: Element) -> Result<(), HostError>;

    /// Removes the host element and everything under it.
    fn unmount(&mut self, root: RootId) -> Result<(), HostError>;

    fn scroll_to_bottom(&mut self, root: RootId);

    fn focus_input(&mut self, root: RootId);
}

pub type SharedHost = Arc<Mutex<dyn WidgetHost>>;

/// Locks the host, recovering from a poisoned lock.
pub fn lock_host(host: &SharedHost) -> MutexGuard<'_, dyn WidgetHost + 'static> {
    host.lock().unwrap_or_else(|e| e.into_inner())
}

#[derive(Debug, Clone, Default)]
pub struct HeadlessRoot {
    pub id: String,
    pub host_style: String,
    pub properties: Vec<(String, String)>,
    pub styles: Vec<String>,
    pub view: Option<Element>,
    pub scroll_count: usize,
    pub focus_count: usize,
}

impl HeadlessRoot {
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// The root as page markup, using a declarative shadow root.
    pub fn to_html(&self) -> String {
        let mut style = self.host_style.clone();
        for (name, value) in &self.properties {
            style.push_str(&format!("{}:{};", name, value));
        }

        let mut out = format!(
            r#"<div id="{}" style="{}"><template shadowrootmode="open">"#,
            escape_attr(&escape_html(&self.id)),
            escape_attr(&escape_html(&style))
        );
        for css in &self.styles {
            out.push_str("<style>");
            out.push_str(css);
            out.push_str("</style>");
        }
        if let Some(view) = &self.view {
            out.push_str(&view.to_html());
        }
        out.push_str("</template></div>");
        out
    }
}

/// In-memory page. Roots are never reused; an unmounted root's slot
/// becomes `None`.
#[derive(Debug, Default)]
pub struct HeadlessHost {
    page_ids: Vec<String>,
    roots: Vec<Option<HeadlessRoot>>,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates markup the host page already contains.
    pub fn with_existing_element(mut self, id: &str) -> Self {
        self.page_ids.push(id.to_string());
        self
    }

    pub fn root(&self, id: RootId) -> Option<&HeadlessRoot> {
        self.roots.get(id.0).and_then(|r| r.as_ref())
    }

    pub fn root_by_element_id(&self, element_id: &str) -> Option<&HeadlessRoot> {
        self.roots.iter().flatten().find(|r| r.id == element_id)
    }

    pub fn mounted_roots(&self) -> usize {
        self.roots.iter().flatten().count()
    }

    fn root_mut(&mut self, id: RootId) -> Result<&mut HeadlessRoot, HostError> {
        self.roots
            .get_mut(id.0)
            .and_then(|r| r.as_mut())
            .ok_or(HostError::UnknownRoot(id))
    }

    /// A standalone page containing every mounted root.
    pub fn to_document_html(&self, title: &str) -> String {
        let mut body = String::new();
        for root in self.roots.iter().flatten() {
            body.push_str(&root.to_html());
            body.push('\n');
        }
        format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
            escape_html(title),
            body
        )
    }
}

impl WidgetHost for HeadlessHost {
    fn element_exists(&self, id: &str) -> bool {
        self.page_ids.iter().any(|p| p == id) || self.root_by_element_id(id).is_some()
    }

    fn create_isolated_root(&mut self, id: &str, host_style: &str) -> Result<RootId, HostError> {
        if self.element_exists(id) {
            return Err(HostError::DuplicateRoot(id.to_string()));
        }
        self.roots.push(
            Some(HeadlessRoot {
                id: id.to_string(),
                host_style: host_style.to_string(),
                ..Default::default()
            })
        );
        Ok(RootId(self.roots.len() - 1))
    }

    fn inject_styles(&mut self, root: RootId, css: &str) -> Result<(), HostError> {
        self.root_mut(root)?.styles.push(css.to_string());
        Ok(())
    }

    fn set_style_property(&mut self, root: RootId, name: &str, value: &str) -> Result<(), HostError> {
        self.root_mut(root)?.properties.push((name.to_string(), value.to_string()));
        Ok(())
    }

    fn mount(&mut self, root: RootId, view: Element) -> Result<(), HostError> {
        self.root_mut(root)?.view = Some(view);
        Ok(())
    }

    fn unmount(&mut self, root: RootId) -> Result<(), HostError> {
        match self.roots.get_mut(root.0) {
            Some(slot) if slot.is_some() => {
                *slot = None;
                Ok(())
            }
            _ => Err(HostError::UnknownRoot(root)),
        }
    }

    fn scroll_to_bottom(&mut self, root: RootId) {
        if let Ok(root) = self.root_mut(root) {
            root.scroll_count += 1;
        }
    }

    fn focus_input(&mut self, root: RootId) {
        if let Ok(root) = self.root_mut(root) {
            root.focus_count += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refuses_duplicate_roots() {
        let mut host = HeadlessHost::new().with_existing_element("taken");
        assert_eq!(
            host.create_isolated_root("taken", ""),
            Err(HostError::DuplicateRoot("taken".into()))
        );
        let root = host.create_isolated_root("w", "").unwrap();
        assert!(host.element_exists("w"));
        assert!(host.create_isolated_root("w", "").is_err());

        host.unmount(root).unwrap();
        assert!(!host.element_exists("w"));
        assert_eq!(host.unmount(root), Err(HostError::UnknownRoot(root)));
    }

    #[test]
    fn serializes_with_declarative_shadow_root() {
        let mut host = HeadlessHost::new();
        let root = host.create_isolated_root("chatbot-widget-x", "width:0;").unwrap();
        host.inject_styles(root, ".a{}").unwrap();
        host.set_style_property(root, "--cb-header-color", "#112233").unwrap();
        host.mount(root, Element::new("button").class("cb-toggle")).unwrap();

        let html = host.root(root).unwrap().to_html();
        assert_eq!(
            html,
            r#"<div id="chatbot-widget-x" style="width:0;--cb-header-color:#112233;"><template shadowrootmode="open"><style>.a{}</style><button class="cb-toggle"></button></template></div>"#
        );
        assert!(host.to_document_html("Preview").contains(&html));
    }

    #[test]
    fn later_property_values_win() {
        let mut host = HeadlessHost::new();
        let root = host.create_isolated_root("r", "").unwrap();
        host.set_style_property(root, "--x", "1").unwrap();
        host.set_style_property(root, "--x", "2").unwrap();
        assert_eq!(host.root(root).unwrap().property("--x"), Some("2"));
    }
}
