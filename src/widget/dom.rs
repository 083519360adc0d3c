use crate::markdown::{ escape_attr, escape_html };

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    /// Plain text, escaped on output.
    Text(String),
    /// Trusted markup produced inside the crate (icons, rendered replies).
    Markup(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

const VOID_TAGS: &[&str] = &["img", "input", "br"];

impl Element {
    pub fn new(tag: &str) -> Self {
        Element {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attrs.push((name.to_string(), value.into()));
        self
    }

    pub fn class(self, class: &str) -> Self {
        self.attr("class", class)
    }

    /// Adds a boolean attribute such as `disabled` when `on` is set.
    pub fn flag(self, name: &str, on: bool) -> Self {
        if on { self.attr(name, "") } else { self }
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn markup(mut self, markup: impl Into<String>) -> Self {
        self.children.push(Node::Markup(markup.into()));
        self
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.get_attr(name).is_some()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.get_attr("class").is_some_and(|c| c.split_whitespace().any(|c| c == class))
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|c| match c {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// First element with `class` in document order, including `self`.
    pub fn find_by_class(&self, class: &str) -> Option<&Element> {
        if self.has_class(class) {
            return Some(self);
        }
        self.elements().find_map(|e| e.find_by_class(class))
    }

    pub fn find_all_by_class<'a>(&'a self, class: &str, found: &mut Vec<&'a Element>) {
        if self.has_class(class) {
            found.push(self);
        }
        for e in self.elements() {
            e.find_all_by_class(class, found);
        }
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                Node::Element(e) => out.push_str(&e.text_content()),
                Node::Text(t) | Node::Markup(t) => out.push_str(t),
            }
        }
        out
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            if !value.is_empty() {
                out.push_str("=\"");
                out.push_str(&escape_attr(&escape_html(value)));
                out.push('"');
            }
        }
        if VOID_TAGS.contains(&self.tag.as_str()) {
            out.push_str(" />");
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                Node::Element(e) => e.write_html(out),
                Node::Text(t) => out.push_str(&escape_html(t)),
                Node::Markup(m) => out.push_str(m),
            }
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}
