use super::escape::escape_attr;
use super::parser::{ Block, Document, Inline };

const SAFE_SCHEMES: &[&str] = &["http", "https", "mailto", "tel"];

/// Relative URLs and allowlisted schemes only.
pub fn is_safe_url(url: &str) -> bool {
    let cleaned: String = url
        .trim_start()
        .chars()
        .filter(|c| !c.is_control())
        .collect();

    match cleaned.find(|c| matches!(c, ':' | '/' | '?' | '#')) {
        Some(i) if cleaned[i..].starts_with(':') => {
            let scheme = cleaned[..i].to_ascii_lowercase();
            SAFE_SCHEMES.contains(&scheme.as_str())
        }
        _ => true,
    }
}

impl Document {
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            write_block(&mut out, block);
        }
        out
    }
}

fn write_block(out: &mut String, block: &Block) {
    match block {
        Block::Paragraph(lines) => {
            let wrap = !starts_with_image(lines);
            if wrap {
                out.push_str("<p>");
            }
            for (i, line) in lines.iter().enumerate() {
                if i > 0 {
                    out.push_str("<br>");
                }
                write_inlines(out, line);
            }
            if wrap {
                out.push_str("</p>");
            }
        }
        Block::UnorderedList(items) => write_list(out, "ul", items),
        Block::OrderedList(items) => write_list(out, "ol", items),
        Block::CodeBlock(code) => {
            out.push_str("<pre><code>");
            out.push_str(code);
            out.push_str("</code></pre>");
        }
    }
}

/// A paragraph that opens with an image is emitted without a `<p>` wrapper.
fn starts_with_image(lines: &[Vec<Inline>]) -> bool {
    matches!(
        lines.first().and_then(|line| line.first()),
        Some(Inline::Image { src, .. }) if is_safe_url(src)
    )
}

fn write_list(out: &mut String, tag: &str, items: &[Vec<Inline>]) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    for item in items {
        out.push_str("<li>");
        write_inlines(out, item);
        out.push_str("</li>");
    }
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn write_inlines(out: &mut String, nodes: &[Inline]) {
    for node in nodes {
        match node {
            Inline::Text(text) => out.push_str(text),
            Inline::Code(code) => {
                out.push_str("<code>");
                out.push_str(code);
                out.push_str("</code>");
            }
            Inline::Strong(inner) => {
                out.push_str("<strong>");
                write_inlines(out, inner);
                out.push_str("</strong>");
            }
            Inline::Emphasis(inner) => {
                out.push_str("<em>");
                write_inlines(out, inner);
                out.push_str("</em>");
            }
            Inline::Image { alt, src } => {
                if is_safe_url(src) {
                    out.push_str(
                        &format!(r#"<img src="{}" alt="{}" />"#, escape_attr(src), escape_attr(alt))
                    );
                } else {
                    out.push_str(alt);
                }
            }
            Inline::Link { label, href } => {
                if is_safe_url(href) {
                    out.push_str(
                        &format!(
                            r#"<a href="{}" target="_blank" rel="noopener noreferrer">"#,
                            escape_attr(href)
                        )
                    );
                    write_inlines(out, label);
                    out.push_str("</a>");
                } else {
                    write_inlines(out, label);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_urls() {
        assert!(is_safe_url("https://example.com/a.png"));
        assert!(is_safe_url("HTTP://example.com"));
        assert!(is_safe_url("mailto:hi@example.com"));
        assert!(is_safe_url("/relative/path?x=1:2"));
        assert!(is_safe_url("page#frag:ment"));
        assert!(!is_safe_url("javascript:alert(1"));
        assert!(!is_safe_url("  JavaScript:alert(1"));
        assert!(!is_safe_url("java\tscript:alert(1"));
        assert!(!is_safe_url("data:text/html;base64,xyz"));
        assert!(!is_safe_url("vbscript:msgbox"));
    }

    #[test]
    fn list_serializes_each_item() {
        let doc = Document {
            blocks: vec![
                Block::OrderedList(vec![
                    vec![Inline::Text("a".into())],
                    vec![Inline::Code("b".into())]
                ])
            ],
        };
        assert_eq!(doc.to_html(), "<ol><li>a</li><li><code>b</code></li></ol>");
    }

    #[test]
    fn unsafe_image_falls_back_to_alt_and_is_wrapped() {
        let doc = Document {
            blocks: vec![
                Block::Paragraph(
                    vec![
                        vec![Inline::Image { alt: "pic".into(), src: "javascript:x".into() }]
                    ]
                )
            ],
        };
        assert_eq!(doc.to_html(), "<p>pic</p>");
    }
}
