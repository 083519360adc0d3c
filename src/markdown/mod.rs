pub mod escape;
pub mod html;
pub mod parser;

pub use escape::{ escape_attr, escape_html, Escaped };
pub use html::is_safe_url;
pub use parser::{ parse_document, Block, Document, Inline };

/// Escapes first, so only the renderer's own tags can reach the output.
pub fn render_markdown(text: &str) -> String {
    let escaped = Escaped::from_raw(text);
    parse_document(&escaped).to_html()
}
