/// Text whose HTML metacharacters (`&`, `<`, `>`, `"`) have been escaped.
///
/// The only constructor is [`Escaped::from_raw`], so anything typed as
/// `Escaped` can be written into markup without further escaping.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Escaped(String);

impl Escaped {
    pub fn from_raw(raw: &str) -> Self {
        Escaped(escape_html(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Escapes quote characters for use inside a double-quoted attribute value.
/// Leaves `&` alone, so it is safe to apply to already escaped text.
pub fn escape_attr(s: &str) -> String {
    s.replace('"', "&quot;").replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_metacharacters() {
        assert_eq!(escape_html(r#"<a href="x">&</a>"#), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
    }

    #[test]
    fn escape_attr_does_not_double_escape() {
        let escaped = Escaped::from_raw("it's \"a\" & b");
        assert_eq!(escape_attr(escaped.as_str()), "it&#39;s &quot;a&quot; &amp; b");
    }
}
