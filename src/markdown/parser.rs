use super::escape::Escaped;

const FENCE: &str = "```";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// One entry per source line; lines are joined with hard breaks.
    Paragraph(Vec<Vec<Inline>>),
    UnorderedList(Vec<Vec<Inline>>),
    OrderedList(Vec<Vec<Inline>>),
    CodeBlock(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text(String),
    Code(String),
    Strong(Vec<Inline>),
    Emphasis(Vec<Inline>),
    Image {
        alt: String,
        src: String,
    },
    Link {
        label: Vec<Inline>,
        href: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Unordered,
    Ordered,
}

#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Prose(&'a str),
    Code(&'a str),
}

pub fn parse_document(text: &Escaped) -> Document {
    let mut blocks = Vec::new();
    for segment in split_fences(text.as_str()) {
        match segment {
            Segment::Code(code) => blocks.push(Block::CodeBlock(code.trim().to_string())),
            Segment::Prose(prose) => blocks.extend(parse_blocks(prose)),
        }
    }
    Document { blocks }
}

/// Splits out fenced code. A fence without a closing partner is left as text.
fn split_fences(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find(FENCE) {
        let after_open = &rest[open + FENCE.len()..];
        let Some(close) = after_open.find(FENCE) else {
            break;
        };
        if open > 0 {
            segments.push(Segment::Prose(&rest[..open]));
        }
        segments.push(Segment::Code(&after_open[..close]));
        rest = &after_open[close + FENCE.len()..];
    }

    if !rest.is_empty() {
        segments.push(Segment::Prose(rest));
    }
    segments
}

fn parse_blocks(prose: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();
    let mut list: Option<(ListKind, Vec<&str>)> = None;

    for line in prose.split('\n') {
        let line = line.trim_end_matches('\r');

        if line.trim().is_empty() {
            flush_paragraph(&mut blocks, &mut paragraph);
            flush_list(&mut blocks, &mut list);
            continue;
        }

        if let Some((kind, item)) = list_item(line) {
            flush_paragraph(&mut blocks, &mut paragraph);
            match &mut list {
                Some((current, items)) if *current == kind => items.push(item),
                _ => {
                    flush_list(&mut blocks, &mut list);
                    list = Some((kind, vec![item]));
                }
            }
            continue;
        }

        flush_list(&mut blocks, &mut list);
        paragraph.push(line);
    }

    flush_paragraph(&mut blocks, &mut paragraph);
    flush_list(&mut blocks, &mut list);
    blocks
}

/// `- item`, `* item` or `12. item`, with at least one character of content.
fn list_item(line: &str) -> Option<(ListKind, &str)> {
    if let Some(item) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return (!item.is_empty()).then_some((ListKind::Unordered, item));
    }

    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let item = line[digits..].strip_prefix(". ")?;
    (!item.is_empty()).then_some((ListKind::Ordered, item))
}

fn flush_paragraph(blocks: &mut Vec<Block>, lines: &mut Vec<&str>) {
    if lines.is_empty() {
        return;
    }
    let joined = lines.join("\n");
    lines.clear();

    let trimmed = joined.trim();
    if trimmed.is_empty() {
        return;
    }
    blocks.push(Block::Paragraph(trimmed.split('\n').map(parse_inline).collect()));
}

fn flush_list(blocks: &mut Vec<Block>, list: &mut Option<(ListKind, Vec<&str>)>) {
    if let Some((kind, items)) = list.take() {
        let items = items.into_iter().map(parse_inline).collect();
        blocks.push(match kind {
            ListKind::Unordered => Block::UnorderedList(items),
            ListKind::Ordered => Block::OrderedList(items),
        });
    }
}

/// Parses inline markup on a single line of escaped text.
pub fn parse_inline(text: &str) -> Vec<Inline> {
    let mut nodes = Vec::new();
    let mut plain = String::new();
    let mut i = 0;

    while i < text.len() {
        let rest = &text[i..];
        if let Some((node, used)) = match_inline(rest) {
            if !plain.is_empty() {
                nodes.push(Inline::Text(std::mem::take(&mut plain)));
            }
            nodes.push(node);
            i += used;
            continue;
        }

        let Some(ch) = rest.chars().next() else {
            break;
        };
        plain.push(ch);
        i += ch.len_utf8();
    }

    if !plain.is_empty() {
        nodes.push(Inline::Text(plain));
    }
    nodes
}

/// Tries every inline rule at the start of `rest`, returning the node and
/// the number of bytes it consumed.
fn match_inline(rest: &str) -> Option<(Inline, usize)> {
    match rest.as_bytes().first()? {
        b'`' => code_span(rest),
        b'*' => delimited(rest, "**").or_else(|| delimited(rest, "*")),
        b'!' => image(rest),
        b'[' => link(rest),
        _ => None,
    }
}

fn code_span(rest: &str) -> Option<(Inline, usize)> {
    let body = &rest[1..];
    let close = body.find('`')?;
    if close == 0 {
        return None;
    }
    Some((Inline::Code(body[..close].to_string()), close + 2))
}

/// `**strong**` or `*emphasis*`: shortest non-empty run up to the closing
/// marker.
fn delimited(rest: &str, marker: &str) -> Option<(Inline, usize)> {
    let body = rest.strip_prefix(marker)?;
    let first = body.chars().next()?.len_utf8();
    let close = if marker.len() == 2 {
        body[first..].find(marker)? + first
    } else {
        emphasis_close(body, first)?
    };
    let inner = parse_inline(&body[..close]);
    let node = if marker.len() == 2 { Inline::Strong(inner) } else { Inline::Emphasis(inner) };
    Some((node, marker.len() * 2 + close))
}

/// Offset of the lone `*` that closes an emphasis, stepping over complete
/// `**strong**` runs so their markers are never taken as the closer.
fn emphasis_close(body: &str, from: usize) -> Option<usize> {
    let mut i = from;
    while i < body.len() {
        let rest = &body[i..];
        if rest.starts_with("**") {
            if let Some((_, used)) = delimited(rest, "**") {
                i += used;
                continue;
            }
        }
        if rest.starts_with('*') {
            return Some(i);
        }
        i += rest.chars().next()?.len_utf8();
    }
    None
}

/// `[label](target)` where the label may be empty only if `allow_empty`.
fn bracketed<'a>(rest: &'a str, allow_empty: bool) -> Option<(&'a str, &'a str, usize)> {
    let body = rest.strip_prefix('[')?;
    let label_end = body.find(']')?;
    if label_end == 0 && !allow_empty {
        return None;
    }
    let after = body[label_end + 1..].strip_prefix('(')?;
    let target_end = after.find(')')?;
    if target_end == 0 {
        return None;
    }
    let used = 1 + label_end + 2 + target_end + 1;
    Some((&body[..label_end], &after[..target_end], used))
}

fn image(rest: &str) -> Option<(Inline, usize)> {
    let (alt, src, used) = bracketed(rest.strip_prefix('!')?, true)?;
    Some((
        Inline::Image {
            alt: alt.to_string(),
            src: src.to_string(),
        },
        used + 1,
    ))
}

fn link(rest: &str) -> Option<(Inline, usize)> {
    let (label, href, used) = bracketed(rest, false)?;
    Some((
        Inline::Link {
            label: parse_inline(label),
            href: href.to_string(),
        },
        used,
    ))
}
