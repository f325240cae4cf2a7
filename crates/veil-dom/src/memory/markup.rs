//! Markup parsing and escaping for [`MemoryDom`](super::MemoryDom).
//!
//! This is a forgiving parser for the fragments a modal deals with (close
//! links, wrapped text, small content blocks), not a conforming HTML5
//! tokenizer. Supported: elements with quoted, unquoted, and bare
//! attributes; void and self-closing elements; text with the common named
//! entities; comments (dropped). Stray closing tags are ignored and
//! unclosed elements are closed at end of input.

/// Elements that never have children or a closing tag.
pub(crate) const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ParsedNode {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        children: Vec<ParsedNode>,
    },
    Text(String),
}

struct OpenElement {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<ParsedNode>,
}

impl OpenElement {
    fn finish(self) -> ParsedNode {
        ParsedNode::Element {
            tag: self.tag,
            attributes: self.attributes,
            children: self.children,
        }
    }
}

struct OpenTag {
    name: String,
    attributes: Vec<(String, String)>,
    self_closing: bool,
}

pub(crate) fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Parse `source` into top-level nodes.
pub(crate) fn parse(source: &str) -> Vec<ParsedNode> {
    let mut stack: Vec<OpenElement> = Vec::new();
    let mut roots: Vec<ParsedNode> = Vec::new();
    let mut rest = source;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("<!--") {
            rest = after.find("-->").map_or("", |end| &after[end + 3..]);
            continue;
        }

        if let Some(after) = rest.strip_prefix("</") {
            let end = after.find('>').unwrap_or(after.len());
            let name = after[..end].trim().to_ascii_lowercase();
            rest = after.get(end + 1..).unwrap_or("");
            close_element(&mut stack, &mut roots, &name);
            continue;
        }

        if let Some(after) = rest.strip_prefix('<')
            && after.starts_with(|c: char| c.is_ascii_alphabetic())
            && let Some((tag, consumed)) = parse_open_tag(after)
        {
            rest = &after[consumed..];
            if tag.self_closing || is_void(&tag.name) {
                push_node(
                    &mut stack,
                    &mut roots,
                    ParsedNode::Element {
                        tag: tag.name,
                        attributes: tag.attributes,
                        children: Vec::new(),
                    },
                );
            } else {
                stack.push(OpenElement {
                    tag: tag.name,
                    attributes: tag.attributes,
                    children: Vec::new(),
                });
            }
            continue;
        }

        // Text runs to the next '<'; a '<' that did not open a tag is text.
        let skip = rest.chars().next().map_or(0, char::len_utf8);
        let end = rest[skip..].find('<').map_or(rest.len(), |i| i + skip);
        push_node(
            &mut stack,
            &mut roots,
            ParsedNode::Text(decode_entities(&rest[..end])),
        );
        rest = &rest[end..];
    }

    while let Some(open) = stack.pop() {
        let node = open.finish();
        push_node(&mut stack, &mut roots, node);
    }
    roots
}

fn push_node(stack: &mut [OpenElement], roots: &mut Vec<ParsedNode>, node: ParsedNode) {
    let siblings = match stack.last_mut() {
        Some(parent) => &mut parent.children,
        None => roots,
    };
    if let ParsedNode::Text(text) = &node
        && let Some(ParsedNode::Text(previous)) = siblings.last_mut()
    {
        previous.push_str(text);
        return;
    }
    siblings.push(node);
}

fn close_element(stack: &mut Vec<OpenElement>, roots: &mut Vec<ParsedNode>, name: &str) {
    let Some(depth) = stack.iter().rposition(|open| open.tag == name) else {
        return;
    };
    while stack.len() > depth {
        let Some(open) = stack.pop() else { break };
        let node = open.finish();
        push_node(stack, roots, node);
    }
}

/// Parse an opening tag; `s` starts right after `<`. Returns the tag and
/// the number of bytes consumed through the closing `>`.
fn parse_open_tag(s: &str) -> Option<(OpenTag, usize)> {
    let name_end = s
        .find(|c: char| c.is_ascii_whitespace() || c == '>' || c == '/')
        .unwrap_or(s.len());
    let name = s[..name_end].to_ascii_lowercase();
    let mut attributes = Vec::new();
    let mut pos = name_end;

    loop {
        let tail = &s[pos..];
        let trimmed = tail.trim_start();
        pos += tail.len() - trimmed.len();

        if trimmed.starts_with("/>") {
            let tag = OpenTag {
                name,
                attributes,
                self_closing: true,
            };
            return Some((tag, pos + 2));
        }
        if trimmed.starts_with('>') {
            let tag = OpenTag {
                name,
                attributes,
                self_closing: false,
            };
            return Some((tag, pos + 1));
        }
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.starts_with('/') {
            pos += 1;
            continue;
        }

        let attr_end = trimmed
            .find(|c: char| c.is_ascii_whitespace() || c == '=' || c == '>' || c == '/')
            .unwrap_or(trimmed.len());
        let attr_name = trimmed[..attr_end].to_ascii_lowercase();
        pos += attr_end;

        let after_name = &s[pos..];
        let after_ws = after_name.trim_start();
        let value = if let Some(value_part) = after_ws.strip_prefix('=') {
            let value_start = value_part.trim_start();
            pos += after_name.len() - value_start.len();
            let (value, consumed) = parse_attr_value(value_start)?;
            pos += consumed;
            decode_entities(value)
        } else {
            String::new()
        };

        if !attr_name.is_empty() {
            attributes.push((attr_name, value));
        }
    }
}

fn parse_attr_value(s: &str) -> Option<(&str, usize)> {
    if let Some(quote) = s.chars().next().filter(|c| *c == '"' || *c == '\'') {
        let body = &s[1..];
        let close = body.find(quote)?;
        return Some((&body[..close], close + 2));
    }
    let end = s
        .find(|c: char| c.is_ascii_whitespace() || c == '>')
        .unwrap_or(s.len());
    Some((&s[..end], end))
}

pub(crate) fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_owned();
    }
    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}

pub(crate) fn escape_text(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub(crate) fn escape_attr(raw: &str) -> String {
    raw.replace('&', "&amp;").replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(tag: &str, attributes: &[(&str, &str)], children: Vec<ParsedNode>) -> ParsedNode {
        ParsedNode::Element {
            tag: tag.to_owned(),
            attributes: attributes
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
            children,
        }
    }

    fn text(value: &str) -> ParsedNode {
        ParsedNode::Text(value.to_owned())
    }

    #[test]
    fn parses_close_link() {
        let nodes = parse(r#"<a class="veil-close-img" title="Close"></a>"#);
        assert_eq!(
            nodes,
            vec![element(
                "a",
                &[("class", "veil-close-img"), ("title", "Close")],
                vec![]
            )]
        );
    }

    #[test]
    fn plain_text_is_a_single_node() {
        assert_eq!(parse("my data"), vec![text("my data")]);
        assert_eq!(parse("42"), vec![text("42")]);
    }

    #[test]
    fn nested_elements_and_entities() {
        let nodes = parse("<div id=box><p>a &amp; b</p><br/>tail &lt;3</div>");
        assert_eq!(
            nodes,
            vec![element(
                "div",
                &[("id", "box")],
                vec![
                    element("p", &[], vec![text("a & b")]),
                    element("br", &[], vec![]),
                    text("tail <3"),
                ]
            )]
        );
    }

    #[test]
    fn void_elements_take_no_children() {
        let nodes = parse("<input type='text' disabled><span>x</span>");
        assert_eq!(
            nodes,
            vec![
                element("input", &[("type", "text"), ("disabled", "")], vec![]),
                element("span", &[], vec![text("x")]),
            ]
        );
    }

    #[test]
    fn stray_lt_is_text_and_merges() {
        assert_eq!(parse("a < b"), vec![text("a < b")]);
    }

    #[test]
    fn unclosed_elements_close_at_end() {
        let nodes = parse("<div><span>open");
        assert_eq!(
            nodes,
            vec![element(
                "div",
                &[],
                vec![element("span", &[], vec![text("open")])]
            )]
        );
    }

    #[test]
    fn comments_and_stray_close_tags_are_dropped() {
        let nodes = parse("<!-- note --></p><b>x</b>");
        assert_eq!(nodes, vec![element("b", &[], vec![text("x")])]);
    }

    #[test]
    fn multibyte_text_is_preserved() {
        assert_eq!(parse("×"), vec![text("×")]);
        assert_eq!(parse("<i>é</i>ü"), vec![element("i", &[], vec![text("é")]), text("ü")]);
    }
}
