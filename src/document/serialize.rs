use super::{Document, NodeId, NodeKind, RAW_TEXT_ELEMENTS};

const VOID_ELEMENTS: [&str; 13] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements that never have children nor a closing tag
pub fn is_void(tag_name: &str) -> bool {
    VOID_ELEMENTS.iter().any(|x| x.eq_ignore_ascii_case(tag_name))
}

pub(super) fn to_html(document: &Document, id: NodeId) -> String {
    let mut out = String::new();
    write_node(document, id, false, &mut out);
    out
}

pub(super) fn inner_html(document: &Document, id: NodeId) -> String {
    let raw = document
        .tag_name(id)
        .map_or(false, |t| RAW_TEXT_ELEMENTS.contains(&t));
    let mut out = String::new();
    for child in document.children(id) {
        write_node(document, *child, raw, &mut out);
    }
    out
}

fn write_node(document: &Document, id: NodeId, raw: bool, out: &mut String) {
    match document.kind(id) {
        Some(NodeKind::Text(text)) => match raw {
            true => out.push_str(text),
            false => escape(text, false, out),
        },
        Some(NodeKind::Element(element)) => {
            out.push('<');
            out.push_str(&element.tag_name);
            for (name, value) in element.attributes.iter() {
                out.push(' ');
                out.push_str(name);
                if !value.is_empty() {
                    out.push_str("=\"");
                    escape(value, true, out);
                    out.push('"');
                }
            }
            out.push('>');
            if is_void(&element.tag_name) {
                return;
            }
            out.push_str(&inner_html(document, id));
            out.push_str("</");
            out.push_str(&element.tag_name);
            out.push('>');
        }
        Some(NodeKind::Document) => out.push_str(&inner_html(document, id)),
        None => {}
    }
}

fn escape(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}
