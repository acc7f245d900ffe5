//! Loads pages into a [`Document`]
//!
//! The grammar covers the HTML people actually write: nested elements, void elements, quoted or
//! bare attributes, comments, and `script`/`style` blocks whose content is kept as raw text.
//! Comments and doctypes are dropped. Unclosed or mismatched tags are an error; there is no
//! error recovery.
use std::fs::read_to_string;
use std::path::Path;

use pest::iterators::Pair;

use super::utils::decode_entities;
use super::{parse_rule, Rule};
use crate::document::{Document, Element, NodeId};
use crate::error::{MissingFileError, ParserError};
use crate::Error;

pub fn parse_markup(content: &str) -> Result<Document, ParserError> {
    let mut document = Document::new();
    let root = document.root();
    let parsed = parse_rule(Rule::markup, content).map_err(ParserError::Markup)?;
    for markup in parsed {
        for node in markup.into_inner() {
            add_node(&mut document, root, node)?;
        }
    }
    Ok(document)
}

pub fn load_markup(path: &Path) -> Result<Document, Error> {
    if !path.exists() {
        return Err(MissingFileError::InputFileDoesNotExistError(path.to_path_buf()).into());
    }
    let content = read_to_string(path)?;
    Ok(parse_markup(&content)?)
}

fn add_node(document: &mut Document, parent: NodeId, node: Pair<Rule>) -> Result<(), ParserError> {
    match node.as_rule() {
        Rule::text => push_text(document, parent, &decode_entities(node.as_str())),
        Rule::lone_lt => push_text(document, parent, "<"),
        Rule::element | Rule::void_element | Rule::raw_element => {
            let mut element: Option<Element> = None;
            let mut children = vec![];
            let mut end_name: Option<&str> = None;
            for part in node.into_inner() {
                match part.as_rule() {
                    Rule::tag_name | Rule::void_name | Rule::raw_name => {
                        element = Some(Element::new(part.as_str()))
                    }
                    Rule::attribute => {
                        if let Some(x) = element.as_mut() {
                            let (name, value) = parse_attribute(part);
                            x.set_attr(&name, &value);
                        }
                    }
                    Rule::self_close => {}
                    Rule::end_tag => end_name = part.into_inner().next().map(|x| x.as_str()),
                    _ => children.push(part),
                }
            }
            let element = element.ok_or_else(|| ParserError::Markup("tag without a name".into()))?;
            if let Some(name) = end_name {
                if !name.eq_ignore_ascii_case(&element.tag_name) {
                    return Err(ParserError::Markup(format!(
                        "<{}> closed by </{}>",
                        element.tag_name, name
                    )));
                }
            }
            let id = document.create_element(element);
            append(document, parent, id)?;
            for child in children {
                match child.as_rule() {
                    Rule::script_text | Rule::style_text => {
                        if !child.as_str().is_empty() {
                            let text = document.create_text(child.as_str());
                            append(document, id, text)?;
                        }
                    }
                    _ => add_node(document, id, child)?,
                }
            }
            Ok(())
        }
        // comments, doctypes and the end of input
        _ => Ok(()),
    }
}

fn parse_attribute(attribute: Pair<Rule>) -> (String, String) {
    let mut parts = attribute.into_inner();
    let name = parts
        .next()
        .map(|x| x.as_str().to_lowercase())
        .unwrap_or_default();
    let value = parts
        .next()
        .map(|x| decode_entities(x.as_str()))
        .unwrap_or_default();
    (name, value)
}

/// Adds text to `parent`, merging it with a text node right before it
fn push_text(document: &mut Document, parent: NodeId, text: &str) -> Result<(), ParserError> {
    if let Some(last) = document.children(parent).last().cloned() {
        if let Some(previous) = document.text(last) {
            let merged = format!("{}{}", previous, text);
            return document
                .set_text(last, &merged)
                .map_err(|e| ParserError::Markup(e.to_string()));
        }
    }
    let id = document.create_text(text);
    append(document, parent, id)
}

fn append(document: &mut Document, parent: NodeId, child: NodeId) -> Result<(), ParserError> {
    document
        .append_child(parent, child)
        .map_err(|e| ParserError::Markup(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_elements() {
        let document =
            parse_markup("<!DOCTYPE html><div id=main><p class='a b'>Price: <b>€10</b></p><!-- note --></div>")
                .unwrap();
        let div = document.find_first("div").unwrap();
        assert_eq!(document.element(div).unwrap().attr("id"), Some("main"));
        let p = document.find_first("p").unwrap();
        assert!(document.element(p).unwrap().has_class("b"));
        assert_eq!(document.text_content(div), "Price: €10");
        assert_eq!(document.children(div).len(), 1);
    }

    #[test]
    fn void_and_self_closing() {
        let document = parse_markup("<p>a<br>b<img src=\"x.png\"/><span/>c</p>").unwrap();
        let p = document.find_first("p").unwrap();
        assert_eq!(document.children(p).len(), 6);
        assert_eq!(document.text_content(p), "abc");
    }

    #[test]
    fn raw_text_is_kept() {
        let source = "<script>if (a < b) { x = '<p>5 EUR</p>'; }</script><style>p{}</style>";
        let document = parse_markup(source).unwrap();
        let script = document.find_first("script").unwrap();
        assert_eq!(
            document.text_content(script),
            "if (a < b) { x = '<p>5 EUR</p>'; }"
        );
        assert_eq!(document.to_html(document.root()), source);
    }

    #[test]
    fn entities_and_lone_brackets() {
        let document = parse_markup("<p>1 &lt; 2 &amp;&amp; 3 < 4 &euro;5</p>").unwrap();
        let p = document.find_first("p").unwrap();
        assert_eq!(document.children(p).len(), 1);
        assert_eq!(document.text_content(p), "1 < 2 && 3 < 4 €5");
    }

    #[test]
    fn boolean_attributes() {
        let document = parse_markup("<input disabled><p data-x=\"a&amp;b\">x</p>").unwrap();
        let input = document.find_first("input").unwrap();
        assert_eq!(document.element(input).unwrap().attr("disabled"), Some(""));
        let p = document.find_first("p").unwrap();
        assert_eq!(document.element(p).unwrap().attr("data-x"), Some("a&b"));
    }

    #[test]
    fn tag_names_ignore_case() {
        let document = parse_markup("<P>GBP 3</p><DIV><b>x</B></Div><SCRIPT>a</script>").unwrap();
        let p = document.find_first("p").unwrap();
        assert_eq!(document.tag_name(p), Some("p"));
        assert_eq!(document.text_content(p), "GBP 3");
        let script = document.find_first("script").unwrap();
        assert_eq!(document.text_content(script), "a");
        assert!(parse_markup("<P>GBP 3</b>").is_err());
    }

    #[test]
    fn unbalanced_markup() {
        assert!(parse_markup("<div><p>text</div>").is_err());
        assert!(parse_markup("<div>").is_err());
        assert!(parse_markup("").is_ok());
    }
}
