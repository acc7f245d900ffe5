//! A small arena backed document tree
//!
//! Pages are loaded into a [`Document`] and the engine rewrites its text nodes. Nodes are never
//! freed: removing a node only detaches it, so a [`NodeId`] stays valid for the life of the
//! document.
//!
//! While a subtree is observed, every change below it is recorded as a [`MutationRecord`], the
//! same way a browser feeds a mutation observer.
use std::fmt;
use std::fmt::{Display, Formatter};

use crate::error::DocumentError;

pub use mutation::MutationRecord;
use mutation::Observer;
pub use serialize::is_void;

mod mutation;
mod serialize;

/// Elements whose content is raw text and never markup
pub const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag_name: String,
    pub attributes: Vec<(String, String)>,
}

impl Element {
    pub fn new(tag_name: &str) -> Self {
        Element {
            tag_name: tag_name.to_lowercase(),
            attributes: vec![],
        }
    }
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
    pub fn set_attr(&mut self, name: &str, value: &str) {
        match self
            .attributes
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            Some(attribute) => attribute.1 = value.to_string(),
            None => self
                .attributes
                .push((name.to_lowercase(), value.to_string())),
        }
    }
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map_or(false, |x| x.split_whitespace().any(|c| c == class))
    }
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    observer: Option<Observer>,
}

impl Document {
    pub fn new() -> Self {
        let root = Node {
            parent: None,
            children: vec![],
            kind: NodeKind::Document,
        };
        Document {
            nodes: vec![root],
            root: NodeId(0),
            observer: None,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn node(&self, id: NodeId) -> Result<&Node, DocumentError> {
        self.nodes.get(id.0).ok_or(DocumentError::NoSuchNode(id))
    }

    fn create_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: vec![],
            kind,
        });
        id
    }

    /// A new element, not yet attached anywhere
    pub fn create_element(&mut self, element: Element) -> NodeId {
        self.create_node(NodeKind::Element(element))
    }

    /// A new text node, not yet attached anywhere
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.create_node(NodeKind::Text(text.to_string()))
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id.0).map(|x| &x.kind)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.kind(id) {
            Some(NodeKind::Element(x)) => Some(x),
            _ => None,
        }
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|x| x.tag_name.as_str())
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            Some(NodeKind::Text(x)) => Some(x.as_str()),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|x| x.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.nodes.get(id.0) {
            Some(x) => &x.children,
            None => &[],
        }
    }

    pub fn is_descendant_of(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(node) = cursor {
            if node == ancestor {
                return true;
            }
            cursor = self.parent(node);
        }
        false
    }

    /// Whether the node can be reached from the document root
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.is_descendant_of(id, self.root)
    }

    /// The text of every text node below `id`, in document order
    pub fn text_content(&self, id: NodeId) -> String {
        self.text_nodes(id)
            .iter()
            .filter_map(|x| self.text(*x))
            .collect()
    }

    /// Every text node below `id` (itself included), in document order
    pub fn text_nodes(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|x| self.text(*x).is_some())
            .collect()
    }

    /// `id` and all the nodes below it, in document order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = vec![];
        if self.nodes.get(id.0).is_none() {
            return result;
        }
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            result.push(node);
            stack.extend(self.children(node).iter().rev());
        }
        result
    }

    /// The first element with that tag, in document order
    pub fn find_first(&self, tag_name: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|x| self.tag_name(*x).map_or(false, |t| t.eq_ignore_ascii_case(tag_name)))
    }

    fn can_have_children(&self, id: NodeId) -> bool {
        match self.kind(id) {
            Some(NodeKind::Document) => true,
            Some(NodeKind::Element(x)) => !is_void(&x.tag_name),
            _ => false,
        }
    }

    fn check_insertable(&self, parent: NodeId, child: NodeId) -> Result<(), DocumentError> {
        self.node(parent)?;
        self.node(child)?;
        if !self.can_have_children(parent) {
            return Err(DocumentError::NotAnElement(parent));
        }
        if child == self.root || self.is_descendant_of(parent, child) {
            return Err(DocumentError::WouldCreateCycle(child));
        }
        Ok(())
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(old_parent) = self.parent(id) {
            self.nodes[old_parent.0].children.retain(|x| *x != id);
            self.nodes[id.0].parent = None;
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DocumentError> {
        self.check_insertable(parent, child)?;
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        self.record(MutationRecord::ChildList {
            target: parent,
            added: vec![child],
            removed: vec![],
        });
        Ok(())
    }

    /// Puts `replacements` where `target` was, in a single operation
    pub fn replace_with_many(
        &mut self,
        target: NodeId,
        replacements: Vec<NodeId>,
    ) -> Result<(), DocumentError> {
        self.replace_siblings(&[target], replacements)
    }

    /// Replaces consecutive siblings by `replacements`, in a single operation
    pub fn replace_siblings(
        &mut self,
        targets: &[NodeId],
        replacements: Vec<NodeId>,
    ) -> Result<(), DocumentError> {
        let first = match targets.first() {
            Some(x) => *x,
            None => return Ok(()),
        };
        self.node(first)?;
        let parent = self.parent(first).ok_or(DocumentError::Detached(first))?;
        let index = self.nodes[parent.0]
            .children
            .iter()
            .position(|x| *x == first)
            .ok_or(DocumentError::NotAChild {
                parent,
                child: first,
            })?;
        for (offset, target) in targets.iter().enumerate() {
            if self.nodes[parent.0].children.get(index + offset) != Some(target) {
                return Err(DocumentError::NotAChild {
                    parent,
                    child: *target,
                });
            }
        }
        for child in replacements.iter() {
            if targets.contains(child) {
                return Err(DocumentError::WouldCreateCycle(*child));
            }
            self.check_insertable(parent, *child)?;
        }

        for child in replacements.iter() {
            self.detach(*child);
        }
        // detaching may have moved the targets
        let index = self.nodes[parent.0]
            .children
            .iter()
            .position(|x| *x == first)
            .ok_or(DocumentError::NotAChild {
                parent,
                child: first,
            })?;
        for child in replacements.iter() {
            self.nodes[child.0].parent = Some(parent);
        }
        self.nodes[parent.0]
            .children
            .splice(index..index + targets.len(), replacements.iter().cloned());
        for target in targets.iter() {
            self.nodes[target.0].parent = None;
        }
        self.record(MutationRecord::ChildList {
            target: parent,
            added: replacements,
            removed: targets.to_vec(),
        });
        Ok(())
    }

    pub fn remove(&mut self, id: NodeId) -> Result<(), DocumentError> {
        self.node(id)?;
        let parent = self.parent(id).ok_or(DocumentError::Detached(id))?;
        self.detach(id);
        self.record(MutationRecord::ChildList {
            target: parent,
            added: vec![],
            removed: vec![id],
        });
        Ok(())
    }

    pub fn set_text(&mut self, id: NodeId, text: &str) -> Result<(), DocumentError> {
        match self.nodes.get_mut(id.0) {
            Some(Node {
                kind: NodeKind::Text(x),
                ..
            }) => *x = text.to_string(),
            Some(_) => return Err(DocumentError::NotAnElement(id)),
            None => return Err(DocumentError::NoSuchNode(id)),
        }
        self.record(MutationRecord::CharacterData { target: id });
        Ok(())
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DocumentError> {
        match self.nodes.get_mut(id.0) {
            Some(Node {
                kind: NodeKind::Element(x),
                ..
            }) => {
                x.set_attr(name, value);
                Ok(())
            }
            Some(_) => Err(DocumentError::NotAnElement(id)),
            None => Err(DocumentError::NoSuchNode(id)),
        }
    }

    /// Starts recording the changes made below `root`, dropping any previous observation
    pub fn observe(&mut self, root: NodeId) {
        self.observer = Some(Observer::new(root));
    }

    /// Stops recording; records not taken yet are lost
    pub fn disconnect(&mut self) {
        self.observer = None;
    }

    pub fn is_observing(&self) -> bool {
        self.observer.is_some()
    }

    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        match self.observer.as_mut() {
            Some(x) => std::mem::replace(&mut x.records, vec![]),
            None => vec![],
        }
    }

    fn record(&mut self, record: MutationRecord) {
        let root = match self.observer.as_ref() {
            Some(x) => x.root,
            None => return,
        };
        if self.is_descendant_of(record.target(), root) {
            if let Some(observer) = self.observer.as_mut() {
                observer.records.push(record);
            }
        }
    }

    pub fn to_html(&self, id: NodeId) -> String {
        serialize::to_html(self, id)
    }

    pub fn inner_html(&self, id: NodeId) -> String {
        serialize::inner_html(self, id)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(document: &mut Document, text: &str) -> (NodeId, NodeId) {
        let p = document.create_element(Element::new("p"));
        let t = document.create_text(text);
        document.append_child(document.root(), p).unwrap();
        document.append_child(p, t).unwrap();
        (p, t)
    }

    #[test]
    fn build_and_read() {
        let mut document = Document::new();
        let (p, t) = paragraph(&mut document, "hello");
        assert_eq!(document.parent(t), Some(p));
        assert_eq!(document.text_content(document.root()), "hello");
        assert_eq!(document.find_first("P"), Some(p));
        assert!(document.is_attached(t));
        assert_eq!(document.to_html(document.root()), "<p>hello</p>");
    }

    #[test]
    fn replace_keeps_order() {
        let mut document = Document::new();
        let (p, t) = paragraph(&mut document, "b");
        let a = document.create_text("a");
        document.append_child(p, a).unwrap();
        // p: [b, a] -> [x, y, a]
        let x = document.create_text("x");
        let y = document.create_text("y");
        document.replace_with_many(t, vec![x, y]).unwrap();
        assert_eq!(document.children(p), &[x, y, a]);
        assert_eq!(document.parent(t), None);
        assert!(!document.is_attached(t));
        assert_eq!(document.text_content(p), "xya");
    }

    #[test]
    fn replace_a_run_of_siblings() {
        let mut document = Document::new();
        let root = document.root();
        let nodes: Vec<NodeId> = ["a", "b", "c", "d"]
            .iter()
            .map(|x| document.create_text(x))
            .collect();
        for node in nodes.iter() {
            document.append_child(root, *node).unwrap();
        }
        let x = document.create_text("x");
        document.observe(root);
        document.replace_siblings(&nodes[1..3], vec![x]).unwrap();
        assert_eq!(document.children(root), &[nodes[0], x, nodes[3]]);
        assert_eq!(
            document.take_records(),
            vec![MutationRecord::ChildList {
                target: root,
                added: vec![x],
                removed: vec![nodes[1], nodes[2]],
            }]
        );
        // not consecutive any more
        let y = document.create_text("y");
        assert!(document.replace_siblings(&[nodes[0], nodes[3]], vec![y]).is_err());
        assert_eq!(document.text_content(root), "axd");
    }

    #[test]
    fn replace_detached_node() {
        let mut document = Document::new();
        let t = document.create_text("loose");
        let x = document.create_text("x");
        assert_eq!(
            document.replace_with_many(t, vec![x]),
            Err(DocumentError::Detached(t))
        );
    }

    #[test]
    fn no_cycles() {
        let mut document = Document::new();
        let (p, _) = paragraph(&mut document, "a");
        let span = document.create_element(Element::new("span"));
        document.append_child(p, span).unwrap();
        assert_eq!(
            document.append_child(span, p),
            Err(DocumentError::WouldCreateCycle(p))
        );
        let br = document.create_element(Element::new("br"));
        assert_eq!(
            document.append_child(br, span),
            Err(DocumentError::NotAnElement(br))
        );
    }

    #[test]
    fn observation() {
        let mut document = Document::new();
        let (p, t) = paragraph(&mut document, "a");
        let (other, _) = paragraph(&mut document, "b");

        document.observe(p);
        document.set_text(t, "changed").unwrap();
        let outside = document.create_text("outside");
        document.append_child(other, outside).unwrap();
        assert_eq!(
            document.take_records(),
            vec![MutationRecord::CharacterData { target: t }]
        );
        assert!(document.take_records().is_empty());

        document.set_text(t, "again").unwrap();
        document.disconnect();
        assert!(document.take_records().is_empty());
        document.set_text(t, "unobserved").unwrap();
        document.observe(p);
        assert!(document.take_records().is_empty());
    }

    #[test]
    fn classes() {
        let mut element = Element::new("SPAN");
        element.set_attr("Class", "a fx-price b");
        assert_eq!(element.tag_name, "span");
        assert!(element.has_class("fx-price"));
        assert!(!element.has_class("fx"));
        element.set_attr("class", "other");
        assert_eq!(element.attributes.len(), 1);
    }
}
