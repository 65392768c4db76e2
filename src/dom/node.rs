//! AST node representation
//!
//! Nodes own their strings so a finished tree outlives the input it was
//! parsed from. Spans are byte offsets into that input.

use crate::core::Span;

/// Top of the tree; its span always covers the whole input
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Root {
    pub children: Vec<Node>,
    pub loc: Span,
}

/// An element with its attributes and children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag_name: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
    /// `loc.end == loc.start` until the element is closed
    pub loc: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Child of the root or of an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Content(String),
}

impl Element {
    /// Element with no attributes or children, opened at `start`
    pub fn new(tag_name: impl Into<String>, start: usize) -> Self {
        Element {
            tag_name: tag_name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            loc: Span::new(start, start),
        }
    }

    /// Value of the first attribute called `name`
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    /// Child elements, skipping content
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Whether the element was closed explicitly or by `/>`
    pub fn is_closed(&self) -> bool {
        self.loc.end != self.loc.start
    }
}

/// Children are released from a heap work list so dropping a deep tree
/// does not recurse once per level.
impl Drop for Element {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(node) = pending.pop() {
            if let Node::Element(mut element) = node {
                pending.append(&mut element.children);
            }
        }
    }
}

impl Root {
    /// First element child, i.e. the document element
    pub fn document_element(&self) -> Option<&Element> {
        self.children.iter().find_map(Node::as_element)
    }
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Content(_) => None,
        }
    }

    pub fn as_content(&self) -> Option<&str> {
        match self {
            Node::Content(text) => Some(text),
            Node::Element(_) => None,
        }
    }
}

/// Append `node` to `children`, merging text into a trailing content node
pub(crate) fn append_child(children: &mut Vec<Node>, node: Node) {
    if let Node::Content(text) = &node {
        if let Some(Node::Content(last)) = children.last_mut() {
            last.push_str(text);
            return;
        }
    }
    children.push(node);
}
