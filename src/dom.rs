//! A small in-memory document tree.
//!
//! Handles are reference counted and mutated through shared references, the same way a host
//! DOM behaves: cloning a [`Node`] or [`Element`] clones the handle, not the node, and equality
//! is handle identity. Parents are held weakly, so dropping the [`Document`] frees the tree.
//!
//! The tree is single-threaded (`!Send`), matching the single UI event loop it models.

use alloc::rc::{Rc, Weak};
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;
use core::ops::Deref;

use crate::RevealError;
use crate::selector::Selector;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element,
    Text,
}

struct NodeInner {
    kind: NodeKind,
    tag: String,
    text: RefCell<String>,
    attributes: RefCell<Vec<(String, String)>>,
    classes: RefCell<Vec<String>>,
    parent: RefCell<Weak<NodeInner>>,
    children: RefCell<Vec<Node>>,
}

/// A handle to a node in a document tree.
#[derive(Clone)]
pub struct Node(Rc<NodeInner>);

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Node {}

impl Node {
    fn with_kind(kind: NodeKind, tag: String, text: String) -> Self {
        Self(Rc::new(NodeInner {
            kind,
            tag,
            text: RefCell::new(text),
            attributes: RefCell::new(Vec::new()),
            classes: RefCell::new(Vec::new()),
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
        }))
    }

    /// Creates a detached text node.
    pub fn text(content: &str) -> Self {
        Self::with_kind(NodeKind::Text, String::new(), content.to_string())
    }

    pub fn kind(&self) -> NodeKind {
        self.0.kind
    }

    pub fn is_element(&self) -> bool {
        self.0.kind == NodeKind::Element
    }

    /// Returns a typed element handle when this node is an element.
    pub fn as_element(&self) -> Option<Element> {
        self.is_element().then(|| Element(self.clone()))
    }

    pub fn parent(&self) -> Option<Node> {
        self.0.parent.borrow().upgrade().map(Node)
    }

    pub fn children(&self) -> Vec<Node> {
        self.0.children.borrow().clone()
    }

    /// Returns `true` when `other` is this node or one of its descendants.
    pub fn contains(&self, other: &Node) -> bool {
        let mut cur = Some(other.clone());
        while let Some(node) = cur {
            if node == *self {
                return true;
            }
            cur = node.parent();
        }
        false
    }

    /// Appends `child` as the last child of this node.
    ///
    /// A child that already has a parent is moved.
    pub fn append_child(&self, child: &Node) -> Result<(), RevealError> {
        if self.0.kind == NodeKind::Text {
            return Err(RevealError::HierarchyRequest(
                "text nodes cannot have children",
            ));
        }
        if child.0.kind == NodeKind::Document {
            return Err(RevealError::HierarchyRequest(
                "a document cannot be inserted as a child",
            ));
        }
        if child.contains(self) {
            return Err(RevealError::HierarchyRequest(
                "a node cannot be inserted into itself or its descendants",
            ));
        }

        child.detach();
        self.attach(child);
        Ok(())
    }

    fn attach(&self, child: &Node) {
        *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
        self.0.children.borrow_mut().push(child.clone());
    }

    /// Removes `child` from this node. Returns `false` when it is not a child of this node.
    pub fn remove_child(&self, child: &Node) -> bool {
        if child.parent().as_ref() != Some(self) {
            return false;
        }
        child.detach();
        true
    }

    /// Removes this node from its parent, if any.
    pub fn detach(&self) {
        if let Some(parent) = self.parent() {
            parent.0.children.borrow_mut().retain(|c| c != self);
        }
        *self.0.parent.borrow_mut() = Weak::new();
    }

    /// Iterates the subtree in document order (pre-order), excluding this node.
    pub fn descendants(&self) -> Descendants {
        let mut stack = Vec::new();
        stack.extend(self.0.children.borrow().iter().rev().cloned());
        Descendants { stack }
    }

    /// Returns every element in the subtree matching `selector`, in document order.
    pub fn query_selector_all(&self, selector: &Selector) -> Vec<Element> {
        self.descendants()
            .filter_map(|node| node.as_element())
            .filter(|element| selector.matches(element))
            .collect()
    }

    pub fn query_selector(&self, selector: &Selector) -> Option<Element> {
        self.descendants()
            .filter_map(|node| node.as_element())
            .find(|element| selector.matches(element))
    }

    pub fn text_content(&self) -> String {
        if self.0.kind == NodeKind::Text {
            return self.0.text.borrow().clone();
        }
        let mut out = String::new();
        for node in self.descendants() {
            if node.0.kind == NodeKind::Text {
                out.push_str(&node.0.text.borrow());
            }
        }
        out
    }
}

impl AsRef<Node> for Node {
    fn as_ref(&self) -> &Node {
        self
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.kind {
            NodeKind::Document => f.write_str("#document"),
            NodeKind::Text => write!(f, "#text {:?}", self.0.text.borrow()),
            NodeKind::Element => {
                write!(f, "<{}", self.0.tag)?;
                for (name, value) in self.0.attributes.borrow().iter() {
                    if value.is_empty() {
                        write!(f, " {name}")?;
                    } else {
                        write!(f, " {name}={value:?}")?;
                    }
                }
                let classes = self.0.classes.borrow();
                if !classes.is_empty() {
                    write!(f, " class={:?}", classes.join(" "))?;
                }
                f.write_str(">")
            }
        }
    }
}

/// Document-order iterator returned by [`Node::descendants`].
pub struct Descendants {
    stack: Vec<Node>,
}

impl Iterator for Descendants {
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        let node = self.stack.pop()?;
        self.stack
            .extend(node.0.children.borrow().iter().rev().cloned());
        Some(node)
    }
}

/// A handle to an element node.
///
/// Dereferences to [`Node`] for tree operations.
#[derive(Clone, PartialEq, Eq)]
pub struct Element(Node);

impl Element {
    /// Creates a detached element. The tag name is lowercased.
    pub fn new(tag: &str) -> Self {
        Self(Node::with_kind(
            NodeKind::Element,
            tag.to_ascii_lowercase(),
            String::new(),
        ))
    }

    pub fn as_node(&self) -> &Node {
        &self.0
    }

    pub fn tag_name(&self) -> &str {
        &self.0.0.tag
    }

    pub fn id(&self) -> Option<String> {
        self.attribute("id")
    }

    /// Sets an attribute. Names are lowercased; `class` replaces the class list.
    pub fn set_attribute(&self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        if name == "class" {
            let mut classes = self.0.0.classes.borrow_mut();
            classes.clear();
            for class in value.split_whitespace() {
                if !classes.iter().any(|c| c == class) {
                    classes.push(class.to_string());
                }
            }
            return;
        }

        let mut attributes = self.0.0.attributes.borrow_mut();
        match attributes.iter().position(|(n, _)| *n == name) {
            Some(i) => attributes[i].1 = value.to_string(),
            None => attributes.push((name, value.to_string())),
        }
    }

    /// Returns an attribute value. `class` reflects the class list.
    pub fn attribute(&self, name: &str) -> Option<String> {
        let name = name.to_ascii_lowercase();
        if name == "class" {
            let classes = self.0.0.classes.borrow();
            return (!classes.is_empty()).then(|| classes.join(" "));
        }
        self.0
            .0
            .attributes
            .borrow()
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.clone())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Removes an attribute. Returns `true` when it was present.
    pub fn remove_attribute(&self, name: &str) -> bool {
        let name = name.to_ascii_lowercase();
        if name == "class" {
            let mut classes = self.0.0.classes.borrow_mut();
            let had = !classes.is_empty();
            classes.clear();
            return had;
        }
        let mut attributes = self.0.0.attributes.borrow_mut();
        let before = attributes.len();
        attributes.retain(|(n, _)| *n != name);
        attributes.len() != before
    }

    /// Adds a class. Returns `true` when the class list changed.
    ///
    /// Empty class names are ignored.
    pub fn add_class(&self, class: &str) -> bool {
        if class.is_empty() {
            return false;
        }
        let mut classes = self.0.0.classes.borrow_mut();
        if classes.iter().any(|c| c == class) {
            return false;
        }
        classes.push(class.to_string());
        true
    }

    /// Removes a class. Returns `true` when the class list changed.
    pub fn remove_class(&self, class: &str) -> bool {
        let mut classes = self.0.0.classes.borrow_mut();
        let before = classes.len();
        classes.retain(|c| c != class);
        classes.len() != before
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.0.0.classes.borrow().iter().any(|c| c == class)
    }

    pub fn classes(&self) -> Vec<String> {
        self.0.0.classes.borrow().clone()
    }

    pub fn matches(&self, selector: &Selector) -> bool {
        selector.matches(self)
    }

    pub fn with_attribute(self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_class(self, class: &str) -> Self {
        self.add_class(class);
        self
    }
}

impl Deref for Element {
    type Target = Node;

    fn deref(&self) -> &Node {
        &self.0
    }
}

impl AsRef<Node> for Element {
    fn as_ref(&self) -> &Node {
        &self.0
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        element.0
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

/// A document: the root node plus its `<html>`/`<body>` skeleton.
#[derive(Clone, Debug)]
pub struct Document {
    root: Node,
    body: Element,
}

impl Document {
    pub fn new() -> Self {
        let root = Node::with_kind(NodeKind::Document, String::new(), String::new());
        let html = Element::new("html");
        let body = Element::new("body");
        root.attach(&html);
        html.attach(&body);
        Self { root, body }
    }

    /// The document node. Queries from here cover the whole document.
    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn body(&self) -> &Element {
        &self.body
    }

    pub fn create_element(&self, tag: &str) -> Element {
        Element::new(tag)
    }

    pub fn create_text_node(&self, content: &str) -> Node {
        Node::text(content)
    }

    pub fn query_selector_all(&self, selector: &Selector) -> Vec<Element> {
        self.root.query_selector_all(selector)
    }

    /// Every reveal target in the document, in document order.
    pub fn reveal_targets(&self) -> Vec<Element> {
        crate::get_reveal_targets(&self.root)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
