#![forbid(unsafe_code)]

//! Arena-backed document tree.
//!
//! A [`Document`] owns every node it creates. Nodes are addressed by
//! [`NodeId`] handles that stay valid for the lifetime of the document;
//! detaching a node from its parent never frees it, so handles held by
//! compiled templates can not dangle.
//!
//! # Invariants
//!
//! 1. A node has at most one parent, and appears exactly once in that
//!    parent's child list.
//! 2. Only `Element`, `Document` and `Fragment` nodes have children.
//! 3. Appending a fragment moves its children (in order) and leaves the
//!    fragment empty, matching `DocumentFragment` semantics.
//! 4. No borrow of the arena is held while user callbacks run (see
//!    [`Document::dispatch_event`]).
//!
//! # Panics
//!
//! Passing a [`NodeId`] minted by a different document is a logic error and
//! panics with an out-of-bounds index, the same way slice indexing does.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::event::{Listener, ListenerId};

/// Handle to a node inside a [`Document`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Position of the node in the document arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Node categories, numbered like the DOM `nodeType` constants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeType {
    Element = 1,
    Text = 3,
    Comment = 8,
    Document = 9,
    Fragment = 11,
}

/// A single `name="value"` pair on an element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

pub(crate) enum NodeData {
    Element {
        tag: String,
        attributes: Vec<Attribute>,
        /// Live `value` property; `None` until assigned.
        value: Option<String>,
    },
    Text(String),
    Comment(String),
    Document,
    Fragment,
}

impl NodeData {
    fn node_type(&self) -> NodeType {
        match self {
            Self::Element { .. } => NodeType::Element,
            Self::Text(_) => NodeType::Text,
            Self::Comment(_) => NodeType::Comment,
            Self::Document => NodeType::Document,
            Self::Fragment => NodeType::Fragment,
        }
    }

    fn is_container(&self) -> bool {
        matches!(self, Self::Element { .. } | Self::Document | Self::Fragment)
    }
}

pub(crate) struct Slot {
    pub(crate) data: NodeData,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) listeners: Vec<RegisteredListener>,
}

pub(crate) struct RegisteredListener {
    pub(crate) id: ListenerId,
    pub(crate) event_type: String,
    pub(crate) callback: Listener,
}

pub(crate) struct Arena {
    pub(crate) nodes: Vec<Slot>,
    pub(crate) next_listener: u64,
}

impl Arena {
    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).expect("document node count fits in u32"));
        self.nodes.push(Slot {
            data,
            parent: None,
            children: Vec::new(),
            listeners: Vec::new(),
        });
        id
    }

    pub(crate) fn slot(&self, id: NodeId) -> &Slot {
        &self.nodes[id.index()]
    }

    pub(crate) fn slot_mut(&mut self, id: NodeId) -> &mut Slot {
        &mut self.nodes[id.index()]
    }

    fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.slot_mut(child).parent.take() {
            self.slot_mut(parent).children.retain(|&c| c != child);
        }
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.slot(node).parent {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.slot(id).data {
            NodeData::Text(text) => out.push_str(text),
            NodeData::Comment(_) => {}
            _ => {
                for &child in &self.slot(id).children {
                    self.collect_text(child, out);
                }
            }
        }
    }
}

/// Shared, single-threaded handle to an in-memory document.
///
/// Cloning a `Document` yields another handle to the **same** tree.
#[derive(Clone)]
pub struct Document {
    pub(crate) inner: Rc<RefCell<Arena>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.inner.borrow().nodes.len())
            .finish()
    }
}

impl Document {
    /// Create an empty document holding only its root node.
    #[must_use]
    pub fn new() -> Self {
        let mut arena = Arena {
            nodes: Vec::new(),
            next_listener: 0,
        };
        arena.push(NodeData::Document);
        Self {
            inner: Rc::new(RefCell::new(arena)),
        }
    }

    /// The document node itself.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Whether both handles point at the same document.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Total number of nodes ever created, attached or not.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.inner.borrow().nodes.len()
    }

    // -- creation ----------------------------------------------------------

    /// Create a detached element. Tag names are stored lowercase.
    pub fn create_element(&self, tag: &str) -> NodeId {
        self.inner.borrow_mut().push(NodeData::Element {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
            value: None,
        })
    }

    pub fn create_text_node(&self, text: impl Into<String>) -> NodeId {
        self.inner.borrow_mut().push(NodeData::Text(text.into()))
    }

    pub fn create_comment(&self, text: impl Into<String>) -> NodeId {
        self.inner.borrow_mut().push(NodeData::Comment(text.into()))
    }

    /// Create a detached container whose children move out when appended.
    pub fn create_document_fragment(&self) -> NodeId {
        self.inner.borrow_mut().push(NodeData::Fragment)
    }

    // -- inspection --------------------------------------------------------

    #[must_use]
    pub fn node_type(&self, id: NodeId) -> NodeType {
        self.inner.borrow().slot(id).data.node_type()
    }

    /// DOM-style node name: uppercase tag for elements, `#text`,
    /// `#comment`, `#document` or `#document-fragment` otherwise.
    #[must_use]
    pub fn node_name(&self, id: NodeId) -> String {
        match &self.inner.borrow().slot(id).data {
            NodeData::Element { tag, .. } => tag.to_ascii_uppercase(),
            NodeData::Text(_) => "#text".to_owned(),
            NodeData::Comment(_) => "#comment".to_owned(),
            NodeData::Document => "#document".to_owned(),
            NodeData::Fragment => "#document-fragment".to_owned(),
        }
    }

    /// Lowercase tag name, or `None` for non-elements.
    #[must_use]
    pub fn tag_name(&self, id: NodeId) -> Option<String> {
        match &self.inner.borrow().slot(id).data {
            NodeData::Element { tag, .. } => Some(tag.clone()),
            _ => None,
        }
    }

    /// Character data of text and comment nodes; `None` for the rest.
    #[must_use]
    pub fn node_value(&self, id: NodeId) -> Option<String> {
        match &self.inner.borrow().slot(id).data {
            NodeData::Text(text) | NodeData::Comment(text) => Some(text.clone()),
            _ => None,
        }
    }

    /// Replace the character data of a text or comment node in place.
    ///
    /// Returns `true` if the stored text changed. Writing identical text, or
    /// writing to a node without character data, is a no-op.
    pub fn set_node_value(&self, id: NodeId, value: &str) -> bool {
        let mut arena = self.inner.borrow_mut();
        match &mut arena.slot_mut(id).data {
            NodeData::Text(text) | NodeData::Comment(text) => {
                if text == value {
                    false
                } else {
                    value.clone_into(text);
                    true
                }
            }
            _ => false,
        }
    }

    /// Concatenated text of all descendant text nodes (comments excluded).
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.inner.borrow().collect_text(id, &mut out);
        out
    }

    // -- attributes --------------------------------------------------------

    /// Attributes in document order; empty for non-elements.
    #[must_use]
    pub fn attributes(&self, id: NodeId) -> Vec<Attribute> {
        match &self.inner.borrow().slot(id).data {
            NodeData::Element { attributes, .. } => attributes.clone(),
            _ => Vec::new(),
        }
    }

    #[must_use]
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<String> {
        match &self.inner.borrow().slot(id).data {
            NodeData::Element { attributes, .. } => attributes
                .iter()
                .find(|attr| attr.name == name)
                .map(|attr| attr.value.clone()),
            _ => None,
        }
    }

    #[must_use]
    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.get_attribute(id, name).is_some()
    }

    /// Set an attribute, keeping the position of an existing one.
    /// Ignored on non-elements.
    pub fn set_attribute(&self, id: NodeId, name: &str, value: &str) {
        let mut arena = self.inner.borrow_mut();
        if let NodeData::Element { attributes, .. } = &mut arena.slot_mut(id).data {
            match attributes.iter_mut().find(|attr| attr.name == name) {
                Some(attr) => value.clone_into(&mut attr.value),
                None => attributes.push(Attribute::new(name, value)),
            }
        }
    }

    /// Remove an attribute; returns whether it was present.
    pub fn remove_attribute(&self, id: NodeId, name: &str) -> bool {
        let mut arena = self.inner.borrow_mut();
        if let NodeData::Element { attributes, .. } = &mut arena.slot_mut(id).data {
            let before = attributes.len();
            attributes.retain(|attr| attr.name != name);
            return attributes.len() != before;
        }
        false
    }

    // -- form values -------------------------------------------------------

    /// Live `value` of an element.
    ///
    /// Falls back to the `value` attribute until the property is assigned,
    /// the way form controls report their default value.
    #[must_use]
    pub fn value(&self, id: NodeId) -> Option<String> {
        match &self.inner.borrow().slot(id).data {
            NodeData::Element {
                value, attributes, ..
            } => value.clone().or_else(|| {
                attributes
                    .iter()
                    .find(|attr| attr.name == "value")
                    .map(|attr| attr.value.clone())
            }),
            _ => None,
        }
    }

    /// Assign the live `value` property. Returns `true` if it changed.
    pub fn set_value(&self, id: NodeId, new_value: &str) -> bool {
        let mut arena = self.inner.borrow_mut();
        if let NodeData::Element { value, .. } = &mut arena.slot_mut(id).data {
            if value.as_deref() == Some(new_value) {
                return false;
            }
            *value = Some(new_value.to_owned());
            return true;
        }
        false
    }

    // -- structure ---------------------------------------------------------

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.inner.borrow().slot(id).parent
    }

    /// Snapshot of the child list.
    #[must_use]
    pub fn child_nodes(&self, id: NodeId) -> Vec<NodeId> {
        self.inner.borrow().slot(id).children.clone()
    }

    #[must_use]
    pub fn has_child_nodes(&self, id: NodeId) -> bool {
        !self.inner.borrow().slot(id).children.is_empty()
    }

    /// Whether `node` is `ancestor` or one of its descendants.
    #[must_use]
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.inner.borrow().is_inclusive_ancestor(ancestor, node)
    }

    /// All descendants of `id` in pre-order, excluding `id` itself.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let arena = self.inner.borrow();
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = arena.slot(id).children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(arena.slot(next).children.iter().rev().copied());
        }
        out
    }

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous parent first. Appending a fragment moves its children.
    ///
    /// # Panics
    ///
    /// Panics if `parent` can not hold children (text or comment), or if
    /// `child` is an inclusive ancestor of `parent`.
    pub fn append_child(&self, parent: NodeId, child: NodeId) {
        let mut arena = self.inner.borrow_mut();
        assert!(
            arena.slot(parent).data.is_container(),
            "append_child: node {parent} can not have children"
        );
        assert!(
            !arena.is_inclusive_ancestor(child, parent),
            "append_child: node {child} is an ancestor of {parent}"
        );

        if matches!(arena.slot(child).data, NodeData::Fragment) {
            let moved = std::mem::take(&mut arena.slot_mut(child).children);
            for &grandchild in &moved {
                arena.slot_mut(grandchild).parent = Some(parent);
            }
            arena.slot_mut(parent).children.extend(moved);
            return;
        }

        arena.detach(child);
        arena.slot_mut(child).parent = Some(parent);
        arena.slot_mut(parent).children.push(child);
    }

    /// Detach `child` from `parent`; returns `false` if it was not a child.
    pub fn remove_child(&self, parent: NodeId, child: NodeId) -> bool {
        let mut arena = self.inner.borrow_mut();
        if arena.slot(child).parent != Some(parent) {
            return false;
        }
        arena.detach(child);
        true
    }

    /// Detach every child of `id` (the `innerHTML = ""` operation).
    pub fn clear_children(&self, id: NodeId) {
        let mut arena = self.inner.borrow_mut();
        let children = std::mem::take(&mut arena.slot_mut(id).children);
        for child in children {
            arena.slot_mut(child).parent = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, NodeId, NodeId, NodeId) {
        let doc = Document::new();
        let div = doc.create_element("DIV");
        let text = doc.create_text_node("hello");
        let note = doc.create_comment(" note ");
        doc.append_child(doc.root(), div);
        doc.append_child(div, text);
        doc.append_child(div, note);
        (doc, div, text, note)
    }

    #[test]
    fn node_names_follow_dom_conventions() {
        let (doc, div, text, note) = sample();
        assert_eq!(doc.node_name(div), "DIV");
        assert_eq!(doc.tag_name(div).as_deref(), Some("div"));
        assert_eq!(doc.node_name(text), "#text");
        assert_eq!(doc.node_name(note), "#comment");
        assert_eq!(doc.node_name(doc.root()), "#document");
        assert_eq!(doc.node_type(text), NodeType::Text);
    }

    #[test]
    fn set_node_value_reports_change() {
        let (doc, _, text, _) = sample();
        assert!(doc.set_node_value(text, "bye"));
        assert!(!doc.set_node_value(text, "bye"));
        assert_eq!(doc.node_value(text).as_deref(), Some("bye"));
    }

    #[test]
    fn set_node_value_ignores_elements() {
        let (doc, div, _, _) = sample();
        assert!(!doc.set_node_value(div, "x"));
        assert_eq!(doc.node_value(div), None);
    }

    #[test]
    fn text_content_skips_comments() {
        let (doc, div, _, _) = sample();
        let span = doc.create_element("span");
        let inner = doc.create_text_node(" world");
        doc.append_child(div, span);
        doc.append_child(span, inner);
        assert_eq!(doc.text_content(div), "hello world");
    }

    #[test]
    fn attributes_keep_order_and_position() {
        let doc = Document::new();
        let el = doc.create_element("a");
        doc.set_attribute(el, "href", "/x");
        doc.set_attribute(el, "class", "link");
        doc.set_attribute(el, "href", "/y");
        let names: Vec<_> = doc.attributes(el).into_iter().map(|a| a.name).collect();
        assert_eq!(names, ["href", "class"]);
        assert_eq!(doc.get_attribute(el, "href").as_deref(), Some("/y"));
        assert!(doc.remove_attribute(el, "class"));
        assert!(!doc.has_attribute(el, "class"));
    }

    #[test]
    fn value_falls_back_to_attribute() {
        let doc = Document::new();
        let input = doc.create_element("input");
        assert_eq!(doc.value(input), None);
        doc.set_attribute(input, "value", "seed");
        assert_eq!(doc.value(input).as_deref(), Some("seed"));
        assert!(doc.set_value(input, "typed"));
        assert!(!doc.set_value(input, "typed"));
        assert_eq!(doc.value(input).as_deref(), Some("typed"));
        assert_eq!(doc.get_attribute(input, "value").as_deref(), Some("seed"));
    }

    #[test]
    fn append_moves_between_parents() {
        let (doc, div, text, _) = sample();
        let other = doc.create_element("p");
        doc.append_child(doc.root(), other);
        doc.append_child(other, text);
        assert_eq!(doc.parent(text), Some(other));
        assert_eq!(doc.child_nodes(div).len(), 1);
    }

    #[test]
    fn appending_fragment_moves_children() {
        let doc = Document::new();
        let host = doc.create_element("div");
        let frag = doc.create_document_fragment();
        let a = doc.create_text_node("a");
        let b = doc.create_text_node("b");
        doc.append_child(frag, a);
        doc.append_child(frag, b);

        doc.append_child(host, frag);
        assert_eq!(doc.child_nodes(host), vec![a, b]);
        assert!(!doc.has_child_nodes(frag));
        assert_eq!(doc.parent(a), Some(host));
    }

    #[test]
    fn clear_children_detaches() {
        let (doc, div, text, note) = sample();
        doc.clear_children(div);
        assert!(!doc.has_child_nodes(div));
        assert_eq!(doc.parent(text), None);
        assert_eq!(doc.parent(note), None);
    }

    #[test]
    fn descendants_are_preorder() {
        let (doc, div, text, note) = sample();
        assert_eq!(doc.descendants(doc.root()), vec![div, text, note]);
        assert!(doc.contains(doc.root(), note));
        assert!(!doc.contains(text, div));
    }

    #[test]
    #[should_panic(expected = "can not have children")]
    fn append_into_text_panics() {
        let (doc, _, text, note) = sample();
        doc.append_child(text, note);
    }

    #[test]
    #[should_panic(expected = "is an ancestor of")]
    fn append_ancestor_panics() {
        let (doc, div, _, _) = sample();
        let inner = doc.create_element("span");
        doc.append_child(div, inner);
        doc.append_child(inner, div);
    }
}
