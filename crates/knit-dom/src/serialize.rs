#![forbid(unsafe_code)]

//! HTML serialization.
//!
//! Output is deterministic: children in tree order, attributes in document
//! order. The live `value` property of form controls is not reflected, the
//! same way `outerHTML` ignores it.

use std::fmt::Write as _;

use v_htmlescape::escape;

use crate::markup::{is_raw_text_element, is_void_element};
use crate::node::{Attribute, Document, NodeData, NodeId};

impl Document {
    /// Serialize the children of `node`.
    #[must_use]
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        for child in self.child_nodes(node) {
            self.write_node(child, &mut out);
        }
        out
    }

    /// Serialize `node` and its subtree.
    #[must_use]
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_node(node, &mut out);
        out
    }

    fn write_node(&self, node: NodeId, out: &mut String) {
        // Snapshot the node so no borrow is held while recursing.
        let shape = {
            let arena = self.inner.borrow();
            let slot = arena.slot(node);
            match &slot.data {
                NodeData::Text(text) => {
                    let verbatim = slot
                        .parent
                        .and_then(|p| match &arena.slot(p).data {
                            NodeData::Element { tag, .. } => Some(tag.as_str()),
                            _ => None,
                        })
                        .is_some_and(|tag| tag != "textarea" && is_raw_text_element(tag));
                    Shape::Text(text.clone(), verbatim)
                }
                NodeData::Comment(text) => Shape::Comment(text.clone()),
                NodeData::Element {
                    tag, attributes, ..
                } => Shape::Element(tag.clone(), attributes.clone(), slot.children.clone()),
                NodeData::Document | NodeData::Fragment => Shape::Container(slot.children.clone()),
            }
        };

        match shape {
            Shape::Text(text, true) => out.push_str(&text),
            Shape::Text(text, false) => {
                let _ = write!(out, "{}", escape(&text));
            }
            Shape::Comment(text) => {
                let _ = write!(out, "<!--{text}-->");
            }
            Shape::Element(tag, attributes, children) => {
                out.push('<');
                out.push_str(&tag);
                for attr in &attributes {
                    if attr.value.is_empty() {
                        let _ = write!(out, " {}", attr.name);
                    } else {
                        let _ = write!(out, " {}=\"{}\"", attr.name, escape(&attr.value));
                    }
                }
                out.push('>');
                if is_void_element(&tag) {
                    return;
                }
                for child in children {
                    self.write_node(child, out);
                }
                let _ = write!(out, "</{tag}>");
            }
            Shape::Container(children) => {
                for child in children {
                    self.write_node(child, out);
                }
            }
        }
    }
}

enum Shape {
    /// Text and whether it is emitted without escaping.
    Text(String, bool),
    Comment(String),
    Element(String, Vec<Attribute>, Vec<NodeId>),
    Container(Vec<NodeId>),
}
