#![forbid(unsafe_code)]

//! Source nodes to [`NodeRecord`]s.

use std::cell::Cell;

use knit_dom::{Attribute, Document, NodeId, NodeType};
use knit_text::interpolation_keys;

use super::record::{CommentRecord, ElementRecord, NodeRecord, TextRecord};

/// How an element attribute is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttrClass<'a> {
    /// `v-<name>`; carries the full attribute name.
    Directive(&'a str),
    /// `@<type>`; carries the event type.
    Event(&'a str),
    /// Anything else.
    Prop(&'a str),
}

/// Classify an attribute name.
#[must_use]
pub fn classify(name: &str) -> AttrClass<'_> {
    if name.starts_with("v-") {
        AttrClass::Directive(name)
    } else if let Some(event) = name.strip_prefix('@') {
        AttrClass::Event(event)
    } else {
        AttrClass::Prop(name)
    }
}

/// Compile `nodes`, in order, into records.
///
/// Whitespace-only text and nodes other than elements, text and comments are
/// dropped. The document is only read.
#[must_use]
pub fn compile(doc: &Document, nodes: &[NodeId]) -> Vec<NodeRecord> {
    nodes
        .iter()
        .filter_map(|&node| compile_node(doc, node))
        .collect()
}

/// Compile the children of `parent`.
#[must_use]
pub fn compile_children(doc: &Document, parent: NodeId) -> Vec<NodeRecord> {
    compile(doc, &doc.child_nodes(parent))
}

fn compile_node(doc: &Document, node: NodeId) -> Option<NodeRecord> {
    match doc.node_type(node) {
        NodeType::Element => Some(NodeRecord::Element(compile_element(doc, node))),
        NodeType::Text => {
            let raw = doc.node_value(node).unwrap_or_default();
            if raw.trim().is_empty() {
                return None;
            }
            Some(NodeRecord::Text(TextRecord {
                keys: interpolation_keys(&raw),
                raw,
                rendered: Cell::new(None),
            }))
        }
        NodeType::Comment => Some(NodeRecord::Comment(CommentRecord {
            raw: doc.node_value(node).unwrap_or_default(),
        })),
        NodeType::Document | NodeType::Fragment => None,
    }
}

fn compile_element(doc: &Document, node: NodeId) -> ElementRecord {
    let attributes = doc.attributes(node);
    let mut record = ElementRecord {
        tag_name: doc.tag_name(node).unwrap_or_default(),
        ..ElementRecord::default()
    };
    for Attribute { name, value } in &attributes {
        let entry = match classify(name) {
            AttrClass::Directive(full) => (&mut record.directives, full),
            AttrClass::Event(event) => (&mut record.events, event),
            AttrClass::Prop(prop) => (&mut record.props, prop),
        };
        entry.0.push((entry.1.to_owned(), value.clone()));
    }
    record.attributes = attributes;
    record.children = compile_children(doc, node);
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile_markup(markup: &str) -> (Document, Vec<NodeRecord>) {
        let doc = Document::parse(markup).unwrap();
        let records = compile_children(&doc, doc.root());
        (doc, records)
    }

    fn element(record: &NodeRecord) -> &ElementRecord {
        match record {
            NodeRecord::Element(el) => el,
            other => panic!("expected element, got {other:?}"),
        }
    }

    #[test]
    fn classifies_attributes() {
        assert_eq!(classify("v-model"), AttrClass::Directive("v-model"));
        assert_eq!(classify("@click"), AttrClass::Event("click"));
        assert_eq!(classify("class"), AttrClass::Prop("class"));
        assert_eq!(classify("v"), AttrClass::Prop("v"));
    }

    #[test]
    fn splits_attributes_by_class() {
        let (_, records) =
            compile_markup(r#"<input class="field" v-model="name" @input="touch" type="text">"#);
        let input = element(&records[0]);
        assert_eq!(input.tag_name, "input");
        assert_eq!(
            input.props,
            [
                ("class".to_string(), "field".to_string()),
                ("type".to_string(), "text".to_string())
            ]
        );
        assert_eq!(input.directive("v-model"), Some("name"));
        assert_eq!(input.events, [("input".to_string(), "touch".to_string())]);
        assert_eq!(input.attributes.len(), 4);
        assert_eq!(input.attributes[1], Attribute::new("v-model", "name"));
    }

    #[test]
    fn drops_whitespace_text() {
        let (_, records) = compile_markup("<div>\n  <p>hi</p>\n  </div>");
        let div = element(&records[0]);
        assert_eq!(div.children.len(), 1);
        assert_eq!(div.children[0].tag_name(), Some("p"));
    }

    #[test]
    fn keeps_comments() {
        let (_, records) = compile_markup("<!-- note --><p>x</p>");
        assert_eq!(records[0].kind(), NodeType::Comment);
        assert_eq!(records[0].raw_value(), Some(" note "));
        assert!(records[0].interpolation_keys().is_empty());
    }

    #[test]
    fn extracts_text_keys() {
        let (_, records) = compile_markup("<p>Hello {{name}}, you are {{ age }}</p>");
        let text = &records[0].children()[0];
        assert_eq!(text.interpolation_keys(), ["name", "age"]);
        assert_eq!(text.raw_value(), Some("Hello {{name}}, you are {{ age }}"));
    }

    #[test]
    fn leaves_source_untouched() {
        let markup = r#"<div id="app"><button @click="go">{{label}}</button></div>"#;
        let (doc, _) = compile_markup(markup);
        assert_eq!(doc.inner_html(doc.root()), markup);
    }

    #[test]
    fn records_start_unrendered() {
        let (_, records) = compile_markup("<p>a</p>");
        assert_eq!(records[0].rendered(), None);
        assert_eq!(records[0].children()[0].rendered(), None);
    }
}
