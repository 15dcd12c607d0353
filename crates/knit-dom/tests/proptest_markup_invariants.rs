//! Property-based invariant tests for the markup parser and serializer.
//!
//! 1. Parsing never panics, whatever the input.
//! 2. Serializing a tree, parsing the output and serializing again yields
//!    the same markup.
//! 3. Parsed text content equals the concatenated generated text.

use knit_dom::{Document, NodeId};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
enum Gen {
    Text(String),
    Comment(String),
    Element {
        tag: &'static str,
        attrs: Vec<(String, String)>,
        children: Vec<Gen>,
    },
}

fn text() -> impl Strategy<Value = String> {
    "[a-z {}<>&]{1,12}"
}

fn tree() -> impl Strategy<Value = Gen> {
    let leaf = prop_oneof![
        text().prop_map(Gen::Text),
        "[a-z ]{0,8}".prop_map(Gen::Comment),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        (
            prop_oneof![Just("div"), Just("p"), Just("span"), Just("b")],
            proptest::collection::btree_map("[a-z]{1,5}", "[a-z0-9 ]{0,6}", 0..3),
            proptest::collection::vec(inner, 0..4),
        )
            .prop_map(|(tag, attrs, children)| Gen::Element {
                tag,
                attrs: attrs.into_iter().collect(),
                children,
            })
    })
}

fn build(doc: &Document, parent: NodeId, node: &Gen) {
    let id = match node {
        Gen::Text(text) => doc.create_text_node(text.clone()),
        Gen::Comment(text) => doc.create_comment(text.clone()),
        Gen::Element {
            tag,
            attrs,
            children,
        } => {
            let el = doc.create_element(tag);
            for (name, value) in attrs {
                doc.set_attribute(el, name, value);
            }
            for child in children {
                build(doc, el, child);
            }
            el
        }
    };
    doc.append_child(parent, id);
}

fn expected_text(node: &Gen, out: &mut String) {
    match node {
        Gen::Text(text) => out.push_str(text),
        Gen::Comment(_) => {}
        Gen::Element { children, .. } => children.iter().for_each(|c| expected_text(c, out)),
    }
}

// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn parse_never_panics(src in "\\PC{0,64}") {
        let _ = Document::parse(&src);
    }

    #[test]
    fn parse_never_panics_on_tag_soup(src in "[<>/!=\"'a-c \\-]{0,48}") {
        let _ = Document::parse(&src);
    }

    #[test]
    fn serialize_parse_serialize_is_stable(nodes in proptest::collection::vec(tree(), 1..4)) {
        let doc = Document::new();
        for node in &nodes {
            build(&doc, doc.root(), node);
        }
        let first = doc.inner_html(doc.root());
        let reparsed = Document::parse(&first).expect("serializer output parses");
        prop_assert_eq!(reparsed.inner_html(reparsed.root()), first);
    }

    #[test]
    fn text_content_survives_round_trip(nodes in proptest::collection::vec(tree(), 1..4)) {
        let doc = Document::new();
        let mut expected = String::new();
        for node in &nodes {
            build(&doc, doc.root(), node);
            expected_text(node, &mut expected);
        }
        let reparsed = Document::parse(&doc.inner_html(doc.root())).expect("parses");
        prop_assert_eq!(reparsed.text_content(reparsed.root()), expected);
    }
}
