#![forbid(unsafe_code)]

//! The compiled tree.

use std::cell::Cell;

use knit_dom::{Attribute, NodeId, NodeType};
use knit_text::Keys;

/// One node of a compiled template.
///
/// Records are built once and never mutated afterwards, except for the
/// `rendered` handle, which always points at the most recently materialized
/// counterpart.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeRecord {
    Element(ElementRecord),
    Text(TextRecord),
    Comment(CommentRecord),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ElementRecord {
    /// Lowercase tag name.
    pub tag_name: String,
    /// Every source attribute, verbatim, in document order.
    pub attributes: Vec<Attribute>,
    /// Plain attributes, copied onto the rendered element.
    pub props: Vec<(String, String)>,
    /// `v-` attributes, keyed by full name.
    pub directives: Vec<(String, String)>,
    /// `@` attributes, keyed by event type, valued by method name.
    pub events: Vec<(String, String)>,
    pub children: Vec<NodeRecord>,
    pub rendered: Cell<Option<NodeId>>,
}

impl ElementRecord {
    /// Value of the source attribute `name`.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    #[must_use]
    pub fn directive(&self, name: &str) -> Option<&str> {
        lookup(&self.directives, name)
    }

    #[must_use]
    pub fn prop(&self, name: &str) -> Option<&str> {
        lookup(&self.props, name)
    }

    /// Key named by `v-model`, if this element accepts input.
    #[must_use]
    pub fn model_key(&self) -> Option<&str> {
        if !is_input_capable(&self.tag_name) {
            return None;
        }
        self.attribute("v-model").map(str::trim)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextRecord {
    /// Source text, markers intact.
    pub raw: String,
    /// Keys of every marker in `raw`, in order.
    pub keys: Keys,
    pub rendered: Cell<Option<NodeId>>,
}

impl TextRecord {
    #[must_use]
    pub fn references(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommentRecord {
    pub raw: String,
}

impl NodeRecord {
    #[must_use]
    pub fn kind(&self) -> NodeType {
        match self {
            Self::Element(_) => NodeType::Element,
            Self::Text(_) => NodeType::Text,
            Self::Comment(_) => NodeType::Comment,
        }
    }

    #[must_use]
    pub fn tag_name(&self) -> Option<&str> {
        match self {
            Self::Element(el) => Some(&el.tag_name),
            _ => None,
        }
    }

    #[must_use]
    pub fn raw_value(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(&text.raw),
            Self::Comment(comment) => Some(&comment.raw),
            Self::Element(_) => None,
        }
    }

    #[must_use]
    pub fn interpolation_keys(&self) -> &[String] {
        match self {
            Self::Text(text) => &text.keys,
            _ => &[],
        }
    }

    #[must_use]
    pub fn children(&self) -> &[NodeRecord] {
        match self {
            Self::Element(el) => &el.children,
            _ => &[],
        }
    }

    /// The live node produced for this record, if it has been materialized.
    #[must_use]
    pub fn rendered(&self) -> Option<NodeId> {
        match self {
            Self::Element(el) => el.rendered.get(),
            Self::Text(text) => text.rendered.get(),
            Self::Comment(_) => None,
        }
    }

    /// Visit this record and its descendants in depth-first pre-order.
    pub fn walk(&self, visit: &mut impl FnMut(&NodeRecord)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }
}

/// Whether a `v-model` on `tag` binds a value.
#[must_use]
pub fn is_input_capable(tag: &str) -> bool {
    matches!(tag, "input" | "textarea" | "select")
}

fn lookup<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}
