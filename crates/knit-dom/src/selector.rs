#![forbid(unsafe_code)]

//! Minimal CSS selector matching for element lookup.
//!
//! Supported: compound selectors made of an optional tag or `*`, an
//! optional `#id` and any number of `.class` parts, joined by whitespace
//! (descendant combinator). Examples: `#app`, `div.card`, `main #app .row`.

use crate::node::{Document, NodeId, NodeType};

/// Errors from [`Selector::parse`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("selector is empty")]
    Empty,
    #[error("unsupported character `{ch}` in selector `{selector}`")]
    Unsupported { selector: String, ch: char },
    #[error("empty name after `{marker}` in selector `{selector}`")]
    MissingName { selector: String, marker: char },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

/// A parsed selector: compounds, outermost first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    parts: Vec<Compound>,
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

impl Selector {
    pub fn parse(selector: &str) -> Result<Self, SelectorError> {
        let mut parts = Vec::new();
        for word in selector.split_whitespace() {
            parts.push(Self::parse_compound(selector, word)?);
        }
        if parts.is_empty() {
            return Err(SelectorError::Empty);
        }
        Ok(Self { parts })
    }

    fn parse_compound(selector: &str, word: &str) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();
        let mut rest = word;

        let tag_len = rest.find(|c: char| !is_name_char(c) && c != '*').unwrap_or(rest.len());
        if tag_len > 0 {
            let tag = &rest[..tag_len];
            if tag != "*" {
                compound.tag = Some(tag.to_ascii_lowercase());
            }
            rest = &rest[tag_len..];
        }

        while let Some(marker) = rest.chars().next() {
            if marker != '#' && marker != '.' {
                return Err(SelectorError::Unsupported {
                    selector: selector.to_owned(),
                    ch: marker,
                });
            }
            let body = &rest[1..];
            let len = body.find(|c: char| !is_name_char(c)).unwrap_or(body.len());
            if len == 0 {
                return Err(SelectorError::MissingName {
                    selector: selector.to_owned(),
                    marker,
                });
            }
            let name = body[..len].to_owned();
            if marker == '#' {
                compound.id = Some(name);
            } else {
                compound.classes.push(name);
            }
            rest = &body[len..];
        }
        Ok(compound)
    }

    /// Whether `node` matches the full selector, including ancestors.
    #[must_use]
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some((last, ancestors)) = self.parts.split_last() else {
            return false;
        };
        if !compound_matches(doc, node, last) {
            return false;
        }
        let mut cursor = doc.parent(node);
        let mut pending = ancestors.iter().rev().peekable();
        while let (Some(part), Some(candidate)) = (pending.peek(), cursor) {
            if compound_matches(doc, candidate, part) {
                pending.next();
            }
            cursor = doc.parent(candidate);
        }
        pending.peek().is_none()
    }
}

fn compound_matches(doc: &Document, node: NodeId, compound: &Compound) -> bool {
    if doc.node_type(node) != NodeType::Element {
        return false;
    }
    if let Some(tag) = &compound.tag {
        if doc.tag_name(node).as_deref() != Some(tag.as_str()) {
            return false;
        }
    }
    if let Some(id) = &compound.id {
        if doc.get_attribute(node, "id").as_deref() != Some(id.as_str()) {
            return false;
        }
    }
    if !compound.classes.is_empty() {
        let class_attr = doc.get_attribute(node, "class").unwrap_or_default();
        let have: Vec<&str> = class_attr.split_whitespace().collect();
        if !compound.classes.iter().all(|c| have.contains(&c.as_str())) {
            return false;
        }
    }
    true
}

impl Document {
    /// First element in document order matching `selector`.
    pub fn query_selector(&self, selector: &str) -> Result<Option<NodeId>, SelectorError> {
        let selector = Selector::parse(selector)?;
        Ok(self
            .descendants(self.root())
            .into_iter()
            .find(|&node| selector.matches(self, node)))
    }

    /// All elements in document order matching `selector`.
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>, SelectorError> {
        let selector = Selector::parse(selector)?;
        Ok(self
            .descendants(self.root())
            .into_iter()
            .filter(|&node| selector.matches(self, node))
            .collect())
    }

    /// Element whose `id` attribute equals `id`.
    #[must_use]
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|&node| self.get_attribute(node, "id").as_deref() == Some(id))
    }
}
