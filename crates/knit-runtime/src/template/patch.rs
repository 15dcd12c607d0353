#![forbid(unsafe_code)]

//! In-place updates of rendered nodes after a write.
//!
//! Collection is a pure walk over the compiled tree; application only
//! touches nodes whose content differs from the re-derived text.

use knit_dom::{Document, NodeId};
use knit_text::{Lookup, MissingKey};

use super::record::NodeRecord;
use super::{bound_value, render_text};

/// A rendered node that depends on the written key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Affected<'a> {
    /// Text node; `raw` is the record's source text.
    Text { node: NodeId, raw: &'a str },
    /// Element with `v-model` bound to the key.
    Input { node: NodeId, key: &'a str },
}

impl Affected<'_> {
    #[must_use]
    pub fn node(&self) -> NodeId {
        match *self {
            Self::Text { node, .. } | Self::Input { node, .. } => node,
        }
    }
}

/// Counts from one [`apply_patches`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PatchStats {
    /// Nodes whose text was re-derived.
    pub visited: usize,
    /// Nodes whose content actually changed.
    pub changed: usize,
}

/// Every rendered node of `records` that references `key`, depth-first
/// pre-order.
///
/// With `include_inputs`, elements whose `v-model` names `key` are included.
/// Records that were never materialized are skipped.
#[must_use]
pub fn collect_affected<'a>(
    records: &'a [NodeRecord],
    key: &str,
    include_inputs: bool,
) -> Vec<Affected<'a>> {
    let mut out = Vec::new();
    collect_into(records, key, include_inputs, &mut out);
    out
}

fn collect_into<'a>(
    records: &'a [NodeRecord],
    key: &str,
    include_inputs: bool,
    out: &mut Vec<Affected<'a>>,
) {
    for record in records {
        match record {
            NodeRecord::Text(text) if text.references(key) => {
                if let Some(node) = text.rendered.get() {
                    out.push(Affected::Text {
                        node,
                        raw: &text.raw,
                    });
                }
            }
            NodeRecord::Element(el) => {
                if include_inputs {
                    if let (Some(node), Some(bound)) = (el.rendered.get(), el.model_key()) {
                        if bound == key {
                            out.push(Affected::Input { node, key: bound });
                        }
                    }
                }
                collect_into(&el.children, key, include_inputs, out);
            }
            _ => {}
        }
    }
}

/// Re-derive and write the content of each affected node.
pub fn apply_patches(
    doc: &Document,
    affected: &[Affected<'_>],
    lookup: &dyn Lookup,
    missing: MissingKey,
) -> PatchStats {
    let mut stats = PatchStats::default();
    for item in affected {
        stats.visited += 1;
        let changed = match *item {
            Affected::Text { node, raw } => {
                doc.set_node_value(node, &render_text(raw, lookup, missing))
            }
            Affected::Input { node, key } => doc.set_value(node, &bound_value(key, lookup, missing)),
        };
        if changed {
            stats.changed += 1;
            tracing::trace!(node = %item.node(), "patched");
        }
    }
    stats
}
