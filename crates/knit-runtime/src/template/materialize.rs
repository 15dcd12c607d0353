#![forbid(unsafe_code)]

//! [`NodeRecord`]s to live document nodes.

use knit_dom::{Document, Event, NodeId};
use knit_text::{Lookup, MissingKey};

use super::record::NodeRecord;
use super::{bound_value, render_text};

/// A boxed event listener.
pub type BoxedListener = Box<dyn Fn(&Event)>;

/// Supplies the listeners that connect rendered elements back to their
/// component.
pub trait Binder {
    /// Listener for an `@event` attribute naming `method`.
    fn method_listener(&self, method: &str) -> BoxedListener;

    /// `input` listener writing an element's value into `key`.
    fn model_listener(&self, key: &str) -> BoxedListener;
}

/// What materialization reads from and writes to.
pub struct RenderContext<'a> {
    pub doc: &'a Document,
    pub lookup: &'a dyn Lookup,
    pub missing: MissingKey,
    pub binder: &'a dyn Binder,
}

/// Create live nodes for `records` and append them to `container`.
///
/// Each record's `rendered` handle is set to its new node. Comments produce
/// nothing.
pub fn materialize(ctx: &RenderContext<'_>, container: NodeId, records: &[NodeRecord]) {
    let doc = ctx.doc;
    for record in records {
        match record {
            NodeRecord::Comment(_) => {}
            NodeRecord::Text(text) => {
                let node = doc.create_text_node(render_text(&text.raw, ctx.lookup, ctx.missing));
                text.rendered.set(Some(node));
                doc.append_child(container, node);
            }
            NodeRecord::Element(el) => {
                let node = doc.create_element(&el.tag_name);
                for (event, method) in &el.events {
                    doc.add_event_listener(node, event, ctx.binder.method_listener(method));
                }
                for (name, value) in &el.props {
                    doc.set_attribute(node, name, value);
                }
                if let Some(key) = el.model_key() {
                    doc.set_value(node, &bound_value(key, ctx.lookup, ctx.missing));
                    doc.add_event_listener(node, "input", ctx.binder.model_listener(key));
                }
                el.rendered.set(Some(node));
                doc.append_child(container, node);
                materialize(ctx, node, &el.children);
            }
        }
    }
}

/// Replace the children of `root` with freshly materialized `records`.
///
/// Nodes are built in a detached fragment first, so `root` changes in one
/// step.
pub fn mount(ctx: &RenderContext<'_>, root: NodeId, records: &[NodeRecord]) {
    let fragment = ctx.doc.create_document_fragment();
    materialize(ctx, fragment, records);
    ctx.doc.clear_children(root);
    ctx.doc.append_child(root, fragment);
}
