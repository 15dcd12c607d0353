#![forbid(unsafe_code)]

//! Template pipeline: compile source nodes once, materialize them once, then
//! patch rendered nodes in place on each write.

pub mod compile;
pub mod materialize;
pub mod patch;
pub mod record;

pub use compile::{AttrClass, classify, compile, compile_children};
pub use materialize::{Binder, BoxedListener, RenderContext, materialize, mount};
pub use patch::{Affected, PatchStats, apply_patches, collect_affected};
pub use record::{CommentRecord, ElementRecord, NodeRecord, TextRecord, is_input_capable};

use knit_text::{Lookup, MissingKey, resolve};

/// Resolve the markers of `raw`, logging each key the lookup lacks.
pub(crate) fn render_text(raw: &str, lookup: &dyn Lookup, missing: MissingKey) -> String {
    let resolution = resolve(raw, lookup, missing);
    for key in &resolution.missing {
        tracing::warn!(key = %key, "interpolation marker names an undeclared key");
    }
    resolution.text
}

/// Text a `v-model` element bound to `key` should hold.
pub(crate) fn bound_value(key: &str, lookup: &dyn Lookup, missing: MissingKey) -> String {
    let mut out = String::new();
    if !lookup.write_value(key, &mut out) {
        tracing::warn!(key = %key, "v-model names an undeclared key");
        if missing == MissingKey::Undefined {
            out.push_str("undefined");
        }
    }
    out
}
