#![forbid(unsafe_code)]

//! Reactive view-binding runtime for knit.
//!
//! A component ([`ViewModel`]) is mounted on an element of a
//! [`knit_dom::Document`]. Its children are the template: text may contain
//! `{{ key }}` markers, `@event="method"` attributes wire events to methods,
//! and `v-model="key"` on `input`, `textarea` and `select` elements binds
//! their value in both directions. Writes patch the rendered text nodes
//! that reference the written key, in place.
//!
//! # Example
//!
//! ```
//! use knit_runtime::{ViewModel, VmConfig};
//!
//! let vm = ViewModel::from_markup(
//!     r#"<div id="app"><p>Hello {{ name }}</p></div>"#,
//!     VmConfig::new("#app").data("name", "Ada"),
//! )
//! .unwrap();
//! assert_eq!(vm.document().inner_html(vm.root()), "<p>Hello Ada</p>");
//!
//! vm.set("name", "Grace").unwrap();
//! assert_eq!(vm.document().inner_html(vm.root()), "<p>Hello Grace</p>");
//! ```

pub mod config;
pub mod error;
pub mod reactive;
pub mod template;
pub mod value;
pub mod vm;

pub use config::{Hook, Method, VmConfig, VmOptions};
pub use error::VmError;
pub use knit_text::MissingKey;
pub use reactive::{ReactiveCell, Store, Subscription};
pub use template::{Affected, ElementRecord, NodeRecord, PatchStats, TextRecord};
pub use value::Value;
pub use vm::ViewModel;
