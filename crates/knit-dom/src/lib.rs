#![forbid(unsafe_code)]

//! In-memory document model for knit.
//!
//! This crate is the host runtime that templates render into: an
//! arena-backed node tree with attributes, form values, synchronous event
//! dispatch, a markup parser, an HTML serializer and selector lookup.
//!
//! # Example
//!
//! ```
//! use knit_dom::Document;
//!
//! let doc = Document::parse("<div id=\"app\"><p>Hello</p></div>").unwrap();
//! let app = doc.query_selector("#app").unwrap().unwrap();
//! assert_eq!(doc.text_content(app), "Hello");
//! assert_eq!(doc.inner_html(app), "<p>Hello</p>");
//! ```

pub mod event;
pub mod markup;
pub mod node;
pub mod selector;
pub mod serialize;

pub use event::{Event, Listener, ListenerId};
pub use markup::{MarkupError, decode_entities, is_raw_text_element, is_void_element};
pub use node::{Attribute, Document, NodeId, NodeType};
pub use selector::{Selector, SelectorError};
