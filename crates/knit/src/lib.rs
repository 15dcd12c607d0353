#![forbid(unsafe_code)]

//! knit public facade crate.
//!
//! Mount a component on an element, declare its data and methods, and the
//! element's children become a live template:
//!
//! ```
//! use knit::prelude::*;
//!
//! let vm = ViewModel::from_markup(
//!     r#"<div id="app"><input v-model="name"><p>Hi {{ name }}</p></div>"#,
//!     VmConfig::new("#app").data("name", "Ada"),
//! )
//! .unwrap();
//! let doc = vm.document();
//! let input = doc.query_selector("#app input").unwrap().unwrap();
//!
//! doc.input(input, "Grace");
//! assert_eq!(vm.get("name"), Some(Value::from("Grace")));
//! assert_eq!(doc.inner_html(vm.root()), "<input><p>Hi Grace</p>");
//! ```

#[cfg(feature = "logging")]
pub mod logging;

pub use knit_dom as dom;
pub use knit_runtime as runtime;
pub use knit_text as text;

pub use knit_dom::{Document, Event, NodeId, NodeType};
pub use knit_runtime::{MissingKey, Value, ViewModel, VmConfig, VmError, VmOptions};

#[cfg(feature = "logging")]
pub use logging::init_logging;

pub mod prelude {
    pub use knit_dom::{Document, Event, NodeId, NodeType};
    pub use knit_runtime::{MissingKey, Value, ViewModel, VmConfig, VmError, VmOptions};

    pub use knit_dom as dom;
    pub use knit_runtime as runtime;
    pub use knit_text as text;
}
