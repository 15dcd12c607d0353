#![forbid(unsafe_code)]

//! Errors raised by components.

use knit_dom::{MarkupError, SelectorError};

/// Errors from constructing or driving a [`ViewModel`](crate::ViewModel).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VmError {
    /// The root selector could not be parsed.
    #[error("invalid root selector: {0}")]
    InvalidSelector(#[from] SelectorError),
    /// No element matches the root selector.
    #[error("no element matches root selector `{selector}`")]
    RootNotFound { selector: String },
    /// A key that was not declared in the component's data.
    #[error("`{key}` is not a declared data key")]
    UndeclaredKey { key: String },
    /// A method name that was not supplied in the component's methods.
    #[error("`{name}` is not a component method")]
    UnknownMethod { name: String },
    /// The template markup could not be parsed.
    #[error("template markup: {0}")]
    Markup(#[from] MarkupError),
}
