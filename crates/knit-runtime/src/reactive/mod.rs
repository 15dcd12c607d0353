#![forbid(unsafe_code)]

//! Reactive state for components.
//!
//! - [`ReactiveCell`]: a shared value whose writes notify subscribers
//!   synchronously.
//! - [`Subscription`]: RAII guard that disconnects a subscriber on drop.
//! - [`Store`]: the fixed, named set of cells backing one component.
//!
//! Everything here is single-threaded (`Rc` + `RefCell`).

pub mod cell;
pub mod store;

pub use cell::{ReactiveCell, Subscription};
pub use store::Store;
