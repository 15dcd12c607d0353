#![forbid(unsafe_code)]

//! Named-value reactive cell with synchronous subscribers.
//!
//! # Design
//!
//! A [`ReactiveCell<T>`] is a shared, version-tracked value. Subscribers are
//! stored as `Weak` callbacks; the strong reference lives in the
//! [`Subscription`] guard returned by [`ReactiveCell::subscribe`], so
//! dropping the guard disconnects the callback. Dead entries are pruned
//! lazily during notification.
//!
//! # Invariants
//!
//! 1. **Set, then notify**: [`set`](ReactiveCell::set) stores the value and
//!    bumps the version before any subscriber runs, so subscribers always
//!    observe the new value through [`get`](ReactiveCell::get).
//! 2. **Every write notifies**: writing a value equal to the current one
//!    still bumps the version and notifies. Subscribers that re-derive
//!    output from the value must therefore be idempotent.
//! 3. Subscribers run in registration order.
//! 4. No borrow of the cell is held while subscribers run, so a subscriber
//!    may read the cell or write other cells.
//!
//! # Failure Modes
//!
//! - **Subscriber panics**: the value and version are already updated;
//!   later subscribers in the same notification do not run.
//! - **Re-entrant write**: a subscriber writing the same cell starts a nested
//!   notification round. Writes are not queued.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = dyn Fn(&T);

struct CellInner<T> {
    value: T,
    version: u64,
    subscribers: Vec<Weak<Callback<T>>>,
}

/// A shared value whose writes notify subscribers synchronously.
///
/// Cloning a `ReactiveCell` creates a new handle to the **same** value.
pub struct ReactiveCell<T> {
    inner: Rc<RefCell<CellInner<T>>>,
}

impl<T> Clone for ReactiveCell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ReactiveCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ReactiveCell")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

impl<T: Clone + 'static> ReactiveCell<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(CellInner {
                value,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Borrow the current value for the duration of `f`.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Replace the value, then notify every live subscriber.
    pub fn set(&self, value: T) {
        let callbacks = {
            let mut inner = self.inner.borrow_mut();
            inner.value = value;
            inner.version += 1;
            inner.subscribers.retain(|weak| weak.strong_count() > 0);
            inner
                .subscribers
                .iter()
                .filter_map(Weak::upgrade)
                .collect::<Vec<_>>()
        };
        if callbacks.is_empty() {
            return;
        }
        let snapshot = self.get();
        for callback in callbacks {
            callback(&snapshot);
        }
    }

    /// Modify the value in place, then notify.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut value = self.get();
        f(&mut value);
        self.set(value);
    }

    /// Number of writes since creation.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Register `callback` to run after each write.
    ///
    /// The callback stays connected while the returned guard is alive.
    #[must_use = "dropping the subscription disconnects the callback"]
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: Rc<Callback<T>> = Rc::new(callback);
        self.inner
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&strong));
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Number of subscribers whose guards are still alive.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .subscribers
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}

/// RAII guard keeping a subscriber connected.
pub struct Subscription {
    _guard: Box<dyn Any>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
