#![forbid(unsafe_code)]

//! Synchronous event listeners and dispatch.
//!
//! # Dispatch order
//!
//! 1. The propagation path (target, then each ancestor) is computed before
//!    any listener runs, so listeners that restructure the tree do not change
//!    which nodes receive the current event.
//! 2. At each node, listeners registered for the event type run in
//!    registration order.
//! 3. Bubbling stops after the target when the event does not bubble, or
//!    after the current node once [`Event::stop_propagation`] is called.
//!
//! The arena is never borrowed while a listener runs; listeners are free to
//! read and mutate the document.

use std::cell::Cell;
use std::rc::Rc;

use crate::node::{Document, NodeId, RegisteredListener};

/// Callback invoked with the dispatched event.
pub type Listener = Rc<dyn Fn(&Event)>;

/// Handle returned by [`Document::add_event_listener`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// A dispatched event.
#[derive(Debug)]
pub struct Event {
    event_type: String,
    target: NodeId,
    bubbles: bool,
    current_target: Cell<Option<NodeId>>,
    propagation_stopped: Cell<bool>,
}

impl Event {
    /// A bubbling event of `event_type` aimed at `target`.
    #[must_use]
    pub fn new(event_type: impl Into<String>, target: NodeId) -> Self {
        Self {
            event_type: event_type.into(),
            target,
            bubbles: true,
            current_target: Cell::new(None),
            propagation_stopped: Cell::new(false),
        }
    }

    /// Make the event stay on its target.
    #[must_use]
    pub fn non_bubbling(mut self) -> Self {
        self.bubbles = false;
        self
    }

    #[must_use]
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// The node the event was dispatched to.
    #[must_use]
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// The node whose listener is currently running.
    #[must_use]
    pub fn current_target(&self) -> Option<NodeId> {
        self.current_target.get()
    }

    #[must_use]
    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    #[must_use]
    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }
}

impl Document {
    /// Register `callback` for `event_type` events reaching `node`.
    pub fn add_event_listener(
        &self,
        node: NodeId,
        event_type: &str,
        callback: impl Fn(&Event) + 'static,
    ) -> ListenerId {
        let mut arena = self.inner.borrow_mut();
        let id = ListenerId(arena.next_listener);
        arena.next_listener += 1;
        arena.slot_mut(node).listeners.push(RegisteredListener {
            id,
            event_type: event_type.to_owned(),
            callback: Rc::new(callback),
        });
        id
    }

    /// Remove a listener; returns whether it was registered on `node`.
    pub fn remove_event_listener(&self, node: NodeId, listener: ListenerId) -> bool {
        let mut arena = self.inner.borrow_mut();
        let listeners = &mut arena.slot_mut(node).listeners;
        let before = listeners.len();
        listeners.retain(|l| l.id != listener);
        listeners.len() != before
    }

    /// Number of listeners for `event_type` registered directly on `node`.
    #[must_use]
    pub fn listener_count(&self, node: NodeId, event_type: &str) -> usize {
        self.inner
            .borrow()
            .slot(node)
            .listeners
            .iter()
            .filter(|l| l.event_type == event_type)
            .count()
    }

    /// Dispatch `event` to its target and, if it bubbles, its ancestors.
    ///
    /// Returns the number of listeners invoked.
    pub fn dispatch_event(&self, event: &Event) -> usize {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "dom_dispatch",
            event = event.event_type(),
            target = event.target().index()
        )
        .entered();

        let path = self.propagation_path(event);
        let mut invoked = 0;
        for node in path {
            let callbacks: Vec<Listener> = self
                .inner
                .borrow()
                .slot(node)
                .listeners
                .iter()
                .filter(|l| l.event_type == event.event_type)
                .map(|l| Rc::clone(&l.callback))
                .collect();

            event.current_target.set(Some(node));
            for callback in callbacks {
                callback(event);
                invoked += 1;
            }
            if event.propagation_stopped() {
                break;
            }
        }
        event.current_target.set(None);
        invoked
    }

    /// Simulate a click on `node`.
    pub fn click(&self, node: NodeId) -> usize {
        self.dispatch_event(&Event::new("click", node))
    }

    /// Simulate a user edit: assign the element's value, then fire `input`.
    pub fn input(&self, node: NodeId, value: &str) -> usize {
        self.set_value(node, value);
        self.dispatch_event(&Event::new("input", node))
    }

    fn propagation_path(&self, event: &Event) -> Vec<NodeId> {
        let arena = self.inner.borrow();
        let mut path = vec![event.target];
        if event.bubbles {
            let mut cursor = arena.slot(event.target).parent;
            while let Some(node) = cursor {
                path.push(node);
                cursor = arena.slot(node).parent;
            }
        }
        path
    }
}
