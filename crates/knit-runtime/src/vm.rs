#![forbid(unsafe_code)]

//! Component instances.
//!
//! A [`ViewModel`] owns the state, methods and compiled template of one
//! mounted component. Construction compiles the root's children once,
//! replaces them with a rendered copy, and subscribes to every declared key.
//! From then on each write re-derives the text of the rendered nodes that
//! reference the written key, in place.
//!
//! # Lifecycle
//!
//! 1. Resolve the root element from the selector.
//! 2. Declare state cells and methods.
//! 3. Run the `created` hook. Writes here patch nothing, since there is
//!    no compiled tree yet.
//! 4. Compile the root's children; under `strict` options, reject unknown
//!    keys and methods before the document is touched.
//! 5. Materialize into a fragment and swap it in under the root.
//! 6. Run the `mounted` hook.
//!
//! Listeners installed on rendered nodes hold a weak handle; once every
//! `ViewModel` clone is dropped they do nothing.

use std::cell::{Cell, OnceCell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use ahash::AHashMap;
use knit_dom::{Document, Event, NodeId};
use tracing::{debug, debug_span, warn};

use crate::config::{Method, VmConfig, VmOptions};
use crate::error::VmError;
use crate::reactive::{Store, Subscription};
use crate::template::{
    Binder, BoxedListener, NodeRecord, PatchStats, RenderContext, apply_patches,
    collect_affected, compile_children, mount,
};
use crate::value::Value;

struct VmInner {
    doc: Document,
    root: NodeId,
    el: String,
    store: Store,
    methods: AHashMap<String, Method>,
    records: OnceCell<Vec<NodeRecord>>,
    options: VmOptions,
    scans: Cell<u64>,
    watchers: RefCell<Vec<Subscription>>,
}

/// Handle to a mounted component.
///
/// Cloning is cheap and yields a handle to the same component.
#[derive(Clone)]
pub struct ViewModel {
    inner: Rc<VmInner>,
}

impl fmt::Debug for ViewModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewModel")
            .field("el", &self.inner.el)
            .field("root", &self.inner.root)
            .field("keys", &self.inner.store.keys())
            .field("scans", &self.inner.scans.get())
            .finish_non_exhaustive()
    }
}

impl ViewModel {
    /// Mount a component on the element of `doc` matching `config.el`.
    ///
    /// # Errors
    ///
    /// - [`VmError::InvalidSelector`] or [`VmError::RootNotFound`] when the
    ///   root cannot be resolved; nothing else has happened yet.
    /// - [`VmError::UndeclaredKey`] or [`VmError::UnknownMethod`] under
    ///   `strict` options; the document is left untouched.
    pub fn mount(doc: &Document, config: VmConfig) -> Result<Self, VmError> {
        let VmConfig {
            el,
            data,
            methods,
            created,
            mounted,
            options,
        } = config;
        let span = debug_span!("vm_mount", el = %el);
        let _guard = span.enter();

        let root = doc
            .query_selector(&el)?
            .ok_or_else(|| VmError::RootNotFound {
                selector: el.clone(),
            })?;

        let vm = Self {
            inner: Rc::new(VmInner {
                doc: doc.clone(),
                root,
                el,
                store: Store::new(data),
                methods: methods.into_iter().collect(),
                records: OnceCell::new(),
                options,
                scans: Cell::new(0),
                watchers: RefCell::new(Vec::new()),
            }),
        };
        vm.watch_keys();

        if let Some(hook) = &created {
            hook(&vm);
        }

        let records = {
            let _compile = debug_span!("vm_compile").entered();
            compile_children(doc, root)
        };
        if vm.inner.options.strict {
            vm.validate(&records)?;
        }
        let records = vm.inner.records.get_or_init(|| records);

        {
            let _materialize = debug_span!("vm_materialize").entered();
            let binder = WeakBinder(Rc::downgrade(&vm.inner));
            let ctx = RenderContext {
                doc,
                lookup: &vm.inner.store,
                missing: vm.inner.options.missing_key,
                binder: &binder,
            };
            mount(&ctx, root, records);
        }

        if let Some(hook) = &mounted {
            hook(&vm);
        }
        debug!(keys = vm.inner.store.len(), "mounted");
        Ok(vm)
    }

    /// Parse `markup` into a new document and mount on it.
    ///
    /// # Errors
    ///
    /// [`VmError::Markup`] when the markup does not parse, otherwise as
    /// [`mount`](Self::mount).
    pub fn from_markup(markup: &str, config: VmConfig) -> Result<Self, VmError> {
        let doc = Document::parse(markup)?;
        Self::mount(&doc, config)
    }

    fn watch_keys(&self) {
        let store = &self.inner.store;
        let mut watchers = self.inner.watchers.borrow_mut();
        for key in store.keys() {
            let weak = Rc::downgrade(&self.inner);
            let watched = key.clone();
            if let Some(cell) = store.cell(key) {
                watchers.push(cell.subscribe(move |_| {
                    if let Some(inner) = weak.upgrade() {
                        Self { inner }.update_for_key(&watched);
                    }
                }));
            }
        }
    }

    fn validate(&self, records: &[NodeRecord]) -> Result<(), VmError> {
        let store = &self.inner.store;
        let methods = &self.inner.methods;
        let mut failure = None;
        for record in records {
            record.walk(&mut |record: &NodeRecord| {
                if failure.is_some() {
                    return;
                }
                match record {
                    NodeRecord::Text(text) => {
                        if let Some(key) = text.keys.iter().find(|key| !store.contains(key)) {
                            failure = Some(VmError::UndeclaredKey { key: key.clone() });
                        }
                    }
                    NodeRecord::Element(el) => {
                        if let Some((_, name)) = el
                            .events
                            .iter()
                            .find(|(_, name)| !methods.contains_key(name.trim()))
                        {
                            failure = Some(VmError::UnknownMethod {
                                name: name.trim().to_owned(),
                            });
                        } else if let Some(key) = el.model_key().filter(|key| !store.contains(key)) {
                            failure = Some(VmError::UndeclaredKey {
                                key: key.to_owned(),
                            });
                        }
                    }
                    NodeRecord::Comment(_) => {}
                }
            });
        }
        failure.map_or(Ok(()), Err)
    }

    /// Re-derive every rendered node that depends on `key`.
    ///
    /// Runs automatically after each write. Before the template is compiled
    /// there is nothing to scan and the scan count is left alone.
    pub fn update_for_key(&self, key: &str) -> PatchStats {
        let Some(records) = self.inner.records.get() else {
            return PatchStats::default();
        };
        self.inner.scans.set(self.inner.scans.get() + 1);
        let _span = debug_span!("vm_update", key).entered();
        let affected = collect_affected(records, key, self.inner.options.sync_bound_inputs);
        let stats = apply_patches(
            &self.inner.doc,
            &affected,
            &self.inner.store,
            self.inner.options.missing_key,
        );
        debug!(visited = stats.visited, changed = stats.changed, "update scan");
        stats
    }

    /// Current value of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.store.get(key)
    }

    /// Write `key`, then patch the rendered nodes that reference it.
    ///
    /// Every write patches, even when the value is unchanged.
    ///
    /// # Errors
    ///
    /// [`VmError::UndeclaredKey`] when `key` was not declared.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<(), VmError> {
        self.inner.store.set(key, value.into())
    }

    /// Declared keys, in declaration order.
    #[must_use]
    pub fn keys(&self) -> &[String] {
        self.inner.store.keys()
    }

    #[must_use]
    pub fn has_method(&self, name: &str) -> bool {
        self.inner.methods.contains_key(name)
    }

    /// Invoke method `name` as if `event` had triggered it.
    ///
    /// # Errors
    ///
    /// [`VmError::UnknownMethod`] when no such method exists.
    pub fn call(&self, name: &str, event: &Event) -> Result<(), VmError> {
        let method = self
            .inner
            .methods
            .get(name)
            .map(Rc::clone)
            .ok_or_else(|| VmError::UnknownMethod {
                name: name.to_owned(),
            })?;
        method(self, event);
        Ok(())
    }

    /// Observe writes to `key`.
    ///
    /// The callback runs after the rendered nodes have been patched.
    ///
    /// # Errors
    ///
    /// [`VmError::UndeclaredKey`] when `key` was not declared.
    pub fn subscribe(
        &self,
        key: &str,
        callback: impl Fn(&Value) + 'static,
    ) -> Result<Subscription, VmError> {
        self.inner.store.subscribe(key, callback)
    }

    /// The element the component is mounted on.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.inner.root
    }

    /// Selector the root was resolved from.
    #[must_use]
    pub fn el(&self) -> &str {
        &self.inner.el
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.inner.doc
    }

    /// The compiled tree. Empty until compilation has run.
    #[must_use]
    pub fn records(&self) -> &[NodeRecord] {
        self.inner.records.get().map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn options(&self) -> VmOptions {
        self.inner.options
    }

    /// Number of update scans run so far.
    #[must_use]
    pub fn scan_count(&self) -> u64 {
        self.inner.scans.get()
    }
}

/// Connects rendered elements to a component without keeping it alive.
struct WeakBinder(Weak<VmInner>);

impl WeakBinder {
    fn upgrade(weak: &Weak<VmInner>) -> Option<ViewModel> {
        weak.upgrade().map(|inner| ViewModel { inner })
    }
}

impl Binder for WeakBinder {
    fn method_listener(&self, method: &str) -> BoxedListener {
        let weak = Weak::clone(&self.0);
        let method = method.trim().to_owned();
        Box::new(move |event| {
            let Some(vm) = Self::upgrade(&weak) else {
                return;
            };
            if vm.call(&method, event).is_err() {
                warn!(method = %method, event = event.event_type(), "event names an unknown method");
            }
        })
    }

    fn model_listener(&self, key: &str) -> BoxedListener {
        let weak = Weak::clone(&self.0);
        let key = key.to_owned();
        Box::new(move |event| {
            let Some(vm) = Self::upgrade(&weak) else {
                return;
            };
            let value = vm.document().value(event.target()).unwrap_or_default();
            if let Err(err) = vm.set(&key, value) {
                warn!(error = %err, "v-model write dropped");
            }
        })
    }
}
