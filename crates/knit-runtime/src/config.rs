#![forbid(unsafe_code)]

//! Component construction input and runtime options.

use std::env;
use std::fmt;
use std::rc::Rc;

use knit_dom::Event;
use knit_text::MissingKey;

use crate::value::Value;
use crate::vm::ViewModel;

/// A component method, invoked with the component and the triggering event.
pub type Method = Rc<dyn Fn(&ViewModel, &Event)>;

/// A lifecycle hook.
pub type Hook = Rc<dyn Fn(&ViewModel)>;

/// Behavior switches for a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VmOptions {
    /// What an interpolation marker with an undeclared key renders as.
    ///
    /// Default: [`MissingKey::Empty`].
    pub missing_key: MissingKey,

    /// Resync `v-model` inputs when their key is written programmatically.
    ///
    /// When `false`, a write patches text nodes only and a bound input keeps
    /// whatever value it last had.
    ///
    /// Default: `true`.
    pub sync_bound_inputs: bool,

    /// Reject templates that reference undeclared keys or unknown methods.
    ///
    /// Default: `false`.
    pub strict: bool,
}

impl Default for VmOptions {
    fn default() -> Self {
        Self {
            missing_key: MissingKey::Empty,
            sync_bound_inputs: true,
            strict: false,
        }
    }
}

impl VmOptions {
    /// Read options from `KNIT_MISSING_KEY`, `KNIT_SYNC_INPUTS` and
    /// `KNIT_STRICT`.
    ///
    /// Unset or unparsable variables leave the default in place.
    #[must_use]
    pub fn from_env() -> Self {
        let missing = env::var("KNIT_MISSING_KEY").ok();
        let sync = env::var("KNIT_SYNC_INPUTS").ok();
        let strict = env::var("KNIT_STRICT").ok();
        Self::from_vars(missing.as_deref(), sync.as_deref(), strict.as_deref())
    }

    fn from_vars(missing: Option<&str>, sync: Option<&str>, strict: Option<&str>) -> Self {
        let defaults = Self::default();
        Self {
            missing_key: missing
                .and_then(MissingKey::from_name)
                .unwrap_or(defaults.missing_key),
            sync_bound_inputs: sync.and_then(parse_flag).unwrap_or(defaults.sync_bound_inputs),
            strict: strict.and_then(parse_flag).unwrap_or(defaults.strict),
        }
    }

    #[must_use]
    pub fn with_missing_key(mut self, policy: MissingKey) -> Self {
        self.missing_key = policy;
        self
    }

    #[must_use]
    pub fn with_sync_bound_inputs(mut self, enabled: bool) -> Self {
        self.sync_bound_inputs = enabled;
        self
    }

    #[must_use]
    pub fn with_strict(mut self, enabled: bool) -> Self {
        self.strict = enabled;
        self
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Everything needed to build a [`ViewModel`].
///
/// ```
/// use knit_runtime::{Value, VmConfig};
///
/// let config = VmConfig::new("#app")
///     .data("count", 0)
///     .method("increment", |vm, _event| {
///         let next = vm.get("count").and_then(|v| v.as_i64()).unwrap_or(0) + 1;
///         vm.set("count", next).unwrap();
///     });
/// assert_eq!(config.el, "#app");
/// assert_eq!(config.data[0], ("count".to_string(), Value::Int(0)));
/// ```
#[derive(Clone, Default)]
pub struct VmConfig {
    /// Selector of the element the component mounts into.
    pub el: String,
    /// Declared keys and their initial values, in declaration order.
    pub data: Vec<(String, Value)>,
    pub methods: Vec<(String, Method)>,
    /// Runs after state is declared, before the template is compiled.
    pub created: Option<Hook>,
    /// Runs once the rendered subtree is attached under the root.
    pub mounted: Option<Hook>,
    pub options: VmOptions,
}

impl fmt::Debug for VmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VmConfig")
            .field("el", &self.el)
            .field("data", &self.data)
            .field(
                "methods",
                &self.methods.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            )
            .field("created", &self.created.is_some())
            .field("mounted", &self.mounted.is_some())
            .field("options", &self.options)
            .finish()
    }
}

impl VmConfig {
    #[must_use]
    pub fn new(el: impl Into<String>) -> Self {
        Self {
            el: el.into(),
            ..Self::default()
        }
    }

    /// Declare `key` with an initial value.
    #[must_use]
    pub fn data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.push((key.into(), value.into()));
        self
    }

    /// Declare every member of a JSON object.
    #[cfg(feature = "json")]
    #[must_use]
    pub fn data_json(mut self, object: serde_json::Map<String, serde_json::Value>) -> Self {
        self.data
            .extend(object.into_iter().map(|(key, value)| (key, Value::from(value))));
        self
    }

    #[must_use]
    pub fn method(
        mut self,
        name: impl Into<String>,
        method: impl Fn(&ViewModel, &Event) + 'static,
    ) -> Self {
        self.methods.push((name.into(), Rc::new(method)));
        self
    }

    #[must_use]
    pub fn created(mut self, hook: impl Fn(&ViewModel) + 'static) -> Self {
        self.created = Some(Rc::new(hook));
        self
    }

    #[must_use]
    pub fn mounted(mut self, hook: impl Fn(&ViewModel) + 'static) -> Self {
        self.mounted = Some(Rc::new(hook));
        self
    }

    #[must_use]
    pub fn options(mut self, options: VmOptions) -> Self {
        self.options = options;
        self
    }
}
