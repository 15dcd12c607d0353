#![forbid(unsafe_code)]

//! `{{ key }}` interpolation markers.
//!
//! A marker is `{{`, then any run of characters other than `{` and `}`,
//! then `}}`. Markers do not nest; text that fails to form a marker (for
//! example `{{ a }` or `{{ {a} }}`) is left as literal text. The key of a
//! marker is its inner text, trimmed.
//!
//! # Invariants
//!
//! 1. **Leftmost scanning**: markers are reported left to right and never
//!    overlap; when a `{{` fails to open a marker, scanning resumes one
//!    byte later, so `{{{a}}` yields the marker `{{a}}` at offset 1.
//!
//! 2. **Single pass**: [`resolve`] never rescans substituted text, so a
//!    value that itself looks like `{{b}}` is inserted verbatim.
//!
//! 3. **Purity**: resolution reads the [`Lookup`] and nothing else.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Unknown key | Lookup has no value | Per [`MissingKey`]; key reported in [`Resolution::missing`] |
//! | Unbalanced braces | `{{a}`, `{a}}` | Left as literal text |
//! | Empty marker | `{{}}` or `{{  }}` | Key is `""`, handled as unknown |

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt::{Display, Write as _};
use std::hash::{BuildHasher, Hash};

use smallvec::SmallVec;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Keys extracted from one text, in order of occurrence.
pub type Keys = SmallVec<[String; 2]>;

/// One marker found in a text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Marker<'a> {
    /// Byte offset of the opening `{{`.
    pub start: usize,
    /// Byte offset just past the closing `}}`.
    pub end: usize,
    /// Text between the braces, untrimmed.
    pub inner: &'a str,
}

impl<'a> Marker<'a> {
    /// The identifier this marker refers to.
    #[must_use]
    pub fn key(&self) -> &'a str {
        self.inner.trim()
    }
}

/// Iterator over the markers of a text; see [`scan`].
#[derive(Clone, Debug)]
pub struct Markers<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Iterator for Markers<'a> {
    type Item = Marker<'a>;

    fn next(&mut self) -> Option<Marker<'a>> {
        while let Some(offset) = self.text[self.pos..].find(OPEN) {
            let start = self.pos + offset;
            let body = start + OPEN.len();
            let stop = self.text[body..]
                .find(['{', '}'])
                .map(|len| body + len)
                .filter(|&at| self.text[at..].starts_with(CLOSE));
            match stop {
                Some(at) => {
                    self.pos = at + CLOSE.len();
                    return Some(Marker {
                        start,
                        end: self.pos,
                        inner: &self.text[body..at],
                    });
                }
                // '{' is one byte, so start + 1 is a char boundary.
                None => self.pos = start + 1,
            }
        }
        self.pos = self.text.len();
        None
    }
}

/// Iterate over the interpolation markers of `text`.
#[must_use]
pub fn scan(text: &str) -> Markers<'_> {
    Markers { text, pos: 0 }
}

/// Whether `text` contains at least one marker.
#[must_use]
pub fn has_markers(text: &str) -> bool {
    scan(text).next().is_some()
}

/// The trimmed keys of every marker in `text`, duplicates preserved.
#[must_use]
pub fn interpolation_keys(text: &str) -> Keys {
    scan(text).map(|m| m.key().to_owned()).collect()
}

/// Source of values for [`resolve`].
pub trait Lookup {
    /// Append the textual value of `key` to `out`.
    ///
    /// Returns `false`, leaving `out` untouched, when `key` is unknown.
    fn write_value(&self, key: &str, out: &mut String) -> bool;
}

impl<L: Lookup + ?Sized> Lookup for &L {
    fn write_value(&self, key: &str, out: &mut String) -> bool {
        (**self).write_value(key, out)
    }
}

impl<K, V, S> Lookup for HashMap<K, V, S>
where
    K: Borrow<str> + Hash + Eq,
    V: Display,
    S: BuildHasher,
{
    fn write_value(&self, key: &str, out: &mut String) -> bool {
        match self.get(key) {
            Some(value) => {
                let _ = write!(out, "{value}");
                true
            }
            None => false,
        }
    }
}

impl<V: Display> Lookup for [(&str, V)] {
    fn write_value(&self, key: &str, out: &mut String) -> bool {
        match self.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => {
                let _ = write!(out, "{value}");
                true
            }
            None => false,
        }
    }
}

/// Adapts a closure into a [`Lookup`].
///
/// ```
/// use knit_text::{FnLookup, MissingKey, resolve};
///
/// let lookup = FnLookup(|key: &str| (key == "who").then(|| "world".to_string()));
/// assert_eq!(resolve("hello {{who}}", &lookup, MissingKey::Empty).text, "hello world");
/// ```
#[derive(Clone, Copy, Debug)]
pub struct FnLookup<F>(pub F);

impl<F> Lookup for FnLookup<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn write_value(&self, key: &str, out: &mut String) -> bool {
        match (self.0)(key) {
            Some(value) => {
                out.push_str(&value);
                true
            }
            None => false,
        }
    }
}

/// What to substitute for a marker whose key is unknown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MissingKey {
    /// Substitute nothing.
    #[default]
    Empty,
    /// Substitute the text `undefined`.
    Undefined,
    /// Keep the marker text as written.
    Literal,
}

impl MissingKey {
    /// Parse a policy name (`empty`, `undefined`, `literal`), ignoring case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "empty" => Some(Self::Empty),
            "undefined" => Some(Self::Undefined),
            "literal" => Some(Self::Literal),
            _ => None,
        }
    }
}

/// Output of [`resolve`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    pub text: String,
    /// Keys that the lookup did not know, in order, duplicates preserved.
    pub missing: SmallVec<[String; 1]>,
}

impl Resolution {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Replace every marker in `text` with its value from `lookup`.
#[must_use]
pub fn resolve<L: Lookup + ?Sized>(text: &str, lookup: &L, missing: MissingKey) -> Resolution {
    let mut out = Resolution {
        text: String::with_capacity(text.len()),
        missing: SmallVec::new(),
    };
    let mut copied = 0;
    for marker in scan(text) {
        out.text.push_str(&text[copied..marker.start]);
        let key = marker.key();
        if !lookup.write_value(key, &mut out.text) {
            match missing {
                MissingKey::Empty => {}
                MissingKey::Undefined => out.text.push_str("undefined"),
                MissingKey::Literal => out.text.push_str(&text[marker.start..marker.end]),
            }
            out.missing.push(key.to_owned());
        }
        copied = marker.end;
    }
    out.text.push_str(&text[copied..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> HashMap<&'static str, String> {
        HashMap::from([("name", "Ada".to_string()), ("age", "30".to_string())])
    }

    #[test]
    fn extracts_keys_in_order() {
        assert_eq!(
            interpolation_keys("Hello {{name}}, you are {{age}}").as_slice(),
            ["name", "age"]
        );
    }

    #[test]
    fn duplicate_keys_are_kept() {
        assert_eq!(
            interpolation_keys("{{a}} and {{ a }}").as_slice(),
            ["a", "a"]
        );
    }

    #[test]
    fn keys_are_trimmed() {
        assert_eq!(interpolation_keys("{{  spaced\t}}").as_slice(), ["spaced"]);
    }

    #[test]
    fn resolves_known_keys() {
        let r = resolve("Hello {{name}}, you are {{age}}", &person(), MissingKey::Empty);
        assert_eq!(r.text, "Hello Ada, you are 30");
        assert!(r.is_complete());
    }

    #[test]
    fn resolves_with_inner_whitespace() {
        let r = resolve("[{{ name }}]", &person(), MissingKey::Empty);
        assert_eq!(r.text, "[Ada]");
    }

    #[test]
    fn text_without_markers_is_unchanged() {
        let r = resolve("plain { text }", &person(), MissingKey::Empty);
        assert_eq!(r.text, "plain { text }");
        assert!(!has_markers("plain { text }"));
    }

    #[test]
    fn unbalanced_markers_stay_literal() {
        for text in ["{{name}", "{name}}", "{{ {name} }}", "{{name", "}}name{{"] {
            assert_eq!(interpolation_keys(text).len(), 0, "{text}");
            assert_eq!(resolve(text, &person(), MissingKey::Empty).text, text);
        }
    }

    #[test]
    fn extra_leading_brace_is_literal() {
        let markers: Vec<_> = scan("{{{name}}").collect();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].start, 1);
        assert_eq!(resolve("{{{name}}", &person(), MissingKey::Empty).text, "{Ada");
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let values = [("a", "{{b}}"), ("b", "B")];
        let r = resolve("{{a}}{{b}}", &values[..], MissingKey::Empty);
        assert_eq!(r.text, "{{b}}B");
    }

    #[test]
    fn missing_key_policies() {
        let text = "x={{ nope }};";
        let empty = resolve(text, &person(), MissingKey::Empty);
        assert_eq!(empty.text, "x=;");
        assert_eq!(empty.missing.as_slice(), ["nope"]);
        assert_eq!(
            resolve(text, &person(), MissingKey::Undefined).text,
            "x=undefined;"
        );
        assert_eq!(resolve(text, &person(), MissingKey::Literal).text, text);
    }

    #[test]
    fn empty_marker_is_missing() {
        let r = resolve("[{{ }}]", &person(), MissingKey::Empty);
        assert_eq!(r.text, "[]");
        assert_eq!(r.missing.as_slice(), [""]);
    }

    #[test]
    fn multibyte_text_around_markers() {
        let r = resolve("héllo {{name}} ✓", &person(), MissingKey::Empty);
        assert_eq!(r.text, "héllo Ada ✓");
    }

    #[test]
    fn closure_lookup() {
        let lookup = FnLookup(|key: &str| Some(key.to_uppercase()));
        assert_eq!(resolve("{{a}}-{{b}}", &lookup, MissingKey::Empty).text, "A-B");
    }

    #[test]
    fn policy_names() {
        assert_eq!(MissingKey::from_name(" Literal "), Some(MissingKey::Literal));
        assert_eq!(MissingKey::from_name("undefined"), Some(MissingKey::Undefined));
        assert_eq!(MissingKey::from_name("loud"), None);
    }
}
