#![forbid(unsafe_code)]

//! Data values held by a component's store.

use std::fmt;

/// A data value.
///
/// [`Display`](fmt::Display) produces the text used when a value is
/// interpolated or written into a bound input.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    /// Borrow the string payload, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the variant, for diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) if n.is_infinite() => {
                f.write_str(if *n > 0.0 { "Infinity" } else { "-Infinity" })
            }
            Self::Float(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Self::Str(s.clone())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Null, Into::into)
    }
}

#[cfg(feature = "json")]
mod json {
    use super::Value;

    impl From<serde_json::Value> for Value {
        /// Scalars map onto the matching variant; arrays and objects are
        /// kept as their compact JSON text.
        fn from(json: serde_json::Value) -> Self {
            match json {
                serde_json::Value::Null => Self::Null,
                serde_json::Value::Bool(b) => Self::Bool(b),
                serde_json::Value::Number(n) => match n.as_i64() {
                    Some(i) => Self::Int(i),
                    None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
                },
                serde_json::Value::String(s) => Self::Str(s),
                other => Self::Str(other.to_string()),
            }
        }
    }

    impl From<&Value> for serde_json::Value {
        fn from(value: &Value) -> Self {
            match value {
                Value::Null => Self::Null,
                Value::Bool(b) => Self::Bool(*b),
                Value::Int(n) => Self::from(*n),
                Value::Float(n) => {
                    serde_json::Number::from_f64(*n).map_or(Self::Null, Self::Number)
                }
                Value::Str(s) => Self::String(s.clone()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forms() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::from(30).to_string(), "30");
        assert_eq!(Value::from(30.0).to_string(), "30");
        assert_eq!(Value::from(1.5).to_string(), "1.5");
        assert_eq!(Value::from(f64::NEG_INFINITY).to_string(), "-Infinity");
        assert_eq!(Value::from("Ada").to_string(), "Ada");
    }

    #[test]
    fn option_maps_none_to_null() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Str("x".into()));
    }

    #[test]
    fn accessors() {
        assert_eq!(Value::from(7).as_i64(), Some(7));
        assert_eq!(Value::from(7).as_f64(), Some(7.0));
        assert_eq!(Value::from("s").as_str(), Some("s"));
        assert_eq!(Value::from(false).as_bool(), Some(false));
        assert!(Value::default().is_null());
        assert_eq!(Value::from(2.5).type_name(), "float");
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_conversions() {
        let json = serde_json::json!({"n": 3, "f": 0.5, "s": "x", "list": [1, 2]});
        let map = json.as_object().unwrap();
        assert_eq!(Value::from(map["n"].clone()), Value::Int(3));
        assert_eq!(Value::from(map["f"].clone()), Value::Float(0.5));
        assert_eq!(Value::from(map["list"].clone()), Value::Str("[1,2]".into()));
        assert_eq!(serde_json::Value::from(&Value::Int(3)), serde_json::json!(3));
    }
}
