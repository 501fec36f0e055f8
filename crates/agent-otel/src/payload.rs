//! Safe encoding of arbitrary event payloads.
//!
//! Host runtimes hand this layer whatever they have: request maps, tool
//! arguments, return values, opaque client objects. [`Payload`] models that
//! data explicitly, and [`safe_serialize`] turns any of it into a single-line
//! JSON string as a total function — a leaf that cannot be represented in
//! JSON is replaced with a `<<non-serializable: TypeName>>` placeholder
//! instead of failing the logging call.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;

/// Marker embedded in placeholder strings for values JSON cannot carry.
pub const NON_SERIALIZABLE_MARKER: &str = "<<non-serializable";

/// A leaf value this layer cannot natively serialise.
///
/// Implementors may expose a canonical JSON form via [`OpaqueValue::to_json`];
/// when they do, that form (stringified) is used. Otherwise the leaf renders
/// as `<<non-serializable: TypeName>>`.
pub trait OpaqueValue: Send + Sync {
    /// Type name embedded in the placeholder string.
    fn type_name(&self) -> &str;

    /// Canonical JSON representation, if the value has one.
    fn to_json(&self) -> Option<Value> {
        None
    }
}

/// Arbitrary structured event data: scalars, sequences, ordered maps, and
/// opaque leaves.
#[derive(Clone)]
pub enum Payload {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Seq(Vec<Payload>),
    /// Ordered key/value map. Insertion order is preserved in this
    /// representation; consumers must not rely on it for correctness.
    Map(Vec<(String, Payload)>),
    /// A value with no native JSON form.
    Opaque(Arc<dyn OpaqueValue>),
}

impl Payload {
    /// Build a map payload from key/value pairs.
    pub fn map<K: Into<String>, I: IntoIterator<Item = (K, Payload)>>(pairs: I) -> Self {
        Payload::Map(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Wrap an opaque value.
    pub fn opaque(value: impl OpaqueValue + 'static) -> Self {
        Payload::Opaque(Arc::new(value))
    }

    /// Look up a top-level key in a map payload.
    pub fn get(&self, key: &str) -> Option<&Payload> {
        match self {
            Payload::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Render this payload as a JSON value, replacing every leaf that has no
    /// JSON representation with a placeholder string.
    pub fn to_json_value(&self) -> Value {
        match self {
            Payload::Null => Value::Null,
            Payload::Bool(b) => Value::Bool(*b),
            Payload::Int(i) => Value::Number((*i).into()),
            Payload::Float(f) => match serde_json::Number::from_f64(*f) {
                Some(n) => Value::Number(n),
                // NaN / infinity have no JSON form.
                None => Value::String(placeholder("f64")),
            },
            Payload::Str(s) => Value::String(s.clone()),
            Payload::Seq(items) => Value::Array(items.iter().map(Payload::to_json_value).collect()),
            Payload::Map(entries) => {
                let mut map = serde_json::Map::new();
                for (k, v) in entries {
                    map.insert(k.clone(), v.to_json_value());
                }
                Value::Object(map)
            }
            Payload::Opaque(o) => match o.to_json() {
                Some(v) => Value::String(v.to_string()),
                None => Value::String(placeholder(o.type_name())),
            },
        }
    }

    /// String value of a top-level map key, if present.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(Payload::Str(s)) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Payload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Render through the JSON projection; opaque leaves appear as their
        // placeholder strings.
        write!(f, "{}", self.to_json_value())
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::Str(s.to_owned())
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::Str(s)
    }
}

impl From<i64> for Payload {
    fn from(i: i64) -> Self {
        Payload::Int(i)
    }
}

impl From<f64> for Payload {
    fn from(f: f64) -> Self {
        Payload::Float(f)
    }
}

impl From<bool> for Payload {
    fn from(b: bool) -> Self {
        Payload::Bool(b)
    }
}

impl From<Value> for Payload {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => Payload::Null,
            Value::Bool(b) => Payload::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Payload::Int(i)
                } else {
                    Payload::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => Payload::Str(s),
            Value::Array(items) => Payload::Seq(items.into_iter().map(Payload::from).collect()),
            Value::Object(map) => {
                Payload::Map(map.into_iter().map(|(k, v)| (k, Payload::from(v))).collect())
            }
        }
    }
}

fn placeholder(type_name: &str) -> String {
    format!("{NON_SERIALIZABLE_MARKER}: {type_name}>>")
}

/// Serialise any payload to a single-line JSON string.
///
/// Total function: every leaf that cannot be represented natively is replaced
/// with a placeholder, so this never fails for any input.
pub fn safe_serialize(payload: &Payload) -> String {
    payload.to_json_value().to_string()
}

/// Project a payload into a copy with the given keys removed from every map
/// level. Used to strip credentials (API keys, connection tokens) out of
/// init-args before they are logged. The input is not mutated.
pub fn redact(payload: &Payload, exclude: &[&str]) -> Payload {
    let excluded: HashSet<&str> = exclude.iter().copied().collect();
    redact_inner(payload, &excluded)
}

fn redact_inner(payload: &Payload, excluded: &HashSet<&str>) -> Payload {
    match payload {
        Payload::Map(entries) => Payload::Map(
            entries
                .iter()
                .filter(|(k, _)| !excluded.contains(k.as_str()))
                .map(|(k, v)| (k.clone(), redact_inner(v, excluded)))
                .collect(),
        ),
        Payload::Seq(items) => {
            Payload::Seq(items.iter().map(|v| redact_inner(v, excluded)).collect())
        }
        other => other.clone(),
    }
}
