//! Value Module for Bindery
//!
//! The tagged data shapes the assignment engine dispatches on. The view
//! tree itself is the schema; a `Value` only describes the data side.

use serde_json::Value as JsonValue;

/// A data value to bind onto a view tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Plain text. Assigned literally; markup characters are not interpreted.
    Text(String),
    /// Raw markup. Assigned unescaped; the caller is responsible for
    /// sanitizing untrusted input.
    Markup(String),
    /// Ordered sequence. Binds only to a repeated region; output order
    /// equals input order.
    List(Vec<Value>),
    /// Named fields. The keys `text` and `html` are reserved and address
    /// the destination scope itself instead of a child field.
    Record(Vec<(String, Value)>),
}

impl Value {
    /// Static shape name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Markup(_) => "markup",
            Value::List(_) => "list",
            Value::Record(_) => "record",
        }
    }

    /// The scalar string form, if this value has one.
    pub fn scalar(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn markup(markup: impl Into<String>) -> Value {
        Value::Markup(markup.into())
    }

    pub fn list<V: Into<Value>>(items: impl IntoIterator<Item = V>) -> Value {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    pub fn record<K: Into<String>, V: Into<Value>>(
        fields: impl IntoIterator<Item = (K, V)>,
    ) -> Value {
        Value::Record(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Text(b.to_string())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Text(n.to_string())
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Text(n.to_string())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Text(n.to_string())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Text(n.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

/// JSON maps directly onto the binding shapes: scalars become text, arrays
/// become lists, objects become records. `null` binds as empty text.
impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Text(String::new()),
            JsonValue::Bool(b) => Value::Text(b.to_string()),
            JsonValue::Number(n) => Value::Text(n.to_string()),
            JsonValue::String(s) => Value::Text(s),
            JsonValue::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            JsonValue::Object(fields) => Value::Record(
                fields
                    .into_iter()
                    .map(|(name, value)| (name, Value::from(value)))
                    .collect(),
            ),
        }
    }
}
