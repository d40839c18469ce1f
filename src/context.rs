// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Ancillary key-value data attached to a record.

use serde_json::Map;
use serde_json::Value;

/// The key the dispatcher stamps the formatted time into.
pub const TIMESTAMP_KEY: &str = "timestamp";
/// The key the dispatcher stamps the level name into.
pub const NAME_KEY: &str = "name";

/// How the user fields of a [`Context`] are rendered by sinks.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextFormat {
    /// `key=value;` pairs.
    #[default]
    Text,
    /// A compact JSON object.
    Json,
    /// The native debug serialization of the field map.
    Serialized,
}

/// An ordered mapping of context fields plus a rendering directive.
///
/// Fields keep their insertion order. Inserting an existing key replaces its value in place.
///
/// # Examples
///
/// ```
/// use sinkforth::Context;
/// use sinkforth::ContextFormat;
///
/// let context = Context::new()
///     .with("user", "alice")
///     .with("attempts", 3)
///     .format(ContextFormat::Json);
///
/// assert_eq!(context.len(), 2);
/// assert_eq!(context.get("attempts"), Some(&3.into()));
/// ```
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Context {
    fields: Map<String, Value>,
    format: ContextFormat,
}

impl Context {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field and return the context.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set the rendering directive and return the context.
    pub fn format(mut self, format: ContextFormat) -> Self {
        self.format = format;
        self
    }

    /// Add or replace a field.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Add a field only if the key is absent.
    pub fn insert_if_absent(&mut self, key: &str, value: impl FnOnce() -> Value) {
        if !self.fields.contains_key(key) {
            self.fields.insert(key.to_string(), value());
        }
    }

    /// Set the rendering directive.
    pub fn set_format(&mut self, format: ContextFormat) {
        self.format = format;
    }

    /// The rendering directive.
    pub fn get_format(&self) -> ContextFormat {
        self.format
    }

    /// Look up a field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Whether a field exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Number of fields, including `timestamp` and `name` once stamped.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether there are no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over all fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate over the user fields, skipping the stamped `timestamp` and `name`.
    pub fn user_fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.iter()
            .filter(|(k, _)| *k != TIMESTAMP_KEY && *k != NAME_KEY)
    }

    /// Collect the user fields into a JSON map.
    pub fn user_map(&self) -> Map<String, Value> {
        self.user_fields()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Context
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut context = Context::new();
        for (k, v) in iter {
            context.insert(k, v);
        }
        context
    }
}

impl From<Map<String, Value>> for Context {
    fn from(fields: Map<String, Value>) -> Self {
        Context {
            fields,
            format: ContextFormat::default(),
        }
    }
}

/// Render a single value the way text layouts show it.
pub(crate) fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(_) => "[Array]".to_string(),
        Value::Object(_) => "[Object]".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_insertion_order_is_kept() {
        let context = Context::new()
            .with("zeta", 1)
            .with("alpha", 2)
            .with("mid", 3)
            .with("zeta", 4);
        let keys = context.iter().map(|(k, _)| k).collect::<Vec<_>>();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
        assert_eq!(context.get("zeta"), Some(&json!(4)));
    }

    #[test]
    fn test_insert_if_absent() {
        let mut context = Context::new().with(TIMESTAMP_KEY, "yesterday");
        context.insert_if_absent(TIMESTAMP_KEY, || json!("now"));
        context.insert_if_absent(NAME_KEY, || json!("INFO"));
        assert_eq!(context.get(TIMESTAMP_KEY), Some(&json!("yesterday")));
        assert_eq!(context.get(NAME_KEY), Some(&json!("INFO")));
    }

    #[test]
    fn test_user_fields_skip_stamped_keys() {
        let context: Context = [("timestamp", json!("t")), ("a", json!(1)), ("name", json!("n"))]
            .into_iter()
            .collect();
        let user = context.user_fields().map(|(k, _)| k).collect::<Vec<_>>();
        assert_eq!(user, ["a"]);
        // a field called `format` is plain data
        let context = Context::new().with("format", "json");
        assert_eq!(context.get_format(), ContextFormat::Text);
        assert_eq!(context.user_fields().count(), 1);
    }

    #[test]
    fn test_value_to_text() {
        assert_eq!(value_to_text(&json!(null)), "");
        assert_eq!(value_to_text(&json!(true)), "true");
        assert_eq!(value_to_text(&json!(1.5)), "1.5");
        assert_eq!(value_to_text(&json!("s")), "s");
        assert_eq!(value_to_text(&json!([1, 2])), "[Array]");
        assert_eq!(value_to_text(&json!({"k": "v"})), "[Object]");
    }
}
