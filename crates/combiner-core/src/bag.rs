//! `Bag`: a thin wrapper over [`serde_json::Value`] with narrow, typed
//! accessors.
//!
//! Binders read source JSON through a `Bag` and convert it into a concrete
//! struct at the binder boundary; raw [`serde_json::Value`]s never travel
//! past that point (Design Note: "Dynamic JSON → typed surface").

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A dynamically-typed JSON tree with typed-default accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bag(pub Value);

impl From<Value> for Bag {
    fn from(value: Value) -> Self {
        Bag(value)
    }
}

impl Bag {
    pub fn null() -> Self {
        Bag(Value::Null)
    }

    pub fn get(&self, key: &str) -> Bag {
        Bag(self.0.get(key).cloned().unwrap_or(Value::Null))
    }

    pub fn index(&self, i: usize) -> Bag {
        Bag(self.0.get(i).cloned().unwrap_or(Value::Null))
    }

    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    pub fn as_str(&self) -> Option<&str> {
        self.0.as_str()
    }

    pub fn str_or(&self, default: &str) -> String {
        self.0.as_str().map(str::to_string).unwrap_or_else(|| default.to_string())
    }

    pub fn i64_or(&self, default: i64) -> i64 {
        self.0.as_i64().unwrap_or(default)
    }

    pub fn bool_or(&self, default: bool) -> bool {
        self.0.as_bool().unwrap_or(default)
    }

    pub fn f64_or(&self, default: f64) -> f64 {
        self.0.as_f64().unwrap_or(default)
    }

    /// Iterate an array field, yielding an empty iterator for anything else.
    pub fn array(&self) -> Vec<Bag> {
        match &self.0 {
            Value::Array(items) => items.iter().cloned().map(Bag).collect(),
            _ => Vec::new(),
        }
    }

    /// Iterate a string array field, skipping non-string elements.
    pub fn str_array(&self) -> Vec<String> {
        self.array()
            .into_iter()
            .filter_map(|b| b.as_str().map(str::to_string))
            .collect()
    }

    /// Iterate object entries, yielding nothing for anything else.
    pub fn entries(&self) -> Vec<(String, Bag)> {
        match &self.0 {
            Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), Bag(v.clone()))).collect(),
            _ => Vec::new(),
        }
    }

    pub fn is_object(&self) -> bool {
        self.0.is_object()
    }

    pub fn is_array(&self) -> bool {
        self.0.is_array()
    }

    pub fn is_string(&self) -> bool {
        self.0.is_string()
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}
