//! Payload assembly for serialized resources.
//!
//! Every resource serializes to a flat JSON object whose first key `"T"`
//! carries the category name. [`Payload`] keeps insertion order and omits
//! absent optional fields instead of writing `null`.

use serde_json::{Map, Value};

use crate::id::Category;

/// Ordered JSON object builder for one resource payload.
#[derive(Debug, Clone)]
pub struct Payload {
    map: Map<String, Value>,
}

impl Payload {
    /// Start a payload tagged with the category under `"T"`.
    pub fn new(category: Category) -> Self {
        let mut map = Map::new();
        map.insert("T".to_owned(), Value::String(category.as_str().to_owned()));
        Payload { map }
    }

    /// Start a payload tagged with the category and carrying the resource id.
    pub fn resource(category: Category, id: &str) -> Self {
        let mut p = Payload::new(category);
        p.set("id", id);
        p
    }

    /// Insert a field.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.map.insert(key.to_owned(), value.into());
        self
    }

    /// Insert a field only when present; `None` leaves the key out entirely.
    pub fn set_opt(&mut self, key: &str, value: Option<impl Into<Value>>) -> &mut Self {
        if let Some(v) = value {
            self.set(key, v);
        }
        self
    }

    /// Finish the payload.
    pub fn into_value(self) -> Value {
        Value::Object(self.map)
    }
}
