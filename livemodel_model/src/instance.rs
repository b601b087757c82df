// Copyright 2025 the Livemodel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Constructed class instances.

use core::fmt;

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use crate::value::ModelValue;

/// An object tagged with the class it was constructed as.
///
/// Properties keep the order in which they were assigned, which for
/// factory-built instances is the inheritance chain's declaration order. The
/// class tag is metadata: it is not a property and is never serialized.
///
/// # Example
///
/// ```rust
/// use livemodel_model::{ModelInstance, ModelValue};
/// use serde_json::json;
///
/// let mut species = ModelInstance::new("Species");
/// species.insert("Name", "A".into());
///
/// assert_eq!(species.class_name(), "Species");
/// assert_eq!(species.get("Name"), Some(&ModelValue::from("A")));
/// assert_eq!(species.to_json(), json!({ "Name": "A" }));
/// ```
#[derive(Clone, Default, PartialEq)]
pub struct ModelInstance {
    class_name: String,
    properties: IndexMap<String, ModelValue>,
}

impl ModelInstance {
    /// Creates an instance of `class_name` with no properties.
    #[must_use]
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            properties: IndexMap::new(),
        }
    }

    /// Creates an instance from an already resolved property table.
    #[must_use]
    pub fn from_parts(class_name: impl Into<String>, properties: IndexMap<String, ModelValue>) -> Self {
        Self {
            class_name: class_name.into(),
            properties,
        }
    }

    /// Returns the class this instance was constructed as.
    #[must_use]
    #[inline]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Returns the value of a property.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ModelValue> {
        self.properties.get(name)
    }

    /// Returns the value of a property mutably.
    #[must_use]
    pub fn get_mut(&mut self, name: &str) -> Option<&mut ModelValue> {
        self.properties.get_mut(name)
    }

    /// Assigns a property, returning the previous value.
    ///
    /// Reassigning keeps the property's original position.
    pub fn insert(&mut self, name: impl Into<String>, value: ModelValue) -> Option<ModelValue> {
        self.properties.insert(name.into(), value)
    }

    /// Returns `true` if the property has been assigned.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Returns the properties in assignment order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModelValue)> + '_ {
        self.properties.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Returns the number of assigned properties.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns `true` if no property has been assigned.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Converts to plain nested JSON without class metadata.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .properties
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect();
        Value::Object(map)
    }
}

impl fmt::Debug for ModelInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("ModelInstance");
        out.field("class", &self.class_name);
        for (name, value) in &self.properties {
            out.field(name, value);
        }
        out.finish()
    }
}

impl Serialize for ModelInstance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.properties.len()))?;
        for (name, value) in &self.properties {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
