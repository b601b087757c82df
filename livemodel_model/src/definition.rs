// Copyright 2025 the Livemodel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Class and property definitions.
//!
//! This module provides [`ClassDefinition`] and [`PropertyDefinition`], the
//! declarative description of a model class, plus [`PropertyDefinitionBuilder`]
//! for constructing property definitions in code. Both read from the JSON
//! definition format:
//!
//! ```json
//! {
//!   "ClassName": "Species",
//!   "Extends": "Entity",
//!   "Properties": {
//!     "Name": { "Type": "string", "IsPrimitive": true, "Required": true },
//!     "Tags": { "Type": "string", "IsPrimitive": true, "IsArray": true }
//!   }
//! }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The primitive value kinds a property can hold.
///
/// Type names are matched case-insensitively; unrecognized primitive names
/// map to [`PrimitiveType::Any`], which passes values through unconverted.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// Text.
    String,
    /// Floating point or integral number.
    Number,
    /// Integral number; fractional input is truncated.
    Integer,
    /// `true` or `false`.
    Boolean,
    /// Anything; stored as given.
    Any,
}

impl PrimitiveType {
    /// Maps a definition's type name to a primitive kind.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "string" | "text" => Self::String,
            "number" | "float" | "double" | "decimal" => Self::Number,
            "integer" | "int" | "long" => Self::Integer,
            "boolean" | "bool" => Self::Boolean,
            _ => Self::Any,
        }
    }

    /// Returns `true` for [`PrimitiveType::Number`] and [`PrimitiveType::Integer`].
    #[must_use]
    #[inline]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Number | Self::Integer)
    }
}

/// What a property holds: a primitive value or an instance of a class.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PropertyKind<'a> {
    /// A primitive value.
    Primitive(PrimitiveType),
    /// An instance of the named class.
    Class(&'a str),
}

/// The definition of one class property.
///
/// # Example
///
/// ```rust
/// use livemodel_model::{PrimitiveType, PropertyDefinition, PropertyKind};
/// use serde_json::json;
///
/// let definition = PropertyDefinition::primitive("number")
///     .default_value(json!(1))
///     .required(true)
///     .build();
///
/// assert_eq!(definition.kind(), PropertyKind::Primitive(PrimitiveType::Number));
/// assert_eq!(definition.default_value(), Some(&json!(1)));
/// assert!(definition.is_required());
/// assert!(!definition.is_array());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PropertyDefinition {
    #[serde(rename = "Type", default)]
    type_name: String,
    #[serde(default)]
    is_primitive: bool,
    #[serde(default)]
    is_array: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "core::ops::Not::not")]
    required: bool,
    #[serde(rename = "Enum", default, skip_serializing_if = "Option::is_none")]
    enum_values: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "core::ops::Not::not")]
    read_only: bool,
}

impl PropertyDefinition {
    /// Starts a builder for a primitive property of the given type name.
    #[must_use]
    pub fn primitive(type_name: impl Into<String>) -> PropertyDefinitionBuilder {
        PropertyDefinitionBuilder::new(type_name, true)
    }

    /// Starts a builder for a property holding instances of `class_name`.
    #[must_use]
    pub fn class(class_name: impl Into<String>) -> PropertyDefinitionBuilder {
        PropertyDefinitionBuilder::new(class_name, false)
    }

    /// Returns the declared type name.
    #[must_use]
    #[inline]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns whether the definition is flagged primitive.
    #[must_use]
    #[inline]
    pub fn is_primitive(&self) -> bool {
        self.is_primitive
    }

    /// Returns what the property holds.
    #[must_use]
    pub fn kind(&self) -> PropertyKind<'_> {
        if self.is_primitive {
            PropertyKind::Primitive(PrimitiveType::from_name(&self.type_name))
        } else {
            PropertyKind::Class(&self.type_name)
        }
    }

    /// Returns whether the property holds a sequence of values.
    #[must_use]
    #[inline]
    pub fn is_array(&self) -> bool {
        self.is_array
    }

    /// Returns the configured default, if any.
    ///
    /// A configured `null` reads as no default.
    #[must_use]
    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref().filter(|value| !value.is_null())
    }

    /// Returns whether a value must be present for the instance to validate.
    #[must_use]
    #[inline]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the permitted values, if the property is enum-constrained.
    #[must_use]
    pub fn enum_values(&self) -> Option<&[Value]> {
        self.enum_values.as_deref()
    }

    /// Returns whether observers may write the property.
    #[must_use]
    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Returns whether `value` is one of the permitted enum values.
    ///
    /// Unconstrained properties accept everything. Numbers compare by value,
    /// so `1` and `1.0` are the same member.
    #[must_use]
    pub fn permits(&self, value: &Value) -> bool {
        let Some(allowed) = self.enum_values() else {
            return true;
        };
        allowed.iter().any(|member| match (member, value) {
            (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
            (a, b) => a == b,
        })
    }
}

/// Builder for [`PropertyDefinition`].
///
/// # Example
///
/// ```rust
/// use livemodel_model::PropertyDefinition;
/// use serde_json::json;
///
/// let definition = PropertyDefinition::primitive("string")
///     .enum_values([json!("low"), json!("high")])
///     .read_only(true)
///     .build();
///
/// assert!(definition.permits(&json!("low")));
/// assert!(!definition.permits(&json!("medium")));
/// assert!(definition.is_read_only());
/// ```
#[derive(Clone, Debug)]
pub struct PropertyDefinitionBuilder {
    definition: PropertyDefinition,
}

impl PropertyDefinitionBuilder {
    fn new(type_name: impl Into<String>, is_primitive: bool) -> Self {
        Self {
            definition: PropertyDefinition {
                type_name: type_name.into(),
                is_primitive,
                is_array: false,
                default_value: None,
                required: false,
                enum_values: None,
                read_only: false,
            },
        }
    }

    /// Sets whether the property holds a sequence of values.
    #[must_use]
    pub fn array(mut self, is_array: bool) -> Self {
        self.definition.is_array = is_array;
        self
    }

    /// Sets the default used when input data omits the property.
    #[must_use]
    pub fn default_value(mut self, value: Value) -> Self {
        self.definition.default_value = Some(value);
        self
    }

    /// Sets whether a value must be present for the instance to validate.
    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.definition.required = required;
        self
    }

    /// Restricts the property to the given values.
    #[must_use]
    pub fn enum_values(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.definition.enum_values = Some(values.into_iter().collect());
        self
    }

    /// Sets whether observers may write the property.
    #[must_use]
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.definition.read_only = read_only;
        self
    }

    /// Builds the [`PropertyDefinition`].
    #[must_use]
    pub fn build(self) -> PropertyDefinition {
        self.definition
    }
}

/// The definition of one model class.
///
/// Properties keep their declaration order, which is also the order in which
/// constructed instances receive them.
///
/// # Example
///
/// ```rust
/// use livemodel_model::{ClassDefinition, PropertyDefinition};
///
/// let species = ClassDefinition::new("Species")
///     .extends("Entity")
///     .property("Name", PropertyDefinition::primitive("string").build());
///
/// assert_eq!(species.name(), "Species");
/// assert_eq!(species.parent(), Some("Entity"));
/// assert!(species.property_definition("Name").is_some());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClassDefinition {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    class_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    extends: Option<String>,
    #[serde(default)]
    properties: IndexMap<String, PropertyDefinition>,
}

impl ClassDefinition {
    /// Creates an empty class definition.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            class_name: name.into(),
            extends: None,
            properties: IndexMap::new(),
        }
    }

    /// Sets the parent class.
    #[must_use]
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.extends = Some(parent.into());
        self
    }

    /// Appends (or replaces) a property declaration.
    #[must_use]
    pub fn property(mut self, name: impl Into<String>, definition: PropertyDefinition) -> Self {
        self.properties.insert(name.into(), definition);
        self
    }

    /// Returns the class name.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &str {
        &self.class_name
    }

    /// Returns the parent class name, if any.
    ///
    /// An empty `Extends` reads as no parent.
    #[must_use]
    pub fn parent(&self) -> Option<&str> {
        self.extends.as_deref().filter(|parent| !parent.is_empty())
    }

    /// Returns the properties declared directly on this class, in order.
    #[must_use]
    #[inline]
    pub fn properties(&self) -> &IndexMap<String, PropertyDefinition> {
        &self.properties
    }

    /// Returns the property declared directly on this class as `name`.
    #[must_use]
    pub fn property_definition(&self, name: &str) -> Option<&PropertyDefinition> {
        self.properties.get(name)
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        name.clone_into(&mut self.class_name);
    }
}
