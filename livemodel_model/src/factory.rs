// Copyright 2025 the Livemodel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Instance construction from untyped data.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::coerce::coerce_primitive;
use crate::definition::{PropertyDefinition, PropertyKind};
use crate::error::SchemaError;
use crate::instance::ModelInstance;
use crate::registry::SchemaRegistry;
use crate::validate::{ValidationIssue, validate_instance};
use crate::value::ModelValue;

/// A class under construction, linked to the constructions enclosing it.
#[derive(Copy, Clone)]
struct Frame<'a> {
    class: &'a str,
    outer: Option<&'a Frame<'a>>,
}

impl Frame<'_> {
    fn contains(&self, class: &str) -> bool {
        let mut frame = Some(self);
        while let Some(current) = frame {
            if current.class == class {
                return true;
            }
            frame = current.outer;
        }
        false
    }
}

/// Where a value is being coerced.
#[derive(Copy, Clone)]
struct Site<'a> {
    class: &'a str,
    property: &'a str,
    frame: Option<&'a Frame<'a>>,
    /// The value is a configured default rather than input data.
    from_default: bool,
}

impl<'a> Site<'a> {
    fn detached(property: &'a str) -> Self {
        Self {
            class: "",
            property,
            frame: None,
            from_default: false,
        }
    }

    fn for_default(self) -> Self {
        Self {
            from_default: true,
            ..self
        }
    }
}

/// Builds [`ModelInstance`]s from class names and raw JSON.
///
/// Structural problems (an unknown class, a broken chain) fail the call.
/// Problems with individual values are logged with `tracing` and replaced by
/// the property's default, so one bad field never loses the whole instance.
///
/// # Example
///
/// ```rust
/// use livemodel_model::{ModelObjectFactory, ModelValue, SchemaRegistry};
/// use serde_json::json;
///
/// let mut registry = SchemaRegistry::new();
/// registry
///     .register(
///         "Parameter",
///         &json!({
///             "Properties": {
///                 "Name": { "Type": "string", "IsPrimitive": true },
///                 "Value": { "Type": "number", "IsPrimitive": true, "DefaultValue": 1 },
///                 "Tags": { "Type": "string", "IsPrimitive": true, "IsArray": true }
///             }
///         }),
///     )
///     .unwrap();
///
/// let factory = ModelObjectFactory::new(&registry);
/// let parameter = factory
///     .construct("Parameter", &json!({ "Name": "k1", "Value": "2.5", "Tags": "fast" }))
///     .unwrap();
///
/// assert_eq!(parameter.class_name(), "Parameter");
/// assert_eq!(parameter.to_json(), json!({ "Name": "k1", "Value": 2.5, "Tags": ["fast"] }));
///
/// let fallback = factory.construct("Parameter", &json!({ "Value": "oops" })).unwrap();
/// assert_eq!(fallback.get("Value"), Some(&ModelValue::from(1_i64)));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct ModelObjectFactory<'r> {
    registry: &'r SchemaRegistry,
}

impl<'r> ModelObjectFactory<'r> {
    /// Creates a factory over `registry`.
    #[must_use]
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Returns the registry this factory reads.
    #[must_use]
    #[inline]
    pub fn registry(&self) -> &'r SchemaRegistry {
        self.registry
    }

    /// Constructs an instance of `class` from `raw`.
    ///
    /// Every property of the inheritance chain is assigned, root class first,
    /// in declaration order. Properties missing from `raw` take their
    /// default. Fields of `raw` that no class declares are ignored, and a
    /// non-object `raw` is read as empty data.
    ///
    /// Required properties are not checked here; see
    /// [`Self::validate_instance`].
    ///
    /// A class-typed default that would construct a class already under
    /// construction is refused, and the property falls back to `Null`.
    ///
    /// # Errors
    ///
    /// Any error of [`SchemaRegistry::resolve_hierarchy`].
    pub fn construct(&self, class: &str, raw: &Value) -> Result<ModelInstance, SchemaError> {
        self.construct_in(class, raw, None)
    }

    fn construct_in(
        &self,
        class: &str,
        raw: &Value,
        outer: Option<&Frame<'_>>,
    ) -> Result<ModelInstance, SchemaError> {
        let chain = self.registry.resolve_hierarchy(class)?;
        let empty = Map::new();
        let data = raw.as_object().unwrap_or(&empty);
        let frame = Frame { class, outer };

        let mut properties = IndexMap::new();
        for declaring in chain.iter() {
            for (name, definition) in declaring.properties() {
                let site = Site {
                    class,
                    property: name,
                    frame: Some(&frame),
                    from_default: false,
                };
                let value = match data.get(name) {
                    Some(raw) => self.coerce_at(site, definition, raw),
                    None => self.default_at(site, definition),
                };
                properties.insert(name.clone(), value);
            }
        }

        tracing::trace!(class, properties = properties.len(), "constructed instance");
        Ok(ModelInstance::from_parts(class, properties))
    }

    /// Creates an instance, preferring a constructor bound in the registry.
    ///
    /// Falls back to [`Self::construct`] when no constructor is bound.
    ///
    /// # Errors
    ///
    /// Any error of [`Self::construct`].
    pub fn create(&self, class: &str, raw: &Value) -> Result<ModelInstance, SchemaError> {
        match self.registry.constructor(class) {
            Some(constructor) => {
                let empty = Map::new();
                Ok(constructor(raw.as_object().unwrap_or(&empty)))
            }
            None => self.construct(class, raw),
        }
    }

    /// Coerces `raw` for the property `property` described by `definition`.
    ///
    /// This applies the same rules as [`Self::construct`] uses for each
    /// field, including default substitution. `property` names the value in
    /// diagnostics.
    #[must_use]
    pub fn coerce_value(
        &self,
        property: &str,
        definition: &PropertyDefinition,
        raw: &Value,
    ) -> ModelValue {
        self.coerce_at(Site::detached(property), definition, raw)
    }

    /// Coerces `raw` for the property `property` of `class`.
    ///
    /// Returns `None` if the class chain does not declare the property.
    #[must_use]
    pub fn coerce_property(&self, class: &str, property: &str, raw: &Value) -> Option<ModelValue> {
        let definition = self.registry.get_property(class, property)?;
        let site = Site {
            class,
            ..Site::detached(property)
        };
        Some(self.coerce_at(site, &definition, raw))
    }

    /// Returns the value a property takes when input data omits it.
    ///
    /// A configured default is coerced to the property's type. Without one,
    /// array properties default to an empty array and everything else to
    /// [`ModelValue::Null`].
    #[must_use]
    pub fn default_for(&self, property: &str, definition: &PropertyDefinition) -> ModelValue {
        self.default_at(Site::detached(property), definition)
    }

    /// Reports required and enum problems in `instance` and everything it
    /// contains.
    #[must_use]
    pub fn validate_instance(&self, instance: &ModelInstance) -> Vec<ValidationIssue> {
        validate_instance(self.registry, instance)
    }

    fn default_at(&self, site: Site<'_>, definition: &PropertyDefinition) -> ModelValue {
        match definition.default_value() {
            Some(default) => self.coerce_at(site.for_default(), definition, default),
            None if definition.is_array() => ModelValue::Array(Vec::new()),
            None => ModelValue::Null,
        }
    }

    fn coerce_at(&self, site: Site<'_>, definition: &PropertyDefinition, raw: &Value) -> ModelValue {
        if raw.is_null() {
            return self.default_at(site, definition);
        }
        if !definition.is_array() {
            return self
                .coerce_element(site, definition, raw)
                .unwrap_or_else(|| self.scalar_fallback(site, definition));
        }

        let items = match raw {
            Value::Array(items) => items.as_slice(),
            single => core::slice::from_ref(single),
        };
        ModelValue::Array(
            items
                .iter()
                .map(|item| {
                    if item.is_null() {
                        return ModelValue::Null;
                    }
                    self.coerce_element(site, definition, item)
                        .unwrap_or(ModelValue::Null)
                })
                .collect(),
        )
    }

    /// Coerces one scalar or one array element. `None` means the input was
    /// rejected and a fallback applies.
    fn coerce_element(
        &self,
        site: Site<'_>,
        definition: &PropertyDefinition,
        raw: &Value,
    ) -> Option<ModelValue> {
        match definition.kind() {
            PropertyKind::Primitive(kind) => {
                let Some(value) = coerce_primitive(kind, raw) else {
                    tracing::warn!(
                        class = site.class,
                        property = site.property,
                        expected = definition.type_name(),
                        value = %raw,
                        "value does not convert, using default"
                    );
                    return None;
                };
                if !definition.permits(&value.to_json()) {
                    tracing::warn!(
                        class = site.class,
                        property = site.property,
                        value = %raw,
                        "value is not an enumerated member"
                    );
                }
                Some(value)
            }
            PropertyKind::Class(class) => {
                if !raw.is_object() {
                    tracing::warn!(
                        class = site.class,
                        property = site.property,
                        expected = class,
                        value = %raw,
                        "non-object value for class-typed property kept as-is"
                    );
                    return Some(ModelValue::from(raw));
                }
                let reentered = site.from_default
                    && site.frame.is_some_and(|frame| frame.contains(class));
                let constructed = if reentered {
                    Err(SchemaError::RecursiveDefault {
                        class: class.to_owned(),
                    })
                } else {
                    self.construct_in(class, raw, site.frame)
                };
                match constructed {
                    Ok(instance) => Some(ModelValue::Instance(instance)),
                    Err(err) => {
                        tracing::warn!(
                            class = site.class,
                            property = site.property,
                            error = %err,
                            "nested construction failed, using default"
                        );
                        None
                    }
                }
            }
        }
    }

    /// Fallback for a rejected scalar. A configured default that is itself
    /// rejected falls through to `Null`.
    fn scalar_fallback(&self, site: Site<'_>, definition: &PropertyDefinition) -> ModelValue {
        if site.from_default {
            return ModelValue::Null;
        }
        definition
            .default_value()
            .and_then(|default| self.coerce_element(site.for_default(), definition, default))
            .unwrap_or(ModelValue::Null)
    }
}
