// Copyright 2025 the Livemodel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Class registry.
//!
//! This module provides [`SchemaRegistry`] for registering class definitions
//! and constructors and for resolving inheritance chains.

use std::cell::RefCell;
use std::rc::Rc;

use hashbrown::{HashMap, HashSet};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::definition::{ClassDefinition, PropertyDefinition};
use crate::error::SchemaError;
use crate::instance::ModelInstance;
use crate::value::ModelValue;

/// A resolved inheritance chain, ordered root to leaf.
pub type Hierarchy = Rc<[Rc<ClassDefinition>]>;

/// A merged property table over a whole inheritance chain.
pub type PropertyTable = Rc<IndexMap<String, PropertyDefinition>>;

/// Builds an instance directly from input data, bypassing the factory.
pub type InstanceConstructor = Rc<dyn Fn(&Map<String, Value>) -> ModelInstance>;

/// A registry of class definitions and constructors keyed by class name.
///
/// Hierarchies and merged property tables are resolved lazily and cached.
/// Re-registering a class drops every cached entry whose chain includes it.
///
/// The registry is not global: create one, fill it, and hand it to every
/// consumer that needs it.
///
/// # Example
///
/// ```rust
/// use livemodel_model::SchemaRegistry;
/// use serde_json::json;
///
/// let mut registry = SchemaRegistry::new();
/// registry
///     .load_many(&json!({
///         "Species": {
///             "Extends": "Entity",
///             "Properties": { "Name": { "Type": "string", "IsPrimitive": true } }
///         },
///         "Entity": {
///             "Properties": { "Name": { "Type": "number", "IsPrimitive": true } }
///         }
///     }))
///     .unwrap();
///
/// let chain = registry.resolve_hierarchy("Species").unwrap();
/// let names: Vec<_> = chain.iter().map(|class| class.name()).collect();
/// assert_eq!(names, ["Entity", "Species"]);
///
/// // The nearest declaration wins.
/// let name = registry.get_property("Species", "Name").unwrap();
/// assert_eq!(name.type_name(), "string");
/// ```
#[derive(Default)]
pub struct SchemaRegistry {
    definitions: IndexMap<String, Rc<ClassDefinition>>,
    constructors: HashMap<String, InstanceConstructor>,
    hierarchies: RefCell<HashMap<String, Hierarchy>>,
    tables: RefCell<HashMap<String, PropertyTable>>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a class from its JSON definition.
    ///
    /// `name` wins over any `ClassName` inside the definition. An existing
    /// class of the same name is replaced.
    ///
    /// The parent named by `Extends` does not need to exist yet; it is
    /// checked when the hierarchy is resolved, or by [`Self::load_many`].
    ///
    /// # Errors
    ///
    /// - [`SchemaError::MissingClassName`] if `name` is empty.
    /// - [`SchemaError::InvalidDefinition`] if `definition` is not an object
    ///   or does not have the definition shape.
    pub fn register(&mut self, name: &str, definition: &Value) -> Result<(), SchemaError> {
        if name.is_empty() {
            return Err(SchemaError::MissingClassName);
        }
        let kind = match definition {
            Value::Object(_) => None,
            Value::Null => Some("null"),
            Value::Bool(_) => Some("a boolean"),
            Value::Number(_) => Some("a number"),
            Value::String(_) => Some("a string"),
            Value::Array(_) => Some("an array"),
        };
        if let Some(kind) = kind {
            return Err(SchemaError::invalid(
                name,
                format!("expected an object, found {kind}"),
            ));
        }

        let mut parsed: ClassDefinition = serde_json::from_value(definition.clone())
            .map_err(|err| SchemaError::invalid(name, err.to_string()))?;
        parsed.set_name(name);
        self.register_definition(parsed)
    }

    /// Registers an already typed class definition.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::MissingClassName`] if the definition is unnamed.
    pub fn register_definition(&mut self, definition: ClassDefinition) -> Result<(), SchemaError> {
        if definition.name().is_empty() {
            return Err(SchemaError::MissingClassName);
        }
        let name = definition.name().to_owned();
        self.invalidate(&name);
        tracing::debug!(
            class = %name,
            parent = definition.parent().unwrap_or(""),
            properties = definition.properties().len(),
            "registered class"
        );
        self.definitions.insert(name, Rc::new(definition));
        Ok(())
    }

    /// Registers a batch of definitions, then checks their parents.
    ///
    /// `definitions` is either an object keyed by class name or an array of
    /// definitions that each carry `ClassName`. Parents may come after their
    /// children: parent references are checked only once the whole batch is
    /// registered, against every class the registry knows. A failing batch is
    /// not rolled back.
    ///
    /// Returns the number of definitions registered.
    ///
    /// # Errors
    ///
    /// - Any error of [`Self::register`] for an individual definition.
    /// - [`SchemaError::UnknownParent`] if an `Extends` target is missing.
    /// - [`SchemaError::CyclicInheritance`] if a chain loops.
    pub fn load_many(&mut self, definitions: &Value) -> Result<usize, SchemaError> {
        let mut batch = Vec::new();
        match definitions {
            Value::Object(map) => {
                for (name, definition) in map {
                    self.register(name, definition)?;
                    batch.push(name.as_str());
                }
            }
            Value::Array(items) => {
                for definition in items {
                    let name = definition
                        .get("ClassName")
                        .and_then(Value::as_str)
                        .ok_or(SchemaError::MissingClassName)?;
                    self.register(name, definition)?;
                    batch.push(name);
                }
            }
            _ => {
                return Err(SchemaError::invalid(
                    "",
                    "expected an object or an array of class definitions",
                ));
            }
        }

        // Only this batch is checked; parents may be anywhere in the registry.
        for name in &batch {
            let Some(definition) = self.definitions.get(*name) else {
                continue;
            };
            if let Some(parent) = definition.parent()
                && !self.definitions.contains_key(parent)
            {
                return Err(SchemaError::UnknownParent {
                    parent: parent.to_owned(),
                    child: definition.name().to_owned(),
                });
            }
        }
        for name in &batch {
            self.resolve_hierarchy(name)?;
        }

        let count = batch.len();
        tracing::debug!(count, total = self.definitions.len(), "loaded class batch");
        Ok(count)
    }

    /// Returns the inheritance chain of a class, ordered root to leaf.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::UnknownClass`] if `name` has no definition. A
    ///   constructor alone does not count.
    /// - [`SchemaError::UnknownParent`] if an ancestor is missing.
    /// - [`SchemaError::CyclicInheritance`] if the chain loops.
    pub fn resolve_hierarchy(&self, name: &str) -> Result<Hierarchy, SchemaError> {
        if let Some(chain) = self.hierarchies.borrow().get(name) {
            return Ok(chain.clone());
        }

        let mut current = self
            .definitions
            .get(name)
            .ok_or_else(|| SchemaError::UnknownClass {
                class: name.to_owned(),
            })?;
        let mut seen = HashSet::new();
        let mut chain = Vec::new();
        loop {
            if !seen.insert(current.name()) {
                return Err(SchemaError::CyclicInheritance {
                    class: name.to_owned(),
                });
            }
            chain.push(current.clone());
            let Some(parent) = current.parent() else {
                break;
            };
            current = self
                .definitions
                .get(parent)
                .ok_or_else(|| SchemaError::UnknownParent {
                    parent: parent.to_owned(),
                    child: current.name().to_owned(),
                })?;
        }
        chain.reverse();

        let chain: Hierarchy = chain.into();
        self.hierarchies
            .borrow_mut()
            .insert(name.to_owned(), chain.clone());
        Ok(chain)
    }

    /// Returns the merged property table of a class.
    ///
    /// Properties appear in chain order, ancestors first. A redeclared
    /// property keeps its ancestor's position but takes the descendant's
    /// definition.
    ///
    /// # Errors
    ///
    /// Any error of [`Self::resolve_hierarchy`].
    pub fn properties(&self, name: &str) -> Result<PropertyTable, SchemaError> {
        if let Some(table) = self.tables.borrow().get(name) {
            return Ok(table.clone());
        }

        let chain = self.resolve_hierarchy(name)?;
        let mut merged = IndexMap::new();
        for class in chain.iter() {
            for (property, definition) in class.properties() {
                merged.insert(property.clone(), definition.clone());
            }
        }

        let table = Rc::new(merged);
        self.tables
            .borrow_mut()
            .insert(name.to_owned(), table.clone());
        Ok(table)
    }

    /// Returns the effective definition of one property of a class.
    ///
    /// Returns `None` for an unknown class, a broken chain, or a property the
    /// chain never declares.
    #[must_use]
    pub fn get_property(&self, name: &str, property: &str) -> Option<PropertyDefinition> {
        self.properties(name).ok()?.get(property).cloned()
    }

    /// Returns `true` if `ancestor` appears in the chain of `class`.
    ///
    /// Every class is a subclass of itself.
    #[must_use]
    pub fn is_subclass_of(&self, class: &str, ancestor: &str) -> bool {
        self.resolve_hierarchy(class)
            .is_ok_and(|chain| chain.iter().any(|c| c.name() == ancestor))
    }

    /// Returns the definition registered as `name`.
    #[must_use]
    pub fn definition(&self, name: &str) -> Option<&Rc<ClassDefinition>> {
        self.definitions.get(name)
    }

    /// Returns `true` if a definition is registered as `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Returns the number of registered definitions.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns `true` if no definitions are registered.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Returns the registered class names in registration order.
    pub fn class_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.definitions.keys().map(String::as_str)
    }

    /// Binds a constructor to a class name.
    ///
    /// A class may have a constructor without a definition; such a class can
    /// be created but not resolved.
    pub fn register_constructor(
        &mut self,
        name: impl Into<String>,
        constructor: impl Fn(&Map<String, Value>) -> ModelInstance + 'static,
    ) {
        self.constructors.insert(name.into(), Rc::new(constructor));
    }

    /// Returns the constructor bound to a class name.
    #[must_use]
    pub fn constructor(&self, name: &str) -> Option<InstanceConstructor> {
        self.constructors.get(name).cloned()
    }

    /// Returns the constructor of a class, synthesizing one if none is bound.
    ///
    /// The synthesized constructor stamps the class name, copies the input
    /// fields as they are, and assigns a random `id` when the input has none.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownClass`] if there is neither a
    /// constructor nor a definition for `name`.
    pub fn ensure_constructor(&mut self, name: &str) -> Result<InstanceConstructor, SchemaError> {
        if let Some(constructor) = self.constructors.get(name) {
            return Ok(constructor.clone());
        }
        if !self.definitions.contains_key(name) {
            return Err(SchemaError::UnknownClass {
                class: name.to_owned(),
            });
        }

        let class = name.to_owned();
        let constructor: InstanceConstructor = Rc::new(move |data: &Map<String, Value>| {
            let mut instance = ModelInstance::new(class.as_str());
            for (field, value) in data {
                instance.insert(field.as_str(), ModelValue::from(value));
            }
            if instance.get("id").is_none_or(ModelValue::is_null) {
                instance.insert("id", ModelValue::String(Uuid::new_v4().to_string()));
            }
            instance
        });
        tracing::debug!(class = %name, "synthesized fallback constructor");
        self.constructors
            .insert(name.to_owned(), constructor.clone());
        Ok(constructor)
    }

    fn invalidate(&mut self, name: &str) {
        let hierarchies = self.hierarchies.get_mut();
        let stale: Vec<String> = hierarchies
            .iter()
            .filter(|(class, chain)| {
                class.as_str() == name || chain.iter().any(|c| c.name() == name)
            })
            .map(|(class, _)| class.clone())
            .collect();
        let tables = self.tables.get_mut();
        for class in &stale {
            hierarchies.remove(class);
            tables.remove(class);
        }
        tables.remove(name);
    }
}

impl core::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("count", &self.definitions.len())
            .field("classes", &self.definitions.keys().collect::<Vec<_>>())
            .field("constructors", &self.constructors.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
