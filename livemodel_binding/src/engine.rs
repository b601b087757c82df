// Copyright 2025 the Livemodel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Creating and removing bindings.

use core::cell::{Cell, RefCell};
use core::fmt;
use std::rc::Rc;

use livemodel_model::{ModelObjectFactory, ModelValue, PropertyDefinition, SchemaRegistry};
use livemodel_path::ObjectPath;
use serde_json::Value;

use crate::binding::{Binding, BindingId, BindingKind};
use crate::dependency::{Dependency, resolve_dependency};
use crate::effect::Effect;
use crate::error::{BindingError, CallbackError};
use crate::event::{BusEvent, EventKind};
use crate::observer::Observer;
use crate::set::BindingSet;
use crate::store::ModelStore;

/// The `source` recorded on model changes made by observer input.
pub const OBSERVER_SOURCE: &str = "observer";

/// Converts an observer's value before it is written to the model.
pub type Parser = Rc<dyn Fn(&ModelValue) -> Result<ModelValue, CallbackError>>;

/// Creates bindings between a [`ModelStore`] and observers, and owns them.
///
/// With a registry attached, values arriving from observers are coerced to
/// the bound property's schema type, and read-only properties refuse them.
///
/// Dropping the engine removes every binding it created.
///
/// # Example
///
/// ```rust
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// use livemodel_binding::{
///     BindingEngine, CallbackError, EventBus, ModelStore, Observer, ObserverId, ObserverInput,
/// };
/// use livemodel_model::ModelValue;
/// use livemodel_path::ObjectPath;
/// use serde_json::json;
///
/// #[derive(Default)]
/// struct Field(RefCell<Option<ModelValue>>);
///
/// impl Observer for Field {
///     fn id(&self) -> ObserverId {
///         ObserverId::new(7)
///     }
///
///     fn write(&self, _attribute: &str, value: &ModelValue) -> Result<(), CallbackError> {
///         *self.0.borrow_mut() = Some(value.clone());
///         Ok(())
///     }
/// }
///
/// let store = ModelStore::with_local_bus(ModelValue::from(&json!({ "Name": "a" })));
/// let engine = BindingEngine::new(store.clone());
/// let field = Rc::new(Field::default());
///
/// engine
///     .bind()
///     .path("RootModel.Name")
///     .observer(field.clone())
///     .two_way("change")
///     .build()
///     .unwrap();
/// assert_eq!(*field.0.borrow(), Some(ModelValue::from("a")));
///
/// store.set(&ObjectPath::parse("Name").unwrap(), "b".into(), None);
/// assert_eq!(*field.0.borrow(), Some(ModelValue::from("b")));
///
/// let input = ObserverInput::new(ObserverId::new(7), "change", "typed".into());
/// store.bus().dispatch(&input.into());
/// assert_eq!(store.to_json(), json!({ "Name": "typed" }));
/// ```
#[derive(Debug)]
pub struct BindingEngine {
    store: ModelStore,
    registry: Option<Rc<SchemaRegistry>>,
    bindings: RefCell<BindingSet>,
    next_id: Cell<u64>,
}

impl BindingEngine {
    /// Creates an engine over `store` without schema awareness.
    #[must_use]
    pub fn new(store: ModelStore) -> Self {
        Self {
            store,
            registry: None,
            bindings: RefCell::new(BindingSet::new()),
            next_id: Cell::new(0),
        }
    }

    /// Creates an engine that consults `registry` for observer writes.
    #[must_use]
    pub fn with_registry(store: ModelStore, registry: Rc<SchemaRegistry>) -> Self {
        Self {
            registry: Some(registry),
            ..Self::new(store)
        }
    }

    /// Returns the store the engine binds to.
    #[must_use]
    #[inline]
    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    /// Returns the attached registry, if any.
    #[must_use]
    pub fn registry(&self) -> Option<&Rc<SchemaRegistry>> {
        self.registry.as_ref()
    }

    /// Starts a one-way or two-way binding.
    pub fn bind(&self) -> BindingBuilder<'_> {
        BindingBuilder {
            engine: self,
            path: None,
            observer: None,
            attribute: "value".to_owned(),
            input_event: None,
            parser: None,
        }
    }

    /// Applies `effect` to `observer` whenever the property at `path`
    /// changes, starting with its current value.
    ///
    /// The binding ignores observer input, so it never writes the model.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::RootPath`] if `path` is the root.
    pub fn bind_dependent(
        &self,
        path: &ObjectPath,
        observer: Rc<dyn Observer>,
        effect: Effect,
    ) -> Result<Binding, BindingError> {
        let (Some(last), Some(object_path)) = (path.last(), path.parent()) else {
            return Err(BindingError::RootPath);
        };
        let property = last.to_string();
        let binding = self.create(BindingKind::Dependent, path.clone());

        let state = binding.downgrade();
        let target = observer.clone();
        let apply = effect.clone();
        binding.hold(self.store.bus().subscribe(
            EventKind::PropertyChanged,
            Rc::new(move |event: &BusEvent| {
                let BusEvent::PropertyChanged(change) = event else {
                    return;
                };
                if !change.targets(&object_path, &property) {
                    return;
                }
                let Some(state) = state.upgrade().filter(|state| state.is_active()) else {
                    return;
                };
                let Some(_guard) = state.begin_update() else {
                    return;
                };
                apply_effect(&apply, &*target, &change.value, state.id());
            }),
        ));

        if let Some(current) = self.store.get(path)
            && let Some(_guard) = binding.state().begin_update()
        {
            apply_effect(&effect, &*observer, &current, binding.id());
        }
        Ok(self.adopt(binding))
    }

    /// Binds a configuration flag declared on the property at `declaring`.
    ///
    /// A literal boolean is applied to `observer` once and creates no
    /// binding. A `${...}` expression creates a dependent binding on the
    /// property it names. Any other value is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::Path`] for a malformed expression.
    pub fn bind_dependency(
        &self,
        config: &Value,
        declaring: &ObjectPath,
        observer: Rc<dyn Observer>,
        effect: Effect,
    ) -> Result<Option<Binding>, BindingError> {
        match resolve_dependency(config, declaring)? {
            None => Ok(None),
            Some(Dependency::Static(flag)) => {
                if let Err(err) = effect.apply(&*observer, &ModelValue::Bool(flag)) {
                    tracing::warn!(path = %declaring, error = %err, "static effect failed");
                }
                Ok(None)
            }
            Some(Dependency::Watch(target)) => self
                .bind_dependent(target.path(), observer, effect)
                .map(Some),
        }
    }

    /// Calls `callback` with the store and the changed path on every model
    /// change.
    ///
    /// Changes the callback makes to the store do not re-enter it.
    pub fn bind_component(
        &self,
        callback: impl Fn(&ModelStore, &ObjectPath) -> Result<(), CallbackError> + 'static,
    ) -> Binding {
        let binding = self.create(BindingKind::Component, ObjectPath::root());
        let state = binding.downgrade();
        let store = self.store.clone();
        binding.hold(self.store.bus().subscribe(
            EventKind::PropertyChanged,
            Rc::new(move |event: &BusEvent| {
                let BusEvent::PropertyChanged(change) = event else {
                    return;
                };
                let Some(state) = state.upgrade().filter(|state| state.is_active()) else {
                    return;
                };
                let Some(_guard) = state.begin_update() else {
                    return;
                };
                if let Err(err) = callback(&store, &change.path) {
                    tracing::warn!(
                        binding = state.id().get(),
                        path = %change.path,
                        error = %err,
                        "component callback failed"
                    );
                }
            }),
        ));
        self.adopt(binding)
    }

    /// Removes one binding. Returns `false` if it was already removed.
    pub fn remove_binding(&self, binding: &Binding) -> bool {
        self.bindings.borrow_mut().remove(binding)
    }

    /// Removes every binding this engine created. Calling this again is a
    /// no-op.
    pub fn remove_bindings(&self) {
        self.bindings.borrow_mut().remove_bindings();
    }

    /// Returns the number of bindings this engine holds.
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.bindings.borrow().len()
    }

    fn create(&self, kind: BindingKind, path: ObjectPath) -> Binding {
        let id = BindingId::new(self.next_id.get());
        self.next_id.set(id.get() + 1);
        Binding::new(id, kind, path, self.store.bus().clone())
    }

    fn adopt(&self, binding: Binding) -> Binding {
        tracing::debug!(
            binding = binding.id().get(),
            kind = ?binding.kind(),
            path = %binding.path(),
            "binding created"
        );
        self.bindings.borrow_mut().insert(binding.clone());
        binding
    }
}

/// Configures a one-way or two-way binding.
///
/// Created by [`BindingEngine::bind`]. A path and an observer are required.
pub struct BindingBuilder<'e> {
    engine: &'e BindingEngine,
    path: Option<String>,
    observer: Option<Rc<dyn Observer>>,
    attribute: String,
    input_event: Option<String>,
    parser: Option<Parser>,
}

impl BindingBuilder<'_> {
    /// Sets the model path, with or without the root marker.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the observer that shows the value.
    #[must_use]
    pub fn observer(mut self, observer: Rc<dyn Observer>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Sets the observer attribute values are written through. Defaults to
    /// `"value"`.
    #[must_use]
    pub fn attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = attribute.into();
        self
    }

    /// Makes the binding two-way: observer input named `event` writes back
    /// to the model.
    #[must_use]
    pub fn two_way(mut self, event: impl Into<String>) -> Self {
        self.input_event = Some(event.into());
        self
    }

    /// Sets the conversion applied to observer values before they are
    /// written, replacing the schema coercion.
    #[must_use]
    pub fn parser(
        mut self,
        parser: impl Fn(&ModelValue) -> Result<ModelValue, CallbackError> + 'static,
    ) -> Self {
        self.parser = Some(Rc::new(parser));
        self
    }

    /// Creates the binding and pushes the current model value to the
    /// observer.
    ///
    /// # Errors
    ///
    /// - [`BindingError::MissingInput`] without a path or an observer.
    /// - [`BindingError::Path`] for malformed path text.
    /// - [`BindingError::RootPath`] if the path is the root.
    pub fn build(self) -> Result<Binding, BindingError> {
        let text = self.path.ok_or(BindingError::MissingInput("path"))?;
        let observer = self.observer.ok_or(BindingError::MissingInput("observer"))?;
        let path = ObjectPath::parse(&text)?;
        let (Some(last), Some(object_path)) = (path.last(), path.parent()) else {
            return Err(BindingError::RootPath);
        };
        let property = last.to_string();

        let engine = self.engine;
        let kind = if self.input_event.is_some() {
            BindingKind::TwoWay
        } else {
            BindingKind::OneWay
        };
        let binding = engine.create(kind, path.clone());
        let attribute: Rc<str> = self.attribute.into();

        let state = binding.downgrade();
        let target = observer.clone();
        let channel = attribute.clone();
        binding.hold(engine.store.bus().subscribe(
            EventKind::PropertyChanged,
            Rc::new(move |event: &BusEvent| {
                let BusEvent::PropertyChanged(change) = event else {
                    return;
                };
                if !change.targets(&object_path, &property) {
                    return;
                }
                let Some(state) = state.upgrade().filter(|state| state.is_active()) else {
                    return;
                };
                let Some(_guard) = state.begin_update() else {
                    tracing::trace!(binding = state.id().get(), "echo suppressed");
                    return;
                };
                push(&*target, &channel, &change.value, state.id());
            }),
        ));

        if let Some(input_event) = self.input_event {
            let state = binding.downgrade();
            let writer = Writer {
                store: engine.store.clone(),
                registry: engine.registry.clone(),
                parser: self.parser,
                path: path.clone(),
            };
            let observer_id = observer.id();
            binding.hold(engine.store.bus().subscribe(
                EventKind::ObserverInput,
                Rc::new(move |event: &BusEvent| {
                    let BusEvent::ObserverInput(input) = event else {
                        return;
                    };
                    if input.observer != observer_id || input.event != input_event {
                        return;
                    }
                    let Some(state) = state.upgrade().filter(|state| state.is_active()) else {
                        return;
                    };
                    let Some(_guard) = state.begin_update() else {
                        return;
                    };
                    writer.write(&input.value, state.id());
                }),
            ));
        }

        if let Some(current) = engine.store.get(&path)
            && let Some(_guard) = binding.state().begin_update()
        {
            push(&*observer, &attribute, &current, binding.id());
        }
        Ok(engine.adopt(binding))
    }
}

impl fmt::Debug for BindingBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingBuilder")
            .field("path", &self.path)
            .field("observer", &self.observer.as_ref().map(|o| o.id()))
            .field("attribute", &self.attribute)
            .field("input_event", &self.input_event)
            .field("parser", &self.parser.is_some())
            .finish_non_exhaustive()
    }
}

/// The observer-to-model half of a two-way binding.
struct Writer {
    store: ModelStore,
    registry: Option<Rc<SchemaRegistry>>,
    parser: Option<Parser>,
    path: ObjectPath,
}

impl Writer {
    fn write(&self, raw: &ModelValue, binding: BindingId) {
        let definition = self.definition();
        if definition.as_ref().is_some_and(PropertyDefinition::is_read_only) {
            tracing::warn!(
                binding = binding.get(),
                path = %self.path,
                "refusing observer write to read-only property"
            );
            return;
        }

        let value = match (&self.parser, &self.registry, &definition) {
            (Some(parser), _, _) => match parser(raw) {
                Ok(value) => value,
                Err(err) => {
                    tracing::warn!(
                        binding = binding.get(),
                        path = %self.path,
                        error = %err,
                        "observer value rejected by parser"
                    );
                    return;
                }
            },
            (None, Some(registry), Some(definition)) => self.coerce(registry, definition, raw),
            (None, _, _) => raw.clone(),
        };

        if !self.store.set(&self.path, value, Some(OBSERVER_SOURCE)) {
            tracing::debug!(binding = binding.get(), path = %self.path, "observer write target unreachable");
        }
    }

    /// Looks up the schema of the bound property through the class of the
    /// instance currently holding it.
    fn definition(&self) -> Option<PropertyDefinition> {
        let registry = self.registry.as_ref()?;
        let holder = self.path.parent()?;
        let class = self.store.class_of(&holder)?;
        registry.get_property(&class, self.path.last()?.name())
    }

    fn coerce(
        &self,
        registry: &SchemaRegistry,
        definition: &PropertyDefinition,
        raw: &ModelValue,
    ) -> ModelValue {
        let factory = ModelObjectFactory::new(registry);
        let raw = raw.to_json();
        let Some(last) = self.path.last() else {
            return factory.coerce_value("", definition, &raw);
        };
        if !(last.index().is_some() && definition.is_array()) {
            return factory.coerce_value(last.name(), definition, &raw);
        }
        match factory.coerce_value(last.name(), definition, &Value::Array(vec![raw])) {
            ModelValue::Array(mut items) if items.len() == 1 => items.pop().unwrap_or_default(),
            other => other,
        }
    }
}

fn push(observer: &dyn Observer, attribute: &str, value: &ModelValue, binding: BindingId) {
    if let Err(err) = observer.write(attribute, value) {
        tracing::warn!(
            binding = binding.get(),
            observer = observer.id().get(),
            attribute,
            error = %err,
            "observer write failed"
        );
    }
}

fn apply_effect(effect: &Effect, observer: &dyn Observer, value: &ModelValue, binding: BindingId) {
    if let Err(err) = effect.apply(observer, value) {
        tracing::warn!(
            binding = binding.get(),
            observer = observer.id().get(),
            error = %err,
            "effect failed"
        );
    }
}
