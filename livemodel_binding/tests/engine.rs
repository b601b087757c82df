// Copyright 2025 the Livemodel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end propagation through a store, a bus and bindings.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use livemodel_binding::{
    BindingEngine, BindingError, BindingKind, BusEvent, CallbackError, Effect, EventBus,
    EventKind, LocalEventBus, ModelStore, Observer, ObserverId, ObserverInput, OBSERVER_SOURCE,
};
use livemodel_model::{ModelObjectFactory, ModelValue, SchemaRegistry};
use livemodel_path::ObjectPath;
use serde_json::{Value, json};

#[derive(Default)]
struct Spy {
    id: u64,
    writes: RefCell<Vec<(String, ModelValue)>>,
    fail: bool,
}

impl Spy {
    fn new(id: u64) -> Rc<Self> {
        Rc::new(Self {
            id,
            ..Self::default()
        })
    }

    fn failing(id: u64) -> Rc<Self> {
        Rc::new(Self {
            id,
            fail: true,
            ..Self::default()
        })
    }

    fn values(&self, attribute: &str) -> Vec<ModelValue> {
        self.writes
            .borrow()
            .iter()
            .filter(|(name, _)| name == attribute)
            .map(|(_, value)| value.clone())
            .collect()
    }

    fn input(&self, store: &ModelStore, event: &str, value: ModelValue) {
        store
            .bus()
            .dispatch(&ObserverInput::new(ObserverId::new(self.id), event, value).into());
    }
}

impl Observer for Spy {
    fn id(&self) -> ObserverId {
        ObserverId::new(self.id)
    }

    fn write(&self, attribute: &str, value: &ModelValue) -> Result<(), CallbackError> {
        self.writes
            .borrow_mut()
            .push((attribute.to_owned(), value.clone()));
        if self.fail {
            return Err("observer detached".into());
        }
        Ok(())
    }
}

fn path(text: &str) -> ObjectPath {
    ObjectPath::parse(text).unwrap()
}

/// Counts `PropertyChanged` events and records their sources.
fn change_log(store: &ModelStore) -> Rc<RefCell<Vec<Option<String>>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    store.bus().subscribe(
        EventKind::PropertyChanged,
        Rc::new(move |event: &BusEvent| {
            if let BusEvent::PropertyChanged(change) = event {
                sink.borrow_mut().push(change.source.clone());
            }
        }),
    );
    log
}

fn registry() -> Rc<SchemaRegistry> {
    let mut registry = SchemaRegistry::new();
    registry
        .load_many(&json!({
            "Parameter": {
                "Properties": {
                    "Id": { "Type": "string", "IsPrimitive": true, "ReadOnly": true },
                    "Use": { "Type": "boolean", "IsPrimitive": true, "DefaultValue": false },
                    "Min": { "Type": "number", "IsPrimitive": true, "DefaultValue": 0 }
                }
            },
            "Model": {
                "Properties": {
                    "Name": { "Type": "string", "IsPrimitive": true },
                    "Tags": { "Type": "integer", "IsPrimitive": true, "IsArray": true },
                    "Parameters": { "Type": "Parameter", "IsArray": true }
                }
            }
        }))
        .unwrap();
    Rc::new(registry)
}

fn schema_store(registry: &SchemaRegistry, data: &Value) -> ModelStore {
    let model = ModelObjectFactory::new(registry)
        .construct("Model", data)
        .unwrap();
    ModelStore::with_local_bus(model.into())
}

#[test]
fn two_way_input_does_not_echo() {
    let store = ModelStore::with_local_bus(ModelValue::from(&json!({ "Name": "a" })));
    let engine = BindingEngine::new(store.clone());
    let spy = Spy::new(1);
    let changes = change_log(&store);

    let binding = engine
        .bind()
        .path("RootModel.Name")
        .observer(spy.clone())
        .two_way("change")
        .build()
        .unwrap();
    assert_eq!(binding.kind(), BindingKind::TwoWay);
    assert_eq!(spy.values("value"), [ModelValue::from("a")]);

    spy.input(&store, "change", "b".into());
    assert_eq!(store.to_json(), json!({ "Name": "b" }));
    assert_eq!(*changes.borrow(), [Some(OBSERVER_SOURCE.to_owned())]);
    assert_eq!(
        spy.values("value"),
        [ModelValue::from("a")],
        "the observer's own input must not be written back to it"
    );
    assert!(!binding.is_updating());

    store.set(&path("Name"), "c".into(), None);
    assert_eq!(spy.values("value").last(), Some(&ModelValue::from("c")));
}

#[test]
fn one_way_ignores_observer_input() {
    let store = ModelStore::with_local_bus(ModelValue::from(&json!({ "Name": "a" })));
    let engine = BindingEngine::new(store.clone());
    let spy = Spy::new(1);
    let binding = engine
        .bind()
        .path("Name")
        .observer(spy.clone())
        .attribute("text")
        .build()
        .unwrap();
    assert_eq!(binding.kind(), BindingKind::OneWay);

    spy.input(&store, "change", "typed".into());
    assert_eq!(store.to_json(), json!({ "Name": "a" }));
    assert_eq!(spy.values("text"), [ModelValue::from("a")]);
}

#[test]
fn input_filters_by_observer_and_event() {
    let store = ModelStore::with_local_bus(ModelValue::from(&json!({ "Name": "a" })));
    let engine = BindingEngine::new(store.clone());
    let spy = Spy::new(1);
    let other = Spy::new(2);
    engine
        .bind()
        .path("Name")
        .observer(spy.clone())
        .two_way("change")
        .build()
        .unwrap();

    other.input(&store, "change", "from other".into());
    spy.input(&store, "input", "wrong event".into());
    assert_eq!(store.to_json(), json!({ "Name": "a" }));
}

#[test]
fn observer_input_is_coerced_to_schema_type() {
    let registry = registry();
    let store = schema_store(
        &registry,
        &json!({ "Name": "m", "Tags": [1, 2], "Parameters": [{ "Id": "p0", "Min": 1 }] }),
    );
    let engine = BindingEngine::with_registry(store.clone(), registry);
    let min = Spy::new(1);
    let tag = Spy::new(2);
    engine
        .bind()
        .path("Parameters[0].Min")
        .observer(min.clone())
        .two_way("change")
        .build()
        .unwrap();
    engine
        .bind()
        .path("Tags[1]")
        .observer(tag.clone())
        .two_way("change")
        .build()
        .unwrap();

    min.input(&store, "change", "5".into());
    tag.input(&store, "change", "7.9".into());
    assert_eq!(store.get(&path("Parameters[0].Min")), Some(ModelValue::from(5_i64)));
    assert_eq!(store.get(&path("Tags[1]")), Some(ModelValue::from(7_i64)));
}

#[test]
fn read_only_properties_refuse_observer_writes() {
    let registry = registry();
    let store = schema_store(&registry, &json!({ "Parameters": [{ "Id": "p0" }] }));
    let engine = BindingEngine::with_registry(store.clone(), registry);
    let spy = Spy::new(1);
    let changes = change_log(&store);
    let binding = engine
        .bind()
        .path("Parameters[0].Id")
        .observer(spy.clone())
        .two_way("change")
        .build()
        .unwrap();

    spy.input(&store, "change", "renamed".into());
    assert_eq!(store.get(&path("Parameters[0].Id")), Some(ModelValue::from("p0")));
    assert!(changes.borrow().is_empty());
    assert!(binding.is_active());

    assert!(store.set(&path("Parameters[0].Id"), "p1".into(), Some("loader")));
    assert_eq!(spy.values("value").last(), Some(&ModelValue::from("p1")));
}

#[test]
fn parser_replaces_coercion_and_failures_are_contained() {
    let store = ModelStore::with_local_bus(ModelValue::from(&json!({ "Name": "a" })));
    let engine = BindingEngine::new(store.clone());
    let spy = Spy::new(1);
    let binding = engine
        .bind()
        .path("Name")
        .observer(spy.clone())
        .two_way("change")
        .parser(|value| match value.as_str() {
            Some(text) if !text.is_empty() => Ok(ModelValue::from(text.to_uppercase())),
            _ => Err("name must not be empty".into()),
        })
        .build()
        .unwrap();

    spy.input(&store, "change", "b".into());
    assert_eq!(store.to_json(), json!({ "Name": "B" }));

    spy.input(&store, "change", "".into());
    assert_eq!(store.to_json(), json!({ "Name": "B" }));
    assert!(binding.is_active());
    assert!(!binding.is_updating());

    spy.input(&store, "change", "c".into());
    assert_eq!(store.to_json(), json!({ "Name": "C" }));
}

#[test]
fn observer_failures_do_not_stop_other_bindings() {
    let store = ModelStore::with_local_bus(ModelValue::from(&json!({ "Name": "a" })));
    let engine = BindingEngine::new(store.clone());
    let broken = Spy::failing(1);
    let healthy = Spy::new(2);
    let first = engine.bind().path("Name").observer(broken.clone()).build().unwrap();
    engine.bind().path("Name").observer(healthy.clone()).build().unwrap();

    store.set(&path("Name"), "b".into(), None);
    assert_eq!(broken.values("value").len(), 2);
    assert_eq!(healthy.values("value"), [ModelValue::from("a"), ModelValue::from("b")]);
    assert!(first.is_active());
}

#[test]
fn dependency_expression_drives_editable_state() {
    let registry = registry();
    let store = schema_store(
        &registry,
        &json!({ "Parameters": [{ "Id": "p0", "Use": false, "Min": 1 }] }),
    );
    let engine = BindingEngine::with_registry(store.clone(), registry);
    let field = Spy::new(1);
    let changes = change_log(&store);

    let binding = engine
        .bind_dependency(
            &json!("${Use}"),
            &path("Parameters[0].Min"),
            field.clone(),
            Effect::editable(),
        )
        .unwrap()
        .unwrap();
    assert_eq!(binding.kind(), BindingKind::Dependent);
    assert_eq!(binding.path(), &path("Parameters[0].Use"));
    assert_eq!(field.values("disabled"), [ModelValue::Bool(true)]);

    store.set(&path("Parameters[0].Use"), true.into(), None);
    assert_eq!(field.values("disabled"), [ModelValue::Bool(true), ModelValue::Bool(false)]);
    assert_eq!(
        field.values("class:non-editable"),
        [ModelValue::Bool(true), ModelValue::Bool(false)]
    );

    // Unrelated properties and observer input leave the effect alone.
    store.set(&path("Parameters[0].Min"), 3_i64.into(), None);
    field.input(&store, "change", 9_i64.into());
    assert_eq!(field.values("disabled").len(), 2);
    assert_eq!(changes.borrow().len(), 2);
    assert_eq!(store.get(&path("Parameters[0].Min")), Some(ModelValue::from(3_i64)));
}

#[test]
fn static_dependency_applies_once_without_binding() {
    let store = ModelStore::with_local_bus(ModelValue::from(&json!({ "Flag": true })));
    let engine = BindingEngine::new(store.clone());
    let field = Spy::new(1);

    let binding = engine
        .bind_dependency(&json!(false), &path("Value"), field.clone(), Effect::visible())
        .unwrap();
    assert!(binding.is_none());
    assert_eq!(field.values("visible"), [ModelValue::Bool(false)]);
    assert_eq!(engine.binding_count(), 0);

    assert!(
        engine
            .bind_dependency(&json!("Flag"), &path("Value"), field.clone(), Effect::visible())
            .unwrap()
            .is_none()
    );
    assert!(matches!(
        engine.bind_dependency(&json!("${A[x]}"), &path("Value"), field, Effect::visible()),
        Err(BindingError::Path(_))
    ));
}

#[test]
fn component_callbacks_see_every_change_once() {
    let store = ModelStore::with_local_bus(ModelValue::from(&json!({ "A": 0, "Count": 0 })));
    let engine = BindingEngine::new(store.clone());
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = seen.clone();

    engine.bind_component(|_, _| Err("layout failed".into()));
    engine.bind_component(move |store, changed| {
        log.borrow_mut().push(changed.to_string());
        let count = store
            .get(&ObjectPath::root().child("Count"))
            .and_then(|value| value.as_i64())
            .unwrap_or_default();
        store.set(&ObjectPath::root().child("Count"), (count + 1).into(), Some("component"));
        Ok(())
    });

    store.set(&path("A"), 1_i64.into(), None);
    assert_eq!(*seen.borrow(), ["RootModel.A"]);
    assert_eq!(store.get(&path("Count")), Some(ModelValue::from(1_i64)));
}

#[test]
fn removal_is_idempotent_and_follows_the_engine() {
    let bus = Rc::new(LocalEventBus::new());
    let store = ModelStore::new(ModelValue::from(&json!({ "Name": "a", "Use": true })), bus.clone());
    let spy = Spy::new(1);
    {
        let engine = BindingEngine::new(store.clone());
        let name = engine
            .bind()
            .path("Name")
            .observer(spy.clone())
            .two_way("change")
            .build()
            .unwrap();
        engine
            .bind_dependent(&path("Use"), spy.clone(), Effect::visible())
            .unwrap();
        engine.bind_component(|_, _| Ok(()));
        assert_eq!(engine.binding_count(), 3);
        assert_eq!(bus.subscriber_count(), 4);

        assert!(engine.remove_binding(&name));
        assert!(!engine.remove_binding(&name));
        assert!(!name.is_active());
        assert_eq!(bus.subscriber_count(), 2);
        store.set(&path("Name"), "b".into(), None);
        assert_eq!(spy.values("value"), [ModelValue::from("a")]);

        let _keep = engine.bind().path("Name").observer(spy.clone()).build().unwrap();
    }
    assert_eq!(bus.subscriber_count(), 0);

    let engine = BindingEngine::new(store.clone());
    engine.bind().path("Name").observer(spy.clone()).build().unwrap();
    engine.remove_bindings();
    engine.remove_bindings();
    assert_eq!(engine.binding_count(), 0);
    assert_eq!(bus.subscriber_count(), 0);
}

#[test]
fn invalid_bindings_are_rejected_without_subscribing() {
    let bus = Rc::new(LocalEventBus::new());
    let store = ModelStore::new(ModelValue::from(&json!({ "Name": "a" })), bus.clone());
    let engine = BindingEngine::new(store);
    let spy = Spy::new(1);

    assert_eq!(
        engine.bind().path("Name").build().unwrap_err(),
        BindingError::MissingInput("observer")
    );
    assert_eq!(
        engine.bind().observer(spy.clone()).build().unwrap_err(),
        BindingError::MissingInput("path")
    );
    assert_eq!(
        engine.bind().path("RootModel").observer(spy.clone()).build().unwrap_err(),
        BindingError::RootPath
    );
    assert!(matches!(
        engine.bind().path("Name[").observer(spy.clone()).build(),
        Err(BindingError::Path(_))
    ));
    assert_eq!(
        engine
            .bind_dependent(&ObjectPath::root(), spy, Effect::editable())
            .unwrap_err(),
        BindingError::RootPath
    );
    assert_eq!(bus.subscriber_count(), 0);
    assert_eq!(engine.binding_count(), 0);
}

#[test]
fn missing_values_skip_initial_sync() {
    let store = ModelStore::with_local_bus(ModelValue::from(&json!({})));
    let engine = BindingEngine::new(store.clone());
    let spy = Spy::new(1);
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    engine
        .bind_dependent(
            &path("Later"),
            spy.clone(),
            Effect::custom(move |_, _| {
                counter.set(counter.get() + 1);
                Ok(())
            }),
        )
        .unwrap();
    engine.bind().path("Later").observer(spy.clone()).build().unwrap();
    assert_eq!(calls.get(), 0);
    assert!(spy.writes.borrow().is_empty());

    store.set(&path("Later"), 1_i64.into(), None);
    assert_eq!(calls.get(), 1);
    assert_eq!(spy.values("value"), [ModelValue::from(1_i64)]);
}
