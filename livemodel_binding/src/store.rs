// Copyright 2025 the Livemodel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The shared, observable model root.

use core::cell::RefCell;
use core::fmt;
use std::rc::Rc;

use livemodel_model::ModelValue;
use livemodel_path::{ObjectPath, get, set};
use serde_json::Value;

use crate::event::{BusEvent, EventBus, LocalEventBus, PropertyChanged};

/// A model root paired with the bus its changes are announced on.
///
/// Clones share the same root and bus. Every successful [`ModelStore::set`]
/// dispatches a [`PropertyChanged`] before it returns, and no borrow of the
/// root is held while handlers run, so handlers may read and write the store.
#[derive(Clone)]
pub struct ModelStore {
    root: Rc<RefCell<ModelValue>>,
    bus: Rc<dyn EventBus>,
}

impl ModelStore {
    /// Creates a store over `root` announcing on `bus`.
    #[must_use]
    pub fn new(root: ModelValue, bus: Rc<dyn EventBus>) -> Self {
        Self {
            root: Rc::new(RefCell::new(root)),
            bus,
        }
    }

    /// Creates a store with its own [`LocalEventBus`].
    #[must_use]
    pub fn with_local_bus(root: ModelValue) -> Self {
        Self::new(root, Rc::new(LocalEventBus::new()))
    }

    /// Returns the bus changes are announced on.
    #[must_use]
    #[inline]
    pub fn bus(&self) -> &Rc<dyn EventBus> {
        &self.bus
    }

    /// Returns a copy of the value at `path`.
    #[must_use]
    pub fn get(&self, path: &ObjectPath) -> Option<ModelValue> {
        get(&*self.root.borrow(), path).cloned()
    }

    /// Runs `f` with the model root.
    ///
    /// `f` must not write to this store.
    pub fn with_root<R>(&self, f: impl FnOnce(&ModelValue) -> R) -> R {
        f(&self.root.borrow())
    }

    /// Returns the class of the instance at `path`, if an instance is there.
    #[must_use]
    pub fn class_of(&self, path: &ObjectPath) -> Option<String> {
        let root = self.root.borrow();
        get(&*root, path)
            .and_then(ModelValue::as_instance)
            .map(|instance| instance.class_name().to_owned())
    }

    /// Assigns `value` at `path` and announces the change.
    ///
    /// Returns `false`, announcing nothing, if the path is unreachable or is
    /// the root.
    pub fn set(&self, path: &ObjectPath, value: ModelValue, source: Option<&str>) -> bool {
        let (Some(last), Some(object_path)) = (path.last(), path.parent()) else {
            return false;
        };

        let old_value = {
            let mut root = self.root.borrow_mut();
            let old_value = get(&*root, path).cloned();
            if !set(&mut *root, path, value.clone()) {
                tracing::debug!(%path, "assignment target unreachable");
                return false;
            }
            old_value
        };

        tracing::trace!(%path, source = source.unwrap_or(""), "model changed");
        self.bus.dispatch(&BusEvent::PropertyChanged(PropertyChanged {
            object_path,
            property: last.to_string(),
            path: path.clone(),
            value,
            old_value,
            source: source.map(str::to_owned),
        }));
        true
    }

    /// Returns the model as plain JSON.
    #[must_use]
    pub fn to_json(&self) -> Value {
        self.root.borrow().to_json()
    }
}

impl fmt::Debug for ModelStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelStore")
            .field("root", &self.root.borrow())
            .finish_non_exhaustive()
    }
}
