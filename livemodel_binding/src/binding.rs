// Copyright 2025 the Livemodel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Binding handles and the per-binding update guard.

use core::cell::{Cell, RefCell};
use core::fmt;
use std::rc::{Rc, Weak};

use livemodel_path::ObjectPath;
use smallvec::SmallVec;

use crate::event::{EventBus, SubscriptionId};

/// Identifies a binding within its engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(u64);

impl BindingId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[must_use]
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// What a binding synchronizes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BindingKind {
    /// Model property → observer attribute.
    OneWay,
    /// Model property ↔ observer attribute.
    TwoWay,
    /// Model property → effect on an observer. Never writes the model.
    Dependent,
    /// Any model change → callback.
    Component,
}

pub(crate) struct BindingState {
    id: BindingId,
    kind: BindingKind,
    path: ObjectPath,
    active: Cell<bool>,
    updating: Cell<bool>,
    subscriptions: RefCell<SmallVec<[SubscriptionId; 2]>>,
    bus: Rc<dyn EventBus>,
}

impl BindingState {
    pub(crate) fn id(&self) -> BindingId {
        self.id
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Sets the guard for the duration of one propagation. `None` while a
    /// propagation through this binding is already running.
    pub(crate) fn begin_update(&self) -> Option<UpdateGuard<'_>> {
        if self.updating.replace(true) {
            return None;
        }
        Some(UpdateGuard {
            flag: &self.updating,
        })
    }
}

/// Clears the update flag on drop, so every exit path releases it,
/// unwinding included.
pub(crate) struct UpdateGuard<'a> {
    flag: &'a Cell<bool>,
}

impl Drop for UpdateGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

/// A live binding.
///
/// Bindings are created by [`BindingEngine`](crate::BindingEngine) and stay
/// active until removed. Removal is final: a removed binding never fires
/// again and cannot be reactivated. Clones refer to the same binding.
#[derive(Clone)]
pub struct Binding {
    state: Rc<BindingState>,
}

impl Binding {
    pub(crate) fn new(id: BindingId, kind: BindingKind, path: ObjectPath, bus: Rc<dyn EventBus>) -> Self {
        Self {
            state: Rc::new(BindingState {
                id,
                kind,
                path,
                active: Cell::new(true),
                updating: Cell::new(false),
                subscriptions: RefCell::new(SmallVec::new()),
                bus,
            }),
        }
    }

    pub(crate) fn state(&self) -> &BindingState {
        &self.state
    }

    pub(crate) fn downgrade(&self) -> Weak<BindingState> {
        Rc::downgrade(&self.state)
    }

    pub(crate) fn hold(&self, subscription: SubscriptionId) {
        self.state.subscriptions.borrow_mut().push(subscription);
    }

    /// Returns the binding's identifier.
    #[must_use]
    #[inline]
    pub fn id(&self) -> BindingId {
        self.state.id
    }

    /// Returns what the binding synchronizes.
    #[must_use]
    #[inline]
    pub fn kind(&self) -> BindingKind {
        self.state.kind
    }

    /// Returns the bound model path. Component bindings report the root.
    #[must_use]
    #[inline]
    pub fn path(&self) -> &ObjectPath {
        &self.state.path
    }

    /// Returns `true` until the binding is removed.
    #[must_use]
    #[inline]
    pub fn is_active(&self) -> bool {
        self.state.active.get()
    }

    /// Returns `true` while a change is propagating through this binding.
    #[must_use]
    #[inline]
    pub fn is_updating(&self) -> bool {
        self.state.updating.get()
    }

    /// Unsubscribes the binding and marks it removed.
    ///
    /// Returns `false` if it was already removed.
    pub fn remove(&self) -> bool {
        if !self.state.active.replace(false) {
            return false;
        }
        let subscriptions = core::mem::take(&mut *self.state.subscriptions.borrow_mut());
        for subscription in subscriptions {
            self.state.bus.unsubscribe(subscription);
        }
        tracing::debug!(binding = self.state.id.0, kind = ?self.state.kind, "binding removed");
        true
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("id", &self.state.id)
            .field("kind", &self.state.kind)
            .field("path", &self.state.path)
            .field("active", &self.state.active.get())
            .finish_non_exhaustive()
    }
}
