// Copyright 2025 the Livemodel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change notifications and the bus that carries them.
//!
//! Bindings never talk to the model or to observers directly about changes;
//! everything flows through an [`EventBus`]. Any bus works as long as it
//! delivers synchronously: a dispatch must reach every subscriber before
//! [`EventBus::dispatch`] returns. [`LocalEventBus`] is a minimal in-process
//! implementation.

use core::cell::{Cell, RefCell};
use core::fmt;
use std::rc::Rc;

use livemodel_model::ModelValue;
use livemodel_path::ObjectPath;
use smallvec::SmallVec;

use crate::observer::ObserverId;

/// The kinds of event a handler can subscribe to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A model property was assigned.
    PropertyChanged,
    /// An observer reported an interaction.
    ObserverInput,
}

/// A model property was assigned.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyChanged {
    /// The object holding the property.
    pub object_path: ObjectPath,
    /// The property's final path segment, including any index.
    pub property: String,
    /// The full path that was assigned.
    pub path: ObjectPath,
    /// The new value.
    pub value: ModelValue,
    /// The value before the assignment, if there was one.
    pub old_value: Option<ModelValue>,
    /// Who made the change, if known.
    pub source: Option<String>,
}

impl PropertyChanged {
    /// Returns `true` if this change assigned `property` on `object_path`.
    ///
    /// Paths compare without regard to how the root marker was written.
    #[must_use]
    pub fn targets(&self, object_path: &ObjectPath, property: &str) -> bool {
        self.property == property && &self.object_path == object_path
    }
}

/// An observer reported an interaction carrying a new value.
#[derive(Clone, Debug, PartialEq)]
pub struct ObserverInput {
    /// The observer that raised the event.
    pub observer: ObserverId,
    /// The interaction, such as `"change"` or `"input"`.
    pub event: String,
    /// The value the observer now shows.
    pub value: ModelValue,
}

impl ObserverInput {
    /// Creates an observer input event.
    #[must_use]
    pub fn new(observer: ObserverId, event: impl Into<String>, value: ModelValue) -> Self {
        Self {
            observer,
            event: event.into(),
            value,
        }
    }
}

/// An event carried by an [`EventBus`].
#[derive(Clone, Debug, PartialEq)]
pub enum BusEvent {
    /// See [`PropertyChanged`].
    PropertyChanged(PropertyChanged),
    /// See [`ObserverInput`].
    ObserverInput(ObserverInput),
}

impl BusEvent {
    /// Returns the kind used to route this event.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::PropertyChanged(_) => EventKind::PropertyChanged,
            Self::ObserverInput(_) => EventKind::ObserverInput,
        }
    }
}

impl From<PropertyChanged> for BusEvent {
    fn from(event: PropertyChanged) -> Self {
        Self::PropertyChanged(event)
    }
}

impl From<ObserverInput> for BusEvent {
    fn from(event: ObserverInput) -> Self {
        Self::ObserverInput(event)
    }
}

/// Handle for removing a subscription.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A subscribed event handler.
pub type EventHandler = Rc<dyn Fn(&BusEvent)>;

/// A synchronous publish/subscribe channel.
pub trait EventBus {
    /// Delivers `event` to every handler subscribed to its kind, in
    /// subscription order, before returning.
    fn dispatch(&self, event: &BusEvent);

    /// Subscribes `handler` to events of `kind`.
    fn subscribe(&self, kind: EventKind, handler: EventHandler) -> SubscriptionId;

    /// Removes a subscription. Returns `false` if it was already gone.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

struct Subscriber {
    id: SubscriptionId,
    kind: EventKind,
    handler: EventHandler,
}

/// An in-process [`EventBus`].
///
/// Handlers may subscribe, unsubscribe and dispatch from inside a delivery.
/// A delivery goes to the handlers subscribed when it started; handlers added
/// meanwhile see only later events.
///
/// # Example
///
/// ```rust
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// use livemodel_binding::{BusEvent, EventBus, EventKind, LocalEventBus, ObserverId, ObserverInput};
/// use livemodel_model::ModelValue;
///
/// let bus = LocalEventBus::new();
/// let seen = Rc::new(Cell::new(0));
/// let counter = seen.clone();
/// let id = bus.subscribe(
///     EventKind::ObserverInput,
///     Rc::new(move |_: &BusEvent| counter.set(counter.get() + 1)),
/// );
///
/// let input = ObserverInput::new(ObserverId::new(1), "change", ModelValue::Null);
/// bus.dispatch(&input.clone().into());
/// assert!(bus.unsubscribe(id));
/// bus.dispatch(&input.into());
/// assert_eq!(seen.get(), 1);
/// ```
#[derive(Default)]
pub struct LocalEventBus {
    subscribers: RefCell<Vec<Subscriber>>,
    next_id: Cell<u64>,
}

impl LocalEventBus {
    /// Creates a bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}

impl EventBus for LocalEventBus {
    fn dispatch(&self, event: &BusEvent) {
        let kind = event.kind();
        let handlers: SmallVec<[EventHandler; 8]> = self
            .subscribers
            .borrow()
            .iter()
            .filter(|subscriber| subscriber.kind == kind)
            .map(|subscriber| subscriber.handler.clone())
            .collect();
        tracing::trace!(?kind, handlers = handlers.len(), "dispatching");
        for handler in handlers {
            handler(event);
        }
    }

    fn subscribe(&self, kind: EventKind, handler: EventHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.subscribers
            .borrow_mut()
            .push(Subscriber { id, kind, handler });
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|subscriber| subscriber.id != id);
        subscribers.len() != before
    }
}

impl fmt::Debug for LocalEventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subscribers = self.subscribers.borrow();
        let kinds: Vec<_> = subscribers.iter().map(|s| (s.id, s.kind)).collect();
        f.debug_struct("LocalEventBus")
            .field("subscribers", &kinds)
            .field("next_id", &self.next_id.get())
            .finish()
    }
}
