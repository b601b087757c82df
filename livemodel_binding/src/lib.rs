// Copyright 2025 the Livemodel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Livemodel Binding: keeps a model and the things that display it in sync.
//!
//! A [`ModelStore`] holds the model root and announces every assignment as a
//! [`PropertyChanged`] on an [`EventBus`]. A [`BindingEngine`] connects model
//! paths to [`Observer`]s through that bus.
//!
//! ## Binding Kinds
//!
//! - One-way: model → observer attribute.
//! - Two-way: also writes observer input back to the model, coercing it to
//!   the property's schema type when a registry is attached.
//! - Dependent: model → [`Effect`] on an observer, such as enabling it while
//!   a flag is set. Created directly or from `${...}` expressions in property
//!   configuration via [`resolve_dependency`].
//! - Component: any model change → callback.
//!
//! ## Propagation
//!
//! Delivery is synchronous. Each binding carries an update guard that is set
//! while a change propagates through it; a change that comes back to the same
//! binding during that time is dropped, so a two-way binding never echoes an
//! observer's own input back to it. The guard is released on every exit path.
//!
//! Callback failures (observers, effects, parsers, component callbacks) are
//! logged through `tracing` at `warn` level. They never remove the binding
//! and never stop delivery to other bindings.
//!
//! ## Lifetime
//!
//! Bindings live until removed, individually or all at once through
//! [`BindingEngine::remove_bindings`] or by dropping the engine or a
//! [`BindingSet`]. Removal unsubscribes from the bus and is final.
//!
//! See [`BindingEngine`] for an end-to-end example.

mod binding;
mod dependency;
mod effect;
mod engine;
mod error;
mod event;
mod observer;
mod set;
mod store;

pub use binding::{Binding, BindingId, BindingKind};
pub use dependency::{Dependency, DependencyTarget, resolve_dependency};
pub use effect::{Effect, EffectFn, NON_EDITABLE_CLASS, Predicate};
pub use engine::{BindingBuilder, BindingEngine, OBSERVER_SOURCE, Parser};
pub use error::{BindingError, CallbackError};
pub use event::{
    BusEvent, EventBus, EventHandler, EventKind, LocalEventBus, ObserverInput, PropertyChanged,
    SubscriptionId,
};
pub use observer::{Observer, ObserverId};
pub use set::BindingSet;
pub use store::ModelStore;
