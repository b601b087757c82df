// Copyright 2025 the Livemodel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The observer side of a binding.

use livemodel_model::ModelValue;

use crate::error::CallbackError;

/// Identifies an observer in [`ObserverInput`](crate::ObserverInput) events.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

impl ObserverId {
    /// Creates an identifier from a raw value.
    #[must_use]
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[must_use]
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Something that displays model values: a widget, a remote peer, a test
/// spy.
///
/// Observers are shared between bindings, so every method takes `&self`;
/// implementations use interior mutability for their own state.
///
/// Only [`Observer::write`] is required. The state toggles used by effects
/// default to writing the attributes `disabled`, `class:<name>` and
/// `visible`.
pub trait Observer {
    /// Returns the identifier this observer raises input events under.
    fn id(&self) -> ObserverId;

    /// Shows `value` through `attribute`.
    ///
    /// # Errors
    ///
    /// Whatever the observer reports; the calling binding logs it.
    fn write(&self, attribute: &str, value: &ModelValue) -> Result<(), CallbackError>;

    /// Disables or enables interaction.
    ///
    /// # Errors
    ///
    /// Whatever the observer reports.
    fn set_disabled(&self, disabled: bool) -> Result<(), CallbackError> {
        self.write("disabled", &ModelValue::Bool(disabled))
    }

    /// Adds or removes a visual class.
    ///
    /// # Errors
    ///
    /// Whatever the observer reports.
    fn set_class(&self, class: &str, on: bool) -> Result<(), CallbackError> {
        self.write(&format!("class:{class}"), &ModelValue::Bool(on))
    }

    /// Shows or hides the observer.
    ///
    /// # Errors
    ///
    /// Whatever the observer reports.
    fn set_visible(&self, visible: bool) -> Result<(), CallbackError> {
        self.write("visible", &ModelValue::Bool(visible))
    }
}
