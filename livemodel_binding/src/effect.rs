// Copyright 2025 the Livemodel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Effects applied by dependent bindings.

use core::fmt;
use std::rc::Rc;

use livemodel_model::ModelValue;

use crate::error::CallbackError;
use crate::observer::Observer;

/// The visual class toggled on observers that an [`Effect::Editable`]
/// disables.
pub const NON_EDITABLE_CLASS: &str = "non-editable";

/// Decides an effect's on/off state from the watched value.
pub type Predicate = Rc<dyn Fn(&ModelValue) -> bool>;

/// A free-form effect.
pub type EffectFn = Rc<dyn Fn(&dyn Observer, &ModelValue) -> Result<(), CallbackError>>;

/// What a dependent binding does to its observer when the watched value
/// changes.
///
/// Predicates default to [`ModelValue::is_truthy`].
///
/// # Example
///
/// ```rust
/// use livemodel_binding::Effect;
/// use livemodel_model::ModelValue;
///
/// let when_positive = Effect::editable_when(|value| value.as_f64().is_some_and(|v| v > 0.0));
/// assert!(when_positive.is_enabled(&ModelValue::from(3_i64)));
/// assert!(!when_positive.is_enabled(&ModelValue::from(-1_i64)));
///
/// assert!(!Effect::visible().is_enabled(&ModelValue::from("")));
/// ```
#[derive(Clone)]
pub enum Effect {
    /// Enables the observer while the predicate holds. A disabled observer
    /// also carries [`NON_EDITABLE_CLASS`].
    Editable {
        /// Overrides the default predicate.
        predicate: Option<Predicate>,
    },
    /// Shows the observer while the predicate holds.
    Visible {
        /// Overrides the default predicate.
        predicate: Option<Predicate>,
    },
    /// Runs arbitrary code.
    Custom(EffectFn),
}

impl Effect {
    /// Enables the observer while the watched value is truthy.
    #[must_use]
    pub fn editable() -> Self {
        Self::Editable { predicate: None }
    }

    /// Enables the observer while `predicate` holds.
    #[must_use]
    pub fn editable_when(predicate: impl Fn(&ModelValue) -> bool + 'static) -> Self {
        Self::Editable {
            predicate: Some(Rc::new(predicate)),
        }
    }

    /// Shows the observer while the watched value is truthy.
    #[must_use]
    pub fn visible() -> Self {
        Self::Visible { predicate: None }
    }

    /// Shows the observer while `predicate` holds.
    #[must_use]
    pub fn visible_when(predicate: impl Fn(&ModelValue) -> bool + 'static) -> Self {
        Self::Visible {
            predicate: Some(Rc::new(predicate)),
        }
    }

    /// Runs `effect` on every change.
    #[must_use]
    pub fn custom(
        effect: impl Fn(&dyn Observer, &ModelValue) -> Result<(), CallbackError> + 'static,
    ) -> Self {
        Self::Custom(Rc::new(effect))
    }

    /// Evaluates the predicate of an editable or visible effect.
    ///
    /// Custom effects have no predicate and always report `true`.
    #[must_use]
    pub fn is_enabled(&self, value: &ModelValue) -> bool {
        match self {
            Self::Editable { predicate } | Self::Visible { predicate } => {
                predicate.as_ref().map_or_else(|| value.is_truthy(), |p| p(value))
            }
            Self::Custom(_) => true,
        }
    }

    /// Applies the effect for `value` to `observer`.
    ///
    /// # Errors
    ///
    /// Whatever the observer or the custom effect reports.
    pub fn apply(&self, observer: &dyn Observer, value: &ModelValue) -> Result<(), CallbackError> {
        match self {
            Self::Editable { .. } => {
                let editable = self.is_enabled(value);
                observer.set_disabled(!editable)?;
                observer.set_class(NON_EDITABLE_CLASS, !editable)
            }
            Self::Visible { .. } => observer.set_visible(self.is_enabled(value)),
            Self::Custom(effect) => effect(observer, value),
        }
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Editable { predicate } => f
                .debug_struct("Editable")
                .field("custom_predicate", &predicate.is_some())
                .finish(),
            Self::Visible { predicate } => f
                .debug_struct("Visible")
                .field("custom_predicate", &predicate.is_some())
                .finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
