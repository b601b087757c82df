// Copyright 2025 the Livemodel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;

/// Structural schema problems.
///
/// These stop the registration or construction call that hit them. Problems
/// with individual values (a number that does not parse, an out-of-enum
/// member) are absorbed during construction and never surface here.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A class definition is null, not an object, or does not deserialize.
    #[error("invalid definition for class `{class}`: {reason}")]
    InvalidDefinition {
        /// The class being registered.
        class: String,
        /// What was wrong with the definition.
        reason: String,
    },
    /// A definition was registered without a class name.
    #[error("class definition has no class name")]
    MissingClassName,
    /// `Extends` names a class that was never registered.
    #[error("class `{child}` extends unknown class `{parent}`")]
    UnknownParent {
        /// The missing parent class.
        parent: String,
        /// The class referencing it.
        child: String,
    },
    /// The requested class has no registered definition.
    #[error("unknown class `{class}`")]
    UnknownClass {
        /// The requested class.
        class: String,
    },
    /// Following `Extends` from this class leads back to it.
    #[error("inheritance chain of class `{class}` is cyclic")]
    CyclicInheritance {
        /// A class on the cycle.
        class: String,
    },
    /// A class-typed default would construct a class that is already being
    /// constructed, without end.
    #[error("default value constructs class `{class}` inside itself")]
    RecursiveDefault {
        /// The class that would be re-entered.
        class: String,
    },
}

impl SchemaError {
    pub(crate) fn invalid(class: &str, reason: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            class: class.to_owned(),
            reason: reason.into(),
        }
    }
}
