// Copyright 2025 the Livemodel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dependency expressions in property configuration.
//!
//! A configuration flag such as "editable" may be a literal boolean or a
//! `${...}` expression naming the property it follows:
//!
//! | Expression      | Watches                                              |
//! |-----------------|------------------------------------------------------|
//! | `${Use}`        | `Use` on the object declaring the expression         |
//! | `${a.b.Use}`    | `Use` on `a.b`, relative to that object              |
//! | `${$a.b.Use}`   | `Use` on `a.b`, relative to the model root           |
//!
//! The declaring object of `Parameters[0].Min` is the array element
//! `Parameters[0]`, so `${Use}` there watches `Parameters[0].Use`.

use livemodel_path::{ObjectPath, PathError};
use serde_json::Value;

/// A property a dependent binding watches.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DependencyTarget {
    object_path: ObjectPath,
    property: String,
    path: ObjectPath,
}

impl DependencyTarget {
    /// Returns the object holding the watched property.
    #[must_use]
    #[inline]
    pub fn object_path(&self) -> &ObjectPath {
        &self.object_path
    }

    /// Returns the watched property's final path segment.
    #[must_use]
    #[inline]
    pub fn property(&self) -> &str {
        &self.property
    }

    /// Returns the full path of the watched property.
    #[must_use]
    #[inline]
    pub fn path(&self) -> &ObjectPath {
        &self.path
    }
}

/// A resolved configuration flag.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Dependency {
    /// A literal value, applied once without a binding.
    Static(bool),
    /// A property whose value drives the flag.
    Watch(DependencyTarget),
}

/// Resolves a configuration value declared on the property at `declaring`.
///
/// Returns `Ok(None)` for values that are neither booleans nor exactly of the
/// form `${expr}`.
///
/// # Errors
///
/// Returns [`PathError::InvalidPath`] if the expression is malformed path
/// text.
///
/// # Example
///
/// ```rust
/// use livemodel_binding::{Dependency, resolve_dependency};
/// use livemodel_path::ObjectPath;
/// use serde_json::json;
///
/// let declaring = ObjectPath::parse("Parameters[0].Min").unwrap();
/// let Some(Dependency::Watch(target)) = resolve_dependency(&json!("${Use}"), &declaring).unwrap() else {
///     panic!("expected a watched dependency");
/// };
/// assert_eq!(target.object_path().to_string(), "RootModel.Parameters[0]");
/// assert_eq!(target.property(), "Use");
///
/// assert_eq!(resolve_dependency(&json!(false), &declaring).unwrap(), Some(Dependency::Static(false)));
/// assert_eq!(resolve_dependency(&json!("Use"), &declaring).unwrap(), None);
/// ```
pub fn resolve_dependency(
    config: &Value,
    declaring: &ObjectPath,
) -> Result<Option<Dependency>, PathError> {
    let expression = match config {
        Value::Bool(flag) => return Ok(Some(Dependency::Static(*flag))),
        Value::String(text) => text,
        _ => return Ok(None),
    };
    let Some(inner) = expression
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
    else {
        return Ok(None);
    };

    let (base, relative) = match inner.strip_prefix('$') {
        Some(rooted) => (ObjectPath::root(), rooted),
        None => (declaring.parent().unwrap_or_default(), inner),
    };
    let target = ObjectPath::parse(relative)?;
    let (Some(last), Some(prefix)) = (target.last(), target.parent()) else {
        return Ok(None);
    };

    let object_path = base.join(&prefix);
    Ok(Some(Dependency::Watch(DependencyTarget {
        path: object_path.with_segment(last.clone()),
        property: last.to_string(),
        object_path,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn watch(config: Value, declaring: &str) -> (String, String) {
        let declaring = ObjectPath::parse(declaring).unwrap();
        match resolve_dependency(&config, &declaring).unwrap() {
            Some(Dependency::Watch(target)) => {
                (target.object_path().to_string(), target.property().to_owned())
            }
            other => panic!("expected a watch, got {other:?}"),
        }
    }

    #[test]
    fn simple_form_stays_on_declaring_object() {
        assert_eq!(
            watch(json!("${Use}"), "Parameters[0].Min"),
            ("RootModel.Parameters[0]".into(), "Use".into())
        );
        assert_eq!(
            watch(json!("${Use}"), "Enabled"),
            ("RootModel".into(), "Use".into())
        );
    }

    #[test]
    fn dotted_form_is_relative() {
        assert_eq!(
            watch(json!("${Settings.Advanced}"), "Reactions[2].Rate"),
            ("RootModel.Reactions[2].Settings".into(), "Advanced".into())
        );
    }

    #[test]
    fn dollar_form_is_rooted() {
        assert_eq!(
            watch(json!("${$Settings.Advanced}"), "Reactions[2].Rate"),
            ("RootModel.Settings".into(), "Advanced".into())
        );
        assert_eq!(
            watch(json!("${$Options[1].Flag}"), "A.B"),
            ("RootModel.Options[1]".into(), "Flag".into())
        );
    }

    #[test]
    fn target_path_rejoins_parts() {
        let declaring = ObjectPath::parse("Parameters[0].Min").unwrap();
        let Some(Dependency::Watch(target)) =
            resolve_dependency(&json!("${Limits.Use}"), &declaring).unwrap()
        else {
            panic!("expected a watch");
        };
        assert_eq!(target.path().to_string(), "RootModel.Parameters[0].Limits.Use");
    }

    #[test]
    fn other_shapes_are_not_dependencies() {
        let declaring = ObjectPath::parse("A").unwrap();
        for config in [
            json!(null),
            json!(1),
            json!("Use"),
            json!("${Use"),
            json!("prefix ${Use}"),
            json!("${}"),
            json!(["${Use}"]),
        ] {
            assert_eq!(
                resolve_dependency(&config, &declaring).unwrap(),
                None,
                "{config} should not resolve"
            );
        }
        assert_eq!(
            resolve_dependency(&json!(true), &declaring).unwrap(),
            Some(Dependency::Static(true))
        );
    }

    #[test]
    fn malformed_expressions_are_errors() {
        let declaring = ObjectPath::parse("A").unwrap();
        assert!(resolve_dependency(&json!("${A[x]}"), &declaring).is_err());
        assert!(resolve_dependency(&json!("${A..B}"), &declaring).is_err());
    }
}
