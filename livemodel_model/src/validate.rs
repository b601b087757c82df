// Copyright 2025 the Livemodel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Instance validation.

use core::fmt;

use livemodel_path::ObjectPath;
use serde_json::Value;

use crate::definition::{PropertyDefinition, PropertyKind};
use crate::instance::ModelInstance;
use crate::registry::SchemaRegistry;
use crate::value::ModelValue;

/// What is wrong at a [`ValidationIssue`]'s location.
#[derive(Clone, Debug, PartialEq)]
pub enum IssueKind {
    /// A required property is `Null`, missing, or an empty string.
    MissingRequired,
    /// A value is outside the property's enumerated members.
    NotInEnum {
        /// The offending value.
        value: Value,
    },
    /// The instance's class is not resolvable in the registry.
    UnknownClass {
        /// The instance's class name.
        class: String,
    },
}

/// One problem found by [`validate_instance`].
#[derive(Clone, Debug, PartialEq)]
pub struct ValidationIssue {
    path: ObjectPath,
    kind: IssueKind,
}

impl ValidationIssue {
    /// Returns the location of the problem, relative to the validated
    /// instance.
    #[must_use]
    #[inline]
    pub fn path(&self) -> &ObjectPath {
        &self.path
    }

    /// Returns what is wrong.
    #[must_use]
    #[inline]
    pub fn kind(&self) -> &IssueKind {
        &self.kind
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            IssueKind::MissingRequired => write!(f, "{}: required value is missing", self.path),
            IssueKind::NotInEnum { value } => {
                write!(f, "{}: {value} is not an allowed value", self.path)
            }
            IssueKind::UnknownClass { class } => {
                write!(f, "{}: unknown class `{class}`", self.path)
            }
        }
    }
}

/// Checks `instance` against the schema of its class.
///
/// Nested instances, directly held or inside arrays, are checked against
/// their own classes. Issues are reported in property order, depth first.
///
/// # Example
///
/// ```rust
/// use livemodel_model::{IssueKind, ModelObjectFactory, SchemaRegistry, validate_instance};
/// use serde_json::json;
///
/// let mut registry = SchemaRegistry::new();
/// registry
///     .register(
///         "Base",
///         &json!({ "Properties": { "id": { "Type": "string", "IsPrimitive": true, "Required": true } } }),
///     )
///     .unwrap();
///
/// let base = ModelObjectFactory::new(&registry).construct("Base", &json!({})).unwrap();
/// let issues = validate_instance(&registry, &base);
/// assert_eq!(issues.len(), 1);
/// assert_eq!(issues[0].kind(), &IssueKind::MissingRequired);
/// assert_eq!(issues[0].path().to_string(), "RootModel.id");
/// ```
#[must_use]
pub fn validate_instance(registry: &SchemaRegistry, instance: &ModelInstance) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    check(registry, instance, &ObjectPath::root(), &mut issues);
    issues
}

fn check(
    registry: &SchemaRegistry,
    instance: &ModelInstance,
    at: &ObjectPath,
    issues: &mut Vec<ValidationIssue>,
) {
    let Ok(table) = registry.properties(instance.class_name()) else {
        issues.push(ValidationIssue {
            path: at.clone(),
            kind: IssueKind::UnknownClass {
                class: instance.class_name().to_owned(),
            },
        });
        return;
    };

    for (name, definition) in table.iter() {
        let value = instance.get(name).unwrap_or(&ModelValue::Null);
        let here = at.child(name.as_str());

        if definition.is_required() && is_missing(value) {
            issues.push(ValidationIssue {
                path: here.clone(),
                kind: IssueKind::MissingRequired,
            });
        }

        match (definition.kind(), value) {
            (PropertyKind::Primitive(_), ModelValue::Array(items)) if definition.is_array() => {
                for (index, item) in items.iter().enumerate() {
                    if !is_member(definition, item) {
                        issues.push(not_in_enum(at.indexed_child(name.as_str(), index), item));
                    }
                }
            }
            (PropertyKind::Primitive(_), _) => {
                if !is_member(definition, value) {
                    issues.push(not_in_enum(here, value));
                }
            }
            (PropertyKind::Class(_), ModelValue::Instance(nested)) => {
                check(registry, nested, &here, issues);
            }
            (PropertyKind::Class(_), ModelValue::Array(items)) => {
                for (index, item) in items.iter().enumerate() {
                    if let ModelValue::Instance(nested) = item {
                        check(registry, nested, &at.indexed_child(name.as_str(), index), issues);
                    }
                }
            }
            (PropertyKind::Class(_), _) => {}
        }
    }
}

fn is_member(definition: &PropertyDefinition, value: &ModelValue) -> bool {
    value.is_null() || definition.permits(&value.to_json())
}

fn not_in_enum(path: ObjectPath, value: &ModelValue) -> ValidationIssue {
    ValidationIssue {
        path,
        kind: IssueKind::NotInEnum {
            value: value.to_json(),
        },
    }
}

fn is_missing(value: &ModelValue) -> bool {
    match value {
        ModelValue::Null => true,
        ModelValue::String(s) => s.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::ModelObjectFactory;
    use serde_json::json;

    fn registry() -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        registry
            .load_many(&json!({
                "Species": {
                    "Properties": {
                        "Name": { "Type": "string", "IsPrimitive": true, "Required": true },
                        "Unit": { "Type": "string", "IsPrimitive": true, "Enum": ["mol", "mmol"] },
                        "Tags": { "Type": "string", "IsPrimitive": true, "IsArray": true, "Enum": ["a", "b"] }
                    }
                },
                "Compartment": {
                    "Properties": {
                        "Species": { "Type": "Species", "IsArray": true },
                        "Main": { "Type": "Species" }
                    }
                }
            }))
            .unwrap();
        registry
    }

    #[test]
    fn valid_instance_has_no_issues() {
        let registry = registry();
        let factory = ModelObjectFactory::new(&registry);
        let species = factory
            .construct("Species", &json!({ "Name": "A", "Unit": "mol", "Tags": ["a"] }))
            .unwrap();
        assert!(validate_instance(&registry, &species).is_empty());
    }

    #[test]
    fn empty_strings_count_as_missing() {
        let registry = registry();
        let factory = ModelObjectFactory::new(&registry);
        let species = factory.construct("Species", &json!({ "Name": "" })).unwrap();
        let issues = validate_instance(&registry, &species);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind(), &IssueKind::MissingRequired);
    }

    #[test]
    fn enum_members_are_checked_per_element() {
        let registry = registry();
        let factory = ModelObjectFactory::new(&registry);
        let species = factory
            .construct("Species", &json!({ "Name": "A", "Unit": "kg", "Tags": ["a", "z"] }))
            .unwrap();
        let issues = validate_instance(&registry, &species);
        let rendered: Vec<_> = issues.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            [
                "RootModel.Unit: \"kg\" is not an allowed value",
                "RootModel.Tags[1]: \"z\" is not an allowed value",
            ]
        );
    }

    #[test]
    fn nested_instances_report_qualified_paths() {
        let registry = registry();
        let factory = ModelObjectFactory::new(&registry);
        let compartment = factory
            .construct(
                "Compartment",
                &json!({ "Species": [{ "Name": "ok" }, {}], "Main": {} }),
            )
            .unwrap();
        let paths: Vec<_> = validate_instance(&registry, &compartment)
            .iter()
            .map(|issue| issue.path().to_string())
            .collect();
        assert_eq!(
            paths,
            ["RootModel.Species[1].Name", "RootModel.Main.Name"]
        );
    }

    #[test]
    fn unknown_class_is_reported() {
        let registry = registry();
        let issues = validate_instance(&registry, &ModelInstance::new("Ghost"));
        assert_eq!(
            issues[0].kind(),
            &IssueKind::UnknownClass {
                class: "Ghost".into()
            }
        );
        assert!(issues[0].path().is_root());
    }
}
