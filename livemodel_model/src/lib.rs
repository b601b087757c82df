// Copyright 2025 the Livemodel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Livemodel Model: a runtime object model defined entirely by data.
//!
//! Classes are declared in JSON rather than in Rust. A [`SchemaRegistry`]
//! holds the declarations, resolves their inheritance chains, and answers
//! property lookups. A [`ModelObjectFactory`] turns untyped JSON into
//! [`ModelInstance`]s that follow those declarations.
//!
//! ## Core Concepts
//!
//! - [`ClassDefinition`] / [`PropertyDefinition`]: declarative class shapes.
//!   A class may extend one parent; descendants add properties and may
//!   redeclare inherited ones.
//! - [`SchemaRegistry`]: definitions and optional constructors keyed by class
//!   name, with cached root-to-leaf hierarchies.
//! - [`ModelObjectFactory`]: construction with type coercion, defaults, and
//!   recursive construction of nested class-typed values.
//! - [`ModelValue`]: the dynamically typed value held by each property.
//! - [`validate_instance`]: required and enum checks, kept apart from
//!   construction so incomplete data can still be loaded and edited.
//!
//! ## Error Model
//!
//! Structural schema problems are returned as [`SchemaError`]. Per-value
//! problems (a number that does not parse, an out-of-enum member, a nested
//! object that cannot be constructed) are logged through `tracing` at `warn`
//! level and replaced by defaults.
//!
//! ## Quick Start
//!
//! ```rust
//! use livemodel_model::{ModelObjectFactory, SchemaRegistry};
//! use serde_json::json;
//!
//! let mut registry = SchemaRegistry::new();
//! registry
//!     .load_many(&json!({
//!         "Named": {
//!             "Properties": { "Name": { "Type": "string", "IsPrimitive": true } }
//!         },
//!         "Species": {
//!             "Extends": "Named",
//!             "Properties": {
//!                 "InitialAmount": { "Type": "number", "IsPrimitive": true, "DefaultValue": 0 }
//!             }
//!         },
//!         "Compartment": {
//!             "Extends": "Named",
//!             "Properties": { "Species": { "Type": "Species", "IsArray": true } }
//!         }
//!     }))
//!     .unwrap();
//!
//! let factory = ModelObjectFactory::new(&registry);
//! let cytosol = factory
//!     .construct(
//!         "Compartment",
//!         &json!({ "Name": "cytosol", "Species": [{ "Name": "A", "InitialAmount": "10" }] }),
//!     )
//!     .unwrap();
//!
//! assert_eq!(
//!     cytosol.to_json(),
//!     json!({ "Name": "cytosol", "Species": [{ "Name": "A", "InitialAmount": 10 }] })
//! );
//! ```

mod coerce;
mod definition;
mod error;
mod factory;
mod instance;
mod registry;
mod validate;
mod value;

pub use coerce::coerce_primitive;
pub use definition::{
    ClassDefinition, PrimitiveType, PropertyDefinition, PropertyDefinitionBuilder, PropertyKind,
};
pub use error::SchemaError;
pub use factory::ModelObjectFactory;
pub use instance::ModelInstance;
pub use registry::{Hierarchy, InstanceConstructor, PropertyTable, SchemaRegistry};
pub use validate::{IssueKind, ValidationIssue, validate_instance};
pub use value::ModelValue;
