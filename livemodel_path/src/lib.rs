// Copyright 2025 the Livemodel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Livemodel Path: normalized object paths for addressing nested model values.
//!
//! An [`ObjectPath`] names one location in an object graph with a single
//! dotted syntax, optionally indexing into arrays:
//!
//! ```text
//! RootModel.Compartment[2].Species[5].Name
//! ```
//!
//! The first segment is always the root marker [`ROOT_MARKER`]. Parsing accepts
//! paths with or without it, so `Compartment[2]` and `RootModel.Compartment[2]`
//! name the same location and compare equal.
//!
//! ## Key Operations
//!
//! - [`ObjectPath::parse`] / [`ObjectPath::build`] - text and decomposed forms
//! - [`get`] / [`set`] - read and write through a path on any [`Navigable`] graph
//! - [`to_alternate_index_base`] - translate indices between the zero-based
//!   convention used internally and the one-based convention of external peers
//!
//! Missing intermediates and out-of-range indices are not errors: [`get`]
//! returns `None` and [`set`] returns `false`. Only malformed path text is
//! reported as a [`PathError`].
//!
//! ## Quick Start
//!
//! ```rust
//! use livemodel_path::{IndexShift, ObjectPath, get, set, to_alternate_index_base};
//! use serde_json::json;
//!
//! let path = ObjectPath::parse("RootModel.Compartment[1].Name").unwrap();
//! assert_eq!(path.segments(), ["RootModel", "Compartment", "Name"]);
//! assert_eq!(path.indices(), [1]);
//!
//! let mut model = json!({ "Compartment": [{ "Name": "a" }, { "Name": "b" }] });
//! assert_eq!(get(&model, &path), Some(&json!("b")));
//!
//! assert!(set(&mut model, &path, json!("c")));
//! assert_eq!(model["Compartment"][1]["Name"], json!("c"));
//!
//! let one_based = to_alternate_index_base("Compartment[1].Name", IndexShift::ToOneBased).unwrap();
//! assert_eq!(one_based, "Compartment[2].Name");
//! ```

mod error;
mod index_base;
mod navigate;
mod path;

pub use error::PathError;
pub use index_base::{IndexShift, to_alternate_index_base};
pub use navigate::{Navigable, get, get_mut, set};
pub use path::{ObjectPath, ROOT_MARKER, Segment};
