// Copyright 2025 the Livemodel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Path-addressed reads and writes over object graphs.
//!
//! Any tree of values can be addressed by implementing [`Navigable`] for its
//! node type. An implementation for [`serde_json::Value`] ships with this
//! crate.

use serde_json::Value;

use crate::path::{ObjectPath, Segment};

/// A node of an object graph that paths can walk through.
///
/// Object-like nodes expose named fields; array-like nodes expose elements.
/// Nodes that are neither return `None` from every accessor.
pub trait Navigable: Sized {
    /// Returns the field called `name` of an object-like node.
    fn field(&self, name: &str) -> Option<&Self>;

    /// Returns the field called `name` of an object-like node, mutably.
    fn field_mut(&mut self, name: &str) -> Option<&mut Self>;

    /// Returns element `index` of an array-like node.
    fn element(&self, index: usize) -> Option<&Self>;

    /// Returns element `index` of an array-like node, mutably.
    fn element_mut(&mut self, index: usize) -> Option<&mut Self>;

    /// Assigns (or adds) the field called `name` on an object-like node.
    ///
    /// Returns `false`, leaving the node untouched, if it is not object-like.
    fn assign_field(&mut self, name: &str, value: Self) -> bool;
}

fn descend<'a, N: Navigable>(node: &'a N, segment: &Segment) -> Option<&'a N> {
    let field = node.field(segment.name())?;
    match segment.index() {
        Some(index) => field.element(index),
        None => Some(field),
    }
}

fn descend_mut<'a, N: Navigable>(node: &'a mut N, segment: &Segment) -> Option<&'a mut N> {
    let field = node.field_mut(segment.name())?;
    match segment.index() {
        Some(index) => field.element_mut(index),
        None => Some(field),
    }
}

/// Reads the value at `path`.
///
/// Returns `None` if any intermediate is missing, is not a container, or an
/// index is out of bounds. The root path yields `root` itself.
#[must_use]
pub fn get<'a, N: Navigable>(root: &'a N, path: &ObjectPath) -> Option<&'a N> {
    path.iter()
        .try_fold(root, |node, segment| descend(node, segment))
}

/// Reads the value at `path` mutably.
///
/// Follows the same rules as [`get`].
#[must_use]
pub fn get_mut<'a, N: Navigable>(root: &'a mut N, path: &ObjectPath) -> Option<&'a mut N> {
    let mut node = root;
    for segment in path {
        node = descend_mut(node, segment)?;
    }
    Some(node)
}

/// Writes `value` at `path`.
///
/// The walk to the parent follows [`get`]. The final segment is then assigned
/// on the parent object; when it carries an index, the element of an existing
/// array is replaced instead.
///
/// Returns `false` without mutating anything if the parent is unreachable or
/// not object-like, if an indexed final segment does not name an array, or if
/// its index is out of bounds. The root itself cannot be assigned.
pub fn set<N: Navigable>(root: &mut N, path: &ObjectPath, value: N) -> bool {
    let Some((last, parents)) = path.as_slice().split_last() else {
        return false;
    };

    let mut node = root;
    for segment in parents {
        let Some(next) = descend_mut(node, segment) else {
            return false;
        };
        node = next;
    }

    match last.index() {
        None => node.assign_field(last.name(), value),
        Some(index) => match node
            .field_mut(last.name())
            .and_then(|array| array.element_mut(index))
        {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        },
    }
}

impl Navigable for Value {
    fn field(&self, name: &str) -> Option<&Self> {
        match self {
            Self::Object(map) => map.get(name),
            _ => None,
        }
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut Self> {
        match self {
            Self::Object(map) => map.get_mut(name),
            _ => None,
        }
    }

    fn element(&self, index: usize) -> Option<&Self> {
        match self {
            Self::Array(items) => items.get(index),
            _ => None,
        }
    }

    fn element_mut(&mut self, index: usize) -> Option<&mut Self> {
        match self {
            Self::Array(items) => items.get_mut(index),
            _ => None,
        }
    }

    fn assign_field(&mut self, name: &str, value: Self) -> bool {
        match self {
            Self::Object(map) => {
                map.insert(name.to_owned(), value);
                true
            }
            _ => false,
        }
    }
}
