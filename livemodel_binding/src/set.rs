// Copyright 2025 the Livemodel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::binding::{Binding, BindingId};

/// Owns a group of bindings, such as everything one panel created.
///
/// Dropping the set removes every binding it holds.
#[derive(Debug, Default)]
pub struct BindingSet {
    bindings: Vec<Binding>,
}

impl BindingSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of `binding`.
    pub fn insert(&mut self, binding: Binding) {
        self.bindings.push(binding);
    }

    /// Removes `binding` from the model and from this set.
    ///
    /// Returns `false` if it was already removed.
    pub fn remove(&mut self, binding: &Binding) -> bool {
        self.bindings.retain(|held| held.id() != binding.id());
        binding.remove()
    }

    /// Removes every binding in the set. Calling this again is a no-op.
    pub fn remove_bindings(&mut self) {
        for binding in self.bindings.drain(..) {
            binding.remove();
        }
    }

    /// Returns the binding with `id`, if the set holds it.
    #[must_use]
    pub fn get(&self, id: BindingId) -> Option<&Binding> {
        self.bindings.iter().find(|binding| binding.id() == id)
    }

    /// Returns the number of bindings held.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns `true` if the set holds no bindings.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Returns the held bindings in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Binding> + '_ {
        self.bindings.iter()
    }
}

impl Drop for BindingSet {
    fn drop(&mut self) {
        self.remove_bindings();
    }
}
