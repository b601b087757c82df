// Copyright 2025 the Livemodel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use livemodel_path::PathError;
use thiserror::Error;

/// Errors raised by user callbacks: observers, effects, parsers and
/// component callbacks.
///
/// These never escape a binding. They are logged where the binding invoked
/// the callback, and the binding stays active.
pub type CallbackError = Box<dyn std::error::Error>;

/// Reasons a binding could not be created.
///
/// A failed creation leaves nothing subscribed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BindingError {
    /// A required input was never supplied.
    #[error("binding has no {0}")]
    MissingInput(&'static str),
    /// The path names the model root, which has no property to bind.
    #[error("cannot bind the model root to an observer")]
    RootPath,
    /// The path text is malformed.
    #[error(transparent)]
    Path(#[from] PathError),
}
