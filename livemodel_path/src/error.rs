// Copyright 2025 the Livemodel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;

/// Errors produced while reading object path text.
///
/// Lookups through a well-formed path never fail; they report "not found"
/// through `Option`/`bool` instead.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PathError {
    /// The path text does not follow `Segment([N])?(.Segment([N])?)*`.
    #[error("invalid path `{path}`: {reason}")]
    InvalidPath {
        /// The offending path text.
        path: String,
        /// What was wrong with it.
        reason: &'static str,
    },
    /// A zero index cannot be shifted down to a lower index base.
    #[error("index 0 in `{path}` cannot be shifted below zero")]
    IndexUnderflow {
        /// The offending path text.
        path: String,
    },
}

impl PathError {
    pub(crate) fn invalid(path: &str, reason: &'static str) -> Self {
        Self::InvalidPath {
            path: path.to_owned(),
            reason,
        }
    }
}
