// Copyright 2025 the Livemodel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Translation between zero-based and one-based path indices.
//!
//! Paths are zero-based inside the model. Some peers count array elements
//! from one, so paths crossing that boundary have every bracketed index moved
//! by one.

use crate::error::PathError;

/// Direction of an index base translation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IndexShift {
    /// Add one to every index (zero-based → one-based).
    ToOneBased,
    /// Subtract one from every index (one-based → zero-based).
    ToZeroBased,
}

impl IndexShift {
    /// Returns the shift that undoes this one.
    #[must_use]
    pub const fn inverse(self) -> Self {
        match self {
            Self::ToOneBased => Self::ToZeroBased,
            Self::ToZeroBased => Self::ToOneBased,
        }
    }

    /// Applies the shift to a single index.
    ///
    /// Returns `None` when a zero index would go negative.
    #[must_use]
    pub const fn apply(self, index: usize) -> Option<usize> {
        match self {
            Self::ToOneBased => Some(index.saturating_add(1)),
            Self::ToZeroBased => index.checked_sub(1),
        }
    }
}

/// Moves every bracketed index in `path` to the other index base.
///
/// Only the digits between brackets change; every other character, including
/// a missing or present root marker, is kept as written. Text without
/// brackets is returned unchanged.
///
/// # Errors
///
/// - [`PathError::InvalidPath`] for unbalanced brackets or non-numeric indices.
/// - [`PathError::IndexUnderflow`] when shifting a zero index down.
///
/// # Example
///
/// ```rust
/// use livemodel_path::{IndexShift, to_alternate_index_base};
///
/// let external = to_alternate_index_base("RootModel.A[0].B[3]", IndexShift::ToOneBased).unwrap();
/// assert_eq!(external, "RootModel.A[1].B[4]");
///
/// let internal = to_alternate_index_base(&external, IndexShift::ToZeroBased).unwrap();
/// assert_eq!(internal, "RootModel.A[0].B[3]");
/// ```
pub fn to_alternate_index_base(path: &str, shift: IndexShift) -> Result<String, PathError> {
    if !path.contains(['[', ']']) {
        return Ok(path.to_owned());
    }

    let mut out = String::with_capacity(path.len() + 2);
    let mut rest = path;
    while let Some(open) = rest.find(['[', ']']) {
        if rest.as_bytes()[open] == b']' {
            return Err(PathError::invalid(path, "unbalanced brackets"));
        }
        out.push_str(&rest[..=open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find(']') else {
            return Err(PathError::invalid(path, "unbalanced brackets"));
        };
        let digits = &after[..close];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PathError::invalid(path, "non-numeric index"));
        }
        let index = digits
            .parse::<usize>()
            .map_err(|_| PathError::invalid(path, "index out of range"))?;
        let shifted = shift.apply(index).ok_or_else(|| PathError::IndexUnderflow {
            path: path.to_owned(),
        })?;
        out.push_str(&shifted.to_string());
        out.push(']');
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shifts_every_index() {
        assert_eq!(
            to_alternate_index_base("Compartment[2].Species[5]", IndexShift::ToOneBased).unwrap(),
            "Compartment[3].Species[6]"
        );
        assert_eq!(
            to_alternate_index_base("Compartment[3].Species[6]", IndexShift::ToZeroBased).unwrap(),
            "Compartment[2].Species[5]"
        );
    }

    #[test]
    fn non_indexed_paths_are_untouched() {
        for text in ["", "RootModel", "A.B.C", "RootModel.Name"] {
            assert_eq!(
                to_alternate_index_base(text, IndexShift::ToOneBased).unwrap(),
                text
            );
            assert_eq!(
                to_alternate_index_base(text, IndexShift::ToZeroBased).unwrap(),
                text
            );
        }
    }

    #[test]
    fn zero_cannot_go_lower() {
        assert_eq!(
            to_alternate_index_base("A[0]", IndexShift::ToZeroBased),
            Err(PathError::IndexUnderflow {
                path: "A[0]".into()
            })
        );
    }

    #[test]
    fn malformed_brackets_are_rejected() {
        for text in ["A[1", "A]1[", "A[x]", "A[]", "A]"] {
            assert!(
                matches!(
                    to_alternate_index_base(text, IndexShift::ToOneBased),
                    Err(PathError::InvalidPath { .. })
                ),
                "expected `{text}` to be rejected"
            );
        }
    }

    #[test]
    fn inverse_round_trips() {
        assert_eq!(IndexShift::ToOneBased.inverse(), IndexShift::ToZeroBased);
        assert_eq!(IndexShift::ToZeroBased.inverse(), IndexShift::ToOneBased);
        assert_eq!(IndexShift::ToOneBased.apply(0), Some(1));
        assert_eq!(IndexShift::ToZeroBased.apply(0), None);
    }
}
