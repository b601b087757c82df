// Copyright 2025 the Livemodel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Object path representation.
//!
//! This module provides [`ObjectPath`], the normalized form of a dotted,
//! optionally indexed path, and [`Segment`], one step of it.

use core::fmt;
use core::str::FromStr;
use smallvec::SmallVec;

use crate::error::PathError;
use crate::index_base::IndexShift;

/// The sentinel token that always opens a normalized path.
///
/// Comparison logic strips it, so it never has to be written by callers.
pub const ROOT_MARKER: &str = "RootModel";

/// Most model paths are a handful of segments deep.
const INLINE_SEGMENTS: usize = 6;

/// One step of an [`ObjectPath`]: a property name with an optional array index.
///
/// # Example
///
/// ```rust
/// use livemodel_path::Segment;
///
/// let segment = Segment::indexed("Species", 5);
/// assert_eq!(segment.name(), "Species");
/// assert_eq!(segment.index(), Some(5));
/// assert_eq!(segment.to_string(), "Species[5]");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Segment {
    name: String,
    index: Option<usize>,
}

impl Segment {
    /// Creates a segment without an index.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: None,
        }
    }

    /// Creates a segment that indexes into the array named `name`.
    #[must_use]
    pub fn indexed(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index: Some(index),
        }
    }

    /// Returns the property name.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the array index, if any.
    #[must_use]
    #[inline]
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Parses a single `name` or `name[digits]` token.
    ///
    /// `path` is the full text the token came from, used for error reporting.
    fn parse_token(path: &str, token: &str) -> Result<Self, PathError> {
        if token.is_empty() {
            return Err(PathError::invalid(path, "empty segment"));
        }
        let Some(open) = token.find('[') else {
            if token.contains(']') {
                return Err(PathError::invalid(path, "unbalanced brackets"));
            }
            return Ok(Self::new(token));
        };

        let name = &token[..open];
        if name.is_empty() {
            return Err(PathError::invalid(path, "index without a segment name"));
        }
        if name.contains(']') {
            return Err(PathError::invalid(path, "unbalanced brackets"));
        }
        let Some(digits) = token[open + 1..].strip_suffix(']') else {
            return Err(PathError::invalid(path, "unbalanced brackets"));
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PathError::invalid(path, "non-numeric index"));
        }
        let index = digits
            .parse::<usize>()
            .map_err(|_| PathError::invalid(path, "index out of range"))?;
        Ok(Self::indexed(name, index))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}[{index}]", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// A normalized path to one location in an object graph.
///
/// The root marker is implicit: an `ObjectPath` stores only the segments
/// below the root, so root-relative and fully qualified spellings of the same
/// location are equal.
///
/// # Example
///
/// ```rust
/// use livemodel_path::ObjectPath;
///
/// let qualified = ObjectPath::parse("RootModel.Parameters[0].Min").unwrap();
/// let relative = ObjectPath::parse("Parameters[0].Min").unwrap();
/// assert_eq!(qualified, relative);
/// assert_eq!(relative.to_string(), "RootModel.Parameters[0].Min");
/// assert_eq!(relative.relative(), "Parameters[0].Min");
/// assert_eq!(relative.parent().unwrap().to_string(), "RootModel.Parameters[0]");
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct ObjectPath {
    segments: SmallVec<[Segment; INLINE_SEGMENTS]>,
}

impl ObjectPath {
    /// Returns the path of the model root.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses path text.
    ///
    /// Empty text is the root path. A leading root marker is optional.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::InvalidPath`] for empty segments, unbalanced
    /// brackets, or non-numeric indices.
    pub fn parse(text: &str) -> Result<Self, PathError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Self::root());
        }

        let mut segments = SmallVec::new();
        for (position, token) in trimmed.split('.').enumerate() {
            let segment = Segment::parse_token(text, token)?;
            if position == 0 && segment.index.is_none() && segment.name == ROOT_MARKER {
                continue;
            }
            segments.push(segment);
        }
        Ok(Self { segments })
    }

    /// Builds a path from its decomposed form.
    ///
    /// A leading root marker in `segments` is not duplicated. Indices are
    /// handed out in encounter order: each non-root segment takes the next
    /// unused index while any remain, so trailing segments go unindexed when
    /// `indices` is shorter than `segments`.
    ///
    /// ```rust
    /// use livemodel_path::ObjectPath;
    ///
    /// let path = ObjectPath::build(&["RootModel", "Compartment", "Species"], &[2, 5]);
    /// assert_eq!(path.to_string(), "RootModel.Compartment[2].Species[5]");
    ///
    /// let path = ObjectPath::build(&["Compartment", "Name"], &[2]);
    /// assert_eq!(path.to_string(), "RootModel.Compartment[2].Name");
    /// ```
    #[must_use]
    pub fn build<S: AsRef<str>>(segments: &[S], indices: &[usize]) -> Self {
        let mut names = segments.iter().map(AsRef::as_ref).peekable();
        if names.peek() == Some(&ROOT_MARKER) {
            names.next();
        }
        let mut indices = indices.iter().copied();
        let segments = names
            .map(|name| Segment {
                name: name.to_owned(),
                index: indices.next(),
            })
            .collect();
        Self { segments }
    }

    /// Returns the segment names, starting with [`ROOT_MARKER`].
    #[must_use]
    pub fn segments(&self) -> Vec<&str> {
        core::iter::once(ROOT_MARKER)
            .chain(self.segments.iter().map(Segment::name))
            .collect()
    }

    /// Returns the indices in encounter order.
    #[must_use]
    pub fn indices(&self) -> Vec<usize> {
        self.segments.iter().filter_map(Segment::index).collect()
    }

    /// Returns the segments below the root.
    #[must_use]
    #[inline]
    pub fn as_slice(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns an iterator over the segments below the root.
    pub fn iter(&self) -> impl Iterator<Item = &Segment> + '_ {
        self.segments.iter()
    }

    /// Returns the number of segments below the root.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` if this is the root path.
    #[must_use]
    #[inline]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the final segment, or `None` for the root path.
    #[must_use]
    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// Returns the path of the object holding the final segment.
    ///
    /// The root path has no parent.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (_, parent) = self.segments.split_last()?;
        Some(Self {
            segments: parent.iter().cloned().collect(),
        })
    }

    /// Returns this path extended by an unindexed property.
    #[must_use]
    pub fn child(&self, name: impl Into<String>) -> Self {
        self.with_segment(Segment::new(name))
    }

    /// Returns this path extended by an indexed property.
    #[must_use]
    pub fn indexed_child(&self, name: impl Into<String>, index: usize) -> Self {
        self.with_segment(Segment::indexed(name, index))
    }

    /// Returns this path extended by `segment`.
    #[must_use]
    pub fn with_segment(&self, segment: Segment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    /// Returns this path followed by every segment of `other`.
    #[must_use]
    pub fn join(&self, other: &Self) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self { segments }
    }

    /// Returns the path text without the root marker.
    ///
    /// The root path renders as an empty string.
    #[must_use]
    pub fn relative(&self) -> String {
        let mut out = String::new();
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            out.push_str(&segment.to_string());
        }
        out
    }

    /// Returns this path with every index moved to another index base.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::IndexUnderflow`] when shifting a zero index down.
    pub fn shifted(&self, shift: IndexShift) -> Result<Self, PathError> {
        let mut segments = self.segments.clone();
        for segment in &mut segments {
            if let Some(index) = segment.index {
                segment.index = Some(
                    shift
                        .apply(index)
                        .ok_or_else(|| PathError::IndexUnderflow {
                            path: self.to_string(),
                        })?,
                );
            }
        }
        Ok(Self { segments })
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(ROOT_MARKER)?;
        for segment in &self.segments {
            write!(f, ".{segment}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjectPath")
            .field(&format_args!("{self}"))
            .finish()
    }
}

impl FromStr for ObjectPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'a> IntoIterator for &'a ObjectPath {
    type Item = &'a Segment;
    type IntoIter = core::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_indexed_path() {
        let path = ObjectPath::parse("RootModel.Compartment[2].Species[5]").unwrap();
        assert_eq!(path.segments(), ["RootModel", "Compartment", "Species"]);
        assert_eq!(path.indices(), [2, 5]);
        assert_eq!(path.to_string(), "RootModel.Compartment[2].Species[5]");
    }

    #[test]
    fn build_reproduces_parsed_text() {
        let path = ObjectPath::parse("RootModel.Compartment[2].Species[5]").unwrap();
        let rebuilt = ObjectPath::build(&path.segments(), &path.indices());
        assert_eq!(rebuilt.to_string(), "RootModel.Compartment[2].Species[5]");
    }

    #[test]
    fn build_without_root_marker_adds_it() {
        let path = ObjectPath::build(&["Compartment"], &[]);
        assert_eq!(path.to_string(), "RootModel.Compartment");
    }

    #[test]
    fn build_hands_out_indices_in_encounter_order() {
        let path = ObjectPath::build(&["A", "B", "C"], &[4]);
        assert_eq!(path.to_string(), "RootModel.A[4].B.C");
    }

    #[test]
    fn empty_text_is_root() {
        let path = ObjectPath::parse("").unwrap();
        assert!(path.is_root());
        assert_eq!(path.segments(), ["RootModel"]);
        assert!(path.indices().is_empty());
        assert_eq!(path.to_string(), "RootModel");
        assert_eq!(ObjectPath::parse("RootModel").unwrap(), path);
    }

    #[test]
    fn root_marker_is_optional() {
        let a = ObjectPath::parse("RootModel.Name").unwrap();
        let b = ObjectPath::parse("Name").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.relative(), "Name");
    }

    #[test]
    fn root_marker_only_stripped_in_first_position() {
        let path = ObjectPath::parse("Outer.RootModel").unwrap();
        assert_eq!(path.segments(), ["RootModel", "Outer", "RootModel"]);
    }

    #[test]
    fn malformed_paths_are_rejected() {
        for text in [
            "A..B",
            ".A",
            "A.",
            "A[",
            "A]",
            "A[x]",
            "A[]",
            "A[-1]",
            "[0]",
            "A[1]B",
            "A[1][2]",
            "A]b[1]",
        ] {
            let result = ObjectPath::parse(text);
            assert!(
                matches!(result, Err(PathError::InvalidPath { .. })),
                "expected `{text}` to be rejected, got {result:?}"
            );
        }
    }

    #[test]
    fn parent_and_last() {
        let path = ObjectPath::parse("Parameters[0].Min").unwrap();
        assert_eq!(path.last().unwrap().to_string(), "Min");
        let parent = path.parent().unwrap();
        assert_eq!(parent.relative(), "Parameters[0]");
        assert_eq!(parent.last().unwrap().index(), Some(0));
        assert!(ObjectPath::root().parent().is_none());
        assert!(ObjectPath::root().last().is_none());
    }

    #[test]
    fn child_and_join() {
        let base = ObjectPath::parse("Compartment[1]").unwrap();
        assert_eq!(base.child("Name").relative(), "Compartment[1].Name");
        assert_eq!(
            base.indexed_child("Species", 3).relative(),
            "Compartment[1].Species[3]"
        );
        let tail = ObjectPath::parse("Species[0].Name").unwrap();
        assert_eq!(base.join(&tail).relative(), "Compartment[1].Species[0].Name");
    }

    #[test]
    fn shifted_moves_every_index() {
        let path = ObjectPath::parse("A[0].B.C[4]").unwrap();
        let up = path.shifted(IndexShift::ToOneBased).unwrap();
        assert_eq!(up.relative(), "A[1].B.C[5]");
        assert_eq!(up.shifted(IndexShift::ToZeroBased).unwrap(), path);
        assert!(matches!(
            path.shifted(IndexShift::ToZeroBased),
            Err(PathError::IndexUnderflow { .. })
        ));
    }

    #[test]
    fn from_str_and_debug() {
        let path: ObjectPath = "A[1]".parse().unwrap();
        assert_eq!(format!("{path:?}"), "ObjectPath(RootModel.A[1])");
    }
}
