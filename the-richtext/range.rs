//! Half-open text ranges and how they move through edits.
//!
//! A [`Range`] is a `start`/`len` pair in buffer units. Any range a caller
//! keeps across edits (the selection, a paragraph being processed) must be
//! re-mapped after every edit with [`Range::map`]. Mapping is lossy by
//! design: when an edit deletes the content a range was tracking the result
//! is `None`, never a guessed position.
//!
//! # Mapping table
//!
//! With `rm` the replaced span of the edit and `ins` the inserted length, the
//! first matching row wins:
//!
//! | # | edit position relative to range                       | result                       |
//! |---|-------------------------------------------------------|------------------------------|
//! | 1 | starts past the end                                   | unchanged                    |
//! | 1 | ends strictly before the start                        | start shifted                |
//! | 2 | non-empty range, same start, ends inside or inserts   | length grows by delta        |
//! | 3 | ends at or before the start                           | start shifted                |
//! | 4 | starts before and ends at or past the end             | `None`                       |
//! | 5 | same start, ends past the end                         | `None`                       |
//! | 6 | overlaps the left boundary                            | surviving tail after edit    |
//! | 7 | inside the range                                      | length grows by delta        |
//! | 8 | overlaps the right boundary                           | truncated at the edit start  |
//!
//! Attribute edits never move ranges.
//!
//! ```ignore
//! use the_richtext::{edit::Edit, range::Range};
//!
//! let range = Range::new(3, 4);
//! let edit = Edit::replace_text(Range::new(1, 5), "asd");
//! assert_eq!(range.map(&edit), Some(Range::new(4, 1)));
//! ```

use std::fmt;

use serde::{
  Deserialize,
  Serialize,
};

use crate::edit::Edit;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
  pub start: usize,
  pub len:   usize,
}

impl Range {
  #[inline]
  pub const fn new(start: usize, len: usize) -> Self {
    Self { start, len }
  }

  #[inline]
  pub const fn point(pos: usize) -> Self {
    Self::new(pos, 0)
  }

  /// Range covering `from..to`. `to` is clamped to `from`.
  #[inline]
  pub fn from_bounds(from: usize, to: usize) -> Self {
    Self::new(from, to.saturating_sub(from))
  }

  /// End of the range (exclusive).
  #[inline]
  #[must_use]
  pub const fn end(&self) -> usize {
    self.start + self.len
  }

  /// End of the range, `None` when it does not fit in a `usize`.
  #[inline]
  #[must_use]
  pub const fn checked_end(&self) -> Option<usize> {
    self.start.checked_add(self.len)
  }

  #[inline]
  #[must_use]
  pub const fn is_empty(&self) -> bool {
    self.len == 0
  }

  #[inline]
  pub fn contains(&self, pos: usize) -> bool {
    self.start <= pos && pos < self.end()
  }

  #[inline]
  pub fn contains_range(&self, other: &Self) -> bool {
    self.start <= other.start && self.end() >= other.end()
  }

  /// Overlapping part of both ranges, if they touch at all.
  pub fn intersection(&self, other: &Self) -> Option<Self> {
    let start = self.start.max(other.start);
    let end = self.end().min(other.end());
    (start <= end).then(|| Self::from_bounds(start, end))
  }

  #[inline]
  pub fn as_std(&self) -> std::ops::Range<usize> {
    self.start..self.end()
  }

  /// Map this range through one edit. `None` means the range was lost.
  #[must_use]
  pub fn map(self, edit: &Edit) -> Option<Self> {
    let Some((remove, inserted)) = edit.replacement() else {
      return Some(self);
    };
    self.map_replacement(remove, inserted)
  }

  /// Map this range through edits applied in order. Once lost, it stays lost.
  #[must_use]
  pub fn map_all<'a>(self, edits: impl IntoIterator<Item = &'a Edit>) -> Option<Self> {
    map_range(Some(self), edits)
  }

  fn map_replacement(self, remove: Range, inserted: usize) -> Option<Self> {
    let (start, end) = (self.start, self.end());
    let (rm_start, rm_end) = (remove.start, remove.end());
    // start + inserted - removed, written so that no intermediate underflows
    let shift = |pos: usize| pos + inserted - remove.len;

    if rm_start > end {
      return Some(self);
    }

    if rm_end < start {
      return Some(Self::new(shift(start), self.len));
    }

    if !self.is_empty() && rm_start == start && (rm_end < end || remove.is_empty()) {
      return Some(Self::new(start, shift(self.len)));
    }

    if rm_start <= start && rm_end <= start {
      return Some(Self::new(shift(start), self.len));
    }

    if rm_start < start && rm_end >= end {
      return None;
    }

    if rm_start == start && rm_end > end {
      return None;
    }

    if rm_start < start && rm_end > start {
      return Some(Self::new(rm_start + inserted, end - rm_end));
    }

    if rm_start >= start && rm_end <= end {
      return Some(Self::new(start, shift(self.len)));
    }

    if rm_start >= start && rm_end > end {
      return Some(Self::new(start, rm_start - start));
    }

    unreachable!("range {self} has no mapping through replacement of {remove}")
  }
}

impl fmt::Display for Range {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "({}, {})", self.start, self.len)
  }
}

impl From<std::ops::Range<usize>> for Range {
  fn from(range: std::ops::Range<usize>) -> Self {
    Self::from_bounds(range.start, range.end)
  }
}

/// Fold an optional anchor through `edits`.
pub fn map_range<'a>(
  range: Option<Range>,
  edits: impl IntoIterator<Item = &'a Edit>,
) -> Option<Range> {
  edits.into_iter().try_fold(range?, |range, edit| {
    let mapped = range.map(edit);
    if mapped.is_none() {
      tracing::trace!(%range, ?edit, "anchor range lost while mapping");
    }
    mapped
  })
}
