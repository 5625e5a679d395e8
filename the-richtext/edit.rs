//! Atomic buffer mutations.
//!
//! An [`Edit`] is one of four mutations on a [`Buffer`]: replacing a range
//! with plain text, replacing it with styled content (text, attribute runs and
//! embedded markers), or adding/removing attributes over a range.
//!
//! Edits are applied in order. A list of edits is only meaningful against the
//! buffer state it was produced from: each edit's range is expressed in the
//! coordinates left by the edits before it. Ranges computed before a batch
//! started must be folded through the earlier edits with
//! [`map_range`](crate::range::map_range) before being used.
//!
//! # Error Handling
//!
//! - **RangeOutOfBounds** - Edit range extends past the buffer end
//! - **InvalidStyledText** - Styled content runs don't cover its text
//!
//! [`Buffer`]: crate::buffer::Buffer

use smallvec::SmallVec;
use the_core::chars::OBJECT_REPLACEMENT;
use thiserror::Error;

use crate::{
  Tendril,
  attribute::{
    AttrKey,
    AttrKeys,
    AttrValue,
    Attributes,
  },
  marker::Marker,
  range::Range,
};

pub type Result<T> = std::result::Result<T, EditError>;

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum EditError {
  #[error("edit range {from}..{to} is out of bounds for buffer length {len}")]
  RangeOutOfBounds {
    from: usize,
    to:   usize,
    len:  usize,
  },
  #[error("styled text runs cover {runs} units but the text has {text}")]
  InvalidStyledText { runs: usize, text: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
  /// Delete `range`, insert plain `text` at its start.
  ReplaceText { range: Range, text: Tendril },

  /// Delete `range`, insert styled `content` at its start.
  ReplaceStyled { range: Range, content: StyledText },

  /// Merge `attrs` onto `range`, overwriting values of the same key.
  AddAttributes { range: Range, attrs: Attributes },

  /// Strip `keys` from `range`.
  RemoveAttributes { range: Range, keys: AttrKeys },
}

impl Edit {
  pub fn replace_text(range: Range, text: impl Into<Tendril>) -> Self {
    Self::ReplaceText {
      range,
      text: text.into(),
    }
  }

  pub fn replace_styled(range: Range, content: StyledText) -> Self {
    Self::ReplaceStyled { range, content }
  }

  pub fn delete(range: Range) -> Self {
    Self::replace_text(range, "")
  }

  pub fn add_attributes(range: Range, attrs: Attributes) -> Self {
    Self::AddAttributes { range, attrs }
  }

  pub fn remove_attributes(range: Range, keys: impl IntoIterator<Item = AttrKey>) -> Self {
    Self::RemoveAttributes {
      range,
      keys: keys.into_iter().collect(),
    }
  }

  /// The range this edit was issued against.
  pub fn range(&self) -> Range {
    match self {
      Self::ReplaceText { range, .. }
      | Self::ReplaceStyled { range, .. }
      | Self::AddAttributes { range, .. }
      | Self::RemoveAttributes { range, .. } => *range,
    }
  }

  /// Replaced span and inserted length, for text-changing edits only.
  pub fn replacement(&self) -> Option<(Range, usize)> {
    match self {
      Self::ReplaceText { range, text } => Some((*range, text.chars().count())),
      Self::ReplaceStyled { range, content } => Some((*range, content.len())),
      Self::AddAttributes { .. } | Self::RemoveAttributes { .. } => None,
    }
  }

  /// Net change of the buffer length caused by this edit.
  pub fn len_delta(&self) -> isize {
    self
      .replacement()
      .map_or(0, |(range, inserted)| inserted as isize - range.len as isize)
  }
}

pub(crate) fn validate_range(range: Range, len: usize) -> Result<()> {
  if range.checked_end().is_none_or(|end| end > len) {
    return Err(EditError::RangeOutOfBounds {
      from: range.start,
      to: range.start.saturating_add(range.len),
      len,
    });
  }
  Ok(())
}

/// Text with attribute runs, inserted by [`Edit::ReplaceStyled`].
///
/// Runs are `(len, attributes)` pairs covering the text from the start.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StyledText {
  text: Tendril,
  runs: SmallVec<[(usize, Attributes); 1]>,
}

impl StyledText {
  pub fn new(text: impl Into<Tendril>, attrs: Attributes) -> Self {
    let text = text.into();
    let len = text.chars().count();
    let mut runs = SmallVec::new();
    if len > 0 {
      runs.push((len, attrs));
    }
    Self { text, runs }
  }

  /// Build from explicit runs, which must cover the whole text.
  pub fn from_runs(
    text: impl Into<Tendril>,
    runs: impl IntoIterator<Item = (usize, Attributes)>,
  ) -> Result<Self> {
    let text = text.into();
    let runs: SmallVec<_> = runs.into_iter().filter(|(len, _)| *len > 0).collect();
    let covered: usize = runs.iter().map(|(len, _)| len).sum();
    let len = text.chars().count();
    if covered != len {
      return Err(EditError::InvalidStyledText {
        runs: covered,
        text: len,
      });
    }
    Ok(Self { text, runs })
  }

  /// A single marker cell: one placeholder unit carrying `marker` plus
  /// `attrs` (typically the marker's rendering font).
  pub fn marker(marker: Marker, mut attrs: Attributes) -> Self {
    attrs.insert(AttrKey::Marker, AttrValue::Marker(marker));
    Self::new(Tendril::from(OBJECT_REPLACEMENT.to_string().as_str()), attrs)
  }

  pub fn text(&self) -> &str {
    &self.text
  }

  pub fn runs(&self) -> &[(usize, Attributes)] {
    &self.runs
  }

  /// Length in units.
  pub fn len(&self) -> usize {
    self.runs.iter().map(|(len, _)| len).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.runs.is_empty()
  }
}
