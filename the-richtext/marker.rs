//! List marker cells: bullets, numbers and todo checkboxes.
//!
//! A [`Marker`] is stored in the [`AttrKey::Marker`] attribute of a single
//! placeholder unit at the start of a paragraph, so it is owned by the buffer
//! and dies with its cell.
//!
//! # Numbering
//!
//! Number markers keep their displayed text as a cache that is recomputed
//! when observed: the text is the previous paragraph's number plus one. A
//! refresh that changes a cell also refreshes the next paragraph's cell, but
//! only one step. Renumbering after an edit in the middle of a list therefore
//! trickles down as cells get observed; [`refresh_markers`] over a range (a
//! redraw pass, top to bottom) settles every cell in it.
//!
//! [`AttrKey::Marker`]: crate::attribute::AttrKey::Marker

use serde::{
  Deserialize,
  Serialize,
};
use the_core::chars::leading_number;
use thiserror::Error;

use crate::{
  Tendril,
  attribute::Font,
  buffer::Buffer,
  paragraph::{
    next_paragraph_range,
    paragraph_ranges,
    previous_paragraph_range,
  },
  range::Range,
};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown marker kind id {0}")]
pub struct UnknownMarkerKind(pub u8);

/// Marker kind. The numeric ids are persisted and must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MarkerKind {
  Bullet = 1,
  Number = 2,
  Todo   = 3,
}

impl MarkerKind {
  #[inline]
  pub const fn id(self) -> u8 {
    self as u8
  }
}

impl TryFrom<u8> for MarkerKind {
  type Error = UnknownMarkerKind;

  fn try_from(id: u8) -> Result<Self, Self::Error> {
    match id {
      1 => Ok(Self::Bullet),
      2 => Ok(Self::Number),
      3 => Ok(Self::Todo),
      id => Err(UnknownMarkerKind(id)),
    }
  }
}

impl From<MarkerKind> for u8 {
  fn from(kind: MarkerKind) -> Self {
    kind.id()
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarkerPayload {
  Bullet {
    text: Tendril,
  },
  Number {
    /// Displayed text, recomputed from the buffer when observed.
    #[serde(skip)]
    text:   Tendril,
    suffix: Tendril,
  },
  Todo {
    checked: bool,
  },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
  pub kind:    MarkerKind,
  /// Font the marker is rendered with.
  pub font:    Font,
  pub payload: MarkerPayload,
}

impl Marker {
  pub fn bullet(font: Font, text: impl Into<Tendril>) -> Self {
    Self {
      kind: MarkerKind::Bullet,
      font,
      payload: MarkerPayload::Bullet { text: text.into() },
    }
  }

  pub fn number(font: Font, text: impl Into<Tendril>, suffix: impl Into<Tendril>) -> Self {
    Self {
      kind: MarkerKind::Number,
      font,
      payload: MarkerPayload::Number {
        text:   text.into(),
        suffix: suffix.into(),
      },
    }
  }

  pub fn todo(font: Font, checked: bool) -> Self {
    Self {
      kind: MarkerKind::Todo,
      font,
      payload: MarkerPayload::Todo { checked },
    }
  }

  /// Displayed text of bullet and number markers.
  pub fn text(&self) -> Option<&str> {
    match &self.payload {
      MarkerPayload::Bullet { text } | MarkerPayload::Number { text, .. } => Some(text),
      MarkerPayload::Todo { .. } => None,
    }
  }

  /// Leading number of a number marker's text.
  pub fn number_value(&self) -> Option<u64> {
    match &self.payload {
      MarkerPayload::Number { text, .. } => leading_number(text),
      _ => None,
    }
  }

  pub fn checked(&self) -> Option<bool> {
    match self.payload {
      MarkerPayload::Todo { checked } => Some(checked),
      _ => None,
    }
  }

  /// Plain-text stand-in used when exporting text without marker cells.
  pub fn plain_text(&self) -> Tendril {
    match &self.payload {
      MarkerPayload::Bullet { text } | MarkerPayload::Number { text, .. } => {
        let mut plain = text.clone();
        plain.push(' ');
        plain
      },
      MarkerPayload::Todo { checked: false } => "[ ] ".into(),
      MarkerPayload::Todo { checked: true } => "[x] ".into(),
    }
  }
}

/// Text a number marker at `pos` should display.
pub fn number_text(buffer: &Buffer, pos: usize, suffix: &str) -> Tendril {
  let previous = previous_paragraph_range(buffer.text(), pos)
    .and_then(|paragraph| buffer.marker_at(paragraph.start))
    .and_then(Marker::number_value)
    .unwrap_or(0);

  format!("{}{suffix}", previous.saturating_add(1)).as_str().into()
}

/// Observe the marker at `pos`: refresh it and return its text.
pub fn marker_text(buffer: &mut Buffer, pos: usize) -> Option<Tendril> {
  refresh_marker(buffer, pos);
  buffer.marker_at(pos)?.text().map(Tendril::from)
}

/// Recompute the number marker at `pos`. When its text changed, the next
/// paragraph's number marker is recomputed as well (one step, no further).
/// Returns whether the cell at `pos` changed.
pub fn refresh_marker(buffer: &mut Buffer, pos: usize) -> bool {
  if !refresh_cell(buffer, pos) {
    return false;
  }
  if let Some(next) = next_paragraph_range(buffer.text(), pos) {
    refresh_cell(buffer, next.start);
  }
  true
}

/// Redraw pass: refresh the leading marker of every paragraph in `range`, top
/// to bottom. Returns how many cells changed.
pub fn refresh_markers(buffer: &mut Buffer, range: Range) -> usize {
  let paragraphs = paragraph_ranges(buffer.text(), range);
  let changed = paragraphs
    .iter()
    .filter(|paragraph| refresh_cell(buffer, paragraph.start))
    .count();

  if changed > 0 {
    tracing::debug!(%range, changed, "renumbered markers");
  }
  changed
}

fn refresh_cell(buffer: &mut Buffer, pos: usize) -> bool {
  let Some(MarkerPayload::Number { text, suffix }) = buffer.marker_at(pos).map(|m| &m.payload)
  else {
    return false;
  };

  let fresh = number_text(buffer, pos, suffix);
  if *text == fresh {
    return false;
  }
  tracing::debug!(pos, from = %text, to = %fresh, "renumbering marker");

  buffer.update_marker(pos, |marker| {
    if let MarkerPayload::Number { text, .. } = &mut marker.payload {
      *text = fresh;
    }
  });
  buffer.request_redraw(Range::new(pos, 1));
  true
}

/// Flip the todo marker at `pos`. Returns the new state.
pub fn toggle_todo(buffer: &mut Buffer, pos: usize) -> Option<bool> {
  let checked = !buffer.marker_at(pos)?.checked()?;
  set_todo_checked(buffer, pos, checked);
  Some(checked)
}

/// Set the checked state of the todo marker at `pos`. Returns `false` when
/// there is no todo marker there.
pub fn set_todo_checked(buffer: &mut Buffer, pos: usize, checked: bool) -> bool {
  if buffer
    .marker_at(pos)
    .and_then(Marker::checked)
    .is_none()
  {
    return false;
  }

  buffer.update_marker(pos, |marker| {
    marker.payload = MarkerPayload::Todo { checked };
  });
  buffer.request_redraw(Range::new(pos, 1));
  buffer.notify_changed(&[]);
  true
}
