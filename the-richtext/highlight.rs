//! Transient highlight of a single range (e.g. the current search hit).

use serde::{
  Deserialize,
  Serialize,
};

use crate::{
  attribute::{
    AttrKey,
    AttrValue,
    Attributes,
    Color,
  },
  buffer::Buffer,
  edit::{
    Edit,
    Result,
  },
  range::{
    Range,
    map_range,
  },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct HighlightingStyle {
  pub background: Color,
  pub foreground: Color,
}

impl Default for HighlightingStyle {
  fn default() -> Self {
    Self {
      background: Color::rgb(0xff, 0xe5, 0x00),
      foreground: Color::BLACK,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Stash {
  range:      Range,
  background: Option<Color>,
  foreground: Option<Color>,
}

/// Marks at most one range at a time. The colors found at the start of the
/// range are stashed and put back on [`Highlighter::reset`].
#[derive(Debug, Default, Clone)]
pub struct Highlighter {
  style: HighlightingStyle,
  stash: Option<Stash>,
}

impl Highlighter {
  pub fn new(style: HighlightingStyle) -> Self {
    Self { style, stash: None }
  }

  pub fn style(&self) -> HighlightingStyle {
    self.style
  }

  /// The highlighted range, if any.
  pub fn range(&self) -> Option<Range> {
    self.stash.map(|stash| stash.range)
  }

  /// Highlight `range`, resetting the previous highlight first. `None` only
  /// resets.
  pub fn set_range(&mut self, buffer: &mut Buffer, range: Option<Range>) -> Result<Vec<Edit>> {
    buffer.transact(|buffer| {
      let mut edits = self.reset(buffer)?;
      let Some(range) = range.filter(|range| !range.is_empty()) else {
        return Ok(edits);
      };

      let color = |key: AttrKey| {
        buffer
          .attribute_at(&key, range.start)
          .and_then(AttrValue::as_color)
      };
      let stash = Stash {
        range,
        background: color(AttrKey::BackgroundColor),
        foreground: color(AttrKey::ForegroundColor),
      };

      let attrs = Attributes::from([
        (AttrKey::BackgroundColor, AttrValue::Color(self.style.background)),
        (AttrKey::ForegroundColor, AttrValue::Color(self.style.foreground)),
      ]);
      edits.extend(buffer.apply_edits([Edit::add_attributes(range, attrs)], &mut None)?);
      self.stash = Some(stash);
      tracing::trace!(%range, "highlighted range");
      Ok(edits)
    })
  }

  /// Put the stashed colors back. Colors that were absent are removed.
  pub fn reset(&mut self, buffer: &mut Buffer) -> Result<Vec<Edit>> {
    let Some(stash) = self.stash.take() else {
      return Ok(Vec::new());
    };
    let Some(range) = stash
      .range
      .intersection(&Range::new(0, buffer.len()))
      .filter(|range| !range.is_empty())
    else {
      return Ok(Vec::new());
    };

    let mut restore = Attributes::new();
    let mut remove = Vec::new();
    for (key, color) in [
      (AttrKey::BackgroundColor, stash.background),
      (AttrKey::ForegroundColor, stash.foreground),
    ] {
      match color {
        Some(color) => {
          restore.insert(key, AttrValue::Color(color));
        },
        None => remove.push(key),
      }
    }

    let mut edits = Vec::new();
    if !restore.is_empty() {
      edits.push(Edit::add_attributes(range, restore));
    }
    if !remove.is_empty() {
      edits.push(Edit::remove_attributes(range, remove));
    }
    buffer.apply_edits(edits, &mut None)
  }

  /// Follow `edits` applied elsewhere. A highlight whose range was lost is
  /// forgotten.
  pub fn map(&mut self, edits: &[Edit]) {
    if let Some(stash) = &mut self.stash {
      match map_range(Some(stash.range), edits) {
        Some(range) => stash.range = range,
        None => self.stash = None,
      }
    }
  }
}
