//! List styles: a marker cell at the start of the range.
//!
//! [`List`] is generic over a [`MarkerSource`] that decides which marker a
//! new cell gets. Applying a list where a cell of the same kind already sits
//! only refreshes the cell's font.

use std::borrow::Cow;

use crate::{
  Tendril,
  attribute::{
    AttrKey,
    AttrValue,
    Attributes,
    Font,
    FontTraits,
  },
  buffer::Buffer,
  edit::{
    Edit,
    Result,
    StyledText,
  },
  marker::{
    Marker,
    MarkerKind,
    number_text,
    refresh_markers,
  },
  range::Range,
  style::Style,
};

pub trait MarkerSource: std::fmt::Debug + Send + Sync {
  const KIND: MarkerKind;

  /// Marker for a new cell at the start of `range`.
  fn marker(&self, buffer: &Buffer, range: Range, font: &Font) -> Marker;

  /// Font the list renders its markers with.
  fn font(&self, font: Font) -> Font {
    font
  }
}

/// Fixed bullet text.
#[derive(Debug, Clone)]
pub struct Bullet {
  pub prefix: Tendril,
}

impl MarkerSource for Bullet {
  const KIND: MarkerKind = MarkerKind::Bullet;

  fn marker(&self, _buffer: &Buffer, _range: Range, font: &Font) -> Marker {
    Marker::bullet(font.clone(), self.prefix.clone())
  }
}

/// Previous paragraph's number plus one.
#[derive(Debug, Clone)]
pub struct Number {
  pub suffix: Tendril,
}

impl MarkerSource for Number {
  const KIND: MarkerKind = MarkerKind::Number;

  fn marker(&self, buffer: &Buffer, range: Range, font: &Font) -> Marker {
    let text = number_text(buffer, range.start, &self.suffix);
    Marker::number(font.clone(), text, self.suffix.clone())
  }

  fn font(&self, font: Font) -> Font {
    let traits = font.traits | FontTraits::MONOSPACED_DIGITS;
    font.with_traits(traits)
  }
}

/// Unchecked checkbox.
#[derive(Debug, Default, Clone, Copy)]
pub struct Todo;

impl MarkerSource for Todo {
  const KIND: MarkerKind = MarkerKind::Todo;

  fn marker(&self, _buffer: &Buffer, _range: Range, font: &Font) -> Marker {
    Marker::todo(font.clone(), false)
  }
}

#[derive(Debug, Clone)]
pub struct List<M> {
  name:   Tendril,
  font:   Font,
  source: M,
}

pub type BulletList = List<Bullet>;
pub type NumberList = List<Number>;
pub type TodoList = List<Todo>;

impl<M: MarkerSource> List<M> {
  pub fn new(name: impl Into<Tendril>, font: Font, source: M) -> Self {
    Self {
      name: name.into(),
      font: source.font(font),
      source,
    }
  }

  pub fn font(&self) -> &Font {
    &self.font
  }
}

impl BulletList {
  pub fn bullet(name: impl Into<Tendril>, prefix: impl Into<Tendril>, font: Font) -> Self {
    Self::new(name, font, Bullet {
      prefix: prefix.into(),
    })
  }
}

impl NumberList {
  pub fn number(name: impl Into<Tendril>, suffix: impl Into<Tendril>, font: Font) -> Self {
    Self::new(name, font, Number {
      suffix: suffix.into(),
    })
  }
}

impl TodoList {
  pub fn todo(name: impl Into<Tendril>, font: Font) -> Self {
    Self::new(name, font, Todo)
  }
}

impl<M: MarkerSource> Style for List<M> {
  fn name(&self) -> Cow<'_, str> {
    Cow::Borrowed(self.name.as_str())
  }

  fn matches(&self, buffer: &Buffer, range: Range) -> bool {
    buffer
      .marker_at(range.start)
      .is_some_and(|marker| marker.kind == M::KIND)
  }

  fn apply(&self, buffer: &mut Buffer, range: &mut Option<Range>) -> Result<Vec<Edit>> {
    let Some(target) = *range else {
      return Ok(Vec::new());
    };

    if self.matches(buffer, target) {
      let font = self.font.clone();
      if buffer.update_marker(target.start, |marker| marker.font = font) {
        buffer.request_redraw(Range::new(target.start, 1));
      }
      return Ok(Vec::new());
    }

    let marker = self.source.marker(buffer, target, &self.font);
    let attrs = Attributes::from([(AttrKey::Font, AttrValue::Font(self.font.clone()))]);
    let cell = StyledText::marker(marker, attrs);
    buffer.apply_edits([Edit::replace_styled(Range::point(target.start), cell)], range)
  }

  fn remove(&self, buffer: &mut Buffer, range: &mut Option<Range>) -> Result<Vec<Edit>> {
    let Some(target) = *range else {
      return Ok(Vec::new());
    };
    if !self.matches(buffer, target) {
      return Ok(Vec::new());
    }
    buffer.apply_edits([Edit::delete(Range::new(target.start, 1))], range)
  }
}

/// Copy export: replaces every marker cell in the range with its plain-text
/// stand-in. Never matches; removing does nothing. Only meant for a detached
/// copy of the buffer.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkerCopy;

impl Style for MarkerCopy {
  fn name(&self) -> Cow<'_, str> {
    "".into()
  }

  fn matches(&self, _buffer: &Buffer, _range: Range) -> bool {
    false
  }

  fn apply(&self, buffer: &mut Buffer, range: &mut Option<Range>) -> Result<Vec<Edit>> {
    let Some(target) = *range else {
      return Ok(Vec::new());
    };
    refresh_markers(buffer, target);

    let cells: Vec<(usize, Tendril, Attributes)> = (target.start..target.end())
      .filter_map(|pos| {
        let marker = buffer.marker_at(pos)?;
        let mut attrs = buffer.attributes_at(pos)?.1.clone();
        attrs.remove(&AttrKey::Marker);
        Some((pos, marker.plain_text(), attrs))
      })
      .collect();

    // right to left, so positions stay valid
    let edits: Vec<Edit> = cells
      .into_iter()
      .rev()
      .map(|(pos, text, attrs)| {
        Edit::replace_styled(Range::new(pos, 1), StyledText::new(text, attrs))
      })
      .collect();

    buffer.apply_edits(edits, range)
  }

  fn remove(&self, _buffer: &mut Buffer, _range: &mut Option<Range>) -> Result<Vec<Edit>> {
    Ok(Vec::new())
  }
}
