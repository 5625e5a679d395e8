//! Styles built out of other styles. None of them hold text state.

use std::{
  borrow::Cow,
  fmt,
  sync::Arc,
};

use parking_lot::RwLock;

use crate::{
  buffer::Buffer,
  edit::{
    Edit,
    Result,
  },
  range::Range,
  style::{
    Stub,
    Style,
    StyleRef,
    apply_all,
    matches_all,
    remove_all,
  },
};

/// Runs every member in order. Matches when all members match.
#[derive(Debug, Clone)]
pub struct Array(pub Vec<StyleRef>);

impl Style for Array {
  fn name(&self) -> Cow<'_, str> {
    "".into()
  }

  fn matches(&self, buffer: &Buffer, range: Range) -> bool {
    matches_all(&self.0, buffer, range)
  }

  fn apply(&self, buffer: &mut Buffer, range: &mut Option<Range>) -> Result<Vec<Edit>> {
    apply_all(&self.0, buffer, range)
  }

  fn remove(&self, buffer: &mut Buffer, range: &mut Option<Range>) -> Result<Vec<Edit>> {
    remove_all(&self.0, buffer, range)
  }
}

/// A primary style bundled with ancillary formatting.
///
/// The primary style provides the name and the match; applying or removing
/// runs every style of the bundle.
#[derive(Debug, Clone)]
pub struct Combined {
  primary: StyleRef,
  styles:  Vec<StyleRef>,
}

impl Combined {
  pub fn new(primary: StyleRef, styles: Vec<StyleRef>) -> Self {
    Self { primary, styles }
  }

  /// Bundle whose primary style is its first member.
  pub fn from_styles(styles: Vec<StyleRef>) -> Self {
    let primary = styles.first().cloned().unwrap_or_else(Stub::shared);
    Self { primary, styles }
  }
}

impl Style for Combined {
  fn name(&self) -> Cow<'_, str> {
    self.primary.name()
  }

  fn matches(&self, buffer: &Buffer, range: Range) -> bool {
    self.primary.matches(buffer, range)
  }

  fn apply(&self, buffer: &mut Buffer, range: &mut Option<Range>) -> Result<Vec<Edit>> {
    apply_all(&self.styles, buffer, range)
  }

  fn remove(&self, buffer: &mut Buffer, range: &mut Option<Range>) -> Result<Vec<Edit>> {
    remove_all(&self.styles, buffer, range)
  }
}

pub type Predicate = Arc<dyn Fn(&Buffer, Range) -> bool + Send + Sync>;

#[derive(Clone)]
enum Condition {
  Style(StyleRef),
  Predicate(Predicate),
}

impl Condition {
  fn holds(&self, buffer: &Buffer, range: Range) -> bool {
    match self {
      Self::Style(style) => style.matches(buffer, range),
      Self::Predicate(predicate) => predicate(buffer, range),
    }
  }
}

impl fmt::Debug for Condition {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Style(style) => f.debug_tuple("Style").field(style).finish(),
      Self::Predicate(_) => f.write_str("Predicate(..)"),
    }
  }
}

/// Gates a style on a condition over the given range. Matching reports the
/// condition itself.
#[derive(Debug, Clone)]
pub struct Conditional {
  style:     StyleRef,
  condition: Condition,
}

impl Conditional {
  /// Run `style` only where `condition` matches.
  pub fn new(style: StyleRef, condition: StyleRef) -> Self {
    Self {
      style,
      condition: Condition::Style(condition),
    }
  }

  pub fn with_predicate(
    style: StyleRef,
    predicate: impl Fn(&Buffer, Range) -> bool + Send + Sync + 'static,
  ) -> Self {
    Self {
      style,
      condition: Condition::Predicate(Arc::new(predicate)),
    }
  }

  fn holds(&self, buffer: &Buffer, range: Option<Range>) -> bool {
    range.is_some_and(|range| self.condition.holds(buffer, range))
  }
}

impl Style for Conditional {
  fn name(&self) -> Cow<'_, str> {
    self.style.name()
  }

  fn matches(&self, buffer: &Buffer, range: Range) -> bool {
    self.condition.holds(buffer, range)
  }

  fn apply(&self, buffer: &mut Buffer, range: &mut Option<Range>) -> Result<Vec<Edit>> {
    if !self.holds(buffer, *range) {
      return Ok(Vec::new());
    }
    self.style.apply(buffer, range)
  }

  fn remove(&self, buffer: &mut Buffer, range: &mut Option<Range>) -> Result<Vec<Edit>> {
    if !self.holds(buffer, *range) {
      return Ok(Vec::new());
    }
    self.style.remove(buffer, range)
  }
}

/// Removes `discard` before applying `master`: one member of a group of
/// mutually exclusive styles.
#[derive(Debug, Clone)]
pub struct Discard {
  master:  StyleRef,
  discard: StyleRef,
}

impl Discard {
  pub fn new(discard: StyleRef, master: StyleRef) -> Self {
    Self { master, discard }
  }
}

impl Style for Discard {
  fn name(&self) -> Cow<'_, str> {
    self.master.name()
  }

  fn matches(&self, buffer: &Buffer, range: Range) -> bool {
    self.master.matches(buffer, range)
  }

  fn apply(&self, buffer: &mut Buffer, range: &mut Option<Range>) -> Result<Vec<Edit>> {
    let mut edits = self.discard.remove(buffer, range)?;
    edits.extend(self.master.apply(buffer, range)?);
    Ok(edits)
  }

  fn remove(&self, buffer: &mut Buffer, range: &mut Option<Range>) -> Result<Vec<Edit>> {
    self.master.remove(buffer, range)
  }
}

/// Applying removes the inner style where it matches and applies it
/// elsewhere. Removing does nothing.
#[derive(Debug, Clone)]
pub struct Toggle(pub StyleRef);

impl Style for Toggle {
  fn name(&self) -> Cow<'_, str> {
    self.0.name()
  }

  fn matches(&self, buffer: &Buffer, range: Range) -> bool {
    self.0.matches(buffer, range)
  }

  fn apply(&self, buffer: &mut Buffer, range: &mut Option<Range>) -> Result<Vec<Edit>> {
    let Some(target) = *range else {
      return Ok(Vec::new());
    };
    if self.matches(buffer, target) {
      self.0.remove(buffer, range)
    } else {
      self.0.apply(buffer, range)
    }
  }

  fn remove(&self, _buffer: &mut Buffer, _range: &mut Option<Range>) -> Result<Vec<Edit>> {
    Ok(Vec::new())
  }
}

/// Delegates to a swappable inner style.
#[derive(Debug)]
pub struct Proxy {
  inner: RwLock<StyleRef>,
}

impl Proxy {
  pub fn new(inner: StyleRef) -> Self {
    Self {
      inner: RwLock::new(inner),
    }
  }

  pub fn inner(&self) -> StyleRef {
    self.inner.read().clone()
  }

  pub fn set_inner(&self, inner: StyleRef) {
    *self.inner.write() = inner;
  }
}

impl Default for Proxy {
  fn default() -> Self {
    Self::new(Stub::shared())
  }
}

impl Style for Proxy {
  fn name(&self) -> Cow<'_, str> {
    Cow::Owned(self.inner().name().into_owned())
  }

  fn matches(&self, buffer: &Buffer, range: Range) -> bool {
    self.inner().matches(buffer, range)
  }

  fn apply(&self, buffer: &mut Buffer, range: &mut Option<Range>) -> Result<Vec<Edit>> {
    self.inner().apply(buffer, range)
  }

  fn remove(&self, buffer: &mut Buffer, range: &mut Option<Range>) -> Result<Vec<Edit>> {
    self.inner().remove(buffer, range)
  }
}

/// Applies `dst` where `src` matches. Never matches; removing does nothing.
#[derive(Debug, Clone)]
pub struct Replace {
  src: StyleRef,
  dst: StyleRef,
}

impl Replace {
  pub fn new(src: StyleRef, dst: StyleRef) -> Self {
    Self { src, dst }
  }
}

impl Style for Replace {
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
    if !self.src.matches(buffer, target) {
      return Ok(Vec::new());
    }
    self.dst.apply(buffer, range)
  }

  fn remove(&self, _buffer: &mut Buffer, _range: &mut Option<Range>) -> Result<Vec<Edit>> {
    Ok(Vec::new())
  }
}
