//! Attribute-level leaf styles.

use std::{
  borrow::Cow,
  collections::BTreeSet,
};

use smallvec::SmallVec;

use crate::{
  Tendril,
  attribute::{
    AttrKey,
    AttrKeys,
    AttrValue,
    Attributes,
  },
  buffer::Buffer,
  edit::{
    Edit,
    Result,
  },
  range::Range,
  style::Style,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
  /// Change font family and size only, keep the traits (bold, italic, ...)
  /// each run already has.
  PreserveFontTraits,
}

/// Sets a fixed attribute map.
///
/// Matching is strict: every tested attribute must hold the expected value
/// over the exact queried range, not just somewhere inside it.
#[derive(Debug, Clone)]
pub struct Attributed {
  name:     Tendril,
  attrs:    Attributes,
  matching: Attributes,
  rules:    SmallVec<[Rule; 1]>,
}

impl Attributed {
  pub fn new(name: impl Into<Tendril>, attrs: Attributes) -> Self {
    Self {
      name: name.into(),
      matching: attrs.clone(),
      attrs,
      rules: SmallVec::new(),
    }
  }

  /// Test a different attribute map than the one applied.
  #[must_use]
  pub fn matching(mut self, matching: Attributes) -> Self {
    self.matching = matching;
    self
  }

  #[must_use]
  pub fn with_rule(mut self, rule: Rule) -> Self {
    if !self.rules.contains(&rule) {
      self.rules.push(rule);
    }
    self
  }

  pub fn attributes(&self) -> &Attributes {
    &self.attrs
  }

  fn preserving_edits(&self, buffer: &Buffer, range: Range) -> Option<Vec<Edit>> {
    let font = self.attrs.get(&AttrKey::Font)?.as_font()?;

    let mut edits: Vec<Edit> = buffer
      .runs_in(range)
      .map(|(run, attrs)| {
        let font = match attrs.get(&AttrKey::Font).and_then(AttrValue::as_font) {
          Some(current) => font.with_traits_of(current),
          None => font.clone(),
        };
        Edit::add_attributes(run, Attributes::from([(AttrKey::Font, AttrValue::Font(font))]))
      })
      .collect();

    let mut rest = self.attrs.clone();
    rest.remove(&AttrKey::Font);
    if !rest.is_empty() {
      edits.push(Edit::add_attributes(range, rest));
    }
    Some(edits)
  }
}

impl Style for Attributed {
  fn name(&self) -> Cow<'_, str> {
    Cow::Borrowed(self.name.as_str())
  }

  fn matches(&self, buffer: &Buffer, range: Range) -> bool {
    let len = buffer.len();
    if len == 0 {
      return false;
    }
    // at the end, test the unit the caret would extend
    let tested = if range.start >= len {
      Range::new(len - 1, 1)
    } else {
      range
    };

    self.matching.iter().all(|(key, expected)| {
      let (value, longest) = buffer.longest_effective_range(key, tested.start, tested);
      value == Some(expected) && longest == tested
    })
  }

  fn apply(&self, buffer: &mut Buffer, range: &mut Option<Range>) -> Result<Vec<Edit>> {
    let Some(target) = *range else {
      return Ok(Vec::new());
    };

    let edits = if self.rules.contains(&Rule::PreserveFontTraits) {
      self.preserving_edits(buffer, target)
    } else {
      None
    };
    let edits = edits.unwrap_or_else(|| vec![Edit::add_attributes(target, self.attrs.clone())]);

    buffer.apply_edits(edits, range)
  }

  fn remove(&self, buffer: &mut Buffer, range: &mut Option<Range>) -> Result<Vec<Edit>> {
    let Some(target) = *range else {
      return Ok(Vec::new());
    };
    let keys = self.attrs.keys().cloned();
    buffer.apply_edits([Edit::remove_attributes(target, keys)], range)
  }
}

/// Strips a fixed set of keys. Never matches; removing it does nothing.
#[derive(Debug, Clone)]
pub struct RemoveAttributes {
  name: Tendril,
  keys: AttrKeys,
}

impl RemoveAttributes {
  pub fn new(name: impl Into<Tendril>, keys: impl IntoIterator<Item = AttrKey>) -> Self {
    Self {
      name: name.into(),
      keys: keys.into_iter().collect(),
    }
  }

  /// Strips character-level text formatting.
  pub fn text() -> Self {
    Self::new("", [
      AttrKey::Font,
      AttrKey::Underline,
      AttrKey::Strikethrough,
    ])
  }
}

impl Style for RemoveAttributes {
  fn name(&self) -> Cow<'_, str> {
    Cow::Borrowed(self.name.as_str())
  }

  fn matches(&self, _buffer: &Buffer, _range: Range) -> bool {
    false
  }

  fn apply(&self, buffer: &mut Buffer, range: &mut Option<Range>) -> Result<Vec<Edit>> {
    let Some(target) = *range else {
      return Ok(Vec::new());
    };
    let edit = Edit::remove_attributes(target, self.keys.iter().cloned());
    buffer.apply_edits([edit], range)
  }

  fn remove(&self, _buffer: &mut Buffer, _range: &mut Option<Range>) -> Result<Vec<Edit>> {
    Ok(Vec::new())
  }
}

/// Strips every key except an allow-list, run by run.
#[derive(Debug, Clone)]
pub struct CleanupAttributes {
  name:    Tendril,
  allowed: BTreeSet<AttrKey>,
}

impl CleanupAttributes {
  pub fn new(name: impl Into<Tendril>, allowed: impl IntoIterator<Item = AttrKey>) -> Self {
    Self {
      name:    name.into(),
      allowed: allowed.into_iter().collect(),
    }
  }
}

impl Style for CleanupAttributes {
  fn name(&self) -> Cow<'_, str> {
    Cow::Borrowed(self.name.as_str())
  }

  fn matches(&self, _buffer: &Buffer, _range: Range) -> bool {
    false
  }

  fn apply(&self, buffer: &mut Buffer, range: &mut Option<Range>) -> Result<Vec<Edit>> {
    let Some(target) = *range else {
      return Ok(Vec::new());
    };

    let edits: Vec<Edit> = buffer
      .runs_in(target)
      .filter_map(|(run, attrs)| {
        let keys: AttrKeys = attrs
          .keys()
          .filter(|key| !self.allowed.contains(*key))
          .cloned()
          .collect();
        (!keys.is_empty()).then(|| Edit::RemoveAttributes { range: run, keys })
      })
      .collect();

    buffer.apply_edits(edits, range)
  }

  fn remove(&self, _buffer: &mut Buffer, _range: &mut Option<Range>) -> Result<Vec<Edit>> {
    Ok(Vec::new())
  }
}
