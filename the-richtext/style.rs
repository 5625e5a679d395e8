//! Named styles: composable policies that test, apply and remove a
//! formatting effect over a range.
//!
//! A [`Style`] applies its own edits to the buffer it is handed and returns
//! them, re-mapping the caller's anchor range through every edit it emits so
//! that several styles can be chained against a moving target. A style that
//! has nothing to do (absent range, failed predicate) returns an empty list.
//!
//! The building blocks live in submodules:
//!
//! - [`attributed`]: leaf styles that set, strip or clean up attributes.
//! - [`combinator`]: wrappers that compose other styles.
//! - [`ranges`]: wrappers that run a style per paragraph.
//! - [`list`]: bullet, number and todo markers, plus the copy export.

use std::{
  borrow::Cow,
  fmt,
  sync::Arc,
};

use crate::{
  buffer::Buffer,
  edit::{
    Edit,
    Result,
  },
  paragraph::paragraph_ranges,
  range::Range,
};

pub mod attributed;
pub mod combinator;
pub mod list;
pub mod ranges;

pub use attributed::{
  Attributed,
  CleanupAttributes,
  RemoveAttributes,
  Rule,
};
pub use combinator::{
  Array,
  Combined,
  Conditional,
  Discard,
  Proxy,
  Replace,
  Toggle,
};
pub use list::{
  BulletList,
  List,
  MarkerCopy,
  MarkerSource,
  NumberList,
  TodoList,
};
pub use ranges::{
  LineBreaks,
  Paragraphs,
  PreviousParagraph,
  Ranges,
  Scope,
};

pub trait Style: fmt::Debug + Send + Sync {
  fn name(&self) -> Cow<'_, str>;

  /// Whether `range` already carries this style.
  fn matches(&self, buffer: &Buffer, range: Range) -> bool;

  /// Convert `range` to this style. `range` is re-mapped through the
  /// returned edits, which are already applied to `buffer`.
  fn apply(&self, buffer: &mut Buffer, range: &mut Option<Range>) -> Result<Vec<Edit>>;

  /// Revert this style on `range`. Same contract as [`Style::apply`].
  fn remove(&self, buffer: &mut Buffer, range: &mut Option<Range>) -> Result<Vec<Edit>>;
}

pub type StyleRef = Arc<dyn Style>;

/// Does nothing and never matches.
#[derive(Debug, Default, Clone, Copy)]
pub struct Stub;

impl Stub {
  pub fn shared() -> StyleRef {
    Arc::new(Stub)
  }
}

impl Style for Stub {
  fn name(&self) -> Cow<'_, str> {
    "".into()
  }

  fn matches(&self, _buffer: &Buffer, _range: Range) -> bool {
    false
  }

  fn apply(&self, _buffer: &mut Buffer, _range: &mut Option<Range>) -> Result<Vec<Edit>> {
    Ok(Vec::new())
  }

  fn remove(&self, _buffer: &mut Buffer, _range: &mut Option<Range>) -> Result<Vec<Edit>> {
    Ok(Vec::new())
  }
}

// Sequences of styles.
//

/// Logical AND of every style. An empty list matches.
pub fn matches_all(styles: &[StyleRef], buffer: &Buffer, range: Range) -> bool {
  styles.iter().all(|style| style.matches(buffer, range))
}

/// Apply every style in order, concatenating their edits.
pub fn apply_all(
  styles: &[StyleRef],
  buffer: &mut Buffer,
  range: &mut Option<Range>,
) -> Result<Vec<Edit>> {
  let mut edits = Vec::new();
  for style in styles {
    edits.extend(style.apply(buffer, range)?);
  }
  Ok(edits)
}

/// Remove every style in order, concatenating their edits.
pub fn remove_all(
  styles: &[StyleRef],
  buffer: &mut Buffer,
  range: &mut Option<Range>,
) -> Result<Vec<Edit>> {
  let mut edits = Vec::new();
  for style in styles {
    edits.extend(style.remove(buffer, range)?);
  }
  Ok(edits)
}

pub fn matching(styles: &[StyleRef], buffer: &Buffer, range: Range) -> Vec<StyleRef> {
  styles
    .iter()
    .filter(|style| style.matches(buffer, range))
    .cloned()
    .collect()
}

/// First style matching every paragraph the selection touches.
pub fn first_named_style<'a>(
  styles: &'a [StyleRef],
  buffer: &Buffer,
  selection: Range,
) -> Option<&'a StyleRef> {
  let paragraphs = paragraph_ranges(buffer.text(), selection);
  styles.iter().find(|style| {
    paragraphs
      .iter()
      .all(|paragraph| style.matches(buffer, *paragraph))
  })
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::attribute::{
    AttrKey,
    AttrValue,
    Attributes,
  };

  fn underline() -> StyleRef {
    Arc::new(Attributed::new(
      "underline",
      Attributes::from([(AttrKey::Underline, AttrValue::Flag(true))]),
    ))
  }

  fn strike() -> StyleRef {
    Arc::new(Attributed::new(
      "strike",
      Attributes::from([(AttrKey::Strikethrough, AttrValue::Flag(true))]),
    ))
  }

  #[test]
  fn stub_is_inert() {
    let mut buffer = Buffer::new("abc");
    let mut range = Some(Range::new(0, 3));
    assert!(!Stub.matches(&buffer, Range::new(0, 3)));
    assert!(Stub.apply(&mut buffer, &mut range).unwrap().is_empty());
    assert!(Stub.remove(&mut buffer, &mut range).unwrap().is_empty());
    assert_eq!(Stub.name(), "");
  }

  #[test]
  fn sequences() {
    let styles = [underline(), strike()];
    let mut buffer = Buffer::new("abc\ndef");
    let mut range = Some(Range::new(0, 3));

    assert!(!matches_all(&styles, &buffer, Range::new(0, 3)));
    assert!(matches_all(&[], &buffer, Range::new(0, 3)));

    let edits = apply_all(&styles, &mut buffer, &mut range).unwrap();
    assert_eq!(edits.len(), 2);
    assert!(matches_all(&styles, &buffer, Range::new(0, 3)));
    assert_eq!(matching(&styles, &buffer, Range::new(4, 3)).len(), 0);

    remove_all(&styles[..1], &mut buffer, &mut range).unwrap();
    let matched = matching(&styles, &buffer, Range::new(0, 3));
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].name(), "strike");
  }

  #[test]
  fn first_named_style_needs_every_paragraph() {
    let styles = [underline(), strike()];
    let mut buffer = Buffer::new("abc\ndef");
    strike()
      .apply(&mut buffer, &mut Some(Range::new(0, 3)))
      .unwrap();

    let found = first_named_style(&styles, &buffer, Range::new(1, 0));
    assert_eq!(found.map(|style| style.name().into_owned()), Some("strike".into()));

    // the second paragraph has no style
    assert!(first_named_style(&styles, &buffer, Range::new(1, 4)).is_none());
  }
}
