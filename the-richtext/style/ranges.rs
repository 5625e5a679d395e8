//! Range-scoped styles.
//!
//! A [`Ranges`] style derives sub-ranges from the queried range through a
//! [`Scope`] and runs its inner style on each one, left to right. Sub-ranges
//! are computed up front against the buffer as it was, so each one is
//! re-mapped through the edits earlier sub-ranges emitted before it is used.

use std::borrow::Cow;

use ropey::RopeSlice;

use crate::{
  buffer::Buffer,
  edit::{
    Edit,
    Result,
  },
  paragraph::{
    ParagraphRanges,
    paragraph_ranges,
    previous_paragraph_range,
  },
  range::{
    Range,
    map_range,
  },
  style::{
    Style,
    StyleRef,
  },
};

pub trait Scope: std::fmt::Debug + Send + Sync {
  fn ranges(&self, text: RopeSlice, range: Range) -> ParagraphRanges;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LineBreaks {
  /// Paragraph content only.
  #[default]
  Without,
  /// Widen every paragraph not at the buffer start one unit to the left, over
  /// the newline that precedes it.
  Preceding,
}

/// Every paragraph intersecting the range.
#[derive(Debug, Default, Clone, Copy)]
pub struct Paragraphs {
  pub line_breaks: LineBreaks,
}

impl Scope for Paragraphs {
  fn ranges(&self, text: RopeSlice, range: Range) -> ParagraphRanges {
    let mut ranges = paragraph_ranges(text, range);
    if self.line_breaks == LineBreaks::Preceding {
      for paragraph in ranges.iter_mut().filter(|paragraph| paragraph.start > 0) {
        *paragraph = Range::new(paragraph.start - 1, paragraph.len + 1);
      }
    }
    ranges
  }
}

/// The paragraph before the one the range starts in.
#[derive(Debug, Default, Clone, Copy)]
pub struct PreviousParagraph;

impl Scope for PreviousParagraph {
  fn ranges(&self, text: RopeSlice, range: Range) -> ParagraphRanges {
    previous_paragraph_range(text, range.start)
      .into_iter()
      .collect()
  }
}

#[derive(Debug, Clone)]
pub struct Ranges<S> {
  scope: S,
  inner: StyleRef,
}

impl<S: Scope> Ranges<S> {
  pub fn new(scope: S, inner: StyleRef) -> Self {
    Self { scope, inner }
  }

  fn exec(
    &self,
    buffer: &mut Buffer,
    range: &mut Option<Range>,
    f: impl Fn(&dyn Style, &mut Buffer, &mut Option<Range>) -> Result<Vec<Edit>>,
  ) -> Result<Vec<Edit>> {
    let Some(target) = *range else {
      return Ok(Vec::new());
    };

    let mut edits = Vec::new();
    for sub in self.scope.ranges(buffer.text(), target) {
      let mut sub = map_range(Some(sub), &edits);
      let emitted = f(self.inner.as_ref(), buffer, &mut sub)?;
      edits.extend(emitted);
    }

    *range = map_range(*range, &edits);
    Ok(edits)
  }
}

impl Ranges<Paragraphs> {
  pub fn paragraphs(inner: StyleRef) -> Self {
    Self::new(Paragraphs::default(), inner)
  }

  pub fn paragraphs_with_line_breaks(inner: StyleRef) -> Self {
    Self::new(
      Paragraphs {
        line_breaks: LineBreaks::Preceding,
      },
      inner,
    )
  }
}

impl Ranges<PreviousParagraph> {
  pub fn previous_paragraph(inner: StyleRef) -> Self {
    Self::new(PreviousParagraph, inner)
  }
}

impl<S: Scope> Style for Ranges<S> {
  fn name(&self) -> Cow<'_, str> {
    self.inner.name()
  }

  fn matches(&self, buffer: &Buffer, range: Range) -> bool {
    self
      .scope
      .ranges(buffer.text(), range)
      .iter()
      .all(|sub| self.inner.matches(buffer, *sub))
  }

  fn apply(&self, buffer: &mut Buffer, range: &mut Option<Range>) -> Result<Vec<Edit>> {
    self.exec(buffer, range, |style, buffer, range| style.apply(buffer, range))
  }

  fn remove(&self, buffer: &mut Buffer, range: &mut Option<Range>) -> Result<Vec<Edit>> {
    self.exec(buffer, range, |style, buffer, range| style.remove(buffer, range))
  }
}
