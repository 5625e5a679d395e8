//! Paragraph boundary scanning.
//!
//! A paragraph is a maximal run of units without a newline-class unit. The
//! newline belongs to the paragraph it terminates; the unit after it starts
//! the next one. Ranges returned here never include the terminating newline.
//!
//! All functions are pure reads over the text and take positions in buffer
//! units (chars).
//!
//! ```ignore
//! use ropey::Rope;
//! use the_richtext::paragraph::{current_paragraph_start, paragraph_ranges};
//! use the_richtext::range::Range;
//!
//! let text = Rope::from_str("foo\n\nbaz");
//! assert_eq!(current_paragraph_start(text.slice(..), 4), 4);
//! assert_eq!(paragraph_ranges(text.slice(..), Range::new(0, 8)).len(), 3);
//! ```

use ropey::RopeSlice;
use smallvec::SmallVec;
use the_core::line_ending::{
  ends_with_line_ending,
  is_line_ending_at,
};

use crate::range::Range;

/// Paragraph list for a query. Most queries touch one or two paragraphs.
pub type ParagraphRanges = SmallVec<[Range; 2]>;

/// Start of the paragraph containing `pos`.
///
/// `pos` is clamped to the last unit, except that a position at the very end
/// of a buffer ending with a newline is the start of the empty trailing
/// paragraph.
pub fn current_paragraph_start(text: RopeSlice, pos: usize) -> usize {
  let len = text.len_chars();
  if pos == len && ends_with_line_ending(text) {
    return pos;
  }
  if len == 0 {
    return 0;
  }

  let mut idx = pos.min(len - 1);
  while idx > 0 && !is_line_ending_at(text, idx - 1) {
    idx -= 1;
  }
  idx
}

/// Every paragraph intersecting `range`, left to right.
///
/// Empty paragraphs between consecutive newlines come out as zero-length
/// ranges. A query starting past the end yields nothing; an empty buffer
/// queried at `(0, 0)` yields one empty paragraph.
pub fn paragraph_ranges(text: RopeSlice, range: Range) -> ParagraphRanges {
  let len = text.len_chars();
  let mut result = ParagraphRanges::new();

  if range.start > len {
    return result;
  }
  if len == 0 && range == Range::point(0) {
    result.push(Range::point(0));
    return result;
  }

  let mut start = current_paragraph_start(text, range.start);
  if start == len {
    result.push(Range::point(start));
    return result;
  }

  let mut idx = start;
  while idx < len {
    if is_line_ending_at(text, idx) {
      result.push(Range::from_bounds(start, idx));
      idx += 1;
      start = idx;
      if idx >= range.end() {
        break;
      }
    } else {
      idx += 1;
    }
  }

  let tail = idx - start;
  if tail > 0 || (range.end() == len && ends_with_line_ending(text)) {
    result.push(Range::new(start, tail));
  }

  result
}

/// The paragraph containing `pos`.
pub fn paragraph_range(text: RopeSlice, pos: usize) -> Option<Range> {
  paragraph_ranges(text, Range::point(pos)).first().copied()
}

/// The paragraph strictly before the one containing `pos`.
pub fn previous_paragraph_range(text: RopeSlice, pos: usize) -> Option<Range> {
  let len = text.len_chars();
  let newline = (0..pos.min(len))
    .rev()
    .find(|&idx| is_line_ending_at(text, idx))?;

  let start = current_paragraph_start(text, newline);
  Some(Range::from_bounds(start, newline))
}

/// Start of the paragraph after the one containing `pos`. An empty trailing
/// paragraph does not count.
pub fn next_paragraph_start(text: RopeSlice, pos: usize) -> Option<usize> {
  let len = text.len_chars();
  let mut idx = pos;
  loop {
    let newline = is_line_ending_at(text, idx);
    idx += 1;
    if idx >= len || newline {
      break;
    }
  }
  (idx < len).then_some(idx)
}

/// [`next_paragraph_start`], falling back to the current paragraph start.
pub fn next_paragraph_start_or_current(text: RopeSlice, pos: usize) -> usize {
  next_paragraph_start(text, pos).unwrap_or_else(|| current_paragraph_start(text, pos))
}

pub fn next_paragraph_range(text: RopeSlice, pos: usize) -> Option<Range> {
  let start = next_paragraph_start(text, pos)?;
  let len = text.len_chars();
  let end = (start..len)
    .find(|&idx| is_line_ending_at(text, idx))
    .unwrap_or(len);
  Some(Range::from_bounds(start, end))
}
