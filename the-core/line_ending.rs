use ropey::RopeSlice;

use crate::chars::char_is_line_ending;

/// Newline-class scalars.
///
/// Every variant is exactly one unit wide. A `"\r\n"` pair is therefore two
/// separate separators, which yields an empty paragraph between them.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum LineEnding {
  /// U+000A -- LineFeed
  LF,

  /// U+000B -- VerticalTab
  VT,

  /// U+000C -- FormFeed
  FF,

  /// U+000D -- CarriageReturn
  CR,

  /// U+0085 -- NextLine
  Nel,

  /// U+2028 -- Line Separator
  LS,

  /// U+2029 -- ParagraphSeparator
  PS,
}

impl LineEnding {
  #[inline]
  pub const fn as_char(&self) -> char {
    match self {
      Self::LF => '\u{000A}',
      Self::VT => '\u{000B}',
      Self::FF => '\u{000C}',
      Self::CR => '\u{000D}',
      Self::Nel => '\u{0085}',
      Self::LS => '\u{2028}',
      Self::PS => '\u{2029}',
    }
  }

  #[inline]
  pub const fn as_str(&self) -> &'static str {
    match self {
      Self::LF => "\u{000A}",
      Self::VT => "\u{000B}",
      Self::FF => "\u{000C}",
      Self::CR => "\u{000D}",
      Self::Nel => "\u{0085}",
      Self::LS => "\u{2028}",
      Self::PS => "\u{2029}",
    }
  }

  #[inline]
  pub const fn from_char(ch: char) -> Option<LineEnding> {
    match ch {
      '\u{000A}' => Some(LineEnding::LF),
      '\u{000B}' => Some(LineEnding::VT),
      '\u{000C}' => Some(LineEnding::FF),
      '\u{000D}' => Some(LineEnding::CR),
      '\u{0085}' => Some(LineEnding::Nel),
      '\u{2028}' => Some(LineEnding::LS),
      '\u{2029}' => Some(LineEnding::PS),
      _ => None,
    }
  }
}

/// Whether the unit at `idx` is newline-class. Out of range is `false`.
#[inline]
pub fn is_line_ending_at(text: RopeSlice, idx: usize) -> bool {
  text
    .get_char(idx)
    .is_some_and(char_is_line_ending)
}

/// Whether the last unit of `text` is newline-class.
#[inline]
pub fn ends_with_line_ending(text: RopeSlice) -> bool {
  let len = text.len_chars();
  len > 0 && is_line_ending_at(text, len - 1)
}

#[cfg(test)]
mod line_ending_tests {
  use ropey::Rope;

  use super::*;

  #[test]
  fn char_to_line_ending() {
    assert_eq!(LineEnding::from_char('\n'), Some(LineEnding::LF));
    assert_eq!(LineEnding::from_char('\r'), Some(LineEnding::CR));
    assert_eq!(LineEnding::from_char('\u{2029}'), Some(LineEnding::PS));
    assert_eq!(LineEnding::from_char('a'), None);
    assert_eq!(LineEnding::from_char('\t'), None);
  }

  #[test]
  fn line_ending_round_trips_through_char() {
    for ending in [
      LineEnding::LF,
      LineEnding::VT,
      LineEnding::FF,
      LineEnding::CR,
      LineEnding::Nel,
      LineEnding::LS,
      LineEnding::PS,
    ] {
      assert_eq!(LineEnding::from_char(ending.as_char()), Some(ending));
      assert_eq!(ending.as_str().chars().count(), 1);
    }
  }

  #[test]
  fn rope_line_ending_lookups() {
    let r = Rope::from_str("a\r\nb\n");
    let text = r.slice(..);

    assert!(!is_line_ending_at(text, 0));
    assert!(is_line_ending_at(text, 1));
    assert!(is_line_ending_at(text, 2));
    assert!(!is_line_ending_at(text, 3));
    assert!(!is_line_ending_at(text, 99));
    assert!(ends_with_line_ending(text));
    assert!(!ends_with_line_ending(Rope::from_str("").slice(..)));
    assert!(!ends_with_line_ending(Rope::from_str("abc").slice(..)));
  }
}
