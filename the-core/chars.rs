use crate::line_ending::LineEnding;

/// Placeholder scalar that occupies the single unit of an embedded marker
/// cell (U+FFFC OBJECT REPLACEMENT CHARACTER).
pub const OBJECT_REPLACEMENT: char = '\u{FFFC}';

#[inline]
pub fn char_is_line_ending(ch: char) -> bool {
  LineEnding::from_char(ch).is_some()
}

#[inline]
pub fn char_is_placeholder(ch: char) -> bool {
  ch == OBJECT_REPLACEMENT
}

/// Parses the run of decimal digits at the start of `s`.
///
/// `"12."` is `Some(12)`, `".1"` and `""` are `None`.
pub fn leading_number(s: &str) -> Option<u64> {
  let end = s
    .char_indices()
    .find(|(_, ch)| !ch.is_ascii_digit())
    .map_or(s.len(), |(idx, _)| idx);

  s[..end].parse().ok()
}
