//! Mutable styled-text buffer.
//!
//! A [`Buffer`] owns a [`Rope`] of text plus a list of attribute runs that
//! covers the text exactly. Edits go through [`Buffer::apply`], in order.
//!
//! # Markers
//!
//! Marker cells are ordinary units of text (a placeholder scalar) whose run
//! carries [`AttrKey::Marker`]. They live and die with their unit: deleting
//! the unit destroys the marker, and [`Buffer::update_marker`] mutates the
//! payload in place without a text edit.
//!
//! # Batches
//!
//! [`Buffer::transact`] groups several edits into one unit as seen by the
//! [`BufferListener`]: notifications are queued while the batch runs and
//! delivered once at the end, and a batch that fails is rolled back without
//! any notification. Outside a batch, notifications are delivered right away.

use std::{
  fmt,
  sync::Arc,
};

use ropey::{
  Rope,
  RopeSlice,
};
use the_core::chars::char_is_placeholder;

use crate::{
  attribute::{
    AttrKey,
    AttrValue,
    Attributes,
  },
  edit::{
    Edit,
    Result,
    StyledText,
    validate_range,
  },
  marker::Marker,
  range::Range,
};

/// Receives buffer notifications. Calls are fire-and-forget.
pub trait BufferListener: Send + Sync {
  /// Ask the host to redraw the given range (e.g. a marker whose text
  /// changed without a text edit).
  fn request_redraw(&self, range: Range);

  /// The buffer content changed. `edits` may be empty when only marker
  /// payloads changed.
  fn did_change(&self, edits: &[Edit]) {
    let _ = edits;
  }
}

#[derive(Debug, Default)]
pub struct NoListener;

impl BufferListener for NoListener {
  fn request_redraw(&self, _range: Range) {}
}

/// What a single [`Edit`] did to the buffer.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Consequences {
  pub len_delta:        isize,
  /// Markers destroyed with their cells, at their pre-edit positions.
  pub removed_markers:  Vec<(usize, Marker)>,
  pub inserted_markers: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Run {
  len:   usize,
  attrs: Attributes,
}

#[derive(Debug, Default)]
struct Batch {
  edits:   Vec<Edit>,
  changed: bool,
  redraws: Vec<Range>,
}

pub struct Buffer {
  text:     Rope,
  runs:     Vec<Run>,
  listener: Arc<dyn BufferListener>,
  batch:    Option<Batch>,
}

impl Buffer {
  pub fn new(text: &str) -> Self {
    Self::with_attributes(text, Attributes::new())
  }

  /// Buffer whose whole text carries `attrs`.
  pub fn with_attributes(text: &str, attrs: Attributes) -> Self {
    let text = Rope::from_str(text);
    let len = text.len_chars();
    let runs = if len == 0 {
      Vec::new()
    } else {
      vec![Run { len, attrs }]
    };

    Self {
      text,
      runs,
      listener: Arc::new(NoListener),
      batch: None,
    }
  }

  #[must_use]
  pub fn with_listener(mut self, listener: Arc<dyn BufferListener>) -> Self {
    self.listener = listener;
    self
  }

  pub fn set_listener(&mut self, listener: Arc<dyn BufferListener>) {
    self.listener = listener;
  }

  /// Copy of the content that notifies nobody.
  pub fn detached(&self) -> Self {
    Self {
      text:     self.text.clone(),
      runs:     self.runs.clone(),
      listener: Arc::new(NoListener),
      batch:    None,
    }
  }

  #[inline]
  pub fn text(&self) -> RopeSlice<'_> {
    self.text.slice(..)
  }

  #[inline]
  pub fn rope(&self) -> &Rope {
    &self.text
  }

  /// Length in units.
  #[inline]
  pub fn len(&self) -> usize {
    self.text.len_chars()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  // Attribute queries.
  //

  /// Every attribute run with its range, left to right.
  pub fn runs(&self) -> impl Iterator<Item = (Range, &Attributes)> + '_ {
    self.runs.iter().scan(0, |offset, run| {
      let range = Range::new(*offset, run.len);
      *offset += run.len;
      Some((range, &run.attrs))
    })
  }

  /// Runs intersecting `range`, clipped to it.
  pub fn runs_in(&self, range: Range) -> impl Iterator<Item = (Range, &Attributes)> + '_ {
    self
      .runs()
      .skip_while(move |(run, _)| run.end() <= range.start)
      .take_while(move |(run, _)| run.start < range.end())
      .filter_map(move |(run, attrs)| {
        let clipped = run.intersection(&range)?;
        (!clipped.is_empty()).then_some((clipped, attrs))
      })
  }

  /// Attributes at `pos` and the range of the run holding them.
  pub fn attributes_at(&self, pos: usize) -> Option<(Range, &Attributes)> {
    self.runs().find(|(range, _)| range.contains(pos))
  }

  pub fn attribute_at(&self, key: &AttrKey, pos: usize) -> Option<&AttrValue> {
    self.attributes_at(pos)?.1.get(key)
  }

  /// Value of `key` at `pos`, plus the longest range inside `within` around
  /// `pos` over which that value does not change.
  pub fn longest_effective_range(
    &self,
    key: &AttrKey,
    pos: usize,
    within: Range,
  ) -> (Option<&AttrValue>, Range) {
    let value = self.attribute_at(key, pos);
    if !within.contains(pos) {
      return (value, Range::point(pos.clamp(within.start, within.end())));
    }

    let runs: Vec<_> = self.runs_in(within).collect();
    let Some(idx) = runs.iter().position(|(range, _)| range.contains(pos)) else {
      return (value, Range::point(pos));
    };
    let same = |(_, attrs): &(Range, &Attributes)| attrs.get(key) == value;

    let first = runs[..idx]
      .iter()
      .rposition(|run| !same(run))
      .map_or(0, |i| i + 1);
    let last = runs[idx..]
      .iter()
      .position(|run| !same(run))
      .map_or(runs.len(), |i| idx + i);

    let range = Range::from_bounds(runs[first].0.start, runs[last - 1].0.end());
    (value, range)
  }

  // Markers.
  //

  /// The marker whose cell is the unit at `pos`, if any.
  pub fn marker_at(&self, pos: usize) -> Option<&Marker> {
    if !self.text.get_char(pos).is_some_and(char_is_placeholder) {
      return None;
    }
    self.attribute_at(&AttrKey::Marker, pos)?.as_marker()
  }

  /// Mutate the marker at `pos` in place. Returns `false` when there is no
  /// marker there. This is not an edit: nothing is notified.
  pub fn update_marker(&mut self, pos: usize, f: impl FnOnce(&mut Marker)) -> bool {
    let Some(mut marker) = self.marker_at(pos).cloned() else {
      return false;
    };
    f(&mut marker);

    let idx = self.split_at(pos);
    self.split_at(pos + 1);
    self.runs[idx]
      .attrs
      .insert(AttrKey::Marker, AttrValue::Marker(marker));
    self.normalize();
    true
  }

  // Mutation.
  //

  /// Apply one edit.
  pub fn apply(&mut self, edit: &Edit) -> Result<Consequences> {
    validate_range(edit.range(), self.len())?;
    tracing::trace!(?edit, "applying edit");

    let consequences = match edit {
      Edit::ReplaceText { range, text } => {
        let mut attrs = self.inherited_attributes(*range);
        attrs.remove(&AttrKey::Marker);
        let inserted = StyledText::new(text.clone(), attrs);
        self.replace(*range, &inserted)
      },
      Edit::ReplaceStyled { range, content } => self.replace(*range, content),
      Edit::AddAttributes { range, attrs } => {
        self.update_runs(*range, |run| {
          run.extend(attrs.iter().map(|(key, value)| (key.clone(), value.clone())))
        });
        Consequences::default()
      },
      Edit::RemoveAttributes { range, keys } => {
        self.update_runs(*range, |run| {
          for key in keys {
            run.remove(key);
          }
        });
        Consequences::default()
      },
    };

    self.notify_changed(std::slice::from_ref(edit));
    Ok(consequences)
  }

  /// Apply `edits` in order, folding `range` through each of them. Returns
  /// the applied edits.
  pub fn apply_edits(
    &mut self,
    edits: impl IntoIterator<Item = Edit>,
    range: &mut Option<Range>,
  ) -> Result<Vec<Edit>> {
    let edits: Vec<Edit> = edits.into_iter().collect();
    for edit in &edits {
      self.apply(edit)?;
      *range = range.and_then(|range| range.map(edit));
    }
    Ok(edits)
  }

  /// Run `f` as one batch. On error the buffer is restored to its state
  /// before the batch and nothing is notified. Nested calls join the
  /// outermost batch.
  pub fn transact<T, E>(
    &mut self,
    f: impl FnOnce(&mut Self) -> std::result::Result<T, E>,
  ) -> std::result::Result<T, E> {
    if self.batch.is_some() {
      return f(self);
    }

    let snapshot = (self.text.clone(), self.runs.clone());
    self.batch = Some(Batch::default());
    let result = f(self);
    let batch = self.batch.take().unwrap_or_default();

    match result {
      Ok(_) => {
        tracing::debug!(edits = batch.edits.len(), "committing edit batch");
        if batch.changed {
          self.listener.did_change(&batch.edits);
        }
        for range in batch.redraws {
          self.listener.request_redraw(range);
        }
      },
      Err(_) => {
        tracing::debug!(edits = batch.edits.len(), "rolling back edit batch");
        (self.text, self.runs) = snapshot;
      },
    }

    result
  }

  pub fn request_redraw(&mut self, range: Range) {
    match &mut self.batch {
      Some(batch) => batch.redraws.push(range),
      None => self.listener.request_redraw(range),
    }
  }

  pub fn notify_changed(&mut self, edits: &[Edit]) {
    match &mut self.batch {
      Some(batch) => {
        batch.changed = true;
        batch.edits.extend_from_slice(edits);
      },
      None => self.listener.did_change(edits),
    }
  }

  /// Attributes plain text inserted over `range` takes: the first replaced
  /// unit, else the unit before, else the unit after.
  fn inherited_attributes(&self, range: Range) -> Attributes {
    let pos = if !range.is_empty() || range.start == 0 {
      range.start
    } else {
      range.start - 1
    };
    self
      .attributes_at(pos)
      .map(|(_, attrs)| attrs.clone())
      .unwrap_or_default()
  }

  fn replace(&mut self, range: Range, content: &StyledText) -> Consequences {
    let removed_markers = (range.start..range.end())
      .filter_map(|pos| Some((pos, self.marker_at(pos)?.clone())))
      .collect();

    let first = self.split_at(range.start);
    let last = self.split_at(range.end());
    let inserted = content.runs().iter().map(|(len, attrs)| Run {
      len:   *len,
      attrs: attrs.clone(),
    });
    self.runs.splice(first..last, inserted);
    self.normalize();

    self.text.remove(range.as_std());
    self.text.insert(range.start, content.text());

    let inserted_markers = content
      .runs()
      .iter()
      .filter(|(_, attrs)| attrs.contains_key(&AttrKey::Marker))
      .map(|(len, _)| len)
      .sum();

    Consequences {
      len_delta: content.len() as isize - range.len as isize,
      removed_markers,
      inserted_markers,
    }
  }

  fn update_runs(&mut self, range: Range, f: impl Fn(&mut Attributes)) {
    if range.is_empty() {
      return;
    }
    let first = self.split_at(range.start);
    let last = self.split_at(range.end());
    for run in &mut self.runs[first..last] {
      f(&mut run.attrs);
    }
    self.normalize();
  }

  /// Index of the run starting at `pos`, splitting a run if needed.
  /// `pos == len` yields `runs.len()`.
  fn split_at(&mut self, pos: usize) -> usize {
    let mut offset = 0;
    for idx in 0..self.runs.len() {
      if offset == pos {
        return idx;
      }
      let len = self.runs[idx].len;
      if pos < offset + len {
        let tail = Run {
          len:   offset + len - pos,
          attrs: self.runs[idx].attrs.clone(),
        };
        self.runs[idx].len = pos - offset;
        self.runs.insert(idx + 1, tail);
        return idx + 1;
      }
      offset += len;
    }
    self.runs.len()
  }

  /// Drop empty runs and merge equal neighbours.
  fn normalize(&mut self) {
    let mut runs: Vec<Run> = Vec::with_capacity(self.runs.len());
    for run in self.runs.drain(..) {
      if run.len == 0 {
        continue;
      }
      match runs.last_mut() {
        Some(prev) if prev.attrs == run.attrs => prev.len += run.len,
        _ => runs.push(run),
      }
    }
    self.runs = runs;
  }
}

impl fmt::Debug for Buffer {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Buffer")
      .field("text", &self.text)
      .field("runs", &self.runs)
      .field("batch", &self.batch)
      .finish_non_exhaustive()
  }
}

impl fmt::Display for Buffer {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Display::fmt(&self.text, f)
  }
}

#[cfg(test)]
mod test {
  use parking_lot::Mutex;

  use super::*;
  use crate::{
    attribute::{
      Color,
      Font,
    },
    edit::EditError,
    marker::MarkerPayload,
  };

  fn red() -> Attributes {
    Attributes::from([(AttrKey::ForegroundColor, AttrValue::Color(Color::rgb(255, 0, 0)))])
  }

  fn underline() -> Attributes {
    Attributes::from([(AttrKey::Underline, AttrValue::Flag(true))])
  }

  fn todo() -> Marker {
    Marker::todo(Font::default(), false)
  }

  #[derive(Default)]
  struct Recorder {
    changes: Mutex<Vec<usize>>,
    redraws: Mutex<Vec<Range>>,
  }

  impl BufferListener for Recorder {
    fn request_redraw(&self, range: Range) {
      self.redraws.lock().push(range);
    }

    fn did_change(&self, edits: &[Edit]) {
      self.changes.lock().push(edits.len());
    }
  }

  #[test]
  fn replace_text_changes_length() {
    let mut buffer = Buffer::new("hello world");
    let consequences = buffer
      .apply(&Edit::replace_text(Range::new(6, 5), "rust!!"))
      .unwrap();

    assert_eq!(buffer.to_string(), "hello rust!!");
    assert_eq!(consequences.len_delta, 1);
    assert_eq!(buffer.runs().count(), 1);
    assert_eq!(buffer.runs().next().map(|(range, _)| range), Some(Range::new(0, 12)));
  }

  #[test]
  fn out_of_bounds_edit_is_rejected() {
    let mut buffer = Buffer::new("abc");
    let err = buffer
      .apply(&Edit::replace_text(Range::new(2, 2), ""))
      .unwrap_err();
    assert_eq!(err, EditError::RangeOutOfBounds {
      from: 2,
      to:   4,
      len:  3,
    });
    assert_eq!(buffer.to_string(), "abc");

    // end past usize::MAX
    assert!(matches!(
      buffer.apply(&Edit::delete(Range::new(usize::MAX, 2))),
      Err(EditError::RangeOutOfBounds { .. })
    ));
    assert_eq!(buffer.to_string(), "abc");
  }

  #[test]
  fn inserted_text_inherits_neighbour_attributes() {
    let mut buffer = Buffer::new("ab");
    buffer
      .apply(&Edit::add_attributes(Range::new(0, 1), red()))
      .unwrap();

    // after "a": inherits from the unit before
    buffer
      .apply(&Edit::replace_text(Range::point(1), "x"))
      .unwrap();
    assert_eq!(buffer.to_string(), "axb");
    assert_eq!(buffer.attributes_at(1).map(|(_, attrs)| attrs), Some(&red()));

    // at the start: inherits from the unit after
    buffer
      .apply(&Edit::replace_text(Range::point(0), "y"))
      .unwrap();
    assert_eq!(buffer.attributes_at(0).map(|(_, attrs)| attrs), Some(&red()));

    // replacing "b": inherits from the replaced unit
    buffer
      .apply(&Edit::replace_text(Range::new(3, 1), "zz"))
      .unwrap();
    assert_eq!(buffer.to_string(), "yaxzz");
    assert_eq!(buffer.attributes_at(4).map(|(_, attrs)| attrs.len()), Some(0));
  }

  #[test]
  fn attribute_runs_split_and_merge() {
    let mut buffer = Buffer::new("0123456789");
    buffer
      .apply(&Edit::add_attributes(Range::new(2, 3), red()))
      .unwrap();
    assert_eq!(buffer.runs().count(), 3);

    buffer
      .apply(&Edit::remove_attributes(Range::new(0, 10), [
        AttrKey::ForegroundColor,
      ]))
      .unwrap();
    assert_eq!(buffer.runs().count(), 1);
  }

  #[test]
  fn longest_effective_range_crosses_unrelated_runs() {
    let mut buffer = Buffer::new("0123456789");
    buffer
      .apply(&Edit::add_attributes(Range::new(2, 6), red()))
      .unwrap();
    buffer
      .apply(&Edit::add_attributes(Range::new(4, 2), underline()))
      .unwrap();

    let (value, range) =
      buffer.longest_effective_range(&AttrKey::ForegroundColor, 3, Range::new(0, 10));
    assert_eq!(value, Some(&AttrValue::Color(Color::rgb(255, 0, 0))));
    assert_eq!(range, Range::new(2, 6));

    let (_, clipped) =
      buffer.longest_effective_range(&AttrKey::ForegroundColor, 3, Range::new(3, 2));
    assert_eq!(clipped, Range::new(3, 2));

    let (value, range) =
      buffer.longest_effective_range(&AttrKey::ForegroundColor, 0, Range::new(0, 10));
    assert_eq!(value, None);
    assert_eq!(range, Range::new(0, 2));
  }

  #[test]
  fn deleting_a_cell_destroys_its_marker() {
    let mut buffer = Buffer::new("ab");
    let consequences = buffer
      .apply(&Edit::replace_styled(
        Range::point(0),
        StyledText::marker(todo(), Attributes::new()),
      ))
      .unwrap();
    assert_eq!(consequences.inserted_markers, 1);
    assert_eq!(buffer.marker_at(0), Some(&todo()));

    // typing right after a marker does not clone it
    buffer
      .apply(&Edit::replace_text(Range::point(1), "x"))
      .unwrap();
    assert_eq!(buffer.marker_at(1), None);
    assert!(buffer.attribute_at(&AttrKey::Marker, 1).is_none());

    let consequences = buffer.apply(&Edit::delete(Range::new(0, 2))).unwrap();
    assert_eq!(consequences.removed_markers, vec![(0, todo())]);
    assert_eq!(buffer.marker_at(0), None);
    assert_eq!(buffer.to_string(), "ab");
  }

  #[test]
  fn update_marker_in_place() {
    let mut buffer = Buffer::new("");
    for _ in 0..2 {
      buffer
        .apply(&Edit::replace_styled(
          Range::point(0),
          StyledText::marker(todo(), Attributes::new()),
        ))
        .unwrap();
    }
    // identical neighbours share one run
    assert_eq!(buffer.runs().count(), 1);

    assert!(buffer.update_marker(1, |marker| {
      marker.payload = MarkerPayload::Todo { checked: true }
    }));
    assert_eq!(buffer.runs().count(), 2);
    assert_eq!(buffer.marker_at(0), Some(&todo()));
    assert_eq!(
      buffer.marker_at(1).map(|marker| &marker.payload),
      Some(&MarkerPayload::Todo { checked: true })
    );
    assert!(!buffer.update_marker(5, |_| {}));
  }

  #[test]
  fn batch_notifies_once() {
    let recorder = Arc::new(Recorder::default());
    let mut buffer = Buffer::new("abc").with_listener(recorder.clone());

    buffer
      .transact(|buffer| -> Result<()> {
        buffer.apply(&Edit::replace_text(Range::point(3), "d"))?;
        buffer.apply(&Edit::add_attributes(Range::new(0, 4), red()))?;
        buffer.request_redraw(Range::new(0, 1));
        assert!(recorder.changes.lock().is_empty());
        Ok(())
      })
      .unwrap();

    assert_eq!(*recorder.changes.lock(), vec![2]);
    assert_eq!(*recorder.redraws.lock(), vec![Range::new(0, 1)]);
  }

  #[test]
  fn failed_batch_rolls_back() {
    let recorder = Arc::new(Recorder::default());
    let mut buffer = Buffer::new("abc").with_listener(recorder.clone());

    let result = buffer.transact(|buffer| -> Result<()> {
      buffer.apply(&Edit::replace_text(Range::point(3), "d"))?;
      buffer.apply(&Edit::replace_text(Range::new(9, 1), "x"))?;
      Ok(())
    });

    assert!(result.is_err());
    assert_eq!(buffer.to_string(), "abc");
    assert_eq!(buffer.runs().count(), 1);
    assert!(recorder.changes.lock().is_empty());
  }

  #[test]
  fn unbatched_edits_notify_immediately() {
    let recorder = Arc::new(Recorder::default());
    let mut buffer = Buffer::new("abc").with_listener(recorder.clone());
    buffer.apply(&Edit::delete(Range::new(0, 1))).unwrap();
    buffer.apply(&Edit::delete(Range::new(0, 1))).unwrap();
    assert_eq!(*recorder.changes.lock(), vec![1, 1]);
  }
}
