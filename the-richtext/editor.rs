//! Editing facade over one [`Buffer`]: the selection, the edit commands and
//! the highlight, kept in step with every edit.
//!
//! This is the validation boundary of the crate. Ranges coming from outside
//! are checked here, and every operation runs as one buffer batch so a
//! failure leaves buffer and selection untouched.

use std::sync::Arc;

use thiserror::Error;

use crate::{
  Tendril,
  buffer::{
    Buffer,
    BufferListener,
  },
  command::{
    CommandName,
    EditCommand,
    run_command,
  },
  config::StyleConfig,
  edit::{
    Edit,
    EditError,
  },
  highlight::Highlighter,
  marker::{
    refresh_markers,
    toggle_todo,
  },
  paragraph::{
    ParagraphRanges,
    paragraph_ranges,
  },
  range::{
    Range,
    map_range,
  },
  style::{
    MarkerCopy,
    Style,
    StyleRef,
    Toggle,
    apply_all,
    first_named_style,
  },
};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EditorError {
  #[error("range {range} is out of bounds for buffer of length {len}")]
  SelectionOutOfBounds { range: Range, len: usize },
  #[error(transparent)]
  Edit(#[from] EditError),
}

pub type Result<T> = std::result::Result<T, EditorError>;

pub struct Editor {
  buffer:      Buffer,
  selection:   Option<Range>,
  commands:    Vec<Box<dyn EditCommand>>,
  highlighter: Highlighter,
  copy_styles: Vec<StyleRef>,
}

impl Editor {
  pub fn new(buffer: Buffer) -> Self {
    Self {
      buffer,
      selection: Some(Range::point(0)),
      commands: Vec::new(),
      highlighter: Highlighter::default(),
      copy_styles: vec![Arc::new(MarkerCopy)],
    }
  }

  /// Editor with the line break commands and highlight colors of `config`.
  pub fn from_config(text: &str, config: &StyleConfig) -> Self {
    let mut editor = Self::new(Buffer::new(text));
    editor.commands = config.commands();
    editor.highlighter = Highlighter::new(config.highlight);
    editor
  }

  #[must_use]
  pub fn with_commands(mut self, commands: Vec<Box<dyn EditCommand>>) -> Self {
    self.commands = commands;
    self
  }

  /// Styles run over the copy made by [`Editor::copy_contents`], in order.
  #[must_use]
  pub fn with_copy_styles(mut self, styles: Vec<StyleRef>) -> Self {
    self.copy_styles = styles;
    self
  }

  pub fn set_listener(&mut self, listener: Arc<dyn BufferListener>) {
    self.buffer.set_listener(listener);
  }

  pub fn buffer(&self) -> &Buffer {
    &self.buffer
  }

  pub fn selection(&self) -> Option<Range> {
    self.selection
  }

  pub fn highlighted(&self) -> Option<Range> {
    self.highlighter.range()
  }

  fn validate(&self, range: Range) -> Result<Range> {
    let len = self.buffer.len();
    if range.checked_end().is_none_or(|end| end > len) {
      return Err(EditorError::SelectionOutOfBounds { range, len });
    }
    Ok(range)
  }

  /// Replace the selection. A caret landing right before a marker cell is
  /// moved one unit further in the direction it travelled.
  pub fn set_selection(&mut self, selection: Option<Range>) -> Result<()> {
    let Some(range) = selection else {
      self.selection = None;
      return Ok(());
    };
    let range = self.validate(range)?;

    if range.is_empty() && self.buffer.marker_at(range.start).is_some() {
      let backwards = self
        .selection
        .is_some_and(|old| old.start > range.start);
      let pos = if backwards {
        range.start.saturating_sub(1)
      } else {
        range.start + 1
      };
      let pos = pos.max(1).min(self.buffer.len());
      tracing::trace!(from = range.start, to = pos, "caret skipped marker cell");
      self.selection = Some(Range::point(pos));
      return Ok(());
    }

    self.selection = Some(range);
    Ok(())
  }

  /// Follow `edits` applied to the buffer by someone else.
  pub fn map_selection(&mut self, edits: &[Edit]) {
    self.selection = map_range(self.selection, edits);
    self.highlighter.map(edits);
  }

  /// Paragraphs the selection touches.
  pub fn paragraph_ranges(&self) -> ParagraphRanges {
    self
      .selection
      .map(|selection| paragraph_ranges(self.buffer.text(), selection))
      .unwrap_or_default()
  }

  // Editing.
  //

  fn batch(
    &mut self,
    f: impl FnOnce(&mut Buffer, &mut Option<Range>) -> std::result::Result<Vec<Edit>, EditError>,
  ) -> Result<Vec<Edit>> {
    if let Some(selection) = self.selection {
      self.validate(selection)?;
    }

    let mut selection = self.selection;
    let edits = self.buffer.transact(|buffer| f(buffer, &mut selection))?;
    self.selection = selection;
    self.highlighter.map(&edits);
    Ok(edits)
  }

  /// Apply edits in order. The selection follows them.
  pub fn edit(&mut self, edits: impl IntoIterator<Item = Edit>) -> Result<Vec<Edit>> {
    self.batch(|buffer, selection| buffer.apply_edits(edits, selection))
  }

  /// Typing: replace the selection with `text` and put the caret after it.
  /// A lone tab is refused and nothing happens.
  pub fn type_text(&mut self, text: &str) -> Result<Vec<Edit>> {
    if text == "\t" {
      return Ok(Vec::new());
    }
    let Some(selection) = self.selection else {
      return Ok(Vec::new());
    };

    let text = Tendril::from(text);
    let caret = selection.start + text.chars().count();
    let edits = self.edit([Edit::replace_text(selection, text)])?;
    self.selection = Some(Range::point(caret));
    Ok(edits)
  }

  pub fn apply_style(&mut self, style: &dyn Style) -> Result<Vec<Edit>> {
    tracing::debug!(style = %style.name(), "applying style");
    self.batch(|buffer, selection| style.apply(buffer, selection))
  }

  pub fn remove_style(&mut self, style: &dyn Style) -> Result<Vec<Edit>> {
    tracing::debug!(style = %style.name(), "removing style");
    self.batch(|buffer, selection| style.remove(buffer, selection))
  }

  /// Remove `style` where the selection has it, apply it elsewhere.
  pub fn toggle_style(&mut self, style: StyleRef) -> Result<Vec<Edit>> {
    self.apply_style(&Toggle(style))
  }

  /// Dispatch an edit command at the selection.
  pub fn run_command(
    &mut self,
    name: CommandName,
    fallback: impl FnOnce(&mut Buffer, &mut Option<Range>) -> std::result::Result<Vec<Edit>, EditError>,
  ) -> Result<Vec<Edit>> {
    let mut commands = std::mem::take(&mut self.commands);
    let result = self.batch(|buffer, selection| {
      run_command(&mut commands, name, buffer, selection, fallback)
    });
    self.commands = commands;
    result
  }

  /// Flip the todo cell at `pos`. Returns the new state, `None` when there is
  /// no todo cell there.
  pub fn toggle_todo(&mut self, pos: usize) -> Result<Option<bool>> {
    self.validate(Range::point(pos))?;
    let mut state = None;
    self.batch(|buffer, _| {
      state = toggle_todo(buffer, pos);
      Ok(Vec::new())
    })?;
    Ok(state)
  }

  /// Settle marker numbering over `range`. Returns how many cells changed.
  pub fn refresh_markers(&mut self, range: Range) -> Result<usize> {
    let range = self.validate(range)?;
    let mut changed = 0;
    self.batch(|buffer, _| {
      changed = refresh_markers(buffer, range);
      Ok(Vec::new())
    })?;
    Ok(changed)
  }

  // Queries and exports.
  //

  /// Copy of the whole buffer with the copy styles applied. By default that
  /// turns every marker cell into plain text. Notifies nobody.
  pub fn copy_contents(&self) -> Result<Buffer> {
    let mut copy = self.buffer.detached();
    let mut range = Some(Range::new(0, copy.len()));
    apply_all(&self.copy_styles, &mut copy, &mut range)?;
    Ok(copy)
  }

  /// The first of `styles` that holds on every paragraph of the selection.
  pub fn current_named_style(&self, styles: &[StyleRef]) -> Option<StyleRef> {
    let selection = self.selection?;
    first_named_style(styles, &self.buffer, selection).cloned()
  }

  // Highlighting.
  //

  pub fn highlight(&mut self, range: Range) -> Result<Vec<Edit>> {
    let range = self.validate(range)?;
    Ok(self.highlighter.set_range(&mut self.buffer, Some(range))?)
  }

  pub fn clear_highlight(&mut self) -> Result<Vec<Edit>> {
    Ok(self.highlighter.set_range(&mut self.buffer, None)?)
  }
}

impl std::fmt::Debug for Editor {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Editor")
      .field("buffer", &self.buffer)
      .field("selection", &self.selection)
      .field("commands", &self.commands)
      .field("highlighter", &self.highlighter)
      .field("copy_styles", &self.copy_styles)
      .finish()
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    attribute::{
      AttrKey,
      AttrValue,
      Attributes,
    },
    command::no_fallback,
    marker::MarkerKind,
    style::Attributed,
  };

  fn underline() -> StyleRef {
    Arc::new(Attributed::new(
      "underline",
      Attributes::from([(AttrKey::Underline, AttrValue::Flag(true))]),
    ))
  }

  fn todo_editor(text: &str) -> (Editor, StyleRef) {
    let config = StyleConfig::default();
    let todos = config.palette().todos;
    let mut editor = Editor::from_config(text, &config);
    editor
      .set_selection(Some(Range::new(0, editor.buffer().len())))
      .unwrap();
    editor.apply_style(todos.as_ref()).unwrap();
    (editor, todos)
  }

  #[test]
  fn selection_is_validated() {
    let mut editor = Editor::new(Buffer::new("abc"));
    let err = editor.set_selection(Some(Range::new(2, 2))).unwrap_err();
    assert!(matches!(err, EditorError::SelectionOutOfBounds { len: 3, .. }));
    assert_eq!(editor.selection(), Some(Range::point(0)));

    let err = editor
      .set_selection(Some(Range::new(usize::MAX, 2)))
      .unwrap_err();
    assert!(matches!(err, EditorError::SelectionOutOfBounds { len: 3, .. }));
    assert!(editor.highlight(Range::new(usize::MAX, 2)).is_err());
    assert_eq!(editor.selection(), Some(Range::point(0)));

    editor.set_selection(Some(Range::point(3))).unwrap();
    editor.set_selection(None).unwrap();
    assert_eq!(editor.selection(), None);
    assert!(editor.paragraph_ranges().is_empty());
  }

  #[test]
  fn toggle_style_round_trip() {
    let mut editor = Editor::new(Buffer::new("abc"));
    editor.set_selection(Some(Range::new(0, 3))).unwrap();

    editor.toggle_style(underline()).unwrap();
    let current = editor
      .current_named_style(&[underline()])
      .map(|style| style.name().into_owned());
    assert_eq!(current.as_deref(), Some("underline"));
    editor.toggle_style(underline()).unwrap();
    assert!(editor.current_named_style(&[underline()]).is_none());
    assert!(editor.buffer().runs().all(|(_, attrs)| attrs.is_empty()));
  }

  #[test]
  fn selection_follows_list_edits() {
    let (editor, todos) = todo_editor("a\nb");
    assert_eq!(editor.buffer().len(), 5);
    assert_eq!(editor.selection(), Some(Range::new(0, 5)));
    assert_eq!(editor.paragraph_ranges().len(), 2);
    assert!(editor.current_named_style(&[todos]).is_some());
  }

  #[test]
  fn caret_skips_marker_cells() {
    let (mut editor, _) = todo_editor("a\nb");

    // moving forward onto the cell of "b"
    editor.set_selection(Some(Range::point(1))).unwrap();
    editor.set_selection(Some(Range::point(3))).unwrap();
    assert_eq!(editor.selection(), Some(Range::point(4)));

    // moving backward onto it
    editor.set_selection(Some(Range::point(3))).unwrap();
    assert_eq!(editor.selection(), Some(Range::point(2)));

    // never in front of the first cell
    editor.set_selection(Some(Range::point(0))).unwrap();
    assert_eq!(editor.selection(), Some(Range::point(1)));
  }

  #[test]
  fn line_break_continues_todo_list() {
    let (mut editor, _) = todo_editor("task");
    editor.set_selection(Some(Range::point(5))).unwrap();

    editor
      .run_command(CommandName::LineBreak, no_fallback)
      .unwrap();
    assert_eq!(editor.buffer().len(), 7);
    assert_eq!(
      editor.buffer().marker_at(6).map(|marker| marker.kind),
      Some(MarkerKind::Todo)
    );
    assert_eq!(editor.selection(), Some(Range::point(7)));
  }

  #[test]
  fn todo_toggle_and_copy() {
    let (mut editor, _) = todo_editor("milk\neggs");
    assert_eq!(editor.toggle_todo(0).unwrap(), Some(true));
    assert_eq!(editor.toggle_todo(2).unwrap(), None);
    assert!(editor.toggle_todo(42).is_err());

    let copy = editor.copy_contents().unwrap();
    assert_eq!(copy.to_string(), "[x] milk\n[ ] eggs");
    assert_eq!(editor.buffer().len(), 11);
  }

  #[test]
  fn copy_styles_are_configurable() {
    let (editor, _) = todo_editor("milk");
    let editor = editor.with_copy_styles(vec![Arc::new(MarkerCopy), underline()]);

    let copy = editor.copy_contents().unwrap();
    assert_eq!(copy.to_string(), "[ ] milk");
    assert_eq!(
      copy.attribute_at(&AttrKey::Underline, 5),
      Some(&AttrValue::Flag(true))
    );
    assert!(editor.buffer().attribute_at(&AttrKey::Underline, 2).is_none());

    let editor = editor.with_copy_styles(Vec::new());
    assert_eq!(editor.copy_contents().unwrap().len(), 5);
  }

  #[test]
  fn typing_moves_caret_and_refuses_tabs() {
    let mut editor = Editor::new(Buffer::new("ac"));
    editor.set_selection(Some(Range::point(1))).unwrap();

    editor.type_text("b").unwrap();
    assert_eq!(editor.buffer().to_string(), "abc");
    assert_eq!(editor.selection(), Some(Range::point(2)));

    assert!(editor.type_text("\t").unwrap().is_empty());
    assert_eq!(editor.buffer().to_string(), "abc");
  }

  #[test]
  fn failed_edit_leaves_everything_untouched() {
    let mut editor = Editor::new(Buffer::new("abc"));
    editor.set_selection(Some(Range::new(0, 1))).unwrap();

    let err = editor
      .edit([
        Edit::replace_text(Range::point(0), "x"),
        Edit::delete(Range::new(3, 5)),
      ])
      .unwrap_err();
    assert!(matches!(err, EditorError::Edit(EditError::RangeOutOfBounds { .. })));
    assert_eq!(editor.buffer().to_string(), "abc");
    assert_eq!(editor.selection(), Some(Range::new(0, 1)));
  }

  #[test]
  fn highlight_follows_edits() {
    let mut editor = Editor::new(Buffer::new("one two"));
    editor.highlight(Range::new(4, 3)).unwrap();
    editor.set_selection(Some(Range::point(0))).unwrap();
    editor.type_text(">").unwrap();
    assert_eq!(editor.highlighted(), Some(Range::new(5, 3)));

    editor.clear_highlight().unwrap();
    assert_eq!(editor.highlighted(), None);
    assert!(editor.buffer().attribute_at(&AttrKey::BackgroundColor, 5).is_none());
    assert!(editor.highlight(Range::new(6, 9)).is_err());
  }
}
