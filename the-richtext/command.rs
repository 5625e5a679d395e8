//! Edit commands: hooks that intercept a named editing action (inserting a
//! line break) around the default behavior.
//!
//! Every command matching the invoked name runs in three phases: `before`,
//! `apply`, `after`. When no command matches, or the matching commands emit
//! nothing from `apply`, the caller's fallback does the work instead. All
//! phases run in one buffer batch.
//!
//! ```ignore
//! let mut commands: Vec<Box<dyn EditCommand>> = vec![
//!   Box::new(LineBreak),
//!   Box::new(TodoLineBreak::default()),
//! ];
//! let edits = run_command(&mut commands, CommandName::LineBreak, &mut buffer, &mut range, no_fallback)?;
//! ```

use std::{
  fmt,
  str::FromStr,
};

use thiserror::Error;

use crate::{
  buffer::Buffer,
  edit::{
    Edit,
    Result,
  },
  marker::set_todo_checked,
  paragraph::current_paragraph_start,
  range::Range,
  style::{
    Stub,
    StyleRef,
  },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandName {
  LineBreak,
}

impl CommandName {
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::LineBreak => "line_break",
    }
  }
}

impl fmt::Display for CommandName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown edit command '{0}'")]
pub struct UnknownCommand(pub String);

impl FromStr for CommandName {
  type Err = UnknownCommand;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    match s.trim() {
      "line_break" | "insert_newline" => Ok(Self::LineBreak),
      other => Err(UnknownCommand(other.to_string())),
    }
  }
}

pub trait EditCommand: fmt::Debug + Send {
  fn matches(&self, name: CommandName) -> bool;

  fn before(&mut self, _buffer: &mut Buffer, _range: &mut Option<Range>) -> Result<Vec<Edit>> {
    Ok(Vec::new())
  }

  fn apply(&mut self, _buffer: &mut Buffer, _range: &mut Option<Range>) -> Result<Vec<Edit>> {
    Ok(Vec::new())
  }

  fn after(&mut self, _buffer: &mut Buffer, _range: &mut Option<Range>) -> Result<Vec<Edit>> {
    Ok(Vec::new())
  }

  /// The batch failed and the buffer was rolled back. Drop any state kept
  /// between phases.
  fn abort(&mut self) {}
}

/// Replaces the range with a newline and leaves the caret after it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LineBreak;

impl EditCommand for LineBreak {
  fn matches(&self, name: CommandName) -> bool {
    name == CommandName::LineBreak
  }

  fn apply(&mut self, buffer: &mut Buffer, range: &mut Option<Range>) -> Result<Vec<Edit>> {
    let Some(target) = *range else {
      return Ok(Vec::new());
    };
    let edits = buffer.apply_edits([Edit::replace_text(target, "\n")], range)?;
    *range = Some(Range::point(target.start + 1));
    Ok(edits)
  }
}

/// Runs one style before the line break and another after it, typically to
/// continue a list on the new paragraph.
#[derive(Debug, Clone)]
pub struct LineBreakStyles {
  pub before: StyleRef,
  pub after:  StyleRef,
}

impl Default for LineBreakStyles {
  fn default() -> Self {
    Self {
      before: Stub::shared(),
      after:  Stub::shared(),
    }
  }
}

impl EditCommand for LineBreakStyles {
  fn matches(&self, name: CommandName) -> bool {
    name == CommandName::LineBreak
  }

  fn before(&mut self, buffer: &mut Buffer, range: &mut Option<Range>) -> Result<Vec<Edit>> {
    self.before.apply(buffer, range)
  }

  fn after(&mut self, buffer: &mut Buffer, range: &mut Option<Range>) -> Result<Vec<Edit>> {
    self.after.apply(buffer, range)
  }
}

/// Breaking a line right after a checked todo cell moves the checked state
/// to the todo cell of the new paragraph.
#[derive(Debug, Default, Clone)]
pub struct TodoLineBreak {
  check_new: bool,
}

impl EditCommand for TodoLineBreak {
  fn matches(&self, name: CommandName) -> bool {
    name == CommandName::LineBreak
  }

  fn before(&mut self, buffer: &mut Buffer, range: &mut Option<Range>) -> Result<Vec<Edit>> {
    let Some(target) = *range else {
      return Ok(Vec::new());
    };

    let start = current_paragraph_start(buffer.text(), target.start);
    let checked = buffer
      .marker_at(start)
      .and_then(|marker| marker.checked())
      .unwrap_or(false);
    if checked && target == Range::point(start + 1) {
      set_todo_checked(buffer, start, false);
      self.check_new = true;
    }
    Ok(Vec::new())
  }

  fn after(&mut self, buffer: &mut Buffer, range: &mut Option<Range>) -> Result<Vec<Edit>> {
    if !std::mem::take(&mut self.check_new) {
      return Ok(Vec::new());
    }
    if let Some(caret) = *range {
      let start = current_paragraph_start(buffer.text(), caret.start);
      set_todo_checked(buffer, start, true);
    }
    Ok(Vec::new())
  }

  fn abort(&mut self) {
    self.check_new = false;
  }
}

/// Dispatch `name` to every matching command as one batch. Returns the edits
/// in the order they were applied; `range` ends up re-mapped through them.
/// On failure every matching command is aborted.
pub fn run_command(
  commands: &mut [Box<dyn EditCommand>],
  name: CommandName,
  buffer: &mut Buffer,
  range: &mut Option<Range>,
  fallback: impl FnOnce(&mut Buffer, &mut Option<Range>) -> Result<Vec<Edit>>,
) -> Result<Vec<Edit>> {
  let result = buffer.transact(|buffer| {
    let mut matched: Vec<_> = commands
      .iter_mut()
      .filter(|command| command.matches(name))
      .collect();

    if matched.is_empty() {
      tracing::debug!(%name, "no edit command matched, running fallback");
      return fallback(buffer, range);
    }
    tracing::debug!(%name, commands = matched.len(), "dispatching edit command");

    let mut edits = Vec::new();
    for command in matched.iter_mut() {
      edits.extend(command.before(buffer, range)?);
    }

    let mut applied = Vec::new();
    for command in matched.iter_mut() {
      applied.extend(command.apply(buffer, range)?);
    }
    if applied.is_empty() {
      applied = fallback(buffer, range)?;
    }
    edits.extend(applied);

    for command in matched.iter_mut() {
      edits.extend(command.after(buffer, range)?);
    }
    Ok(edits)
  });

  if result.is_err() {
    commands
      .iter_mut()
      .filter(|command| command.matches(name))
      .for_each(|command| command.abort());
  }
  result
}

/// Fallback for callers that have no default behavior.
pub fn no_fallback(_buffer: &mut Buffer, _range: &mut Option<Range>) -> Result<Vec<Edit>> {
  Ok(Vec::new())
}
