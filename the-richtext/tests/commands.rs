use the_richtext::{
  buffer::Buffer,
  command::{
    CommandName,
    no_fallback,
  },
  config::StyleConfig,
  edit::Edit,
  editor::Editor,
  marker::MarkerKind,
  range::Range,
  style::StyleRef,
};

fn list_editor(text: &str, style: impl Fn(&StyleConfig) -> StyleRef) -> Editor {
  let config = StyleConfig::default();
  let list = style(&config);
  let mut editor = Editor::from_config(text, &config);
  editor
    .set_selection(Some(Range::new(0, editor.buffer().len())))
    .unwrap();
  editor.apply_style(list.as_ref()).unwrap();
  let end = editor.buffer().len();
  editor.set_selection(Some(Range::point(end))).unwrap();
  editor
}

fn line_break(editor: &mut Editor) {
  editor
    .run_command(CommandName::LineBreak, no_fallback)
    .unwrap();
}

#[test]
fn enter_continues_numbered_list() {
  let mut editor = list_editor("first", |config| config.palette().numbers);
  line_break(&mut editor);
  editor.type_text("second").unwrap();
  line_break(&mut editor);

  assert_eq!(editor.selection(), Some(Range::point(16)));
  let copy = editor.copy_contents().unwrap();
  assert_eq!(copy.to_string(), "1. first\n2. second\n3. ");
}

#[test]
fn enter_without_list_is_plain() {
  let mut editor = Editor::from_config("plain", &StyleConfig::default());
  editor.set_selection(Some(Range::point(5))).unwrap();
  line_break(&mut editor);

  assert_eq!(editor.buffer().to_string(), "plain\n");
  assert_eq!(editor.selection(), Some(Range::point(6)));
}

#[test]
fn enter_after_checked_empty_todo_moves_check() {
  let mut editor = list_editor("", |config| config.palette().todos);
  assert_eq!(editor.buffer().len(), 1);
  assert_eq!(editor.toggle_todo(0).unwrap(), Some(true));

  line_break(&mut editor);
  let buffer = editor.buffer();
  assert_eq!(buffer.len(), 3);
  assert_eq!(buffer.marker_at(0).and_then(|m| m.checked()), Some(false));
  assert_eq!(
    buffer.marker_at(2).map(|marker| marker.kind),
    Some(MarkerKind::Todo)
  );
  assert_eq!(buffer.marker_at(2).and_then(|m| m.checked()), Some(true));
}

#[test]
fn unknown_commands_do_not_parse() {
  assert!("insert_newline".parse::<CommandName>().is_ok());
  assert!("insert_tab".parse::<CommandName>().is_err());
}

#[test]
fn fallback_runs_without_commands() {
  let mut editor = Editor::new(Buffer::new("ab"));
  editor.set_selection(Some(Range::point(1))).unwrap();
  editor
    .run_command(CommandName::LineBreak, |buffer, range| {
      buffer.apply_edits([Edit::replace_text(Range::point(1), " | ")], range)
    })
    .unwrap();
  assert_eq!(editor.buffer().to_string(), "a | b");
  assert_eq!(editor.selection(), Some(Range::point(4)));
}
