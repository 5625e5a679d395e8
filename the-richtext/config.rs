//! User style configuration and the default palette built from it.
//!
//! ```toml
//! bullet-prefix = "–"
//! number-suffix = ")"
//!
//! [body-font]
//! family = "Georgia"
//! size = 15
//!
//! [highlight]
//! background = "#ffe500"
//! foreground = "#000000"
//! ```

use std::sync::Arc;

use serde::{
  Deserialize,
  Serialize,
};
use thiserror::Error;

use crate::{
  Tendril,
  attribute::{
    AttrKey,
    AttrValue,
    Attributes,
    Font,
  },
  command::{
    EditCommand,
    LineBreak,
    LineBreakStyles,
    TodoLineBreak,
  },
  highlight::HighlightingStyle,
  marker::MarkerKind,
  paragraph::previous_paragraph_range,
  style::{
    Array,
    Attributed,
    BulletList,
    Conditional,
    Discard,
    NumberList,
    Ranges,
    Rule,
    Stub,
    StyleRef,
    TodoList,
  },
};

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
  #[error("failed to parse style config: {0}")]
  Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct StyleConfig {
  pub body_font:     Font,
  pub bullet_prefix: Tendril,
  pub number_suffix: Tendril,
  /// Font of list markers. Falls back to the body font.
  pub marker_font:   Option<Font>,
  pub todo_font:     Font,
  pub highlight:     HighlightingStyle,
}

impl Default for StyleConfig {
  fn default() -> Self {
    Self {
      body_font:     Font::default(),
      bullet_prefix: "•".into(),
      number_suffix: ".".into(),
      marker_font:   None,
      todo_font:     Font::default(),
      highlight:     HighlightingStyle::default(),
    }
  }
}

impl StyleConfig {
  pub fn from_toml(contents: &str) -> Result<Self> {
    Ok(toml::from_str(contents)?)
  }

  /// Like [`StyleConfig::from_toml`], but a broken config yields the
  /// defaults.
  pub fn from_toml_or_default(contents: &str) -> Self {
    Self::from_toml(contents).unwrap_or_else(|err| {
      tracing::warn!("falling back to default style config: {err}");
      Self::default()
    })
  }

  fn marker_font(&self) -> Font {
    self
      .marker_font
      .clone()
      .unwrap_or_else(|| self.body_font.clone())
  }

  pub fn palette(&self) -> Palette {
    let body: StyleRef = Arc::new(
      Attributed::new(
        "body",
        Attributes::from([(AttrKey::Font, AttrValue::Font(self.body_font.clone()))]),
      )
      .with_rule(Rule::PreserveFontTraits),
    );

    let bullet: StyleRef = Arc::new(BulletList::bullet(
      "bullet-list",
      self.bullet_prefix.clone(),
      self.marker_font(),
    ));
    let number: StyleRef = Arc::new(NumberList::number(
      "numbered-list",
      self.number_suffix.clone(),
      self.marker_font(),
    ));
    let todo: StyleRef = Arc::new(TodoList::todo("todo-list", self.todo_font.clone()));

    // each list kind discards the other two
    let exclusive = |master: &StyleRef, others: [&StyleRef; 2]| -> StyleRef {
      let discard = Arc::new(Array(others.into_iter().cloned().collect()));
      Arc::new(Ranges::paragraphs(Arc::new(Discard::new(
        discard,
        master.clone(),
      ))))
    };

    Palette {
      bullets: exclusive(&bullet, [&number, &todo]),
      numbers: exclusive(&number, [&bullet, &todo]),
      todos: exclusive(&todo, [&bullet, &number]),
      continue_list: Arc::new(Array(vec![
        continue_kind(bullet, MarkerKind::Bullet),
        continue_kind(number, MarkerKind::Number),
        continue_kind(todo, MarkerKind::Todo),
      ])),
      body,
    }
  }

  /// Line break handling that continues lists on the new paragraph.
  pub fn commands(&self) -> Vec<Box<dyn EditCommand>> {
    let palette = self.palette();
    vec![
      Box::new(LineBreak),
      Box::new(LineBreakStyles {
        before: Stub::shared(),
        after:  palette.continue_list,
      }),
      Box::new(TodoLineBreak::default()),
    ]
  }
}

/// Applies `list` where the previous paragraph starts with a cell of `kind`.
fn continue_kind(list: StyleRef, kind: MarkerKind) -> StyleRef {
  Arc::new(Conditional::with_predicate(list, move |buffer, range| {
    previous_paragraph_range(buffer.text(), range.start)
      .and_then(|paragraph| buffer.marker_at(paragraph.start))
      .is_some_and(|marker| marker.kind == kind)
  }))
}

/// The default named styles.
#[derive(Debug, Clone)]
pub struct Palette {
  /// Body font over the range, keeping bold and italic.
  pub body:          StyleRef,
  pub bullets:       StyleRef,
  pub numbers:       StyleRef,
  pub todos:         StyleRef,
  /// Continues the previous paragraph's list at the caret.
  pub continue_list: StyleRef,
}

impl Palette {
  /// Named styles in the order the current style is looked up.
  pub fn named(&self) -> Vec<StyleRef> {
    vec![
      self.todos.clone(),
      self.numbers.clone(),
      self.bullets.clone(),
      self.body.clone(),
    ]
  }
}
