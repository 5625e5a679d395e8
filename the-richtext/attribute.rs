//! Attribute keys and values attached to spans of a [`Buffer`].
//!
//! Attributes are orthogonal: each [`AttrKey`] carries at most one
//! [`AttrValue`] per unit of text. The font and color types are opaque to the
//! rest of the crate, which only ever compares them for equality.
//!
//! [`Buffer`]: crate::buffer::Buffer

use std::{
  collections::BTreeMap,
  fmt,
  str::FromStr,
};

use bitflags::bitflags;
use serde::{
  Deserialize,
  Serialize,
};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
  Tendril,
  marker::Marker,
};

/// Attribute map for one run of text. Ordered so that runs compare cheaply.
pub type Attributes = BTreeMap<AttrKey, AttrValue>;

/// Key list used by attribute removal.
pub type AttrKeys = SmallVec<[AttrKey; 4]>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttrKey {
  Font,
  ForegroundColor,
  BackgroundColor,
  Underline,
  Strikethrough,
  ParagraphStyle,
  /// Embedded marker cell payload. Only ever spans placeholder units.
  Marker,
  Custom(Tendril),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttrValue {
  Font(Font),
  Color(Color),
  Flag(bool),
  Int(i64),
  Text(Tendril),
  Marker(Marker),
}

impl AttrValue {
  pub fn as_font(&self) -> Option<&Font> {
    match self {
      Self::Font(font) => Some(font),
      _ => None,
    }
  }

  pub fn as_color(&self) -> Option<Color> {
    match self {
      Self::Color(color) => Some(*color),
      _ => None,
    }
  }

  pub fn as_marker(&self) -> Option<&Marker> {
    match self {
      Self::Marker(marker) => Some(marker),
      _ => None,
    }
  }
}

bitflags! {
  /// Symbolic traits a font run may carry independently of family and size.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
  pub struct FontTraits: u8 {
    const BOLD              = 1 << 0;
    const ITALIC            = 1 << 1;
    const MONOSPACED_DIGITS = 1 << 2;
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Font {
  pub family: Tendril,
  /// Point size.
  pub size:   u16,
  #[serde(default)]
  pub traits: FontTraits,
}

impl Font {
  pub fn new(family: impl Into<Tendril>, size: u16) -> Self {
    Self {
      family: family.into(),
      size,
      traits: FontTraits::empty(),
    }
  }

  #[must_use]
  pub fn with_traits(mut self, traits: FontTraits) -> Self {
    self.traits = traits;
    self
  }

  /// Same family and size, traits taken from `other`.
  #[must_use]
  pub fn with_traits_of(&self, other: &Font) -> Self {
    self.clone().with_traits(other.traits)
  }
}

impl Default for Font {
  fn default() -> Self {
    Self::new("system-ui", 13)
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid color {0:?}: expected #rrggbb or #rrggbbaa")]
pub struct ParseColorError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
  pub r: u8,
  pub g: u8,
  pub b: u8,
  pub a: u8,
}

impl Color {
  pub const BLACK: Color = Color::rgb(0, 0, 0);
  pub const CLEAR: Color = Color::rgba(0, 0, 0, 0);

  pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
    Self::rgba(r, g, b, 0xff)
  }

  pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
    Self { r, g, b, a }
  }
}

impl FromStr for Color {
  type Err = ParseColorError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let err = || ParseColorError(s.to_string());
    let hex = s.strip_prefix('#').ok_or_else(err)?;
    if !hex.is_ascii() || !(hex.len() == 6 || hex.len() == 8) {
      return Err(err());
    }

    let channel = |idx: usize| u8::from_str_radix(&hex[idx..idx + 2], 16).map_err(|_| err());
    let a = if hex.len() == 8 { channel(6)? } else { 0xff };

    Ok(Self::rgba(channel(0)?, channel(2)?, channel(4)?, a))
  }
}

impl TryFrom<String> for Color {
  type Error = ParseColorError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}

impl From<Color> for String {
  fn from(color: Color) -> Self {
    color.to_string()
  }
}

impl fmt::Display for Color {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
    if self.a != 0xff {
      write!(f, "{:02x}", self.a)?;
    }
    Ok(())
  }
}
