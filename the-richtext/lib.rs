use smartstring::{LazyCompact, SmartString};

pub mod attribute;
pub mod buffer;
pub mod command;
pub mod config;
pub mod edit;
pub mod editor;
pub mod highlight;
pub mod marker;
pub mod paragraph;
pub mod range;
pub mod style;

pub type Tendril = SmartString<LazyCompact>;
