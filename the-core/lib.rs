//! Character-level primitives shared by the rich-text crates.
//!
//! Everything here works in units of Unicode scalar values, which is the
//! addressing unit of the whole workspace (ropey char indices).

pub mod chars;
pub mod line_ending;
