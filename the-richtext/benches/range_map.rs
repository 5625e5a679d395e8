//! Benchmarks for range mapping and paragraph scanning in the-richtext.
//!
//! Run with: `cargo bench -p the-richtext --bench range_map`

use divan::{
  Bencher,
  black_box,
};
use ropey::Rope;
use the_richtext::{
  edit::Edit,
  paragraph::{
    next_paragraph_range,
    paragraph_ranges,
  },
  range::{
    Range,
    map_range,
  },
};

fn main() {
  divan::main();
}

fn make_text(size: usize) -> String {
  let line = "The quick brown fox jumps over the lazy dog.\n";
  let mut s = String::with_capacity(size);
  while s.len() < size {
    s.push_str(line);
  }
  s.truncate(size);
  s
}

/// `count` edits spread over `len` units, alternating inserts and deletes.
fn make_edits(len: usize, count: usize) -> Vec<Edit> {
  let step = len / (count + 1);
  (0..count)
    .map(|i| {
      let start = (i + 1) * step;
      if i % 2 == 0 {
        Edit::replace_text(Range::point(start), "xyz")
      } else {
        Edit::delete(Range::new(start, 3))
      }
    })
    .collect()
}

// `map_range` benchmarks.

mod map {
  use super::*;

  const LEN: usize = 100 * 1024;

  #[divan::bench(args = [1, 8, 64, 512])]
  fn through_edits(bencher: Bencher, count: usize) {
    let edits = make_edits(LEN, count);
    let range = Range::new(LEN / 2, 64);

    bencher.bench(|| black_box(map_range(black_box(Some(range)), &edits)));
  }

  #[divan::bench(args = [8, 64])]
  fn many_anchors(bencher: Bencher, count: usize) {
    let edits = make_edits(LEN, count);
    let anchors: Vec<Range> = (0..256).map(|i| Range::new(i * 397, 16)).collect();

    bencher.bench(|| {
      for anchor in &anchors {
        black_box(anchor.map_all(&edits));
      }
    });
  }
}

// Paragraph scanner benchmarks.

mod paragraphs {
  use super::*;

  #[divan::bench(args = [4 * 1024, 100 * 1024])]
  fn ranges_over_whole_text(bencher: Bencher, size: usize) {
    let rope = Rope::from_str(&make_text(size));
    let all = Range::new(0, rope.len_chars());

    bencher.bench(|| black_box(paragraph_ranges(rope.slice(..), black_box(all))));
  }

  #[divan::bench]
  fn walk_next(bencher: Bencher) {
    let rope = Rope::from_str(&make_text(100 * 1024));

    bencher.bench(|| {
      let mut pos = 0;
      while let Some(next) = next_paragraph_range(rope.slice(..), pos) {
        pos = next.start;
      }
      black_box(pos)
    });
  }
}
