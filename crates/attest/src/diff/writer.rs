//! Assembles classified segments into aligned display lines.
//!
//! The diff row marks deleted characters with `-`, inserted characters with
//! `+`, and equal characters with spaces. The opposite side of a deletion or
//! insertion is padded so the three rows line up column by column. Newlines
//! are shown as a literal `\n` marker; lines split on newlines found in
//! equal spans.

use super::{DiffResult, SegmentKind};

/// Marker substituted for a newline character so it stays visible.
const NEWLINE_MARKER: &str = "\\n";

/// Parallel display lines for a diffed pair of renderings.
///
/// `equal[i]` is `true` when line `i` contains no insertions or deletions;
/// such lines need no diff row when displayed.
#[derive(Debug, Clone, Default)]
pub struct DiffLines {
    pub actual: Vec<String>,
    pub diff: Vec<String>,
    pub expected: Vec<String>,
    pub equal: Vec<bool>,
}

impl DiffLines {
    #[must_use]
    pub fn len(&self) -> usize {
        self.actual.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actual.is_empty()
    }
}

pub(super) fn lines(result: &DiffResult) -> DiffLines {
    let mut writer = LineWriter::default();
    for (actual, expected) in result.actual.iter().zip(&result.expected) {
        match (actual.kind, expected.kind) {
            (SegmentKind::Equal, SegmentKind::Equal) => writer.write_equal(&actual.text),
            (SegmentKind::Delete, SegmentKind::Padding) => writer.write_deleted(&actual.text),
            (SegmentKind::Padding, SegmentKind::Insert) => writer.write_inserted(&expected.text),
            // Pairing is fixed by the generator; anything else is a bug there.
            other => unreachable!("unpaired segment kinds: {other:?}"),
        }
    }
    writer.finish()
}

#[derive(Default)]
struct LineWriter {
    lines: DiffLines,
    actual: String,
    diff: String,
    expected: String,
    dirty: bool,
}

impl LineWriter {
    fn write_equal(&mut self, text: &str) {
        for c in text.chars() {
            if c == '\n' {
                self.actual.push_str(NEWLINE_MARKER);
                self.expected.push_str(NEWLINE_MARKER);
                self.diff.push_str("  ");
                self.flush();
            } else {
                self.actual.push(c);
                self.expected.push(c);
                self.diff.push(' ');
            }
        }
    }

    fn write_deleted(&mut self, text: &str) {
        self.dirty = true;
        for c in text.chars() {
            let width = self.push_visible(c, Side::Actual);
            for _ in 0..width {
                self.diff.push('-');
                self.expected.push(' ');
            }
        }
    }

    fn write_inserted(&mut self, text: &str) {
        self.dirty = true;
        for c in text.chars() {
            let width = self.push_visible(c, Side::Expected);
            for _ in 0..width {
                self.diff.push('+');
                self.actual.push(' ');
            }
        }
    }

    /// Appends one character (or its visible marker) to one side and
    /// returns the number of columns it occupies.
    fn push_visible(&mut self, c: char, side: Side) -> usize {
        let buffer = match side {
            Side::Actual => &mut self.actual,
            Side::Expected => &mut self.expected,
        };
        if c == '\n' {
            buffer.push_str(NEWLINE_MARKER);
            NEWLINE_MARKER.len()
        } else {
            buffer.push(c);
            1
        }
    }

    fn flush(&mut self) {
        self.lines.actual.push(std::mem::take(&mut self.actual));
        self.lines.diff.push(std::mem::take(&mut self.diff));
        self.lines
            .expected
            .push(std::mem::take(&mut self.expected));
        self.lines.equal.push(!self.dirty);
        self.dirty = false;
    }

    fn finish(mut self) -> DiffLines {
        if !self.actual.is_empty() || !self.expected.is_empty() {
            self.flush();
        }
        self.lines
    }
}

#[derive(Clone, Copy)]
enum Side {
    Actual,
    Expected,
}
