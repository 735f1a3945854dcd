//! Alignment of two rendered values for side-by-side display.
//!
//! The character alignment itself is delegated to the `similar` crate; this
//! module classifies the result into [`DiffSegment`]s and assembles the
//! aligned `actual` / `diff` / `expected` display lines embedded in failure
//! messages.

mod generator;
mod writer;

pub use generator::{EOS_MARKER, diff};
pub use writer::DiffLines;

/// Classification of one span of a rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Present and identical in both renderings.
    Equal,
    /// Present only in the expected rendering.
    Insert,
    /// Present only in the actual rendering.
    Delete,
    /// Blank filler aligning this side with the other side's text.
    Padding,
}

/// One classified span of a rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffSegment {
    pub kind: SegmentKind,
    pub text: String,
}

impl DiffSegment {
    pub(crate) fn new(kind: SegmentKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Parallel segment sequences for the actual and expected renderings.
///
/// Segments are produced in matched pairs: `Equal` pairs with `Equal`,
/// `Delete` with `Padding`, and `Padding` with `Insert`, so `actual[i]` and
/// `expected[i]` always occupy the same display columns.
#[derive(Debug, Clone, Default)]
pub struct DiffResult {
    pub actual: Vec<DiffSegment>,
    pub expected: Vec<DiffSegment>,
}

impl DiffResult {
    /// Reconstructs the actual rendering (with its end-of-string marker)
    /// from the Equal and Delete segments.
    #[must_use]
    pub fn actual_text(&self) -> String {
        self.actual
            .iter()
            .filter(|s| matches!(s.kind, SegmentKind::Equal | SegmentKind::Delete))
            .map(|s| s.text.as_str())
            .collect()
    }

    /// Reconstructs the expected rendering (with its end-of-string marker)
    /// from the Equal and Insert segments.
    #[must_use]
    pub fn expected_text(&self) -> String {
        self.expected
            .iter()
            .filter(|s| matches!(s.kind, SegmentKind::Equal | SegmentKind::Insert))
            .map(|s| s.text.as_str())
            .collect()
    }

    /// `true` when the two renderings are identical.
    #[must_use]
    pub fn is_equal(&self) -> bool {
        self.actual
            .iter()
            .all(|s| matches!(s.kind, SegmentKind::Equal))
    }

    /// Assembles the aligned display lines.
    #[must_use]
    pub fn lines(&self) -> DiffLines {
        writer::lines(self)
    }
}
