//! Produces classified segment pairs from two renderings.

use similar::{ChangeTag, TextDiff};

use super::{DiffResult, DiffSegment, SegmentKind};

/// Marker appended to both renderings so trailing differences (one string
/// being a strict prefix of the other, trailing whitespace) stay visible.
/// Rendered literally, like the newline marker.
pub const EOS_MARKER: &str = "\\0";

/// Diffs two renderings character by character.
///
/// Deterministic for identical inputs. The marker is appended to both sides
/// before alignment and is part of the reconstructable text.
#[must_use]
pub fn diff(actual: &str, expected: &str) -> DiffResult {
    let actual = format!("{actual}{EOS_MARKER}");
    let expected = format!("{expected}{EOS_MARKER}");
    let changes = TextDiff::from_chars(actual.as_str(), expected.as_str());

    let mut builder = SegmentBuilder::default();
    for change in changes.iter_all_changes() {
        builder.push(change.tag(), change.value());
    }
    builder.finish()
}

/// Accumulates per-character changes into runs of one segment kind.
#[derive(Default)]
struct SegmentBuilder {
    result: DiffResult,
    run_tag: Option<ChangeTag>,
    run_text: String,
}

impl SegmentBuilder {
    fn push(&mut self, tag: ChangeTag, text: &str) {
        if self.run_tag != Some(tag) {
            self.flush();
            self.run_tag = Some(tag);
        }
        self.run_text.push_str(text);
    }

    fn flush(&mut self) {
        let Some(tag) = self.run_tag.take() else {
            return;
        };
        let text = std::mem::take(&mut self.run_text);
        if text.is_empty() {
            return;
        }
        let padding = " ".repeat(text.chars().count());
        match tag {
            ChangeTag::Equal => {
                self.result
                    .actual
                    .push(DiffSegment::new(SegmentKind::Equal, text.clone()));
                self.result
                    .expected
                    .push(DiffSegment::new(SegmentKind::Equal, text));
            }
            ChangeTag::Delete => {
                self.result
                    .actual
                    .push(DiffSegment::new(SegmentKind::Delete, text));
                self.result
                    .expected
                    .push(DiffSegment::new(SegmentKind::Padding, padding));
            }
            ChangeTag::Insert => {
                self.result
                    .actual
                    .push(DiffSegment::new(SegmentKind::Padding, padding));
                self.result
                    .expected
                    .push(DiffSegment::new(SegmentKind::Insert, text));
            }
        }
    }

    fn finish(mut self) -> DiffResult {
        self.flush();
        self.result
    }
}
