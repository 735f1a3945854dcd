//! Diff contract properties: reconstruction, pairing, and message
//! integration.

use attest::diff::{EOS_MARKER, SegmentKind, diff};
use attest::prelude::*;
use proptest::prelude::*;

proptest! {
    #[test]
    fn equal_plus_delete_reconstructs_the_actual_rendering(
        actual in "[ -~]{0,40}",
        expected in "[ -~]{0,40}",
    ) {
        let result = diff(&actual, &expected);
        prop_assert_eq!(result.actual_text(), format!("{actual}{EOS_MARKER}"));
        prop_assert_eq!(result.expected_text(), format!("{expected}{EOS_MARKER}"));
    }

    #[test]
    fn segments_always_pair_and_align(
        actual in "[a-f\\n]{0,30}",
        expected in "[a-f\\n]{0,30}",
    ) {
        let result = diff(&actual, &expected);
        prop_assert_eq!(result.actual.len(), result.expected.len());
        for (a, e) in result.actual.iter().zip(&result.expected) {
            let paired = matches!(
                (a.kind, e.kind),
                (SegmentKind::Equal, SegmentKind::Equal)
                    | (SegmentKind::Delete, SegmentKind::Padding)
                    | (SegmentKind::Padding, SegmentKind::Insert)
            );
            prop_assert!(paired, "unpaired kinds: {:?} / {:?}", a.kind, e.kind);
            prop_assert_eq!(a.text.chars().count(), e.text.chars().count());
        }
    }

    #[test]
    fn display_rows_keep_equal_width(
        actual in "[ -~]{0,30}",
        expected in "[ -~]{0,30}",
    ) {
        let lines = diff(&actual, &expected).lines();
        for i in 0..lines.len() {
            prop_assert_eq!(
                lines.actual[i].chars().count(),
                lines.expected[i].chars().count()
            );
        }
    }
}

#[test]
fn prefix_difference_is_made_visible_by_the_marker() {
    let validators = Validators::new();
    let messages = validators
        .check_if("Hello World", "greeting")
        .is_equal_to("Hello World and more")
        .messages();
    // Without the end-of-string marker the trailing insertion would be
    // invisible in the aligned output.
    assert!(messages[0].contains(EOS_MARKER));
    assert!(messages[0].contains("diff"));
    assert!(messages[0].contains('+'));
}

#[test]
fn equality_failure_embeds_aligned_rows() {
    let validators = Validators::new();
    let messages = validators
        .check_if("foosball arena", "actual")
        .is_equal_to("ballroom arena")
        .messages();
    let message = &messages[0];
    assert!(message.contains("actual  : "));
    assert!(message.contains("diff    : "));
    assert!(message.contains("expected: "));
    assert!(message.contains('-'));
    assert!(message.contains('+'));
}

#[test]
fn short_renderings_skip_the_diff_rows() {
    let validators = Validators::new();
    let messages = validators
        .check_if("ab", "actual")
        .is_equal_to("cd")
        .messages();
    assert!(!messages[0].contains("diff"));
    assert!(messages[0].contains("actual  : \"ab\""));
    assert!(messages[0].contains("expected: \"cd\""));
}
