//! Chain state machine scenarios: fatal short-circuiting, view sharing,
//! and failure accumulation.

use attest::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[test]
fn null_subject_yields_null_and_constraint_messages_only() {
    let validators = Validators::new();
    let messages = validators
        .check_if(None::<bool>, "actual")
        .is_true()
        .is_equal_to(5)
        .messages();
    assert_eq!(
        messages,
        ["\"actual\" may not be null", "\"actual\" must be true"]
    );
}

#[test]
fn fatal_state_is_idempotent() {
    let validators = Validators::new();
    let failures = validators
        .check_if(None::<i32>, "actual")
        .is_greater_than(0)
        .is_less_than(10)
        .is_between(0, 10)
        .is_not_empty()
        .failures();
    let null_messages = failures
        .messages()
        .into_iter()
        .filter(|m| m.contains("may not be null"))
        .count();
    assert_eq!(null_messages, 1);
}

#[test]
fn content_equal_arrays_record_no_failures() {
    let validators = Validators::new();
    let first = vec![vec![1, 2], vec![3]];
    let second = vec![vec![1, 2], vec![3]];
    let validator = validators.require_that(first, "actual").is_equal_to(second);
    assert!(!validator.validation_failed());
    assert!(validator.into_result().is_ok());
}

#[test]
fn view_failures_share_one_ordered_list() {
    let validators = Validators::new();
    let chain = validators
        .check_if(vec![1, 2, 3], "actual")
        .contains(9)
        .length()
        .is_equal_to(4u64);
    let messages = chain.messages();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].starts_with("\"actual\" must contain 9"));
    assert!(messages[1].starts_with("\"actual.length()\" must be equal to 4"));
}

#[test]
fn fatal_on_the_parent_short_circuits_the_view() {
    let validators = Validators::new();
    let messages = validators
        .check_if(None::<Vec<i32>>, "actual")
        .is_not_empty()
        .length()
        .is_equal_to(0u64)
        .messages();
    // The null failure, the constraint's own failure, and nothing through
    // the view.
    assert_eq!(
        messages,
        ["\"actual\" may not be null", "\"actual\" may not be empty"]
    );
}

#[test]
fn keys_view_validates_against_map_keys() {
    let validators = Validators::new();
    let mut map = std::collections::HashMap::new();
    map.insert(1, "one");
    map.insert(2, "two");
    let chain = validators
        .check_if(map, "settings")
        .keys()
        .contains(3);
    let messages = chain.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("\"settings.keys()\" must contain 3"));
}

#[test]
fn eager_mode_surfaces_exactly_one_error() {
    let validators = Validators::new();
    let error = validators
        .require_that(3, "actual")
        .is_equal_to(5)
        .is_greater_than(10)
        .into_result()
        .unwrap_err();
    assert_eq!(error.kind(), FailureKind::IllegalArgument);
    assert!(error.message().starts_with("\"actual\" must be equal to 5"));
    assert!(!error.message().contains("greater than"));
}

#[test]
fn collecting_mode_aggregates_all_messages() {
    let validators = Validators::new();
    let error = validators
        .check_if(3, "actual")
        .is_equal_to(5)
        .is_greater_than(10)
        .into_result()
        .unwrap_err();
    assert!(error.message().contains("validation failed with 2 failure(s)"));
    assert!(error.message().contains("must be equal to 5"));
    assert!(error.message().contains("must be greater than 10"));
}

#[rstest]
#[case(5, "\"actual\" must be less than 5")]
#[case(4, "\"actual\" must be less than 4")]
fn comparison_messages_name_the_bound(#[case] bound: i32, #[case] expected: &str) {
    let validators = Validators::new();
    let messages = validators
        .check_if(7, "actual")
        .is_less_than(bound)
        .messages();
    assert!(messages[0].starts_with(expected));
}

#[test]
fn failure_context_preserves_insertion_order() {
    let validators = Validators::new();
    validators.with_context("billing", "component");
    let failures = validators
        .check_if(3, "actual")
        .with_context("r-17", "request-id")
        .is_equal_to(5)
        .failures();
    let labels: Vec<String> = failures.records()[0]
        .context()
        .map(|(label, _)| label.to_owned())
        .collect();
    assert_eq!(labels, ["actual", "expected", "request-id", "component"]);
}

#[test]
fn each_collected_message_is_independently_complete() {
    let validators = Validators::new();
    let messages = validators
        .check_if("ab", "code")
        .length()
        .is_greater_than_or_equal_to(5u64)
        .messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("\"code.length()\""));
    assert!(messages[0].contains("actual: 2"));
}
