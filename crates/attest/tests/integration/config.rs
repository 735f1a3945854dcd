//! Configuration lifecycle: snapshot isolation, equality methods, and the
//! error transformer contract.

use attest::prelude::*;
use pretty_assertions::assert_eq;

#[test]
fn exact_equality_distinguishes_one_from_one_point_zero() {
    let validators = Validators::new();
    assert!(
        validators
            .check_if(1, "actual")
            .is_equal_to(1.0)
            .validation_failed()
    );
}

#[test]
fn comparable_equality_treats_one_and_one_point_zero_alike() {
    let validators = Validators::new();
    validators
        .update_configuration()
        .equality(EqualityMethod::Comparable);
    assert!(
        !validators
            .check_if(1, "actual")
            .is_equal_to(1.0)
            .validation_failed()
    );
}

#[test]
fn disabling_diffs_switches_to_plain_comparison_lines() {
    let validators = Validators::new();
    validators.update_configuration().allow_diff(false);
    let messages = validators
        .check_if("foosball arena", "actual")
        .is_equal_to("ballroom arena")
        .messages();
    assert!(!messages[0].contains("diff"));
    assert!(messages[0].contains("actual  : \"foosball arena\""));
}

#[test]
fn in_flight_chains_keep_their_snapshot() {
    let validators = Validators::new();
    let opened_before = validators.check_if("foosball arena", "actual");
    validators.update_configuration().allow_diff(false);
    let opened_after = validators.check_if("foosball arena", "actual");

    let before = opened_before.is_equal_to("ballroom arena").messages();
    let after = opened_after.is_equal_to("ballroom arena").messages();
    assert!(before[0].contains("diff"));
    assert!(!after[0].contains("diff"));
}

#[test]
fn transformer_rewrites_the_returned_error() {
    let validators = Validators::new();
    validators.update_configuration().error_transformer(|error| {
        Box::new(error.with_kind(FailureKind::IllegalState))
    });
    let error = validators
        .require_that(3, "actual")
        .is_equal_to(5)
        .into_result()
        .unwrap_err();
    assert_eq!(error.kind(), FailureKind::IllegalState);
}

#[test]
fn foreign_transformer_output_is_wrapped_with_its_source_kept() {
    use std::error::Error;

    let validators = Validators::new();
    validators
        .update_configuration()
        .error_transformer(|_| Box::new(std::io::Error::other("substituted")));
    let error = validators
        .require_that(3, "actual")
        .is_equal_to(5)
        .into_result()
        .unwrap_err();
    assert_eq!(error.kind(), FailureKind::AssertionFailed);
    assert!(error.message().contains("please report"));
    let source = error.source().expect("wrapped error keeps its source");
    assert!(source.to_string().contains("substituted"));
}

#[test]
fn transformer_does_not_run_when_validation_passes() {
    let validators = Validators::new();
    validators
        .update_configuration()
        .error_transformer(|_| panic!("must not run"));
    assert!(
        validators
            .require_that(5, "actual")
            .is_equal_to(5)
            .into_result()
            .is_ok()
    );
}

#[test]
fn updater_edits_compose_in_one_scope() {
    let validators = Validators::new();
    {
        let mut updater = validators.update_configuration();
        updater.allow_diff(false).equality(EqualityMethod::Comparable);
        updater
            .string_mappers()
            .put_null(|_, _| "(absent)".to_owned());
        updater.commit();
    }
    let config = validators.configuration();
    assert!(!config.allow_diff());
    assert_eq!(config.equality(), EqualityMethod::Comparable);
    assert_eq!(config.mappers().render(&Value::Null), "(absent)");
}

#[test]
fn custom_null_formatter_shows_up_in_messages() {
    let validators = Validators::new();
    validators
        .update_configuration()
        .string_mappers()
        .put_null(|_, _| "(absent)".to_owned());
    let messages = validators
        .check_if(None::<i32>, "actual")
        .is_equal_to(5)
        .messages();
    assert!(messages[0].contains("actual  : (absent)"));
}
