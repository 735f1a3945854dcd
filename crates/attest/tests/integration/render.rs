//! Rendering scenarios: determinism, cycle safety, and registry precedence
//! observed through failure messages.

use attest::prelude::*;
use pretty_assertions::assert_eq;
use std::collections::{BTreeSet, HashSet};

#[test]
fn sets_and_lists_of_the_same_elements_render_identically() {
    let mappers = TypeMappers::default();
    let set: HashSet<i32> = [3, 1, 2].into_iter().collect();
    let list = vec![1, 2, 3];
    assert_eq!(mappers.render(&set.into_value()), "[1, 2, 3]");
    assert_eq!(mappers.render(&list.into_value()), "[1, 2, 3]");
}

#[test]
fn differently_ordered_equal_collections_render_identically() {
    let mappers = TypeMappers::default();
    let a: HashSet<&str> = ["pear", "apple", "plum"].into_iter().collect();
    let b: BTreeSet<&str> = ["plum", "pear", "apple"].into_iter().collect();
    assert_eq!(
        mappers.render(&a.into_value()),
        mappers.render(&b.into_value())
    );
}

#[test]
fn self_referential_list_renders_without_overflow() {
    let mappers = TypeMappers::default();
    let list = Value::new_list();
    let Value::List(handle) = &list else {
        unreachable!();
    };
    handle.push(list.clone());
    assert_eq!(mappers.render(&list), "[...]");
}

#[test]
fn indirect_cycle_through_a_nested_list_renders_marker() {
    let mappers = TypeMappers::default();
    let outer = Value::new_list();
    let inner = Value::new_list();
    let Value::List(outer_handle) = &outer else {
        unreachable!();
    };
    let Value::List(inner_handle) = &inner else {
        unreachable!();
    };
    inner_handle.push(outer.clone());
    outer_handle.push(inner.clone());
    assert_eq!(mappers.render(&outer), "[[...]]");
}

#[test]
fn self_referential_map_value_renders_marker() {
    let mappers = TypeMappers::default();
    let map = Value::new_map();
    let Value::Map(handle) = &map else {
        unreachable!();
    };
    handle.insert(Value::Str("self".to_owned()), map.clone());
    assert_eq!(mappers.render(&map), "{\"self\"=...}");
}

#[test]
fn exact_registration_beats_the_generic_list_formatter() {
    let validators = Validators::new();
    validators
        .update_configuration()
        .string_mappers()
        .put::<Vec<i64>, _>(|_, _| "int-list".to_owned());

    let messages = validators
        .check_if(vec![1i64, 2], "actual")
        .is_equal_to(vec![3i64, 4])
        .messages();
    assert!(messages[0].contains("int-list"));

    // Lists of other element types still use the kind formatter.
    let messages = validators
        .check_if(vec!["a"], "actual")
        .is_equal_to(vec!["b"])
        .messages();
    assert!(messages[0].contains("[\"a\"]"));
}

#[test]
fn nested_array_formatter_controls_the_failure_message() {
    let validators = Validators::new();
    validators
        .update_configuration()
        .string_mappers()
        .put::<Vec<Vec<i64>>, _>(|value, _| {
            let Value::List(rows) = value else {
                return String::new();
            };
            format!("matrix[{} rows]", rows.len())
        });

    let messages = validators
        .check_if(vec![vec![1i64, 2]], "actual")
        .is_equal_to(vec![vec![3i64, 4], vec![5, 6]])
        .messages();
    assert!(messages[0].contains("matrix[1 rows]"));
    assert!(messages[0].contains("matrix[2 rows]"));
    assert!(!messages[0].contains("[[1, 2]]"));
}

#[test]
fn rendering_the_same_value_twice_is_stable() {
    let mappers = TypeMappers::default();
    let value = vec![vec![1, 2], vec![3]].into_value();
    assert_eq!(mappers.render(&value), mappers.render(&value));
    assert_eq!(mappers.render(&value), "[[1, 2], [3]]");
}

#[test]
fn error_values_render_their_cause_chain() {
    let mappers = TypeMappers::default();
    let inner = std::io::Error::other("root cause");
    let value = Value::from_error(&inner);
    assert!(mappers.render(&value).contains("root cause"));
}

#[test]
fn removed_kind_formatter_falls_back_to_generic_text() {
    let validators = Validators::new();
    validators
        .update_configuration()
        .string_mappers()
        .remove_kind(ValueKind::Int);

    // Fallback rendering drops the thousands grouping but still produces
    // text — rendering never fails.
    let messages = validators
        .check_if(1_000_000, "actual")
        .is_equal_to(2)
        .messages();
    assert!(messages[0].contains("1000000"));
}
