//! Type-driven string mapping: the registry of rendering functions and the
//! cycle-safe renderer that applies them.
//!
//! Resolution precedence: an exact [`Token::Type`] registration for the
//! value's concrete source type wins over the per-kind dispatch table
//! ([`Token::Kind`]), which wins over the built-in fallback rendering. The
//! fallback always produces text; rendering never fails.

use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::render::value::{Value, ValueKind};

/// Rendered in place of a composite that is already being rendered further
/// up the call stack.
pub const CYCLE_MARKER: &str = "...";

/// A rendering function. Receives the value and the active render scope,
/// through which element renderings recurse.
pub type MapperFn = Arc<dyn Fn(&Value, &mut RenderScope<'_>) -> String + Send + Sync>;

/// Registry key: the null value, a value kind, or an exact concrete type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    /// The formatter for a null value.
    Null,
    /// One entry per composite or primitive kind — the dispatch table.
    Kind(ValueKind),
    /// An exact concrete-type registration; always wins over `Kind`.
    Type(TypeId),
}

// ============================================================================
// RENDER SCOPE
// ============================================================================

/// State of one top-level render call: the registry in use and the
/// identities of every composite entered so far.
///
/// Identities are added before descending into a composite's children and
/// retained until the top-level call returns, so a composite reached twice
/// renders as [`CYCLE_MARKER`] the second time.
pub struct RenderScope<'a> {
    mappers: &'a TypeMappers,
    seen: HashSet<usize>,
}

impl<'a> RenderScope<'a> {
    fn new(mappers: &'a TypeMappers) -> Self {
        Self {
            mappers,
            seen: HashSet::new(),
        }
    }

    /// Renders a value through the registry, guarding against cycles.
    pub fn render(&mut self, value: &Value) -> String {
        if let Some(identity) = value.identity() {
            if !self.seen.insert(identity) {
                return CYCLE_MARKER.to_owned();
            }
        }
        match self.mappers.resolve(value) {
            Some(mapper) => mapper(value, self),
            None => fallback_text(value, self),
        }
    }
}

// ============================================================================
// REGISTRY (FROZEN)
// ============================================================================

/// An immutable mapping from type tokens to rendering functions.
///
/// Cloning is cheap; the table is shared. Edits go through
/// [`MutableTypeMappers`] and produce a new frozen copy — chains keep
/// whichever snapshot they were constructed with.
#[derive(Clone)]
pub struct TypeMappers {
    mapping: Arc<HashMap<Token, MapperFn>>,
}

impl Default for TypeMappers {
    fn default() -> Self {
        let mut mapping: HashMap<Token, MapperFn> = HashMap::new();
        mapping.insert(Token::Null, Arc::new(|_, _| "null".to_owned()));
        mapping.insert(
            Token::Kind(ValueKind::Bool),
            Arc::new(|value, scope| match value {
                Value::Bool(b) => b.to_string(),
                _ => fallback_text(value, scope),
            }),
        );
        mapping.insert(
            Token::Kind(ValueKind::Int),
            Arc::new(|value, scope| match value {
                Value::Int(i) => group_digits(&i.to_string()),
                _ => fallback_text(value, scope),
            }),
        );
        mapping.insert(
            Token::Kind(ValueKind::UInt),
            Arc::new(|value, scope| match value {
                Value::UInt(u) => group_digits(&u.to_string()),
                _ => fallback_text(value, scope),
            }),
        );
        mapping.insert(
            Token::Kind(ValueKind::Float),
            Arc::new(|value, scope| match value {
                Value::Float(f) => f.to_string(),
                _ => fallback_text(value, scope),
            }),
        );
        mapping.insert(
            Token::Kind(ValueKind::Str),
            Arc::new(|value, scope| match value {
                Value::Str(s) => quote_string(s),
                _ => fallback_text(value, scope),
            }),
        );
        mapping.insert(
            Token::Kind(ValueKind::Path),
            Arc::new(|value, scope| match value {
                Value::Path(p) => path_to_string(p),
                _ => fallback_text(value, scope),
            }),
        );
        mapping.insert(
            Token::Kind(ValueKind::List),
            Arc::new(|value, scope| match value {
                Value::List(list) => join_values(&list.snapshot(), "[", "]", scope),
                _ => fallback_text(value, scope),
            }),
        );
        mapping.insert(
            Token::Kind(ValueKind::Set),
            Arc::new(|value, scope| match value {
                Value::Set(set) => {
                    let mut items = set.snapshot();
                    if !set.is_ordered() {
                        sort_if_comparable(&mut items);
                    }
                    join_values(&items, "[", "]", scope)
                }
                _ => fallback_text(value, scope),
            }),
        );
        mapping.insert(
            Token::Kind(ValueKind::Map),
            Arc::new(|value, scope| match value {
                Value::Map(map) => {
                    let mut entries = map.snapshot();
                    if !map.is_ordered() {
                        sort_entries_if_comparable(&mut entries);
                    }
                    join_entries(&entries, scope)
                }
                _ => fallback_text(value, scope),
            }),
        );
        mapping.insert(
            Token::Kind(ValueKind::Error),
            Arc::new(|value, scope| match value {
                Value::Error(chain) => error_to_string(chain.messages()),
                _ => fallback_text(value, scope),
            }),
        );
        mapping.insert(
            Token::Kind(ValueKind::Opaque),
            Arc::new(|value, scope| match value {
                Value::Opaque(opaque) => opaque.text().to_owned(),
                _ => fallback_text(value, scope),
            }),
        );
        Self {
            mapping: Arc::new(mapping),
        }
    }
}

impl TypeMappers {
    /// Renders a value to its display text. Never fails.
    #[must_use]
    pub fn render(&self, value: &Value) -> String {
        RenderScope::new(self).render(value)
    }

    fn resolve(&self, value: &Value) -> Option<MapperFn> {
        if value.is_null() {
            return self.mapping.get(&Token::Null).cloned();
        }
        if let Some(tag) = value.type_tag() {
            if let Some(mapper) = self.mapping.get(&Token::Type(tag.id())) {
                return Some(mapper.clone());
            }
        }
        self.mapping.get(&Token::Kind(value.kind())).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}

impl fmt::Debug for TypeMappers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeMappers")
            .field("mappings", &self.mapping.len())
            .finish()
    }
}

// ============================================================================
// REGISTRY (MUTABLE WORKING COPY)
// ============================================================================

/// A mutable working copy of a [`TypeMappers`], edited through the
/// configuration updater and frozen back with [`freeze`](Self::freeze).
///
/// Within one token the most recent registration replaces the previous one;
/// across tokens the frozen registry resolves exact type, then kind, then
/// the built-in fallback.
#[derive(Clone, Default)]
pub struct MutableTypeMappers {
    mapping: HashMap<Token, MapperFn>,
}

impl From<&TypeMappers> for MutableTypeMappers {
    fn from(mappers: &TypeMappers) -> Self {
        Self {
            mapping: mappers.mapping.as_ref().clone(),
        }
    }
}

impl MutableTypeMappers {
    /// Registers a formatter for the exact concrete type `T`.
    pub fn put<T, F>(&mut self, mapper: F) -> &mut Self
    where
        T: 'static,
        F: Fn(&Value, &mut RenderScope<'_>) -> String + Send + Sync + 'static,
    {
        self.mapping
            .insert(Token::Type(TypeId::of::<T>()), Arc::new(mapper));
        self
    }

    /// Registers a formatter for every value of the given kind.
    pub fn put_kind<F>(&mut self, kind: ValueKind, mapper: F) -> &mut Self
    where
        F: Fn(&Value, &mut RenderScope<'_>) -> String + Send + Sync + 'static,
    {
        self.mapping.insert(Token::Kind(kind), Arc::new(mapper));
        self
    }

    /// Registers the formatter used for null values.
    pub fn put_null<F>(&mut self, mapper: F) -> &mut Self
    where
        F: Fn(&Value, &mut RenderScope<'_>) -> String + Send + Sync + 'static,
    {
        self.mapping.insert(Token::Null, Arc::new(mapper));
        self
    }

    /// Removes the formatter for the exact concrete type `T`.
    pub fn remove<T: 'static>(&mut self) -> &mut Self {
        self.mapping.remove(&Token::Type(TypeId::of::<T>()));
        self
    }

    /// Removes the formatter for a kind, exposing the built-in fallback.
    pub fn remove_kind(&mut self, kind: ValueKind) -> &mut Self {
        self.mapping.remove(&Token::Kind(kind));
        self
    }

    /// Freezes the working copy into an immutable registry.
    #[must_use]
    pub fn freeze(&self) -> TypeMappers {
        TypeMappers {
            mapping: Arc::new(self.mapping.clone()),
        }
    }
}

impl fmt::Debug for MutableTypeMappers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutableTypeMappers")
            .field("mappings", &self.mapping.len())
            .finish()
    }
}

// ============================================================================
// RENDERING HELPERS
// ============================================================================

/// Generic conversion used when no formatter matches. Still recurses through
/// the scope for composite children so registered element formatters apply.
fn fallback_text(value: &Value, scope: &mut RenderScope<'_>) -> String {
    match value {
        Value::Null => "null".to_owned(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::UInt(u) => u.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Str(s) => quote_string(s),
        Value::Path(p) => path_to_string(p),
        Value::List(list) => join_values(&list.snapshot(), "[", "]", scope),
        Value::Set(set) => join_values(&set.snapshot(), "[", "]", scope),
        Value::Map(map) => join_entries(&map.snapshot(), scope),
        Value::Error(chain) => error_to_string(chain.messages()),
        Value::Opaque(opaque) => opaque.text().to_owned(),
    }
}

/// Quotes a string, escaping any nested quotes.
#[must_use]
pub fn quote_string(value: &str) -> String {
    let mut result = String::with_capacity(value.len() + 2);
    result.push('"');
    for c in value.chars() {
        if c == '"' {
            result.push_str("\\\"");
        } else {
            result.push(c);
        }
    }
    result.push('"');
    result
}

/// Inserts `,` thousands separators into a formatted integer.
fn group_digits(digits: &str) -> String {
    let (sign, magnitude) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    let mut grouped = String::with_capacity(magnitude.len() + magnitude.len() / 3 + 1);
    let offset = magnitude.len() % 3;
    for (i, c) in magnitude.chars().enumerate() {
        if i != 0 && i % 3 == offset {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{sign}{grouped}")
}

fn path_to_string(path: &std::path::Path) -> String {
    match std::path::absolute(path) {
        Ok(absolute) => absolute.display().to_string(),
        Err(_) => path.display().to_string(),
    }
}

fn error_to_string(messages: &[String]) -> String {
    let mut text = String::new();
    for (i, message) in messages.iter().enumerate() {
        if i == 0 {
            text.push_str(message);
        } else {
            text.push_str("\nCaused by: ");
            text.push_str(message);
        }
    }
    text
}

fn join_values(items: &[Value], open: &str, close: &str, scope: &mut RenderScope<'_>) -> String {
    let mut text = String::from(open);
    for (i, item) in items.iter().enumerate() {
        if i != 0 {
            text.push_str(", ");
        }
        text.push_str(&scope.render(item));
    }
    text.push_str(close);
    text
}

fn join_entries(entries: &[(Value, Value)], scope: &mut RenderScope<'_>) -> String {
    let mut text = String::from("{");
    for (i, (key, value)) in entries.iter().enumerate() {
        if i != 0 {
            text.push_str(", ");
        }
        text.push_str(&scope.render(key));
        text.push('=');
        text.push_str(&scope.render(value));
    }
    text.push('}');
    text
}

/// Sorts by natural order when every element is comparable to every other;
/// leaves iteration order untouched otherwise.
fn sort_if_comparable(items: &mut [Value]) {
    let Some(first) = items.first() else {
        return;
    };
    if items.iter().all(|item| item.natural_cmp(first).is_some()) {
        items.sort_by(|a, b| a.natural_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    }
}

fn sort_entries_if_comparable(entries: &mut [(Value, Value)]) {
    let Some((first, _)) = entries.first() else {
        return;
    };
    let first = first.clone();
    if entries
        .iter()
        .all(|(key, _)| key.natural_cmp(&first).is_some())
    {
        entries.sort_by(|(a, _), (b, _)| a.natural_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::value::{IntoValue, ListHandle, SetHandle, TypeTag};
    use pretty_assertions::assert_eq;
    use std::collections::{BTreeSet, HashSet};

    fn mappers() -> TypeMappers {
        TypeMappers::default()
    }

    #[test]
    fn renders_primitives() {
        let m = mappers();
        assert_eq!(m.render(&Value::Null), "null");
        assert_eq!(m.render(&true.into_value()), "true");
        assert_eq!(m.render(&5i32.into_value()), "5");
        assert_eq!(m.render(&1.5f64.into_value()), "1.5");
    }

    #[test]
    fn groups_integer_digits() {
        let m = mappers();
        assert_eq!(m.render(&1_234_567i64.into_value()), "1,234,567");
        assert_eq!(m.render(&(-1_234i64).into_value()), "-1,234");
        assert_eq!(m.render(&999i64.into_value()), "999");
    }

    #[test]
    fn quotes_strings_and_escapes_embedded_quotes() {
        let m = mappers();
        assert_eq!(m.render(&"hello".into_value()), "\"hello\"");
        assert_eq!(m.render(&"say \"hi\"".into_value()), "\"say \\\"hi\\\"\"");
    }

    #[test]
    fn renders_nested_lists() {
        let m = mappers();
        let value = vec![vec![1i64, 2], vec![3]].into_value();
        assert_eq!(m.render(&value), "[[1, 2], [3]]");
    }

    #[test]
    fn unordered_sets_render_sorted() {
        let m = mappers();
        let a: HashSet<i64> = [3, 1, 2].into_iter().collect();
        let b: BTreeSet<i64> = [3, 1, 2].into_iter().collect();
        assert_eq!(m.render(&a.into_value()), "[1, 2, 3]");
        assert_eq!(m.render(&b.into_value()), "[1, 2, 3]");
    }

    #[test]
    fn incomparable_set_elements_keep_iteration_order() {
        let m = mappers();
        let set = Value::Set(SetHandle::from_items(
            None,
            false,
            vec![Value::Str("b".into()), Value::Int(1)],
        ));
        assert_eq!(m.render(&set), "[\"b\", 1]");
    }

    #[test]
    fn maps_render_sorted_by_key() {
        let m = mappers();
        let map: std::collections::HashMap<i64, &str> =
            [(2, "two"), (1, "one")].into_iter().collect();
        assert_eq!(m.render(&map.into_value()), "{1=\"one\", 2=\"two\"}");
    }

    #[test]
    fn rendering_is_deterministic() {
        let m = mappers();
        let set: HashSet<i64> = [5, 3, 9, 1].into_iter().collect();
        let value = set.into_value();
        assert_eq!(m.render(&value), m.render(&value));
    }

    #[test]
    fn self_referential_list_renders_cycle_marker() {
        let m = mappers();
        let list = ListHandle::new();
        list.push(Value::List(list.clone()));
        assert_eq!(m.render(&Value::List(list)), "[...]");
    }

    #[test]
    fn duplicate_identity_renders_cycle_marker() {
        let m = mappers();
        let shared = ListHandle::from_items(None, vec![Value::Int(1)]);
        let outer = Value::list_of(vec![
            Value::List(shared.clone()),
            Value::List(shared),
        ]);
        assert_eq!(m.render(&outer), "[[1], ...]");
    }

    #[test]
    fn exact_type_registration_beats_kind() {
        let mut mutable = MutableTypeMappers::from(&mappers());
        mutable.put::<Vec<i64>, _>(|_, _| "ints".to_owned());
        let frozen = mutable.freeze();

        assert_eq!(frozen.render(&vec![1i64, 2].into_value()), "ints");
        // Other list types still use the kind formatter.
        assert_eq!(frozen.render(&vec!["a"].into_value()), "[\"a\"]");
    }

    #[test]
    fn nested_exact_registration_wins_inside_composites() {
        let mut mutable = MutableTypeMappers::from(&mappers());
        mutable.put::<Vec<Vec<i64>>, _>(|value, _| {
            let Value::List(list) = value else {
                return String::new();
            };
            format!("matrix({} rows)", list.len())
        });
        let frozen = mutable.freeze();

        let value = vec![vec![1i64, 2], vec![3]].into_value();
        assert_eq!(frozen.render(&value), "matrix(2 rows)");
    }

    #[test]
    fn null_formatter_is_replaceable() {
        let mut mutable = MutableTypeMappers::from(&mappers());
        mutable.put_null(|_, _| "(absent)".to_owned());
        assert_eq!(mutable.freeze().render(&Value::Null), "(absent)");
    }

    #[test]
    fn latest_registration_wins() {
        let mut mutable = MutableTypeMappers::from(&mappers());
        mutable.put::<Vec<i64>, _>(|_, _| "first".to_owned());
        mutable.put::<Vec<i64>, _>(|_, _| "second".to_owned());
        assert_eq!(
            mutable.freeze().render(&vec![1i64].into_value()),
            "second"
        );
    }

    #[test]
    fn edits_do_not_affect_existing_snapshots() {
        let original = mappers();
        let mut mutable = MutableTypeMappers::from(&original);
        mutable.put_kind(ValueKind::Bool, |_, _| "yep".to_owned());
        let edited = mutable.freeze();

        let value = true.into_value();
        assert_eq!(original.render(&value), "true");
        assert_eq!(edited.render(&value), "yep");
    }

    #[test]
    fn opaque_values_render_their_captured_debug_text() {
        #[derive(Debug)]
        struct Widget {
            id: u32,
        }
        let value = Value::Opaque(crate::render::value::OpaqueValue::capture(&Widget { id: 7 }));
        assert_eq!(mappers().render(&value), "Widget { id: 7 }");
    }

    #[test]
    fn array_tag_differs_from_vec_tag() {
        assert_ne!(
            TypeTag::of::<[i64; 3]>(),
            TypeTag::of::<Vec<i64>>()
        );
    }

    #[test]
    fn custom_mapper_can_recurse_through_scope() {
        let mut mutable = MutableTypeMappers::from(&mappers());
        mutable.put::<Vec<i64>, _>(|value, scope| {
            let Value::List(list) = value else {
                return String::new();
            };
            let inner: Vec<String> =
                list.snapshot().iter().map(|v| scope.render(v)).collect();
            format!("<{}>", inner.join("|"))
        });
        let frozen = mutable.freeze();
        assert_eq!(frozen.render(&vec![1i64, 2].into_value()), "<1|2>");
    }
}
