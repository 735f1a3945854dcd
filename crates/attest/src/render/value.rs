//! The uniform subject representation used by validators and the renderer.
//!
//! Every validated value is converted (via [`IntoValue`]) into a [`Value`].
//! Composite variants hold shared, identity-bearing handles so that
//! self-referential graphs are constructible and detectable by pointer
//! identity, and so that derived views of one logical value stay in sync.

use std::any::TypeId;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::EqualityMethod;

// ============================================================================
// TYPE TAGS
// ============================================================================

/// Names the concrete Rust type a [`Value`] was converted from.
///
/// Tags drive exact-type lookups in the mapper registry: a formatter
/// registered for `Vec<Vec<i64>>` beats the generic list formatter for
/// values carrying that tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    /// Returns the tag for a concrete type.
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The `TypeId` of the tagged type.
    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The fully qualified name of the tagged type.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

// ============================================================================
// VALUE KINDS
// ============================================================================

/// The runtime kind of a [`Value`], used as a registry dispatch key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    UInt,
    Float,
    Str,
    Path,
    List,
    Set,
    Map,
    Error,
    Opaque,
}

impl ValueKind {
    /// A human-readable description with its article, for type-mismatch
    /// messages ("must be a boolean").
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "a boolean",
            ValueKind::Int => "an integer",
            ValueKind::UInt => "an unsigned integer",
            ValueKind::Float => "a floating-point number",
            ValueKind::Str => "a string",
            ValueKind::Path => "a path",
            ValueKind::List => "a list",
            ValueKind::Set => "a set",
            ValueKind::Map => "a map",
            ValueKind::Error => "an error",
            ValueKind::Opaque => "an opaque value",
        }
    }
}

// ============================================================================
// COMPOSITE HANDLES
// ============================================================================

/// A shared, growable list of values.
///
/// Handles clone shallowly: clones refer to the same underlying storage,
/// which is what makes cycles (`list.push(list.clone())`) expressible.
#[derive(Clone, Default)]
pub struct ListHandle {
    tag: Option<TypeTag>,
    items: Arc<RwLock<Vec<Value>>>,
}

impl ListHandle {
    /// Creates an empty, untagged list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_items(tag: Option<TypeTag>, items: Vec<Value>) -> Self {
        Self {
            tag,
            items: Arc::new(RwLock::new(items)),
        }
    }

    /// Appends a value.
    pub fn push(&self, value: Value) {
        self.items.write().push(value);
    }

    /// Copies out the current elements.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Value> {
        self.items.read().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    #[must_use]
    pub fn tag(&self) -> Option<TypeTag> {
        self.tag
    }

    pub(crate) fn identity(&self) -> usize {
        Arc::as_ptr(&self.items) as *const () as usize
    }
}

impl fmt::Debug for ListHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Elements are deliberately omitted: a cyclic list would otherwise
        // recurse forever.
        f.debug_struct("ListHandle")
            .field("tag", &self.tag)
            .field("len", &self.len())
            .finish()
    }
}

/// A shared set of values.
///
/// `ordered` records whether the source container already guaranteed
/// iteration order (e.g. `BTreeSet`); unordered sets are sorted by natural
/// order at render time when their elements allow it.
#[derive(Clone)]
pub struct SetHandle {
    tag: Option<TypeTag>,
    ordered: bool,
    items: Arc<RwLock<Vec<Value>>>,
}

impl SetHandle {
    pub(crate) fn from_items(tag: Option<TypeTag>, ordered: bool, items: Vec<Value>) -> Self {
        Self {
            tag,
            ordered,
            items: Arc::new(RwLock::new(items)),
        }
    }

    /// Copies out the current elements in iteration order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Value> {
        self.items.read().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// `true` if the source container guaranteed iteration order.
    #[must_use]
    pub fn is_ordered(&self) -> bool {
        self.ordered
    }

    #[must_use]
    pub fn tag(&self) -> Option<TypeTag> {
        self.tag
    }

    pub(crate) fn identity(&self) -> usize {
        Arc::as_ptr(&self.items) as *const () as usize
    }
}

impl fmt::Debug for SetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetHandle")
            .field("tag", &self.tag)
            .field("ordered", &self.ordered)
            .field("len", &self.len())
            .finish()
    }
}

/// A shared map of key/value pairs, insertion order preserved.
#[derive(Clone)]
pub struct MapHandle {
    tag: Option<TypeTag>,
    ordered: bool,
    entries: Arc<RwLock<Vec<(Value, Value)>>>,
}

impl MapHandle {
    pub(crate) fn from_entries(
        tag: Option<TypeTag>,
        ordered: bool,
        entries: Vec<(Value, Value)>,
    ) -> Self {
        Self {
            tag,
            ordered,
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    /// Inserts an entry at the end.
    pub fn insert(&self, key: Value, value: Value) {
        self.entries.write().push((key, value));
    }

    /// Copies out the current entries in iteration order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(Value, Value)> {
        self.entries.read().clone()
    }

    /// Copies out the current keys in iteration order.
    #[must_use]
    pub fn keys(&self) -> Vec<Value> {
        self.entries.read().iter().map(|(k, _)| k.clone()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// `true` if the source container guaranteed iteration order.
    #[must_use]
    pub fn is_ordered(&self) -> bool {
        self.ordered
    }

    #[must_use]
    pub fn tag(&self) -> Option<TypeTag> {
        self.tag
    }

    pub(crate) fn identity(&self) -> usize {
        Arc::as_ptr(&self.entries) as *const () as usize
    }
}

impl fmt::Debug for MapHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapHandle")
            .field("tag", &self.tag)
            .field("ordered", &self.ordered)
            .field("len", &self.len())
            .finish()
    }
}

/// The captured message chain of an error value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorChain {
    messages: Vec<String>,
}

impl ErrorChain {
    /// Captures an error and its full `source()` chain.
    #[must_use]
    pub fn capture(error: &(dyn std::error::Error + 'static)) -> Self {
        let mut messages = vec![error.to_string()];
        let mut current = error.source();
        while let Some(cause) = current {
            messages.push(cause.to_string());
            current = cause.source();
        }
        Self { messages }
    }

    /// The error message followed by each cause, outermost first.
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

/// A value of a type the registry knows nothing about: the `Debug` text is
/// captured at conversion time, together with the concrete type's tag.
#[derive(Debug, Clone)]
pub struct OpaqueValue {
    tag: TypeTag,
    text: Arc<str>,
}

impl OpaqueValue {
    /// Captures a value's `Debug` representation.
    #[must_use]
    pub fn capture<T: fmt::Debug + 'static>(value: &T) -> Self {
        Self {
            tag: TypeTag::of::<T>(),
            text: format!("{value:?}").into(),
        }
    }

    #[must_use]
    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

// ============================================================================
// VALUE
// ============================================================================

/// A validated subject, normalized into the kinds the renderer understands.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Path(PathBuf),
    List(ListHandle),
    Set(SetHandle),
    Map(MapHandle),
    Error(ErrorChain),
    Opaque(OpaqueValue),
}

impl Value {
    /// The runtime kind of this value.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::UInt(_) => ValueKind::UInt,
            Value::Float(_) => ValueKind::Float,
            Value::Str(_) => ValueKind::Str,
            Value::Path(_) => ValueKind::Path,
            Value::List(_) => ValueKind::List,
            Value::Set(_) => ValueKind::Set,
            Value::Map(_) => ValueKind::Map,
            Value::Error(_) => ValueKind::Error,
            Value::Opaque(_) => ValueKind::Opaque,
        }
    }

    /// The concrete-type tag, if one was attached at conversion time.
    #[must_use]
    pub fn type_tag(&self) -> Option<TypeTag> {
        match self {
            Value::List(list) => list.tag(),
            Value::Set(set) => set.tag(),
            Value::Map(map) => map.tag(),
            Value::Opaque(opaque) => Some(opaque.tag()),
            _ => None,
        }
    }

    /// Identity of the underlying storage, for cycle detection. Only
    /// composites have one.
    #[must_use]
    pub(crate) fn identity(&self) -> Option<usize> {
        match self {
            Value::List(list) => Some(list.identity()),
            Value::Set(set) => Some(set.identity()),
            Value::Map(map) => Some(map.identity()),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Element or character count, for sized kinds.
    #[must_use]
    pub fn length(&self) -> Option<u64> {
        match self {
            Value::Str(s) => Some(s.chars().count() as u64),
            Value::List(list) => Some(list.len() as u64),
            Value::Set(set) => Some(set.len() as u64),
            Value::Map(map) => Some(map.len() as u64),
            _ => None,
        }
    }

    /// Creates an empty list value with its own identity.
    #[must_use]
    pub fn new_list() -> Self {
        Value::List(ListHandle::new())
    }

    /// Creates a list value from already-converted elements.
    #[must_use]
    pub fn list_of(items: Vec<Value>) -> Self {
        Value::List(ListHandle::from_items(None, items))
    }

    /// Creates an empty map value with its own identity.
    #[must_use]
    pub fn new_map() -> Self {
        Value::Map(MapHandle::from_entries(None, false, Vec::new()))
    }

    /// Captures an error and its cause chain as a value.
    #[must_use]
    pub fn from_error(error: &(dyn std::error::Error + 'static)) -> Self {
        Value::Error(ErrorChain::capture(error))
    }

    /// Natural ordering across mutually comparable kinds. Numbers compare
    /// numerically regardless of signedness or floatness; strings, booleans
    /// and paths compare within their own kind. Everything else: `None`.
    #[must_use]
    pub fn natural_cmp(&self, other: &Value) -> Option<Ordering> {
        use Value::{Bool, Float, Int, Path, Str, UInt};
        match (self, other) {
            (Int(a), Int(b)) => Some(a.cmp(b)),
            (UInt(a), UInt(b)) => Some(a.cmp(b)),
            (Int(a), UInt(b)) => Some(cmp_int_uint(*a, *b)),
            (UInt(a), Int(b)) => Some(cmp_int_uint(*b, *a).reverse()),
            (Float(a), Float(b)) => a.partial_cmp(b),
            (Int(a), Float(b)) => (*a as f64).partial_cmp(b),
            (Float(a), Int(b)) => a.partial_cmp(&(*b as f64)),
            (UInt(a), Float(b)) => (*a as f64).partial_cmp(b),
            (Float(a), UInt(b)) => a.partial_cmp(&(*b as f64)),
            (Str(a), Str(b)) => Some(a.cmp(b)),
            (Bool(a), Bool(b)) => Some(a.cmp(b)),
            (Path(a), Path(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Equality under the configured method.
    #[must_use]
    pub fn equals(&self, other: &Value, method: EqualityMethod) -> bool {
        match method {
            EqualityMethod::Exact => self.exact_eq(other),
            EqualityMethod::Comparable => match self.natural_cmp(other) {
                Some(ordering) => ordering == Ordering::Equal,
                None => self.exact_eq(other),
            },
        }
    }

    fn exact_eq(&self, other: &Value) -> bool {
        use Value::{Bool, Error, Float, Int, List, Map, Null, Opaque, Path, Set, Str, UInt};
        match (self, other) {
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (UInt(a), UInt(b)) => a == b,
            (Int(a), UInt(b)) => cmp_int_uint(*a, *b) == Ordering::Equal,
            (UInt(a), Int(b)) => cmp_int_uint(*b, *a) == Ordering::Equal,
            (Float(a), Float(b)) => a == b,
            (Str(a), Str(b)) => a == b,
            (Path(a), Path(b)) => a == b,
            (List(a), List(b)) => {
                let a = a.snapshot();
                let b = b.snapshot();
                a.len() == b.len() && a.iter().zip(&b).all(|(x, y)| x.exact_eq(y))
            }
            (Set(a), Set(b)) => unordered_eq(&a.snapshot(), &b.snapshot()),
            (Map(a), Map(b)) => {
                let a = a.snapshot();
                let b = b.snapshot();
                a.len() == b.len()
                    && a.iter().all(|(key, value)| {
                        b.iter()
                            .any(|(k, v)| k.exact_eq(key) && v.exact_eq(value))
                    })
            }
            (Error(a), Error(b)) => a == b,
            (Opaque(a), Opaque(b)) => a.tag() == b.tag() && a.text() == b.text(),
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.exact_eq(other)
    }
}

fn cmp_int_uint(a: i64, b: u64) -> Ordering {
    if a < 0 {
        Ordering::Less
    } else {
        (a as u64).cmp(&b)
    }
}

/// Multiset equality by exact element matching, ignoring order.
fn unordered_eq(a: &[Value], b: &[Value]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut used = vec![false; b.len()];
    for item in a {
        let Some(position) = b
            .iter()
            .enumerate()
            .position(|(i, candidate)| !used[i] && candidate.exact_eq(item))
        else {
            return false;
        };
        used[position] = true;
    }
    true
}

// ============================================================================
// CONVERSIONS
// ============================================================================

/// Conversion of a Rust value into the subject representation.
///
/// Composite implementations attach the concrete source type's [`TypeTag`]
/// so exact-type formatter registrations can find them later.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for &Value {
    fn into_value(self) -> Value {
        self.clone()
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

macro_rules! into_value_int {
    ($($ty:ty),+) => {
        $(impl IntoValue for $ty {
            fn into_value(self) -> Value {
                Value::Int(i64::from(self))
            }
        })+
    };
}

into_value_int!(i8, i16, i32, i64);

impl IntoValue for isize {
    fn into_value(self) -> Value {
        Value::Int(self as i64)
    }
}

macro_rules! into_value_uint {
    ($($ty:ty),+) => {
        $(impl IntoValue for $ty {
            fn into_value(self) -> Value {
                Value::UInt(u64::from(self))
            }
        })+
    };
}

into_value_uint!(u8, u16, u32, u64);

impl IntoValue for usize {
    fn into_value(self) -> Value {
        Value::UInt(self as u64)
    }
}

impl IntoValue for f32 {
    fn into_value(self) -> Value {
        Value::Float(f64::from(self))
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::Str(self.to_owned())
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::Str(self)
    }
}

impl IntoValue for &Path {
    fn into_value(self) -> Value {
        Value::Path(self.to_path_buf())
    }
}

impl IntoValue for PathBuf {
    fn into_value(self) -> Value {
        Value::Path(self)
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(value) => value.into_value(),
            None => Value::Null,
        }
    }
}

impl<T: IntoValue + 'static> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        let items = self.into_iter().map(IntoValue::into_value).collect();
        Value::List(ListHandle::from_items(Some(TypeTag::of::<Vec<T>>()), items))
    }
}

impl<T: IntoValue + Clone> IntoValue for &[T] {
    fn into_value(self) -> Value {
        let items = self.iter().cloned().map(IntoValue::into_value).collect();
        Value::List(ListHandle::from_items(None, items))
    }
}

impl<T: IntoValue + 'static, const N: usize> IntoValue for [T; N] {
    fn into_value(self) -> Value {
        let items = self.into_iter().map(IntoValue::into_value).collect();
        Value::List(ListHandle::from_items(Some(TypeTag::of::<[T; N]>()), items))
    }
}

impl<T: IntoValue + 'static> IntoValue for HashSet<T> {
    fn into_value(self) -> Value {
        let items = self.into_iter().map(IntoValue::into_value).collect();
        Value::Set(SetHandle::from_items(
            Some(TypeTag::of::<HashSet<T>>()),
            false,
            items,
        ))
    }
}

impl<T: IntoValue + 'static> IntoValue for BTreeSet<T> {
    fn into_value(self) -> Value {
        let items = self.into_iter().map(IntoValue::into_value).collect();
        Value::Set(SetHandle::from_items(
            Some(TypeTag::of::<BTreeSet<T>>()),
            true,
            items,
        ))
    }
}

impl<K: IntoValue + 'static, V: IntoValue + 'static> IntoValue for HashMap<K, V> {
    fn into_value(self) -> Value {
        let entries = self
            .into_iter()
            .map(|(k, v)| (k.into_value(), v.into_value()))
            .collect();
        Value::Map(MapHandle::from_entries(
            Some(TypeTag::of::<HashMap<K, V>>()),
            false,
            entries,
        ))
    }
}

impl<K: IntoValue + 'static, V: IntoValue + 'static> IntoValue for BTreeMap<K, V> {
    fn into_value(self) -> Value {
        let entries = self
            .into_iter()
            .map(|(k, v)| (k.into_value(), v.into_value()))
            .collect();
        Value::Map(MapHandle::from_entries(
            Some(TypeTag::of::<BTreeMap<K, V>>()),
            true,
            entries,
        ))
    }
}

impl IntoValue for serde_json::Value {
    fn into_value(self) -> Value {
        match self {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::UInt(u)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => Value::list_of(
                items.into_iter().map(IntoValue::into_value).collect(),
            ),
            serde_json::Value::Object(entries) => {
                // serde_json's default map preserves insertion order only with
                // the `preserve_order` feature; the plain build sorts keys.
                let entries = entries
                    .into_iter()
                    .map(|(k, v)| (Value::Str(k), v.into_value()))
                    .collect();
                Value::Map(MapHandle::from_entries(None, true, entries))
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
