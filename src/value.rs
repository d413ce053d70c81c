//! Field values held by scene entities
//!
//! A stored field is one of three shapes:
//! - `Literal`: a plain value, validated on write
//! - `Deferred`: a zero-argument producer evaluated on read and at emission
//! - `Verbatim`: raw SDL text, never validated, emitted as-is

use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// Prefix that marks a string as raw SDL text.
pub const VERBATIM_SENTINEL: char = '&';

/// Process-unique entity serial number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A concrete field value.
///
/// Vectors are lists of numbers. Colors and nested objects are references
/// to other entities in the same scene graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point
    Float(f64),
    /// UTF-8 string
    Str(String),
    /// Ordered list (vectors, point lists, child lists)
    List(Vec<Value>),
    /// Reference to another entity (not expressible in definition files)
    #[serde(skip)]
    Entity(EntityId),
}

impl Value {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Entity(_) => "entity",
        }
    }

    /// Numeric view; integers widen to floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<EntityId> {
        match self {
            Value::Entity(id) => Some(*id),
            _ => None,
        }
    }

    /// Returns true for finite integers and floats.
    pub fn is_finite_number(&self) -> bool {
        self.as_f64().is_some_and(f64::is_finite)
    }

    /// Collects every entity referenced by this value, depth first.
    pub fn entity_refs(&self, out: &mut Vec<EntityId>) {
        match self {
            Value::Entity(id) => out.push(*id),
            Value::List(items) => {
                for item in items {
                    item.entity_refs(out);
                }
            }
            _ => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Entity(id) => write!(f, "entity {}", id),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<EntityId> for Value {
    fn from(id: EntityId) -> Self {
        Value::Entity(id)
    }
}

impl<const N: usize> From<[f64; N]> for Value {
    fn from(components: [f64; N]) -> Self {
        Value::List(components.into_iter().map(Value::Float).collect())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Vec<EntityId>> for Value {
    fn from(ids: Vec<EntityId>) -> Self {
        Value::List(ids.into_iter().map(Value::Entity).collect())
    }
}

/// Zero-argument producer evaluated each time the field is read.
pub type Producer = Rc<dyn Fn() -> Value>;

/// A stored field.
#[derive(Clone)]
pub enum FieldValue {
    /// Plain value
    Literal(Value),
    /// Computed on read; must satisfy the field predicate when invoked
    Deferred(Producer),
    /// Raw SDL text, sentinel already stripped
    Verbatim(String),
}

impl FieldValue {
    /// Wraps a producer closure.
    pub fn deferred(producer: impl Fn() -> Value + 'static) -> Self {
        FieldValue::Deferred(Rc::new(producer))
    }

    /// Raw SDL text emitted without validation.
    pub fn verbatim(raw: impl Into<String>) -> Self {
        FieldValue::Verbatim(raw.into())
    }

    /// Resolves to a concrete value: invokes producers, exposes verbatim
    /// text as a plain string.
    pub fn resolve(&self) -> Value {
        match self {
            FieldValue::Literal(v) => v.clone(),
            FieldValue::Deferred(producer) => producer(),
            FieldValue::Verbatim(raw) => Value::Str(raw.clone()),
        }
    }

    pub fn is_verbatim(&self) -> bool {
        matches!(self, FieldValue::Verbatim(_))
    }

    /// Entity references held by a literal. Producers are not invoked.
    pub fn literal_refs(&self) -> Vec<EntityId> {
        let mut out = Vec::new();
        if let FieldValue::Literal(v) = self {
            v.entity_refs(&mut out);
        }
        out
    }
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            FieldValue::Deferred(_) => f.write_str("Deferred(<producer>)"),
            FieldValue::Verbatim(raw) => f.debug_tuple("Verbatim").field(raw).finish(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Literal(v) => write!(f, "{}", v),
            FieldValue::Deferred(_) => write!(f, "<producer>"),
            FieldValue::Verbatim(raw) => write!(f, "{}{}", VERBATIM_SENTINEL, raw),
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Str(s) if s.starts_with(VERBATIM_SENTINEL) => {
                FieldValue::Verbatim(s[VERBATIM_SENTINEL.len_utf8()..].to_string())
            }
            other => FieldValue::Literal(other),
        }
    }
}

macro_rules! field_value_via_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for FieldValue {
                fn from(v: $t) -> Self {
                    FieldValue::from(Value::from(v))
                }
            }
        )*
    };
}

field_value_via_value!(bool, i64, i32, f64, &str, String, EntityId, Vec<Value>, Vec<EntityId>);

impl<const N: usize> From<[f64; N]> for FieldValue {
    fn from(components: [f64; N]) -> Self {
        FieldValue::Literal(Value::from(components))
    }
}
