//! Validation predicates
//!
//! Every field declares one predicate. Predicates are pure: they never panic
//! and never mutate, and they are evaluated through `Predicate::check`.
//!
//! Class-instance predicates need to know the class of a referenced entity,
//! which is supplied through the `TypeLookup` seam.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::value::{EntityId, Value};

/// Resolves entity classes for instance predicates.
pub trait TypeLookup {
    /// Returns the class name of a live entity.
    fn class_of(&self, id: EntityId) -> Option<&str>;

    /// Returns true when `class` is `ancestor` or descends from it.
    fn is_subclass(&self, class: &str, ancestor: &str) -> bool;
}

/// Lookup with no entities, used when checking schema defaults.
pub struct NoEntities;

impl TypeLookup for NoEntities {
    fn class_of(&self, _id: EntityId) -> Option<&str> {
        None
    }

    fn is_subclass(&self, class: &str, ancestor: &str) -> bool {
        class == ancestor
    }
}

/// Predicate kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    /// Accepts anything
    Any,
    /// Finite number (integers accepted)
    Float,
    /// Integer only
    Int,
    /// Boolean
    Bool,
    /// String with at least one character
    NonEmptyString,
    /// String of exactly `len` characters
    StringLength { len: usize },
    /// Number in `[min, max]`
    FloatRange { min: f64, max: f64 },
    /// Integer in `[min, max]`
    IntRange { min: i64, max: i64 },
    /// One of a fixed set of literal strings
    OneOf { values: Vec<String> },
    /// A key of a fixed mapping
    KeyOf { mapping: BTreeMap<String, String> },
    /// Numeric tuple with exactly `dim` components
    Vector { dim: usize },
    /// List whose length is in `[min, max]` (`max = None` is unbounded) and
    /// whose elements all satisfy `element`
    ArrayOf {
        element: Box<Predicate>,
        #[serde(default)]
        min: usize,
        #[serde(default)]
        max: Option<usize>,
    },
    /// Entity of `class` or any descendant
    InstanceOf { class: String },
    /// Entity of any listed class or their descendants
    InstanceOfAny { classes: Vec<String> },
}

impl Predicate {
    pub fn float_range(min: f64, max: f64) -> Self {
        Predicate::FloatRange { min, max }
    }

    pub fn int_range(min: i64, max: i64) -> Self {
        Predicate::IntRange { min, max }
    }

    pub fn one_of(values: &[&str]) -> Self {
        Predicate::OneOf {
            values: values.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn vector(dim: usize) -> Self {
        Predicate::Vector { dim }
    }

    pub fn array_of(element: Predicate, min: usize, max: Option<usize>) -> Self {
        Predicate::ArrayOf {
            element: Box::new(element),
            min,
            max,
        }
    }

    pub fn instance_of(class: &str) -> Self {
        Predicate::InstanceOf {
            class: class.to_string(),
        }
    }

    pub fn instance_of_any(classes: &[&str]) -> Self {
        Predicate::InstanceOfAny {
            classes: classes.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Evaluates the predicate against a candidate value.
    pub fn check(&self, value: &Value, types: &dyn TypeLookup) -> bool {
        match self {
            Predicate::Any => true,
            Predicate::Float => value.is_finite_number(),
            Predicate::Int => matches!(value, Value::Int(_)),
            Predicate::Bool => matches!(value, Value::Bool(_)),
            Predicate::NonEmptyString => value.as_str().is_some_and(|s| !s.is_empty()),
            Predicate::StringLength { len } => {
                value.as_str().is_some_and(|s| s.chars().count() == *len)
            }
            Predicate::FloatRange { min, max } => value
                .as_f64()
                .is_some_and(|x| x.is_finite() && x >= *min && x <= *max),
            Predicate::IntRange { min, max } => {
                value.as_i64().is_some_and(|i| i >= *min && i <= *max)
            }
            Predicate::OneOf { values } => value
                .as_str()
                .is_some_and(|s| values.iter().any(|v| v == s)),
            Predicate::KeyOf { mapping } => value.as_str().is_some_and(|s| mapping.contains_key(s)),
            Predicate::Vector { dim } => value
                .as_list()
                .is_some_and(|items| items.len() == *dim && items.iter().all(Value::is_finite_number)),
            Predicate::ArrayOf { element, min, max } => match value.as_list() {
                Some(items) => {
                    items.len() >= *min
                        && max.map_or(true, |m| items.len() <= m)
                        && items.iter().all(|item| element.check(item, types))
                }
                None => false,
            },
            Predicate::InstanceOf { class } => instance_matches(value, types, |c| {
                types.is_subclass(c, class)
            }),
            Predicate::InstanceOfAny { classes } => instance_matches(value, types, |c| {
                classes.iter().any(|ancestor| types.is_subclass(c, ancestor))
            }),
        }
    }

    /// Human-readable expectation used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Predicate::Any => "any value".into(),
            Predicate::Float => "a float".into(),
            Predicate::Int => "an integer".into(),
            Predicate::Bool => "a boolean".into(),
            Predicate::NonEmptyString => "a non-empty string".into(),
            Predicate::StringLength { len } => format!("a string of exactly {} characters", len),
            Predicate::FloatRange { min, max } => format!("a float in [{}, {}]", min, max),
            Predicate::IntRange { min, max } => format!("an integer in [{}, {}]", min, max),
            Predicate::OneOf { values } => format!("one of: {}", values.join(", ")),
            Predicate::KeyOf { mapping } => {
                let keys: Vec<&str> = mapping.keys().map(String::as_str).collect();
                format!("one of: {}", keys.join(", "))
            }
            Predicate::Vector { dim } => format!("a {}-component vector", dim),
            Predicate::ArrayOf { element, min, max } => match max {
                Some(max) => format!("an array of {} to {} of {}", min, max, element.describe()),
                None => format!("an array of at least {} of {}", min, element.describe()),
            },
            Predicate::InstanceOf { class } => format!("an instance of {}", class),
            Predicate::InstanceOfAny { classes } => {
                format!("an instance of one of: {}", classes.join(", "))
            }
        }
    }

    /// Class names this predicate refers to, used to verify a schema is
    /// closed over its references.
    pub fn referenced_classes(&self) -> Vec<&str> {
        match self {
            Predicate::InstanceOf { class } => vec![class.as_str()],
            Predicate::InstanceOfAny { classes } => classes.iter().map(String::as_str).collect(),
            Predicate::ArrayOf { element, .. } => element.referenced_classes(),
            _ => Vec::new(),
        }
    }
}

fn instance_matches(value: &Value, types: &dyn TypeLookup, accept: impl Fn(&str) -> bool) -> bool {
    value
        .as_entity()
        .and_then(|id| types.class_of(id))
        .is_some_and(accept)
}
