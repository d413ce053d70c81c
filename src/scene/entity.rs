//! Entity instances

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::transform::TransformState;
use crate::schema::ClassDef;
use crate::value::{EntityId, FieldValue};

/// Identifies an entity in error messages: type, serial, and string id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityLabel {
    pub type_name: String,
    pub serial: EntityId,
    pub name: Option<String>,
}

impl fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.type_name, self.serial)?;
        if let Some(name) = &self.name {
            write!(f, " ({:?})", name)?;
        }
        Ok(())
    }
}

/// A mutable record created from a class.
///
/// Fields start unset; values are stored only after passing validation.
#[derive(Debug, Clone)]
pub struct Entity {
    serial: EntityId,
    name: Option<String>,
    class: Arc<ClassDef>,
    values: HashMap<String, FieldValue>,
    transform: Option<TransformState>,
}

impl Entity {
    pub(crate) fn new(
        serial: EntityId,
        name: Option<String>,
        class: Arc<ClassDef>,
        values: HashMap<String, FieldValue>,
    ) -> Self {
        Self {
            serial,
            name,
            class,
            values,
            transform: None,
        }
    }

    pub fn serial(&self) -> EntityId {
        self.serial
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn class(&self) -> &Arc<ClassDef> {
        &self.class
    }

    pub fn type_name(&self) -> &str {
        self.class.name()
    }

    pub fn label(&self) -> EntityLabel {
        EntityLabel {
            type_name: self.class.name().to_string(),
            serial: self.serial,
            name: self.name.clone(),
        }
    }

    /// Stored value, without resolving producers.
    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    pub fn is_set(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    /// Transform state, present once a transform was first set or applied.
    pub fn transform_state(&self) -> Option<&TransformState> {
        self.transform.as_ref()
    }

    /// Entities referenced by literal field values, in field order.
    pub fn references(&self) -> Vec<EntityId> {
        self.class
            .fields()
            .iter()
            .filter_map(|f| self.values.get(&f.name))
            .flat_map(FieldValue::literal_refs)
            .collect()
    }

    pub(crate) fn store(&mut self, field: &str, value: FieldValue) {
        self.values.insert(field.to_string(), value);
    }

    pub(crate) fn clear(&mut self, field: &str) -> Option<FieldValue> {
        self.values.remove(field)
    }

    pub(crate) fn transform_state_mut(&mut self) -> &mut TransformState {
        self.transform.get_or_insert_with(TransformState::default)
    }
}
