//! Scene graph arena
//!
//! `SceneGraph` owns every entity of one scene together with the two
//! identifier registries: serial → entity and string id → serial. Several
//! graphs may coexist in a process; serials stay unique across all of them.
//!
//! Usage constraint: the graph is single-threaded and not re-entrant.
//! Deferred producers run while the graph is borrowed (on `get`, `set` and
//! during emission) and must not construct, mutate or destroy entities of
//! the same graph.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::entity::Entity;
use super::errors::{SceneError, SceneResult, ValidationError};
use super::transform::Transform;
use crate::observability::{log_event_with_fields, Event};
use crate::schema::{ClassDef, FieldDef, Schema, TypeLookup};
use crate::value::{EntityId, FieldValue, Value};

static NEXT_SERIAL: AtomicU64 = AtomicU64::new(1);

fn next_serial() -> EntityId {
    EntityId(NEXT_SERIAL.fetch_add(1, Ordering::Relaxed))
}

/// Arena of entities plus identifier registries.
pub struct SceneGraph {
    schema: Arc<Schema>,
    entities: BTreeMap<EntityId, Entity>,
    names: HashMap<String, EntityId>,
}

impl SceneGraph {
    /// Creates an empty graph over a compiled schema.
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            entities: BTreeMap::new(),
            names: HashMap::new(),
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Creates an entity without a string identifier.
    pub fn create<'f>(
        &mut self,
        type_name: &str,
        initial: impl IntoIterator<Item = (&'f str, FieldValue)>,
    ) -> SceneResult<EntityId> {
        self.construct(type_name, None, initial)
    }

    /// Creates an entity registered under a unique string identifier.
    pub fn create_named<'f>(
        &mut self,
        type_name: &str,
        name: &str,
        initial: impl IntoIterator<Item = (&'f str, FieldValue)>,
    ) -> SceneResult<EntityId> {
        self.construct(type_name, Some(name.to_string()), initial)
    }

    fn construct<'f>(
        &mut self,
        type_name: &str,
        name: Option<String>,
        initial: impl IntoIterator<Item = (&'f str, FieldValue)>,
    ) -> SceneResult<EntityId> {
        let result = self.build_entity(type_name, name, initial);
        match result {
            Ok(entity) => {
                let serial = entity.serial();
                log_event_with_fields(
                    Event::EntityCreated,
                    &[("type", type_name), ("serial", &serial.to_string())],
                );
                if let Some(name) = entity.name() {
                    self.names.insert(name.to_string(), serial);
                }
                self.entities.insert(serial, entity);
                Ok(serial)
            }
            Err(e) => {
                log_event_with_fields(
                    Event::ConstructionRejected,
                    &[("type", type_name), ("error", &e.to_string())],
                );
                Err(e)
            }
        }
    }

    fn build_entity<'f>(
        &self,
        type_name: &str,
        name: Option<String>,
        initial: impl IntoIterator<Item = (&'f str, FieldValue)>,
    ) -> SceneResult<Entity> {
        let class = Arc::clone(self.schema.class(type_name)?);
        if class.flags().abstract_type {
            return Err(SceneError::AbstractType(type_name.to_string()));
        }
        if let Some(name) = &name {
            if self.names.contains_key(name) {
                return Err(SceneError::NameCollision(name.clone()));
            }
        }

        let mut entity = Entity::new(next_serial(), name, Arc::clone(&class), HashMap::new());

        for (field, value) in initial {
            let def = field_def(&class, field)?;
            self.validate(&entity, def, &value)?;
            entity.store(field, value);
        }

        for def in class.fields().iter().filter(|f| f.required) {
            if entity.is_set(&def.name) {
                continue;
            }
            match &def.default {
                Some(default) => entity.store(&def.name, FieldValue::Literal(default.clone())),
                None => {
                    return Err(SceneError::MissingRequired {
                        owner: entity.label(),
                        field: def.name.clone(),
                    })
                }
            }
        }

        Ok(entity)
    }

    /// Checks a candidate against its field predicate. Verbatim text is
    /// never checked; producers are invoked and their result checked.
    fn validate(&self, owner: &Entity, def: &FieldDef, value: &FieldValue) -> Result<(), ValidationError> {
        let candidate = match value {
            FieldValue::Verbatim(_) => return Ok(()),
            FieldValue::Literal(v) => v.clone(),
            FieldValue::Deferred(producer) => producer(),
        };

        if def.predicate.check(&candidate, self) {
            Ok(())
        } else {
            Err(ValidationError {
                field: def.name.clone(),
                value: candidate.to_string(),
                owner: owner.label(),
                message: def.message(),
            })
        }
    }

    /// Sets a field. On rejection the prior value is kept.
    pub fn set(&mut self, id: EntityId, field: &str, value: impl Into<FieldValue>) -> SceneResult<()> {
        let value = value.into();
        let entity = self.entity(id)?;
        let class = Arc::clone(entity.class());
        let def = field_def(&class, field)?;

        if !def.mutable {
            return Err(SceneError::ReadOnly {
                owner: entity.label(),
                field: field.to_string(),
            });
        }

        if let Err(e) = self.validate(entity, def, &value) {
            log_event_with_fields(
                Event::ValidationRejected,
                &[
                    ("field", field),
                    ("owner", &e.owner.to_string()),
                    ("value", &e.value),
                ],
            );
            return Err(e.into());
        }

        self.entity_mut(id)?.store(field, value);
        Ok(())
    }

    /// Clears an optional field, returning the previous value.
    pub fn unset(&mut self, id: EntityId, field: &str) -> SceneResult<Option<FieldValue>> {
        let entity = self.entity(id)?;
        let class = Arc::clone(entity.class());
        let def = field_def(&class, field)?;

        if def.required {
            return Err(SceneError::ClearRequired {
                owner: entity.label(),
                field: field.to_string(),
            });
        }
        if !def.mutable {
            return Err(SceneError::ReadOnly {
                owner: entity.label(),
                field: field.to_string(),
            });
        }

        Ok(self.entity_mut(id)?.clear(field))
    }

    /// Reads a field: producers are invoked, verbatim text is returned as a
    /// string without its sentinel, unset fields fall back to their default.
    pub fn get(&self, id: EntityId, field: &str) -> SceneResult<Option<Value>> {
        let entity = self.entity(id)?;
        let def = field_def(entity.class(), field)?;
        Ok(match entity.value(field) {
            Some(value) => Some(value.resolve()),
            None => def.default.clone(),
        })
    }

    /// Stored value without resolution.
    pub fn raw(&self, id: EntityId, field: &str) -> SceneResult<Option<&FieldValue>> {
        let entity = self.entity(id)?;
        field_def(entity.class(), field)?;
        Ok(entity.value(field))
    }

    /// Removes an entity and releases both of its identifiers.
    pub fn destroy(&mut self, id: EntityId) -> SceneResult<Entity> {
        let entity = self.entities.remove(&id).ok_or(SceneError::UnknownEntity(id))?;
        if let Some(name) = entity.name() {
            self.names.remove(name);
        }
        log_event_with_fields(
            Event::EntityDestroyed,
            &[("type", entity.type_name()), ("serial", &id.to_string())],
        );
        Ok(entity)
    }

    pub fn entity(&self, id: EntityId) -> SceneResult<&Entity> {
        self.entities.get(&id).ok_or(SceneError::UnknownEntity(id))
    }

    fn entity_mut(&mut self, id: EntityId) -> SceneResult<&mut Entity> {
        self.entities.get_mut(&id).ok_or(SceneError::UnknownEntity(id))
    }

    /// Finds an entity by its string identifier.
    pub fn lookup(&self, name: &str) -> Option<EntityId> {
        self.names.get(name).copied()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// All entities in creation order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entities no other entity references, in creation order.
    pub fn roots(&self) -> Vec<EntityId> {
        let referenced: HashSet<EntityId> = self
            .entities
            .values()
            .flat_map(Entity::references)
            .collect();
        self.entities
            .keys()
            .filter(|id| !referenced.contains(id))
            .copied()
            .collect()
    }

    /// Entities no root reaches through references. Each lies on a
    /// reference cycle or below one.
    pub fn unreachable(&self) -> Vec<EntityId> {
        let mut seen = HashSet::new();
        let mut pending = self.roots();
        while let Some(id) = pending.pop() {
            if seen.insert(id) {
                if let Some(entity) = self.entities.get(&id) {
                    pending.extend(entity.references());
                }
            }
        }
        self.entities
            .keys()
            .filter(|id| !seen.contains(id))
            .copied()
            .collect()
    }

    /// Whether following references from `id` leads back to it.
    pub fn is_cyclic(&self, id: EntityId) -> bool {
        let mut seen = HashSet::new();
        let mut pending = self
            .entities
            .get(&id)
            .map(Entity::references)
            .unwrap_or_default();
        while let Some(next) = pending.pop() {
            if next == id {
                return true;
            }
            if seen.insert(next) {
                if let Some(entity) = self.entities.get(&next) {
                    pending.extend(entity.references());
                }
            }
        }
        false
    }

    // =========================================================================
    // Transforms
    // =========================================================================

    /// Sets the original transform; the cumulative transform restarts from it.
    pub fn set_base_transform(&mut self, id: EntityId, base: Transform) -> SceneResult<()> {
        let entity = self.transformable_mut(id)?;
        *entity.transform_state_mut() = super::transform::TransformState::new(base);
        Ok(())
    }

    /// Composes `t` after everything applied so far. Satellites are placed
    /// under their parent at emission and keep only their own transform here.
    pub fn apply_transform(&mut self, id: EntityId, t: Transform) -> SceneResult<()> {
        self.transformable_mut(id)?.transform_state_mut().apply(&t);
        Ok(())
    }

    /// Restores the cumulative transform to the base transform.
    pub fn reset_transform(&mut self, id: EntityId) -> SceneResult<()> {
        self.transformable_mut(id)?.transform_state_mut().reset();
        Ok(())
    }

    /// Cumulative transform; identity when never touched.
    pub fn transform(&self, id: EntityId) -> SceneResult<Transform> {
        let entity = self.transformable(id)?;
        Ok(entity.transform_state().map(|s| s.current()).unwrap_or_default())
    }

    /// Original transform; identity when never set.
    pub fn base_transform(&self, id: EntityId) -> SceneResult<Transform> {
        let entity = self.transformable(id)?;
        Ok(entity.transform_state().map(|s| s.base()).unwrap_or_default())
    }

    fn transformable(&self, id: EntityId) -> SceneResult<&Entity> {
        let entity = self.entity(id)?;
        if entity.class().flags().transformable {
            Ok(entity)
        } else {
            Err(SceneError::NotTransformable(entity.label()))
        }
    }

    fn transformable_mut(&mut self, id: EntityId) -> SceneResult<&mut Entity> {
        self.transformable(id)?;
        self.entity_mut(id)
    }
}

impl TypeLookup for SceneGraph {
    fn class_of(&self, id: EntityId) -> Option<&str> {
        self.entities.get(&id).map(Entity::type_name)
    }

    fn is_subclass(&self, class: &str, ancestor: &str) -> bool {
        self.schema.is_subclass(class, ancestor)
    }
}

fn field_def<'c>(class: &'c ClassDef, field: &str) -> SceneResult<&'c FieldDef> {
    class.field(field).ok_or_else(|| SceneError::UnknownField {
        type_name: class.name().to_string(),
        field: field.to_string(),
    })
}
