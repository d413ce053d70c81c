//! JSON scene documents
//!
//! A document is a list of entity entries built into a graph in order:
//!
//! ```json
//! {
//!   "entities": [
//!     { "type": "Color", "id": "white", "fields": { "r": 1, "g": 1, "b": 1 } },
//!     { "type": "LightSource",
//!       "fields": { "location": [0, 10, -5], "color": { "ref": "white" } },
//!       "transforms": [ { "op": "rotate", "degrees": [0, 45, 0] } ] }
//!   ]
//! }
//! ```
//!
//! Field values map as follows: numbers, booleans and strings become
//! literals (strings keep the `&` verbatim sentinel), arrays become lists,
//! `{ "ref": "<id>" }` points at an entity declared earlier, and an object
//! carrying a `"type"` key is built as a nested entity.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use super::errors::{SceneError, SceneResult};
use super::graph::SceneGraph;
use super::transform::Transform;
use crate::observability::{log_event_with_fields, Event};
use crate::value::{EntityId, FieldValue, Value};

/// A whole scene document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneDocument {
    #[serde(default)]
    pub entities: Vec<EntityDoc>,
}

/// One entity entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityDoc {
    #[serde(rename = "type")]
    pub type_name: String,
    /// Optional string identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub fields: Map<String, Json>,
    /// Operations composed into the original transform
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub base_transform: Vec<TransformOp>,
    /// Operations applied after construction, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transforms: Vec<TransformOp>,
}

/// A single transform operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TransformOp {
    Translate { by: [f64; 3] },
    Scale { by: [f64; 3] },
    Rotate { degrees: [f64; 3] },
    Matrix { values: [f64; 12] },
}

impl TransformOp {
    pub fn to_transform(&self) -> Transform {
        match self {
            TransformOp::Translate { by } => Transform::translate(*by),
            TransformOp::Scale { by } => Transform::scale(*by),
            TransformOp::Rotate { degrees } => Transform::rotate(*degrees),
            TransformOp::Matrix { values } => Transform::from_rows(*values),
        }
    }
}

fn compose(ops: &[TransformOp]) -> Transform {
    ops.iter()
        .fold(Transform::identity(), |acc, op| acc.then(&op.to_transform()))
}

impl SceneDocument {
    pub fn from_json(json: &str) -> SceneResult<Self> {
        serde_json::from_str(json).map_err(|e| SceneError::Document(e.to_string()))
    }

    pub fn from_file(path: &Path) -> SceneResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SceneError::Document(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    /// Builds every entry into `graph`, returning the top-level entities in
    /// document order. Stops at the first failing entry; entities built
    /// before it stay in the graph.
    pub fn build(&self, graph: &mut SceneGraph) -> SceneResult<Vec<EntityId>> {
        let before = graph.len();
        let mut built = Vec::with_capacity(self.entities.len());
        for entry in &self.entities {
            built.push(build_entry(graph, entry)?);
        }

        log_event_with_fields(
            Event::SceneLoaded,
            &[
                ("entries", &built.len().to_string()),
                ("entities", &(graph.len() - before).to_string()),
            ],
        );
        Ok(built)
    }
}

/// Builds one entry and its nested entities. On failure every entity
/// created for the entry is destroyed again.
fn build_entry(graph: &mut SceneGraph, entry: &EntityDoc) -> SceneResult<EntityId> {
    let mut created = Vec::new();
    let result = build_into(graph, entry, &mut created);
    if result.is_err() {
        for id in created.into_iter().rev() {
            let _ = graph.destroy(id);
        }
    }
    result
}

fn build_into(
    graph: &mut SceneGraph,
    entry: &EntityDoc,
    created: &mut Vec<EntityId>,
) -> SceneResult<EntityId> {
    let mut initial = Vec::with_capacity(entry.fields.len());
    for (name, json) in &entry.fields {
        let value = to_value(graph, json, created)?;
        initial.push((name.as_str(), FieldValue::from(value)));
    }

    let id = match &entry.id {
        Some(name) => graph.create_named(&entry.type_name, name, initial)?,
        None => graph.create(&entry.type_name, initial)?,
    };
    created.push(id);

    if !entry.base_transform.is_empty() {
        graph.set_base_transform(id, compose(&entry.base_transform))?;
    }
    for op in &entry.transforms {
        graph.apply_transform(id, op.to_transform())?;
    }
    Ok(id)
}

fn to_value(graph: &mut SceneGraph, json: &Json, created: &mut Vec<EntityId>) -> SceneResult<Value> {
    match json {
        Json::Null => Err(SceneError::Document("null is not a field value".into())),
        Json::Bool(b) => Ok(Value::Bool(*b)),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Ok(Value::Int(i)),
            None => n
                .as_f64()
                .map(Value::Float)
                .ok_or_else(|| SceneError::Document(format!("number {} out of range", n))),
        },
        Json::String(s) => Ok(Value::Str(s.clone())),
        Json::Array(items) => items
            .iter()
            .map(|item| to_value(graph, item, created))
            .collect::<SceneResult<Vec<_>>>()
            .map(Value::List),
        Json::Object(map) => {
            if let Some(target) = map.get("ref") {
                let name = target
                    .as_str()
                    .ok_or_else(|| SceneError::Document("\"ref\" must be a string".into()))?;
                return graph
                    .lookup(name)
                    .map(Value::Entity)
                    .ok_or_else(|| SceneError::Document(format!("unresolved reference '{}'", name)));
            }
            if map.contains_key("type") {
                let nested: EntityDoc = serde_json::from_value(json.clone())
                    .map_err(|e| SceneError::Document(e.to_string()))?;
                return build_into(graph, &nested, created).map(Value::Entity);
            }
            Err(SceneError::Document(
                "objects must be a {\"ref\": ...} or carry a \"type\"".into(),
            ))
        }
    }
}
