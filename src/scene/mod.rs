//! Scene graph subsystem
//!
//! A `SceneGraph` owns entity instances created from a compiled `Schema`,
//! keeps the serial and string identifier registries, validates every field
//! write, and tracks per-entity transforms.
//!
//! # Invariants
//!
//! - A rejected write leaves the prior value in place
//! - Serials are never reused within a process
//! - String identifiers are unique within one graph until released by
//!   `destroy`

mod document;
mod entity;
mod errors;
mod graph;
mod transform;

pub use document::{EntityDoc, SceneDocument, TransformOp};
pub use entity::{Entity, EntityLabel};
pub use errors::{SceneError, SceneResult, ValidationError};
pub use graph::SceneGraph;
pub use transform::{Transform, TransformState};
