//! Definition-driven schema subsystem
//!
//! Entity types are declared as data (`TypeDef`/`FieldDef`), validated by
//! `Predicate`s, and compiled once into resolved `ClassDef`s.
//!
//! # Design Principles
//!
//! - Definitions are static; the compiled `Schema` is immutable
//! - Every schema fault is reported at compile time, never per instance
//! - Single inheritance; no field may be declared twice in a chain
//! - Predicates are pure and never panic

pub mod builtin;
mod compiler;
mod errors;
mod loader;
mod predicate;
mod types;

pub use compiler::{ClassDef, Schema, SchemaCompiler};
pub use errors::{SchemaError, SchemaErrorCode, SchemaResult, Severity};
pub use loader::SchemaLoader;
pub use predicate::{NoEntities, Predicate, TypeLookup};
pub use types::{FieldDef, TypeDef, TypeFlags};
