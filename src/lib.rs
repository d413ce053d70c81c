//! povscene - a definition-driven POV-Ray scene description builder
//!
//! Entity types are declared as data in `schema`, instantiated and
//! validated in a `scene::SceneGraph`, and serialized to SDL text by
//! `emit::Emitter`.

pub mod cli;
pub mod config;
pub mod emit;
pub mod observability;
pub mod scene;
pub mod schema;
pub mod value;
