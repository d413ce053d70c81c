//! Schema loader
//!
//! Collects definition tables from the embedded builtin table and from JSON
//! definition files, then compiles them once into a `Schema`.
//!
//! Definition files hold a JSON array of `TypeDef` objects. A malformed or
//! unreadable file is FATAL.

use std::fs;
use std::path::Path;

use super::builtin;
use super::compiler::{Schema, SchemaCompiler};
use super::errors::{SchemaError, SchemaResult};
use super::types::TypeDef;
use crate::observability::{log_event_with_fields, Event};

/// Accumulates definitions ahead of compilation.
#[derive(Debug, Default)]
pub struct SchemaLoader {
    definitions: Vec<TypeDef>,
    sources: Vec<String>,
}

impl SchemaLoader {
    /// Creates an empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a loader seeded with the builtin POV-Ray table.
    pub fn with_builtin() -> Self {
        let mut loader = Self::new();
        loader.definitions.extend(builtin::definitions());
        loader.sources.push("<builtin>".to_string());
        loader
    }

    /// Registers a single definition.
    pub fn register(&mut self, def: TypeDef) {
        self.definitions.push(def);
    }

    /// Loads definitions from a JSON string.
    pub fn load_str(&mut self, source: &str, json: &str) -> SchemaResult<()> {
        let defs: Vec<TypeDef> = serde_json::from_str(json)
            .map_err(|e| SchemaError::malformed(source, format!("Invalid JSON: {}", e)))?;
        self.definitions.extend(defs);
        self.sources.push(source.to_string());
        Ok(())
    }

    /// Loads a single definition file.
    pub fn load_file(&mut self, path: &Path) -> SchemaResult<()> {
        let content = fs::read_to_string(path).map_err(|e| {
            SchemaError::malformed(path.display().to_string(), format!("Failed to read file: {}", e))
        })?;
        self.load_str(&path.display().to_string(), &content)
    }

    /// Loads every `.json` file in a directory, in file-name order.
    pub fn load_dir(&mut self, dir: &Path) -> SchemaResult<()> {
        let entries = fs::read_dir(dir).map_err(|e| {
            SchemaError::malformed(
                dir.display().to_string(),
                format!("Failed to read directory: {}", e),
            )
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::malformed(
                    dir.display().to_string(),
                    format!("Failed to read directory entry: {}", e),
                )
            })?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            self.load_file(&path)?;
        }
        Ok(())
    }

    /// Number of definitions collected so far.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Compiles everything collected.
    pub fn compile(self) -> SchemaResult<Schema> {
        let sources = self.sources.join(",");
        let schema = SchemaCompiler::compile(self.definitions)?;
        log_event_with_fields(
            Event::SchemasLoaded,
            &[("types", &schema.len().to_string()), ("sources", &sources)],
        );
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::errors::SchemaErrorCode;
    use tempfile::TempDir;

    const BLOB: &str = r#"[
        {
            "name": "Blob",
            "superclass": "Primitive",
            "keyword": "blob",
            "flags": { "finite": true, "solid": true, "transformable": true },
            "fields": [
                { "name": "threshold", "required": true, "validator": { "kind": "float" } }
            ]
        }
    ]"#;

    #[test]
    fn test_builtin_compiles() {
        let schema = SchemaLoader::with_builtin().compile().unwrap();
        assert!(schema.contains("Sphere"));
    }

    #[test]
    fn test_extension_file_extends_builtin() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("blob.json");
        fs::write(&path, BLOB).unwrap();

        let mut loader = SchemaLoader::with_builtin();
        loader.load_file(&path).unwrap();
        let schema = loader.compile().unwrap();

        let blob = schema.class("Blob").unwrap();
        assert!(blob.is_a("Primitive"));
        assert!(blob.has_field("hollow"));
    }

    #[test]
    fn test_load_dir_skips_non_json() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("blob.json"), BLOB).unwrap();
        fs::write(tmp.path().join("notes.txt"), "not json").unwrap();

        let mut loader = SchemaLoader::with_builtin();
        let before = loader.len();
        loader.load_dir(tmp.path()).unwrap();
        assert_eq!(loader.len(), before + 1);
    }

    #[test]
    fn test_malformed_file_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();

        let mut loader = SchemaLoader::new();
        let err = loader.load_file(&path).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::Malformed);
        assert!(err.is_fatal());
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let mut loader = SchemaLoader::new();
        let err = loader.load_file(Path::new("/nonexistent/defs.json")).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::Malformed);
    }

    #[test]
    fn test_redefining_builtin_type_fails() {
        let mut loader = SchemaLoader::with_builtin();
        loader
            .load_str("dup", r#"[{ "name": "Sphere", "fields": [] }]"#)
            .unwrap();
        let err = loader.compile().unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::DuplicateType);
    }
}
