//! CLI command implementations
//!
//! Both commands follow the same sequence:
//!
//! 1. Load configuration (defaults when no file is given)
//! 2. Apply the configured log level
//! 3. Compile the builtin table plus configured definition files
//! 4. Build the scene document into a fresh graph
//! 5. Serialize the whole scene
//!
//! `emit` writes the result to stdout; `check` only reports the outcome.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::EmitConfig;
use crate::emit::Emitter;
use crate::observability::Logger;
use crate::scene::{SceneDocument, SceneGraph};
use crate::schema::SchemaLoader;

use super::args::Command;
use super::errors::CliResult;

/// Dispatch a parsed command
pub fn run_command(command: Command) -> CliResult<()> {
    match command {
        Command::Emit { scene, config } => emit(&scene, config.as_deref()),
        Command::Check { scene, config } => check(&scene, config.as_deref()),
    }
}

/// Print the scene's SDL text to stdout
pub fn emit(scene: &Path, config: Option<&Path>) -> CliResult<()> {
    let text = render(scene, config)?;

    let mut stdout = io::stdout();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

/// Build and serialize the scene, discarding the text
pub fn check(scene: &Path, config: Option<&Path>) -> CliResult<()> {
    let text = render(scene, config)?;

    let mut stdout = io::stdout();
    writeln!(stdout, "ok: {} ({} bytes of SDL)", scene.display(), text.len())?;
    stdout.flush()?;
    Ok(())
}

/// Runs the full pipeline and returns the scene text.
pub fn render(scene: &Path, config_path: Option<&Path>) -> CliResult<String> {
    let config = match config_path {
        Some(path) => EmitConfig::load(path)?,
        None => EmitConfig::default(),
    };
    Logger::set_min_severity(config.severity()?);

    let mut loader = SchemaLoader::with_builtin();
    for file in &config.schema_files {
        loader.load_file(&resolve(config_path, file))?;
    }
    let schema = Arc::new(loader.compile()?);

    let document = SceneDocument::from_file(scene)?;
    let mut graph = SceneGraph::new(schema);
    document.build(&mut graph)?;

    Ok(Emitter::new(&graph).with_config(config).emit_scene()?)
}

/// Definition file paths are relative to the configuration file.
fn resolve(config_path: Option<&Path>, file: &Path) -> PathBuf {
    match config_path.and_then(Path::parent) {
        Some(dir) if file.is_relative() => dir.join(file),
        _ => file.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SCENE: &str = r#"{
        "entities": [
            { "type": "Color", "id": "white", "fields": { "r": 1, "g": 1, "b": 1 } },
            { "type": "Camera", "fields": { "location": [0, 2, -5], "look_at": [0, 0, 0] } },
            { "type": "LightSource", "fields": { "location": [10, 10, -10], "color": { "ref": "white" } } },
            { "type": "Box", "fields": { "corner1": [-1, -1, -1], "corner2": [1, 1, 1] } }
        ]
    }"#;

    #[test]
    fn test_render_with_defaults() {
        let dir = TempDir::new().unwrap();
        let scene = dir.path().join("scene.json");
        fs::write(&scene, SCENE).unwrap();

        let text = render(&scene, None).unwrap();
        assert!(text.starts_with("#version 3.7;\n"));
        assert!(text.contains("camera {"));
        assert!(text.contains("light_source {\n    <10, 10, -10>, rgb <1, 1, 1>\n}"));
        assert!(text.contains("box {\n    <-1, -1, -1>, <1, 1, 1>\n}"));
    }

    #[test]
    fn test_render_with_config_and_extra_schema() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("blob.json"),
            r#"[{ "name": "Blob", "superclass": "Primitive", "keyword": "blob",
                  "flags": { "finite": true, "solid": true, "transformable": true },
                  "fields": [ { "name": "threshold", "required": true, "validator": { "kind": "float" } } ] }]"#,
        )
        .unwrap();
        let config = dir.path().join("povscene.json");
        fs::write(
            &config,
            r#"{ "indent_width": 2, "includes": ["colors.inc"], "schema_files": ["blob.json"] }"#,
        )
        .unwrap();
        let scene = dir.path().join("scene.json");
        fs::write(
            &scene,
            r#"{ "entities": [ { "type": "Blob", "fields": { "threshold": 0.5 } } ] }"#,
        )
        .unwrap();

        let text = render(&scene, Some(&config)).unwrap();
        assert!(text.contains("#include \"colors.inc\"\n"));
        assert!(text.contains("blob {\n  threshold 0.5\n}\n"));
    }

    #[test]
    fn test_render_reports_scene_errors() {
        let dir = TempDir::new().unwrap();
        let scene = dir.path().join("scene.json");
        fs::write(
            &scene,
            r#"{ "entities": [ { "type": "Sphere", "fields": { "radius": 1 } } ] }"#,
        )
        .unwrap();

        let err = render(&scene, None).unwrap_err();
        assert_eq!(err.code_str(), "SDL_CLI_SCENE_ERROR");
        assert!(err.message().contains("center"));
    }

    #[test]
    fn test_missing_scene_file() {
        let err = render(Path::new("/nonexistent/scene.json"), None).unwrap_err();
        assert_eq!(err.code_str(), "SDL_CLI_SCENE_ERROR");
    }
}
