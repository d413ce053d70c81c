//! Emission configuration
//!
//! Loaded from an optional JSON file; every field has a default so an
//! empty object `{}` is a valid configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::{log_event_with_fields, Event, Severity};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Emission configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmitConfig {
    /// Spaces per nesting level (1..=16, default 4)
    #[serde(default = "default_indent_width")]
    pub indent_width: usize,

    /// Value of the leading `#version` directive (default "3.7")
    #[serde(default = "default_sdl_version")]
    pub sdl_version: String,

    /// Files emitted as `#include` lines after `#version`
    #[serde(default)]
    pub includes: Vec<String>,

    /// Minimum log severity: trace, info, warn or error (default "warn")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Extra JSON definition files layered over the builtin table
    #[serde(default)]
    pub schema_files: Vec<PathBuf>,
}

fn default_indent_width() -> usize {
    4
}
fn default_sdl_version() -> String {
    "3.7".to_string()
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            indent_width: default_indent_width(),
            sdl_version: default_sdl_version(),
            includes: Vec::new(),
            log_level: default_log_level(),
            schema_files: Vec::new(),
        }
    }
}

impl EmitConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_json(&content)?;
        log_event_with_fields(Event::ConfigLoaded, &[("path", &path.display().to_string())]);
        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EmitConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=16).contains(&self.indent_width) {
            return Err(ConfigError::Invalid(format!(
                "indent_width must be between 1 and 16, got {}",
                self.indent_width
            )));
        }

        if self.sdl_version.trim().is_empty() {
            return Err(ConfigError::Invalid("sdl_version must not be empty".into()));
        }

        if let Some(bad) = self.includes.iter().find(|i| i.trim().is_empty() || i.contains('"')) {
            return Err(ConfigError::Invalid(format!("invalid include file name {:?}", bad)));
        }

        self.severity()?;
        Ok(())
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> Result<Severity, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("unknown log_level '{}'", self.log_level)))
    }

    /// Indentation for a nesting depth
    pub fn indent(&self, depth: usize) -> String {
        " ".repeat(self.indent_width * depth)
    }
}
