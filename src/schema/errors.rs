//! Schema error types
//!
//! Error codes:
//! - SDL_SCHEMA_DUPLICATE_TYPE (FATAL)
//! - SDL_SCHEMA_DUPLICATE_FIELD (FATAL)
//! - SDL_SCHEMA_UNKNOWN_SUPERCLASS (FATAL)
//! - SDL_SCHEMA_INHERITANCE_CYCLE (FATAL)
//! - SDL_SCHEMA_INVALID_FIELD (FATAL)
//! - SDL_SCHEMA_MALFORMED (FATAL)
//! - SDL_SCHEMA_UNKNOWN_TYPE (REJECT)

use std::fmt;

/// Severity levels for schema errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Caller request rejected, schema still usable
    Reject,
    /// Schema cannot be compiled
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Two definitions share a type name
    DuplicateType,
    /// A field name appears twice in one inheritance chain
    DuplicateField,
    /// Superclass reference does not resolve
    UnknownSuperclass,
    /// Superclass chain loops back on itself
    InheritanceCycle,
    /// Field name or default is invalid
    InvalidField,
    /// Definition file could not be read or parsed
    Malformed,
    /// Lookup of a type that was never defined
    UnknownType,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::DuplicateType => "SDL_SCHEMA_DUPLICATE_TYPE",
            SchemaErrorCode::DuplicateField => "SDL_SCHEMA_DUPLICATE_FIELD",
            SchemaErrorCode::UnknownSuperclass => "SDL_SCHEMA_UNKNOWN_SUPERCLASS",
            SchemaErrorCode::InheritanceCycle => "SDL_SCHEMA_INHERITANCE_CYCLE",
            SchemaErrorCode::InvalidField => "SDL_SCHEMA_INVALID_FIELD",
            SchemaErrorCode::Malformed => "SDL_SCHEMA_MALFORMED",
            SchemaErrorCode::UnknownType => "SDL_SCHEMA_UNKNOWN_TYPE",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            SchemaErrorCode::UnknownType => Severity::Reject,
            _ => Severity::Fatal,
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error type with full context
#[derive(Debug)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    type_name: Option<String>,
    field: Option<String>,
}

impl SchemaError {
    fn new(code: SchemaErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            type_name: None,
            field: None,
        }
    }

    fn on_type(mut self, type_name: &str) -> Self {
        self.type_name = Some(type_name.to_string());
        self
    }

    fn on_field(mut self, field: &str) -> Self {
        self.field = Some(field.to_string());
        self
    }

    pub fn duplicate_type(type_name: &str) -> Self {
        Self::new(
            SchemaErrorCode::DuplicateType,
            format!("Type '{}' is defined more than once", type_name),
        )
        .on_type(type_name)
    }

    /// A field redeclared by `type_name` that `owner` already declares
    pub fn duplicate_field(type_name: &str, field: &str, owner: &str) -> Self {
        Self::new(
            SchemaErrorCode::DuplicateField,
            format!(
                "Type '{}' redeclares field '{}' already declared by '{}'",
                type_name, field, owner
            ),
        )
        .on_type(type_name)
        .on_field(field)
    }

    pub fn unknown_superclass(type_name: &str, superclass: &str) -> Self {
        Self::new(
            SchemaErrorCode::UnknownSuperclass,
            format!("Type '{}' extends unknown type '{}'", type_name, superclass),
        )
        .on_type(type_name)
    }

    pub fn inheritance_cycle(type_name: &str) -> Self {
        Self::new(
            SchemaErrorCode::InheritanceCycle,
            format!("Superclass chain of '{}' is cyclic", type_name),
        )
        .on_type(type_name)
    }

    pub fn invalid_field(type_name: &str, field: &str, reason: impl Into<String>) -> Self {
        Self::new(
            SchemaErrorCode::InvalidField,
            format!("Field '{}.{}' is invalid: {}", type_name, field, reason.into()),
        )
        .on_type(type_name)
        .on_field(field)
    }

    pub fn malformed(source: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(
            SchemaErrorCode::Malformed,
            format!("Malformed definitions '{}': {}", source.into(), reason.into()),
        )
    }

    pub fn unknown_type(type_name: &str) -> Self {
        Self::new(
            SchemaErrorCode::UnknownType,
            format!("Type '{}' is not defined", type_name),
        )
        .on_type(type_name)
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the offending type name if applicable
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    /// Returns the offending field name if applicable
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
