//! Scene graph errors
//!
//! Validation and identifier errors are recoverable: they are returned to
//! the caller of the mutating operation and leave every entity unchanged.

use thiserror::Error;

use super::entity::EntityLabel;
use crate::schema::SchemaError;
use crate::value::EntityId;

/// Result type for scene operations
pub type SceneResult<T> = Result<T, SceneError>;

/// A field write rejected by its predicate.
#[derive(Debug, Clone, Error)]
#[error("{owner}: {message} (field '{field}', got {value})")]
pub struct ValidationError {
    /// Rejected field
    pub field: String,
    /// Offending value, rendered for display
    pub value: String,
    /// Owning entity
    pub owner: EntityLabel,
    /// Message from the field definition
    pub message: String,
}

/// Scene graph errors
#[derive(Debug, Error)]
pub enum SceneError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Type '{0}' is abstract and cannot be instantiated")]
    AbstractType(String),

    #[error("Entity {0} does not exist")]
    UnknownEntity(EntityId),

    #[error("Type '{type_name}' has no field '{field}'")]
    UnknownField { type_name: String, field: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{owner}: required field '{field}' was not supplied and has no default")]
    MissingRequired { owner: EntityLabel, field: String },

    #[error("{owner}: field '{field}' is read-only")]
    ReadOnly { owner: EntityLabel, field: String },

    #[error("{owner}: required field '{field}' cannot be cleared")]
    ClearRequired { owner: EntityLabel, field: String },

    #[error("Identifier '{0}' is already in use")]
    NameCollision(String),

    #[error("{0} does not carry a transform")]
    NotTransformable(EntityLabel),

    #[error("Scene document error: {0}")]
    Document(String),
}

impl SceneError {
    /// Get the error code
    pub fn code(&self) -> &'static str {
        match self {
            SceneError::Schema(e) => e.code().code(),
            SceneError::AbstractType(_) => "SDL_ABSTRACT_TYPE",
            SceneError::UnknownEntity(_) => "SDL_UNKNOWN_ENTITY",
            SceneError::UnknownField { .. } => "SDL_UNKNOWN_FIELD",
            SceneError::Validation(_) => "SDL_VALIDATION_FAILED",
            SceneError::MissingRequired { .. } => "SDL_MISSING_REQUIRED",
            SceneError::ReadOnly { .. } => "SDL_READ_ONLY",
            SceneError::ClearRequired { .. } => "SDL_CLEAR_REQUIRED",
            SceneError::NameCollision(_) => "SDL_IDENTIFIER_COLLISION",
            SceneError::NotTransformable(_) => "SDL_NOT_TRANSFORMABLE",
            SceneError::Document(_) => "SDL_DOCUMENT_INVALID",
        }
    }

    /// Returns the validation details if this is a validation error
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            SceneError::Validation(v) => Some(v),
            _ => None,
        }
    }
}
