//! Emission errors
//!
//! Emission faults abort the whole emission call; no partial text is
//! returned.

use thiserror::Error;

use crate::scene::{EntityLabel, SceneError};
use crate::value::EntityId;

/// Result type for emission
pub type EmitResult<T> = Result<T, EmitError>;

/// Emission errors
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("{owner}: required field '{field}' has no value")]
    MissingField { owner: EntityLabel, field: String },

    #[error("{owner}: {reason}")]
    Structure { owner: EntityLabel, reason: String },

    #[error("{owner}: field '{field}' produced an invalid value: {message}")]
    Invalid {
        owner: EntityLabel,
        field: String,
        message: String,
    },

    #[error("{owner}: field '{field}' references {target}, which no longer exists")]
    DanglingReference {
        owner: EntityLabel,
        field: String,
        target: EntityId,
    },

    #[error("{owner} contains itself")]
    Cycle { owner: EntityLabel },

    #[error(transparent)]
    Scene(#[from] SceneError),
}

impl EmitError {
    pub(crate) fn structure(owner: EntityLabel, reason: impl Into<String>) -> Self {
        EmitError::Structure {
            owner,
            reason: reason.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> &'static str {
        match self {
            EmitError::MissingField { .. } => "SDL_EMIT_MISSING_FIELD",
            EmitError::Structure { .. } => "SDL_EMIT_STRUCTURE",
            EmitError::Invalid { .. } => "SDL_EMIT_INVALID_VALUE",
            EmitError::DanglingReference { .. } => "SDL_EMIT_DANGLING_REFERENCE",
            EmitError::Cycle { .. } => "SDL_EMIT_CYCLE",
            EmitError::Scene(e) => e.code(),
        }
    }

    /// Entity the fault was detected on, if any
    pub fn owner(&self) -> Option<&EntityLabel> {
        match self {
            EmitError::MissingField { owner, .. }
            | EmitError::Structure { owner, .. }
            | EmitError::Invalid { owner, .. }
            | EmitError::DanglingReference { owner, .. }
            | EmitError::Cycle { owner } => Some(owner),
            EmitError::Scene(_) => None,
        }
    }
}
