//! Observable events
//!
//! Events are explicit and typed. Each carries a fixed severity.

use std::fmt;

use super::logger::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded
    ConfigLoaded,
    /// Definition tables compiled
    SchemasLoaded,
    /// Scene document loaded into a graph
    SceneLoaded,

    // Entity lifecycle
    /// Entity constructed and registered
    EntityCreated,
    /// Entity destroyed and deregistered
    EntityDestroyed,
    /// Field write rejected by its predicate
    ValidationRejected,
    /// Construction rejected (missing field, name collision, ...)
    ConstructionRejected,

    // Emission
    /// Emission begins
    EmitBegin,
    /// Emission complete
    EmitComplete,
    /// Emission aborted
    EmitFailed,
    /// Attribute not applicable to the object kind, skipped
    AttributeSkipped,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SchemasLoaded => "SCHEMAS_LOADED",
            Event::SceneLoaded => "SCENE_LOADED",

            Event::EntityCreated => "ENTITY_CREATED",
            Event::EntityDestroyed => "ENTITY_DESTROYED",
            Event::ValidationRejected => "VALIDATION_REJECTED",
            Event::ConstructionRejected => "CONSTRUCTION_REJECTED",

            Event::EmitBegin => "EMIT_BEGIN",
            Event::EmitComplete => "EMIT_COMPLETE",
            Event::EmitFailed => "EMIT_FAILED",
            Event::AttributeSkipped => "ATTRIBUTE_SKIPPED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::EntityCreated | Event::EntityDestroyed | Event::EmitBegin => Severity::Trace,
            Event::ValidationRejected | Event::ConstructionRejected | Event::AttributeSkipped => {
                Severity::Warn
            }
            Event::EmitFailed => Severity::Error,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_strings() {
        assert_eq!(Event::SchemasLoaded.as_str(), "SCHEMAS_LOADED");
        assert_eq!(Event::ValidationRejected.to_string(), "VALIDATION_REJECTED");
    }

    #[test]
    fn test_event_severities() {
        assert_eq!(Event::EntityCreated.severity(), Severity::Trace);
        assert_eq!(Event::ValidationRejected.severity(), Severity::Warn);
        assert_eq!(Event::EmitFailed.severity(), Severity::Error);
        assert_eq!(Event::ConfigLoaded.severity(), Severity::Info);
    }
}
