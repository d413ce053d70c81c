//! Definition table types
//!
//! A `TypeDef` declares one entity type: its SDL keyword, optional
//! superclass, classification flags, and ordered field list. Definitions are
//! pure data; `SchemaCompiler` turns them into resolved classes.

use serde::{Deserialize, Serialize};

use super::predicate::Predicate;
use crate::value::Value;

fn default_true() -> bool {
    true
}

/// Field definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name, unique across the owning type's inheritance chain
    pub name: String,
    /// Whether the field must hold a value before emission
    #[serde(default)]
    pub required: bool,
    /// Validity predicate
    #[serde(rename = "validator")]
    pub predicate: Predicate,
    /// Message reported when the predicate rejects a value
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error_message: String,
    /// Value used when the field is not supplied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Read-only fields can only be set at construction
    #[serde(default = "default_true")]
    pub mutable: bool,
    /// Documentation string
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub doc: String,
}

impl FieldDef {
    fn new(name: &str, required: bool, predicate: Predicate) -> Self {
        Self {
            name: name.to_string(),
            required,
            predicate,
            error_message: String::new(),
            default: None,
            mutable: true,
            doc: String::new(),
        }
    }

    /// Create a required field
    pub fn required(name: &str, predicate: Predicate) -> Self {
        Self::new(name, true, predicate)
    }

    /// Create an optional field
    pub fn optional(name: &str, predicate: Predicate) -> Self {
        Self::new(name, false, predicate)
    }

    /// Create an optional boolean flag
    pub fn flag(name: &str) -> Self {
        Self::new(name, false, Predicate::Bool)
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn read_only(mut self) -> Self {
        self.mutable = false;
        self
    }

    pub fn with_message(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }

    pub fn with_doc(mut self, doc: &str) -> Self {
        self.doc = doc.to_string();
        self
    }

    /// Returns the rejection message, derived from the predicate when the
    /// definition does not supply one.
    pub fn message(&self) -> String {
        if self.error_message.is_empty() {
            format!("{} must be {}", self.name, self.predicate.describe())
        } else {
            self.error_message.clone()
        }
    }
}

/// Classification flags used by the serializer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeFlags {
    /// Cannot be instantiated directly
    #[serde(rename = "abstract")]
    pub abstract_type: bool,
    /// Has a finite extent
    pub finite: bool,
    /// Has a well-defined inside (`hollow` and `inverse` apply)
    pub solid: bool,
    /// Constructive solid geometry container
    pub csg: bool,
    /// Carries a base and cumulative transform
    pub transformable: bool,
}

impl TypeFlags {
    pub const fn abstract_base() -> Self {
        Self {
            abstract_type: true,
            finite: false,
            solid: false,
            csg: false,
            transformable: true,
        }
    }

    /// Finite solid object
    pub const fn finite_solid() -> Self {
        Self {
            abstract_type: false,
            finite: true,
            solid: true,
            csg: false,
            transformable: true,
        }
    }

    /// Infinite solid object (planes, polynomials)
    pub const fn infinite_solid() -> Self {
        Self {
            abstract_type: false,
            finite: false,
            solid: true,
            csg: false,
            transformable: true,
        }
    }

    /// Finite surface without an inside (discs, triangles, polygons)
    pub const fn finite_patch() -> Self {
        Self {
            abstract_type: false,
            finite: true,
            solid: false,
            csg: false,
            transformable: true,
        }
    }

    pub const fn csg() -> Self {
        Self {
            abstract_type: false,
            finite: true,
            solid: true,
            csg: true,
            transformable: true,
        }
    }

    /// Plain settings block (colors, cameras, global settings)
    pub const fn settings() -> Self {
        Self {
            abstract_type: false,
            finite: false,
            solid: false,
            csg: false,
            transformable: false,
        }
    }
}

/// Type definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDef {
    /// Unique type name
    pub name: String,
    /// Parent type (single inheritance)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superclass: Option<String>,
    /// SDL keyword opening the emitted block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(default)]
    pub flags: TypeFlags,
    /// Fields in declaration order
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub doc: String,
}

impl TypeDef {
    /// Create an empty definition
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            superclass: None,
            keyword: None,
            flags: TypeFlags::default(),
            fields: Vec::new(),
            doc: String::new(),
        }
    }

    pub fn extends(mut self, superclass: &str) -> Self {
        self.superclass = Some(superclass.to_string());
        self
    }

    pub fn keyword(mut self, keyword: &str) -> Self {
        self.keyword = Some(keyword.to_string());
        self
    }

    pub fn flags(mut self, flags: TypeFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn doc(mut self, doc: &str) -> Self {
        self.doc = doc.to_string();
        self
    }
}
