//! Class synthesis
//!
//! Compiles the definition table once into resolved `ClassDef`s. All schema
//! faults (duplicate names, broken superclass chains, field collisions,
//! invalid defaults) surface here, never at instance creation.

use regex::Regex;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use super::errors::{SchemaError, SchemaResult};
use super::predicate::NoEntities;
use super::types::{FieldDef, TypeDef, TypeFlags};

const IDENTIFIER_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*$";

/// A resolved entity class.
///
/// `fields` is the effective field set: ancestor fields first (root down),
/// then the class's own fields, each in declaration order.
#[derive(Debug)]
pub struct ClassDef {
    name: String,
    keyword: Option<String>,
    flags: TypeFlags,
    ancestors: Vec<String>,
    fields: Vec<FieldDef>,
    index: HashMap<String, usize>,
    doc: String,
}

impl ClassDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// SDL keyword, inherited from the nearest ancestor that declares one.
    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref()
    }

    pub fn flags(&self) -> TypeFlags {
        self.flags
    }

    /// Ancestor names, nearest first.
    pub fn ancestors(&self) -> &[String] {
        &self.ancestors
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Returns true when this class is `type_name` or descends from it.
    pub fn is_a(&self, type_name: &str) -> bool {
        self.name == type_name || self.ancestors.iter().any(|a| a == type_name)
    }

    pub fn doc(&self) -> &str {
        &self.doc
    }
}

/// The compiled, immutable schema.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    classes: BTreeMap<String, Arc<ClassDef>>,
}

impl Schema {
    /// Looks up a class by type name.
    pub fn class(&self, type_name: &str) -> SchemaResult<&Arc<ClassDef>> {
        self.classes
            .get(type_name)
            .ok_or_else(|| SchemaError::unknown_type(type_name))
    }

    pub fn get(&self, type_name: &str) -> Option<&Arc<ClassDef>> {
        self.classes.get(type_name)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.classes.contains_key(type_name)
    }

    /// Returns true when `class` is `ancestor` or descends from it.
    pub fn is_subclass(&self, class: &str, ancestor: &str) -> bool {
        self.classes.get(class).is_some_and(|c| c.is_a(ancestor))
    }

    pub fn classes(&self) -> impl Iterator<Item = &Arc<ClassDef>> {
        self.classes.values()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Compiles definition tables into a `Schema`.
pub struct SchemaCompiler;

impl SchemaCompiler {
    /// Compiles the full ordered list of definitions.
    ///
    /// # Errors
    ///
    /// Returns a fatal `SchemaError` for duplicate types, unresolvable or
    /// cyclic superclasses, fields redeclared anywhere in a chain, invalid
    /// field names, defaults that fail their own predicate, and instance
    /// predicates naming undefined types.
    pub fn compile(defs: Vec<TypeDef>) -> SchemaResult<Schema> {
        let identifier = Regex::new(IDENTIFIER_PATTERN)
            .map_err(|e| SchemaError::malformed("<identifier pattern>", e.to_string()))?;

        let mut by_name: HashMap<String, TypeDef> = HashMap::new();
        let mut order = Vec::with_capacity(defs.len());

        for def in defs {
            if by_name.contains_key(&def.name) {
                return Err(SchemaError::duplicate_type(&def.name));
            }
            Self::check_own_fields(&def, &identifier)?;
            order.push(def.name.clone());
            by_name.insert(def.name.clone(), def);
        }

        for def in by_name.values() {
            for field in &def.fields {
                for referenced in field.predicate.referenced_classes() {
                    if !by_name.contains_key(referenced) {
                        return Err(SchemaError::invalid_field(
                            &def.name,
                            &field.name,
                            format!("references undefined type '{}'", referenced),
                        ));
                    }
                }
            }
        }

        let mut classes = BTreeMap::new();
        for name in &order {
            let def = &by_name[name];
            let chain = Self::resolve_chain(def, &by_name)?;
            let class = Self::synthesize(&chain)?;
            classes.insert(name.clone(), Arc::new(class));
        }

        Ok(Schema { classes })
    }

    /// Checks a definition's own fields in isolation.
    fn check_own_fields(def: &TypeDef, identifier: &Regex) -> SchemaResult<()> {
        let mut seen = HashSet::new();
        for field in &def.fields {
            if !identifier.is_match(&field.name) {
                return Err(SchemaError::invalid_field(
                    &def.name,
                    &field.name,
                    "name is not a valid identifier",
                ));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::duplicate_field(&def.name, &field.name, &def.name));
            }
            if let Some(default) = &field.default {
                if !field.predicate.check(default, &NoEntities) {
                    return Err(SchemaError::invalid_field(
                        &def.name,
                        &field.name,
                        format!("default {} fails: {}", default, field.message()),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Walks the superclass chain; the result starts with `def` itself.
    fn resolve_chain<'a>(
        def: &'a TypeDef,
        defs: &'a HashMap<String, TypeDef>,
    ) -> SchemaResult<Vec<&'a TypeDef>> {
        let mut chain = vec![def];
        let mut seen = HashSet::new();
        seen.insert(def.name.as_str());

        let mut current = def;
        while let Some(parent) = &current.superclass {
            let next = defs
                .get(parent)
                .ok_or_else(|| SchemaError::unknown_superclass(&current.name, parent))?;
            if !seen.insert(next.name.as_str()) {
                return Err(SchemaError::inheritance_cycle(&def.name));
            }
            chain.push(next);
            current = next;
        }

        Ok(chain)
    }

    fn synthesize(chain: &[&TypeDef]) -> SchemaResult<ClassDef> {
        let own = chain[0];
        let mut fields = Vec::new();
        let mut index = HashMap::new();
        let mut owners: HashMap<&str, &str> = HashMap::new();

        for ancestor in chain.iter().rev() {
            for field in &ancestor.fields {
                if let Some(owner) = owners.get(field.name.as_str()) {
                    return Err(SchemaError::duplicate_field(&ancestor.name, &field.name, owner));
                }
                owners.insert(&field.name, &ancestor.name);
                index.insert(field.name.clone(), fields.len());
                fields.push(field.clone());
            }
        }

        let keyword = chain.iter().find_map(|d| d.keyword.clone());

        Ok(ClassDef {
            name: own.name.clone(),
            keyword,
            flags: own.flags,
            ancestors: chain[1..].iter().map(|d| d.name.clone()).collect(),
            fields,
            index,
            doc: own.doc.clone(),
        })
    }
}
