use crate::core::naming;
use crate::core::record::{FieldValue, Record};
use crate::utils::error::{PassiveRecordError, Result};
use crate::utils::validation::{find_duplicate, validate_identifier, validate_non_empty_string};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Timestamp fields every record accepts without declaring them.
pub const RESERVED_FIELDS: [&str; 2] = ["created_at", "updated_at"];

/// Zero-argument computed value, invoked through `extra_methods`.
pub type ComputedFn = fn(&Record) -> serde_json::Value;

#[derive(Clone)]
struct ComputedMethod {
    name: String,
    func: ComputedFn,
}

impl fmt::Debug for ComputedMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComputedMethod")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Declared fields of one record type. Shared by every record of the type.
#[derive(Debug, Clone)]
pub struct Schema {
    type_name: String,
    attributes: Vec<String>,
    associations: Vec<String>,
    methods: Vec<ComputedMethod>,
}

impl Schema {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            attributes: Vec::new(),
            associations: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn associations(&self) -> &[String] {
        &self.associations
    }

    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.iter().map(|m| m.name.as_str())
    }

    pub fn is_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a == name)
    }

    pub fn is_association(&self, name: &str) -> bool {
        self.associations.iter().any(|a| a == name)
    }

    pub fn is_reserved(name: &str) -> bool {
        RESERVED_FIELDS.contains(&name)
    }

    /// Whether a record of this type may hold a value under `name`.
    pub fn accepts(&self, name: &str) -> bool {
        self.is_attribute(name) || self.is_association(name) || Self::is_reserved(name)
    }

    pub fn method(&self, name: &str) -> Option<ComputedFn> {
        self.methods.iter().find(|m| m.name == name).map(|m| m.func)
    }

    fn declared_names(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .iter()
            .chain(self.associations.iter())
            .map(String::as_str)
    }
}

/// Output keys of `names`. Two names that underscore to the same key would
/// render under the same tag.
fn output_keys<'a>(names: impl IntoIterator<Item = &'a str>) -> HashSet<String> {
    names.into_iter().map(naming::underscore).collect()
}

/// Process-level table of schemas keyed by type name.
///
/// Declarations are expected to finish before records are built; a record
/// keeps the schema it was built with.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Arc<Schema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the attribute list of `type_name`.
    pub fn declare_attributes<I, S>(&mut self, type_name: &str, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        {
            let current = self.schema(type_name);
            let taken = output_keys(
                current
                    .associations()
                    .iter()
                    .map(String::as_str)
                    .chain(current.method_names()),
            );
            check_declaration(type_name, &names, &taken)?;
        }

        tracing::debug!("Declared attributes for {}: {:?}", type_name, names);
        self.schema_mut(type_name).attributes = names;
        Ok(())
    }

    /// Replaces the association list of `type_name`.
    pub fn declare_associations<I, S>(&mut self, type_name: &str, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        {
            let current = self.schema(type_name);
            let taken = output_keys(
                current
                    .attributes()
                    .iter()
                    .map(String::as_str)
                    .chain(current.method_names()),
            );
            check_declaration(type_name, &names, &taken)?;
        }

        tracing::debug!("Declared associations for {}: {:?}", type_name, names);
        self.schema_mut(type_name).associations = names;
        Ok(())
    }

    /// Registers a computed value; redeclaring a name replaces its function.
    pub fn declare_method(&mut self, type_name: &str, name: &str, func: ComputedFn) -> Result<()> {
        {
            let current = self.schema(type_name);
            let taken = output_keys(
                current
                    .declared_names()
                    .chain(current.method_names().filter(|m| *m != name)),
            );
            check_declaration(type_name, &[name.to_string()], &taken)?;
        }

        tracing::debug!("Declared method {} for {}", name, type_name);
        let schema = self.schema_mut(type_name);
        match schema.methods.iter_mut().find(|m| m.name == name) {
            Some(existing) => existing.func = func,
            None => schema.methods.push(ComputedMethod {
                name: name.to_string(),
                func,
            }),
        }
        Ok(())
    }

    /// Declared attributes, empty when the type never declared any.
    pub fn attributes_of(&self, type_name: &str) -> &[String] {
        self.schemas
            .get(type_name)
            .map(|s| s.attributes())
            .unwrap_or(&[])
    }

    /// Declared associations, empty when the type never declared any.
    pub fn associations_of(&self, type_name: &str) -> &[String] {
        self.schemas
            .get(type_name)
            .map(|s| s.associations())
            .unwrap_or(&[])
    }

    /// Whether `type_name` has declared anything.
    pub fn contains(&self, type_name: &str) -> bool {
        self.schemas.contains_key(type_name)
    }

    /// Schema for `type_name`; an undeclared type gets an empty schema.
    pub fn schema(&self, type_name: &str) -> Arc<Schema> {
        self.schemas
            .get(type_name)
            .cloned()
            .unwrap_or_else(|| Arc::new(Schema::new(type_name)))
    }

    /// Builds a record of `type_name` from field name/value pairs.
    pub fn build<I, K, V>(&self, type_name: &str, params: I) -> Result<Record>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        Record::from_params(self.schema(type_name), params)
    }

    fn schema_mut(&mut self, type_name: &str) -> &mut Schema {
        let entry = self
            .schemas
            .entry(type_name.to_string())
            .or_insert_with(|| Arc::new(Schema::new(type_name)));
        Arc::make_mut(entry)
    }
}

fn check_declaration(type_name: &str, names: &[String], taken: &HashSet<String>) -> Result<()> {
    validate_non_empty_string("type name", type_name)?;

    if let Some(duplicate) = find_duplicate(names) {
        return Err(PassiveRecordError::DuplicateField {
            type_name: type_name.to_string(),
            field: duplicate.to_string(),
        });
    }

    let mut keys = HashSet::new();
    for name in names {
        validate_identifier("field name", name)?;
        let key = naming::underscore(name);
        if Schema::is_reserved(&key) {
            return Err(PassiveRecordError::ReservedField {
                type_name: type_name.to_string(),
                field: name.clone(),
            });
        }
        if taken.contains(&key) || !keys.insert(key) {
            return Err(PassiveRecordError::FieldCollision {
                type_name: type_name.to_string(),
                field: name.clone(),
            });
        }
    }
    Ok(())
}
