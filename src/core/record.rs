use crate::core::schema::Schema;
use crate::core::serializer::XmlSerializer;
use crate::domain::model::RenderOptions;
use crate::utils::error::{PassiveRecordError, Result};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Value held by a record field.
///
/// Associations normally hold `One` or `Many`; any other value in an
/// association slot is kept as-is and treated as unexpandable at render time.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Value(Value),
    One(Box<Record>),
    Many(Vec<Record>),
}

impl FieldValue {
    /// Plain data form of the value; related records become their snapshots.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Value(value) => value.clone(),
            FieldValue::One(record) => Value::Object(record.attributes()),
            FieldValue::Many(records) => Value::Array(
                records
                    .iter()
                    .map(|r| Value::Object(r.attributes()))
                    .collect(),
            ),
        }
    }
}

impl From<Record> for FieldValue {
    fn from(record: Record) -> Self {
        FieldValue::One(Box::new(record))
    }
}

impl From<Vec<Record>> for FieldValue {
    fn from(records: Vec<Record>) -> Self {
        FieldValue::Many(records)
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(value: $ty) -> Self {
                    FieldValue::Value(value.into())
                }
            }
        )*
    };
}

impl_from_scalar!(Value, String, &str, bool, i32, i64, u32, u64, f64);

/// An instance of a declared type. Holds one value per declared attribute
/// and association, plus the two timestamp fields.
#[derive(Debug, Clone)]
pub struct Record {
    schema: Arc<Schema>,
    fields: HashMap<String, FieldValue>,
}

impl Record {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            fields: HashMap::new(),
        }
    }

    /// Builds a record from field name/value pairs. Any undeclared name fails
    /// the whole construction.
    pub fn from_params<I, K, V>(schema: Arc<Schema>, params: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let mut record = Self::new(schema);
        for (name, value) in params {
            record.set(name, value)?;
        }
        Ok(record)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn type_name(&self) -> &str {
        self.schema.type_name()
    }

    /// Current value of a field; `None` when unset or undeclared.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Scalar value of a field, if it holds one.
    pub fn value(&self, name: &str) -> Option<&Value> {
        match self.fields.get(name) {
            Some(FieldValue::Value(value)) => Some(value),
            _ => None,
        }
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Result<()> {
        let name = name.into();
        if !self.schema.accepts(&name) {
            return Err(PassiveRecordError::unknown_field(self.type_name(), &name));
        }
        self.fields.insert(name, value.into());
        Ok(())
    }

    /// Snapshot of the declared attributes in declaration order. Unset
    /// attributes appear as null.
    pub fn attributes(&self) -> Map<String, Value> {
        self.schema
            .attributes()
            .iter()
            .map(|name| {
                let value = self
                    .fields
                    .get(name)
                    .map(FieldValue::to_json)
                    .unwrap_or(Value::Null);
                (name.clone(), value)
            })
            .collect()
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp("created_at")
    }

    pub fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.fields
            .insert("created_at".to_string(), at.to_rfc3339().into());
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp("updated_at")
    }

    pub fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.fields
            .insert("updated_at".to_string(), at.to_rfc3339().into());
    }

    /// Stamps `updated_at` with the current time, and `created_at` too when
    /// it was never set.
    pub fn touch(&mut self) {
        let now = Utc::now();
        if self.created_at().is_none() {
            self.set_created_at(now);
        }
        self.set_updated_at(now);
    }

    /// Renders the record with the default serializer.
    pub fn to_xml(&self, options: RenderOptions) -> Result<String> {
        XmlSerializer::new().to_xml(self, options)
    }

    fn timestamp(&self, name: &str) -> Option<DateTime<Utc>> {
        let text = self.value(name)?.as_str()?;
        DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|at| at.with_timezone(&Utc))
    }
}

/// Records compare by their attribute snapshots only.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.type_name() == other.type_name() && self.attributes() == other.attributes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::SchemaRegistry;
    use serde_json::json;

    fn registry() -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        registry
            .declare_attributes("Name", ["id", "first_name", "last_name"])
            .unwrap();
        registry.declare_associations("Name", ["aliases"]).unwrap();
        registry
    }

    #[test]
    fn test_build_from_params() {
        let registry = registry();
        let name = registry
            .build("Name", [("id", json!(1)), ("first_name", json!("Dima"))])
            .unwrap();

        assert_eq!(name.value("first_name"), Some(&json!("Dima")));
        assert_eq!(name.get("last_name"), None);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let registry = registry();
        let result = registry.build("Name", [("first_name", "Dima"), ("nickname", "D")]);

        match result {
            Err(PassiveRecordError::UnknownField { type_name, field }) => {
                assert_eq!(type_name, "Name");
                assert_eq!(field, "nickname");
            }
            other => panic!("expected UnknownField, got {:?}", other),
        }
    }

    #[test]
    fn test_setter_rejects_unknown_field() {
        let registry = registry();
        let mut name = Record::new(registry.schema("Name"));

        assert!(name.set("first_name", "Dima").is_ok());
        assert!(name.set("middle_name", "X").is_err());
    }

    #[test]
    fn test_attributes_snapshot_order_and_nulls() {
        let registry = registry();
        let name = registry
            .build("Name", [("last_name", json!("Dozen")), ("id", json!(7))])
            .unwrap();

        let snapshot = name.attributes();
        let keys: Vec<&str> = snapshot.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "first_name", "last_name"]);
        assert_eq!(snapshot["first_name"], Value::Null);
        assert_eq!(snapshot["last_name"], json!("Dozen"));
    }

    #[test]
    fn test_snapshot_reflects_mutation() {
        let registry = registry();
        let mut name = registry.build("Name", [("first_name", "Dima")]).unwrap();
        let before = name.attributes();

        name.set("first_name", "Dmitri").unwrap();

        assert_eq!(before["first_name"], json!("Dima"));
        assert_eq!(name.attributes()["first_name"], json!("Dmitri"));
    }

    #[test]
    fn test_equality_uses_declared_attributes_only() {
        let registry = registry();
        let a = registry.build("Name", [("first_name", "Dima")]).unwrap();
        let mut b = registry.build("Name", [("first_name", "Dima")]).unwrap();
        assert_eq!(a, b);

        b.set("aliases", Vec::<Record>::new()).unwrap();
        b.touch();
        assert_eq!(a, b);

        b.set("first_name", "Dmitri").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_timestamps() {
        let registry = registry();
        let mut name = registry.build("Name", [("id", 1)]).unwrap();
        assert!(name.created_at().is_none());

        name.touch();
        let created = name.created_at().unwrap();
        assert!(name.updated_at().unwrap() >= created);

        let earlier = created - chrono::Duration::days(1);
        name.set_created_at(earlier);
        name.touch();
        assert_eq!(name.created_at(), Some(earlier));
    }
}
