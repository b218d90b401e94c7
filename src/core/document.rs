use crate::core::record::{FieldValue, Record};
use crate::core::schema::SchemaRegistry;
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// JSON form of a record: `{"type": "Person", "fields": {...}}`.
///
/// Association fields may hold nested documents (or lists of them); those
/// become related records. Any other association value is stored raw.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordDocument {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl RecordDocument {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn into_record(self, registry: &SchemaRegistry) -> Result<Record> {
        if !registry.contains(&self.type_name) {
            tracing::warn!("Document type {} has no declarations", self.type_name);
        }
        let schema = registry.schema(&self.type_name);
        let mut record = Record::new(schema.clone());

        for (name, value) in self.fields {
            let field = if schema.is_association(&name) {
                association_value(registry, value)?
            } else {
                FieldValue::Value(value)
            };
            record.set(name, field)?;
        }

        tracing::debug!("Loaded {} document", record.type_name());
        Ok(record)
    }
}

fn is_document(value: &Value) -> bool {
    value.as_object().is_some_and(|map| {
        map.get("type").is_some_and(Value::is_string)
            && map.get("fields").map_or(true, Value::is_object)
    })
}

fn association_value(registry: &SchemaRegistry, value: Value) -> Result<FieldValue> {
    match value {
        value if is_document(&value) => {
            let document: RecordDocument = serde_json::from_value(value)?;
            Ok(FieldValue::One(Box::new(document.into_record(registry)?)))
        }
        Value::Array(items) if !items.is_empty() && items.iter().all(is_document) => {
            let records = items
                .into_iter()
                .map(|item| {
                    let document: RecordDocument = serde_json::from_value(item)?;
                    document.into_record(registry)
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(FieldValue::Many(records))
        }
        other => Ok(FieldValue::Value(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::PassiveRecordError;
    use serde_json::json;

    fn registry() -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        registry.declare_attributes("Person", ["id", "name"]).unwrap();
        registry
            .declare_associations("Person", ["addresses", "employer"])
            .unwrap();
        registry.declare_attributes("Address", ["city"]).unwrap();
        registry.declare_attributes("Company", ["title"]).unwrap();
        registry
    }

    #[test]
    fn test_nested_documents_become_records() {
        let document = RecordDocument::from_json_str(
            r#"{
                "type": "Person",
                "fields": {
                    "id": 1,
                    "name": "Dima",
                    "addresses": [
                        {"type": "Address", "fields": {"city": "Oslo"}},
                        {"type": "Address", "fields": {"city": "Bergen"}}
                    ],
                    "employer": {"type": "Company", "fields": {"title": "Acme"}}
                }
            }"#,
        )
        .unwrap();

        let person = document.into_record(&registry()).unwrap();

        match person.get("addresses") {
            Some(FieldValue::Many(addresses)) => {
                assert_eq!(addresses.len(), 2);
                assert_eq!(addresses[1].value("city"), Some(&json!("Bergen")));
            }
            other => panic!("expected related records, got {:?}", other),
        }
        match person.get("employer") {
            Some(FieldValue::One(company)) => assert_eq!(company.type_name(), "Company"),
            other => panic!("expected related record, got {:?}", other),
        }
    }

    #[test]
    fn test_non_document_association_kept_raw() {
        let document = RecordDocument::from_json_str(
            r#"{"type": "Person", "fields": {"employer": "Acme"}}"#,
        )
        .unwrap();

        let person = document.into_record(&registry()).unwrap();
        assert_eq!(person.get("employer"), Some(&FieldValue::Value(json!("Acme"))));
    }

    #[test]
    fn test_unknown_nested_field_rejected() {
        let document = RecordDocument::from_json_str(
            r#"{"type": "Person", "fields": {
                "employer": {"type": "Company", "fields": {"ceo": "X"}}
            }}"#,
        )
        .unwrap();

        assert!(matches!(
            document.into_record(&registry()),
            Err(PassiveRecordError::UnknownField { ref field, .. }) if field == "ceo"
        ));
    }

    #[test]
    fn test_undeclared_document_type_loads_empty() {
        let document =
            RecordDocument::from_json_str(r#"{"type": "Invoice", "fields": {}}"#).unwrap();
        let registry = registry();
        assert!(!registry.contains("Invoice"));

        let invoice = document.into_record(&registry).unwrap();
        assert_eq!(invoice.type_name(), "Invoice");
        assert!(invoice.attributes().is_empty());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            RecordDocument::from_json_str("{\"fields\": {}}"),
            Err(PassiveRecordError::SerializationError(_))
        ));
    }
}
