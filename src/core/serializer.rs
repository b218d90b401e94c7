use crate::core::naming;
use crate::core::record::{FieldValue, Record};
use crate::domain::model::{Include, RenderOptions};
use crate::domain::ports::RecordSerializer;
use crate::utils::error::{PassiveRecordError, Result};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt::{self, Write};
use thiserror::Error;

const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Raised while expanding a single association. Never leaves this module:
/// the association renders as an empty mapping instead.
#[derive(Error, Debug)]
enum AssociationExpansionError {
    #[error("association `{0}` is not set")]
    Absent(String),

    #[error("association `{0}` does not hold a record or a sequence of records")]
    NotARecord(String),
}

/// Options after defaults have been applied.
#[derive(Debug)]
struct ResolvedOptions {
    skip_header: bool,
    root_tag: String,
    include: Option<Include>,
    extra_methods: Vec<String>,
}

/// Renders records as XML documents.
///
/// Layout:
/// - optional `<?xml ...?>` preamble line, then one root element;
/// - one child per attribute, then expanded associations, then extra methods
///   in the order requested (a repeated method name is rendered once, at its
///   first position);
/// - tags are the underscored field name with dashes (`postal_code` ->
///   `postal-code`);
/// - integers, floats and booleans carry a `type` attribute, null renders as
///   `<tag nil="true"/>`;
/// - sequences use a `<tag type="array">` wrapper whose children take the
///   singular of the tag (`names` -> `name`, `children` -> `child`); see
///   [`naming::singularize`] for the rules;
/// - empty mappings render as `<tag/>`.
#[derive(Debug, Clone, Default)]
pub struct XmlSerializer {
    defaults: RenderOptions,
}

impl XmlSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializer whose unset options fall back to `defaults` before the
    /// built-in ones.
    pub fn with_defaults(defaults: RenderOptions) -> Self {
        Self { defaults }
    }

    pub fn to_xml(&self, record: &Record, options: RenderOptions) -> Result<String> {
        let options = self.resolve(record, options);
        tracing::debug!(
            "Rendering {} as <{}> (include: {:?}, methods: {:?})",
            record.type_name(),
            options.root_tag,
            options.include,
            options.extra_methods
        );

        let mut attributes = record.attributes();
        for (name, value) in Self::expand_includes(record, options.include.as_ref())? {
            attributes.insert(name, value);
        }

        let mut seen = HashSet::new();
        for method in &options.extra_methods {
            if !seen.insert(method.as_str()) {
                continue;
            }
            let func = record.schema().method(method).ok_or_else(|| {
                PassiveRecordError::UnknownMethod {
                    type_name: record.type_name().to_string(),
                    method: method.clone(),
                }
            })?;
            attributes.insert(naming::underscore(method), func(record));
        }

        let mut xml = String::new();
        if !options.skip_header {
            writeln!(xml, "{}", XML_HEADER)?;
        }
        write_mapping(&mut xml, &options.root_tag, &attributes, 0)?;
        Ok(xml)
    }

    /// Expands the requested associations of `record` into plain data keyed by
    /// association name.
    ///
    /// A related record becomes its attribute snapshot and a sequence becomes
    /// a list of snapshots. An association that cannot be expanded becomes an
    /// empty mapping; that includes declared attributes named in an explicit
    /// list. Naming a field the type does not have at all is an error.
    pub fn expand_includes(record: &Record, include: Option<&Include>) -> Result<Map<String, Value>> {
        let schema = record.schema();
        let names: Vec<&str> = match include {
            None => return Ok(Map::new()),
            Some(Include::All) => schema.associations().iter().map(String::as_str).collect(),
            Some(Include::Only(names)) => {
                if let Some(unknown) = names.iter().find(|n| !schema.accepts(n)) {
                    return Err(PassiveRecordError::unknown_field(record.type_name(), unknown));
                }
                names.iter().map(String::as_str).collect()
            }
        };

        let mut expanded = Map::new();
        for name in names {
            let value = expand_association(record, name).unwrap_or_else(|e| {
                tracing::debug!("Rendering {}.{} as empty: {}", record.type_name(), name, e);
                Value::Object(Map::new())
            });
            expanded.insert(name.to_string(), value);
        }
        Ok(expanded)
    }

    fn resolve(&self, record: &Record, options: RenderOptions) -> ResolvedOptions {
        let merged = options.reverse_merge(&self.defaults);
        ResolvedOptions {
            skip_header: merged.skip_header.unwrap_or(false),
            root_tag: merged
                .root_tag
                .unwrap_or_else(|| naming::tag_name(record.type_name())),
            include: merged.include,
            extra_methods: merged.extra_methods.unwrap_or_default(),
        }
    }
}

impl RecordSerializer for XmlSerializer {
    fn serialize(&self, record: &Record, options: RenderOptions) -> Result<String> {
        self.to_xml(record, options)
    }
}

fn expand_association(
    record: &Record,
    name: &str,
) -> std::result::Result<Value, AssociationExpansionError> {
    match record.get(name) {
        Some(FieldValue::One(related)) => Ok(Value::Object(related.attributes())),
        Some(FieldValue::Many(related)) => Ok(Value::Array(
            related
                .iter()
                .map(|r| Value::Object(r.attributes()))
                .collect(),
        )),
        // An empty list holds no element that could fail.
        Some(FieldValue::Value(Value::Array(items))) if items.is_empty() => {
            Ok(Value::Array(Vec::new()))
        }
        None | Some(FieldValue::Value(Value::Null)) => {
            Err(AssociationExpansionError::Absent(name.to_string()))
        }
        Some(FieldValue::Value(_)) => Err(AssociationExpansionError::NotARecord(name.to_string())),
    }
}

fn write_mapping(xml: &mut String, tag: &str, map: &Map<String, Value>, depth: usize) -> fmt::Result {
    let indent = "  ".repeat(depth);
    if map.is_empty() {
        return writeln!(xml, "{indent}<{tag}/>");
    }

    writeln!(xml, "{indent}<{tag}>")?;
    for (key, value) in map {
        write_element(xml, &naming::tag_name(key), value, depth + 1)?;
    }
    writeln!(xml, "{indent}</{tag}>")
}

fn write_element(xml: &mut String, tag: &str, value: &Value, depth: usize) -> fmt::Result {
    let indent = "  ".repeat(depth);
    match value {
        Value::Null => writeln!(xml, r#"{indent}<{tag} nil="true"/>"#),
        Value::Bool(flag) => writeln!(xml, r#"{indent}<{tag} type="boolean">{flag}</{tag}>"#),
        Value::Number(number) => {
            let kind = if number.is_f64() { "float" } else { "integer" };
            writeln!(xml, r#"{indent}<{tag} type="{kind}">{number}</{tag}>"#)
        }
        Value::String(text) => writeln!(xml, "{indent}<{tag}>{}</{tag}>", xml_escape(text)),
        Value::Array(items) if items.is_empty() => {
            writeln!(xml, r#"{indent}<{tag} type="array"/>"#)
        }
        Value::Array(items) => {
            let element_tag = naming::element_tag_name(tag);
            writeln!(xml, r#"{indent}<{tag} type="array">"#)?;
            for item in items {
                write_element(xml, &element_tag, item, depth + 1)?;
            }
            writeln!(xml, "{indent}</{tag}>")
        }
        Value::Object(map) => write_mapping(xml, tag, map, depth),
    }
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
