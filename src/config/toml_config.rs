use crate::core::schema::SchemaRegistry;
use crate::core::serializer::XmlSerializer;
use crate::domain::model::RenderOptions;
use crate::domain::ports::SchemaSource;
use crate::utils::error::{PassiveRecordError, Result};
use crate::utils::validation::{find_duplicate, validate_identifier, validate_non_empty_string, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Type declarations and render defaults read from TOML.
///
/// ```toml
/// [render]
/// include = "all"
///
/// [types.Person]
/// attributes = ["id", "first_name"]
/// associations = ["addresses"]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaConfig {
    #[serde(default)]
    pub render: RenderOptions,
    #[serde(default)]
    pub types: BTreeMap<String, TypeConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeConfig {
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub associations: Vec<String>,
}

impl SchemaConfig {
    /// Loads the configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PassiveRecordError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parses the configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| PassiveRecordError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Checks type and field names before anything is registered.
    pub fn validate_config(&self) -> Result<()> {
        for (type_name, declared) in &self.types {
            validate_non_empty_string("type name", type_name)?;

            let mut all_names = declared.attributes.clone();
            all_names.extend(declared.associations.iter().cloned());
            for name in &all_names {
                validate_identifier(&format!("types.{}", type_name), name)?;
            }
            if let Some(duplicate) = find_duplicate(&all_names) {
                return Err(PassiveRecordError::ValidationError {
                    message: format!(
                        "types.{} declares `{}` more than once",
                        type_name, duplicate
                    ),
                });
            }
        }

        if let Some(root_tag) = &self.render.root_tag {
            validate_non_empty_string("render.root_tag", root_tag)?;
        }
        Ok(())
    }

    /// Registry holding every configured type.
    pub fn registry(&self) -> Result<SchemaRegistry> {
        let mut registry = SchemaRegistry::new();
        self.register(&mut registry)?;
        Ok(registry)
    }

    /// Serializer using the configured render defaults.
    pub fn serializer(&self) -> XmlSerializer {
        XmlSerializer::with_defaults(self.render.clone())
    }
}

impl SchemaSource for SchemaConfig {
    fn register(&self, registry: &mut SchemaRegistry) -> Result<()> {
        for (type_name, declared) in &self.types {
            registry.declare_attributes(type_name, declared.attributes.iter().cloned())?;
            registry.declare_associations(type_name, declared.associations.iter().cloned())?;
        }
        tracing::debug!("Registered {} types from configuration", self.types.len());
        Ok(())
    }
}

impl Validate for SchemaConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
