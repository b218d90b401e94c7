use crate::utils::error::{PassiveRecordError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Which associations to expand when rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum Include {
    /// Every declared association, in declaration order.
    All,
    /// Only the named associations, in the given order.
    Only(Vec<String>),
}

impl Include {
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Include::Only(names.into_iter().map(Into::into).collect())
    }
}

impl TryFrom<Value> for Include {
    type Error = PassiveRecordError;

    fn try_from(value: Value) -> Result<Self> {
        match &value {
            Value::String(token) if token == "all" => Ok(Include::All),
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| PassiveRecordError::unsupported_option("include", &value))
                })
                .collect::<Result<Vec<_>>>()
                .map(Include::Only),
            _ => Err(PassiveRecordError::unsupported_option("include", &value)),
        }
    }
}

impl From<Include> for Value {
    fn from(include: Include) -> Self {
        match include {
            Include::All => Value::String("all".to_string()),
            Include::Only(names) => Value::Array(names.into_iter().map(Value::String).collect()),
        }
    }
}

/// Caller-facing render configuration. Every key is optional; unset keys are
/// filled from defaults at render time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderOptions {
    #[serde(default, alias = "skip_instruct", skip_serializing_if = "Option::is_none")]
    pub skip_header: Option<bool>,
    #[serde(default, alias = "root", skip_serializing_if = "Option::is_none")]
    pub root_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Include>,
    #[serde(default, alias = "methods", skip_serializing_if = "Option::is_none")]
    pub extra_methods: Option<Vec<String>>,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip_header(mut self, skip: bool) -> Self {
        self.skip_header = Some(skip);
        self
    }

    pub fn root_tag(mut self, tag: impl Into<String>) -> Self {
        self.root_tag = Some(tag.into());
        self
    }

    pub fn include(mut self, include: Include) -> Self {
        self.include = Some(include);
        self
    }

    pub fn extra_methods<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_methods = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Fills every key left unset here from `defaults`. Keys already set are
    /// never overwritten.
    pub fn reverse_merge(self, defaults: &RenderOptions) -> RenderOptions {
        RenderOptions {
            skip_header: self.skip_header.or(defaults.skip_header),
            root_tag: self.root_tag.or_else(|| defaults.root_tag.clone()),
            include: self.include.or_else(|| defaults.include.clone()),
            extra_methods: self
                .extra_methods
                .or_else(|| defaults.extra_methods.clone()),
        }
    }

    /// Reads options from a loosely typed key/value map. Unrecognized keys are
    /// ignored; recognized keys with the wrong shape are rejected.
    pub fn from_map(map: &Map<String, Value>) -> Result<Self> {
        let mut options = RenderOptions::new();

        for (key, value) in map {
            match key.as_str() {
                "skip_header" | "skip_instruct" => {
                    let skip = value
                        .as_bool()
                        .ok_or_else(|| PassiveRecordError::unsupported_option(key, value))?;
                    options.skip_header = Some(skip);
                }
                "root_tag" | "root" => {
                    let tag = value
                        .as_str()
                        .ok_or_else(|| PassiveRecordError::unsupported_option(key, value))?;
                    options.root_tag = Some(tag.to_string());
                }
                "include" => {
                    if !value.is_null() {
                        options.include = Some(Include::try_from(value.clone())?);
                    }
                }
                "extra_methods" | "methods" => {
                    let names = value
                        .as_array()
                        .and_then(|items| {
                            items
                                .iter()
                                .map(|item| item.as_str().map(str::to_string))
                                .collect::<Option<Vec<_>>>()
                        })
                        .ok_or_else(|| PassiveRecordError::unsupported_option(key, value))?;
                    options.extra_methods = Some(names);
                }
                other => tracing::trace!("Ignoring unrecognized render option `{}`", other),
            }
        }

        Ok(options)
    }
}
