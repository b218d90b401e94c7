use thiserror::Error;

#[derive(Error, Debug)]
pub enum PassiveRecordError {
    #[error("Unknown field `{field}` for type {type_name}")]
    UnknownField { type_name: String, field: String },

    #[error("Field `{field}` on type {type_name} is reserved")]
    ReservedField { type_name: String, field: String },

    #[error("Field `{field}` is declared more than once on type {type_name}")]
    DuplicateField { type_name: String, field: String },

    #[error("Field `{field}` on type {type_name} is already declared in another category")]
    FieldCollision { type_name: String, field: String },

    #[error("Unsupported value for option `{option}`: {value}")]
    UnsupportedOptionValue { option: String, value: String },

    #[error("Unknown method `{method}` for type {type_name}")]
    UnknownMethod { type_name: String, method: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Formatting error: {0}")]
    FormatError(#[from] std::fmt::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

impl PassiveRecordError {
    pub(crate) fn unknown_field(type_name: &str, field: &str) -> Self {
        Self::UnknownField {
            type_name: type_name.to_string(),
            field: field.to_string(),
        }
    }

    pub(crate) fn unsupported_option(option: &str, value: &serde_json::Value) -> Self {
        Self::UnsupportedOptionValue {
            option: option.to_string(),
            value: value.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PassiveRecordError>;
