use crate::utils::error::{PassiveRecordError, Result};
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PassiveRecordError::ValidationError {
            message: format!("{} cannot be empty or whitespace-only", field_name),
        });
    }
    Ok(())
}

/// Field identifiers: a letter or underscore followed by letters, digits or
/// underscores.
pub fn validate_identifier(field_name: &str, value: &str) -> Result<()> {
    let mut chars = value.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if !valid {
        return Err(PassiveRecordError::ValidationError {
            message: format!("{} `{}` is not a valid identifier", field_name, value),
        });
    }
    Ok(())
}

/// Returns the first name that appears twice, if any.
pub fn find_duplicate<'a>(names: &'a [String]) -> Option<&'a str> {
    let mut seen = HashSet::new();
    names
        .iter()
        .map(String::as_str)
        .find(|name| !seen.insert(*name))
}
