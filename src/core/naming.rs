//! Conversion from schema identifiers and type names to document tags.
//!
//! Identifiers are first brought to underscore form (`LineItem` ->
//! `line_item`, `firstName` -> `first_name`), then underscores become dashes
//! for output (`line-item`, `first-name`).

use regex::Regex;
use std::sync::LazyLock;

static ACRONYM_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z\d]+)([A-Z][a-z])").unwrap());
static WORD_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z\d])([A-Z])").unwrap());

pub fn underscore(name: &str) -> String {
    let name = name.replace("::", "_");
    let name = ACRONYM_BOUNDARY.replace_all(&name, "${1}_${2}");
    let name = WORD_BOUNDARY.replace_all(&name, "${1}_${2}");
    name.replace(['-', ' '], "_").to_lowercase()
}

pub fn dasherize(name: &str) -> String {
    name.replace('_', "-")
}

/// Tag used for a field, method or type name in rendered output.
pub fn tag_name(name: &str) -> String {
    dasherize(&underscore(name))
}

/// Tag used for each element inside a sequence wrapper.
pub fn element_tag_name(name: &str) -> String {
    dasherize(&singularize(&underscore(name)))
}

const IRREGULAR_PLURALS: [(&str, &str); 8] = [
    ("children", "child"),
    ("people", "person"),
    ("men", "man"),
    ("women", "woman"),
    ("mice", "mouse"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("geese", "goose"),
];

/// Singular form of an underscored word, applied to its last segment
/// (`phone_numbers` -> `phone_number`, `step_children` -> `step_child`).
///
/// Irregular plurals come from a small table. Words already ending in `us`,
/// `ss` or `is` (`status`, `class`, `analysis`) are left alone. Anything the
/// rules do not cover is returned unchanged or with a trailing `s` dropped.
pub fn singularize(word: &str) -> String {
    let (prefix, last) = match word.rfind('_') {
        Some(at) => word.split_at(at + 1),
        None => ("", word),
    };
    format!("{}{}", prefix, singularize_word(last))
}

fn singularize_word(word: &str) -> String {
    if let Some((_, singular)) = IRREGULAR_PLURALS.iter().find(|(plural, _)| *plural == word) {
        return singular.to_string();
    }
    if ["us", "ss", "is"].iter().any(|suffix| word.ends_with(suffix)) {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{}y", stem);
        }
    }
    for suffix in ["uses", "sses", "ches", "shes", "xes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if word.len() > 1 && word.ends_with('s') {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_underscore() {
        assert_eq!(underscore("Person"), "person");
        assert_eq!(underscore("LineItem"), "line_item");
        assert_eq!(underscore("HTMLParser"), "html_parser");
        assert_eq!(underscore("firstName"), "first_name");
        assert_eq!(underscore("first_name"), "first_name");
        assert_eq!(underscore("Billing::Address"), "billing_address");
    }

    #[test]
    fn test_tag_name() {
        assert_eq!(tag_name("postal_code"), "postal-code");
        assert_eq!(tag_name("PhoneNumber"), "phone-number");
        assert_eq!(tag_name("id"), "id");
    }

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("children"), "child");
        assert_eq!(singularize("step_children"), "step_child");
        assert_eq!(singularize("people"), "person");
        assert_eq!(singularize("status"), "status");
        assert_eq!(singularize("statuses"), "status");
        assert_eq!(singularize("bus"), "bus");
        assert_eq!(singularize("buses"), "bus");
        assert_eq!(singularize("analysis"), "analysis");
        assert_eq!(singularize("names"), "name");
        assert_eq!(singularize("addresses"), "address");
        assert_eq!(singularize("categories"), "category");
        assert_eq!(singularize("boxes"), "box");
        assert_eq!(singularize("branches"), "branch");
        assert_eq!(singularize("class"), "class");
        assert_eq!(element_tag_name("phone_numbers"), "phone-number");
    }
}
