use anyhow::Result;
use passive_record::domain::ports::RecordSerializer;
use passive_record::utils::validation::Validate;
use passive_record::{Include, RecordDocument, RenderOptions, SchemaConfig};
use tempfile::TempDir;

const SCHEMA: &str = r#"
[render]
include = "all"

[types.Person]
attributes = ["id", "first_name", "last_name"]
associations = ["addresses", "employer"]

[types.Address]
attributes = ["street", "city"]

[types.Company]
attributes = ["title"]
"#;

const RECORD: &str = r#"{
    "type": "Person",
    "fields": {
        "id": 1,
        "first_name": "Dima",
        "last_name": "Dozen",
        "addresses": [
            {"type": "Address", "fields": {"street": "1 Main St", "city": "Oslo"}},
            {"type": "Address", "fields": {"street": "2 Side Rd", "city": "Bergen"}}
        ],
        "employer": "Acme"
    }
}"#;

#[test]
fn test_end_to_end_render_from_files() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let schema_path = temp_dir.path().join("schema.toml");
    let record_path = temp_dir.path().join("person.json");
    std::fs::write(&schema_path, SCHEMA)?;
    std::fs::write(&record_path, RECORD)?;

    let config = SchemaConfig::from_file(&schema_path)?;
    config.validate()?;
    let registry = config.registry()?;
    let record = RecordDocument::from_file(&record_path)?.into_record(&registry)?;

    let xml = config.serializer().serialize(&record, RenderOptions::new())?;

    let expected = concat!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
        "<person>\n",
        "  <id type=\"integer\">1</id>\n",
        "  <first-name>Dima</first-name>\n",
        "  <last-name>Dozen</last-name>\n",
        "  <addresses type=\"array\">\n",
        "    <address>\n",
        "      <street>1 Main St</street>\n",
        "      <city>Oslo</city>\n",
        "    </address>\n",
        "    <address>\n",
        "      <street>2 Side Rd</street>\n",
        "      <city>Bergen</city>\n",
        "    </address>\n",
        "  </addresses>\n",
        "  <employer/>\n",
        "</person>\n",
    );
    assert_eq!(xml, expected);
    Ok(())
}

#[test]
fn test_caller_options_override_configured_defaults() -> Result<()> {
    let config = SchemaConfig::from_toml_str(SCHEMA)?;
    let registry = config.registry()?;
    let record = RecordDocument::from_json_str(RECORD)?.into_record(&registry)?;

    let xml = config.serializer().serialize(
        &record,
        RenderOptions::new()
            .skip_header(true)
            .include(Include::only(Vec::<String>::new())),
    )?;

    assert!(xml.starts_with("<person>\n"));
    assert!(!xml.contains("addresses"));
    assert!(!xml.contains("employer"));
    Ok(())
}

#[test]
fn test_unknown_field_in_document_fails() -> Result<()> {
    let config = SchemaConfig::from_toml_str(SCHEMA)?;
    let registry = config.registry()?;

    let result = RecordDocument::from_json_str(r#"{"type": "Person", "fields": {"age": 3}}"#)?
        .into_record(&registry);

    assert!(result.is_err());
    Ok(())
}
