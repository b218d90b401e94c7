use crate::core::record::Record;
use crate::core::schema::SchemaRegistry;
use crate::domain::model::RenderOptions;
use crate::utils::error::Result;

/// Renders a record into a document.
pub trait RecordSerializer {
    fn serialize(&self, record: &Record, options: RenderOptions) -> Result<String>;
}

/// Anything that can populate a registry with type declarations.
pub trait SchemaSource {
    fn register(&self, registry: &mut SchemaRegistry) -> Result<()>;
}
