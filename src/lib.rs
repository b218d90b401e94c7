pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::toml_config::SchemaConfig;
pub use core::{
    document::RecordDocument,
    record::{FieldValue, Record},
    schema::{Schema, SchemaRegistry},
    serializer::XmlSerializer,
};
pub use domain::model::{Include, RenderOptions};
pub use utils::error::{PassiveRecordError, Result};
