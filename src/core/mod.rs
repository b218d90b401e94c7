pub mod document;
pub mod naming;
pub mod record;
pub mod schema;
pub mod serializer;

pub use crate::domain::model::{Include, RenderOptions};
pub use crate::domain::ports::{RecordSerializer, SchemaSource};
pub use crate::utils::error::Result;
