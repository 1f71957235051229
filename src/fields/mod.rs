// Schema-driven field extraction over document text
pub mod extractor;
pub mod record;
pub mod schema;

pub use extractor::extract_fields;
pub use record::{ExtractedRecord, FieldValue};
pub use schema::{FieldSchema, FieldSpec, ValueKind, ValueShape};
