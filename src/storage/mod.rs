// Storage layer module
pub mod sqlite_storage;

use std::path::Path;

use crate::error::StorageError;
use crate::fields::{ExtractedRecord, FieldSchema};

pub use sqlite_storage::SqliteSink;

/// Destination for extracted records, one insert per document.
pub trait RecordSink {
    /// Create the backing table for this schema if it does not exist yet.
    fn ensure_table(&mut self, schema: &FieldSchema) -> Result<(), StorageError>;

    /// Store one record. Absent fields are stored as NULL. Returns the row id.
    fn insert(&mut self, source: &Path, record: &ExtractedRecord) -> Result<i64, StorageError>;
}
