//! wellstim - pull well stimulation records out of scanned and digital PDFs.
//!
//! Pages are read from the PDF text layer, or rendered and OCR'd when a page has
//! none, in parallel batches. The document text is then matched against a schema
//! of label variants and the resulting record is stored as one SQLite row.

pub mod config;
pub mod error;
pub mod fields;
pub mod ingest;
pub mod pdf_extraction;
pub mod storage;

pub use config::IngestConfig;
pub use error::{ConfigError, ExtractError, SchemaError, StorageError};
pub use fields::{extract_fields, ExtractedRecord, FieldSchema};
pub use ingest::{discover_pdfs, DocumentOutcome, IngestDriver, IngestReport};
pub use pdf_extraction::{DocumentText, ExtractionOptions, ParallelExtractor};
