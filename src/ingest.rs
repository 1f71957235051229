// Ingestion driver: enumerate PDFs, extract text, match fields, store one row per document
use anyhow::{Context, Result};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::fields::{extract_fields, FieldSchema};
use crate::pdf_extraction::{DocumentLoader, OcrEngine, ParallelExtractor};
use crate::storage::RecordSink;

/// `*.pdf` files directly inside `dir` (case-insensitive extension), sorted by name.
pub fn discover_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).with_context(|| format!("cannot read directory {}", dir.display()))?;

    let mut pdfs = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if is_pdf && path.is_file() {
            pdfs.push(path);
        }
    }
    pdfs.sort();
    Ok(pdfs)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOutcome {
    Processed { row_id: i64, fields_matched: usize },
    /// Stored, but some pages lost their text to render/OCR failures.
    Degraded {
        row_id: i64,
        fields_matched: usize,
        pages: Vec<usize>,
    },
    /// Extraction failed; nothing was stored.
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentReport {
    pub path: PathBuf,
    pub outcome: DocumentOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub documents: Vec<DocumentReport>,
}

impl IngestReport {
    pub fn processed(&self) -> usize {
        self.count(|o| matches!(o, DocumentOutcome::Processed { .. }))
    }

    pub fn degraded(&self) -> usize {
        self.count(|o| matches!(o, DocumentOutcome::Degraded { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, DocumentOutcome::Skipped { .. }))
    }

    fn count(&self, pred: impl Fn(&DocumentOutcome) -> bool) -> usize {
        self.documents.iter().filter(|d| pred(&d.outcome)).count()
    }
}

impl fmt::Display for IngestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for doc in &self.documents {
            let name = doc.path.display();
            match &doc.outcome {
                DocumentOutcome::Processed { row_id, fields_matched } => {
                    writeln!(f, "✅ {} -> row {} ({} fields)", name, row_id, fields_matched)?
                }
                DocumentOutcome::Degraded {
                    row_id,
                    fields_matched,
                    pages,
                } => writeln!(
                    f,
                    "⚠️  {} -> row {} ({} fields, {} degraded pages: {:?})",
                    name,
                    row_id,
                    fields_matched,
                    pages.len(),
                    pages
                )?,
                DocumentOutcome::Skipped { reason } => writeln!(f, "❌ {} skipped: {}", name, reason)?,
            }
        }
        write!(
            f,
            "{} processed, {} with degraded pages, {} skipped",
            self.processed(),
            self.degraded(),
            self.skipped()
        )
    }
}

/// Runs documents through extraction and into the sink, one document at a time.
pub struct IngestDriver<L, O, S> {
    extractor: ParallelExtractor<L, O>,
    schema: Arc<FieldSchema>,
    sink: S,
}

impl<L, O, S> IngestDriver<L, O, S>
where
    L: DocumentLoader,
    O: OcrEngine,
    S: RecordSink,
{
    /// Prepares the sink's table for the schema up front.
    pub fn new(extractor: ParallelExtractor<L, O>, schema: Arc<FieldSchema>, mut sink: S) -> Result<Self> {
        sink.ensure_table(&schema).context("cannot prepare record table")?;
        Ok(Self {
            extractor,
            schema,
            sink,
        })
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Extraction failures skip the document; sink failures abort the run.
    pub async fn ingest_document(&mut self, path: &Path) -> Result<DocumentOutcome> {
        let document = match self.extractor.extract_document_text(path).await {
            Ok(document) => document,
            Err(e) => {
                error!(path = %path.display(), error = %e, "document skipped");
                return Ok(DocumentOutcome::Skipped { reason: e.to_string() });
            }
        };

        let record = extract_fields(&document.text, &self.schema);
        let fields_matched = record.matched_count();
        let row_id = self
            .sink
            .insert(path, &record)
            .with_context(|| format!("cannot store record for {}", path.display()))?;

        let outcome = if document.is_degraded() {
            warn!(
                path = %path.display(),
                row_id,
                degraded_pages = ?document.degraded_pages,
                "document processed with degraded pages"
            );
            DocumentOutcome::Degraded {
                row_id,
                fields_matched,
                pages: document.degraded_pages,
            }
        } else {
            info!(
                path = %path.display(),
                row_id,
                fields_matched,
                ocr_pages = document.ocr_pages.len(),
                "document processed"
            );
            DocumentOutcome::Processed { row_id, fields_matched }
        };
        Ok(outcome)
    }

    pub async fn ingest_paths(&mut self, paths: &[PathBuf]) -> Result<IngestReport> {
        let mut report = IngestReport::default();
        for path in paths {
            let outcome = self.ingest_document(path).await?;
            report.documents.push(DocumentReport {
                path: path.clone(),
                outcome,
            });
        }
        Ok(report)
    }

    pub async fn ingest_dir(&mut self, dir: &Path) -> Result<IngestReport> {
        let paths = discover_pdfs(dir)?;
        info!(dir = %dir.display(), documents = paths.len(), "starting ingest");
        self.ingest_paths(&paths).await
    }
}
