// Conductor - splits a document into page batches, runs them on a bounded worker
// pool and stitches the text back together in page order
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::batch::{plan_batches, run_batch, BatchOutput};
use super::{DocumentLoader, OcrEngine, PageSource};
use crate::error::ExtractError;

pub const DEFAULT_WORKERS: usize = 20;
pub const DEFAULT_MAX_BATCH_SIZE: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionOptions {
    /// Batches allowed to run at the same time.
    pub workers: usize,
    pub max_batch_size: usize,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }
}

/// Full text of a document in page order, with per-page bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentText {
    pub text: String,
    pub page_count: usize,
    pub ocr_pages: Vec<usize>,
    /// Pages whose render or OCR failed and contributed no text.
    pub degraded_pages: Vec<usize>,
}

impl DocumentText {
    pub fn is_degraded(&self) -> bool {
        !self.degraded_pages.is_empty()
    }

    fn from_batches(page_count: usize, outputs: Vec<BatchOutput>) -> Self {
        let mut document = DocumentText {
            page_count,
            ..Default::default()
        };
        for output in outputs {
            document.text.push_str(&output.text);
            document.ocr_pages.extend(output.ocr_pages);
            document.degraded_pages.extend(output.degraded_pages);
        }
        document
    }
}

pub struct ParallelExtractor<L, O> {
    loader: Arc<L>,
    ocr: Arc<O>,
    options: ExtractionOptions,
}

impl<L, O> Clone for ParallelExtractor<L, O> {
    fn clone(&self) -> Self {
        Self {
            loader: Arc::clone(&self.loader),
            ocr: Arc::clone(&self.ocr),
            options: self.options,
        }
    }
}

impl<L: DocumentLoader, O: OcrEngine> ParallelExtractor<L, O> {
    pub fn new(loader: L, ocr: O, options: ExtractionOptions) -> Self {
        Self::from_shared(Arc::new(loader), Arc::new(ocr), options)
    }

    pub fn from_shared(loader: Arc<L>, ocr: Arc<O>, options: ExtractionOptions) -> Self {
        Self {
            loader,
            ocr,
            options: ExtractionOptions {
                workers: options.workers.max(1),
                max_batch_size: options.max_batch_size.max(1),
            },
        }
    }

    /// Extract the whole document. Fails if the document cannot be opened or any
    /// batch fails; there is no partial result.
    pub async fn extract_document_text(&self, path: &Path) -> Result<DocumentText, ExtractError> {
        let path: Arc<PathBuf> = Arc::new(path.to_path_buf());

        let page_count = {
            let loader = Arc::clone(&self.loader);
            let path = Arc::clone(&path);
            tokio::task::spawn_blocking(move || loader.open(&path).map(|doc| doc.page_count()))
                .await
                .map_err(|e| ExtractError::Worker(e.to_string()))??
        };

        let batches = plan_batches(page_count, self.options.max_batch_size);
        info!(
            path = %path.display(),
            pages = page_count,
            batches = batches.len(),
            workers = self.options.workers,
            "extracting document text"
        );

        let semaphore = Arc::new(Semaphore::new(self.options.workers));
        let mut tasks = JoinSet::new();

        for batch in batches.iter().copied() {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| ExtractError::Worker(e.to_string()))?;
            let loader = Arc::clone(&self.loader);
            let ocr = Arc::clone(&self.ocr);
            let path = Arc::clone(&path);

            tasks.spawn_blocking(move || {
                let _permit = permit;
                (batch.index, run_batch(loader.as_ref(), ocr.as_ref(), &path, batch))
            });
        }

        // Completion order is arbitrary; slot results back by batch index.
        // Blocking tasks can't be aborted; drain them all before reporting a failure.
        let mut slots: Vec<Option<BatchOutput>> = vec![None; batches.len()];
        let mut failure: Option<ExtractError> = None;
        while let Some(joined) = tasks.join_next().await {
            let outcome = joined
                .map_err(|e| ExtractError::Worker(e.to_string()))
                .and_then(|(index, result)| {
                    debug!(batch = index, ok = result.is_ok(), "batch joined");
                    result.map(|output| (index, output))
                });
            match outcome {
                Ok((index, output)) => slots[index] = Some(output),
                Err(e) if failure.is_none() => {
                    warn!(path = %path.display(), error = %e, "batch failed, waiting for the rest");
                    failure = Some(e);
                }
                Err(e) => debug!(error = %e, "further batch failure"),
            }
        }
        if let Some(e) = failure {
            return Err(e);
        }

        let outputs = slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| ExtractError::Worker(format!("batch {} produced no result", index)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DocumentText::from_batches(page_count, outputs))
    }
}
