// Page batches: planning the partition and running one batch on a worker
use std::ops::Range;
use std::path::Path;
use tracing::debug;

use super::extraction_router::{extract_page_text, PageMethod};
use super::{DocumentLoader, OcrEngine, PageSource};
use crate::error::ExtractError;

/// Contiguous half-open range of page indices handed to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch {
    /// Position of the batch in submission order.
    pub index: usize,
    pub start: usize,
    pub end: usize,
}

impl Batch {
    pub fn pages(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Partition `[0, page_count)` into consecutive batches of
/// `min(max_batch_size, page_count)` pages; the last one may be shorter.
pub fn plan_batches(page_count: usize, max_batch_size: usize) -> Vec<Batch> {
    if page_count == 0 {
        return Vec::new();
    }
    let size = max_batch_size.clamp(1, page_count);

    (0..page_count)
        .step_by(size)
        .enumerate()
        .map(|(index, start)| Batch {
            index,
            start,
            end: (start + size).min(page_count),
        })
        .collect()
}

/// Text of one batch plus which of its pages needed OCR or were lost.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutput {
    pub text: String,
    pub ocr_pages: Vec<usize>,
    pub degraded_pages: Vec<usize>,
}

/// Open the document afresh and extract every page of the batch in order.
pub fn run_batch<L, O>(loader: &L, ocr: &O, path: &Path, batch: Batch) -> Result<BatchOutput, ExtractError>
where
    L: DocumentLoader + ?Sized,
    O: OcrEngine + ?Sized,
{
    let document = loader.open(path)?;
    if batch.end > document.page_count() {
        return Err(ExtractError::PageOutOfRange {
            index: batch.end - 1,
            page_count: document.page_count(),
        });
    }

    let mut output = BatchOutput::default();
    for index in batch.pages() {
        let page = extract_page_text(&document, index, ocr)?;
        match page.method {
            PageMethod::TextLayer => {}
            PageMethod::Ocr => output.ocr_pages.push(index),
            PageMethod::Degraded => output.degraded_pages.push(index),
        }
        output.text.push_str(&page.text);
    }

    debug!(
        batch = batch.index,
        start = batch.start,
        end = batch.end,
        ocr_pages = output.ocr_pages.len(),
        "batch finished"
    );
    Ok(output)
}
