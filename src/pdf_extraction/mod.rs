// PDF extraction module: page text with OCR fallback, batched across a worker pool
pub mod batch;
pub mod conductor;
pub mod document_analyzer;
pub mod extraction_router;
pub mod lopdf_helper;
pub mod ocr_engine;
pub mod system_renderer;

#[cfg(test)]
pub(crate) mod fake;

use image::DynamicImage;
use std::path::Path;

use crate::error::ExtractError;

pub use batch::{plan_batches, run_batch, Batch, BatchOutput};
pub use conductor::{DocumentText, ExtractionOptions, ParallelExtractor};
pub use document_analyzer::{has_text_layer, is_text_page, PageKind};
pub use extraction_router::{extract_page_text, PageMethod, PageText};
pub use lopdf_helper::{LopdfDocument, LopdfLoader};
pub use ocr_engine::TesseractOcr;
pub use system_renderer::SystemPdfRenderer;

/// One opened document. Pages are addressed by 0-based index.
pub trait PageSource {
    fn page_count(&self) -> usize;

    /// The machine-readable text view of a page. Empty when the page has no text layer.
    fn page_text(&self, index: usize) -> Result<String, ExtractError>;

    /// Rasterize a page. Produced on demand and never cached.
    fn render_page(&self, index: usize) -> Result<DynamicImage, ExtractError>;
}

/// Opens documents. Each batch worker calls `open` itself, so handles are never
/// shared between threads.
pub trait DocumentLoader: Send + Sync + 'static {
    type Document: PageSource;

    fn open(&self, path: &Path) -> Result<Self::Document, ExtractError>;
}

pub trait OcrEngine: Send + Sync + 'static {
    /// Recognize text in a page image. Finding nothing is `Ok(String::new())`.
    fn recognize(&self, image: &DynamicImage) -> Result<String, ExtractError>;
}
