// lopdf helper - Pure Rust PDF loading and per-page text layer
use image::DynamicImage;
use lopdf::Document;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::system_renderer::SystemPdfRenderer;
use super::{DocumentLoader, PageSource};
use crate::error::ExtractError;

/// Load a PDF document using lopdf
pub fn load_pdf(path: &Path) -> Result<Document, ExtractError> {
    Document::load(path).map_err(|e| ExtractError::Open {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Opens documents with lopdf and rasterizes through the system renderer.
#[derive(Debug, Clone)]
pub struct LopdfLoader {
    renderer: SystemPdfRenderer,
}

impl LopdfLoader {
    pub fn new(renderer: SystemPdfRenderer) -> Self {
        Self { renderer }
    }
}

impl DocumentLoader for LopdfLoader {
    type Document = LopdfDocument;

    fn open(&self, path: &Path) -> Result<LopdfDocument, ExtractError> {
        let document = load_pdf(path)?;
        // get_pages is keyed by 1-based page number in document order
        let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
        debug!(path = %path.display(), pages = page_numbers.len(), "opened document");

        Ok(LopdfDocument {
            path: path.to_path_buf(),
            document,
            page_numbers,
            renderer: self.renderer.clone(),
        })
    }
}

pub struct LopdfDocument {
    path: PathBuf,
    document: Document,
    page_numbers: Vec<u32>,
    renderer: SystemPdfRenderer,
}

impl LopdfDocument {
    fn page_number(&self, index: usize) -> Result<u32, ExtractError> {
        self.page_numbers
            .get(index)
            .copied()
            .ok_or(ExtractError::PageOutOfRange {
                index,
                page_count: self.page_numbers.len(),
            })
    }
}

impl PageSource for LopdfDocument {
    fn page_count(&self) -> usize {
        self.page_numbers.len()
    }

    fn page_text(&self, index: usize) -> Result<String, ExtractError> {
        let number = self.page_number(index)?;
        self.document
            .extract_text(&[number])
            .map_err(|e| ExtractError::TextLayer {
                page: index,
                reason: e.to_string(),
            })
    }

    fn render_page(&self, index: usize) -> Result<DynamicImage, ExtractError> {
        let number = self.page_number(index)?;
        self.renderer.render_page(&self.path, number, index)
    }
}
