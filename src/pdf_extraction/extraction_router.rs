// Per-page routing: use the text layer when there is one, OCR the rendered page otherwise
//
// Render and OCR failures are contained here. The page contributes empty text and is
// reported as Degraded so callers can count it; every other error propagates.

use tracing::{debug, warn};

use super::document_analyzer::PageKind;
use super::{OcrEngine, PageSource};
use crate::error::ExtractError;

/// How the text of a page was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMethod {
    TextLayer,
    Ocr,
    /// Rendering or OCR failed; the page contributed no text.
    Degraded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub index: usize,
    pub text: String,
    pub method: PageMethod,
}

pub fn extract_page_text<P, O>(document: &P, index: usize, ocr: &O) -> Result<PageText, ExtractError>
where
    P: PageSource + ?Sized,
    O: OcrEngine + ?Sized,
{
    if index >= document.page_count() {
        return Err(ExtractError::PageOutOfRange {
            index,
            page_count: document.page_count(),
        });
    }

    let view = match document.page_text(index) {
        Ok(text) => text,
        Err(e) if e.is_page_recoverable() => {
            debug!(page = index, error = %e, "text layer unreadable, falling back to OCR");
            String::new()
        }
        Err(e) => return Err(e),
    };

    if PageKind::from_text_view(&view) == PageKind::Text {
        return Ok(PageText {
            index,
            text: view,
            method: PageMethod::TextLayer,
        });
    }

    match ocr_page(document, index, ocr) {
        Ok(text) => {
            debug!(page = index, chars = text.len(), "page recognized with OCR");
            Ok(PageText {
                index,
                text,
                method: PageMethod::Ocr,
            })
        }
        Err(e) if e.is_page_recoverable() => {
            warn!(page = index, error = %e, "OCR fallback failed, page degraded to empty text");
            Ok(PageText {
                index,
                text: String::new(),
                method: PageMethod::Degraded,
            })
        }
        Err(e) => Err(e),
    }
}

fn ocr_page<P, O>(document: &P, index: usize, ocr: &O) -> Result<String, ExtractError>
where
    P: PageSource + ?Sized,
    O: OcrEngine + ?Sized,
{
    let image = document.render_page(index)?;
    ocr.recognize(&image)
}
