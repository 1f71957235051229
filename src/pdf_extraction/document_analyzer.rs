// Page classification: text layer vs. needs OCR
use super::PageSource;
use crate::error::ExtractError;

/// How a page has to be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Text,
    NeedsOcr,
}

impl PageKind {
    pub fn from_text_view(text: &str) -> Self {
        if has_text_layer(text) {
            PageKind::Text
        } else {
            PageKind::NeedsOcr
        }
    }
}

/// A text view counts as a text layer once it holds anything but whitespace.
pub fn has_text_layer(text: &str) -> bool {
    !text.trim().is_empty()
}

/// Standalone form of the check `extract_page_text` makes on the text view it has already read.
pub fn is_text_page<P: PageSource + ?Sized>(document: &P, index: usize) -> Result<bool, ExtractError> {
    Ok(has_text_layer(&document.page_text(index)?))
}
