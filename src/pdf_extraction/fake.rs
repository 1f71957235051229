// In-memory documents and OCR for unit tests
use image::{DynamicImage, GrayImage, Luma};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::{DocumentLoader, OcrEngine, PageSource};
use crate::error::ExtractError;

#[derive(Debug, Clone)]
pub struct FakePage {
    /// None models a text layer that fails to decode.
    layer: Option<String>,
    ocr: String,
    render_fails: bool,
    /// Reading the page fails with an error that is not page-recoverable.
    fatal: bool,
    delay: Duration,
}

impl FakePage {
    pub fn text(text: &str) -> Self {
        Self {
            layer: Some(text.to_string()),
            ocr: String::new(),
            render_fails: false,
            fatal: false,
            delay: Duration::ZERO,
        }
    }

    pub fn scanned(ocr: &str) -> Self {
        Self::text("").with_ocr(ocr)
    }

    pub fn broken_layer() -> Self {
        Self {
            layer: None,
            ..Self::text("")
        }
    }

    pub fn fatal() -> Self {
        Self {
            fatal: true,
            ..Self::text("")
        }
    }

    pub fn with_ocr(mut self, ocr: &str) -> Self {
        self.ocr = ocr.to_string();
        self
    }

    pub fn failing_render(mut self) -> Self {
        self.render_fails = true;
        self
    }

    pub fn with_delay(mut self, millis: u64) -> Self {
        self.delay = Duration::from_millis(millis);
        self
    }
}

#[derive(Debug, Clone)]
pub struct FakeDocument {
    pages: Vec<FakePage>,
    /// Successful text reads, shared by every clone handed out by a loader.
    reads: Arc<AtomicUsize>,
}

impl FakeDocument {
    pub fn new(pages: Vec<FakePage>) -> Self {
        Self {
            pages,
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn page(&self, index: usize) -> Result<&FakePage, ExtractError> {
        self.pages.get(index).ok_or(ExtractError::PageOutOfRange {
            index,
            page_count: self.pages.len(),
        })
    }
}

impl PageSource for FakeDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, index: usize) -> Result<String, ExtractError> {
        let page = self.page(index)?;
        if !page.delay.is_zero() {
            std::thread::sleep(page.delay);
        }
        if page.fatal {
            return Err(ExtractError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk read failed",
            )));
        }
        let text = page.layer.clone().ok_or(ExtractError::TextLayer {
            page: index,
            reason: "undecodable font".into(),
        })?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(text)
    }

    fn render_page(&self, index: usize) -> Result<DynamicImage, ExtractError> {
        let page = self.page(index)?;
        if page.render_fails {
            return Err(ExtractError::Render {
                page: index,
                reason: "renderer crashed".into(),
            });
        }
        Ok(encode_text_image(&page.ocr))
    }
}

/// The OCR text travels inside the image: one byte per pixel after a marker pixel.
fn encode_text_image(text: &str) -> DynamicImage {
    let bytes = text.as_bytes();
    let mut image = GrayImage::new(bytes.len() as u32 + 1, 1);
    image.put_pixel(0, 0, Luma([255]));
    for (x, byte) in bytes.iter().enumerate() {
        image.put_pixel(x as u32 + 1, 0, Luma([*byte]));
    }
    DynamicImage::ImageLuma8(image)
}

fn decode_text_image(image: &DynamicImage) -> String {
    let gray = image.to_luma8();
    let bytes: Vec<u8> = gray.pixels().skip(1).map(|p| p.0[0]).collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

#[derive(Debug, Default)]
pub struct FakeOcr {
    fail: bool,
    calls: AtomicUsize,
}

impl FakeOcr {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OcrEngine for FakeOcr {
    fn recognize(&self, image: &DynamicImage) -> Result<String, ExtractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ExtractError::Ocr("engine unavailable".into()));
        }
        Ok(decode_text_image(image))
    }
}

#[derive(Debug, Default)]
pub struct FakeLoader {
    documents: HashMap<PathBuf, FakeDocument>,
    opens: AtomicUsize,
    /// Opens beyond this count fail, to simulate a file vanishing mid-run.
    max_opens: Option<usize>,
}

impl FakeLoader {
    pub fn with_document(mut self, path: &str, pages: Vec<FakePage>) -> Self {
        self.documents.insert(PathBuf::from(path), FakeDocument::new(pages));
        self
    }

    pub fn with_max_opens(mut self, max_opens: usize) -> Self {
        self.max_opens = Some(max_opens);
        self
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Pages whose text layer was read successfully, across all documents.
    pub fn pages_read(&self) -> usize {
        self.documents
            .values()
            .map(|d| d.reads.load(Ordering::SeqCst))
            .sum()
    }
}

impl DocumentLoader for FakeLoader {
    type Document = FakeDocument;

    fn open(&self, path: &Path) -> Result<FakeDocument, ExtractError> {
        let count = self.opens.fetch_add(1, Ordering::SeqCst) + 1;
        if self.max_opens.is_some_and(|max| count > max) {
            return Err(ExtractError::Open {
                path: path.to_path_buf(),
                reason: "file disappeared".into(),
            });
        }
        self.documents
            .get(path)
            .cloned()
            .ok_or_else(|| ExtractError::Open {
                path: path.to_path_buf(),
                reason: "not a PDF".into(),
            })
    }
}

/// Pages whose text names their own index, e.g. `<p007>\n`.
pub fn numbered_pages(count: usize) -> Vec<FakePage> {
    (0..count)
        .map(|i| {
            let text = format!("<p{:03}>\n", i);
            if i % 3 == 2 {
                FakePage::scanned(&text)
            } else {
                FakePage::text(&text)
            }
        })
        .collect()
}
