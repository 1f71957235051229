// OCR engine backed by the tesseract CLI
use image::{DynamicImage, ImageFormat};
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

use super::OcrEngine;
use crate::error::ExtractError;

#[derive(Debug, Clone)]
pub struct TesseractOcr {
    binary: PathBuf,
    language: String,
}

impl TesseractOcr {
    pub fn new(binary: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            language: language.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, image: &DynamicImage) -> Result<String, ExtractError> {
        let input = tempfile::Builder::new()
            .prefix("wellstim-page")
            .suffix(".png")
            .tempfile()
            .map_err(|e| ExtractError::Ocr(format!("cannot create page image file: {}", e)))?;
        image
            .save_with_format(input.path(), ImageFormat::Png)
            .map_err(|e| ExtractError::Ocr(format!("cannot write page image: {}", e)))?;

        debug!(
            width = image.width(),
            height = image.height(),
            language = %self.language,
            "running tesseract"
        );

        let output = Command::new(&self.binary)
            .arg(input.path())
            .arg("stdout")
            .args(["-l", &self.language])
            .output()
            .map_err(|e| ExtractError::Ocr(format!("{}: {}", self.binary.display(), e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::Ocr(format!("tesseract failed: {}", stderr.trim())));
        }

        // tesseract terminates each page with a form feed
        Ok(String::from_utf8_lossy(&output.stdout).replace('\u{c}', ""))
    }
}
