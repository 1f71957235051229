// System PDF renderer using pdftoppm
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use tracing::debug;

use crate::error::ExtractError;

#[derive(Debug, Clone)]
pub struct SystemPdfRenderer {
    binary: PathBuf,
    dpi: u32,
}

impl SystemPdfRenderer {
    pub fn new(binary: impl Into<PathBuf>, dpi: u32) -> Self {
        Self {
            binary: binary.into(),
            dpi,
        }
    }

    /// Whether the pdftoppm binary can be executed at all.
    pub fn is_available(&self) -> bool {
        // pdftoppm -v prints to stderr and exits non-zero on some builds
        Command::new(&self.binary).arg("-v").output().is_ok()
    }

    /// Render one page to an image. `page_number` is 1-based as pdftoppm expects,
    /// `page_index` is only used for error reporting.
    pub fn render_page(
        &self,
        pdf_path: &Path,
        page_number: u32,
        page_index: usize,
    ) -> Result<DynamicImage, ExtractError> {
        let render_err = |reason: String| ExtractError::Render {
            page: page_index,
            reason,
        };

        let temp_dir = TempDir::new().map_err(|e| render_err(e.to_string()))?;
        let output_prefix = temp_dir.path().join("page");
        let page = page_number.to_string();

        debug!(
            path = %pdf_path.display(),
            page = page_index,
            dpi = self.dpi,
            "rendering page with pdftoppm"
        );

        let output = Command::new(&self.binary)
            .arg("-png")
            .arg("-singlefile")
            .args(["-r", &self.dpi.to_string()])
            .args(["-f", &page, "-l", &page])
            .arg(pdf_path)
            .arg(&output_prefix)
            .output()
            .map_err(|e| render_err(format!("{}: {}", self.binary.display(), e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(render_err(format!("pdftoppm failed: {}", stderr.trim())));
        }

        // -singlefile writes <prefix>.png without a page suffix
        let output_file = output_prefix.with_extension("png");
        image::open(&output_file).map_err(|e| render_err(e.to_string()))
    }
}
