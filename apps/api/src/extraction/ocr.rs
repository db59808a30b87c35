//! High-fidelity path: rasterize every page and OCR it with tesseract.

use std::path::{Path, PathBuf};
use std::process::Command;

use super::rasterizer::Rasterizer;
use super::{join_pages, ExtractedDocument, ExtractionError, PreviewImage, MAX_PREVIEW_PAGES};

pub const OCR_DPI: u32 = 200;
/// Tesseract page segmentation mode: a single uniform block of text.
const PAGE_SEGMENTATION_MODE: &str = "6";

/// Wrapper around the `tesseract` command-line OCR engine.
#[derive(Debug, Clone)]
pub struct OcrEngine {
    binary: PathBuf,
}

impl OcrEngine {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn is_available(&self) -> bool {
        let found = Command::new(&self.binary)
            .arg("--version")
            .output()
            .is_ok();
        if !found {
            tracing::debug!(
                "{} not found - install tesseract-ocr for OCR support",
                self.binary.display()
            );
        }
        found
    }

    /// Recognizes the text of one page image.
    pub fn recognize(&self, image: &Path) -> Result<String, ExtractionError> {
        let output = Command::new(&self.binary)
            .arg(image)
            .arg("stdout")
            .arg("--psm")
            .arg(PAGE_SEGMENTATION_MODE)
            .output()
            .map_err(|e| ExtractionError::Tool {
                tool: "tesseract",
                message: format!("failed to run: {e}"),
            })?;

        if !output.status.success() {
            return Err(ExtractionError::Tool {
                tool: "tesseract",
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Renders all pages at `OCR_DPI`, OCRs each one and keeps the first two
/// renders as previews. Any failure aborts the whole path.
pub fn extract_with_ocr(
    pdf: &[u8],
    rasterizer: &Rasterizer,
    engine: &OcrEngine,
) -> Result<ExtractedDocument, ExtractionError> {
    let workdir = tempfile::tempdir()?;
    let pages = rasterizer.render(pdf, OCR_DPI, None, workdir.path())?;
    tracing::info!("Rendered {} pages, starting OCR...", pages.len());

    let mut texts = Vec::with_capacity(pages.len());
    let mut previews = Vec::with_capacity(MAX_PREVIEW_PAGES);

    for (index, page) in pages.into_iter().enumerate() {
        texts.push(engine.recognize(&page.path)?);
        if index < MAX_PREVIEW_PAGES {
            previews.push(PreviewImage {
                page: index as u32 + 1,
                png: page.png,
            });
        }
    }

    Ok(ExtractedDocument::new(join_pages(&texts), previews))
}
