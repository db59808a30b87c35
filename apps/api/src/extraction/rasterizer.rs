use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::ExtractionError;

/// Wrapper around poppler's `pdftoppm`, which renders PDF pages to PNG.
#[derive(Debug, Clone)]
pub struct Rasterizer {
    binary: PathBuf,
}

/// One rendered page, already read back into memory.
pub struct RenderedPage {
    pub path: PathBuf,
    pub png: Vec<u8>,
}

impl Rasterizer {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// True when the binary can be spawned at all.
    pub fn is_available(&self) -> bool {
        let found = Command::new(&self.binary).arg("-v").output().is_ok();
        if !found {
            tracing::debug!(
                "{} not found - install poppler-utils for OCR and previews",
                self.binary.display()
            );
        }
        found
    }

    /// Renders pages of `pdf` at `dpi` into `workdir`, in page order.
    ///
    /// `pages` limits rendering to an inclusive 1-based range.
    pub fn render(
        &self,
        pdf: &[u8],
        dpi: u32,
        pages: Option<(u32, u32)>,
        workdir: &Path,
    ) -> Result<Vec<RenderedPage>, ExtractionError> {
        let input = workdir.join("input.pdf");
        std::fs::File::create(&input)?.write_all(pdf)?;

        let prefix = workdir.join("page");
        let mut command = Command::new(&self.binary);
        command.arg("-png").arg("-r").arg(dpi.to_string());
        if let Some((first, last)) = pages {
            command
                .arg("-f")
                .arg(first.to_string())
                .arg("-l")
                .arg(last.to_string());
        }
        let output = command
            .arg(&input)
            .arg(&prefix)
            .output()
            .map_err(|e| ExtractionError::Tool {
                tool: "pdftoppm",
                message: format!("failed to run: {e}"),
            })?;

        if !output.status.success() {
            return Err(ExtractionError::Tool {
                tool: "pdftoppm",
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        // pdftoppm zero-pads page numbers, so lexical order is page order.
        let mut images: Vec<PathBuf> = std::fs::read_dir(workdir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "png"))
            .collect();
        images.sort();

        if images.is_empty() {
            return Err(ExtractionError::Tool {
                tool: "pdftoppm",
                message: "produced no images".to_string(),
            });
        }

        images
            .into_iter()
            .map(|path| {
                let png = std::fs::read(&path)?;
                Ok(RenderedPage { path, png })
            })
            .collect()
    }
}
