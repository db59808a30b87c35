//! Fallback path: read the embedded text layer page by page.

use super::rasterizer::Rasterizer;
use super::{join_pages, ExtractedDocument, ExtractionError, PreviewImage, MAX_PREVIEW_PAGES};

pub const PREVIEW_DPI: u32 = 150;

/// Extracts the text layer of every page. A page without a text layer
/// contributes an empty string. When a rasterizer is given, the first two
/// pages are rendered for previews; a failure there only costs the previews.
pub fn extract_with_text_layer(
    pdf: &[u8],
    rasterizer: Option<&Rasterizer>,
) -> Result<ExtractedDocument, ExtractionError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(pdf)
        .map_err(|e| ExtractionError::Unreadable(e.to_string()))?;

    tracing::info!(page_count = pages.len(), "PDF text-layer extraction complete");

    let previews = match rasterizer {
        Some(rasterizer) if !pages.is_empty() => render_previews(pdf, rasterizer),
        _ => Vec::new(),
    };

    Ok(ExtractedDocument::new(join_pages(&pages), previews))
}

fn render_previews(pdf: &[u8], rasterizer: &Rasterizer) -> Vec<PreviewImage> {
    let rendered = tempfile::tempdir()
        .map_err(ExtractionError::from)
        .and_then(|workdir| {
            rasterizer.render(
                pdf,
                PREVIEW_DPI,
                Some((1, MAX_PREVIEW_PAGES as u32)),
                workdir.path(),
            )
        });

    match rendered {
        Ok(pages) => pages
            .into_iter()
            .take(MAX_PREVIEW_PAGES)
            .enumerate()
            .map(|(index, page)| PreviewImage {
                page: index as u32 + 1,
                png: page.png,
            })
            .collect(),
        Err(e) => {
            tracing::debug!("Preview rendering skipped: {e}");
            Vec::new()
        }
    }
}
