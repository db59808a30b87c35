//! Document Extractor: résumé PDF → plain text + up to two page previews.
//!
//! The strategy is negotiated once at startup by probing the native helpers:
//! with both `pdftoppm` and `tesseract` present the OCR path runs first and
//! the text layer is the fallback; otherwise only the text layer is read
//! (with previews if `pdftoppm` alone is present). `extract` never fails:
//! problems surface as `ExtractionStatus::Failed` with an empty document.

pub mod ocr;
pub mod rasterizer;
#[cfg(all(test, unix))]
pub(crate) mod stub_tools;
pub mod text_layer;

use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::HelperTools;
use ocr::{extract_with_ocr, OcrEngine};
use rasterizer::Rasterizer;
use text_layer::extract_with_text_layer;

pub const PDF_MIME: &str = "application/pdf";
pub const MAX_PREVIEW_PAGES: usize = 2;
const PAGE_SEPARATOR: &str = "\n\n";
const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{tool} failed: {message}")]
    Tool { tool: &'static str, message: String },

    #[error("PDF could not be read: {0}")]
    Unreadable(String),
}

/// A rendered page kept for the preview panel.
#[derive(Debug, Clone)]
pub struct PreviewImage {
    /// 1-based page number.
    pub page: u32,
    pub png: Vec<u8>,
}

/// Text and previews of one upload. Replaced wholesale by the next upload.
#[derive(Debug, Clone, Default)]
pub struct ExtractedDocument {
    pub text: String,
    pub preview_images: Vec<PreviewImage>,
}

impl ExtractedDocument {
    pub fn new(text: String, mut preview_images: Vec<PreviewImage>) -> Self {
        preview_images.truncate(MAX_PREVIEW_PAGES);
        Self {
            text,
            preview_images,
        }
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Which path produced the document, or why none did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum ExtractionStatus {
    Ocr,
    TextLayer,
    /// Not a PDF; nothing was attempted.
    Rejected,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct ExtractionReport {
    pub document: ExtractedDocument,
    pub status: ExtractionStatus,
}

impl ExtractionReport {
    fn empty(status: ExtractionStatus) -> Self {
        Self {
            document: ExtractedDocument::default(),
            status,
        }
    }
}

/// Extraction capabilities chosen at startup.
#[derive(Debug, Clone)]
pub enum ExtractionStrategy {
    Ocr {
        rasterizer: Rasterizer,
        engine: OcrEngine,
    },
    TextLayer {
        /// Present when `pdftoppm` exists, used for previews only.
        rasterizer: Option<Rasterizer>,
    },
}

impl ExtractionStrategy {
    /// Probes the helper binaries and picks the richest strategy available.
    /// Absent tools are never an error.
    pub fn negotiate(tools: &HelperTools) -> Self {
        let rasterizer = Rasterizer::new(&tools.pdftoppm);
        let engine = OcrEngine::new(&tools.tesseract);

        match (rasterizer.is_available(), engine.is_available()) {
            (true, true) => {
                info!(
                    "OCR extraction enabled ({} + {})",
                    rasterizer.binary().display(),
                    engine.binary().display()
                );
                ExtractionStrategy::Ocr { rasterizer, engine }
            }
            (has_rasterizer, _) => {
                warn!("pdftoppm and/or tesseract not found - using text-layer extraction");
                ExtractionStrategy::TextLayer {
                    rasterizer: has_rasterizer.then_some(rasterizer),
                }
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExtractionStrategy::Ocr { .. } => "ocr",
            ExtractionStrategy::TextLayer { .. } => "text_layer",
        }
    }

    pub fn previews_enabled(&self) -> bool {
        match self {
            ExtractionStrategy::Ocr { .. } => true,
            ExtractionStrategy::TextLayer { rasterizer } => rasterizer.is_some(),
        }
    }
}

pub struct DocumentExtractor {
    strategy: ExtractionStrategy,
    timeout: Duration,
}

impl DocumentExtractor {
    pub fn new(strategy: ExtractionStrategy) -> Self {
        Self {
            strategy,
            timeout: EXTRACTION_TIMEOUT,
        }
    }

    pub fn strategy(&self) -> &ExtractionStrategy {
        &self.strategy
    }

    /// Extracts an upload. Only `application/pdf` is processed; anything else
    /// is rejected without running either path.
    #[tracing::instrument(skip(self, data), fields(bytes = data.len()))]
    pub async fn extract(&self, data: Bytes, content_type: &str) -> ExtractionReport {
        if !is_pdf(content_type) {
            info!("Rejected non-PDF upload");
            return ExtractionReport::empty(ExtractionStatus::Rejected);
        }

        let strategy = self.strategy.clone();
        let job = tokio::task::spawn_blocking(move || run_strategy(&strategy, &data));

        let report = match tokio::time::timeout(self.timeout, job).await {
            Ok(Ok(report)) => report,
            Ok(Err(e)) => ExtractionReport::empty(ExtractionStatus::Failed(format!(
                "PDF extraction crashed: {e}"
            ))),
            Err(_) => ExtractionReport::empty(ExtractionStatus::Failed(
                "PDF extraction timed out".to_string(),
            )),
        };

        info!(
            status = ?report.status,
            chars = report.document.char_count(),
            previews = report.document.preview_images.len(),
            "Extraction finished"
        );
        report
    }
}

/// Runs the configured strategy synchronously: OCR first when available,
/// then the text layer.
pub fn run_strategy(strategy: &ExtractionStrategy, pdf: &[u8]) -> ExtractionReport {
    let preview_rasterizer = match strategy {
        ExtractionStrategy::Ocr { rasterizer, engine } => {
            match extract_with_ocr(pdf, rasterizer, engine) {
                Ok(document) => {
                    return ExtractionReport {
                        document,
                        status: ExtractionStatus::Ocr,
                    }
                }
                Err(e) => {
                    warn!("OCR pipeline failed ({e}) - falling back to text extraction");
                    Some(rasterizer)
                }
            }
        }
        ExtractionStrategy::TextLayer { rasterizer } => rasterizer.as_ref(),
    };

    match extract_with_text_layer(pdf, preview_rasterizer) {
        Ok(document) => ExtractionReport {
            document,
            status: ExtractionStatus::TextLayer,
        },
        Err(e) => ExtractionReport::empty(ExtractionStatus::Failed(format!(
            "Could not extract anything from this PDF: {e}"
        ))),
    }
}

fn is_pdf(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(str::trim)
        .is_some_and(|mime| mime.eq_ignore_ascii_case(PDF_MIME))
}

/// Joins page texts with a blank line. All-blank input yields "".
pub(crate) fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    if pages.iter().all(|p| p.as_ref().trim().is_empty()) {
        return String::new();
    }
    pages
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join(PAGE_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{to_document, ReportSection};
    use lopdf::{dictionary, Document, Object, Stream};

    fn text_only() -> ExtractionStrategy {
        ExtractionStrategy::TextLayer { rasterizer: None }
    }

    fn missing_tools() -> HelperTools {
        HelperTools {
            pdftoppm: "/nonexistent/bin/pdftoppm".into(),
            tesseract: "/nonexistent/bin/tesseract".into(),
        }
    }

    /// A PDF with `pages` pages and no text on any of them.
    fn blank_pdf(pages: usize) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids: Vec<Object> = Vec::new();
        for _ in 0..pages {
            let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
            let media_box: Vec<Object> = vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(595),
                Object::Integer(842),
            ];
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => media_box,
                "Resources" => dictionary! {},
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }
        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    fn text_pdf() -> Vec<u8> {
        to_document(&[ReportSection::new(
            "Quick Overview",
            "Point one.\nPoint two.",
        )])
        .unwrap()
    }

    #[test]
    fn test_text_layer_reads_embedded_text() {
        let report = run_strategy(&text_only(), &text_pdf());
        assert_eq!(report.status, ExtractionStatus::TextLayer);
        assert!(report.document.text.contains("Overview"), "got {:?}", report.document.text);
        assert!(report.document.text.contains("Point"));
        assert!(report.document.preview_images.is_empty());
    }

    #[test]
    fn test_blank_pages_yield_empty_text() {
        let report = run_strategy(&text_only(), &blank_pdf(2));
        assert_eq!(report.status, ExtractionStatus::TextLayer);
        assert_eq!(report.document.text, "");
    }

    #[test]
    fn test_zero_page_pdf_is_not_an_error() {
        let report = run_strategy(&text_only(), &blank_pdf(0));
        assert_eq!(report.status, ExtractionStatus::TextLayer);
        assert!(report.document.text.is_empty());
        assert!(report.document.preview_images.is_empty());
    }

    #[test]
    fn test_unreadable_pdf_fails_with_empty_document() {
        let report = run_strategy(&text_only(), b"definitely not a pdf");
        assert!(matches!(report.status, ExtractionStatus::Failed(_)));
        assert!(report.document.text.is_empty());
        assert!(report.document.preview_images.is_empty());
    }

    #[test]
    fn test_ocr_failure_falls_back_to_text_layer() {
        let strategy = ExtractionStrategy::Ocr {
            rasterizer: Rasterizer::new("/nonexistent/bin/pdftoppm"),
            engine: OcrEngine::new("/nonexistent/bin/tesseract"),
        };
        let report = run_strategy(&strategy, &text_pdf());
        assert_eq!(report.status, ExtractionStatus::TextLayer);
        assert!(report.document.text.contains("Point one."));
        assert!(report.document.preview_images.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_ocr_strategy_reads_every_page() {
        use super::stub_tools::{fake_pdftoppm, fake_tesseract, logged_args};

        let tools = tempfile::tempdir().unwrap();
        let strategy = ExtractionStrategy::Ocr {
            rasterizer: Rasterizer::new(fake_pdftoppm(
                tools.path(),
                &[("1", "img1"), ("2", "img2"), ("3", "img3")],
            )),
            engine: OcrEngine::new(fake_tesseract(tools.path())),
        };

        let report = run_strategy(&strategy, b"%PDF-1.5 scanned resume");
        assert_eq!(report.status, ExtractionStatus::Ocr);
        assert_eq!(
            report.document.text,
            "TEXT:page-1.png\n\nTEXT:page-2.png\n\nTEXT:page-3.png"
        );
        let previews: Vec<(u32, &[u8])> = report
            .document
            .preview_images
            .iter()
            .map(|p| (p.page, p.png.as_slice()))
            .collect();
        assert_eq!(previews, vec![(1, &b"img1"[..]), (2, &b"img2"[..])]);

        let args = logged_args(tools.path());
        assert!(args.starts_with("-png -r 200 "), "args: {args}");
        assert!(!args.contains("-f"), "args: {args}");
        assert!(args.contains("input.pdf"), "args: {args}");
    }

    #[cfg(unix)]
    #[test]
    fn test_text_layer_renders_first_two_pages_for_previews() {
        use super::stub_tools::{fake_pdftoppm, logged_args};

        let tools = tempfile::tempdir().unwrap();
        let strategy = ExtractionStrategy::TextLayer {
            rasterizer: Some(Rasterizer::new(fake_pdftoppm(
                tools.path(),
                &[("1", "first"), ("2", "second")],
            ))),
        };

        let report = run_strategy(&strategy, &text_pdf());
        assert_eq!(report.status, ExtractionStatus::TextLayer);
        assert!(report.document.text.contains("Point one."));
        let pages: Vec<u32> = report.document.preview_images.iter().map(|p| p.page).collect();
        assert_eq!(pages, vec![1, 2]);
        assert_eq!(report.document.preview_images[1].png, b"second".to_vec());
        assert!(logged_args(tools.path()).starts_with("-png -r 150 -f 1 -l 2 "));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_preview_rasterizer_keeps_text() {
        use super::stub_tools::broken_pdftoppm;

        let tools = tempfile::tempdir().unwrap();
        let strategy = ExtractionStrategy::TextLayer {
            rasterizer: Some(Rasterizer::new(broken_pdftoppm(tools.path()))),
        };

        let report = run_strategy(&strategy, &text_pdf());
        assert_eq!(report.status, ExtractionStatus::TextLayer);
        assert!(report.document.text.contains("Point"));
        assert!(report.document.preview_images.is_empty());
    }

    #[test]
    fn test_negotiate_without_tools_uses_text_layer() {
        let strategy = ExtractionStrategy::negotiate(&missing_tools());
        assert_eq!(strategy.name(), "text_layer");
        assert!(!strategy.previews_enabled());
    }

    #[tokio::test]
    async fn test_non_pdf_upload_is_rejected() {
        let extractor = DocumentExtractor::new(text_only());
        let report = extractor
            .extract(Bytes::from(text_pdf()), "text/plain")
            .await;
        assert_eq!(report.status, ExtractionStatus::Rejected);
        assert_eq!(report.document.text, "");
        assert!(report.document.preview_images.is_empty());
    }

    #[tokio::test]
    async fn test_pdf_upload_with_charset_parameter() {
        let extractor = DocumentExtractor::new(text_only());
        let report = extractor
            .extract(Bytes::from(text_pdf()), "application/PDF; charset=binary")
            .await;
        assert_eq!(report.status, ExtractionStatus::TextLayer);
    }

    #[test]
    fn test_join_pages() {
        assert_eq!(join_pages(&["", "  \n"]), "");
        assert_eq!(join_pages(&["", "text"]), "\n\ntext");
        assert_eq!(join_pages(&["a", "b"]), "a\n\nb");
        assert_eq!(join_pages::<&str>(&[]), "");
    }

    #[test]
    fn test_document_counts() {
        let doc = ExtractedDocument::new("Jane Doe  Rust engineer".to_string(), Vec::new());
        assert_eq!(doc.word_count(), 4);
        assert_eq!(doc.char_count(), 23);
    }

    #[test]
    fn test_document_keeps_at_most_two_previews() {
        let previews = (1..=3)
            .map(|page| PreviewImage { page, png: vec![0u8] })
            .collect();
        let doc = ExtractedDocument::new(String::new(), previews);
        assert_eq!(doc.preview_images.len(), 2);
    }
}
