//! Invoice field extraction module.

mod assembler;
pub mod rules;
mod sources;

pub use assembler::InvoiceAssembler;

use std::path::Path;

use tracing::{debug, warn};

use crate::error::ExtractionError;
use crate::models::config::PdfConfig;
use crate::models::invoice::ExtractionResult;
use crate::ocr::OcrBackend;
use crate::pdf::{PdfExtractor, PdfProcessor};

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Trait for invoice field extractors.
///
/// The three text adapters are required. The byte-level adapters are built on
/// top of them: they turn a raw upload into text, and any failure along the
/// way (malformed PDF, undecodable image, OCR error) is logged and reported
/// as [`ExtractionError::NoData`].
pub trait InvoiceExtractor {
    /// Extract from the text layer of a PDF, one entry per page.
    fn extract_from_pdf_text<S: AsRef<str>>(&self, pages: &[S]) -> Result<ExtractionResult>;

    /// Extract from OCR output of an image.
    fn extract_from_image_text(&self, ocr_text: &str) -> Result<ExtractionResult>;

    /// Extract from an email body, falling back to the subject for the merchant.
    fn extract_from_email(&self, body: &str, subject: &str) -> Result<ExtractionResult>;

    /// Extract from raw PDF bytes.
    fn extract_from_pdf_bytes(&self, data: &[u8], config: &PdfConfig) -> Result<ExtractionResult> {
        let pages = pdf_page_texts(data, config).map_err(|e| {
            warn!("Could not read PDF: {}", e);
            ExtractionError::NoData
        })?;

        self.extract_from_pdf_text(&pages)
    }

    /// Extract from raw image bytes, recognizing text with `ocr`.
    fn extract_from_image_bytes(
        &self,
        data: &[u8],
        ocr: &dyn OcrBackend,
    ) -> Result<ExtractionResult> {
        let text = recognize_image(data, ocr).map_err(|e| {
            warn!("Could not recognize image: {}", e);
            ExtractionError::NoData
        })?;

        self.extract_from_image_text(&text)
    }

    /// Route an upload by MIME type.
    ///
    /// `ocr` may be absent when no OCR models are installed; image uploads
    /// then yield [`ExtractionError::NoData`].
    fn extract_from_upload(
        &self,
        filename: &str,
        mime_type: &str,
        data: &[u8],
        pdf: &PdfConfig,
        ocr: Option<&dyn OcrBackend>,
    ) -> Result<ExtractionResult> {
        let kind = SourceKind::from_mime(mime_type)
            .ok_or_else(|| ExtractionError::UnsupportedMimeType(mime_type.to_string()))?;

        debug!(filename, mime_type, ?kind, "routing upload");

        match kind {
            SourceKind::Pdf => self.extract_from_pdf_bytes(data, pdf),
            SourceKind::Image => match ocr {
                Some(ocr) => self.extract_from_image_bytes(data, ocr),
                None => {
                    warn!("No OCR backend available for {}", filename);
                    Err(ExtractionError::NoData)
                }
            },
        }
    }
}

/// Kind of binary document accepted for extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Pdf,
    Image,
}

impl SourceKind {
    /// `application/pdf` is a PDF, any `image/*` is an image.
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        let mime = mime_type.trim().to_ascii_lowercase();
        if mime == "application/pdf" {
            Some(Self::Pdf)
        } else if mime.starts_with("image/") {
            Some(Self::Image)
        } else {
            None
        }
    }

    /// Guess from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "png" | "jpg" | "jpeg" | "gif" | "bmp" | "tif" | "tiff" | "webp" => Some(Self::Image),
            _ => None,
        }
    }
}

fn pdf_page_texts(data: &[u8], config: &PdfConfig) -> crate::Result<Vec<String>> {
    let mut extractor = PdfExtractor::new();
    extractor.load(data)?;
    Ok(extractor.page_texts(config.fallback_to_pdf_extract)?)
}

fn recognize_image(data: &[u8], ocr: &dyn OcrBackend) -> crate::Result<String> {
    let image = image::load_from_memory(data)?;
    Ok(ocr.recognize(&image)?.text)
}

/// Extract from PDF page texts with default settings.
pub fn extract_from_pdf_text<S: AsRef<str>>(pages: &[S]) -> Result<ExtractionResult> {
    InvoiceAssembler::default().extract_from_pdf_text(pages)
}

/// Extract from OCR text with default settings.
pub fn extract_from_image_text(ocr_text: &str) -> Result<ExtractionResult> {
    InvoiceAssembler::default().extract_from_image_text(ocr_text)
}

/// Extract from an email with default settings.
pub fn extract_from_email(body: &str, subject: &str) -> Result<ExtractionResult> {
    InvoiceAssembler::default().extract_from_email(body, subject)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_kind_from_mime() {
        assert_eq!(SourceKind::from_mime("application/pdf"), Some(SourceKind::Pdf));
        assert_eq!(SourceKind::from_mime("image/png"), Some(SourceKind::Image));
        assert_eq!(SourceKind::from_mime("IMAGE/JPEG"), Some(SourceKind::Image));
        assert_eq!(SourceKind::from_mime("text/plain"), None);
        assert_eq!(SourceKind::from_mime(""), None);
    }

    #[test]
    fn test_source_kind_from_path() {
        assert_eq!(SourceKind::from_path(Path::new("a/b.PDF")), Some(SourceKind::Pdf));
        assert_eq!(SourceKind::from_path(Path::new("scan.jpeg")), Some(SourceKind::Image));
        assert_eq!(SourceKind::from_path(Path::new("notes.txt")), None);
        assert_eq!(SourceKind::from_path(Path::new("README")), None);
    }

    #[test]
    fn test_unsupported_upload() {
        let err = InvoiceAssembler::new()
            .extract_from_upload("a.txt", "text/plain", b"hi", &PdfConfig::default(), None)
            .unwrap_err();
        assert_eq!(err, ExtractionError::UnsupportedMimeType("text/plain".to_string()));
        assert_eq!(err.to_string(), "Unsupported file type: text/plain");
    }

    #[test]
    fn test_image_upload_without_ocr_is_no_data() {
        let err = InvoiceAssembler::new()
            .extract_from_upload("a.png", "image/png", b"\x89PNG", &PdfConfig::default(), None)
            .unwrap_err();
        assert_eq!(err, ExtractionError::NoData);
    }

    #[test]
    fn test_garbage_pdf_bytes_are_no_data() {
        let err = InvoiceAssembler::new()
            .extract_from_pdf_bytes(b"%PDF-broken", &PdfConfig::default())
            .unwrap_err();
        assert_eq!(err, ExtractionError::NoData);
    }

    #[test]
    fn test_default_free_functions() {
        let result = extract_from_pdf_text(&["Invoice\nAcme Co\nTotal: $99.99\nDate: 01/15/2024"])
            .unwrap();
        assert_eq!(result.merchant.as_deref(), Some("Acme Co"));
        assert!(extract_from_image_text("").is_err());
        assert!(extract_from_email("", "").is_ok());
    }
}
