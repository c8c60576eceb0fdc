//! Core library for heuristic invoice field extraction.
//!
//! This crate provides:
//! - PDF text extraction (lopdf, with pdf-extract as fallback)
//! - An OCR seam with a PaddleOCR-based engine for native builds
//! - Rule-based merchant, amount and date heuristics
//! - Adapters for PDF text, image OCR text and email bodies

pub mod error;
pub mod invoice;
pub mod models;
pub mod ocr;
pub mod pdf;

pub use error::{ExtractionError, InvexError, Result};
pub use invoice::{
    extract_from_email, extract_from_image_text, extract_from_pdf_text, InvoiceAssembler,
    InvoiceExtractor, SourceKind,
};
pub use models::config::InvexConfig;
pub use models::invoice::{ExtractionMethod, ExtractionResult};
pub use ocr::{OcrBackend, OcrResult, TextBox};
#[cfg(feature = "native")]
pub use ocr::{create_engine_from_dir, PureOcrEngine};
pub use pdf::{PdfContent, PdfExtractor, PdfProcessor};
