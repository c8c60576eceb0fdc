//! PDF text extraction using lopdf and pdf-extract.

use lopdf::Document;
use tracing::{debug, warn};

use super::{PdfProcessor, Result};
use crate::error::PdfError;

/// PDF text extractor using lopdf, with pdf-extract as a whole-document fallback.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

/// Extracted text content of a PDF.
#[derive(Debug, Clone, Default)]
pub struct PdfContent {
    /// Pages in document order.
    pub pages: Vec<PdfPage>,
}

impl PdfContent {
    /// Whether any page carries non-whitespace text.
    pub fn has_text(&self) -> bool {
        self.pages.iter().any(|p| !p.text.trim().is_empty())
    }

    /// Numbers of the pages without any non-whitespace text.
    pub fn blank_pages(&self) -> Vec<u32> {
        self.pages
            .iter()
            .filter(|p| p.text.trim().is_empty())
            .map(|p| p.number)
            .collect()
    }

    /// Page texts in document order.
    pub fn page_texts(&self) -> Vec<String> {
        self.pages.iter().map(|p| p.text.clone()).collect()
    }
}

/// Content from a single PDF page.
#[derive(Debug, Clone)]
pub struct PdfPage {
    /// Page number (1-indexed).
    pub number: u32,
    /// Extracted text from this page.
    pub text: String,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    /// Extract the text of every page, in document order.
    ///
    /// A page whose text cannot be decoded contributes an empty string.
    pub fn extract_all(&self) -> Result<PdfContent> {
        let page_count = self.page_count();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        let mut pages = Vec::with_capacity(page_count as usize);
        let mut total_text_len = 0;

        for page_num in 1..=page_count {
            let text = match self.extract_page_text(page_num) {
                Ok(text) => text,
                Err(e) => {
                    warn!("Failed to extract text from page {}: {}", page_num, e);
                    String::new()
                }
            };

            total_text_len += text.len();
            pages.push(PdfPage {
                number: page_num,
                text,
            });
        }

        debug!(
            "PDF text: {} pages, {} chars",
            page_count, total_text_len
        );

        Ok(PdfContent { pages })
    }

    /// Page texts for extraction, falling back to pdf-extract over the whole
    /// document (as a single page) when lopdf finds no text at all.
    pub fn page_texts(&self, fallback_to_pdf_extract: bool) -> Result<Vec<String>> {
        let content = self.extract_all()?;
        let blank = content.blank_pages();
        if !blank.is_empty() {
            debug!(pages = ?blank, "PDF pages without text");
        }
        if content.has_text() || !fallback_to_pdf_extract {
            return Ok(content.page_texts());
        }

        debug!("No page text from lopdf, falling back to pdf-extract");
        Ok(vec![self.extract_text()?])
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // Save decrypted document to raw_data for pdf_extract
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_text(&self) -> Result<String> {
        if self.raw_data.is_empty() {
            return Err(PdfError::Parse("No document loaded".to_string()));
        }

        pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }

    fn extract_page_text(&self, page: u32) -> Result<String> {
        let doc = self
            .document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("No document loaded".to_string()))?;

        if !doc.get_pages().contains_key(&page) {
            return Err(PdfError::InvalidPage(page));
        }

        doc.extract_text(&[page])
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }
}
