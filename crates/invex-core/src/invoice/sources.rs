//! Text adapters: one per source channel, all sharing the assembler.

use tracing::debug;

use crate::error::ExtractionError;
use crate::models::invoice::{ExtractionMethod, ExtractionResult};

use super::assembler::InvoiceAssembler;
use super::rules::merchant_from_subject;
use super::{InvoiceExtractor, Result};

impl InvoiceExtractor for InvoiceAssembler {
    fn extract_from_pdf_text<S: AsRef<str>>(&self, pages: &[S]) -> Result<ExtractionResult> {
        let text = join_pages(pages);
        if text.trim().is_empty() {
            debug!("PDF has no text layer");
            return Err(ExtractionError::NoData);
        }

        Ok(self.assemble(&text, ExtractionMethod::Pdf))
    }

    fn extract_from_image_text(&self, ocr_text: &str) -> Result<ExtractionResult> {
        if ocr_text.trim().is_empty() {
            debug!("OCR produced no text");
            return Err(ExtractionError::NoData);
        }

        Ok(self.assemble(ocr_text, ExtractionMethod::ImageOcr))
    }

    fn extract_from_email(&self, body: &str, subject: &str) -> Result<ExtractionResult> {
        let text = format!("{}\n{}", subject, body);
        let mut result = self.assemble(&text, ExtractionMethod::EmailBody);

        if result.merchant_is_unknown() {
            if let Some(merchant) = merchant_from_subject(subject) {
                debug!(merchant = %merchant, "merchant taken from subject");
                result.merchant = Some(merchant);
            }
        }

        Ok(result)
    }
}

/// Page texts in order, each followed by a newline. Empty pages are skipped.
fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    pages
        .iter()
        .map(|page| page.as_ref())
        .filter(|page| !page.is_empty())
        .fold(String::new(), |mut text, page| {
            text.push_str(page);
            text.push('\n');
            text
        })
}
