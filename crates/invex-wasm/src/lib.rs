//! WASM bindings for invoice field extraction.
//!
//! Text-only: OCR and PDF parsing happen on the JavaScript side, and the
//! resulting text is handed to the extractors here.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use invex_core::invoice::rules::{normalize_amount, normalize_date};
use invex_core::models::config::ExtractionConfig;
use invex_core::{
    ExtractionError, ExtractionMethod, ExtractionResult, InvoiceAssembler,
    InvoiceExtractor as _, OcrResult, TextBox,
};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js(result: Result<ExtractionResult, ExtractionError>) -> Result<JsValue, JsValue> {
    let result = result.map_err(|e| JsValue::from_str(&e.to_string()))?;
    result
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn pages_from_array(pages: &js_sys::Array) -> Result<Vec<String>, JsValue> {
    pages
        .iter()
        .map(|page| {
            page.as_string()
                .ok_or_else(|| JsValue::from_str("PDF pages must be strings"))
        })
        .collect()
}

/// Extract fields from text produced by the given channel
/// (`"pdf"`, `"image_ocr"` or `"email_body"`).
#[wasm_bindgen(js_name = extractFromText)]
pub fn extract_from_text(text: &str, method: &str) -> Result<JsValue, JsValue> {
    InvoiceExtractor::new().extract(text, method)
}

/// Extract fields from an email body, using the subject as merchant fallback.
#[wasm_bindgen(js_name = extractFromEmail)]
pub fn extract_from_email(body: &str, subject: &str) -> Result<JsValue, JsValue> {
    InvoiceExtractor::new().extract_email(body, subject)
}

/// Extract fields from per-page PDF text.
#[wasm_bindgen(js_name = extractFromPdfText)]
pub fn extract_from_pdf_text(pages: js_sys::Array) -> Result<JsValue, JsValue> {
    InvoiceExtractor::new().extract_pdf(pages)
}

/// Parse an amount such as `"$1,234.56"`.
#[wasm_bindgen(js_name = normalizeAmount)]
pub fn normalize_amount_js(amount: &str) -> Option<f64> {
    normalize_amount(amount).and_then(|d| d.to_string().parse().ok())
}

/// Parse a date string into `YYYY-MM-DD`.
#[wasm_bindgen(js_name = normalizeDate)]
pub fn normalize_date_js(date: &str) -> Option<String> {
    normalize_date(date).map(|d| d.to_string())
}

/// Configurable extractor for browser use.
#[wasm_bindgen]
pub struct InvoiceExtractor {
    assembler: InvoiceAssembler,
}

#[wasm_bindgen]
impl InvoiceExtractor {
    /// Create an extractor with default settings.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            assembler: InvoiceAssembler::from_config(&ExtractionConfig::default()),
        }
    }

    /// Currency reported when no amount is found.
    #[wasm_bindgen(js_name = setDefaultCurrency)]
    pub fn set_default_currency(&mut self, currency: &str) {
        self.assembler = self.assembler.clone().with_default_currency(currency);
    }

    /// Number of input characters kept as `rawText`.
    #[wasm_bindgen(js_name = setRawTextLimit)]
    pub fn set_raw_text_limit(&mut self, limit: usize) {
        self.assembler = self.assembler.clone().with_raw_text_limit(limit);
    }

    /// Extract from text produced by the given channel.
    #[wasm_bindgen]
    pub fn extract(&self, text: &str, method: &str) -> Result<JsValue, JsValue> {
        let method = ExtractionMethod::from_str(method)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown extraction method: {}", method)))?;

        to_js(match method {
            ExtractionMethod::Pdf => self.assembler.extract_from_pdf_text(&[text]),
            ExtractionMethod::ImageOcr => self.assembler.extract_from_image_text(text),
            ExtractionMethod::EmailBody => self.assembler.extract_from_email(text, ""),
        })
    }

    /// Extract from an email body and subject.
    #[wasm_bindgen(js_name = extractEmail)]
    pub fn extract_email(&self, body: &str, subject: &str) -> Result<JsValue, JsValue> {
        to_js(self.assembler.extract_from_email(body, subject))
    }

    /// Extract from an array of page texts.
    #[wasm_bindgen(js_name = extractPdf)]
    pub fn extract_pdf(&self, pages: js_sys::Array) -> Result<JsValue, JsValue> {
        let pages = pages_from_array(&pages)?;
        to_js(self.assembler.extract_from_pdf_text(&pages))
    }
}

impl Default for InvoiceExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// OCR output collected from a browser-side recognizer.
#[wasm_bindgen]
pub struct OcrResultJs {
    boxes: Vec<TextBox>,
    width: u32,
    height: u32,
}

#[wasm_bindgen]
impl OcrResultJs {
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            boxes: Vec::new(),
            width,
            height,
        }
    }

    /// Add a recognized text region.
    #[allow(clippy::too_many_arguments)]
    #[wasm_bindgen(js_name = addBox)]
    pub fn add_box(
        &mut self,
        text: &str,
        x1: f32, y1: f32,
        x2: f32, y2: f32,
        x3: f32, y3: f32,
        x4: f32, y4: f32,
        confidence: f32,
    ) {
        self.boxes.push(TextBox {
            bbox: [x1, y1, x2, y2, x3, y3, x4, y4],
            text: text.to_string(),
            score: confidence,
        });
    }

    /// Text of all boxes in reading order.
    #[wasm_bindgen(js_name = getText)]
    pub fn get_text(&self) -> String {
        self.reading_order().text
    }

    /// Extract fields from the collected text.
    #[wasm_bindgen(js_name = extractInvoice)]
    pub fn extract_invoice(&self) -> Result<JsValue, JsValue> {
        to_js(InvoiceAssembler::default().extract_from_image_text(&self.get_text()))
    }

    fn reading_order(&self) -> OcrResult {
        OcrResult::from_boxes(self.boxes.clone(), (self.width, self.height), 0)
    }
}
