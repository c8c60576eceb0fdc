//! Extracted invoice record.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Currency used when no amount was detected.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Maximum number of characters of input kept on a result.
pub const RAW_TEXT_LIMIT: usize = 1000;

/// Structured fields recovered from one text blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Merchant name, or the "Unknown Merchant" sentinel.
    pub merchant: Option<String>,

    /// Positive invoice amount.
    #[serde(with = "rust_decimal::serde::float_option", default)]
    pub amount: Option<Decimal>,

    /// ISO currency code, always populated.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Invoice date, serialized as `YYYY-MM-DD`.
    pub date: Option<NaiveDate>,

    /// Source channel that produced the text.
    pub extraction_method: ExtractionMethod,

    /// Leading part of the input text.
    pub raw_text: String,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl ExtractionResult {
    /// Empty record for a channel, before any heuristic has run.
    pub fn new(extraction_method: ExtractionMethod) -> Self {
        Self {
            merchant: None,
            amount: None,
            currency: default_currency(),
            date: None,
            extraction_method,
            raw_text: String::new(),
        }
    }

    /// Whether the merchant heuristic came back empty-handed.
    pub fn merchant_is_unknown(&self) -> bool {
        match self.merchant.as_deref() {
            None => true,
            Some(name) => name == crate::invoice::rules::UNKNOWN_MERCHANT,
        }
    }
}

/// Source channel of the extracted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// Text layer of a PDF document.
    Pdf,
    /// OCR over a raster image.
    ImageOcr,
    /// Plain-text email subject and body.
    EmailBody,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::ImageOcr => "image_ocr",
            Self::EmailBody => "email_body",
        }
    }

    /// Parse a method name as it appears on the wire.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "image_ocr" | "image" | "ocr" => Some(Self::ImageOcr),
            "email_body" | "email" | "text" => Some(Self::EmailBody),
            _ => None,
        }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First `limit` characters of `text`.
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    #[test]
    fn test_serializes_with_wire_names() {
        let result = ExtractionResult {
            merchant: Some("Acme Co".to_string()),
            amount: Some(Decimal::from_str("99.99").unwrap()),
            currency: "USD".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15),
            extraction_method: ExtractionMethod::Pdf,
            raw_text: "Acme Co".to_string(),
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "merchant": "Acme Co",
                "amount": 99.99,
                "currency": "USD",
                "date": "2024-01-15",
                "extractionMethod": "pdf",
                "rawText": "Acme Co"
            })
        );
    }

    #[test]
    fn test_absent_fields_serialize_as_null() {
        let json = serde_json::to_value(ExtractionResult::new(ExtractionMethod::ImageOcr)).unwrap();
        assert_eq!(json["amount"], serde_json::Value::Null);
        assert_eq!(json["date"], serde_json::Value::Null);
        assert_eq!(json["currency"], "USD");
        assert_eq!(json["extractionMethod"], "image_ocr");
    }

    #[test]
    fn test_deserialize_round_trip() {
        let json = r#"{"merchant":null,"amount":12.5,"date":null,"extractionMethod":"email_body","rawText":""}"#;
        let result: ExtractionResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.amount, Some(Decimal::from_str("12.5").unwrap()));
        assert_eq!(result.currency, "USD");
        assert_eq!(result.extraction_method, ExtractionMethod::EmailBody);
    }

    #[test]
    fn test_truncate_chars_counts_characters() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 2), "he");
        assert_eq!(truncate_chars("€€€€", 3), "€€€");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_method_names() {
        assert_eq!(ExtractionMethod::from_str("IMAGE_OCR"), Some(ExtractionMethod::ImageOcr));
        assert_eq!(ExtractionMethod::from_str("fax"), None);
        assert_eq!(ExtractionMethod::EmailBody.to_string(), "email_body");
    }
}
