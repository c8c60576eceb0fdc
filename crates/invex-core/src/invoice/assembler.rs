//! Builds an [`ExtractionResult`] out of one text blob.

use tracing::info;

use crate::models::config::ExtractionConfig;
use crate::models::invoice::{
    truncate_chars, ExtractionMethod, ExtractionResult, DEFAULT_CURRENCY, RAW_TEXT_LIMIT,
};

use super::rules::{extract_amount, extract_date, extract_merchant_name};

/// Runs every field heuristic over a text blob.
#[derive(Debug, Clone)]
pub struct InvoiceAssembler {
    default_currency: String,
    raw_text_limit: usize,
}

impl InvoiceAssembler {
    pub fn new() -> Self {
        Self {
            default_currency: DEFAULT_CURRENCY.to_string(),
            raw_text_limit: RAW_TEXT_LIMIT,
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new()
            .with_default_currency(&config.default_currency)
            .with_raw_text_limit(config.raw_text_limit)
    }

    /// Currency reported when no amount was detected.
    pub fn with_default_currency(mut self, currency: &str) -> Self {
        self.default_currency = currency.to_string();
        self
    }

    /// Number of input characters kept as `raw_text`.
    pub fn with_raw_text_limit(mut self, limit: usize) -> Self {
        self.raw_text_limit = limit;
        self
    }

    /// Assemble a record from `text`.
    ///
    /// Never fails: a field no heuristic recognizes is left unset.
    /// Source-specific fallbacks are the caller's business.
    pub fn assemble(&self, text: &str, method: ExtractionMethod) -> ExtractionResult {
        let mut result = ExtractionResult::new(method);

        result.merchant = Some(extract_merchant_name(text));

        result.currency = match extract_amount(text) {
            Some(found) => {
                result.amount = Some(found.value);
                found.currency
            }
            None => self.default_currency.clone(),
        };

        result.date = extract_date(text);
        result.raw_text = truncate_chars(text, self.raw_text_limit);

        info!(
            method = %method,
            merchant = result.merchant.as_deref().unwrap_or_default(),
            amount = ?result.amount,
            date = ?result.date,
            "assembled extraction result"
        );

        result
    }
}

impl Default for InvoiceAssembler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn test_assembles_all_fields() {
        let text = "Invoice\nAcme Co\nTotal: $99.99\nDate: 01/15/2024";
        let result = InvoiceAssembler::new().assemble(text, ExtractionMethod::Pdf);

        assert_eq!(
            result,
            ExtractionResult {
                merchant: Some("Acme Co".to_string()),
                amount: Some(Decimal::from_str("99.99").unwrap()),
                currency: "USD".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 1, 15),
                extraction_method: ExtractionMethod::Pdf,
                raw_text: text.to_string(),
            }
        );
    }

    #[test]
    fn test_nothing_recognized_still_yields_record() {
        let result = InvoiceAssembler::new().assemble("@@\n##", ExtractionMethod::ImageOcr);

        assert_eq!(result.merchant.as_deref(), Some("Unknown Merchant"));
        assert!(result.merchant_is_unknown());
        assert_eq!(result.amount, None);
        assert_eq!(result.date, None);
        assert_eq!(result.currency, "USD");
    }

    #[test]
    fn test_raw_text_is_capped() {
        let text = "x".repeat(1500);
        let result = InvoiceAssembler::new().assemble(&text, ExtractionMethod::EmailBody);
        assert_eq!(result.raw_text.chars().count(), 1000);

        let short = InvoiceAssembler::new()
            .with_raw_text_limit(4)
            .assemble("Total: $1.00", ExtractionMethod::EmailBody);
        assert_eq!(short.raw_text, "Tota");
    }

    #[test]
    fn test_default_currency_only_when_no_amount() {
        let config = ExtractionConfig {
            default_currency: "EUR".to_string(),
            raw_text_limit: 1000,
        };
        let assembler = InvoiceAssembler::from_config(&config);

        let without = assembler.assemble("Acme", ExtractionMethod::Pdf);
        assert_eq!(without.currency, "EUR");

        let with = assembler.assemble("Acme\nTotal: €12.00", ExtractionMethod::Pdf);
        assert_eq!(with.currency, "USD");
        assert_eq!(with.amount, Some(Decimal::from_str("12.00").unwrap()));
    }

    #[test]
    fn test_assembly_is_pure() {
        let assembler = InvoiceAssembler::default();
        let text = "Corner Cafe\nAmount: 12.50\nMarch 3, 2023";
        assert_eq!(
            assembler.assemble(text, ExtractionMethod::ImageOcr),
            assembler.assemble(text, ExtractionMethod::ImageOcr)
        );
    }
}
