//! Amount extraction.

use rust_decimal::Decimal;

use super::normalize::normalize_amount;
use super::patterns::{
    AMOUNT_BALANCE, AMOUNT_DOLLAR, AMOUNT_GRAND_TOTAL, AMOUNT_LABELLED, AMOUNT_TOTAL,
};
use super::{first_match, ExtractionMatch, FieldExtractor, Rule};

/// Currency reported for every detected amount, whatever symbol was printed.
pub const REPORTED_CURRENCY: &str = "USD";

/// Amount field extractor.
pub struct AmountExtractor;

impl AmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        first_match(&amount_rules(), &text.to_lowercase())
    }
}

/// Amount rules in priority order.
///
/// Patterns expect lower-cased input.
pub fn amount_rules() -> [Rule<Decimal>; 5] {
    [
        Rule::new("total", &AMOUNT_TOTAL, positive_amount),
        Rule::new("amount", &AMOUNT_LABELLED, positive_amount),
        Rule::new("grand_total", &AMOUNT_GRAND_TOTAL, positive_amount),
        Rule::new("balance", &AMOUNT_BALANCE, positive_amount),
        Rule::new("dollar", &AMOUNT_DOLLAR, positive_amount),
    ]
}

fn positive_amount(s: &str) -> Option<Decimal> {
    normalize_amount(s).filter(|amount| amount.is_sign_positive() && !amount.is_zero())
}

/// An amount found in invoice text.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedAmount {
    /// Positive amount.
    pub value: Decimal,
    /// ISO currency code reported for it.
    pub currency: String,
    /// Rule that produced the amount.
    pub rule: &'static str,
}

/// Extract the invoice amount from text.
pub fn extract_amount(text: &str) -> Option<DetectedAmount> {
    AmountExtractor::new()
        .extract(text)
        .map(|found| DetectedAmount {
            value: found.value,
            currency: REPORTED_CURRENCY.to_string(),
            rule: found.rule,
        })
}
