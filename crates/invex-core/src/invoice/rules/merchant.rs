//! Merchant name heuristics.
//!
//! The merchant is usually printed at the very top of an invoice, so only
//! the leading lines are inspected. Email subjects get their own pattern list.

use tracing::trace;

use super::patterns::{
    MERCHANT_NOISE, SUBJECT_INVOICE_FROM, SUBJECT_NAME_BEFORE_KEYWORD,
    SUBJECT_ORDER_CONFIRMATION, SUBJECT_PAYMENT_TO, SUBJECT_RECEIPT_FROM,
};
use super::{first_match, FieldExtractor, Rule};

/// Returned when no leading line looks like a merchant name.
pub const UNKNOWN_MERCHANT: &str = "Unknown Merchant";

/// Number of leading lines considered.
const SCAN_LINES: usize = 5;

/// Words that mark a document header line rather than a name.
const HEADER_MARKERS: [&str; 6] = ["invoice", "receipt", "bill", "statement", "order", "payment"];

/// Merchant name extractor over full document text.
///
/// Yields `None` when nothing qualifies; [`extract_merchant_name`] maps that
/// to [`UNKNOWN_MERCHANT`].
pub struct MerchantExtractor;

impl MerchantExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MerchantExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for MerchantExtractor {
    type Output = String;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        text.split('\n')
            .take(SCAN_LINES)
            .enumerate()
            .find_map(|(idx, line)| {
                let candidate = merchant_candidate(line);
                trace!(line = idx, accepted = candidate.is_some(), "merchant line");
                candidate
            })
    }
}

/// Guess the merchant from the first lines of `text`.
pub fn extract_merchant_name(text: &str) -> String {
    MerchantExtractor::new()
        .extract(text)
        .unwrap_or_else(|| UNKNOWN_MERCHANT.to_string())
}

fn merchant_candidate(line: &str) -> Option<String> {
    let line = line.trim();
    let len = line.chars().count();
    if len <= 3 || len >= 100 {
        return None;
    }

    let lower = line.to_lowercase();
    if HEADER_MARKERS.iter().any(|marker| lower.contains(marker)) {
        return None;
    }

    let cleaned = MERCHANT_NOISE.replace_all(line, "");
    if cleaned.chars().count() > 2 {
        Some(cleaned.trim().to_string())
    } else {
        None
    }
}

/// Subject-line rules in priority order.
///
/// Patterns expect a lower-cased subject.
pub fn subject_rules() -> [Rule<String>; 5] {
    [
        Rule::new("receipt_from", &SUBJECT_RECEIPT_FROM, subject_name),
        Rule::new("invoice_from", &SUBJECT_INVOICE_FROM, subject_name),
        Rule::new("order_confirmation", &SUBJECT_ORDER_CONFIRMATION, subject_name),
        Rule::new("payment_to", &SUBJECT_PAYMENT_TO, subject_name),
        Rule::new("name_before_keyword", &SUBJECT_NAME_BEFORE_KEYWORD, subject_name),
    ]
}

fn subject_name(captured: &str) -> Option<String> {
    let name = captured.trim();
    if name.chars().count() > 2 {
        Some(title_case(name))
    } else {
        None
    }
}

/// Try to pull a merchant name out of an email subject line.
pub fn merchant_from_subject(subject: &str) -> Option<String> {
    first_match(&subject_rules(), &subject.to_lowercase()).map(|found| found.value)
}

/// Upper-case the first letter of every run of letters, lower-case the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_letter = false;

    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }

    out
}
