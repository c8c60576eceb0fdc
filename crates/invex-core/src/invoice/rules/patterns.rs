//! Common regex patterns for invoice field extraction.
//!
//! Amount patterns run against lower-cased text, so they are written in
//! lower case. Date and subject patterns carry their own case handling.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Labelled amounts. Sign and currency symbol are captured with the number
    // so the normalizer sees "-$5.00" and yields a negative value.
    pub static ref AMOUNT_TOTAL: Regex = Regex::new(
        r"total[:\s]+(-?[$€£¥]?[0-9,]+\.?\d{0,2})"
    ).unwrap();

    pub static ref AMOUNT_LABELLED: Regex = Regex::new(
        r"amount[:\s]+(-?[$€£¥]?[0-9,]+\.?\d{0,2})"
    ).unwrap();

    pub static ref AMOUNT_GRAND_TOTAL: Regex = Regex::new(
        r"grand total[:\s]+(-?[$€£¥]?[0-9,]+\.?\d{0,2})"
    ).unwrap();

    pub static ref AMOUNT_BALANCE: Regex = Regex::new(
        r"balance[:\s]+(-?[$€£¥]?[0-9,]+\.?\d{0,2})"
    ).unwrap();

    // Unlabelled dollar amount, cents required.
    pub static ref AMOUNT_DOLLAR: Regex = Regex::new(
        r"(-?\$[0-9,]+\.\d{2})"
    ).unwrap();

    // Date shapes as they appear in running text. Numeric shapes are bounded
    // by non-digits rather than word boundaries: "Date01/15/2024" matches,
    // a match inside "2024-01-15" does not.
    pub static ref DATE_NUMERIC: Regex = Regex::new(
        r"(?:^|[^0-9])(\d{1,2}[-/]\d{1,2}[-/](?:\d{4}|\d{2}))(?:[^0-9]|$)"
    ).unwrap();

    pub static ref DATE_YEAR_FIRST: Regex = Regex::new(
        r"(?:^|[^0-9])(\d{4}[-/]\d{1,2}[-/]\d{1,2})(?:[^0-9]|$)"
    ).unwrap();

    pub static ref DATE_MONTH_NAME: Regex = Regex::new(
        r"(?i)\b((?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+\d{1,2},?\s+\d{4})\b"
    ).unwrap();

    // Date normalizer building blocks
    pub static ref NORM_YMD: Regex = Regex::new(
        r"(?:^|[^0-9])(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})(?:[^0-9]|$)"
    ).unwrap();

    pub static ref NORM_NUMERIC: Regex = Regex::new(
        r"(?:^|[^0-9])(\d{1,2})[-/.](\d{1,2})[-/.](\d{4}|\d{2})(?:[^0-9]|$)"
    ).unwrap();

    pub static ref NORM_MONTH_DAY_YEAR: Regex = Regex::new(
        r"(?i)\b([a-z]{3,9})\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})\b"
    ).unwrap();

    pub static ref NORM_DAY_MONTH_YEAR: Regex = Regex::new(
        r"(?i)\b(\d{1,2})(?:st|nd|rd|th)?\s+([a-z]{3,9})\.?,?\s+(\d{4})\b"
    ).unwrap();

    // Merchant line cleanup
    pub static ref MERCHANT_NOISE: Regex = Regex::new(
        r"[^a-zA-Z0-9\s&\-.]"
    ).unwrap();

    // Email subject merchant patterns (subject is lower-cased first)
    pub static ref SUBJECT_RECEIPT_FROM: Regex = Regex::new(
        r"receipt from (.+?)(?:\s+-\s|\s*[|#:(,\n]|\s*$)"
    ).unwrap();

    pub static ref SUBJECT_INVOICE_FROM: Regex = Regex::new(
        r"invoice from (.+?)(?:\s+-\s|\s*[|#:(,\n]|\s*$)"
    ).unwrap();

    pub static ref SUBJECT_ORDER_CONFIRMATION: Regex = Regex::new(
        r"order confirmation - (.+?)(?:\s+-\s|\s*[|#:(,\n]|\s*$)"
    ).unwrap();

    pub static ref SUBJECT_PAYMENT_TO: Regex = Regex::new(
        r"payment to (.+?)(?:\s+-\s|\s*[|#:(,\n]|\s*$)"
    ).unwrap();

    pub static ref SUBJECT_NAME_BEFORE_KEYWORD: Regex = Regex::new(
        r"^(.+?)\s+(?:receipt|invoice|order)"
    ).unwrap();
}
