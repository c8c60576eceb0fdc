//! Normalizers turning matched substrings into typed values.
//!
//! Both are best-effort: a string that cannot be interpreted yields `None`.

use chrono::NaiveDate;
use regex::Captures;
use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::{NORM_DAY_MONTH_YEAR, NORM_MONTH_DAY_YEAR, NORM_NUMERIC, NORM_YMD};

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Parse an amount such as "$1,234.56" into a decimal.
///
/// Currency symbols ($, €, £, ¥) and grouping commas are dropped before
/// parsing. Surrounding whitespace is ignored. Values outside what
/// [`Decimal`] holds (about 28 significant digits) are rejected rather than
/// rounded, so an absurdly long total reads as no amount.
pub fn normalize_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | '€' | '£' | '¥' | ','))
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    Decimal::from_str(&cleaned).ok()
}

/// Parse the first date found in `s`.
///
/// Forms are tried in a fixed order: year-first numeric, numeric with the
/// year last (month-first, then day-first), "March 3, 2023" and
/// "3 March 2023". Within one form every occurrence is tried before moving
/// on, so "Ref 99/99/99, due 01/15/2024" still resolves.
pub fn normalize_date(s: &str) -> Option<NaiveDate> {
    NORM_YMD
        .captures_iter(s)
        .find_map(|caps| ymd_from_captures(&caps))
        .or_else(|| {
            NORM_NUMERIC
                .captures_iter(s)
                .find_map(|caps| numeric_from_captures(&caps))
        })
        .or_else(|| {
            NORM_MONTH_DAY_YEAR.captures_iter(s).find_map(|caps| {
                let month = month_from_name(&caps[1])?;
                date(caps[3].parse().ok()?, month, caps[2].parse().ok()?)
            })
        })
        .or_else(|| {
            NORM_DAY_MONTH_YEAR.captures_iter(s).find_map(|caps| {
                let month = month_from_name(&caps[2])?;
                date(caps[3].parse().ok()?, month, caps[1].parse().ok()?)
            })
        })
}

fn ymd_from_captures(caps: &Captures<'_>) -> Option<NaiveDate> {
    date(caps[1].parse().ok()?, caps[2].parse().ok()?, caps[3].parse().ok()?)
}

fn numeric_from_captures(caps: &Captures<'_>) -> Option<NaiveDate> {
    let first: u32 = caps[1].parse().ok()?;
    let second: u32 = caps[2].parse().ok()?;
    let year = parse_year(&caps[3])?;

    // Month-first unless that cannot be a date.
    date(year, first, second).or_else(|| date(year, second, first))
}

fn date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_year(s: &str) -> Option<i32> {
    let year: i32 = s.parse().ok()?;
    if s.len() == 2 {
        // Two-digit year: 00-50 is the 2000s, 51-99 the 1900s
        Some(if year <= 50 { 2000 + year } else { 1900 + year })
    } else {
        Some(year)
    }
}

/// Month number for an English month name or abbreviation ("Mar", "sept").
fn month_from_name(name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    if name.len() < 3 {
        return None;
    }

    MONTHS
        .iter()
        .position(|full| full.starts_with(name.as_str()))
        .map(|idx| idx as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_normalize_amount_strips_symbols_and_commas() {
        assert_eq!(normalize_amount("$1,234.56"), Some(Decimal::from_str("1234.56").unwrap()));
        assert_eq!(normalize_amount("€45"), Some(Decimal::from(45)));
        assert_eq!(normalize_amount("£1,000,000.00"), Some(Decimal::from(1_000_000)));
        assert_eq!(normalize_amount("¥980"), Some(Decimal::from(980)));
        assert_eq!(normalize_amount(" 12.5 "), Some(Decimal::from_str("12.5").unwrap()));
    }

    #[test]
    fn test_normalize_amount_keeps_sign() {
        assert_eq!(normalize_amount("-$5.00"), Some(Decimal::from(-5)));
    }

    #[test]
    fn test_normalize_amount_rejects_garbage() {
        assert_eq!(normalize_amount(""), None);
        assert_eq!(normalize_amount(","), None);
        assert_eq!(normalize_amount("$"), None);
        assert_eq!(normalize_amount("12.34.56"), None);
        assert_eq!(normalize_amount("abc"), None);
    }

    #[test]
    fn test_normalize_amount_rejects_out_of_range() {
        assert_eq!(normalize_amount("123456789012345678901234567890.00"), None);
        assert!(normalize_amount("$1,234,567,890,123.45").is_some());
    }

    #[test]
    fn test_normalize_date_year_first() {
        assert_eq!(normalize_date("2024-01-15"), Some(ymd(2024, 1, 15)));
        assert_eq!(normalize_date("2024/1/5"), Some(ymd(2024, 1, 5)));
    }

    #[test]
    fn test_normalize_date_month_first_then_day_first() {
        assert_eq!(normalize_date("01/15/2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(normalize_date("03/04/2024"), Some(ymd(2024, 3, 4)));
        assert_eq!(normalize_date("15/01/2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(normalize_date("15-01-24"), Some(ymd(2024, 1, 15)));
        assert_eq!(normalize_date("12/31/99"), Some(ymd(1999, 12, 31)));
    }

    #[test]
    fn test_normalize_date_month_names() {
        assert_eq!(normalize_date("March 3, 2023"), Some(ymd(2023, 3, 3)));
        assert_eq!(normalize_date("Sept. 21st 2022"), Some(ymd(2022, 9, 21)));
        assert_eq!(normalize_date("dec 1 2020"), Some(ymd(2020, 12, 1)));
        assert_eq!(normalize_date("3 March 2023"), Some(ymd(2023, 3, 3)));
    }

    #[test]
    fn test_normalize_date_tolerates_surrounding_words() {
        assert_eq!(normalize_date("Invoice date: March 3, 2023 (paid)"), Some(ymd(2023, 3, 3)));
        assert_eq!(normalize_date("due on 2024-02-29 please"), Some(ymd(2024, 2, 29)));
    }

    #[test]
    fn test_normalize_date_touching_letters() {
        assert_eq!(normalize_date("2024-01-15T10:30:00"), Some(ymd(2024, 1, 15)));
        assert_eq!(normalize_date("Date01/15/2024"), Some(ymd(2024, 1, 15)));
    }

    #[test]
    fn test_normalize_date_rejects_impossible_dates() {
        assert_eq!(normalize_date("13/13/2024"), None);
        assert_eq!(normalize_date("2023-02-29"), None);
        assert_eq!(normalize_date("Marchx 3, 2023"), None);
        assert_eq!(normalize_date("no date here"), None);
        assert_eq!(normalize_date(""), None);
    }
}
