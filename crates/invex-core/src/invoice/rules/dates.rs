//! Date extraction.

use chrono::NaiveDate;

use super::normalize::normalize_date;
use super::patterns::{DATE_MONTH_NAME, DATE_NUMERIC, DATE_YEAR_FIRST};
use super::{first_match, ExtractionMatch, FieldExtractor, Rule};

/// Date field extractor.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<NaiveDate>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        first_match(&date_rules(), text)
    }
}

/// Date rules in priority order.
pub fn date_rules() -> [Rule<NaiveDate>; 3] {
    [
        Rule::new("numeric", &DATE_NUMERIC, normalize_date),
        Rule::new("year_first", &DATE_YEAR_FIRST, normalize_date),
        Rule::new("month_name", &DATE_MONTH_NAME, normalize_date),
    ]
}

/// Extract the invoice date from text.
pub fn extract_date(text: &str) -> Option<NaiveDate> {
    DateExtractor::new().extract(text).map(|found| found.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_name_date() {
        assert_eq!(extract_date("Invoice date: March 3, 2023"), Some(ymd(2023, 3, 3)));
        assert_eq!(extract_date("Issued: DEC 24 2021"), Some(ymd(2021, 12, 24)));
        assert_eq!(extract_date("sep. 9, 2020"), Some(ymd(2020, 9, 9)));
    }

    #[test]
    fn test_numeric_date() {
        assert_eq!(extract_date("Date: 01/15/2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(extract_date("Date: 15-01-2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(extract_date("Date: 1/2/24"), Some(ymd(2024, 1, 2)));
    }

    #[test]
    fn test_iso_date_is_not_split_by_numeric_rule() {
        let found = DateExtractor::new().extract("Paid 2024-01-15").unwrap();
        assert_eq!(found.rule, "year_first");
        assert_eq!(found.value, ymd(2024, 1, 15));
    }

    #[test]
    fn test_date_touching_letters() {
        assert_eq!(extract_date("Date: 2024-01-15T10:30:00"), Some(ymd(2024, 1, 15)));
        assert_eq!(extract_date("Date: 01/15/2024T10:30"), Some(ymd(2024, 1, 15)));
        assert_eq!(extract_date("Date01/15/2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(extract_date("Issued2024/03/09"), Some(ymd(2024, 3, 9)));
    }

    #[test]
    fn test_numeric_date_inside_longer_number_is_ignored() {
        assert_eq!(extract_date("Ref 1201/15/20245"), None);
    }

    #[test]
    fn test_numeric_rule_wins_over_later_rules() {
        let text = "Ordered March 3, 2023, shipped 2023-03-05, delivered 03/07/2023";
        let found = DateExtractor::new().extract(text).unwrap();
        assert_eq!(found.rule, "numeric");
        assert_eq!(found.value, ymd(2023, 3, 7));
    }

    #[test]
    fn test_unparsable_match_is_silent() {
        // 45/45/2024 matches the numeric shape but is not a date.
        let found = DateExtractor::new().extract("Ref 45/45/2024 on Jan 5, 2024").unwrap();
        assert_eq!(found.rule, "month_name");
        assert_eq!(found.value, ymd(2024, 1, 5));
    }

    #[test]
    fn test_no_date() {
        assert_eq!(extract_date(""), None);
        assert_eq!(extract_date("Total: $45.00"), None);
    }
}
