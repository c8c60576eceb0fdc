//! Rule-based field extractors.
//!
//! Every heuristic is an ordered list of [`Rule`]s. [`first_match`] walks the
//! list and returns the first rule whose pattern matches and whose validator
//! accepts the captured text. A rejected capture moves on to the next rule,
//! never to the next occurrence of the same pattern.

pub mod amounts;
pub mod dates;
pub mod merchant;
pub mod normalize;
pub mod patterns;

pub use amounts::{amount_rules, extract_amount, AmountExtractor, DetectedAmount};
pub use dates::{date_rules, extract_date, DateExtractor};
pub use merchant::{
    extract_merchant_name, merchant_from_subject, subject_rules, title_case, MerchantExtractor,
    UNKNOWN_MERCHANT,
};
pub use normalize::{normalize_amount, normalize_date};

use regex::Regex;
use tracing::{debug, trace};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;
}

/// One pattern+validator pair in a heuristic's priority list.
#[derive(Debug, Clone, Copy)]
pub struct Rule<T> {
    /// Short identifier, used in logs and on matches.
    pub name: &'static str,
    /// Pattern searched for; capture group 1 (or the whole match) is validated.
    pub pattern: &'static Regex,
    /// Turns the captured text into a value, or rejects it.
    pub accept: fn(&str) -> Option<T>,
}

impl<T> Rule<T> {
    pub const fn new(
        name: &'static str,
        pattern: &'static Regex,
        accept: fn(&str) -> Option<T>,
    ) -> Self {
        Self {
            name,
            pattern,
            accept,
        }
    }

    /// Apply this rule alone: first occurrence of the pattern, then the validator.
    pub fn apply(&self, text: &str) -> Option<ExtractionMatch<T>> {
        let caps = self.pattern.captures(text)?;
        let group = caps.get(1).or_else(|| caps.get(0))?;
        let value = (self.accept)(group.as_str())?;

        Some(
            ExtractionMatch::new(value, self.name, group.as_str())
                .with_position(group.start(), group.end()),
        )
    }
}

/// Evaluate rules in order and return the first accepted match.
pub fn first_match<T>(rules: &[Rule<T>], text: &str) -> Option<ExtractionMatch<T>> {
    rules.iter().find_map(|rule| match rule.apply(text) {
        Some(found) => {
            debug!(rule = rule.name, source = %found.source, "rule matched");
            Some(found)
        }
        None => {
            trace!(rule = rule.name, "rule skipped");
            None
        }
    })
}

/// A value recovered by a rule, with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Name of the rule that produced it.
    pub rule: &'static str,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, rule: &'static str, source: impl Into<String>) -> Self {
        Self {
            value,
            rule,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazy_static::lazy_static;

    lazy_static! {
        static ref DIGITS: Regex = Regex::new(r"(\d+)").unwrap();
        static ref WORD: Regex = Regex::new(r"([a-z]+)").unwrap();
    }

    fn even(s: &str) -> Option<u32> {
        s.parse::<u32>().ok().filter(|n| n % 2 == 0)
    }

    fn word_len(s: &str) -> Option<u32> {
        Some(s.len() as u32)
    }

    #[test]
    fn test_first_match_respects_order() {
        let rules = [
            Rule::new("digits", &*DIGITS, even),
            Rule::new("word", &*WORD, word_len),
        ];

        let found = first_match(&rules, "abc 42").unwrap();
        assert_eq!(found.rule, "digits");
        assert_eq!(found.value, 42);
        assert_eq!(found.position, Some((4, 6)));
    }

    #[test]
    fn test_rejected_capture_moves_to_next_rule() {
        let rules = [
            Rule::new("digits", &*DIGITS, even),
            Rule::new("word", &*WORD, word_len),
        ];

        // 7 is odd; the later even number is not considered.
        let found = first_match(&rules, "7 then 8 hello").unwrap();
        assert_eq!(found.rule, "word");
        assert_eq!(found.value, 4);
    }

    #[test]
    fn test_no_rules_match() {
        let rules = [Rule::new("digits", &*DIGITS, even)];
        assert!(first_match(&rules, "nothing here").is_none());
        assert!(first_match::<u32>(&[], "42").is_none());
    }
}
