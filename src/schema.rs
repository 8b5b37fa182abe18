// 📐 Shape Layer - Receipt Validation
// Ordered table of (field, predicate, reason) rules; the first failing rule wins

use crate::receipt::{Item, Receipt};
use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use std::sync::OnceLock;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

// ============================================================================
// VALIDATION ERROR
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: &'static str,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: &'static str) -> Self {
        ValidationError { field, reason }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.reason)
    }
}

impl std::error::Error for ValidationError {}

// ============================================================================
// PATTERNS
// ============================================================================
// Word and space classes are spelled out as ASCII: `\w` and `\s` would accept
// Unicode letters and spaces.

static RETAILER_RE: OnceLock<Regex> = OnceLock::new();
static DESCRIPTION_RE: OnceLock<Regex> = OnceLock::new();
static AMOUNT_RE: OnceLock<Regex> = OnceLock::new();
static DATE_RE: OnceLock<Regex> = OnceLock::new();
static TIME_RE: OnceLock<Regex> = OnceLock::new();

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|error| panic!("pattern {pattern} failed to compile: {error}"))
}

fn retailer_regex() -> &'static Regex {
    RETAILER_RE.get_or_init(|| compile(r"^[A-Za-z0-9_\t\n\x0C\r &\-]+$"))
}

fn description_regex() -> &'static Regex {
    DESCRIPTION_RE.get_or_init(|| compile(r"^[A-Za-z0-9_\t\n\x0C\r \-]+$"))
}

fn amount_regex() -> &'static Regex {
    AMOUNT_RE.get_or_init(|| compile(r"^[0-9]+\.[0-9]{2}$"))
}

// chrono's parser tolerates padding, signs and short fields; the shape is fixed first
fn date_regex() -> &'static Regex {
    DATE_RE.get_or_init(|| compile(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$"))
}

fn time_regex() -> &'static Regex {
    TIME_RE.get_or_init(|| compile(r"^[0-9]{1,2}:[0-9]{2}$"))
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    if !date_regex().is_match(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

pub fn parse_time(value: &str) -> Option<NaiveTime> {
    if !time_regex().is_match(value) {
        return None;
    }
    NaiveTime::parse_from_str(value, TIME_FORMAT).ok()
}

pub fn is_amount(value: &str) -> bool {
    amount_regex().is_match(value)
}

// ============================================================================
// RULE TABLES
// ============================================================================

/// One declarative check: which field, how to test it, what to report
pub struct FieldRule<T> {
    pub field: &'static str,
    pub check: fn(&T) -> bool,
    pub reason: &'static str,
}

impl<T> FieldRule<T> {
    fn apply(&self, value: &T) -> Result<(), ValidationError> {
        if (self.check)(value) {
            Ok(())
        } else {
            Err(ValidationError::new(self.field, self.reason))
        }
    }
}

/// Receipt-level rules, evaluated in order
pub const RECEIPT_RULES: &[FieldRule<Receipt>] = &[
    FieldRule {
        field: "retailer",
        check: |r| retailer_regex().is_match(&r.retailer),
        reason: "invalid retailer format",
    },
    FieldRule {
        field: "purchaseDate",
        check: |r| parse_date(&r.purchase_date).is_some(),
        reason: "invalid purchase date format",
    },
    FieldRule {
        field: "purchaseTime",
        check: |r| parse_time(&r.purchase_time).is_some(),
        reason: "invalid purchase time format",
    },
    FieldRule {
        field: "total",
        check: |r| is_amount(&r.total),
        reason: "invalid total format",
    },
    FieldRule {
        field: "items",
        check: |r| !r.items.is_empty(),
        reason: "at least one item is required",
    },
];

/// Per-item rules, evaluated in order for each item in submission order
pub const ITEM_RULES: &[FieldRule<Item>] = &[
    FieldRule {
        field: "shortDescription",
        check: |item| description_regex().is_match(&item.short_description),
        reason: "invalid item description format",
    },
    FieldRule {
        field: "price",
        check: |item| is_amount(&item.price),
        reason: "invalid item price format",
    },
];

// ============================================================================
// VALIDATOR
// ============================================================================

/// Check a submitted receipt's formats and structure. Pure; no side effects.
pub fn validate(receipt: &Receipt) -> Result<(), ValidationError> {
    for rule in RECEIPT_RULES {
        rule.apply(receipt)?;
    }

    for item in &receipt.items {
        for rule in ITEM_RULES {
            rule.apply(item)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::target_fixture;

    fn reason_for(receipt: &Receipt) -> &'static str {
        validate(receipt).unwrap_err().reason
    }

    #[test]
    fn test_fixture_is_valid() {
        assert_eq!(validate(&target_fixture()), Ok(()));
    }

    #[test]
    fn test_retailer_allows_ampersand_dash_and_spaces() {
        let mut receipt = target_fixture();
        receipt.retailer = "M&M Corner-Market_2".to_string();
        assert!(validate(&receipt).is_ok());
    }

    #[test]
    fn test_retailer_rejects_asterisk() {
        let mut receipt = target_fixture();
        receipt.retailer = "Tar*get".to_string();
        assert_eq!(reason_for(&receipt), "invalid retailer format");
    }

    #[test]
    fn test_retailer_rejects_empty_and_unicode() {
        let mut receipt = target_fixture();
        receipt.retailer = String::new();
        assert_eq!(reason_for(&receipt), "invalid retailer format");

        receipt.retailer = "Café".to_string();
        assert_eq!(reason_for(&receipt), "invalid retailer format");
    }

    #[test]
    fn test_date_and_time_formats() {
        let mut receipt = target_fixture();
        receipt.purchase_date = "2022-02-30".to_string();
        assert_eq!(reason_for(&receipt), "invalid purchase date format");

        let mut receipt = target_fixture();
        receipt.purchase_date = "01/01/2022".to_string();
        assert_eq!(reason_for(&receipt), "invalid purchase date format");

        let mut receipt = target_fixture();
        receipt.purchase_time = "24:00".to_string();
        assert_eq!(reason_for(&receipt), "invalid purchase time format");

        let mut receipt = target_fixture();
        receipt.purchase_time = "1:01pm".to_string();
        assert_eq!(reason_for(&receipt), "invalid purchase time format");
    }

    #[test]
    fn test_date_and_time_must_be_canonical() {
        for bad in ["2022-1-1", " 2022-01-01", "22-01-01", "+2022-01-01", "2022-01-1", "2022-01-01 "] {
            let mut receipt = target_fixture();
            receipt.purchase_date = bad.to_string();
            assert_eq!(reason_for(&receipt), "invalid purchase date format", "date {bad:?}");
        }

        for bad in ["13:1", " 13:01", "1:1", "13:01 ", "+13:01"] {
            let mut receipt = target_fixture();
            receipt.purchase_time = bad.to_string();
            assert_eq!(reason_for(&receipt), "invalid purchase time format", "time {bad:?}");
        }

        let mut receipt = target_fixture();
        receipt.purchase_time = "9:05".to_string();
        assert!(validate(&receipt).is_ok());
    }

    #[test]
    fn test_total_requires_two_fraction_digits() {
        for bad in ["35.3", "35", "-35.35", "1,035.35", "35.355", " 35.35"] {
            let mut receipt = target_fixture();
            receipt.total = bad.to_string();
            assert_eq!(reason_for(&receipt), "invalid total format", "total {bad:?}");
        }
    }

    #[test]
    fn test_empty_items_rejected() {
        let mut receipt = target_fixture();
        receipt.items.clear();
        assert_eq!(reason_for(&receipt), "at least one item is required");
    }

    #[test]
    fn test_item_description_rejects_ampersand() {
        let mut receipt = target_fixture();
        receipt.items[2] = Item::new("Salt & Pepper", "1.00");
        assert_eq!(reason_for(&receipt), "invalid item description format");
    }

    #[test]
    fn test_item_price_format() {
        let mut receipt = target_fixture();
        receipt.items[0].price = "6.4".to_string();
        assert_eq!(reason_for(&receipt), "invalid item price format");
    }

    #[test]
    fn test_first_failure_wins() {
        let mut receipt = target_fixture();
        receipt.retailer = "Bad*".to_string();
        receipt.total = "oops".to_string();
        receipt.items.clear();

        let err = validate(&receipt).unwrap_err();
        assert_eq!(err.field, "retailer");
    }

    #[test]
    fn test_items_checked_in_submission_order() {
        let mut receipt = target_fixture();
        receipt.items[0].price = "bad".to_string();
        receipt.items[1].short_description = "bad*".to_string();

        assert_eq!(reason_for(&receipt), "invalid item price format");
    }
}
