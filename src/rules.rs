// 🏷️ Points Rules - Fixed rule set as data
// Seven independent rules; the score is the sum of what each one awards

use crate::error::{ReceiptError, Result};
use crate::receipt::Receipt;
use crate::schema::{parse_date, parse_time};
use chrono::{Datelike, Timelike};
use serde::Serialize;

// ============================================================================
// RULE DEFINITION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PointsRule {
    /// One point per alphanumeric character in the retailer name
    RetailerName,

    /// 50 points if the total has no cents
    RoundDollar,

    /// 25 points if the total is a multiple of 0.25
    QuarterMultiple,

    /// 5 points for every two items
    ItemPairs,

    /// ceil(price * 0.2) for items whose trimmed description length is a multiple of 3
    ItemDescription,

    /// 6 points if the day of the purchase date is odd
    OddDay,

    /// 10 points if purchased after 14:00 and before 16:00
    AfternoonWindow,
}

impl PointsRule {
    pub const ALL: [PointsRule; 7] = [
        PointsRule::RetailerName,
        PointsRule::RoundDollar,
        PointsRule::QuarterMultiple,
        PointsRule::ItemPairs,
        PointsRule::ItemDescription,
        PointsRule::OddDay,
        PointsRule::AfternoonWindow,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PointsRule::RetailerName => "retailer_name",
            PointsRule::RoundDollar => "round_dollar",
            PointsRule::QuarterMultiple => "quarter_multiple",
            PointsRule::ItemPairs => "item_pairs",
            PointsRule::ItemDescription => "item_description",
            PointsRule::OddDay => "odd_day",
            PointsRule::AfternoonWindow => "afternoon_window",
        }
    }

    /// Points this rule awards for `receipt`
    pub fn evaluate(&self, receipt: &Receipt) -> Result<u64> {
        match self {
            PointsRule::RetailerName => Ok(retailer_points(&receipt.retailer)),
            PointsRule::RoundDollar => {
                let cents = total_cents(receipt)?;
                Ok(if cents % 100 == 0 { 50 } else { 0 })
            }
            PointsRule::QuarterMultiple => {
                let cents = total_cents(receipt)?;
                Ok(if cents % 25 == 0 { 25 } else { 0 })
            }
            PointsRule::ItemPairs => Ok((receipt.items.len() as u64 / 2) * 5),
            PointsRule::ItemDescription => description_points(receipt),
            PointsRule::OddDay => {
                let date = parse_date(&receipt.purchase_date)
                    .ok_or_else(|| ReceiptError::scoring("purchaseDate", &receipt.purchase_date))?;
                Ok(if date.day() % 2 == 1 { 6 } else { 0 })
            }
            PointsRule::AfternoonWindow => {
                let time = parse_time(&receipt.purchase_time)
                    .ok_or_else(|| ReceiptError::scoring("purchaseTime", &receipt.purchase_time))?;
                // 14:00 itself earns nothing; 15:59 does
                let in_window = (time.hour() == 14 && time.minute() > 0) || time.hour() == 15;
                Ok(if in_window { 10 } else { 0 })
            }
        }
    }
}

// ============================================================================
// RULE HELPERS
// ============================================================================

fn retailer_points(retailer: &str) -> u64 {
    retailer.chars().filter(|c| c.is_ascii_alphanumeric()).count() as u64
}

fn total_cents(receipt: &Receipt) -> Result<u64> {
    parse_cents(&receipt.total).ok_or_else(|| ReceiptError::scoring("total", &receipt.total))
}

fn description_points(receipt: &Receipt) -> Result<u64> {
    let mut points = 0;

    for item in &receipt.items {
        let trimmed = item.short_description.trim();
        if trimmed.chars().count() % 3 != 0 {
            continue;
        }

        let cents =
            parse_cents(&item.price).ok_or_else(|| ReceiptError::scoring("price", &item.price))?;
        // ceil(price * 0.2) == ceil(cents / 500)
        points += cents.div_ceil(500);
    }

    Ok(points)
}

/// Parse a `digits.dd` amount into integer cents
pub fn parse_cents(value: &str) -> Option<u64> {
    let (whole, fraction) = value.split_once('.')?;

    if whole.is_empty()
        || fraction.len() != 2
        || !whole.bytes().all(|b| b.is_ascii_digit())
        || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    let dollars: u64 = whole.parse().ok()?;
    let cents: u64 = fraction.parse().ok()?;
    dollars.checked_mul(100)?.checked_add(cents)
}

// ============================================================================
// BREAKDOWN
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleScore {
    pub rule: PointsRule,
    pub points: u64,
}

/// Points earned by each rule; the total is their sum
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PointsBreakdown {
    pub scores: Vec<RuleScore>,
}

impl PointsBreakdown {
    pub fn total(&self) -> u64 {
        self.scores.iter().map(|s| s.points).sum()
    }

    pub fn points_for(&self, rule: PointsRule) -> u64 {
        self.scores
            .iter()
            .find(|s| s.rule == rule)
            .map(|s| s.points)
            .unwrap_or(0)
    }
}

// ============================================================================
// SCORING ENGINE
// ============================================================================

/// Evaluate every rule against a (validated) receipt
pub fn breakdown(receipt: &Receipt) -> Result<PointsBreakdown> {
    let scores = PointsRule::ALL
        .iter()
        .map(|rule| {
            Ok(RuleScore {
                rule: *rule,
                points: rule.evaluate(receipt)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(PointsBreakdown { scores })
}

/// Total points for a (validated) receipt
pub fn score(receipt: &Receipt) -> Result<u64> {
    Ok(breakdown(receipt)?.total())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::{target_fixture, Item};

    fn receipt_with(retailer: &str, date: &str, time: &str, total: &str, items: Vec<Item>) -> Receipt {
        Receipt {
            retailer: retailer.to_string(),
            purchase_date: date.to_string(),
            purchase_time: time.to_string(),
            items,
            total: total.to_string(),
        }
    }

    fn single_item() -> Vec<Item> {
        vec![Item::new("Gum", "1.01")]
    }

    fn rule_points(rule: PointsRule, receipt: &Receipt) -> u64 {
        rule.evaluate(receipt).unwrap()
    }

    #[test]
    fn test_target_fixture_scores_28() {
        let receipt = target_fixture();
        let result = breakdown(&receipt).unwrap();

        assert_eq!(result.points_for(PointsRule::RetailerName), 6);
        assert_eq!(result.points_for(PointsRule::RoundDollar), 0);
        assert_eq!(result.points_for(PointsRule::QuarterMultiple), 0);
        assert_eq!(result.points_for(PointsRule::ItemPairs), 10);
        assert_eq!(result.points_for(PointsRule::ItemDescription), 6);
        assert_eq!(result.points_for(PointsRule::OddDay), 6);
        assert_eq!(result.points_for(PointsRule::AfternoonWindow), 0);
        assert_eq!(score(&receipt).unwrap(), 28);
    }

    #[test]
    fn test_corner_market_scores_109() {
        let receipt = receipt_with(
            "M&M Corner Market",
            "2022-03-20",
            "14:33",
            "9.00",
            vec![
                Item::new("Gatorade", "2.25"),
                Item::new("Gatorade", "2.25"),
                Item::new("Gatorade", "2.25"),
                Item::new("Gatorade", "2.25"),
            ],
        );

        // 14 + 50 + 25 + 10 + 0 + 0 + 10
        assert_eq!(score(&receipt).unwrap(), 109);
    }

    #[test]
    fn test_retailer_counts_only_alphanumerics() {
        let receipt = receipt_with("M&M Corner-Market 7", "2022-01-02", "10:00", "1.01", single_item());
        assert_eq!(rule_points(PointsRule::RetailerName, &receipt), 15);

        let reordered = receipt_with("7 Market-Corner M&M", "2022-01-02", "10:00", "1.01", single_item());
        assert_eq!(rule_points(PointsRule::RetailerName, &reordered), 15);
    }

    #[test]
    fn test_total_boundaries() {
        let round = receipt_with("A", "2022-01-02", "10:00", "100.00", single_item());
        assert_eq!(rule_points(PointsRule::RoundDollar, &round), 50);
        assert_eq!(rule_points(PointsRule::QuarterMultiple, &round), 25);

        let dime = receipt_with("A", "2022-01-02", "10:00", "100.10", single_item());
        assert_eq!(rule_points(PointsRule::RoundDollar, &dime), 0);
        assert_eq!(rule_points(PointsRule::QuarterMultiple, &dime), 0);

        let quarter = receipt_with("A", "2022-01-02", "10:00", "100.25", single_item());
        assert_eq!(rule_points(PointsRule::RoundDollar, &quarter), 0);
        assert_eq!(rule_points(PointsRule::QuarterMultiple, &quarter), 25);
    }

    #[test]
    fn test_item_pairs() {
        for (count, expected) in [(1, 0), (2, 5), (3, 5), (4, 10)] {
            let items = (0..count).map(|_| Item::new("Gum", "1.01")).collect();
            let receipt = receipt_with("A", "2022-01-02", "10:00", "1.01", items);
            assert_eq!(rule_points(PointsRule::ItemPairs, &receipt), expected, "{count} items");
        }
    }

    #[test]
    fn test_description_length_multiple_of_three() {
        // "Emils Cheese Pizza" is 18 characters: ceil(12.25 * 0.2) = 3
        let qualifying = receipt_with("A", "2022-01-02", "10:00", "1.01", vec![Item::new("Emils Cheese Pizza", "12.25")]);
        assert_eq!(rule_points(PointsRule::ItemDescription, &qualifying), 3);

        // "Mountain Dew 12PK" is 17 characters and earns nothing at any price
        let other = receipt_with("A", "2022-01-02", "10:00", "1.01", vec![Item::new("Mountain Dew 12PK", "6.49")]);
        assert_eq!(rule_points(PointsRule::ItemDescription, &other), 0);
    }

    #[test]
    fn test_description_is_trimmed_and_price_rounds_up() {
        let receipt = receipt_with(
            "A",
            "2022-01-02",
            "10:00",
            "1.01",
            vec![
                Item::new("   Klarbrunn 12-PK 12 FL OZ  ", "12.00"),
                Item::new("Pop", "6.00"),
                Item::new("Ice", "5.00"),
                Item::new("Tea", "0.00"),
            ],
        );

        // 3 (2.4) + 2 (1.2) + 1 (exactly 1.0) + 0
        assert_eq!(rule_points(PointsRule::ItemDescription, &receipt), 6);
    }

    #[test]
    fn test_odd_day() {
        let odd = receipt_with("A", "2022-01-01", "10:00", "1.01", single_item());
        assert_eq!(rule_points(PointsRule::OddDay, &odd), 6);

        let even = receipt_with("A", "2022-01-02", "10:00", "1.01", single_item());
        assert_eq!(rule_points(PointsRule::OddDay, &even), 0);
    }

    #[test]
    fn test_afternoon_window_boundaries() {
        for (time, expected) in [
            ("13:59", 0),
            ("14:00", 0),
            ("14:01", 10),
            ("15:00", 10),
            ("15:59", 10),
            ("16:00", 0),
        ] {
            let receipt = receipt_with("A", "2022-01-02", time, "1.01", single_item());
            assert_eq!(rule_points(PointsRule::AfternoonWindow, &receipt), expected, "time {time}");
        }
    }

    #[test]
    fn test_breakdown_total_matches_score() {
        let receipt = target_fixture();
        let result = breakdown(&receipt).unwrap();

        assert_eq!(result.scores.len(), PointsRule::ALL.len());
        assert_eq!(result.total(), score(&receipt).unwrap());
    }

    #[test]
    fn test_unparseable_fields_are_scoring_errors() {
        let mut receipt = target_fixture();
        receipt.total = "abc".to_string();
        assert!(matches!(score(&receipt), Err(ReceiptError::Scoring { field: "total", .. })));

        let mut receipt = target_fixture();
        receipt.purchase_date = "2022-13-01".to_string();
        assert!(matches!(score(&receipt), Err(ReceiptError::Scoring { field: "purchaseDate", .. })));

        let mut receipt = target_fixture();
        receipt.purchase_time = "noon".to_string();
        assert!(matches!(score(&receipt), Err(ReceiptError::Scoring { field: "purchaseTime", .. })));
    }

    #[test]
    fn test_parse_cents() {
        assert_eq!(parse_cents("35.35"), Some(3535));
        assert_eq!(parse_cents("0.00"), Some(0));
        assert_eq!(parse_cents("35.3"), None);
        assert_eq!(parse_cents(".35"), None);
        assert_eq!(parse_cents("-1.00"), None);
        assert_eq!(parse_cents("99999999999999999999.00"), None);
    }
}
