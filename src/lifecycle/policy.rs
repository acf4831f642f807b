//! Local rules that decide lifecycle outcomes without consulting the AI.

use chrono::Duration;

use crate::domain::{Category, PurchaseDraft, Transaction, MAX_NAG_COUNT};

/// Purchases above this amount are worth chasing with follow-up calls.
pub const SIGNIFICANT_AMOUNT: f64 = 250.0;

/// Stored on a transaction when the analysis gateway could not judge it.
pub const ANALYSIS_FAILURE_MESSAGE: &str = "Analysis failed. Flagged for manual review.";

pub const DEFAULT_NAG_INTERVAL_SECS: i64 = 24 * 60 * 60;

/// Longest accepted gap between follow-up calls.
pub const MAX_NAG_INTERVAL_SECS: i64 = 365 * DEFAULT_NAG_INTERVAL_SECS;

/// Substrings that mark an item name as fast food, matched case-insensitively.
const FAST_FOOD_KEYWORDS: &[&str] = &[
    "mcdonald",
    "burger",
    "whopper",
    "big mac",
    "pizza",
    "taco",
    "burrito",
    "kfc",
    "fried chicken",
    "nugget",
    "fries",
    "wendy",
    "popeyes",
    "chick-fil-a",
    "domino",
    "subway",
    "chipotle",
    "five guys",
    "in-n-out",
    "drive-thru",
    "drive thru",
    "hot dog",
];

/// Escalation knobs for flagged purchases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NagPolicy {
    pub max_nags: u8,
    pub significant_amount: f64,
    pub interval: Duration,
}

impl Default for NagPolicy {
    fn default() -> Self {
        Self {
            max_nags: MAX_NAG_COUNT,
            significant_amount: SIGNIFICANT_AMOUNT,
            interval: Duration::seconds(DEFAULT_NAG_INTERVAL_SECS),
        }
    }
}

impl NagPolicy {
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            ..Self::default()
        }
    }

    /// Only returnable purchases above the threshold get follow-up calls.
    pub fn warrants_follow_up(&self, transaction: &Transaction) -> bool {
        transaction.is_returnable && transaction.amount > self.significant_amount
    }
}

/// The category is authoritative; otherwise the item name is keyword-matched.
pub fn is_fast_food(category: Category, item: &str) -> bool {
    if category == Category::FastFood {
        return true;
    }
    let name = item.to_lowercase();
    FAST_FOOD_KEYWORDS
        .iter()
        .any(|keyword| name.contains(keyword))
}

/// Fast food that cannot be returned skips analysis and is kept with full shame.
pub fn short_circuits(draft: &PurchaseDraft) -> bool {
    !draft.is_urge && !draft.is_returnable && is_fast_food(draft.category, &draft.item)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_alone_marks_fast_food() {
        assert!(is_fast_food(Category::FastFood, "Salad"));
    }

    #[test]
    fn keyword_match_is_substring_and_case_insensitive() {
        assert!(is_fast_food(Category::Dining, "Double CHEESEBURGER combo"));
        assert!(is_fast_food(Category::Other, "Late night Pizzas"));
        assert!(!is_fast_food(Category::Dining, "Sushi platter"));
    }

    #[test]
    fn short_circuit_requires_non_returnable_non_urge() {
        let burger = PurchaseDraft::new("Burger meal", 12.0, Category::Dining);
        assert!(short_circuits(&burger));
        assert!(!short_circuits(&burger.clone().returnable(None)));
        assert!(!short_circuits(&burger.urge()));
    }

    #[test]
    fn follow_up_needs_significant_returnable_purchase() {
        let policy = NagPolicy::default();
        let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let make = |amount: f64, returnable: bool| {
            let mut draft = PurchaseDraft::new("Item", amount, Category::Electronics);
            draft.is_returnable = returnable;
            Transaction::from_draft(&draft, date, crate::domain::TransactionStatus::Pending)
        };
        assert!(policy.warrants_follow_up(&make(300.0, true)));
        assert!(!policy.warrants_follow_up(&make(250.0, true)));
        assert!(!policy.warrants_follow_up(&make(300.0, false)));
    }
}
