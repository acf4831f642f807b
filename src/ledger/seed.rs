use chrono::{Duration, NaiveDate};

use crate::domain::{Category, PurchaseDraft, Transaction, TransactionStatus, MAX_NAG_COUNT};

struct Example {
    item: &'static str,
    amount: f64,
    category: Category,
    returnable: bool,
    status: TransactionStatus,
    days_ago: i64,
    nag_count: u8,
    hot_take: Option<&'static str>,
}

const EXAMPLES: &[Example] = &[
    Example {
        item: "Noise-cancelling headphones",
        amount: 349.0,
        category: Category::Electronics,
        returnable: true,
        status: TransactionStatus::Returned,
        days_ago: 2,
        nag_count: 2,
        hot_take: None,
    },
    Example {
        item: "Limited edition sneakers",
        amount: 180.0,
        category: Category::Clothing,
        returnable: true,
        status: TransactionStatus::Kept,
        days_ago: 5,
        nag_count: 1,
        hot_take: None,
    },
    Example {
        item: "Late-night pizza",
        amount: 24.5,
        category: Category::FastFood,
        returnable: false,
        status: TransactionStatus::Kept,
        days_ago: 1,
        nag_count: MAX_NAG_COUNT,
        hot_take: None,
    },
    Example {
        item: "Weekly groceries",
        amount: 86.2,
        category: Category::Groceries,
        returnable: false,
        status: TransactionStatus::Approved,
        days_ago: 3,
        nag_count: 0,
        hot_take: None,
    },
    Example {
        item: "Espresso machine",
        amount: 129.99,
        category: Category::Home,
        returnable: true,
        status: TransactionStatus::Returned,
        days_ago: 9,
        nag_count: 0,
        hot_take: None,
    },
    Example {
        item: "Gaming console bundle",
        amount: 499.0,
        category: Category::Electronics,
        returnable: false,
        status: TransactionStatus::Urge,
        days_ago: 0,
        nag_count: 0,
        hot_take: Some("You already own three consoles. This is a hobby, not a need."),
    },
];

/// Demo records shown to new users and restored by "clear history".
///
/// Dates are relative to `today` so the dashboard looks alive in the current month.
pub fn example_transactions(today: NaiveDate) -> Vec<Transaction> {
    EXAMPLES
        .iter()
        .map(|example| {
            let mut draft = PurchaseDraft::new(example.item, example.amount, example.category);
            draft.is_returnable = example.returnable;
            let date = today - Duration::days(example.days_ago);
            let mut txn = Transaction::from_draft(&draft, date, example.status);
            txn.nag_count = example.nag_count;
            txn.hot_take = example.hot_take.map(str::to_string);
            txn.is_example = true;
            txn
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn examples_respect_lifecycle_invariants() {
        let today = NaiveDate::from_ymd_opt(2024, 9, 15).unwrap();
        let examples = example_transactions(today);
        assert!(!examples.is_empty());
        for txn in &examples {
            assert!(txn.is_example);
            assert!(txn.nag_count <= MAX_NAG_COUNT);
            assert!(txn.next_nag_at.is_none());
            if txn.nag_count == MAX_NAG_COUNT {
                assert_eq!(txn.status, TransactionStatus::Kept);
            }
        }
    }
}
