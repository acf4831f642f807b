use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::domain::{Transaction, TransactionStatus, UserProfile};
use crate::ledger::TransactionStore;

/// Share of every returned dollar earmarked for the savings goal.
pub const GOAL_SHARE: f64 = 0.4;
/// Share of every returned dollar that goes back to the bank balance.
pub const REFUND_SHARE: f64 = 0.6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingsSummary {
    pub total_saved: f64,
    pub monthly_saved: f64,
    pub goal_allocation: f64,
    pub bank_refund: f64,
    pub returned_count: usize,
    pub kept_count: usize,
    /// True while the numbers come from the seeded examples.
    pub using_examples: bool,
}

pub struct StatsService;

impl StatsService {
    /// Transactions statistics are computed over: the user's own once any
    /// exist, the examples until then.
    pub fn basis(store: &TransactionStore) -> Vec<&Transaction> {
        let using_examples = !store.has_real_transactions();
        store.filter(|txn| txn.is_example == using_examples)
    }

    pub fn total_saved(store: &TransactionStore) -> f64 {
        Self::basis(store)
            .into_iter()
            .filter(|txn| txn.status == TransactionStatus::Returned)
            .map(|txn| txn.amount)
            .sum()
    }

    /// Returned amounts dated in the same calendar month and year as `today`.
    pub fn monthly_saved(store: &TransactionStore, today: NaiveDate) -> f64 {
        Self::basis(store)
            .into_iter()
            .filter(|txn| txn.status == TransactionStatus::Returned)
            .filter(|txn| txn.date.year() == today.year() && txn.date.month() == today.month())
            .map(|txn| txn.amount)
            .sum()
    }

    pub fn summary(store: &TransactionStore, today: NaiveDate) -> SavingsSummary {
        let basis = Self::basis(store);
        let count = |status: TransactionStatus| basis.iter().filter(|t| t.status == status).count();
        let total_saved = Self::total_saved(store);
        SavingsSummary {
            total_saved,
            monthly_saved: Self::monthly_saved(store, today),
            goal_allocation: total_saved * GOAL_SHARE,
            bank_refund: total_saved * REFUND_SHARE,
            returned_count: count(TransactionStatus::Returned),
            kept_count: count(TransactionStatus::Kept),
            using_examples: !store.has_real_transactions(),
        }
    }

    /// Percentage of the profile goal covered by the goal allocation, in `[0, 100]`.
    pub fn goal_progress(summary: &SavingsSummary, profile: Option<&UserProfile>) -> Option<f64> {
        let profile = profile?;
        if profile.goal_amount <= 0.0 {
            return None;
        }
        Some((summary.goal_allocation / profile.goal_amount * 100.0).clamp(0.0, 100.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, PurchaseDraft};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn txn(amount: f64, status: TransactionStatus, date: NaiveDate, example: bool) -> Transaction {
        let draft = PurchaseDraft::new("Thing", amount, Category::Other);
        let mut txn = Transaction::from_draft(&draft, date, status);
        txn.is_example = example;
        txn
    }

    #[test]
    fn examples_are_ignored_once_real_data_exists() {
        let store = TransactionStore::new(vec![
            txn(100.0, TransactionStatus::Returned, day(2024, 6, 1), false),
            txn(50.0, TransactionStatus::Kept, day(2024, 6, 2), false),
            txn(200.0, TransactionStatus::Returned, day(2024, 6, 3), true),
        ]);
        let summary = StatsService::summary(&store, day(2024, 6, 15));
        assert_eq!(summary.total_saved, 100.0);
        assert_eq!(summary.goal_allocation, 40.0);
        assert_eq!(summary.bank_refund, 60.0);
        assert_eq!(summary.returned_count, 1);
        assert_eq!(summary.kept_count, 1);
        assert!(!summary.using_examples);
    }

    #[test]
    fn examples_count_until_first_real_purchase() {
        let store = TransactionStore::new(vec![
            txn(200.0, TransactionStatus::Returned, day(2024, 6, 3), true),
            txn(80.0, TransactionStatus::Kept, day(2024, 6, 3), true),
        ]);
        let summary = StatsService::summary(&store, day(2024, 6, 15));
        assert_eq!(summary.total_saved, 200.0);
        assert!(summary.using_examples);
    }

    #[test]
    fn monthly_total_matches_month_and_year() {
        let store = TransactionStore::new(vec![
            txn(10.0, TransactionStatus::Returned, day(2024, 6, 1), false),
            txn(20.0, TransactionStatus::Returned, day(2024, 5, 31), false),
            txn(40.0, TransactionStatus::Returned, day(2023, 6, 10), false),
            txn(80.0, TransactionStatus::Flagged, day(2024, 6, 10), false),
        ]);
        assert_eq!(StatsService::monthly_saved(&store, day(2024, 6, 30)), 10.0);
        assert_eq!(StatsService::total_saved(&store), 70.0);
    }

    #[test]
    fn goal_progress_is_clamped() {
        let store = TransactionStore::new(vec![txn(
            1000.0,
            TransactionStatus::Returned,
            day(2024, 6, 1),
            false,
        )]);
        let summary = StatsService::summary(&store, day(2024, 6, 2));
        let small_goal = UserProfile::new(3000.0, "games", "Console", 100.0);
        let big_goal = UserProfile::new(3000.0, "games", "Car", 4000.0);
        assert_eq!(StatsService::goal_progress(&summary, Some(&small_goal)), Some(100.0));
        assert_eq!(StatsService::goal_progress(&summary, Some(&big_goal)), Some(10.0));
        assert_eq!(StatsService::goal_progress(&summary, None), None);
    }
}
