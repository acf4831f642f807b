use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::StatsService;
use crate::errors::ConscienceError;
use crate::ledger::TransactionStore;

pub const USER_DISPLAY_NAME: &str = "You";

/// Synthetic competitors: name, monthly savings, overall savings.
const COMPETITORS: &[(&str, f64, f64)] = &[
    ("Alex M.", 420.0, 3150.0),
    ("Jordan K.", 310.0, 2240.0),
    ("Sam R.", 275.0, 1580.0),
    ("Taylor S.", 190.0, 960.0),
    ("Casey L.", 120.0, 540.0),
    ("Riley P.", 65.0, 210.0),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaderboardView {
    #[default]
    Monthly,
    Overall,
}

impl LeaderboardView {
    pub fn as_str(self) -> &'static str {
        match self {
            LeaderboardView::Monthly => "monthly",
            LeaderboardView::Overall => "overall",
        }
    }
}

impl fmt::Display for LeaderboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeaderboardView {
    type Err = ConscienceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" | "month" => Ok(LeaderboardView::Monthly),
            "overall" | "all" | "all-time" => Ok(LeaderboardView::Overall),
            other => Err(ConscienceError::InvalidInput(format!(
                "unknown leaderboard view `{other}` (expected monthly or overall)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum RankTier {
    GettingStarted,
    SmartSaver,
    BudgetHero,
    ReturnRanger,
    SavingsSamurai,
    FinancialChampion,
}

impl RankTier {
    /// Lower bounds, highest first.
    const THRESHOLDS: [(f64, RankTier); 5] = [
        (2500.0, RankTier::FinancialChampion),
        (1000.0, RankTier::SavingsSamurai),
        (500.0, RankTier::ReturnRanger),
        (200.0, RankTier::BudgetHero),
        (50.0, RankTier::SmartSaver),
    ];

    pub fn for_savings(saved: f64) -> Self {
        Self::THRESHOLDS
            .iter()
            .find(|(floor, _)| saved >= *floor)
            .map(|(_, tier)| *tier)
            .unwrap_or(RankTier::GettingStarted)
    }

    pub fn label(self) -> &'static str {
        match self {
            RankTier::GettingStarted => "Getting Started",
            RankTier::SmartSaver => "Smart Saver",
            RankTier::BudgetHero => "Budget Hero",
            RankTier::ReturnRanger => "Return Ranger",
            RankTier::SavingsSamurai => "Savings Samurai",
            RankTier::FinancialChampion => "Financial Champion",
        }
    }
}

impl fmt::Display for RankTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub name: String,
    pub saved: f64,
    pub tier: RankTier,
    pub is_user: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leaderboard {
    pub view: LeaderboardView,
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn user_entry(&self) -> Option<&LeaderboardEntry> {
        self.entries.iter().find(|entry| entry.is_user)
    }
}

pub struct LeaderboardService;

impl LeaderboardService {
    pub fn rank(user_saved: f64, view: LeaderboardView) -> Leaderboard {
        let mut rows: Vec<(String, f64, bool)> = COMPETITORS
            .iter()
            .map(|(name, monthly, overall)| {
                let saved = match view {
                    LeaderboardView::Monthly => *monthly,
                    LeaderboardView::Overall => *overall,
                };
                (name.to_string(), saved, false)
            })
            .collect();
        rows.push((USER_DISPLAY_NAME.to_string(), user_saved, true));
        // Stable: ties keep insertion order, so the user sits below equal competitors.
        rows.sort_by(|a, b| b.1.total_cmp(&a.1));

        let entries = rows
            .into_iter()
            .enumerate()
            .map(|(index, (name, saved, is_user))| LeaderboardEntry {
                rank: index + 1,
                name,
                saved,
                tier: RankTier::for_savings(saved),
                is_user,
            })
            .collect();
        Leaderboard { view, entries }
    }

    pub fn for_store(
        store: &TransactionStore,
        today: NaiveDate,
        view: LeaderboardView,
    ) -> Leaderboard {
        let saved = match view {
            LeaderboardView::Monthly => StatsService::monthly_saved(store, today),
            LeaderboardView::Overall => StatsService::total_saved(store),
        };
        Self::rank(saved, view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_follow_thresholds() {
        assert_eq!(RankTier::for_savings(0.0), RankTier::GettingStarted);
        assert_eq!(RankTier::for_savings(49.99), RankTier::GettingStarted);
        assert_eq!(RankTier::for_savings(50.0), RankTier::SmartSaver);
        assert_eq!(RankTier::for_savings(200.0), RankTier::BudgetHero);
        assert_eq!(RankTier::for_savings(999.0), RankTier::ReturnRanger);
        assert_eq!(RankTier::for_savings(1000.0), RankTier::SavingsSamurai);
        assert_eq!(RankTier::for_savings(2500.0), RankTier::FinancialChampion);
    }

    #[test]
    fn user_is_placed_by_savings() {
        let board = LeaderboardService::rank(300.0, LeaderboardView::Monthly);
        let user = board.user_entry().unwrap();
        assert_eq!(user.rank, 3);
        assert_eq!(user.tier, RankTier::BudgetHero);
        assert_eq!(board.entries.len(), COMPETITORS.len() + 1);
        assert!(board
            .entries
            .windows(2)
            .all(|pair| pair[0].saved >= pair[1].saved));
    }

    #[test]
    fn user_ranks_after_competitor_on_tie() {
        let board = LeaderboardService::rank(310.0, LeaderboardView::Monthly);
        assert_eq!(board.entries[1].name, "Jordan K.");
        assert_eq!(board.user_entry().unwrap().rank, 3);
    }

    #[test]
    fn zero_savings_is_last() {
        let board = LeaderboardService::rank(0.0, LeaderboardView::Overall);
        assert_eq!(board.user_entry().unwrap().rank, COMPETITORS.len() + 1);
    }

    #[test]
    fn view_parses_aliases() {
        assert_eq!(
            "ALL".parse::<LeaderboardView>().unwrap(),
            LeaderboardView::Overall
        );
        assert!("weekly".parse::<LeaderboardView>().is_err());
    }
}
