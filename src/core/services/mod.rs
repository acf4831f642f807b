pub mod leaderboard_service;
pub mod stats_service;

pub use leaderboard_service::{
    Leaderboard, LeaderboardEntry, LeaderboardService, LeaderboardView, RankTier,
};
pub use stats_service::{SavingsSummary, StatsService};
