use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    core::services::LeaderboardView,
    core::utils::{ensure_dir, PathResolver},
    errors::{ConscienceError, Result},
    lifecycle::policy::{NagPolicy, DEFAULT_NAG_INTERVAL_SECS, MAX_NAG_INTERVAL_SECS},
    storage::json_backend::{tmp_path, write_atomic},
};

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
pub const MAX_POLL_INTERVAL_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub currency_symbol: String,
    /// Delay between a "keep" answer and the next follow-up call.
    pub nag_interval_secs: i64,
    /// How often the scheduler looks for due follow-ups.
    pub poll_interval_secs: u64,
    pub leaderboard_view: LeaderboardView,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency_symbol: "$".into(),
            nag_interval_secs: DEFAULT_NAG_INTERVAL_SECS,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            leaderboard_view: LeaderboardView::Monthly,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_NAG_INTERVAL_SECS).contains(&self.nag_interval_secs) {
            return Err(ConscienceError::Config(format!(
                "nag_interval_secs must be between 1 and {MAX_NAG_INTERVAL_SECS}"
            )));
        }
        if !(1..=MAX_POLL_INTERVAL_SECS).contains(&self.poll_interval_secs) {
            return Err(ConscienceError::Config(format!(
                "poll_interval_secs must be between 1 and {MAX_POLL_INTERVAL_SECS}"
            )));
        }
        Ok(())
    }

    /// Out-of-range intervals are clamped, so a hand-edited file cannot overflow dates.
    pub fn nag_policy(&self) -> NagPolicy {
        let secs = self.nag_interval_secs.clamp(1, MAX_NAG_INTERVAL_SECS);
        NagPolicy::with_interval(chrono::Duration::seconds(secs))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.clamp(1, MAX_POLL_INTERVAL_SECS))
    }

    pub fn format_amount(&self, amount: f64) -> String {
        format!("{}{:.2}", self.currency_symbol, amount)
    }
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(PathResolver::base_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
        })
    }

    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        let config: Config = serde_json::from_str(&data)
            .map_err(|err| ConscienceError::Config(format!("{}: {err}", self.path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        config.validate()?;
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
