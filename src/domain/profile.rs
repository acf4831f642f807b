use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ConscienceError;

/// Self-reported financial context collected during onboarding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub monthly_income: f64,
    pub weakness: String,
    pub goal_name: String,
    pub goal_amount: f64,
}

impl UserProfile {
    pub fn new(
        monthly_income: f64,
        weakness: impl Into<String>,
        goal_name: impl Into<String>,
        goal_amount: f64,
    ) -> Self {
        Self {
            monthly_income,
            weakness: weakness.into(),
            goal_name: goal_name.into(),
            goal_amount,
        }
    }

    pub fn validate(&self) -> Result<(), ConscienceError> {
        if !self.monthly_income.is_finite() || self.monthly_income < 0.0 {
            return Err(ConscienceError::InvalidInput(
                "monthly income cannot be negative".into(),
            ));
        }
        if self.goal_name.trim().is_empty() {
            return Err(ConscienceError::InvalidInput("goal name is required".into()));
        }
        if !self.goal_amount.is_finite() || self.goal_amount <= 0.0 {
            return Err(ConscienceError::InvalidInput(
                "goal amount must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Voice the AI uses when judging purchases and writing call scripts.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AiTone {
    #[default]
    Encouraging,
    Stern,
    Ruthless,
}

impl AiTone {
    pub fn as_str(self) -> &'static str {
        match self {
            AiTone::Encouraging => "encouraging",
            AiTone::Stern => "stern",
            AiTone::Ruthless => "ruthless",
        }
    }
}

impl fmt::Display for AiTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AiTone {
    type Err = ConscienceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "encouraging" => Ok(AiTone::Encouraging),
            "stern" => Ok(AiTone::Stern),
            "ruthless" => Ok(AiTone::Ruthless),
            other => Err(ConscienceError::InvalidInput(format!(
                "unknown tone `{other}` (expected encouraging, stern or ruthless)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_requires_positive_goal() {
        let profile = UserProfile::new(4200.0, "gadgets", "Emergency fund", 0.0);
        assert!(profile.validate().is_err());
        let profile = UserProfile::new(4200.0, "gadgets", "Emergency fund", 1500.0);
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn tone_round_trips_through_its_storage_string() {
        for tone in [AiTone::Encouraging, AiTone::Stern, AiTone::Ruthless] {
            assert_eq!(tone.as_str().parse::<AiTone>().unwrap(), tone);
        }
        assert_eq!(serde_json::to_string(&AiTone::Ruthless).unwrap(), "\"ruthless\"");
    }
}
