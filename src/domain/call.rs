use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Structured verdict returned by the analysis gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PurchaseAnalysis {
    pub is_necessary: bool,
    pub reasoning: String,
    pub call_script: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hot_take: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_return_by: Option<NaiveDate>,
}

impl PurchaseAnalysis {
    /// Analysis shown for a scheduled follow-up; follow-ups are never "necessary".
    pub fn follow_up(number: u8, script: impl Into<String>) -> Self {
        Self {
            is_necessary: false,
            reasoning: format!("Follow-up #{number}: you still have time to return this."),
            call_script: script.into(),
            hot_take: None,
            estimated_return_by: None,
        }
    }
}

/// Opaque reference to synthesized speech that a presentation layer can play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioHandle(pub String);

impl AudioHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// First call, raised right after the purchase was judged unnecessary.
    Verdict,
    /// Escalation raised by the nag scheduler.
    FollowUp { number: u8 },
}

/// The single simulated incoming call; lives only in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct CallState {
    pub transaction_id: Uuid,
    pub analysis: PurchaseAnalysis,
    pub audio: Option<AudioHandle>,
    pub kind: CallKind,
    pub started_at: DateTime<Utc>,
}

impl CallState {
    pub fn script(&self) -> &str {
        &self.analysis.call_script
    }
}
