use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::category::Category;
use crate::errors::ConscienceError;

/// Upper bound on follow-up attempts for a single purchase.
pub const MAX_NAG_COUNT: u8 = 7;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TransactionStatus {
    Pending,
    Approved,
    Flagged,
    Returned,
    Kept,
    Urge,
}

impl TransactionStatus {
    /// Returned and Kept end the nag lifecycle.
    pub fn is_terminal(self) -> bool {
        matches!(self, TransactionStatus::Returned | TransactionStatus::Kept)
    }

    pub fn label(self) -> &'static str {
        match self {
            TransactionStatus::Pending => "Pending",
            TransactionStatus::Approved => "Approved",
            TransactionStatus::Flagged => "Flagged",
            TransactionStatus::Returned => "Returned",
            TransactionStatus::Kept => "Kept",
            TransactionStatus::Urge => "Urge",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What the user typed (or the receipt scanner produced) before any judgement.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseDraft {
    pub item: String,
    pub amount: f64,
    pub category: Category,
    pub is_returnable: bool,
    pub return_by: Option<NaiveDate>,
    pub justification: Option<String>,
    pub emotional_context: Option<String>,
    pub is_urge: bool,
}

impl PurchaseDraft {
    pub fn new(item: impl Into<String>, amount: f64, category: Category) -> Self {
        Self {
            item: item.into(),
            amount,
            category,
            is_returnable: false,
            return_by: None,
            justification: None,
            emotional_context: None,
            is_urge: false,
        }
    }

    pub fn returnable(mut self, return_by: Option<NaiveDate>) -> Self {
        self.is_returnable = true;
        self.return_by = return_by;
        self
    }

    pub fn urge(mut self) -> Self {
        self.is_urge = true;
        self
    }

    pub fn with_justification(mut self, justification: impl Into<String>) -> Self {
        self.justification = Some(justification.into());
        self
    }

    pub fn with_emotional_context(mut self, context: impl Into<String>) -> Self {
        self.emotional_context = Some(context.into());
        self
    }

    pub fn validate(&self) -> Result<(), ConscienceError> {
        if self.item.trim().is_empty() {
            return Err(ConscienceError::InvalidInput("item name is required".into()));
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(ConscienceError::InvalidInput(format!(
                "amount must be a positive number, got {}",
                self.amount
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub item: String,
    pub category: Category,
    pub amount: f64,
    pub date: NaiveDate,
    pub is_returnable: bool,
    pub status: TransactionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_by: Option<NaiveDate>,
    #[serde(default)]
    pub nag_count: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_nag_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotional_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hot_take: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub is_example: bool,
}

impl Transaction {
    pub fn from_draft(draft: &PurchaseDraft, date: NaiveDate, status: TransactionStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            item: draft.item.trim().to_string(),
            category: draft.category,
            amount: draft.amount,
            date,
            is_returnable: draft.is_returnable,
            status,
            return_by: draft.return_by,
            nag_count: 0,
            next_nag_at: None,
            justification: draft.justification.clone(),
            emotional_context: draft.emotional_context.clone(),
            hot_take: None,
            reasoning: None,
            error: None,
            is_example: false,
        }
    }

    /// Rebuilds the submission that produced this record, used when an urge is promoted.
    pub fn to_draft(&self) -> PurchaseDraft {
        PurchaseDraft {
            item: self.item.clone(),
            amount: self.amount,
            category: self.category,
            is_returnable: self.is_returnable,
            return_by: self.return_by,
            justification: self.justification.clone(),
            emotional_context: self.emotional_context.clone(),
            is_urge: false,
        }
    }

    /// Moves the record into Returned or Kept and drops all pending nag state.
    pub fn finish(&mut self, status: TransactionStatus) {
        debug_assert!(status.is_terminal());
        self.status = status;
        self.next_nag_at = None;
        self.error = None;
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_nag_at.map(|at| at <= now).unwrap_or(false)
    }

    pub fn is_real(&self) -> bool {
        !self.is_example
    }
}
