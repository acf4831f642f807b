//! Contract with the generative-AI collaborator.
//!
//! The core never talks to a model directly; it only sees [`AnalysisGateway`].
//! [`OfflineGateway`] is a deterministic stand-in used by the CLI and
//! [`ScriptedGateway`] is a counting double for tests.

pub mod offline;
pub mod scripted;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{AiTone, Category, PurchaseDraft, UserProfile};
use crate::errors::ConscienceError;

pub use crate::domain::{AudioHandle, PurchaseAnalysis};
pub use offline::OfflineGateway;
pub use scripted::ScriptedGateway;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("analysis failed: {0}")]
    AnalysisFailure(String),
    #[error("audio generation failed: {0}")]
    AudioGenerationFailure(String),
    #[error("receipt parse failed: {0}")]
    ReceiptParseFailure(String),
}

/// Everything the model sees when judging a purchase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseContext {
    pub item: String,
    pub amount: f64,
    pub category: Category,
    pub is_returnable: bool,
    pub return_by: Option<NaiveDate>,
    pub justification: Option<String>,
    pub tone: AiTone,
    pub profile: Option<UserProfile>,
    pub emotional_context: Option<String>,
    pub is_urge: bool,
}

impl PurchaseContext {
    pub fn from_draft(draft: &PurchaseDraft, tone: AiTone, profile: Option<UserProfile>) -> Self {
        Self {
            item: draft.item.clone(),
            amount: draft.amount,
            category: draft.category,
            is_returnable: draft.is_returnable,
            return_by: draft.return_by,
            justification: draft.justification.clone(),
            tone,
            profile,
            emotional_context: draft.emotional_context.clone(),
            is_urge: draft.is_urge,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NagRequest {
    pub item: String,
    pub amount: f64,
    pub category: Category,
    pub nag_count: u8,
    pub tone: AiTone,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NagScript {
    pub script: String,
}

/// Receipt fields exactly as the OCR model produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReceipt {
    pub item: String,
    pub amount: f64,
    pub category: String,
}

/// Receipt fields after validation, ready to prefill a purchase.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptScan {
    pub item: String,
    pub amount: f64,
    pub category: Category,
}

impl RawReceipt {
    /// Validates the model output; unknown categories fall back to [`Category::DEFAULT`].
    pub fn into_scan(self) -> Result<ReceiptScan, ConscienceError> {
        let item = self.item.trim().to_string();
        if item.is_empty() {
            return Err(ConscienceError::ReceiptParseFailure(
                "receipt did not contain an item name".into(),
            ));
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(ConscienceError::ReceiptParseFailure(format!(
                "receipt total {} is not a positive amount",
                self.amount
            )));
        }
        Ok(ReceiptScan {
            item,
            amount: self.amount,
            category: Category::parse_or_default(&self.category),
        })
    }
}

impl ReceiptScan {
    pub fn into_draft(self) -> PurchaseDraft {
        PurchaseDraft::new(self.item, self.amount, self.category)
    }
}

#[async_trait]
pub trait AnalysisGateway: Send + Sync {
    async fn analyze_purchase(
        &self,
        context: &PurchaseContext,
    ) -> Result<PurchaseAnalysis, GatewayError>;

    async fn generate_call_audio(&self, script: &str) -> Result<AudioHandle, GatewayError>;

    /// Fails with [`GatewayError::AudioGenerationFailure`], like call audio.
    async fn generate_nag_script(&self, request: &NagRequest) -> Result<NagScript, GatewayError>;

    async fn analyze_receipt(&self, image: &[u8]) -> Result<RawReceipt, GatewayError>;

    async fn financial_tip(&self, category: Category) -> Result<String, GatewayError>;
}
