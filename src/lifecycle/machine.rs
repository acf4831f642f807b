//! Per-transaction status transitions.
//!
//! Every function takes the current record by reference and returns the next
//! one; nothing here performs I/O or awaits.
//!
//! ```text
//! submit ─┬─ fast food ───────────────▶ Kept (nag_count = max)
//!         ├─ urge ────────────────────▶ Urge ── buy ──▶ (re-judged)
//!         ├─ necessary ───────────────▶ Approved
//!         ├─ unnecessary ─────────────▶ Pending ── call ─┬─ return ─▶ Returned
//!         └─ gateway failure ─────────▶ Flagged          └─ keep ───▶ Flagged ─(nag)─▶ ... ─▶ Kept
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, warn};

use super::policy::{short_circuits, NagPolicy, ANALYSIS_FAILURE_MESSAGE};
use crate::domain::{PurchaseAnalysis, PurchaseDraft, Transaction, TransactionStatus};
use crate::errors::{ConscienceError, Result};
use crate::gateway::GatewayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickAction {
    Return,
    Keep,
    Buy,
}

/// How the user answered a simulated call. Declining counts as `Keep`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallResolution {
    Return,
    Keep,
}

/// Outcome of judging a submission: the record to store and, when the
/// purchase was deemed unnecessary, the analysis that should ring the phone.
#[derive(Debug, Clone, PartialEq)]
pub struct Judgement {
    pub transaction: Transaction,
    pub call: Option<PurchaseAnalysis>,
}

/// Record for a fast-food purchase that bypasses analysis entirely.
pub fn kept_with_full_shame(
    draft: &PurchaseDraft,
    today: NaiveDate,
    policy: &NagPolicy,
) -> Transaction {
    debug_assert!(short_circuits(draft));
    let mut txn = Transaction::from_draft(draft, today, TransactionStatus::Kept);
    txn.nag_count = policy.max_nags;
    txn
}

/// Applies the gateway verdict (or its failure) to a fresh submission.
pub fn judge(
    draft: &PurchaseDraft,
    today: NaiveDate,
    verdict: std::result::Result<PurchaseAnalysis, GatewayError>,
) -> Judgement {
    match verdict {
        Ok(analysis) => {
            let status = if draft.is_urge {
                TransactionStatus::Urge
            } else if analysis.is_necessary {
                TransactionStatus::Approved
            } else {
                TransactionStatus::Pending
            };
            let mut txn = Transaction::from_draft(draft, today, status);
            txn.reasoning = Some(analysis.reasoning.clone());
            txn.hot_take = analysis.hot_take.clone();
            if txn.return_by.is_none() {
                txn.return_by = analysis.estimated_return_by;
            }
            let call = (status == TransactionStatus::Pending).then_some(analysis);
            Judgement {
                transaction: txn,
                call,
            }
        }
        Err(err) => {
            debug!(item = %draft.item, error = %err, "recording purchase without analysis");
            let status = if draft.is_urge {
                TransactionStatus::Urge
            } else {
                TransactionStatus::Flagged
            };
            let mut txn = Transaction::from_draft(draft, today, status);
            txn.error = Some(ANALYSIS_FAILURE_MESSAGE.to_string());
            Judgement {
                transaction: txn,
                call: None,
            }
        }
    }
}

/// Re-judges an urge the user went ahead and bought, keeping its identity.
///
/// The promoted record takes `today` as its purchase date.
pub fn promote_urge(
    urge: &Transaction,
    today: NaiveDate,
    policy: &NagPolicy,
    verdict: Option<std::result::Result<PurchaseAnalysis, GatewayError>>,
) -> Result<Judgement> {
    if urge.status != TransactionStatus::Urge {
        return Err(ConscienceError::InvalidOperation(format!(
            "only urges can be bought; `{}` is {}",
            urge.item, urge.status
        )));
    }
    let draft = urge.to_draft();
    let mut judgement = match verdict {
        None if short_circuits(&draft) => Judgement {
            transaction: kept_with_full_shame(&draft, today, policy),
            call: None,
        },
        None => {
            return Err(ConscienceError::InvalidOperation(format!(
                "`{}` needs analysis before it can be bought",
                urge.item
            )))
        }
        Some(verdict) => judge(&draft, today, verdict),
    };
    judgement.transaction.id = urge.id;
    judgement.transaction.is_example = urge.is_example;
    Ok(judgement)
}

/// Quick `return`/`keep` from the list view.
pub fn finish(transaction: &Transaction, action: QuickAction) -> Result<Transaction> {
    let status = match action {
        QuickAction::Return => TransactionStatus::Returned,
        QuickAction::Keep => TransactionStatus::Kept,
        QuickAction::Buy => {
            return Err(ConscienceError::InvalidOperation(
                "buying an urge requires a fresh analysis".into(),
            ))
        }
    };
    let mut next = transaction.clone();
    next.finish(status);
    Ok(next)
}

/// Flips a settled purchase between Kept and Returned.
pub fn toggle(transaction: &Transaction) -> Result<Transaction> {
    let status = match transaction.status {
        TransactionStatus::Kept => TransactionStatus::Returned,
        TransactionStatus::Returned => TransactionStatus::Kept,
        other => {
            return Err(ConscienceError::InvalidOperation(format!(
                "only kept or returned purchases can be toggled; `{}` is {}",
                transaction.item, other
            )))
        }
    };
    let mut next = transaction.clone();
    next.status = status;
    Ok(next)
}

/// Applies the user's answer to a call and arms the next follow-up if warranted.
pub fn resolve(
    transaction: &Transaction,
    resolution: CallResolution,
    now: DateTime<Utc>,
    policy: &NagPolicy,
) -> Transaction {
    let mut next = transaction.clone();
    match resolution {
        CallResolution::Return => next.finish(TransactionStatus::Returned),
        CallResolution::Keep => {
            next.status = TransactionStatus::Flagged;
            next.error = None;
            next.next_nag_at = None;
            if policy.warrants_follow_up(&next) {
                next.nag_count = next.nag_count.saturating_add(1).min(policy.max_nags);
                if next.nag_count >= policy.max_nags {
                    next.finish(TransactionStatus::Kept);
                } else {
                    next.next_nag_at = now.checked_add_signed(policy.interval);
                    if next.next_nag_at.is_none() {
                        warn!(item = %next.item, "follow-up date out of range; not scheduled");
                    }
                }
            }
        }
    }
    next
}

/// The call could not be presented; a still-pending purchase becomes a plain flag.
pub fn abandon(transaction: &Transaction) -> Transaction {
    let mut next = transaction.clone();
    if next.status == TransactionStatus::Pending {
        next.status = TransactionStatus::Flagged;
    }
    next
}
