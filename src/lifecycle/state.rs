//! Application state and the reducer that advances it.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use super::machine::{self, CallResolution, QuickAction};
use super::policy::NagPolicy;
use crate::domain::{AiTone, CallState, Transaction, TransactionStatus, UserProfile};
use crate::errors::{ConscienceError, Result};
use crate::ledger::TransactionStore;

/// Everything the presentation layer renders, owned by a single controller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub transactions: TransactionStore,
    pub profile: Option<UserProfile>,
    pub tone: AiTone,
    /// The call currently ringing or in progress.
    pub active_call: Option<CallState>,
    /// Calls raised while another one was active, shown in arrival order.
    pub queued_calls: VecDeque<CallState>,
    /// Transaction whose follow-up script is being prepared.
    pub nag_in_flight: Option<Uuid>,
}

impl AppState {
    pub fn new(
        transactions: TransactionStore,
        profile: Option<UserProfile>,
        tone: AiTone,
    ) -> Self {
        Self {
            transactions,
            profile,
            tone,
            ..Self::default()
        }
    }

    /// True while a call is shown or a follow-up is being prepared.
    pub fn is_busy(&self) -> bool {
        self.active_call.is_some() || self.nag_in_flight.is_some()
    }

    pub fn needs_onboarding(&self) -> bool {
        self.profile.is_none()
    }

    /// True when a ringing or queued call concerns `id`.
    pub fn has_call_for(&self, id: Uuid) -> bool {
        self.active_call
            .iter()
            .chain(self.queued_calls.iter())
            .any(|call| call.transaction_id == id)
    }

    fn stage_call(&mut self, call: CallState) {
        if self.active_call.is_none() {
            info!(transaction = %call.transaction_id, "call staged");
            self.active_call = Some(call);
        } else {
            debug!(transaction = %call.transaction_id, "call queued behind active call");
            self.queued_calls.push_back(call);
        }
    }

    /// Drops calls for `id` and promotes the next call whose purchase is still open.
    fn release_calls_for(&mut self, id: Uuid) {
        self.queued_calls.retain(|call| call.transaction_id != id);
        if self
            .active_call
            .as_ref()
            .map(|call| call.transaction_id == id)
            .unwrap_or(false)
        {
            self.active_call = None;
        }
        self.promote_next_call();
    }

    fn promote_next_call(&mut self) {
        while self.active_call.is_none() {
            let Some(next) = self.queued_calls.pop_front() else {
                break;
            };
            let still_open = self
                .transactions
                .get(next.transaction_id)
                .map(|txn| !txn.status.is_terminal())
                .unwrap_or(false);
            if still_open {
                self.active_call = Some(next);
            }
        }
    }
}

/// Inputs to [`reduce`]. Gateway work happens before an event is built.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A new purchase or urge was judged; `call` is set when it should ring.
    Recorded {
        transaction: Transaction,
        call: Option<CallState>,
    },
    /// An urge was bought and re-judged under the same id.
    Reanalyzed {
        transaction: Transaction,
        call: Option<CallState>,
    },
    QuickAction {
        id: Uuid,
        action: QuickAction,
    },
    StatusToggled {
        id: Uuid,
    },
    CallResolved {
        resolution: CallResolution,
    },
    /// Playback failed; the call is dropped without an answer.
    CallAbandoned,
    NagStarted {
        id: Uuid,
    },
    NagFailed {
        id: Uuid,
        message: String,
    },
    FollowUpStaged {
        call: CallState,
    },
    ProfileSaved(UserProfile),
    ToneChanged(AiTone),
    HistoryReset {
        seed: Vec<Transaction>,
    },
}

/// Computes the next state; `state` itself is never modified.
pub fn reduce(
    state: &AppState,
    event: Event,
    now: DateTime<Utc>,
    policy: &NagPolicy,
) -> Result<AppState> {
    let mut next = state.clone();
    match event {
        Event::Recorded { transaction, call } => {
            info!(item = %transaction.item, status = %transaction.status, "purchase recorded");
            next.transactions = next.transactions.appended(transaction);
            if let Some(call) = call {
                next.stage_call(call);
            }
        }
        Event::Reanalyzed { transaction, call } => {
            let id = transaction.id;
            let stored = next.transactions.require(id)?;
            if stored.status != TransactionStatus::Urge {
                return Err(ConscienceError::InvalidOperation(format!(
                    "`{}` changed to {} while it was being bought",
                    stored.item, stored.status
                )));
            }
            info!(item = %transaction.item, status = %transaction.status, "urge bought");
            next.transactions = next.transactions.replaced(transaction)?;
            if let Some(call) = call {
                next.stage_call(call);
            }
            if next.transactions.require(id)?.status.is_terminal() {
                next.release_calls_for(id);
            }
        }
        Event::QuickAction { id, action } => {
            let updated = machine::finish(next.transactions.require(id)?, action)?;
            info!(item = %updated.item, status = %updated.status, "quick action applied");
            next.transactions = next.transactions.replaced(updated)?;
            next.release_calls_for(id);
        }
        Event::StatusToggled { id } => {
            let updated = machine::toggle(next.transactions.require(id)?)?;
            next.transactions = next.transactions.replaced(updated)?;
        }
        Event::CallResolved { resolution } => {
            let call = next
                .active_call
                .take()
                .ok_or_else(|| ConscienceError::InvalidOperation("no call is active".into()))?;
            let resolved = machine::resolve(
                next.transactions.require(call.transaction_id)?,
                resolution,
                now,
                policy,
            );
            info!(
                item = %resolved.item,
                status = %resolved.status,
                nag_count = resolved.nag_count,
                "call resolved"
            );
            next.transactions = next.transactions.replaced(resolved)?;
            next.promote_next_call();
        }
        Event::CallAbandoned => {
            let call = next
                .active_call
                .take()
                .ok_or_else(|| ConscienceError::InvalidOperation("no call is active".into()))?;
            if let Some(txn) = next.transactions.get(call.transaction_id) {
                let abandoned = machine::abandon(txn);
                next.transactions = next.transactions.replaced(abandoned)?;
            }
            next.promote_next_call();
        }
        Event::NagStarted { id } => {
            if next.is_busy() {
                return Err(ConscienceError::InvalidOperation(
                    "a call is already active or being prepared".into(),
                ));
            }
            next.transactions = next.transactions.updated(id, |txn| txn.next_nag_at = None)?;
            next.nag_in_flight = Some(id);
        }
        Event::NagFailed { id, message } => {
            next.nag_in_flight = None;
            let still_open = next
                .transactions
                .get(id)
                .map(|txn| !txn.status.is_terminal())
                .unwrap_or(false);
            if still_open {
                next.transactions = next
                    .transactions
                    .updated(id, |txn| txn.error = Some(message))?;
            }
        }
        Event::FollowUpStaged { call } => {
            next.nag_in_flight = None;
            let still_open = next
                .transactions
                .get(call.transaction_id)
                .map(|txn| txn.status == TransactionStatus::Flagged)
                .unwrap_or(false);
            if still_open {
                next.stage_call(call);
            } else {
                debug!(transaction = %call.transaction_id, "follow-up dropped; purchase settled");
            }
        }
        Event::ProfileSaved(profile) => {
            next.profile = Some(profile);
        }
        Event::ToneChanged(tone) => {
            next.tone = tone;
        }
        Event::HistoryReset { seed } => {
            next = AppState::new(TransactionStore::new(seed), None, AiTone::default());
        }
    }
    Ok(next)
}
