//! Owner of the single application state.
//!
//! Every user action and scheduler tick goes through [`AppController`]: it
//! performs the gateway round-trips with the state lock released, then feeds
//! the outcome to [`reduce`] and writes the result through the [`StateStore`].

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::services::{
    Leaderboard, LeaderboardService, LeaderboardView, SavingsSummary, StatsService,
};
use crate::core::time::Clock;
use crate::domain::{
    AiTone, CallKind, CallState, Category, PurchaseAnalysis, PurchaseDraft, Transaction,
    TransactionStatus, UserProfile,
};
use crate::errors::{ConscienceError, Result};
use crate::gateway::{AnalysisGateway, NagRequest, PurchaseContext, ReceiptScan};
use crate::ledger::{example_transactions, TransactionStore};
use crate::lifecycle::machine;
use crate::lifecycle::{reduce, short_circuits, AppState, CallResolution, Event, NagPolicy, QuickAction};
use crate::storage::StateStore;

/// Result of one pass of the follow-up check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NagCycleOutcome {
    /// A call is showing or another follow-up is being prepared.
    Busy,
    /// Nothing is due.
    Idle,
    Staged(Uuid),
    /// The purchase settled while its follow-up was being prepared.
    Dropped(Uuid),
    Failed(Uuid),
}

#[derive(Clone)]
pub struct AppController {
    state: Arc<Mutex<AppState>>,
    gateway: Arc<dyn AnalysisGateway>,
    store: Arc<dyn StateStore>,
    clock: Arc<dyn Clock>,
    policy: NagPolicy,
}

impl AppController {
    /// Restores persisted state, seeding the examples when nothing was saved yet.
    ///
    /// Unreadable documents are logged and replaced by their defaults.
    pub fn bootstrap(
        gateway: Arc<dyn AnalysisGateway>,
        store: Arc<dyn StateStore>,
        clock: Arc<dyn Clock>,
        policy: NagPolicy,
    ) -> Self {
        let transactions = match store.load_transactions() {
            Ok(Some(transactions)) => transactions,
            Ok(None) => {
                let seed = example_transactions(clock.today());
                info!(count = seed.len(), "no saved history; seeding examples");
                if let Err(err) = store.save_transactions(&seed) {
                    warn!(error = %err, "failed to persist example transactions");
                }
                seed
            }
            Err(err) => {
                warn!(error = %err, "failed to load transactions; starting from examples");
                example_transactions(clock.today())
            }
        };
        let profile = store.load_profile().unwrap_or_else(|err| {
            warn!(error = %err, "failed to load profile");
            None
        });
        let tone = store
            .load_tone()
            .unwrap_or_else(|err| {
                warn!(error = %err, "failed to load tone");
                None
            })
            .unwrap_or_default();

        let state = AppState::new(TransactionStore::new(transactions), profile, tone);
        Self {
            state: Arc::new(Mutex::new(state)),
            gateway,
            store,
            clock,
            policy,
        }
    }

    pub fn policy(&self) -> &NagPolicy {
        &self.policy
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    pub async fn snapshot(&self) -> AppState {
        self.state.lock().await.clone()
    }

    /// Newest first.
    pub async fn transactions(&self) -> Vec<Transaction> {
        let state = self.state.lock().await;
        state
            .transactions
            .newest_first()
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn transaction(&self, id: Uuid) -> Result<Transaction> {
        self.state.lock().await.transactions.require(id).cloned()
    }

    pub async fn active_call(&self) -> Option<CallState> {
        self.state.lock().await.active_call.clone()
    }

    pub async fn needs_onboarding(&self) -> bool {
        self.state.lock().await.needs_onboarding()
    }

    /// Logs a purchase or urge and, when it is judged unnecessary, rings the phone.
    pub async fn submit_purchase(&self, draft: PurchaseDraft) -> Result<Transaction> {
        draft.validate()?;
        let today = self.clock.today();
        if short_circuits(&draft) {
            let txn = machine::kept_with_full_shame(&draft, today, &self.policy);
            info!(item = %txn.item, "fast food kept without analysis");
            self.apply(Event::Recorded {
                transaction: txn.clone(),
                call: None,
            })
            .await?;
            return Ok(txn);
        }

        let context = self.context_for(&draft).await;
        let verdict = self.gateway.analyze_purchase(&context).await;
        if let Err(err) = &verdict {
            warn!(item = %draft.item, error = %err, "purchase analysis failed");
        }
        let judgement = machine::judge(&draft, today, verdict);
        let call = match judgement.call {
            Some(analysis) => Some(
                self.prepare_call(judgement.transaction.id, analysis, CallKind::Verdict)
                    .await,
            ),
            None => None,
        };
        let txn = judgement.transaction;
        self.apply(Event::Recorded {
            transaction: txn.clone(),
            call,
        })
        .await?;
        Ok(txn)
    }

    pub async fn quick_action(&self, id: Uuid, action: QuickAction) -> Result<Transaction> {
        if action == QuickAction::Buy {
            return self.buy_urge(id).await;
        }
        let state = self.apply(Event::QuickAction { id, action }).await?;
        state.transactions.require(id).cloned()
    }

    /// Promotes an urge to a real purchase and judges it again under the same id.
    pub async fn buy_urge(&self, id: Uuid) -> Result<Transaction> {
        let urge = self.transaction(id).await?;
        if urge.status != TransactionStatus::Urge {
            return Err(ConscienceError::InvalidOperation(format!(
                "only urges can be bought; `{}` is {}",
                urge.item, urge.status
            )));
        }
        let draft = urge.to_draft();
        let verdict = if short_circuits(&draft) {
            None
        } else {
            let context = self.context_for(&draft).await;
            let verdict = self.gateway.analyze_purchase(&context).await;
            if let Err(err) = &verdict {
                warn!(item = %draft.item, error = %err, "analysis of bought urge failed");
            }
            Some(verdict)
        };
        let judgement = machine::promote_urge(&urge, self.clock.today(), &self.policy, verdict)?;
        let call = match judgement.call {
            Some(analysis) => Some(self.prepare_call(id, analysis, CallKind::Verdict).await),
            None => None,
        };
        let txn = judgement.transaction;
        self.apply(Event::Reanalyzed {
            transaction: txn.clone(),
            call,
        })
        .await?;
        Ok(txn)
    }

    pub async fn toggle_status(&self, id: Uuid) -> Result<Transaction> {
        let state = self.apply(Event::StatusToggled { id }).await?;
        state.transactions.require(id).cloned()
    }

    /// Answers the active call and returns the updated purchase.
    pub async fn resolve_call(&self, resolution: CallResolution) -> Result<Transaction> {
        let id = self
            .active_call()
            .await
            .map(|call| call.transaction_id)
            .ok_or_else(|| ConscienceError::InvalidOperation("no call is active".into()))?;
        let state = self.apply(Event::CallResolved { resolution }).await?;
        state.transactions.require(id).cloned()
    }

    /// Declining the call is the same as choosing to keep the item.
    pub async fn decline_call(&self) -> Result<Transaction> {
        self.resolve_call(CallResolution::Keep).await
    }

    /// Drops the active call when it cannot be presented at all.
    pub async fn abandon_call(&self) -> Result<()> {
        self.apply(Event::CallAbandoned).await?;
        Ok(())
    }

    /// Finds the earliest due follow-up and stages its call.
    ///
    /// At most one follow-up is prepared at a time; a failed preparation is
    /// recorded on the purchase and not rescheduled.
    pub async fn run_nag_cycle(&self) -> Result<NagCycleOutcome> {
        let now = self.clock.now();
        let (candidate, tone) = {
            let mut state = self.state.lock().await;
            if state.is_busy() {
                debug!("nag cycle skipped; call active or in flight");
                return Ok(NagCycleOutcome::Busy);
            }
            let Some(candidate) = state.transactions.earliest_due(now).cloned() else {
                return Ok(NagCycleOutcome::Idle);
            };
            self.commit(&mut state, Event::NagStarted { id: candidate.id })?;
            (candidate, state.tone)
        };

        let request = NagRequest {
            item: candidate.item.clone(),
            amount: candidate.amount,
            category: candidate.category,
            nag_count: candidate.nag_count,
            tone,
        };
        match self.gateway.generate_nag_script(&request).await {
            Ok(script) => {
                let number = candidate.nag_count.max(1);
                let analysis = PurchaseAnalysis::follow_up(number, script.script);
                let call = self
                    .prepare_call(candidate.id, analysis, CallKind::FollowUp { number })
                    .await;
                let state = self.apply(Event::FollowUpStaged { call }).await?;
                if state.has_call_for(candidate.id) {
                    info!(item = %candidate.item, number, "follow-up call prepared");
                    Ok(NagCycleOutcome::Staged(candidate.id))
                } else {
                    Ok(NagCycleOutcome::Dropped(candidate.id))
                }
            }
            Err(err) => {
                warn!(item = %candidate.item, error = %err, "follow-up script failed");
                self.apply(Event::NagFailed {
                    id: candidate.id,
                    message: err.to_string(),
                })
                .await?;
                Ok(NagCycleOutcome::Failed(candidate.id))
            }
        }
    }

    /// Reads a receipt photo into a draft-ready scan.
    pub async fn scan_receipt(&self, image: &[u8]) -> Result<ReceiptScan> {
        let raw = self.gateway.analyze_receipt(image).await.map_err(|err| {
            warn!(error = %err, "receipt scan failed");
            ConscienceError::from(err)
        })?;
        raw.into_scan()
    }

    pub async fn financial_tip(&self, category: Category) -> Result<String> {
        Ok(self.gateway.financial_tip(category).await?)
    }

    pub async fn save_profile(&self, profile: UserProfile) -> Result<()> {
        profile.validate()?;
        self.apply(Event::ProfileSaved(profile)).await?;
        Ok(())
    }

    pub async fn set_tone(&self, tone: AiTone) -> Result<()> {
        self.apply(Event::ToneChanged(tone)).await?;
        Ok(())
    }

    /// Starts over from the example set and forgets the profile and tone.
    pub async fn clear_history(&self) -> Result<()> {
        let seed = example_transactions(self.clock.today());
        self.apply(Event::HistoryReset { seed }).await?;
        info!("history cleared");
        Ok(())
    }

    pub async fn summary(&self) -> SavingsSummary {
        let state = self.state.lock().await;
        StatsService::summary(&state.transactions, self.clock.today())
    }

    /// Goal-progress percentage, absent until a profile exists.
    pub async fn goal_progress(&self) -> Option<f64> {
        let state = self.state.lock().await;
        let summary = StatsService::summary(&state.transactions, self.clock.today());
        StatsService::goal_progress(&summary, state.profile.as_ref())
    }

    pub async fn leaderboard(&self, view: LeaderboardView) -> Leaderboard {
        let state = self.state.lock().await;
        LeaderboardService::for_store(&state.transactions, self.clock.today(), view)
    }

    async fn context_for(&self, draft: &PurchaseDraft) -> PurchaseContext {
        let state = self.state.lock().await;
        PurchaseContext::from_draft(draft, state.tone, state.profile.clone())
    }

    /// Synthesizes the call audio; a failure still yields a silent call.
    async fn prepare_call(
        &self,
        transaction_id: Uuid,
        analysis: PurchaseAnalysis,
        kind: CallKind,
    ) -> CallState {
        let audio = match self.gateway.generate_call_audio(&analysis.call_script).await {
            Ok(handle) => Some(handle),
            Err(err) => {
                warn!(transaction = %transaction_id, error = %err, "call audio unavailable");
                None
            }
        };
        CallState {
            transaction_id,
            analysis,
            audio,
            kind,
            started_at: self.clock.now(),
        }
    }

    async fn apply(&self, event: Event) -> Result<AppState> {
        let mut state = self.state.lock().await;
        self.commit(&mut state, event)?;
        Ok(state.clone())
    }

    fn commit(&self, state: &mut AppState, event: Event) -> Result<()> {
        let resets = matches!(event, Event::HistoryReset { .. });
        let next = reduce(state, event, self.clock.now(), &self.policy)?;
        self.persist(state, &next, resets);
        *state = next;
        Ok(())
    }

    /// Writes whatever changed; failures leave the in-memory state authoritative.
    fn persist(&self, previous: &AppState, next: &AppState, resets: bool) {
        if previous.transactions != next.transactions {
            if let Err(err) = self.store.save_transactions(next.transactions.as_slice()) {
                warn!(error = %err, "failed to persist transactions");
            }
        }
        if resets {
            if let Err(err) = self.store.clear_profile_and_tone() {
                warn!(error = %err, "failed to clear profile and tone");
            }
            return;
        }
        if previous.profile != next.profile {
            if let Some(profile) = &next.profile {
                if let Err(err) = self.store.save_profile(profile) {
                    warn!(error = %err, "failed to persist profile");
                }
            }
        }
        if previous.tone != next.tone {
            if let Err(err) = self.store.save_tone(next.tone) {
                warn!(error = %err, "failed to persist tone");
            }
        }
    }
}
