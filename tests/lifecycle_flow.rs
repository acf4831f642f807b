mod common;

use std::time::Duration as StdDuration;

use chrono::Duration;
use common::{memory_harness, start};
use conscience_core::{
    domain::{CallKind, Category, PurchaseDraft, TransactionStatus, MAX_NAG_COUNT},
    gateway::ScriptedGateway,
    lifecycle::{CallResolution, QuickAction, ANALYSIS_FAILURE_MESSAGE},
    ConscienceError, NagCycleOutcome,
};

fn headphones() -> PurchaseDraft {
    PurchaseDraft::new("Studio headphones", 300.0, Category::Electronics).returnable(None)
}

#[tokio::test]
async fn fast_food_is_kept_without_asking_the_gateway() {
    let h = memory_harness(ScriptedGateway::unnecessary("Why?"));
    let txn = h
        .controller
        .submit_purchase(PurchaseDraft::new("Big Mac meal", 12.5, Category::Dining))
        .await
        .unwrap();

    assert_eq!(txn.status, TransactionStatus::Kept);
    assert_eq!(txn.nag_count, MAX_NAG_COUNT);
    assert_eq!(h.gateway.analyze_calls(), 0);
    assert!(h.controller.active_call().await.is_none());
}

#[tokio::test]
async fn returnable_fast_food_is_still_analysed() {
    let h = memory_harness(ScriptedGateway::unnecessary("Take the burgers back."));
    let draft = PurchaseDraft::new("Burger party pack", 60.0, Category::FastFood).returnable(None);
    let txn = h.controller.submit_purchase(draft).await.unwrap();

    assert_eq!(txn.status, TransactionStatus::Pending);
    assert_eq!(h.gateway.analyze_calls(), 1);
}

#[tokio::test]
async fn urges_get_a_hot_take_but_never_a_call() {
    let h = memory_harness(ScriptedGateway::unnecessary("Put the phone down."));
    let draft = PurchaseDraft::new("Drone", 800.0, Category::Electronics)
        .returnable(None)
        .urge();
    let txn = h.controller.submit_purchase(draft).await.unwrap();

    assert_eq!(txn.status, TransactionStatus::Urge);
    assert_eq!(txn.hot_take.as_deref(), Some("Put it back."));
    assert!(h.controller.active_call().await.is_none());
    assert_eq!(h.gateway.audio_calls(), 0);
    assert!(h.gateway.contexts()[0].is_urge);
}

#[tokio::test]
async fn necessary_purchases_are_approved_quietly() {
    let h = memory_harness(ScriptedGateway::necessary());
    let txn = h
        .controller
        .submit_purchase(PurchaseDraft::new("Bus pass", 45.0, Category::Transport))
        .await
        .unwrap();

    assert_eq!(txn.status, TransactionStatus::Approved);
    assert_eq!(txn.reasoning.as_deref(), Some("Looks like a need."));
    assert!(txn.hot_take.is_none());
    assert!(h.controller.active_call().await.is_none());
}

#[tokio::test]
async fn analysis_failure_flags_for_manual_review() {
    let h = memory_harness(ScriptedGateway::failing());
    let txn = h.controller.submit_purchase(headphones()).await.unwrap();

    assert_eq!(txn.status, TransactionStatus::Flagged);
    assert_eq!(txn.error.as_deref(), Some(ANALYSIS_FAILURE_MESSAGE));
    assert!(h.controller.active_call().await.is_none());
}

#[tokio::test]
async fn invalid_drafts_are_rejected_before_analysis() {
    let h = memory_harness(ScriptedGateway::necessary());
    let err = h
        .controller
        .submit_purchase(PurchaseDraft::new("  ", 10.0, Category::Other))
        .await
        .unwrap_err();
    assert!(matches!(err, ConscienceError::InvalidInput(_)));

    let err = h
        .controller
        .submit_purchase(PurchaseDraft::new("Lamp", 0.0, Category::Home))
        .await
        .unwrap_err();
    assert!(matches!(err, ConscienceError::InvalidInput(_)));
    assert_eq!(h.gateway.analyze_calls(), 0);
}

#[tokio::test]
async fn unnecessary_purchase_rings_with_the_verdict_script() {
    let h = memory_harness(ScriptedGateway::unnecessary("Return those headphones."));
    let txn = h.controller.submit_purchase(headphones()).await.unwrap();

    assert_eq!(txn.status, TransactionStatus::Pending);
    let call = h.controller.active_call().await.unwrap();
    assert_eq!(call.transaction_id, txn.id);
    assert_eq!(call.kind, CallKind::Verdict);
    assert_eq!(call.script(), "Return those headphones.");
    assert!(call.audio.is_some());
}

#[tokio::test]
async fn missing_audio_still_rings() {
    let gateway = ScriptedGateway::unnecessary("Return it.");
    gateway.set_audio_available(false);
    let h = memory_harness(gateway);
    h.controller.submit_purchase(headphones()).await.unwrap();

    let call = h.controller.active_call().await.unwrap();
    assert!(call.audio.is_none());
    assert_eq!(h.gateway.audio_calls(), 1);
}

#[tokio::test]
async fn returning_on_the_call_settles_the_purchase() {
    let h = memory_harness(ScriptedGateway::unnecessary("Return it."));
    let txn = h.controller.submit_purchase(headphones()).await.unwrap();
    let resolved = h
        .controller
        .resolve_call(CallResolution::Return)
        .await
        .unwrap();

    assert_eq!(resolved.id, txn.id);
    assert_eq!(resolved.status, TransactionStatus::Returned);
    assert!(resolved.next_nag_at.is_none());
    assert!(h.controller.active_call().await.is_none());
}

#[tokio::test]
async fn keeping_a_significant_purchase_escalates_until_the_cap() {
    let h = memory_harness(ScriptedGateway::unnecessary("Return it."));
    let txn = h.controller.submit_purchase(headphones()).await.unwrap();

    let kept = h.controller.decline_call().await.unwrap();
    assert_eq!(kept.status, TransactionStatus::Flagged);
    assert_eq!(kept.nag_count, 1);
    assert_eq!(kept.next_nag_at, Some(start() + Duration::hours(24)));

    for expected in 2..=MAX_NAG_COUNT {
        h.clock.advance(Duration::hours(24));
        let outcome = h.controller.run_nag_cycle().await.unwrap();
        assert_eq!(outcome, NagCycleOutcome::Staged(txn.id));
        let call = h.controller.active_call().await.unwrap();
        assert_eq!(
            call.kind,
            CallKind::FollowUp {
                number: expected - 1
            }
        );

        let after = h
            .controller
            .resolve_call(CallResolution::Keep)
            .await
            .unwrap();
        assert_eq!(after.nag_count, expected);
        assert!(after.nag_count <= MAX_NAG_COUNT);
    }

    let done = h.controller.transaction(txn.id).await.unwrap();
    assert_eq!(done.status, TransactionStatus::Kept);
    assert!(done.next_nag_at.is_none());

    h.clock.advance(Duration::days(3));
    assert_eq!(
        h.controller.run_nag_cycle().await.unwrap(),
        NagCycleOutcome::Idle
    );
    assert_eq!(h.gateway.nag_calls(), usize::from(MAX_NAG_COUNT - 1));
}

#[tokio::test]
async fn small_or_final_sale_purchases_are_not_chased() {
    let h = memory_harness(ScriptedGateway::unnecessary("Return it."));
    let small = PurchaseDraft::new("Phone case", 120.0, Category::Electronics).returnable(None);
    h.controller.submit_purchase(small).await.unwrap();
    let kept = h.controller.decline_call().await.unwrap();
    assert_eq!(kept.status, TransactionStatus::Flagged);
    assert_eq!(kept.nag_count, 0);
    assert!(kept.next_nag_at.is_none());

    let final_sale = PurchaseDraft::new("Designer coat", 900.0, Category::Clothing);
    h.controller.submit_purchase(final_sale).await.unwrap();
    let kept = h.controller.decline_call().await.unwrap();
    assert_eq!(kept.nag_count, 0);
    assert!(kept.next_nag_at.is_none());
}

#[tokio::test]
async fn second_verdict_waits_for_the_first_call() {
    let h = memory_harness(ScriptedGateway::unnecessary("Return it."));
    let first = h.controller.submit_purchase(headphones()).await.unwrap();
    let second = h
        .controller
        .submit_purchase(PurchaseDraft::new("Smart watch", 400.0, Category::Electronics))
        .await
        .unwrap();

    assert_eq!(
        h.controller.active_call().await.unwrap().transaction_id,
        first.id
    );
    h.controller
        .resolve_call(CallResolution::Return)
        .await
        .unwrap();
    assert_eq!(
        h.controller.active_call().await.unwrap().transaction_id,
        second.id
    );
}

#[tokio::test]
async fn quick_return_dismisses_the_ringing_call() {
    let h = memory_harness(ScriptedGateway::unnecessary("Return it."));
    let txn = h.controller.submit_purchase(headphones()).await.unwrap();
    let returned = h
        .controller
        .quick_action(txn.id, QuickAction::Return)
        .await
        .unwrap();

    assert_eq!(returned.status, TransactionStatus::Returned);
    assert!(h.controller.active_call().await.is_none());
    assert!(h.controller.resolve_call(CallResolution::Keep).await.is_err());
}

#[tokio::test]
async fn hanging_up_leaves_the_purchase_flagged() {
    let h = memory_harness(ScriptedGateway::unnecessary("Return it."));
    let txn = h.controller.submit_purchase(headphones()).await.unwrap();
    h.controller.abandon_call().await.unwrap();

    let after = h.controller.transaction(txn.id).await.unwrap();
    assert_eq!(after.status, TransactionStatus::Flagged);
    assert_eq!(after.nag_count, 0);
    assert!(h.controller.abandon_call().await.is_err());
}

#[tokio::test]
async fn buying_an_urge_keeps_its_identity() {
    let h = memory_harness(ScriptedGateway::unnecessary("You said you'd wait."));
    let urge = h
        .controller
        .submit_purchase(headphones().urge())
        .await
        .unwrap();
    h.clock.advance(Duration::days(2));

    let bought = h
        .controller
        .quick_action(urge.id, QuickAction::Buy)
        .await
        .unwrap();
    assert_eq!(bought.id, urge.id);
    assert_eq!(bought.status, TransactionStatus::Pending);
    assert_eq!(bought.date, h.today());
    assert_eq!(
        h.controller.active_call().await.unwrap().transaction_id,
        urge.id
    );
    assert_eq!(h.gateway.analyze_calls(), 2);
    assert!(!h.gateway.contexts()[1].is_urge);

    let transactions = h.controller.transactions().await;
    assert_eq!(
        transactions.iter().filter(|txn| txn.id == urge.id).count(),
        1
    );
}

#[tokio::test]
async fn bought_fast_food_urge_skips_analysis() {
    let h = memory_harness(ScriptedGateway::unnecessary("No."));
    let urge = h
        .controller
        .submit_purchase(PurchaseDraft::new("Pizza night", 30.0, Category::Dining).urge())
        .await
        .unwrap();
    let bought = h.controller.buy_urge(urge.id).await.unwrap();

    assert_eq!(bought.status, TransactionStatus::Kept);
    assert_eq!(bought.nag_count, MAX_NAG_COUNT);
    assert_eq!(h.gateway.analyze_calls(), 1);
}

#[tokio::test]
async fn urge_returned_during_its_analysis_stays_returned() {
    let h = memory_harness(ScriptedGateway::unnecessary("You said you'd wait."));
    let urge = h
        .controller
        .submit_purchase(headphones().urge())
        .await
        .unwrap();
    h.gateway.set_analysis_delay(Some(StdDuration::from_millis(100)));

    let settle = async {
        tokio::time::sleep(StdDuration::from_millis(20)).await;
        h.controller.quick_action(urge.id, QuickAction::Return).await
    };
    let (bought, returned) = tokio::join!(h.controller.buy_urge(urge.id), settle);

    assert_eq!(returned.unwrap().status, TransactionStatus::Returned);
    assert!(matches!(
        bought.unwrap_err(),
        ConscienceError::InvalidOperation(_)
    ));
    let txn = h.controller.transaction(urge.id).await.unwrap();
    assert_eq!(txn.status, TransactionStatus::Returned);
    assert!(h.controller.active_call().await.is_none());
}

#[tokio::test]
async fn overlapping_buys_ring_only_once() {
    let h = memory_harness(ScriptedGateway::unnecessary("You said you'd wait."));
    let urge = h
        .controller
        .submit_purchase(headphones().urge())
        .await
        .unwrap();
    h.gateway.set_analysis_delay(Some(StdDuration::from_millis(50)));

    let (first, second) = tokio::join!(
        h.controller.buy_urge(urge.id),
        h.controller.buy_urge(urge.id)
    );
    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|result| result.is_ok()).count(), 1);
    assert!(outcomes
        .iter()
        .any(|result| matches!(result, Err(ConscienceError::InvalidOperation(_)))));

    let state = h.controller.snapshot().await;
    assert_eq!(
        state.active_call.as_ref().unwrap().transaction_id,
        urge.id
    );
    assert!(state.queued_calls.is_empty());

    let kept = h.controller.resolve_call(CallResolution::Keep).await.unwrap();
    assert_eq!(kept.nag_count, 1);
    assert!(h.controller.active_call().await.is_none());
}

#[tokio::test]
async fn only_urges_can_be_bought() {
    let h = memory_harness(ScriptedGateway::necessary());
    let txn = h
        .controller
        .submit_purchase(PurchaseDraft::new("Rice", 20.0, Category::Groceries))
        .await
        .unwrap();
    let err = h.controller.buy_urge(txn.id).await.unwrap_err();
    assert!(matches!(err, ConscienceError::InvalidOperation(_)));
}

#[tokio::test]
async fn toggle_flips_settled_purchases_only() {
    let h = memory_harness(ScriptedGateway::unnecessary("Return it."));
    let txn = h.controller.submit_purchase(headphones()).await.unwrap();
    assert!(h.controller.toggle_status(txn.id).await.is_err());

    h.controller
        .resolve_call(CallResolution::Return)
        .await
        .unwrap();
    let toggled = h.controller.toggle_status(txn.id).await.unwrap();
    assert_eq!(toggled.status, TransactionStatus::Kept);
    let toggled = h.controller.toggle_status(txn.id).await.unwrap();
    assert_eq!(toggled.status, TransactionStatus::Returned);
}

#[tokio::test]
async fn tone_and_profile_reach_the_gateway() {
    use conscience_core::domain::{AiTone, UserProfile};

    let h = memory_harness(ScriptedGateway::necessary());
    assert!(h.controller.needs_onboarding().await);
    h.controller
        .save_profile(UserProfile::new(4200.0, "gadgets", "Japan trip", 3000.0))
        .await
        .unwrap();
    h.controller.set_tone(AiTone::Ruthless).await.unwrap();
    assert!(!h.controller.needs_onboarding().await);

    h.controller
        .submit_purchase(PurchaseDraft::new("Keyboard", 150.0, Category::Electronics))
        .await
        .unwrap();
    let contexts = h.gateway.contexts();
    let context = &contexts[0];
    assert_eq!(context.tone, AiTone::Ruthless);
    assert_eq!(
        context.profile.as_ref().map(|p| p.goal_name.as_str()),
        Some("Japan trip")
    );
}
