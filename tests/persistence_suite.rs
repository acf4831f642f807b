mod common;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Duration;
use common::{json_harness, memory_harness};
use conscience_core::{
    domain::{AiTone, Category, PurchaseDraft, TransactionStatus, UserProfile},
    gateway::ScriptedGateway,
    lifecycle::CallResolution,
    storage::{JsonStorage, StateStore, PROFILE_KEY, TONE_KEY, TRANSACTIONS_KEY},
    NagCycleOutcome,
};

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.tmp", existing),
        None => String::from("tmp"),
    };
    tmp.set_extension(ext);
    tmp
}

fn storage_at(base: &Path) -> JsonStorage {
    JsonStorage::new(Some(base.to_path_buf())).unwrap()
}

#[tokio::test]
async fn first_launch_seeds_and_saves_examples() {
    let (h, base) = json_harness(ScriptedGateway::necessary());
    let storage = storage_at(&base);

    let saved = storage.load_transactions().unwrap().expect("examples saved");
    assert!(!saved.is_empty());
    assert!(saved.iter().all(|txn| txn.is_example));
    assert_eq!(saved.len(), h.controller.transactions().await.len());
    assert!(storage.key_path(TRANSACTIONS_KEY).exists());
}

#[tokio::test]
async fn history_profile_and_tone_survive_a_restart() {
    let (h, _base) = json_harness(ScriptedGateway::unnecessary("Return it."));
    h.controller
        .save_profile(UserProfile::new(3800.0, "sneakers", "Emergency fund", 5000.0))
        .await
        .unwrap();
    h.controller.set_tone(AiTone::Stern).await.unwrap();
    let draft = PurchaseDraft::new("Road bike", 1200.0, Category::Transport).returnable(None);
    let txn = h.controller.submit_purchase(draft).await.unwrap();
    assert!(h.controller.active_call().await.is_some());

    let restarted = h.restart();
    let state = restarted.controller.snapshot().await;
    assert_eq!(state.tone, AiTone::Stern);
    assert_eq!(
        state.profile.map(|profile| profile.goal_name),
        Some("Emergency fund".to_string())
    );
    let reloaded = restarted.controller.transaction(txn.id).await.unwrap();
    assert_eq!(reloaded, txn);
    assert!(
        restarted.controller.active_call().await.is_none(),
        "calls are not persisted"
    );
}

#[tokio::test]
async fn follow_up_schedule_survives_a_restart() {
    let (h, _base) = json_harness(ScriptedGateway::unnecessary("Return it."));
    let draft = PurchaseDraft::new("Standing desk", 450.0, Category::Home).returnable(None);
    let txn = h.controller.submit_purchase(draft).await.unwrap();
    let kept = h
        .controller
        .resolve_call(CallResolution::Keep)
        .await
        .unwrap();

    let restarted = h.restart();
    let reloaded = restarted.controller.transaction(txn.id).await.unwrap();
    assert_eq!(reloaded.nag_count, 1);
    assert_eq!(reloaded.next_nag_at, kept.next_nag_at);

    restarted.clock.advance(Duration::hours(24));
    assert_eq!(
        restarted.controller.run_nag_cycle().await.unwrap(),
        NagCycleOutcome::Staged(txn.id)
    );
}

#[tokio::test]
async fn clear_history_restores_examples_and_forgets_the_user() {
    let (h, base) = json_harness(ScriptedGateway::necessary());
    h.controller
        .save_profile(UserProfile::new(3000.0, "", "Laptop", 1500.0))
        .await
        .unwrap();
    h.controller.set_tone(AiTone::Ruthless).await.unwrap();
    h.controller
        .submit_purchase(PurchaseDraft::new("Printer ink", 45.0, Category::Home))
        .await
        .unwrap();

    h.controller.clear_history().await.unwrap();

    let storage = storage_at(&base);
    assert!(!storage.key_path(PROFILE_KEY).exists());
    assert!(!storage.key_path(TONE_KEY).exists());
    let saved = storage.load_transactions().unwrap().unwrap();
    assert!(saved.iter().all(|txn| txn.is_example));

    let state = h.controller.snapshot().await;
    assert!(state.profile.is_none());
    assert_eq!(state.tone, AiTone::Encouraging);
    assert!(state.needs_onboarding());
}

#[tokio::test]
async fn corrupt_history_falls_back_to_examples() {
    let (h, base) = json_harness(ScriptedGateway::necessary());
    h.controller
        .save_profile(UserProfile::new(2000.0, "", "Camera", 900.0))
        .await
        .unwrap();
    let storage = storage_at(&base);
    fs::write(storage.key_path(TRANSACTIONS_KEY), "{ not json").unwrap();

    let restarted = h.restart();
    let transactions = restarted.controller.transactions().await;
    assert!(!transactions.is_empty());
    assert!(transactions.iter().all(|txn| txn.is_example));
    assert!(!restarted.controller.needs_onboarding().await);
}

#[tokio::test]
async fn failed_write_keeps_memory_state_and_original_file() {
    let (h, base) = json_harness(ScriptedGateway::necessary());
    let storage = storage_at(&base);
    let path = storage.key_path(TRANSACTIONS_KEY);
    let original = fs::read_to_string(&path).expect("read seeded file");

    // A directory where the temp file should go makes File::create fail.
    fs::create_dir_all(tmp_path_for(&path)).unwrap();

    let txn = h
        .controller
        .submit_purchase(PurchaseDraft::new("Lamp", 35.0, Category::Home))
        .await
        .expect("persistence failures are not surfaced");
    assert_eq!(txn.status, TransactionStatus::Approved);
    assert!(h.controller.transaction(txn.id).await.is_ok());
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
}

#[tokio::test]
async fn memory_store_failure_is_swallowed() {
    let h = memory_harness(ScriptedGateway::necessary());
    h.store.set_fail_writes(true);

    h.controller.set_tone(AiTone::Stern).await.unwrap();
    assert_eq!(h.controller.snapshot().await.tone, AiTone::Stern);

    h.store.set_fail_writes(false);
    let restarted = h.restart();
    assert_eq!(restarted.controller.snapshot().await.tone, AiTone::Encouraging);
}
