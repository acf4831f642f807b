#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use conscience_core::{
    core::time::{Clock, ManualClock},
    gateway::ScriptedGateway,
    lifecycle::NagPolicy,
    storage::{JsonStorage, MemoryStorage, StateStore},
    AppController,
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Noon on the first of a month, so "this month" covers a few days either way.
pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 1, 12, 0, 0).unwrap()
}

pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// A controller wired to test doubles; the doubles stay reachable for assertions.
pub struct Harness<S> {
    pub controller: AppController,
    pub gateway: Arc<ScriptedGateway>,
    pub clock: Arc<ManualClock>,
    pub store: Arc<S>,
}

impl<S: StateStore + 'static> Harness<S> {
    pub fn build(gateway: Arc<ScriptedGateway>, store: Arc<S>, clock: Arc<ManualClock>) -> Self {
        let controller = AppController::bootstrap(
            gateway.clone(),
            store.clone(),
            clock.clone(),
            NagPolicy::default(),
        );
        Self {
            controller,
            gateway,
            clock,
            store,
        }
    }

    /// Simulates an app restart over the same store.
    pub fn restart(&self) -> Self {
        Self::build(self.gateway.clone(), self.store.clone(), self.clock.clone())
    }
}

impl<S> Harness<S> {
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }
}

pub fn memory_harness(gateway: ScriptedGateway) -> Harness<MemoryStorage> {
    Harness::build(
        Arc::new(gateway),
        Arc::new(MemoryStorage::new()),
        Arc::new(ManualClock::new(start())),
    )
}

/// Harness persisting to a fresh temp directory; returns that directory too.
pub fn json_harness(gateway: ScriptedGateway) -> (Harness<JsonStorage>, PathBuf) {
    let base = temp_base();
    let storage = JsonStorage::new(Some(base.clone())).expect("create json storage backend");
    let harness = Harness::build(
        Arc::new(gateway),
        Arc::new(storage),
        Arc::new(ManualClock::new(start())),
    );
    (harness, base)
}
