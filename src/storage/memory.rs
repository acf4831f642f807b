use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use serde::{de::DeserializeOwned, Serialize};

use crate::domain::{AiTone, Transaction, UserProfile};
use crate::errors::{ConscienceError, Result};

use super::{StateStore, PROFILE_KEY, TONE_KEY, TRANSACTIONS_KEY};

/// In-process store holding the same JSON documents the file backend writes.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    documents: Mutex<HashMap<&'static str, String>>,
    fail_writes: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail with `PersistenceFailure`.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.documents().contains_key(key)
    }

    fn documents(&self) -> MutexGuard<'_, HashMap<&'static str, String>> {
        self.documents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.documents().get(key) {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }

    fn write<T: Serialize + ?Sized>(&self, key: &'static str, value: &T) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ConscienceError::PersistenceFailure(format!(
                "memory store rejected write to `{key}`"
            )));
        }
        let json = serde_json::to_string(value)?;
        self.documents().insert(key, json);
        Ok(())
    }
}

impl StateStore for MemoryStorage {
    fn load_transactions(&self) -> Result<Option<Vec<Transaction>>> {
        self.read(TRANSACTIONS_KEY)
    }

    fn save_transactions(&self, transactions: &[Transaction]) -> Result<()> {
        self.write(TRANSACTIONS_KEY, transactions)
    }

    fn load_profile(&self) -> Result<Option<UserProfile>> {
        self.read(PROFILE_KEY)
    }

    fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        self.write(PROFILE_KEY, profile)
    }

    fn load_tone(&self) -> Result<Option<AiTone>> {
        self.read(TONE_KEY)
    }

    fn save_tone(&self, tone: AiTone) -> Result<()> {
        self.write(TONE_KEY, &tone)
    }

    fn clear_profile_and_tone(&self) -> Result<()> {
        let mut documents = self.documents();
        documents.remove(PROFILE_KEY);
        documents.remove(TONE_KEY);
        Ok(())
    }
}
