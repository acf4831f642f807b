use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::{
    core::utils::{ensure_dir, PathResolver},
    domain::{AiTone, Transaction, UserProfile},
    errors::Result,
};

use super::{StateStore, PROFILE_KEY, TONE_KEY, TRANSACTIONS_KEY};

const TMP_SUFFIX: &str = "tmp";

/// Stores each key as a pretty-printed JSON document under `<base>/state/`.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    root: PathBuf,
    state_dir: PathBuf,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>) -> Result<Self> {
        let app_root = PathResolver::resolve_base(root);
        ensure_dir(&app_root)?;
        let state_dir = PathResolver::state_dir_in(&app_root);
        ensure_dir(&state_dir)?;
        Ok(Self {
            root: app_root,
            state_dir,
        })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None)
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    pub fn key_path(&self, key: &str) -> PathBuf {
        self.state_dir.join(format!("{}.json", key))
    }

    fn read_key<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&data)?))
    }

    fn write_key<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let path = self.key_path(key);
        let json = serde_json::to_string_pretty(value)?;
        let tmp = tmp_path(&path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &path)?;
        debug!(key, path = %path.display(), "state written");
        Ok(())
    }

    fn remove_key(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

impl StateStore for JsonStorage {
    fn load_transactions(&self) -> Result<Option<Vec<Transaction>>> {
        self.read_key(TRANSACTIONS_KEY)
    }

    fn save_transactions(&self, transactions: &[Transaction]) -> Result<()> {
        self.write_key(TRANSACTIONS_KEY, transactions)
    }

    fn load_profile(&self) -> Result<Option<UserProfile>> {
        self.read_key(PROFILE_KEY)
    }

    fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        self.write_key(PROFILE_KEY, profile)
    }

    fn load_tone(&self) -> Result<Option<AiTone>> {
        self.read_key(TONE_KEY)
    }

    fn save_tone(&self, tone: AiTone) -> Result<()> {
        self.write_key(TONE_KEY, &tone)
    }

    fn clear_profile_and_tone(&self) -> Result<()> {
        self.remove_key(PROFILE_KEY)?;
        self.remove_key(TONE_KEY)
    }
}

pub(crate) fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

pub(crate) fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, PurchaseDraft, TransactionStatus};
    use chrono::NaiveDate;

    #[test]
    fn missing_keys_load_as_absent() {
        let temp = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(Some(temp.path().to_path_buf())).unwrap();
        assert!(storage.load_transactions().unwrap().is_none());
        assert!(storage.load_profile().unwrap().is_none());
        assert!(storage.load_tone().unwrap().is_none());
    }

    #[test]
    fn transactions_are_written_under_fixed_key() {
        let temp = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(Some(temp.path().to_path_buf())).unwrap();
        let draft = PurchaseDraft::new("Lamp", 45.0, Category::Home);
        let txn = Transaction::from_draft(
            &draft,
            NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            TransactionStatus::Approved,
        );
        storage.save_transactions(std::slice::from_ref(&txn)).unwrap();

        let path = storage.key_path(TRANSACTIONS_KEY);
        assert!(path.ends_with("state/conscience_transactions.json"));
        assert!(!tmp_path(&path).exists());
        assert_eq!(storage.load_transactions().unwrap(), Some(vec![txn]));
    }

    #[test]
    fn clearing_removes_profile_and_tone_only() {
        let temp = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(Some(temp.path().to_path_buf())).unwrap();
        storage.save_transactions(&[]).unwrap();
        storage
            .save_profile(&UserProfile::new(2000.0, "gadgets", "Bike", 600.0))
            .unwrap();
        storage.save_tone(AiTone::Stern).unwrap();

        storage.clear_profile_and_tone().unwrap();
        assert!(storage.load_profile().unwrap().is_none());
        assert!(storage.load_tone().unwrap().is_none());
        assert_eq!(storage.load_transactions().unwrap(), Some(Vec::new()));
    }

    #[test]
    fn corrupt_document_is_a_persistence_failure() {
        let temp = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(Some(temp.path().to_path_buf())).unwrap();
        fs::write(storage.key_path(TONE_KEY), "not json").unwrap();
        assert!(matches!(
            storage.load_tone(),
            Err(crate::errors::ConscienceError::PersistenceFailure(_))
        ));
    }
}
