pub mod json_backend;
pub mod memory;

use crate::domain::{AiTone, Transaction, UserProfile};
use crate::errors::Result;

pub const TRANSACTIONS_KEY: &str = "conscience_transactions";
pub const PROFILE_KEY: &str = "conscience_profile";
pub const TONE_KEY: &str = "conscience_tone";

/// Durable home for everything the app restores at startup.
///
/// `None` from a loader means nothing was ever saved under that key, which is
/// distinct from an empty collection.
pub trait StateStore: Send + Sync {
    fn load_transactions(&self) -> Result<Option<Vec<Transaction>>>;
    fn save_transactions(&self, transactions: &[Transaction]) -> Result<()>;

    fn load_profile(&self) -> Result<Option<UserProfile>>;
    fn save_profile(&self, profile: &UserProfile) -> Result<()>;

    fn load_tone(&self) -> Result<Option<AiTone>>;
    fn save_tone(&self, tone: AiTone) -> Result<()>;

    /// Forgets the profile and tone; used when history is cleared.
    fn clear_profile_and_tone(&self) -> Result<()>;
}

pub use json_backend::JsonStorage;
pub use memory::MemoryStorage;
