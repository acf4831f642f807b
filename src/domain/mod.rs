pub mod call;
pub mod category;
pub mod profile;
pub mod transaction;

pub use call::{AudioHandle, CallKind, CallState, PurchaseAnalysis};
pub use category::Category;
pub use profile::{AiTone, UserProfile};
pub use transaction::{PurchaseDraft, Transaction, TransactionStatus, MAX_NAG_COUNT};
