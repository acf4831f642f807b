//! Transaction collection and its seed data.

pub mod seed;
pub mod store;

pub use seed::example_transactions;
pub use store::TransactionStore;
