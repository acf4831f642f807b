//! In-memory transaction collection with copy-on-write updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Transaction, TransactionStatus};
use crate::errors::{ConscienceError, Result};

/// Ordered collection of every logged purchase and urge.
///
/// Mutating helpers return a fresh store instead of editing in place, so a
/// reader holding the previous value never observes a half-applied change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionStore {
    transactions: Vec<Transaction>,
}

impl TransactionStore {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter()
    }

    pub fn as_slice(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn get(&self, id: Uuid) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id == id)
    }

    pub fn require(&self, id: Uuid) -> Result<&Transaction> {
        self.get(id).ok_or(ConscienceError::TransactionNotFound(id))
    }

    /// Newest records first, the way lists are shown to the user.
    pub fn newest_first(&self) -> Vec<&Transaction> {
        let mut items: Vec<&Transaction> = self.transactions.iter().collect();
        items.sort_by(|a, b| b.date.cmp(&a.date));
        items
    }

    pub fn filter<P>(&self, predicate: P) -> Vec<&Transaction>
    where
        P: Fn(&Transaction) -> bool,
    {
        self.transactions.iter().filter(|txn| predicate(txn)).collect()
    }

    pub fn with_status(&self, status: TransactionStatus) -> Vec<&Transaction> {
        self.filter(|txn| txn.status == status)
    }

    pub fn has_real_transactions(&self) -> bool {
        self.transactions.iter().any(Transaction::is_real)
    }

    /// Earliest transaction whose follow-up is already due.
    pub fn earliest_due(&self, now: DateTime<Utc>) -> Option<&Transaction> {
        self.transactions
            .iter()
            .filter(|txn| txn.is_due(now))
            .min_by_key(|txn| txn.next_nag_at)
    }

    pub fn appended(&self, transaction: Transaction) -> Self {
        let mut transactions = Vec::with_capacity(self.transactions.len() + 1);
        transactions.push(transaction);
        transactions.extend(self.transactions.iter().cloned());
        Self { transactions }
    }

    /// Replaces the record with the same id, keeping its position.
    pub fn replaced(&self, transaction: Transaction) -> Result<Self> {
        let id = transaction.id;
        self.updated(id, move |slot| *slot = transaction)
    }

    pub fn updated<F>(&self, id: Uuid, mutator: F) -> Result<Self>
    where
        F: FnOnce(&mut Transaction),
    {
        let index = self
            .transactions
            .iter()
            .position(|txn| txn.id == id)
            .ok_or(ConscienceError::TransactionNotFound(id))?;
        let mut transactions = self.transactions.clone();
        mutator(&mut transactions[index]);
        Ok(Self { transactions })
    }

    pub fn into_vec(self) -> Vec<Transaction> {
        self.transactions
    }
}
