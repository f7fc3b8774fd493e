//! Transaction mempool
//!
//! Holds transactions accepted since the last block was sealed, in arrival
//! order. The ledger drains it in full whenever a block is appended.

use crate::transaction::Transaction;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct Mempool {
    pending: Vec<Transaction>,
}

impl Mempool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a transaction behind everything already pending.
    /// Returns the number of pending transactions after the insert.
    pub fn add(&mut self, tx: Transaction) -> usize {
        debug!(sender = %tx.sender, recipient = %tx.recipient, amount = %tx.amount, "mempool.add");
        self.pending.push(tx);
        self.pending.len()
    }

    /// Remove and return every pending transaction, leaving the pool empty.
    pub fn drain(&mut self) -> Vec<Transaction> {
        std::mem::take(&mut self.pending)
    }

    pub fn get_all_transactions(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
