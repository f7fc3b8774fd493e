//! Proof-of-work mining
//!
//! A proof is valid for a predecessor proof when
//! `sha256("{last_proof}{proof}")` starts with four hex zeros. The search is
//! a linear scan from zero, so the returned proof is always the smallest one.

use crate::error::{ChainError, Result};
use sha2::{Digest, Sha256};
use std::fmt::Write;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Required prefix of the hex digest. Fixed; not adjusted at runtime.
pub const DIFFICULTY_PREFIX: &str = "0000";

/// Proof stamped on the genesis block.
pub const GENESIS_PROOF: u64 = 100;

/// How often the cancellation token is polled during a search.
const CANCEL_CHECK_INTERVAL: u64 = 4096;

/// Limits applied to a single proof search.
#[derive(Debug, Clone, Default)]
pub struct SearchBudget {
    pub max_attempts: Option<u64>,
    pub cancel: Option<CancellationToken>,
}

impl SearchBudget {
    /// No attempt cap and no cancellation.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_max_attempts(mut self, max_attempts: u64) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|t| t.is_cancelled())
    }
}

/// Does `sha256("{last_proof}{proof}")` carry the difficulty prefix?
pub fn valid_proof(last_proof: u64, proof: u64) -> bool {
    let mut guess = String::with_capacity(40);
    check_guess(&mut guess, last_proof, proof)
}

fn check_guess(buf: &mut String, last_proof: u64, proof: u64) -> bool {
    buf.clear();
    // Writing into a String cannot fail.
    let _ = write!(buf, "{}{}", last_proof, proof);
    let digest = Sha256::digest(buf.as_bytes());
    // Four leading hex zeros are exactly two leading zero bytes.
    digest[0] == 0 && digest[1] == 0
}

/// Find the smallest proof satisfying [`valid_proof`] for `last_proof`.
///
/// Blocks the calling thread until a proof is found, the budget's attempt
/// cap is reached, or its token is cancelled.
pub fn proof_of_work(last_proof: u64, budget: &SearchBudget) -> Result<u64> {
    let mut guess = String::with_capacity(40);
    let mut proof: u64 = 0;

    loop {
        let attempts = proof;
        if attempts % CANCEL_CHECK_INTERVAL == 0 && budget.is_cancelled() {
            warn!(last_proof, attempts, "pow.cancelled");
            return Err(ChainError::SearchCancelled { last_proof, attempts });
        }
        if budget.max_attempts.is_some_and(|max| attempts >= max) {
            warn!(last_proof, attempts, "pow.exhausted");
            return Err(ChainError::SearchExhausted { last_proof, attempts });
        }

        if check_guess(&mut guess, last_proof, proof) {
            debug!(last_proof, proof, attempts = attempts + 1, "pow.solved");
            return Ok(proof);
        }

        proof = proof.checked_add(1).ok_or(ChainError::SearchExhausted {
            last_proof,
            attempts: u64::MAX,
        })?;
    }
}
