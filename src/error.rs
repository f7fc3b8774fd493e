//! Error types for ForgeChain

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Proof search cancelled after {attempts} attempts (last proof {last_proof})")]
    SearchCancelled { last_proof: u64, attempts: u64 },
    #[error("Proof search exhausted after {attempts} attempts (last proof {last_proof})")]
    SearchExhausted { last_proof: u64, attempts: u64 },
    #[error("Invalid block index at position {position}: expected {expected}, found {found}")]
    InvalidIndex {
        position: usize,
        expected: u64,
        found: u64,
    },
    #[error("Invalid genesis marker on block {0}")]
    InvalidGenesis(u64),
    #[error("Invalid block linkage at block {index}: expected {expected}, found {found}")]
    InvalidBlockLinkage {
        index: u64,
        expected: String,
        found: String,
    },
    #[error("Invalid proof of work at block {index}: {proof} does not follow {last_proof}")]
    InvalidProofOfWork {
        index: u64,
        last_proof: u64,
        proof: u64,
    },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for ChainError {
    fn from(err: toml::de::Error) -> Self {
        ChainError::Config(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;
