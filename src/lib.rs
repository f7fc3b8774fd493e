//! ForgeChain - a minimal append-only proof-of-work ledger
//!
//! # Architecture
//!
//! ## Core Ledger
//! - [`blockchain`] - Blocks, canonical hashing, the ledger and chain validation
//! - [`transaction`] - Transaction records
//! - [`mempool`] - Pending transactions awaiting the next block
//!
//! ## Consensus
//! - [`miner`] - Proof-of-work search and verification
//!
//! ## Node
//! - [`api`] - HTTP front end (feature `api`)
//! - [`identity`] - Node reward address generation
//! - [`config`] - Configuration management
//! - [`error`] - Error types

#![forbid(unsafe_code)]

// ============================================================================
// Core Ledger
// ============================================================================
pub mod blockchain;
pub mod mempool;
pub mod transaction;

// ============================================================================
// Consensus
// ============================================================================
pub mod miner;

// ============================================================================
// Node
// ============================================================================
#[cfg(feature = "api")]
pub mod api;
pub mod identity;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod error;
