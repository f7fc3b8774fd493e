use crate::error::Result;
use crate::mempool::Mempool;
use crate::miner::{proof_of_work, SearchBudget, GENESIS_PROOF};
use crate::transaction::{Amount, Transaction};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::info;

use super::hasher::hash_block;

/// Value stored as `previous_hash` on the genesis block.
pub const GENESIS_MARKER: u64 = 1;

/// Link from a block to its predecessor.
///
/// The genesis block has no predecessor and carries the integer sentinel `1`
/// instead of a digest. Nothing checks it against a real hash, so validators
/// must treat index 1 as a special case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviousHash {
    Genesis,
    Digest(String),
}

impl PreviousHash {
    pub fn as_digest(&self) -> Option<&str> {
        match self {
            PreviousHash::Genesis => None,
            PreviousHash::Digest(digest) => Some(digest),
        }
    }
}

impl std::fmt::Display for PreviousHash {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            PreviousHash::Genesis => write!(f, "{}", GENESIS_MARKER),
            PreviousHash::Digest(digest) => f.write_str(digest),
        }
    }
}

impl Serialize for PreviousHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            PreviousHash::Genesis => serializer.serialize_u64(GENESIS_MARKER),
            PreviousHash::Digest(digest) => serializer.serialize_str(digest),
        }
    }
}

impl<'de> Deserialize<'de> for PreviousHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Marker(u64),
            Digest(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Marker(GENESIS_MARKER) => Ok(PreviousHash::Genesis),
            Raw::Marker(other) => Err(serde::de::Error::custom(format!(
                "unexpected previous_hash marker {}",
                other
            ))),
            Raw::Digest(digest) => Ok(PreviousHash::Digest(digest)),
        }
    }
}

/// A sealed batch of transactions. Never modified once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    /// Seconds since the UNIX epoch.
    pub timestamp: f64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: PreviousHash,
}

impl Block {
    pub fn genesis(timestamp: f64) -> Self {
        Block {
            index: 1,
            timestamp,
            transactions: Vec::new(),
            proof: GENESIS_PROOF,
            previous_hash: PreviousHash::Genesis,
        }
    }

    pub fn hash(&self) -> Result<String> {
        hash_block(self)
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 1
    }
}

fn now_epoch_secs() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// The append-only ledger: blocks `1..=N` plus the mempool feeding block `N + 1`.
#[derive(Debug, Clone)]
pub struct Blockchain {
    // Never empty: the genesis block is appended in `new`.
    blocks: Vec<Block>,
    mempool: Mempool,
    node_id: String,
}

impl Blockchain {
    /// Create a ledger holding only the genesis block. `node_id` receives
    /// the reward for every block this ledger mines.
    pub fn new(node_id: impl Into<String>) -> Self {
        let mut blockchain = Blockchain {
            blocks: Vec::new(),
            mempool: Mempool::new(),
            node_id: node_id.into(),
        };
        blockchain.create_genesis_block();
        blockchain
    }

    fn create_genesis_block(&mut self) {
        let genesis = Block::genesis(now_epoch_secs());
        info!(node_id = %self.node_id, timestamp = genesis.timestamp, "chain.genesis");
        self.blocks.push(genesis);
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn last_block(&self) -> &Block {
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// True when the chain holds no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn mempool(&self) -> &Mempool {
        &self.mempool
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Digest used to link `block` to its successor.
    pub fn hash(block: &Block) -> Result<String> {
        hash_block(block)
    }

    /// Queue a transaction for the next block and return that block's index.
    ///
    /// The index is a projection: it only holds if the next block is mined
    /// by this ledger.
    pub fn new_transaction(
        &mut self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: impl Into<Amount>,
    ) -> u64 {
        self.mempool.add(Transaction::new(sender, recipient, amount));
        self.last_block().index + 1
    }

    /// Solve the next proof without limits, pay the node and append the block.
    pub fn mine(&mut self) -> Result<&Block> {
        self.mine_with(&SearchBudget::unbounded())
    }

    /// Like [`Blockchain::mine`] but bounded by `budget`.
    ///
    /// A failed search leaves the ledger untouched: no reward is queued and
    /// the mempool keeps its transactions.
    pub fn mine_with(&mut self, budget: &SearchBudget) -> Result<&Block> {
        let last_proof = self.last_block().proof;
        let proof = proof_of_work(last_proof, budget)?;

        let previous_hash = PreviousHash::Digest(self.last_block().hash()?);
        self.mempool.add(Transaction::reward(self.node_id.clone()));
        Ok(self.seal(proof, previous_hash))
    }

    fn seal(&mut self, proof: u64, previous_hash: PreviousHash) -> &Block {
        let block = Block {
            index: self.blocks.len() as u64 + 1,
            timestamp: now_epoch_secs(),
            transactions: self.mempool.drain(),
            proof,
            previous_hash,
        };

        info!(
            index = block.index,
            proof = block.proof,
            transactions = block.transactions.len(),
            previous_hash = %block.previous_hash,
            "chain.block_sealed"
        );

        self.blocks.push(block);
        self.last_block()
    }

    /// Re-check index sequence, linkage and proofs of the whole chain.
    pub fn validate(&self) -> Result<()> {
        super::validation::validate_chain(&self.blocks)
    }
}
