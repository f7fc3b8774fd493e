/// Transaction types for ForgeChain
use serde::{Deserialize, Serialize};

/// Amounts are carried as JSON numbers so integer and float submissions
/// hash exactly as they were received.
pub type Amount = serde_json::Number;

/// Sender recorded on the reward transaction queued by every mined block.
pub const REWARD_SENDER: &str = "0";

/// Units credited to the mining node per block.
pub const MINING_REWARD: u64 = 1;

/// A value transfer waiting in the mempool or sealed inside a block.
///
/// No signature, balance or uniqueness rule applies; any triple is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: Amount,
}

impl Transaction {
    pub fn new(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: impl Into<Amount>,
    ) -> Self {
        Transaction {
            sender: sender.into(),
            recipient: recipient.into(),
            amount: amount.into(),
        }
    }

    /// The reward paid to `beneficiary` for sealing a block.
    pub fn reward(beneficiary: impl Into<String>) -> Self {
        Transaction::new(REWARD_SENDER, beneficiary, MINING_REWARD)
    }

    pub fn is_reward(&self) -> bool {
        self.sender == REWARD_SENDER
    }
}
