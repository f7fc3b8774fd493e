use crate::error::{ChainError, Result};
use crate::miner::valid_proof;

use super::chain::{Block, PreviousHash};
use super::hasher::hash_block;

/// Check a full chain: gapless 1-based indices, the genesis marker only on
/// index 1, every later block linked to its predecessor's digest and carrying
/// a proof valid for the predecessor's proof.
///
/// The genesis block's own linkage and proof are not checked.
pub fn validate_chain(blocks: &[Block]) -> Result<()> {
    for (position, block) in blocks.iter().enumerate() {
        let expected = position as u64 + 1;
        if block.index != expected {
            return Err(ChainError::InvalidIndex {
                position,
                expected,
                found: block.index,
            });
        }

        if position == 0 {
            if block.previous_hash != PreviousHash::Genesis {
                return Err(ChainError::InvalidGenesis(block.index));
            }
            continue;
        }

        let previous = &blocks[position - 1];
        validate_link(previous, block)?;
    }
    Ok(())
}

/// Check that `block` may directly follow `previous`.
pub fn validate_link(previous: &Block, block: &Block) -> Result<()> {
    let expected_hash = hash_block(previous)?;
    match &block.previous_hash {
        PreviousHash::Genesis => return Err(ChainError::InvalidGenesis(block.index)),
        PreviousHash::Digest(found) if *found != expected_hash => {
            return Err(ChainError::InvalidBlockLinkage {
                index: block.index,
                expected: expected_hash,
                found: found.clone(),
            });
        }
        PreviousHash::Digest(_) => {}
    }

    if !valid_proof(previous.proof, block.proof) {
        return Err(ChainError::InvalidProofOfWork {
            index: block.index,
            last_proof: previous.proof,
            proof: block.proof,
        });
    }
    Ok(())
}
