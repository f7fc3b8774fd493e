//! Integration tests for the ledger's chain-wide guarantees

use forgechain::blockchain::{Block, Blockchain, PreviousHash};
use forgechain::miner::{valid_proof, SearchBudget};
use forgechain::transaction::{Transaction, REWARD_SENDER};

const NODE: &str = "test-node";

fn mine_blocks(chain: &mut Blockchain, count: usize) {
    for _ in 0..count {
        chain.mine().expect("unbounded search always finds a proof");
    }
}

#[test]
fn test_genesis_invariant() {
    let chain = Blockchain::new(NODE);
    let blocks = chain.blocks();

    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].index, 1);
    assert!(blocks[0].transactions.is_empty());
    assert_eq!(blocks[0].proof, 100);
    assert_eq!(blocks[0].previous_hash, PreviousHash::Genesis);
}

#[test]
fn test_indices_are_gapless() {
    let mut chain = Blockchain::new(NODE);
    mine_blocks(&mut chain, 3);

    for (i, block) in chain.blocks().iter().enumerate() {
        assert_eq!(block.index, i as u64 + 1);
    }
}

#[test]
fn test_linkage_and_proofs_hold() {
    let mut chain = Blockchain::new(NODE);
    chain.new_transaction("A", "B", 5);
    mine_blocks(&mut chain, 3);

    for pair in chain.blocks().windows(2) {
        let (prev, block) = (&pair[0], &pair[1]);
        let expected = Blockchain::hash(prev).unwrap();
        assert_eq!(block.previous_hash, PreviousHash::Digest(expected));
        assert!(valid_proof(prev.proof, block.proof));
    }
    assert!(chain.validate().is_ok());
}

#[test]
fn test_pool_drains_exactly_into_next_block() {
    let mut chain = Blockchain::new(NODE);
    mine_blocks(&mut chain, 1);

    let submitted = vec![
        Transaction::new("alice", "bob", 3),
        Transaction::new("bob", "carol", 1),
        Transaction::new("alice", "bob", 3),
    ];
    for tx in &submitted {
        chain.new_transaction(tx.sender.clone(), tx.recipient.clone(), tx.amount.clone());
    }

    let block = chain.mine().unwrap().clone();
    let mut expected = submitted;
    expected.push(Transaction::reward(NODE));

    assert_eq!(block.transactions, expected);
    assert!(chain.mempool().is_empty());
}

#[test]
fn test_first_mined_block_scenario() {
    let mut chain = Blockchain::new(NODE);
    let genesis: Block = chain.last_block().clone();

    assert_eq!(chain.new_transaction("A", "B", 5), 2);

    let block = chain.mine().unwrap().clone();
    assert_eq!(block.index, 2);
    assert_eq!(
        block.transactions,
        vec![
            Transaction::new("A", "B", 5),
            Transaction::new(REWARD_SENDER, NODE, 1),
        ]
    );
    assert_eq!(
        block.previous_hash,
        PreviousHash::Digest(Blockchain::hash(&genesis).unwrap())
    );
    assert!(valid_proof(100, block.proof));
}

#[test]
fn test_back_to_back_mines_carry_only_own_reward() {
    let mut chain = Blockchain::new(NODE);
    mine_blocks(&mut chain, 2);

    let second = &chain.blocks()[2];
    assert_eq!(second.transactions, vec![Transaction::reward(NODE)]);
}

#[test]
fn test_linkage_hash_covers_sealed_transactions() {
    let mut chain = Blockchain::new(NODE);
    chain.new_transaction("A", "B", 5);
    mine_blocks(&mut chain, 2);

    let mut stripped = chain.blocks()[1].clone();
    stripped.transactions.clear();

    let link = &chain.blocks()[2].previous_hash;
    assert_ne!(*link, PreviousHash::Digest(Blockchain::hash(&stripped).unwrap()));
    assert_eq!(
        *link,
        PreviousHash::Digest(Blockchain::hash(&chain.blocks()[1]).unwrap())
    );
}

#[test]
fn test_exhausted_budget_leaves_chain_alone() {
    let mut chain = Blockchain::new(NODE);
    chain.new_transaction("A", "B", 5);

    assert!(chain.mine_with(&SearchBudget::unbounded().with_max_attempts(0)).is_err());
    assert_eq!(chain.len(), 1);
    assert_eq!(chain.mempool().len(), 1);

    let block = chain.mine().unwrap();
    assert_eq!(block.transactions.len(), 2);
}

#[test]
fn test_chain_serializes_in_wire_shape() {
    let mut chain = Blockchain::new(NODE);
    mine_blocks(&mut chain, 1);

    let value = serde_json::to_value(chain.blocks()).unwrap();
    assert_eq!(value[0]["previous_hash"], serde_json::json!(1));
    assert!(value[0]["timestamp"].is_f64());
    assert!(value[1]["previous_hash"].is_string());
    assert_eq!(value[1]["transactions"][0]["sender"], REWARD_SENDER);

    let restored: Vec<Block> = serde_json::from_value(value).unwrap();
    assert_eq!(restored.len(), 2);
    assert_eq!(restored[0].previous_hash, PreviousHash::Genesis);
    assert_eq!(restored[1].previous_hash, chain.blocks()[1].previous_hash);
    assert_eq!(restored[1].transactions, chain.blocks()[1].transactions);
}
