//! Integration tests for ForgeChain API endpoints

#![cfg(feature = "api")]

use axum::response::IntoResponse;
use axum_test::TestServer;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use forgechain::api::{bind_listener, build_api_router, ApiError, Node};
use forgechain::blockchain::Blockchain;
use forgechain::config::MiningConfig;
use forgechain::error::ChainError;

const NODE: &str = "api-test-node";

fn test_server() -> (TestServer, Arc<RwLock<Blockchain>>) {
    let blockchain = Arc::new(RwLock::new(Blockchain::new(NODE)));
    let node = Arc::new(Node::new_shared(blockchain.clone(), MiningConfig::default()));
    let server = TestServer::new(build_api_router(node)).expect("Failed to create test server");
    (server, blockchain)
}

#[tokio::test]
async fn test_fresh_chain() {
    let (server, _) = test_server();

    let response = server.get("/chain").await;
    assert_eq!(response.status_code(), 200);
    let json: Value = response.json();
    assert_eq!(json["length"], 1);
    assert_eq!(json["chain"][0]["index"], 1);
    assert_eq!(json["chain"][0]["proof"], 100);
    assert_eq!(json["chain"][0]["previous_hash"], 1);
    assert_eq!(json["chain"][0]["transactions"], json!([]));
}

#[tokio::test]
async fn test_submit_then_mine() {
    let (server, blockchain) = test_server();

    let response = server
        .post("/transactions/new")
        .json(&json!({"sender": "A", "recipient": "B", "amount": 5}))
        .await;
    assert_eq!(response.status_code(), 201);
    let json: Value = response.json();
    assert_eq!(json["message"], "Transaction will be added to Block 2");

    let response = server.get("/mine").await;
    assert_eq!(response.status_code(), 200);
    let json: Value = response.json();
    assert_eq!(json["message"], "New Block Forged");
    assert_eq!(json["index"], 2);
    assert_eq!(
        json["transactions"],
        json!([
            {"sender": "A", "recipient": "B", "amount": 5},
            {"sender": "0", "recipient": NODE, "amount": 1}
        ])
    );

    let genesis_hash = {
        let chain = blockchain.read().await;
        Blockchain::hash(&chain.blocks()[0]).unwrap()
    };
    assert_eq!(json["previous_hash"], genesis_hash);

    let response = server.get("/chain").await;
    let json: Value = response.json();
    assert_eq!(json["length"], 2);

    let response = server.get("/chain/validate").await;
    assert_eq!(response.status_code(), 200);
    let json: Value = response.json();
    assert_eq!(json["valid"], true);
    assert!(json.get("error").is_none());
}

#[tokio::test]
async fn test_missing_field_is_client_error() {
    let (server, blockchain) = test_server();

    let response = server
        .post("/transactions/new")
        .json(&json!({"sender": "A", "amount": 5}))
        .await;
    assert_eq!(response.status_code(), 400);
    let json: Value = response.json();
    assert_eq!(json["error"], "Missing values");

    assert!(blockchain.read().await.mempool().is_empty());
}

#[tokio::test]
async fn test_malformed_amount_is_client_error() {
    let (server, blockchain) = test_server();

    let response = server
        .post("/transactions/new")
        .json(&json!({"sender": "A", "recipient": "B", "amount": "five"}))
        .await;
    assert_eq!(response.status_code(), 400);
    assert!(blockchain.read().await.mempool().is_empty());
}

#[tokio::test]
async fn test_non_string_sender_is_client_error() {
    let (server, blockchain) = test_server();

    let response = server
        .post("/transactions/new")
        .json(&json!({"sender": 7, "recipient": "B", "amount": 5}))
        .await;
    assert_eq!(response.status_code(), 400);
    let json: Value = response.json();
    assert!(json["error"].is_string());

    assert!(blockchain.read().await.mempool().is_empty());
}

#[tokio::test]
async fn test_exhausted_mining_budget() {
    let blockchain = Arc::new(RwLock::new(Blockchain::new(NODE)));
    let mining = MiningConfig {
        timeout_ms: 0,
        max_attempts: 1,
    };
    let node = Arc::new(Node::new_shared(blockchain.clone(), mining));
    let server = TestServer::new(build_api_router(node)).expect("Failed to create test server");

    // sha256("1000") does not start with "0000", so one attempt is not enough.
    let response = server.get("/mine").await;
    assert_eq!(response.status_code(), 503);
    let json: Value = response.json();
    assert!(json["error"].is_string());

    let chain = blockchain.read().await;
    assert_eq!(chain.len(), 1);
    assert!(chain.mempool().is_empty());
}

#[tokio::test]
async fn test_health_and_stats() {
    let (server, _) = test_server();

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), 200);
    let json: Value = response.json();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["node_id"], NODE);
    assert_eq!(json["height"], 1);
    assert!(json["timestamp"].is_string());

    server.get("/mine").await;
    server
        .post("/transactions/new")
        .json(&json!({"sender": "A", "recipient": "B", "amount": 1}))
        .await;

    let response = server.get("/stats").await;
    assert_eq!(response.status_code(), 200);
    let json: Value = response.json();
    assert_eq!(json["blocks_mined"], 1);
    assert_eq!(json["transactions_submitted"], 1);
    assert!(json["total_requests"].as_u64().unwrap() >= 3);
    assert!(json["uptime_seconds"].is_number());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_mines_are_serialized() {
    let blockchain = Arc::new(RwLock::new(Blockchain::new(NODE)));
    let node = Node::new_shared(blockchain.clone(), MiningConfig::default());

    let (first, second) = tokio::join!(node.mine_block(), node.mine_block());
    let (first, second) = (first.unwrap(), second.unwrap());

    assert_ne!(first.previous_hash, second.previous_hash);
    assert_eq!(node.blocks_mined(), 2);

    let chain = blockchain.read().await;
    assert_eq!(chain.len(), 3);
    assert!(chain.validate().is_ok());
    assert!(chain.mempool().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_mining_deadline_cancels_search() {
    let blockchain = Arc::new(RwLock::new(Blockchain::new(NODE)));
    blockchain.write().await.new_transaction("A", "B", 5);
    let node = Node::new_shared(blockchain.clone(), MiningConfig::default());

    // The first proof after genesis is 35293, well past the first cancellation check.
    let err = node.mine_block_within(Some(Duration::ZERO)).await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::BlockchainError(ChainError::SearchCancelled { .. })
    ));
    assert_eq!(err.into_response().status(), 503);
    assert_eq!(node.blocks_mined(), 0);

    let chain = blockchain.read().await;
    assert_eq!(chain.len(), 1);
    assert_eq!(chain.mempool().len(), 1);
}

#[tokio::test]
async fn test_bind_accepts_hostnames_and_literals() {
    for host in ["127.0.0.1", "localhost"] {
        let listener = bind_listener(host, 0).await.unwrap();
        let addr = listener.local_addr().unwrap();
        assert!(addr.ip().is_loopback(), "{} bound to {}", host, addr);
        assert_ne!(addr.port(), 0);
    }
}
