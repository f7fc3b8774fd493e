//! REST API server for ForgeChain
//!
//! Exposes `mine`, `submit-transaction` and `read-chain` over HTTP, plus
//! health, statistics and chain validation endpoints.

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::{self, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::blockchain::{Block, Blockchain, PreviousHash};
use crate::config::MiningConfig;
use crate::error::ChainError;
use crate::transaction::{Amount, Transaction};

/// Node state shared by all handlers
#[derive(Clone)]
pub struct Node {
    pub blockchain: Arc<RwLock<Blockchain>>,
    mining: MiningConfig,
    blocks_mined: Arc<AtomicU64>,
    api_stats: Arc<RwLock<ApiStats>>,
}

/// API statistics and monitoring
#[derive(Debug, Default)]
struct ApiStats {
    total_requests: u64,
    successful_requests: u64,
    failed_requests: u64,
    transactions_submitted: u64,
    start_time: Option<Instant>,
}

impl ApiStats {
    fn new() -> Self {
        ApiStats {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    fn record_request(&mut self, success: bool) {
        self.total_requests += 1;
        if success {
            self.successful_requests += 1;
        } else {
            self.failed_requests += 1;
        }
    }
}

impl Node {
    pub fn new(blockchain: Blockchain, mining: MiningConfig) -> Self {
        Self::new_shared(Arc::new(RwLock::new(blockchain)), mining)
    }

    /// Build a node around a ledger handle the caller keeps a clone of.
    pub fn new_shared(blockchain: Arc<RwLock<Blockchain>>, mining: MiningConfig) -> Self {
        Self {
            blockchain,
            mining,
            blocks_mined: Arc::new(AtomicU64::new(0)),
            api_stats: Arc::new(RwLock::new(ApiStats::new())),
        }
    }

    pub fn blocks_mined(&self) -> u64 {
        self.blocks_mined.load(Ordering::Relaxed)
    }

    /// Mine one block under the configured deadline.
    pub async fn mine_block(&self) -> Result<Block, ApiError> {
        self.mine_block_within(self.mining.timeout()).await
    }

    /// Mine one block.
    ///
    /// The write lock is held from reading the last block until the new one
    /// is appended, and the search runs on the blocking pool. Once `deadline`
    /// passes the search is cancelled and the ledger is left as it was.
    pub async fn mine_block_within(&self, deadline: Option<Duration>) -> Result<Block, ApiError> {
        let guard = self.blockchain.clone().write_owned().await;
        let cancel = CancellationToken::new();
        let budget = self.mining.budget().with_cancel(cancel.clone());

        let mut task = tokio::task::spawn_blocking(move || -> crate::error::Result<Block> {
            let mut chain = guard;
            let block = chain.mine_with(&budget)?.clone();
            Ok(block)
        });

        let joined = match deadline {
            Some(limit) => match tokio::time::timeout(limit, &mut task).await {
                Ok(joined) => joined,
                Err(_) => {
                    tracing::warn!(timeout_ms = limit.as_millis() as u64, "mine.deadline_reached");
                    cancel.cancel();
                    task.await
                }
            },
            None => task.await,
        };

        let block = joined
            .map_err(|e| ApiError::InternalError(format!("Mining task failed: {}", e)))??;
        self.blocks_mined.fetch_add(1, Ordering::SeqCst);
        Ok(block)
    }

    pub async fn get_stats(&self) -> ApiStatsResponse {
        let stats = self.api_stats.read().await;
        let uptime = stats.start_time.map(|t| t.elapsed().as_secs()).unwrap_or(0);

        ApiStatsResponse {
            total_requests: stats.total_requests,
            successful_requests: stats.successful_requests,
            failed_requests: stats.failed_requests,
            transactions_submitted: stats.transactions_submitted,
            uptime_seconds: uptime,
            blocks_mined: self.blocks_mined(),
        }
    }
}

// ============================================================================
// API Error Handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    BlockchainError(ChainError),
    InvalidInput(String),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BlockchainError(
                e @ (ChainError::SearchCancelled { .. } | ChainError::SearchExhausted { .. }),
            ) => (StatusCode::SERVICE_UNAVAILABLE, e.to_string()),
            ApiError::BlockchainError(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<ChainError> for ApiError {
    fn from(err: ChainError) -> Self {
        ApiError::BlockchainError(err)
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Serialize)]
pub struct MineResponse {
    pub message: String,
    pub index: u64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: PreviousHash,
}

#[derive(Serialize)]
pub struct ChainResponse {
    pub chain: Vec<Block>,
    pub length: usize,
}

#[derive(Serialize)]
pub struct ValidationResponse {
    pub valid: bool,
    pub length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct ApiStatsResponse {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub transactions_submitted: u64,
    pub uptime_seconds: u64,
    pub blocks_mined: u64,
}

/// All fields are optional here so a missing one is reported as such
/// rather than as a generic decode failure.
#[derive(Deserialize)]
pub struct NewTransactionRequest {
    pub sender: Option<String>,
    pub recipient: Option<String>,
    pub amount: Option<Amount>,
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

// ============================================================================
// Middleware
// ============================================================================

async fn stats_middleware(State(node): State<Arc<Node>>, req: Request, next: Next) -> Response {
    let response = next.run(req).await;

    let success = response.status().is_success();
    let mut stats = node.api_stats.write().await;
    stats.record_request(success);

    response
}

async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    tracing::info!(
        method = %method,
        path = %path,
        status = %response.status().as_u16(),
        duration_ms = %start.elapsed().as_millis(),
        "api.request"
    );

    response
}

// ============================================================================
// API Server
// ============================================================================

/// Build the API router with all endpoints
pub fn build_api_router(node: Arc<Node>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(vec![
            http::Method::GET,
            http::Method::POST,
            http::Method::OPTIONS,
        ])
        .allow_headers(vec![http::header::CONTENT_TYPE])
        .allow_credentials(true);

    Router::new()
        .route("/mine", get(mine))
        .route("/transactions/new", post(submit_transaction))
        .route("/chain", get(full_chain))
        .route("/chain/validate", get(validate_chain))
        .route("/health", get(health_check))
        .route("/stats", get(get_api_stats))
        // logging before stats so timing covers the whole request
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn_with_state(node.clone(), stats_middleware))
        .with_state(node)
        .layer(cors)
}

/// Bind `host:port`. `host` may be an IP literal (v4 or v6) or a hostname.
pub async fn bind_listener(host: &str, port: u16) -> std::io::Result<TcpListener> {
    TcpListener::bind((host, port)).await
}

/// Bind `host:port` and serve until the process exits
pub async fn run_api_server(
    node: Arc<Node>,
    host: &str,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_api_router(node);
    let listener = bind_listener(host, port).await?;

    tracing::info!(addr = %listener.local_addr()?, "api.listening");

    axum::serve(listener, app).await?;
    Ok(())
}

// ============================================================================
// Route Handlers
// ============================================================================

async fn mine(State(node): State<Arc<Node>>) -> Result<Json<MineResponse>, ApiError> {
    let block = node.mine_block().await?;

    Ok(Json(MineResponse {
        message: "New Block Forged".to_string(),
        index: block.index,
        transactions: block.transactions,
        proof: block.proof,
        previous_hash: block.previous_hash,
    }))
}

async fn submit_transaction(
    State(node): State<Arc<Node>>,
    payload: Result<Json<NewTransactionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::InvalidInput(e.body_text()))?;

    let (Some(sender), Some(recipient), Some(amount)) = (req.sender, req.recipient, req.amount)
    else {
        return Err(ApiError::InvalidInput("Missing values".to_string()));
    };

    let index = node
        .blockchain
        .write()
        .await
        .new_transaction(sender, recipient, amount);

    {
        let mut stats = node.api_stats.write().await;
        stats.transactions_submitted += 1;
    }

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: format!("Transaction will be added to Block {}", index),
        }),
    ))
}

async fn full_chain(State(node): State<Arc<Node>>) -> Json<ChainResponse> {
    let blockchain = node.blockchain.read().await;
    Json(ChainResponse {
        chain: blockchain.blocks().to_vec(),
        length: blockchain.len(),
    })
}

async fn validate_chain(State(node): State<Arc<Node>>) -> Json<ValidationResponse> {
    let blockchain = node.blockchain.read().await;
    let result = blockchain.validate();
    Json(ValidationResponse {
        valid: result.is_ok(),
        length: blockchain.len(),
        error: result.err().map(|e| e.to_string()),
    })
}

async fn health_check(State(node): State<Arc<Node>>) -> impl IntoResponse {
    let blockchain = node.blockchain.read().await;
    Json(serde_json::json!({
        "status": "healthy",
        "node_id": blockchain.node_id(),
        "height": blockchain.len(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn get_api_stats(State(node): State<Arc<Node>>) -> impl IntoResponse {
    Json(node.get_stats().await)
}
