use crate::analyzer::Analyzer;
use crate::scheduler::Scheduler;
use crate::session::SessionManager;
use crate::store::SubscriberStore;
use anyhow::Result;
use axum::{
    extract::{Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tracing::info;

// -----------------------------------------------
// STATUS / TRIGGER SERVER
// -----------------------------------------------

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<SessionManager>,
    pub store: Arc<SubscriberStore>,
    pub analyzer: Arc<Analyzer>,
    pub scheduler: Arc<Scheduler>,
    pub started: Instant,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeQuery {
    pub symbol: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub session_valid: bool,
    pub subscribers: usize,
    pub daily_subscribers: usize,
    pub watched_symbols: usize,
    pub uptime_secs: u64,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub symbol: String,
    pub report: String,
}

/// GET /health
async fn health() -> &'static str {
    "ok"
}

/// GET /api/status
async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let counts = state.store.counts().await;
    Json(StatusResponse {
        session_valid: state.session.is_valid().await,
        subscribers: counts.subscribers,
        daily_subscribers: counts.daily_subscribers,
        watched_symbols: counts.watched_symbols,
        uptime_secs: state.started.elapsed().as_secs(),
    })
}

/// GET /api/analyze?symbol=NIFTY — run one analysis and return the report
/// text. Failures come back as report text too, never as an error status.
async fn analyze(
    Query(query): Query<AnalyzeQuery>,
    State(state): State<AppState>,
) -> Json<AnalyzeResponse> {
    let symbol = query.symbol.trim().to_uppercase();
    let report = state.analyzer.analyze(&symbol).await;
    Json(AnalyzeResponse { symbol, report })
}

/// POST /api/run-daily — fire one daily report batch immediately.
async fn run_daily(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.scheduler.run_batch().await;
    Json(serde_json::json!({ "success": true }))
}

pub async fn start_server(port: u16, state: AppState) -> Result<()> {
    let app = Router::new()
        .route("/health", get(health))
        .route("/api/status", get(status))
        .route("/api/analyze", get(analyze))
        .route("/api/run-daily", post(run_daily))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("127.0.0.1:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "status server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
