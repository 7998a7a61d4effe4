//! Reconciliation API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::reconcile::{parse_summaries, LogSummary, RunOutcome, SchedulerStatus, StatsSnapshot};
use shared::{ApiResponse, AppError, AppResult};

const DEFAULT_LOG_LINES: usize = 500;
const MAX_LOG_LINES: usize = 10_000;

/// POST /api/reconcile/run - 手动触发
///
/// Always 200; `success: false` when a pass is already running or aborted.
pub async fn run(State(state): State<ServerState>) -> Json<RunOutcome> {
    Json(state.scheduler.run_now().await)
}

/// GET /api/reconcile/status
pub async fn status(State(state): State<ServerState>) -> Json<ApiResponse<SchedulerStatus>> {
    Json(ApiResponse::success(state.scheduler.status()))
}

/// GET /api/reconcile/stats
pub async fn stats(State(state): State<ServerState>) -> Json<ApiResponse<StatsSnapshot>> {
    Json(ApiResponse::success(state.stats.snapshot()))
}

#[derive(Debug, Deserialize)]
pub struct LogStatsQuery {
    pub lines: Option<usize>,
}

/// GET /api/reconcile/stats/log?lines=N
pub async fn log_stats(
    State(state): State<ServerState>,
    Query(query): Query<LogStatsQuery>,
) -> AppResult<Json<ApiResponse<Vec<LogSummary>>>> {
    let lines = query.lines.unwrap_or(DEFAULT_LOG_LINES).clamp(1, MAX_LOG_LINES);
    let audit = state.audit.clone();
    let tail = tokio::task::spawn_blocking(move || audit.tail(lines))
        .await
        .map_err(|e| AppError::internal(format!("Audit reader failed: {e}")))?
        .map_err(|e| AppError::internal(format!("Failed to read audit log: {e}")))?;

    Ok(Json(ApiResponse::success(parse_summaries(&tail))))
}
