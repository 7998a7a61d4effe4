//! Goods Movement API Handlers

use axum::{Json, extract::State};
use serde::Deserialize;

use crate::core::ServerState;
use crate::reconcile::validator::missing_fields;
use shared::models::{PendingTransactionRecord, ProcessingResult};
use shared::{ApiResponse, AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub record: PendingTransactionRecord,
}

/// POST /api/goods-movements - 单条提交（单条超时）
pub async fn submit(
    State(state): State<ServerState>,
    Json(payload): Json<SubmitRequest>,
) -> AppResult<Json<ApiResponse<ProcessingResult>>> {
    let record = payload.record;
    let missing = missing_fields(&record);
    if !missing.is_empty() {
        return Err(AppError::validation(format!(
            "Record {} is missing {}",
            record.identifier(),
            missing.join(", ")
        ))
        .with_detail("missing", missing));
    }

    let label = format!("{} record {} (interactive)", record.module, record.identifier());
    let result = state.submitter.submit_single(&record).await.map_err(|e| {
        state.audit.error(format!("{label} failed: {e}"));
        AppError::from(e)
    })?;

    if result.success {
        state.audit.info(format!("{label}: {}", result.message));
    } else {
        state.audit.warn(format!("{label} rejected: {}", result.message));
    }

    Ok(Json(ApiResponse::success(result)))
}
