//! Reconciliation API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/reconcile/run | POST | 手动触发一次对账（运行中则拒绝） |
//! | /api/reconcile/status | GET | 调度器状态 |
//! | /api/reconcile/stats | GET | 内存统计（最近批次 + 累计） |
//! | /api/reconcile/stats/log | GET | 从审计日志尾部解析的统计 |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/reconcile", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/run", post(handler::run))
        .route("/status", get(handler::status))
        .route("/stats", get(handler::stats))
        .route("/stats/log", get(handler::log_stats))
}
