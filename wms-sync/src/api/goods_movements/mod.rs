//! Goods Movement API 模块
//!
//! Interactive single-record posting. Nothing is persisted, the caller owns
//! the record.

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/goods-movements", post(handler::submit))
}
