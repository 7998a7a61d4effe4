//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`reconcile`] - 对账触发、状态与统计
//! - [`goods_movements`] - 交互式单条货物移动提交

pub mod goods_movements;
pub mod health;
pub mod reconcile;

use axum::Router;

use crate::core::ServerState;

/// 全部 API 路由
pub fn router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(reconcile::router())
        .merge(goods_movements::router())
}
