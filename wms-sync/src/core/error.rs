use shared::AppError;
use std::net::SocketAddr;
use thiserror::Error;

/// 服务器生命周期错误（启动、监听、运行）
///
/// 请求级错误使用 [`AppError`]。
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("无法监听 {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP 服务异常退出: {0}")]
    Serve(#[source] std::io::Error),

    #[error("初始化失败: {0}")]
    Init(#[from] AppError),

    #[error("内部服务器错误: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, ServerError>;
