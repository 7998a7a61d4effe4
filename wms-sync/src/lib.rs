//! WMS Sync - 仓储 → ERP 异步对账服务
//!
//! # 架构概述
//!
//! 仓库作业在实时过账失败后留下待处理记录。本服务定期（启动后、每 2 小时、
//! 或手动触发）把这些记录按模块分组、分批提交到 ERP，并在成功后回写
//! 物料凭证号。
//!
//! - **对账** (`reconcile`): 注册表、校验、分组、重试、回退、持久化、调度、统计
//! - **ERP** (`erp`): GOODSMVT 请求构建与 HTTP 客户端
//! - **存储** (`store`, `db`): 待处理记录端口，SQLite / 内存实现
//! - **审计** (`audit`): 追加式对账审计日志
//! - **HTTP API** (`api`): 手动触发、状态、统计、单条提交
//!
//! # 模块结构
//!
//! ```text
//! wms-sync/src/
//! ├── core/          # 配置、状态、错误、后台任务
//! ├── reconcile/     # 对账引擎与调度器
//! ├── erp/           # ERP 提交
//! ├── store/         # 待处理记录端口 + 内存实现
//! ├── db/            # SQLite 实现
//! ├── audit/         # 审计日志
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 日志、时间
//! ```

pub mod api;
pub mod audit;
pub mod core;
pub mod db;
pub mod erp;
pub mod reconcile;
pub mod store;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 加载 .env、读取配置并初始化日志
pub fn setup_environment() -> anyhow::Result<Config> {
    dotenv::dotenv().ok();
    let config = Config::from_env();

    init_logger_with_file(
        &config.log_level,
        config.is_production(),
        Some(&config.log_dir()),
    )?;
    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
 _       ____  ________   _____
| |     / /  |/  / ___/  / ___/__  ______  _____
| | /| / / /|_/ /\__ \   \__ \/ / / / __ \/ ___/
| |/ |/ / /  / /___/ /  ___/ / /_/ / / / / /__
|__/|__/_/  /_//____/  /____/\__, /_/ /_/\___/
                            /____/
    "#
    );
}
