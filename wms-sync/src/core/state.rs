use sqlx::SqlitePool;
use std::path::Path;
use std::sync::Arc;

use crate::audit::{AuditLog, FileAuditSink};
use crate::core::Config;
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::db::{DbService, SqlitePendingStore};
use crate::erp::{ErpClient, HttpErpClient, Submitter};
use crate::reconcile::{ModuleRegistry, ReconcileEngine, Scheduler, StatsAggregator};
use crate::store::PendingStore;
use shared::AppError;

/// 服务状态 - 持有所有组件的引用
///
/// 克隆成本低（字段均为 `Arc` 或可廉价克隆），可直接作为 axum state。
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 服务配置 |
/// | audit | 对账审计日志 |
/// | engine | 对账引擎（模块注册表 + 提交 + 回退 + 持久化） |
/// | scheduler | 调度器（启动 / 定时 / 手动触发，单槽防重入） |
/// | stats | 统计聚合 |
/// | submitter | ERP 提交客户端（交互式单条提交也使用它） |
/// | pool | SQLite 连接池（使用内存 store 时为 None） |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub audit: AuditLog,
    pub engine: Arc<ReconcileEngine>,
    pub scheduler: Arc<Scheduler>,
    pub stats: Arc<StatsAggregator>,
    pub submitter: Arc<Submitter>,
    pub pool: Option<SqlitePool>,
}

impl ServerState {
    /// 由已创建的组件组装状态
    pub fn new(
        config: Config,
        store: Arc<dyn PendingStore>,
        erp: Arc<dyn ErpClient>,
        audit: AuditLog,
    ) -> Self {
        let submitter = Arc::new(Submitter::new(
            erp,
            config.erp.connection.clone(),
            config.erp.bulk_timeout,
            config.erp.single_timeout,
        ));
        let engine = Arc::new(ReconcileEngine::new(
            ModuleRegistry::standard(store),
            submitter.clone(),
            audit.clone(),
            config.engine_settings(),
        ));
        let stats = Arc::new(StatsAggregator::default());
        let scheduler = Arc::new(Scheduler::new(
            engine.clone(),
            stats.clone(),
            audit.clone(),
            config.sync.interval,
            config.sync.startup_delay,
        ));

        Self {
            config,
            audit,
            engine,
            scheduler,
            stats,
            submitter,
            pool: None,
        }
    }

    /// 初始化服务状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录
    /// 2. 审计日志文件（引擎启动前必须可写）
    /// 3. 数据库 (DATABASE_PATH)
    /// 4. ERP 客户端、引擎、调度器
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        std::fs::create_dir_all(&config.work_dir).map_err(|e| {
            AppError::config(format!("Failed to create work dir {}: {e}", config.work_dir))
        })?;

        let sink = FileAuditSink::open(Path::new(&config.audit_log_path)).map_err(|e| {
            AppError::config(format!(
                "Failed to open audit log {}: {e}",
                config.audit_log_path
            ))
        })?;
        let audit = AuditLog::new(Arc::new(sink));

        let db = DbService::new(&config.database_path).await?;
        let store = Arc::new(SqlitePendingStore::new(db.pool.clone()));
        let erp = Arc::new(HttpErpClient::new(config.erp.url.clone())?);

        tracing::info!(
            erp_url = %config.erp.url,
            audit_log = %config.audit_log_path,
            "Reconciliation components initialized"
        );

        let mut state = Self::new(config.clone(), store, erp, audit);
        state.pool = Some(db.pool);
        Ok(state)
    }

    /// 启动后台任务
    ///
    /// - 对账调度器 (startup + interval)
    pub fn start_background_tasks(&self, tasks: &mut BackgroundTasks) {
        let shutdown = tasks.shutdown_token();
        tasks.spawn(
            "reconcile_scheduler",
            TaskKind::Periodic,
            self.scheduler.clone().run(shutdown),
        );
    }
}
