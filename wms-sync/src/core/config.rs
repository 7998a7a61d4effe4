use shared::erp::ConnectionParams;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::reconcile::{EngineSettings, RetryPolicy, MAX_BATCH_SIZE};

/// 服务配置 - 对账服务的所有配置项
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/wms-sync | 工作目录 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 |
/// | DATABASE_PATH | {WORK_DIR}/wms-sync.db | SQLite 数据库 |
/// | AUDIT_LOG_PATH | {WORK_DIR}/logs/reconcile-audit.log | 对账审计日志 |
/// | ERP_URL | http://localhost:8000/goods-movement | ERP 中间件地址 |
/// | ERP_ASHOST / ERP_SYSNR / ERP_CLIENT / ERP_USER / ERP_PASSWORD / ERP_LANG | | ERP 连接参数 |
/// | SYNC_INTERVAL_SECS | 7200 | 定时对账间隔 |
/// | SYNC_STARTUP_DELAY_SECS | 30 | 启动后首次对账延迟 |
/// | SYNC_BATCH_SIZE | 50 | 单次提交最大条数 |
/// | SYNC_MAX_ATTEMPTS | 3 | 最大尝试次数 |
/// | SYNC_INITIAL_DELAY_MS | 5000 | 首次重试延迟 |
/// | SYNC_BACKOFF_MULTIPLIER | 1.5 | 退避倍数 |
/// | SYNC_FALLBACK_PAUSE_MS | 500 | 逐条回退提交间隔 |
/// | SYNC_BATCH_PAUSE_MS | 1000 | 批次间隔 |
/// | SYNC_MODULE_PAUSE_MS | 2000 | 模块间隔 |
/// | ERP_BULK_TIMEOUT_SECS | 120 | 批量提交超时 |
/// | ERP_SINGLE_TIMEOUT_SECS | 60 | 单条提交超时 |
///
/// 无法解析的值回退到默认值。
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/wms HTTP_PORT=8080 ERP_URL=http://erp-gw/goods-movement cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    pub log_level: String,
    pub database_path: String,
    pub audit_log_path: String,
    pub erp: ErpConfig,
    pub sync: SyncConfig,
}

/// ERP 连接配置
#[derive(Debug, Clone)]
pub struct ErpConfig {
    pub url: String,
    pub connection: ConnectionParams,
    pub bulk_timeout: Duration,
    pub single_timeout: Duration,
}

/// 对账调度配置
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub interval: Duration,
    pub startup_delay: Duration,
    pub batch_size: usize,
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub backoff_multiplier: f64,
    pub fallback_pause: Duration,
    pub batch_pause: Duration,
    pub module_pause: Duration,
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn string_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl Config {
    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源加载配置（测试用 HashMap）
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let work_dir = string_or(&lookup, "WORK_DIR", "/var/lib/wms-sync");
        let database_path = lookup("DATABASE_PATH")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| format!("{work_dir}/wms-sync.db"));
        let audit_log_path = lookup("AUDIT_LOG_PATH")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| format!("{work_dir}/logs/reconcile-audit.log"));

        let erp = ErpConfig {
            url: string_or(&lookup, "ERP_URL", "http://localhost:8000/goods-movement"),
            connection: ConnectionParams {
                ashost: string_or(&lookup, "ERP_ASHOST", ""),
                sysnr: string_or(&lookup, "ERP_SYSNR", "00"),
                client: string_or(&lookup, "ERP_CLIENT", "100"),
                user: string_or(&lookup, "ERP_USER", ""),
                passwd: lookup("ERP_PASSWORD").unwrap_or_default(),
                lang: string_or(&lookup, "ERP_LANG", "EN"),
            },
            bulk_timeout: Duration::from_secs(parse_or(&lookup, "ERP_BULK_TIMEOUT_SECS", 120)),
            single_timeout: Duration::from_secs(parse_or(&lookup, "ERP_SINGLE_TIMEOUT_SECS", 60)),
        };

        let multiplier: f64 = parse_or(&lookup, "SYNC_BACKOFF_MULTIPLIER", 1.5);
        let sync = SyncConfig {
            interval: Duration::from_secs(parse_or(&lookup, "SYNC_INTERVAL_SECS", 7200)),
            startup_delay: Duration::from_secs(parse_or(&lookup, "SYNC_STARTUP_DELAY_SECS", 30)),
            batch_size: parse_or(&lookup, "SYNC_BATCH_SIZE", MAX_BATCH_SIZE)
                .clamp(1, MAX_BATCH_SIZE),
            max_attempts: parse_or(&lookup, "SYNC_MAX_ATTEMPTS", 3u32).max(1),
            initial_delay: Duration::from_millis(parse_or(&lookup, "SYNC_INITIAL_DELAY_MS", 5000)),
            backoff_multiplier: if multiplier.is_finite() && multiplier >= 1.0 {
                multiplier
            } else {
                1.5
            },
            fallback_pause: Duration::from_millis(parse_or(&lookup, "SYNC_FALLBACK_PAUSE_MS", 500)),
            batch_pause: Duration::from_millis(parse_or(&lookup, "SYNC_BATCH_PAUSE_MS", 1000)),
            module_pause: Duration::from_millis(parse_or(&lookup, "SYNC_MODULE_PAUSE_MS", 2000)),
        };

        Self {
            http_port: parse_or(&lookup, "HTTP_PORT", 3000),
            environment: string_or(&lookup, "ENVIRONMENT", "development"),
            log_level: string_or(&lookup, "LOG_LEVEL", "info"),
            work_dir,
            database_path,
            audit_log_path,
            erp,
            sync,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.sync.max_attempts,
            self.sync.initial_delay,
            self.sync.backoff_multiplier,
        )
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            batch_size: self.sync.batch_size,
            retry: self.retry_policy(),
            fallback_pause: self.sync.fallback_pause,
            batch_pause: self.sync.batch_pause,
            module_pause: self.sync.module_pause,
        }
    }

    /// 滚动日志目录
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
