//! 审计日志服务
//!
//! `AuditLog` 是注入到每个组件的日志端口：写入 sink，同时镜像到 tracing。

use std::sync::Arc;

use super::sink::AuditSink;
use super::types::{LogEntry, LogLevel};

/// Leveled, append-only audit trail
///
/// Cheap to clone; all clones share one sink.
#[derive(Clone)]
pub struct AuditLog {
    sink: Arc<dyn AuditSink>,
}

impl std::fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLog").finish_non_exhaustive()
    }
}

impl AuditLog {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    /// Append an entry
    ///
    /// A failing sink never interrupts reconciliation; the failure is
    /// reported through tracing instead.
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        let entry = LogEntry::new(level, message);

        match level {
            LogLevel::Info => tracing::info!("{}", entry.message),
            LogLevel::Warn => tracing::warn!("{}", entry.message),
            LogLevel::Error => tracing::error!("{}", entry.message),
        }

        if let Err(e) = self.sink.append(&entry) {
            tracing::error!(error = %e, "Failed to write audit entry");
        }
    }

    /// Last `n` audit lines, oldest first
    pub fn tail(&self, n: usize) -> std::io::Result<Vec<String>> {
        self.sink.tail(n)
    }
}
