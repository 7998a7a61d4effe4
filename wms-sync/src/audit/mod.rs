//! 审计日志模块 - 对账过程的追加式审计追踪
//!
//! # 架构
//!
//! ```text
//! ReconcileEngine / Scheduler / API
//!   └─ AuditLog::info|warn|error()
//!        ├─ AuditSink::append()   (FileAuditSink → audit.log, MemoryAuditSink → tests)
//!        └─ tracing mirror        (stdout / rolling file)
//! ```
//!
//! Line format: `<ISO-8601 timestamp> [<LEVEL>] - <message>`.
//! Entries are only ever appended, never rewritten.

mod service;
mod sink;
mod types;

pub use service::AuditLog;
pub use sink::{AuditSink, FileAuditSink, MemoryAuditSink};
pub use types::{LogEntry, LogLevel, ParseEntryError};
