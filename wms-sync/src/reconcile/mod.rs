//! WMS → ERP reconciliation
//!
//! ```text
//! Scheduler (startup / every 2h / manual, one pass at a time)
//!   └── ReconcileEngine::run_pass
//!         └── for each module in registry order
//!               ├── fetch (retry) ─▶ validate ─▶ group ─▶ batch (≤ 50)
//!               ├── submit batch (retry)
//!               │     ├── posted   ─▶ mark every member processed (concurrent, retry)
//!               │     └── failed   ─▶ fallback: resubmit members one by one
//!               └── ModuleStats
//!         └── PassStats ─▶ audit summary + StatsAggregator
//! ```

mod engine;
mod fallback;
pub mod grouping;
pub mod persist;
pub mod registry;
pub mod retry;
pub mod scheduler;
pub mod stats;
pub mod validator;

pub use engine::{EngineSettings, ReconcileEngine};
pub use grouping::{group_records, Batch, GroupKey, RecordGroup, MAX_BATCH_SIZE};
pub use registry::{ModuleAdapter, ModuleRegistry, RegisteredModule, StoreModuleAdapter};
pub use retry::{with_retry, RetryPolicy};
pub use scheduler::{RunOutcome, Scheduler, SchedulerStatus, TriggerError};
pub use stats::{
    parse_summaries, LogSummary, ModuleStats, ModuleTotals, PassStats, StatsAggregator,
    StatsSnapshot, Totals, TriggerSource,
};
pub use validator::{validate, ValidationReport};
