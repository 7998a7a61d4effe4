//! Reconciliation pass
//!
//! Modules run strictly in registry order, groups and batches one after the
//! other. A module that faults is logged and the pass moves on.

use chrono::Utc;
use futures::FutureExt;
use shared::models::{ExternalDocument, ModuleKind, PendingTransactionRecord, ProcessingResult};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::grouping::{group_records, Batch, MAX_BATCH_SIZE};
use super::persist::{self, MarkProgress};
use super::registry::{ModuleAdapter, ModuleRegistry, RegisteredModule};
use super::retry::{with_retry, RetryPolicy};
use super::stats::{ModuleStats, PassStats, TriggerSource};
use super::validator::validate;
use crate::audit::AuditLog;
use crate::core::tasks::panic_message;
use crate::erp::{ErpError, Submitter};

/// `processed_by` when a batch carries no user
const DEFAULT_PROCESSED_BY: &str = "wms-sync";

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub batch_size: usize,
    pub retry: RetryPolicy,
    /// Pause between single-record resubmissions
    pub fallback_pause: Duration,
    pub batch_pause: Duration,
    pub module_pause: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            batch_size: MAX_BATCH_SIZE,
            retry: RetryPolicy::default(),
            fallback_pause: Duration::from_millis(500),
            batch_pause: Duration::from_secs(1),
            module_pause: Duration::from_secs(2),
        }
    }
}

pub struct ReconcileEngine {
    registry: ModuleRegistry,
    submitter: Arc<Submitter>,
    audit: AuditLog,
    settings: EngineSettings,
}

pub(super) async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

impl ReconcileEngine {
    pub fn new(
        registry: ModuleRegistry,
        submitter: Arc<Submitter>,
        audit: AuditLog,
        settings: EngineSettings,
    ) -> Self {
        Self {
            registry,
            submitter,
            audit,
            settings,
        }
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// One full pass over every registered module
    pub async fn run_pass(&self, trigger: TriggerSource) -> PassStats {
        let started_at = Utc::now();
        let started = Instant::now();
        self.audit.info(format!(
            "Reconciliation pass started ({trigger}, {} modules)",
            self.registry.len()
        ));

        let mut modules = Vec::with_capacity(self.registry.len());
        for (i, entry) in self.registry.iter().enumerate() {
            if i > 0 {
                pause(self.settings.module_pause).await;
            }
            modules.push(self.run_module(entry).await);
        }

        let stats = PassStats::from_modules(trigger, started_at, elapsed_ms(started), modules);
        for line in stats.summary_lines() {
            self.audit.info(line);
        }
        stats
    }

    async fn run_module(&self, entry: &RegisteredModule) -> ModuleStats {
        let started = Instant::now();
        let module = entry.module;

        let outcome = AssertUnwindSafe(self.process_module(module, entry.adapter.as_ref()))
            .catch_unwind()
            .await;
        let mut stats = match outcome {
            Ok(stats) => stats,
            Err(panic) => {
                self.audit.error(format!(
                    "{module}: module aborted by unexpected fault: {}",
                    panic_message(panic.as_ref())
                ));
                ModuleStats {
                    aborted: true,
                    ..ModuleStats::new(module)
                }
            }
        };
        stats.duration_ms = elapsed_ms(started);
        stats
    }

    async fn process_module(&self, module: ModuleKind, adapter: &dyn ModuleAdapter) -> ModuleStats {
        let mut stats = ModuleStats::new(module);

        let records = self.fetch(module, adapter).await;
        stats.fetched = records.len() as u64;
        if records.is_empty() {
            tracing::debug!(module = %module, "No pending records");
            return stats;
        }

        let report = validate(records);
        for (record, missing) in &report.rejected {
            self.audit.warn(format!(
                "{module}: skipping record {} (missing {})",
                record.identifier(),
                missing.join(", ")
            ));
        }
        stats.skipped = report.rejected.len() as u64;

        let valid = report.valid.len();
        let groups = group_records(report.valid);
        self.audit.info(format!(
            "{module}: {} pending, {valid} valid in {} groups",
            stats.fetched,
            groups.len()
        ));

        let mut first = true;
        for group in &groups {
            for batch in group.batches(self.settings.batch_size.clamp(1, MAX_BATCH_SIZE)) {
                if !first {
                    pause(self.settings.batch_pause).await;
                }
                first = false;
                self.process_batch(module, adapter, &batch, &mut stats).await;
            }
        }
        stats
    }

    /// Pending records, sorted by log id when every record has one
    async fn fetch(
        &self,
        module: ModuleKind,
        adapter: &dyn ModuleAdapter,
    ) -> Vec<PendingTransactionRecord> {
        let label = format!("{module} fetch");
        match with_retry(&self.settings.retry, &label, || adapter.fetch_pending()).await {
            Ok(mut records) => {
                if records.iter().all(|r| r.log_id.is_some()) {
                    records.sort_by_key(|r| r.log_id);
                }
                records
            }
            Err(e) => {
                self.audit
                    .error(format!("{module}: fetching pending records failed: {e}"));
                Vec::new()
            }
        }
    }

    async fn process_batch(
        &self,
        module: ModuleKind,
        adapter: &dyn ModuleAdapter,
        batch: &Batch<'_>,
        stats: &mut ModuleStats,
    ) {
        let records = batch.records;
        let count = records.len() as u64;
        let label = format!(
            "{module} batch {}/{} [{}]",
            batch.index, batch.total, batch.key
        );

        let reason = match self.submit_with_retry(module, records, &label, stats).await {
            Ok(ProcessingResult {
                success: true,
                document: Some(document),
                ..
            }) => {
                self.audit.info(format!(
                    "{label}: {count} records posted as material document {document}"
                ));
                let marked = self.persist(module, adapter, records, &document).await as u64;
                stats.processed += marked;
                stats.failed += count - marked;
                return;
            }
            Ok(result) => result.message,
            Err(e) => e.to_string(),
        };

        self.audit.warn(format!(
            "{label} failed ({reason}), resubmitting {count} records individually"
        ));
        stats.fallback_batches += 1;
        self.resubmit_individually(module, adapter, records, stats).await;
    }

    /// Batch submission under the retry policy; every attempt counts as an ERP call
    pub(super) async fn submit_with_retry(
        &self,
        module: ModuleKind,
        records: &[PendingTransactionRecord],
        label: &str,
        stats: &mut ModuleStats,
    ) -> Result<ProcessingResult, ErpError> {
        let mut calls = 0u64;
        let result = with_retry(&self.settings.retry, label, || {
            calls += 1;
            self.submitter.submit_batch(module, records)
        })
        .await;
        stats.api_calls += calls;
        result
    }

    /// Stamp `records` with `document`; returns how many were marked
    ///
    /// Retries only re-issue members not yet marked. Unmarked members stay
    /// pending.
    pub(super) async fn persist(
        &self,
        module: ModuleKind,
        adapter: &dyn ModuleAdapter,
        records: &[PendingTransactionRecord],
        document: &ExternalDocument,
    ) -> usize {
        let processed_by = records
            .first()
            .map(|r| r.user.trim())
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_PROCESSED_BY);
        let label = format!("{module} mark processed ({document})");
        let progress = MarkProgress::new();

        let result = with_retry(&self.settings.retry, &label, || {
            persist::mark_batch(adapter, records, document, processed_by, &progress)
        })
        .await;

        let marked = progress.marked();
        if let Err(e) = result {
            self.audit.error(format!(
                "{module}: material document {document} was posted but only {marked} of {} records were marked processed: {e}; the remaining {} stay pending and will be posted again next pass (duplicate posting risk)",
                records.len(),
                records.len() - marked
            ));
        }
        marked
    }
}
