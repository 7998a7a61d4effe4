//! Fallback degradation
//!
//! A batch the ERP would not post is replayed one record at a time, so one
//! bad record no longer blocks its neighbours.

use shared::models::{ModuleKind, PendingTransactionRecord, ProcessingResult};

use super::engine::{pause, ReconcileEngine};
use super::registry::ModuleAdapter;
use super::stats::ModuleStats;

impl ReconcileEngine {
    /// Resubmit every member alone, in order; each outcome is counted and logged
    pub(super) async fn resubmit_individually(
        &self,
        module: ModuleKind,
        adapter: &dyn ModuleAdapter,
        records: &[PendingTransactionRecord],
        stats: &mut ModuleStats,
    ) {
        let mut posted = 0usize;

        for (i, record) in records.iter().enumerate() {
            if i > 0 {
                pause(self.settings().fallback_pause).await;
            }

            let single = std::slice::from_ref(record);
            let label = format!("{module} record {}", record.identifier());

            match self.submit_with_retry(module, single, &label, stats).await {
                Ok(ProcessingResult {
                    success: true,
                    document: Some(document),
                    ..
                }) => {
                    self.audit()
                        .info(format!("{label} posted as material document {document}"));
                    if self.persist(module, adapter, single, &document).await == 1 {
                        stats.processed += 1;
                        posted += 1;
                    } else {
                        stats.failed += 1;
                    }
                }
                Ok(result) => {
                    self.audit().error(format!("{label} failed: {}", result.message));
                    stats.failed += 1;
                }
                Err(e) => {
                    self.audit().error(format!("{label} failed: {e}"));
                    stats.failed += 1;
                }
            }
        }

        self.audit().info(format!(
            "{module}: fallback finished, {posted}/{} records posted",
            records.len()
        ));
    }
}
