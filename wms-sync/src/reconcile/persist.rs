//! Persistence updater
//!
//! Stamps every member of a posted batch with the material document. Member
//! updates run concurrently and all of them run to completion; any failure
//! fails the whole update. [`MarkProgress`] remembers which members already
//! went through, so a retry only re-issues the ones still pending.

use futures::future::join_all;
use parking_lot::Mutex;
use shared::models::{ExternalDocument, PendingTransactionRecord, RecordKey};
use std::collections::HashSet;

use super::registry::ModuleAdapter;
use crate::store::{StoreError, StoreResult};

/// Members of one batch already marked processed
#[derive(Debug, Default)]
pub struct MarkProgress {
    done: Mutex<HashSet<RecordKey>>,
}

impl MarkProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of members marked so far
    pub fn marked(&self) -> usize {
        self.done.lock().len()
    }

    fn is_done(&self, key: &RecordKey) -> bool {
        self.done.lock().contains(key)
    }

    fn record(&self, key: RecordKey) {
        self.done.lock().insert(key);
    }
}

/// Mark the members of `records` not yet in `progress` processed under `document`
///
/// Returns how many were marked by this call.
pub async fn mark_batch(
    adapter: &dyn ModuleAdapter,
    records: &[PendingTransactionRecord],
    document: &ExternalDocument,
    processed_by: &str,
    progress: &MarkProgress,
) -> StoreResult<usize> {
    let mut keys = Vec::with_capacity(records.len());
    for record in records {
        let key = record.key().ok_or_else(|| {
            StoreError::InvalidData(format!(
                "{} record {} has no store key",
                record.module,
                record.identifier()
            ))
        })?;
        if !progress.is_done(&key) {
            keys.push(key);
        }
    }

    let updates = keys.into_iter().map(|key| async move {
        adapter.mark_processed(&key, document, processed_by).await?;
        progress.record(key);
        Ok::<_, StoreError>(())
    });

    let mut marked = 0;
    let mut first_error = None;
    for result in join_all(updates).await {
        match result {
            Ok(()) => marked += 1,
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(marked),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::registry::StoreModuleAdapter;
    use crate::store::{InMemoryPendingStore, PendingStore};
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use shared::models::{ModuleKind, RecordKey};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Fails the first update of `flaky`, then delegates
    struct FailsOnce {
        inner: StoreModuleAdapter,
        flaky: RecordKey,
        tripped: AtomicBool,
    }

    #[async_trait]
    impl ModuleAdapter for FailsOnce {
        async fn fetch_pending(&self) -> StoreResult<Vec<PendingTransactionRecord>> {
            self.inner.fetch_pending().await
        }

        async fn mark_processed(
            &self,
            key: &RecordKey,
            document: &ExternalDocument,
            processed_by: &str,
        ) -> StoreResult<()> {
            if *key == self.flaky && !self.tripped.swap(true, Ordering::SeqCst) {
                return Err(StoreError::Database("database is locked".into()));
            }
            self.inner.mark_processed(key, document, processed_by).await
        }
    }

    fn record(id: i64) -> PendingTransactionRecord {
        PendingTransactionRecord {
            log_id: Some(id),
            material: Some("4711".into()),
            batch: Some("B1".into()),
            quantity: Decimal::ONE,
            ..PendingTransactionRecord::new(ModuleKind::Quality)
        }
    }

    fn doc() -> ExternalDocument {
        ExternalDocument {
            number: "500012345".into(),
            year: "2024".into(),
        }
    }

    #[tokio::test]
    async fn test_every_member_gets_the_same_document() {
        let records = vec![record(1), record(2), record(3)];
        let store = Arc::new(InMemoryPendingStore::with_records(records.clone()));
        let adapter = StoreModuleAdapter::new(ModuleKind::Quality, store.clone());

        let progress = MarkProgress::new();
        let marked = mark_batch(&adapter, &records, &doc(), "wms", &progress)
            .await
            .unwrap();

        assert_eq!(marked, 3);
        assert_eq!(progress.marked(), 3);
        let calls = store.mark_calls();
        assert_eq!(calls.len(), 3);
        assert!(calls.iter().all(|c| c.document == doc() && c.processed_by == "wms"));
        let mut keys: Vec<_> = calls.into_iter().map(|c| c.key).collect();
        keys.sort_by_key(|k| k.to_string());
        assert_eq!(
            keys,
            vec![RecordKey::LogId(1), RecordKey::LogId(2), RecordKey::LogId(3)]
        );
        assert!(store.fetch_pending(ModuleKind::Quality).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_one_failing_member_fails_the_update() {
        let store = Arc::new(InMemoryPendingStore::with_records([record(1)]));
        let adapter = StoreModuleAdapter::new(ModuleKind::Quality, store);

        let progress = MarkProgress::new();
        let result = mark_batch(&adapter, &[record(1), record(2)], &doc(), "wms", &progress).await;
        assert!(matches!(result, Err(StoreError::NotPending { .. })));
    }

    #[tokio::test]
    async fn test_unkeyed_record_is_rejected() {
        let store = Arc::new(InMemoryPendingStore::new());
        let adapter = StoreModuleAdapter::new(ModuleKind::Quality, store);
        let mut unkeyed = record(1);
        unkeyed.log_id = None;

        let result = mark_batch(&adapter, &[unkeyed], &doc(), "wms", &MarkProgress::new()).await;
        assert!(matches!(result, Err(StoreError::InvalidData(_))));
    }

    #[tokio::test]
    async fn test_retry_only_marks_remaining_members() {
        let records = vec![record(1), record(2), record(3)];
        let store = Arc::new(InMemoryPendingStore::with_records(records.clone()));
        let adapter = FailsOnce {
            inner: StoreModuleAdapter::new(ModuleKind::Quality, store.clone()),
            flaky: RecordKey::LogId(2),
            tripped: AtomicBool::new(false),
        };
        let progress = MarkProgress::new();

        let first = mark_batch(&adapter, &records, &doc(), "wms", &progress).await;
        assert!(matches!(first, Err(StoreError::Database(_))));
        assert_eq!(progress.marked(), 2);

        let second = mark_batch(&adapter, &records, &doc(), "wms", &progress)
            .await
            .unwrap();
        assert_eq!(second, 1);
        assert_eq!(progress.marked(), 3);
        assert_eq!(store.mark_calls().len(), 3);
        assert_eq!(store.pending_count(ModuleKind::Quality), 0);
    }
}
