//! In-memory pending-transaction store (tests and local runs)

use async_trait::async_trait;
use parking_lot::Mutex;
use shared::models::{ExternalDocument, ModuleKind, PendingTransactionRecord, RecordKey};

use super::{PendingStore, StoreError, StoreResult};

/// One successful `mark_processed` call, kept for inspection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkCall {
    pub module: ModuleKind,
    pub key: RecordKey,
    pub document: ExternalDocument,
    pub processed_by: String,
}

#[derive(Debug)]
struct Slot {
    record: PendingTransactionRecord,
    processed: bool,
}

#[derive(Debug, Default)]
pub struct InMemoryPendingStore {
    slots: Mutex<Vec<Slot>>,
    calls: Mutex<Vec<MarkCall>>,
}

impl InMemoryPendingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = PendingTransactionRecord>) -> Self {
        let store = Self::new();
        for record in records {
            store.insert(record);
        }
        store
    }

    pub fn insert(&self, record: PendingTransactionRecord) {
        self.slots.lock().push(Slot {
            record,
            processed: false,
        });
    }

    pub fn pending_count(&self, module: ModuleKind) -> usize {
        self.slots
            .lock()
            .iter()
            .filter(|s| s.record.module == module && !s.processed)
            .count()
    }

    /// Every successful `mark_processed` call, in completion order
    pub fn mark_calls(&self) -> Vec<MarkCall> {
        self.calls.lock().clone()
    }
}

fn matches_key(record: &PendingTransactionRecord, key: &RecordKey) -> bool {
    match key {
        RecordKey::Serial { serial, batch } => {
            record.serial.as_deref().map(str::trim) == Some(serial.as_str())
                && record.batch.as_deref().map(str::trim).unwrap_or_default() == batch
        }
        RecordKey::LogId(id) => record.log_id == Some(*id),
    }
}

#[async_trait]
impl PendingStore for InMemoryPendingStore {
    async fn fetch_pending(
        &self,
        module: ModuleKind,
    ) -> StoreResult<Vec<PendingTransactionRecord>> {
        Ok(self
            .slots
            .lock()
            .iter()
            .filter(|s| s.record.module == module && !s.processed)
            .map(|s| s.record.clone())
            .collect())
    }

    async fn mark_processed(
        &self,
        module: ModuleKind,
        key: &RecordKey,
        document: &ExternalDocument,
        processed_by: &str,
    ) -> StoreResult<()> {
        let mut slots = self.slots.lock();
        let slot = slots
            .iter_mut()
            .find(|s| s.record.module == module && !s.processed && matches_key(&s.record, key))
            .ok_or_else(|| StoreError::NotPending {
                module,
                key: key.clone(),
            })?;
        slot.processed = true;
        drop(slots);

        self.calls.lock().push(MarkCall {
            module,
            key: key.clone(),
            document: document.clone(),
            processed_by: processed_by.to_string(),
        });
        Ok(())
    }
}
