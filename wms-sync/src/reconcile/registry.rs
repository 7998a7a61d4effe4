//! Module registry
//!
//! Ordered `ModuleKind → adapter` table. The pass walks it front to back.

use async_trait::async_trait;
use shared::models::{ExternalDocument, ModuleKind, PendingTransactionRecord, RecordKey};
use std::sync::Arc;

use crate::store::{PendingStore, StoreResult};

/// Per-module access to the pending-transaction store
#[async_trait]
pub trait ModuleAdapter: Send + Sync {
    async fn fetch_pending(&self) -> StoreResult<Vec<PendingTransactionRecord>>;

    async fn mark_processed(
        &self,
        key: &RecordKey,
        document: &ExternalDocument,
        processed_by: &str,
    ) -> StoreResult<()>;
}

/// Adapter that scopes a shared [`PendingStore`] to one module
pub struct StoreModuleAdapter {
    module: ModuleKind,
    store: Arc<dyn PendingStore>,
}

impl StoreModuleAdapter {
    pub fn new(module: ModuleKind, store: Arc<dyn PendingStore>) -> Self {
        Self { module, store }
    }
}

#[async_trait]
impl ModuleAdapter for StoreModuleAdapter {
    async fn fetch_pending(&self) -> StoreResult<Vec<PendingTransactionRecord>> {
        self.store.fetch_pending(self.module).await
    }

    async fn mark_processed(
        &self,
        key: &RecordKey,
        document: &ExternalDocument,
        processed_by: &str,
    ) -> StoreResult<()> {
        self.store
            .mark_processed(self.module, key, document, processed_by)
            .await
    }
}

#[derive(Clone)]
pub struct RegisteredModule {
    pub module: ModuleKind,
    pub adapter: Arc<dyn ModuleAdapter>,
}

#[derive(Clone, Default)]
pub struct ModuleRegistry {
    entries: Vec<RegisteredModule>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every [`ModuleKind`] in processing order, all backed by `store`
    pub fn standard(store: Arc<dyn PendingStore>) -> Self {
        let mut registry = Self::new();
        for module in ModuleKind::ALL {
            registry.register(
                module,
                Arc::new(StoreModuleAdapter::new(module, store.clone())),
            );
        }
        registry
    }

    /// Add a module at the end, or swap the adapter of an already registered one in place
    pub fn register(&mut self, module: ModuleKind, adapter: Arc<dyn ModuleAdapter>) -> &mut Self {
        match self.entries.iter_mut().find(|e| e.module == module) {
            Some(entry) => entry.adapter = adapter,
            None => self.entries.push(RegisteredModule { module, adapter }),
        }
        self
    }

    pub fn get(&self, module: ModuleKind) -> Option<&Arc<dyn ModuleAdapter>> {
        self.entries
            .iter()
            .find(|e| e.module == module)
            .map(|e| &e.adapter)
    }

    pub fn modules(&self) -> Vec<ModuleKind> {
        self.entries.iter().map(|e| e.module).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredModule> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
