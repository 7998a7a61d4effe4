//! Pending-transaction store port
//!
//! The store owns pending records; reconciliation only reads them and asks
//! for the `pending → processed` transition. Contract every implementation
//! must honour: once `mark_processed` returns `Ok`, the record never appears
//! in a later `fetch_pending` for the same module.

mod memory;

pub use memory::{InMemoryPendingStore, MarkCall};

use async_trait::async_trait;
use shared::models::{ExternalDocument, ModuleKind, PendingTransactionRecord, RecordKey};
use shared::{AppError, ErrorCode};
use thiserror::Error;

/// Store error types
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("{module} record {key} is not pending")]
    NotPending { module: ModuleKind, key: RecordKey },

    #[error("Invalid record data: {0}")]
    InvalidData(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err.to_string())
            }
            other => StoreError::Database(other.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        let code = match &err {
            StoreError::Database(_) => ErrorCode::DatabaseError,
            StoreError::Unavailable(_) => ErrorCode::StoreUnavailable,
            StoreError::NotPending { .. } => ErrorCode::RecordNotPending,
            StoreError::InvalidData(_) => ErrorCode::ValidationFailed,
        };
        AppError::with_message(code, err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Pending-transaction store, addressed per module
#[async_trait]
pub trait PendingStore: Send + Sync {
    /// Records of `module` still waiting to be posted
    async fn fetch_pending(&self, module: ModuleKind)
    -> StoreResult<Vec<PendingTransactionRecord>>;

    /// Transition one record to processed, stamping the ERP document
    async fn mark_processed(
        &self,
        module: ModuleKind,
        key: &RecordKey,
        document: &ExternalDocument,
        processed_by: &str,
    ) -> StoreResult<()>;
}
