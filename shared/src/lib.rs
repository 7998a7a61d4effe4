//! Shared types for the WMS sync workspace
//!
//! Domain records, module identifiers, ERP goods-movement wire types,
//! processing results and the unified error/response structures used by
//! every crate in the workspace.

pub mod erp;
pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use models::{
    ExternalDocument, KeyShape, ModuleKind, PendingTransactionRecord, ProcessingResult, RecordKey,
};
