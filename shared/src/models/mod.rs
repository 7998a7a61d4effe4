//! Domain models shared between the reconciliation engine and its adapters

mod module;
mod pending;
mod result;

pub use module::{KeyShape, ModuleKind, ParseModuleError};
pub use pending::{PendingTransactionRecord, RecordKey};
pub use result::{ExternalDocument, ProcessingResult};
