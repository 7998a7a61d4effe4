//! Repository Module
//!
//! SQL access to pending transactions.

pub mod pending_transaction;

pub use pending_transaction::SqlitePendingStore;
