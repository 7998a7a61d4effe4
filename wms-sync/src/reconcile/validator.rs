//! Record validation
//!
//! A record must carry material or serial, a batch, a positive quantity and
//! the key field its module is addressed by. Invalid records are skipped for
//! the pass and stay pending.

use rust_decimal::Decimal;
use shared::models::{KeyShape, PendingTransactionRecord};

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub valid: Vec<PendingTransactionRecord>,
    pub rejected: Vec<(PendingTransactionRecord, Vec<&'static str>)>,
}

fn blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).is_none_or(str::is_empty)
}

/// Names of the fields that make `record` unpostable, empty when valid
pub fn missing_fields(record: &PendingTransactionRecord) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if blank(&record.material) && blank(&record.serial) {
        missing.push("material/serial");
    }
    if blank(&record.batch) {
        missing.push("batch");
    }
    if record.quantity <= Decimal::ZERO {
        missing.push("quantity");
    }
    match record.module.key_shape() {
        KeyShape::Serial if blank(&record.serial) => missing.push("serial"),
        KeyShape::LogId if record.log_id.is_none() => missing.push("log_id"),
        _ => {}
    }
    missing
}

pub fn validate(records: Vec<PendingTransactionRecord>) -> ValidationReport {
    let mut report = ValidationReport::default();
    for record in records {
        let missing = missing_fields(&record);
        if missing.is_empty() {
            report.valid.push(record);
        } else {
            report.rejected.push((record, missing));
        }
    }
    report
}
