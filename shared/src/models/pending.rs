//! Pending transaction records

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::module::{KeyShape, ModuleKind};

/// A warehouse stock movement that failed to post to the ERP
///
/// Owned by the pending-transaction store. The reconciliation engine never
/// creates or deletes these, it only asks the store to mark them processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingTransactionRecord {
    pub module: ModuleKind,
    /// Numeric log identifier (LogId-keyed modules)
    #[serde(default)]
    pub log_id: Option<i64>,
    /// Pallet / serial identifier (Serial-keyed modules)
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub batch: Option<String>,
    #[serde(default)]
    pub movement_type: Option<String>,
    #[serde(default)]
    pub plant: Option<String>,
    #[serde(default)]
    pub storage_location: Option<String>,
    /// Destination storage location (transfers only)
    #[serde(default)]
    pub dest_storage_location: Option<String>,
    pub quantity: Decimal,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub unit_iso: Option<String>,
    /// Production / reference order number
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default)]
    pub stock_type: Option<String>,
    #[serde(default)]
    pub movement_indicator: Option<String>,
    /// Per-record override of the module's `GM_CODE`
    #[serde(default)]
    pub gm_code: Option<String>,
    #[serde(default)]
    pub item_text: Option<String>,
    #[serde(default)]
    pub cost_center: Option<String>,
    /// Submitting user
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub retry_count: u32,
}

impl PendingTransactionRecord {
    /// Empty record for `module`, every optional field unset
    pub fn new(module: ModuleKind) -> Self {
        Self {
            module,
            log_id: None,
            serial: None,
            material: None,
            batch: None,
            movement_type: None,
            plant: None,
            storage_location: None,
            dest_storage_location: None,
            quantity: Decimal::ZERO,
            unit: None,
            unit_iso: None,
            order_number: None,
            stock_type: None,
            movement_indicator: None,
            gm_code: None,
            item_text: None,
            cost_center: None,
            user: String::new(),
            retry_count: 0,
        }
    }

    /// Store key for this record, according to the module's key shape
    ///
    /// `None` when the field the shape needs is missing.
    pub fn key(&self) -> Option<RecordKey> {
        match self.module.key_shape() {
            KeyShape::Serial => {
                let serial = non_empty(&self.serial)?;
                Some(RecordKey::Serial {
                    serial: serial.to_string(),
                    batch: non_empty(&self.batch).unwrap_or_default().to_string(),
                })
            }
            KeyShape::LogId => self.log_id.map(RecordKey::LogId),
        }
    }

    /// Human readable business identifier (serial, else log id)
    pub fn identifier(&self) -> String {
        match (non_empty(&self.serial), self.log_id) {
            (Some(serial), _) => serial.to_string(),
            (None, Some(id)) => id.to_string(),
            (None, None) => "<unkeyed>".to_string(),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Key used by the store to mark a record processed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordKey {
    Serial { serial: String, batch: String },
    LogId(i64),
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKey::Serial { serial, batch } => write!(f, "{serial}/{batch}"),
            RecordKey::LogId(id) => write!(f, "log:{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_key_for_goods_receipt() {
        let record = PendingTransactionRecord {
            serial: Some("PAL0001".into()),
            batch: Some("B1".into()),
            log_id: Some(7),
            ..PendingTransactionRecord::new(ModuleKind::GoodsReceipt)
        };
        assert_eq!(
            record.key(),
            Some(RecordKey::Serial {
                serial: "PAL0001".into(),
                batch: "B1".into()
            })
        );
    }

    #[test]
    fn test_log_id_key_for_quality() {
        let record = PendingTransactionRecord {
            serial: Some("PAL0001".into()),
            log_id: Some(42),
            ..PendingTransactionRecord::new(ModuleKind::Quality)
        };
        assert_eq!(record.key(), Some(RecordKey::LogId(42)));
    }

    #[test]
    fn test_missing_key_field() {
        let record = PendingTransactionRecord {
            serial: Some("   ".into()),
            ..PendingTransactionRecord::new(ModuleKind::InboundScan)
        };
        assert_eq!(record.key(), None);
        assert_eq!(record.identifier(), "<unkeyed>");
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let json = r#"{"module":"Picking","log_id":9,"quantity":2.5}"#;
        let record: PendingTransactionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.module, ModuleKind::Picking);
        assert_eq!(record.log_id, Some(9));
        assert_eq!(record.quantity, Decimal::new(25, 1));
        assert!(record.material.is_none());
    }
}
