#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use shared::erp::{
    ConnectionParams, GoodsMovementHeadRet, GoodsMovementRequest, GoodsMovementResponse,
    ReturnMessage,
};
use shared::models::{ModuleKind, PendingTransactionRecord};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use wms_sync::audit::{AuditLog, LogLevel, MemoryAuditSink};
use wms_sync::erp::{ErpClient, ErpError, Submitter};
use wms_sync::reconcile::{EngineSettings, ModuleRegistry, ReconcileEngine, RetryPolicy};
use wms_sync::store::PendingStore;

pub type Reply = Result<GoodsMovementResponse, ErpError>;

/// ERP double: replies from a script, then `default` forever
pub struct ScriptedErp {
    script: Mutex<VecDeque<Reply>>,
    default: fn() -> Reply,
    requests: Mutex<Vec<GoodsMovementRequest>>,
}

impl ScriptedErp {
    pub fn new(script: Vec<Reply>, default: fn() -> Reply) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            default,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<GoodsMovementRequest> {
        self.requests.lock().clone()
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.requests.lock().iter().map(|r| r.items.len()).collect()
    }
}

#[async_trait]
impl ErpClient for ScriptedErp {
    async fn post_goods_movement(
        &self,
        request: &GoodsMovementRequest,
        _timeout: Duration,
    ) -> Result<GoodsMovementResponse, ErpError> {
        self.requests.lock().push(request.clone());
        let next = self.script.lock().pop_front();
        next.unwrap_or_else(self.default)
    }
}

pub fn posted(doc: &str, year: &str) -> Reply {
    Ok(GoodsMovementResponse {
        messages: Vec::new(),
        head: Some(GoodsMovementHeadRet {
            mat_doc: Some(doc.into()),
        }),
        document_year: Some(serde_json::Value::String(year.into())),
    })
}

pub fn rejected(kind: &str, message: &str) -> Reply {
    Ok(GoodsMovementResponse {
        messages: vec![ReturnMessage {
            kind: kind.into(),
            message: message.into(),
        }],
        ..Default::default()
    })
}

pub fn always_posted() -> Reply {
    posted("4900000000", "2024")
}

pub fn always_batch_not_found() -> Reply {
    rejected("E", "Batch not found")
}

pub fn always_down() -> Reply {
    Err(ErpError::Transport("connection refused".into()))
}

pub fn quality(log_id: i64, material: &str, batch: &str) -> PendingTransactionRecord {
    PendingTransactionRecord {
        log_id: Some(log_id),
        material: Some(material.into()),
        batch: Some(batch.into()),
        movement_type: Some("350".into()),
        plant: Some("1000".into()),
        storage_location: Some("5110".into()),
        quantity: Decimal::new(10, 0),
        unit: Some("KG".into()),
        unit_iso: Some("KGM".into()),
        user: "qa-user".into(),
        ..PendingTransactionRecord::new(ModuleKind::Quality)
    }
}

pub fn receipt(serial: &str, material: &str, batch: &str) -> PendingTransactionRecord {
    PendingTransactionRecord {
        serial: Some(serial.into()),
        material: Some(material.into()),
        batch: Some(batch.into()),
        movement_type: Some("101".into()),
        plant: Some("1000".into()),
        storage_location: Some("0001".into()),
        quantity: Decimal::new(1, 0),
        unit: Some("PAL".into()),
        order_number: Some("1000123".into()),
        user: "gate-user".into(),
        ..PendingTransactionRecord::new(ModuleKind::GoodsReceipt)
    }
}

/// No pauses, three attempts without backoff
pub fn fast_settings() -> EngineSettings {
    EngineSettings {
        retry: RetryPolicy::new(3, Duration::ZERO, 1.5),
        fallback_pause: Duration::ZERO,
        batch_pause: Duration::ZERO,
        module_pause: Duration::ZERO,
        ..EngineSettings::default()
    }
}

pub fn submitter(erp: Arc<dyn ErpClient>) -> Arc<Submitter> {
    Arc::new(Submitter::new(
        erp,
        ConnectionParams::default(),
        Duration::from_secs(120),
        Duration::from_secs(60),
    ))
}

pub fn engine(
    store: Arc<dyn PendingStore>,
    erp: Arc<dyn ErpClient>,
    sink: Arc<MemoryAuditSink>,
) -> ReconcileEngine {
    ReconcileEngine::new(
        ModuleRegistry::standard(store),
        submitter(erp),
        AuditLog::new(sink),
        fast_settings(),
    )
}

pub fn count_level(sink: &MemoryAuditSink, level: LogLevel) -> usize {
    sink.entries().iter().filter(|e| e.level == level).count()
}
