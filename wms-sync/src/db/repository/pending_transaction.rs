//! Pending Transaction Repository
//!
//! `pending_transaction.id` is the log id. Serial-keyed modules are matched
//! on trimmed `serial` + `batch`.

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::models::{ExternalDocument, ModuleKind, PendingTransactionRecord, RecordKey};
use sqlx::{FromRow, SqlitePool};
use std::str::FromStr;

use crate::store::{PendingStore, StoreError, StoreResult};

const STATUS_PENDING: &str = "pending";
const STATUS_PROCESSED: &str = "processed";

const SELECT_COLUMNS: &str = "id, module, serial, material, batch, movement_type, plant, storage_location, dest_storage_location, quantity, unit, unit_iso, order_number, stock_type, movement_indicator, gm_code, item_text, cost_center, user_name, retry_count";

#[derive(Debug, Clone, FromRow)]
struct PendingRow {
    id: i64,
    module: String,
    serial: Option<String>,
    material: Option<String>,
    batch: Option<String>,
    movement_type: Option<String>,
    plant: Option<String>,
    storage_location: Option<String>,
    dest_storage_location: Option<String>,
    quantity: String,
    unit: Option<String>,
    unit_iso: Option<String>,
    order_number: Option<String>,
    stock_type: Option<String>,
    movement_indicator: Option<String>,
    gm_code: Option<String>,
    item_text: Option<String>,
    cost_center: Option<String>,
    user_name: String,
    retry_count: i64,
}

impl TryFrom<PendingRow> for PendingTransactionRecord {
    type Error = StoreError;

    fn try_from(row: PendingRow) -> Result<Self, Self::Error> {
        let module = ModuleKind::from_str(&row.module)
            .map_err(|e| StoreError::InvalidData(format!("row {}: {e}", row.id)))?;
        let quantity = Decimal::from_str(row.quantity.trim()).map_err(|e| {
            StoreError::InvalidData(format!("row {}: bad quantity '{}': {e}", row.id, row.quantity))
        })?;

        Ok(Self {
            module,
            log_id: Some(row.id),
            serial: row.serial,
            material: row.material,
            batch: row.batch,
            movement_type: row.movement_type,
            plant: row.plant,
            storage_location: row.storage_location,
            dest_storage_location: row.dest_storage_location,
            quantity,
            unit: row.unit,
            unit_iso: row.unit_iso,
            order_number: row.order_number,
            stock_type: row.stock_type,
            movement_indicator: row.movement_indicator,
            gm_code: row.gm_code,
            item_text: row.item_text,
            cost_center: row.cost_center,
            user: row.user_name,
            retry_count: row.retry_count.max(0) as u32,
        })
    }
}

pub async fn find_pending(
    pool: &SqlitePool,
    module: ModuleKind,
) -> StoreResult<Vec<PendingTransactionRecord>> {
    let rows = sqlx::query_as::<_, PendingRow>(&format!(
        "SELECT {SELECT_COLUMNS} FROM pending_transaction WHERE module = ? AND status = ? ORDER BY id"
    ))
    .bind(module.as_str())
    .bind(STATUS_PENDING)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(PendingTransactionRecord::try_from).collect()
}

/// Insert a pending record, returns its log id
pub async fn insert(pool: &SqlitePool, record: &PendingTransactionRecord) -> StoreResult<i64> {
    let now = shared::util::now_millis();
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO pending_transaction (id, module, serial, material, batch, movement_type, plant, storage_location, dest_storage_location, quantity, unit, unit_iso, order_number, stock_type, movement_indicator, gm_code, item_text, cost_center, user_name, retry_count, status, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22) RETURNING id",
    )
    .bind(record.log_id)
    .bind(record.module.as_str())
    .bind(&record.serial)
    .bind(&record.material)
    .bind(&record.batch)
    .bind(&record.movement_type)
    .bind(&record.plant)
    .bind(&record.storage_location)
    .bind(&record.dest_storage_location)
    .bind(record.quantity.to_string())
    .bind(&record.unit)
    .bind(&record.unit_iso)
    .bind(&record.order_number)
    .bind(&record.stock_type)
    .bind(&record.movement_indicator)
    .bind(&record.gm_code)
    .bind(&record.item_text)
    .bind(&record.cost_center)
    .bind(&record.user)
    .bind(record.retry_count as i64)
    .bind(STATUS_PENDING)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

pub async fn mark_processed(
    pool: &SqlitePool,
    module: ModuleKind,
    key: &RecordKey,
    document: &ExternalDocument,
    processed_by: &str,
) -> StoreResult<()> {
    let now = shared::util::now_millis();
    let result = match key {
        RecordKey::Serial { serial, batch } => {
            sqlx::query(
                "UPDATE pending_transaction SET status = ?1, document_number = ?2, document_year = ?3, processed_by = ?4, processed_at = ?5 WHERE id = (SELECT id FROM pending_transaction WHERE module = ?6 AND status = ?7 AND TRIM(serial) = ?8 AND COALESCE(TRIM(batch), '') = ?9 ORDER BY id LIMIT 1)",
            )
            .bind(STATUS_PROCESSED)
            .bind(&document.number)
            .bind(&document.year)
            .bind(processed_by)
            .bind(now)
            .bind(module.as_str())
            .bind(STATUS_PENDING)
            .bind(serial)
            .bind(batch)
            .execute(pool)
            .await?
        }
        RecordKey::LogId(id) => {
            sqlx::query(
                "UPDATE pending_transaction SET status = ?1, document_number = ?2, document_year = ?3, processed_by = ?4, processed_at = ?5 WHERE id = ?6 AND module = ?7 AND status = ?8",
            )
            .bind(STATUS_PROCESSED)
            .bind(&document.number)
            .bind(&document.year)
            .bind(processed_by)
            .bind(now)
            .bind(id)
            .bind(module.as_str())
            .bind(STATUS_PENDING)
            .execute(pool)
            .await?
        }
    };

    if result.rows_affected() == 0 {
        return Err(StoreError::NotPending {
            module,
            key: key.clone(),
        });
    }
    Ok(())
}

/// Document stamped on a processed record, if any
pub async fn find_document(pool: &SqlitePool, id: i64) -> StoreResult<Option<ExternalDocument>> {
    let row = sqlx::query_as::<_, (Option<String>, Option<String>)>(
        "SELECT document_number, document_year FROM pending_transaction WHERE id = ? AND status = ?",
    )
    .bind(id)
    .bind(STATUS_PROCESSED)
    .fetch_optional(pool)
    .await?;

    Ok(row.and_then(|(number, year)| {
        number.map(|number| ExternalDocument {
            number,
            year: year.unwrap_or_default(),
        })
    }))
}

/// [`PendingStore`] backed by the local SQLite database
#[derive(Clone)]
pub struct SqlitePendingStore {
    pool: SqlitePool,
}

impl SqlitePendingStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl PendingStore for SqlitePendingStore {
    async fn fetch_pending(
        &self,
        module: ModuleKind,
    ) -> StoreResult<Vec<PendingTransactionRecord>> {
        find_pending(&self.pool, module).await
    }

    async fn mark_processed(
        &self,
        module: ModuleKind,
        key: &RecordKey,
        document: &ExternalDocument,
        processed_by: &str,
    ) -> StoreResult<()> {
        mark_processed(&self.pool, module, key, document, processed_by).await
    }
}
