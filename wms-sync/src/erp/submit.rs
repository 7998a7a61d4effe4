//! Batch and single-record submission

use shared::erp::{ConnectionParams, GoodsMovementResponse};
use shared::models::{ExternalDocument, ModuleKind, PendingTransactionRecord, ProcessingResult};
use std::sync::Arc;
use std::time::Duration;

use super::client::{ErpClient, ErpError};
use super::request::build_request;
use crate::utils::time::erp_today;

/// Submits goods movements and turns ERP answers into [`ProcessingResult`]s
pub struct Submitter {
    client: Arc<dyn ErpClient>,
    connection: ConnectionParams,
    bulk_timeout: Duration,
    single_timeout: Duration,
}

impl Submitter {
    pub fn new(
        client: Arc<dyn ErpClient>,
        connection: ConnectionParams,
        bulk_timeout: Duration,
        single_timeout: Duration,
    ) -> Self {
        Self {
            client,
            connection,
            bulk_timeout,
            single_timeout,
        }
    }

    /// Reconciliation path: one request for the batch, bulk timeout
    pub async fn submit_batch(
        &self,
        module: ModuleKind,
        records: &[PendingTransactionRecord],
    ) -> Result<ProcessingResult, ErpError> {
        self.submit(module, records, self.bulk_timeout).await
    }

    /// Interactive path: one record, shorter timeout
    pub async fn submit_single(
        &self,
        record: &PendingTransactionRecord,
    ) -> Result<ProcessingResult, ErpError> {
        self.submit(record.module, std::slice::from_ref(record), self.single_timeout)
            .await
    }

    async fn submit(
        &self,
        module: ModuleKind,
        records: &[PendingTransactionRecord],
        timeout: Duration,
    ) -> Result<ProcessingResult, ErpError> {
        if records.is_empty() {
            return Ok(ProcessingResult::rejected("Nothing to submit"));
        }

        let request = build_request(module, records, &self.connection, &erp_today());
        tracing::debug!(
            module = %module,
            items = request.items.len(),
            gm_code = %request.code.gm_code,
            "Posting goods movement"
        );

        let response = self.client.post_goods_movement(&request, timeout).await?;
        Ok(Self::interpret(&response, records.len()))
    }

    /// Error-class return message wins, then a missing document number
    pub fn interpret(response: &GoodsMovementResponse, count: usize) -> ProcessingResult {
        if let Some(error) = response.business_error() {
            return ProcessingResult::rejected(format!(
                "ERP rejected posting [{}]: {}",
                error.kind.trim(),
                error.message.trim()
            ));
        }

        match response.material_document() {
            Some(number) => ProcessingResult::posted(
                ExternalDocument {
                    number: number.to_string(),
                    year: response.year(),
                },
                count,
            ),
            None => ProcessingResult::rejected("ERP returned no material document"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use rust_decimal::Decimal;
    use shared::erp::{GoodsMovementHeadRet, GoodsMovementRequest, ReturnMessage};

    struct Recording {
        response: GoodsMovementResponse,
        seen: Mutex<Vec<(usize, Duration)>>,
    }

    #[async_trait]
    impl ErpClient for Recording {
        async fn post_goods_movement(
            &self,
            request: &GoodsMovementRequest,
            timeout: Duration,
        ) -> Result<GoodsMovementResponse, ErpError> {
            self.seen.lock().push((request.items.len(), timeout));
            Ok(self.response.clone())
        }
    }

    fn posted(doc: &str) -> GoodsMovementResponse {
        GoodsMovementResponse {
            messages: Vec::new(),
            head: Some(GoodsMovementHeadRet {
                mat_doc: Some(doc.into()),
            }),
            document_year: Some(serde_json::json!(2024)),
        }
    }

    fn record(id: i64) -> PendingTransactionRecord {
        PendingTransactionRecord {
            log_id: Some(id),
            material: Some("4711".into()),
            batch: Some("B1".into()),
            quantity: Decimal::ONE,
            ..PendingTransactionRecord::new(ModuleKind::Quality)
        }
    }

    fn submitter(client: Arc<Recording>) -> Submitter {
        Submitter::new(
            client,
            ConnectionParams::default(),
            Duration::from_secs(120),
            Duration::from_secs(60),
        )
    }

    #[test]
    fn test_interpret_business_error_wins_over_document() {
        let mut response = posted("500012345");
        response.messages.push(ReturnMessage {
            kind: "A".into(),
            message: "Posting period closed".into(),
        });
        let result = Submitter::interpret(&response, 3);
        assert!(!result.success);
        assert!(result.message.contains("Posting period closed"));
        assert_eq!(result.processed_count, 0);
    }

    #[test]
    fn test_interpret_blank_document_is_failure() {
        let result = Submitter::interpret(&posted("   "), 2);
        assert!(!result.success);
        assert!(result.document.is_none());
    }

    #[test]
    fn test_interpret_success() {
        let mut response = posted("500012345");
        response.messages.push(ReturnMessage {
            kind: "S".into(),
            message: "Document posted".into(),
        });
        let result = Submitter::interpret(&response, 4);
        assert!(result.success);
        assert_eq!(result.processed_count, 4);
        let doc = result.document.unwrap();
        assert_eq!(doc.number, "500012345");
        assert_eq!(doc.year, "2024");
    }

    #[tokio::test]
    async fn test_batch_and_single_use_their_timeouts() {
        let client = Arc::new(Recording {
            response: posted("1"),
            seen: Mutex::new(Vec::new()),
        });
        let submitter = submitter(client.clone());

        submitter
            .submit_batch(ModuleKind::Quality, &[record(1), record(2)])
            .await
            .unwrap();
        submitter.submit_single(&record(3)).await.unwrap();

        let seen = client.seen.lock().clone();
        assert_eq!(
            seen,
            vec![(2, Duration::from_secs(120)), (1, Duration::from_secs(60))]
        );
    }

    #[tokio::test]
    async fn test_empty_batch_is_not_sent() {
        let client = Arc::new(Recording {
            response: posted("1"),
            seen: Mutex::new(Vec::new()),
        });
        let result = submitter(client.clone())
            .submit_batch(ModuleKind::Quality, &[])
            .await
            .unwrap();
        assert!(!result.success);
        assert!(client.seen.lock().is_empty());
    }
}
