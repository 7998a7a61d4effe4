//! ERP middleware client

use async_trait::async_trait;
use reqwest::Client;
use shared::erp::{GoodsMovementRequest, GoodsMovementResponse};
use shared::{AppError, ErrorCode};
use std::time::Duration;
use thiserror::Error;

/// ERP call fault, the only error class the retry policy retries
#[derive(Debug, Error)]
pub enum ErpError {
    #[error("ERP request failed: {0}")]
    Transport(String),

    #[error("ERP call timed out after {0:?}")]
    Timeout(Duration),

    #[error("ERP middleware returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse ERP response: {0}")]
    Decode(String),
}

impl From<ErpError> for AppError {
    fn from(err: ErpError) -> Self {
        let code = match &err {
            ErpError::Transport(_) | ErpError::Status { .. } => ErrorCode::ErpUnavailable,
            ErpError::Timeout(_) => ErrorCode::ErpTimeout,
            ErpError::Decode(_) => ErrorCode::ErpInvalidResponse,
        };
        AppError::with_message(code, err.to_string())
    }
}

/// Bulk goods-movement posting endpoint
#[async_trait]
pub trait ErpClient: Send + Sync {
    async fn post_goods_movement(
        &self,
        request: &GoodsMovementRequest,
        timeout: Duration,
    ) -> Result<GoodsMovementResponse, ErpError>;
}

/// JSON-over-HTTP client for the ERP middleware
pub struct HttpErpClient {
    client: Client,
    url: String,
}

impl HttpErpClient {
    /// `url` is the full posting endpoint
    pub fn new(url: impl Into<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ErpClient for HttpErpClient {
    async fn post_goods_movement(
        &self,
        request: &GoodsMovementRequest,
        timeout: Duration,
    ) -> Result<GoodsMovementResponse, ErpError> {
        let response = self
            .client
            .post(&self.url)
            .timeout(timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ErpError::Timeout(timeout)
                } else {
                    ErpError::Transport(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ErpError::Status { status, body });
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                ErpError::Timeout(timeout)
            } else {
                ErpError::Transport(e.to_string())
            }
        })?;

        serde_json::from_str(&body).map_err(|e| ErpError::Decode(e.to_string()))
    }
}
