//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            Self::RecordNotPending => StatusCode::CONFLICT,

            Self::ValidationFailed => StatusCode::BAD_REQUEST,

            Self::ErpUnavailable | Self::ErpInvalidResponse => StatusCode::BAD_GATEWAY,
            Self::ErpTimeout => StatusCode::GATEWAY_TIMEOUT,

            Self::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,

            Self::Unknown | Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
