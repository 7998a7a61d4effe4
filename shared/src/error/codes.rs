//! Unified error codes
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 2xxx: ERP errors
//! - 3xxx: Store errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Serialized as a plain `u16` so API consumers can switch on it directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,

    // ==================== 2xxx: ERP ====================
    /// ERP middleware unreachable or answered with a non-success status
    ErpUnavailable = 2001,
    /// ERP middleware call timed out
    ErpTimeout = 2002,
    /// ERP response could not be interpreted
    ErpInvalidResponse = 2004,

    // ==================== 3xxx: Store ====================
    /// Pending-transaction store unavailable
    StoreUnavailable = 3001,
    /// Record is no longer pending
    RecordNotPending = 3002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",

            ErrorCode::ErpUnavailable => "ERP middleware unavailable",
            ErrorCode::ErpTimeout => "ERP middleware timed out",
            ErrorCode::ErpInvalidResponse => "ERP response could not be interpreted",

            ErrorCode::StoreUnavailable => "Pending-transaction store unavailable",
            ErrorCode::RecordNotPending => "Record is no longer pending",

            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),

            2001 => Ok(ErrorCode::ErpUnavailable),
            2002 => Ok(ErrorCode::ErpTimeout),
            2004 => Ok(ErrorCode::ErpInvalidResponse),

            3001 => Ok(ErrorCode::StoreUnavailable),
            3002 => Ok(ErrorCode::RecordNotPending),

            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
