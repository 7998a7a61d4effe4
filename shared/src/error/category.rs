//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on the leading digit of the code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// ERP middleware errors (2xxx)
    Erp,
    /// Store errors (3xxx)
    Store,
    /// System errors (9xxx)
    System,
}

impl ErrorCode {
    /// Get the category of this error code
    pub fn category(&self) -> ErrorCategory {
        match self.code() {
            2000..=2999 => ErrorCategory::Erp,
            3000..=3999 => ErrorCategory::Store,
            9000..=9999 => ErrorCategory::System,
            _ => ErrorCategory::General,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category() {
        assert_eq!(ErrorCode::ValidationFailed.category(), ErrorCategory::General);
        assert_eq!(ErrorCode::ErpTimeout.category(), ErrorCategory::Erp);
        assert_eq!(ErrorCode::StoreUnavailable.category(), ErrorCategory::Store);
        assert_eq!(ErrorCode::DatabaseError.category(), ErrorCategory::System);
    }
}
