//! Outcome of an ERP submission

use serde::{Deserialize, Serialize};
use std::fmt;

/// ERP material document identifying one posting
///
/// Every record of the batch that produced it is stamped with the same
/// document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalDocument {
    pub number: String,
    pub year: String,
}

impl fmt::Display for ExternalDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.year.is_empty() {
            f.write_str(&self.number)
        } else {
            write!(f, "{}/{}", self.number, self.year)
        }
    }
}

/// Result of one batch or single-record submission
///
/// A `success == false` result is a business rejection from the ERP,
/// transport faults never produce a `ProcessingResult`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub success: bool,
    pub message: String,
    /// Number of records covered by this result (0 on failure)
    pub processed_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<ExternalDocument>,
}

impl ProcessingResult {
    pub fn posted(document: ExternalDocument, processed_count: usize) -> Self {
        Self {
            success: true,
            message: format!("Posted as material document {document}"),
            processed_count,
            document: Some(document),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            processed_count: 0,
            document: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_posted_result() {
        let doc = ExternalDocument {
            number: "500012345".into(),
            year: "2024".into(),
        };
        let result = ProcessingResult::posted(doc.clone(), 3);
        assert!(result.success);
        assert_eq!(result.processed_count, 3);
        assert_eq!(result.document, Some(doc));
        assert!(result.message.contains("500012345/2024"));
    }

    #[test]
    fn test_rejected_result() {
        let result = ProcessingResult::rejected("Batch not found");
        assert!(!result.success);
        assert_eq!(result.processed_count, 0);
        assert!(result.document.is_none());
    }
}
