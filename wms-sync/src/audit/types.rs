//! 审计日志类型定义

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of an audit entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 审计日志条目（不可变）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
        }
    }

    /// Render as one audit line (no trailing newline)
    ///
    /// Embedded newlines are flattened so one entry stays one line.
    pub fn to_line(&self) -> String {
        format!(
            "{} [{}] - {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.level,
            self.message.replace(['\r', '\n'], " ")
        )
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line())
    }
}

/// Line that does not follow the audit format
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed audit line: {0}")]
pub struct ParseEntryError(pub String);

impl FromStr for LogEntry {
    type Err = ParseEntryError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseEntryError(line.to_string());

        let (timestamp, rest) = line.split_once(" [").ok_or_else(malformed)?;
        let (level, message) = rest.split_once("] - ").ok_or_else(malformed)?;

        let timestamp = DateTime::parse_from_rfc3339(timestamp)
            .map_err(|_| malformed())?
            .with_timezone(&Utc);
        let level = match level {
            "INFO" => LogLevel::Info,
            "WARN" => LogLevel::Warn,
            "ERROR" => LogLevel::Error,
            _ => return Err(malformed()),
        };

        Ok(Self {
            timestamp,
            level,
            message: message.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_format() {
        let entry = LogEntry::new(LogLevel::Warn, "Skipping record");
        let line = entry.to_line();
        assert!(line.ends_with(" [WARN] - Skipping record"));
        assert!(line.contains('T'));
        assert!(line.split(' ').next().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_line_is_single_line() {
        let entry = LogEntry::new(LogLevel::Error, "first\nsecond");
        assert!(!entry.to_line().contains('\n'));
    }

    #[test]
    fn test_parse_line_back() {
        let entry = LogEntry::new(LogLevel::Error, "Batch failed: [E] Batch not found");
        let parsed: LogEntry = entry.to_line().parse().unwrap();
        assert_eq!(parsed.level, LogLevel::Error);
        assert_eq!(parsed.message, "Batch failed: [E] Batch not found");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("not an audit line".parse::<LogEntry>().is_err());
        assert!(
            "2024-01-01T00:00:00.000Z [DEBUG] - x"
                .parse::<LogEntry>()
                .is_err()
        );
    }
}
