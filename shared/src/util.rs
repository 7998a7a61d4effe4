/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Left-pad a numeric identifier with zeros to the ERP field width.
///
/// Values that are not purely numeric (or already longer than `width`)
/// are passed through untouched, the ERP keeps alphanumeric keys as-is.
pub fn zero_pad(value: &str, width: usize) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return trimmed.to_string();
    }
    format!("{trimmed:0>width$}")
}

/// Truncate to at most `max_chars` characters (not bytes).
pub fn truncate_chars(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}
