//! Pass statistics
//!
//! Counters are collected while the pass runs. The finished [`PassStats`] is
//! written to the audit log as a summary block and kept in memory by the
//! [`StatsAggregator`]. [`parse_summaries`] reads the summary lines back from
//! an audit log tail.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use shared::models::ModuleKind;
use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use crate::audit::LogEntry;

const SUMMARY_PREFIX: &str = "Reconciliation summary [";
const DEFAULT_CAPACITY: usize = 20;

/// What started a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerSource {
    Startup,
    Timer,
    Manual,
}

impl TriggerSource {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TriggerSource::Startup => "startup",
            TriggerSource::Timer => "timer",
            TriggerSource::Manual => "manual",
        }
    }
}

impl fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleStats {
    pub module: ModuleKind,
    pub fetched: u64,
    pub processed: u64,
    pub failed: u64,
    /// Dropped by validation
    pub skipped: u64,
    /// ERP calls, every attempt counts
    pub api_calls: u64,
    /// Batches that degraded to single-record submission
    pub fallback_batches: u64,
    pub duration_ms: u64,
    /// Module stopped by an unexpected fault
    pub aborted: bool,
}

impl ModuleStats {
    pub fn new(module: ModuleKind) -> Self {
        Self {
            module,
            fetched: 0,
            processed: 0,
            failed: 0,
            skipped: 0,
            api_calls: 0,
            fallback_batches: 0,
            duration_ms: 0,
            aborted: false,
        }
    }

    pub fn summary_line(&self) -> String {
        let mut line = format!(
            "Module {}: processed={} failed={} skipped={} api_calls={} duration_ms={}",
            self.module,
            self.processed,
            self.failed,
            self.skipped,
            self.api_calls,
            self.duration_ms
        );
        if self.aborted {
            line.push_str(" aborted=true");
        }
        line
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassStats {
    pub trigger: TriggerSource,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub processed: u64,
    pub failed: u64,
    pub skipped: u64,
    pub api_calls: u64,
    pub modules: Vec<ModuleStats>,
}

impl PassStats {
    pub fn from_modules(
        trigger: TriggerSource,
        started_at: DateTime<Utc>,
        duration_ms: u64,
        modules: Vec<ModuleStats>,
    ) -> Self {
        Self {
            trigger,
            started_at,
            duration_ms,
            processed: modules.iter().map(|m| m.processed).sum(),
            failed: modules.iter().map(|m| m.failed).sum(),
            skipped: modules.iter().map(|m| m.skipped).sum(),
            api_calls: modules.iter().map(|m| m.api_calls).sum(),
            modules,
        }
    }

    /// Audit block: one headline, then one line per module that had work
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "{SUMMARY_PREFIX}{}]: processed={} failed={} skipped={} api_calls={} duration_ms={}",
            self.trigger,
            self.processed,
            self.failed,
            self.skipped,
            self.api_calls,
            self.duration_ms
        )];
        lines.extend(
            self.modules
                .iter()
                .filter(|m| m.fetched > 0 || m.aborted)
                .map(ModuleStats::summary_line),
        );
        lines
    }

    pub fn module(&self, module: ModuleKind) -> Option<&ModuleStats> {
        self.modules.iter().find(|m| m.module == module)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleTotals {
    pub processed: u64,
    pub failed: u64,
    pub skipped: u64,
    pub api_calls: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub passes: u64,
    pub processed: u64,
    pub failed: u64,
    pub skipped: u64,
    pub api_calls: u64,
    pub per_module: BTreeMap<ModuleKind, ModuleTotals>,
}

impl Totals {
    fn add(&mut self, pass: &PassStats) {
        self.passes += 1;
        self.processed += pass.processed;
        self.failed += pass.failed;
        self.skipped += pass.skipped;
        self.api_calls += pass.api_calls;
        for m in &pass.modules {
            let entry = self.per_module.entry(m.module).or_default();
            entry.processed += m.processed;
            entry.failed += m.failed;
            entry.skipped += m.skipped;
            entry.api_calls += m.api_calls;
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub totals: Totals,
    /// Newest first
    pub recent: Vec<PassStats>,
}

#[derive(Debug, Default)]
struct Inner {
    recent: VecDeque<PassStats>,
    totals: Totals,
}

/// In-memory ring of recent passes plus cumulative totals
#[derive(Debug)]
pub struct StatsAggregator {
    capacity: usize,
    inner: Mutex<Inner>,
}

impl Default for StatsAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl StatsAggregator {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn record(&self, pass: &PassStats) {
        let mut inner = self.inner.lock();
        inner.totals.add(pass);
        if inner.recent.len() == self.capacity {
            inner.recent.pop_back();
        }
        inner.recent.push_front(pass.clone());
    }

    pub fn latest(&self) -> Option<PassStats> {
        self.inner.lock().recent.front().cloned()
    }

    pub fn totals(&self) -> Totals {
        self.inner.lock().totals.clone()
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let inner = self.inner.lock();
        StatsSnapshot {
            totals: inner.totals.clone(),
            recent: inner.recent.iter().cloned().collect(),
        }
    }
}

/// Pass headline recovered from the audit log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogSummary {
    pub timestamp: DateTime<Utc>,
    pub trigger: String,
    pub processed: u64,
    pub failed: u64,
    pub skipped: u64,
    pub api_calls: u64,
    pub duration_ms: u64,
}

fn parse_summary(entry: &LogEntry) -> Option<LogSummary> {
    let rest = entry.message.strip_prefix(SUMMARY_PREFIX)?;
    let (trigger, counters) = rest.split_once("]:")?;

    let mut summary = LogSummary {
        timestamp: entry.timestamp,
        trigger: trigger.to_string(),
        processed: 0,
        failed: 0,
        skipped: 0,
        api_calls: 0,
        duration_ms: 0,
    };
    for pair in counters.split_whitespace() {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        let Ok(value) = value.parse::<u64>() else {
            continue;
        };
        match key {
            "processed" => summary.processed = value,
            "failed" => summary.failed = value,
            "skipped" => summary.skipped = value,
            "api_calls" => summary.api_calls = value,
            "duration_ms" => summary.duration_ms = value,
            _ => {}
        }
    }
    Some(summary)
}

/// Pass summaries found in raw audit lines, newest first; other lines are ignored
pub fn parse_summaries(lines: &[String]) -> Vec<LogSummary> {
    let mut summaries: Vec<_> = lines
        .iter()
        .filter_map(|line| line.parse::<LogEntry>().ok())
        .filter_map(|entry| parse_summary(&entry))
        .collect();
    summaries.reverse();
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::LogLevel;

    fn module(kind: ModuleKind, processed: u64, failed: u64) -> ModuleStats {
        ModuleStats {
            fetched: processed + failed,
            processed,
            failed,
            api_calls: 1,
            ..ModuleStats::new(kind)
        }
    }

    fn pass(trigger: TriggerSource) -> PassStats {
        PassStats::from_modules(
            trigger,
            Utc::now(),
            1200,
            vec![
                module(ModuleKind::GoodsReceipt, 4, 1),
                ModuleStats::new(ModuleKind::InboundScan),
                module(ModuleKind::Quality, 3, 0),
            ],
        )
    }

    #[test]
    fn test_pass_totals_sum_modules() {
        let stats = pass(TriggerSource::Manual);
        assert_eq!(stats.processed, 7);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.api_calls, 2);
    }

    #[test]
    fn test_summary_block_skips_idle_modules() {
        let lines = pass(TriggerSource::Timer).summary_lines();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "Reconciliation summary [timer]: processed=7 failed=1 skipped=0 api_calls=2 duration_ms=1200"
        );
        assert!(lines[1].starts_with("Module GoodsReceipt: processed=4 failed=1"));
    }

    #[test]
    fn test_aggregator_ring_and_totals() {
        let aggregator = StatsAggregator::new(2);
        aggregator.record(&pass(TriggerSource::Startup));
        aggregator.record(&pass(TriggerSource::Timer));
        aggregator.record(&pass(TriggerSource::Manual));

        let snapshot = aggregator.snapshot();
        assert_eq!(snapshot.recent.len(), 2);
        assert_eq!(snapshot.recent[0].trigger, TriggerSource::Manual);
        assert_eq!(snapshot.totals.passes, 3);
        assert_eq!(snapshot.totals.processed, 21);
        assert_eq!(snapshot.totals.per_module[&ModuleKind::Quality].processed, 9);
        assert_eq!(
            aggregator.latest().map(|p| p.trigger),
            Some(TriggerSource::Manual)
        );
    }

    #[test]
    fn test_parse_summaries_from_log_lines() {
        let stats = pass(TriggerSource::Manual);
        let mut lines = vec![LogEntry::new(LogLevel::Info, "Reconciliation pass started").to_line()];
        lines.extend(
            stats
                .summary_lines()
                .into_iter()
                .map(|l| LogEntry::new(LogLevel::Info, l).to_line()),
        );
        lines.push("garbage".to_string());

        let summaries = parse_summaries(&lines);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].trigger, "manual");
        assert_eq!(summaries[0].processed, 7);
        assert_eq!(summaries[0].failed, 1);
        assert_eq!(summaries[0].duration_ms, 1200);
    }
}
