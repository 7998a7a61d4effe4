//! Logging Infrastructure
//!
//! Process-level `tracing` setup: console output plus an optional
//! daily-rolling file under `{WORK_DIR}/logs/app`. The business audit trail
//! is separate, see [`crate::audit`].

use anyhow::Context;
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is not set
fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!("wms_sync={level},shared={level},tower_http={level}"))
}

/// Initialize the logging system
///
/// `RUST_LOG` wins over `level` when set. `json_format` switches both
/// console and file output to JSON lines (production).
///
/// ```ignore
/// // Development (console only)
/// init_logger_with_file("debug", false, None)?;
///
/// // Production (console + rolling file)
/// init_logger_with_file("info", true, Some(Path::new("/var/lib/wms-sync/logs")))?;
/// ```
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&Path>,
) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level));

    let console_layer = if json_format {
        fmt::layer().json().with_target(true).boxed()
    } else {
        fmt::layer().with_target(false).boxed()
    };

    let file_layer = match log_dir {
        Some(dir) => {
            let app_dir = dir.join("app");
            std::fs::create_dir_all(&app_dir)
                .with_context(|| format!("Failed to create log dir {}", app_dir.display()))?;
            let appender = RollingFileAppender::new(Rotation::DAILY, app_dir, "wms-sync");
            let layer = fmt::layer().with_ansi(false).with_writer(appender);
            Some(if json_format {
                layer.json().boxed()
            } else {
                layer.boxed()
            })
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}

/// Initialize the logging system (console only)
pub fn init_logger(level: &str) -> anyhow::Result<()> {
    init_logger_with_file(level, false, None)
}
