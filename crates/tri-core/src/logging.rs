//! Shared logging initialization for trendradar-init binaries.

use std::sync::OnceLock;

static INIT: OnceLock<()> = OnceLock::new();

fn parse_level() -> tracing::Level {
    match std::env::var("TRI_LOG")
        .unwrap_or_else(|_| "info".to_string())
        .to_ascii_lowercase()
        .as_str()
    {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}

/// Initialize process-level tracing output from `TRI_LOG`.
///
/// Safe to call multiple times; only the first call initializes the
/// subscriber. `min_level` lets the binary force a floor (e.g. `--verbose`)
/// regardless of the environment. Intentionally best-effort and never
/// returns an error.
pub fn init(min_level: Option<tracing::Level>) {
    if INIT.get().is_some() {
        return;
    }
    let mut level = parse_level();
    if let Some(floor) = min_level {
        if floor > level {
            level = floor;
        }
    }
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init();
    let _ = INIT.set(());
}
