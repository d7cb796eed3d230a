//! Supervisor status snapshot
//!
//! Written to `<output>/supervisor-status.json` at startup and after every
//! scheduled run so operators can see the effective schedule, the last run's
//! outcome, and the next fire time without attaching to the container.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, SecondsFormat};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

/// Status snapshot written to supervisor-status.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisorStatus {
    /// ISO 8601 timestamp when the snapshot was written
    pub timestamp: String,
    /// Process ID of the supervisor
    pub pid: u32,
    /// Entrypoint version (crate version)
    pub version: String,
    /// Uptime in seconds since supervisor start
    pub uptime_secs: u64,
    /// Effective cron schedule expression
    pub schedule: String,
    /// ISO 8601 timestamp of the next scheduled fire, if any
    pub next_run: Option<String>,
    /// Outcome of the most recent run
    pub last_run: Option<RunOutcome>,
}

/// Outcome of a single scheduled (or immediate) run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutcome {
    /// ISO 8601 timestamp when the run started
    pub started_at: String,
    /// Wall-clock duration of the run in seconds
    pub duration_secs: u64,
    /// Child exit code, absent when killed by a signal
    pub exit_code: Option<i32>,
    /// Whether the run exited zero
    pub success: bool,
}

/// Status file writer that tracks supervisor state
pub struct StatusWriter {
    status_path: PathBuf,
    start_time: SystemTime,
    schedule: String,
}

impl StatusWriter {
    pub fn new(status_path: PathBuf, schedule: String) -> Self {
        Self {
            status_path,
            start_time: SystemTime::now(),
            schedule,
        }
    }

    /// Write the status snapshot atomically (temp file, then rename).
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the
    /// file cannot be written; callers treat this as best-effort.
    pub fn write(
        &self,
        last_run: Option<RunOutcome>,
        next_run: Option<DateTime<Local>>,
    ) -> Result<()> {
        if let Some(parent) = self.status_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create supervisor status directory")?;
        }

        let uptime_secs = self
            .start_time
            .elapsed()
            .unwrap_or(Duration::ZERO)
            .as_secs();

        let status = SupervisorStatus {
            timestamp: Local::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            pid: std::process::id(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs,
            schedule: self.schedule.clone(),
            next_run: next_run.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true)),
            last_run,
        };

        let json =
            serde_json::to_string_pretty(&status).context("Failed to serialize status")?;

        let tmp_path = self.status_path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json).context("Failed to write status temp file")?;
        std::fs::rename(&tmp_path, &self.status_path).context("Failed to publish status file")?;
        Ok(())
    }
}
