//! `RUN_MODE=once` — single pass of the aggregation program

use crate::process::exec_shell;
use anyhow::Result;
use tracing::info;
use trendradar_init_core::Settings;

/// Exec the aggregation program for a single pass.
///
/// The entrypoint process is replaced, so the program's exit status becomes
/// the container's exit status and no cron setup ever happens.
pub fn run(settings: &Settings) -> Result<()> {
    info!("Run mode: once — handing off to {:?}", settings.main_command);
    exec_shell(&settings.main_command, &settings.app_dir)
}
