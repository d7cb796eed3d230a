//! Exec passthrough — any `RUN_MODE` other than `once`/`cron`

use crate::process::exec_argv;
use anyhow::Result;
use tracing::info;
use trendradar_init_core::InitError;

/// Exec the literal trailing command-line arguments.
///
/// `mode` is the raw `RUN_MODE` value, kept only for diagnostics.
pub fn run(mode: &str, argv: &[String]) -> Result<()> {
    if argv.is_empty() {
        return Err(InitError::EmptyExecCommand {
            mode: mode.to_string(),
        }
        .into());
    }
    info!("Run mode: passthrough ({mode:?}) — exec {argv:?}");
    exec_argv(argv)
}
