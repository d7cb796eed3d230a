//! trendradar-init — container entrypoint for TrendRadar
//!
//! Runs the linear setup phase (data-dir remap, config seeding, config
//! precondition, environment persistence) and then hands control to exactly
//! one long-running process: the aggregation program (`once`), the built-in
//! cron supervisor (`cron`), or an arbitrary passthrough command.

mod modes;
mod process;
mod status;
mod supervisor;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use trendradar_init_core::{envfile, fsops, logging, AppLayout, RunMode, Settings};

/// Container entrypoint for TrendRadar
#[derive(Parser, Debug)]
#[command(name = "tri")]
#[command(about = "Container entrypoint for TrendRadar: setup, then once/cron/exec dispatch")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Passthrough command, used when RUN_MODE selects neither once nor cron
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose.then_some(tracing::Level::DEBUG));

    let settings = Settings::from_env().context("Failed to resolve entrypoint settings")?;
    let layout = AppLayout::new(&settings);

    info!(
        "trendradar-init v{} starting (app dir: {})",
        env!("CARGO_PKG_VERSION"),
        layout.app_dir.display()
    );

    // Setup phase: remap, seed, precondition, environment persistence. Runs
    // for every mode; only the precondition is fatal.
    if settings.use_data_dir {
        fsops::apply_data_dir_remap(&layout);
    }
    fsops::seed_default_config(&layout);
    fsops::ensure_required_config(&layout)
        .context("Container is not in a runnable state")?;

    match envfile::persist_environment(&settings.environment_file) {
        Ok(n) => info!(
            "Persisted {n} environment entries to {}",
            settings.environment_file.display()
        ),
        Err(e) => warn!("Could not persist environment: {e}"),
    }

    match settings.run_mode.clone() {
        RunMode::Once => modes::once::run(&settings),
        RunMode::Passthrough(raw) => modes::exec::run(&raw, &cli.command),
        RunMode::Cron => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("Failed to build async runtime")?;
            runtime.block_on(modes::cron::run(settings, layout))
        }
    }
}
