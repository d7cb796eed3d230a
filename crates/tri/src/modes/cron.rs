//! `RUN_MODE=cron` — the container's long-running branch
//!
//! Validates the schedule, writes the crontab artifact, optionally runs the
//! aggregation program immediately and launches the dashboard server, then
//! enters the supervisor loop as the container's foreground process.

use crate::status::StatusWriter;
use crate::supervisor;
use anyhow::{Context, Result};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use trendradar_init_core::{cronline, AppLayout, Settings};

pub async fn run(settings: Settings, layout: AppLayout) -> Result<()> {
    // Hard gate: a bad schedule must stop the container before anything is
    // launched.
    let schedule = cronline::validate_schedule(&settings.cron_schedule)
        .context("CRON_SCHEDULE failed validation")?;
    info!("Run mode: cron (schedule: {})", settings.cron_schedule);

    let line = cronline::render_crontab_line(
        &settings.cron_schedule,
        &layout.app_dir,
        &settings.main_command,
        &layout.cron_log(),
    );
    match cronline::write_crontab(&settings.crontab_path, &line) {
        Ok(()) => info!(
            "Wrote crontab artifact to {}",
            settings.crontab_path.display()
        ),
        Err(e) => warn!("Could not write crontab artifact: {e}"),
    }

    let cancel = CancellationToken::new();
    spawn_signal_handler(cancel.clone());

    let writer = StatusWriter::new(layout.status_file(), settings.cron_schedule.clone());

    let mut last_run = None;
    if settings.immediate_run {
        info!("IMMEDIATE_RUN set; running the aggregation program before the first tick");
        let outcome = supervisor::run_job(&settings, &layout, &cancel).await;
        if !outcome.success {
            warn!(
                "Immediate run failed (exit code {:?}); continuing to the schedule",
                outcome.exit_code
            );
        }
        last_run = Some(outcome);
    }

    let web_task = if settings.webserver_enabled() {
        Some(spawn_webserver(&settings, &layout, cancel.clone()))
    } else {
        None
    };

    supervisor::run(schedule, &settings, &layout, cancel.clone(), &writer, last_run).await?;

    if let Some(task) = web_task {
        if tokio::time::timeout(Duration::from_secs(5), task).await.is_err() {
            warn!("Webserver did not stop in time");
        }
    }

    info!("Supervisor shutdown complete");
    Ok(())
}

/// Cancel the token on SIGINT or SIGTERM (the latter is what container
/// runtimes send PID 1 on stop).
fn spawn_signal_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            let mut sigterm =
                match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                    Ok(s) => s,
                    Err(e) => {
                        error!("Failed to install SIGTERM handler: {e}");
                        return;
                    }
                };

            tokio::select! {
                _ = ctrl_c => {
                    info!("Received SIGINT");
                }
                _ = sigterm.recv() => {
                    info!("Received SIGTERM");
                }
            }
        }

        #[cfg(not(unix))]
        {
            if ctrl_c.await.is_err() {
                error!("Failed to listen for Ctrl+C");
                return;
            }
            info!("Received Ctrl+C");
        }

        cancel.cancel();
    });
}

/// Launch the dashboard server as a monitored child.
///
/// The child inherits the container's stdio; an exit before shutdown is an
/// error worth surfacing, but the supervisor keeps running — the scheduled
/// aggregation is the container's primary job.
fn spawn_webserver(
    settings: &Settings,
    layout: &AppLayout,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let command = settings.web_command.clone();
    let app_dir = layout.app_dir.clone();
    let port = settings.port;

    match port {
        Some(port) => info!("Launching webserver on port {port}: {command}"),
        None => info!("Launching webserver: {command}"),
    }

    tokio::spawn(async move {
        let mut cmd = crate::process::shell_command_async(&command, &app_dir);
        if let Some(port) = port {
            cmd.env("PORT", port.to_string());
        }

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                error!("Failed to launch webserver: {e}");
                return;
            }
        };

        tokio::select! {
            status = child.wait() => match status {
                Ok(status) => error!("Webserver exited unexpectedly with {status}"),
                Err(e) => error!("Could not collect webserver status: {e}"),
            },
            _ = cancel.cancelled() => {
                info!("Stopping webserver");
                let _ = child.kill().await;
                let _ = child.wait().await;
            }
        }
    })
}
