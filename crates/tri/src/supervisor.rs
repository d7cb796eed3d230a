//! The built-in cron supervisor loop
//!
//! Replaces the external cron daemon of the shell-era container: the
//! entrypoint itself stays PID 1, computes the next fire time from the
//! parsed schedule, sleeps until then, and runs the aggregation program with
//! its output appended to the cron log. Runs never overlap; the loop awaits
//! each job before scheduling the next.

use crate::process::shell_command_async;
use crate::status::{RunOutcome, StatusWriter};
use anyhow::Result;
use chrono::{Local, SecondsFormat};
use cron::Schedule;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use trendradar_init_core::{cronline, AppLayout, Settings};

/// How long an in-flight job gets to finish after shutdown is requested.
const JOB_GRACE: Duration = Duration::from_secs(10);

/// Run the scheduler loop until cancellation.
///
/// `last_run` carries the outcome of an `IMMEDIATE_RUN` pass, if one
/// happened, so the first status snapshot already reflects it.
pub async fn run(
    schedule: Schedule,
    settings: &Settings,
    layout: &AppLayout,
    cancel: CancellationToken,
    writer: &StatusWriter,
    mut last_run: Option<RunOutcome>,
) -> Result<()> {
    info!("Supervisor loop running (schedule: {})", settings.cron_schedule);

    loop {
        let Some(next) = cronline::next_fire(&schedule) else {
            // Year-bounded schedules can run out of fire times.
            warn!("Schedule has no future fire times; supervisor is idle until shutdown");
            if let Err(e) = writer.write(last_run.clone(), None) {
                warn!("Could not write status snapshot: {e}");
            }
            cancel.cancelled().await;
            break;
        };

        if let Err(e) = writer.write(last_run.clone(), Some(next)) {
            warn!("Could not write status snapshot: {e}");
        }

        let wait = (next - Local::now()).to_std().unwrap_or(Duration::ZERO);
        debug!(
            "Next run at {} (in {}s)",
            next.to_rfc3339_opts(SecondsFormat::Secs, true),
            wait.as_secs()
        );

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(wait) => {}
        }

        last_run = Some(run_job(settings, layout, &cancel).await);

        if cancel.is_cancelled() {
            break;
        }
    }

    if let Err(e) = writer.write(last_run, None) {
        warn!("Could not write final status snapshot: {e}");
    }
    info!("Supervisor loop stopped");
    Ok(())
}

/// Run the aggregation program once, appending its output to the cron log.
///
/// On shutdown during a run the job gets [`JOB_GRACE`] to finish before
/// being killed. Spawn failures are reported as an unsuccessful outcome, not
/// an error; the supervisor keeps its schedule.
pub async fn run_job(
    settings: &Settings,
    layout: &AppLayout,
    cancel: &CancellationToken,
) -> RunOutcome {
    let started_at = Local::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let clock = Instant::now();

    info!("Running aggregation job: {}", settings.main_command);

    let mut cmd = shell_command_async(&settings.main_command, &layout.app_dir);
    attach_cron_log(&mut cmd, layout);

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            error!("Failed to start aggregation job: {e}");
            return RunOutcome {
                started_at,
                duration_secs: 0,
                exit_code: None,
                success: false,
            };
        }
    };

    let status = tokio::select! {
        status = child.wait() => status,
        _ = cancel.cancelled() => {
            warn!(
                "Shutdown requested; giving the running job {}s to finish",
                JOB_GRACE.as_secs()
            );
            match tokio::time::timeout(JOB_GRACE, child.wait()).await {
                Ok(status) => status,
                Err(_) => {
                    warn!("Job did not finish in time; killing it");
                    let _ = child.kill().await;
                    child.wait().await
                }
            }
        }
    };

    let duration_secs = clock.elapsed().as_secs();
    match status {
        Ok(status) => {
            let outcome = RunOutcome {
                started_at,
                duration_secs,
                exit_code: status.code(),
                success: status.success(),
            };
            if outcome.success {
                info!("Aggregation job finished in {duration_secs}s");
            } else {
                warn!(
                    "Aggregation job failed (exit code {:?}) after {duration_secs}s",
                    outcome.exit_code
                );
            }
            outcome
        }
        Err(e) => {
            error!("Could not collect aggregation job status: {e}");
            RunOutcome {
                started_at,
                duration_secs,
                exit_code: None,
                success: false,
            }
        }
    }
}

/// Point the job's stdout/stderr at the cron log, falling back to inherited
/// stdio when the log cannot be opened.
fn attach_cron_log(cmd: &mut tokio::process::Command, layout: &AppLayout) {
    let log_path = layout.cron_log();
    let opened = std::fs::create_dir_all(layout.output_dir())
        .and_then(|_| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
        })
        .and_then(|file| Ok((file.try_clone()?, file)));

    match opened {
        Ok((out, err)) => {
            cmd.stdout(Stdio::from(out)).stderr(Stdio::from(err));
        }
        Err(e) => {
            warn!(
                "Cannot open {} for job output ({e}); using inherited stdio",
                log_path.display()
            );
        }
    }
}
