//! Cron schedule validation and crontab rendering
//!
//! The container contract speaks classic 5-field crontab syntax
//! (`*/30 * * * *`); the parser underneath wants a seconds field, so 5-field
//! expressions are normalized by prepending `0`. 6/7-field expressions and
//! `@hourly`-style macros pass through untouched.
//!
//! The rendered one-line crontab is written out as an operator-facing
//! artifact documenting the effective schedule; the supervisor itself runs
//! off the parsed [`Schedule`].

use crate::error::InitError;
use chrono::{DateTime, Local};
use cron::Schedule;
use std::path::Path;
use std::str::FromStr;

/// Normalize a schedule expression to the seconds-bearing form the parser
/// accepts.
///
/// # Errors
///
/// Returns [`InitError::InvalidSchedule`] when the field count is neither
/// 5, 6, nor 7 (macros excepted).
pub fn normalize_schedule(expression: &str) -> Result<String, InitError> {
    let trimmed = expression.trim();
    if trimmed.starts_with('@') {
        return Ok(trimmed.to_string());
    }
    match trimmed.split_whitespace().count() {
        5 => Ok(format!("0 {trimmed}")),
        6 | 7 => Ok(trimmed.to_string()),
        n => Err(InitError::InvalidSchedule {
            expression: expression.to_string(),
            reason: format!("expected 5, 6, or 7 fields, found {n}"),
        }),
    }
}

/// Parse and validate a schedule expression.
///
/// # Errors
///
/// Returns [`InitError::InvalidSchedule`] with the parser's diagnostic when
/// the expression does not validate.
pub fn validate_schedule(expression: &str) -> Result<Schedule, InitError> {
    let normalized = normalize_schedule(expression)?;
    Schedule::from_str(&normalized).map_err(|e| InitError::InvalidSchedule {
        expression: expression.to_string(),
        reason: e.to_string(),
    })
}

/// The next local-time fire of a schedule, if any.
pub fn next_fire(schedule: &Schedule) -> Option<DateTime<Local>> {
    schedule.upcoming(Local).next()
}

/// Render the single crontab line the container would install.
pub fn render_crontab_line(
    expression: &str,
    app_dir: &Path,
    main_command: &str,
    cron_log: &Path,
) -> String {
    format!(
        "{} cd {} && {} >> {} 2>&1\n",
        expression.trim(),
        app_dir.display(),
        main_command,
        cron_log.display()
    )
}

/// Write the crontab artifact.
///
/// # Errors
///
/// Returns [`InitError::Io`] when the parent cannot be created or the file
/// cannot be written; the caller treats this as best-effort.
pub fn write_crontab(path: &Path, line: &str) -> Result<(), InitError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| InitError::io(parent, e))?;
    }
    std::fs::write(path, line).map_err(|e| InitError::io(path, e))
}
