//! Environment persistence for scheduler-invoked children
//!
//! Container environment variables live only in the entrypoint's process;
//! anything later spawned from a crontab read by a system cron daemon would
//! not see them. The entrypoint therefore appends the full environment to
//! `/etc/environment` in `KEY="value"` form before dispatching. The write is
//! best-effort at the call site (read-only root filesystems exist).

use crate::error::InitError;
use std::ffi::OsString;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Append the current process environment to `path`.
///
/// Returns the number of entries written. Keys that are not valid
/// environment names, values containing newlines, and entries that are not
/// valid UTF-8 are skipped.
///
/// # Errors
///
/// Returns [`InitError::Io`] when the file cannot be opened or written.
pub fn persist_environment(path: &Path) -> Result<usize, InitError> {
    write_environment(path, std::env::vars_os().filter_map(utf8_pair))
}

/// The OS does not require environment entries to be UTF-8; such entries
/// cannot be rendered into the file and are dropped rather than aborting.
fn utf8_pair((key, value): (OsString, OsString)) -> Option<(String, String)> {
    match (key.into_string(), value.into_string()) {
        (Ok(key), Ok(value)) => Some((key, value)),
        (Err(key), _) => {
            debug!("Skipping {key:?}: name is not valid UTF-8");
            None
        }
        (Ok(key), Err(_)) => {
            debug!("Skipping {key}: value is not valid UTF-8");
            None
        }
    }
}

/// Append the given variables to `path` in `KEY="value"` form.
pub fn write_environment<I>(path: &Path, vars: I) -> Result<usize, InitError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| InitError::io(path, e))?;

    let mut written = 0;
    for (key, value) in vars {
        if !is_valid_name(&key) {
            debug!("Skipping invalid environment name {key:?}");
            continue;
        }
        if value.contains('\n') {
            debug!("Skipping {key}: value contains a newline");
            continue;
        }
        writeln!(file, "{key}={}", quote(&value)).map_err(|e| InitError::io(path, e))?;
        written += 1;
    }
    Ok(written)
}

/// POSIX environment name: `[A-Za-z_][A-Za-z0-9_]*`.
fn is_valid_name(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}
