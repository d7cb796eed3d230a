//! Error types for entrypoint setup operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop the container from reaching a runnable state.
///
/// Everything here is fail-fast: the entrypoint either exits with one of
/// these before launching anything long-running, or it does not fail at all.
/// Best-effort steps (backup renames, seed copies, artifact writes) log and
/// continue instead of producing an `InitError`.
#[derive(Error, Debug)]
pub enum InitError {
    /// A required configuration file is missing after setup
    #[error("Required configuration file missing: {path} (mount it or provide {name} under config.default)")]
    ConfigMissing { path: PathBuf, name: String },

    /// The cron schedule expression failed validation
    #[error("Invalid cron schedule {expression:?}: {reason}")]
    InvalidSchedule { expression: String, reason: String },

    /// A boolean environment variable holds an unrecognized value
    #[error("Invalid boolean value {value:?} for {variable} (expected true/false, 1/0, yes/no, on/off)")]
    InvalidBool { variable: String, value: String },

    /// `PORT` is set but not a valid port number
    #[error("Invalid value {value:?} for PORT: expected an integer in 1..=65535")]
    InvalidPort { value: String },

    /// Passthrough mode was selected with no command to run
    #[error("RUN_MODE={mode:?} selects exec passthrough but no command arguments were given")]
    EmptyExecCommand { mode: String },

    /// File I/O error
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl InitError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
