//! The environment-variable contract of the entrypoint
//!
//! Every knob the container exposes is an environment variable; there is no
//! config file for the entrypoint itself (the application's `config.yaml`
//! belongs to the aggregation program, not to us). Variables that are unset,
//! empty, or whitespace-only fall back to their defaults.

use crate::error::InitError;
use std::path::PathBuf;

/// Default invocation of the aggregation program.
pub const DEFAULT_MAIN_COMMAND: &str = "python main.py";

/// Default invocation of the dashboard server.
pub const DEFAULT_WEB_COMMAND: &str =
    "python -m uvicorn trendradar.web.server:app --host 0.0.0.0";

/// Default cron schedule (every 30 minutes).
pub const DEFAULT_CRON_SCHEDULE: &str = "*/30 * * * *";

/// What the entrypoint hands control to after setup.
///
/// Parsed from `RUN_MODE`: `once` and `cron` are recognized; any other value
/// selects passthrough of the literal command-line arguments, with the raw
/// value kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// Run the aggregation program a single time and exit with its status.
    Once,
    /// Run the built-in cron supervisor as the container's main process.
    Cron,
    /// Exec the trailing command-line arguments verbatim.
    Passthrough(String),
}

impl RunMode {
    fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "once" => RunMode::Once,
            "cron" => RunMode::Cron,
            _ => RunMode::Passthrough(raw.to_string()),
        }
    }
}

/// Resolved entrypoint settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Application root (`APP_DIR`, default `/app`).
    pub app_dir: PathBuf,
    /// Persistent volume mount point (`DATA_DIR`, default `/data`).
    pub data_dir: PathBuf,
    /// Whether to remap config/output onto the data dir (`USE_DATA_DIR`).
    pub use_data_dir: bool,
    /// Mode dispatch (`RUN_MODE`, default `cron`).
    pub run_mode: RunMode,
    /// Supervisor schedule (`CRON_SCHEDULE`, default every 30 minutes).
    pub cron_schedule: String,
    /// Run the aggregation program once before entering the schedule loop.
    pub immediate_run: bool,
    /// Explicit webserver toggle; `None` means "decide from PORT".
    pub enable_webserver: Option<bool>,
    /// Dashboard port, if set.
    pub port: Option<u16>,
    /// Aggregation program invocation (`MAIN_COMMAND`).
    pub main_command: String,
    /// Dashboard server invocation (`WEB_COMMAND`).
    pub web_command: String,
    /// Where the rendered crontab artifact goes (`CRONTAB_PATH`).
    pub crontab_path: PathBuf,
    /// Environment persistence target (`ENVIRONMENT_FILE`).
    pub environment_file: PathBuf,
}

impl Settings {
    /// Resolve settings from the process environment.
    pub fn from_env() -> Result<Self, InitError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings from an arbitrary lookup function.
    ///
    /// Unset, empty, and whitespace-only values are all treated as unset.
    ///
    /// # Errors
    ///
    /// Returns [`InitError::InvalidBool`] for unrecognized boolean values and
    /// [`InitError::InvalidPort`] when `PORT` is set but not a port number.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, InitError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| -> Option<String> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match get("PORT") {
            Some(raw) => Some(
                raw.parse::<u16>()
                    .ok()
                    .filter(|p| *p > 0)
                    .ok_or(InitError::InvalidPort { value: raw })?,
            ),
            None => None,
        };

        Ok(Self {
            app_dir: get("APP_DIR").map_or_else(|| PathBuf::from("/app"), PathBuf::from),
            data_dir: get("DATA_DIR").map_or_else(|| PathBuf::from("/data"), PathBuf::from),
            use_data_dir: parse_bool_default("USE_DATA_DIR", get("USE_DATA_DIR"), false)?,
            run_mode: RunMode::parse(&get("RUN_MODE").unwrap_or_else(|| "cron".to_string())),
            cron_schedule: get("CRON_SCHEDULE")
                .unwrap_or_else(|| DEFAULT_CRON_SCHEDULE.to_string()),
            immediate_run: parse_bool_default("IMMEDIATE_RUN", get("IMMEDIATE_RUN"), false)?,
            enable_webserver: match get("ENABLE_WEBSERVER") {
                Some(raw) => Some(parse_bool("ENABLE_WEBSERVER", &raw)?),
                None => None,
            },
            port,
            main_command: get("MAIN_COMMAND").unwrap_or_else(|| DEFAULT_MAIN_COMMAND.to_string()),
            web_command: get("WEB_COMMAND").unwrap_or_else(|| DEFAULT_WEB_COMMAND.to_string()),
            crontab_path: get("CRONTAB_PATH")
                .map_or_else(|| PathBuf::from("/tmp/crontab"), PathBuf::from),
            environment_file: get("ENVIRONMENT_FILE")
                .map_or_else(|| PathBuf::from("/etc/environment"), PathBuf::from),
        })
    }

    /// Whether the dashboard server should be launched alongside the
    /// supervisor: explicitly via `ENABLE_WEBSERVER`, or implicitly when the
    /// toggle is unset but a `PORT` is configured.
    pub fn webserver_enabled(&self) -> bool {
        self.enable_webserver.unwrap_or(self.port.is_some())
    }
}

/// Parse a boolean environment value.
///
/// Accepts `true`/`false`, `1`/`0`, `yes`/`no`, `on`/`off`,
/// case-insensitively. Anything else is a hard error naming the variable.
pub fn parse_bool(variable: &str, raw: &str) -> Result<bool, InitError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(InitError::InvalidBool {
            variable: variable.to_string(),
            value: raw.to_string(),
        }),
    }
}

fn parse_bool_default(
    variable: &str,
    raw: Option<String>,
    default: bool,
) -> Result<bool, InitError> {
    match raw {
        Some(raw) => parse_bool(variable, &raw),
        None => Ok(default),
    }
}
