//! Shared fixtures for entrypoint integration tests
//!
//! Every test drives the real `tri` binary through the environment contract,
//! with a temp dir standing in for `/app`, `/data`, `/tmp/crontab`, and
//! `/etc/environment`.
//!
//! Not every test binary uses every helper.
#![allow(dead_code)]

use std::path::PathBuf;
use tempfile::TempDir;

/// The environment variables of the contract; removed from every test
/// invocation so the host environment cannot leak in.
const CONTRACT_VARS: [&str; 13] = [
    "USE_DATA_DIR",
    "DATA_DIR",
    "RUN_MODE",
    "CRON_SCHEDULE",
    "IMMEDIATE_RUN",
    "ENABLE_WEBSERVER",
    "PORT",
    "APP_DIR",
    "MAIN_COMMAND",
    "WEB_COMMAND",
    "CRONTAB_PATH",
    "ENVIRONMENT_FILE",
    "TRI_LOG",
];

pub struct Fixture {
    pub tmp: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("app")).unwrap();
        Self { tmp }
    }

    pub fn app_dir(&self) -> PathBuf {
        self.tmp.path().join("app")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.tmp.path().join("data")
    }

    pub fn crontab_path(&self) -> PathBuf {
        self.tmp.path().join("crontab")
    }

    pub fn environment_file(&self) -> PathBuf {
        self.tmp.path().join("environment")
    }

    /// A file path inside the fixture for commands to write markers to.
    pub fn marker(&self, name: &str) -> PathBuf {
        self.tmp.path().join(name)
    }

    /// Create the required config files directly under `app/config`.
    pub fn write_config(&self) {
        let config = self.app_dir().join("config");
        std::fs::create_dir_all(&config).unwrap();
        std::fs::write(config.join("config.yaml"), "app: trendradar\n").unwrap();
        std::fs::write(config.join("frequency_words.txt"), "ai\nrust\n").unwrap();
    }

    /// Create shipped defaults under `app/config.default`.
    pub fn write_defaults(&self) {
        let defaults = self.app_dir().join("config.default");
        std::fs::create_dir_all(&defaults).unwrap();
        std::fs::write(defaults.join("config.yaml"), "default: config\n").unwrap();
        std::fs::write(defaults.join("frequency_words.txt"), "default words\n").unwrap();
    }

    /// An `assert_cmd` invocation of the binary with the fixture wired in.
    pub fn cmd(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::Command::cargo_bin("tri").unwrap();
        self.apply_env(|k| {
            cmd.env_remove(k);
        });
        cmd.env("APP_DIR", self.app_dir());
        cmd.env("DATA_DIR", self.data_dir());
        cmd.env("CRONTAB_PATH", self.crontab_path());
        cmd.env("ENVIRONMENT_FILE", self.environment_file());
        cmd
    }

    /// A raw `std::process` invocation for tests that signal the child.
    pub fn raw_cmd(&self) -> std::process::Command {
        let mut cmd = std::process::Command::new(assert_cmd::cargo::cargo_bin("tri"));
        self.apply_env(|k| {
            cmd.env_remove(k);
        });
        cmd.env("APP_DIR", self.app_dir());
        cmd.env("DATA_DIR", self.data_dir());
        cmd.env("CRONTAB_PATH", self.crontab_path());
        cmd.env("ENVIRONMENT_FILE", self.environment_file());
        cmd
    }

    fn apply_env(&self, mut remove: impl FnMut(&str)) {
        for key in CONTRACT_VARS {
            remove(key);
        }
    }
}

/// Poll until `predicate` holds or `timeout` elapses.
pub fn wait_for(timeout: std::time::Duration, predicate: impl Fn() -> bool) -> bool {
    let deadline = std::time::Instant::now() + timeout;
    while std::time::Instant::now() < deadline {
        if predicate() {
            return true;
        }
        std::thread::sleep(std::time::Duration::from_millis(100));
    }
    predicate()
}
