//! Derived filesystem layout of the application root

use crate::settings::Settings;
use std::path::{Path, PathBuf};

/// Required configuration file names, seeded from `config.default` when
/// absent and hard-required before any mode is entered.
pub const REQUIRED_CONFIG_FILES: [&str; 2] = ["config.yaml", "frequency_words.txt"];

/// The two application directories that get remapped onto the data dir.
pub const REMAPPED_DIRS: [&str; 2] = ["config", "output"];

/// Locations inside (and around) the application root.
///
/// Everything the entrypoint touches on disk is derived here so the fs code
/// never concatenates path fragments ad hoc.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Application root, `/app` in the shipped image.
    pub app_dir: PathBuf,
    /// Persistent volume mount point, `/data` in the shipped image.
    pub data_dir: PathBuf,
}

impl AppLayout {
    pub fn new(settings: &Settings) -> Self {
        Self {
            app_dir: settings.app_dir.clone(),
            data_dir: settings.data_dir.clone(),
        }
    }

    /// The live config directory (a symlink after a data-dir remap).
    pub fn config_dir(&self) -> PathBuf {
        self.app_dir.join("config")
    }

    /// The live output directory (a symlink after a data-dir remap).
    pub fn output_dir(&self) -> PathBuf {
        self.app_dir.join("output")
    }

    /// Shipped default configuration files, baked into the image.
    pub fn default_config_dir(&self) -> PathBuf {
        self.app_dir.join("config.default")
    }

    /// Remap destination for one of [`REMAPPED_DIRS`].
    pub fn data_destination(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }

    /// A required config file under the live config dir.
    pub fn config_file(&self, name: &str) -> PathBuf {
        self.config_dir().join(name)
    }

    /// Where scheduled job output is appended.
    pub fn cron_log(&self) -> PathBuf {
        self.output_dir().join("cron.log")
    }

    /// Supervisor status snapshot location.
    pub fn status_file(&self) -> PathBuf {
        self.output_dir().join("supervisor-status.json")
    }
}

/// Whether a directory exists and contains at least one entry.
///
/// Symlinks are not followed: a dangling or directory symlink reports false
/// because it is handled by the symlink branch of the remap, not the backup
/// branch.
pub fn is_nonempty_dir(path: &Path) -> bool {
    if !matches!(path.symlink_metadata(), Ok(m) if m.is_dir()) {
        return false;
    }
    std::fs::read_dir(path)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}
