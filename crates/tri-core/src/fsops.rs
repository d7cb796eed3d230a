//! Persistent data-dir remapping and config seeding
//!
//! When `USE_DATA_DIR` is on and the volume is mounted, `config/` and
//! `output/` under the application root become symlinks into the data dir so
//! they survive container recreation. Pre-existing real directories are never
//! destroyed: non-empty ones are renamed aside with a timestamp, and a
//! previously populated `config/` has its files migrated to the destination
//! first so the container keeps working after a volume is attached.
//!
//! Individual remap steps are best-effort: they log and continue. The only
//! hard gate is [`ensure_required_config`], which decides whether the
//! container is runnable at all.

use crate::error::InitError;
use crate::paths::{is_nonempty_dir, AppLayout, REMAPPED_DIRS, REQUIRED_CONFIG_FILES};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Remap `config/` and `output/` onto the data dir.
///
/// Skips with a warning when the data dir does not exist (the volume is not
/// mounted). Failures on one directory do not prevent the other from being
/// remapped.
pub fn apply_data_dir_remap(layout: &AppLayout) {
    if !layout.data_dir.is_dir() {
        warn!(
            "USE_DATA_DIR is set but {} does not exist; skipping remap",
            layout.data_dir.display()
        );
        return;
    }

    for name in REMAPPED_DIRS {
        if let Err(e) = remap_one(layout, name) {
            warn!("Failed to remap {name} onto the data dir: {e}");
        }
    }
}

/// Remap a single directory: ensure the destination, move any real directory
/// out of the way, and point a symlink at the destination.
fn remap_one(layout: &AppLayout, name: &str) -> Result<(), InitError> {
    let dest = layout.data_destination(name);
    let link = layout.app_dir.join(name);

    fs::create_dir_all(&dest).map_err(|e| InitError::io(&dest, e))?;

    match link.symlink_metadata() {
        Ok(meta) if meta.file_type().is_symlink() => {
            if fs::read_link(&link).ok().as_deref() == Some(dest.as_path()) {
                debug!("{} already points at {}", link.display(), dest.display());
                return Ok(());
            }
            fs::remove_file(&link).map_err(|e| InitError::io(&link, e))?;
        }
        Ok(meta) if meta.is_dir() => {
            if is_nonempty_dir(&link) {
                if name == "config" {
                    migrate_files(&link, &dest);
                }
                let backup = backup_aside(&link, name)?;
                info!(
                    "Backed up existing {} to {}",
                    link.display(),
                    backup.display()
                );
            } else {
                fs::remove_dir(&link).map_err(|e| InitError::io(&link, e))?;
            }
        }
        Ok(_) => {
            // A stray regular file where a directory belongs; move it aside.
            let backup = backup_aside(&link, name)?;
            info!(
                "Moved unexpected file {} to {}",
                link.display(),
                backup.display()
            );
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(InitError::io(&link, e)),
    }

    symlink(&dest, &link)?;
    info!("Remapped {} -> {}", link.display(), dest.display());
    Ok(())
}

/// Rename `path` to a timestamped `<name>.bak.<stamp>` sibling.
fn backup_aside(path: &Path, name: &str) -> Result<std::path::PathBuf, InitError> {
    let stamp = chrono::Local::now().format("%Y%m%d%H%M%S");
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let mut backup = parent.join(format!("{name}.bak.{stamp}"));
    // Same-second re-runs get a numeric suffix instead of clobbering.
    let mut n = 0;
    while backup.symlink_metadata().is_ok() {
        n += 1;
        backup = parent.join(format!("{name}.bak.{stamp}-{n}"));
    }
    fs::rename(path, &backup).map_err(|e| InitError::io(path, e))?;
    Ok(backup)
}

/// Copy top-level regular files from `src` into `dest`, keeping whatever the
/// destination already has. Best-effort per file.
fn migrate_files(src: &Path, dest: &Path) {
    let entries = match fs::read_dir(src) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot read {} for migration: {e}", src.display());
            return;
        }
    };
    for entry in entries.flatten() {
        let from = entry.path();
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let to = dest.join(entry.file_name());
        if to.exists() {
            continue;
        }
        match fs::copy(&from, &to) {
            Ok(_) => info!("Migrated {} -> {}", from.display(), to.display()),
            Err(e) => warn!("Failed to migrate {}: {e}", from.display()),
        }
    }
}

#[cfg(unix)]
fn symlink(dest: &Path, link: &Path) -> Result<(), InitError> {
    std::os::unix::fs::symlink(dest, link).map_err(|e| InitError::io(link, e))
}

#[cfg(windows)]
fn symlink(dest: &Path, link: &Path) -> Result<(), InitError> {
    std::os::windows::fs::symlink_dir(dest, link).map_err(|e| InitError::io(link, e))
}

/// Seed missing required config files from `config.default`.
///
/// Never overwrites an existing file; a missing shipped default is simply
/// skipped (the precondition check will decide whether that matters).
pub fn seed_default_config(layout: &AppLayout) {
    for name in REQUIRED_CONFIG_FILES {
        let dest = layout.config_file(name);
        if dest.exists() {
            continue;
        }
        let src = layout.default_config_dir().join(name);
        if !src.is_file() {
            debug!("No shipped default for {name}; leaving absent");
            continue;
        }
        if let Err(e) = fs::create_dir_all(layout.config_dir()) {
            warn!("Cannot create {}: {e}", layout.config_dir().display());
            return;
        }
        match fs::copy(&src, &dest) {
            Ok(_) => info!("Seeded {} from {}", dest.display(), src.display()),
            Err(e) => warn!("Failed to seed {name}: {e}"),
        }
    }
}

/// The startup precondition: both required config files must exist under the
/// live config dir.
///
/// # Errors
///
/// Returns [`InitError::ConfigMissing`] naming the first missing file. This
/// is the fail-fast gate the container exits 1 on.
pub fn ensure_required_config(layout: &AppLayout) -> Result<(), InitError> {
    for name in REQUIRED_CONFIG_FILES {
        let path = layout.config_file(name);
        if !path.is_file() {
            return Err(InitError::ConfigMissing {
                path,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}
