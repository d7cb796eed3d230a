//! Child process helpers
//!
//! Command strings from the environment (`MAIN_COMMAND`, `WEB_COMMAND`) go
//! through `sh -c` so quoting and arguments behave the way the container
//! contract documents; passthrough argv is executed verbatim.

use anyhow::{Context, Result};
use std::path::Path;

/// Build a `sh -c <command>` invocation rooted at `cwd`.
pub fn shell_command(command: &str, cwd: &Path) -> std::process::Command {
    let mut cmd = std::process::Command::new("sh");
    cmd.arg("-c").arg(command).current_dir(cwd);
    cmd
}

/// Async variant of [`shell_command`] for the supervisor.
pub fn shell_command_async(command: &str, cwd: &Path) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new("sh");
    cmd.arg("-c").arg(command).current_dir(cwd);
    cmd
}

/// Replace the current process with `sh -c <command>`.
///
/// On Unix this never returns on success. Off Unix the child is spawned and
/// waited on, and the process exits with the child's code.
pub fn exec_shell(command: &str, cwd: &Path) -> Result<()> {
    run_replacing(shell_command(command, cwd), command)
}

/// Replace the current process with the literal argv.
pub fn exec_argv(argv: &[String]) -> Result<()> {
    let (program, args) = argv
        .split_first()
        .context("Cannot exec an empty command line")?;
    let mut cmd = std::process::Command::new(program);
    cmd.args(args);
    run_replacing(cmd, program)
}

#[cfg(unix)]
fn run_replacing(mut cmd: std::process::Command, label: &str) -> Result<()> {
    use std::os::unix::process::CommandExt;
    let err = cmd.exec();
    Err(err).with_context(|| format!("Failed to exec {label:?}"))
}

#[cfg(not(unix))]
fn run_replacing(mut cmd: std::process::Command, label: &str) -> Result<()> {
    let status = cmd
        .status()
        .with_context(|| format!("Failed to run {label:?}"))?;
    std::process::exit(status.code().unwrap_or(1));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_shell_command_shape() {
        let cmd = shell_command("echo hi", &PathBuf::from("/tmp"));
        assert_eq!(cmd.get_program(), "sh");
        let args: Vec<_> = cmd
            .get_args()
            .map(|a| a.to_str().unwrap())
            .collect();
        assert_eq!(args, ["-c", "echo hi"]);
        assert_eq!(cmd.get_current_dir(), Some(PathBuf::from("/tmp").as_path()));
    }

    #[test]
    fn test_exec_argv_empty_is_error() {
        assert!(exec_argv(&[]).is_err());
    }
}
