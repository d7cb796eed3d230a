//! Integration tests for the cron supervisor mode
//!
//! Long-running tests spawn the real binary, wait for its on-disk artifacts,
//! then stop it with SIGTERM and assert a clean exit.

mod common;

use common::{wait_for, Fixture};
use predicates::prelude::*;
use std::time::Duration;

const STARTUP_TIMEOUT: Duration = Duration::from_secs(20);

#[test]
fn invalid_schedule_exits_before_the_supervisor_starts() {
    let fx = Fixture::new();
    fx.write_config();

    fx.cmd()
        .env("RUN_MODE", "cron")
        .env("CRON_SCHEDULE", "not a schedule")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid cron schedule"));

    // Validation failed before the artifact write.
    assert!(!fx.crontab_path().exists());
}

#[test]
fn invalid_port_is_rejected_in_cron_mode() {
    let fx = Fixture::new();
    fx.write_config();

    fx.cmd()
        .env("RUN_MODE", "cron")
        .env("PORT", "not-a-port")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("PORT"));
}

#[cfg(unix)]
fn terminate(child: &mut std::process::Child) -> std::process::ExitStatus {
    let pid = child.id().to_string();
    std::process::Command::new("kill")
        .args(["-TERM", &pid])
        .status()
        .expect("failed to send SIGTERM");

    let deadline = std::time::Instant::now() + Duration::from_secs(20);
    loop {
        if let Some(status) = child.try_wait().expect("try_wait failed") {
            return status;
        }
        if std::time::Instant::now() > deadline {
            let _ = child.kill();
            panic!("supervisor did not exit after SIGTERM");
        }
        std::thread::sleep(Duration::from_millis(100));
    }
}

#[cfg(unix)]
#[test]
fn supervisor_writes_artifacts_and_shuts_down_cleanly() {
    let fx = Fixture::new();
    fx.write_config();
    let marker = fx.marker("ran.txt");

    let mut child = fx
        .raw_cmd()
        .env("RUN_MODE", "cron")
        .env("CRON_SCHEDULE", "*/30 * * * *")
        .env("IMMEDIATE_RUN", "true")
        .env("MAIN_COMMAND", format!("echo ran >> {}", marker.display()))
        .spawn()
        .unwrap();

    let status_file = fx.app_dir().join("output/supervisor-status.json");
    assert!(
        wait_for(STARTUP_TIMEOUT, || marker.exists()
            && fx.crontab_path().exists()
            && status_file.exists()),
        "supervisor artifacts did not appear"
    );

    let crontab = std::fs::read_to_string(fx.crontab_path()).unwrap();
    assert_eq!(
        crontab,
        format!(
            "*/30 * * * * cd {} && echo ran >> {} >> {} 2>&1\n",
            fx.app_dir().display(),
            marker.display(),
            fx.app_dir().join("output/cron.log").display()
        )
    );

    let status: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&status_file).unwrap()).unwrap();
    assert_eq!(status["schedule"], "*/30 * * * *");
    assert_eq!(status["last_run"]["success"], true);
    assert!(status["next_run"].is_string());

    let exit = terminate(&mut child);
    assert!(exit.success(), "supervisor exited with {exit}");

    // The immediate run was the only invocation; */30 never fired in-test.
    let runs = std::fs::read_to_string(&marker).unwrap();
    assert_eq!(runs.lines().count(), 1);
}

#[cfg(unix)]
#[test]
fn port_alone_launches_the_webserver() {
    let fx = Fixture::new();
    fx.write_config();
    let web_marker = fx.marker("web.txt");

    let mut child = fx
        .raw_cmd()
        .env("RUN_MODE", "cron")
        .env("PORT", "8123")
        .env(
            "WEB_COMMAND",
            format!("echo started $PORT >> {}; sleep 60", web_marker.display()),
        )
        .env("MAIN_COMMAND", "true")
        .spawn()
        .unwrap();

    assert!(
        wait_for(STARTUP_TIMEOUT, || web_marker.exists()),
        "webserver was not launched"
    );
    assert_eq!(
        std::fs::read_to_string(&web_marker).unwrap(),
        "started 8123\n"
    );

    let exit = terminate(&mut child);
    assert!(exit.success());
}

#[cfg(unix)]
#[test]
fn explicit_disable_overrides_a_configured_port() {
    let fx = Fixture::new();
    fx.write_config();
    let web_marker = fx.marker("web.txt");

    let mut child = fx
        .raw_cmd()
        .env("RUN_MODE", "cron")
        .env("PORT", "8123")
        .env("ENABLE_WEBSERVER", "false")
        .env(
            "WEB_COMMAND",
            format!("echo started >> {}; sleep 60", web_marker.display()),
        )
        .env("MAIN_COMMAND", "true")
        .spawn()
        .unwrap();

    let status_file = fx.app_dir().join("output/supervisor-status.json");
    assert!(
        wait_for(STARTUP_TIMEOUT, || status_file.exists()),
        "supervisor did not start"
    );
    assert!(!web_marker.exists());

    let exit = terminate(&mut child);
    assert!(exit.success());
}
