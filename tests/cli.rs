//! Process-level behavior of the `bzzzbz` binary.

use std::process::Command;

#[test]
fn invalid_config_exits_with_single_diagnostic() {
    let output = Command::new(env!("CARGO_BIN_EXE_bzzzbz"))
        .args(["--source", "tone", "--full-scale", "0"])
        .env_remove("RUST_LOG")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(
        stderr.matches("control full scale must be > 0").count(),
        1,
        "stderr: {}",
        stderr
    );
}

#[test]
fn bad_log_level_reported_without_subscriber() {
    let output = Command::new(env!("CARGO_BIN_EXE_bzzzbz"))
        .args(["--log-level", "not a level!"])
        .env_remove("RUST_LOG")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("bzzzbz: "), "stderr: {}", stderr);
    assert_eq!(stderr.lines().count(), 1);
}
