use std::process::{Command, Output};

fn tonedit(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tonedit"))
        .args(args)
        .output()
        .expect("failed to run tonedit")
}

/// A config path that does not exist, so only the built-in defaults apply.
const NO_CONFIG: &str = "/nonexistent/tonedit/config.toml";

#[test]
fn test_help_prints_usage() {
    let output = tonedit(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("usage: tonedit"));
    assert!(stdout.contains("download <slot> <file>"));
}

#[test]
fn test_missing_command_fails_with_usage() {
    let output = tonedit(&["--config", NO_CONFIG]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("usage: tonedit"));
}

#[test]
fn test_unconfigured_ports_are_reported() {
    let output = tonedit(&["--config", NO_CONFIG, "sync"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no MIDI output port configured"));
}
