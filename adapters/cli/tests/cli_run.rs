use std::process::Command;

#[test]
fn bundled_scenario_prints_reports_and_summary() {
    let output = Command::new(env!("CARGO_BIN_EXE_prowl"))
        .args(["--ticks", "120", "--report-every", "60"])
        .output()
        .expect("failed to run prowl");

    assert!(output.status.success(), "prowl exited with {}", output.status);
    let stdout = String::from_utf8(output.stdout).expect("utf8 output");
    assert!(stdout.contains("tick    60"));
    assert!(stdout.contains("tick   120"));
    assert!(stdout.contains("summary after 120 ticks"));
}

#[test]
fn missing_scenario_file_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_prowl"))
        .args(["--scenario", "does/not/exist.toml", "--ticks", "1"])
        .output()
        .expect("failed to run prowl");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read scenario"));
}

#[test]
fn zero_tick_rate_is_rejected() {
    let output = Command::new(env!("CARGO_BIN_EXE_prowl"))
        .args(["--tick-rate", "0"])
        .output()
        .expect("failed to run prowl");

    assert!(!output.status.success());
}
