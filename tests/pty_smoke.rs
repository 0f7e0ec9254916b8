// Minimal integration test that drives the compiled binary through a PTY.
// Exercises terminal setup, the tick loop, and clean teardown without any
// sensor hardware attached.
//
// Notes:
// - Requires a TTY; uses expectrl which allocates a pseudo terminal.
// - Marked Unix-only and ignored by default to avoid CI/platform issues.
// - Run manually via: `cargo test --test pty_smoke -- --ignored`.

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};

#[test]
#[ignore]
fn boots_without_a_sensor_and_exits_cleanly() -> Result<(), Box<dyn std::error::Error>> {
    // Resolve path to compiled binary (debug build during tests)
    let bin = assert_cmd::cargo::cargo_bin("kreis");
    let cmd = format!("{} --sensor none", bin.display());

    // Spawn the TUI inside a pseudo terminal
    let mut p = spawn(cmd)?;

    // Let a few ticks pass: menu rendering, empty blob feed, no crash
    std::thread::sleep(Duration::from_millis(500));

    // Send ESC to quit; teardown persists settings and restores the terminal
    p.send("\x1b")?;

    p.expect(Eof)?;
    Ok(())
}
