// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod audio;
pub mod calibrate;
pub mod config;
pub mod evaluate;
pub mod layout;
pub mod runtime;
pub mod scores;
pub mod sensor;
pub mod session;

/// Tick cadence of the whole installation loop, in milliseconds.
pub const TICK_RATE_MS: u64 = 100;

/// Seconds that pass per tick, the unit the round timer counts in.
pub const TICK_SECS: f64 = TICK_RATE_MS as f64 / 1000.0;
