//! Fixed system limits and timing constants.
//!
//! See DESIGN.md for the rationale behind the handful of values here that
//! had more than one plausible choice.

/// Maximum number of engines on the aircraft.
pub const MAX_ENGINES: usize = 4;

/// Maximum number of monitored parameters per engine.
pub const MAX_PARAMETERS: usize = 48;

/// Maximum number of simultaneously active alerts across all engines.
pub const MAX_ACTIVE_ALERTS: usize = 32;

/// A `Valid` parameter older than this is demoted to `Stale`.
pub const STALE_TIMEOUT_MS: u32 = 100;

/// Consecutive read failures on a bus before it is marked inactive.
pub const MAX_CONSECUTIVE_FAILURES: u32 = 5;

/// Cyclic executive tick period, matching the 100 Hz acquisition rate.
pub const CYCLE_PERIOD_US: u32 = 10_000;

/// Default number of consecutive exceeding ticks required to raise an alert.
pub const DEBOUNCE_TICKS_DEFAULT: u8 = 3;

/// Default recession, as a fraction of threshold, required to clear a
/// non-latched alert (2%).
pub const HYSTERESIS_PCT_DEFAULT: f32 = 0.02;

/// Default number of consecutive receded ticks required to clear a
/// non-latched alert.
pub const HYSTERESIS_TICKS_DEFAULT: u8 = 3;

/// Fixed remote-terminal address of the multiplex bus.
pub const MUX_RT_ADDRESS: u8 = 0x05;

/// Multiplex sub-address carrying vibration words (fan at offset 0, core
/// at offset 1).
pub const MUX_VIBRATION_SUBADDR: u8 = 5;

/// Number of serial (ARINC 429-style) buses available to the pipeline.
pub const SERIAL_BUS_COUNT: usize = 4;
