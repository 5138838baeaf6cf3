// Shared constants for scheduling cadence, reconnect policy, and readout thresholds.

pub const WS_PATH: &str = "/ws";

pub const RECONNECT_DELAY_INITIAL_MS: u64 = 2_000;
pub const RECONNECT_DELAY_MAX_MS: u64 = 30_000;
pub const RECONNECT_DELAY_MULTIPLIER: f64 = 1.5;

pub const UI_INTERVAL_MS: f64 = 1000.0 / 30.0;
pub const CHARTS_INTERVAL_MS: f64 = 1000.0 / 20.0;
pub const MAP_INTERVAL_MS: f64 = 1000.0 / 10.0;
pub const ROTATION_INTERVAL_MS: f64 = 1000.0 / 30.0;

pub const DEMO_INTERVAL_MS: u64 = 200;

pub const TYRE_TEMP_COLD_C: f32 = 40.0;
pub const TYRE_TEMP_OPTIMAL_HIGH_C: f32 = 80.0;
pub const TYRE_TEMP_HOT_C: f32 = 100.0;

pub const SPEED_LOW_KMH: f32 = 60.0;
pub const SPEED_HIGH_KMH: f32 = 120.0;

pub const STEERING_MAX_INPUT_DEG: f32 = 45.0;
pub const STEERING_MAX_DISPLAY_DEG: f32 = 60.0;
