// Shared constants for the native host: defaults, env keys, and render target capacities.

pub const DEFAULT_ORIGIN: &str = "http://127.0.0.1:8080";
pub const DEFAULT_TICK_HZ: u32 = 60;

pub const ENV_CONFIG_PATH: &str = "GT7_DASHBOARD_CONFIG";
pub const ENV_ORIGIN: &str = "GT7_DASHBOARD_ORIGIN";
pub const ENV_DEMO: &str = "GT7_DASHBOARD_DEMO";
pub const ENV_TICK_HZ: &str = "GT7_DASHBOARD_TICK_HZ";

pub const SOCKET_EVENT_BUFFER: usize = 256;
pub const STATS_INTERVAL_SECS: u64 = 5;

pub const CHART_POINTS: usize = 1_200;
pub const ACCEL_CHART_POINTS: usize = 200;

pub const TRAJECTORY_SAMPLE_INTERVAL: u64 = 3;
pub const MAX_TRAJECTORY_POINTS: usize = 2_000;
pub const MAP_INITIAL_MARGIN: f32 = 50.0;
pub const MAP_PADDING: f32 = 20.0;

pub const POSE_SMOOTHING: f32 = 0.2;
pub const POSE_REPAINT_INTERVAL_MS: f64 = 1000.0 / 30.0;
