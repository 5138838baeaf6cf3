// Shared utility helpers for host timestamps.

use tokio::time::Instant;

/// Milliseconds since `start` with sub-millisecond precision, as the render clocks expect.
pub fn monotonic_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
