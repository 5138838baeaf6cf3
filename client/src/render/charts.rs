// Chart panel: rolling speed, rpm, and pedal series plus the acceleration trace.

use telemetry_core::error::RenderError;
use telemetry_core::render::{RenderFrame, RenderTarget};
use tracing::{debug, trace};

use crate::buffers::RingBuffer;
use crate::constants::{ACCEL_CHART_POINTS, CHART_POINTS};

#[derive(Debug)]
pub struct ChartPanel {
    time: RingBuffer<u64>,
    speed: RingBuffer<f32>,
    rpm: RingBuffer<f32>,
    throttle: RingBuffer<f32>,
    brake: RingBuffer<f32>,
    accel_g: RingBuffer<f32>,
    accel_decel: RingBuffer<f32>,
    counter: u64,
}

impl ChartPanel {
    pub fn new() -> Self {
        Self::with_capacity(CHART_POINTS, ACCEL_CHART_POINTS)
    }

    pub fn with_capacity(points: usize, accel_points: usize) -> Self {
        Self {
            time: RingBuffer::filled(points, 0),
            speed: RingBuffer::filled(points, 0.0),
            rpm: RingBuffer::filled(points, 0.0),
            throttle: RingBuffer::filled(points, 0.0),
            brake: RingBuffer::filled(points, 0.0),
            accel_g: RingBuffer::filled(accel_points, 0.0),
            accel_decel: RingBuffer::filled(accel_points, 0.0),
            counter: 0,
        }
    }

    pub fn time(&self) -> &RingBuffer<u64> {
        &self.time
    }

    pub fn speed(&self) -> &RingBuffer<f32> {
        &self.speed
    }

    pub fn rpm(&self) -> &RingBuffer<f32> {
        &self.rpm
    }

    pub fn throttle(&self) -> &RingBuffer<f32> {
        &self.throttle
    }

    pub fn brake(&self) -> &RingBuffer<f32> {
        &self.brake
    }

    pub fn accel_g(&self) -> &RingBuffer<f32> {
        &self.accel_g
    }

    pub fn accel_decel(&self) -> &RingBuffer<f32> {
        &self.accel_decel
    }
}

impl Default for ChartPanel {
    fn default() -> Self {
        Self::new()
    }
}

fn push_or_hold(series: &mut RingBuffer<f32>, value: Option<f32>) {
    let point = value.unwrap_or(*series.latest());
    series.push(point);
}

impl RenderTarget for ChartPanel {
    fn init(&mut self) {
        debug!(points = self.speed.capacity(), "chart panel ready");
    }

    fn reset(&mut self) {
        self.time.fill(0);
        for series in [&mut self.speed, &mut self.rpm, &mut self.throttle, &mut self.brake] {
            series.fill(0.0);
        }
        self.accel_g.fill(0.0);
        self.accel_decel.fill(0.0);
        self.counter = 0;
    }

    fn render(&mut self, frame: &RenderFrame<'_>) -> Result<(), RenderError> {
        let data = frame.snapshot;
        self.counter += 1;
        self.time.push(self.counter);
        // Series scroll together; a channel missing from the frame repeats its last point.
        push_or_hold(&mut self.speed, data.speed_kmh);
        push_or_hold(&mut self.rpm, data.rpm);
        push_or_hold(&mut self.throttle, data.throttle_pct);
        push_or_hold(&mut self.brake, data.brake_pct);

        // Acceleration only scrolls while the feed provides it.
        if data.accel_g.is_some() || data.accel_decel.is_some() {
            push_or_hold(&mut self.accel_g, data.accel_g);
            push_or_hold(&mut self.accel_decel, data.accel_decel);
        }

        trace!(t = self.counter, speed = *self.speed.latest(), rpm = *self.rpm.latest(), "charts");
        Ok(())
    }
}
