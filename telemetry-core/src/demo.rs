// Synthetic snapshot source for running the dashboard without a live feed.
// Invariants: produces complete snapshots on the same path as live frames; one trajectory loop is one lap.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::model::Snapshot;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackPoint {
    pub x: f32,
    pub z: f32,
    pub speed_kmh: f32,
}

const fn point(x: f32, z: f32, speed_kmh: f32) -> TrackPoint {
    TrackPoint { x, z, speed_kmh }
}

pub const DEMO_TRAJECTORY: [TrackPoint; 20] = [
    point(0.0, -300.0, 80.0),
    point(50.0, -280.0, 120.0),
    point(100.0, -240.0, 160.0),
    point(150.0, -180.0, 200.0),
    point(200.0, -100.0, 220.0),
    point(240.0, -20.0, 200.0),
    point(260.0, 60.0, 180.0),
    point(250.0, 140.0, 150.0),
    point(220.0, 200.0, 120.0),
    point(170.0, 230.0, 100.0),
    point(110.0, 240.0, 90.0),
    point(50.0, 230.0, 100.0),
    point(-20.0, 200.0, 130.0),
    point(-80.0, 150.0, 170.0),
    point(-120.0, 80.0, 200.0),
    point(-140.0, 0.0, 190.0),
    point(-130.0, -80.0, 160.0),
    point(-90.0, -150.0, 130.0),
    point(-40.0, -220.0, 110.0),
    point(0.0, -280.0, 90.0),
];

const DEMO_LAP_BASE_MS: f32 = 92_000.0;
const DEMO_MAX_RPM: f32 = 9_000.0;

#[derive(Debug)]
pub struct DemoSource {
    index: u64,
    lap: i16,
    last_lap_ms: Option<i32>,
    rng: StdRng,
}

impl DemoSource {
    pub fn new(seed: u64) -> Self {
        Self {
            index: 0,
            lap: 1,
            last_lap_ms: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn reset(&mut self) {
        self.index = 0;
        self.lap = 1;
        self.last_lap_ms = None;
    }

    pub fn lap(&self) -> i16 {
        self.lap
    }

    pub fn next_snapshot(&mut self) -> Snapshot {
        let len = DEMO_TRAJECTORY.len() as u64;
        let point = DEMO_TRAJECTORY[(self.index % len) as usize];
        self.index += 1;

        let lap = (1 + (self.index - 1) / len).min(i16::MAX as u64) as i16;
        if lap != self.lap {
            self.lap = lap;
            let pace = self.rng.gen_range(0.97f32..1.03);
            self.last_lap_ms = Some((DEMO_LAP_BASE_MS * pace) as i32);
        }

        let i = self.index as f32;
        let steering = (i * 0.15).sin() * 0.25 + (i * 0.4).sin() * 0.05;

        Snapshot {
            speed_kmh: Some(point.speed_kmh),
            rpm: Some(self.rng.gen_range(3_000.0f32..7_000.0)),
            max_rpm: Some(DEMO_MAX_RPM),
            gear: Some(self.rng.gen_range(1..=6i8)),
            throttle_pct: Some(self.rng.gen_range(0.0f32..100.0)),
            brake_pct: Some(self.rng.gen_range(0.0f32..30.0)),
            position_x: Some(point.x),
            position_y: Some(0.0),
            position_z: Some(point.z),
            rotation_pitch: Some((i * 0.1).sin() * 0.3),
            rotation_yaw: Some(i * 0.05),
            rotation_roll: Some((i * 0.08).cos() * 0.2),
            wheel_rotation: Some(steering),
            lap_count: Some(self.lap),
            last_laptime: self.last_lap_ms,
            ..Snapshot::default()
        }
    }
}

impl Default for DemoSource {
    fn default() -> Self {
        Self::new(0)
    }
}
