// Course map: track bounds, the current position, and a speed-banded trajectory trail.
// Invariants: the trail keeps every third update and never exceeds its point cap.

use std::collections::VecDeque;

use telemetry_core::error::RenderError;
use telemetry_core::format::{speed_band, SpeedBand};
use telemetry_core::render::{RenderFrame, RenderTarget};
use tracing::{debug, trace};

use crate::constants::{MAP_INITIAL_MARGIN, MAP_PADDING, MAX_TRAJECTORY_POINTS, TRAJECTORY_SAMPLE_INTERVAL};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl Bounds {
    fn around(x: f32, z: f32, margin: f32) -> Self {
        Self {
            min_x: x - margin,
            max_x: x + margin,
            min_z: z - margin,
            max_z: z + margin,
        }
    }

    fn include(&mut self, x: f32, z: f32, padding: f32) {
        self.min_x = self.min_x.min(x - padding);
        self.max_x = self.max_x.max(x + padding);
        self.min_z = self.min_z.min(z - padding);
        self.max_z = self.max_z.max(z + padding);
    }

    pub fn range(&self) -> (f32, f32) {
        (self.max_x - self.min_x, self.max_z - self.min_z)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrajectoryPoint {
    pub x: f32,
    pub z: f32,
    pub speed_kmh: f32,
    pub band: SpeedBand,
}

#[derive(Debug)]
pub struct CourseMap {
    bounds: Option<Bounds>,
    position: Option<(f32, f32, f32)>,
    trajectory: VecDeque<TrajectoryPoint>,
    max_points: usize,
    sample_count: u64,
    last_speed_kmh: f32,
}

impl CourseMap {
    pub fn new() -> Self {
        Self::with_max_points(MAX_TRAJECTORY_POINTS)
    }

    pub fn with_max_points(max_points: usize) -> Self {
        Self {
            bounds: None,
            position: None,
            trajectory: VecDeque::new(),
            max_points,
            sample_count: 0,
            last_speed_kmh: 0.0,
        }
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    pub fn position(&self) -> Option<(f32, f32, f32)> {
        self.position
    }

    pub fn trajectory(&self) -> impl Iterator<Item = &TrajectoryPoint> {
        self.trajectory.iter()
    }

    pub fn trajectory_len(&self) -> usize {
        self.trajectory.len()
    }

    fn update(&mut self, x: f32, y: f32, z: f32, speed_kmh: f32) {
        self.position = Some((x, y, z));
        match self.bounds.as_mut() {
            Some(bounds) => bounds.include(x, z, MAP_PADDING),
            None => self.bounds = Some(Bounds::around(x, z, MAP_INITIAL_MARGIN)),
        }

        self.sample_count += 1;
        if self.sample_count % TRAJECTORY_SAMPLE_INTERVAL == 0 {
            self.trajectory.push_back(TrajectoryPoint {
                x,
                z,
                speed_kmh,
                band: speed_band(speed_kmh),
            });
            while self.trajectory.len() > self.max_points {
                self.trajectory.pop_front();
            }
        }
    }
}

impl Default for CourseMap {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderTarget for CourseMap {
    fn init(&mut self) {
        debug!(max_points = self.max_points, "course map ready");
    }

    fn reset(&mut self) {
        self.bounds = None;
        self.position = None;
        self.trajectory.clear();
        self.sample_count = 0;
        self.last_speed_kmh = 0.0;
    }

    fn render(&mut self, frame: &RenderFrame<'_>) -> Result<(), RenderError> {
        let data = frame.snapshot;
        let Some((x, z)) = data.position_xz() else {
            return Ok(());
        };
        // Height and speed are optional; the marker keeps the last reported values.
        let y = data
            .position_y
            .or(self.position.map(|(_, y, _)| y))
            .unwrap_or(0.0);
        if let Some(speed) = data.speed_kmh {
            self.last_speed_kmh = speed;
        }
        self.update(x, y, z, self.last_speed_kmh);

        let (range_x, range_z) = self.bounds.map(|b| b.range()).unwrap_or_default();
        trace!(x, z, range_x, range_z, points = self.trajectory.len(), "course map");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use telemetry_core::model::Snapshot;
    use telemetry_core::session::SessionTracker;

    use super::*;

    fn render_at(map: &mut CourseMap, x: f32, z: f32, speed: f32) {
        let session = SessionTracker::new();
        let snapshot = Snapshot {
            position_x: Some(x),
            position_z: Some(z),
            speed_kmh: Some(speed),
            ..Snapshot::default()
        };
        let frame = RenderFrame { now_ms: 0.0, snapshot: &snapshot, session: &session };
        map.render(&frame).unwrap();
    }

    #[test]
    fn bounds_start_wide_and_grow_with_padding() {
        let mut map = CourseMap::new();
        render_at(&mut map, 0.0, 0.0, 100.0);
        assert_eq!(
            map.bounds(),
            Some(Bounds { min_x: -50.0, max_x: 50.0, min_z: -50.0, max_z: 50.0 })
        );

        render_at(&mut map, 100.0, -10.0, 100.0);
        let bounds = map.bounds().unwrap();
        assert_eq!(bounds.max_x, 120.0);
        assert_eq!(bounds.min_z, -50.0);
        assert_eq!(map.position(), Some((100.0, 0.0, -10.0)));
    }

    #[test]
    fn trail_samples_every_third_update_and_is_capped() {
        let mut map = CourseMap::with_max_points(3);
        for i in 0..6 {
            render_at(&mut map, i as f32, 0.0, 50.0);
        }
        let xs: Vec<f32> = map.trajectory().map(|p| p.x).collect();
        assert_eq!(xs, vec![2.0, 5.0]);

        for i in 6..15 {
            render_at(&mut map, i as f32, 0.0, 130.0);
        }
        let xs: Vec<f32> = map.trajectory().map(|p| p.x).collect();
        assert_eq!(xs, vec![8.0, 11.0, 14.0]);
        assert!(map.trajectory().all(|p| p.band == SpeedBand::High));
    }

    #[test]
    fn trail_keeps_the_last_speed_when_a_frame_omits_it() {
        let mut map = CourseMap::new();
        render_at(&mut map, 0.0, 0.0, 140.0);
        let session = SessionTracker::new();
        let snapshot = Snapshot {
            position_x: Some(1.0),
            position_z: Some(0.0),
            ..Snapshot::default()
        };
        for _ in 0..2 {
            let frame = RenderFrame { now_ms: 0.0, snapshot: &snapshot, session: &session };
            map.render(&frame).unwrap();
        }
        let point = map.trajectory().next().copied().unwrap();
        assert_eq!(point.speed_kmh, 140.0);
        assert_eq!(point.band, SpeedBand::High);
    }

    #[test]
    fn reset_forgets_bounds_and_trail() {
        let mut map = CourseMap::new();
        for i in 0..6 {
            render_at(&mut map, i as f32 * 100.0, 0.0, 80.0);
        }
        assert_eq!(map.trajectory_len(), 2);

        map.reset();
        assert_eq!(map.bounds(), None);
        assert_eq!(map.position(), None);
        assert_eq!(map.trajectory_len(), 0);

        render_at(&mut map, 1_000.0, 0.0, 80.0);
        assert_eq!(
            map.bounds(),
            Some(Bounds { min_x: 950.0, max_x: 1_050.0, min_z: -50.0, max_z: 50.0 })
        );
    }

    #[test]
    fn frames_without_position_are_ignored() {
        let mut map = CourseMap::new();
        let session = SessionTracker::new();
        let snapshot = Snapshot { speed_kmh: Some(90.0), ..Snapshot::default() };
        let frame = RenderFrame { now_ms: 0.0, snapshot: &snapshot, session: &session };
        map.render(&frame).unwrap();
        assert_eq!(map.bounds(), None);
        assert_eq!(map.trajectory_len(), 0);
    }
}
