// Car attitude: a smoothed pose fed every frame, and the rotation readout on its own clock.

use telemetry_core::error::RenderError;
use telemetry_core::format::{rotation_arrow, steering_display, SteeringDisplay};
use telemetry_core::model::Pose;
use telemetry_core::render::{PoseTarget, RenderFrame, RenderTarget};
use tracing::{debug, trace};

use crate::constants::{POSE_REPAINT_INTERVAL_MS, POSE_SMOOTHING};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Attitude {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
    pub steering: f32,
}

/// Eases toward each new pose and repaints at most once per repaint interval.
#[derive(Debug)]
pub struct CarPose {
    target: Attitude,
    current: Attitude,
    smoothing: f32,
    repaint_interval_ms: f64,
    last_repaint_ms: Option<f64>,
    repaints: u64,
}

impl CarPose {
    pub fn new() -> Self {
        Self::with_tuning(POSE_SMOOTHING, POSE_REPAINT_INTERVAL_MS)
    }

    pub fn with_tuning(smoothing: f32, repaint_interval_ms: f64) -> Self {
        Self {
            target: Attitude::default(),
            current: Attitude::default(),
            smoothing: smoothing.clamp(0.0, 1.0),
            repaint_interval_ms,
            last_repaint_ms: None,
            repaints: 0,
        }
    }

    pub fn current(&self) -> Attitude {
        self.current
    }

    pub fn repaints(&self) -> u64 {
        self.repaints
    }
}

impl Default for CarPose {
    fn default() -> Self {
        Self::new()
    }
}

fn ease(from: f32, to: f32, factor: f32) -> f32 {
    from + (to - from) * factor
}

impl PoseTarget for CarPose {
    fn init(&mut self) {
        debug!(smoothing = self.smoothing, "car pose ready");
    }

    fn reset(&mut self) {
        self.target = Attitude::default();
        self.current = Attitude::default();
        self.last_repaint_ms = None;
    }

    fn feed(&mut self, now_ms: f64, pose: &Pose) -> Result<(), RenderError> {
        // Channels missing from a frame hold their previous target.
        if let Some(pitch) = pose.pitch {
            self.target.pitch = pitch;
        }
        if let Some(yaw) = pose.yaw {
            self.target.yaw = yaw;
        }
        if let Some(roll) = pose.roll {
            self.target.roll = roll;
        }
        if let Some(steering) = pose.steering {
            self.target.steering = steering;
        }

        let k = self.smoothing;
        self.current = Attitude {
            pitch: ease(self.current.pitch, self.target.pitch, k),
            yaw: ease(self.current.yaw, self.target.yaw, k),
            roll: ease(self.current.roll, self.target.roll, k),
            steering: ease(self.current.steering, self.target.steering, k),
        };

        let due = self
            .last_repaint_ms
            .map(|last| now_ms - last >= self.repaint_interval_ms)
            .unwrap_or(true);
        if due {
            self.last_repaint_ms = Some(now_ms);
            self.repaints += 1;
            trace!(
                pitch = self.current.pitch,
                yaw = self.current.yaw,
                roll = self.current.roll,
                "car pose"
            );
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AxisText {
    pub degrees: String,
    pub arrow: char,
}

impl AxisText {
    fn from_radians(value: f32) -> Self {
        Self {
            degrees: format!("{:.2}°", value.to_degrees()),
            arrow: rotation_arrow(value),
        }
    }
}

/// `None` until the axis has been reported; absent axes keep their last text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RotationText {
    pub pitch: Option<AxisText>,
    pub yaw: Option<AxisText>,
    pub roll: Option<AxisText>,
    pub steering: Option<SteeringDisplay>,
}

#[derive(Debug, Default)]
pub struct RotationReadout {
    text: RotationText,
}

impl RotationReadout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &RotationText {
        &self.text
    }
}

impl RenderTarget for RotationReadout {
    fn render(&mut self, frame: &RenderFrame<'_>) -> Result<(), RenderError> {
        let data = frame.snapshot;
        if let Some(pitch) = data.rotation_pitch {
            self.text.pitch = Some(AxisText::from_radians(pitch));
        }
        if let Some(yaw) = data.rotation_yaw {
            self.text.yaw = Some(AxisText::from_radians(yaw));
        }
        if let Some(roll) = data.rotation_roll {
            self.text.roll = Some(AxisText::from_radians(roll));
        }
        if let Some(steering) = data.wheel_rotation {
            self.text.steering = Some(steering_display(steering));
        }

        trace!(
            pitch = ?data.rotation_pitch,
            yaw = ?data.rotation_yaw,
            roll = ?data.rotation_roll,
            "rotation"
        );
        Ok(())
    }

    fn reset(&mut self) {
        self.text = RotationText::default();
    }
}

#[cfg(test)]
mod tests {
    use telemetry_core::model::Snapshot;
    use telemetry_core::session::SessionTracker;

    use super::*;

    fn pose(pitch: f32) -> Pose {
        Pose {
            pitch: Some(pitch),
            yaw: Some(0.0),
            roll: Some(0.0),
            rpm: None,
            steering: None,
        }
    }

    #[test]
    fn smoothing_eases_toward_the_latest_pose() {
        let mut car = CarPose::with_tuning(0.5, 0.0);
        car.feed(0.0, &pose(1.0)).unwrap();
        assert!((car.current().pitch - 0.5).abs() < 1e-6);
        car.feed(1.0, &pose(1.0)).unwrap();
        assert!((car.current().pitch - 0.75).abs() < 1e-6);

        for t in 2..40 {
            car.feed(t as f64, &pose(1.0)).unwrap();
        }
        assert!((car.current().pitch - 1.0).abs() < 1e-4);
    }

    #[test]
    fn repaint_is_rate_limited_but_every_frame_is_absorbed() {
        let mut car = CarPose::with_tuning(1.0, 100.0);
        for (i, now) in [0.0, 10.0, 50.0, 99.0, 100.0, 150.0].into_iter().enumerate() {
            car.feed(now, &pose(i as f32)).unwrap();
        }
        assert_eq!(car.repaints(), 2);
        assert_eq!(car.current().pitch, 5.0);
    }

    #[test]
    fn missing_channels_hold_the_previous_target() {
        let mut car = CarPose::with_tuning(1.0, 0.0);
        car.feed(0.0, &pose(0.3)).unwrap();
        car.feed(1.0, &Pose::default()).unwrap();
        assert_eq!(car.current().pitch, 0.3);

        car.reset();
        car.feed(2.0, &Pose::default()).unwrap();
        assert_eq!(car.current(), Attitude::default());
    }

    #[test]
    fn rotation_readout_shows_degrees_and_arrows() {
        let mut readout = RotationReadout::new();
        let session = SessionTracker::new();
        let snapshot = Snapshot {
            rotation_pitch: Some(0.2),
            rotation_yaw: Some(0.0),
            rotation_roll: Some(-0.2),
            wheel_rotation: Some(std::f32::consts::FRAC_PI_4),
            ..Snapshot::default()
        };
        let frame = RenderFrame { now_ms: 0.0, snapshot: &snapshot, session: &session };
        readout.render(&frame).unwrap();

        let text = readout.text().clone();
        let pitch = text.pitch.unwrap();
        assert_eq!(pitch.degrees, "11.46°");
        assert_eq!(pitch.arrow, '↑');
        assert_eq!(text.yaw.unwrap().degrees, "0.00°");
        assert_eq!(text.roll.unwrap().arrow, '↓');
        let steering = text.steering.unwrap();
        assert!((steering.needle_deg - 60.0).abs() < 1e-3);
    }

    #[test]
    fn absent_axes_keep_their_last_text() {
        let mut readout = RotationReadout::new();
        let session = SessionTracker::new();
        let empty = Snapshot::default();
        readout
            .render(&RenderFrame { now_ms: 0.0, snapshot: &empty, session: &session })
            .unwrap();
        assert!(readout.text().pitch.is_none());

        let tilted = Snapshot {
            rotation_pitch: Some(-0.2),
            ..Snapshot::default()
        };
        readout
            .render(&RenderFrame { now_ms: 1.0, snapshot: &tilted, session: &session })
            .unwrap();
        readout
            .render(&RenderFrame { now_ms: 2.0, snapshot: &empty, session: &session })
            .unwrap();
        let pitch = readout.text().pitch.clone().unwrap();
        assert_eq!(pitch.degrees, "-11.46°");
        assert_eq!(pitch.arrow, '↓');
        assert!(readout.text().yaw.is_none());

        readout.reset();
        assert_eq!(readout.text(), &RotationText::default());
    }
}
