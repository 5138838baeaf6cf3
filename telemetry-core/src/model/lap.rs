// Per-tick lap samples, completed lap records, and pose input.

use serde::Serialize;

/// One processed snapshot reduced to the channels compared between laps.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LapSample {
    pub time: u64,
    pub speed: f32,
    pub rpm: f32,
    pub throttle: f32,
    pub brake: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LapRecord {
    pub number: i16,
    pub time_ms: i32,
}

/// Orientation and drivetrain input for the car model; `None` keeps the previous value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Pose {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaw: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roll: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpm: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steering: Option<f32>,
}
