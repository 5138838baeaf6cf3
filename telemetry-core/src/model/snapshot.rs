// Telemetry snapshot as received from the dashboard stream.
// Invariants: every field is optional; absence means "no update this tick", never zero.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use super::{LapSample, Pose};

/// Per-wheel values ordered FL, FR, RL, RR.
pub type Wheels = [f32; 4];

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_kmh: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpm: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rpm: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpm_alert_min: Option<f32>,
    #[serde(
        deserialize_with = "deserialize_integer",
        skip_serializing_if = "Option::is_none"
    )]
    pub gear: Option<i8>,
    #[serde(
        deserialize_with = "deserialize_integer",
        skip_serializing_if = "Option::is_none"
    )]
    pub suggested_gear: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throttle_pct: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brake_pct: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clutch: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boost: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oil_pressure: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_fuel: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_capacity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_x: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_y: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_z: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub velocity_x: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub velocity_y: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub velocity_z: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_pitch: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_yaw: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_roll: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angular_velocity_x: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angular_velocity_y: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angular_velocity_z: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wheel_rotation: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_height: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<f32>,
    #[serde(
        deserialize_with = "deserialize_wheels",
        skip_serializing_if = "Option::is_none"
    )]
    pub tyre_temp: Option<Wheels>,
    #[serde(
        deserialize_with = "deserialize_wheels",
        skip_serializing_if = "Option::is_none"
    )]
    pub susp_height: Option<Wheels>,
    #[serde(
        deserialize_with = "deserialize_wheels",
        skip_serializing_if = "Option::is_none"
    )]
    pub wheel_rps: Option<Wheels>,
    #[serde(
        deserialize_with = "deserialize_wheels",
        skip_serializing_if = "Option::is_none"
    )]
    pub tyre_radius: Option<Wheels>,
    #[serde(
        deserialize_with = "deserialize_wheels",
        skip_serializing_if = "Option::is_none"
    )]
    pub slip_ratio: Option<Wheels>,
    #[serde(
        deserialize_with = "deserialize_integer",
        skip_serializing_if = "Option::is_none"
    )]
    pub lap_count: Option<i16>,
    #[serde(
        deserialize_with = "deserialize_integer",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_laps: Option<i16>,
    #[serde(
        deserialize_with = "deserialize_integer",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_laptime: Option<i32>,
    #[serde(
        deserialize_with = "deserialize_integer",
        skip_serializing_if = "Option::is_none"
    )]
    pub best_laptime: Option<i32>,
    #[serde(
        deserialize_with = "deserialize_integer",
        skip_serializing_if = "Option::is_none"
    )]
    pub current_laptime: Option<i32>,
    #[serde(
        deserialize_with = "deserialize_integer",
        skip_serializing_if = "Option::is_none"
    )]
    pub car_id: Option<i32>,
    #[serde(
        deserialize_with = "deserialize_integer",
        skip_serializing_if = "Option::is_none"
    )]
    pub package_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accel_g: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accel_decel: Option<f32>,
    #[serde(flatten, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Snapshot {
    /// Lap the car is currently on; the feed omits it before the first lap starts.
    pub fn lap_number(&self) -> i16 {
        match self.lap_count {
            Some(lap) if lap != 0 => lap,
            _ => 1,
        }
    }

    pub fn position_xz(&self) -> Option<(f32, f32)> {
        match (self.position_x, self.position_z) {
            (Some(x), Some(z)) => Some((x, z)),
            _ => None,
        }
    }

    pub fn pose(&self) -> Pose {
        Pose {
            pitch: self.rotation_pitch,
            yaw: self.rotation_yaw,
            roll: self.rotation_roll,
            rpm: self.rpm,
            steering: self.wheel_rotation,
        }
    }

    pub fn lap_sample(&self, time: u64) -> LapSample {
        LapSample {
            time,
            speed: self.speed_kmh.unwrap_or(0.0),
            rpm: self.rpm.unwrap_or(0.0),
            throttle: self.throttle_pct.unwrap_or(0.0),
            brake: self.brake_pct.unwrap_or(0.0),
        }
    }
}

fn deserialize_wheels<'de, D>(deserializer: D) -> Result<Option<Wheels>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<f32>>::deserialize(deserializer)?;
    Ok(values.and_then(|values| Wheels::try_from(values.as_slice()).ok()))
}

// The feed may send integral floats (`2.0`) or sentinels outside the field's range.
fn deserialize_integer<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let whole = match value {
        Some(serde_json::Value::Number(number)) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|v| v.is_finite() && v.fract() == 0.0 && v.abs() <= i64::MAX as f64)
                .map(|v| v as i64)
        }),
        _ => None,
    };
    Ok(whole.and_then(|v| T::try_from(v).ok()))
}
