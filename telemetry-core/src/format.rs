// Display helpers that turn telemetry values into plain readout text and bands.

use serde::Serialize;

use crate::constants::{
    SPEED_HIGH_KMH, SPEED_LOW_KMH, STEERING_MAX_DISPLAY_DEG, STEERING_MAX_INPUT_DEG,
    TYRE_TEMP_COLD_C, TYRE_TEMP_HOT_C, TYRE_TEMP_OPTIMAL_HIGH_C,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TyreTempBand {
    Cold,
    Optimal,
    Warm,
    Hot,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedBand {
    Low,
    Mid,
    High,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SteeringDisplay {
    pub degrees: f32,
    pub needle_deg: f32,
}

/// `M:SS.mmm`; the feed uses -1 for "not timed yet".
pub fn format_lap_time(ms: Option<i32>) -> String {
    let ms = match ms {
        Some(ms) if ms >= 0 => ms,
        _ => return "--:--.---".to_string(),
    };
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let millis = ms % 1000;
    format!("{minutes}:{seconds:02}.{millis:03}")
}

pub fn format_speed_delta(delta_kmh: f32) -> String {
    let sign = if delta_kmh >= 0.0 { "+" } else { "" };
    format!("{sign}{delta_kmh:.1} km/h")
}

/// Lap time difference against the best lap, in seconds.
pub fn format_lap_delta(delta_ms: i32) -> String {
    let sign = if delta_ms > 0 { "+" } else { "" };
    format!("{sign}{:.3}", delta_ms as f64 / 1000.0)
}

pub fn tyre_temp_band(temp_c: f32) -> TyreTempBand {
    if temp_c < TYRE_TEMP_COLD_C {
        TyreTempBand::Cold
    } else if temp_c < TYRE_TEMP_OPTIMAL_HIGH_C {
        TyreTempBand::Optimal
    } else if temp_c < TYRE_TEMP_HOT_C {
        TyreTempBand::Warm
    } else {
        TyreTempBand::Hot
    }
}

pub fn speed_band(speed_kmh: f32) -> SpeedBand {
    if speed_kmh < SPEED_LOW_KMH {
        SpeedBand::Low
    } else if speed_kmh < SPEED_HIGH_KMH {
        SpeedBand::Mid
    } else {
        SpeedBand::High
    }
}

pub fn rotation_arrow(angle_rad: f32) -> char {
    if angle_rad > 0.1 {
        '↑'
    } else if angle_rad < -0.1 {
        '↓'
    } else {
        '→'
    }
}

pub fn steering_display(steering_rad: f32) -> SteeringDisplay {
    let degrees = steering_rad.to_degrees();
    let clamped = degrees.clamp(-STEERING_MAX_INPUT_DEG, STEERING_MAX_INPUT_DEG);
    SteeringDisplay {
        degrees,
        needle_deg: clamped / STEERING_MAX_INPUT_DEG * STEERING_MAX_DISPLAY_DEG,
    }
}

/// The feed reports reverse as gear 0.
pub fn gear_label(gear: i8) -> String {
    match gear {
        0 => "R".to_string(),
        gear => gear.to_string(),
    }
}
