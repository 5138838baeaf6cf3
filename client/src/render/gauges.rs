// Gauge panel: speed, gear, rpm, pedals, fuel, tyres, and lap readouts on the ui clock.

use telemetry_core::error::RenderError;
use telemetry_core::format::{
    format_lap_delta, format_lap_time, format_speed_delta, gear_label, tyre_temp_band, TyreTempBand,
};
use telemetry_core::model::Snapshot;
use telemetry_core::render::{RenderFrame, RenderTarget};
use telemetry_core::session::SessionReadout;
use tracing::{debug, trace};

const FALLBACK_MAX_RPM: f32 = 9_000.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RpmAlert {
    #[default]
    Off,
    Shift,
    Limiter,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TyreReadout {
    pub temp_c: [f32; 4],
    pub bands: [TyreTempBand; 4],
}

/// `None` until the feed first reports the value; later frames without it keep the last text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GaugeReadout {
    pub speed_kmh: Option<i32>,
    pub gear: Option<String>,
    pub suggested_gear: Option<String>,
    pub rpm: Option<i32>,
    pub rpm_pct: Option<f32>,
    pub rpm_alert: RpmAlert,
    pub throttle_pct: Option<i32>,
    pub brake_pct: Option<i32>,
    pub clutch_pct: Option<i32>,
    pub boost: Option<i32>,
    pub fuel: Option<String>,
    pub steering_deg: Option<String>,
    pub tyres: Option<TyreReadout>,
    pub lap: String,
    pub last_lap: String,
    pub best_lap: String,
    pub speed_delta: Option<String>,
    pub max_speed: String,
    pub lap_lines: Vec<String>,
}

/// Raw values the derived readouts are computed from.
#[derive(Debug, Default)]
struct Held {
    gear: Option<i8>,
    rpm: Option<f32>,
    max_rpm: Option<f32>,
    rpm_alert_min: Option<f32>,
    current_fuel: Option<f32>,
    fuel_capacity: Option<f32>,
}

#[derive(Debug, Default)]
pub struct GaugePanel {
    readout: GaugeReadout,
    held: Held,
    renders: u64,
}

fn rounded(value: f32) -> i32 {
    value.round() as i32
}

impl GaugePanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn readout(&self) -> &GaugeReadout {
        &self.readout
    }

    pub fn renders(&self) -> u64 {
        self.renders
    }

    fn update_vehicle(&mut self, data: &Snapshot) {
        let held = &mut self.held;
        let out = &mut self.readout;

        if let Some(speed) = data.speed_kmh {
            out.speed_kmh = Some(rounded(speed));
        }

        if let Some(gear) = data.gear {
            held.gear = Some(gear);
            out.gear = Some(gear_label(gear));
        }
        // A frame without a suggestion means there is none.
        out.suggested_gear = data
            .suggested_gear
            .filter(|suggested| held.gear.map(i16::from) != Some(i16::from(*suggested)))
            .map(|suggested| format!("→{suggested}"));

        if let Some(rad) = data.wheel_rotation {
            out.steering_deg = Some(format!("{:.1}°", rad.to_degrees()));
        }

        if let Some(rpm) = data.rpm {
            held.rpm = Some(rpm.round());
        }
        if let Some(max_rpm) = data.max_rpm.filter(|max| *max > 0.0) {
            held.max_rpm = Some(max_rpm);
        }
        if let Some(alert) = data.rpm_alert_min {
            held.rpm_alert_min = Some(alert);
        }
        if let Some(rpm) = held.rpm {
            let max_rpm = held.max_rpm.unwrap_or(FALLBACK_MAX_RPM);
            out.rpm = Some(rpm as i32);
            out.rpm_pct = Some((rpm / max_rpm * 100.0).min(100.0));
            out.rpm_alert = match held.rpm_alert_min {
                Some(alert) if alert > 0.0 && rpm >= alert => {
                    if rpm >= max_rpm {
                        RpmAlert::Limiter
                    } else {
                        RpmAlert::Shift
                    }
                }
                _ => RpmAlert::Off,
            };
        }

        if let Some(throttle) = data.throttle_pct {
            out.throttle_pct = Some(rounded(throttle));
        }
        if let Some(brake) = data.brake_pct {
            out.brake_pct = Some(rounded(brake));
        }
        if let Some(clutch) = data.clutch {
            out.clutch_pct = Some(rounded(clutch * 100.0));
        }
        if let Some(boost) = data.boost {
            out.boost = Some(rounded(boost * 100.0));
        }

        if data.current_fuel.is_some() || data.fuel_capacity.is_some() {
            held.current_fuel = data.current_fuel.or(held.current_fuel);
            held.fuel_capacity = data.fuel_capacity.or(held.fuel_capacity);
            out.fuel = Some(format!(
                "{} / {}",
                held.current_fuel.map(|fuel| format!("{fuel:.1}")).unwrap_or_else(|| "-".to_string()),
                held.fuel_capacity.map(|cap| format!("{cap:.0}")).unwrap_or_else(|| "-".to_string())
            ));
        }

        if let Some(temps) = data.tyre_temp {
            out.tyres = Some(TyreReadout {
                temp_c: temps.map(f32::round),
                bands: temps.map(tyre_temp_band),
            });
        }
    }

    fn update_session(&mut self, session: &SessionReadout) {
        let out = &mut self.readout;
        out.lap = match session.total_laps {
            Some(total) if total > 0 => format!("{}/{}", session.current_lap, total),
            _ => session.current_lap.to_string(),
        };
        out.last_lap = format_lap_time(session.last_lap_ms);
        out.best_lap = format_lap_time(session.best_lap_ms);
        out.speed_delta = session.speed_delta.map(|delta| format_speed_delta(delta.value));
        out.max_speed = format!("{:.0}", session.max_speed_kmh);
        out.lap_lines = session
            .laps
            .iter()
            .map(|lap| {
                let delta = match lap.delta_to_best_ms {
                    Some(_) if lap.is_best => "best".to_string(),
                    Some(delta) => format_lap_delta(delta),
                    None => String::new(),
                };
                format!("L{} {} {}", lap.number, format_lap_time(Some(lap.time_ms)), delta)
                    .trim_end()
                    .to_string()
            })
            .collect();
    }
}

impl RenderTarget for GaugePanel {
    fn init(&mut self) {
        debug!("gauge panel ready");
    }

    fn reset(&mut self) {
        self.readout = GaugeReadout::default();
        self.held = Held::default();
    }

    fn render(&mut self, frame: &RenderFrame<'_>) -> Result<(), RenderError> {
        self.update_vehicle(frame.snapshot);
        self.update_session(&frame.session.readout());
        self.renders += 1;

        let out = &self.readout;
        trace!(
            speed = ?out.speed_kmh,
            gear = ?out.gear,
            rpm = ?out.rpm,
            throttle = ?out.throttle_pct,
            brake = ?out.brake_pct,
            lap = %out.lap,
            "gauges"
        );
        Ok(())
    }
}
