// Lap and session state derived from the snapshot stream.
// Invariants: lap records are unique per lap number; the best lap only changes on a strictly faster time.

use serde::Serialize;

use crate::model::{LapRecord, LapSample, Snapshot};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaTrend {
    Faster,
    Slower,
}

/// Live speed difference against the best lap at the same sample index.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SpeedDelta {
    pub value: f32,
    pub trend: DeltaTrend,
}

impl SpeedDelta {
    pub fn new(value: f32) -> Self {
        let trend = if value < 0.0 {
            DeltaTrend::Slower
        } else {
            DeltaTrend::Faster
        };
        Self { value, trend }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LapEvents {
    pub completed: Option<LapRecord>,
    pub new_best: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LapReadout {
    pub number: i16,
    pub time_ms: i32,
    pub delta_to_best_ms: Option<i32>,
    pub is_best: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SessionReadout {
    pub current_lap: i16,
    pub total_laps: Option<i16>,
    pub last_lap_ms: Option<i32>,
    pub best_lap_ms: Option<i32>,
    pub best_lap_number: Option<i16>,
    pub laps: Vec<LapReadout>,
    pub speed_delta: Option<SpeedDelta>,
    pub max_speed_kmh: f32,
}

#[derive(Clone, Debug, Default)]
pub struct SessionTracker {
    current_lap: i16,
    previous_lap: i16,
    total_laps: Option<i16>,
    last_lap_ms: Option<i32>,
    best_lap_ms: Option<i32>,
    best_lap_number: Option<i16>,
    laps: Vec<LapRecord>,
    current_samples: Vec<LapSample>,
    best_samples: Vec<LapSample>,
    speed_delta: Option<SpeedDelta>,
    max_speed_kmh: f32,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn apply_snapshot(&mut self, snapshot: &Snapshot, sample_time: u64) -> LapEvents {
        let mut events = LapEvents::default();
        self.current_lap = snapshot.lap_number();
        if snapshot.total_laps.is_some() {
            self.total_laps = snapshot.total_laps;
        }

        if self.current_lap > self.previous_lap && self.previous_lap > 0 {
            if let Some(lap_ms) = snapshot.last_laptime.filter(|ms| *ms > 0) {
                let record = LapRecord {
                    number: self.previous_lap,
                    time_ms: lap_ms,
                };
                events.new_best = self.record_lap(record);
                events.completed = Some(record);
                self.last_lap_ms = Some(lap_ms);
            }
            self.current_samples.clear();
        }
        self.previous_lap = self.current_lap;

        self.current_samples.push(snapshot.lap_sample(sample_time));
        self.speed_delta = self.compute_speed_delta();

        if let Some(speed) = snapshot.speed_kmh {
            if speed > self.max_speed_kmh {
                self.max_speed_kmh = speed;
            }
        }
        events
    }

    /// Upserts a completed lap; returns true when it becomes the new best.
    fn record_lap(&mut self, record: LapRecord) -> bool {
        match self.laps.iter_mut().find(|lap| lap.number == record.number) {
            Some(existing) => *existing = record,
            None => self.laps.push(record),
        }

        let faster = self
            .best_lap_ms
            .map(|best| record.time_ms < best)
            .unwrap_or(true);
        if faster {
            self.best_lap_ms = Some(record.time_ms);
            self.best_lap_number = Some(record.number);
            self.best_samples = self.current_samples.clone();
        }
        faster
    }

    // Positional match: the same sample index in both laps stands in for the same track point.
    fn compute_speed_delta(&self) -> Option<SpeedDelta> {
        if self.best_samples.is_empty() || self.current_samples.is_empty() {
            return None;
        }
        let idx = (self.current_samples.len() - 1).min(self.best_samples.len() - 1);
        let delta = self.current_samples[idx].speed - self.best_samples[idx].speed;
        Some(SpeedDelta::new(delta))
    }

    pub fn current_lap(&self) -> i16 {
        self.current_lap
    }

    pub fn best_lap_ms(&self) -> Option<i32> {
        self.best_lap_ms
    }

    pub fn best_lap_number(&self) -> Option<i16> {
        self.best_lap_number
    }

    pub fn laps(&self) -> &[LapRecord] {
        &self.laps
    }

    pub fn current_samples(&self) -> &[LapSample] {
        &self.current_samples
    }

    pub fn best_samples(&self) -> &[LapSample] {
        &self.best_samples
    }

    pub fn speed_delta(&self) -> Option<SpeedDelta> {
        self.speed_delta
    }

    pub fn max_speed_kmh(&self) -> f32 {
        self.max_speed_kmh
    }

    pub fn readout(&self) -> SessionReadout {
        let laps = self
            .laps
            .iter()
            .map(|lap| LapReadout {
                number: lap.number,
                time_ms: lap.time_ms,
                delta_to_best_ms: self.best_lap_ms.map(|best| lap.time_ms - best),
                is_best: self.best_lap_number == Some(lap.number),
            })
            .collect();

        SessionReadout {
            current_lap: self.current_lap,
            total_laps: self.total_laps,
            last_lap_ms: self.last_lap_ms,
            best_lap_ms: self.best_lap_ms,
            best_lap_number: self.best_lap_number,
            laps,
            speed_delta: self.speed_delta,
            max_speed_kmh: self.max_speed_kmh,
        }
    }
}
