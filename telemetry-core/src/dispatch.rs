// Multi-rate fan-out of the latest snapshot to independently clocked display categories.
// Invariants: a category renders only when `now - last >= interval`; one failing target
// never prevents the remaining categories from running.

use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::{CHARTS_INTERVAL_MS, MAP_INTERVAL_MS, ROTATION_INTERVAL_MS, UI_INTERVAL_MS};
use crate::error::RenderError;
use crate::render::{RenderFrame, RenderTarget, RenderTargets};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Ui,
    Rotation,
    Map,
    Charts,
}

impl Category {
    /// Render order within one tick.
    pub const ALL: [Category; 4] = [
        Category::Ui,
        Category::Rotation,
        Category::Map,
        Category::Charts,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Ui => "ui",
            Category::Rotation => "rotation",
            Category::Map => "map",
            Category::Charts => "charts",
        }
    }

    fn index(self) -> usize {
        match self {
            Category::Ui => 0,
            Category::Rotation => 1,
            Category::Map => 2,
            Category::Charts => 3,
        }
    }
}

/// Milliseconds between permitted repaints, per category.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryIntervals {
    pub ui: f64,
    pub charts: f64,
    pub map: f64,
    pub rotation: f64,
}

impl CategoryIntervals {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Ui => self.ui,
            Category::Rotation => self.rotation,
            Category::Map => self.map,
            Category::Charts => self.charts,
        }
    }
}

impl Default for CategoryIntervals {
    fn default() -> Self {
        Self {
            ui: UI_INTERVAL_MS,
            charts: CHARTS_INTERVAL_MS,
            map: MAP_INTERVAL_MS,
            rotation: ROTATION_INTERVAL_MS,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct CategoryClocks {
    last: [Option<f64>; 4],
}

impl CategoryClocks {
    pub fn last_update(&self, category: Category) -> Option<f64> {
        self.last[category.index()]
    }

    pub fn is_due(&self, category: Category, now_ms: f64, interval_ms: f64) -> bool {
        match self.last[category.index()] {
            Some(last) => now_ms - last >= interval_ms,
            None => true,
        }
    }

    pub fn mark(&mut self, category: Category, now_ms: f64) {
        self.last[category.index()] = Some(now_ms);
    }

    pub fn reset(&mut self) {
        self.last = [None; 4];
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DispatchReport {
    pub rendered: Vec<Category>,
    pub failed: Vec<(Category, RenderError)>,
    pub pose_fed: bool,
}

impl DispatchReport {
    pub fn rendered(&self, category: Category) -> bool {
        self.rendered.contains(&category)
    }
}

#[derive(Debug, Default)]
pub struct Dispatcher {
    intervals: CategoryIntervals,
    clocks: CategoryClocks,
}

impl Dispatcher {
    pub fn new(intervals: CategoryIntervals) -> Self {
        Self {
            intervals,
            clocks: CategoryClocks::default(),
        }
    }

    pub fn intervals(&self) -> &CategoryIntervals {
        &self.intervals
    }

    pub fn set_intervals(&mut self, intervals: CategoryIntervals) {
        self.intervals = intervals;
    }

    pub fn clocks(&self) -> &CategoryClocks {
        &self.clocks
    }

    pub fn dispatch(&mut self, frame: &RenderFrame<'_>, targets: &mut RenderTargets) -> DispatchReport {
        let mut report = DispatchReport::default();

        for category in Category::ALL {
            if category == Category::Rotation {
                report.pose_fed = feed_pose(frame, targets);
            }
            if !self
                .clocks
                .is_due(category, frame.now_ms, self.intervals.get(category))
            {
                continue;
            }
            if category == Category::Map && frame.snapshot.position_xz().is_none() {
                continue;
            }

            let target: &mut dyn RenderTarget = match category {
                Category::Ui => targets.ui.as_mut(),
                Category::Rotation => targets.rotation.as_mut(),
                Category::Map => targets.map.as_mut(),
                Category::Charts => targets.charts.as_mut(),
            };
            match isolate(|| target.render(frame)) {
                Ok(()) => report.rendered.push(category),
                Err(err) => {
                    warn!(category = category.as_str(), %err, "render target failed");
                    report.failed.push((category, err));
                }
            }
            self.clocks.mark(category, frame.now_ms);
        }

        report
    }
}

fn feed_pose(frame: &RenderFrame<'_>, targets: &mut RenderTargets) -> bool {
    let pose = frame.snapshot.pose();
    match isolate(|| targets.pose.feed(frame.now_ms, &pose)) {
        Ok(()) => true,
        Err(err) => {
            warn!(%err, "pose target failed");
            false
        }
    }
}

fn isolate<F>(render: F) -> Result<(), RenderError>
where
    F: FnOnce() -> Result<(), RenderError>,
{
    match panic::catch_unwind(AssertUnwindSafe(render)) {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "panic".to_string());
            Err(RenderError::Failed(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::model::{Pose, Snapshot};
    use crate::render::{NoopTarget, PoseTarget};
    use crate::session::SessionTracker;

    #[derive(Clone, Default)]
    struct Calls(Arc<Mutex<Vec<&'static str>>>);

    impl Calls {
        fn count(&self, name: &str) -> usize {
            self.0.lock().unwrap().iter().filter(|n| **n == name).count()
        }

        fn names(&self) -> Vec<&'static str> {
            self.0.lock().unwrap().clone()
        }
    }

    struct Recording {
        name: &'static str,
        calls: Calls,
    }

    impl RenderTarget for Recording {
        fn render(&mut self, _frame: &RenderFrame<'_>) -> Result<(), RenderError> {
            self.calls.0.lock().unwrap().push(self.name);
            Ok(())
        }
    }

    impl PoseTarget for Recording {
        fn feed(&mut self, _now_ms: f64, _pose: &Pose) -> Result<(), RenderError> {
            self.calls.0.lock().unwrap().push(self.name);
            Ok(())
        }
    }

    struct Failing;

    impl RenderTarget for Failing {
        fn render(&mut self, _frame: &RenderFrame<'_>) -> Result<(), RenderError> {
            Err(RenderError::Failed("canvas lost".to_string()))
        }
    }

    struct Panicking;

    impl RenderTarget for Panicking {
        fn render(&mut self, _frame: &RenderFrame<'_>) -> Result<(), RenderError> {
            panic!("chart exploded");
        }
    }

    fn recording_targets(calls: &Calls) -> RenderTargets {
        let target = |name| Box::new(Recording { name, calls: calls.clone() });
        RenderTargets::new(
            target("ui"),
            target("rotation"),
            target("map"),
            target("charts"),
            target("pose"),
            Box::new(NoopTarget),
        )
    }

    fn positioned() -> Snapshot {
        Snapshot {
            position_x: Some(10.0),
            position_z: Some(-4.0),
            speed_kmh: Some(120.0),
            ..Snapshot::default()
        }
    }

    #[test]
    fn categories_render_in_fixed_order_with_pose_before_rotation() {
        let calls = Calls::default();
        let mut targets = recording_targets(&calls);
        let mut dispatcher = Dispatcher::default();
        let session = SessionTracker::new();
        let snapshot = positioned();

        let frame = RenderFrame { now_ms: 0.0, snapshot: &snapshot, session: &session };
        let report = dispatcher.dispatch(&frame, &mut targets);

        assert_eq!(calls.names(), vec!["ui", "pose", "rotation", "map", "charts"]);
        assert_eq!(report.rendered, Category::ALL.to_vec());
        assert!(report.pose_fed);
    }

    #[test]
    fn slow_category_does_not_hold_back_fast_one() {
        let calls = Calls::default();
        let mut targets = recording_targets(&calls);
        let mut dispatcher = Dispatcher::new(CategoryIntervals {
            ui: 10.0,
            charts: 500.0,
            ..CategoryIntervals::default()
        });
        let session = SessionTracker::new();
        let snapshot = positioned();

        let mut now = 16.0;
        while now <= 1000.0 {
            let frame = RenderFrame { now_ms: now, snapshot: &snapshot, session: &session };
            dispatcher.dispatch(&frame, &mut targets);
            now += 16.0;
        }

        let ui = calls.count("ui");
        let charts = calls.count("charts");
        assert!(ui >= 55, "ui rendered {ui} times");
        assert!((1..=3).contains(&charts), "charts rendered {charts} times");
        assert_eq!(calls.count("pose"), ui);
    }

    #[test]
    fn pose_is_fed_every_frame_but_readout_is_throttled() {
        let calls = Calls::default();
        let mut targets = recording_targets(&calls);
        let mut dispatcher = Dispatcher::default();
        let session = SessionTracker::new();
        let snapshot = positioned();

        for now in [0.0, 5.0, 10.0, 15.0] {
            let frame = RenderFrame { now_ms: now, snapshot: &snapshot, session: &session };
            dispatcher.dispatch(&frame, &mut targets);
        }

        assert_eq!(calls.count("pose"), 4);
        assert_eq!(calls.count("rotation"), 1);
    }

    #[test]
    fn map_waits_for_a_position() {
        let calls = Calls::default();
        let mut targets = recording_targets(&calls);
        let mut dispatcher = Dispatcher::default();
        let session = SessionTracker::new();
        let no_position = Snapshot { speed_kmh: Some(80.0), ..Snapshot::default() };

        let frame = RenderFrame { now_ms: 0.0, snapshot: &no_position, session: &session };
        let report = dispatcher.dispatch(&frame, &mut targets);
        assert!(!report.rendered(Category::Map));
        assert_eq!(dispatcher.clocks().last_update(Category::Map), None);

        let snapshot = positioned();
        let frame = RenderFrame { now_ms: 1.0, snapshot: &snapshot, session: &session };
        let report = dispatcher.dispatch(&frame, &mut targets);
        assert!(report.rendered(Category::Map));
        assert_eq!(dispatcher.clocks().last_update(Category::Map), Some(1.0));
    }

    #[test]
    fn failing_targets_are_isolated() {
        let calls = Calls::default();
        let mut targets = recording_targets(&calls);
        targets.ui = Box::new(Failing);
        targets.charts = Box::new(Panicking);
        let mut dispatcher = Dispatcher::default();
        let session = SessionTracker::new();
        let snapshot = positioned();

        let frame = RenderFrame { now_ms: 0.0, snapshot: &snapshot, session: &session };
        let report = dispatcher.dispatch(&frame, &mut targets);

        assert_eq!(report.rendered, vec![Category::Rotation, Category::Map]);
        assert_eq!(report.failed.len(), 2);
        assert_eq!(report.failed[0].0, Category::Ui);
        assert_eq!(
            report.failed[1],
            (Category::Charts, RenderError::Failed("chart exploded".to_string()))
        );
        assert_eq!(dispatcher.clocks().last_update(Category::Charts), Some(0.0));

        let frame = RenderFrame { now_ms: 200.0, snapshot: &snapshot, session: &session };
        let report = dispatcher.dispatch(&frame, &mut targets);
        assert!(report.rendered(Category::Map));
    }
}
