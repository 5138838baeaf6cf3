// Owned dashboard context tying the connection, coalescer, session, and dispatcher together.
// Invariants: all mutation happens through `&mut self` from a single event loop; instances share nothing.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::coalescer::FrameCoalescer;
use crate::connection::{endpoint_for_origin, ConnectionManager, ConnectionState, ReconnectConfig};
use crate::demo::DemoSource;
use crate::dispatch::{CategoryIntervals, DispatchReport, Dispatcher};
use crate::error::EndpointError;
use crate::format::format_lap_time;
use crate::model::Snapshot;
use crate::render::{LinkStatus, RenderFrame, RenderTargets};
use crate::session::{SessionReadout, SessionTracker};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    pub reconnect: ReconnectConfig,
    pub intervals: CategoryIntervals,
    pub demo_seed: u64,
}

pub struct DashboardClient {
    connection: ConnectionManager,
    coalescer: FrameCoalescer,
    session: SessionTracker,
    dispatcher: Dispatcher,
    targets: RenderTargets,
    demo: DemoSource,
    demo_active: bool,
    packet_count: u64,
    sample_time: u64,
    link_status: LinkStatus,
    last_snapshot: Option<Snapshot>,
}

impl DashboardClient {
    pub fn new(settings: DashboardSettings, targets: RenderTargets) -> Self {
        Self {
            connection: ConnectionManager::new(settings.reconnect),
            coalescer: FrameCoalescer::new(),
            session: SessionTracker::new(),
            dispatcher: Dispatcher::new(settings.intervals),
            targets,
            demo: DemoSource::new(settings.demo_seed),
            demo_active: false,
            packet_count: 0,
            sample_time: 0,
            link_status: LinkStatus::Disconnected,
            last_snapshot: None,
        }
    }

    pub fn endpoint(origin: &str) -> Result<Url, EndpointError> {
        endpoint_for_origin(origin)
    }

    pub fn connect(&mut self) {
        self.connection.begin_connect();
    }

    pub fn on_open(&mut self) {
        let event = self.connection.on_open();
        if event.first_open {
            debug!("initializing render targets");
        }
        self.targets.ensure_initialized();
        self.show_status(LinkStatus::Connected);
    }

    pub fn on_error(&mut self, reason: &str) {
        self.connection.on_error(reason);
    }

    /// Returns the reconnect delay when the caller must arm a new timer.
    pub fn on_close(&mut self) -> Option<u64> {
        let delay_ms = self.connection.on_close();
        self.show_status(LinkStatus::Reconnecting);
        delay_ms
    }

    pub fn reconnect_fired(&mut self) {
        self.connection.reconnect_fired();
    }

    /// Buffers a raw message. Returns true when the caller must request a display tick.
    pub fn on_message(&mut self, raw: String) -> bool {
        self.packet_count = self.packet_count.saturating_add(1);
        self.coalescer.push(raw)
    }

    /// Display tick: processes the newest pending message, if one was requested.
    pub fn tick(&mut self, now_ms: f64) -> Option<DispatchReport> {
        if !self.coalescer.is_scheduled() {
            return None;
        }
        let snapshot = self.coalescer.drain()?;
        Some(self.process_snapshot(&snapshot, now_ms))
    }

    pub fn process_snapshot(&mut self, snapshot: &Snapshot, now_ms: f64) -> DispatchReport {
        self.sample_time = self.sample_time.saturating_add(1);
        let events = self.session.apply_snapshot(snapshot, self.sample_time);
        if let Some(lap) = events.completed {
            info!(
                lap = lap.number,
                time = %format_lap_time(Some(lap.time_ms)),
                new_best = events.new_best,
                "lap completed"
            );
        }

        let frame = RenderFrame {
            now_ms,
            snapshot,
            session: &self.session,
        };
        let report = self.dispatcher.dispatch(&frame, &mut self.targets);
        self.last_snapshot = Some(snapshot.clone());
        report
    }

    pub fn set_demo(&mut self, active: bool) {
        if active == self.demo_active {
            return;
        }
        self.demo_active = active;
        self.demo.reset();
        if active {
            info!("demo mode enabled");
            self.targets.ensure_initialized();
            self.targets.status.show(LinkStatus::TestMode);
            self.link_status = LinkStatus::TestMode;
        } else {
            info!("demo mode disabled");
            self.reset_session();
            self.targets.reset();
            let status = if self.connection.state() == ConnectionState::Open {
                LinkStatus::Connected
            } else {
                LinkStatus::Disconnected
            };
            self.targets.status.show(status);
            self.link_status = status;
        }
    }

    pub fn demo_active(&self) -> bool {
        self.demo_active
    }

    /// Emits one synthetic snapshot through the live processing path.
    pub fn demo_step(&mut self, now_ms: f64) -> Option<DispatchReport> {
        if !self.demo_active {
            return None;
        }
        let snapshot = self.demo.next_snapshot();
        self.packet_count = self.packet_count.saturating_add(1);
        Some(self.process_snapshot(&snapshot, now_ms))
    }

    pub fn reset_session(&mut self) {
        self.session.reset();
        self.sample_time = 0;
    }

    pub fn readout(&self) -> SessionReadout {
        self.session.readout()
    }

    /// The most recently processed snapshot, live or synthetic.
    pub fn last_snapshot(&self) -> Option<&Snapshot> {
        self.last_snapshot.as_ref()
    }

    pub fn session(&self) -> &SessionTracker {
        &self.session
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    pub fn packet_count(&self) -> u64 {
        self.packet_count
    }

    pub fn frames_dropped(&self) -> u64 {
        self.coalescer.dropped()
    }

    pub fn frames_malformed(&self) -> u64 {
        self.coalescer.malformed()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn reconnect_delay_ms(&self) -> u64 {
        self.connection.reconnect_delay_ms()
    }

    pub fn link_status(&self) -> LinkStatus {
        self.link_status
    }

    pub fn targets_initialized(&self) -> bool {
        self.targets.is_initialized()
    }

    // Demo mode owns the indicator until it is switched off.
    fn show_status(&mut self, status: LinkStatus) {
        if self.demo_active {
            return;
        }
        self.targets.status.show(status);
        self.link_status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Category;
    use crate::error::RenderError;
    use crate::render::{NoopTarget, RenderTarget};

    fn client() -> DashboardClient {
        DashboardClient::new(DashboardSettings::default(), RenderTargets::headless())
    }

    #[test]
    fn burst_of_messages_processes_only_the_last() {
        let mut client = client();
        client.connect();
        client.on_open();

        let mut requests = 0;
        for lap in 1..=5 {
            if client.on_message(format!(r#"{{"lap_count": {lap}, "speed_kmh": {}}}"#, lap * 10)) {
                requests += 1;
            }
        }
        assert_eq!(requests, 1);
        assert_eq!(client.packet_count(), 5);

        let report = client.tick(16.0).expect("one processed frame");
        assert!(report.rendered(Category::Ui));
        assert_eq!(client.session().current_samples().len(), 1);
        assert_eq!(client.session().current_samples()[0].speed, 50.0);
        assert_eq!(client.readout().current_lap, 5);
        assert_eq!(client.last_snapshot().and_then(|s| s.speed_kmh), Some(50.0));

        assert!(client.tick(32.0).is_none());
    }

    #[test]
    fn malformed_message_leaves_session_untouched() {
        let mut client = client();
        client.on_message(r#"{"lap_count": 1, "speed_kmh": 100}"#.to_string());
        client.tick(0.0);
        let before = client.readout();

        assert!(client.on_message("GT7 <html>".to_string()));
        assert!(client.tick(16.0).is_none());
        assert_eq!(client.readout(), before);
        assert_eq!(client.frames_malformed(), 1);

        client.on_message(r#"{"lap_count": 1, "speed_kmh": 130}"#.to_string());
        assert!(client.tick(32.0).is_some());
        assert_eq!(client.readout().max_speed_kmh, 130.0);
    }

    #[test]
    fn close_reports_status_and_backoff() {
        let mut client = client();
        client.connect();
        assert_eq!(client.on_close(), Some(2_000));
        assert_eq!(client.link_status(), LinkStatus::Reconnecting);
        assert_eq!(client.on_close(), None);

        client.reconnect_fired();
        client.on_open();
        assert_eq!(client.link_status(), LinkStatus::Connected);
        assert!(client.targets_initialized());
        assert_eq!(client.reconnect_delay_ms(), 2_000);
    }

    #[test]
    fn demo_mode_feeds_the_tracker_and_resets_on_exit() {
        let mut client = client();
        assert!(client.demo_step(0.0).is_none());

        client.set_demo(true);
        assert_eq!(client.link_status(), LinkStatus::TestMode);
        assert!(client.targets_initialized());

        for step in 0..45 {
            client.demo_step(step as f64 * 200.0).expect("demo frame");
        }
        assert_eq!(client.packet_count(), 45);
        let readout = client.readout();
        assert_eq!(readout.current_lap, 3);
        assert_eq!(readout.laps.len(), 2);
        assert!(readout.best_lap_ms.is_some());

        client.on_close();
        assert_eq!(client.link_status(), LinkStatus::TestMode);

        client.set_demo(false);
        assert_eq!(client.link_status(), LinkStatus::Disconnected);
        assert_eq!(client.readout(), SessionReadout::default());
    }

    #[derive(Clone, Default)]
    struct Resets(std::sync::Arc<std::sync::Mutex<Vec<&'static str>>>);

    struct ResetCounting {
        name: &'static str,
        resets: Resets,
    }

    impl RenderTarget for ResetCounting {
        fn reset(&mut self) {
            self.resets.0.lock().unwrap().push(self.name);
        }

        fn render(&mut self, _frame: &RenderFrame<'_>) -> Result<(), RenderError> {
            Ok(())
        }
    }

    #[test]
    fn leaving_demo_mode_clears_accumulated_displays() {
        let resets = Resets::default();
        let target = |name| Box::new(ResetCounting { name, resets: resets.clone() });
        let targets = RenderTargets::new(
            target("ui"),
            target("rotation"),
            target("map"),
            target("charts"),
            Box::new(NoopTarget),
            Box::new(NoopTarget),
        );
        let mut client = DashboardClient::new(DashboardSettings::default(), targets);

        client.set_demo(true);
        client.demo_step(0.0);
        assert!(resets.0.lock().unwrap().is_empty());

        client.set_demo(false);
        assert_eq!(*resets.0.lock().unwrap(), vec!["ui", "rotation", "map", "charts"]);
    }

    #[test]
    fn independent_instances_do_not_share_state() {
        let mut a = client();
        let b = client();
        a.on_message(r#"{"speed_kmh": 200}"#.to_string());
        a.tick(0.0);
        assert_eq!(a.readout().max_speed_kmh, 200.0);
        assert_eq!(b.readout().max_speed_kmh, 0.0);
        assert_eq!(b.packet_count(), 0);
    }
}
