// Dashboard event loop: one task owns the client and multiplexes socket, timers, and shutdown.
// Invariants: at most one live socket task and one armed reconnect deadline; events from a
// superseded socket are discarded.

use std::future::Future;
use std::time::Duration;

use telemetry_core::DashboardClient;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, trace};
use url::Url;

use crate::constants::{SOCKET_EVENT_BUFFER, STATS_INTERVAL_SECS};
use crate::transport::{Connector, SocketEvent, TransportEvent};
use crate::utils::monotonic_ms;

#[derive(Clone, Copy, Debug)]
pub struct LoopTiming {
    pub tick: Duration,
    pub demo: Duration,
}

struct Socket {
    connection_id: u64,
    task: Option<JoinHandle<()>>,
}

impl Socket {
    fn open<C: Connector>(&mut self, connector: &C, url: &Url, events: &mpsc::Sender<SocketEvent>) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.connection_id += 1;
        self.task = Some(connector.connect(self.connection_id, url.clone(), events.clone()));
    }

    fn close(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Runs until `shutdown` resolves and hands the client back.
pub async fn dashboard_loop<C, S>(
    mut client: DashboardClient,
    connector: C,
    url: Url,
    timing: LoopTiming,
    shutdown: S,
) -> DashboardClient
where
    C: Connector,
    S: Future<Output = ()>,
{
    let start = Instant::now();
    let (events_tx, mut events_rx) = mpsc::channel::<SocketEvent>(SOCKET_EVENT_BUFFER);

    let mut tick = time::interval_at(start + timing.tick, timing.tick);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut demo = time::interval(timing.demo);
    demo.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let stats_every = Duration::from_secs(STATS_INTERVAL_SECS);
    let mut stats = time::interval_at(start + stats_every, stats_every);

    let mut socket = Socket {
        connection_id: 0,
        task: None,
    };
    let mut reconnect_at: Option<Instant> = None;
    let mut tick_requested = false;

    client.connect();
    socket.open(&connector, &url, &events_tx);

    tokio::pin!(shutdown);
    loop {
        // Placeholder deadline; the branch is disabled while no reconnect is armed.
        let reconnect_deadline = reconnect_at.unwrap_or_else(|| Instant::now() + stats_every);

        tokio::select! {
            biased;

            _ = &mut shutdown => {
                info!("shutting down");
                break;
            }
            _ = tick.tick(), if tick_requested => {
                tick_requested = false;
                if let Some(report) = client.tick(monotonic_ms(start)) {
                    trace!(rendered = ?report.rendered, failed = report.failed.len(), "tick");
                }
            }
            Some(SocketEvent { connection_id, event }) = events_rx.recv() => {
                if connection_id != socket.connection_id {
                    debug!(connection_id, "dropping event from superseded socket");
                    continue;
                }
                match event {
                    TransportEvent::Open => client.on_open(),
                    TransportEvent::Message(raw) => {
                        if client.on_message(raw) {
                            // First message of a burst: the pass runs one full period from now.
                            tick.reset();
                            tick_requested = true;
                        }
                    }
                    TransportEvent::Error(reason) => client.on_error(&reason),
                    TransportEvent::Closed => {
                        socket.task = None;
                        if let Some(delay_ms) = client.on_close() {
                            reconnect_at = Some(Instant::now() + Duration::from_millis(delay_ms));
                        }
                    }
                }
            }
            _ = time::sleep_until(reconnect_deadline), if reconnect_at.is_some() => {
                reconnect_at = None;
                client.reconnect_fired();
                socket.open(&connector, &url, &events_tx);
            }
            _ = demo.tick(), if client.demo_active() => {
                client.demo_step(monotonic_ms(start));
            }
            _ = stats.tick() => {
                info!(
                    packets = client.packet_count(),
                    coalesced = client.frames_dropped(),
                    malformed = client.frames_malformed(),
                    state = client.connection_state().as_str(),
                    status = client.link_status().label(),
                    "dashboard stats"
                );
            }
        }
    }

    socket.close();
    client
}
