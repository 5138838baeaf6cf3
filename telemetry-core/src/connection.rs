// Streaming connection lifecycle and reconnect backoff.
// Invariants: at most one reconnect timer is outstanding; the delay only resets on a successful open.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::Url;

use crate::constants::{
    RECONNECT_DELAY_INITIAL_MS, RECONNECT_DELAY_MAX_MS, RECONNECT_DELAY_MULTIPLIER, WS_PATH,
};
use crate::error::EndpointError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Idle,
    Connecting,
    Open,
    Closed,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Closed => "closed",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReconnectConfig {
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
}

impl ReconnectConfig {
    /// First delay of a backoff run; never above the cap.
    pub fn starting_delay_ms(&self) -> u64 {
        self.initial_delay_ms.min(self.max_delay_ms)
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: RECONNECT_DELAY_INITIAL_MS,
            max_delay_ms: RECONNECT_DELAY_MAX_MS,
            multiplier: RECONNECT_DELAY_MULTIPLIER,
        }
    }
}

/// Outcome of a successful open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpenEvent {
    /// True only for the first open of this manager's lifetime.
    pub first_open: bool,
}

/// Derives the stream endpoint from the page origin, mirroring its security level.
pub fn endpoint_for_origin(origin: &str) -> Result<Url, EndpointError> {
    let origin = Url::parse(origin)?;
    let scheme = match origin.scheme() {
        "https" | "wss" => "wss",
        "http" | "ws" => "ws",
        other => return Err(EndpointError::UnsupportedScheme(other.to_string())),
    };
    let host = origin.host_str().ok_or(EndpointError::MissingHost)?;
    let authority = match origin.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };
    Ok(Url::parse(&format!("{scheme}://{authority}{WS_PATH}"))?)
}

#[derive(Debug)]
pub struct ConnectionManager {
    config: ReconnectConfig,
    state: ConnectionState,
    reconnect_delay_ms: u64,
    reconnect_pending: bool,
    opened_once: bool,
    attempts: u64,
}

impl ConnectionManager {
    pub fn new(config: ReconnectConfig) -> Self {
        let reconnect_delay_ms = config.starting_delay_ms();
        Self {
            config,
            state: ConnectionState::Idle,
            reconnect_delay_ms,
            reconnect_pending: false,
            opened_once: false,
            attempts: 0,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Delay the next scheduled reconnect will wait.
    pub fn reconnect_delay_ms(&self) -> u64 {
        self.reconnect_delay_ms
    }

    pub fn reconnect_pending(&self) -> bool {
        self.reconnect_pending
    }

    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    pub fn begin_connect(&mut self) {
        self.attempts = self.attempts.saturating_add(1);
        self.state = ConnectionState::Connecting;
    }

    pub fn on_open(&mut self) -> OpenEvent {
        info!(attempts = self.attempts, "stream connected");
        self.state = ConnectionState::Open;
        self.reconnect_delay_ms = self.config.starting_delay_ms();
        let first_open = !self.opened_once;
        self.opened_once = true;
        OpenEvent { first_open }
    }

    /// Errors are followed by a close; recovery happens there.
    pub fn on_error(&mut self, reason: &str) {
        warn!(reason, state = self.state.as_str(), "stream error");
    }

    /// Returns the delay to wait before reconnecting, or `None` when a reconnect is already scheduled.
    pub fn on_close(&mut self) -> Option<u64> {
        self.state = ConnectionState::Closed;
        if self.reconnect_pending {
            return None;
        }
        let delay_ms = self.reconnect_delay_ms;
        self.reconnect_pending = true;
        let grown = (delay_ms as f64 * self.config.multiplier).round();
        self.reconnect_delay_ms = grown
            .min(self.config.max_delay_ms as f64)
            .max(self.config.starting_delay_ms() as f64)
            as u64;
        info!(delay_ms, "stream closed, reconnect scheduled");
        Some(delay_ms)
    }

    /// Called when the scheduled reconnect timer fires.
    pub fn reconnect_fired(&mut self) {
        self.reconnect_pending = false;
        self.begin_connect();
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new(ReconnectConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_mirrors_origin_security() {
        let secure = endpoint_for_origin("https://dash.local").unwrap();
        assert_eq!(secure.as_str(), "wss://dash.local/ws");

        let plain = endpoint_for_origin("http://127.0.0.1:8080/index.html").unwrap();
        assert_eq!(plain.as_str(), "ws://127.0.0.1:8080/ws");
    }

    #[test]
    fn endpoint_rejects_unsupported_scheme() {
        assert_eq!(
            endpoint_for_origin("file:///tmp/index.html"),
            Err(EndpointError::UnsupportedScheme("file".to_string()))
        );
        assert!(matches!(
            endpoint_for_origin("not a url"),
            Err(EndpointError::InvalidOrigin(_))
        ));
    }

    #[test]
    fn backoff_grows_monotonically_and_caps() {
        let mut manager = ConnectionManager::default();
        manager.begin_connect();

        let mut delays = Vec::new();
        for _ in 0..12 {
            let delay = manager.on_close().expect("reconnect scheduled");
            delays.push(delay);
            manager.reconnect_fired();
        }

        assert_eq!(&delays[..4], &[2_000, 3_000, 4_500, 6_750]);
        assert!(delays.windows(2).all(|pair| pair[0] <= pair[1]));
        assert!(delays.iter().all(|delay| *delay <= 30_000));
        assert_eq!(*delays.last().unwrap(), 30_000);
    }

    #[test]
    fn open_resets_backoff() {
        let mut manager = ConnectionManager::default();
        manager.begin_connect();
        manager.on_close();
        manager.reconnect_fired();
        manager.on_close();
        manager.reconnect_fired();
        assert_eq!(manager.reconnect_delay_ms(), 4_500);

        let event = manager.on_open();
        assert!(event.first_open);
        assert_eq!(manager.state(), ConnectionState::Open);
        assert_eq!(manager.reconnect_delay_ms(), 2_000);

        assert_eq!(manager.on_close(), Some(2_000));
        manager.reconnect_fired();
        assert!(!manager.on_open().first_open);
    }

    #[test]
    fn initial_delay_above_the_cap_is_clamped() {
        let mut manager = ConnectionManager::new(ReconnectConfig {
            initial_delay_ms: 5_000,
            max_delay_ms: 3_000,
            multiplier: 1.5,
        });
        assert_eq!(manager.reconnect_delay_ms(), 3_000);

        manager.begin_connect();
        assert_eq!(manager.on_close(), Some(3_000));
        manager.reconnect_fired();
        manager.on_open();
        assert_eq!(manager.reconnect_delay_ms(), 3_000);
        assert_eq!(manager.on_close(), Some(3_000));
    }

    #[test]
    fn duplicate_close_does_not_schedule_twice() {
        let mut manager = ConnectionManager::default();
        manager.begin_connect();
        manager.on_error("connection refused");
        assert_eq!(manager.state(), ConnectionState::Connecting);

        assert_eq!(manager.on_close(), Some(2_000));
        assert_eq!(manager.on_close(), None);
        assert!(manager.reconnect_pending());
        assert_eq!(manager.reconnect_delay_ms(), 3_000);

        manager.reconnect_fired();
        assert!(!manager.reconnect_pending());
        assert_eq!(manager.state(), ConnectionState::Connecting);
        assert_eq!(manager.attempts(), 2);
    }
}
