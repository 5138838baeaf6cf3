// Connection indicator that reports link status transitions through the log.

use telemetry_core::render::{LinkStatus, StatusIndicator};
use tracing::{info, warn};

#[derive(Debug, Default)]
pub struct LogStatus {
    current: Option<LinkStatus>,
}

impl LogStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<LinkStatus> {
        self.current
    }
}

impl StatusIndicator for LogStatus {
    fn show(&mut self, status: LinkStatus) {
        if self.current == Some(status) {
            return;
        }
        self.current = Some(status);
        match status {
            LinkStatus::Reconnecting | LinkStatus::Disconnected => {
                warn!(status = status.label(), "link status")
            }
            LinkStatus::Connected | LinkStatus::TestMode => {
                info!(status = status.label(), "link status")
            }
        }
    }
}
