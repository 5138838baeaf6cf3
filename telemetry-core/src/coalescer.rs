// Latest-wins frame buffer between message arrival and the display tick.
// Invariants: `scheduled` is true iff a tick was requested and has not drained yet;
// a new message overwrites the pending payload instead of queueing behind it.

use tracing::warn;

use crate::error::SnapshotError;
use crate::model::Snapshot;

pub fn parse_snapshot(raw: &str) -> Result<Snapshot, SnapshotError> {
    if raw.trim().is_empty() {
        return Err(SnapshotError::Empty);
    }
    Ok(serde_json::from_str(raw)?)
}

#[derive(Debug, Default)]
pub struct FrameCoalescer {
    pending: Option<String>,
    scheduled: bool,
    dropped: u64,
    malformed: u64,
}

impl FrameCoalescer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `raw` as the pending frame. Returns true when the caller must request a tick.
    pub fn push(&mut self, raw: String) -> bool {
        if self.pending.replace(raw).is_some() {
            self.dropped = self.dropped.saturating_add(1);
        }
        if self.scheduled {
            return false;
        }
        self.scheduled = true;
        true
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Messages overwritten before they were processed.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn malformed(&self) -> u64 {
        self.malformed
    }

    /// Runs one processing pass for the current tick.
    pub fn drain(&mut self) -> Option<Snapshot> {
        self.scheduled = false;
        let raw = self.pending.take()?;
        match parse_snapshot(&raw) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                self.malformed = self.malformed.saturating_add(1);
                warn!(%err, len = raw.len(), "dropping malformed frame");
                None
            }
        }
    }
}
