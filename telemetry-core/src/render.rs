// Render target seams consumed by the dispatcher.

use serde::Serialize;
use tracing::debug;

use crate::error::RenderError;
use crate::model::{Pose, Snapshot};
use crate::session::SessionTracker;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    Connected,
    Reconnecting,
    Disconnected,
    TestMode,
}

impl LinkStatus {
    pub fn label(&self) -> &'static str {
        match self {
            LinkStatus::Connected => "Connected",
            LinkStatus::Reconnecting => "Reconnecting...",
            LinkStatus::Disconnected => "Disconnected",
            LinkStatus::TestMode => "TEST MODE",
        }
    }
}

/// Everything a category target may read for one repaint.
pub struct RenderFrame<'a> {
    pub now_ms: f64,
    pub snapshot: &'a Snapshot,
    pub session: &'a SessionTracker,
}

pub trait RenderTarget: Send {
    fn init(&mut self) {}

    /// Drops accumulated display state, e.g. when a demo session ends.
    fn reset(&mut self) {}

    fn render(&mut self, frame: &RenderFrame<'_>) -> Result<(), RenderError>;
}

/// Continuous pose input; implementations throttle their own repaint.
pub trait PoseTarget: Send {
    fn init(&mut self) {}

    fn reset(&mut self) {}

    fn feed(&mut self, now_ms: f64, pose: &Pose) -> Result<(), RenderError>;
}

pub trait StatusIndicator: Send {
    fn show(&mut self, status: LinkStatus);
}

#[derive(Debug, Default)]
pub struct NoopTarget;

impl RenderTarget for NoopTarget {
    fn render(&mut self, _frame: &RenderFrame<'_>) -> Result<(), RenderError> {
        Ok(())
    }
}

impl PoseTarget for NoopTarget {
    fn feed(&mut self, _now_ms: f64, _pose: &Pose) -> Result<(), RenderError> {
        Ok(())
    }
}

impl StatusIndicator for NoopTarget {
    fn show(&mut self, status: LinkStatus) {
        debug!(status = status.label(), "link status");
    }
}

pub struct RenderTargets {
    pub ui: Box<dyn RenderTarget>,
    pub rotation: Box<dyn RenderTarget>,
    pub map: Box<dyn RenderTarget>,
    pub charts: Box<dyn RenderTarget>,
    pub pose: Box<dyn PoseTarget>,
    pub status: Box<dyn StatusIndicator>,
    initialized: bool,
}

impl RenderTargets {
    pub fn new(
        ui: Box<dyn RenderTarget>,
        rotation: Box<dyn RenderTarget>,
        map: Box<dyn RenderTarget>,
        charts: Box<dyn RenderTarget>,
        pose: Box<dyn PoseTarget>,
        status: Box<dyn StatusIndicator>,
    ) -> Self {
        Self {
            ui,
            rotation,
            map,
            charts,
            pose,
            status,
            initialized: false,
        }
    }

    /// Targets that accept every frame and draw nothing; the host reads the dispatch report instead.
    pub fn headless() -> Self {
        Self::new(
            Box::new(NoopTarget),
            Box::new(NoopTarget),
            Box::new(NoopTarget),
            Box::new(NoopTarget),
            Box::new(NoopTarget),
            Box::new(NoopTarget),
        )
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Runs each target's one-time setup on first use.
    pub fn ensure_initialized(&mut self) {
        if self.initialized {
            return;
        }
        self.ui.init();
        self.rotation.init();
        self.map.init();
        self.charts.init();
        self.pose.init();
        self.initialized = true;
    }

    pub fn reset(&mut self) {
        self.ui.reset();
        self.rotation.reset();
        self.map.reset();
        self.charts.reset();
        self.pose.reset();
    }
}
