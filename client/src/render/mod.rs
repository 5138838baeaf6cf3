// Headless render targets for the native host; each keeps its display state and traces repaints.

pub mod car_pose;
pub mod charts;
pub mod course_map;
pub mod gauges;
pub mod status;

use telemetry_core::render::RenderTargets;

pub use car_pose::{CarPose, RotationReadout};
pub use charts::ChartPanel;
pub use course_map::CourseMap;
pub use gauges::GaugePanel;
pub use status::LogStatus;

pub fn terminal_targets() -> RenderTargets {
    RenderTargets::new(
        Box::new(GaugePanel::new()),
        Box::new(RotationReadout::new()),
        Box::new(CourseMap::new()),
        Box::new(ChartPanel::new()),
        Box::new(CarPose::new()),
        Box::new(LogStatus::new()),
    )
}
