// Core data models for snapshots, lap samples, and pose input.

mod lap;
mod snapshot;

pub use lap::{LapRecord, LapSample, Pose};
pub use snapshot::{Snapshot, Wheels};
