// Telemetry ingestion and multi-rate rendering scheduler shared by the native and browser hosts.

pub mod client;
pub mod coalescer;
pub mod connection;
pub mod constants;
pub mod demo;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod model;
pub mod render;
pub mod session;

pub use client::{DashboardClient, DashboardSettings};
pub use error::{EndpointError, RenderError, SnapshotError};
