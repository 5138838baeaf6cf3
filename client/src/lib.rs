// Crate root for the native GT7 dashboard host.

pub mod buffers;
pub mod config;
pub mod constants;
pub mod render;
pub mod tasks;
pub mod transport;
pub mod utils;
