// Error types surfaced by the scheduler core.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot payload is empty")]
    Empty,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EndpointError {
    #[error("invalid origin: {0}")]
    InvalidOrigin(#[from] url::ParseError),
    #[error("unsupported origin scheme: {0}")]
    UnsupportedScheme(String),
    #[error("origin has no host")]
    MissingHost,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("render target not initialized")]
    NotInitialized,
    #[error("render target failed: {0}")]
    Failed(String),
}
