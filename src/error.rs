//! Error types.
//!
//! Construction/config problems are fatal for a run; route problems are
//! reported per chunk so one bad traffic entry does not stop the rest.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::BuildingBlock;
use crate::net::DeviceId;

/// A chunk could not be routed or admitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("source and destination are the same device {0}")]
    SameDevice(DeviceId),
    #[error("device {device} out of range (device count {device_count})")]
    DeviceOutOfRange {
        device: DeviceId,
        device_count: usize,
    },
    #[error("route must visit at least two devices, got {len}")]
    TooShort { len: usize },
    #[error("no link from {from} to {to}")]
    MissingLink { from: DeviceId, to: DeviceId },
}

/// The network description cannot be turned into a topology.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read network config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed network config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("only support 1-dim topology, got {dims} dims")]
    UnsupportedDims { dims: usize },
    #[error("`{field}` has {got} entries, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("invalid {shape} topology: {reason}")]
    InvalidTopology { shape: BuildingBlock, reason: String },
}

/// Reading or applying a traffic matrix failed.
#[derive(Debug, Error)]
pub enum TrafficError {
    #[error("failed to access traffic matrix {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: `{token}` is not an integer")]
    Parse { line: usize, token: String },
    #[error("traffic matrix is empty")]
    Empty,
    #[error("row {row} has {got} entries, expected {expected}")]
    NotSquare {
        row: usize,
        expected: usize,
        got: usize,
    },
    #[error("traffic matrix covers {matrix} devices but the topology has {npus} NPUs")]
    SizeMismatch { matrix: usize, npus: usize },
}
