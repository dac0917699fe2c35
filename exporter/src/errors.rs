use std::net::SocketAddr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid channel matcher {entry:?}: {reason}")]
    ChannelMatcher { entry: String, reason: String },

    #[error("Invalid listen address {0:?}")]
    ListenAddr(String),

    #[error("Invalid metrics path {0:?}: must start with '/' and contain no ':' or '*'")]
    MetricsPath(String),

    #[error("Failed to open serial port {path}: {source}")]
    Serial {
        path: String,
        #[source]
        source: serialport::Error,
    },

    #[error("Failed to bind metrics listener on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Line exceeds {limit} bytes without a terminator")]
    LineTooLong { limit: usize },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
