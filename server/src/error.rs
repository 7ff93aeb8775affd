use std::net::AddrParseError;
use thiserror::Error;

/// Failures at the transport edge. The simulation itself never returns errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),
    #[error("packet encoding failed: {0}")]
    Codec(#[from] bincode::Error),
    #[error("invalid bind address: {0}")]
    Address(#[from] AddrParseError),
    #[error("arena {0} is no longer running")]
    ArenaClosed(&'static str),
    #[error("arena {0} command queue is full")]
    QueueFull(&'static str),
}
