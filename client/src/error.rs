use std::net::AddrParseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),
    #[error("packet encoding failed: {0}")]
    Codec(#[from] bincode::Error),
    #[error("invalid server address: {0}")]
    Address(#[from] AddrParseError),
    #[error("server closed the session: {0}")]
    Disconnected(String),
}
