//! Errors raised while starting or running the demo server.

use std::net::{AddrParseError, SocketAddr};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid bind address '{addr}': {source}")]
    InvalidBindAddress {
        addr: String,
        #[source]
        source: AddrParseError,
    },

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}
