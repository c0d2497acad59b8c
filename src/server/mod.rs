//! HTTP front end: routing, prompt dispatch, CORS and listener

mod handler;
mod listener;
mod openapi;
mod router;

use std::net::SocketAddr;

pub use handler::{PromptError, PromptHandler};
pub use listener::{load_tls_acceptor, run_server, run_server_with_shutdown, shutdown_signal};
pub use openapi::openapi_document;
pub use router::{build_router, ProxyState};

/// Failures that stop the server from starting or running
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid listen address {addr}: {source}")]
    Address {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid allowed origin: {0:?}")]
    InvalidOrigin(String),

    #[error("Invalid generation concurrency limit: {0}")]
    InvalidConcurrency(usize),

    #[error("TLS configuration error: {0}")]
    Tls(String),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}
