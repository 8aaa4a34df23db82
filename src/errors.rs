use std::{io, net::SocketAddr};

use thiserror::Error;

use crate::config::ConfigError;

/// Startup and serve failures. All of them are fatal to the process.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("failed to build runtime: {0}")]
    Runtime(#[source] io::Error),
    #[error("server stopped: {0}")]
    Serve(#[source] io::Error),
}

impl ServerError {
    pub fn bind(addr: SocketAddr, source: io::Error) -> Self {
        Self::Bind { addr, source }
    }
}
