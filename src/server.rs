//! Listener bootstrap and the worker runtime.
//!
//! The worker pool is a multi-threaded tokio runtime sized from
//! [`Config::workers`]. hyper runs each accepted connection as its own task on
//! that runtime, so a connection that fails mid-write never reaches the accept
//! loop or any other connection.

use std::{io, net::SocketAddr};

use axum::Router;
use tokio::{net::TcpListener, runtime};
use tracing::info;

use crate::{build_app, config::Config, errors::ServerError, AppState};

/// A bound listener waiting to serve a router.
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
}

impl Server {
    pub async fn bind(config: &Config) -> Result<Self, ServerError> {
        let addr = config.bind_socket()?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::bind(addr, source))?;
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until the process is terminated.
    pub async fn serve(self, app: Router) -> Result<(), ServerError> {
        axum::serve(self.listener, app.into_make_service())
            .await
            .map_err(ServerError::Serve)
    }
}

pub fn build_runtime(workers: usize) -> Result<runtime::Runtime, ServerError> {
    runtime::Builder::new_multi_thread()
        .worker_threads(workers)
        .thread_name("responder-worker")
        .enable_all()
        .build()
        .map_err(ServerError::Runtime)
}

/// Builds the runtime, binds the listener and serves `/work` forever.
pub fn run(config: Config) -> Result<(), ServerError> {
    let runtime = build_runtime(config.workers)?;

    runtime.block_on(async move {
        let server = Server::bind(&config).await?;
        let port = server
            .local_addr()
            .map(|addr| addr.port())
            .unwrap_or(config.bind_port);
        let app = build_app(AppState::new(config.payload_size));

        info!(
            bind_addr = %config.bind_addr,
            bind_port = port,
            workers = config.workers,
            payload_size = config.payload_size,
            "server starting"
        );
        println!("Running on port {port}");

        server.serve(app).await
    })
}
